mod common;

use chrono::Utc;
use trove::domain::SendMessageRequest;
use trove::error::AppError;

fn message(body: &str) -> SendMessageRequest {
    SendMessageRequest {
        body: body.to_string(),
    }
}

#[tokio::test]
async fn test_conversation_and_polling() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let buyer = common::create_user(&pool, "buyer@example.com", "Buyer").await?;
    let category = common::create_category(&pool, "Records").await?;
    let item = common::create_approved_item(&pool, seller.id, category.id, "LP", 6_000).await?;

    let chat = common::chat_service(&pool);

    chat.send(item.id, buyer.id, seller.id, message("Is this still available?"))
        .await?;
    chat.send(item.id, seller.id, buyer.id, message("Yes, it is"))
        .await?;

    let conversation = chat.conversation(item.id, buyer.id, seller.id, None).await?;
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation[0].body, "Is this still available?");
    assert_eq!(conversation[1].body, "Yes, it is");

    // Poll with a cursor past the last message: nothing new
    let cursor = conversation[1].created_at;
    let newer = chat
        .conversation(item.id, buyer.id, seller.id, Some(cursor))
        .await?;
    assert!(newer.is_empty());

    // A message after the cursor shows up
    chat.send(item.id, buyer.id, seller.id, message("Great, I'll take it"))
        .await?;
    let newer = chat
        .conversation(item.id, buyer.id, seller.id, Some(cursor))
        .await?;
    assert_eq!(newer.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_conversation_must_involve_the_seller() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let buyer_a = common::create_user(&pool, "a@example.com", "A").await?;
    let buyer_b = common::create_user(&pool, "b@example.com", "B").await?;
    let category = common::create_category(&pool, "Art").await?;
    let item = common::create_approved_item(&pool, seller.id, category.id, "Print", 3_000).await?;

    let chat = common::chat_service(&pool);

    // Two buyers cannot open a side channel about someone else's item
    let err = chat
        .send(item.id, buyer_a.id, buyer_b.id, message("psst"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Messaging yourself is rejected
    let err = chat
        .send(item.id, seller.id, seller.id, message("note to self"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn test_two_item_conversations_do_not_mix() -> anyhow::Result<()> {
    let pool = common::setup_pool().await?;
    let seller = common::create_user(&pool, "seller@example.com", "Seller").await?;
    let buyer = common::create_user(&pool, "buyer@example.com", "Buyer").await?;
    let category = common::create_category(&pool, "Plants").await?;
    let fern = common::create_approved_item(&pool, seller.id, category.id, "Fern", 1_500).await?;
    let cactus =
        common::create_approved_item(&pool, seller.id, category.id, "Cactus", 2_500).await?;

    let chat = common::chat_service(&pool);
    chat.send(fern.id, buyer.id, seller.id, message("About the fern"))
        .await?;
    chat.send(cactus.id, buyer.id, seller.id, message("About the cactus"))
        .await?;

    let fern_thread = chat.conversation(fern.id, buyer.id, seller.id, None).await?;
    assert_eq!(fern_thread.len(), 1);
    assert_eq!(fern_thread[0].body, "About the fern");
    assert!(fern_thread[0].created_at <= Utc::now());

    Ok(())
}
