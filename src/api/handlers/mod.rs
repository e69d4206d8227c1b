pub mod admin;
pub mod auth;
pub mod chat;
pub mod escrow;
pub mod items;
pub mod notifications;
pub mod payouts;
pub mod root;
