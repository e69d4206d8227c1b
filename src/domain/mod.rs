pub mod user;
pub mod item;
pub mod purchase;
pub mod payout;
pub mod chat;
pub mod notification;

pub use user::*;
pub use item::*;
pub use purchase::*;
pub use payout::*;
pub use chat::*;
pub use notification::*;
