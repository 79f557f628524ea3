//! Realtime subscription channel over a single WebSocket.

pub mod channel;
pub mod listener;

pub use channel::{SubscriptionChannel, CONNECTION_LOST_MESSAGE, CONNECTION_LOST_TITLE};
pub use listener::Listener;
