//! Messenger Send API: typed message shapes and the HTTP client.

pub mod client;
pub mod message;

pub use client::{GraphClient, SendApi};
pub use message::{MessageFactory, OutboundMessage};
