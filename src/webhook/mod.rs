//! Inbound webhook surface: routes, signature checks, event decoding.

pub mod event;
pub mod routes;
pub mod signature;

pub use event::{EventKind, Postback, Sentinel, WebhookEvent, WebhookPayload};
pub use routes::{webhook_routes, AppState};
