//! Dialog state machine: sessions, question flow, result pagination.

pub mod criteria;
pub mod paginator;
pub mod question;
pub mod sequencer;
pub mod session;
pub mod store;

pub use paginator::{Advance, ExhaustedPolicy, ProfilePaginator};
pub use question::{Question, QuestionCatalog, QuestionKind};
pub use session::{DialogSession, PaginationState};
pub use store::SessionStore;
