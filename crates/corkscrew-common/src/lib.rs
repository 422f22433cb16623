pub mod conversation;
pub mod models;
pub mod session_sync;
pub mod validation;

pub use conversation::{Conversation, JobSummary};
pub use session_sync::SyncState;
