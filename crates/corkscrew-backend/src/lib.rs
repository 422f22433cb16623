pub mod error;
pub mod memory;
pub mod query;
pub mod repos;
pub mod rest;
pub mod store;

// Re-export commonly used items
pub use error::{BackendError, BackendResult};
pub use memory::MemoryBackend;
pub use query::{Filter, Order, Query, Table};
pub use repos::application::ApplicationRepo;
pub use repos::job::{JobRepo, JobSearch};
pub use repos::message::MessageRepo;
pub use repos::profile::ProfileRepo;
pub use rest::RestBackend;
pub use store::{AccessScope, AuthApi, Backend, RecordStore, SignUpResult};
