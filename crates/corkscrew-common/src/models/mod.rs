pub mod application;
pub mod auth;
pub mod job;
pub mod message;
pub mod profile;
pub mod review;

pub use application::{ApplicationStatus, JobApplication, NewJobApplication};
pub use auth::{AuthChange, AuthEvent, Claims, Session, SessionUser};
pub use job::{Job, JobStatus, NewJob};
pub use message::{Message, NewMessage};
pub use profile::{Profile, ProfileUpsert, Role};
pub use review::Review;
