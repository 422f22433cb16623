pub mod bridge;
pub mod client;
pub mod config;
pub mod forms;
pub mod forwarder;
pub mod navigator;
pub mod shared;

pub use bridge::SessionBridge;
pub use client::BackendClient;
pub use shared::SharedClient;
