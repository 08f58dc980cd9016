// zlog-api: Async Rust client for the ZLog request-log backend

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ZlogClient;
pub use error::Error;
pub use models::{
    Listing, LogEntry, Project, ProjectId, RecordId, Snippets, StatsSnapshot,
    mask_secret,
};
pub use transport::TransportConfig;
