pub mod config;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

pub use config::Config;
pub use errors::{ChecklistEngineError, Result};
pub use services::ChecklistService;
pub use storage::{ChecklistStore, Database, InMemoryStore};
