//! Reelhost Core Library
//!
//! This crate provides the domain model, error taxonomy, configuration and shared
//! constants used by every Reelhost component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{Video, VideoResponse};
pub use storage_types::StorageBackend;
