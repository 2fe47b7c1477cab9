//! Reelhost API Library
//!
//! HTTP handlers, middleware and application setup for the video and thumbnail
//! upload endpoints.

mod handlers;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppState, UploadState};
