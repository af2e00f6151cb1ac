//! # Backend API
//!
//! The request/response boundary with the study backend. `StudyBackend` is the
//! seam the TUI spawns requests through; `HttpBackend` is the only production
//! implementation.

pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpBackend, SESSION_HEADER, StudyBackend};
pub use error::ApiError;
pub use types::{ChatReply, UploadReceipt};
