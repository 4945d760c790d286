//! lambda-phage core library
//!
//! This crate provides the foundational utilities shared by every other crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Application settings
//! - Storage helpers that tell "missing" apart from "unreadable"

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use config::AppSettings;
pub use error::{AppError, AppResult};
