//! Shared utilities and common functionality
//!
//! This module contains shared utilities, error handling, logging, and
//! cryptographic primitives that are used across the application.

pub mod crypto;
pub mod error;
pub mod logging;

pub use error::{AppError, AppResult};
pub use logging::LoggingUtils;
