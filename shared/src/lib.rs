//! Shared types for the Roost platform
//!
//! Common types used across multiple crates including auth DTOs,
//! error types, response structures, and booking domain models.

pub mod client;
pub mod error;
pub mod models;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

// Error system re-exports (for convenient access)
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
