//! Data models
//!
//! Shared between roost-api-mock and roost-client (via API).
//! All IDs are `String` (server-assigned UUIDs).

pub mod booking;
pub mod deposit;
pub mod room;

// Re-exports
pub use booking::*;
pub use deposit::*;
pub use room::*;
