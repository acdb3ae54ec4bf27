//! Roost API mock - in-memory hostel booking server
//!
//! Serves the same endpoints and response envelope as the production
//! booking API, backed by concurrent in-memory maps. Used as a local
//! development server and spawned directly by integration tests.

pub mod api;
pub mod state;

pub use api::router;
pub use state::{AppState, Hostel, HostelRoom, StudentAccount, seeded};
