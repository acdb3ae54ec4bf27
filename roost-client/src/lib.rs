//! Roost Client - HTTP client for the Roost hostel booking API
//!
//! Provides authenticated calls to the booking API plus the reservation
//! flow that drives a booking attempt from balance check to submission.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod reservation;
pub mod session;

pub use client::RoostClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use session::Session;

// Re-export shared types for convenience
pub use shared::client::{CurrentUserResponse, LoginRequest, LoginResponse, UserInfo};
pub use shared::error::{ApiResponse, ErrorCode};
pub use shared::models::{
    BOOKING_FEE, BookingRecord, BookingRequest, BookingStatus, DepositBalance, HostelAvailability,
    Room, RoomStatus,
};

// Reservation flow types
pub use reservation::{
    AvailabilityCheck, AvailabilityVerdict, BookingRejection, ReservationBackend,
    ReservationError, ReservationFlow, probe_listing,
};
