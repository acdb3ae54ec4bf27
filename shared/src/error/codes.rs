use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enumeration
///
/// Error code ranges:
/// - 0: Success
/// - 1-999: General errors
/// - 1000-1999: Authentication errors
/// - 2000-2999: Permission errors
/// - 3000-3999: Hostel and room errors
/// - 4000-4999: Booking errors
/// - 5000-5999: Deposit and payment errors
/// - 9000-9999: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ========== Success ==========
    Success = 0,

    // ========== General Errors (1-999) ==========
    Unknown = 1,
    ValidationFailed = 2,
    NotFound = 3,
    AlreadyExists = 4,
    InvalidRequest = 5,

    // ========== Authentication Errors (1000-1999) ==========
    NotAuthenticated = 1001,
    InvalidCredentials = 1002,
    TokenExpired = 1003,
    TokenInvalid = 1004,
    SessionExpired = 1005,

    // ========== Permission Errors (2000-2999) ==========
    PermissionDenied = 2001,

    // ========== Hostel and Room Errors (3000-3999) ==========
    HostelNotFound = 3001,
    RoomNotFound = 3002,
    RoomUnavailable = 3003,
    RoomFullyBooked = 3004,
    RoomUnderMaintenance = 3005,
    GenderRestricted = 3006,

    // ========== Booking Errors (4000-4999) ==========
    BookingNotFound = 4001,
    DuplicateActiveBooking = 4002,
    BookingAlreadyCancelled = 4003,
    BookingNotCancellable = 4004,
    InvalidStayDates = 4005,

    // ========== Deposit and Payment Errors (5000-5999) ==========
    InsufficientDeposit = 5001,
    DepositAccountNotFound = 5002,
    PaymentFailed = 5003,
    InvalidPaymentMethod = 5004,

    // ========== System Errors (9000-9999) ==========
    InternalError = 9001,
    DatabaseError = 9002,
    NetworkError = 9003,
    TimeoutError = 9004,
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric value of the error code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for the error code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",

            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            ErrorCode::NotAuthenticated => "Not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Session token has expired",
            ErrorCode::TokenInvalid => "Session token is invalid",
            ErrorCode::SessionExpired => "Session has expired, please log in again",

            ErrorCode::PermissionDenied => "Permission denied",

            ErrorCode::HostelNotFound => "Hostel not found",
            ErrorCode::RoomNotFound => "Room not found",
            ErrorCode::RoomUnavailable => "Room is not open for booking",
            ErrorCode::RoomFullyBooked => "Room is fully booked",
            ErrorCode::RoomUnderMaintenance => "Room is under maintenance",
            ErrorCode::GenderRestricted => "Room is restricted to a different gender",

            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::DuplicateActiveBooking => "You already have an active booking",
            ErrorCode::BookingAlreadyCancelled => "Booking is already cancelled",
            ErrorCode::BookingNotCancellable => "Booking can no longer be cancelled",
            ErrorCode::InvalidStayDates => "Check-out date must be after check-in date",

            ErrorCode::InsufficientDeposit => "Insufficient deposit balance",
            ErrorCode::DepositAccountNotFound => "Deposit account not found",
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::InvalidPaymentMethod => "Invalid payment method",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::NetworkError => "Network request failed",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }

    /// Whether this code represents success
    pub fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),

            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionExpired),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Hostel and room
            3001 => Ok(ErrorCode::HostelNotFound),
            3002 => Ok(ErrorCode::RoomNotFound),
            3003 => Ok(ErrorCode::RoomUnavailable),
            3004 => Ok(ErrorCode::RoomFullyBooked),
            3005 => Ok(ErrorCode::RoomUnderMaintenance),
            3006 => Ok(ErrorCode::GenderRestricted),

            // Booking
            4001 => Ok(ErrorCode::BookingNotFound),
            4002 => Ok(ErrorCode::DuplicateActiveBooking),
            4003 => Ok(ErrorCode::BookingAlreadyCancelled),
            4004 => Ok(ErrorCode::BookingNotCancellable),
            4005 => Ok(ErrorCode::InvalidStayDates),

            // Deposit and payment
            5001 => Ok(ErrorCode::InsufficientDeposit),
            5002 => Ok(ErrorCode::DepositAccountNotFound),
            5003 => Ok(ErrorCode::PaymentFailed),
            5004 => Ok(ErrorCode::InvalidPaymentMethod),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}
