use super::codes::ErrorCode;

/// Error category, derived from the error code range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Success (0)
    Success,
    /// General errors (1-999)
    General,
    /// Authentication errors (1000-1999)
    Auth,
    /// Permission errors (2000-2999)
    Permission,
    /// Hostel and room errors (3000-3999)
    Room,
    /// Booking errors (4000-4999)
    Booking,
    /// Deposit and payment errors (5000-5999)
    Deposit,
    /// System errors (9000-9999)
    System,
}

impl ErrorCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCategory::Success => "success",
            ErrorCategory::General => "general",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Permission => "permission",
            ErrorCategory::Room => "room",
            ErrorCategory::Booking => "booking",
            ErrorCategory::Deposit => "deposit",
            ErrorCategory::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category this error code belongs to
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            0 => ErrorCategory::Success,
            1..=999 => ErrorCategory::General,
            1000..=1999 => ErrorCategory::Auth,
            2000..=2999 => ErrorCategory::Permission,
            3000..=3999 => ErrorCategory::Room,
            4000..=4999 => ErrorCategory::Booking,
            5000..=5999 => ErrorCategory::Deposit,
            _ => ErrorCategory::System,
        }
    }

    /// Whether the error is worth retrying at the transport level
    ///
    /// Only transient system failures qualify. Business rejections are
    /// final and must be surfaced to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::NetworkError | ErrorCode::TimeoutError)
    }
}
