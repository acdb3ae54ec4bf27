use http::StatusCode;

use super::codes::ErrorCode;

impl ErrorCode {
    /// Map the error code to an HTTP status code
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::Success => StatusCode::OK,

            // Missing resources
            ErrorCode::NotFound
            | ErrorCode::HostelNotFound
            | ErrorCode::RoomNotFound
            | ErrorCode::BookingNotFound
            | ErrorCode::DepositAccountNotFound => StatusCode::NOT_FOUND,

            // State conflicts, including races lost to another guest
            ErrorCode::AlreadyExists
            | ErrorCode::RoomFullyBooked
            | ErrorCode::DuplicateActiveBooking
            | ErrorCode::BookingAlreadyCancelled => StatusCode::CONFLICT,

            // Authentication
            ErrorCode::NotAuthenticated
            | ErrorCode::InvalidCredentials
            | ErrorCode::TokenExpired
            | ErrorCode::TokenInvalid
            | ErrorCode::SessionExpired => StatusCode::UNAUTHORIZED,

            // Authorization
            ErrorCode::PermissionDenied | ErrorCode::GenderRestricted => StatusCode::FORBIDDEN,

            // Payment
            ErrorCode::InsufficientDeposit | ErrorCode::PaymentFailed => {
                StatusCode::PAYMENT_REQUIRED
            }

            // Server-side failures
            ErrorCode::InternalError | ErrorCode::DatabaseError | ErrorCode::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorCode::NetworkError => StatusCode::BAD_GATEWAY,
            ErrorCode::TimeoutError => StatusCode::GATEWAY_TIMEOUT,

            // Everything else is a malformed or unsatisfiable request
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
        assert_eq!(ErrorCode::RoomNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::RoomFullyBooked.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::DuplicateActiveBooking.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::TokenExpired.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::GenderRestricted.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::InsufficientDeposit.http_status(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
