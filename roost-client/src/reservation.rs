//! Reservation orchestration
//!
//! The linear flow between "student taps Reserve" and a created booking:
//! check the deposit balance, re-probe room availability, then submit.
//! Each step can abort the flow with a terminal, user-facing error.
//! Nothing is retried and no step is skipped; a fresh attempt starts
//! over so every attempt sees fresh server state.

use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::error::{ErrorCategory, ErrorCode};
use shared::models::{
    BOOKING_FEE, BookingRecord, BookingRequest, DepositBalance, HostelAvailability, Room,
    RoomStatus,
};
use std::fmt;
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use validator::Validate;

// ============================================================================
// Availability probing
// ============================================================================

/// Terminal classification of one room inside an availability listing
#[derive(Debug, Clone, PartialEq)]
pub enum AvailabilityVerdict {
    /// Room id absent from the listing; it no longer exists or is no
    /// longer eligible for the requested dates
    NotFound,
    /// Occupancy at or over capacity. Wins over the status field.
    Full,
    /// Listed but not open for booking (occupied, maintenance, reserved)
    Unavailable { status: RoomStatus },
    /// Structurally available at probe time
    Available { room: Room },
}

impl AvailabilityVerdict {
    /// Whether the room can be submitted for booking
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityVerdict::Available { .. })
    }
}

impl fmt::Display for AvailabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityVerdict::NotFound => {
                write!(f, "room is no longer listed for the requested dates")
            }
            AvailabilityVerdict::Full => write!(f, "room is fully booked"),
            AvailabilityVerdict::Unavailable { status } => {
                let label = match status {
                    RoomStatus::Available => "available",
                    RoomStatus::Occupied => "occupied",
                    RoomStatus::Maintenance => "maintenance",
                    RoomStatus::Reserved => "reserved",
                };
                write!(f, "room is not open for booking (status: {})", label)
            }
            AvailabilityVerdict::Available { .. } => write!(f, "room is available"),
        }
    }
}

/// Availability probe result plus the time the listing was read
///
/// The timestamp is diagnostic. The probe only narrows the race window
/// between browse time and submit time; the server remains the sole
/// authority on whether a submission succeeds.
#[derive(Debug, Clone)]
pub struct AvailabilityCheck {
    pub verdict: AvailabilityVerdict,
    pub checked_at: DateTime<Utc>,
}

/// Classify a single room inside a fetched availability listing
///
/// Read-only: probing twice against unchanged state yields the same
/// verdict. Occupancy at or over capacity is `Full` regardless of what
/// the status field claims.
pub fn probe_listing(listing: &HostelAvailability, room_id: &str) -> AvailabilityCheck {
    let verdict = match listing.rooms.iter().find(|r| r.id == room_id) {
        None => AvailabilityVerdict::NotFound,
        Some(room) if room.is_full() => AvailabilityVerdict::Full,
        Some(room) if room.status != RoomStatus::Available => AvailabilityVerdict::Unavailable {
            status: room.status,
        },
        Some(room) => AvailabilityVerdict::Available { room: room.clone() },
    };
    AvailabilityCheck {
        verdict,
        checked_at: Utc::now(),
    }
}

// ============================================================================
// Submission rejection taxonomy
// ============================================================================

/// Business-rule rejection of a booking submission
///
/// Classification prefers the structured error code when the server
/// sends one, and only falls back to message matching for responses
/// without a code.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingRejection {
    /// The student already holds an active booking
    DuplicateBooking { message: String },
    /// The room was taken between probe and submission
    RoomTaken { message: String },
    /// The room is restricted to a different gender
    GenderRestricted { message: String },
    /// The deposit account cannot cover the fee
    InsufficientDeposit { message: String },
    /// Any other rejection, surfaced verbatim
    Other { message: String },
}

impl BookingRejection {
    /// Classify a client error as a business rejection
    ///
    /// Returns `None` for transport and authentication failures; those
    /// are not rejections and keep their original error.
    pub fn classify(err: &ClientError) -> Option<Self> {
        match err {
            ClientError::Api { code, message, .. } => {
                if code.category() == ErrorCategory::Auth {
                    return None;
                }
                Some(Self::from_code(*code, message))
            }
            ClientError::Validation(msg)
            | ClientError::Forbidden(msg)
            | ClientError::NotFound(msg)
            | ClientError::Internal(msg) => Some(Self::from_message(msg)),
            _ => None,
        }
    }

    fn from_code(code: ErrorCode, message: &str) -> Self {
        let message = message.to_string();
        match code {
            ErrorCode::DuplicateActiveBooking => Self::duplicate(message),
            ErrorCode::RoomFullyBooked
            | ErrorCode::RoomUnavailable
            | ErrorCode::RoomUnderMaintenance
            | ErrorCode::RoomNotFound => Self::RoomTaken { message },
            ErrorCode::GenderRestricted => Self::GenderRestricted { message },
            ErrorCode::InsufficientDeposit | ErrorCode::PaymentFailed => {
                Self::InsufficientDeposit { message }
            }
            _ => Self::Other { message },
        }
    }

    fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("already have an active booking") {
            Self::duplicate(message.to_string())
        } else if lower.contains("gender") {
            Self::GenderRestricted {
                message: message.to_string(),
            }
        } else if lower.contains("no longer available") || lower.contains("fully booked") {
            Self::RoomTaken {
                message: message.to_string(),
            }
        } else if lower.contains("insufficient deposit") {
            Self::InsufficientDeposit {
                message: message.to_string(),
            }
        } else {
            Self::Other {
                message: message.to_string(),
            }
        }
    }

    /// Build a duplicate-booking rejection, making sure the message tells
    /// the student how to unblock themselves
    fn duplicate(message: String) -> Self {
        let message = if message.to_lowercase().contains("complete or cancel") {
            message
        } else {
            format!(
                "{}. Please complete or cancel your existing booking first",
                message.trim_end_matches(['.', ' '])
            )
        };
        Self::DuplicateBooking { message }
    }

    /// The user-facing message for this rejection
    pub fn message(&self) -> &str {
        match self {
            BookingRejection::DuplicateBooking { message }
            | BookingRejection::RoomTaken { message }
            | BookingRejection::GenderRestricted { message }
            | BookingRejection::InsufficientDeposit { message }
            | BookingRejection::Other { message } => message,
        }
    }
}

impl fmt::Display for BookingRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

// ============================================================================
// Reservation flow
// ============================================================================

/// Terminal outcome of a failed reservation flow
#[derive(Debug, Error)]
pub enum ReservationError {
    /// The request failed local validation before any network call
    #[error("invalid booking request: {0}")]
    Invalid(String),

    /// The deposit account cannot cover the booking fee
    #[error("insufficient deposit balance: {available:.2} available, {required:.2} required")]
    InsufficientDeposit { available: f64, required: f64 },

    /// The availability probe ruled the room out
    #[error("{0}")]
    RoomUnavailable(AvailabilityVerdict),

    /// The server rejected the submission
    #[error("{0}")]
    Rejected(BookingRejection),

    /// Transport or protocol failure
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The flow was cancelled before completion
    #[error("reservation cancelled")]
    Cancelled,
}

/// Server operations the reservation flow depends on
///
/// Implemented by [`crate::RoostClient`]; tests substitute a scripted
/// fake to observe exactly which calls the flow makes.
#[async_trait]
pub trait ReservationBackend: Send + Sync {
    /// Fetch the student's deposit balance
    async fn deposit_balance(&self) -> ClientResult<DepositBalance>;

    /// Fetch the availability listing for a hostel over a date range
    async fn hostel_availability(
        &self,
        hostel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ClientResult<HostelAvailability>;

    /// Submit a booking paid from the deposit account
    async fn create_booking_with_deposit(
        &self,
        request: &BookingRequest,
    ) -> ClientResult<BookingRecord>;
}

/// Linear reservation state machine
///
/// Steps run strictly in order: local validation, deposit balance check,
/// availability re-probe, submission. The balance check runs first so a
/// non-destructive read can abort the flow before any room-affecting
/// call. The probe runs even when an earlier screen already showed the
/// room as free.
pub struct ReservationFlow<'a, B: ReservationBackend> {
    backend: &'a B,
    cancel: CancellationToken,
}

impl<'a, B: ReservationBackend> ReservationFlow<'a, B> {
    /// Create a flow over the given backend
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a cancellation token
    ///
    /// Cancelling the token aborts the flow at the next step boundary;
    /// a step already submitted to the server is not rolled back.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the full reservation flow
    pub async fn reserve(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingRecord, ReservationError> {
        // 1. Validate locally before touching the network
        request
            .validate()
            .map_err(|e| ReservationError::Invalid(e.to_string()))?;

        tracing::info!(
            hostel_id = %request.hostel_id,
            room_id = %request.room_id,
            check_in = %request.check_in,
            check_out = %request.check_out,
            "Starting reservation"
        );

        // 2. Fail fast on the deposit balance, before any room-affecting call
        let balance = self.step(self.backend.deposit_balance()).await??;
        if !balance.can_cover(BOOKING_FEE) {
            tracing::warn!(
                available = balance.available_balance,
                required = BOOKING_FEE,
                "Aborting reservation: balance below booking fee"
            );
            return Err(ReservationError::InsufficientDeposit {
                available: balance.available_balance,
                required: BOOKING_FEE,
            });
        }

        // 3. Re-probe availability immediately before submission
        let listing = self
            .step(self.backend.hostel_availability(
                &request.hostel_id,
                request.check_in,
                request.check_out,
            ))
            .await??;
        let check = probe_listing(&listing, &request.room_id);
        tracing::info!(verdict = %check.verdict, checked_at = %check.checked_at, "Availability probe");
        if !check.verdict.is_available() {
            return Err(ReservationError::RoomUnavailable(check.verdict));
        }

        // 4. Submit; the server re-checks everything and owns atomicity
        let record = match self
            .step(self.backend.create_booking_with_deposit(request))
            .await?
        {
            Ok(record) => record,
            Err(err) => {
                return Err(match BookingRejection::classify(&err) {
                    Some(rejection) => {
                        tracing::warn!(%rejection, "Booking rejected by server");
                        ReservationError::Rejected(rejection)
                    }
                    None => ReservationError::Client(err),
                });
            }
        };

        tracing::info!(booking_id = %record.id, status = ?record.status, "Reservation created");
        Ok(record)
    }

    /// Run one step, racing it against cancellation
    async fn step<T>(
        &self,
        fut: impl Future<Output = ClientResult<T>>,
    ) -> Result<ClientResult<T>, ReservationError> {
        if self.cancel.is_cancelled() {
            return Err(ReservationError::Cancelled);
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ReservationError::Cancelled),
            res = fut => Ok(res),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{BookingStatus, BookingType, PaymentMethod, PaymentStatus};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum ScriptedFailure {
        Api { code: ErrorCode, message: String },
        Message(String),
        Transport,
    }

    struct FakeBackend {
        available_balance: f64,
        rooms: Vec<Room>,
        create_failure: Mutex<Option<ScriptedFailure>>,
        balance_calls: AtomicUsize,
        availability_calls: AtomicUsize,
        create_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(available_balance: f64, rooms: Vec<Room>) -> Self {
            Self {
                available_balance,
                rooms,
                create_failure: Mutex::new(None),
                balance_calls: AtomicUsize::new(0),
                availability_calls: AtomicUsize::new(0),
                create_calls: AtomicUsize::new(0),
            }
        }

        fn with_create_failure(self, failure: ScriptedFailure) -> Self {
            *self.create_failure.lock().expect("lock") = Some(failure);
            self
        }
    }

    #[async_trait]
    impl ReservationBackend for FakeBackend {
        async fn deposit_balance(&self) -> ClientResult<DepositBalance> {
            self.balance_calls.fetch_add(1, Ordering::SeqCst);
            Ok(DepositBalance {
                total_balance: self.available_balance,
                available_balance: self.available_balance,
                pending_deposits: 0.0,
            })
        }

        async fn hostel_availability(
            &self,
            hostel_id: &str,
            check_in: NaiveDate,
            check_out: NaiveDate,
        ) -> ClientResult<HostelAvailability> {
            self.availability_calls.fetch_add(1, Ordering::SeqCst);
            Ok(HostelAvailability {
                hostel_id: hostel_id.to_string(),
                hostel_name: "North Wing".to_string(),
                check_in,
                check_out,
                rooms: self.rooms.clone(),
            })
        }

        async fn create_booking_with_deposit(
            &self,
            request: &BookingRequest,
        ) -> ClientResult<BookingRecord> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(failure) = self.create_failure.lock().expect("lock").take() {
                return Err(match failure {
                    ScriptedFailure::Api { code, message } => ClientError::Api {
                        code,
                        message,
                        details: None,
                    },
                    ScriptedFailure::Message(message) => ClientError::Validation(message),
                    ScriptedFailure::Transport => {
                        ClientError::InvalidResponse("connection reset".to_string())
                    }
                });
            }
            Ok(BookingRecord {
                id: "b-1".to_string(),
                student_id: "u-1".to_string(),
                hostel_id: request.hostel_id.clone(),
                room_id: request.room_id.clone(),
                room_number: "A-101".to_string(),
                check_in: request.check_in,
                check_out: request.check_out,
                booking_type: request.booking_type,
                status: BookingStatus::Pending,
                payment_status: PaymentStatus::Partial,
                total_amount: 1600.0,
                amount_paid: request.deposit_amount,
                amount_due: 1600.0 - request.deposit_amount,
                created_at: Utc::now(),
            })
        }
    }

    fn room(id: &str, status: RoomStatus, occupancy: u32, capacity: u32) -> Room {
        Room {
            id: id.to_string(),
            room_number: "A-101".to_string(),
            status,
            current_occupancy: occupancy,
            max_occupancy: capacity,
            price_per_month: 320.0,
            gender_restriction: None,
        }
    }

    fn request() -> BookingRequest {
        BookingRequest {
            hostel_id: "h-1".to_string(),
            room_id: "r-1".to_string(),
            student_name: "Lena Novak".to_string(),
            student_email: "lena@example.edu".to_string(),
            student_phone: "+420 777 000 112".to_string(),
            student_number: "S2025-0417".to_string(),
            gender: None,
            check_in: NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date"),
            check_out: NaiveDate::from_ymd_opt(2026, 1, 31).expect("valid date"),
            booking_type: BookingType::Semester,
            emergency_contacts: vec![],
            use_deposit: true,
            deposit_amount: BOOKING_FEE,
            payment_method: PaymentMethod::AccountCredit,
        }
    }

    fn listing(rooms: Vec<Room>) -> HostelAvailability {
        HostelAvailability {
            hostel_id: "h-1".to_string(),
            hostel_name: "North Wing".to_string(),
            check_in: NaiveDate::from_ymd_opt(2025, 9, 1).expect("valid date"),
            check_out: NaiveDate::from_ymd_opt(2026, 1, 31).expect("valid date"),
            rooms,
        }
    }

    // ========== Probe classification ==========

    #[test]
    fn test_probe_missing_room_is_not_found() {
        let check = probe_listing(&listing(vec![room("r-2", RoomStatus::Available, 0, 2)]), "r-1");
        assert_eq!(check.verdict, AvailabilityVerdict::NotFound);
    }

    #[test]
    fn test_probe_full_room() {
        let check = probe_listing(&listing(vec![room("r-1", RoomStatus::Available, 2, 2)]), "r-1");
        assert_eq!(check.verdict, AvailabilityVerdict::Full);
        assert_eq!(check.verdict.to_string(), "room is fully booked");
    }

    #[test]
    fn test_probe_occupancy_wins_over_status() {
        // Status still says available but the room is over capacity
        let check = probe_listing(&listing(vec![room("r-1", RoomStatus::Available, 3, 2)]), "r-1");
        assert_eq!(check.verdict, AvailabilityVerdict::Full);
    }

    #[test]
    fn test_probe_non_available_status() {
        let check = probe_listing(
            &listing(vec![room("r-1", RoomStatus::Maintenance, 0, 2)]),
            "r-1",
        );
        assert_eq!(
            check.verdict,
            AvailabilityVerdict::Unavailable {
                status: RoomStatus::Maintenance
            }
        );
        assert!(!check.verdict.is_available());
    }

    #[test]
    fn test_probe_available_room() {
        let check = probe_listing(&listing(vec![room("r-1", RoomStatus::Available, 1, 2)]), "r-1");
        assert!(check.verdict.is_available());
        assert!(check.checked_at <= Utc::now());
    }

    #[test]
    fn test_probe_is_idempotent() {
        let rooms = listing(vec![room("r-1", RoomStatus::Available, 1, 2)]);
        let first = probe_listing(&rooms, "r-1");
        let second = probe_listing(&rooms, "r-1");
        assert_eq!(first.verdict, second.verdict);
    }

    // ========== Rejection classification ==========

    #[test]
    fn test_classification_prefers_code_over_message() {
        let err = ClientError::Api {
            code: ErrorCode::DuplicateActiveBooking,
            message: "request could not be processed".to_string(),
            details: None,
        };
        let rejection = BookingRejection::classify(&err).expect("rejection");
        assert!(matches!(rejection, BookingRejection::DuplicateBooking { .. }));
        assert!(rejection.message().contains("complete or cancel"));
    }

    #[test]
    fn test_classification_message_fallback() {
        let duplicate =
            BookingRejection::classify(&ClientError::Validation(
                "You already have an active booking".to_string(),
            ))
            .expect("rejection");
        assert!(matches!(duplicate, BookingRejection::DuplicateBooking { .. }));
        assert!(duplicate.message().contains("complete or cancel"));

        let taken = BookingRejection::classify(&ClientError::Validation(
            "Room A-101 is fully booked".to_string(),
        ))
        .expect("rejection");
        assert!(matches!(taken, BookingRejection::RoomTaken { .. }));

        let gone = BookingRejection::classify(&ClientError::Validation(
            "This room is no longer available".to_string(),
        ))
        .expect("rejection");
        assert!(matches!(gone, BookingRejection::RoomTaken { .. }));

        let gender = BookingRejection::classify(&ClientError::Forbidden(
            "Room is restricted to a different gender".to_string(),
        ))
        .expect("rejection");
        assert!(matches!(gender, BookingRejection::GenderRestricted { .. }));

        let other = BookingRejection::classify(&ClientError::Internal(
            "temporary backend hiccup".to_string(),
        ))
        .expect("rejection");
        assert!(matches!(other, BookingRejection::Other { .. }));
    }

    #[test]
    fn test_duplicate_guidance_not_doubled() {
        let err = ClientError::Api {
            code: ErrorCode::DuplicateActiveBooking,
            message: "You already have an active booking. Please complete or cancel it before booking another room".to_string(),
            details: None,
        };
        let rejection = BookingRejection::classify(&err).expect("rejection");
        let occurrences = rejection.message().matches("complete or cancel").count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_transport_errors_are_not_rejections() {
        let err = ClientError::InvalidResponse("connection reset".to_string());
        assert!(BookingRejection::classify(&err).is_none());
        let err = ClientError::Unauthorized("Authentication required".to_string());
        assert!(BookingRejection::classify(&err).is_none());
    }

    #[test]
    fn test_auth_codes_are_not_rejections() {
        let err = ClientError::Api {
            code: ErrorCode::TokenExpired,
            message: "Session expired".to_string(),
            details: None,
        };
        assert!(BookingRejection::classify(&err).is_none());
    }

    // ========== Flow ordering and call counts ==========

    #[tokio::test]
    async fn test_flow_succeeds_and_calls_each_step_once() {
        let backend = FakeBackend::new(100.0, vec![room("r-1", RoomStatus::Available, 1, 2)]);
        let record = ReservationFlow::new(&backend)
            .reserve(&request())
            .await
            .expect("reservation");

        assert_eq!(record.status, BookingStatus::Pending);
        assert_eq!(record.amount_paid, BOOKING_FEE);
        assert_eq!(backend.balance_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.availability_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_low_balance_aborts_before_any_room_call() {
        let backend = FakeBackend::new(50.0, vec![room("r-1", RoomStatus::Available, 1, 2)]);
        let err = ReservationFlow::new(&backend)
            .reserve(&request())
            .await
            .expect_err("must abort");

        assert!(err.to_string().contains("insufficient deposit balance"));
        match err {
            ReservationError::InsufficientDeposit {
                available,
                required,
            } => {
                assert_eq!(available, 50.0);
                assert_eq!(required, BOOKING_FEE);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.balance_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.availability_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exact_fee_balance_passes_the_check() {
        let backend = FakeBackend::new(BOOKING_FEE, vec![room("r-1", RoomStatus::Available, 0, 2)]);
        let record = ReservationFlow::new(&backend)
            .reserve(&request())
            .await
            .expect("reservation");
        assert_eq!(record.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_full_room_aborts_without_submission() {
        let backend = FakeBackend::new(100.0, vec![room("r-1", RoomStatus::Available, 2, 2)]);
        let err = ReservationFlow::new(&backend)
            .reserve(&request())
            .await
            .expect_err("must abort");

        assert!(matches!(
            err,
            ReservationError::RoomUnavailable(AvailabilityVerdict::Full)
        ));
        assert!(err.to_string().contains("fully booked"));
        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_room_aborts_without_submission() {
        let backend = FakeBackend::new(100.0, vec![room("r-9", RoomStatus::Available, 0, 2)]);
        let err = ReservationFlow::new(&backend)
            .reserve(&request())
            .await
            .expect_err("must abort");

        assert!(matches!(
            err,
            ReservationError::RoomUnavailable(AvailabilityVerdict::NotFound)
        ));
        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_server_rejection_is_classified() {
        let backend = FakeBackend::new(100.0, vec![room("r-1", RoomStatus::Available, 1, 2)])
            .with_create_failure(ScriptedFailure::Api {
                code: ErrorCode::RoomFullyBooked,
                message: "Room A-101 is fully booked".to_string(),
            });
        let err = ReservationFlow::new(&backend)
            .reserve(&request())
            .await
            .expect_err("must fail");

        match err {
            ReservationError::Rejected(BookingRejection::RoomTaken { message }) => {
                assert!(message.contains("fully booked"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_passes_through() {
        let backend = FakeBackend::new(100.0, vec![room("r-1", RoomStatus::Available, 1, 2)])
            .with_create_failure(ScriptedFailure::Transport);
        let err = ReservationFlow::new(&backend)
            .reserve(&request())
            .await
            .expect_err("must fail");

        assert!(matches!(
            err,
            ReservationError::Client(ClientError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_legacy_message_rejection_still_classified() {
        let backend = FakeBackend::new(100.0, vec![room("r-1", RoomStatus::Available, 1, 2)])
            .with_create_failure(ScriptedFailure::Message(
                "You already have an active booking".to_string(),
            ));
        let err = ReservationFlow::new(&backend)
            .reserve(&request())
            .await
            .expect_err("must fail");

        match err {
            ReservationError::Rejected(BookingRejection::DuplicateBooking { message }) => {
                assert!(message.contains("complete or cancel"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_request_fails_without_network() {
        let backend = FakeBackend::new(100.0, vec![room("r-1", RoomStatus::Available, 1, 2)]);
        let mut req = request();
        req.check_out = req.check_in;

        let err = ReservationFlow::new(&backend)
            .reserve(&req)
            .await
            .expect_err("must fail");

        assert!(matches!(err, ReservationError::Invalid(_)));
        assert_eq!(backend.balance_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.availability_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_flow_before_network() {
        let backend = FakeBackend::new(100.0, vec![room("r-1", RoomStatus::Available, 1, 2)]);
        let token = CancellationToken::new();
        token.cancel();

        let err = ReservationFlow::new(&backend)
            .with_cancellation(token)
            .reserve(&request())
            .await
            .expect_err("must be cancelled");

        assert!(matches!(err, ReservationError::Cancelled));
        assert_eq!(backend.balance_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.availability_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 0);
    }

    /// Backend whose calls never resolve, for cancel-while-waiting tests
    struct StalledBackend;

    #[async_trait]
    impl ReservationBackend for StalledBackend {
        async fn deposit_balance(&self) -> ClientResult<DepositBalance> {
            std::future::pending().await
        }

        async fn hostel_availability(
            &self,
            _hostel_id: &str,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
        ) -> ClientResult<HostelAvailability> {
            std::future::pending().await
        }

        async fn create_booking_with_deposit(
            &self,
            _request: &BookingRequest,
        ) -> ClientResult<BookingRecord> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancel_during_step_unblocks_the_flow() {
        let backend = StalledBackend;
        let token = CancellationToken::new();
        let flow = ReservationFlow::new(&backend).with_cancellation(token.clone());

        // reserve() parks on the stalled balance call; cancelling the
        // token is the only way it can finish
        let req = request();
        let (result, _) = tokio::join!(flow.reserve(&req), async {
            token.cancel();
        });

        assert!(matches!(
            result.expect_err("must be cancelled"),
            ReservationError::Cancelled
        ));
    }
}
