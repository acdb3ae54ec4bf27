//! Booking Models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::room::Gender;

/// Flat deposit fee locked against the deposit account when a booking
/// is created, in currency units
pub const BOOKING_FEE: f64 = 70.0;

/// Booking billing cadence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    #[default]
    Semester,
    Monthly,
    Weekly,
}

/// How the deposit fee is settled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    AccountCredit,
    BankTransfer,
    Cash,
}

/// Booking lifecycle status
///
/// All transitions happen server-side. The client only ever observes a
/// status through a fetch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Statuses that block the student from creating another booking
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::CheckedIn
        )
    }
}

/// Payment progress on a booking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Refunded,
    Overdue,
}

/// Emergency contact listed on a booking request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmergencyContact {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    pub relationship: String,
}

/// Booking submission payload
///
/// Constructed once per submission attempt and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_booking_request))]
pub struct BookingRequest {
    #[validate(length(min = 1))]
    pub hostel_id: String,
    #[validate(length(min = 1))]
    pub room_id: String,
    #[validate(length(min = 1))]
    pub student_name: String,
    #[validate(email)]
    pub student_email: String,
    #[validate(length(min = 1))]
    pub student_phone: String,
    /// University registration number
    #[validate(length(min = 1))]
    pub student_number: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub booking_type: BookingType,
    #[validate(nested)]
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
    /// Pay the deposit fee from the student's deposit account
    pub use_deposit: bool,
    /// Amount to lock from the deposit account, in currency units
    pub deposit_amount: f64,
    pub payment_method: PaymentMethod,
}

fn validate_booking_request(req: &BookingRequest) -> Result<(), ValidationError> {
    if req.check_out <= req.check_in {
        let mut err = ValidationError::new("invalid_stay_dates");
        err.message = Some("check-out date must be after check-in date".into());
        return Err(err);
    }
    if req.use_deposit && req.deposit_amount <= 0.0 {
        let mut err = ValidationError::new("invalid_deposit_amount");
        err.message = Some("deposit amount must be positive when paying from deposit".into());
        return Err(err);
    }
    Ok(())
}

/// Server-owned booking record
///
/// The client never mutates this directly; it only reflects server state
/// after a fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub id: String,
    pub student_id: String,
    pub hostel_id: String,
    pub room_id: String,
    pub room_number: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub booking_type: BookingType,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Total charge for the stay, in currency units
    pub total_amount: f64,
    /// Amount settled so far, in currency units
    pub amount_paid: f64,
    /// Remaining amount, in currency units
    pub amount_due: f64,
    pub created_at: DateTime<Utc>,
}
