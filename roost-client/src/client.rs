//! Roost API client
//!
//! Typed wrappers over the platform's REST endpoints. Every call goes
//! through [`HttpClient`], which attaches the session token and
//! normalizes errors.

use crate::reservation::{AvailabilityCheck, ReservationBackend, probe_listing};
use crate::{ClientConfig, ClientError, ClientResult, HttpClient, Session};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::client::{CurrentUserResponse, LoginRequest, LoginResponse};
use shared::error::ApiResponse;
use shared::models::{BookingRecord, BookingRequest, DepositBalance, HostelAvailability};

/// High-level client for the Roost booking platform
#[derive(Debug, Clone)]
pub struct RoostClient {
    http: HttpClient,
    session: Session,
}

impl RoostClient {
    /// Create a client from configuration
    ///
    /// A token present in the configuration is seeded into the session,
    /// so pre-authenticated clients work without calling `login`.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let session = Session::new();
        if let Some(token) = &config.token {
            session.set_token(token.clone());
        }
        let http = HttpClient::new(config, session.clone())?;
        Ok(Self { http, session })
    }

    /// Create a client for the given base URL with default settings
    pub fn from_url(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::new(&ClientConfig::new(base_url))
    }

    /// The session context shared by all clones of this client
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether the client currently holds a token
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // ========== Auth API ==========

    /// Login with email and password
    ///
    /// On success the returned token and user info are stored in the
    /// session and used for all subsequent requests.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let login = self
            .http
            .post::<ApiResponse<LoginResponse>, _>("api/auth/login", &request)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing login data".to_string()))?;

        self.session
            .set_login(login.token.clone(), login.user.clone());
        Ok(login)
    }

    /// Get current user information
    pub async fn me(&self) -> ClientResult<CurrentUserResponse> {
        self.http
            .get::<ApiResponse<CurrentUserResponse>>("api/auth/me")
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing user data".to_string()))
    }

    /// Logout and clear the session
    pub async fn logout(&self) -> ClientResult<()> {
        self.http
            .post_empty::<ApiResponse<()>>("api/auth/logout")
            .await?;
        self.session.clear();
        Ok(())
    }

    // ========== Deposits API ==========

    /// Fetch the current deposit balance
    ///
    /// Always a fresh read; the balance is never cached client-side.
    pub async fn deposit_balance(&self) -> ClientResult<DepositBalance> {
        self.http
            .get::<ApiResponse<DepositBalance>>("api/deposits/balance")
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing balance data".to_string()))
    }

    // ========== Bookings API ==========

    /// Fetch the availability listing for a hostel over a date range
    pub async fn hostel_availability(
        &self,
        hostel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ClientResult<HostelAvailability> {
        let path = format!(
            "api/bookings/hostel/{}/availability?checkIn={}&checkOut={}",
            hostel_id, check_in, check_out
        );
        self.http
            .get::<ApiResponse<HostelAvailability>>(&path)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing availability data".to_string()))
    }

    /// Fetch the live listing and classify one room's availability
    ///
    /// Advisory only: a fresh check narrows the window between browsing
    /// and submitting, but the create endpoint has the final word.
    pub async fn check_room(
        &self,
        hostel_id: &str,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ClientResult<AvailabilityCheck> {
        let listing = self.hostel_availability(hostel_id, check_in, check_out).await?;
        Ok(probe_listing(&listing, room_id))
    }

    /// Submit a booking, paying the deposit fee from the deposit account
    ///
    /// The server re-validates everything (duplicate booking, capacity,
    /// gender restriction, deposit coverage); a success here means the
    /// booking was actually created.
    pub async fn create_booking_with_deposit(
        &self,
        request: &BookingRequest,
    ) -> ClientResult<BookingRecord> {
        self.http
            .post::<ApiResponse<BookingRecord>, _>("api/bookings/create-with-deposit", request)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing booking data".to_string()))
    }

    /// List the current student's bookings
    pub async fn my_bookings(&self) -> ClientResult<Vec<BookingRecord>> {
        self.http
            .get::<ApiResponse<Vec<BookingRecord>>>("api/bookings/my")
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing bookings data".to_string()))
    }

    /// Cancel a booking by id
    pub async fn cancel_booking(&self, booking_id: &str) -> ClientResult<BookingRecord> {
        let path = format!("api/bookings/{}/cancel", booking_id);
        self.http
            .post_empty::<ApiResponse<BookingRecord>>(&path)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing booking data".to_string()))
    }
}

#[async_trait]
impl ReservationBackend for RoostClient {
    async fn deposit_balance(&self) -> ClientResult<DepositBalance> {
        RoostClient::deposit_balance(self).await
    }

    async fn hostel_availability(
        &self,
        hostel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ClientResult<HostelAvailability> {
        RoostClient::hostel_availability(self, hostel_id, check_in, check_out).await
    }

    async fn create_booking_with_deposit(
        &self,
        request: &BookingRequest,
    ) -> ClientResult<BookingRecord> {
        RoostClient::create_booking_with_deposit(self, request).await
    }
}
