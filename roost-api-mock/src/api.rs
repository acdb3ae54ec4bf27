//! HTTP handlers for the mock booking server
//!
//! Every endpoint speaks the same response envelope the real API uses.
//! The create endpoint re-runs every business check and is the only
//! place a room slot or deposit hold actually changes, so concurrent
//! clients racing for the last slot are serialized here.

use crate::state::{AppState, StudentAccount};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    http::header::AUTHORIZATION,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::client::{CurrentUserResponse, LoginRequest, LoginResponse, UserInfo};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{
    BOOKING_FEE, BookingRecord, BookingRequest, BookingStatus, DepositBalance, HostelAvailability,
    PaymentStatus, Room, RoomStatus,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use validator::Validate;

// ========== Health ==========

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ========== Auth helpers ==========

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Resolve the request's bearer token to a student account
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<StudentAccount, AppError> {
    let token = bearer_token(headers).ok_or_else(AppError::not_authenticated)?;
    state
        .user_for_token(token)
        .ok_or_else(|| AppError::invalid_token("Session token is not valid"))
}

fn user_info(account: &StudentAccount) -> UserInfo {
    UserInfo {
        id: account.id.clone(),
        email: account.email.clone(),
        full_name: account.full_name.clone(),
        role: "student".to_string(),
        gender: account.gender,
    }
}

// ========== Auth API ==========

/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let user_id = state
        .authenticate(&req.email, &req.password)
        .ok_or_else(AppError::invalid_credentials)?;
    let account = state
        .users
        .get(&user_id)
        .map(|entry| entry.clone())
        .ok_or_else(|| AppError::internal("Account disappeared during login"))?;

    let token = state.issue_token(&user_id);
    tracing::info!(user_id = %user_id, "Login successful");

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        user: user_info(&account),
    })))
}

/// GET /api/auth/me
async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<CurrentUserResponse>>> {
    let account = authenticate(&state, &headers)?;
    Ok(Json(ApiResponse::success(CurrentUserResponse {
        id: account.id.clone(),
        email: account.email.clone(),
        full_name: account.full_name.clone(),
        role: "student".to_string(),
        gender: account.gender,
    })))
}

/// POST /api/auth/logout
async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<()>>> {
    authenticate(&state, &headers)?;
    if let Some(token) = bearer_token(&headers) {
        state.revoke_token(token);
    }
    Ok(Json(ApiResponse::ok()))
}

// ========== Deposits API ==========

/// GET /api/deposits/balance
async fn deposit_balance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<DepositBalance>>> {
    let account = authenticate(&state, &headers)?;
    state.hits.balance.fetch_add(1, Ordering::SeqCst);

    let balance = state
        .deposits
        .get(&account.id)
        .map(|entry| *entry)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::DepositAccountNotFound,
                "No deposit account on file",
            )
        })?;

    Ok(Json(ApiResponse::success(balance)))
}

// ========== Bookings API ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityQuery {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

/// GET /api/bookings/hostel/{hostel_id}/availability
async fn hostel_availability(
    State(state): State<Arc<AppState>>,
    Path(hostel_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<HostelAvailability>>> {
    authenticate(&state, &headers)?;
    state.hits.availability.fetch_add(1, Ordering::SeqCst);

    if query.check_out <= query.check_in {
        return Err(AppError::invalid_stay_dates());
    }
    let hostel = state
        .hostels
        .get(&hostel_id)
        .map(|entry| entry.clone())
        .ok_or_else(|| AppError::hostel_not_found(&hostel_id))?;

    let mut rooms: Vec<Room> = state
        .rooms
        .iter()
        .filter(|entry| entry.hostel_id == hostel_id)
        .map(|entry| entry.room.clone())
        .collect();
    rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));

    Ok(Json(ApiResponse::success(HostelAvailability {
        hostel_id,
        hostel_name: hostel.name,
        check_in: query.check_in,
        check_out: query.check_out,
        rooms,
    })))
}

/// POST /api/bookings/create-with-deposit
///
/// The authoritative path. Checks run in a fixed order so clients get
/// stable error codes: request shape, duplicate booking, capacity,
/// room state, gender restriction, then deposit funds. The student's
/// deposit entry guard is held from the duplicate check through the
/// booking append, with the room entry guard nested inside it, so
/// racing requests cannot double-book a student or oversell a room.
/// Lock order is deposits, then rooms, then bookings, shared with
/// cancel.
async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<BookingRequest>,
) -> AppResult<Json<ApiResponse<BookingRecord>>> {
    let account = authenticate(&state, &headers)?;
    state.hits.create.fetch_add(1, Ordering::SeqCst);

    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    if !request.use_deposit {
        return Err(AppError::invalid_request(
            "This endpoint only accepts deposit-funded bookings",
        ));
    }
    if request.deposit_amount < BOOKING_FEE {
        return Err(AppError::invalid_request(format!(
            "Deposit amount must cover the {:.2} booking fee",
            BOOKING_FEE
        )));
    }

    let nights = (request.check_out - request.check_in).num_days();
    let months = (nights as f64 / 30.0).ceil().max(1.0);

    // Per-student serialization point: the duplicate check, the funds
    // move, and the booking append all run while this guard is held.
    let mut balance = state.deposits.get_mut(&account.id).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::DepositAccountNotFound,
            "No deposit account on file",
        )
    })?;

    if state.active_booking_for(&account.id).is_some() {
        return Err(AppError::duplicate_active_booking());
    }

    let (room_number, total_amount) = {
        let mut entry = state
            .rooms
            .get_mut(&request.room_id)
            .ok_or_else(|| AppError::room_not_found(&request.room_id))?;
        if entry.hostel_id != request.hostel_id {
            return Err(AppError::room_not_found(&request.room_id));
        }

        // Capacity wins over the status label, matching the probe
        if entry.room.is_full() {
            return Err(AppError::room_fully_booked(entry.room.room_number.clone()));
        }
        match entry.room.status {
            RoomStatus::Available => {}
            RoomStatus::Maintenance => {
                return Err(AppError::with_message(
                    ErrorCode::RoomUnderMaintenance,
                    format!("Room {} is under maintenance", entry.room.room_number),
                ));
            }
            RoomStatus::Occupied | RoomStatus::Reserved => {
                return Err(AppError::with_message(
                    ErrorCode::RoomUnavailable,
                    format!("Room {} is no longer available", entry.room.room_number),
                ));
            }
        }
        if let Some(required) = entry.room.gender_restriction {
            if account.gender != Some(required) {
                return Err(AppError::gender_restricted());
            }
        }

        // Hold the fee before taking the slot; both move under the
        // held guards
        if balance.available_balance < request.deposit_amount {
            return Err(AppError::insufficient_deposit(
                balance.available_balance,
                request.deposit_amount,
            ));
        }
        balance.available_balance -= request.deposit_amount;
        balance.pending_deposits += request.deposit_amount;

        entry.room.current_occupancy += 1;
        if entry.room.is_full() {
            entry.room.status = RoomStatus::Occupied;
        }
        (
            entry.room.room_number.clone(),
            entry.room.price_per_month * months,
        )
    };

    let record = BookingRecord {
        id: Uuid::new_v4().to_string(),
        student_id: account.id.clone(),
        hostel_id: request.hostel_id.clone(),
        room_id: request.room_id.clone(),
        room_number,
        check_in: request.check_in,
        check_out: request.check_out,
        booking_type: request.booking_type,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Partial,
        total_amount,
        amount_paid: request.deposit_amount,
        amount_due: total_amount - request.deposit_amount,
        created_at: Utc::now(),
    };
    state.bookings.insert(record.id.clone(), record.clone());
    drop(balance);

    tracing::info!(
        booking_id = %record.id,
        student_id = %account.id,
        room_id = %record.room_id,
        "Booking created"
    );
    Ok(Json(ApiResponse::success(record)))
}

/// GET /api/bookings/my
async fn my_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<Vec<BookingRecord>>>> {
    let account = authenticate(&state, &headers)?;

    let mut bookings: Vec<BookingRecord> = state
        .bookings
        .iter()
        .filter(|entry| entry.student_id == account.id)
        .map(|entry| entry.clone())
        .collect();
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ApiResponse::success(bookings)))
}

/// POST /api/bookings/{booking_id}/cancel
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<BookingRecord>>> {
    let account = authenticate(&state, &headers)?;

    let booking = state
        .bookings
        .get(&booking_id)
        .map(|entry| entry.clone())
        .ok_or_else(|| AppError::booking_not_found(&booking_id))?;
    if booking.student_id != account.id {
        return Err(AppError::permission_denied(
            "You can only cancel your own bookings",
        ));
    }
    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::with_message(
            ErrorCode::BookingAlreadyCancelled,
            format!("Booking {} is already cancelled", booking_id),
        ));
    }
    if !booking.status.is_active() {
        return Err(AppError::with_message(
            ErrorCode::BookingNotCancellable,
            format!("Booking {} can no longer be cancelled", booking_id),
        ));
    }

    // Same lock order as create: deposits, then rooms, then bookings.
    // The status flip happens under the booking entry guard, so two
    // racing cancels cannot both free the slot and release the fee.
    let mut balance = state.deposits.get_mut(&account.id);
    let mut room = state.rooms.get_mut(&booking.room_id);
    let mut record = state
        .bookings
        .get_mut(&booking_id)
        .ok_or_else(|| AppError::booking_not_found(&booking_id))?;
    if record.status == BookingStatus::Cancelled {
        return Err(AppError::with_message(
            ErrorCode::BookingAlreadyCancelled,
            format!("Booking {} is already cancelled", booking_id),
        ));
    }

    record.status = BookingStatus::Cancelled;
    record.payment_status = PaymentStatus::Refunded;

    // Free the slot
    if let Some(entry) = room.as_mut() {
        entry.room.current_occupancy = entry.room.current_occupancy.saturating_sub(1);
        if entry.room.status == RoomStatus::Occupied && !entry.room.is_full() {
            entry.room.status = RoomStatus::Available;
        }
    }
    // Release the held fee
    if let Some(balance) = balance.as_mut() {
        balance.pending_deposits -= record.amount_paid;
        balance.available_balance += record.amount_paid;
    }
    let cancelled = record.clone();

    tracing::info!(booking_id = %booking_id, "Booking cancelled");
    Ok(Json(ApiResponse::success(cancelled)))
}

/// Build the mock API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .route("/api/deposits/balance", get(deposit_balance))
        .route(
            "/api/bookings/hostel/{hostel_id}/availability",
            get(hostel_availability),
        )
        .route("/api/bookings/create-with-deposit", post(create_booking))
        .route("/api/bookings/my", get(my_bookings))
        .route("/api/bookings/{booking_id}/cancel", post(cancel_booking))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
