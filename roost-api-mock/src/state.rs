//! In-memory state for the mock booking server
//!
//! Everything lives in concurrent maps so handlers can run without a
//! database. Per-route hit counters let tests assert exactly which
//! calls a client made.

use dashmap::DashMap;
use shared::models::{BookingRecord, DepositBalance, Gender, Room};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use uuid::Uuid;

/// A registered student account
#[derive(Debug, Clone)]
pub struct StudentAccount {
    pub id: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub gender: Option<Gender>,
}

/// A hostel that rooms belong to
#[derive(Debug, Clone)]
pub struct Hostel {
    pub id: String,
    pub name: String,
}

/// A room together with the hostel it belongs to
#[derive(Debug, Clone)]
pub struct HostelRoom {
    pub hostel_id: String,
    pub room: Room,
}

/// Per-route request counters
///
/// Incremented once per authenticated request, before any business
/// check runs, so a test can tell "never called" from "called and
/// rejected".
#[derive(Debug, Default)]
pub struct HitCounters {
    pub balance: AtomicUsize,
    pub availability: AtomicUsize,
    pub create: AtomicUsize,
}

/// Shared server state
#[derive(Debug, Default)]
pub struct AppState {
    /// user id -> account
    pub users: DashMap<String, StudentAccount>,
    /// bearer token -> user id
    pub sessions: DashMap<String, String>,
    /// user id -> deposit balance
    pub deposits: DashMap<String, DepositBalance>,
    /// hostel id -> hostel
    pub hostels: DashMap<String, Hostel>,
    /// room id -> room with its hostel
    pub rooms: DashMap<String, HostelRoom>,
    /// booking id -> record
    pub bookings: DashMap<String, BookingRecord>,
    pub hits: HitCounters,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Builder helpers for tests and seeding ==========

    /// Register a student account and return its id
    pub fn add_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        gender: Option<Gender>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        self.users.insert(
            id.clone(),
            StudentAccount {
                id: id.clone(),
                email: email.to_string(),
                password: password.to_string(),
                full_name: full_name.to_string(),
                gender,
            },
        );
        id
    }

    /// Set a student's deposit balance
    pub fn set_deposit(&self, user_id: &str, available: f64, pending: f64) {
        self.deposits.insert(
            user_id.to_string(),
            DepositBalance {
                total_balance: available + pending,
                available_balance: available,
                pending_deposits: pending,
            },
        );
    }

    /// Register a hostel
    pub fn add_hostel(&self, id: &str, name: &str) {
        self.hostels.insert(
            id.to_string(),
            Hostel {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
    }

    /// Register a room under a hostel
    pub fn add_room(&self, hostel_id: &str, room: Room) {
        self.rooms.insert(
            room.id.clone(),
            HostelRoom {
                hostel_id: hostel_id.to_string(),
                room,
            },
        );
    }

    // ========== Lookups used by handlers ==========

    /// Check credentials and return the matching user id
    pub fn authenticate(&self, email: &str, password: &str) -> Option<String> {
        self.users
            .iter()
            .find(|entry| entry.email == email && entry.password == password)
            .map(|entry| entry.id.clone())
    }

    /// Issue an opaque bearer token for a user
    pub fn issue_token(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), user_id.to_string());
        token
    }

    /// Resolve a bearer token to its account
    pub fn user_for_token(&self, token: &str) -> Option<StudentAccount> {
        let user_id = self.sessions.get(token)?.clone();
        self.users.get(&user_id).map(|entry| entry.clone())
    }

    /// Drop a session token
    pub fn revoke_token(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Find the student's active booking, if any
    pub fn active_booking_for(&self, student_id: &str) -> Option<BookingRecord> {
        self.bookings
            .iter()
            .find(|entry| entry.student_id == student_id && entry.status.is_active())
            .map(|entry| entry.clone())
    }
}

/// Build a state pre-loaded with a small demo dataset
///
/// One hostel, three rooms in different states, and two students with
/// different balances. Matches what the standalone mock binary serves.
pub fn seeded() -> Arc<AppState> {
    use shared::models::RoomStatus;

    let state = AppState::new();

    let alice = state.add_user(
        "alice@example.edu",
        "password123",
        "Alice Carter",
        Some(Gender::Female),
    );
    state.set_deposit(&alice, 100.0, 0.0);

    let ben = state.add_user(
        "ben@example.edu",
        "password123",
        "Ben Okafor",
        Some(Gender::Male),
    );
    state.set_deposit(&ben, 50.0, 0.0);

    state.add_hostel("hostel-north", "North Wing");
    state.add_room(
        "hostel-north",
        Room {
            id: "room-101".to_string(),
            room_number: "A-101".to_string(),
            status: RoomStatus::Available,
            current_occupancy: 1,
            max_occupancy: 2,
            price_per_month: 320.0,
            gender_restriction: None,
        },
    );
    state.add_room(
        "hostel-north",
        Room {
            id: "room-102".to_string(),
            room_number: "A-102".to_string(),
            status: RoomStatus::Available,
            current_occupancy: 2,
            max_occupancy: 2,
            price_per_month: 320.0,
            gender_restriction: None,
        },
    );
    state.add_room(
        "hostel-north",
        Room {
            id: "room-103".to_string(),
            room_number: "A-103".to_string(),
            status: RoomStatus::Maintenance,
            current_occupancy: 0,
            max_occupancy: 1,
            price_per_month: 450.0,
            gender_restriction: Some(Gender::Female),
        },
    );

    Arc::new(state)
}
