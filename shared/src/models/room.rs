//! Room and Availability Models

use serde::{Deserialize, Serialize};

/// Room status as reported by the availability listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

/// Gender restriction applied to a room, or the gender of a student
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Per-room availability snapshot
///
/// Occupancy counts are server-owned. A room is only bookable when its
/// status is `available` AND occupancy is below capacity; an occupancy at
/// or over capacity wins over whatever the status field claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub room_number: String,
    pub status: RoomStatus,
    pub current_occupancy: u32,
    pub max_occupancy: u32,
    /// Base rate in currency units, prorated by stay length server-side
    pub price_per_month: f64,
    #[serde(default)]
    pub gender_restriction: Option<Gender>,
}

impl Room {
    /// Whether occupancy has reached capacity
    pub fn is_full(&self) -> bool {
        self.current_occupancy >= self.max_occupancy
    }

    /// Whether the room can accept a new booking right now
    pub fn is_bookable(&self) -> bool {
        self.status == RoomStatus::Available && !self.is_full()
    }
}

/// Availability listing for one hostel over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostelAvailability {
    pub hostel_id: String,
    pub hostel_name: String,
    pub check_in: chrono::NaiveDate,
    pub check_out: chrono::NaiveDate,
    pub rooms: Vec<Room>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(status: RoomStatus, occupancy: u32, capacity: u32) -> Room {
        Room {
            id: "r-1".to_string(),
            room_number: "A-101".to_string(),
            status,
            current_occupancy: occupancy,
            max_occupancy: capacity,
            price_per_month: 320.0,
            gender_restriction: None,
        }
    }

    #[test]
    fn test_is_bookable_requires_available_status_and_capacity() {
        assert!(room(RoomStatus::Available, 1, 2).is_bookable());
        assert!(!room(RoomStatus::Available, 2, 2).is_bookable());
        assert!(!room(RoomStatus::Occupied, 0, 2).is_bookable());
        assert!(!room(RoomStatus::Maintenance, 0, 2).is_bookable());
        assert!(!room(RoomStatus::Reserved, 0, 2).is_bookable());
    }

    #[test]
    fn test_is_full_beats_status() {
        // Occupancy over capacity counts as full even if the status lags
        let stale = room(RoomStatus::Available, 3, 2);
        assert!(stale.is_full());
        assert!(!stale.is_bookable());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&RoomStatus::Maintenance).expect("serialize");
        assert_eq!(json, "\"maintenance\"");
        let status: RoomStatus = serde_json::from_str("\"available\"").expect("deserialize");
        assert_eq!(status, RoomStatus::Available);
    }
}
