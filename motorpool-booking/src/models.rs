use chrono::{DateTime, Utc};
use motorpool_shared::TimeSlot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking status in the lifecycle. `Completed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Completed,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Rejected)
    }
}

/// One reservation of one vehicle for one time slot. Append-only: bookings
/// are never physically deleted, only transitioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_email: String,
    pub project_name: String,
    pub site_name: String,
    pub site_address: String,
    pub trip_purpose: String,
    pub vehicle_count: u32,
    pub within_range: bool,
    pub slot: TimeSlot,
    pub vehicle_id: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Descriptive trip fields supplied by the requester; the slot and the
/// assigned vehicle come from the allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripDetails {
    pub project_name: String,
    pub site_name: String,
    pub site_address: String,
    pub trip_purpose: String,
    pub vehicle_count: u32,
    pub within_range: bool,
}

impl Booking {
    /// A booking comes into existence already `Confirmed`: allocation
    /// succeeding synchronously is the confirmation, there is no separate
    /// human-approval step for bookings.
    pub fn confirmed(
        user_email: String,
        details: TripDetails,
        slot: TimeSlot,
        vehicle_id: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_email,
            project_name: details.project_name,
            site_name: details.site_name,
            site_address: details.site_address,
            trip_purpose: details.trip_purpose,
            vehicle_count: details.vehicle_count,
            within_range: details.within_range,
            slot,
            vehicle_id,
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}
