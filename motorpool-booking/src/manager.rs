use crate::models::{Booking, BookingStatus};
use std::collections::HashMap;
use uuid::Uuid;

/// Manages booking records and guards their state transitions.
#[derive(Debug, Default)]
pub struct BookingManager {
    bookings: HashMap<Uuid, Booking>,
}

impl BookingManager {
    pub fn new() -> Self {
        Self {
            bookings: HashMap::new(),
        }
    }

    pub fn insert(&mut self, booking: Booking) -> Uuid {
        let id = booking.id;
        self.bookings.insert(id, booking);
        id
    }

    pub fn get(&self, booking_id: &Uuid) -> Option<&Booking> {
        self.bookings.get(booking_id)
    }

    /// Newest-first listing for one requester.
    pub fn list_for_user(&self, user_email: &str) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .values()
            .filter(|b| b.user_email == user_email)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }

    /// A user may hold at most one booking in `{PENDING, CONFIRMED}` at a
    /// time; callers check this before invoking the allocator.
    pub fn active_booking_for(&self, user_email: &str) -> Option<&Booking> {
        self.bookings
            .values()
            .find(|b| b.user_email == user_email && b.is_active())
    }

    /// Transition: Pending -> Confirmed.
    pub fn confirm(&mut self, booking_id: &Uuid) -> Result<(), BookingError> {
        self.transition(booking_id, BookingStatus::Pending, BookingStatus::Confirmed)
    }

    /// Transition: Confirmed -> Completed, fired by an accepted return.
    pub fn complete(&mut self, booking_id: &Uuid) -> Result<(), BookingError> {
        self.transition(booking_id, BookingStatus::Confirmed, BookingStatus::Completed)
    }

    /// Cancellation escape hatch: Pending or Confirmed -> Rejected.
    pub fn reject(&mut self, booking_id: &Uuid) -> Result<(), BookingError> {
        let booking = self.get_mut(booking_id)?;

        if !booking.is_active() {
            return Err(BookingError::InvalidTransition {
                from: format!("{:?}", booking.status),
                to: "REJECTED".to_string(),
            });
        }

        booking.update_status(BookingStatus::Rejected);
        Ok(())
    }

    fn transition(
        &mut self,
        booking_id: &Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<(), BookingError> {
        let booking = self.get_mut(booking_id)?;

        if booking.status != from {
            return Err(BookingError::InvalidTransition {
                from: format!("{:?}", booking.status),
                to: format!("{:?}", to),
            });
        }

        booking.update_status(to);
        Ok(())
    }

    fn get_mut(&mut self, booking_id: &Uuid) -> Result<&mut Booking, BookingError> {
        self.bookings
            .get_mut(booking_id)
            .ok_or_else(|| BookingError::NotFound(booking_id.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
