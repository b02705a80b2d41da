use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Acknowledgments collected by the return form.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReturnChecklist {
    pub notified_key_problem: bool,
    pub had_accident: bool,
    pub cleaned_vehicle: bool,
    pub refueled_vehicle: bool,
    pub experienced_problem: bool,
    pub accept_responsibility: bool,
}

/// Typed return-form input, validated once at the boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnSubmission {
    pub booking_id: Uuid,
    pub returned_at: DateTime<Utc>,
    pub fuel_level: Option<u8>,
    pub parking_location: String,
    pub checklist: ReturnChecklist,
    pub damage_description: Option<String>,
    pub exterior_photo_id: Option<Uuid>,
    pub interior_photo_id: Option<Uuid>,
    pub dashboard_photo_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    Returned,
}

/// The immutable record of a completed vehicle return. One per booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleReturn {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_email: String,
    pub vehicle_id: i64,
    pub project_name: String,
    pub returned_at: DateTime<Utc>,
    pub fuel_level: Option<u8>,
    pub parking_location: String,
    pub checklist: ReturnChecklist,
    pub damage_description: String,
    pub exterior_photo_id: Option<Uuid>,
    pub interior_photo_id: Option<Uuid>,
    pub dashboard_photo_id: Option<Uuid>,
    pub status: ReturnStatus,
    pub created_at: DateTime<Utc>,
}

impl VehicleReturn {
    pub fn from_submission(
        submission: &ReturnSubmission,
        user_email: String,
        vehicle_id: i64,
        project_name: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id: submission.booking_id,
            user_email,
            vehicle_id,
            project_name,
            returned_at: submission.returned_at,
            fuel_level: submission.fuel_level,
            parking_location: submission.parking_location.clone(),
            checklist: submission.checklist,
            damage_description: submission.damage_description.clone().unwrap_or_default(),
            exterior_photo_id: submission.exterior_photo_id,
            interior_photo_id: submission.interior_photo_id,
            dashboard_photo_id: submission.dashboard_photo_id,
            status: ReturnStatus::Returned,
            created_at: Utc::now(),
        }
    }
}

/// Evidence and checklist requirements for an acceptable return.
///
/// `privileged_skip_checklist` controls how far an admin's exemption goes:
/// `false` keeps the checklist and fuel checks for everyone and only makes
/// photos optional (the default); `true` waives the whole policy for
/// privileged submitters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReturnPolicy {
    pub min_fuel_percent: u8,
    pub privileged_skip_checklist: bool,
}

impl Default for ReturnPolicy {
    fn default() -> Self {
        Self {
            min_fuel_percent: 75,
            privileged_skip_checklist: false,
        }
    }
}

impl ReturnPolicy {
    /// Checklist first, then fuel, then evidence; the first failure is
    /// reported with a corrective message rather than silently accepted.
    pub fn validate(
        &self,
        submission: &ReturnSubmission,
        privileged: bool,
    ) -> Result<(), ReturnError> {
        let skip_checks = privileged && self.privileged_skip_checklist;

        if !skip_checks {
            if !submission.checklist.cleaned_vehicle {
                return Err(ReturnError::ChecklistIncomplete(
                    "the vehicle must be cleaned before return",
                ));
            }
            if !submission.checklist.accept_responsibility {
                return Err(ReturnError::ChecklistIncomplete(
                    "responsibility for the trip must be acknowledged",
                ));
            }
            if let Some(level) = submission.fuel_level {
                if level > 100 {
                    return Err(ReturnError::InvalidFuelLevel(level));
                }
                if level < self.min_fuel_percent {
                    return Err(ReturnError::LowFuel {
                        level,
                        minimum: self.min_fuel_percent,
                    });
                }
            }
        }

        // Photo evidence is required from regular members only.
        if !privileged {
            if submission.exterior_photo_id.is_none() {
                return Err(ReturnError::EvidenceMissing("exterior photo"));
            }
            if submission.interior_photo_id.is_none() {
                return Err(ReturnError::EvidenceMissing("interior photo"));
            }
            if submission.dashboard_photo_id.is_none() {
                return Err(ReturnError::EvidenceMissing("dashboard photo"));
            }
        }

        Ok(())
    }
}

/// Holds return records keyed by booking, enforcing at most one per booking.
#[derive(Debug, Default)]
pub struct ReturnManager {
    returns: HashMap<Uuid, VehicleReturn>,
}

impl ReturnManager {
    pub fn new() -> Self {
        Self {
            returns: HashMap::new(),
        }
    }

    pub fn exists_for_booking(&self, booking_id: &Uuid) -> bool {
        self.returns.contains_key(booking_id)
    }

    pub fn get_for_booking(&self, booking_id: &Uuid) -> Option<&VehicleReturn> {
        self.returns.get(booking_id)
    }

    /// Record a return; a second record for the same booking is refused.
    pub fn record(&mut self, vehicle_return: VehicleReturn) -> Result<(), ReturnError> {
        if self.returns.contains_key(&vehicle_return.booking_id) {
            return Err(ReturnError::AlreadyReturned(vehicle_return.booking_id));
        }
        self.returns.insert(vehicle_return.booking_id, vehicle_return);
        Ok(())
    }

    pub fn list_for_user(&self, user_email: &str) -> Vec<VehicleReturn> {
        let mut returns: Vec<VehicleReturn> = self
            .returns
            .values()
            .filter(|r| r.user_email == user_email)
            .cloned()
            .collect();
        returns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        returns
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReturnError {
    #[error("Invalid or unconfirmed booking: {0}")]
    BookingNotFound(Uuid),

    #[error("Booking {0} is not in a returnable state")]
    BookingNotConfirmed(Uuid),

    #[error("Return already submitted for booking {0}")]
    AlreadyReturned(Uuid),

    #[error("Checklist incomplete: {0}")]
    ChecklistIncomplete(&'static str),

    #[error("Fuel level {level}% is below the required {minimum}%; refuel before returning")]
    LowFuel { level: u8, minimum: u8 },

    #[error("Fuel level {0}% is not a valid percentage")]
    InvalidFuelLevel(u8),

    #[error("Missing required evidence: {0}")]
    EvidenceMissing(&'static str),
}
