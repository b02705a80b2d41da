use crate::app_config::Config;
use crate::blob::{BlobError, EvidenceStore};
use chrono::{DateTime, NaiveDate, Utc};
use motorpool_booking::models::TripDetails;
use motorpool_booking::{
    Booking, BookingError, BookingManager, BookingStatus, ReturnError, ReturnManager,
    ReturnPolicy, ReturnSubmission, VehicleReturn,
};
use motorpool_driver::{
    DirectoryError, DriverApplication, ResubmissionPolicy, ReviewDecision, SubmissionOutcome,
    User, UserDirectory, UserStatus,
};
use motorpool_fleet::{AllocationError, FleetRegistry, Vehicle};
use motorpool_shared::{RequestContext, Role, TimeSlot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Policy knobs the engine is instantiated with; see `PolicyConfig`.
#[derive(Debug, Clone, Copy)]
pub struct EnginePolicies {
    pub return_policy: ReturnPolicy,
    pub resubmission: ResubmissionPolicy,
}

impl Default for EnginePolicies {
    fn default() -> Self {
        Self {
            return_policy: ReturnPolicy::default(),
            resubmission: ResubmissionPolicy::ResetAlways,
        }
    }
}

/// Typed booking-request body, validated before it reaches the allocator.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub project_name: String,
    pub site_name: String,
    pub site_address: String,
    pub trip_purpose: String,
    pub vehicle_count: u32,
    #[serde(default)]
    pub within_range: bool,
    pub pickup: DateTime<Utc>,
    pub return_by: DateTime<Utc>,
}

/// Typed driver-application body; `submitted_at` is stamped by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverApplicationRequest {
    pub full_name: String,
    pub license_number: String,
    pub license_state: String,
    pub phone_number: String,
    pub project: String,
    pub license_expiry: NaiveDate,
    pub date_of_birth: NaiveDate,
    pub driving_points: u32,
    pub safety_training_date: NaiveDate,
    #[serde(default)]
    pub evidence: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewRequest {
    pub email: String,
    pub decision: ReviewDecision,
}

/// The resource-allocation and lifecycle-consistency engine.
///
/// Owns all shared state behind its own locks. The fleet registry sits
/// behind a single mutex so the allocator's check-then-commit is one
/// critical section across concurrent requests; a read-pick-write sequence
/// without it could hand the same vehicle to two overlapping bookings.
pub struct ReservationEngine {
    fleet: Mutex<FleetRegistry>,
    bookings: RwLock<BookingManager>,
    returns: RwLock<ReturnManager>,
    users: RwLock<UserDirectory>,
    evidence: Arc<dyn EvidenceStore>,
    policies: EnginePolicies,
}

impl ReservationEngine {
    pub fn new(
        vehicle_ids: impl IntoIterator<Item = i64>,
        policies: EnginePolicies,
        evidence: Arc<dyn EvidenceStore>,
    ) -> Self {
        Self {
            fleet: Mutex::new(FleetRegistry::provision(vehicle_ids)),
            bookings: RwLock::new(BookingManager::new()),
            returns: RwLock::new(ReturnManager::new()),
            users: RwLock::new(UserDirectory::new()),
            evidence,
            policies,
        }
    }

    pub fn from_config(config: &Config, evidence: Arc<dyn EvidenceStore>) -> Self {
        Self::new(
            config.fleet.vehicle_ids.iter().copied(),
            EnginePolicies {
                return_policy: ReturnPolicy {
                    min_fuel_percent: config.policy.min_fuel_percent,
                    privileged_skip_checklist: config.policy.privileged_skip_checklist,
                },
                resubmission: config.policy.resubmission,
            },
            evidence,
        )
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// First contact with the system; member records start NOT_SUBMITTED.
    pub async fn register_user(
        &self,
        email: &str,
        uid: u64,
        role: Role,
    ) -> Result<User, EngineError> {
        if email.trim().is_empty() {
            return Err(EngineError::MissingField("email"));
        }
        if !(100_000_000..=999_999_999).contains(&uid) {
            return Err(EngineError::InvalidUid);
        }
        let mut users = self.users.write().await;
        let user = users.register(email, uid, role)?;
        Ok(user.clone())
    }

    pub async fn user_status(&self, email: &str) -> Option<UserStatus> {
        self.users.read().await.get(email).map(|u| u.status)
    }

    // ------------------------------------------------------------------
    // Driver applications
    // ------------------------------------------------------------------

    pub async fn submit_driver_application(
        &self,
        ctx: &RequestContext,
        request: DriverApplicationRequest,
    ) -> Result<SubmissionOutcome, EngineError> {
        require_text(&request.full_name, "full_name")?;
        require_text(&request.license_number, "license_number")?;
        require_text(&request.license_state, "license_state")?;
        require_text(&request.phone_number, "phone_number")?;
        require_text(&request.project, "project")?;

        for blob_id in &request.evidence {
            if !self.evidence.contains(*blob_id).await? {
                return Err(EngineError::UnknownEvidence(*blob_id));
            }
        }

        let now = Utc::now();
        let application = DriverApplication {
            full_name: request.full_name,
            license_number: request.license_number,
            license_state: request.license_state,
            phone_number: request.phone_number,
            project: request.project,
            license_expiry: request.license_expiry,
            date_of_birth: request.date_of_birth,
            driving_points: request.driving_points,
            safety_training_date: request.safety_training_date,
            evidence: request.evidence,
            submitted_at: now,
        };

        let mut users = self.users.write().await;
        let outcome =
            users.submit_application(&ctx.email, application, now, self.policies.resubmission)?;
        Ok(outcome)
    }

    pub async fn review_application(
        &self,
        ctx: &RequestContext,
        request: ReviewRequest,
    ) -> Result<UserStatus, EngineError> {
        if !ctx.role.is_privileged() {
            return Err(EngineError::NotPrivileged);
        }
        let mut users = self.users.write().await;
        let status = users.review(&request.email, request.decision)?;
        tracing::info!(
            reviewer = %ctx.email,
            subject = %request.email,
            ?status,
            "application reviewed"
        );
        Ok(status)
    }

    pub async fn pending_applications(&self, ctx: &RequestContext) -> Result<Vec<User>, EngineError> {
        if !ctx.role.is_privileged() {
            return Err(EngineError::NotPrivileged);
        }
        let users = self.users.read().await;
        Ok(users.pending_applications().into_iter().cloned().collect())
    }

    // ------------------------------------------------------------------
    // Bookings
    // ------------------------------------------------------------------

    /// Allocate a vehicle for the requested slot and record the booking.
    /// Only APPROVED drivers with no other active booking may book.
    pub async fn create_booking(
        &self,
        ctx: &RequestContext,
        request: CreateBookingRequest,
    ) -> Result<Booking, EngineError> {
        require_text(&request.project_name, "project_name")?;
        require_text(&request.site_name, "site_name")?;
        require_text(&request.site_address, "site_address")?;
        require_text(&request.trip_purpose, "trip_purpose")?;
        if request.vehicle_count == 0 {
            return Err(EngineError::MissingField("vehicle_count"));
        }

        if !self.users.read().await.is_approved(&ctx.email) {
            return Err(EngineError::NotApproved);
        }

        // Business rule, enforced here (the caller of the allocator), not
        // inside the allocator itself. The bookings write lock is held from
        // this check through the insert; two concurrent requests from the
        // same user must not both observe "no active booking".
        let mut bookings = self.bookings.write().await;
        if bookings.active_booking_for(&ctx.email).is_some() {
            return Err(EngineError::ActiveBookingExists);
        }

        let slot = TimeSlot::new(request.pickup, request.return_by);
        let vehicle_id = self.fleet.lock().await.allocate(slot)?;

        let booking = Booking::confirmed(
            ctx.email.clone(),
            TripDetails {
                project_name: request.project_name,
                site_name: request.site_name,
                site_address: request.site_address,
                trip_purpose: request.trip_purpose,
                vehicle_count: request.vehicle_count,
                within_range: request.within_range,
            },
            slot,
            vehicle_id,
        );
        tracing::info!(booking_id = %booking.id, vehicle_id, user = %ctx.email, "booking confirmed");

        bookings.insert(booking.clone());
        Ok(booking)
    }

    pub async fn bookings_for(&self, ctx: &RequestContext) -> Vec<Booking> {
        self.bookings.read().await.list_for_user(&ctx.email)
    }

    pub async fn get_booking(&self, ctx: &RequestContext, booking_id: Uuid) -> Option<Booking> {
        self.bookings
            .read()
            .await
            .get(&booking_id)
            .filter(|b| b.user_email == ctx.email || ctx.role.is_privileged())
            .cloned()
    }

    /// Cancellation escape hatch: rejects the booking and releases the
    /// vehicle's committed interval.
    pub async fn cancel_booking(
        &self,
        ctx: &RequestContext,
        booking_id: Uuid,
    ) -> Result<Booking, EngineError> {
        let mut bookings = self.bookings.write().await;
        let owned = bookings
            .get(&booking_id)
            .is_some_and(|b| b.user_email == ctx.email || ctx.role.is_privileged());
        if !owned {
            return Err(EngineError::Booking(BookingError::NotFound(
                booking_id.to_string(),
            )));
        }

        bookings.reject(&booking_id)?;
        let booking = bookings.get(&booking_id).cloned().ok_or_else(|| {
            EngineError::Booking(BookingError::NotFound(booking_id.to_string()))
        })?;
        drop(bookings);

        self.fleet
            .lock()
            .await
            .release(booking.vehicle_id, &booking.slot);
        Ok(booking)
    }

    // ------------------------------------------------------------------
    // Returns
    // ------------------------------------------------------------------

    /// Validate and record a vehicle return, complete the booking, and give
    /// the committed interval back to the registry.
    ///
    /// The returns write lock is held across the whole sequence; it is the
    /// idempotence barrier that makes a duplicate submission fail with
    /// `AlreadyReturned` instead of double-releasing the vehicle.
    pub async fn submit_return(
        &self,
        ctx: &RequestContext,
        submission: ReturnSubmission,
    ) -> Result<VehicleReturn, EngineError> {
        require_text(&submission.parking_location, "parking_location")?;

        let privileged = ctx.role.is_privileged();
        let mut returns = self.returns.write().await;

        if returns.exists_for_booking(&submission.booking_id) {
            return Err(EngineError::Return(ReturnError::AlreadyReturned(
                submission.booking_id,
            )));
        }

        let booking = self
            .bookings
            .read()
            .await
            .get(&submission.booking_id)
            .filter(|b| b.user_email == ctx.email)
            .cloned()
            .ok_or(EngineError::Return(ReturnError::BookingNotFound(
                submission.booking_id,
            )))?;

        if booking.status != BookingStatus::Confirmed {
            return Err(EngineError::Return(ReturnError::BookingNotConfirmed(
                submission.booking_id,
            )));
        }

        self.policies
            .return_policy
            .validate(&submission, privileged)?;

        for blob_id in [
            submission.exterior_photo_id,
            submission.interior_photo_id,
            submission.dashboard_photo_id,
        ]
        .into_iter()
        .flatten()
        {
            if !self.evidence.contains(blob_id).await? {
                return Err(EngineError::UnknownEvidence(blob_id));
            }
        }

        self.bookings.write().await.complete(&submission.booking_id)?;

        let record = VehicleReturn::from_submission(
            &submission,
            booking.user_email.clone(),
            booking.vehicle_id,
            booking.project_name.clone(),
        );
        returns.record(record.clone())?;

        self.fleet
            .lock()
            .await
            .release(booking.vehicle_id, &booking.slot);

        tracing::info!(
            booking_id = %submission.booking_id,
            vehicle_id = booking.vehicle_id,
            "vehicle returned"
        );
        Ok(record)
    }

    pub async fn returns_for(&self, ctx: &RequestContext) -> Vec<VehicleReturn> {
        self.returns.read().await.list_for_user(&ctx.email)
    }

    // ------------------------------------------------------------------
    // Fleet
    // ------------------------------------------------------------------

    /// Current committed schedule per vehicle, for the schedule view.
    pub async fn fleet_snapshot(&self) -> Vec<Vehicle> {
        self.fleet.lock().await.vehicles().cloned().collect()
    }
}

fn require_text(value: &str, field: &'static str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::MissingField(field));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("University id must be nine digits")]
    InvalidUid,

    #[error("Your account is not approved to book a vehicle")]
    NotApproved,

    #[error("An active booking already exists for this account")]
    ActiveBookingExists,

    #[error("Admin access required")]
    NotPrivileged,

    #[error("Unknown evidence reference: {0}")]
    UnknownEvidence(Uuid),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Return(#[from] ReturnError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Blob(#[from] BlobError),
}
