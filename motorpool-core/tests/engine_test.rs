use chrono::{DateTime, Duration, TimeZone, Utc};
use motorpool_booking::{BookingStatus, ReturnChecklist, ReturnError, ReturnSubmission};
use motorpool_core::{
    CreateBookingRequest, DriverApplicationRequest, EngineError, EnginePolicies, EvidenceStore,
    MemoryEvidenceStore, ReservationEngine, ReviewRequest,
};
use motorpool_driver::{ReviewDecision, UserStatus};
use motorpool_fleet::AllocationError;
use motorpool_shared::{RequestContext, Role};
use std::sync::Arc;
use uuid::Uuid;

fn engine_with_fleet(vehicle_ids: &[i64]) -> (ReservationEngine, Arc<MemoryEvidenceStore>) {
    let evidence = Arc::new(MemoryEvidenceStore::new());
    let engine = ReservationEngine::new(
        vehicle_ids.iter().copied(),
        EnginePolicies::default(),
        evidence.clone(),
    );
    (engine, evidence)
}

fn eligible_application() -> DriverApplicationRequest {
    let now = Utc::now();
    DriverApplicationRequest {
        full_name: "Jordan Rivera".to_string(),
        license_number: "D1234567".to_string(),
        license_state: "CA".to_string(),
        phone_number: "310-555-0175".to_string(),
        project: "Habitat Build".to_string(),
        license_expiry: (now + Duration::days(183)).date_naive(),
        date_of_birth: (now - Duration::days(365 * 22)).date_naive(),
        driving_points: 0,
        safety_training_date: (now - Duration::days(365)).date_naive(),
        evidence: vec![],
    }
}

async fn approved_member(engine: &ReservationEngine, email: &str) -> RequestContext {
    let ctx = RequestContext::member(email);
    engine
        .register_user(email, 123_456_789, Role::Member)
        .await
        .unwrap();
    let outcome = engine
        .submit_driver_application(&ctx, eligible_application())
        .await
        .unwrap();
    assert_eq!(outcome.status, UserStatus::Approved);
    ctx
}

fn monday(start_hour: u32, end_hour: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2025, 9, 1, start_hour, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 9, 1, end_hour, 0, 0).unwrap(),
    )
}

fn booking_request(start_hour: u32, end_hour: u32) -> CreateBookingRequest {
    let (pickup, return_by) = monday(start_hour, end_hour);
    CreateBookingRequest {
        project_name: "Habitat Build".to_string(),
        site_name: "Riverside Site".to_string(),
        site_address: "100 Main St".to_string(),
        trip_purpose: "Weekly volunteer trip".to_string(),
        vehicle_count: 1,
        within_range: true,
        pickup,
        return_by,
    }
}

async fn submission_with_photos(
    evidence: &MemoryEvidenceStore,
    booking_id: Uuid,
) -> ReturnSubmission {
    ReturnSubmission {
        booking_id,
        returned_at: Utc::now(),
        fuel_level: Some(90),
        parking_location: "Lot 9, row C".to_string(),
        checklist: ReturnChecklist {
            cleaned_vehicle: true,
            accept_responsibility: true,
            refueled_vehicle: true,
            ..Default::default()
        },
        damage_description: None,
        exterior_photo_id: Some(evidence.put(vec![1]).await.unwrap()),
        interior_photo_id: Some(evidence.put(vec![2]).await.unwrap()),
        dashboard_photo_id: Some(evidence.put(vec![3]).await.unwrap()),
    }
}

#[tokio::test]
async fn approved_driver_books_a_vehicle() {
    let (engine, _) = engine_with_fleet(&[4116, 4367]);
    let ctx = approved_member(&engine, "driver@example.edu").await;

    let booking = engine.create_booking(&ctx, booking_request(10, 12)).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert!([4116, 4367].contains(&booking.vehicle_id));
    assert_eq!(engine.bookings_for(&ctx).await.len(), 1);
}

#[tokio::test]
async fn unapproved_user_cannot_book() {
    let (engine, _) = engine_with_fleet(&[4116]);
    let ctx = RequestContext::member("stranger@example.edu");
    engine
        .register_user(&ctx.email, 123_456_789, Role::Member)
        .await
        .unwrap();

    let err = engine
        .create_booking(&ctx, booking_request(10, 12))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotApproved));
}

#[tokio::test]
async fn one_active_booking_per_user() {
    let (engine, _) = engine_with_fleet(&[4116, 4367]);
    let ctx = approved_member(&engine, "driver@example.edu").await;

    engine.create_booking(&ctx, booking_request(10, 12)).await.unwrap();
    let err = engine
        .create_booking(&ctx, booking_request(14, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ActiveBookingExists));
}

#[tokio::test]
async fn inverted_interval_is_rejected() {
    let (engine, _) = engine_with_fleet(&[4116]);
    let ctx = approved_member(&engine, "driver@example.edu").await;

    let err = engine
        .create_booking(&ctx, booking_request(12, 10))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Allocation(AllocationError::InvalidSlot)
    ));
}

#[tokio::test]
async fn overlapping_requests_spread_then_reuse() {
    // Fleet of two: A gets one vehicle, overlapping B gets the other, and
    // C's later window reuses the first vehicle.
    let (engine, _) = engine_with_fleet(&[1, 2]);
    let a = approved_member(&engine, "a@example.edu").await;
    let b = approved_member(&engine, "b@example.edu").await;
    let c = approved_member(&engine, "c@example.edu").await;

    let booking_a = engine.create_booking(&a, booking_request(10, 12)).await.unwrap();
    assert_eq!(booking_a.vehicle_id, 1);

    let booking_b = engine.create_booking(&b, booking_request(11, 13)).await.unwrap();
    assert_eq!(booking_b.vehicle_id, 2);

    let booking_c = engine.create_booking(&c, booking_request(14, 15)).await.unwrap();
    assert_eq!(booking_c.vehicle_id, 1);
}

#[tokio::test]
async fn booking_fails_when_fleet_exhausted() {
    let (engine, _) = engine_with_fleet(&[1]);
    let a = approved_member(&engine, "a@example.edu").await;
    let b = approved_member(&engine, "b@example.edu").await;

    engine.create_booking(&a, booking_request(10, 12)).await.unwrap();
    let err = engine
        .create_booking(&b, booking_request(11, 13))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Allocation(AllocationError::NoVehicleAvailable)
    ));
}

#[tokio::test]
async fn return_completes_booking_and_releases_vehicle_once() {
    let (engine, evidence) = engine_with_fleet(&[4116]);
    let ctx = approved_member(&engine, "driver@example.edu").await;

    let booking = engine.create_booking(&ctx, booking_request(10, 12)).await.unwrap();
    let submission = submission_with_photos(&evidence, booking.id).await;

    let record = engine.submit_return(&ctx, submission.clone()).await.unwrap();
    assert_eq!(record.vehicle_id, 4116);
    assert_eq!(record.project_name, "Habitat Build");

    let bookings = engine.bookings_for(&ctx).await;
    assert_eq!(bookings[0].status, BookingStatus::Completed);

    // Committed interval released exactly once.
    let snapshot = engine.fleet_snapshot().await;
    assert!(snapshot.iter().all(|v| v.busy.is_empty()));

    // Resubmission fails instead of overwriting or double-releasing.
    let err = engine.submit_return(&ctx, submission).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Return(ReturnError::AlreadyReturned(_))
    ));
    assert_eq!(engine.returns_for(&ctx).await.len(), 1);
}

#[tokio::test]
async fn returned_slot_is_bookable_again() {
    let (engine, evidence) = engine_with_fleet(&[4116]);
    let first = approved_member(&engine, "first@example.edu").await;
    let second = approved_member(&engine, "second@example.edu").await;

    let booking = engine.create_booking(&first, booking_request(10, 12)).await.unwrap();
    let submission = submission_with_photos(&evidence, booking.id).await;
    engine.submit_return(&first, submission).await.unwrap();

    // The exact same window allocates again after release.
    let rebooked = engine.create_booking(&second, booking_request(10, 12)).await.unwrap();
    assert_eq!(rebooked.vehicle_id, 4116);
}

#[tokio::test]
async fn low_fuel_return_is_rejected_with_corrective_error() {
    let (engine, evidence) = engine_with_fleet(&[4116]);
    let ctx = approved_member(&engine, "driver@example.edu").await;

    let booking = engine.create_booking(&ctx, booking_request(10, 12)).await.unwrap();
    let mut submission = submission_with_photos(&evidence, booking.id).await;
    submission.fuel_level = Some(30);

    let err = engine.submit_return(&ctx, submission).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Return(ReturnError::LowFuel { level: 30, minimum: 75 })
    ));

    // Booking untouched, interval still committed.
    assert_eq!(engine.bookings_for(&ctx).await[0].status, BookingStatus::Confirmed);
    assert_eq!(engine.fleet_snapshot().await[0].busy.len(), 1);
}

#[tokio::test]
async fn return_rejects_dangling_evidence_ref() {
    let (engine, evidence) = engine_with_fleet(&[4116]);
    let ctx = approved_member(&engine, "driver@example.edu").await;

    let booking = engine.create_booking(&ctx, booking_request(10, 12)).await.unwrap();
    let mut submission = submission_with_photos(&evidence, booking.id).await;
    submission.dashboard_photo_id = Some(Uuid::new_v4());

    let err = engine.submit_return(&ctx, submission).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownEvidence(_)));
}

#[tokio::test]
async fn return_requires_confirmed_booking_of_the_submitter() {
    let (engine, evidence) = engine_with_fleet(&[4116]);
    let owner = approved_member(&engine, "owner@example.edu").await;
    let other = approved_member(&engine, "other@example.edu").await;

    let booking = engine.create_booking(&owner, booking_request(10, 12)).await.unwrap();
    let submission = submission_with_photos(&evidence, booking.id).await;

    let err = engine.submit_return(&other, submission.clone()).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Return(ReturnError::BookingNotFound(_))
    ));

    let mut missing = submission;
    missing.booking_id = Uuid::new_v4();
    let err = engine.submit_return(&owner, missing).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Return(ReturnError::BookingNotFound(_))
    ));
}

#[tokio::test]
async fn cancellation_releases_the_vehicle() {
    let (engine, evidence) = engine_with_fleet(&[4116]);
    let ctx = approved_member(&engine, "driver@example.edu").await;

    let booking = engine.create_booking(&ctx, booking_request(10, 12)).await.unwrap();
    let cancelled = engine.cancel_booking(&ctx, booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Rejected);
    assert!(engine.fleet_snapshot().await[0].busy.is_empty());

    // Terminal: a return against the rejected booking is refused.
    let submission = submission_with_photos(&evidence, booking.id).await;
    let err = engine.submit_return(&ctx, submission).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Return(ReturnError::BookingNotConfirmed(_))
    ));
}

#[tokio::test]
async fn manual_review_gates_booking() {
    let (engine, _) = engine_with_fleet(&[4116]);
    let admin = RequestContext::admin("fleet@example.edu");
    let ctx = RequestContext::member("pending@example.edu");
    engine
        .register_user(&ctx.email, 987_654_321, Role::Member)
        .await
        .unwrap();

    // Out-of-state license: no auto-approval.
    let mut application = eligible_application();
    application.license_state = "NV".to_string();
    let outcome = engine
        .submit_driver_application(&ctx, application)
        .await
        .unwrap();
    assert_eq!(outcome.status, UserStatus::Pending);
    assert!(!outcome.auto_approved);

    let err = engine
        .create_booking(&ctx, booking_request(10, 12))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotApproved));

    // A member cannot review; the admin can.
    let review = ReviewRequest {
        email: ctx.email.clone(),
        decision: ReviewDecision::Approve,
    };
    let err = engine.review_application(&ctx, review.clone()).await.unwrap_err();
    assert!(matches!(err, EngineError::NotPrivileged));

    assert_eq!(engine.pending_applications(&admin).await.unwrap().len(), 1);
    let status = engine.review_application(&admin, review).await.unwrap();
    assert_eq!(status, UserStatus::Approved);

    engine.create_booking(&ctx, booking_request(10, 12)).await.unwrap();
}

#[tokio::test]
async fn registration_validates_uid() {
    let (engine, _) = engine_with_fleet(&[4116]);
    let err = engine
        .register_user("driver@example.edu", 42, Role::Member)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidUid));

    engine
        .register_user("driver@example.edu", 123_456_789, Role::Member)
        .await
        .unwrap();
    assert_eq!(
        engine.user_status("driver@example.edu").await,
        Some(UserStatus::NotSubmitted)
    );
}
