//! The double-booking property under concurrent allocation requests.
//!
//! The engine serializes check-then-commit behind one lock, so for any
//! cluster of mutually overlapping windows at most `fleet size` requests
//! succeed and no vehicle ever holds overlapping committed intervals.

use chrono::{Duration, TimeZone, Utc};
use motorpool_core::{
    CreateBookingRequest, DriverApplicationRequest, EnginePolicies, MemoryEvidenceStore,
    ReservationEngine,
};
use motorpool_shared::{RequestContext, Role};
use std::sync::Arc;

async fn approved_member(engine: &ReservationEngine, email: &str) -> RequestContext {
    let ctx = RequestContext::member(email);
    let now = Utc::now();
    engine
        .register_user(email, 123_456_789, Role::Member)
        .await
        .unwrap();
    engine
        .submit_driver_application(
            &ctx,
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
            },
        )
        .await
        .unwrap();
    ctx
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_overlapping_requests_never_double_book() {
    const FLEET: [i64; 3] = [1, 2, 3];
    const REQUESTS: usize = 24;

    let engine = Arc::new(ReservationEngine::new(
        FLEET,
        EnginePolicies::default(),
        Arc::new(MemoryEvidenceStore::new()),
    ));

    let mut contexts = Vec::new();
    for i in 0..REQUESTS {
        let email = format!("driver{}@example.edu", i);
        contexts.push(approved_member(&engine, &email).await);
    }

    // Staggered starts inside one shared window: every pair overlaps.
    let base = Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap();
    let mut handles = Vec::new();
    for (i, ctx) in contexts.into_iter().enumerate() {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let request = CreateBookingRequest {
                project_name: "Habitat Build".to_string(),
                site_name: "Riverside Site".to_string(),
                site_address: "100 Main St".to_string(),
                trip_purpose: "Volunteer trip".to_string(),
                vehicle_count: 1,
                within_range: true,
                pickup: base + Duration::minutes(i as i64),
                return_by: base + Duration::hours(2) + Duration::minutes(i as i64),
            };
            engine.create_booking(&ctx, request).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // At most one winner per vehicle for a mutually overlapping cluster.
    assert_eq!(successes, FLEET.len());

    // And the registry invariant held throughout.
    for vehicle in engine.fleet_snapshot().await {
        for (i, x) in vehicle.busy.iter().enumerate() {
            for y in vehicle.busy.iter().skip(i + 1) {
                assert!(
                    !x.overlaps(y),
                    "vehicle {} holds overlapping slots",
                    vehicle.vehicle_id
                );
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_requests_from_one_user_yield_one_active_booking() {
    const REQUESTS: usize = 16;

    // Disjoint windows against an oversized fleet: allocation always
    // succeeds, so only the one-active-booking barrier can refuse.
    let engine = Arc::new(ReservationEngine::new(
        1..=32i64,
        EnginePolicies::default(),
        Arc::new(MemoryEvidenceStore::new()),
    ));
    let ctx = approved_member(&engine, "driver@example.edu").await;

    let base = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
    let barrier = Arc::new(tokio::sync::Barrier::new(REQUESTS));
    let mut handles = Vec::new();
    for i in 0..REQUESTS {
        let engine = engine.clone();
        let ctx = ctx.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            let request = CreateBookingRequest {
                project_name: "Habitat Build".to_string(),
                site_name: "Riverside Site".to_string(),
                site_address: "100 Main St".to_string(),
                trip_purpose: "Volunteer trip".to_string(),
                vehicle_count: 1,
                within_range: true,
                pickup: base + Duration::hours(i as i64),
                return_by: base + Duration::hours(i as i64) + Duration::minutes(30),
            };
            barrier.wait().await;
            engine.create_booking(&ctx, request).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);

    let active = engine
        .bookings_for(&ctx)
        .await
        .iter()
        .filter(|b| b.is_active())
        .count();
    assert_eq!(active, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_disjoint_requests_all_succeed() {
    let engine = Arc::new(ReservationEngine::new(
        [1],
        EnginePolicies::default(),
        Arc::new(MemoryEvidenceStore::new()),
    ));

    let mut contexts = Vec::new();
    for i in 0..8 {
        let email = format!("driver{}@example.edu", i);
        contexts.push(approved_member(&engine, &email).await);
    }

    // Eight back-to-back hour slots on one vehicle; touching boundaries do
    // not conflict.
    let base = Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap();
    let mut handles = Vec::new();
    for (i, ctx) in contexts.into_iter().enumerate() {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let request = CreateBookingRequest {
                project_name: "Habitat Build".to_string(),
                site_name: "Riverside Site".to_string(),
                site_address: "100 Main St".to_string(),
                trip_purpose: "Volunteer trip".to_string(),
                vehicle_count: 1,
                within_range: true,
                pickup: base + Duration::hours(i as i64),
                return_by: base + Duration::hours(i as i64 + 1),
            };
            engine.create_booking(&ctx, request).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(engine.fleet_snapshot().await[0].busy.len(), 8);
}
