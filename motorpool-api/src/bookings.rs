use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use motorpool_booking::Booking;
use motorpool_core::CreateBookingRequest;
use motorpool_fleet::Vehicle;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct BookingListResponse {
    bookings: Vec<Booking>,
}

#[derive(Debug, Serialize)]
struct FleetScheduleResponse {
    vehicles: Vec<Vehicle>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(list_bookings))
        .route("/v1/bookings/{id}", get(get_booking).delete(cancel_booking))
        .route("/v1/fleet", get(fleet_schedule))
}

async fn create_booking(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let booking = state.engine.create_booking(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn list_bookings(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> Result<Json<BookingListResponse>, ApiError> {
    let bookings = state.engine.bookings_for(&ctx).await;
    Ok(Json(BookingListResponse { bookings }))
}

async fn get_booking(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state
        .engine
        .get_booking(&ctx, id)
        .await
        .ok_or_else(|| ApiError::NotFoundError(format!("Booking not found: {id}")))?;
    Ok(Json(booking))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state.engine.cancel_booking(&ctx, id).await?;
    Ok(Json(booking))
}

async fn fleet_schedule(
    State(state): State<AppState>,
    Identity(_ctx): Identity,
) -> Result<Json<FleetScheduleResponse>, ApiError> {
    let vehicles = state.engine.fleet_snapshot().await;
    Ok(Json(FleetScheduleResponse { vehicles }))
}
