use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use motorpool_core::DriverApplicationRequest;
use motorpool_driver::SubmissionOutcome;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PriorApplicationResponse {
    has_driver_application: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/driver-applications", post(submit_application))
        .route("/v1/driver-applications/prior", get(prior_application))
}

async fn submit_application(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(req): Json<DriverApplicationRequest>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), ApiError> {
    let outcome = state.engine.submit_driver_application(&ctx, req).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Whether the caller already has an application on file, so the client can
/// preload the correction flow instead of a blank form.
async fn prior_application(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> Result<Json<PriorApplicationResponse>, ApiError> {
    let has_driver_application = state
        .engine
        .user_status(&ctx.email)
        .await
        .is_some_and(|status| status != motorpool_driver::UserStatus::NotSubmitted);
    Ok(Json(PriorApplicationResponse {
        has_driver_application,
    }))
}
