use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use motorpool_core::ReviewRequest;
use motorpool_driver::{User, UserStatus};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PendingApplicationsResponse {
    users: Vec<User>,
}

#[derive(Debug, Serialize)]
struct ReviewResponse {
    email: String,
    status: UserStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/applications", get(pending_applications))
        .route("/v1/admin/review", post(review))
}

async fn pending_applications(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> Result<Json<PendingApplicationsResponse>, ApiError> {
    let users = state.engine.pending_applications(&ctx).await?;
    Ok(Json(PendingApplicationsResponse { users }))
}

async fn review(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let email = req.email.clone();
    let status = state.engine.review_application(&ctx, req).await?;
    Ok(Json(ReviewResponse { email, status }))
}
