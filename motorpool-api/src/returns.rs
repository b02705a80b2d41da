use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use motorpool_booking::{ReturnSubmission, VehicleReturn};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ReturnListResponse {
    returns: Vec<VehicleReturn>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/returns", post(submit_return).get(list_returns))
}

async fn submit_return(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(submission): Json<ReturnSubmission>,
) -> Result<(StatusCode, Json<VehicleReturn>), ApiError> {
    let record = state.engine.submit_return(&ctx, submission).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_returns(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> Result<Json<ReturnListResponse>, ApiError> {
    let returns = state.engine.returns_for(&ctx).await;
    Ok(Json(ReturnListResponse { returns }))
}
