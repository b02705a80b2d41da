use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct UploadResponse {
    id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/evidence", post(upload))
}

/// Accept an uploaded photo or document and hand back the opaque id the
/// return and application forms reference.
async fn upload(
    State(state): State<AppState>,
    Identity(_ctx): Identity,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::ValidationError("Empty upload".to_string()));
    }
    let id = state
        .evidence
        .put(body.to_vec())
        .await
        .map_err(|e| ApiError::Anyhow(e.into()))?;
    Ok((StatusCode::CREATED, Json(UploadResponse { id })))
}
