use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use motorpool_driver::UserStatus;
use motorpool_shared::{RequestContext, Role};
use serde::{Deserialize, Serialize};

/// Request-scoped identity, extracted once per request.
///
/// Authentication itself lives upstream; this trusts the `x-user-email`
/// header the auth proxy injects and derives the role from the configured
/// admin allow-list.
pub struct Identity(pub RequestContext);

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get("x-user-email")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| ApiError::AuthenticationError("Not logged in".to_string()))?;

        let role = if state.is_admin_email(&email) {
            Role::Admin
        } else {
            Role::Member
        };

        Ok(Identity(RequestContext { email, role }))
    }
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    uid: u64,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: UserStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/status", get(status))
}

async fn register(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .engine
        .register_user(&ctx.email, req.uid, ctx.role)
        .await?;
    Ok(Json(serde_json::json!({
        "message": "Registered",
        "status": user.status,
    })))
}

async fn status(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> Result<Json<StatusResponse>, ApiError> {
    // Unknown users read as NOT_SUBMITTED rather than erroring, so the
    // client can route first-time visitors into registration.
    let status = state
        .engine
        .user_status(&ctx.email)
        .await
        .unwrap_or(UserStatus::NotSubmitted);
    Ok(Json(StatusResponse { status }))
}
