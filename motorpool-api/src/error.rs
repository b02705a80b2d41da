use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use motorpool_booking::{BookingError, ReturnError};
use motorpool_core::EngineError;
use motorpool_driver::DirectoryError;
use motorpool_fleet::AllocationError;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Map the engine's error taxonomy onto HTTP: validation errors are the
/// caller's to fix (400), policy failures explain themselves (403),
/// resource exhaustion and duplicate submissions are conflicts (409), and
/// anomalies fall through to 500.
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::MissingField(_)
            | EngineError::InvalidUid
            | EngineError::UnknownEvidence(_)
            | EngineError::Allocation(AllocationError::InvalidSlot)
            | EngineError::Return(ReturnError::ChecklistIncomplete(_))
            | EngineError::Return(ReturnError::LowFuel { .. })
            | EngineError::Return(ReturnError::InvalidFuelLevel(_))
            | EngineError::Return(ReturnError::EvidenceMissing(_))
            | EngineError::Return(ReturnError::BookingNotConfirmed(_)) => {
                ApiError::ValidationError(message)
            }

            EngineError::NotApproved | EngineError::NotPrivileged => {
                ApiError::AuthorizationError(message)
            }

            EngineError::Return(ReturnError::BookingNotFound(_))
            | EngineError::Booking(BookingError::NotFound(_))
            | EngineError::Directory(DirectoryError::UserNotFound(_)) => {
                ApiError::NotFoundError(message)
            }

            EngineError::ActiveBookingExists
            | EngineError::Allocation(AllocationError::NoVehicleAvailable)
            | EngineError::Return(ReturnError::AlreadyReturned(_))
            | EngineError::Booking(BookingError::InvalidTransition { .. })
            | EngineError::Directory(DirectoryError::AlreadyRegistered(_))
            | EngineError::Directory(DirectoryError::NotPendingReview { .. }) => {
                ApiError::ConflictError(message)
            }

            EngineError::Blob(_) => ApiError::Anyhow(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: EngineError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(EngineError::MissingField("project_name")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(EngineError::NotApproved), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(EngineError::Allocation(AllocationError::NoVehicleAvailable)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(EngineError::Return(ReturnError::AlreadyReturned(Uuid::new_v4()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(EngineError::Return(ReturnError::BookingNotFound(Uuid::new_v4()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(EngineError::Return(ReturnError::LowFuel { level: 40, minimum: 75 })),
            StatusCode::BAD_REQUEST
        );
    }
}
