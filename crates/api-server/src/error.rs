use crate::response::ApiResponse;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::DomainError;
use std::any::Any;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

pub const USER_NOT_FOUND: &str = "user not found";
pub const RESOURCE_NOT_FOUND: &str = "resource not found";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Everything a handler can fail with. Rendered as an envelope with
/// `success: false`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Domain(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(ApiResponse::<()>::fail(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::BadRequest(describe(&errors))
    }
}

/// Flattens field errors into one sentence, ordered for stable output.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Catch-all for unknown routes.
pub async fn not_found_fallback() -> ApiError {
    ApiError::NotFound(RESOURCE_NOT_FOUND.to_string())
}

/// Turns a handler panic into a 500 envelope. The payload is logged but
/// never sent to the client.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::fail(INTERNAL_ERROR)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn status_follows_the_fault_kind() {
        assert_eq!(
            ApiError::from(DomainError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DomainError::repository("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(DomainError::ConstraintViolation("UNIQUE".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::NotFound(USER_NOT_FOUND.into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn storage_faults_keep_their_description() {
        let err = ApiError::from(DomainError::repository("database is locked"));
        assert_eq!(err.to_string(), "Repository error: database is locked");
    }

    #[test]
    fn describe_joins_field_messages() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "name",
            ValidationError::new("name").with_message("name cannot be blank".into()),
        );
        errors.add("level", ValidationError::new("range"));

        assert_eq!(describe(&errors), "level is invalid; name cannot be blank");
    }

    #[test]
    fn panic_response_hides_the_payload() {
        let response = panic_response(Box::new("secret detail".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
