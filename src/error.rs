use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Application error taxonomy. Every handler failure maps to exactly one of
/// these, and each variant maps to a fixed HTTP status. Storage internals are
/// never surfaced to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    /// Covers both "no such row" and "row owned by another user" so the two
    /// are indistinguishable to the caller.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

/// JSON body for every error response: `{error, message?}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        error!(error = %e, "database error");
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label, message) = match &self {
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            ApiError::Authentication(msg) => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                Some(msg.clone()),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        };

        let body = ErrorResponse {
            error: label.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Foreign-key violations get their own mapping (deleting a category that
/// transactions still reference).
pub fn is_fk_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_identical_for_missing_and_foreign_rows() {
        // The two cases must produce byte-identical bodies.
        let missing = ApiError::NotFound("Transaction not found".into());
        let foreign = ApiError::NotFound("Transaction not found".into());
        let a = serde_json::to_string(&ErrorResponse {
            error: "not_found".into(),
            message: Some(missing.to_string()),
        })
        .unwrap();
        let b = serde_json::to_string(&ErrorResponse {
            error: "not_found".into(),
            message: Some(foreign.to_string()),
        })
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn internal_error_body_has_no_detail() {
        let body = ErrorResponse {
            error: "internal_error".into(),
            message: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"internal_error"}"#);
    }

    #[test]
    fn fk_violation_is_detected() {
        #[derive(Debug)]
        struct FkViolation;

        impl std::fmt::Display for FkViolation {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("violates foreign key constraint")
            }
        }

        impl std::error::Error for FkViolation {}

        impl sqlx::error::DatabaseError for FkViolation {
            fn message(&self) -> &str {
                "violates foreign key constraint"
            }

            fn kind(&self) -> sqlx::error::ErrorKind {
                sqlx::error::ErrorKind::ForeignKeyViolation
            }

            fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
                self
            }

            fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
                self
            }

            fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
                self
            }
        }

        let err = sqlx::Error::Database(Box::new(FkViolation));
        assert!(is_fk_violation(&err));
        assert!(!is_fk_violation(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn taxonomy_maps_to_fixed_statuses() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Authentication("no".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("used".into()), StatusCode::CONFLICT),
            (ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let res = err.into_response();
            assert_eq!(res.status(), expected);
        }
    }
}
