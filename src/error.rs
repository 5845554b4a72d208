use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// A failure reported by an upstream AI provider.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The provider rejected our credentials.
    #[error("{0}")]
    Auth(String),

    /// The provider's quota is exhausted.
    #[error("{0}")]
    Quota(String),

    /// Any other provider-side failure.
    #[error("{0}")]
    Provider(String),
}

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A valid identity with an insufficient role.
    #[error("Access denied")]
    Forbidden,

    /// A resource not found error.
    #[error("{0}")]
    NotFound(String),

    /// A duplicate-resource conflict.
    #[error("{0}")]
    Conflict(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The global chat request budget is spent.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// An upstream AI provider failure.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // "fail" marks a client-correctable condition, "error" a server or
        // upstream fault. Internal detail never reaches the body.
        let (status, kind, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "error", "Internal server error".to_string())
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "error", "Internal server error".to_string())
            }

            AppError::Unauthorized(ref msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "fail", msg.clone())
            }

            AppError::Forbidden => {
                tracing::warn!("Authorization failed");
                (StatusCode::FORBIDDEN, "fail", "Access denied.".to_string())
            }

            AppError::NotFound(ref msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "fail", msg.clone())
            }

            AppError::Conflict(ref msg) => {
                tracing::debug!("Conflict: {}", msg);
                (StatusCode::BAD_REQUEST, "fail", msg.clone())
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, "fail", msg.clone())
            }

            AppError::RateLimitExceeded(ref msg) => {
                tracing::warn!("Rate limit exceeded: {}", msg);
                (StatusCode::TOO_MANY_REQUESTS, "fail", msg.clone())
            }

            AppError::Upstream(ref e) => {
                tracing::error!("Upstream provider error: {}", e);
                match e {
                    UpstreamError::Auth(msg) => (StatusCode::UNAUTHORIZED, "error", msg.clone()),
                    UpstreamError::Quota(msg) => (StatusCode::PAYMENT_REQUIRED, "error", msg.clone()),
                    UpstreamError::Provider(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "error",
                        "Error generating response".to_string(),
                    ),
                }
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "error", "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "status": kind,
            "message": message
        }))
        .unwrap_or_else(|_| r#"{"status":"error","message":"Internal server error"}"#.to_string());

        (status, [(http::header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_use_fail_status() {
        let resp = AppError::Conflict("Already enrolled in this course".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::NotFound("Course not found".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AppError::Forbidden.into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn upstream_subkinds_map_to_distinct_statuses() {
        let auth = AppError::Upstream(UpstreamError::Auth("Invalid OpenAI API key".into()));
        assert_eq!(auth.into_response().status(), StatusCode::UNAUTHORIZED);

        let quota = AppError::Upstream(UpstreamError::Quota("OpenAI API quota exceeded".into()));
        assert_eq!(quota.into_response().status(), StatusCode::PAYMENT_REQUIRED);

        let other = AppError::Upstream(UpstreamError::Provider("boom".into()));
        assert_eq!(other.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_detail_never_reaches_the_body() {
        let resp = AppError::Internal("secret connection string".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
