use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Handshake failed: {0}")]
    Handshake(#[from] HandshakeError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether a lookup that failed with this error is worth retrying.
    ///
    /// Connectivity failures (connect refused, timeouts) and upstream 429/5xx
    /// responses are transient; everything else is final.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::HttpClient(e) => e.is_connect() || e.is_timeout(),
            AppError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Transport-level failure while joining a party
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("connection closed before it could join")]
    Closed,

    #[error("connection is already in party '{party}'")]
    AlreadyJoined { party: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Handshake(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) | AppError::Upstream { .. } => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_rate_limit_is_transient() {
        let err = AppError::Upstream {
            status: 429,
            body: String::new(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_upstream_server_error_is_transient() {
        let err = AppError::Upstream {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_upstream_client_error_is_not_transient() {
        let err = AppError::Upstream {
            status: 404,
            body: "missing".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_not_found_is_not_transient() {
        assert!(!AppError::NotFound("x".to_string()).is_transient());
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_upstream_maps_to_bad_gateway() {
        let response = AppError::Upstream {
            status: 500,
            body: String::new(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
