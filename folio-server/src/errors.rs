use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// HTTP-facing error: a status plus a message that is safe to show a
/// client. Raw diagnostic detail rides in `detail` and only ever reaches
/// the log sink, never the response body.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(detail) = &self.detail {
            error!(status = %self.status, %detail, "request failed: {}", self.message);
        }

        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<folio_core::CoreError> for AppError {
    fn from(err: folio_core::CoreError) -> Self {
        use folio_core::CoreError;
        match err {
            CoreError::NotFound(detail) => Self::not_found("not found").with_detail(detail),
            CoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::not_found("file not found").with_detail(e.to_string())
            }
            CoreError::Store(detail) => {
                Self::internal("could not access the catalog").with_detail(detail)
            }
            other => Self::internal("internal server error").with_detail(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use folio_core::CoreError;

    #[test]
    fn store_failures_map_to_a_safe_internal_error() {
        let err: AppError = CoreError::Store("SQLITE_BUSY: locked".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "could not access the catalog");
        assert_eq!(err.detail.as_deref(), Some("SQLITE_BUSY: locked"));
    }

    #[test]
    fn missing_files_map_to_404() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no cover.jpg");
        let err: AppError = CoreError::Io(io).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn detail_never_reaches_the_response_body() {
        let err = AppError::internal("could not access the catalog")
            .with_detail("secret sql fragment");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The body is built from `message` only; `detail` is logged.
    }
}
