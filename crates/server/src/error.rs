//! Maps store failures onto HTTP responses.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;
use todo::TodoError;

/// Error returned by handlers.
///
/// The message is what the client sees. For server errors it stays generic
/// and the underlying cause is only logged.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    source: Option<anyhow::Error>,
}

impl AppError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }

    #[must_use]
    pub fn internal(source: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error").with_source(source)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl From<TodoError> for AppError {
    fn from(e: TodoError) -> Self {
        match e {
            TodoError::NotFound { .. } => Self::not_found(),
            // `/add` answers a full list with a redirect before converting;
            // this only applies to other callers of the conversion.
            TodoError::Capacity { .. } => Self::new(StatusCode::CONFLICT, e.to_string()),
            TodoError::Decode { .. } | TodoError::Storage(_) => Self::internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    error = %format!("{source:#}"),
                    "request failed"
                ),
                None => tracing::error!(status = %self.status, message = %self.message, "request failed"),
            }
        }

        (self.status, self.message).into_response()
    }
}
