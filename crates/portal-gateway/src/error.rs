use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use portal_core::ShortenerError;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Shortener(e) => match e {
                ShortenerError::NotFound => StatusCode::NOT_FOUND,
                ShortenerError::Expired => StatusCode::GONE,
                ShortenerError::InvalidShortCode(_) => StatusCode::BAD_REQUEST,
                ShortenerError::Conflict { .. } => StatusCode::CONFLICT,
                ShortenerError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ShortenerError::Cache(_)
                | ShortenerError::Filter(_)
                | ShortenerError::Storage(_)
                | ShortenerError::Generator(_)
                | ShortenerError::Abandoned => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Shortener(ShortenerError::InvalidShortCode(_)) => {
                "validation_error"
            }
            AppError::Shortener(ShortenerError::NotFound) => "not_found",
            AppError::Shortener(ShortenerError::Expired) => "expired",
            AppError::Shortener(ShortenerError::Conflict { .. }) => "conflict",
            AppError::Shortener(ShortenerError::Timeout) => "timeout",
            AppError::Shortener(_) => "unavailable",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = if status.is_server_error() {
            // Backend details stay in the logs.
            warn!(error = %self, status = status.as_u16(), "Request failed");
            "service temporarily unavailable".to_string()
        } else {
            debug!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorInfo { code, message },
            }),
        )
            .into_response()
    }
}
