use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use dalal_core::errors::{Error as CoreError, UnauthorizedReason};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    /// Body could not be decoded into the expected request shape.
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Error payload returned with every non-2xx response.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                CoreError::ExchangeFailed { .. }
                | CoreError::Provider { .. }
                | CoreError::Network(_) => StatusCode::BAD_GATEWAY,
                CoreError::Configuration(_)
                | CoreError::Database(_)
                | CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            error: self.to_string(),
            kind: match self {
                ApiError::BadRequest(_) => "validation_error".to_string(),
                ApiError::Core(e) => e.kind().to_string(),
            },
            provider_status: None,
            provider_body: None,
            expired_at: None,
        };
        match self {
            ApiError::Core(CoreError::ExchangeFailed { status, body: text })
            | ApiError::Core(CoreError::Provider { status, body: text }) => {
                body.provider_status = Some(*status);
                body.provider_body = Some(text.clone());
            }
            ApiError::Core(CoreError::Unauthorized(UnauthorizedReason::Expired { expired_at })) => {
                body.expired_at = Some(*expired_at);
            }
            _ => {}
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        if status.is_server_error() {
            tracing::error!(kind = %body.kind, "{}", body.error);
        } else {
            tracing::warn!(kind = %body.kind, "{}", body.error);
        }
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
