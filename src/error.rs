//! Error types for the proxy.
//!
//! Every failure a caller can observe is rendered as the OpenAI-style
//! envelope `{"error": {"message", "type", "code"}}`, where `code` mirrors
//! the HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIGURATION_ERROR: &str = "configuration_error";
pub const INVALID_REQUEST_ERROR: &str = "invalid_request_error";

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("{message}")]
    Config { message: String },

    #[error("{message}")]
    InvalidRequest { message: String },

    /// The upstream answered with a non-success status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The upstream answered 2xx but the body is not a chat completion.
    #[error("Unexpected upstream response: {message}")]
    UpstreamFormat { message: String },

    #[error(
        "Endpoint {path} not found. Available endpoints: /health, /v1/models, /v1/chat/completions"
    )]
    NotFound { path: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

impl ProxyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: msg.into(),
        }
    }

    pub fn upstream(status: u16, msg: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: msg.into(),
        }
    }

    pub fn upstream_format(msg: impl Into<String>) -> Self {
        Self::UpstreamFormat {
            message: msg.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Config { .. } => CONFIGURATION_ERROR,
            _ => INVALID_REQUEST_ERROR,
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        let status = self.status_code();
        ErrorEnvelope::new(self.to_string(), self.error_type(), status.as_u16())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_envelope())).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: u16,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>, error_type: &str, code: u16) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
                error_type: error_type.to_string(),
                code,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
