use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Corpus parsing error: {0}")]
    CorpusParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    // Embedding proxy outcomes (one tagged set at the boundary; every
    // upstream adapter maps its provider-specific failure into these).
    #[error("Bad input: {0}")]
    BadInput(String),

    #[error("no embedding provider configured")]
    NoProvider,

    #[error("unexpected {provider} response")]
    BadUpstream { provider: String, body: String },

    #[error("{provider} request failed: {message}")]
    UpstreamRequest { provider: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get a sanitized error message safe for logging
    /// Filters out potentially sensitive information
    pub fn log_safe(&self) -> String {
        match self {
            // HTTP errors might contain internal URLs or authentication info
            Error::Http(_) => "External HTTP request failed".to_string(),

            // Upstream bodies can be large and may echo credentials
            Error::BadUpstream { provider, .. } => {
                format!("Unexpected response shape from provider '{provider}'")
            }
            Error::UpstreamRequest { provider, .. } => {
                format!("Request to provider '{provider}' failed")
            }

            // Internal errors might contain sensitive details
            Error::Internal(msg) => {
                if msg.to_lowercase().contains("password")
                    || msg.to_lowercase().contains("secret")
                    || msg.to_lowercase().contains("token")
                    || msg.to_lowercase().contains("key")
                {
                    "Internal error (details redacted)".to_string()
                } else {
                    format!("Internal error: {msg}")
                }
            }

            // These errors are generally safe to log as-is
            Error::CorpusParse(msg) => format!("Corpus parsing error: {msg}"),
            Error::Config(msg) => format!("Configuration error: {msg}"),
            Error::Validation(msg) => format!("Validation error: {msg}"),
            Error::BadInput(msg) => format!("Bad input: {msg}"),
            Error::NoProvider => "No embedding provider configured".to_string(),
        }
    }
}

// Implement IntoResponse for proxy error handling. Response shapes follow
// the embed proxy contract: 400 for bad input, 501 when no provider is
// configured, 502 for upstream failures (with diagnostics), 500 otherwise.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log the full error internally using the safe logging method
        tracing::error!("Request error: {}", self.log_safe());

        let (status, body) = match &self {
            Error::BadInput(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::NoProvider => (
                StatusCode::NOT_IMPLEMENTED,
                json!({ "error": "no embedding provider configured" }),
            ),
            Error::BadUpstream { provider, body } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": format!("unexpected {provider} response"),
                    "body": raw_body_value(body),
                }),
            ),
            Error::UpstreamRequest { provider, message } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": format!("{provider} request failed"),
                    "message": message,
                }),
            ),
            Error::Http(_) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "External service error" }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Keep upstream diagnostics as structured JSON when the body parses,
/// otherwise pass the raw text through.
fn raw_body_value(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
