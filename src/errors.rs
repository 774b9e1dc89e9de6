use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

/// Error types for the site backend.
/// Only the proxy and refresh paths produce these. The pure series/metrics
/// stages never fail: they return empty series or `None` sentinels instead.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("{0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("Alpaca fetch failed: {status}")]
    Upstream { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    BadRequest(String),
}

impl SiteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SiteError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for SiteError {
    fn from(e: reqwest::Error) -> Self {
        SiteError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for SiteError {
    fn from(e: serde_json::Error) -> Self {
        SiteError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for SiteError {
    fn from(e: std::io::Error) -> Self {
        SiteError::Network(e.to_string())
    }
}

/// Every failure leaves the server as `{ "error": message }`.
impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            SiteError::Upstream { status: upstream, body } => {
                tracing::error!(upstream_status = upstream, body = %body, "upstream error");
            }
            SiteError::BadRequest(msg) => {
                tracing::debug!(error = %msg, "rejected request");
            }
            other => {
                tracing::error!(error = %other, "request failed");
            }
        }

        let mut message = self.to_string();
        if message.trim().is_empty() {
            message = "Unknown error".to_string();
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type SiteResult<T> = Result<T, SiteError>;
