//! Failure taxonomy for report generation.
//!
//! Every variant is fatal for the request that raised it: no partial document
//! is ever handed back to the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid submission: {0}")]
    Validation(String),

    #[error("unable to generate {what} symbol: {reason}")]
    SymbolGeneration { what: &'static str, reason: String },

    #[error("failed to fetch {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    #[error("request to remote asset failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unsupported image type: {0:?}")]
    UnsupportedFormat(String),

    #[error("failed to convert WebP image to JPEG: {0}")]
    Transcode(#[source] image::ImageError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF generation error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    pub fn status(&self) -> StatusCode {
        match self {
            ReportError::Validation(_) => StatusCode::BAD_REQUEST,
            ReportError::UnsupportedFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReportError::Fetch { .. } | ReportError::Transport(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ReportError::Validation(msg) => log::warn!("Rejected submission: {}", msg),
            other => log::error!("Report generation failed: {}", other),
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_failure_class() {
        assert_eq!(
            ReportError::Validation("numStr".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ReportError::UnsupportedFormat("gif".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ReportError::Fetch { url: "http://x/a.png".into(), status: 404 }.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ReportError::SymbolGeneration { what: "listing", reason: "too long".into() }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn fetch_error_carries_transport_status() {
        let err = ReportError::Fetch { url: "http://x/a.png".into(), status: 404 };
        assert_eq!(err.to_string(), "failed to fetch http://x/a.png: HTTP 404");
    }
}
