use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tickerdash_core::{HttpError, SessionError};

/// Process-level failures mapped to exit codes.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("failed to initialize market data provider: {0}")]
    Provider(#[from] HttpError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server stopped unexpectedly: {0}")]
    Serve(#[source] std::io::Error),
}

impl WebError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Provider(_) => 3,
            Self::Bind { .. } => 4,
            Self::Serve(_) => 10,
        }
    }
}

/// Handler failures returned to the page as JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Session(SessionError::Closed) => {
                (StatusCode::SERVICE_UNAVAILABLE, "session.closed")
            }
        };
        tracing::error!(error = %self, code, "dashboard request failed");

        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
