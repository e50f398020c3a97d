//! Service errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Everything a chat or speech request can fail with.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("{0} is not configured")]
    MissingConfig(&'static str),

    #[error("{service} service returned {status}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ServiceError {
    pub fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Transport { service, source }
    }

    /// Drain a non-success upstream response into [`ServiceError::Upstream`].
    ///
    /// A body that cannot be read is logged and reported as empty.
    pub async fn upstream(service: &'static str, resp: reqwest::Response) -> Self {
        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(service, error = %e, "failed to read upstream error body");
                String::new()
            }
        };
        error!("{service}: upstream error {status}: {body}");
        Self::Upstream {
            service,
            status: status.as_u16(),
            body,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingConfig(_) | Self::Transport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            Self::Upstream { body, .. } => Some(body.clone()),
            Self::Transport { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), "{self}");
        } else {
            debug!(status = status.as_u16(), "{self}");
        }
        let body = ErrorBody {
            error: self.to_string(),
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}
