use http::StatusCode;
use llm_relay_common::AllowedOrigin;

use crate::cors::cors_response;
use crate::response::{RelayResponse, TEXT_PLAIN};
use crate::upstream::UpstreamFailure;

/// Responses the relay produces itself instead of relaying upstream.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Forbidden")]
    ForbiddenOrigin,
    #[error("Upstream unreachable")]
    UpstreamUnreachable(#[source] UpstreamFailure),
    #[error("Invalid upstream response")]
    InvalidUpstreamResponse,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::InvalidJson => StatusCode::BAD_REQUEST,
            RelayError::ForbiddenOrigin => StatusCode::FORBIDDEN,
            RelayError::UpstreamUnreachable(_) | RelayError::InvalidUpstreamResponse => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Short label for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "wrong_method",
            RelayError::InvalidJson => "invalid_body",
            RelayError::ForbiddenOrigin => "forbidden_origin",
            RelayError::UpstreamUnreachable(_) => "upstream_unreachable",
            RelayError::InvalidUpstreamResponse => "invalid_upstream_response",
        }
    }

    /// Plain text. Every edge rejection carries CORS headers except 405.
    pub fn into_edge_response(self, origin: Option<&str>, allowed: &AllowedOrigin) -> RelayResponse {
        let status = self.status();
        let message = self.to_string();
        match self {
            RelayError::MethodNotAllowed => RelayResponse::plain_text(status, message),
            _ => cors_response(message, status, origin, allowed, TEXT_PLAIN),
        }
    }

    /// `{"error": "..."}`, no CORS.
    pub fn into_serverless_response(self) -> RelayResponse {
        RelayResponse::json_error(self.status(), &self.to_string())
    }
}
