use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use llm_relay_common::{ANTHROPIC_VERSION, AllowedOrigin, ApiKey, RelayConfig};
use serde_json::Value;
use tracing::{info, warn};

use crate::classify::{EdgeDisposition, classify_edge, classify_serverless};
use crate::cors::cors_response;
use crate::errors::RelayError;
use crate::headers::{Headers, header_get, header_set};
use crate::request::RelayRequest;
use crate::response::{APPLICATION_JSON, RelayResponse, TEXT_PLAIN};
use crate::upstream::{UpstreamClient, UpstreamHttpRequest, UpstreamHttpResponse};

/// Anthropic's per-request id response header.
pub const UPSTREAM_REQUEST_ID_HEADER: &str = "request-id";

/// Configuration the relay reads on each invocation.
pub trait RelayEnv: Send + Sync {
    fn api_key(&self) -> &ApiKey;
    fn allowed_origin(&self) -> &AllowedOrigin;
    fn upstream_url(&self) -> &str;
}

impl RelayEnv for RelayConfig {
    fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    fn allowed_origin(&self) -> &AllowedOrigin {
        &self.allowed_origin
    }

    fn upstream_url(&self) -> &str {
        &self.upstream_url
    }
}

pub fn build_upstream_request(env: &dyn RelayEnv, body: &Value) -> UpstreamHttpRequest {
    let mut headers = Headers::new();
    header_set(&mut headers, "Content-Type", APPLICATION_JSON);
    header_set(&mut headers, "x-api-key", env.api_key().expose());
    header_set(&mut headers, "anthropic-version", ANTHROPIC_VERSION);
    UpstreamHttpRequest {
        url: env.upstream_url().to_string(),
        headers,
        body: Bytes::from(body.to_string()),
    }
}

#[derive(Clone)]
pub struct Relay {
    env: Arc<dyn RelayEnv>,
    upstream: Arc<dyn UpstreamClient>,
}

impl Relay {
    pub fn new(env: Arc<dyn RelayEnv>, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { env, upstream }
    }

    /// Worker-style handling: preflight, origin gate, raw body passthrough, CORS on the way out.
    pub async fn handle_edge(&self, req: RelayRequest) -> RelayResponse {
        let allowed = self.env.allowed_origin();
        let origin = req.origin();

        let body = match classify_edge(&req, allowed) {
            Ok(EdgeDisposition::Preflight) => {
                return cors_response(Bytes::new(), StatusCode::NO_CONTENT, origin, allowed, TEXT_PLAIN);
            }
            Ok(EdgeDisposition::Forward(body)) => body,
            Err(err) => {
                warn!(event = "relay_rejected", reason = err.reason(), origin = ?origin);
                return err.into_edge_response(origin, allowed);
            }
        };

        match self.forward(&body).await {
            Ok(upstream) => cors_response(
                upstream.body,
                status_from_u16(upstream.status),
                origin,
                allowed,
                APPLICATION_JSON,
            ),
            Err(err) => err.into_edge_response(origin, allowed),
        }
    }

    /// Function-style handling: method check, then JSON in and JSON out.
    pub async fn handle_serverless(&self, req: RelayRequest) -> RelayResponse {
        let body = match classify_serverless(&req) {
            Ok(body) => body,
            Err(err) => {
                warn!(event = "relay_rejected", reason = err.reason());
                return err.into_serverless_response();
            }
        };

        let upstream = match self.forward(&body).await {
            Ok(upstream) => upstream,
            Err(err) => return err.into_serverless_response(),
        };
        match serde_json::from_slice::<Value>(&upstream.body) {
            Ok(data) => RelayResponse::json(status_from_u16(upstream.status), data.to_string()),
            Err(err) => {
                warn!(
                    event = "upstream_body_invalid",
                    status = upstream.status,
                    error = %err
                );
                RelayError::InvalidUpstreamResponse.into_serverless_response()
            }
        }
    }

    async fn forward(&self, body: &Value) -> Result<UpstreamHttpResponse, RelayError> {
        let request = build_upstream_request(self.env.as_ref(), body);
        let model = body.get("model").and_then(Value::as_str).unwrap_or("unknown");
        info!(
            event = "upstream_request",
            url = %request.url,
            model = %model,
            body_bytes = request.body.len()
        );

        match self.upstream.send(request).await {
            Ok(response) => {
                info!(
                    event = "upstream_response",
                    status = response.status,
                    upstream_request_id = upstream_request_id(&response).unwrap_or("-"),
                    body_bytes = response.body.len()
                );
                Ok(response)
            }
            Err(failure) => {
                warn!(
                    event = "upstream_failed",
                    kind = %failure.kind,
                    message = %failure.message
                );
                Err(RelayError::UpstreamUnreachable(failure))
            }
        }
    }
}

pub fn upstream_request_id(response: &UpstreamHttpResponse) -> Option<&str> {
    header_get(&response.headers, UPSTREAM_REQUEST_ID_HEADER)
}

fn status_from_u16(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}
