use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use axum::response::Response;
use bytes::Bytes;
use llm_relay_core::{RelayRequest, RelayResponse};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::core::CoreState;

pub const REQUEST_ID_HEADER: &str = "x-llm-relay-request-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Edge,
    Serverless,
}

impl Variant {
    fn as_str(&self) -> &'static str {
        match self {
            Variant::Edge => "edge",
            Variant::Serverless => "serverless",
        }
    }
}

pub async fn edge_handler(
    State(state): State<Arc<CoreState>>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Response {
    relay_call(state, Variant::Edge, method, headers, uri, body).await
}

pub async fn serverless_handler(
    State(state): State<Arc<CoreState>>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Response {
    relay_call(state, Variant::Serverless, method, headers, uri, body).await
}

async fn relay_call(
    state: Arc<CoreState>,
    variant: Variant,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let span = info_span!("relay", trace_id = %trace_id, variant = variant.as_str());

    async move {
        let started_at = Instant::now();
        info!(
            event = "relay_received",
            method = %method,
            path = %uri.path(),
            body_bytes = body.len()
        );

        let request = RelayRequest::new(method, &headers, body);
        let response = match variant {
            Variant::Edge => state.relay.handle_edge(request).await,
            Variant::Serverless => state.relay.handle_serverless(request).await,
        };

        info!(
            event = "relay_responded",
            status = response.status.as_u16(),
            elapsed_ms = started_at.elapsed().as_millis()
        );
        relay_response(response, &trace_id)
    }
    .instrument(span)
    .await
}

fn relay_response(response: RelayResponse, trace_id: &str) -> Response {
    let mut resp = Response::new(Body::from(response.body));
    *resp.status_mut() = response.status;
    for (name, value) in &response.headers {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            continue;
        };
        resp.headers_mut().insert(name, value);
    }
    if let Ok(value) = HeaderValue::from_str(trace_id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}
