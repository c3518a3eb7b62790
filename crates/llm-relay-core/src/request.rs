use bytes::Bytes;
use http::header::ORIGIN;
use http::{HeaderMap, Method};

/// Host-neutral view of an inbound call: only what the relay policy consults.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub method: Method,
    pub origin: Option<String>,
    pub body: Bytes,
}

impl RelayRequest {
    pub fn new(method: Method, headers: &HeaderMap, body: Bytes) -> Self {
        let origin = headers
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        Self {
            method,
            origin,
            body,
        }
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}
