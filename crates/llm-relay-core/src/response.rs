use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;

use crate::headers::{Headers, header_get, header_set};

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Bytes,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl RelayResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn plain_text(status: StatusCode, message: impl Into<Bytes>) -> Self {
        Self::new(status, message).with_header("Content-Type", TEXT_PLAIN)
    }

    pub fn json(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::new(status, body).with_header("Content-Type", APPLICATION_JSON)
    }

    /// `{"error": message}` with the given status.
    pub fn json_error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::to_vec(&ErrorBody { error: message })
            .unwrap_or_else(|_| b"{}".to_vec());
        Self::json(status, body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        header_set(&mut self.headers, name, value);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_error_shape() {
        let resp = RelayResponse::json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.header("content-type"), Some(APPLICATION_JSON));
        assert_eq!(&resp.body[..], br#"{"error":"Method not allowed"}"#);
    }
}
