use http::Method;
use llm_relay_common::AllowedOrigin;
use serde_json::Value;

use crate::errors::RelayError;
use crate::request::RelayRequest;

#[derive(Debug)]
pub enum EdgeDisposition {
    Preflight,
    Forward(Value),
}

/// Edge order: preflight, wrong method, invalid body, forbidden origin, forward.
pub fn classify_edge(
    req: &RelayRequest,
    allowed: &AllowedOrigin,
) -> Result<EdgeDisposition, RelayError> {
    if req.method == Method::OPTIONS {
        return Ok(EdgeDisposition::Preflight);
    }
    ensure_post(&req.method)?;
    let body = parse_json(&req.body)?;
    if !allowed.permits(req.origin().unwrap_or("")) {
        return Err(RelayError::ForbiddenOrigin);
    }
    Ok(EdgeDisposition::Forward(body))
}

/// Serverless order: wrong method, then the host's own body parse.
pub fn classify_serverless(req: &RelayRequest) -> Result<Value, RelayError> {
    ensure_post(&req.method)?;
    parse_json(&req.body)
}

fn ensure_post(method: &Method) -> Result<(), RelayError> {
    if *method != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }
    Ok(())
}

fn parse_json(body: &[u8]) -> Result<Value, RelayError> {
    serde_json::from_slice(body).map_err(|_| RelayError::InvalidJson)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn request(method: Method, origin: Option<&str>, body: &'static str) -> RelayRequest {
        RelayRequest {
            method,
            origin: origin.map(|value| value.to_string()),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    fn good() -> AllowedOrigin {
        AllowedOrigin::Exact("https://good.example".to_string())
    }

    #[test]
    fn options_is_preflight_even_with_bad_origin_and_body() {
        let req = request(Method::OPTIONS, Some("https://evil.example"), "not json");
        assert!(matches!(
            classify_edge(&req, &good()),
            Ok(EdgeDisposition::Preflight)
        ));
    }

    #[test]
    fn edge_rejects_other_methods() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            let req = request(method, Some("https://good.example"), "{}");
            assert!(matches!(
                classify_edge(&req, &good()),
                Err(RelayError::MethodNotAllowed)
            ));
        }
    }

    #[test]
    fn edge_checks_body_before_origin() {
        let req = request(Method::POST, Some("https://evil.example"), "{oops");
        assert!(matches!(
            classify_edge(&req, &good()),
            Err(RelayError::InvalidJson)
        ));

        let req = request(Method::POST, Some("https://evil.example"), "{}");
        assert!(matches!(
            classify_edge(&req, &good()),
            Err(RelayError::ForbiddenOrigin)
        ));
    }

    #[test]
    fn missing_origin_is_forbidden_unless_wildcard() {
        let req = request(Method::POST, None, r#"{"model":"m"}"#);
        assert!(matches!(
            classify_edge(&req, &good()),
            Err(RelayError::ForbiddenOrigin)
        ));
        match classify_edge(&req, &AllowedOrigin::Any) {
            Ok(EdgeDisposition::Forward(body)) => assert_eq!(body["model"], "m"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_body_is_invalid_json() {
        let req = request(Method::POST, Some("https://good.example"), "");
        assert!(matches!(
            classify_edge(&req, &good()),
            Err(RelayError::InvalidJson)
        ));
    }

    #[test]
    fn serverless_ignores_origin() {
        let req = request(Method::POST, Some("https://evil.example"), r#"{"a":1}"#);
        assert_eq!(classify_serverless(&req).unwrap()["a"], 1);

        let req = request(Method::OPTIONS, None, "{}");
        assert!(matches!(
            classify_serverless(&req),
            Err(RelayError::MethodNotAllowed)
        ));
    }

    #[test]
    fn numbers_outside_f64_range_are_valid_json() {
        let req = request(Method::POST, None, r#"{"budget":1e400,"seed":123456789012345678901234567890}"#);
        match classify_edge(&req, &AllowedOrigin::Any) {
            Ok(EdgeDisposition::Forward(body)) => {
                assert_eq!(body["budget"].to_string(), "1e400");
                assert_eq!(body["seed"].to_string(), "123456789012345678901234567890");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
