//! Relay policy shared by every deployment target.
//!
//! This crate intentionally does **not** depend on axum or any concrete HTTP client.
//! Host adapters turn their native request into a [`RelayRequest`], hand it to [`Relay`],
//! and map the returned [`RelayResponse`] back; the outbound call goes through
//! [`UpstreamClient`].

pub mod classify;
pub mod cors;
pub mod errors;
pub mod headers;
pub mod relay;
pub mod request;
pub mod response;
pub mod upstream;

pub use classify::{EdgeDisposition, classify_edge, classify_serverless};
pub use errors::RelayError;
pub use headers::{Headers, header_get, header_set};
pub use relay::{
    Relay, RelayEnv, UPSTREAM_REQUEST_ID_HEADER, build_upstream_request, upstream_request_id,
};
pub use request::RelayRequest;
pub use response::RelayResponse;
pub use upstream::{
    UpstreamClient, UpstreamFailure, UpstreamHttpRequest, UpstreamHttpResponse,
    UpstreamTransportErrorKind,
};
