pub mod bootstrap;
pub mod core;
pub mod handler;
pub mod upstream_client;

pub use bootstrap::{Bootstrap, CliArgs, bootstrap, bootstrap_from_env};
pub use core::{Core, CoreState, MAX_BODY_BYTES, SERVERLESS_PATH};
pub use upstream_client::{UpstreamClientConfig, WreqUpstreamClient};
