use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::any;
use llm_relay_core::{Relay, RelayEnv, UpstreamClient};

use crate::handler::{edge_handler, serverless_handler};

/// Path served by the function-style adapter; every other path is the edge adapter.
pub const SERVERLESS_PATH: &str = "/api/claude";

/// Chat payloads carry base64 images, well past axum's 2 MiB default.
pub const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

pub struct CoreState {
    pub relay: Relay,
}

pub struct Core {
    state: Arc<CoreState>,
}

impl Core {
    pub fn new(env: Arc<dyn RelayEnv>, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self {
            state: Arc::new(CoreState {
                relay: Relay::new(env, upstream),
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(SERVERLESS_PATH, any(serverless_handler))
            .fallback(edge_handler)
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .with_state(self.state.clone())
    }

    pub fn state(&self) -> Arc<CoreState> {
        self.state.clone()
    }
}
