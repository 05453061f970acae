use std::sync::Arc;

use crate::config::Config;
use crate::itglue::AssetSource;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// IT Glue in production; swapped for a canned source in tests.
    pub itglue: Arc<dyn AssetSource>,
    pub config: Config,
}
