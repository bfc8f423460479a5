use std::sync::Arc;

use crate::analysis::orchestrator::Analyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; concurrent analyses never share mutable state.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub config: Config,
}
