use std::sync::Arc;

use crate::assessment::analysis::TextAnalyzer;
use crate::assessment::catalog::Catalog;
use crate::config::Config;
use crate::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    /// Pluggable text analysis. `DisabledAnalyzer` when no API key is configured.
    pub analyzer: Arc<dyn TextAnalyzer>,
    pub catalog: Arc<Catalog>,
    pub config: Config,
}
