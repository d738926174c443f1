use std::sync::Arc;

use crate::config::AppConfig;
use crate::external::quote_provider::QuoteProvider;
use crate::services::clock::Clock;
use crate::services::quote_cache::QuoteCache;
use crate::store::JsonStore;

#[derive(Clone)]
pub struct AppState {
    pub store: JsonStore,
    pub quote_provider: Arc<dyn QuoteProvider>,
    pub quote_cache: QuoteCache,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}
