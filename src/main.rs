use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use findash_backend::app;
use findash_backend::config::AppConfig;
use findash_backend::external::awesome_api::AwesomeApiProvider;
use findash_backend::external::hg_brasil::HgBrasilProvider;
use findash_backend::external::multi_provider::MultiQuoteProvider;
use findash_backend::external::quote_provider::QuoteProvider;
use findash_backend::logging::{init_logging, LoggingConfig};
use findash_backend::services::clock::{Clock, SystemClock};
use findash_backend::services::job_scheduler_service::{JobContext, JobSchedulerService};
use findash_backend::services::quote_cache::QuoteCache;
use findash_backend::state::AppState;
use findash_backend::store::{FileStore, JsonStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = Arc::new(AppConfig::from_env());
    config.validate()?;

    let store = JsonStore::new(Arc::new(FileStore::new(&config.data_dir)));

    // Select quote provider based on QUOTE_PROVIDER env var (defaults to multi)
    let provider_name = std::env::var("QUOTE_PROVIDER").unwrap_or_else(|_| "multi".to_string());

    let provider: Arc<dyn QuoteProvider> = match provider_name.to_lowercase().as_str() {
        "awesome" => {
            tracing::info!("📊 Using quote provider: AwesomeAPI only");
            Arc::new(AwesomeApiProvider::new())
        }
        "hgbrasil" => {
            tracing::info!("📊 Using quote provider: HG Brasil only");
            Arc::new(HgBrasilProvider::new(config.hg_brasil_api_key.clone()))
        }
        "multi" => {
            tracing::info!(
                "📊 Using quote provider: Multi-provider (AwesomeAPI + HG Brasil fallback)"
            );
            let primary = Box::new(AwesomeApiProvider::new());
            let fallback = Box::new(HgBrasilProvider::new(config.hg_brasil_api_key.clone()));
            Arc::new(MultiQuoteProvider::new(primary, fallback))
        }
        _ => {
            return Err(format!(
                "Invalid QUOTE_PROVIDER: {}. Must be 'awesome', 'hgbrasil', or 'multi'",
                provider_name
            )
            .into());
        }
    };

    let quote_cache = QuoteCache::new(config.quote_cache_ttl_secs);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // The scheduler must stay alive for as long as the server runs.
    let _scheduler = if config.scheduler_enabled {
        let context = JobContext {
            store: store.clone(),
            quote_provider: provider.clone(),
            quote_cache: quote_cache.clone(),
            clock: clock.clone(),
        };
        let mut service = JobSchedulerService::new(context).await?;
        service.start(&config.refresh_schedule).await?;
        Some(service)
    } else {
        tracing::info!("Job scheduler disabled via SCHEDULER_ENABLED");
        None
    };

    let state = AppState {
        store,
        quote_provider: provider,
        quote_cache,
        clock,
        config: config.clone(),
    };
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Findash backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
