use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub environment: String,
    pub cron_secret: Option<String>,
    pub hg_brasil_api_key: String,
    pub quote_cache_ttl_secs: u64,
    pub scheduler_enabled: bool,
    pub refresh_schedule: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            cron_secret: std::env::var("CRON_SECRET").ok(),
            hg_brasil_api_key: std::env::var("HG_BRASIL_API_KEY")
                .unwrap_or_else(|_| "development".to_string()),
            quote_cache_ttl_secs: std::env::var("QUOTE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            scheduler_enabled: std::env::var("SCHEDULER_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            refresh_schedule: std::env::var("MARKET_REFRESH_SCHEDULE")
                .unwrap_or_else(|_| "0 0 * * * *".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_production() && self.cron_secret.is_none() {
            return Err("CRON_SECRET must be set when ENVIRONMENT is production".to_string());
        }
        Ok(())
    }
}
