use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub records_api_url: String,
    pub records_service_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            records_api_url: env::var("RECORDS_API_URL")
                .unwrap_or_else(|_| {
                    warn!("RECORDS_API_URL not set, using empty value");
                    String::new()
                }),
            records_service_key: env::var("RECORDS_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("RECORDS_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.records_api_url.is_empty() && !self.records_service_key.is_empty()
    }
}
