pub mod domain;
pub mod ingest;
pub mod ledger;
pub mod storage;

pub mod config {
    /// Default static credential. Illustrative only, not a security boundary.
    pub const DEFAULT_API_KEY: &str = "demo_key";

    /// Synthetic user bound to the static credential.
    pub const DEMO_USER_ID: i64 = 1;
    pub const DEMO_USER_NAME: &str = "Demo User";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub api_key: Option<String>,
        pub market_data_base_url: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                api_key: std::env::var("API_KEY").ok(),
                market_data_base_url: std::env::var("MARKET_DATA_BASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn api_key(&self) -> &str {
            self.api_key.as_deref().unwrap_or(DEFAULT_API_KEY)
        }
    }
}
