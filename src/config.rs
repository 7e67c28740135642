use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub record_cache_ttl_secs: u64,
    pub insight_cache_ttl_secs: u64,
    /// Size of the window (in days, ending today) fetched for analytics.
    pub analytics_window_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            record_cache_ttl_secs: env::var("RECORD_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .expect("RECORD_CACHE_TTL_SECS must be a number"),
            insight_cache_ttl_secs: env::var("INSIGHT_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "600".into())
                .parse()
                .expect("INSIGHT_CACHE_TTL_SECS must be a number"),
            analytics_window_days: env::var("ANALYTICS_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .expect("ANALYTICS_WINDOW_DAYS must be a number"),
        }
    }

    pub fn record_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.record_cache_ttl_secs)
    }

    pub fn insight_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.insight_cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            record_cache_ttl_secs: 300,
            insight_cache_ttl_secs: 600,
            analytics_window_days: 30,
        }
    }
}
