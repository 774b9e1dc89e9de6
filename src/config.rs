use crate::errors::{SiteError, SiteResult};
use crate::metrics::display::DEFAULT_CUMULATIVE_CAP;
use std::path::PathBuf;

/// Alpaca market-data credentials. Both halves are required.
#[derive(Clone)]
pub struct AlpacaCredentials {
    pub key_id: String,
    pub secret_key: String,
}

impl std::fmt::Debug for AlpacaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaCredentials")
            .field("key_id", &self.key_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` leaves the process running but fails every proxy request.
    pub alpaca: Option<AlpacaCredentials>,
    pub alpaca_data_url: String,
    pub benchmark_symbol: String,
    pub alpaca_feed: String,
    pub benchmark_start: String,
    pub benchmark_refresh_secs: u64,
    pub cumulative_display_cap: f64,
    pub server_port: u16,
    pub static_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> SiteResult<Self> {
        dotenvy::dotenv().ok();

        let benchmark_refresh_secs = env_var_or("BENCHMARK_REFRESH_SECS", "21600")
            .parse::<u64>()
            .map_err(|e| SiteError::Config(format!("BENCHMARK_REFRESH_SECS: {e}")))?;

        let cumulative_display_cap = env_var_or("CUMULATIVE_DISPLAY_CAP", &DEFAULT_CUMULATIVE_CAP.to_string())
            .parse::<f64>()
            .map_err(|e| SiteError::Config(format!("CUMULATIVE_DISPLAY_CAP: {e}")))?;

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| SiteError::Config(format!("SERVER_PORT: {e}")))?;

        let benchmark_start = env_var_or("BENCHMARK_START", "2020-01-01");
        chrono::NaiveDate::parse_from_str(&benchmark_start, "%Y-%m-%d")
            .map_err(|e| SiteError::Config(format!("BENCHMARK_START: {e}")))?;

        let alpaca = match (env_var("ALPACA_KEY_ID"), env_var("ALPACA_SECRET_KEY")) {
            (Some(key_id), Some(secret_key)) => Some(AlpacaCredentials { key_id, secret_key }),
            _ => None,
        };

        Ok(Self {
            alpaca,
            alpaca_data_url: env_var_or("ALPACA_DATA_URL", "https://data.alpaca.markets"),
            benchmark_symbol: env_var_or("BENCHMARK_SYMBOL", "SPY"),
            alpaca_feed: env_var_or("ALPACA_FEED", "iex"),
            benchmark_start,
            benchmark_refresh_secs: benchmark_refresh_secs.max(60),
            cumulative_display_cap,
            server_port,
            static_dir: PathBuf::from(env_var_or("STATIC_DIR", "site/dist")),
        })
    }
}

/// Unset and blank are treated the same.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_var_or(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
pub(crate) fn test_config(data_url: &str, with_keys: bool) -> AppConfig {
    AppConfig {
        alpaca: with_keys.then(|| AlpacaCredentials {
            key_id: "test-key".into(),
            secret_key: "test-secret".into(),
        }),
        alpaca_data_url: data_url.to_string(),
        benchmark_symbol: "SPY".into(),
        alpaca_feed: "iex".into(),
        benchmark_start: "2020-01-01".into(),
        benchmark_refresh_secs: 21600,
        cumulative_display_cap: 400.0,
        server_port: 0,
        static_dir: PathBuf::from("site/dist"),
    }
}
