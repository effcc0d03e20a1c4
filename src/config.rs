//! Runtime configuration, env-var driven with sensible defaults.

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL the JSON resources hang off, e.g. `http://localhost:8000/data`.
    pub data_base: String,
    /// Bind address for the dashboard HTTP server.
    pub listen_addr: String,
    /// Path of the sqlite file mirroring the last good dataset.
    pub cache_path: String,
    /// Full-batch retry bound.
    pub max_retries: u32,
    /// First retry waits this long; subsequent retries grow linearly.
    pub retry_base_ms: u64,
    /// Per-request timeout for a single resource fetch.
    pub fetch_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_base: std::env::var("DATA_BASE")
                .unwrap_or_else(|_| "http://localhost:8000/data".to_string()),
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            cache_path: std::env::var("CACHE_PATH")
                .unwrap_or_else(|_| "./dashboard-cache.sqlite".to_string()),
            max_retries: std::env::var("MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_base_ms: std::env::var("RETRY_BASE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
