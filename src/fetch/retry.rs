use std::future::Future;

use anyhow::{anyhow, Result};
use tokio::time::{sleep, Duration};

use crate::logging::{log, obj, v_str, Domain, Level};

/// Retry configuration for the full-batch load.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    /// Linearly increasing backoff: base, 2*base, 3*base, ...
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms * (attempt as u64 + 1))
    }
}

/// Retry a fallible async operation with linear backoff.
pub async fn retry_async<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error: Option<anyhow::Error> = None;

    for attempt in 0..=config.max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt < config.max_retries {
                    let delay = config.delay_for_attempt(attempt);
                    log(
                        Level::Warn,
                        Domain::Load,
                        "attempt_failed",
                        obj(&[
                            ("operation", v_str(operation_name)),
                            ("attempt", serde_json::json!(attempt + 1)),
                            ("attempts_max", serde_json::json!(config.max_retries + 1)),
                            ("error", v_str(&e.to_string())),
                            ("retry_in_ms", serde_json::json!(delay.as_millis() as u64)),
                        ]),
                    );
                    sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("retry exhausted without a recorded error")))
}
