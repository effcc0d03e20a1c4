//! Top-level application controller: owns the dataset and the navigator
//! and injects them into the render layer. Nothing reads ambient globals;
//! the controller is passed wherever state is needed.

use anyhow::Result;

use crate::cache::SnapshotStore;
use crate::config::Config;
use crate::fetch::retry::{retry_async, RetryConfig};
use crate::fetch::{load_all, ResourceFetcher};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::model::{Dataset, DatasetStatus};
use crate::prepare;
use crate::render;
use crate::view::{Navigator, ViewState};

pub struct App {
    dataset: Dataset,
    navigator: Navigator,
    cache: Option<SnapshotStore>,
    retry: RetryConfig,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let cache = match SnapshotStore::open(&config.cache_path) {
            Ok(store) => Some(store),
            Err(e) => {
                log(
                    Level::Warn,
                    Domain::Cache,
                    "cache_unavailable",
                    obj(&[("error", v_str(&e.to_string()))]),
                );
                None
            }
        };
        Self {
            dataset: Dataset::default(),
            navigator: Navigator::new(),
            cache,
            retry: RetryConfig {
                max_retries: config.max_retries,
                base_delay_ms: config.retry_base_ms,
            },
        }
    }

    /// Controller without a cache mirror. Used where persistence is
    /// unwanted, e.g. ephemeral instances and the test suites.
    pub fn without_cache(retry: RetryConfig) -> Self {
        Self {
            dataset: Dataset::default(),
            navigator: Navigator::new(),
            cache: None,
            retry,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn navigator(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Startup accelerator: if the cache mirror holds a snapshot, render
    /// from it immediately; the network refresh that follows replaces it.
    pub fn bootstrap_from_cache(&mut self) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        match cache.load() {
            Some(snapshot) => {
                log(
                    Level::Info,
                    Domain::Cache,
                    "snapshot_restored",
                    obj(&[("participants", serde_json::json!(snapshot.detailed_skills.len()))]),
                );
                self.dataset = snapshot;
                true
            }
            None => false,
        }
    }

    /// Full-batch refresh with bounded retry. On success the dataset is
    /// replaced wholesale and mirrored to the cache. On exhaustion a
    /// previously good dataset is kept untouched; otherwise the status
    /// transitions to `Failed` with a single user-facing message.
    pub async fn refresh(&mut self, fetcher: &dyn ResourceFetcher) {
        let result = retry_async(&self.retry, "dashboard_batch", || async {
            load_all(fetcher).await.map_err(anyhow::Error::from)
        })
        .await;

        match result {
            Ok(dataset) => {
                self.dataset = dataset;
                if let Some(cache) = &mut self.cache {
                    if let Err(e) = cache.save(&self.dataset) {
                        log(
                            Level::Warn,
                            Domain::Cache,
                            "snapshot_save_failed",
                            obj(&[("error", v_str(&e.to_string()))]),
                        );
                    }
                }
            }
            Err(e) => {
                let message = format!("Could not load dashboard data: {}", e);
                log(Level::Error, Domain::Load, "batch_exhausted", obj(&[("error", v_str(&e.to_string()))]));
                if !self.dataset.is_ready() {
                    self.dataset.status = DatasetStatus::Failed(message);
                }
            }
        }
    }

    /// Handle a page request: decode the target state from the query
    /// string, run it through the navigator (deep links take the same path
    /// as clicks), and render the document.
    pub fn page(&mut self, query: &str) -> String {
        let target = ViewState::from_query(query);
        self.navigator.navigate_to(target);
        render::render_document(self.navigator.state(), &self.dataset)
    }

    pub fn stats_json(&self) -> String {
        serde_json::to_string(&prepare::dashboard_stats(&self.dataset)).unwrap_or_default()
    }

    pub fn search_json(&self, query: &str) -> String {
        serde_json::to_string(&prepare::search(&self.dataset, query)).unwrap_or_default()
    }

    pub fn export_json(&self, section: &str) -> String {
        prepare::export_section(&self.dataset, section).to_string()
    }
}

// Re-exported so the binary does not reach into fetch internals.
pub fn http_fetcher(config: &Config) -> Result<crate::fetch::HttpFetcher> {
    crate::fetch::HttpFetcher::new(config)
}
