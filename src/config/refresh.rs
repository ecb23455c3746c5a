use serde::{Deserialize, Serialize};

/// Refresh scheduling and concurrency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshConfig {
    /// Whether the periodic refresh worker runs. A disabled worker still
    /// allows manually triggered refreshes.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between scheduled refresh runs.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Global cap on concurrently outstanding upstream fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// URL of the enrichment catalog feed.
    #[serde(default = "default_catalog_feed_url")]
    pub catalog_feed_url: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            concurrency: default_concurrency(),
            catalog_feed_url: default_catalog_feed_url(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    3_600
}

fn default_concurrency() -> usize {
    5
}

fn default_catalog_feed_url() -> String {
    "https://models.dev/api.json".to_string()
}
