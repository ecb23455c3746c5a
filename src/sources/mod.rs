//! Source fetchers: one adapter per (provider, channel) pair.
//!
//! Each source is a black box producing a map from model id to a
//! [`PartialModel`], tagged with a [`SourceKind`] that fixes its merge
//! priority. Fetch failures degrade merge quality, never correctness: the
//! orchestrator treats a failed or empty source as "contributes nothing".

mod anthropic;
mod catalog_feed;
mod error;
mod fallback;
mod gemini;
mod openai;
mod retry;

use std::collections::HashMap;

use async_trait::async_trait;

pub use anthropic::AnthropicLiveSource;
pub use catalog_feed::CatalogFeedSource;
pub use error::FetchError;
pub use fallback::StaticFallbackSource;
pub use gemini::GeminiLiveSource;
pub use openai::OpenAiLiveSource;
pub use retry::with_retry;

use crate::catalog::{PartialModel, SourceKind};

/// Map from model id to one source's partial view of it.
pub type PartialsById = HashMap<String, PartialModel>;

/// One channel of model metadata for one provider.
#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Provider this source belongs to (e.g., "openai").
    fn provider(&self) -> &str;

    /// Channel kind, fixing this source's merge priority.
    fn kind(&self) -> SourceKind;

    /// Pull the source's current view. Implementations handle their own
    /// retry/backoff and pagination; a source with nothing to say (e.g.,
    /// missing credentials) returns an empty map, not an error.
    async fn fetch(&self, client: &reqwest::Client) -> Result<PartialsById, FetchError>;
}
