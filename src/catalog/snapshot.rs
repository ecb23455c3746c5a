//! Immutable, pre-indexed catalog snapshots.
//!
//! A snapshot is built once per refresh and never mutated afterwards. All
//! views (id map, sorted list, non-deprecated list, family grouping) share
//! the same `Arc`ed records, so they cannot drift apart and a reader
//! holding an old snapshot keeps a frozen, fully consistent catalog.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};

use super::record::ModelRecord;

/// The entire catalog at one refresh point.
#[derive(Debug)]
pub struct CatalogSnapshot {
    /// O(1) lookup by model id.
    pub models: HashMap<String, Arc<ModelRecord>>,

    /// All records, sorted case-insensitively by display name (id as the
    /// fallback and tie-break).
    pub models_list: Vec<Arc<ModelRecord>>,

    /// `models_list` with deprecated records filtered out.
    pub non_deprecated: Vec<Arc<ModelRecord>>,

    /// Records grouped by family, in `models_list` order. Records with an
    /// empty family are not grouped.
    pub by_family: HashMap<String, Vec<Arc<ModelRecord>>>,

    /// When this snapshot was published; `None` only for the pre-refresh
    /// empty snapshot.
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    /// The empty-but-valid snapshot served before the first refresh.
    pub fn empty() -> Self {
        Self {
            models: HashMap::new(),
            models_list: Vec::new(),
            non_deprecated: Vec::new(),
            by_family: HashMap::new(),
            last_refreshed: None,
        }
    }

    /// Build a snapshot with all indexes precomputed.
    ///
    /// Duplicate ids keep the last occurrence; refresh runs produce each id
    /// exactly once, so this only matters for hand-built inputs.
    pub fn build(models: Vec<ModelRecord>, refreshed_at: DateTime<Utc>) -> Self {
        let mut by_id: HashMap<String, Arc<ModelRecord>> = HashMap::with_capacity(models.len());
        for model in models {
            by_id.insert(model.id.clone(), Arc::new(model));
        }

        let mut models_list: Vec<Arc<ModelRecord>> = by_id.values().cloned().collect();
        models_list.sort_by(|a, b| {
            let a_key = a.display_name().to_lowercase();
            let b_key = b.display_name().to_lowercase();
            a_key.cmp(&b_key).then_with(|| a.id.cmp(&b.id))
        });

        let non_deprecated = models_list
            .iter()
            .filter(|m| !m.deprecated)
            .cloned()
            .collect();

        let mut by_family: HashMap<String, Vec<Arc<ModelRecord>>> = HashMap::new();
        for model in &models_list {
            if !model.family.is_empty() {
                by_family
                    .entry(model.family.clone())
                    .or_default()
                    .push(model.clone());
            }
        }

        Self {
            models: by_id,
            models_list,
            non_deprecated,
            by_family,
            last_refreshed: Some(refreshed_at),
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
