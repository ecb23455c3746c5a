//! Copy-on-write catalog store with lock-free snapshot reads.
//!
//! Readers clone an `Arc` to the current [`CatalogSnapshot`]; writers build
//! a replacement snapshot off to the side and swap the pointer in one
//! store. The write lock guards only that pointer store, so a read never
//! waits on snapshot construction and never observes a half-built
//! snapshot.
//!
//! Refresh coordination is single-flight: at most one [`RefreshPermit`]
//! exists at a time, acquisition never blocks, and `publish` is only
//! callable by the permit holder.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{record::ModelRecord, snapshot::CatalogSnapshot};
use crate::db::CatalogDb;

/// Returned by [`CatalogStore::begin_refresh`] when a refresh already holds
/// the permit. Expected contention, not a fault; callers decide whether to
/// surface it (the HTTP layer maps it to 409).
#[derive(Debug, thiserror::Error)]
#[error("refresh already in progress")]
pub struct RefreshInProgress;

/// Exclusive ownership of the in-flight refresh.
///
/// Dropping the permit returns the store to idle. `publish` takes the
/// permit by reference, so publishing without having won `begin_refresh`
/// does not typecheck.
pub struct RefreshPermit {
    _guard: OwnedMutexGuard<()>,
}

/// The owned catalog state: one atomically swappable snapshot reference
/// plus the single-flight refresh gate and optional durable backing.
pub struct CatalogStore {
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    refresh_gate: Arc<Mutex<()>>,
    db: Option<CatalogDb>,
}

impl CatalogStore {
    /// Create a store serving the empty snapshot, optionally backed by a
    /// durable database for warm restarts.
    pub fn new(db: Option<CatalogDb>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::empty())),
            refresh_gate: Arc::new(Mutex::new(())),
            db,
        }
    }

    /// The current snapshot. Never blocks, never fails; before the first
    /// refresh this is the empty snapshot.
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().clone()
    }

    /// O(1) lookup against the current snapshot.
    pub fn get(&self, model_id: &str) -> Option<Arc<ModelRecord>> {
        self.current().models.get(model_id).cloned()
    }

    /// Try to become the one in-flight refresh. Fails immediately on
    /// contention; there is no queue and no blocking wait.
    pub fn begin_refresh(&self) -> Result<RefreshPermit, RefreshInProgress> {
        match self.refresh_gate.clone().try_lock_owned() {
            Ok(guard) => Ok(RefreshPermit { _guard: guard }),
            Err(_) => Err(RefreshInProgress),
        }
    }

    /// Build and publish a replacement snapshot, then persist it
    /// best-effort. The whole batch replaces the previous catalog; there is
    /// no partial update.
    pub async fn publish(
        &self,
        _permit: &RefreshPermit,
        models: Vec<ModelRecord>,
    ) -> Arc<CatalogSnapshot> {
        let snapshot = Arc::new(CatalogSnapshot::build(models, Utc::now()));

        {
            let mut current = self.snapshot.write();
            *current = snapshot.clone();
        }

        if let Some(db) = &self.db {
            if let Err(e) = db.persist(&snapshot).await {
                tracing::warn!(error = %e, "Failed to persist snapshot, continuing in-memory");
            }
        }

        snapshot
    }

    /// Load the persisted catalog, if any, and serve it as the current
    /// snapshot. Returns the number of restored records; any failure is a
    /// cold start, never an error.
    pub async fn restore(&self) -> usize {
        let Some(db) = &self.db else {
            return 0;
        };

        let (models, saved_at) = match db.restore().await {
            Ok(Some(rows)) => rows,
            Ok(None) => return 0,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore persisted catalog, starting cold");
                return 0;
            }
        };

        let count = models.len();
        let snapshot = Arc::new(CatalogSnapshot::build(models, saved_at));
        let mut current = self.snapshot.write();
        *current = snapshot;
        count
    }
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("models", &self.current().len())
            .field("persistent", &self.db.is_some())
            .finish()
    }
}
