//! Singleton lifecycle management.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::DiResult;
use crate::registration::AnyArc;

/// Owned singleton storage of a sealed container.
///
/// One async `OnceCell` is allocated per constructed singleton when the
/// container is sealed, so the map itself is never mutated afterwards and can
/// be read without locking. Each cell doubles as the in-flight marker: while a
/// construction is running, every other caller for the same name parks on the
/// cell instead of starting a duplicate, even if the constructor suspends.
/// The container drives `get_or_create` from a spawned task, so a caller that
/// is dropped mid-construction does not release the cell early.
///
/// # Lifecycle
///
/// - **Seal**: cells created empty
/// - **First resolution**: exactly one construction runs; on success the value
///   is stored, on failure the cell stays empty and the next caller retries
/// - **Afterwards**: the stored value is returned as-is until the container
///   is dropped
pub(crate) struct SingletonCache {
    cells: HashMap<Arc<str>, OnceCell<AnyArc>>,
}

impl SingletonCache {
    pub(crate) fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = Arc<str>>,
    {
        Self {
            cells: names.into_iter().map(|n| (n, OnceCell::new())).collect(),
        }
    }

    /// Cached value for `name`, if construction already completed.
    #[inline]
    pub(crate) fn get(&self, name: &str) -> Option<AnyArc> {
        self.cells.get(name).and_then(|cell| cell.get().cloned())
    }

    /// Returns the cached value or runs `create` exactly once across all
    /// concurrent callers.
    pub(crate) async fn get_or_create<F, Fut>(&self, name: &str, create: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DiResult<AnyArc>>,
    {
        match self.cells.get(name) {
            Some(cell) => cell.get_or_try_init(create).await.cloned(),
            // not a cached singleton
            None => create().await,
        }
    }

    /// Number of singletons constructed so far.
    pub(crate) fn initialized(&self) -> usize {
        self.cells.values().filter(|cell| cell.initialized()).count()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.cells.len()
    }
}
