//! Component lifetime and registration kind definitions.

use serde::Serialize;

/// Component lifetimes controlling instance caching behavior
///
/// # Examples
///
/// ```rust
/// use quarry::{Lifetime, RegisterOptions, Registry};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct RequestModel { id: u32 }
///
/// # tokio_test_block(async {
/// let mut registry = Registry::new();
///
/// // Singleton: one instance for the whole sealed container
/// registry.register_factory("Database", RegisterOptions::singleton(), |_| {
///     Ok(Database { url: "memory://local".to_string() })
/// }).unwrap();
///
/// // Transient: new instance on every resolution
/// registry.register_factory("RequestModel", RegisterOptions::transient(), |_| {
///     Ok(RequestModel { id: 12345 })
/// }).unwrap();
///
/// let container = registry.seal().unwrap();
///
/// let db1 = container.resolve_as::<Database>("Database").await.unwrap();
/// let db2 = container.resolve_as::<Database>("Database").await.unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// let m1 = container.resolve_as::<RequestModel>("RequestModel").await.unwrap();
/// let m2 = container.resolve_as::<RequestModel>("RequestModel").await.unwrap();
/// assert!(!Arc::ptr_eq(&m1, &m2));
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// Single instance per sealed container, cached forever
    ///
    /// Constructed on first resolution and shared by identity across every
    /// later resolution, from any task or thread.
    Singleton,
    /// New instance per resolution, never cached
    #[default]
    Transient,
}

/// How a registration's target is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Target is a factory invoked with the resolved dependencies
    Constructed,
    /// Target is injected verbatim (configuration strings, model types)
    Value,
}
