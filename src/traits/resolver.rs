//! Resolver traits for component resolution.

use std::any::type_name;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{DiError, DiResult};
use crate::registration::AnyArc;

/// Core resolver trait for object-safe resolution by name.
///
/// Most callers should use the [`Resolver`] extension instead, which adds a
/// typed `resolve_as` on top of this trait.
#[async_trait]
pub trait ResolverCore: Send + Sync {
    /// Resolves `name` to its type-erased value.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyArc)` - The resolved component wrapped in `Arc<dyn Any>`
    /// * `Err(DiError)` - Unknown name, cycle, or failed construction
    async fn resolve(&self, name: &str) -> DiResult<AnyArc>;
}

/// High-level resolver interface with typed lookups.
///
/// Implemented for every [`ResolverCore`], including `dyn ResolverCore`.
///
/// # Examples
///
/// ```
/// use quarry::{Registry, Resolver, ResolverCore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut registry = Registry::new();
/// registry.register_value("Port", 8091u16).unwrap();
/// let container = registry.seal().unwrap();
/// let resolver: &dyn ResolverCore = &container;
///
/// let port = resolver.resolve_as::<u16>("Port").await.unwrap();
/// assert_eq!(*port, 8091);
/// assert!(resolver.resolve_as::<String>("Port").await.is_err());
/// # });
/// ```
#[async_trait]
pub trait Resolver: ResolverCore {
    /// Resolves `name` and downcasts it to `T`.
    async fn resolve_as<T>(&self, name: &str) -> DiResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let value = self.resolve(name).await?;
        value.downcast::<T>().map_err(|_| DiError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
