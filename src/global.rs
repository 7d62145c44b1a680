//! The process-wide container instance and access functions.

use once_cell::sync::OnceCell;

use crate::container::Container;
use crate::error::{DiError, DiResult};

// The one and only installed container. Set once at startup, never replaced.
static GLOBAL_CONTAINER: OnceCell<Container> = OnceCell::new();

/// Publishes `container` as the process-wide composition root.
///
/// Only one graph may be installed per process; a second call fails with
/// [`DiError::AlreadyInstalled`] and leaves the first container in place.
///
/// # Examples
///
/// ```
/// use quarry::{global, Registry};
///
/// let mut registry = Registry::new();
/// registry.register_value("ConnectionString", "memory://local".to_string()).unwrap();
///
/// let installed = global::install(registry.seal().unwrap()).unwrap();
/// assert!(installed.contains("ConnectionString"));
/// assert!(global::container().is_some());
///
/// assert!(global::install(quarry::Registry::new().seal().unwrap()).is_err());
/// ```
pub fn install(container: Container) -> DiResult<&'static Container> {
    GLOBAL_CONTAINER
        .set(container)
        .map_err(|_| DiError::AlreadyInstalled)?;
    tracing::debug!("container installed as process-wide composition root");
    GLOBAL_CONTAINER.get().ok_or(DiError::AlreadyInstalled)
}

/// The installed container, if any.
pub fn container() -> Option<&'static Container> {
    GLOBAL_CONTAINER.get()
}
