//! Diagnostic observers for resolution events.
//!
//! Observers are registered on the [`Registry`](crate::Registry) before it is
//! sealed and are notified around every construction (cache hits and value
//! pass-through are not reported).

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::DiError;
use crate::lifetime::Lifetime;

/// Observer trait for dependency injection construction events.
///
/// Calls are made synchronously on the resolving task. Keep implementations
/// lightweight.
///
/// # Examples
///
/// ```
/// use quarry::{DiError, Lifetime, Registry, ResolutionObserver};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct PrintObserver;
///
/// impl ResolutionObserver for PrintObserver {
///     fn resolving(&self, name: &str, lifetime: Lifetime) {
///         println!("constructing {} ({:?})", name, lifetime);
///     }
///
///     fn resolved(&self, name: &str, duration: Duration) {
///         println!("constructed {} in {:?}", name, duration);
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.add_observer(Arc::new(PrintObserver));
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Called before a component's dependencies are resolved.
    fn resolving(&self, name: &str, lifetime: Lifetime);

    /// Called after the factory returned successfully.
    fn resolved(&self, name: &str, duration: Duration);

    /// Called when resolving or constructing the component failed.
    fn failed(&self, _name: &str, _error: &DiError) {}
}

/// Forwards resolution events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ResolutionObserver for TracingObserver {
    fn resolving(&self, name: &str, lifetime: Lifetime) {
        tracing::trace!(component = name, ?lifetime, "resolving component");
    }

    fn resolved(&self, name: &str, duration: Duration) {
        tracing::debug!(component = name, elapsed_us = duration.as_micros() as u64, "component constructed");
    }

    fn failed(&self, name: &str, error: &DiError) {
        tracing::warn!(component = name, %error, "component resolution failed");
    }
}

/// Internal observer list, frozen at seal.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Notifies `resolving` and returns the start instant for `finish`.
    pub(crate) fn start(&self, name: &str, lifetime: Lifetime) -> Option<Instant> {
        if !self.has_observers() {
            return None;
        }
        for observer in &self.observers {
            observer.resolving(name, lifetime);
        }
        Some(Instant::now())
    }

    pub(crate) fn finish<T>(&self, name: &str, started: Option<Instant>, result: &Result<T, DiError>) {
        let Some(started) = started else { return };
        match result {
            Ok(_) => {
                let duration = started.elapsed();
                for observer in &self.observers {
                    observer.resolved(name, duration);
                }
            }
            Err(error) => {
                for observer in &self.observers {
                    observer.failed(name, error);
                }
            }
        }
    }
}
