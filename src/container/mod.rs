//! Sealed container: resolution of registered components by name.

use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::descriptors::RegistrationDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::{ResolutionPath, SingletonCache};
use crate::lifetime::Lifetime;
use crate::observer::Observers;
use crate::registration::{AnyArc, BoxFuture, Dependencies, Factory, Registration, Target};
use crate::traits::ResolverCore;

/// Sealed, immutable component graph.
///
/// Produced by [`Registry::seal`](crate::Registry::seal). Registrations can no
/// longer change; the only mutable state is the singleton cache, which is
/// populated lazily and at most once per name.
///
/// # Thread Safety
///
/// `Container` is `Send + Sync` and cheap to clone (it uses `Arc` internally);
/// clones share the same singleton cache. Any number of tasks may resolve
/// concurrently.
///
/// # Examples
///
/// ```
/// use quarry::{RegisterOptions, Registry};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UsersService { db: Arc<Database> }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut registry = Registry::new();
/// registry.register_value("ConnectionString", "memory://local".to_string()).unwrap();
/// registry.register_factory(
///     "Database",
///     RegisterOptions::singleton().depends_on(["ConnectionString"]),
///     |deps| Ok(Database { url: (*deps.get::<String>(0)?).clone() }),
/// ).unwrap();
/// registry.register_factory(
///     "UsersService",
///     RegisterOptions::transient().depends_on(["Database"]),
///     |deps| Ok(UsersService { db: deps.get::<Database>(0)? }),
/// ).unwrap();
///
/// let container = registry.seal().unwrap();
/// let a = container.resolve_as::<UsersService>("UsersService").await.unwrap();
/// let b = container.resolve_as::<UsersService>("UsersService").await.unwrap();
/// assert!(!Arc::ptr_eq(&a, &b));
/// assert!(Arc::ptr_eq(&a.db, &b.db));
/// assert_eq!(a.db.url, "memory://local");
/// # });
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    records: Vec<Registration>,
    index: HashMap<Arc<str>, usize>,
    singletons: SingletonCache,
    observers: Observers,
}

impl Container {
    pub(crate) fn new(records: Vec<Registration>, index: HashMap<Arc<str>, usize>, observers: Observers) -> Self {
        let singletons = SingletonCache::new(
            records
                .iter()
                .filter(|r| r.is_cached_singleton())
                .map(|r| r.name.clone()),
        );
        Self {
            inner: Arc::new(ContainerInner {
                records,
                index,
                singletons,
                observers,
            }),
        }
    }

    /// Resolves `name` to its type-erased value.
    ///
    /// Values are returned as registered, cached singletons are returned
    /// without side effects, everything else is constructed after its
    /// dependencies have been resolved left to right.
    pub async fn resolve(&self, name: &str) -> DiResult<AnyArc> {
        self.resolve_in(name, ResolutionPath::new()).await
    }

    /// Resolves `name` and downcasts it to `T`.
    pub async fn resolve_as<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        let value = self.resolve(name).await?;
        value.downcast::<T>().map_err(|_| DiError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> Vec<RegistrationDescriptor> {
        self.inner.records.iter().map(RegistrationDescriptor::from).collect()
    }

    /// Number of singletons constructed so far.
    pub fn cached_singletons(&self) -> usize {
        self.inner.singletons.initialized()
    }

    pub(crate) fn singleton_capacity(&self) -> usize {
        self.inner.singletons.capacity()
    }

    fn resolve_in<'a>(&'a self, name: &'a str, path: ResolutionPath) -> BoxFuture<'a, DiResult<AnyArc>> {
        Box::pin(async move {
            let &index = self.inner.index.get(name).ok_or_else(|| DiError::UnknownDependency {
                name: name.to_string(),
                required_by: path.current().map(str::to_string),
            })?;
            let record = &self.inner.records[index];

            let factory = match &record.target {
                Target::Value(value) => return Ok(value.clone()),
                Target::Factory(factory) => factory,
            };

            if record.lifetime == Lifetime::Singleton {
                if let Some(cached) = self.inner.singletons.get(name) {
                    return Ok(cached);
                }
            }

            let path = path.enter(&record.name)?;
            match record.lifetime {
                Lifetime::Singleton => {
                    // runs detached: a dropped caller must not abandon the construction
                    let container = self.clone();
                    let construction = tokio::spawn(async move { container.construct_singleton(index, path).await });
                    construction
                        .await
                        .map_err(|e| DiError::construction(&record.name, Box::new(e)))?
                }
                Lifetime::Transient => self.construct(record, factory, path).await,
            }
        })
    }

    async fn construct_singleton(&self, index: usize, path: ResolutionPath) -> DiResult<AnyArc> {
        let record = &self.inner.records[index];
        let Target::Factory(factory) = &record.target else {
            return Err(DiError::InvalidRegistration {
                name: record.name.to_string(),
                reason: "value registered as cached singleton",
            });
        };
        self.inner
            .singletons
            .get_or_create(&record.name, || self.construct(record, factory, path))
            .await
    }

    async fn construct(&self, record: &Registration, factory: &Factory, path: ResolutionPath) -> DiResult<AnyArc> {
        let observers = &self.inner.observers;
        let started = observers.start(&record.name, record.lifetime);

        let result = self.construct_inner(record, factory, path).await;

        observers.finish(&record.name, started, &result);
        result
    }

    async fn construct_inner(&self, record: &Registration, factory: &Factory, path: ResolutionPath) -> DiResult<AnyArc> {
        // argument position is significant: strictly left to right
        let mut values = Vec::with_capacity(record.dependencies.len());
        for dep in &record.dependencies {
            let value = self.resolve_in(dep, path.clone()).await?;
            values.push((dep.clone(), value));
        }

        let deps = Dependencies::new(record.name.clone(), values);
        let instance = factory(deps)
            .await
            .map_err(|source| DiError::construction(&record.name, source))?;

        tracing::debug!(component = %record.name, lifetime = ?record.lifetime, "constructed component");
        Ok(instance)
    }
}

#[async_trait]
impl ResolverCore for Container {
    async fn resolve(&self, name: &str) -> DiResult<AnyArc> {
        Container::resolve(self, name).await
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("components", &self.len())
            .field("cached_singletons", &self.cached_singletons())
            .finish()
    }
}
