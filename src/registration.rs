//! Registration records and the uniform construction capability.

use std::any::{type_name, Any};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{BoxError, DiError, DiResult};
use crate::lifetime::{Kind, Lifetime};

/// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Boxed, sendable future
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type-erased factory: ordered dependency values in, instance out.
pub type Factory = Arc<dyn Fn(Dependencies) -> BoxFuture<'static, Result<AnyArc, BoxError>> + Send + Sync>;

/// Components that know how to build themselves from their declared
/// dependencies.
///
/// This is the adapter every constructible type exposes so the container can
/// invoke it without reflection. Arguments arrive in declaration order.
///
/// # Examples
///
/// ```rust
/// use quarry::{BoxError, Component, Dependencies};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserRepository { db: Arc<Database> }
///
/// #[async_trait]
/// impl Component for UserRepository {
///     async fn build(deps: Dependencies) -> Result<Self, BoxError> {
///         Ok(UserRepository { db: deps.get::<Database>(0)? })
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Sized + Send + Sync + 'static {
    /// Builds a new instance from the resolved dependencies.
    async fn build(deps: Dependencies) -> Result<Self, BoxError>;
}

/// What a registration hands to the resolver.
#[derive(Clone)]
pub enum Target {
    /// Invoked with the resolved dependencies on construction
    Factory(Factory),
    /// Injected verbatim
    Value(AnyArc),
}

impl Target {
    /// A plain value, handed through unchanged.
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Target::Value(Arc::new(value))
    }

    /// A synchronous factory.
    pub fn factory<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Dependencies) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Target::Factory(erase(move |deps| {
            let built = f(deps).map(|v| Arc::new(v) as AnyArc);
            Box::pin(async move { built })
        }))
    }

    /// A factory whose construction may suspend.
    pub fn async_factory<T, F, Fut>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        Target::Factory(erase(move |deps| {
            let fut = f(deps);
            Box::pin(async move { fut.await.map(|v| Arc::new(v) as AnyArc) })
        }))
    }

    /// A type implementing [`Component`].
    pub fn component<C: Component>() -> Self {
        Target::Factory(erase(|deps| {
            Box::pin(async move { C::build(deps).await.map(|c| Arc::new(c) as AnyArc) })
        }))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Target::Factory(_) => Kind::Constructed,
            Target::Value(_) => Kind::Value,
        }
    }
}

fn erase<F>(f: F) -> Factory
where
    F: Fn(Dependencies) -> BoxFuture<'static, Result<AnyArc, BoxError>> + Send + Sync + 'static,
{
    Arc::new(f)
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Factory(_) => f.write_str("Target::Factory"),
            Target::Value(_) => f.write_str("Target::Value"),
        }
    }
}

/// Recognized registration options.
///
/// # Examples
///
/// ```rust
/// use quarry::{Lifetime, RegisterOptions};
///
/// let options = RegisterOptions::singleton().depends_on(["UserModelType"]);
/// assert_eq!(options.lifetime, Lifetime::Singleton);
/// assert_eq!(options.dependencies, vec!["UserModelType".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Dependency names, in constructor argument order
    pub dependencies: Vec<String>,
    pub lifetime: Lifetime,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton() -> Self {
        Self {
            lifetime: Lifetime::Singleton,
            ..Self::default()
        }
    }

    pub fn transient() -> Self {
        Self::default()
    }

    /// Appends dependency names, keeping their order.
    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Immutable registration record
pub struct Registration {
    pub(crate) name: Arc<str>,
    pub(crate) target: Target,
    pub(crate) dependencies: Vec<Arc<str>>,
    pub(crate) lifetime: Lifetime,
}

impl Registration {
    pub(crate) fn new(name: Arc<str>, target: Target, options: RegisterOptions) -> Self {
        Self {
            name,
            target,
            dependencies: options.dependencies.into_iter().map(Arc::from).collect(),
            lifetime: options.lifetime,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn kind(&self) -> Kind {
        self.target.kind()
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(|d| &**d)
    }

    /// Singletons that are constructed get a cache slot; values never do.
    pub(crate) fn is_cached_singleton(&self) -> bool {
        self.lifetime == Lifetime::Singleton && self.kind() == Kind::Constructed
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .field("kind", &self.kind())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Resolved dependency values for one construction, in declaration order.
pub struct Dependencies {
    component: Arc<str>,
    values: Vec<(Arc<str>, AnyArc)>,
}

impl Dependencies {
    pub(crate) fn new(component: Arc<str>, values: Vec<(Arc<str>, AnyArc)>) -> Self {
        Self { component, values }
    }

    /// Name of the component being constructed.
    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dependency names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| &**n)
    }

    /// The type-erased value at `index`.
    pub fn raw(&self, index: usize) -> DiResult<&AnyArc> {
        self.values
            .get(index)
            .map(|(_, v)| v)
            .ok_or_else(|| DiError::MissingArgument {
                component: self.component.to_string(),
                index,
            })
    }

    /// The value at `index`, downcast to `T`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let value = self.raw(index)?.clone();
        value.downcast::<T>().map_err(|_| DiError::TypeMismatch {
            name: self.values[index].0.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Clone of the value at `index`; handy for values stored as
    /// `Arc<dyn Trait>`.
    pub fn get_cloned<T: Clone + Send + Sync + 'static>(&self, index: usize) -> DiResult<T> {
        self.get::<T>(index).map(|v| (*v).clone())
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("component", &self.component)
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
