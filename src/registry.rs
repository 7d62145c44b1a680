//! Registration phase of the container.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::container::Container;
use crate::descriptors::RegistrationDescriptor;
use crate::error::{BoxError, DiError, DiResult};
use crate::observer::{Observers, ResolutionObserver};
use crate::registration::{Component, Dependencies, RegisterOptions, Registration, Target};
use crate::validation::GraphValidator;

/// Collection of component registrations, consumed by [`Registry::seal`].
///
/// The registry is the composition root's builder: every component is
/// declared here by name with its dependency names and lifetime. Sealing
/// validates the whole graph and produces the immutable [`Container`]; since
/// `seal` takes the registry by value, nothing can be registered afterwards.
///
/// # Examples
///
/// ```
/// use quarry::{RegisterOptions, Registry};
///
/// struct Repository { collection: String }
///
/// let mut registry = Registry::new();
/// registry.register_value("GameModelType", "games".to_string())?;
/// registry.register_factory(
///     "GameRepositorySingleton",
///     RegisterOptions::singleton().depends_on(["GameModelType"]),
///     |deps| Ok(Repository { collection: (*deps.get::<String>(0)?).clone() }),
/// )?;
///
/// let container = registry.seal()?;
/// assert!(container.contains("GameRepositorySingleton"));
/// # Ok::<(), quarry::DiError>(())
/// ```
#[derive(Default)]
pub struct Registry {
    records: Vec<Registration>,
    index: HashMap<Arc<str>, usize>,
    observers: Observers,
}

impl Registry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            observers: Observers::new(),
        }
    }

    /// Registers `target` under `name`.
    ///
    /// Fails with [`DiError::DuplicateRegistration`] if the name is taken and
    /// with [`DiError::InvalidRegistration`] for an empty name or a value
    /// that declares dependencies.
    pub fn register(&mut self, name: impl Into<String>, target: Target, options: RegisterOptions) -> DiResult<&mut Self> {
        let name: String = name.into();
        if name.is_empty() {
            return Err(DiError::InvalidRegistration {
                name,
                reason: "name must not be empty",
            });
        }
        if matches!(target, Target::Value(_)) && !options.dependencies.is_empty() {
            return Err(DiError::InvalidRegistration {
                name,
                reason: "value registrations cannot declare dependencies",
            });
        }
        if self.index.contains_key(name.as_str()) {
            return Err(DiError::DuplicateRegistration(name));
        }

        let name: Arc<str> = Arc::from(name);
        self.index.insert(name.clone(), self.records.len());
        self.records.push(Registration::new(name, target, options));
        Ok(self)
    }

    /// Registers a value that is injected verbatim.
    pub fn register_value<T>(&mut self, name: impl Into<String>, value: T) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
    {
        self.register(name, Target::value(value), RegisterOptions::default())
    }

    /// Registers a synchronous factory.
    pub fn register_factory<T, F>(&mut self, name: impl Into<String>, options: RegisterOptions, factory: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(Dependencies) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.register(name, Target::factory(factory), options)
    }

    /// Registers a factory whose construction may suspend.
    pub fn register_async_factory<T, F, Fut>(&mut self, name: impl Into<String>, options: RegisterOptions, factory: F) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(Dependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        self.register(name, Target::async_factory(factory), options)
    }

    /// Registers a type implementing [`Component`].
    pub fn register_component<C: Component>(&mut self, name: impl Into<String>, options: RegisterOptions) -> DiResult<&mut Self> {
        self.register(name, Target::component::<C>(), options)
    }

    /// Adds an observer notified around every construction.
    pub fn add_observer(&mut self, observer: Arc<dyn ResolutionObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> Vec<RegistrationDescriptor> {
        self.records.iter().map(RegistrationDescriptor::from).collect()
    }

    /// Validates the graph and freezes it into a [`Container`].
    ///
    /// Fails with [`DiError::UnknownDependency`] or
    /// [`DiError::CircularDependency`]; the process should refuse to start.
    pub fn seal(self) -> DiResult<Container> {
        let warnings = GraphValidator::new(&self.records, &self.index).validate()?;
        for warning in &warnings {
            tracing::warn!(%warning, "registration graph warning");
        }

        let container = Container::new(self.records, self.index, self.observers);
        tracing::info!(
            components = container.len(),
            singletons = container.singleton_capacity(),
            "container sealed"
        );
        Ok(container)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("records", &self.records)
            .field("observers", &self.observers.len())
            .finish()
    }
}
