//! Error types for the dependency injection container.

use std::sync::Arc;

/// Boxed error returned by component factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Dependency injection errors
///
/// Configuration-shape errors (`DuplicateRegistration`, `UnknownDependency`,
/// `CircularDependency`, `InvalidRegistration`) are raised while the graph is
/// being declared or sealed and should abort startup. `Construction` and
/// `TypeMismatch` surface per resolution and leave the container usable.
///
/// # Examples
///
/// ```rust
/// use quarry::DiError;
///
/// let circular = DiError::CircularDependency(vec![
///     "A".to_string(),
///     "B".to_string(),
///     "A".to_string(),
/// ]);
/// assert_eq!(circular.to_string(), "Circular dependency: A -> B -> A");
///
/// let unknown = DiError::UnknownDependency {
///     name: "Cache".to_string(),
///     required_by: Some("Repository".to_string()),
/// };
/// assert_eq!(unknown.to_string(), "Unknown dependency: Cache (required by Repository)");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// `register` was called twice with the same name
    #[error("Component already registered: {0}")]
    DuplicateRegistration(String),

    /// A name (or a declared dependency) has no registration
    #[error(
        "Unknown dependency: {name}{}",
        .required_by.as_deref().map(|by| format!(" (required by {by})")).unwrap_or_default()
    )]
    UnknownDependency {
        name: String,
        required_by: Option<String>,
    },

    /// Dependency chain revisits a name already under construction (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),

    /// The factory of a component failed
    #[error("Failed to construct {name}: {source}")]
    Construction {
        name: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Resolved value could not be downcast to the requested type
    #[error("Type mismatch for {name}: expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    /// A factory asked for an argument position it never declared
    #[error("{component} has no dependency at position {index}")]
    MissingArgument { component: String, index: usize },

    /// Registration rejected before it entered the graph
    #[error("Invalid registration for {name}: {reason}")]
    InvalidRegistration { name: String, reason: &'static str },

    /// A process-wide container has already been installed
    #[error("A container is already installed for this process")]
    AlreadyInstalled,
}

impl DiError {
    pub(crate) fn construction(name: &str, source: BoxError) -> Self {
        DiError::Construction {
            name: name.to_string(),
            source: Arc::from(source),
        }
    }

    /// The error a failing factory returned, for downcasting.
    pub fn construction_cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DiError::Construction { source, .. } => Some(&**source),
            _ => None,
        }
    }

    /// Returns true for errors that describe a broken graph rather than a
    /// failed construction.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DiError::DuplicateRegistration(_)
                | DiError::UnknownDependency { .. }
                | DiError::CircularDependency(_)
                | DiError::InvalidRegistration { .. }
        )
    }
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
