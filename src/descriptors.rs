//! Registration descriptors for introspection and diagnostics.

use serde::Serialize;

use crate::lifetime::{Kind, Lifetime};
use crate::registration::Registration;

/// Registration descriptor for introspection and diagnostics
///
/// Snapshot of one registration that can be logged at startup or serialized
/// for health endpoints.
///
/// # Examples
///
/// ```rust
/// use quarry::{Kind, Lifetime, RegisterOptions, Registry};
///
/// let mut registry = Registry::new();
/// registry.register_value("ConnectionString", "memory://local".to_string()).unwrap();
/// registry
///     .register_factory(
///         "Repository",
///         RegisterOptions::singleton().depends_on(["ConnectionString"]),
///         |deps| Ok(deps.get::<String>(0)?.len()),
///     )
///     .unwrap();
///
/// let descriptors = registry.descriptors();
/// assert_eq!(descriptors[0].kind, Kind::Value);
/// assert_eq!(descriptors[1].lifetime, Lifetime::Singleton);
/// assert_eq!(descriptors[1].dependencies, vec!["ConnectionString".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationDescriptor {
    pub name: String,
    pub lifetime: Lifetime,
    pub kind: Kind,
    pub dependencies: Vec<String>,
}

impl From<&Registration> for RegistrationDescriptor {
    fn from(record: &Registration) -> Self {
        Self {
            name: record.name().to_string(),
            lifetime: record.lifetime(),
            kind: record.kind(),
            dependencies: record.dependencies().map(str::to_string).collect(),
        }
    }
}

impl RegistrationDescriptor {
    /// Whether the container caches this component after first construction.
    pub fn is_cached(&self) -> bool {
        self.lifetime == Lifetime::Singleton && self.kind == Kind::Constructed
    }
}
