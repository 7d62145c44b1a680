//! # quarry
//!
//! A name-keyed inversion-of-control container, and the layered REST backend
//! (users, games, webhooks) it wires together.
//!
//! ## Features
//!
//! - **Two phases**: an open [`Registry`] accepts registrations; sealing it
//!   validates the graph and yields an immutable [`Container`]
//! - **Lifetimes**: singletons are built once and cached, transients are built
//!   on every resolution, values are handed through unchanged
//! - **Cycle detection**: singleton-rooted cycles are rejected at seal, any
//!   remaining cycle is reported with its full path at resolve time
//! - **Concurrent lazy initialization**: simultaneous first resolutions of a
//!   singleton share a single construction; failures are not cached
//! - **Async factories**: construction may suspend, e.g. to open a connection
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::{RegisterOptions, Registry};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut registry = Registry::new();
//! registry.register_value("ConnectionString", "postgres://localhost".to_string()).unwrap();
//! registry
//!     .register_factory(
//!         "Database",
//!         RegisterOptions::singleton().depends_on(["ConnectionString"]),
//!         |deps| Ok(Database { connection_string: deps.get_cloned::<String>(0)? }),
//!     )
//!     .unwrap();
//! registry
//!     .register_factory(
//!         "UserService",
//!         RegisterOptions::transient().depends_on(["Database"]),
//!         |deps| Ok(UserService { db: deps.get::<Database>(0)? }),
//!     )
//!     .unwrap();
//!
//! let container = registry.seal().unwrap();
//! let users = container.resolve_as::<UserService>("UserService").await.unwrap();
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//! # });
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton**: Created once on first resolution and shared afterwards
//! - **Transient**: Created fresh on every resolution
//!
//! A registration's [`Kind`] is derived from its [`Target`]: values are never
//! constructed, so their lifetime has no effect.
//!
//! ## Components
//!
//! Types that build themselves implement [`Component`]:
//!
//! ```rust
//! use async_trait::async_trait;
//! use quarry::{BoxError, Component, Dependencies, RegisterOptions, Registry};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! #[async_trait]
//! impl Component for Greeter {
//!     async fn build(deps: Dependencies) -> Result<Self, BoxError> {
//!         Ok(Greeter { greeting: deps.get_cloned::<String>(0)? })
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_value("Greeting", "hello".to_string()).unwrap();
//! registry
//!     .register_component::<Greeter>("Greeter", RegisterOptions::singleton().depends_on(["Greeting"]))
//!     .unwrap();
//! assert!(registry.seal().is_ok());
//! ```
//!
//! ## The backend
//!
//! [`app::bootstrap`] registers the backend's configuration values, model
//! types, repositories, services and controllers. With the
//! `axum-integration` feature, `app::http::router` serves them and resolves a
//! controller per request.

pub mod app;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod global;
pub mod lifetime;
pub mod logging;
pub mod observer;
pub mod registration;
pub mod registry;
pub mod traits;
pub mod validation;

mod internal;

pub use container::Container;
pub use descriptors::RegistrationDescriptor;
pub use error::{BoxError, DiError, DiResult};
pub use lifetime::{Kind, Lifetime};
pub use observer::{ResolutionObserver, TracingObserver};
pub use registration::{AnyArc, BoxFuture, Component, Dependencies, Factory, RegisterOptions, Registration, Target};
pub use registry::Registry;
pub use traits::{Resolver, ResolverCore};
pub use validation::ValidationWarning;
