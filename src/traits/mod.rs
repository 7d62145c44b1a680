//! Core traits for component resolution.

pub mod resolver;

pub use resolver::{Resolver, ResolverCore};
