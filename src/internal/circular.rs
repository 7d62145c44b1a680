//! Circular dependency detection infrastructure.

use std::sync::Arc;

use crate::error::{DiError, DiResult};

/// Names currently under construction within one top-level resolution.
///
/// Resolution is async and may hop threads, so the path travels with the call
/// instead of living in thread-local storage. Each level gets its own copy;
/// sibling dependencies never observe each other's entries.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolutionPath {
    stack: Vec<Arc<str>>,
}

impl ResolutionPath {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Name of the component whose dependencies are being resolved.
    pub(crate) fn current(&self) -> Option<&str> {
        self.stack.last().map(|n| &**n)
    }

    /// Returns the path extended with `name`, or the full cycle if `name` is
    /// already under construction.
    pub(crate) fn enter(&self, name: &Arc<str>) -> DiResult<ResolutionPath> {
        // Circular detection BEFORE pushing the new name
        if self.stack.iter().any(|n| n == name) {
            let mut chain: Vec<String> = self.stack.iter().map(|n| n.to_string()).collect();
            chain.push(name.to_string());
            return Err(DiError::CircularDependency(chain));
        }

        let mut stack = Vec::with_capacity(self.stack.len() + 1);
        stack.extend(self.stack.iter().cloned());
        stack.push(name.clone());
        Ok(ResolutionPath { stack })
    }
}
