//! Seal-time validation of the registration graph.
//!
//! Runs once when a [`Registry`](crate::Registry) is sealed, so broken wiring
//! fails process startup instead of the first live request.
//!
//! # Validation Rules
//!
//! - **Missing Dependencies**: Error - a declared dependency has no registration
//! - **Circular Dependencies**: Error - a cycle reachable from any singleton
//! - **Singleton → Transient**: Warning - the singleton holds one transient
//!   instance forever

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::lifetime::{Kind, Lifetime};
use crate::registration::Registration;

/// A validation warning about potentially problematic configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Singleton depends on transient (will always get same instance)
    SingletonCapturesTransient { singleton: String, transient: String },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::SingletonCapturesTransient { singleton, transient } => write!(
                f,
                "Singleton {} captures transient {} for its whole lifetime",
                singleton, transient
            ),
        }
    }
}

pub(crate) struct GraphValidator<'a> {
    records: &'a [Registration],
    index: &'a HashMap<Arc<str>, usize>,
}

impl<'a> GraphValidator<'a> {
    pub(crate) fn new(records: &'a [Registration], index: &'a HashMap<Arc<str>, usize>) -> Self {
        Self { records, index }
    }

    /// Validates the whole graph in registration order, failing on the first
    /// error found.
    pub(crate) fn validate(&self) -> DiResult<Vec<ValidationWarning>> {
        self.check_dependencies_exist()?;
        self.check_singleton_cycles()?;
        Ok(self.collect_warnings())
    }

    fn check_dependencies_exist(&self) -> DiResult<()> {
        for record in self.records {
            for dep in &record.dependencies {
                if !self.index.contains_key(dep) {
                    return Err(DiError::UnknownDependency {
                        name: dep.to_string(),
                        required_by: Some(record.name.to_string()),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_singleton_cycles(&self) -> DiResult<()> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        for (i, record) in self.records.iter().enumerate() {
            if record.lifetime == Lifetime::Singleton && !visited.contains(&i) {
                if let Some(cycle) = self.dfs_cycles(i, &mut visited, &mut path) {
                    return Err(DiError::CircularDependency(cycle));
                }
            }
        }
        Ok(())
    }

    /// Depth-first walk; depth is bounded by the number of registrations
    /// because every node is entered at most once.
    fn dfs_cycles(
        &self,
        current: usize,
        visited: &mut HashSet<usize>,
        path: &mut Vec<usize>,
    ) -> Option<Vec<String>> {
        if let Some(cycle_start) = path.iter().position(|&i| i == current) {
            let cycle = path[cycle_start..]
                .iter()
                .chain(std::iter::once(&current))
                .map(|&i| self.records[i].name.to_string())
                .collect();
            return Some(cycle);
        }

        if !visited.insert(current) {
            return None;
        }

        let record = &self.records[current];
        // values are leaves: nothing of theirs is ever resolved
        if record.kind() == Kind::Value {
            return None;
        }

        path.push(current);
        for dep in &record.dependencies {
            if let Some(&next) = self.index.get(dep) {
                if let Some(cycle) = self.dfs_cycles(next, visited, path) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        None
    }

    fn collect_warnings(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        for record in self.records.iter().filter(|r| r.is_cached_singleton()) {
            for dep in &record.dependencies {
                let Some(&i) = self.index.get(dep) else { continue };
                let dep_record = &self.records[i];
                if dep_record.lifetime == Lifetime::Transient && dep_record.kind() == Kind::Constructed {
                    warnings.push(ValidationWarning::SingletonCapturesTransient {
                        singleton: record.name.to_string(),
                        transient: dep_record.name.to_string(),
                    });
                }
            }
        }
        warnings
    }
}
