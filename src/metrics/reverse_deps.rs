use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dependency name to version constraint to the packages that declare it.
///
/// Dependents are kept in the order they were first added and each appears at most once
/// under a given constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ReverseDependencyIndex(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl ReverseDependencyIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent` depends on `dependency` with the given version constraint.
    pub fn add(&mut self, dependency: &str, constraint: &str, dependent: &str) {
        let dependents = self
            .0
            .entry(dependency.to_string())
            .or_default()
            .entry(constraint.to_string())
            .or_default();

        if !dependents.iter().any(|d| d == dependent) {
            dependents.push(dependent.to_string());
        }
    }

    /// Packages depending on `dependency` with exactly `constraint`.
    #[must_use]
    pub fn dependents(&self, dependency: &str, constraint: &str) -> &[String] {
        self.0
            .get(dependency)
            .and_then(|by_constraint| by_constraint.get(constraint))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct packages depending on `dependency` under any constraint.
    #[must_use]
    pub fn dependent_count(&self, dependency: &str) -> usize {
        self.0.get(dependency).map_or(0, |by_constraint| {
            let mut all: Vec<&String> = by_constraint.values().flatten().collect();
            all.sort_unstable();
            all.dedup();
            all.len()
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, Vec<String>>)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
