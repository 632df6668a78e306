use super::deprecation;
use super::metric::{Metric, UNKNOWN_LICENSE};
use super::reverse_deps::ReverseDependencyIndex;
use crate::catalog::{PackageDescriptor, find_duplicates};
use crate::facts::RepositoryRecord;
use std::collections::{BTreeMap, HashSet};

const LOG_TARGET: &str = "   metrics";

/// Result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// One metric per distinct roster name, in roster order.
    pub metrics: Vec<Metric>,

    pub reverse_dependencies: ReverseDependencyIndex,

    /// Roster names that appeared more than once; only their first occurrence was used.
    pub duplicates: Vec<String>,
}

/// Derive metrics for every roster entry and aggregate the reverse-dependency index.
///
/// Missing or partial repository data never fails the pass; the affected entry falls back
/// to default values.
#[must_use]
pub fn extract(roster: &[PackageDescriptor], repo_data: &BTreeMap<String, RepositoryRecord>) -> Extraction {
    let mut extraction = Extraction {
        duplicates: find_duplicates(roster),
        ..Extraction::default()
    };

    for name in &extraction.duplicates {
        log::warn!(target: LOG_TARGET, "Roster lists '{name}' more than once, later entries are skipped");
    }

    let mut seen = HashSet::with_capacity(roster.len());
    for descriptor in roster {
        if !seen.insert(descriptor.name.as_str()) {
            continue;
        }

        let metric = match repo_data.get(&descriptor.name) {
            Some(record) => {
                add_dependencies(&mut extraction.reverse_dependencies, &descriptor.name, record);
                metric_from_record(descriptor.clone(), record)
            }
            None => {
                log::debug!(target: LOG_TARGET, "No repository data for '{}'", descriptor.name);
                let mut metric = Metric::with_defaults(descriptor.clone());
                metric.no_data = true;
                metric
            }
        };

        extraction.metrics.push(metric);
    }

    for metric in &mut extraction.metrics {
        metric.used_by = extraction.reverse_dependencies.dependent_count(&metric.package.name);
    }

    log::info!(
        target: LOG_TARGET,
        "Extracted metrics for {} packages, {} dependencies in reverse index",
        extraction.metrics.len(),
        extraction.reverse_dependencies.len()
    );

    extraction
}

fn metric_from_record(package: PackageDescriptor, record: &RepositoryRecord) -> Metric {
    let mut metric = Metric::with_defaults(package);

    metric.stars = record.stargazers_count;
    metric.forks = record.forks_count;
    metric.watchers = record.subscribers_count;
    metric.open_issues = record.open_issues_count;
    metric.has_tests = record.has_test_dir;
    metric.has_examples = record.has_examples_dir;

    metric.license = record
        .manifest
        .as_ref()
        .and_then(|m| m.license.clone())
        .unwrap_or_else(|| UNKNOWN_LICENSE.to_string());

    if metric.package.summary.as_deref().is_none_or(str::is_empty) {
        metric.package.summary = Some(record.description.clone().unwrap_or_default());
    }

    // The summary is checked last so its redirect takes precedence
    let sources = [record.description.as_deref(), metric.package.summary.as_deref()];
    let mut deprecated = false;
    let mut redirect = None;
    for found in sources.into_iter().flatten().filter_map(deprecation::detect) {
        deprecated = true;
        if found.redirect.is_some() {
            redirect = found.redirect;
        }
    }

    metric.deprecated = deprecated;
    metric.deprecation_redirect = redirect;
    metric
}

fn add_dependencies(index: &mut ReverseDependencyIndex, dependent: &str, record: &RepositoryRecord) {
    let Some(manifest) = &record.manifest else {
        return;
    };

    for (dependency, constraint) in &manifest.dependencies {
        index.add(dependency, constraint, dependent);
    }
}
