use crate::catalog::PackageDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// License reported when the manifest is missing or doesn't declare one.
pub const UNKNOWN_LICENSE: &str = "unknown";

/// Derived metrics for one roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Metric {
    /// The roster entry, with `summary` back-filled from the repository description.
    #[serde(flatten)]
    pub package: PackageDescriptor,

    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,

    /// Number of distinct roster entries whose manifest depends on this package.
    #[serde(default)]
    pub used_by: usize,

    pub has_tests: bool,
    pub has_examples: bool,
    pub license: String,
    pub is_project: bool,
    pub deprecated: bool,

    /// Where a deprecated package says to go instead, as `owner/repo`.
    pub deprecation_redirect: Option<String>,

    /// No repository record existed for this entry; all other metrics are defaults.
    pub no_data: bool,
}

impl Metric {
    /// A metric with every derived field at its default value.
    #[must_use]
    pub fn with_defaults(package: PackageDescriptor) -> Self {
        let is_project = package.is_project();
        Self {
            package,
            stars: 0,
            forks: 0,
            watchers: 0,
            open_issues: 0,
            used_by: 0,
            has_tests: false,
            has_examples: false,
            license: UNKNOWN_LICENSE.to_string(),
            is_project,
            deprecated: false,
            deprecation_redirect: None,
            no_data: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.package.name
    }
}

/// The metrics document consumed by report rendering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetricsDocument {
    pub retrieved: DateTime<Utc>,
    pub packages: Vec<Metric>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProjectType;

    #[test]
    fn test_defaults() {
        let metric = Metric::with_defaults(PackageDescriptor::project("a/app", None));

        assert_eq!(metric.name(), "a/app");
        assert_eq!(metric.stars, 0);
        assert_eq!(metric.license, UNKNOWN_LICENSE);
        assert!(metric.is_project);
        assert!(!metric.deprecated);
        assert!(!metric.no_data);
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let package = PackageDescriptor {
            name: "a/pkg".to_string(),
            project_type: ProjectType::Package,
            is_current: true,
            summary: Some("Things".to_string()),
            versions: Some(vec!["1.0.0".to_string()]),
        };

        let value = serde_json::to_value(Metric::with_defaults(package)).unwrap();
        assert_eq!(value["name"], "a/pkg");
        assert_eq!(value["project_type"], "package");
        assert_eq!(value["is_current"], true);
        assert_eq!(value["is_project"], false);
        assert_eq!(value["license"], "unknown");
        assert!(value["deprecation_redirect"].is_null());
        assert!(value.get("package").is_none());
    }

    #[test]
    fn test_document_reads_back() {
        let doc = MetricsDocument {
            retrieved: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            packages: vec![Metric::with_defaults(PackageDescriptor::project("a/app", Some("x".to_string())))],
        };

        let text = serde_json::to_string(&doc).unwrap();
        let parsed: MetricsDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, doc);
    }
}
