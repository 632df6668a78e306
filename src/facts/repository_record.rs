use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Snapshot of one repository, as gathered by the fetch stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[expect(clippy::struct_field_names, reason = "field names match the GitHub API")]
pub struct RepositoryRecord {
    #[serde(default)]
    pub stargazers_count: u64,

    #[serde(default)]
    pub forks_count: u64,

    #[serde(default)]
    pub subscribers_count: u64,

    #[serde(default)]
    pub open_issues_count: u64,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub has_test_dir: bool,

    #[serde(default)]
    pub has_examples_dir: bool,

    /// The package manifest, `None` when it could not be retrieved.
    #[serde(default)]
    pub manifest: Option<Manifest>,
}

/// The parts of a package manifest (`elm-package.json` / `elm.json`) that are reported on.
///
/// Deserialization never fails: anything that isn't in the expected shape is dropped, so a
/// manifest with a malformed `dependencies` section still contributes its license.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "Value")]
pub struct Manifest {
    pub license: Option<String>,

    /// Dependency name to version constraint.
    pub dependencies: BTreeMap<String, String>,
}

impl From<Value> for Manifest {
    fn from(value: Value) -> Self {
        let license = value.get("license").and_then(Value::as_str).map(str::to_string);

        let mut dependencies = BTreeMap::new();
        if let Some(deps) = value.get("dependencies").and_then(Value::as_object) {
            collect_constraints(deps, &mut dependencies);

            // Application manifests split dependencies into `direct` and `indirect`
            if let Some(direct) = deps.get("direct").and_then(Value::as_object) {
                collect_constraints(direct, &mut dependencies);
            }
        }

        Self { license, dependencies }
    }
}

fn collect_constraints(deps: &serde_json::Map<String, Value>, into: &mut BTreeMap<String, String>) {
    for (name, constraint) in deps {
        if let Some(constraint) = constraint.as_str() {
            let _ = into.insert(name.clone(), constraint.to_string());
        }
    }
}

/// The persisted result of the fetch stage: one record per repository name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepositoryDocument {
    pub retrieved: DateTime<Utc>,
    pub repositories: BTreeMap<String, RepositoryRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialize_full() {
        let json = r#"{
            "stargazers_count": 5,
            "forks_count": 1,
            "subscribers_count": 2,
            "open_issues_count": 0,
            "description": null,
            "has_test_dir": true,
            "has_examples_dir": false,
            "manifest": {"license": "BSD3", "dependencies": {"x/y": "1.0.0"}}
        }"#;

        let record: RepositoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.stargazers_count, 5);
        assert_eq!(record.subscribers_count, 2);
        assert!(record.has_test_dir);
        let manifest = record.manifest.unwrap();
        assert_eq!(manifest.license.as_deref(), Some("BSD3"));
        assert_eq!(manifest.dependencies.get("x/y").map(String::as_str), Some("1.0.0"));
    }

    #[test]
    fn test_record_missing_fields_default() {
        let record: RepositoryRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, RepositoryRecord::default());
    }

    #[test]
    fn test_null_manifest_is_none() {
        let record: RepositoryRecord = serde_json::from_str(r#"{"manifest": null}"#).unwrap();
        assert!(record.manifest.is_none());
    }

    #[test]
    fn test_manifest_without_dependencies_keeps_license() {
        let manifest: Manifest = serde_json::from_str(r#"{"license": "MIT", "version": "1.0.0"}"#).unwrap();
        assert_eq!(manifest.license.as_deref(), Some("MIT"));
        assert!(manifest.dependencies.is_empty());
    }

    #[test]
    fn test_application_manifest_uses_direct_dependencies() {
        let json = r#"{
            "type": "application",
            "dependencies": {
                "direct": {"elm/core": "1.0.2", "elm/html": "1.0.0"},
                "indirect": {"elm/json": "1.1.3"}
            }
        }"#;

        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(
            manifest.dependencies,
            BTreeMap::from([
                ("elm/core".to_string(), "1.0.2".to_string()),
                ("elm/html".to_string(), "1.0.0".to_string()),
            ])
        );
    }

    #[test]
    fn test_manifest_skips_non_string_constraints() {
        let json = r#"{
            "dependencies": {
                "a/b": "2.0.0 <= v < 3.0.0",
                "c/d": 3,
                "e/f": {"nested": "1.0.0"}
            }
        }"#;

        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.license, None);
        assert_eq!(manifest.dependencies.len(), 1);
        assert!(manifest.dependencies.contains_key("a/b"));
    }

    #[test]
    fn test_manifest_not_an_object() {
        let manifest: Manifest = serde_json::from_str(r#""garbage""#).unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_manifest_serialize_reads_back() {
        let mut manifest = Manifest {
            license: Some("BSD-3-Clause".to_string()),
            ..Manifest::default()
        };
        let _ = manifest.dependencies.insert("elm-lang/core".to_string(), "5.0.0 <= v < 6.0.0".to_string());

        let text = serde_json::to_string(&manifest).unwrap();
        let parsed: Manifest = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, manifest);
    }
}
