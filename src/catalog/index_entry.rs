use serde::{Deserialize, Serialize};

/// An entry of the canonical package index (`all-packages`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IndexEntry {
    pub name: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub versions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_entry_deserialize() {
        let json = r#"[
            {"name": "elm-lang/core", "summary": "Elm's standard libraries", "versions": ["5.1.1", "5.0.0"]},
            {"name": "a/b"}
        ]"#;

        let entries: Vec<IndexEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].versions, vec!["5.1.1", "5.0.0"]);
        assert_eq!(entries[1].summary, None);
        assert!(entries[1].versions.is_empty());
    }
}
