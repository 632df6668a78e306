//! Reading and writing the JSON documents exchanged between stages.

use crate::Result;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const LOG_TARGET: &str = " documents";

/// Load a JSON document from a file
pub fn load<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let path = path.as_ref();

    let file = File::open(path).into_app_err_with(|| format!("unable to open file '{}'", path.display()))?;
    let data = serde_json::from_reader(BufReader::new(file)).into_app_err_with(|| format!("unable to parse file '{}'", path.display()))?;

    log::debug!(target: LOG_TARGET, "Loaded '{}'", path.display());

    Ok(data)
}

/// Save a document as pretty-printed JSON, creating parent directories as needed
pub fn save<T>(data: &T, path: impl AsRef<Path>) -> Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_app_err_with(|| format!("unable to create directory '{}'", parent.display()))?;
    }

    let file = File::create(path).into_app_err_with(|| format!("unable to create file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, data).into_app_err_with(|| format!("unable to write file '{}'", path.display()))?;
    writer
        .flush()
        .into_app_err_with(|| format!("unable to flush file '{}'", path.display()))?;

    log::debug!(target: LOG_TARGET, "Saved '{}'", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndexEntry;

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("primary").join("package-index.json");

        let original = vec![IndexEntry {
            name: "elm-lang/core".to_string(),
            summary: Some("Elm's standard libraries".to_string()),
            versions: vec!["5.1.1".to_string()],
        }];

        save(&original, &file_path).unwrap();
        assert!(file_path.exists());

        let loaded: Vec<IndexEntry> = load(&file_path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result: Result<Vec<String>> = load(temp_dir.path().join("missing.json"));
        assert!(result.unwrap_err().to_string().contains("unable to open"));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("invalid.json");
        fs::write(&file_path, "not valid json").unwrap();

        let result: Result<Vec<String>> = load(&file_path);
        assert!(result.unwrap_err().to_string().contains("unable to parse"));
    }
}
