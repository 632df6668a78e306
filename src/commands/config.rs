use crate::Result;
use crate::facts::FetchSettings;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "elm-pkg-stats.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Repositories always included in the roster as projects
    #[serde(default)]
    pub allow_list: Vec<String>,

    /// Duration to keep fetched repository data before re-fetching
    #[serde(default = "default_cache_ttl", with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// Number of entries listed in the console summary
    #[serde(default = "default_console_top")]
    pub console_top: usize,

    #[serde(default)]
    pub fetch: FetchSettings,
}

const fn default_cache_ttl() -> Duration {
    Duration::from_hours(24 * 7)
}

const fn default_console_top() -> usize {
    10
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if let Some(entry) = self.allow_list.iter().find(|name| !is_repository_path(name)) {
            return Err(app_err!("allow_list entry '{entry}' is not of the form 'owner/repo'"));
        }

        if self.fetch.manifest_files.is_empty() {
            return Err(app_err!("fetch.manifest_files must name at least one file"));
        }

        for (key, url) in [
            ("package_index_url", &self.fetch.package_index_url),
            ("promoted_index_url", &self.fetch.promoted_index_url),
            ("github_api_url", &self.fetch.github_api_url),
            ("raw_content_url", &self.fetch.raw_content_url),
        ] {
            let _ = url::Url::parse(url).into_app_err_with(|| format!("fetch.{key} is not a valid URL: '{url}'"))?;
        }

        Ok(())
    }
}

fn is_repository_path(name: &str) -> bool {
    name.split_once('/')
        .is_some_and(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert!(config.allow_list.is_empty());
        assert_eq!(config.cache_ttl, Duration::from_hours(24 * 7));
        assert_eq!(config.console_top, 10);
    }

    #[test]
    fn test_default_config_matches_builtin_defaults() {
        let from_empty: Config = toml::from_str("").unwrap();
        let from_file = Config::default();

        assert_eq!(from_empty.fetch, from_file.fetch);
        assert_eq!(from_empty.cache_ttl, from_file.cache_ttl);
        assert_eq!(from_empty.console_top, from_file.console_top);
    }

    #[test]
    fn test_validate_rejects_bad_allow_list_entry() {
        for bad in ["noslash", "/repo", "owner/", "a/b/c"] {
            let config = Config {
                allow_list: vec![bad.to_string()],
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_validate_accepts_allow_list() {
        let config = Config {
            allow_list: vec!["rtfeldman/elm-css".to_string()],
            ..Config::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_manifest_files() {
        let mut config = Config::default();
        config.fetch.manifest_files.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.fetch.github_api_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("github_api_url"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: core::result::Result<Config, _> = toml::from_str("colour = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_default_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let output_path = Utf8PathBuf::try_from(tmp.path().join(CONFIG_FILE_NAME)).unwrap();
        Config::save_default(&output_path).unwrap();

        let loaded = Config::load(&Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap(), None).unwrap();
        loaded.validate().unwrap();
    }

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let base_dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let config = Config::load(&base_dir, None).unwrap();
        assert_eq!(config.console_top, 10);
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let base_dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let missing = base_dir.join("nope.toml");
        assert!(Config::load(&base_dir, Some(&missing)).is_err());
    }

    #[test]
    fn test_load_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let base_dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::write(
            base_dir.join(CONFIG_FILE_NAME),
            r#"
            allow_list = ["someone/elm-app"]
            console_top = 3

            [fetch]
            max_search_pages = 2
            "#,
        )
        .unwrap();

        let config = Config::load(&base_dir, None).unwrap();
        assert_eq!(config.allow_list, ["someone/elm-app"]);
        assert_eq!(config.console_top, 3);
        assert_eq!(config.fetch.max_search_pages, 2);
        assert_eq!(config.fetch.test_dirs, ["tests", "test"]);
    }
}
