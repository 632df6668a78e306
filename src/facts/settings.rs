use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Where and how the fetch stage collects its data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSettings {
    /// The canonical package index, a JSON list of `{name, summary, versions}`
    #[serde(default = "default_package_index_url")]
    pub package_index_url: String,

    /// The promoted package index, a JSON list of package names
    #[serde(default = "default_promoted_index_url")]
    pub promoted_index_url: String,

    /// Base URL of the GitHub REST API
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Base URL serving raw repository files as `<base>/<owner>/<repo>/<branch>/<path>`
    #[serde(default = "default_raw_content_url")]
    pub raw_content_url: String,

    /// GitHub repository search query used to discover projects
    #[serde(default = "default_search_query")]
    pub search_query: String,

    /// Maximum number of search result pages (100 results each) to walk
    #[serde(default = "default_max_search_pages")]
    pub max_search_pages: u32,

    /// Manifest file names to try, in order
    #[serde(default = "default_manifest_files")]
    pub manifest_files: Vec<String>,

    /// Directory names whose presence means the repository has tests
    #[serde(default = "default_test_dirs")]
    pub test_dirs: Vec<String>,

    /// Directory names whose presence means the repository has examples
    #[serde(default = "default_example_dirs")]
    pub example_dirs: Vec<String>,

    /// Pause between consecutive repositories
    #[serde(default = "default_request_delay", with = "humantime_serde")]
    pub request_delay: Duration,

    /// Upper bound on a single wait for the API rate limit to reset
    #[serde(default = "default_max_rate_limit_wait", with = "humantime_serde")]
    pub max_rate_limit_wait: Duration,

    /// How many times a rate-limited request is retried after waiting
    #[serde(default = "default_max_rate_limit_retries")]
    pub max_rate_limit_retries: u32,
}

fn default_package_index_url() -> String {
    "https://package.elm-lang.org/all-packages".to_string()
}

fn default_promoted_index_url() -> String {
    "https://package.elm-lang.org/new-packages".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_raw_content_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_search_query() -> String {
    "language:elm".to_string()
}

const fn default_max_search_pages() -> u32 {
    10
}

fn default_manifest_files() -> Vec<String> {
    vec!["elm-package.json".to_string(), "elm.json".to_string()]
}

fn default_test_dirs() -> Vec<String> {
    vec!["tests".to_string(), "test".to_string()]
}

fn default_example_dirs() -> Vec<String> {
    vec!["examples".to_string(), "example".to_string()]
}

const fn default_request_delay() -> Duration {
    Duration::from_millis(100)
}

const fn default_max_rate_limit_wait() -> Duration {
    Duration::from_hours(1)
}

const fn default_max_rate_limit_retries() -> u32 {
    3
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            package_index_url: default_package_index_url(),
            promoted_index_url: default_promoted_index_url(),
            github_api_url: default_github_api_url(),
            raw_content_url: default_raw_content_url(),
            search_query: default_search_query(),
            max_search_pages: default_max_search_pages(),
            manifest_files: default_manifest_files(),
            test_dirs: default_test_dirs(),
            example_dirs: default_example_dirs(),
            request_delay: default_request_delay(),
            max_rate_limit_wait: default_max_rate_limit_wait(),
            max_rate_limit_retries: default_max_rate_limit_retries(),
        }
    }
}
