use super::client::{ApiResult, Client, RateLimitInfo, Repository, SearchPage, has_next_page};
use super::{Cache, CacheResult, FetchSettings, Manifest, Progress, RepositoryRecord};
use crate::Result;
use crate::catalog::{IndexEntry, PackageDescriptor};
use chrono::Utc;
use core::time::Duration;
use ohno::{EnrichableExt, IntoAppError, bail};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use url::Url;

const LOG_TARGET: &str = "  provider";
const SEARCH_PAGE_SIZE: u8 = 100;
const DEFAULT_BRANCH: &str = "master";

/// Fetches the package indexes and per-repository data.
///
/// Requests are issued one at a time. Whenever GitHub reports the rate limit as exhausted, the
/// provider sleeps until the advertised reset time (bounded by the configured maximum) before
/// issuing the next request.
#[derive(Clone)]
pub struct Provider {
    client: Client,
    settings: FetchSettings,
    cache: Cache,
    progress: Arc<dyn Progress>,
}

impl core::fmt::Debug for Provider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Provider")
            .field("client", &self.client)
            .field("settings", &self.settings)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Provider {
    pub fn new(github_token: Option<&str>, settings: FetchSettings, cache: Cache, progress: Arc<dyn Progress>) -> Result<Self> {
        let client = Client::new(github_token, &settings.github_api_url)?;

        Ok(Self {
            client,
            settings,
            cache,
            progress,
        })
    }

    /// Download the canonical package index.
    pub async fn get_package_index(&self) -> Result<Vec<IndexEntry>> {
        let url = &self.settings.package_index_url;
        log::info!(target: LOG_TARGET, "Retrieving package index from '{url}'");

        self.required_json(url, "package index").await
    }

    /// Download the list of promoted package names.
    pub async fn get_promoted_packages(&self) -> Result<Vec<String>> {
        let url = &self.settings.promoted_index_url;
        log::info!(target: LOG_TARGET, "Retrieving promoted package list from '{url}'");

        self.required_json(url, "promoted package list").await
    }

    /// Search GitHub for repositories that are not published packages.
    ///
    /// Repositories named in `exclude` are skipped. A failing page ends the search and the
    /// projects found so far are returned.
    pub async fn search_projects(&self, exclude: &HashSet<&str>) -> Vec<PackageDescriptor> {
        let mut projects = Vec::new();
        let mut seen = HashSet::new();

        self.progress.set_phase("Searching");

        for page in 1..=self.settings.max_search_pages {
            let url = match self.search_url(page) {
                Ok(url) => url,
                Err(e) => {
                    log::error!(target: LOG_TARGET, "Could not build search URL: {e:#}");
                    break;
                }
            };

            log::debug!(target: LOG_TARGET, "Fetching search page {page}");

            let resp = match self.call_with_retry(|| self.client.api_call(url.as_str())).await {
                ApiResult::Success(resp, _) => resp,
                ApiResult::NotFound(_) => break,
                ApiResult::RateLimited(_) => {
                    log::warn!(target: LOG_TARGET, "Search rate limit did not reset, stopping at page {page}");
                    break;
                }
                ApiResult::Failed(e, _) => {
                    log::warn!(target: LOG_TARGET, "Could not fetch search page {page}: {e:#}");
                    break;
                }
            };

            let more = has_next_page(resp.headers());
            let page_data: SearchPage = match resp.json().await {
                Ok(data) => data,
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not parse search page {page}: {e:#}");
                    break;
                }
            };

            if page_data.items.is_empty() {
                break;
            }

            for item in page_data.items {
                if exclude.contains(item.full_name.as_str()) || !seen.insert(item.full_name.clone()) {
                    continue;
                }
                projects.push(PackageDescriptor::project(item.full_name, item.description));
            }

            self.progress.advance(&format!("{} projects", projects.len()));

            if !more {
                break;
            }
        }

        self.progress.done();
        log::info!(target: LOG_TARGET, "Found {} projects through search", projects.len());

        projects
    }

    /// Fetch a record for each named repository.
    ///
    /// Repositories that can't be fetched are logged and left out of the result; duplicate
    /// names are fetched once.
    pub async fn get_repository_records(&self, names: &[String]) -> BTreeMap<String, RepositoryRecord> {
        let mut records = BTreeMap::new();
        let mut attempted = HashSet::with_capacity(names.len());

        self.progress.set_phase("Fetching");
        self.progress.set_total(names.len() as u64);

        for name in names {
            self.progress.advance(name);

            if !attempted.insert(name.as_str()) {
                continue;
            }

            match self.cache.load::<RepositoryRecord>(name) {
                CacheResult::Data(record) => {
                    let _ = records.insert(name.clone(), record);
                    continue;
                }
                CacheResult::NoData(reason) => {
                    log::debug!(target: LOG_TARGET, "Skipping '{name}': {reason}");
                    continue;
                }
                CacheResult::Miss => {}
            }

            log::info!(target: LOG_TARGET, "Querying GitHub for information on repository '{name}'");

            match self.fetch_repository(name).await {
                Ok(Some(record)) => {
                    if let Err(e) = self.cache.save(name, &record) {
                        log::debug!(target: LOG_TARGET, "Could not save cache for '{name}': {e:#}");
                    }
                    let _ = records.insert(name.clone(), record);
                }
                Ok(None) => {
                    let reason = format!("repository '{name}' not found");
                    log::warn!(target: LOG_TARGET, "{reason}");
                    if let Err(e) = self.cache.save_no_data(name, &reason) {
                        log::debug!(target: LOG_TARGET, "Could not save cache for '{name}': {e:#}");
                    }
                }
                Err(e) => {
                    log::error!(target: LOG_TARGET, "Could not fetch repository data for '{name}': {e:#}");
                }
            }

            tokio::time::sleep(self.settings.request_delay).await;
        }

        self.progress.done();
        log::info!(target: LOG_TARGET, "Retrieved data for {} of {} repositories", records.len(), attempted.len());

        records
    }

    /// Fetch metadata, manifest and directory probes for one repository.
    ///
    /// Returns `Ok(None)` when the repository doesn't exist. Any request that fails for a
    /// reason other than "not found" fails the whole record, so a partial record is never
    /// cached.
    async fn fetch_repository(&self, name: &str) -> Result<Option<RepositoryRecord>> {
        let url = self.client.repo_url(name, "");

        let repo: Repository = match self.call_with_retry(|| self.client.get_json(&url)).await {
            ApiResult::Success(repo, _) => repo,
            ApiResult::NotFound(_) => return Ok(None),
            ApiResult::RateLimited(_) => bail!("rate limit still exhausted after retrying '{name}'"),
            ApiResult::Failed(e, _) => return Err(e.enrich_with(|| format!("fetching core info for repository '{name}'"))),
        };

        let branch = repo.default_branch.as_deref().unwrap_or(DEFAULT_BRANCH);
        let manifest = self.fetch_manifest(name, branch).await?;
        let has_test_dir = self.has_any_dir(name, &self.settings.test_dirs).await?;
        let has_examples_dir = self.has_any_dir(name, &self.settings.example_dirs).await?;

        Ok(Some(RepositoryRecord {
            stargazers_count: repo.stargazers_count,
            forks_count: repo.forks_count,
            subscribers_count: repo.subscribers_count,
            open_issues_count: repo.open_issues_count,
            description: repo.description,
            has_test_dir,
            has_examples_dir,
            manifest,
        }))
    }

    /// The first configured manifest file that exists and parses as JSON.
    async fn fetch_manifest(&self, name: &str, branch: &str) -> Result<Option<Manifest>> {
        let raw_base = self.settings.raw_content_url.trim_end_matches('/');

        for file in &self.settings.manifest_files {
            let url = format!("{raw_base}/{name}/{branch}/{file}");

            match self.call_with_retry(|| self.client.get_text(&url)).await {
                ApiResult::Success(text, _) => match serde_json::from_str::<Manifest>(&text) {
                    Ok(manifest) => return Ok(Some(manifest)),
                    Err(e) => log::debug!(target: LOG_TARGET, "Ignoring unparseable {file} in '{name}': {e:#}"),
                },
                ApiResult::NotFound(_) => {}
                ApiResult::RateLimited(_) => bail!("rate limit still exhausted fetching {file} for '{name}'"),
                ApiResult::Failed(e, _) => return Err(e.enrich_with(|| format!("fetching {file} for '{name}'"))),
            }
        }

        Ok(None)
    }

    /// Whether any of `dirs` exists as a directory at the root of the repository.
    async fn has_any_dir(&self, name: &str, dirs: &[String]) -> Result<bool> {
        for dir in dirs {
            let url = self.client.repo_url(name, &format!("/contents/{dir}"));

            match self.call_with_retry(|| self.client.get_json::<serde_json::Value>(&url)).await {
                // The contents API lists a directory as an array and describes a file as an object
                ApiResult::Success(contents, _) if contents.is_array() => return Ok(true),
                ApiResult::Success(..) | ApiResult::NotFound(_) => {}
                ApiResult::RateLimited(_) => bail!("rate limit still exhausted probing '{dir}' in '{name}'"),
                ApiResult::Failed(e, _) => return Err(e.enrich_with(|| format!("probing '{dir}' in '{name}'"))),
            }
        }

        Ok(false)
    }

    async fn required_json<T>(&self, url: &str, what: &str) -> Result<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        match self.call_with_retry(|| self.client.get_json(url)).await {
            ApiResult::Success(data, _) => Ok(data),
            ApiResult::NotFound(_) => bail!("{what} not found at '{url}'"),
            ApiResult::RateLimited(_) => bail!("rate limited while retrieving {what} from '{url}'"),
            ApiResult::Failed(e, _) => Err(e.enrich_with(|| format!("retrieving {what} from '{url}'"))),
        }
    }

    fn search_url(&self, page: u32) -> Result<Url> {
        let base = format!("{}/search/repositories", self.client.base_url());
        let page = page.to_string();
        let per_page = SEARCH_PAGE_SIZE.to_string();

        Url::parse_with_params(
            &base,
            [
                ("q", self.settings.search_query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
                ("page", page.as_str()),
            ],
        )
        .into_app_err_with(|| format!("building search URL from '{base}'"))
    }

    /// Issue a request, waiting out the rate limit when GitHub says it is exhausted.
    ///
    /// A rate-limited request is retried up to the configured number of times. A successful
    /// response that reports zero remaining quota causes a wait before returning, so the next
    /// request starts with a fresh quota.
    async fn call_with_retry<T, F, Fut>(&self, request: F) -> ApiResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut attempts = 0u32;

        loop {
            let result = request().await;

            if let ApiResult::RateLimited(rate_limit) = &result
                && attempts < self.settings.max_rate_limit_retries
            {
                attempts += 1;
                self.wait_for_reset(*rate_limit).await;
                continue;
            }

            if let Some(rate_limit) = result.rate_limit()
                && rate_limit.remaining == 0
                && !matches!(result, ApiResult::RateLimited(_))
            {
                self.wait_for_reset(rate_limit).await;
            }

            return result;
        }
    }

    async fn wait_for_reset(&self, rate_limit: RateLimitInfo) {
        let now = Utc::now();
        let wait = wait_duration(rate_limit, now, self.settings.max_rate_limit_wait);
        if wait.is_zero() {
            return;
        }

        let resume_at = chrono::Duration::from_std(wait)
            .map_or(rate_limit.reset_at, |d| now + d)
            .with_timezone(&chrono::Local)
            .format("%T");

        log::warn!(target: LOG_TARGET, "GitHub rate limit exhausted, waiting {}s until {resume_at}", wait.as_secs());
        if !log::log_enabled!(log::Level::Warn) {
            self.progress.println(&format!("GitHub rate limit exceeded: Waiting until {resume_at}..."));
        }

        tokio::time::sleep(wait).await;
    }
}

/// How long to sleep for a rate limit to reset, never more than `max_wait`.
fn wait_duration(rate_limit: RateLimitInfo, now: chrono::DateTime<Utc>, max_wait: Duration) -> Duration {
    (rate_limit.reset_at - now).to_std().unwrap_or(Duration::ZERO).min(max_wait)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    struct NoOpProgress;

    impl Progress for NoOpProgress {
        fn set_phase(&self, _phase: &str) {}
        fn set_total(&self, _total: u64) {}
        fn advance(&self, _message: &str) {}
        fn println(&self, _msg: &str) {}
        fn done(&self) {}
    }

    fn test_provider(settings: FetchSettings) -> Provider {
        let cache = Cache::new("test_cache", Duration::from_secs(3600), Utc::now(), true);
        Provider::new(None, settings, cache, Arc::new(NoOpProgress)).unwrap()
    }

    fn rate_limit_at(reset_at: DateTime<Utc>) -> RateLimitInfo {
        RateLimitInfo { remaining: 0, reset_at }
    }

    #[test]
    fn test_wait_duration_until_reset() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let reset = now + chrono::Duration::seconds(90);

        assert_eq!(wait_duration(rate_limit_at(reset), now, Duration::from_hours(1)), Duration::from_secs(90));
    }

    #[test]
    fn test_wait_duration_is_bounded() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let reset = now + chrono::Duration::hours(5);

        assert_eq!(wait_duration(rate_limit_at(reset), now, Duration::from_mins(10)), Duration::from_mins(10));
    }

    #[test]
    fn test_wait_duration_reset_in_past() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let reset = now - chrono::Duration::seconds(5);

        assert_eq!(wait_duration(rate_limit_at(reset), now, Duration::from_hours(1)), Duration::ZERO);
    }

    #[test]
    fn test_search_url_encodes_query() {
        let settings = FetchSettings {
            search_query: "language:elm stars:>5".to_string(),
            ..FetchSettings::default()
        };
        let provider = test_provider(settings);

        let url = provider.search_url(3).unwrap();
        assert_eq!(url.path(), "/search/repositories");

        let pairs: Vec<(String, String)> = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        assert!(pairs.contains(&("q".to_string(), "language:elm stars:>5".to_string())));
        assert!(pairs.contains(&("page".to_string(), "3".to_string())));
        assert!(pairs.contains(&("per_page".to_string(), "100".to_string())));
    }

    #[tokio::test]
    async fn test_call_with_retry_gives_up_after_max_retries() {
        let settings = FetchSettings {
            max_rate_limit_retries: 2,
            ..FetchSettings::default()
        };
        let provider = test_provider(settings);
        let calls = core::cell::Cell::new(0u32);

        let result: ApiResult<()> = provider
            .call_with_retry(|| {
                calls.set(calls.get() + 1);
                // Reset already passed, so no actual sleeping happens
                async { ApiResult::RateLimited(rate_limit_at(Utc::now() - chrono::Duration::seconds(1))) }
            })
            .await;

        assert!(matches!(result, ApiResult::RateLimited(_)));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_call_with_retry_returns_success_after_rate_limit() {
        let provider = test_provider(FetchSettings::default());
        let calls = core::cell::Cell::new(0u32);

        let result = provider
            .call_with_retry(|| {
                calls.set(calls.get() + 1);
                let attempt = calls.get();
                async move {
                    if attempt == 1 {
                        ApiResult::RateLimited(rate_limit_at(Utc::now() - chrono::Duration::seconds(1)))
                    } else {
                        ApiResult::Success(attempt, None)
                    }
                }
            })
            .await;

        assert!(matches!(result, ApiResult::Success(2, None)));
    }
}
