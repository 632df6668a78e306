//! Per-repository cache of fetched records.
//!
//! Each repository is stored in its own JSON file, wrapped in an envelope that records when it
//! was fetched. Entries older than the TTL are ignored. A repository that could not be found is
//! remembered as a negative entry so it isn't queried again until the entry expires.

use crate::Result;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "     cache";
const SECONDS_PER_DAY: f64 = 86400.0;

/// Result of looking up a repository in the cache.
#[derive(Debug, Clone)]
pub enum CacheResult<T> {
    /// Cached data was found and is still fresh.
    Data(T),

    /// The repository was previously determined to be unavailable.
    NoData(String),

    /// No usable cache entry exists (miss, expired, corrupt, or the cache is bypassed).
    Miss,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct Envelope<T> {
    timestamp: DateTime<Utc>,
    payload: Payload<T>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
enum Payload<T> {
    Data(T),
    NoData(String),
}

/// A TTL-aware, directory-backed JSON cache keyed by repository name.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
    ttl: Duration,
    now: DateTime<Utc>,
    ignore: bool,
}

impl Cache {
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, ttl: Duration, now: DateTime<Utc>, ignore_cache: bool) -> Self {
        Self {
            dir: cache_dir.into(),
            ttl,
            now,
            ignore: ignore_cache,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Look up the entry for a repository.
    #[must_use]
    pub fn load<T>(&self, name: &str) -> CacheResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        if self.ignore {
            return CacheResult::Miss;
        }

        let path = self.entry_path(name);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                log::trace!(target: LOG_TARGET, "Cache miss for '{name}': {e:#}");
                return CacheResult::Miss;
            }
        };

        let envelope: Envelope<T> = match serde_json::from_reader(BufReader::new(file)) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Ignoring unreadable cache entry for '{name}': {e:#}");
                return CacheResult::Miss;
            }
        };

        // Future timestamps (clock skew) count as fresh
        let age = self.now.signed_duration_since(envelope.timestamp).to_std().unwrap_or(Duration::ZERO);
        if age >= self.ttl {
            log::debug!(
                target: LOG_TARGET,
                "Cache expired for '{name}' (age: {:.1} days, TTL: {:.1} days)",
                age.as_secs_f64() / SECONDS_PER_DAY,
                self.ttl.as_secs_f64() / SECONDS_PER_DAY
            );
            return CacheResult::Miss;
        }

        log::debug!(target: LOG_TARGET, "Cache hit for '{name}' (age: {:.1} days)", age.as_secs_f64() / SECONDS_PER_DAY);

        match envelope.payload {
            Payload::Data(data) => CacheResult::Data(data),
            Payload::NoData(reason) => CacheResult::NoData(reason),
        }
    }

    /// Store the data fetched for a repository.
    pub fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        self.write_envelope(
            name,
            &Envelope {
                timestamp: self.now,
                payload: Payload::Data(data),
            },
        )
    }

    /// Remember that a repository is unavailable.
    pub fn save_no_data(&self, name: &str, reason: &str) -> Result<()> {
        self.write_envelope(
            name,
            &Envelope::<()> {
                timestamp: self.now,
                payload: Payload::NoData(reason.to_string()),
            },
        )
    }

    fn write_envelope<T: Serialize>(&self, name: &str, envelope: &Envelope<T>) -> Result<()> {
        let path = self.entry_path(name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory '{}'", parent.display()))?;
        }

        let file = File::create(&path).into_app_err_with(|| format!("creating cache file '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, envelope).into_app_err_with(|| format!("writing cache file '{}'", path.display()))?;
        writer
            .flush()
            .into_app_err_with(|| format!("flushing cache file '{}'", path.display()))?;
        Ok(())
    }

    /// `owner/repo` maps to `<dir>/owner/repo.json`, with anything unsafe in a path replaced.
    fn entry_path(&self, name: &str) -> PathBuf {
        let components: Vec<String> = name.split('/').map(sanitize_path_component).collect();

        let mut path = self.dir.clone();
        if let Some((file_stem, parents)) = components.split_last() {
            path.extend(parents);
            path.push(format!("{file_stem}.json"));
        }
        path
    }
}

fn sanitize_path_component(s: &str) -> String {
    let s = s.replace("..", "__");
    let s = s.replace(['\\', ':', '*', '?', '"', '<', '>', '|'], "_");
    if s.is_empty() { "_".to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::RepositoryRecord;

    fn make_cache(dir: &Path, ttl_secs: u64) -> Cache {
        Cache::new(dir, Duration::from_secs(ttl_secs), Utc::now(), false)
    }

    fn record(stars: u64) -> RepositoryRecord {
        RepositoryRecord {
            stargazers_count: stars,
            ..RepositoryRecord::default()
        }
    }

    fn write_raw<T: Serialize>(dir: &Path, name: &str, envelope: &Envelope<T>) {
        let path = make_cache(dir, 1).entry_path(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        serde_json::to_writer(File::create(path).unwrap(), envelope).unwrap();
    }

    #[test]
    fn save_and_load_record() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = make_cache(tmp.path(), 3600);

        cache.save("elm/core", &record(42)).unwrap();

        match cache.load::<RepositoryRecord>("elm/core") {
            CacheResult::Data(loaded) => assert_eq!(loaded.stargazers_count, 42),
            other => panic!("expected Data, got {other:?}"),
        }
        assert!(tmp.path().join("elm").join("core.json").exists());
    }

    #[test]
    fn save_and_load_no_data() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = make_cache(tmp.path(), 3600);

        cache.save_no_data("gone/repo", "repository not found").unwrap();

        match cache.load::<RepositoryRecord>("gone/repo") {
            CacheResult::NoData(reason) => assert_eq!(reason, "repository not found"),
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[test]
    fn load_missing_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = make_cache(tmp.path(), 3600);
        assert!(matches!(cache.load::<RepositoryRecord>("nope/nope"), CacheResult::Miss));
    }

    #[test]
    fn load_corrupt_entry() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("bad")).unwrap();
        fs::write(tmp.path().join("bad").join("entry.json"), "not valid json").unwrap();

        let cache = make_cache(tmp.path(), 3600);
        assert!(matches!(cache.load::<RepositoryRecord>("bad/entry"), CacheResult::Miss));
    }

    #[test]
    fn load_expired_entry() {
        let tmp = tempfile::tempdir().unwrap();
        write_raw(
            tmp.path(),
            "old/repo",
            &Envelope {
                timestamp: Utc::now() - chrono::Duration::hours(2),
                payload: Payload::Data(record(1)),
            },
        );

        let cache = make_cache(tmp.path(), 3600);
        assert!(matches!(cache.load::<RepositoryRecord>("old/repo"), CacheResult::Miss));
    }

    #[test]
    fn future_timestamp_treated_as_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        write_raw(
            tmp.path(),
            "future/repo",
            &Envelope {
                timestamp: Utc::now() + chrono::Duration::hours(1),
                payload: Payload::Data(record(7)),
            },
        );

        let cache = make_cache(tmp.path(), 3600);
        assert!(matches!(cache.load::<RepositoryRecord>("future/repo"), CacheResult::Data(r) if r.stargazers_count == 7));
    }

    #[test]
    fn ignore_cache_returns_miss() {
        let tmp = tempfile::tempdir().unwrap();
        make_cache(tmp.path(), 3600).save("elm/core", &record(1)).unwrap();

        let cache = Cache::new(tmp.path(), Duration::from_secs(3600), Utc::now(), true);
        assert!(matches!(cache.load::<RepositoryRecord>("elm/core"), CacheResult::Miss));
    }

    #[test]
    fn entry_path_is_sanitized() {
        let cache = make_cache(Path::new("/cache"), 3600);

        let path = cache.entry_path("../../etc/passwd");
        assert!(path.starts_with("/cache"));
        assert!(!path.to_string_lossy().contains("../"));
        assert!(path.to_string_lossy().ends_with("passwd.json"));
    }

    #[test]
    fn entry_path_keeps_dotted_repo_names() {
        let cache = make_cache(Path::new("/cache"), 3600);
        assert_eq!(cache.entry_path("owner/elm.thing"), Path::new("/cache/owner/elm.thing.json"));
    }
}
