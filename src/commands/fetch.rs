use super::common::{CommonArgs, FetchOptions, LogLevel, Session, cache_dir};
use super::{Host, ProgressReporter};
use crate::Result;
use crate::catalog::build_roster;
use crate::facts::{Cache, Provider, RepositoryDocument, documents};
use chrono::{DateTime, Utc};
use clap::Args;
use core::time::Duration;
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

const LOG_TARGET: &str = "     fetch";

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub fetch: FetchOptions,
}

pub async fn process_fetch<H: Host>(host: &mut H, args: &FetchArgs) -> Result<()> {
    let session = Session::new(&args.common)?;
    fetch(host, &session, &args.fetch, Utc::now()).await
}

/// Download the package indexes, search for projects and collect repository data into the
/// `primary` directory.
pub async fn fetch<H: Host>(host: &mut H, session: &Session, options: &FetchOptions, now: DateTime<Utc>) -> Result<()> {
    let config = &session.config;
    let layout = &session.layout;

    if options.github_token.is_none() {
        log::warn!(target: LOG_TARGET, "No GitHub token provided, unauthenticated requests are heavily rate limited");
    }

    let cache = Cache::new(cache_dir(options.cache_dir.as_ref())?, config.cache_ttl, now, options.ignore_cached);

    // With logging enabled the bar would interleave with log lines, so keep it hidden
    let delay = if session.log_level == LogLevel::None {
        Duration::from_millis(300)
    } else {
        Duration::from_hours(365 * 24)
    };
    let progress = Arc::new(ProgressReporter::new(delay, session.color.for_stderr()));

    let provider = Provider::new(options.github_token.as_deref(), config.fetch.clone(), cache, progress)?;

    let index = provider.get_package_index().await?;
    let promoted = provider.get_promoted_packages().await?;
    documents::save(&index, layout.package_index())?;
    documents::save(&promoted, layout.promoted_packages())?;

    let published: HashSet<&str> = index.iter().map(|entry| entry.name.as_str()).collect();
    let projects = provider.search_projects(&published).await;
    documents::save(&projects, layout.projects())?;

    let roster = build_roster(&index, &promoted, &projects, &config.allow_list);
    let names: Vec<String> = roster.into_iter().map(|descriptor| descriptor.name).collect();

    let repositories = provider.get_repository_records(&names).await;
    let fetched = repositories.len();

    let document = RepositoryDocument {
        retrieved: now,
        repositories,
    };
    documents::save(&document, layout.repository_data())?;

    let _ = writeln!(
        host.output(),
        "Fetched {} packages, {} projects and data for {fetched} repositories into {}",
        index.len(),
        projects.len(),
        layout.repository_data()
    );

    Ok(())
}
