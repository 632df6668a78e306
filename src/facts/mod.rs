//! Data collection from the package site and GitHub
//!
//! This module gathers the raw inputs of the report: the canonical package index, the list of
//! promoted packages, a GitHub search for Elm repositories that aren't published packages, and
//! one [`RepositoryRecord`] per repository (metadata, manifest, and whether `tests` and
//! `examples` directories exist).
//!
//! # Implementation Model
//!
//! The [`Provider`] issues requests sequentially through a small GitHub [`client`] that
//! classifies each response as success, not found, rate limited, or failed. When the quota is
//! exhausted the provider sleeps until the advertised reset time, bounded by configuration.
//! Per-repository results are kept in a TTL-based on-disk [`Cache`] so interrupted or repeated
//! runs don't re-query repositories that were fetched recently.
//!
//! Failures for individual repositories are logged and the repository is left out of the
//! result; only a failure to retrieve the package indexes is fatal.

mod cache;
pub mod client;
pub mod documents;
mod progress;
mod provider;
mod repository_record;
mod settings;

pub use cache::{Cache, CacheResult};
pub use progress::Progress;
pub use provider::Provider;
pub use repository_record::{Manifest, RepositoryDocument, RepositoryRecord};
pub use settings::FetchSettings;
