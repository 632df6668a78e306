//! Core library for elm-pkg-stats
//!
//! This crate is an implementation detail of the `elm-pkg-stats` tool, which harvests metadata
//! about Elm packages and their GitHub repositories, derives per-package metrics, and renders
//! a static report. The API is fluid and may change without warning.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`catalog`]: Merging of the package sources into one roster
//! - [`facts`]: Data collection from the package site and GitHub
//! - [`metrics`]: Metric extraction and reverse-dependency aggregation
//! - [`reports`]: JSON, HTML, and console output

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod catalog;

#[doc(hidden)]
pub mod commands;

#[doc(hidden)]
pub mod facts;

#[doc(hidden)]
pub mod metrics;

#[doc(hidden)]
pub mod reports;

pub use crate::commands::{Host, run};
