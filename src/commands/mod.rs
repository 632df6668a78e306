//! Command-line interface and orchestration for elm-pkg-stats
//!
//! This module implements the CLI commands and drives the other modules through the
//! three pipeline stages. It handles argument parsing, configuration loading, logging
//! setup, and the layout of the data directory the stages communicate through.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **fetch**: Download the package indexes, search GitHub for projects, and collect a
//!   record per repository into `<data-dir>/primary`
//! - **extract**: Build the roster from the primary documents, derive metrics and the
//!   reverse-dependency index, and write them to `<data-dir>/output`
//! - **render**: Turn the metrics document into an HTML page and optionally print a
//!   console summary
//! - **run**: All three stages in sequence
//! - **init**: Generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes to the
//! appropriate command handler. Each pipeline command first builds a `Session` (logging,
//! configuration, data layout) and then runs its stage. Stages only communicate through
//! the JSON documents in the data directory, so each can be rerun on its own.

mod common;
mod config;
mod extract;
mod fetch;
mod host;
mod init;
mod pipeline;
mod progress_reporter;
mod render;
mod run;

pub use common::{ColorMode, CommonArgs, DataLayout, FetchOptions, LogLevel, RenderOptions, Session};
pub use config::{CONFIG_FILE_NAME, Config, DEFAULT_CONFIG_TOML};
pub use extract::{ExtractArgs, extract, process_extract};
pub use fetch::{FetchArgs, fetch, process_fetch};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use pipeline::{PipelineArgs, process_pipeline};
pub use progress_reporter::ProgressReporter;
pub use render::{RenderArgs, process_render, render};
pub use run::run;
