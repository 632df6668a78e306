//! A tool to harvest Elm package metadata and report on package health.
//!
//! # Quick Start
//!
//! ```bash
//! export GITHUB_TOKEN=...
//! elm-pkg-stats run
//! ```
//!
//! This fetches the package index and repository data into `data/primary`, extracts metrics
//! into `data/output`, and renders `data/output/index.html`.
//!
//! The stages can also be run individually:
//!
//! ```bash
//! elm-pkg-stats fetch      # download raw documents
//! elm-pkg-stats extract    # compute metrics and reverse dependencies
//! elm-pkg-stats render     # produce the HTML report and console summary
//! elm-pkg-stats init       # write a default configuration file
//! ```

use elm_pkg_stats::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that writes to the real standard streams.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
