//! Command dispatch logic for elm-pkg-stats

use super::{
    ExtractArgs, FetchArgs, InitArgs, PipelineArgs, RenderArgs, init_config, process_extract, process_fetch, process_pipeline,
    process_render,
};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "elm-pkg-stats", version, author, long_about = None)]
#[command(about = "Collect Elm package statistics and render a report")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the package indexes and repository data
    Fetch(Box<FetchArgs>),
    /// Compute metrics and reverse dependencies from downloaded data
    Extract(ExtractArgs),
    /// Render the HTML report from computed metrics
    Render(RenderArgs),
    /// Fetch, extract and render in one go
    Run(Box<PipelineArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match Cli::parse_from(args).command {
        Command::Fetch(fetch_args) => process_fetch(host, &fetch_args).await,
        Command::Extract(extract_args) => process_extract(host, &extract_args),
        Command::Render(render_args) => process_render(host, &render_args),
        Command::Run(pipeline_args) => process_pipeline(host, &pipeline_args).await,
        Command::Init(init_args) => init_config(host, &init_args),
    }
}
