//! Argument groups, logging setup and data directory layout shared between commands.

use super::config::Config;
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use directories::BaseDirs;
use ohno::IntoAppError;
use std::fs;
use std::io::{IsTerminal, stderr, stdout};

const LOG_TARGET: &str = "  commands";
const PRIMARY_DIR: &str = "primary";
const OUTPUT_DIR: &str = "output";

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    /// Whether console output should be colorized.
    #[must_use]
    pub fn for_stdout(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => stdout().is_terminal(),
        }
    }

    /// Whether the progress bar, which draws on stderr, should be colorized.
    #[must_use]
    pub fn for_stderr(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => stderr().is_terminal(),
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by every pipeline command
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory holding the `primary` and `output` documents
    #[arg(long, value_name = "PATH", default_value = "data")]
    pub data_dir: Utf8PathBuf,

    /// Path to configuration file (default is `elm-pkg-stats.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,
}

/// Arguments controlling data collection
#[derive(Args, Debug, Clone, Default)]
pub struct FetchOptions {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Directory where repository data is cached
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Ignore cached data and fetch everything fresh
    #[arg(long)]
    pub ignore_cached: bool,
}

/// Arguments controlling report output
#[derive(Args, Debug, Clone, Default)]
pub struct RenderOptions {
    /// HTML template containing `{{PACKAGES_JSON}}` and `{{RETRIEVED}}` placeholders
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub template: Option<Utf8PathBuf>,

    /// Also print a summary of the report to the terminal
    #[arg(long, help_heading = "Report Output")]
    pub console: bool,
}

/// State shared by the pipeline commands of one invocation.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub layout: DataLayout,
    pub color: ColorMode,
    pub log_level: LogLevel,
}

impl Session {
    /// Initialize logging and load the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded
    pub fn new(args: &CommonArgs) -> Result<Self> {
        init_logging(args.log_level);

        Ok(Self {
            config: Config::load(Utf8Path::new("."), args.config.as_ref())?,
            layout: DataLayout::new(args.data_dir.clone()),
            color: args.color,
            log_level: args.log_level,
        })
    }
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // A logger may already be installed when several commands run in one process
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// Resolve the cache directory: the given path or the platform's cache directory.
pub fn cache_dir(requested: Option<&Utf8PathBuf>) -> Result<std::path::PathBuf> {
    if let Some(path) = requested {
        return Ok(path.as_std_path().to_path_buf());
    }

    Ok(BaseDirs::new()
        .into_app_err("could not determine cache directory")?
        .cache_dir()
        .join("elm-pkg-stats"))
}

/// Write a text file, creating parent directories as needed.
pub fn write_file(path: &Utf8Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory '{parent}'"))?;
    }

    fs::write(path, contents).into_app_err_with(|| format!("writing '{path}'"))?;
    log::debug!(target: LOG_TARGET, "Wrote '{path}'");
    Ok(())
}

/// Write several files so that either all of them are replaced or none are.
///
/// Every file is first staged next to its destination as `<name>.tmp`; the staged files are
/// renamed into place only once all of them have been written.
pub fn write_files(files: &[(&Utf8Path, &str)]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());

    for &(path, contents) in files {
        let staging = Utf8PathBuf::from(format!("{path}.tmp"));
        if let Err(e) = write_file(&staging, contents) {
            for (staging, _) in &staged {
                let _ = fs::remove_file(staging);
            }
            return Err(e);
        }
        staged.push((staging, path));
    }

    for (staging, path) in staged {
        fs::rename(&staging, path).into_app_err_with(|| format!("moving '{staging}' to '{path}'"))?;
    }

    Ok(())
}

/// File locations inside the data directory.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: Utf8PathBuf,
}

impl DataLayout {
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn package_index(&self) -> Utf8PathBuf {
        self.primary("package-index.json")
    }

    #[must_use]
    pub fn promoted_packages(&self) -> Utf8PathBuf {
        self.primary("new-packages.json")
    }

    #[must_use]
    pub fn projects(&self) -> Utf8PathBuf {
        self.primary("projects.json")
    }

    #[must_use]
    pub fn repository_data(&self) -> Utf8PathBuf {
        self.primary("repository-data.json")
    }

    #[must_use]
    pub fn metrics(&self) -> Utf8PathBuf {
        self.output("metrics.json")
    }

    #[must_use]
    pub fn reverse_dependencies(&self) -> Utf8PathBuf {
        self.output("reverse-dependencies.json")
    }

    #[must_use]
    pub fn report(&self) -> Utf8PathBuf {
        self.output("index.html")
    }

    fn primary(&self, file: &str) -> Utf8PathBuf {
        self.root.join(PRIMARY_DIR).join(file)
    }

    fn output(&self, file: &str) -> Utf8PathBuf {
        self.root.join(OUTPUT_DIR).join(file)
    }
}
