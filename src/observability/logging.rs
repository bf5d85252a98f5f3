//! Log levels and subscriber set-up.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;

/// Verbosity selected on the command line.
///
/// Ordered from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LogLevel {
    /// Nothing at all.
    Silent,
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warn,
    /// Informative messages.
    #[default]
    Info,
    /// More detail than informative.
    Verbose,
    /// Debug messages.
    Debug,
    /// Trace messages.
    Trace,
    /// Everything.
    All,
}

impl LogLevel {
    /// Values accepted by `--loglevel`.
    pub const NAMES: [&'static str; 6] = ["silent", "warn", "info", "verbose", "debug", "trace"];

    /// Lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Silent => "silent",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
            LogLevel::All => "all",
        }
    }

    /// Matching `tracing` filter.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Verbose | LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace | LogLevel::All => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "verbose" => Ok(LogLevel::Verbose),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            "all" => Ok(LogLevel::All),
            other => Err(anyhow!("Unknown log level: {}", other)),
        }
    }
}

/// Install a stderr `fmt` subscriber filtered at `level`.
///
/// Calling it again keeps the subscriber installed first.
#[cfg(feature = "observability")]
pub fn init_logging(level: LogLevel) -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_max_level(level.to_level_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();

    if installed.is_err() {
        tracing::debug!(%level, "subscriber already installed");
    }
    Ok(())
}
