//! Logging for applications built on this crate.
//!
//! The framework itself reports through `tracing`; this module holds the
//! user-facing [`LogLevel`] set by the common options and, with the
//! `observability` feature, a stderr subscriber honouring it.
//!
//! # Example
//!
//! ```no_run
//! use cbk::observability::{init_logging, LogLevel};
//!
//! let level: LogLevel = "debug".parse().unwrap();
//! init_logging(level).unwrap();
//! tracing::debug!("visible at debug level");
//! ```

pub mod logging;

// Re-export main types for convenience
pub use logging::LogLevel;

#[cfg(feature = "observability")]
pub use logging::init_logging;
