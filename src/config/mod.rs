//! Configuration loading for applications built on this crate.
//!
//! [`AppMetadata`] is always available. With the `config` feature it can be
//! loaded from a Cargo-style TOML manifest or a package.json file, and
//! [`EnvironmentLoader`] reads `.env` files and the variables the framework
//! honours.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "config")]
//! # {
//! use cbk::config::{AppMetadata, EnvironmentLoader};
//!
//! let metadata = AppMetadata::from_file("Cargo.toml").unwrap();
//! let env = EnvironmentLoader::new(None);
//!
//! println!("{} {}", metadata.name, metadata.version);
//! println!("Default log level: {:?}", env.log_level(&metadata.name));
//! # }
//! ```

#[cfg(feature = "config")]
pub mod environment;
pub mod metadata;

// Re-export main types for convenience
#[cfg(feature = "config")]
pub use self::environment::EnvironmentLoader;
pub use self::metadata::AppMetadata;
