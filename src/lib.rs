//! Command Builder Kit (CBK) - the plumbing of multi-command CLI programs
//!
//! CBK provides the pieces an application needs to turn `argv` into a
//! command invocation:
//!
//! - **`commands`** - A prefix tree resolving abbreviated, multi-word commands
//! - **`options`** - Declarative option groups and a single-pass parser
//! - **`dispatch`** - The application object, command trait and run loop
//! - **`help`** - Aligned help text for the application and each command
//! - **`config`** - Application metadata and environment loading
//! - **`observability`** - Log levels and tracing setup
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! cbk = "0.3"
//! # Without metadata files, dotenv or colour:
//! cbk = { version = "0.3", default-features = false }
//! ```
//!
//! # Example
//!
//! ```
//! use cbk::prelude::*;
//!
//! #[derive(Default)]
//! struct Config {
//!     global: bool,
//! }
//!
//! struct Install;
//!
//! impl Command<Config> for Install {
//!     fn option_groups(&self) -> Vec<OptionGroup<Context<Config>>> {
//!         vec![OptionGroup::new("Install options").option(
//!             OptionDefinition::flag(&["-g", "--global"], "Install globally")
//!                 .init(|ctx: &mut Context<Config>| ctx.config.global = false)
//!                 .action(|ctx, _| ctx.config.global = true),
//!         )]
//!     }
//!
//!     fn run(&mut self, _ctx: &mut Context<Config>, args: &[String]) -> CliResult<ExitCode> {
//!         if args.is_empty() {
//!             return Err(CliError::input("nothing to install"));
//!         }
//!         Ok(ExitCode::Success)
//!     }
//! }
//!
//! let mut app = Application::new(AppMetadata::new("xpm", "0.5.0"));
//! app.register_command(&["install", "i"], || Box::new(Install)).unwrap();
//!
//! assert_eq!(app.run(&["i", "-g", "pkg"], Config::default()), ExitCode::Success);
//! assert_eq!(app.run(&["install"], Config::default()), ExitCode::Input);
//! ```

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod help;
pub mod observability;
pub mod options;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::commands::CommandTrie;
    pub use crate::config::AppMetadata;
    pub use crate::dispatch::{Application, Command, CommandTarget, Context};
    pub use crate::error::{CliError, CliResult, ExitCode, SyntaxError};
    pub use crate::observability::LogLevel;
    pub use crate::options::{OptionDefinition, OptionGroup};
}

pub use error::{CliError, CliResult, ExitCode};
