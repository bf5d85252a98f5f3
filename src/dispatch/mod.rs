//! Command dispatch.
//!
//! [`Application`] ties the pieces together: it parses the shared options,
//! picks the command from the leading command words, re-parses with the
//! command's own options, checks mandatory options and runs the command.
//! Every outcome, including syntax errors and help requests, ends as an
//! [`ExitCode`](crate::error::ExitCode).

pub mod application;
pub mod command;
pub mod common;

pub use application::Application;
pub use command::{Command, CommandFactory, CommandTarget, Context};
pub use common::{common_options, COMMON_GROUP_TITLE};
