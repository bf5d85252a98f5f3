//! Commands, their targets in the command table, and the run context.

use std::fmt;
use std::path::PathBuf;

use crate::commands::CommandTrie;
use crate::error::{CliResult, ExitCode};
use crate::observability::LogLevel;
use crate::options::OptionGroup;

/// State of one application run, shared by the common options and the
/// command being executed.
///
/// `config` is the embedding application's own configuration; command
/// option setters write into it through `Context::config`.
#[derive(Debug, Clone)]
pub struct Context<C> {
    /// Effective log level after option parsing.
    pub log_level: LogLevel,
    /// `-h` or `--help` was given.
    pub help_requested: bool,
    /// `--version` was given.
    pub version_requested: bool,
    /// Working folder, after applying every `-C`.
    pub cwd: PathBuf,
    /// Arguments after a literal `--`.
    pub forwarded: Vec<String>,
    /// Canonical spelling of the command being run.
    pub matched_command: Option<String>,
    /// Application configuration.
    pub config: C,
    default_log_level: LogLevel,
    initial_cwd: PathBuf,
}

impl<C> Context<C> {
    /// A context whose option defaults are `log_level` and `cwd`.
    pub fn new(config: C, log_level: LogLevel, cwd: PathBuf) -> Self {
        Self {
            log_level,
            help_requested: false,
            version_requested: false,
            cwd: cwd.clone(),
            forwarded: Vec::new(),
            matched_command: None,
            config,
            default_log_level: log_level,
            initial_cwd: cwd,
        }
    }

    /// Log level restored at the start of every parse.
    pub fn default_log_level(&self) -> LogLevel {
        self.default_log_level
    }

    /// Working folder restored at the start of every parse.
    pub fn initial_cwd(&self) -> &PathBuf {
        &self.initial_cwd
    }

    pub(crate) fn restore_log_level(&mut self) {
        self.log_level = self.default_log_level;
    }

    pub(crate) fn restore_cwd(&mut self) {
        self.cwd = self.initial_cwd.clone();
    }
}

/// A command the dispatcher can run.
///
/// A fresh instance is created by the registered factory for every run.
pub trait Command<C> {
    /// Option groups specific to this command.
    fn option_groups(&self) -> Vec<OptionGroup<Context<C>>> {
        Vec::new()
    }

    /// Trailing usage text, e.g. `[<package>...]`.
    fn usage(&self) -> Option<String> {
        None
    }

    /// One-paragraph description shown in command help.
    fn description(&self) -> Option<String> {
        None
    }

    /// Execute with the arguments no option consumed.
    fn run(&mut self, ctx: &mut Context<C>, args: &[String]) -> CliResult<ExitCode>;
}

/// Creates a command instance on demand.
pub type CommandFactory<C> = Box<dyn Fn() -> Box<dyn Command<C>>>;

/// What a command table entry points to.
pub enum CommandTarget<C> {
    /// A runnable command.
    Command(CommandFactory<C>),
    /// A table of sub-commands, resolved with the words that follow.
    Nested(CommandTrie<CommandTarget<C>>),
}

impl<C> CommandTarget<C> {
    /// Wrap a factory closure.
    pub fn command<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn Command<C>> + 'static,
    {
        CommandTarget::Command(Box::new(factory))
    }
}

impl<C> fmt::Debug for CommandTarget<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandTarget::Command(_) => f.write_str("Command(..)"),
            CommandTarget::Nested(trie) => f.debug_tuple("Nested").field(&trie.commands()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Command<()> for Noop {
        fn run(&mut self, _ctx: &mut Context<()>, _args: &[String]) -> CliResult<ExitCode> {
            Ok(ExitCode::Success)
        }
    }

    #[test]
    fn test_context_defaults() {
        let mut ctx = Context::new(0u8, LogLevel::Warn, PathBuf::from("/work"));
        assert_eq!(ctx.log_level, LogLevel::Warn);
        assert_eq!(ctx.cwd, PathBuf::from("/work"));

        ctx.log_level = LogLevel::Trace;
        ctx.cwd.push("sub");
        ctx.restore_log_level();
        ctx.restore_cwd();
        assert_eq!(ctx.log_level, LogLevel::Warn);
        assert_eq!(ctx.cwd, PathBuf::from("/work"));
        assert_eq!(ctx.initial_cwd(), &PathBuf::from("/work"));
    }

    #[test]
    fn test_default_command_methods() {
        let command = Noop;
        assert!(command.option_groups().is_empty());
        assert!(command.usage().is_none());
        assert!(command.description().is_none());
    }

    #[test]
    fn test_target_debug() {
        let mut nested: CommandTrie<CommandTarget<()>> = CommandTrie::new();
        nested
            .register(&["add"], CommandTarget::command(|| Box::new(Noop)))
            .unwrap();
        let target: CommandTarget<()> = CommandTarget::Nested(nested);
        assert_eq!(format!("{:?}", target), "Nested([\"add\"])");
    }
}
