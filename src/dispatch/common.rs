//! The option group every application shares.

use std::path::PathBuf;

use crate::observability::LogLevel;
use crate::options::{OptionDefinition, OptionGroup};

use super::command::Context;

/// Title of the shared group; appending to it extends the common options.
pub const COMMON_GROUP_TITLE: &str = "Common options";

fn level_flag<C>(strings: &[&str], level: LogLevel, message: &str) -> OptionDefinition<Context<C>> {
    OptionDefinition::flag(strings, message)
        .init(|ctx: &mut Context<C>| ctx.restore_log_level())
        .action(move |ctx, _| ctx.log_level = level)
        .early()
}

/// Help, version, log level and working folder options.
///
/// Log level and working folder reset to the context defaults at the start
/// of every parse; `-C` folders accumulate, relative ones resolved against
/// the folder so far.
pub fn common_options<C>() -> OptionGroup<Context<C>> {
    OptionGroup::new(COMMON_GROUP_TITLE)
        .option(
            OptionDefinition::flag(&["-h", "--help"], "Quick help")
                .init(|ctx: &mut Context<C>| ctx.help_requested = false)
                .action(|ctx, _| ctx.help_requested = true)
                .early()
                .help_option(),
        )
        .option(
            OptionDefinition::flag(&["--version"], "Show version")
                .init(|ctx: &mut Context<C>| ctx.version_requested = false)
                .action(|ctx, _| ctx.version_requested = true)
                .early(),
        )
        .option(
            OptionDefinition::choice(&["--loglevel"], "level", &LogLevel::NAMES, "Set log level")
                .init(|ctx: &mut Context<C>| ctx.restore_log_level())
                .action(|ctx, value| {
                    if let Some(level) = value.and_then(|v| v.parse().ok()) {
                        ctx.log_level = level;
                    }
                })
                .early(),
        )
        .option(level_flag(&["-s", "--silent"], LogLevel::Silent, "Disable all messages (--loglevel silent)"))
        .option(level_flag(&["-q", "--quiet"], LogLevel::Warn, "Mostly quiet, warnings and errors (--loglevel warn)"))
        .option(level_flag(&["--informative"], LogLevel::Info, "Informative (--loglevel info)"))
        .option(level_flag(&["-v", "--verbose"], LogLevel::Verbose, "Verbose (--loglevel verbose)"))
        .option(level_flag(&["-d", "--debug"], LogLevel::Debug, "Debug messages (--loglevel debug)"))
        .option(level_flag(&["-dd", "--trace"], LogLevel::Trace, "Trace messages (--loglevel trace, -dd)"))
        .option(
            OptionDefinition::value(&["-C"], "folder", "Set current folder")
                .init(|ctx: &mut Context<C>| ctx.restore_cwd())
                .action(|ctx, value| {
                    if let Some(folder) = value {
                        let folder = PathBuf::from(shellexpand::tilde(folder).as_ref());
                        ctx.cwd = ctx.cwd.join(folder);
                    }
                })
                .multiple(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::parse_options;

    fn context() -> Context<()> {
        Context::new((), LogLevel::Info, PathBuf::from("/work"))
    }

    #[test]
    fn test_level_options() {
        let group = common_options::<()>();
        let mut ctx = context();

        parse_options(&["-dd"], &mut ctx, &[&group]).unwrap();
        assert_eq!(ctx.log_level, LogLevel::Trace);

        parse_options(&["--loglevel", "warn"], &mut ctx, &[&group]).unwrap();
        assert_eq!(ctx.log_level, LogLevel::Warn);

        // Last one wins within a parse.
        parse_options(&["-q", "-v"], &mut ctx, &[&group]).unwrap();
        assert_eq!(ctx.log_level, LogLevel::Verbose);

        parse_options(&["x"], &mut ctx, &[&group]).unwrap();
        assert_eq!(ctx.log_level, LogLevel::Info);
    }

    #[test]
    fn test_help_and_version() {
        let group = common_options::<()>();
        let mut ctx = context();
        parse_options(&["--help", "--version"], &mut ctx, &[&group]).unwrap();
        assert!(ctx.help_requested);
        assert!(ctx.version_requested);

        let none: [&str; 0] = [];
        parse_options(&none, &mut ctx, &[&group]).unwrap();
        assert!(!ctx.help_requested);
        assert!(!ctx.version_requested);
    }

    #[test]
    fn test_folder_accumulates() {
        let group = common_options::<()>();
        let mut ctx = context();
        parse_options(&["-C", "a", "-C", "b"], &mut ctx, &[&group]).unwrap();
        assert_eq!(ctx.cwd, PathBuf::from("/work/a/b"));

        parse_options(&["-C", "/abs"], &mut ctx, &[&group]).unwrap();
        assert_eq!(ctx.cwd, PathBuf::from("/abs"));
    }

    #[test]
    fn test_only_help_is_a_help_option() {
        let group = common_options::<()>();
        let help: Vec<_> = group.definitions().iter().filter(|d| d.is_help()).collect();
        assert_eq!(help.len(), 1);
        assert_eq!(help[0].joined(), "-h|--help");
        assert!(group
            .definitions()
            .iter()
            .filter(|d| !d.matches("-C"))
            .all(|d| d.is_early()));
    }
}
