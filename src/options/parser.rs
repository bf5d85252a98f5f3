//! The option-parsing engine.
//!
//! One left-to-right pass over the argument vector:
//!
//! 1. every definition in scope is initialised and its match flag cleared;
//! 2. a literal `--` stops the scan, everything after it is forwarded as is;
//! 3. a `-`-prefixed argument is compared with every definition in order,
//!    first exact match wins; value-taking definitions consume the next
//!    argument;
//! 4. anything else is kept, in order, as remaining.
//!
//! Mandatory options are checked separately by [`check_mandatory`], after
//! the caller is done parsing.

use std::ptr;

use tracing::{debug, trace};

use crate::error::SyntaxError;

use super::definition::OptionDefinition;
use super::group::OptionGroup;

/// Marks the end of interpreted arguments.
pub const SEPARATOR: &str = "--";

/// Result of a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Arguments not consumed by any definition, in original order.
    pub remaining: Vec<String>,
    /// Arguments after a literal `--`; `None` when there was no `--`.
    pub forwarded: Option<Vec<String>>,
}

/// Positions of what a scan left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Scan {
    /// Indices of remaining arguments.
    pub(crate) remaining: Vec<usize>,
    /// Index of the first `--`, if any.
    pub(crate) separator: Option<usize>,
}

impl Scan {
    pub(crate) fn outcome<S: AsRef<str>>(&self, argv: &[S]) -> ParseOutcome {
        ParseOutcome {
            remaining: self
                .remaining
                .iter()
                .map(|&i| argv[i].as_ref().to_string())
                .collect(),
            forwarded: self.separator.map(|sep| {
                argv[sep + 1..]
                    .iter()
                    .map(|a| a.as_ref().to_string())
                    .collect()
            }),
        }
    }
}

/// Flatten groups into definitions, skipping groups listed twice.
pub(crate) fn definitions_of<'a, C>(groups: &[&'a OptionGroup<C>]) -> Vec<&'a OptionDefinition<C>> {
    let mut seen: Vec<&OptionGroup<C>> = Vec::with_capacity(groups.len());
    let mut definitions = Vec::new();
    for &group in groups {
        if seen.iter().any(|g| ptr::eq(*g, group)) {
            continue;
        }
        seen.push(group);
        definitions.extend(group.definitions().iter());
    }
    definitions
}

pub(crate) fn scan<C, S: AsRef<str>>(
    argv: &[S],
    config: &mut C,
    definitions: &[&OptionDefinition<C>],
) -> Result<Scan, SyntaxError> {
    for definition in definitions {
        definition.reset(config);
    }

    let mut result = Scan::default();
    let mut i = 0;
    while i < argv.len() {
        let arg = argv[i].as_ref();
        if arg == SEPARATOR {
            trace!(index = i, "separator reached");
            result.separator = Some(i);
            break;
        }

        let matched = if arg.starts_with('-') {
            definitions.iter().find(|d| d.matches(arg))
        } else {
            None
        };

        let Some(definition) = matched else {
            trace!(arg, "remaining");
            result.remaining.push(i);
            i += 1;
            continue;
        };

        if definition.shape().takes_value() {
            let value = match argv.get(i + 1).map(|v| v.as_ref()) {
                Some(value) if value != SEPARATOR => value,
                _ => return Err(SyntaxError::missing_value(arg)),
            };
            if let Some(allowed) = definition.shape().allowed() {
                if !allowed.iter().any(|a| a == value) {
                    return Err(SyntaxError::illegal_value(value, arg));
                }
            }
            debug!(option = arg, value, "matched option");
            definition.apply(config, Some(value));
            i += 2;
        } else {
            debug!(option = arg, "matched option");
            definition.apply(config, None);
            i += 1;
        }
    }

    Ok(result)
}

/// Parse `argv` against an explicit list of definitions.
pub fn parse_definitions<C, S: AsRef<str>>(
    argv: &[S],
    config: &mut C,
    definitions: &[&OptionDefinition<C>],
) -> Result<ParseOutcome, SyntaxError> {
    Ok(scan(argv, config, definitions)?.outcome(argv))
}

/// Parse `argv` against the definitions of `groups`, mutating `config`.
///
/// # Example
///
/// ```
/// use cbk::options::{parse_options, OptionDefinition, OptionGroup};
///
/// #[derive(Default)]
/// struct Config {
///     flag: u32,
/// }
///
/// let group = OptionGroup::new("Options").option(
///     OptionDefinition::flag(&["--flag"], "A flag").action(|c: &mut Config, _| c.flag += 1),
/// );
///
/// let mut config = Config::default();
/// let outcome = parse_options(&["a", "--flag", "--", "b", "--flag"], &mut config, &[&group]).unwrap();
///
/// assert_eq!(outcome.remaining, vec!["a"]);
/// assert_eq!(outcome.forwarded, Some(vec!["b".to_string(), "--flag".to_string()]));
/// assert_eq!(config.flag, 1);
/// ```
pub fn parse_options<C, S: AsRef<str>>(
    argv: &[S],
    config: &mut C,
    groups: &[&OptionGroup<C>],
) -> Result<ParseOutcome, SyntaxError> {
    parse_definitions(argv, config, &definitions_of(groups))
}

/// One message per mandatory definition the latest parse did not match.
///
/// Returns `None` when nothing is missing.
pub fn check_mandatory<C>(groups: &[&OptionGroup<C>]) -> Option<Vec<String>> {
    let messages: Vec<String> = definitions_of(groups)
        .into_iter()
        .filter(|d| d.is_mandatory() && !d.was_matched())
        .map(|d| format!("Mandatory '{}' not found", d.joined()))
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Config {
        file: Option<String>,
        output: Option<String>,
        loglevel: String,
        flags: u32,
    }

    fn files_group() -> OptionGroup<Config> {
        OptionGroup::new("Files")
            .option(
                OptionDefinition::value(&["--file"], "file", "Input file")
                    .init(|c: &mut Config| c.file = None)
                    .action(|c, v| c.file = v.map(str::to_string))
                    .mandatory(),
            )
            .option(
                OptionDefinition::value(&["-o", "--output"], "file", "Output file")
                    .init(|c: &mut Config| c.output = None)
                    .action(|c, v| c.output = v.map(str::to_string))
                    .mandatory(),
            )
    }

    fn common_group() -> OptionGroup<Config> {
        OptionGroup::new("Common")
            .option(
                OptionDefinition::choice(
                    &["--loglevel"],
                    "level",
                    &["silent", "warn", "info"],
                    "Log level",
                )
                .init(|c: &mut Config| c.loglevel = "info".to_string())
                .action(|c, v| c.loglevel = v.unwrap_or_default().to_string()),
            )
            .option(
                OptionDefinition::flag(&["--flag"], "A flag")
                    .init(|c: &mut Config| c.flags = 0)
                    .action(|c, _| c.flags += 1),
            )
    }

    #[test]
    fn test_value_option_without_value() {
        let group = files_group();
        let mut config = Config::default();
        let err = parse_options(&["--file"], &mut config, &[&group]).unwrap_err();
        assert_eq!(err, SyntaxError::missing_value("--file"));
        assert_eq!(err.to_string(), "'--file' expects a value");
    }

    #[test]
    fn test_separator_is_not_a_value() {
        let group = files_group();
        let mut config = Config::default();
        let err = parse_options(&["--file", "--", "x"], &mut config, &[&group]).unwrap_err();
        assert_eq!(err, SyntaxError::missing_value("--file"));
    }

    #[test]
    fn test_mandatory_messages_one_per_missing_option() {
        let group = files_group();
        let mut config = Config::default();
        let none: [&str; 0] = [];
        parse_options(&none, &mut config, &[&group]).unwrap();
        let messages = check_mandatory(&[&group]).unwrap();
        assert_eq!(
            messages,
            vec![
                "Mandatory '--file' not found".to_string(),
                "Mandatory '-o|--output' not found".to_string(),
            ]
        );

        parse_options(&["--file", "a", "-o", "b"], &mut config, &[&group]).unwrap();
        assert!(check_mandatory(&[&group]).is_none());
        assert_eq!(config.file.as_deref(), Some("a"));
        assert_eq!(config.output.as_deref(), Some("b"));

        parse_options(&["--file", "a"], &mut config, &[&group]).unwrap();
        assert_eq!(
            check_mandatory(&[&group]).unwrap(),
            vec!["Mandatory '-o|--output' not found".to_string()]
        );
    }

    #[test]
    fn test_illegal_enumerated_value() {
        let group = common_group();
        let mut config = Config::default();
        let err = parse_options(&["--loglevel", "bogus"], &mut config, &[&group]).unwrap_err();
        assert_eq!(err, SyntaxError::illegal_value("bogus", "--loglevel"));

        parse_options(&["--loglevel", "warn"], &mut config, &[&group]).unwrap();
        assert_eq!(config.loglevel, "warn");
    }

    #[test]
    fn test_forwarded_arguments() {
        let group = common_group();
        let mut config = Config::default();
        let outcome =
            parse_options(&["a", "--flag", "--", "b", "--flag"], &mut config, &[&group]).unwrap();
        assert_eq!(outcome.remaining, vec!["a"]);
        assert_eq!(
            outcome.forwarded,
            Some(vec!["b".to_string(), "--flag".to_string()])
        );
        assert_eq!(config.flags, 1);
    }

    #[test]
    fn test_no_separator_means_no_forwarded_list() {
        let group = common_group();
        let mut config = Config::default();
        let outcome = parse_options(&["a"], &mut config, &[&group]).unwrap();
        assert_eq!(outcome.forwarded, None);

        let outcome = parse_options(&["a", "--"], &mut config, &[&group]).unwrap();
        assert_eq!(outcome.forwarded, Some(vec![]));
    }

    #[test]
    fn test_unknown_options_are_remaining() {
        let group = common_group();
        let mut config = Config::default();
        let outcome = parse_options(
            &["--unknown", "x", "--fla", "-", "--flag"],
            &mut config,
            &[&group],
        )
        .unwrap();
        assert_eq!(outcome.remaining, vec!["--unknown", "x", "--fla", "-"]);
        assert_eq!(config.flags, 1);
    }

    #[test]
    fn test_empty_parse_restores_defaults() {
        let group = common_group();
        let mut config = Config::default();
        parse_options(&["--loglevel", "silent", "--flag"], &mut config, &[&group]).unwrap();
        assert_eq!(config.loglevel, "silent");

        let none: [&str; 0] = [];
        parse_options(&none, &mut config, &[&group]).unwrap();
        let mut fresh = Config::default();
        parse_options(&none, &mut fresh, &[&common_group()]).unwrap();
        assert_eq!(config, fresh);
    }

    #[test]
    fn test_first_definition_wins() {
        let group: OptionGroup<Config> = OptionGroup::new("Dup")
            .option(OptionDefinition::flag(&["-x"], "first").action(|c: &mut Config, _| c.flags += 1))
            .option(
                OptionDefinition::flag(&["-x"], "second").action(|c: &mut Config, _| c.flags += 10),
            );
        let mut config = Config::default();
        parse_options(&["-x"], &mut config, &[&group]).unwrap();
        assert_eq!(config.flags, 1);
        assert!(group.definitions()[0].was_matched());
        assert!(!group.definitions()[1].was_matched());
    }

    #[test]
    fn test_group_listed_twice_is_scanned_once() {
        let group = common_group();
        assert_eq!(definitions_of(&[&group, &group]).len(), 2);
    }

    #[test]
    fn test_scan_positions() {
        let group = common_group();
        let mut config = Config::default();
        let argv = ["install", "--loglevel", "warn", "pkg", "--", "x"];
        let result = scan(&argv, &mut config, &definitions_of(&[&group])).unwrap();
        assert_eq!(result.remaining, vec![0, 3]);
        assert_eq!(result.separator, Some(4));
    }
}
