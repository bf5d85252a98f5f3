//! The application: command table, shared options, and the run loop.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::commands::CommandTrie;
use crate::config::AppMetadata;
use crate::error::{CliResult, ExitCode, RegistrationError, SyntaxError};
use crate::help::{CommandHelp, HelpFormatter};
use crate::observability::LogLevel;
use crate::options::parser::{definitions_of, scan};
use crate::options::{check_mandatory, parse_options, OptionDefinition, OptionGroup, OptionTable};

use super::command::{Command, CommandFactory, CommandTarget, Context};
use super::common::common_options;

fn command_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z-]*$").unwrap())
}

fn is_command_word(arg: &str) -> bool {
    command_word().is_match(&arg.to_lowercase())
}

/// A command-line application.
///
/// Holds everything registered at start-up. Running it never changes the
/// registrations, so one instance can serve any number of runs.
///
/// # Example
///
/// ```
/// use cbk::prelude::*;
///
/// struct Hello;
///
/// impl Command<()> for Hello {
///     fn run(&mut self, _ctx: &mut Context<()>, args: &[String]) -> CliResult<ExitCode> {
///         println!("hello {}", args.join(" "));
///         Ok(ExitCode::Success)
///     }
/// }
///
/// let mut app = Application::new(AppMetadata::new("greet", "1.0.0"));
/// app.register_command(&["hello", "hi"], || Box::new(Hello)).unwrap();
///
/// assert_eq!(app.run(&["hel", "world"], ()), ExitCode::Success);
/// assert_eq!(app.run(&["bye"], ()), ExitCode::Syntax);
/// ```
pub struct Application<C> {
    metadata: AppMetadata,
    commands: CommandTrie<CommandTarget<C>>,
    options: OptionTable<Context<C>>,
    root: Option<CommandFactory<C>>,
    default_log_level: LogLevel,
    color: bool,
    logging: bool,
}

impl<C: 'static> Application<C> {
    /// An application with the common options and no commands.
    pub fn new(metadata: AppMetadata) -> Self {
        let mut options = OptionTable::new();
        options.register_group(common_options());
        Self {
            metadata,
            commands: CommandTrie::new(),
            options,
            root: None,
            default_log_level: LogLevel::default(),
            color: false,
            logging: false,
        }
    }

    /// Log level used when no option sets one.
    pub fn with_default_log_level(mut self, level: LogLevel) -> Self {
        self.default_log_level = level;
        self
    }

    /// Colour the `error:` prefix of reported errors.
    ///
    /// [`execute`](Self::execute) honours this for any writer. [`run`](Self::run)
    /// additionally requires stderr to be a terminal.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Install a tracing subscriber at the parsed log level on every run.
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Application metadata.
    pub fn metadata(&self) -> &AppMetadata {
        &self.metadata
    }

    /// Top-level command table.
    pub fn commands(&self) -> &CommandTrie<CommandTarget<C>> {
        &self.commands
    }

    /// Option groups shared by every command.
    pub fn options(&self) -> &OptionTable<Context<C>> {
        &self.options
    }

    /// Register a command under its canonical spelling and aliases.
    pub fn register_command<S, F>(&mut self, aliases: &[S], factory: F) -> Result<(), RegistrationError>
    where
        S: AsRef<str>,
        F: Fn() -> Box<dyn Command<C>> + 'static,
    {
        self.commands.register(aliases, CommandTarget::command(factory))
    }

    /// Register a table of sub-commands, e.g. `remote` with `add`, `remove`.
    pub fn register_nested<S: AsRef<str>>(
        &mut self,
        aliases: &[S],
        table: CommandTrie<CommandTarget<C>>,
    ) -> Result<(), RegistrationError> {
        self.commands.register(aliases, CommandTarget::Nested(table))
    }

    /// Add an option group shared by every command.
    pub fn register_option_group(&mut self, group: OptionGroup<Context<C>>) {
        self.options.register_group(group);
    }

    /// Append definitions to a shared group, e.g. [`super::COMMON_GROUP_TITLE`].
    pub fn append_to_group(
        &mut self,
        title: &str,
        definitions: impl IntoIterator<Item = OptionDefinition<Context<C>>>,
    ) {
        self.options.append_to_group(title, definitions);
    }

    /// Command run when no command words are given and none are registered.
    pub fn set_root_command<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn Command<C>> + 'static,
    {
        self.root = Some(Box::new(factory));
    }

    /// A fresh context for `config`, rooted at the process working folder.
    pub fn context(&self, config: C) -> Context<C> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Context::new(config, self.default_log_level, cwd)
    }

    /// Run with `argv` (program name excluded), writing to stdout and stderr.
    pub fn run<S: AsRef<str>>(&self, argv: &[S], config: C) -> ExitCode {
        let mut ctx = self.context(config);
        let stdout = io::stdout();
        let stderr = io::stderr();
        let color = self.color && stderr.is_terminal();
        self.execute_with(
            argv,
            &mut ctx,
            &mut stdout.lock(),
            &mut Reporter::new(&mut stderr.lock(), color),
        )
    }

    /// Run with the process arguments and environment.
    ///
    /// With the `config` feature, `<APP>_LOG_LEVEL` overrides the default log
    /// level and `NO_COLOR` disables coloured errors.
    pub fn run_with_env(self, config: C) -> ExitCode {
        let app = self.apply_environment();
        let argv: Vec<String> = env::args().skip(1).collect();
        app.run(&argv, config)
    }

    #[cfg(feature = "config")]
    fn apply_environment(mut self) -> Self {
        let environment = crate::config::EnvironmentLoader::new(None);
        if let Some(level) = environment.log_level(&self.metadata.name) {
            self.default_log_level = level;
        }
        if environment.no_color() {
            self.color = false;
        }
        self
    }

    #[cfg(not(feature = "config"))]
    fn apply_environment(mut self) -> Self {
        if env::var("NO_COLOR").is_ok_and(|v| !v.is_empty()) {
            self.color = false;
        }
        self
    }

    /// Run against an existing context with explicit writers.
    ///
    /// Help and version go to `out`; error messages go to `err`.
    pub fn execute<S: AsRef<str>>(
        &self,
        argv: &[S],
        ctx: &mut Context<C>,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> ExitCode {
        self.execute_with(argv, ctx, out, &mut Reporter::new(err, self.color))
    }

    fn execute_with<S: AsRef<str>>(
        &self,
        argv: &[S],
        ctx: &mut Context<C>,
        out: &mut dyn Write,
        err: &mut Reporter<'_>,
    ) -> ExitCode {
        let argv: Vec<String> = argv.iter().map(|a| a.as_ref().to_string()).collect();
        match self.dispatch(&argv, ctx, out, err) {
            Ok(code) => {
                debug!(code = code.code(), "run finished");
                code
            }
            Err(e) => {
                err.report(&e.to_string());
                e.exit_code()
            }
        }
    }

    fn dispatch(
        &self,
        argv: &[String],
        ctx: &mut Context<C>,
        out: &mut dyn Write,
        err: &mut Reporter<'_>,
    ) -> CliResult<ExitCode> {
        if let Err(e) = self.options.parse_early(argv, ctx) {
            return self.main_help_failure(e, out, err);
        }

        self.install_logging(ctx.log_level)?;

        if ctx.version_requested {
            writeln!(out, "{}", self.metadata.version)?;
            return Ok(ExitCode::Success);
        }

        let common = self.options.scope();
        let scanned = match scan(argv, ctx, &definitions_of(&common)) {
            Ok(scanned) => scanned,
            Err(e) => return self.main_help_failure(e, out, err),
        };
        // Without a command table every argument belongs to the root command.
        let words: Vec<usize> = if self.commands.is_empty() {
            Vec::new()
        } else {
            scanned
                .remaining
                .iter()
                .copied()
                .take_while(|&i| is_command_word(&argv[i]))
                .collect()
        };

        if words.is_empty() {
            if ctx.help_requested {
                self.write_main_help(out)?;
                return Ok(ExitCode::Success);
            }
            if !self.commands.is_empty() {
                return self.main_help_failure(SyntaxError::MissingCommand, out, err);
            }
            return match &self.root {
                Some(factory) => self.run_command(factory, None, argv.to_vec(), ctx, out, err),
                None => {
                    self.write_main_help(out)?;
                    Ok(ExitCode::Syntax)
                }
            };
        }

        let typed: Vec<&str> = words.iter().map(|&i| argv[i].as_str()).collect();
        let (factory, matched, consumed) = match self.resolve(&typed) {
            Ok(found) => found,
            Err(e) => return self.main_help_failure(e, out, err),
        };
        info!(command = %matched, "dispatching");

        let consumed = &words[..consumed];
        let command_argv: Vec<String> = argv
            .iter()
            .enumerate()
            .filter(|(i, _)| !consumed.contains(i))
            .map(|(_, a)| a.clone())
            .collect();

        self.run_command(factory, Some(matched), command_argv, ctx, out, err)
    }

    /// Resolve command words through nested tables.
    ///
    /// Returns the factory, the full canonical command text and how many of
    /// `words` it consumed.
    fn resolve(&self, words: &[&str]) -> Result<(&CommandFactory<C>, String, usize), SyntaxError> {
        let mut table = &self.commands;
        let mut matched: Vec<String> = Vec::new();
        let mut rest: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        loop {
            if rest.is_empty() {
                return Err(SyntaxError::MissingCommand);
            }
            let resolution = table.resolve(&rest)?;
            matched.push(resolution.matched_command);
            match resolution.payload {
                CommandTarget::Command(factory) => {
                    let consumed = words.len() - resolution.unconsumed_words.len();
                    return Ok((factory, matched.join(" "), consumed));
                }
                CommandTarget::Nested(nested) => {
                    table = nested;
                    rest = resolution.unconsumed_words;
                }
            }
        }
    }

    fn run_command(
        &self,
        factory: &CommandFactory<C>,
        matched: Option<String>,
        argv: Vec<String>,
        ctx: &mut Context<C>,
        out: &mut dyn Write,
        err: &mut Reporter<'_>,
    ) -> CliResult<ExitCode> {
        let mut command = factory();
        let groups = command.option_groups();
        let own: Vec<&OptionGroup<Context<C>>> = groups.iter().collect();
        let mut scope = self.options.scope();
        scope.extend(own.iter().copied());

        ctx.matched_command = matched;
        let outcome = match parse_options(&argv, ctx, &scope) {
            Ok(outcome) => outcome,
            Err(e) => {
                err.report(&e.to_string());
                self.write_command_help(out, &*command, ctx, &own)?;
                return Ok(ExitCode::Syntax);
            }
        };

        if ctx.help_requested {
            self.write_command_help(out, &*command, ctx, &own)?;
            return Ok(ExitCode::Success);
        }

        if let Some(messages) = check_mandatory(&scope) {
            let e = SyntaxError::MissingMandatory { messages };
            err.report(&e.to_string());
            self.write_command_help(out, &*command, ctx, &own)?;
            return Ok(ExitCode::Syntax);
        }

        ctx.forwarded = outcome.forwarded.unwrap_or_default();
        debug!(
            args = ?outcome.remaining,
            forwarded = ?ctx.forwarded,
            cwd = %ctx.cwd.display(),
            "running command"
        );
        command.run(ctx, &outcome.remaining)
    }

    #[cfg(feature = "observability")]
    fn install_logging(&self, level: LogLevel) -> CliResult<()> {
        if self.logging {
            crate::observability::init_logging(level)?;
        }
        Ok(())
    }

    #[cfg(not(feature = "observability"))]
    fn install_logging(&self, _level: LogLevel) -> CliResult<()> {
        Ok(())
    }

    fn main_help_failure(
        &self,
        error: SyntaxError,
        out: &mut dyn Write,
        err: &mut Reporter<'_>,
    ) -> CliResult<ExitCode> {
        err.report(&error.to_string());
        self.write_main_help(out)?;
        Ok(ExitCode::Syntax)
    }

    fn formatter(&self) -> HelpFormatter<'_> {
        HelpFormatter::new(&self.metadata)
    }

    fn write_main_help(&self, out: &mut dyn Write) -> io::Result<()> {
        let text = self
            .formatter()
            .main_help(&self.commands.commands(), &self.options.scope());
        out.write_all(text.as_bytes())
    }

    fn write_command_help(
        &self,
        out: &mut dyn Write,
        command: &dyn Command<C>,
        ctx: &Context<C>,
        own: &[&OptionGroup<Context<C>>],
    ) -> io::Result<()> {
        let description = command.description();
        let usage = command.usage();
        let text = self.formatter().command_help(
            CommandHelp {
                name: ctx.matched_command.as_deref(),
                description: description.as_deref(),
                usage: usage.as_deref(),
            },
            own,
            &self.options.scope(),
        );
        out.write_all(text.as_bytes())
    }

}

/// Error writer of one run.
struct Reporter<'a> {
    err: &'a mut dyn Write,
    color: bool,
}

impl<'a> Reporter<'a> {
    fn new(err: &'a mut dyn Write, color: bool) -> Self {
        Self { err, color }
    }

    /// One `error:` line per message line. Write failures are ignored; there
    /// is nowhere left to report them.
    fn report(&mut self, message: &str) {
        let prefix = self.prefix();
        for line in message.lines() {
            let _ = writeln!(self.err, "{} {}", prefix, line);
        }
    }

    // Escape codes are written directly: `Colorize` would consult stdout,
    // not the writer the prefix goes to.
    #[cfg(feature = "color")]
    fn prefix(&self) -> String {
        if self.color {
            format!("\x1b[1;{}merror:\x1b[0m", colored::Color::Red.to_fg_str())
        } else {
            "error:".to_string()
        }
    }

    #[cfg(not(feature = "color"))]
    fn prefix(&self) -> String {
        "error:".to_string()
    }
}

impl<C> std::fmt::Debug for Application<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("metadata", &self.metadata)
            .field("commands", &self.commands.commands())
            .field("root", &self.root.is_some())
            .field("default_log_level", &self.default_log_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Recorded {
        runs: Vec<(Option<String>, Vec<String>)>,
    }

    struct Recorder(Rc<RefCell<Recorded>>);

    impl Command<()> for Recorder {
        fn run(&mut self, ctx: &mut Context<()>, args: &[String]) -> CliResult<ExitCode> {
            self.0
                .borrow_mut()
                .runs
                .push((ctx.matched_command.clone(), args.to_vec()));
            Ok(ExitCode::Success)
        }
    }

    fn app(record: &Rc<RefCell<Recorded>>) -> Application<()> {
        let mut app = Application::new(AppMetadata::new("xpm", "0.5.0"));
        for spellings in [
            &["install", "i"][..],
            &["link", "ln"][..],
            &["list", "ls"][..],
            &["uninstall"][..],
        ] {
            let record = Rc::clone(record);
            app.register_command(spellings, move || Box::new(Recorder(Rc::clone(&record))))
                .unwrap();
        }
        app
    }

    fn execute(app: &Application<()>, argv: &[&str]) -> (ExitCode, String, String) {
        let mut ctx = Context::new((), LogLevel::Info, PathBuf::from("/"));
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = app.execute(argv, &mut ctx, &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_command_words() {
        assert!(is_command_word("install"));
        assert!(is_command_word("Run-Script"));
        assert!(!is_command_word("-v"));
        assert!(!is_command_word("pkg@1.0"));
        assert!(!is_command_word("1abc"));
    }

    #[test]
    fn test_abbreviation_runs_command() {
        let record = Rc::new(RefCell::new(Recorded::default()));
        let app = app(&record);
        let (code, _, _) = execute(&app, &["inst", "pkg@1.0"]);
        assert_eq!(code, ExitCode::Success);
        let recorded = record.borrow();
        let runs = &recorded.runs;
        assert_eq!(runs[0].0.as_deref(), Some("install"));
        assert_eq!(runs[0].1, vec!["pkg@1.0"]);
    }

    #[test]
    fn test_unknown_command_is_syntax_error() {
        let record = Rc::new(RefCell::new(Recorded::default()));
        let app = app(&record);
        let (code, out, err) = execute(&app, &["bogus"]);
        assert_eq!(code, ExitCode::Syntax);
        assert!(err.contains("Command 'bogus' is not supported."));
        assert!(out.contains("where <command> is one of:"));
        assert!(record.borrow().runs.is_empty());
    }

    #[test]
    fn test_ambiguous_command() {
        let record = Rc::new(RefCell::new(Recorded::default()));
        let app = app(&record);
        let (code, _, err) = execute(&app, &["li"]);
        assert_eq!(code, ExitCode::Syntax);
        assert!(err.contains("is not unique"), "{}", err);
    }

    #[test]
    fn test_version() {
        let record = Rc::new(RefCell::new(Recorded::default()));
        let app = app(&record);
        let (code, out, _) = execute(&app, &["--version", "install"]);
        assert_eq!(code, ExitCode::Success);
        assert_eq!(out, "0.5.0\n");
        assert!(record.borrow().runs.is_empty());
    }

    #[test]
    fn test_missing_command() {
        let record = Rc::new(RefCell::new(Recorded::default()));
        let app = app(&record);
        let (code, _, err) = execute(&app, &["-v"]);
        assert_eq!(code, ExitCode::Syntax);
        assert_eq!(err, "error: Missing mandatory command.\n");
    }

    #[cfg(feature = "color")]
    #[test]
    fn test_colored_error_prefix() {
        let record = Rc::new(RefCell::new(Recorded::default()));
        let app = app(&record).with_color(true);
        let (code, _, err) = execute(&app, &["bogus"]);
        assert_eq!(code, ExitCode::Syntax);
        assert_eq!(
            err,
            "\x1b[1;31merror:\x1b[0m Command 'bogus' is not supported.\n"
        );

        let app = app.with_color(false);
        let (_, _, err) = execute(&app, &["bogus"]);
        assert_eq!(err, "error: Command 'bogus' is not supported.\n");
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_environment_overrides() {
        let record = Rc::new(RefCell::new(Recorded::default()));
        let mut app = app(&record).with_color(true);
        app.metadata.name = "cbk-app-env-test".to_string();

        env::set_var("CBK_APP_ENV_TEST_LOG_LEVEL", "debug");
        env::remove_var("NO_COLOR");
        let app = app.apply_environment();
        assert!(app.color);
        assert_eq!(app.default_log_level, LogLevel::Debug);
        assert_eq!(app.context(()).log_level, LogLevel::Debug);

        env::set_var("NO_COLOR", "1");
        let app = app.apply_environment();
        assert!(!app.color);

        env::remove_var("NO_COLOR");
        env::remove_var("CBK_APP_ENV_TEST_LOG_LEVEL");
    }

    #[test]
    fn test_run_with_logging_installed() {
        let record = Rc::new(RefCell::new(Recorded::default()));
        let app = app(&record).with_logging(true);
        let (code, _, _) = execute(&app, &["-d", "install", "pkg"]);
        assert_eq!(code, ExitCode::Success);
        assert_eq!(record.borrow().runs.len(), 1);
    }
}
