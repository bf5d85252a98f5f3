//! Error types and process exit codes.
//!
//! Errors fall into three classes:
//!
//! - [`SyntaxError`] - the user typed something the framework cannot accept
//!   (unknown or ambiguous command, missing or illegal option value, missing
//!   mandatory options). Reported with help, never with a backtrace.
//! - [`RegistrationError`] - the embedding application misused the
//!   registration API. These are defects and should abort start-up.
//! - Everything else a command can fail with, carried by [`CliError`] and
//!   mapped to one of the reserved [`ExitCode`]s.

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Reserved process exit codes.
///
/// The numeric values are part of the public contract; scripts that wrap an
/// application built on this crate may test for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExitCode {
    /// Everything went fine.
    Success = 0,
    /// Malformed command line.
    Syntax = 1,
    /// The command itself failed.
    Application = 2,
    /// Input data could not be read or was invalid.
    Input = 3,
    /// Output could not be written.
    Output = 4,
    /// A spawned child process failed.
    Child = 5,
    /// Something the command depends on is missing.
    Prerequisites = 6,
}

impl ExitCode {
    /// Numeric value handed to the operating system.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether this is [`ExitCode::Success`].
    pub fn is_success(self) -> bool {
        self == ExitCode::Success
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

/// Malformed user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The typed prefix matches more than one registered command.
    #[error("Command '{command}' is not unique.")]
    NotUnique {
        /// The command text as typed (words joined by spaces).
        command: String,
    },

    /// The typed text matches no registered command.
    #[error("Command '{command}' is not supported.")]
    NotSupported {
        /// The command text as typed (words joined by spaces).
        command: String,
    },

    /// Commands are registered but none was given.
    #[error("Missing mandatory command.")]
    MissingCommand,

    /// A value-taking option was the last token.
    #[error("'{option}' expects a value")]
    MissingValue {
        /// The option spelling that was typed.
        option: String,
    },

    /// The value is outside the option's allowed set.
    #[error("Value '{value}' not allowed for '{option}'")]
    IllegalValue {
        /// The rejected value.
        value: String,
        /// The option spelling that was typed.
        option: String,
    },

    /// One or more mandatory options were not given.
    #[error("{}", messages.join("\n"))]
    MissingMandatory {
        /// One message per missing option.
        messages: Vec<String>,
    },
}

impl SyntaxError {
    /// Create a NotUnique error for the given command text.
    pub fn not_unique(command: impl Into<String>) -> Self {
        Self::NotUnique {
            command: command.into(),
        }
    }

    /// Create a NotSupported error for the given command text.
    pub fn not_supported(command: impl Into<String>) -> Self {
        Self::NotSupported {
            command: command.into(),
        }
    }

    /// Create a MissingValue error.
    pub fn missing_value(option: impl Into<String>) -> Self {
        Self::MissingValue {
            option: option.into(),
        }
    }

    /// Create an IllegalValue error.
    pub fn illegal_value(value: impl Into<String>, option: impl Into<String>) -> Self {
        Self::IllegalValue {
            value: value.into(),
            option: option.into(),
        }
    }
}

/// Misuse of the registration API by the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The same canonical command was registered twice.
    #[error("command already registered: {command}")]
    Duplicate {
        /// Canonical (normalised) command text.
        command: String,
    },

    /// No spelling, or only blank spellings, were given.
    #[error("command registration needs at least one non-empty spelling")]
    Empty,
}

/// Errors that can occur while running an application
#[derive(Error, Debug)]
pub enum CliError {
    /// Malformed command line
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Framework misuse by the embedding application
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Error executing a command
    #[error("{0}")]
    Application(String),

    /// Invalid or unreadable input
    #[error("Input error: {0}")]
    Input(String),

    /// Output could not be produced
    #[error("Output error: {0}")]
    Output(String),

    /// A child process failed
    #[error("Child process error: {0}")]
    Child(String),

    /// Prerequisites not met
    #[error("Prerequisites not met: {0}")]
    Prerequisites(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create an application error
    pub fn application<S: Into<String>>(msg: S) -> Self {
        Self::Application(msg.into())
    }

    /// Create an input error
    pub fn input<S: Into<String>>(msg: S) -> Self {
        Self::Input(msg.into())
    }

    /// Create an output error
    pub fn output<S: Into<String>>(msg: S) -> Self {
        Self::Output(msg.into())
    }

    /// Create a prerequisites error
    pub fn prerequisites<S: Into<String>>(msg: S) -> Self {
        Self::Prerequisites(msg.into())
    }

    /// Exit code reported to the process boundary for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Syntax(_) => ExitCode::Syntax,
            CliError::Registration(_) | CliError::Application(_) => ExitCode::Application,
            CliError::Input(_) => ExitCode::Input,
            CliError::Output(_) | CliError::Io(_) => ExitCode::Output,
            CliError::Child(_) => ExitCode::Child,
            CliError::Prerequisites(_) => ExitCode::Prerequisites,
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Application(format!("{:#}", err))
    }
}
