//! Declarative description of a single command-line option.

use std::cell::Cell;
use std::fmt;

/// Callback restoring an option's default on the configuration target.
pub type Initializer<C> = Box<dyn Fn(&mut C)>;

/// Callback applying a matched option, with its value when it takes one.
pub type Setter<C> = Box<dyn Fn(&mut C, Option<&str>)>;

/// What an option consumes from the argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionShape {
    /// A boolean switch; nothing is consumed.
    Flag,
    /// Consumes the next argument as a free-form value.
    Value {
        /// Value name used in help, e.g. `file` for `--file <file>`.
        param: String,
    },
    /// Consumes the next argument, which must be one of `allowed`.
    Enum {
        /// Value name used in help.
        param: String,
        /// The closed set of accepted values.
        allowed: Vec<String>,
    },
}

impl OptionShape {
    /// Whether the next argument is consumed as a value.
    pub fn takes_value(&self) -> bool {
        !matches!(self, OptionShape::Flag)
    }

    /// Value name, for value-taking shapes.
    pub fn param(&self) -> Option<&str> {
        match self {
            OptionShape::Flag => None,
            OptionShape::Value { param } | OptionShape::Enum { param, .. } => Some(param),
        }
    }

    /// Allowed values, for enumerated shapes.
    pub fn allowed(&self) -> Option<&[String]> {
        match self {
            OptionShape::Enum { allowed, .. } => Some(allowed),
            _ => None,
        }
    }
}

/// One option: its spellings, value shape, callbacks and parse-time state.
///
/// # Example
///
/// ```
/// use cbk::options::OptionDefinition;
///
/// #[derive(Default)]
/// struct Config {
///     output: Option<String>,
/// }
///
/// let def = OptionDefinition::<Config>::value(&["-o", "--output"], "file", "Output file")
///     .init(|c| c.output = None)
///     .action(|c, v| c.output = v.map(str::to_string))
///     .mandatory();
///
/// assert!(def.matches("--output"));
/// assert_eq!(def.joined(), "-o|--output");
/// ```
pub struct OptionDefinition<C> {
    option_strings: Vec<String>,
    shape: OptionShape,
    message: String,
    is_early: bool,
    is_mandatory: bool,
    is_help: bool,
    is_multiple: bool,
    initializer: Option<Initializer<C>>,
    setter: Option<Setter<C>>,
    was_matched: Cell<bool>,
}

impl<C> OptionDefinition<C> {
    fn with_shape<S: AsRef<str>>(option_strings: &[S], shape: OptionShape, message: &str) -> Self {
        assert!(
            !option_strings.is_empty(),
            "an option definition needs at least one spelling"
        );
        Self {
            option_strings: option_strings
                .iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
            shape,
            message: message.to_string(),
            is_early: false,
            is_mandatory: false,
            is_help: false,
            is_multiple: false,
            initializer: None,
            setter: None,
            was_matched: Cell::new(false),
        }
    }

    /// A boolean switch.
    ///
    /// # Panics
    ///
    /// Panics if `option_strings` is empty.
    pub fn flag<S: AsRef<str>>(option_strings: &[S], message: &str) -> Self {
        Self::with_shape(option_strings, OptionShape::Flag, message)
    }

    /// An option taking a free-form value named `param`.
    ///
    /// # Panics
    ///
    /// Panics if `option_strings` is empty.
    pub fn value<S: AsRef<str>>(option_strings: &[S], param: &str, message: &str) -> Self {
        Self::with_shape(
            option_strings,
            OptionShape::Value {
                param: param.to_string(),
            },
            message,
        )
    }

    /// An option whose value must be one of `allowed`.
    ///
    /// # Panics
    ///
    /// Panics if `option_strings` is empty.
    pub fn choice<S: AsRef<str>, V: AsRef<str>>(
        option_strings: &[S],
        param: &str,
        allowed: &[V],
        message: &str,
    ) -> Self {
        Self::with_shape(
            option_strings,
            OptionShape::Enum {
                param: param.to_string(),
                allowed: allowed.iter().map(|v| v.as_ref().to_string()).collect(),
            },
            message,
        )
    }

    /// Set the initializer, run at the start of every parse.
    pub fn init(mut self, initializer: impl Fn(&mut C) + 'static) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    /// Set the setter, run each time the option is matched.
    pub fn action(mut self, setter: impl Fn(&mut C, Option<&str>) + 'static) -> Self {
        self.setter = Some(Box::new(setter));
        self
    }

    /// Mark as early: applied by the caller's first, restricted pass.
    pub fn early(mut self) -> Self {
        self.is_early = true;
        self
    }

    /// Mark as mandatory.
    pub fn mandatory(mut self) -> Self {
        self.is_mandatory = true;
        self
    }

    /// Mark as the help-request option.
    pub fn help_option(mut self) -> Self {
        self.is_help = true;
        self
    }

    /// Mark as repeatable (affects help rendering only).
    pub fn multiple(mut self) -> Self {
        self.is_multiple = true;
        self
    }

    /// Equivalent spellings, e.g. `["-v", "--verbose"]`.
    pub fn option_strings(&self) -> &[String] {
        &self.option_strings
    }

    /// Spellings joined by `|`, as used in help and messages.
    pub fn joined(&self) -> String {
        self.option_strings.join("|")
    }

    /// Value shape.
    pub fn shape(&self) -> &OptionShape {
        &self.shape
    }

    /// Help text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the option belongs to the early pass.
    pub fn is_early(&self) -> bool {
        self.is_early
    }

    /// Whether the option must be given.
    pub fn is_mandatory(&self) -> bool {
        self.is_mandatory
    }

    /// Whether the option requests help.
    pub fn is_help(&self) -> bool {
        self.is_help
    }

    /// Whether the option may be repeated.
    pub fn is_multiple(&self) -> bool {
        self.is_multiple
    }

    /// Whether the option was matched by the latest parse.
    pub fn was_matched(&self) -> bool {
        self.was_matched.get()
    }

    /// Exact, case-sensitive comparison against every spelling.
    pub fn matches(&self, arg: &str) -> bool {
        self.option_strings.iter().any(|s| s == arg)
    }

    /// Run the initializer and forget any previous match.
    pub(crate) fn reset(&self, config: &mut C) {
        if let Some(initializer) = &self.initializer {
            initializer(config);
        }
        self.was_matched.set(false);
    }

    pub(crate) fn apply(&self, config: &mut C, value: Option<&str>) {
        if let Some(setter) = &self.setter {
            setter(config, value);
        }
        self.was_matched.set(true);
    }
}

impl<C> fmt::Debug for OptionDefinition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDefinition")
            .field("option_strings", &self.option_strings)
            .field("shape", &self.shape)
            .field("is_early", &self.is_early)
            .field("is_mandatory", &self.is_mandatory)
            .field("is_help", &self.is_help)
            .field("is_multiple", &self.is_multiple)
            .field("was_matched", &self.was_matched.get())
            .finish_non_exhaustive()
    }
}
