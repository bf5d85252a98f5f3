//! Option groups and the ordered table that holds them.

use crate::error::SyntaxError;

use super::definition::OptionDefinition;
use super::parser::{check_mandatory, parse_definitions, parse_options, ParseOutcome};

/// A titled, ordered list of option definitions.
#[derive(Debug)]
pub struct OptionGroup<C> {
    title: String,
    description: Option<String>,
    definitions: Vec<OptionDefinition<C>>,
}

impl<C> OptionGroup<C> {
    /// Create an empty group.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            definitions: Vec::new(),
        }
    }

    /// Attach a description shown under the title in help.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a definition (builder style).
    pub fn option(mut self, definition: OptionDefinition<C>) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Append a definition.
    pub fn push(&mut self, definition: OptionDefinition<C>) {
        self.definitions.push(definition);
    }

    /// Group title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Group description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> &[OptionDefinition<C>] {
        &self.definitions
    }

    /// Whether the group has no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<C> Extend<OptionDefinition<C>> for OptionGroup<C> {
    fn extend<I: IntoIterator<Item = OptionDefinition<C>>>(&mut self, iter: I) {
        self.definitions.extend(iter);
    }
}

/// Ordered collection of option groups.
///
/// Groups are identified by title: registering a group whose title already
/// exists appends its definitions to the existing group.
#[derive(Debug)]
pub struct OptionTable<C> {
    groups: Vec<OptionGroup<C>>,
}

impl<C> Default for OptionTable<C> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<C> OptionTable<C> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group, merging it into an existing group with the same title.
    pub fn register_group(&mut self, group: OptionGroup<C>) {
        match self.groups.iter_mut().find(|g| g.title == group.title) {
            Some(existing) => {
                if existing.description.is_none() {
                    existing.description = group.description;
                }
                existing.definitions.extend(group.definitions);
            }
            None => self.groups.push(group),
        }
    }

    /// Append definitions to the group titled `title`, creating it if needed.
    pub fn append_to_group(
        &mut self,
        title: &str,
        definitions: impl IntoIterator<Item = OptionDefinition<C>>,
    ) {
        let mut group = OptionGroup::new(title);
        group.extend(definitions);
        self.register_group(group);
    }

    /// All groups in registration order.
    pub fn groups(&self) -> &[OptionGroup<C>] {
        &self.groups
    }

    /// The group titled `title`.
    pub fn group(&self, title: &str) -> Option<&OptionGroup<C>> {
        self.groups.iter().find(|g| g.title == title)
    }

    /// References to all groups, for composing a parse scope.
    pub fn scope(&self) -> Vec<&OptionGroup<C>> {
        self.groups.iter().collect()
    }

    /// Parse `argv` against every group of the table.
    pub fn parse<S: AsRef<str>>(
        &self,
        argv: &[S],
        config: &mut C,
    ) -> Result<ParseOutcome, SyntaxError> {
        parse_options(argv, config, &self.scope())
    }

    /// Parse `argv` against the early definitions only.
    ///
    /// Meant to run before [`OptionTable::parse`] so that options like the
    /// log level take effect before anything else happens.
    pub fn parse_early<S: AsRef<str>>(
        &self,
        argv: &[S],
        config: &mut C,
    ) -> Result<ParseOutcome, SyntaxError> {
        let early: Vec<&OptionDefinition<C>> = self
            .groups
            .iter()
            .flat_map(|g| g.definitions.iter())
            .filter(|d| d.is_early())
            .collect();
        parse_definitions(argv, config, &early)
    }

    /// Messages for every mandatory definition of the table not matched.
    pub fn check_mandatory(&self) -> Option<Vec<String>> {
        check_mandatory(&self.scope())
    }
}
