//! Help text rendering.
//!
//! The formatter only reads the command table and option groups; it never
//! touches parse state. Columns are measured in display width so that
//! option descriptions stay aligned with non-ASCII text.

use unicode_width::UnicodeWidthStr;

use crate::config::AppMetadata;
use crate::options::{OptionDefinition, OptionGroup};

/// Default right margin.
pub const DEFAULT_WIDTH: usize = 80;

const INDENT: usize = 2;
const GAP: usize = 2;

/// Renders main and per-command help.
#[derive(Debug, Clone)]
pub struct HelpFormatter<'a> {
    metadata: &'a AppMetadata,
    width: usize,
}

/// What command help shows about the command itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandHelp<'a> {
    /// Canonical command text; `None` for a command-less application.
    pub name: Option<&'a str>,
    /// Paragraph shown above the usage line.
    pub description: Option<&'a str>,
    /// Trailing usage text.
    pub usage: Option<&'a str>,
}

struct Row {
    left: String,
    right: String,
}

enum Block {
    Title(String),
    Text(String),
    Rows(Vec<Row>),
    Blank,
}

impl<'a> HelpFormatter<'a> {
    /// A formatter wrapping at [`DEFAULT_WIDTH`].
    pub fn new(metadata: &'a AppMetadata) -> Self {
        Self {
            metadata,
            width: DEFAULT_WIDTH,
        }
    }

    /// Change the right margin.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    /// Help for the application as a whole.
    pub fn main_help<C>(&self, commands: &[&str], common: &[&OptionGroup<C>]) -> String {
        let app = &self.metadata.name;
        let mut blocks = Vec::new();

        if let Some(description) = &self.metadata.description {
            blocks.push(Block::Text(description.clone()));
            blocks.push(Block::Blank);
        }

        if commands.is_empty() {
            blocks.push(Block::Text(format!(
                "Usage: {} [<options> ...] [<args>...]",
                app
            )));
        } else {
            blocks.push(Block::Text(format!(
                "Usage: {} <command> [<subcommand>...] [<options> ...] [<args>...]",
                app
            )));
            blocks.push(Block::Blank);
            blocks.push(Block::Title("where <command> is one of:".to_string()));
            blocks.push(Block::Text(self.wrap_list(commands)));
        }

        self.push_groups(&mut blocks, common);
        blocks.push(Block::Blank);

        let mut standard = vec![Row {
            left: format!("{} -h|--help", app),
            right: "Quick help".to_string(),
        }];
        if !commands.is_empty() {
            standard.push(Row {
                left: format!("{} <command> -h|--help", app),
                right: "Quick help on command".to_string(),
            });
        }
        standard.push(Row {
            left: format!("{} --version", app),
            right: "Show version".to_string(),
        });
        // Standard lines are flush with the margin.
        blocks.push(Block::Rows(standard));

        self.push_links(&mut blocks);
        self.render(blocks)
    }

    /// Help for one command.
    ///
    /// `command_groups` are listed before `common`.
    pub fn command_help<C>(
        &self,
        command: CommandHelp<'_>,
        command_groups: &[&OptionGroup<C>],
        common: &[&OptionGroup<C>],
    ) -> String {
        let mut blocks = Vec::new();

        if let Some(description) = command.description {
            blocks.push(Block::Text(description.to_string()));
            blocks.push(Block::Blank);
        }
        blocks.push(Block::Text(self.usage_line(&command, command_groups)));

        self.push_groups(&mut blocks, command_groups);
        self.push_groups(&mut blocks, common);

        blocks.push(Block::Blank);
        let name = match command.name {
            Some(name) => format!("{} {}", self.metadata.name, name),
            None => self.metadata.name.clone(),
        };
        blocks.push(Block::Rows(vec![Row {
            left: format!("{} -h|--help", name),
            right: "Quick help".to_string(),
        }]));

        self.push_links(&mut blocks);
        self.render(blocks)
    }

    fn usage_line<C>(&self, command: &CommandHelp<'_>, groups: &[&OptionGroup<C>]) -> String {
        let mut head = format!("Usage: {}", self.metadata.name);
        if let Some(name) = command.name {
            head.push(' ');
            head.push_str(name);
        }

        let mut tokens = vec!["[options...]".to_string()];
        for definition in groups
            .iter()
            .flat_map(|g| g.definitions())
            .filter(|d| !d.is_help())
        {
            let mut token = left_column(definition);
            if !definition.is_mandatory() {
                token = format!("[{}]", token);
            }
            if definition.is_multiple() {
                token.push_str("...");
            }
            tokens.push(token);
        }
        if let Some(usage) = command.usage {
            tokens.push(usage.to_string());
        }

        let indent = head.width() + 1;
        let mut line = head;
        let mut out = String::new();
        for token in tokens {
            if line.width() + 1 + token.width() > self.width && line.width() > indent {
                out.push_str(&line);
                out.push('\n');
                line = " ".repeat(indent - 1);
            }
            line.push(' ');
            line.push_str(&token);
        }
        out.push_str(&line);
        out
    }

    fn push_groups<C>(&self, blocks: &mut Vec<Block>, groups: &[&OptionGroup<C>]) {
        for group in groups {
            let rows: Vec<Row> = group
                .definitions()
                .iter()
                .filter(|d| !d.is_help())
                .map(|d| Row {
                    left: format!("{}{}", " ".repeat(INDENT), left_column(d)),
                    right: right_column(d),
                })
                .collect();
            if rows.is_empty() {
                continue;
            }
            blocks.push(Block::Blank);
            blocks.push(Block::Title(format!("{}:", group.title())));
            if let Some(description) = group.description() {
                blocks.push(Block::Text(format!("{}{}", " ".repeat(INDENT), description)));
            }
            blocks.push(Block::Rows(rows));
        }
    }

    fn push_links(&self, blocks: &mut Vec<Block>) {
        if self.metadata.homepage.is_none() && self.metadata.bugs.is_none() {
            return;
        }
        blocks.push(Block::Blank);
        if let Some(homepage) = &self.metadata.homepage {
            blocks.push(Block::Text(format!("Home page: <{}>", homepage)));
        }
        if let Some(bugs) = &self.metadata.bugs {
            blocks.push(Block::Text(format!("Bug reports: <{}>", bugs)));
        }
    }

    /// Comma separated, wrapped at the margin, indented.
    fn wrap_list(&self, items: &[&str]) -> String {
        let indent = " ".repeat(INDENT);
        let mut out = String::new();
        let mut line = indent.clone();
        for (i, item) in items.iter().enumerate() {
            let piece = if i + 1 < items.len() {
                format!("{},", item)
            } else {
                item.to_string()
            };
            if line.width() > INDENT && line.width() + 1 + piece.width() > self.width {
                out.push_str(line.trim_end());
                out.push('\n');
                line = indent.clone();
            }
            if line.width() > INDENT {
                line.push(' ');
            }
            line.push_str(&piece);
        }
        out.push_str(&line);
        out
    }

    /// Column where descriptions start: just past the widest left column,
    /// but never beyond the middle of the page.
    fn middle_column(&self, blocks: &[Block]) -> usize {
        let widest = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Rows(rows) => rows.iter().map(|r| r.left.width()).max(),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        (widest + GAP).min(self.width / 2)
    }

    fn render(&self, blocks: Vec<Block>) -> String {
        let column = self.middle_column(&blocks);
        let mut lines: Vec<String> = Vec::new();
        for block in blocks {
            match block {
                Block::Title(text) | Block::Text(text) => lines.push(text),
                Block::Blank => lines.push(String::new()),
                Block::Rows(rows) => {
                    for row in rows {
                        let width = row.left.width();
                        if width + GAP <= column {
                            lines.push(format!(
                                "{}{}{}",
                                row.left,
                                " ".repeat(column - width),
                                row.right
                            ));
                        } else {
                            lines.push(row.left);
                            lines.push(format!("{}{}", " ".repeat(column), row.right));
                        }
                    }
                }
            }
        }
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

fn left_column<C>(definition: &OptionDefinition<C>) -> String {
    match definition.shape().param() {
        Some(param) => format!("{} <{}>", definition.joined(), param),
        None => definition.joined(),
    }
}

fn right_column<C>(definition: &OptionDefinition<C>) -> String {
    let mut text = definition.message().to_string();
    if let Some(allowed) = definition.shape().allowed() {
        text.push_str(&format!(" ({})", allowed.join("|")));
    }
    if definition.is_multiple() {
        text.push_str(" (multiple)");
    }
    text
}
