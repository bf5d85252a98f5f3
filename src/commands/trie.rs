//! Character trie mapping abbreviated and aliased command words to their
//! registrations.
//!
//! Every spelling is stored as a path of lower-case characters followed by a
//! single space. Each node remembers whether the spellings passing through it
//! belong to one command or to several; a node crossed only by the spellings
//! of one command identifies it, so walking the typed text stops at the first
//! such node (shortest unique prefix wins).

use std::collections::BTreeMap;
use std::iter;

use tracing::{debug, trace};

use crate::error::{RegistrationError, SyntaxError};

/// Terminates every stored spelling and separates words inside one.
const TERMINATOR: char = ' ';

/// Index of the root sentinel in the node arena.
const ROOT: usize = 0;

#[derive(Debug, Clone)]
struct TrieNode {
    /// `None` only for the root sentinel.
    character: Option<char>,
    children: BTreeMap<char, usize>,
    /// Entry reached through this node, cleared once another entry passes.
    entry: Option<usize>,
    /// Entry whose spelling ends exactly here (terminator nodes only).
    terminal: Option<usize>,
}

impl TrieNode {
    fn root() -> Self {
        Self {
            character: None,
            children: BTreeMap::new(),
            entry: None,
            terminal: None,
        }
    }

    fn new(character: char, entry: usize) -> Self {
        Self {
            character: Some(character),
            children: BTreeMap::new(),
            entry: Some(entry),
            terminal: None,
        }
    }

    fn is_separator(&self) -> bool {
        self.character == Some(TERMINATOR)
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A registered command: its canonical spelling, aliases and payload.
#[derive(Debug)]
pub struct CommandEntry<T> {
    canonical: String,
    aliases: Vec<String>,
    payload: T,
}

impl<T> CommandEntry<T> {
    /// The first-listed spelling, normalised.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Additional spellings, normalised, in registration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// What the command was registered with.
    pub fn payload(&self) -> &T {
        &self.payload
    }
}

/// Outcome of a successful [`CommandTrie::resolve`].
#[derive(Debug)]
pub struct Resolution<'a, T> {
    /// Payload of the resolved command.
    pub payload: &'a T,
    /// Canonical spelling, whatever abbreviation or alias was typed.
    pub matched_command: String,
    /// Typed words following the command, in order.
    pub unconsumed_words: Vec<String>,
}

/// Prefix tree of registered commands.
///
/// Built once at start-up, read-only afterwards.
///
/// # Example
///
/// ```
/// use cbk::commands::CommandTrie;
///
/// let mut trie = CommandTrie::new();
/// trie.register(&["copy", "c"], "copy.mod").unwrap();
/// trie.register(&["conf"], "conf.mod").unwrap();
///
/// let found = trie.resolve(&["c"]).unwrap();
/// assert_eq!(*found.payload, "copy.mod");
/// assert_eq!(found.matched_command, "copy");
///
/// assert!(trie.resolve(&["co"]).is_err());
/// ```
#[derive(Debug)]
pub struct CommandTrie<T> {
    nodes: Vec<TrieNode>,
    entries: Vec<CommandEntry<T>>,
}

impl<T> Default for CommandTrie<T> {
    fn default() -> Self {
        Self {
            nodes: vec![TrieNode::root()],
            entries: Vec::new(),
        }
    }
}

/// Lower-case, trim, and collapse inner whitespace to single spaces.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Typed text up to the end of the word containing `pos`.
fn typed_through(input: &[char], pos: usize) -> String {
    let pos = pos.min(input.len());
    let end = input[pos..]
        .iter()
        .position(|&c| c == TERMINATOR)
        .map_or(input.len(), |offset| pos + offset);
    input[..end].iter().collect::<String>().trim().to_string()
}

impl<T> CommandTrie<T> {
    /// Create an empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under one or more spellings.
    ///
    /// The first spelling is the canonical one. Spellings are lower-cased
    /// and trimmed. Registering a spelling that is already taken, by this or
    /// any other command, is rejected.
    pub fn register<S: AsRef<str>>(
        &mut self,
        spellings: &[S],
        payload: T,
    ) -> Result<(), RegistrationError> {
        let mut normalized: Vec<String> = Vec::with_capacity(spellings.len());
        for spelling in spellings {
            let spelling = normalize(spelling.as_ref());
            if spelling.is_empty() {
                return Err(RegistrationError::Empty);
            }
            if !normalized.contains(&spelling) {
                normalized.push(spelling);
            }
        }
        if normalized.is_empty() {
            return Err(RegistrationError::Empty);
        }

        for spelling in &normalized {
            if self.is_registered(spelling) {
                return Err(RegistrationError::Duplicate {
                    command: spelling.clone(),
                });
            }
        }

        let id = self.entries.len();
        for spelling in &normalized {
            self.insert_path(spelling, id);
        }

        let canonical = normalized.remove(0);
        debug!(command = %canonical, aliases = ?normalized, "registered command");
        self.entries.push(CommandEntry {
            canonical,
            aliases: normalized,
            payload,
        });
        Ok(())
    }

    fn is_registered(&self, spelling: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.canonical == spelling || e.aliases.iter().any(|a| a == spelling))
    }

    fn insert_path(&mut self, spelling: &str, id: usize) {
        let mut current = ROOT;
        for ch in spelling.chars().chain(iter::once(TERMINATOR)) {
            let next = match self.nodes[current].children.get(&ch) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::new(ch, id));
                    self.nodes[current].children.insert(ch, next);
                    next
                }
            };
            let node = &mut self.nodes[next];
            if node.entry != Some(id) {
                node.entry = None;
            }
            current = next;
        }
        self.nodes[current].terminal = Some(id);
    }

    fn child(&self, node: usize, ch: char) -> Option<usize> {
        self.nodes[node].children.get(&ch).copied()
    }

    /// Find the end of the current word below `node`.
    ///
    /// Everything below a unique node belongs to one command, but its aliases
    /// may branch. A separator that continues with further words is preferred.
    fn skip_word(&self, node: usize) -> Option<usize> {
        let mut word_end = None;
        let mut pending = vec![node];
        while let Some(node) = pending.pop() {
            for &next in self.nodes[node].children.values() {
                if !self.nodes[next].is_separator() {
                    pending.push(next);
                } else if !self.nodes[next].is_leaf() {
                    return Some(next);
                } else {
                    word_end.get_or_insert(next);
                }
            }
        }
        word_end
    }

    /// Resolve typed command words to a registered command.
    ///
    /// Fails with [`SyntaxError::NotUnique`] when the typed prefix is shared
    /// by several commands and [`SyntaxError::NotSupported`] when it matches
    /// none. Characters typed after the unique point must continue the
    /// registered spelling; `conff` does not resolve to `conf`.
    pub fn resolve<S: AsRef<str>>(&self, words: &[S]) -> Result<Resolution<'_, T>, SyntaxError> {
        let typed = normalize(
            &words
                .iter()
                .map(|w| w.as_ref())
                .collect::<Vec<_>>()
                .join(" "),
        );
        if typed.is_empty() {
            return Err(SyntaxError::MissingCommand);
        }
        let input: Vec<char> = typed.chars().chain(iter::once(TERMINATOR)).collect();
        trace!(typed = %typed, "resolving command");

        let mut current = ROOT;
        let mut pos = 0;

        let id = loop {
            let Some(&ch) = input.get(pos) else {
                // The whole text is a prefix shared by several commands,
                // unless one of them is spelled exactly like this.
                break self.nodes[current]
                    .terminal
                    .ok_or_else(|| SyntaxError::not_unique(typed.clone()))?;
            };
            match self.child(current, ch) {
                Some(next) => {
                    current = next;
                    pos += 1;
                    if let Some(id) = self.nodes[current].entry {
                        break id;
                    }
                }
                None => {
                    if let Some(id) = self.nodes[current].terminal {
                        break id;
                    }
                    return Err(if ch == TERMINATOR {
                        SyntaxError::not_unique(typed_through(&input, pos))
                    } else {
                        SyntaxError::not_supported(typed_through(&input, pos))
                    });
                }
            }
        };

        // Below the unique point only spellings of the resolved command remain;
        // the rest of the typed text may abbreviate one but must not leave it.
        while let Some(&ch) = input.get(pos) {
            match self.child(current, ch) {
                Some(next) => {
                    current = next;
                    pos += 1;
                    if self.nodes[current].is_separator() && self.nodes[current].is_leaf() {
                        break;
                    }
                }
                None if ch == TERMINATOR => {
                    pos += 1;
                    match self.skip_word(current) {
                        Some(separator) if !self.nodes[separator].is_leaf() => current = separator,
                        _ => break,
                    }
                }
                None if input[pos - 1] == TERMINATOR => break,
                None => return Err(SyntaxError::not_supported(typed_through(&input, pos))),
            }
        }

        let entry = &self.entries[id];
        let unconsumed_words: Vec<String> = input[pos..]
            .iter()
            .collect::<String>()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        debug!(
            command = %entry.canonical,
            unconsumed = ?unconsumed_words,
            "resolved command"
        );

        Ok(Resolution {
            payload: &entry.payload,
            matched_command: entry.canonical.clone(),
            unconsumed_words,
        })
    }

    /// Canonical spellings of all registered commands, sorted.
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.iter().map(|e| e.canonical.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Registered entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry<T>> {
        self.entries.iter()
    }

    /// Look up an entry by its exact canonical spelling or alias.
    pub fn get(&self, spelling: &str) -> Option<&CommandEntry<T>> {
        let spelling = normalize(spelling);
        self.entries
            .iter()
            .find(|e| e.canonical == spelling || e.aliases.contains(&spelling))
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
