//! Command registration and resolution.
//!
//! Commands are stored in a [`CommandTrie`], which resolves abbreviated or
//! aliased command words to a single registration and reports ambiguous
//! or unknown input as a [`SyntaxError`](crate::error::SyntaxError).

pub mod trie;

pub use trie::{CommandEntry, CommandTrie, Resolution};
