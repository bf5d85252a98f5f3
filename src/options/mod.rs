//! Declarative option definitions and the parsing engine.
//!
//! An application describes its options as [`OptionDefinition`]s collected
//! in titled [`OptionGroup`]s, usually inside an [`OptionTable`]. Parsing
//! walks an argument vector once, calling each matched definition's setter
//! on a caller-owned configuration target, and returns what it did not
//! consume.
//!
//! # Example
//!
//! ```
//! use cbk::options::{OptionDefinition, OptionGroup, OptionTable};
//!
//! #[derive(Default)]
//! struct Config {
//!     verbose: bool,
//! }
//!
//! let mut table = OptionTable::new();
//! table.register_group(
//!     OptionGroup::new("Common options").option(
//!         OptionDefinition::flag(&["-v", "--verbose"], "Verbose output")
//!             .init(|c: &mut Config| c.verbose = false)
//!             .action(|c, _| c.verbose = true),
//!     ),
//! );
//!
//! let mut config = Config::default();
//! let outcome = table.parse(&["-v", "build"], &mut config).unwrap();
//! assert!(config.verbose);
//! assert_eq!(outcome.remaining, vec!["build"]);
//! ```

pub mod definition;
pub mod group;
pub mod parser;

pub use definition::{Initializer, OptionDefinition, OptionShape, Setter};
pub use group::{OptionGroup, OptionTable};
pub use parser::{check_mandatory, parse_definitions, parse_options, ParseOutcome, SEPARATOR};
