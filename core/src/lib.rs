//! Declarative command-line option sets with one level of commands.
//!
//! A program describes the options it accepts, and optionally the commands
//! it dispatches to, as an [`OptionSet`]. Parsing a token list against that
//! schema yields a [`ParseResult`] to query, or a [`ParseError`] explaining
//! what went wrong (or carrying the help text that was asked for).
//!
//! - [`OptionSpec`] — a switch (`-f`, `--force`) or value option
//!   (`-o out.txt`, `--outfile out.txt`) with summary and default.
//! - [`OptionSet`] — options, usage text, declared positional parameters,
//!   and commands.
//! - [`Command`] — a named child [`OptionSet`] with an optional
//!   [`CommandHandler`].
//! - [`parse`] / [`OptionSet::parse`] — validates the schema, then
//!   classifies every token in one pass.
//! - [`render_help`] — deterministic help text generated from the schema.
//!
//! Validation ([`validate_option_set`]) runs before every parse and rejects
//! duplicate names, malformed short names, and nested commands.
//!
//! # Example
//!
//! ```
//! use argset_core::OptionSet;
//!
//! let mut args = OptionSet::new("Usage: myprogram [options...] param1");
//! args.add_switch("f", "force", "Force a certain thing");
//! args.add_value("o", "outfile", "Write output to file");
//! args.add_value_default("t", "timeout", "Timeout in seconds", "60");
//!
//! let result = args.parse(&["myprogram", "-f", "input.txt"], 1).unwrap();
//! assert!(result.has("force"));
//! assert!(!result.has("outfile"));
//! assert_eq!(result.get_int("timeout").unwrap(), 60);
//! assert_eq!(result.params(), ["input.txt"]);
//! ```
//!
//! # Commands
//!
//! ```
//! use argset_core::OptionSet;
//!
//! let mut args = OptionSet::new("Usage: tool [options...] <command>");
//! args.add_switch("v", "verbose", "Be chatty");
//! args.add_command_with_handler("copy <src> <dst>", "Copy a file", |m| {
//!     if m.has("force") { 0 } else { 2 }
//! })
//! .add_switch("", "force", "Overwrite the destination");
//!
//! let result = args
//!     .parse(&["tool", "-v", "copy", "--force", "a.txt", "b.txt"], 1)
//!     .unwrap();
//! assert!(result.has("verbose"));
//! assert_eq!(result.which_command().unwrap().params(), ["a.txt", "b.txt"]);
//! assert_eq!(result.exec_command(), 0);
//!
//! // Wrong parameter count for `copy`.
//! assert!(args.parse(&["tool", "copy", "a.txt"], 1).is_err());
//! ```

mod definition;
mod help;
mod matches;
mod parser;
mod types;
mod validate;

pub use definition::{DefinitionError, DefinitionFormat};
pub use help::{WRAP_WIDTH, render_command_help, render_help};
pub use matches::{AccessError, CommandMatch, Matches, ParseResult};
pub use parser::{HELP_COMMAND, HELP_SPELLINGS, ParseError, parse};
pub use types::*;
pub use validate::{ValidationError, validate_option_set};
