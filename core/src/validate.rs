//! Option set sanity validation.
//!
//! Runs before every parse so a malformed schema is rejected before any
//! token is trusted to it. Catches short names that are not exactly one
//! character, duplicate names, commands nested inside commands, and
//! commands mixed with declared positional parameters.
//!
//! # Examples
//!
//! ```
//! use argset_core::*;
//!
//! let mut set = OptionSet::new("Usage: tool");
//! set.add_switch("v", "verbose", "Be chatty");
//! assert!(validate_option_set(&set).is_empty());
//!
//! // Invalid: short name longer than one character
//! let mut bad = OptionSet::new("Usage: tool");
//! bad.add_switch("vv", "verbose", "Be chatty");
//! assert!(!validate_option_set(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Command, OptionSet, OptionSpec};

/// Schema validation errors.
///
/// Each variant describes a configuration problem the owning program must
/// fix. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An option has an empty long name.
    #[error("Options must have a long name")]
    EmptyLongName,
    /// Short name is present but not exactly one character.
    #[error("Short options must be one character exactly (not {0})")]
    InvalidShortName(String),
    /// Two options in the same set share a name.
    #[error("Option {0} appears twice")]
    DuplicateName(String),
    /// A command declares commands of its own.
    #[error("Command {0} may not contain commands")]
    NestedCommands(String),
    /// A set declares both commands and positional parameters.
    #[error("Commands and positional parameters are mutually exclusive")]
    CommandsWithParams,
    /// A command has an empty name.
    #[error("Commands must have a name")]
    EmptyCommandName,
    /// A command name contains whitespace.
    #[error("Command name '{0}' may not contain whitespace")]
    InvalidCommandName(String),
    /// Two commands in the same set share a name.
    #[error("Command {0} appears twice")]
    DuplicateCommand(String),
}

/// Validates an option set and its commands.
///
/// Returns at most the first violation found; an empty list means the set
/// can be parsed against.
///
/// # Examples
///
/// ```
/// use argset_core::*;
///
/// let mut set = OptionSet::new("Usage: tool <command>");
/// set.add_command("outer", "Outer")
///     .schema
///     .add_command("inner", "Inner");
///
/// let errors = validate_option_set(&set);
/// assert_eq!(errors, vec![ValidationError::NestedCommands("outer".to_string())]);
/// ```
pub fn validate_option_set(set: &OptionSet) -> Vec<ValidationError> {
    let mut errors = validate_options(&set.options);
    if !errors.is_empty() {
        return errors;
    }

    if set.has_commands() && set.param_count().unwrap_or(0) > 0 {
        errors.push(ValidationError::CommandsWithParams);
        return errors;
    }

    errors.extend(validate_commands(&set.commands));
    errors
}

fn validate_commands(commands: &[Command]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for cmd in commands {
        let name = cmd.name.as_str();
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyCommandName);
            return errors;
        }

        // Selection compares the raw token, so padded names could never match.
        if name.contains(char::is_whitespace) {
            errors.push(ValidationError::InvalidCommandName(name.to_string()));
            return errors;
        }

        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateCommand(name.to_string()));
            return errors;
        }

        if cmd.schema.has_commands() {
            errors.push(ValidationError::NestedCommands(name.to_string()));
            return errors;
        }

        errors.extend(validate_options(&cmd.schema.options));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

/// Short and long names share one namespace.
fn validate_options(options: &[OptionSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for opt in options {
        if opt.long.is_empty() {
            errors.push(ValidationError::EmptyLongName);
            return errors;
        }

        let short = opt.short_name();
        if let Some(short) = short {
            if short.chars().count() != 1 {
                errors.push(ValidationError::InvalidShortName(short.to_string()));
                return errors;
            }
        }

        // Both names are checked against earlier options before either is
        // recorded, so an option may reuse its own long name as its short one.
        let clash = short
            .into_iter()
            .chain(std::iter::once(opt.long.as_str()))
            .find(|name| seen.contains(name));
        if let Some(name) = clash {
            errors.push(ValidationError::DuplicateName(name.to_string()));
            return errors;
        }
        seen.extend(short);
        seen.insert(opt.long.as_str());
    }

    errors
}
