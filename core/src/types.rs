//! Declaration types for option sets.
//!
//! This module defines the schema a program assembles before parsing:
//! individual options (switches and value options), the option set that
//! owns them, and the commands an option set may dispatch to. The types are
//! designed for serialization with [`serde`] so a definition can also be
//! loaded from JSON or YAML (see [`OptionSet::load`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matches::Matches;

/// A declared option.
///
/// An option has an optional one-character short form (`-f`) and a required
/// long form (`--force`). Switches are pure on/off flags; value options
/// consume the following token as their value.
///
/// # Examples
///
/// ```
/// use argset_core::OptionSpec;
///
/// let force = OptionSpec::switch("f", "force", "Force a thing");
/// assert!(!force.expects_value);
/// assert!(force.matches_token("-f"));
/// assert!(force.matches_token("--force"));
///
/// let count = OptionSpec::value("c", "count", "Max count", "7");
/// assert!(count.expects_value);
/// assert_eq!(count.default, "7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Short form without the leading dash (e.g. "f"). Empty means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    /// Long form without the leading dashes (e.g. "force").
    pub long: String,
    /// Whether the option consumes the following token as its value.
    #[serde(default)]
    pub expects_value: bool,
    /// Help text.
    #[serde(default)]
    pub summary: String,
    /// Value reported for a value option that was not passed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
}

impl OptionSpec {
    /// Creates a switch (no value).
    pub fn switch(short: &str, long: &str, summary: &str) -> Self {
        Self {
            short: non_empty(short),
            long: long.to_string(),
            expects_value: false,
            summary: summary.to_string(),
            default: String::new(),
        }
    }

    /// Creates a value option with a default (use `""` for none).
    pub fn value(short: &str, long: &str, summary: &str, default: &str) -> Self {
        Self {
            short: non_empty(short),
            long: long.to_string(),
            expects_value: true,
            summary: summary.to_string(),
            default: default.to_string(),
        }
    }

    /// Returns the short form, treating an empty string as absent.
    pub fn short_name(&self) -> Option<&str> {
        self.short.as_deref().filter(|s| !s.is_empty())
    }

    /// Checks whether a command-line token selects this option.
    ///
    /// `-X` matches when `X` equals the short name in full, and `--name`
    /// matches when `name` equals the long name.
    pub fn matches_token(&self, token: &str) -> bool {
        if let Some(short) = self.short_name() {
            if token.strip_prefix('-') == Some(short) {
                return true;
            }
        }
        token.strip_prefix("--") == Some(self.long.as_str())
    }

    /// Checks whether `name` is this option's short or long name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.short_name() == Some(name) || self.long == name
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// A named schema of options, optionally with one level of commands.
///
/// The first line of [`usage`](OptionSet::usage) is the short usage banner;
/// any remaining lines are detail text shown in the generated help.
///
/// # Examples
///
/// ```
/// use argset_core::OptionSet;
///
/// let mut args = OptionSet::new("Usage: tool [options...] <command>");
/// args.add_switch("v", "verbose", "Be chatty");
/// args.add_command("copy <src> <dst>", "Copy a file")
///     .add_switch("", "force", "Overwrite the destination");
///
/// let copy = args.find_command("copy").unwrap();
/// assert_eq!(copy.schema.param_count(), Some(2));
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct OptionSet {
    /// Usage banner plus optional multi-line detail.
    #[serde(default)]
    pub usage: String,
    /// Declared options, in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    /// Commands selectable by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
    /// Positional parameter display text (e.g. `"<src> <dst>"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    /// Whether the positional count is checked against `params`.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub check_params: bool,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self::new("")
    }
}

impl OptionSet {
    /// Creates an empty option set with the given usage text.
    pub fn new(usage: &str) -> Self {
        Self {
            usage: usage.to_string(),
            options: Vec::new(),
            commands: Vec::new(),
            params: None,
            check_params: true,
        }
    }

    /// Adds a switch. Nothing is validated until the next parse.
    pub fn add_switch(&mut self, short: &str, long: &str, summary: &str) -> &mut Self {
        self.options.push(OptionSpec::switch(short, long, summary));
        self
    }

    /// Adds a value option without a default.
    pub fn add_value(&mut self, short: &str, long: &str, summary: &str) -> &mut Self {
        self.add_value_default(short, long, summary, "")
    }

    /// Adds a value option reporting `default` when it is not passed.
    pub fn add_value_default(
        &mut self,
        short: &str,
        long: &str,
        summary: &str,
        default: &str,
    ) -> &mut Self {
        self.options
            .push(OptionSpec::value(short, long, summary, default));
        self
    }

    /// Adds a command and returns it for further configuration.
    ///
    /// `spec` reads `"name <param1> <param2>"`: the first word is the token
    /// that selects the command, the rest is its parameter text.
    pub fn add_command(&mut self, spec: &str, description: &str) -> &mut Command {
        self.commands.push(Command::new(spec, description));
        let last = self.commands.len() - 1;
        &mut self.commands[last]
    }

    /// Adds a command with a handler invoked by
    /// [`ParseResult::exec_command`](crate::ParseResult::exec_command).
    pub fn add_command_with_handler<F>(
        &mut self,
        spec: &str,
        description: &str,
        handler: F,
    ) -> &mut Command
    where
        F: Fn(&Matches<'_>) -> i32 + Send + Sync + 'static,
    {
        self.add_command(spec, description).set_handler(handler)
    }

    /// Declares the positional parameters this set expects.
    pub fn set_params(&mut self, params: &str) -> &mut Self {
        self.params = Some(params.trim().to_string());
        self
    }

    /// Enables or disables the positional count check.
    pub fn set_check_params(&mut self, check: bool) -> &mut Self {
        self.check_params = check;
        self
    }

    /// Returns the first line of the usage text.
    pub fn banner(&self) -> &str {
        self.usage.lines().next().unwrap_or("")
    }

    /// Returns everything after the first line of the usage text.
    pub fn detail(&self) -> &str {
        self.usage
            .split_once('\n')
            .map_or("", |(_, rest)| rest.trim_matches('\n'))
    }

    /// Returns `true` if any commands are declared.
    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Number of `<...>` placeholders in the declared params, if any.
    pub fn param_count(&self) -> Option<usize> {
        self.params.as_deref().map(count_placeholders)
    }

    /// Finds the option a command-line token selects.
    pub fn find_option(&self, token: &str) -> Option<(usize, &OptionSpec)> {
        self.options
            .iter()
            .enumerate()
            .find(|(_, opt)| opt.matches_token(token))
    }

    /// Finds an option by its short or long name.
    pub fn find_option_by_name(&self, name: &str) -> Option<(usize, &OptionSpec)> {
        self.options
            .iter()
            .enumerate()
            .find(|(_, opt)| opt.matches_name(name))
    }

    /// Finds a command by the token that selects it.
    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|cmd| cmd.name == name)
    }

    pub(crate) fn command_index(&self, name: &str) -> Option<usize> {
        self.commands.iter().position(|cmd| cmd.name == name)
    }
}

/// Counts `<...>` placeholders, e.g. `"<src> <dst>"` has two.
fn count_placeholders(text: &str) -> usize {
    let mut count = 0;
    let mut open = false;
    for c in text.chars() {
        match c {
            '<' => open = true,
            '>' if open => {
                open = false;
                count += 1;
            }
            _ => {}
        }
    }
    count
}

/// Something a chosen command runs.
///
/// Implemented for every `Fn(&Matches<'_>) -> i32`, so most callers just
/// pass a closure to [`Command::set_handler`].
pub trait CommandHandler {
    /// Runs the command against its own parse matches.
    fn execute(&self, matches: &Matches<'_>) -> i32;
}

impl<F> CommandHandler for F
where
    F: Fn(&Matches<'_>) -> i32,
{
    fn execute(&self, matches: &Matches<'_>) -> i32 {
        self(matches)
    }
}

/// A command selectable by name, owning its own option set.
///
/// A command without a handler is a grouping only: it can still be chosen
/// and inspected, but [`exec_command`](crate::ParseResult::exec_command)
/// reports failure for it.
#[derive(Serialize, Deserialize)]
pub struct Command {
    /// Token that selects the command.
    pub name: String,
    /// The command's own options and parameter text.
    #[serde(flatten)]
    pub schema: OptionSet,
    /// Stop classifying tokens right after this command is selected.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore_after: bool,
    #[serde(skip)]
    handler: Option<Box<dyn CommandHandler + Send + Sync>>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("ignore_after", &self.ignore_after)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl Command {
    /// Creates a command from `"name <param1> ..."` and a description.
    ///
    /// # Examples
    ///
    /// ```
    /// use argset_core::Command;
    ///
    /// let cmd = Command::new("copy <src> <dst>", "Copy a file");
    /// assert_eq!(cmd.name, "copy");
    /// assert_eq!(cmd.schema.params.as_deref(), Some("<src> <dst>"));
    /// assert_eq!(cmd.synopsis(), "copy <src> <dst>");
    /// ```
    pub fn new(spec: &str, description: &str) -> Self {
        let spec = spec.trim();
        let (name, params) = spec.split_once(' ').unwrap_or((spec, ""));
        let mut schema = OptionSet::new(description);
        schema.set_params(params);
        Self {
            name: name.to_string(),
            schema,
            ignore_after: false,
            handler: None,
        }
    }

    /// Adds a switch to this command.
    pub fn add_switch(&mut self, short: &str, long: &str, summary: &str) -> &mut Self {
        self.schema.add_switch(short, long, summary);
        self
    }

    /// Adds a value option to this command.
    pub fn add_value(&mut self, short: &str, long: &str, summary: &str) -> &mut Self {
        self.schema.add_value(short, long, summary);
        self
    }

    /// Adds a value option with a default to this command.
    pub fn add_value_default(
        &mut self,
        short: &str,
        long: &str,
        summary: &str,
        default: &str,
    ) -> &mut Self {
        self.schema.add_value_default(short, long, summary, default);
        self
    }

    /// Sets whether parsing stops right after this command's token.
    pub fn set_ignore_after(&mut self, ignore: bool) -> &mut Self {
        self.ignore_after = ignore;
        self
    }

    /// Enables or disables the positional count check for this command.
    pub fn set_check_params(&mut self, check: bool) -> &mut Self {
        self.schema.set_check_params(check);
        self
    }

    /// Sets the handler run by `exec_command`.
    pub fn set_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Matches<'_>) -> i32 + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Sets an already boxed handler.
    pub fn set_boxed_handler(&mut self, handler: Box<dyn CommandHandler + Send + Sync>) -> &mut Self {
        self.handler = Some(handler);
        self
    }

    /// Returns the handler, if one is registered.
    pub fn handler(&self) -> Option<&(dyn CommandHandler + Send + Sync)> {
        self.handler.as_deref()
    }

    /// Returns `"name <params>"` as shown in help listings.
    pub fn synopsis(&self) -> String {
        match self.schema.params.as_deref() {
            Some(params) if !params.is_empty() => format!("{} {params}", self.name),
            _ => self.name.clone(),
        }
    }
}
