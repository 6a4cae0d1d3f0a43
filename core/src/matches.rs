//! Parse results and their accessors.
//!
//! A parse never mutates the [`OptionSet`] it runs against. Instead it
//! returns a [`ParseResult`] that records, for the root set and for the
//! chosen command, which options were toggled, the values they captured,
//! and the positional parameters collected.

use std::num::ParseIntError;
use std::ops::Deref;

use thiserror::Error;
use tracing::warn;

use crate::{Command, OptionSet, OptionSpec};

/// Errors from the typed accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No option with that short or long name is declared.
    #[error("Option {0} does not exist")]
    UnknownOption(String),
    /// The option's value (or default) is not an integer.
    #[error("Option {name} has non-numeric value '{value}': {source}")]
    InvalidNumber {
        name: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// What a parse found for one option set.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    schema: &'a OptionSet,
    toggled: Vec<bool>,
    values: Vec<Option<String>>,
    params: Vec<String>,
}

impl<'a> Matches<'a> {
    pub(crate) fn new(schema: &'a OptionSet) -> Self {
        Self {
            schema,
            toggled: vec![false; schema.options.len()],
            values: vec![None; schema.options.len()],
            params: Vec::new(),
        }
    }

    pub(crate) fn toggle(&mut self, index: usize, value: Option<String>) {
        self.toggled[index] = true;
        if value.is_some() {
            self.values[index] = value;
        }
    }

    pub(crate) fn push_param(&mut self, param: String) {
        self.params.push(param);
    }

    /// Returns the option set these matches belong to.
    pub fn schema(&self) -> &'a OptionSet {
        self.schema
    }

    /// Returns `true` if the option was passed.
    ///
    /// An undeclared name is reported and treated as not passed.
    pub fn has(&self, name: &str) -> bool {
        match self.schema.find_option_by_name(name) {
            Some((index, _)) => self.toggled[index],
            None => {
                warn!(option = name, "Option does not exist");
                false
            }
        }
    }

    /// Returns the option's value, falling back to its declared default.
    ///
    /// Undeclared names yield `""`. Switches yield `"1"` or `"0"` and are
    /// reported as misuse; use [`has`](Self::has) for those.
    pub fn get(&self, name: &str) -> &str {
        let Some((index, opt)) = self.schema.find_option_by_name(name) else {
            warn!(option = name, "Option does not exist");
            return "";
        };

        if !opt.expects_value {
            warn!(
                option = name,
                "Cannot use get() on a switch, use has() instead"
            );
            return if self.toggled[index] { "1" } else { "0" };
        }

        match &self.values[index] {
            Some(value) if self.toggled[index] => value,
            _ => &opt.default,
        }
    }

    /// Returns the captured value only if the option was passed.
    pub fn value(&self, name: &str) -> Option<&str> {
        let (index, _) = self.schema.find_option_by_name(name)?;
        self.values[index].as_deref()
    }

    /// Parses [`get`](Self::get) as an `i32`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::UnknownOption`] for an undeclared name and
    /// [`AccessError::InvalidNumber`] if the text is not an integer.
    pub fn get_int(&self, name: &str) -> Result<i32, AccessError> {
        self.get_number(name)
    }

    /// Parses [`get`](Self::get) as an `i64`.
    ///
    /// # Errors
    ///
    /// Same as [`get_int`](Self::get_int).
    pub fn get_i64(&self, name: &str) -> Result<i64, AccessError> {
        self.get_number(name)
    }

    fn get_number<T>(&self, name: &str) -> Result<T, AccessError>
    where
        T: std::str::FromStr<Err = ParseIntError>,
    {
        if self.schema.find_option_by_name(name).is_none() {
            return Err(AccessError::UnknownOption(name.to_string()));
        }
        let value = self.get(name);
        value
            .trim()
            .parse()
            .map_err(|source| AccessError::InvalidNumber {
                name: name.to_string(),
                value: value.to_string(),
                source,
            })
    }

    /// Positional parameters, in the order given.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Iterates over passed options with their captured values.
    pub fn toggled(&self) -> impl Iterator<Item = (&'a OptionSpec, Option<&str>)> + '_ {
        self.schema
            .options
            .iter()
            .zip(self.toggled.iter().zip(&self.values))
            .filter(|(_, (toggled, _))| **toggled)
            .map(|(opt, (_, value))| (opt, value.as_deref()))
    }
}

/// The command chosen during a parse, with its own matches.
///
/// Derefs to [`Matches`], so `has`/`get` query the command's options.
#[derive(Debug, Clone)]
pub struct CommandMatch<'a> {
    command: &'a Command,
    matches: Matches<'a>,
}

impl<'a> CommandMatch<'a> {
    pub(crate) fn new(command: &'a Command) -> Self {
        Self {
            command,
            matches: Matches::new(&command.schema),
        }
    }

    pub(crate) fn matches_mut(&mut self) -> &mut Matches<'a> {
        &mut self.matches
    }

    /// Name of the chosen command.
    pub fn name(&self) -> &'a str {
        &self.command.name
    }

    /// The command's declaration.
    pub fn command(&self) -> &'a Command {
        self.command
    }

    /// The command's matches.
    pub fn matches(&self) -> &Matches<'a> {
        &self.matches
    }
}

impl<'a> Deref for CommandMatch<'a> {
    type Target = Matches<'a>;

    fn deref(&self) -> &Self::Target {
        &self.matches
    }
}

/// Outcome of a successful parse.
///
/// Root-level accessors (`has`, `get`, `params`, ...) are available
/// directly; the chosen command's are reached via
/// [`which_command`](Self::which_command).
#[derive(Debug, Clone)]
pub struct ParseResult<'a> {
    root: Matches<'a>,
    command: Option<CommandMatch<'a>>,
    end_index: usize,
}

impl<'a> ParseResult<'a> {
    pub(crate) fn new(
        root: Matches<'a>,
        command: Option<CommandMatch<'a>>,
        end_index: usize,
    ) -> Self {
        Self {
            root,
            command,
            end_index,
        }
    }

    /// The root set's matches.
    pub fn root(&self) -> &Matches<'a> {
        &self.root
    }

    /// Returns the chosen command, if any.
    pub fn which_command(&self) -> Option<&CommandMatch<'a>> {
        self.command.as_ref()
    }

    /// Runs the chosen command's handler and returns its result code.
    ///
    /// Returns `1` when no command was chosen or it has no handler.
    pub fn exec_command(&self) -> i32 {
        let Some(chosen) = &self.command else {
            warn!("No command was chosen");
            return 1;
        };
        match chosen.command.handler() {
            Some(handler) => handler.execute(&chosen.matches),
            None => {
                warn!(command = chosen.name(), "Command has no handler");
                1
            }
        }
    }

    /// Index into the token list one past the last token this parse used.
    ///
    /// For a command with `ignore_after` set this is where the caller
    /// should resume with a different option set.
    pub fn parse_end_index(&self) -> usize {
        self.end_index
    }

    /// See [`Matches::has`].
    pub fn has(&self, name: &str) -> bool {
        self.root.has(name)
    }

    /// See [`Matches::get`].
    pub fn get(&self, name: &str) -> &str {
        self.root.get(name)
    }

    /// See [`Matches::value`].
    pub fn value(&self, name: &str) -> Option<&str> {
        self.root.value(name)
    }

    /// See [`Matches::get_int`].
    ///
    /// # Errors
    ///
    /// Same as [`Matches::get_int`].
    pub fn get_int(&self, name: &str) -> Result<i32, AccessError> {
        self.root.get_int(name)
    }

    /// See [`Matches::get_i64`].
    ///
    /// # Errors
    ///
    /// Same as [`Matches::get_i64`].
    pub fn get_i64(&self, name: &str) -> Result<i64, AccessError> {
        self.root.get_i64(name)
    }

    /// Root positional parameters.
    pub fn params(&self) -> &[String] {
        self.root.params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> OptionSet {
        let mut set = OptionSet::new("Usage: something [options...] param1 param2");
        set.add_switch("f", "force", "Force a thing");
        set.add_switch("p", "preserve", "Preserve goodness");
        set.add_value("o", "outfile", "File to write to");
        set.add_value_default("c", "count", "Max count", "7");
        set.add_value_default("b", "big", "Big number", "5000000000");
        set.add_value_default("n", "name", "Not a number", "seven");
        set
    }

    #[test]
    fn test_get_falls_back_to_default() {
        let set = schema();
        let mut matches = Matches::new(&set);
        assert_eq!(matches.get("count"), "7");
        assert_eq!(matches.get("outfile"), "");
        assert_eq!(matches.value("count"), None);

        matches.toggle(3, Some("9".to_string()));
        assert_eq!(matches.get("c"), "9");
        assert_eq!(matches.value("count"), Some("9"));
    }

    #[test]
    fn test_get_on_switch_reports_toggle_state() {
        let set = schema();
        let mut matches = Matches::new(&set);
        assert_eq!(matches.get("force"), "0");
        matches.toggle(0, None);
        assert_eq!(matches.get("f"), "1");
        assert!(matches.has("force"));
    }

    #[test]
    fn test_unknown_names_degrade_safely() {
        let set = schema();
        let matches = Matches::new(&set);
        assert!(!matches.has("missing"));
        assert_eq!(matches.get("missing"), "");
        assert_eq!(
            matches.get_int("missing"),
            Err(AccessError::UnknownOption("missing".to_string()))
        );
    }

    #[test]
    fn test_numeric_accessors() {
        let set = schema();
        let matches = Matches::new(&set);
        assert_eq!(matches.get_int("count"), Ok(7));
        assert_eq!(matches.get_i64("c"), Ok(7));
        assert_eq!(matches.get_i64("big"), Ok(5_000_000_000));
        assert!(matches!(
            matches.get_int("big"),
            Err(AccessError::InvalidNumber { .. })
        ));
        assert!(matches!(
            matches.get_int("name"),
            Err(AccessError::InvalidNumber { ref value, .. }) if value == "seven"
        ));
    }

    #[test]
    fn test_toggled_iterates_passed_options() {
        let set = schema();
        let mut matches = Matches::new(&set);
        matches.toggle(0, None);
        matches.toggle(2, Some("out.txt".to_string()));

        let passed: Vec<(&str, Option<&str>)> = matches
            .toggled()
            .map(|(opt, value)| (opt.long.as_str(), value))
            .collect();
        assert_eq!(passed, vec![("force", None), ("outfile", Some("out.txt"))]);
    }

    #[test]
    fn test_exec_command_without_choice_fails() {
        let set = schema();
        let result = ParseResult::new(Matches::new(&set), None, 1);
        assert_eq!(result.exec_command(), 1);
        assert!(result.which_command().is_none());
    }

    #[test]
    fn test_exec_command_runs_handler() {
        let mut set = OptionSet::new("Usage: tool <command>");
        set.add_command("run", "Run it")
            .add_switch("q", "quiet", "")
            .set_handler(|m| if m.has("quiet") { 3 } else { 4 });
        set.add_command("group", "No handler");

        let mut chosen = CommandMatch::new(&set.commands[0]);
        chosen.matches_mut().toggle(0, None);
        let result = ParseResult::new(Matches::new(&set), Some(chosen), 2);
        assert_eq!(result.exec_command(), 3);
        assert_eq!(result.which_command().map(CommandMatch::name), Some("run"));

        let grouping = CommandMatch::new(&set.commands[1]);
        let result = ParseResult::new(Matches::new(&set), Some(grouping), 2);
        assert_eq!(result.exec_command(), 1);
    }
}
