//! Token classification and parse outcomes.
//!
//! [`parse`] walks a token list once, left to right, classifying each token
//! as an option, an option value, a command name, a help request, or a
//! positional parameter. The schema is validated first and never mutated;
//! everything found lands in the returned [`ParseResult`].

use thiserror::Error;
use tracing::debug;

use crate::OptionSet;
use crate::help::{render_command_help, render_help};
use crate::matches::{CommandMatch, Matches, ParseResult};
use crate::validate::{ValidationError, validate_option_set};

/// Option-position tokens that always request help.
pub const HELP_SPELLINGS: [&str; 7] = ["-h", "-help", "--help", "-?", "/?", "/h", "/help"];

/// Command-position token that requests help.
pub const HELP_COMMAND: &str = "help";

/// Reasons a parse did not succeed.
///
/// Every variant except [`HelpRequested`](ParseError::HelpRequested) is a
/// genuine error; check [`is_help`](ParseError::is_help) to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The option set itself is malformed.
    #[error(transparent)]
    Schema(#[from] ValidationError),
    /// A `-`-prefixed token matched no option.
    #[error("Unknown option '{0}'")]
    UnknownOption(String),
    /// A token in command position matched no command.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    /// A value option was the last token.
    #[error("Option {option} expects a value, eg --{long} <something>")]
    MissingValue { option: String, long: String },
    /// Commands are declared but none was given.
    #[error("No command specified")]
    NoCommand,
    /// A command got the wrong number of positional parameters.
    #[error("Command '{command}' expects {expected} parameter(s), but {actual} were given")]
    ParamCount {
        command: String,
        expected: usize,
        actual: usize,
    },
    /// The root set got the wrong number of positional parameters.
    #[error("Expected {expected} parameter(s), but {actual} were given")]
    RootParamCount { expected: usize, actual: usize },
    /// Help was requested; holds the rendered help text.
    #[error("{0}")]
    HelpRequested(String),
}

impl ParseError {
    /// Returns `true` if the parse stopped because help was requested.
    pub fn is_help(&self) -> bool {
        matches!(self, Self::HelpRequested(_))
    }

    /// Conventional process exit code: `0` for help, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_help() { 0 } else { 1 }
    }

    /// Writes the diagnostic (or the help text) to standard output.
    pub fn report(&self) {
        let text = self.to_string();
        println!("{}", text.trim_end());
    }
}

impl OptionSet {
    /// Parses `tokens[start..]` against this set.
    ///
    /// `tokens` conventionally holds the program name at index 0, so
    /// `start` is usually `1`.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn parse<S: AsRef<str>>(
        &self,
        tokens: &[S],
        start: usize,
    ) -> Result<ParseResult<'_>, ParseError> {
        parse(self, tokens, start)
    }

    /// Parses the process arguments, skipping the program name.
    ///
    /// Arguments that are not valid UTF-8 are converted lossily.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn parse_env(&self) -> Result<ParseResult<'_>, ParseError> {
        let tokens: Vec<String> = std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        parse(self, tokens.as_slice(), 1)
    }
}

/// Parses `tokens[start..]` against `set`.
///
/// # Errors
///
/// Returns [`ParseError::Schema`] before consuming anything if `set` fails
/// validation, [`ParseError::HelpRequested`] if a help token was seen, and
/// one of the other variants for a token the schema cannot account for.
///
/// # Examples
///
/// ```
/// use argset_core::{OptionSet, parse};
///
/// let mut set = OptionSet::new("Usage: tool [options...]");
/// set.add_value("o", "outfile", "File to write to");
///
/// let result = parse(&set, &["tool", "-o", "out.txt", "extra"], 1).unwrap();
/// assert_eq!(result.get("outfile"), "out.txt");
/// assert_eq!(result.params(), ["extra"]);
///
/// let err = parse(&set, &["tool", "--help"], 1).unwrap_err();
/// assert!(err.is_help());
/// ```
pub fn parse<'a, S: AsRef<str>>(
    set: &'a OptionSet,
    tokens: &[S],
    start: usize,
) -> Result<ParseResult<'a>, ParseError> {
    if let Some(err) = validate_option_set(set).into_iter().next() {
        return Err(err.into());
    }

    let mut root = Matches::new(set);
    let mut chosen: Option<CommandMatch<'a>> = None;
    let mut i = start;

    while i < tokens.len() {
        let token = tokens[i].as_ref();
        let next: Option<&str> = tokens.get(i + 1).map(|t| t.as_ref());
        let schema = chosen.as_ref().map_or(set, |c| &c.command().schema);

        if token.starts_with('-') {
            if let Some((index, opt)) = schema.find_option(token) {
                let value = if opt.expects_value {
                    let Some(value) = next else {
                        return Err(ParseError::MissingValue {
                            option: token.to_string(),
                            long: opt.long.clone(),
                        });
                    };
                    Some(value.to_string())
                } else {
                    None
                };
                debug!(token, option = %opt.long, ?value, "Matched option");
                let consumed = if value.is_some() { 2 } else { 1 };
                active(&mut root, &mut chosen).toggle(index, value);
                i += consumed;
                continue;
            }
        }

        // Everything past an ignore-after command's own options is left for
        // the caller to re-parse from `parse_end_index`.
        if chosen.as_ref().is_some_and(|c| c.command().ignore_after) {
            debug!(token, end_index = i, "Stopping after ignore-after command");
            break;
        }

        if HELP_SPELLINGS.contains(&token) {
            return Err(help_request(set, chosen.as_ref(), next));
        }

        if token.starts_with('-') && !looks_numeric(token) {
            return Err(ParseError::UnknownOption(token.to_string()));
        }

        if chosen.is_none() && set.has_commands() {
            if token == HELP_COMMAND {
                return Err(help_request(set, None, next));
            }
            let Some(index) = set.command_index(token) else {
                return Err(ParseError::UnknownCommand(token.to_string()));
            };
            let command = &set.commands[index];
            debug!(command = %command.name, index = i, "Selected command");
            chosen = Some(CommandMatch::new(command));
            i += 1;
            continue;
        }

        debug!(token, "Collected positional");
        active(&mut root, &mut chosen).push_param(token.to_string());
        i += 1;
    }

    match &chosen {
        None if set.has_commands() => return Err(ParseError::NoCommand),
        None => check_root_params(&root)?,
        Some(c) if !c.command().ignore_after => check_command_params(c)?,
        Some(_) => {}
    }

    Ok(ParseResult::new(root, chosen, i))
}

fn active<'m, 'a>(
    root: &'m mut Matches<'a>,
    chosen: &'m mut Option<CommandMatch<'a>>,
) -> &'m mut Matches<'a> {
    match chosen {
        Some(c) => c.matches_mut(),
        None => root,
    }
}

/// Builds the help response for the active schema.
///
/// Inside a chosen command the command's help is shown. At the root, a
/// following token names the command to show help for; with no commands
/// declared the full help is shown regardless.
fn help_request(set: &OptionSet, chosen: Option<&CommandMatch<'_>>, next: Option<&str>) -> ParseError {
    let text = match (chosen, next) {
        (Some(c), _) => render_command_help(c.command()),
        (None, Some(name)) if set.has_commands() => match set.find_command(name) {
            Some(command) => render_command_help(command),
            None => format!("Unknown command '{name}'\n"),
        },
        _ => render_help(set),
    };
    ParseError::HelpRequested(text)
}

fn check_command_params(chosen: &CommandMatch<'_>) -> Result<(), ParseError> {
    let schema = &chosen.command().schema;
    if !schema.check_params {
        return Ok(());
    }
    let expected = schema.param_count().unwrap_or(0);
    let actual = chosen.params().len();
    if actual == expected {
        Ok(())
    } else {
        Err(ParseError::ParamCount {
            command: chosen.name().to_string(),
            expected,
            actual,
        })
    }
}

fn check_root_params(root: &Matches<'_>) -> Result<(), ParseError> {
    let schema = root.schema();
    let Some(expected) = schema.param_count().filter(|_| schema.check_params) else {
        return Ok(());
    };
    let actual = root.params().len();
    if actual == expected {
        Ok(())
    } else {
        Err(ParseError::RootParamCount { expected, actual })
    }
}

/// Whether a `-`-prefixed token is a number rather than an option.
fn looks_numeric(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && token.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple() -> OptionSet {
        let mut set = OptionSet::new("Usage: something [options...] param1 param2");
        set.add_switch("f", "force", "Force a thing");
        set.add_switch("p", "preserve", "Preserve goodness");
        set.add_value("o", "outfile", "File to write to");
        set.add_value_default("c", "count", "Max count", "7");
        set.add_value("", "justlong", "This has no short form");
        set
    }

    fn with_commands() -> OptionSet {
        let mut set = OptionSet::new("Usage: tool [options...] <command>");
        set.add_switch("v", "verbose", "Be chatty");
        set.add_command_with_handler("foo", "Foo things", |m| {
            if m.has("foo1") { 10 } else { 11 }
        })
        .add_switch("", "foo1", "First foo option");
        set.add_command("bar", "Bar things")
            .add_value("o", "out", "Output");
        set.add_command("copy <src> <dst>", "Copy a file")
            .add_switch("", "force", "Overwrite");
        set.add_command("end", "Delegate the rest")
            .set_ignore_after(true);
        set
    }

    #[test]
    fn test_parse_switches_values_and_params() {
        let set = simple();
        let tokens = ["thing.exe", "-f", "--outfile", "myfile", "pos1", "pos2"];
        let result = set.parse(&tokens, 1).unwrap();

        assert!(result.has("f"));
        assert!(result.has("o"));
        assert!(result.has("outfile"));
        assert!(!result.has("preserve"));
        assert_eq!(result.get("outfile"), "myfile");
        assert_eq!(result.get_int("c"), Ok(7));
        assert_eq!(result.get_i64("count"), Ok(7));
        assert_eq!(result.params(), ["pos1", "pos2"]);
        assert_eq!(result.parse_end_index(), 6);
    }

    #[test]
    fn test_parse_empty_succeeds_without_commands() {
        let set = simple();
        let result = set.parse(&["thing.exe"], 1).unwrap();
        assert!(result.params().is_empty());
        assert!(!result.has("force"));
    }

    #[test]
    fn test_parse_empty_fails_with_commands() {
        let set = with_commands();
        assert_eq!(set.parse(&["tool"], 1).unwrap_err(), ParseError::NoCommand);
        assert_eq!(
            set.parse(&["tool", "-v"], 1).unwrap_err(),
            ParseError::NoCommand
        );
    }

    #[test]
    fn test_reparse_does_not_leak() {
        let set = simple();
        let first = set.parse(&["x", "-f", "-o", "a", "p1"], 1).unwrap();
        let second = set.parse(&["x", "-p"], 1).unwrap();

        assert!(first.has("force"));
        assert!(!second.has("force"));
        assert!(second.has("preserve"));
        assert_eq!(second.get("outfile"), "");
        assert!(second.params().is_empty());
    }

    #[test]
    fn test_unknown_option_fails() {
        let set = simple();
        assert_eq!(
            set.parse(&["thing.exe", "-bad"], 1).unwrap_err(),
            ParseError::UnknownOption("-bad".to_string())
        );
    }

    #[test]
    fn test_missing_value_fails() {
        let set = simple();
        let err = set.parse(&["thing.exe", "pos", "-o"], 1).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingValue {
                option: "-o".to_string(),
                long: "outfile".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Option -o expects a value, eg --outfile <something>"
        );
    }

    #[test]
    fn test_value_may_look_like_option() {
        let set = simple();
        let result = set.parse(&["x", "-o", "-f"], 1).unwrap();
        assert_eq!(result.get("outfile"), "-f");
        assert!(!result.has("force"));
    }

    #[test]
    fn test_help_spellings_always_request_help() {
        let set = simple();
        for spelling in HELP_SPELLINGS {
            let err = set.parse(&["thing.exe", spelling], 1).unwrap_err();
            assert!(err.is_help(), "{spelling} should request help");
            assert_eq!(err.exit_code(), 0);
        }
    }

    #[test]
    fn test_declared_option_shadows_help_spelling() {
        let mut set = OptionSet::new("Usage: tool");
        set.add_switch("h", "host", "Not help");
        let result = set.parse(&["tool", "-h"], 1).unwrap();
        assert!(result.has("host"));
    }

    #[test]
    fn test_help_lists_options() {
        let set = simple();
        let ParseError::HelpRequested(text) = set.parse(&["x", "--help"], 1).unwrap_err() else {
            panic!("expected help");
        };
        assert!(text.starts_with("Usage: something"));
        assert!(text.contains("--outfile"));
    }

    #[test]
    fn test_negative_numbers_are_positionals() {
        let set = simple();
        let result = set.parse(&["x", "-5", "-2.5e3", "+3"], 1).unwrap();
        assert_eq!(result.params(), ["-5", "-2.5e3", "+3"]);

        assert_eq!(
            set.parse(&["x", "-e"], 1).unwrap_err(),
            ParseError::UnknownOption("-e".to_string())
        );
        assert_eq!(
            set.parse(&["x", "-"], 1).unwrap_err(),
            ParseError::UnknownOption("-".to_string())
        );
    }

    #[test]
    fn test_schema_errors_abort_before_tokens() {
        let mut set = simple();
        set.add_switch("f", "fast", "Duplicate short");
        assert_eq!(
            set.parse(&["x", "--help"], 1).unwrap_err(),
            ParseError::Schema(ValidationError::DuplicateName("f".to_string()))
        );
    }

    #[test]
    fn test_command_selection_and_exec() {
        let set = with_commands();
        let result = set.parse(&["tool", "-v", "foo", "--foo1"], 1).unwrap();

        assert!(result.has("v"));
        let chosen = result.which_command().unwrap();
        assert_eq!(chosen.name(), "foo");
        assert!(chosen.has("foo1"));
        assert!(chosen.params().is_empty());
        assert_eq!(result.exec_command(), 10);
    }

    #[test]
    fn test_command_scoped_options() {
        let set = with_commands();
        assert_eq!(
            set.parse(&["tool", "foo", "-v"], 1).unwrap_err(),
            ParseError::UnknownOption("-v".to_string())
        );
        assert_eq!(
            set.parse(&["tool", "--foo1", "foo"], 1).unwrap_err(),
            ParseError::UnknownOption("--foo1".to_string())
        );

        let result = set.parse(&["tool", "bar", "-o", "out"], 1).unwrap();
        let bar = result.which_command().unwrap();
        assert_eq!(bar.get("out"), "out");
        assert_eq!(result.exec_command(), 1);
    }

    #[test]
    fn test_unknown_command_fails() {
        let set = with_commands();
        assert_eq!(
            set.parse(&["tool", "baz"], 1).unwrap_err(),
            ParseError::UnknownCommand("baz".to_string())
        );
    }

    #[test]
    fn test_ignore_after_records_end_index() {
        let set = with_commands();
        let tokens = ["tool", "-v", "end", "--endOption", "-v"];
        let result = set.parse(&tokens, 1).unwrap();

        assert_eq!(result.which_command().unwrap().name(), "end");
        assert_eq!(result.parse_end_index(), 3);

        let mut tail = OptionSet::new("Usage: end [options...]");
        tail.add_switch("", "endOption", "Handled by the delegate");
        tail.add_switch("v", "verbose", "");
        let rest = tail.parse(&tokens, result.parse_end_index()).unwrap();
        assert!(rest.has("endOption"));
        assert!(rest.has("verbose"));
    }

    #[test]
    fn test_ignore_after_command_keeps_its_own_options() {
        let mut set = with_commands();
        set.add_command("run", "Run a delegate")
            .set_ignore_after(true)
            .add_switch("n", "dry", "Print instead of running")
            .add_value("", "dir", "Working directory");

        let tokens = ["tool", "run", "--dry", "--dir", "/tmp", "rest", "--dry"];
        let result = set.parse(&tokens, 1).unwrap();
        let run = result.which_command().unwrap();
        assert!(run.has("dry"));
        assert_eq!(run.get("dir"), "/tmp");
        assert!(run.params().is_empty());
        assert_eq!(result.parse_end_index(), 5);

        let result = set.parse(&["tool", "run", "-n", "--unknown"], 1).unwrap();
        assert!(result.which_command().unwrap().has("dry"));
        assert_eq!(result.parse_end_index(), 3);

        let result = set.parse(&["tool", "run", "-h"], 1).unwrap();
        assert_eq!(result.parse_end_index(), 2);
    }

    #[test]
    fn test_param_count_enforced() {
        let set = with_commands();
        assert_eq!(
            set.parse(&["tool", "copy"], 1).unwrap_err(),
            ParseError::ParamCount {
                command: "copy".to_string(),
                expected: 2,
                actual: 0,
            }
        );
        assert!(set.parse(&["tool", "copy", "a"], 1).is_err());
        assert!(set.parse(&["tool", "copy", "a", "b", "c"], 1).is_err());

        let result = set.parse(&["tool", "copy", "a", "--force", "b"], 1).unwrap();
        let copy = result.which_command().unwrap();
        assert_eq!(copy.params(), ["a", "b"]);
        assert!(copy.has("force"));
    }

    #[test]
    fn test_param_count_can_be_disabled() {
        let mut set = with_commands();
        set.add_command("loose <one>", "Anything goes")
            .set_check_params(false);
        let result = set.parse(&["tool", "loose", "a", "b", "c"], 1).unwrap();
        assert_eq!(result.which_command().unwrap().params().len(), 3);

        assert!(set.parse(&["tool", "foo", "stray"], 1).is_err());
    }

    #[test]
    fn test_root_params_enforced_when_declared() {
        let mut set = simple();
        set.set_params("<input>");
        assert!(set.parse(&["x", "in.txt"], 1).is_ok());
        assert_eq!(
            set.parse(&["x"], 1).unwrap_err(),
            ParseError::RootParamCount {
                expected: 1,
                actual: 0,
            }
        );
    }

    #[test]
    fn test_help_command_and_scoped_help() {
        let set = with_commands();

        let ParseError::HelpRequested(full) = set.parse(&["tool", "help"], 1).unwrap_err() else {
            panic!("expected help");
        };
        assert!(full.contains("copy <src> <dst>"));

        let ParseError::HelpRequested(scoped) =
            set.parse(&["tool", "help", "bar"], 1).unwrap_err()
        else {
            panic!("expected help");
        };
        assert!(scoped.starts_with("bar"));
        assert!(scoped.contains("--out"));

        let ParseError::HelpRequested(flag) = set.parse(&["tool", "-h", "copy"], 1).unwrap_err()
        else {
            panic!("expected help");
        };
        assert!(flag.starts_with("copy <src> <dst>"));

        let err = set.parse(&["tool", "--help", "nope"], 1).unwrap_err();
        assert_eq!(err, ParseError::HelpRequested("Unknown command 'nope'\n".to_string()));
    }

    #[test]
    fn test_help_inside_command() {
        let set = with_commands();
        let ParseError::HelpRequested(text) = set.parse(&["tool", "bar", "-h"], 1).unwrap_err()
        else {
            panic!("expected help");
        };
        assert!(text.starts_with("bar"));
    }

    #[test]
    fn test_help_with_trailing_token_without_commands() {
        let set = simple();
        let err = set.parse(&["x", "-h", "foo"], 1).unwrap_err();
        assert_eq!(err, ParseError::HelpRequested(render_help(&set)));
    }

    #[test]
    fn test_help_with_trailing_token_inside_command() {
        let set = with_commands();
        let ParseError::HelpRequested(text) =
            set.parse(&["tool", "bar", "-h", "copy"], 1).unwrap_err()
        else {
            panic!("expected help");
        };
        assert_eq!(text, render_command_help(&set.commands[1]));
        assert!(text.starts_with("bar"));
    }

    #[test]
    fn test_negative_number_in_command_position() {
        let set = with_commands();
        assert_eq!(
            set.parse(&["tool", "-5"], 1).unwrap_err(),
            ParseError::UnknownCommand("-5".to_string())
        );
    }

    #[test]
    fn test_concurrent_parses_share_one_set() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OptionSet>();

        let set = with_commands();
        let (left, right) = std::thread::scope(|scope| {
            let left = scope.spawn(|| {
                let result = set.parse(&["tool", "-v", "foo", "--foo1"], 1).unwrap();
                (result.has("verbose"), result.exec_command())
            });
            let right = scope.spawn(|| {
                let result = set.parse(&["tool", "foo"], 1).unwrap();
                (result.has("verbose"), result.exec_command())
            });
            (left.join().unwrap(), right.join().unwrap())
        });
        assert_eq!(left, (true, 10));
        assert_eq!(right, (false, 11));
    }

    #[test]
    fn test_start_index_beyond_tokens() {
        let set = simple();
        let result = set.parse(&["x", "-f"], 5).unwrap();
        assert!(!result.has("force"));
        assert_eq!(result.parse_end_index(), 5);
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("-1"));
        assert!(looks_numeric("-0.5"));
        assert!(looks_numeric("-1e10"));
        assert!(!looks_numeric("-inf"));
        assert!(!looks_numeric("-1x"));
        assert!(!looks_numeric("--"));
    }
}
