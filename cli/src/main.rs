use std::path::{Path, PathBuf};

use argset_core::{Matches, OptionSet, ParseResult, validate_option_set};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value, json};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "argset", disable_help_subcommand = true)]
#[command(about = "Validate, render, and exercise option-set definitions")]
struct Cli {
    /// Log parser decisions to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a definition file for schema errors.
    Validate(ValidateArgs),
    /// Print the generated help for a definition or one of its commands.
    Help(HelpArgs),
    /// Parse a token list against a definition and print the outcome as JSON.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Definition file (.json, .yaml, or .yml).
    definition: PathBuf,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Definition file (.json, .yaml, or .yml).
    definition: PathBuf,
    /// Show help for this command instead of the whole definition.
    command: Option<String>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Definition file (.json, .yaml, or .yml).
    definition: PathBuf,
    /// Index of the first token to parse; index 0 is the program name.
    #[arg(long, default_value_t = 1)]
    start: usize,
    /// Tokens to parse, given after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Help(args) => run_help(args),
        Command::Parse(args) => run_parse(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "argset=debug,argset_core=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_definition(path: &Path) -> Result<OptionSet, String> {
    debug!(path = %path.display(), "Reading definition");
    OptionSet::load(path).map_err(|err| format!("Failed to load '{}': {err}", path.display()))
}

fn run_validate(args: ValidateArgs) -> Result<i32, String> {
    let set = load_definition(&args.definition)?;
    let errors = validate_option_set(&set);
    if errors.is_empty() {
        println!("Definition is valid.");
        return Ok(0);
    }
    for err in &errors {
        println!("{err}");
    }
    Ok(1)
}

fn run_help(args: HelpArgs) -> Result<i32, String> {
    let set = load_definition(&args.definition)?;
    let text = match args.command.as_deref() {
        Some(name) => set
            .command_help(name)
            .ok_or_else(|| format!("Unknown command '{name}'"))?,
        None => set.help(),
    };
    print!("{text}");
    Ok(0)
}

fn run_parse(args: ParseArgs) -> Result<i32, String> {
    let set = load_definition(&args.definition)?;
    match set.parse(args.tokens.as_slice(), args.start) {
        Ok(result) => {
            let summary = summarize(&result);
            let raw = serde_json::to_string_pretty(&summary)
                .map_err(|err| format!("Failed to serialize parse result: {err}"))?;
            println!("{raw}");
            Ok(0)
        }
        Err(err) => {
            err.report();
            Ok(err.exit_code())
        }
    }
}

/// Builds the JSON view of a successful parse.
fn summarize(result: &ParseResult<'_>) -> Value {
    let command = result.which_command().map(|chosen| {
        json!({
            "name": chosen.name(),
            "options": passed_options(chosen.matches()),
            "params": chosen.params(),
        })
    });

    json!({
        "options": passed_options(result.root()),
        "params": result.params(),
        "command": command,
        "parse_end_index": result.parse_end_index(),
    })
}

/// Switches map to `true`, value options to their captured value.
fn passed_options(matches: &Matches<'_>) -> Value {
    let options: Map<String, Value> = matches
        .toggled()
        .map(|(opt, value)| {
            let value = value.map_or(Value::Bool(true), |v| Value::String(v.to_string()));
            (opt.long.clone(), value)
        })
        .collect();
    Value::Object(options)
}
