//! Help text rendering.
//!
//! Help is a pure projection of the schema: the usage banner, the wrapped
//! detail text, a command listing, then every option sorted by long name.

use crate::{Command, OptionSet, OptionSpec};

/// Column at which detail text is wrapped.
pub const WRAP_WIDTH: usize = 80;

impl OptionSet {
    /// Renders the full help text for this set.
    pub fn help(&self) -> String {
        render_help(self)
    }

    /// Renders help for the named command, if it exists.
    pub fn command_help(&self, name: &str) -> Option<String> {
        self.find_command(name).map(render_command_help)
    }
}

/// Renders help for an option set.
///
/// # Examples
///
/// ```
/// use argset_core::{OptionSet, render_help};
///
/// let mut set = OptionSet::new("Usage: tool [options...]");
/// set.add_switch("f", "force", "Force a thing");
/// set.add_value_default("c", "count", "Max count", "7");
///
/// let help = render_help(&set);
/// assert_eq!(
///     help,
///     "Usage: tool [options...]\n\n -c --count Max count (7)\n -f --force Force a thing\n"
/// );
/// ```
pub fn render_help(set: &OptionSet) -> String {
    let mut out = String::new();
    out.push_str(set.banner());
    out.push('\n');

    let detail = set.detail();
    if !detail.is_empty() {
        out.push('\n');
        for line in wrap(detail, WRAP_WIDTH) {
            out.push_str(&line);
            out.push('\n');
        }
    }

    if set.has_commands() {
        out.push('\n');
        let synopses: Vec<String> = set.commands.iter().map(Command::synopsis).collect();
        let width = synopses.iter().map(|s| s.chars().count()).max().unwrap_or(0);
        for (synopsis, cmd) in synopses.iter().zip(&set.commands) {
            let line = format!("  {synopsis:<width$}  {}", cmd.schema.banner());
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }

    if !set.options.is_empty() {
        out.push('\n');
        out.push_str(&render_options(&set.options));
    }

    out
}

/// Renders help for a single command, headed by its synopsis.
pub fn render_command_help(command: &Command) -> String {
    let mut out = command.synopsis();
    out.push('\n');
    out.push_str(&render_help(&command.schema));
    out
}

fn render_options(options: &[OptionSpec]) -> String {
    let width = options
        .iter()
        .map(|opt| opt.long.chars().count())
        .max().unwrap_or(0);
    let mut sorted: Vec<&OptionSpec> = options.iter().collect();
    sorted.sort_by(|a, b| a.long.cmp(&b.long));

    let mut out = String::new();
    for opt in sorted {
        let line = match opt.short_name() {
            Some(short) => format!(" -{short} --{:<width$} {}", opt.long, opt.summary),
            None => format!("    --{:<width$} {}", opt.long, opt.summary),
        };
        out.push_str(line.trim_end());
        if opt.expects_value && !opt.default.is_empty() {
            out.push_str(&format!(" ({})", opt.default));
        }
        out.push('\n');
    }
    out
}

/// Greedy word wrap; existing line breaks are kept.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_width = 0;
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line_width + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if !line.is_empty() {
                line.push(' ');
                line_width += 1;
            }
            line.push_str(word);
            line_width += word.chars().count();
        }
        lines.push(line);
    }
    lines
}
