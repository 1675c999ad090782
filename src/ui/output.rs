//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag. Inside
//! GitHub Actions (`GITHUB_ACTIONS=true`) debug, warning and error lines are
//! emitted as workflow commands so the runner renders them as annotations,
//! and step outputs are appended to the `$GITHUB_OUTPUT` file.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Whether we run inside a GitHub Actions runner.
pub fn in_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        if in_actions() {
            println!("::debug::{}", escape_data(&message.to_string()));
        } else {
            eprintln!("[debug] {}", message);
        }
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    if in_actions() {
        println!("::error::{}", escape_data(&message.to_string()));
    } else {
        eprintln!("error: {}", message);
    }
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        if in_actions() {
            println!("::warning::{}", escape_data(&message.to_string()));
        } else {
            eprintln!("warning: {}", message);
        }
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Escape a workflow command message.
///
/// # Example
///
/// ```
/// use release_tagger::ui::output::escape_data;
///
/// assert_eq!(escape_data("50%\nnext"), "50%25%0Anext");
/// ```
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Record a step output.
///
/// Appends `name=value` to the file named by `$GITHUB_OUTPUT` when set.
/// Outside Actions this is a no-op; the caller prints the values.
pub fn set_output(name: &str, value: &str) -> std::io::Result<()> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) if !path.is_empty() => append_output(Path::new(&path), name, value),
        _ => Ok(()),
    }
}

/// Append one output entry to an outputs file.
pub fn append_output(path: &Path, name: &str, value: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{}={}", name, value)
}
