//! CLI module for the Natural front end
//!
//! This module provides the `natfront` command-line interface.
//!
//! ## Commands
//!
//! - `check <PATH>...` - Parse, resolve and type check files or directories
//! - `lex <FILE>` - Print the tokens of a file (debug)
//! - `parse <FILE>` - Print the syntax tree outline and diagnostics of a file (debug)
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// Error diagnostics were reported, or a file could not be read.
    pub const FAILURE: ExitCode = ExitCode(1);
    pub const USAGE: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create a usage error (exit code 2).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::USAGE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Front end for the Natural language
#[derive(Parser, Debug)]
#[command(name = "natfront")]
#[command(version = VERSION)]
#[command(about = "Parse, resolve and type check Natural sources", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse, resolve and type check Natural sources
    Check {
        /// Source files or directories to check
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
        /// Library directory used to find called modules, data areas, copycodes and DDMs
        #[arg(long, value_name = "DIR")]
        library: Option<PathBuf>,
        /// Diagnostic output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },

    /// Tokenize a file (debug)
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse a file and print its syntax tree outline (debug)
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Library directory used to find called modules, data areas, copycodes and DDMs
        #[arg(long, value_name = "DIR")]
        library: Option<PathBuf>,
    },
}

/// How `check` prints diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Source excerpts with labels, notes and hints
    Human,
    /// One `path:line:column: CODE message` line per diagnostic
    Short,
}

// ============================================================================
// Entry point
// ============================================================================

/// Parse arguments, run the command and exit with its exit code.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(code) => {
            if code != ExitCode::SUCCESS {
                process::exit(code.0);
            }
        }
        Err(err) => {
            eprintln!("{}", err.message);
            process::exit(err.exit_code.0);
        }
    }
}

/// Run one parsed command line.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Check {
            paths,
            library,
            format,
        } => commands::check_paths(&paths, library.as_deref(), format),
        Command::Lex { file } => commands::lex_file(&file),
        Command::Parse { file, library } => commands::parse_file(&file, library.as_deref()),
    }
}
