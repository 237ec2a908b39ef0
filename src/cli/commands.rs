//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use miette::{GraphicalReportHandler, GraphicalTheme, NamedSource, Report};

use crate::frontend::diagnostics::{Diagnostic, Severity};
use crate::frontend::lexer;
use crate::frontend::module::{ModuleParser, NaturalModule};
use crate::frontend::provider::{EmptyProvider, ModuleProvider};
use crate::frontend::workspace::{LibraryProvider, natural_files};

use super::{CliError, CliResult, ExitCode, OutputFormat};

/// Maximum source file size (100 MB)
///
/// Files larger than this are rejected to prevent out-of-memory conditions
/// while lexing.
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read a source file, rejecting anything larger than [`MAX_SOURCE_SIZE`].
pub fn read_source(file_path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(file_path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", file_path.display(), e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            file_path.display(),
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(file_path)
        .map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file_path.display(), e)))
}

/// A library provider for `--library`, or a provider that knows no modules.
fn open_provider(library: Option<&Path>) -> CliResult<Box<dyn ModuleProvider>> {
    match library {
        Some(root) => {
            let provider = LibraryProvider::open(root).map_err(|e| CliError::failure(e.to_string()))?;
            Ok(Box::new(provider))
        }
        None => Ok(Box::new(EmptyProvider)),
    }
}

fn parse_source(parser: &ModuleParser<'_>, file_path: &Path, source: &str) -> CliResult<NaturalModule> {
    parser
        .parse_file(file_path, source)
        .map_err(|e| CliError::usage(e.to_string()))
}

// ============================================================================
// check
// ============================================================================

/// Check every Natural file named by `paths`. Directories are searched recursively.
pub fn check_paths(paths: &[impl AsRef<Path>], library: Option<&Path>, format: OutputFormat) -> CliResult<ExitCode> {
    let provider = open_provider(library)?;
    let parser = ModuleParser::new(provider.as_ref());

    let mut files = Vec::new();
    for path in paths {
        files.extend(natural_files(path.as_ref()).map_err(|e| CliError::failure(e.to_string()))?);
    }

    let mut errors = 0;
    let mut warnings = 0;
    for file_path in &files {
        let source = read_source(file_path)?;
        let module = parse_source(&parser, file_path, &source)?;
        errors += module.diagnostics.iter().filter(|d| d.is_error()).count();
        warnings += module.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();
        print!("{}", format_diagnostics(&module, &source, format));
    }

    if errors > 0 {
        println!(
            "✗ {} error(s), {} warning(s) in {} file(s)",
            errors,
            warnings,
            files.len()
        );
        return Ok(ExitCode::FAILURE);
    }
    if format == OutputFormat::Human {
        println!("✓ {} file(s) checked", files.len());
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Debug commands
// ============================================================================

/// Print every token as `line:column kind text`, then lexer diagnostics.
pub fn lex_file(file_path: &Path) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let tokens = lexer::lex(&source, file_path);

    for token in tokens.iter() {
        println!("{}:{}\t{:?}\t{}", token.line + 1, token.column + 1, token.kind, token.text);
    }
    for diagnostic in tokens.diagnostics() {
        print!("{}", format_short(diagnostic));
    }

    if tokens.diagnostics().iter().any(Diagnostic::is_error) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Print the syntax tree outline of a module, then its diagnostics.
pub fn parse_file(file_path: &Path, library: Option<&Path>) -> CliResult<ExitCode> {
    let provider = open_provider(library)?;
    let source = read_source(file_path)?;
    let module = parse_source(&ModuleParser::new(provider.as_ref()), file_path, &source)?;

    print!("{}", module.outline());
    print!("{}", format_diagnostics(&module, &source, OutputFormat::Short));

    if module.has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Render the diagnostics of `module`, whose text is `source`.
pub fn format_diagnostics(module: &NaturalModule, source: &str, format: OutputFormat) -> String {
    let mut out = String::new();
    for diagnostic in &module.diagnostics {
        match format {
            OutputFormat::Short => out.push_str(&format_short(diagnostic)),
            OutputFormat::Human => out.push_str(&format_human(diagnostic, &module.path, source)),
        }
    }
    out
}

/// `path:line:column: CODE message`, followed by indented notes and hints.
pub fn format_short(diagnostic: &Diagnostic) -> String {
    let mut out = format!(
        "{}: {} {}\n",
        diagnostic.position,
        diagnostic.code(),
        diagnostic.message
    );
    for note in &diagnostic.notes {
        let _ = writeln!(out, "  note: {note}");
    }
    for hint in &diagnostic.hints {
        let _ = writeln!(out, "  hint: {hint}");
    }
    out
}

/// A source excerpt with the diagnostic's span labeled.
///
/// Falls back to [`format_short`] when the diagnostic points into another file or outside `source`.
fn format_human(diagnostic: &Diagnostic, file_path: &Path, source: &str) -> String {
    let position = &diagnostic.position;
    let in_source = *position.path == *file_path && position.offset + position.length <= source.len();
    if !in_source {
        return format_short(diagnostic);
    }

    let report = Report::new(diagnostic.clone())
        .with_source_code(NamedSource::new(file_path.display().to_string(), source.to_string()));
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    let mut out = String::new();
    if handler.render_report(&mut out, &*report).is_err() {
        return format_short(diagnostic);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn module(source: &str) -> NaturalModule {
        ModuleParser::new(&EmptyProvider).parse_file(Path::new("TEST.NSP"), source).unwrap()
    }

    #[test]
    fn short_format_has_location_and_code() {
        let source = "DEFINE DATA LOCAL\nEND-DEFINE\nMOVE 1 TO #X\nEND\n";
        let rendered = format_diagnostics(&module(source), source, OutputFormat::Short);
        assert!(rendered.starts_with("TEST.NSP:3:11: NPP016 "), "{rendered}");
        assert_eq!(rendered.lines().count(), 1);
    }

    #[test]
    fn human_format_shows_the_source_line() {
        let source = "DEFINE DATA LOCAL\nEND-DEFINE\nMOVE 1 TO #X\nEND\n";
        let rendered = format_diagnostics(&module(source), source, OutputFormat::Human);
        assert!(rendered.contains("NPP016"), "{rendered}");
        assert!(rendered.contains("MOVE 1 TO #X"), "{rendered}");
    }

    #[test]
    fn missing_file_is_a_failure() {
        let err = read_source(Path::new("/definitely/not/here.NSP")).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.starts_with("Cannot access file"));
    }

    #[test]
    fn check_reports_failure_for_errors() {
        let dir = std::env::temp_dir().join(format!("natfront-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let good = dir.join("GOOD.NSP");
        let bad = dir.join("BAD.NSP");
        fs::write(&good, "DEFINE DATA LOCAL\n1 #A (A5)\nEND-DEFINE\n#A := 'X'\nEND\n").unwrap();
        fs::write(&bad, "DEFINE DATA LOCAL\nEND-DEFINE\n#B := 1\nEND\n").unwrap();

        let ok = check_paths(&[good.clone()], None, OutputFormat::Short).unwrap();
        let failed = check_paths(&[dir.clone()], None, OutputFormat::Short).unwrap();
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(ok, ExitCode::SUCCESS);
        assert_eq!(failed, ExitCode::FAILURE);
    }

    #[test]
    fn unknown_extension_is_a_usage_error() {
        let dir = std::env::temp_dir().join(format!("natfront-cli-ext-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("notes.txt");
        fs::write(&file, "END\n").unwrap();

        let err = check_paths(&[PathBuf::from(&file)], None, OutputFormat::Short).unwrap_err();
        let _ = fs::remove_dir_all(&dir);
        assert_eq!(err.exit_code, ExitCode::USAGE);
    }
}
