//! Diagnostics produced by the lexer, parser and checkers.
//!
//! Diagnostics are data, not control flow: every pass appends to a list and keeps going. Each diagnostic carries a
//! stable id from [`natfront_core::lang::errors`], a severity, a message and the [`Position`] it points at.
//!
//! ## Notes
//! - [`Diagnostic`] implements [`miette::Diagnostic`], so the CLI can render it with source context.
//! - Diagnostics raised inside an included copycode are *relocated* to the `INCLUDE` statement; the original
//!   location is kept as a note.
//! - The [`errors`] catalog is the only place that formats diagnostic messages.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use natfront_core::lang::errors::DiagnosticId;

/// A location in a source file.
///
/// `line` and `column` are 0-based; `column` and `length` are in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub path: Arc<Path>,
    pub offset: usize,
    pub line: u32,
    pub column: u32,
    pub length: usize,
}

impl Position {
    /// A position spanning from the start of `self` to the end of `end` (same file assumed).
    pub fn spanning(&self, end: &Position) -> Position {
        let stop = (end.offset + end.length).max(self.offset + self.length);
        Position {
            length: stop - self.offset,
            ..self.clone()
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line + 1, self.column + 1)
    }
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic with location information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{id}: {message}")]
pub struct Diagnostic {
    pub id: DiagnosticId,
    pub message: String,
    pub severity: Severity,
    pub position: Position,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(id: DiagnosticId, message: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            message: message.into(),
            severity: Severity::Error,
            position,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn warning(id: DiagnosticId, message: impl Into<String>, position: Position) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(id, message, position)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Move this diagnostic to `position`, remembering where it originally pointed.
    pub fn relocate(mut self, position: &Position) -> Self {
        if self.position == *position {
            return self;
        }
        let origin = std::mem::replace(&mut self.position, position.clone());
        self.notes.push(format!("raised in included source at {origin}"));
        self
    }

    /// Shorthand for `self.id.code()`.
    pub fn code(&self) -> &'static str {
        self.id.code()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl miette::Diagnostic for Diagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.id.code()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Info => miette::Severity::Advice,
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.hints.is_empty() && self.notes.is_empty() {
            return None;
        }
        let lines: Vec<&str> = self.notes.iter().chain(self.hints.iter()).map(String::as_str).collect();
        Some(Box::new(lines.join("\n")))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let span = miette::LabeledSpan::new(
            Some(self.id.name().to_string()),
            self.position.offset,
            self.position.length,
        );
        Some(Box::new(std::iter::once(span)))
    }
}

// ============================================================================
// Diagnostic catalog
// ============================================================================

/// Constructors for every diagnostic the front end emits.
pub mod errors {
    use super::*;
    use DiagnosticId as D;

    // ---- lexer ---------------------------------------------------------------

    pub fn unknown_character(c: char, position: Position) -> Diagnostic {
        Diagnostic::new(D::UnknownCharacter, format!("Unknown character [{c}]"), position)
    }

    pub fn unterminated_string(quote: char, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::UnterminatedString,
            format!("Unterminated String literal, expecting closing [{quote}]"),
            position,
        )
    }

    pub fn invalid_identifier(reason: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::InvalidIdentifier, reason.to_string(), position)
    }

    // ---- structure -----------------------------------------------------------

    pub fn internal(message: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::Internal, message.to_string(), position)
    }

    pub fn no_define_data_found(position: Position) -> Diagnostic {
        Diagnostic::new(D::NoDefineDataFound, "DEFINE DATA is missing", position)
    }

    pub fn missing_end_define(position: Position) -> Diagnostic {
        Diagnostic::new(D::MissingEndDefine, "Expected END-DEFINE", position)
    }

    pub fn unexpected_token(expected: &str, found: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::UnexpectedToken,
            format!("Unexpected token {found}, expected {expected}"),
            position,
        )
    }

    pub fn unexpected_end_of_input(expected: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::UnexpectedToken,
            format!("Unexpected end of input, expected {expected}"),
            position,
        )
    }

    pub fn expected_identifier(found: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::UnexpectedTokenExpectedIdentifier,
            format!("Unexpected token {found}, expected identifier"),
            position,
        )
    }

    pub fn expected_operand(found: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::UnexpectedTokenExpectedOperand,
            format!("Unexpected token {found}, expected operand"),
            position,
        )
    }

    pub fn trailing_token(found: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::TrailingToken, format!("Trailing token {found} is not allowed here"), position)
    }

    pub fn unclosed_statement(statement: &str, terminator: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::UnclosedStatement,
            format!("{statement} is missing its closing {terminator}"),
            position,
        )
    }

    pub fn statement_has_empty_body(statement: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::StatementHasEmptyBody,
            format!("{statement} needs at least one statement in its body"),
            position,
        )
        .with_hint("Use IGNORE to express an intentionally empty body")
    }

    pub fn decide_misses_none_branch(position: Position) -> Diagnostic {
        Diagnostic::new(
            D::DecideMissesNoneBranch,
            "DECIDE needs a NONE branch",
            position,
        )
        .with_hint("Add NONE IGNORE if nothing should happen")
    }

    pub fn unsupported_programming_mode(mode: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::UnsupportedProgrammingMode,
            format!("Programming mode {mode} is not supported, only structured mode is parsed"),
            position,
        )
    }

    pub fn invalid_scope_for_file_type(scope: &str, file_type: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::InvalidScopeForFileType,
            format!("Scope {scope} is not allowed in a {file_type}"),
            position,
        )
    }

    pub fn source_after_end(position: Position) -> Diagnostic {
        Diagnostic::new(
            D::NoSourceAllowedAfterEndStatement,
            "No source is allowed after the END statement",
            position,
        )
    }

    pub fn end_statement_missing(position: Position) -> Diagnostic {
        Diagnostic::new(D::EndStatementMissing, "END statement is missing", position)
    }

    pub fn cyclomatic_include(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::CyclomaticInclude,
            format!("Copycode {name} includes itself, directly or indirectly"),
            position,
        )
    }

    pub fn include_too_deep(name: &str, depth: usize, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::CyclomaticInclude,
            format!("Copycode {name} exceeds the maximum include depth of {depth}"),
            position,
        )
    }

    // ---- declarations --------------------------------------------------------

    pub fn invalid_data_type_for_dynamic_length(position: Position) -> Diagnostic {
        Diagnostic::new(
            D::InvalidDataTypeForDynamicLength,
            "Dynamic length is only allowed for formats A, B and U",
            position,
        )
    }

    pub fn variable_length_missing(variable: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::VariableLengthMissing,
            format!("Length for variable {variable} is missing"),
            position,
        )
    }

    pub fn initial_value_type_mismatch(expected: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::InitialValueTypeMismatch,
            format!("Type mismatch on initial value. Got literal that is not {expected}"),
            position,
        )
    }

    pub fn empty_initial_value(position: Position) -> Diagnostic {
        Diagnostic::new(D::EmptyInitialValue, "Initial value is empty", position)
    }

    pub fn dynamic_and_fixed_length(position: Position) -> Diagnostic {
        Diagnostic::new(
            D::DynamicAndFixedLength,
            "Variable can't have a fixed length and be DYNAMIC at the same time",
            position,
        )
    }

    pub fn invalid_array_bound(message: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::InvalidArrayBound, message.to_string(), position)
    }

    pub fn incomplete_array_definition(position: Position) -> Diagnostic {
        Diagnostic::new(
            D::IncompleteArrayDefinition,
            "Array definition is incomplete, expected bounds after /",
            position,
        )
    }

    pub fn independent_variables_naming(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::IndependentVariablesNaming,
            format!("Independent variable {name} must start with +"),
            position,
        )
    }

    pub fn independent_cannot_be_group(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::IndependentCannotBeGroup,
            format!("Independent variable {name} can't be a group"),
            position,
        )
    }

    pub fn group_cannot_be_empty(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::GroupCannotBeEmpty,
            format!("Group {name} can't be empty"),
            position,
        )
    }

    pub fn no_target_variable_for_redefine_found(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::NoTargetVariableForRedefineFound,
            format!("No target variable {name} found for REDEFINE"),
            position,
        )
    }

    pub fn redefine_length_exceeds_target_length(name: &str, total: u32, target: u32, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::RedefineLengthExceedsTargetLength,
            format!("Length of redefinition for {name} ({total} bytes) exceeds target length ({target} bytes)"),
            position,
        )
    }

    pub fn unresolved_reference(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::UnresolvedReference, format!("Unresolved reference: {name}"), position)
    }

    pub fn field_not_in_record_definition(field: &str, ddm: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::UnresolvedReference,
            format!("Field {field} is not defined in DDM {ddm}"),
            position,
        )
    }

    pub fn array_dimension_must_be_const_or_init(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::ArrayDimensionMustBeConstOrInit,
            format!("Array dimension {name} must reference a CONST or INIT variable"),
            position,
        )
    }

    pub fn by_value_not_allowed_in_scope(scope: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::ByValueNotAllowedInScope,
            format!("BY VALUE is only allowed in PARAMETER scope, not {scope}"),
            position,
        )
    }

    pub fn optional_not_allowed_in_scope(scope: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::OptionalNotAllowedInScope,
            format!("OPTIONAL is only allowed in PARAMETER scope, not {scope}"),
            position,
        )
    }

    pub fn filler_missing_x(position: Position) -> Diagnostic {
        Diagnostic::new(D::FillerMissingX, "FILLER is missing its X, e.g. FILLER 5X", position)
    }

    pub fn redefine_target_cant_be_x_array(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::RedefineTargetCantBeXArray,
            format!("Variable {name} has an unbound dimension and can't be redefined"),
            position,
        )
    }

    pub fn redefine_target_cant_be_dynamic(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::RedefineTargetCantBeDynamic,
            format!("Variable {name} is DYNAMIC and can't be redefined"),
            position,
        )
    }

    pub fn redefine_target_cant_contain_dynamic(name: &str, member: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::RedefineTargetCantContainDynamic,
            format!("Group {name} contains the DYNAMIC variable {member} and can't be redefined"),
            position,
        )
    }

    pub fn invalid_length_for_data_type(message: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::InvalidLengthForDataType, message.to_string(), position)
    }

    pub fn unresolved_module(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::UnresolvedModule, format!("Unresolved module: {name}"), position)
    }

    pub fn duplicated_symbol(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::DuplicatedSymbol,
            format!("Symbol {name} is declared more than once"),
            position,
        )
    }

    pub fn duplicated_import(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::DuplicatedImport,
            format!("{name} is imported more than once"),
            position,
        )
    }

    pub fn ambiguous_reference(name: &str, candidates: &[String], position: Position) -> Diagnostic {
        Diagnostic::new(
            D::AmbiguousVariableReference,
            format!("Reference {name} is ambiguous and needs qualification"),
            position,
        )
        .with_note(format!("Candidates: {}", candidates.join(", ")))
    }

    pub fn em_hd_pm_not_allowed_in_scope(scope: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::EmHdPmNotAllowedInScope,
            format!("EM, HD and PM are not allowed in {scope} scope"),
            position,
        )
    }

    pub fn group_has_mixed_const(name: &str, position: Position) -> Diagnostic {
        Diagnostic::new(
            D::GroupHasMixedConst,
            format!("Group {name} mixes CONST and non-CONST members"),
            position,
        )
    }

    // ---- semantic ------------------------------------------------------------

    pub fn type_mismatch(message: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::TypeMismatch, message.to_string(), position)
    }

    pub fn reference_not_mutable(message: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::ReferenceNotMutable, message.to_string(), position)
    }

    pub fn invalid_array_access(message: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::InvalidArrayAccess, message.to_string(), position)
    }

    pub fn invalid_literal_value(message: &str, position: Position) -> Diagnostic {
        Diagnostic::new(D::InvalidLiteralValue, message.to_string(), position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(offset: usize, line: u32) -> Position {
        Position {
            path: Arc::from(Path::new("TEST.NSN")),
            offset,
            line,
            column: 0,
            length: 3,
        }
    }

    #[test]
    fn display_uses_the_stable_code() {
        let diagnostic = errors::unresolved_module("MODULE", position(0, 0));
        assert_eq!(diagnostic.to_string(), "NPP026: Unresolved module: MODULE");
        assert_eq!(diagnostic.code(), "NPP026");
        assert!(diagnostic.is_error());
    }

    #[test]
    fn relocation_keeps_the_origin_as_note() {
        let relocated = errors::unresolved_reference("#X", position(10, 4)).relocate(&position(0, 0));
        assert_eq!(relocated.position.line, 0);
        assert_eq!(relocated.notes, vec!["raised in included source at TEST.NSN:5:1".to_string()]);
    }

    #[test]
    fn spanning_covers_both_positions() {
        let span = position(2, 0).spanning(&position(10, 0));
        assert_eq!(span.offset, 2);
        assert_eq!(span.length, 11);
    }
}
