//! Diagnostic id vocabulary.
//!
//! Every diagnostic the front end emits carries a stable id of the form `<component><number>`: lexer diagnostics
//! are `NPLxxx`, parser and semantic diagnostics `NPPxxx`. Tooling (editors, linters, suppression comments) keys on
//! these codes, so they must never be renumbered.
//!
//! ## Examples
//! ```rust
//! use natfront_core::lang::errors::{self, DiagnosticId};
//!
//! assert_eq!(DiagnosticId::DuplicatedSymbol.code(), "NPP027");
//! assert_eq!(errors::from_code("NPL002"), Some(DiagnosticId::UnterminatedString));
//! assert!(DiagnosticId::UnresolvedModule.is_unresolved());
//! ```

/// Which front-end component emits a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticComponent {
    Lexer,
    Parser,
}

/// Stable identifier for every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticId {
    // Lexer
    UnknownCharacter,
    UnterminatedString,
    InvalidIdentifier,

    // Parser / semantic
    Internal,
    NoDefineDataFound,
    MissingEndDefine,
    UnexpectedToken,
    InvalidDataTypeForDynamicLength,
    VariableLengthMissing,
    InitialValueTypeMismatch,
    EmptyInitialValue,
    DynamicAndFixedLength,
    InvalidArrayBound,
    IncompleteArrayDefinition,
    IndependentVariablesNaming,
    IndependentCannotBeGroup,
    GroupCannotBeEmpty,
    NoTargetVariableForRedefineFound,
    RedefineLengthExceedsTargetLength,
    UnresolvedReference,
    ArrayDimensionMustBeConstOrInit,
    ByValueNotAllowedInScope,
    OptionalNotAllowedInScope,
    TrailingToken,
    FillerMissingX,
    RedefineTargetCantBeXArray,
    RedefineTargetCantBeDynamic,
    RedefineTargetCantContainDynamic,
    InvalidLengthForDataType,
    UnresolvedModule,
    DuplicatedSymbol,
    DuplicatedImport,
    AmbiguousVariableReference,
    UnclosedStatement,
    InvalidPrinterOutputFormat,
    InvalidLengthForLiteral,
    ExtendedRelationalExpressionNeedsEqual,
    InvalidMaskOrScanComparisonOperator,
    InvalidOperand,
    CompressHasLeavingNoAndDelimiters,
    TypeMismatch,
    InvalidLiteralValue,
    ReferenceNotMutable,
    UnsupportedProgrammingMode,
    InvalidModuleType,
    InvalidArrayAccess,
    StatementHasEmptyBody,
    DecideMissesNoneBranch,
    EmHdPmNotAllowedInScope,
    GroupHasMixedConst,
    CyclomaticInclude,
    UnexpectedTokenExpectedIdentifier,
    UnexpectedTokenExpectedOperand,
    InvalidScopeForFileType,
    VariableQualificationNotAllowed,
    InvalidInputStatementAttribute,
    InvalidInputElementAttribute,
    NoSourceAllowedAfterEndStatement,
    EndStatementMissing,
    ErrorInConstructionOfDecide,
}

/// Metadata for a diagnostic id.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticInfo {
    pub id: DiagnosticId,
    pub code: &'static str,
    pub name: &'static str,
    pub component: DiagnosticComponent,
}

use DiagnosticComponent::{Lexer, Parser};
use DiagnosticId as D;

/// Registry of all diagnostic ids, in [`DiagnosticId`] order.
pub const DIAGNOSTICS: &[DiagnosticInfo] = &[
    info(D::UnknownCharacter, "NPL001", "unknown-character", Lexer),
    info(D::UnterminatedString, "NPL002", "unterminated-string", Lexer),
    info(D::InvalidIdentifier, "NPL003", "invalid-identifier", Lexer),
    info(D::Internal, "NPP000", "internal", Parser),
    info(D::NoDefineDataFound, "NPP001", "no-define-data-found", Parser),
    info(D::MissingEndDefine, "NPP002", "missing-end-define", Parser),
    info(D::UnexpectedToken, "NPP003", "unexpected-token", Parser),
    info(D::InvalidDataTypeForDynamicLength, "NPP004", "invalid-data-type-for-dynamic-length", Parser),
    info(D::VariableLengthMissing, "NPP005", "variable-length-missing", Parser),
    info(D::InitialValueTypeMismatch, "NPP006", "initial-value-type-mismatch", Parser),
    info(D::EmptyInitialValue, "NPP007", "empty-initial-value", Parser),
    info(D::DynamicAndFixedLength, "NPP008", "dynamic-and-fixed-length", Parser),
    info(D::InvalidArrayBound, "NPP009", "invalid-array-bound", Parser),
    info(D::IncompleteArrayDefinition, "NPP010", "incomplete-array-definition", Parser),
    info(D::IndependentVariablesNaming, "NPP011", "independent-variables-naming", Parser),
    info(D::IndependentCannotBeGroup, "NPP012", "independent-cannot-be-group", Parser),
    info(D::GroupCannotBeEmpty, "NPP013", "group-cannot-be-empty", Parser),
    info(D::NoTargetVariableForRedefineFound, "NPP014", "no-target-variable-for-redefine-found", Parser),
    info(D::RedefineLengthExceedsTargetLength, "NPP015", "redefine-length-exceeds-target-length", Parser),
    info(D::UnresolvedReference, "NPP016", "unresolved-reference", Parser),
    info(D::ArrayDimensionMustBeConstOrInit, "NPP017", "array-dimension-must-be-const-or-init", Parser),
    info(D::ByValueNotAllowedInScope, "NPP018", "by-value-not-allowed-in-scope", Parser),
    info(D::OptionalNotAllowedInScope, "NPP019", "optional-not-allowed-in-scope", Parser),
    info(D::TrailingToken, "NPP020", "trailing-token", Parser),
    info(D::FillerMissingX, "NPP021", "filler-missing-x", Parser),
    info(D::RedefineTargetCantBeXArray, "NPP022", "redefine-target-cant-be-x-array", Parser),
    info(D::RedefineTargetCantBeDynamic, "NPP023", "redefine-target-cant-be-dynamic", Parser),
    info(D::RedefineTargetCantContainDynamic, "NPP024", "redefine-target-cant-contain-dynamic", Parser),
    info(D::InvalidLengthForDataType, "NPP025", "invalid-length-for-data-type", Parser),
    info(D::UnresolvedModule, "NPP026", "unresolved-module", Parser),
    info(D::DuplicatedSymbol, "NPP027", "duplicated-symbol", Parser),
    info(D::DuplicatedImport, "NPP028", "duplicated-import", Parser),
    info(D::AmbiguousVariableReference, "NPP029", "ambiguous-variable-reference", Parser),
    info(D::UnclosedStatement, "NPP030", "unclosed-statement", Parser),
    info(D::InvalidPrinterOutputFormat, "NPP031", "invalid-printer-output-format", Parser),
    info(D::InvalidLengthForLiteral, "NPP032", "invalid-length-for-literal", Parser),
    info(D::ExtendedRelationalExpressionNeedsEqual, "NPP033", "extended-relational-expression-needs-equal", Parser),
    info(D::InvalidMaskOrScanComparisonOperator, "NPP034", "invalid-mask-or-scan-comparison-operator", Parser),
    info(D::InvalidOperand, "NPP035", "invalid-operand", Parser),
    info(D::CompressHasLeavingNoAndDelimiters, "NPP036", "compress-has-leaving-no-and-delimiters", Parser),
    info(D::TypeMismatch, "NPP037", "type-mismatch", Parser),
    info(D::InvalidLiteralValue, "NPP038", "invalid-literal-value", Parser),
    info(D::ReferenceNotMutable, "NPP039", "reference-not-mutable", Parser),
    info(D::UnsupportedProgrammingMode, "NPP040", "unsupported-programming-mode", Parser),
    info(D::InvalidModuleType, "NPP041", "invalid-module-type", Parser),
    info(D::InvalidArrayAccess, "NPP042", "invalid-array-access", Parser),
    info(D::StatementHasEmptyBody, "NPP043", "statement-has-empty-body", Parser),
    info(D::DecideMissesNoneBranch, "NPP044", "decide-misses-none-branch", Parser),
    info(D::EmHdPmNotAllowedInScope, "NPP045", "emhdpm-not-allowed-in-scope", Parser),
    info(D::GroupHasMixedConst, "NPP046", "group-has-mixed-const", Parser),
    info(D::CyclomaticInclude, "NPP047", "cyclomatic-include", Parser),
    info(D::UnexpectedTokenExpectedIdentifier, "NPP048", "unexpected-token-expected-identifier", Parser),
    info(D::UnexpectedTokenExpectedOperand, "NPP049", "unexpected-token-expected-operand", Parser),
    info(D::InvalidScopeForFileType, "NPP050", "invalid-scope-for-file-type", Parser),
    info(D::VariableQualificationNotAllowed, "NPP051", "variable-qualification-not-allowed", Parser),
    info(D::InvalidInputStatementAttribute, "NPP052", "invalid-input-statement-attribute", Parser),
    info(D::InvalidInputElementAttribute, "NPP053", "invalid-input-element-attribute", Parser),
    info(D::NoSourceAllowedAfterEndStatement, "NPP054", "no-source-allowed-after-end-statement", Parser),
    info(D::EndStatementMissing, "NPP055", "end-statement-missing", Parser),
    info(D::ErrorInConstructionOfDecide, "NPP056", "error-in-construction-of-decide", Parser),
];

impl DiagnosticId {
    /// The stable code, e.g. `NPP027`.
    pub fn code(self) -> &'static str {
        info_for(self).code
    }

    /// A kebab-case name for humans and suppression comments.
    pub fn name(self) -> &'static str {
        info_for(self).name
    }

    /// The component that emits this diagnostic.
    pub fn component(self) -> DiagnosticComponent {
        info_for(self).component
    }

    /// Return `true` for ids that mean "a symbol or module could not be found".
    pub fn is_unresolved(self) -> bool {
        matches!(self, DiagnosticId::UnresolvedReference | DiagnosticId::UnresolvedModule)
    }
}

impl std::fmt::Display for DiagnosticId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Full metadata.
pub fn info_for(id: DiagnosticId) -> &'static DiagnosticInfo {
    &DIAGNOSTICS[id as usize]
}

/// Lookup by code (`NPP027`).
pub fn from_code(code: &str) -> Option<DiagnosticId> {
    DIAGNOSTICS.iter().find(|d| d.code == code).map(|d| d.id)
}

const fn info(
    id: DiagnosticId,
    code: &'static str,
    name: &'static str,
    component: DiagnosticComponent,
) -> DiagnosticInfo {
    DiagnosticInfo {
        id,
        code,
        name,
        component,
    }
}
