//! The per-module pipeline.
//!
//! A [`ModuleParser`] takes one source file through every front end stage and produces a [`NaturalModule`]: the
//! tokens, the syntax tree with bound references, the referencable declarations and every diagnostic that was raised
//! on the way.
//!
//! ## Notes
//!
//! - Stages run strictly in order. A stage the file type cannot have (a data area has no body, a record definition
//!   has neither declarations nor statements) is skipped, never treated as an error.
//! - Sources declaring REPORTING mode in their header are only lexed. NPP040 tells the user why nothing else was
//!   checked.
//! - Copycodes are checked in the context of the module including them. Parsed on their own, their unresolved
//!   references and modules are not reported (see [`ParseOptions::suppress_copycode_unresolved`]).
//!
//! ## Examples
//!
//! ```rust
//! use std::path::Path;
//! use natfront::frontend::module::ModuleParser;
//! use natfront::frontend::provider::EmptyProvider;
//! use natfront_core::lang::file_types::FileType;
//!
//! let source = "DEFINE DATA LOCAL\n1 #X (A5)\nEND-DEFINE\n#X := 'HELLO'\nEND\n";
//! let module = ModuleParser::new(&EmptyProvider).parse(Path::new("HELLO.NSP"), FileType::Program, source);
//! assert!(module.diagnostics.is_empty());
//! assert_eq!(module.name, "HELLO");
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use natfront_core::lang::file_types::FileType;

use crate::frontend::ast::{NodeId, SyntaxTree};
use crate::frontend::diagnostics::{Diagnostic, Position, errors};
use crate::frontend::lexer::{self, Comment, ProgrammingMode, SourceHeader};
use crate::frontend::parser::{ParseOptions, Parser};
use crate::frontend::provider::ModuleProvider;
use crate::frontend::symbols::Variable;
use crate::frontend::{resolver, typechecker};
use natfront_syntax::TokenList;

// ============================================================================
// Stages
// ============================================================================

/// Progress of a module through the pipeline.
///
/// ```text
/// Start → HeaderConsumed? → DeclarationParsed? → StatementsParsed → ReferencesResolved → TypeChecked → Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    HeaderConsumed,
    DeclarationParsed,
    StatementsParsed,
    ReferencesResolved,
    TypeChecked,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::HeaderConsumed => "header consumed",
            Stage::DeclarationParsed => "declaration parsed",
            Stage::StatementsParsed => "statements parsed",
            Stage::ReferencesResolved => "references resolved",
            Stage::TypeChecked => "type checked",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A path that does not name a Natural object.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ModuleError {
    #[error("{} has no Natural file extension", .path.display())]
    #[diagnostic(code(natfront::unknown_file_type), help("expected one of .NSP, .NSN, .NSS, .NSC, .NS7, .NSH, .NSM, .NSL, .NSA, .NSG, .NSD"))]
    UnknownFileType { path: PathBuf },
}

/// The file type of `path`, derived from its extension.
pub fn file_type_of(path: &Path) -> Result<FileType, ModuleError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(FileType::from_extension)
        .ok_or_else(|| ModuleError::UnknownFileType {
            path: path.to_path_buf(),
        })
}

/// Uppercased file stem, the name other modules use to refer to this one.
pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_ascii_uppercase())
        .unwrap_or_default()
}

// ============================================================================
// Module
// ============================================================================

/// One parsed and checked compilation unit.
#[derive(Debug)]
pub struct NaturalModule {
    /// Uppercased module name.
    pub name: String,
    pub path: PathBuf,
    pub file_type: FileType,
    pub header: SourceHeader,
    pub tokens: TokenList,
    pub tree: SyntaxTree,
    pub define_data: Option<NodeId>,
    /// `DEFINE FUNCTION` header of function modules. The return variable is one of its children.
    pub function: Option<NodeId>,
    pub body: Option<NodeId>,
    /// Variables, subroutines and function declarations, in declaration order.
    pub referencables: Vec<NodeId>,
    /// Lexical, syntactic and semantic diagnostics in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
    stage: Stage,
}

impl NaturalModule {
    fn lexed(path: &Path, file_type: FileType, tokens: TokenList) -> Self {
        Self {
            name: module_name(path),
            path: path.to_path_buf(),
            file_type,
            header: *tokens.source_header(),
            diagnostics: tokens.diagnostics().to_vec(),
            tokens,
            tree: SyntaxTree::new(),
            define_data: None,
            function: None,
            body: None,
            referencables: Vec::new(),
            stage: Stage::Start,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, stage: Stage) {
        tracing::debug!(module = %self.name, from = %self.stage, to = %stage, "stage transition");
        self.stage = stage;
    }

    pub fn comments(&self) -> &[Comment] {
        self.tokens.comments()
    }

    /// Return `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Declared variables in declaration order, including imported and function return variables.
    pub fn variables(&self) -> impl Iterator<Item = (NodeId, &Variable)> + '_ {
        self.referencables
            .iter()
            .filter_map(|node| self.tree.variable(*node).map(|variable| (*node, variable)))
    }

    /// First variable declared as `name` (case-insensitive), or with that qualified name.
    pub fn find_variable(&self, name: &str) -> Option<(NodeId, &Variable)> {
        let name = name.to_ascii_uppercase();
        self.variables()
            .find(|(node, variable)| variable.name == name || self.tree.qualified_name(*node) == Some(name.as_str()))
    }

    /// Outline of the function header, the define data and the body.
    pub fn outline(&self) -> String {
        [self.function, self.define_data, self.body]
            .into_iter()
            .flatten()
            .map(|root| self.tree.outline(root))
            .collect()
    }

    fn start_position(&self) -> Position {
        self.tokens
            .all_tokens()
            .first()
            .map(|token| Position { length: 0, ..token.position() })
            .unwrap_or_else(|| Position {
                path: Arc::from(self.path.as_path()),
                offset: 0,
                line: 0,
                column: 0,
                length: 0,
            })
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Runs the front end pipeline for single modules.
///
/// The parser itself holds no per-module state, so one instance can parse any number of modules, also from several
/// threads at once as long as the provider allows it.
#[derive(Clone, Copy)]
pub struct ModuleParser<'p> {
    provider: &'p dyn ModuleProvider,
    options: ParseOptions,
}

impl<'p> ModuleParser<'p> {
    pub fn new(provider: &'p dyn ModuleProvider) -> Self {
        Self {
            provider,
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the file at `path`, taking the file type from its extension.
    pub fn parse_file(&self, path: &Path, source: &str) -> Result<NaturalModule, ModuleError> {
        let file_type = file_type_of(path)?;
        Ok(self.parse(path, file_type, source))
    }

    /// Run every stage on `source`.
    #[tracing::instrument(skip_all, fields(module = %module_name(path), file_type = ?file_type))]
    pub fn parse(&self, path: &Path, file_type: FileType, source: &str) -> NaturalModule {
        let tokens = lexer::lex(source, path);
        let mut module = NaturalModule::lexed(path, file_type, tokens);

        if module.header.mode == ProgrammingMode::Reporting {
            let position = module.start_position();
            module.diagnostics.push(errors::unsupported_programming_mode("REPORTING", position));
            module.advance(Stage::Done);
            return module;
        }
        if !file_type.can_have_define_data() && !file_type.can_have_body() {
            module.advance(Stage::Done);
            return module;
        }

        let unresolved = self.parse_sections(&mut module);
        self.resolve(&mut module, &unresolved);
        self.check(&mut module);
        module.advance(Stage::Done);
        module
    }

    /// Header, `DEFINE DATA` and body. Returns the references left for resolution.
    fn parse_sections(&self, module: &mut NaturalModule) -> Vec<NodeId> {
        let file_type = module.file_type;
        let placeholder = TokenList::from_tokens(Arc::from(module.path.as_path()), Vec::new());
        let tokens = std::mem::replace(&mut module.tokens, placeholder);
        let mut parser = Parser::new(tokens, self.provider, self.options).with_root_module(module.name.clone());
        let mut missing_define_data = false;

        if file_type == FileType::Function && parser.parse_function_header().is_some() {
            module.advance(Stage::HeaderConsumed);
        }
        if file_type.can_have_define_data() {
            if parser.advance_to_define_data() {
                parser.parse_define_data(file_type);
                module.advance(Stage::DeclarationParsed);
            } else if file_type.is_data_area() {
                missing_define_data = true;
            }
        }
        if file_type.can_have_body() && !file_type.is_data_area() {
            parser.parse_body(file_type);
            module.advance(Stage::StatementsParsed);
        }

        let output = parser.finish();
        module.tokens = output.tokens;
        module.tree = output.tree;
        module.define_data = output.define_data;
        module.function = output.function;
        module.body = output.body;
        module.referencables = output.referencables;
        // The parser reports lexer diagnostics together with its own.
        module.diagnostics = output.diagnostics;
        if missing_define_data {
            let position = module.start_position();
            module.diagnostics.push(errors::no_define_data_found(position));
        }
        output.unresolved
    }

    fn resolve(&self, module: &mut NaturalModule, unresolved: &[NodeId]) {
        let context = resolver::ResolveContext {
            module_name: &module.name,
            file_type: module.file_type,
            provider: self.provider,
        };
        let diagnostics = resolver::resolve(&mut module.tree, &module.referencables, unresolved, &context);
        module.diagnostics.extend(diagnostics);

        if module.file_type == FileType::Copycode && self.options.suppress_copycode_unresolved {
            let before = module.diagnostics.len();
            module.diagnostics.retain(|diagnostic| !diagnostic.id.is_unresolved());
            tracing::trace!(suppressed = before - module.diagnostics.len(), "copycode unresolved diagnostics dropped");
        }
        module.advance(Stage::ReferencesResolved);
    }

    fn check(&self, module: &mut NaturalModule) {
        let roots: Vec<NodeId> = [module.function, module.define_data, module.body].into_iter().flatten().collect();
        let diagnostics = typechecker::check(&module.tree, &roots);
        module.diagnostics.extend(diagnostics);
        module.advance(Stage::TypeChecked);
    }
}

/// Parse `source` as the module at `path` with default options.
pub fn parse_module(path: &Path, source: &str, provider: &dyn ModuleProvider) -> Result<NaturalModule, ModuleError> {
    ModuleParser::new(provider).parse_file(path, source)
}
