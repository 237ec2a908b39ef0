// Parser core: parser state, options and the parse result.
//
// This file is `include!`'d into `crate::parser` to keep all parser methods in a single module.

/// Knobs for one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting of `INCLUDE`d copycodes before NPP047 is raised.
    pub max_include_depth: usize,
    /// Leave unresolved references of copycodes parsed on their own undiagnosed.
    pub suppress_copycode_unresolved: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_include_depth: 32,
            suppress_copycode_unresolved: true,
        }
    }
}

/// Everything a parse produced.
///
/// The tree owns every node; the ids below point into it.
#[derive(Debug)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    pub tokens: TokenList,
    pub diagnostics: Vec<Diagnostic>,
    pub define_data: Option<NodeId>,
    pub function: Option<NodeId>,
    pub body: Option<NodeId>,
    /// Variables, subroutines and function declarations, in declaration order.
    pub referencables: Vec<NodeId>,
    /// Variable references waiting for the module pass to bind them.
    pub unresolved: Vec<NodeId>,
}

/// A syntax error raised while parsing one construct.
///
/// The diagnostic is recorded when the error is created; callers only decide how to recover.
#[derive(Debug, Clone)]
pub(crate) struct ParseError {
    pub(crate) token: Option<Token>,
}

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Natural parser.
///
/// One parser handles one source file. Included copycodes and imported data areas are parsed by nested parsers
/// that borrow this parser's tree and hand it back when done, so every node ends up in a single arena.
pub struct Parser<'p> {
    tokens: TokenList,
    tree: SyntaxTree,
    provider: &'p dyn ModuleProvider,
    options: ParseOptions,
    diagnostics: Vec<Diagnostic>,
    /// Set while parsing an included copycode: where its diagnostics are reported.
    relocation: Option<Position>,
    /// Name of the module this parse started from, if known.
    root_module: Option<String>,
    /// Names of the copycodes and data areas currently being parsed, outermost first.
    include_stack: Vec<String>,
    define_data: Option<NodeId>,
    function: Option<NodeId>,
    body: Option<NodeId>,
    referencables: Vec<NodeId>,
    unresolved: Vec<NodeId>,
    /// `PERFORM`s of subroutines not (yet) declared in this module.
    internal_performs: Vec<NodeId>,
    /// Variables declared so far in the current `DEFINE DATA`, used for `CONST` bounds and `REDEFINE` targets.
    declared: Vec<NodeId>,
    /// Record definitions of the views declared so far.
    view_definitions: Vec<(NodeId, std::sync::Arc<RecordDefinition>)>,
}

impl<'p> Parser<'p> {
    /// Create a parser over `tokens`.
    pub fn new(tokens: TokenList, provider: &'p dyn ModuleProvider, options: ParseOptions) -> Self {
        Self {
            tokens,
            tree: SyntaxTree::new(),
            provider,
            options,
            diagnostics: Vec::new(),
            relocation: None,
            root_module: None,
            include_stack: Vec::new(),
            define_data: None,
            function: None,
            body: None,
            referencables: Vec::new(),
            unresolved: Vec::new(),
            internal_performs: Vec::new(),
            declared: Vec::new(),
            view_definitions: Vec::new(),
        }
    }

    /// Name the module being parsed, so an `INCLUDE` or `USING` of it is caught as a cycle.
    pub fn with_root_module(mut self, name: impl Into<String>) -> Self {
        self.root_module = Some(name.into());
        self
    }

    /// Return `true` if `name` is the root module or a copycode or data area being parsed around the cursor.
    fn is_being_parsed(&self, name: &str) -> bool {
        self.root_module.as_deref() == Some(name) || self.include_stack.iter().any(|entry| entry == name)
    }

    /// Create a parser for an included or imported source that writes into `tree`.
    fn nested(
        &mut self,
        tokens: TokenList,
        relocation: Option<Position>,
        name: String,
    ) -> Parser<'p> {
        let mut include_stack = self.include_stack.clone();
        include_stack.push(name);
        Parser {
            tokens,
            tree: std::mem::take(&mut self.tree),
            provider: self.provider,
            options: self.options,
            diagnostics: Vec::new(),
            relocation,
            root_module: self.root_module.clone(),
            include_stack,
            define_data: None,
            function: None,
            body: None,
            referencables: Vec::new(),
            unresolved: Vec::new(),
            internal_performs: Vec::new(),
            declared: Vec::new(),
            view_definitions: Vec::new(),
        }
    }

    /// Take the tree back from a nested parser.
    ///
    /// Declarations and pending references move over; the nested diagnostics (lexer and parser) are returned for
    /// the caller to keep or drop.
    fn absorb(&mut self, nested: Parser<'p>) -> Vec<Diagnostic> {
        let Parser {
            tokens,
            tree,
            diagnostics,
            referencables,
            unresolved,
            internal_performs,
            ..
        } = nested;
        self.tree = tree;
        self.referencables.extend(referencables);
        self.unresolved.extend(unresolved);
        self.internal_performs.extend(internal_performs);
        let mut all = tokens.diagnostics().to_vec();
        all.extend(diagnostics);
        all
    }

    /// Finish parsing: resolve `PERFORM`s and hand out the result.
    pub fn finish(mut self) -> ParseOutput {
        self.resolve_performs();
        let mut diagnostics = self.tokens.diagnostics().to_vec();
        diagnostics.append(&mut self.diagnostics);
        ParseOutput {
            tree: self.tree,
            tokens: self.tokens,
            diagnostics,
            define_data: self.define_data,
            function: self.function,
            body: self.body,
            referencables: self.referencables,
            unresolved: self.unresolved,
        }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn tokens(&self) -> &TokenList {
        &self.tokens
    }
}
