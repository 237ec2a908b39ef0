//! Syntax tree for Natural modules.
//!
//! The tree is an arena: every node lives in [`SyntaxTree`] and is addressed by a [`NodeId`]. Nodes own their
//! children exclusively (single parent). Symbol references (a variable reference pointing at its declaration, a
//! `PERFORM` pointing at its subroutine) are *non-owning* links kept in both directions: the reference node stores
//! its target, the declaration stores the set of nodes referring to it.
//!
//! ## Notes
//! - Every token the parser consumes is attached as a [`NodeKind::Token`] leaf, so a node's position is the span
//!   from its first to its last descendant token.
//! - Payload fields holding `NodeId`s always point at children of the same node.
//! - [`SyntaxTree::bind`], [`SyntaxTree::unbind`] and [`SyntaxTree::remove`] keep both directions of a reference
//!   in sync.
//!
//! ## Examples
//! ```rust
//! use natfront_syntax::ast::{NodeKind, SyntaxTree};
//!
//! let mut tree = SyntaxTree::new();
//! let list = tree.alloc(NodeKind::StatementList, None);
//! let ignore = tree.alloc(NodeKind::Ignore, Some(list));
//! assert_eq!(tree.parent(ignore), Some(list));
//! assert_eq!(tree.children(list), &[ignore]);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use natfront_core::lang::keywords::{self, KeywordId};
use natfront_core::lang::operators::{self, OperatorId};
use natfront_core::lang::system::{self, SystemId};

use crate::diagnostics::Position;
use crate::lexer::Token;
use crate::provider::ModuleRef;
use crate::symbols::{Variable, VariableScope};

/// Handle of a node inside a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Node payloads
// ============================================================================

/// `CALLNAT` or `FETCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleCallKind {
    Callnat,
    Fetch,
}

/// Which database access statement opens a view loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Find,
    Read,
    Histogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationKind {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Write,
    Display,
    Print,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayResizeKind {
    Expand,
    Reduce,
    Resize,
}

/// `ASSIGN`, `COMPUTE` or a bare `:=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    Assign,
    Compute,
    Bare,
}

/// Kind and payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A consumed token.
    Token(Token),

    // ========== Declarations ==========
    DefineData,
    /// `LOCAL USING name`; the data area's scope node becomes a child.
    Using {
        scope: VariableScope,
        target: Token,
        module: Option<ModuleRef>,
    },
    Scope(VariableScope),
    Variable(Box<Variable>),
    /// `DEFINE FUNCTION name RETURNS ...`; the return variable is a child.
    DefineFunction {
        name: Token,
        return_variable: Option<NodeId>,
    },

    // ========== Statements ==========
    StatementList,
    ModuleCall {
        kind: ModuleCallKind,
        target: Token,
        module: Option<ModuleRef>,
    },
    Include {
        target: Token,
        module: Option<ModuleRef>,
        body: Option<NodeId>,
    },
    Ignore,
    End,
    Subroutine {
        name: Token,
        body: Option<NodeId>,
        references: BTreeSet<NodeId>,
    },
    InternalPerform {
        name: Token,
        reference: Option<NodeId>,
    },
    ExternalPerform {
        name: Token,
        module: Option<ModuleRef>,
    },
    /// `NAME(<...>)`; arguments are the operand children.
    FunctionCall {
        name: Token,
        module: Option<ModuleRef>,
        arguments: Vec<NodeId>,
    },
    ForLoop {
        variable: Option<NodeId>,
        lower: Option<NodeId>,
        upper: Option<NodeId>,
        step: Option<NodeId>,
        body: Option<NodeId>,
    },
    If {
        condition: Option<NodeId>,
        body: Option<NodeId>,
        else_body: Option<NodeId>,
    },
    IfNoRecord {
        body: Option<NodeId>,
    },
    Access {
        kind: AccessKind,
        view: Option<NodeId>,
        body: Option<NodeId>,
    },
    Repeat {
        body: Option<NodeId>,
    },
    DecideOn {
        operand: Option<NodeId>,
        branches: Vec<NodeId>,
        none: Option<NodeId>,
    },
    DecideFor {
        branches: Vec<NodeId>,
        none: Option<NodeId>,
    },
    /// `VALUE ...` or `WHEN ...` branch of a `DECIDE`.
    DecideBranch {
        values: Vec<NodeId>,
        body: Option<NodeId>,
    },
    Assignment {
        kind: AssignmentKind,
        target: Option<NodeId>,
        value: Option<NodeId>,
    },
    Move {
        source: Option<NodeId>,
        targets: Vec<NodeId>,
    },
    Reset {
        initial: bool,
        targets: Vec<NodeId>,
    },
    Calculation {
        kind: CalculationKind,
        operands: Vec<NodeId>,
        target: Option<NodeId>,
        giving: Option<NodeId>,
        remainder: Option<NodeId>,
    },
    WriteWork {
        variable: bool,
        operands: Vec<NodeId>,
    },
    Output {
        kind: OutputKind,
        operands: Vec<NodeId>,
    },
    ArrayResize {
        kind: ArrayResizeKind,
        array: Option<NodeId>,
    },
    Escape,
    SetKey,
    /// Statements without operands the front end cares about (`NEWPAGE`, `STOP`, unknown ones).
    Simple(KeywordId),

    // ========== Operands ==========
    VariableReference {
        name: Token,
        indices: Vec<NodeId>,
        reference: Option<NodeId>,
    },
    Literal(Token),
    SystemVariable(SystemId),
    SystemFunction {
        function: SystemId,
        arguments: Vec<NodeId>,
    },
    Arithmetic {
        lhs: NodeId,
        op: OperatorId,
        rhs: NodeId,
    },
    /// `lower:upper` inside an array access; `None` stands for `*`.
    RangedAccess {
        lower: Option<NodeId>,
        upper: Option<NodeId>,
    },
    LabelReference(Token),
    Relational {
        lhs: NodeId,
        op: OperatorId,
        rhs: NodeId,
    },
    Logical {
        op: KeywordId,
        lhs: NodeId,
        rhs: NodeId,
    },
    Negation {
        operand: NodeId,
    },
    /// `VAL(...)`, `ABS(...)`, `POS(...)`.
    Intrinsic {
        function: KeywordId,
        argument: Option<NodeId>,
    },
}

impl NodeKind {
    /// Short label used by tree outlines.
    pub fn label(&self) -> String {
        match self {
            NodeKind::Token(token) => format!("Token {}", token.text),
            NodeKind::DefineData => "DefineData".to_string(),
            NodeKind::Using { scope, target, .. } => format!("Using {scope} {}", target.symbol_name()),
            NodeKind::Scope(scope) => format!("Scope {scope}"),
            NodeKind::Variable(variable) => {
                let detail = match &variable.kind {
                    crate::symbols::VariableKind::Typed(typed) => typed.ty.to_string(),
                    crate::symbols::VariableKind::Group => "group".to_string(),
                    crate::symbols::VariableKind::View { ddm } => format!("view of {}", ddm.symbol_name()),
                    crate::symbols::VariableKind::Redefinition { .. } => "redefinition".to_string(),
                };
                let dimensions: Vec<String> = variable.dimensions.iter().map(ToString::to_string).collect();
                if dimensions.is_empty() {
                    format!("Variable {} {} {detail}", variable.level, variable.name)
                } else {
                    format!("Variable {} {} {detail} /{}", variable.level, variable.name, dimensions.join(","))
                }
            }
            NodeKind::DefineFunction { name, .. } => format!("DefineFunction {}", name.symbol_name()),
            NodeKind::StatementList => "StatementList".to_string(),
            NodeKind::ModuleCall { kind, target, module } => {
                let name = match kind {
                    ModuleCallKind::Callnat => "Callnat",
                    ModuleCallKind::Fetch => "Fetch",
                };
                format!("{name} {}{}", target.text, resolution(module.is_some()))
            }
            NodeKind::Include { target, module, .. } => {
                format!("Include {}{}", target.symbol_name(), resolution(module.is_some()))
            }
            NodeKind::Ignore => "Ignore".to_string(),
            NodeKind::End => "End".to_string(),
            NodeKind::Subroutine { name, .. } => format!("Subroutine {}", name.symbol_name()),
            NodeKind::InternalPerform { name, reference } => {
                format!("Perform {}{}", name.symbol_name(), resolution(reference.is_some()))
            }
            NodeKind::ExternalPerform { name, module } => {
                format!("ExternalPerform {}{}", name.symbol_name(), resolution(module.is_some()))
            }
            NodeKind::FunctionCall { name, module, .. } => {
                format!("FunctionCall {}{}", name.symbol_name(), resolution(module.is_some()))
            }
            NodeKind::ForLoop { .. } => "For".to_string(),
            NodeKind::If { .. } => "If".to_string(),
            NodeKind::IfNoRecord { .. } => "IfNoRecordsFound".to_string(),
            NodeKind::Access { kind, .. } => format!("{kind:?}"),
            NodeKind::Repeat { .. } => "Repeat".to_string(),
            NodeKind::DecideOn { .. } => "DecideOn".to_string(),
            NodeKind::DecideFor { .. } => "DecideFor".to_string(),
            NodeKind::DecideBranch { .. } => "Branch".to_string(),
            NodeKind::Assignment { .. } => "Assignment".to_string(),
            NodeKind::Move { .. } => "Move".to_string(),
            NodeKind::Reset { initial, .. } => {
                if *initial {
                    "Reset Initial".to_string()
                } else {
                    "Reset".to_string()
                }
            }
            NodeKind::Calculation { kind, .. } => format!("{kind:?}"),
            NodeKind::WriteWork { variable, .. } => {
                if *variable {
                    "WriteWork Variable".to_string()
                } else {
                    "WriteWork".to_string()
                }
            }
            NodeKind::Output { kind, .. } => format!("{kind:?}"),
            NodeKind::ArrayResize { kind, .. } => format!("{kind:?}"),
            NodeKind::Escape => "Escape".to_string(),
            NodeKind::SetKey => "SetKey".to_string(),
            NodeKind::Simple(keyword) => keywords::as_str(*keyword).to_string(),
            NodeKind::VariableReference { name, reference, .. } => {
                format!("Reference {}{}", name.symbol_name(), resolution(reference.is_some()))
            }
            NodeKind::Literal(token) => format!("Literal {}", token.text),
            NodeKind::SystemVariable(id) => format!("SystemVariable *{}", system::as_str(*id)),
            NodeKind::SystemFunction { function, .. } => format!("SystemFunction *{}", system::as_str(*function)),
            NodeKind::Arithmetic { op, .. } => format!("Arithmetic {}", operators::as_str(*op)),
            NodeKind::RangedAccess { .. } => "Range".to_string(),
            NodeKind::LabelReference(token) => format!("Label {}", token.symbol_name()),
            NodeKind::Relational { op, .. } => format!("Relational {}", operators::as_str(*op)),
            NodeKind::Logical { op, .. } => format!("Logical {}", keywords::as_str(*op)),
            NodeKind::Negation { .. } => "Not".to_string(),
            NodeKind::Intrinsic { function, .. } => format!("Intrinsic {}", keywords::as_str(*function)),
        }
    }

    /// Return `true` for nodes other nodes can refer to (variables, subroutines, function declarations).
    pub fn is_referencable(&self) -> bool {
        matches!(
            self,
            NodeKind::Variable(_) | NodeKind::Subroutine { .. } | NodeKind::DefineFunction { .. }
        )
    }

    /// Return `true` for nodes that can point at a declaration.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            NodeKind::VariableReference { .. } | NodeKind::InternalPerform { .. }
        )
    }

    fn reference_target(&self) -> Option<NodeId> {
        match self {
            NodeKind::VariableReference { reference, .. } | NodeKind::InternalPerform { reference, .. } => *reference,
            _ => None,
        }
    }

    fn reference_target_mut(&mut self) -> Option<&mut Option<NodeId>> {
        match self {
            NodeKind::VariableReference { reference, .. } | NodeKind::InternalPerform { reference, .. } => {
                Some(reference)
            }
            _ => None,
        }
    }

    /// Nodes referring to this declaration.
    pub fn references(&self) -> Option<&BTreeSet<NodeId>> {
        match self {
            NodeKind::Variable(variable) => Some(&variable.references),
            NodeKind::Subroutine { references, .. } => Some(references),
            _ => None,
        }
    }

    fn references_mut(&mut self) -> Option<&mut BTreeSet<NodeId>> {
        match self {
            NodeKind::Variable(variable) => Some(&mut variable.references),
            NodeKind::Subroutine { references, .. } => Some(references),
            _ => None,
        }
    }
}

fn resolution(resolved: bool) -> &'static str {
    if resolved { "" } else { " (unresolved)" }
}

// ============================================================================
// Arena
// ============================================================================

/// A node in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Overrides where diagnostics about this node point.
    pub diagnostic_position: Option<Position>,
}

/// Arena of syntax nodes.
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and append it to `parent`'s children.
    pub fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
            diagnostic_position: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    /// Attach `token` as a leaf of `parent`.
    pub fn add_token(&mut self, parent: NodeId, token: Token) -> NodeId {
        self.alloc(NodeKind::Token(token), Some(parent))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Children that are not token leaves.
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| !matches!(self.kind(*child), NodeKind::Token(_)))
    }

    /// Parents of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |current| self.parent(*current))
    }

    /// `id` and all nodes below it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Tokens below `id` in source order.
    pub fn tokens(&self, id: NodeId) -> Vec<&Token> {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match self.kind(node) {
                NodeKind::Token(token) => Some(token),
                _ => None,
            })
            .collect()
    }

    pub fn first_token(&self, id: NodeId) -> Option<&Token> {
        self.descendants(id).into_iter().find_map(|node| match self.kind(node) {
            NodeKind::Token(token) => Some(token),
            _ => None,
        })
    }

    fn last_token(&self, id: NodeId) -> Option<&Token> {
        if let NodeKind::Token(token) = self.kind(id) {
            return Some(token);
        }
        self.children(id).iter().rev().find_map(|child| self.last_token(*child))
    }

    /// Span from the first to the last token below `id`.
    ///
    /// Tokens of included files are left out when the node also has tokens of its own file.
    pub fn position(&self, id: NodeId) -> Option<Position> {
        let first = self.first_token(id)?.position();
        let last = self.last_token(id)?.position();
        if first.path != last.path {
            return Some(first);
        }
        Some(first.spanning(&last))
    }

    /// Where diagnostics about `id` should point.
    pub fn diagnostic_position(&self, id: NodeId) -> Option<Position> {
        if let Some(position) = &self.node(id).diagnostic_position {
            return Some(position.clone());
        }
        match self.kind(id) {
            NodeKind::Variable(variable) => Some(variable.declaration.diagnostic_position()),
            NodeKind::VariableReference { name, .. } => Some(name.diagnostic_position()),
            _ => self.first_token(id).map(Token::diagnostic_position),
        }
    }

    pub fn set_diagnostic_position(&mut self, id: NodeId, position: Position) {
        self.nodes[id.index()].diagnostic_position = Some(position);
    }

    pub fn variable(&self, id: NodeId) -> Option<&Variable> {
        match self.kind(id) {
            NodeKind::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn variable_mut(&mut self, id: NodeId) -> Option<&mut Variable> {
        match self.kind_mut(id) {
            NodeKind::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Nearest ancestor that is a variable (the owning group of a member).
    pub fn owning_group(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|ancestor| self.variable(*ancestor).is_some())
    }

    /// `<level-1 ancestor>.<name>` for nested variables, the plain name at level 1.
    ///
    /// Computed once per variable; later calls return the cached value.
    pub fn qualified_name(&self, id: NodeId) -> Option<&str> {
        let variable = self.variable(id)?;
        Some(variable.qualified_name_or_init(|| {
            if variable.level == 1 {
                return variable.name.clone();
            }
            self.ancestors(id)
                .filter_map(|ancestor| self.variable(ancestor))
                .find(|ancestor| ancestor.level == 1)
                .map(|top| format!("{}.{}", top.name, variable.name))
                .unwrap_or_else(|| variable.name.clone())
        }))
    }

    /// Return `true` if `id` is a member (at any depth) of a view.
    pub fn is_in_view(&self, id: NodeId) -> bool {
        self.ancestors(id)
            .filter_map(|ancestor| self.variable(ancestor))
            .any(|ancestor| matches!(ancestor.kind, crate::symbols::VariableKind::View { .. }))
    }

    /// The declaration `reference` points at.
    pub fn reference_target(&self, reference: NodeId) -> Option<NodeId> {
        self.kind(reference).reference_target()
    }

    /// Link `reference` to `declaration` in both directions.
    ///
    /// An existing link of `reference` is dropped first.
    pub fn bind(&mut self, reference: NodeId, declaration: NodeId) -> bool {
        if !self.kind(reference).is_reference() || self.kind(declaration).references().is_none() {
            return false;
        }
        self.unbind(reference);
        if let Some(target) = self.kind_mut(reference).reference_target_mut() {
            *target = Some(declaration);
        }
        if let Some(references) = self.kind_mut(declaration).references_mut() {
            references.insert(reference);
        }
        true
    }

    /// Drop the link of `reference`, on both sides.
    pub fn unbind(&mut self, reference: NodeId) {
        let Some(declaration) = self.reference_target(reference) else {
            return;
        };
        if let Some(references) = self.kind_mut(declaration).references_mut() {
            references.remove(&reference);
        }
        if let Some(target) = self.kind_mut(reference).reference_target_mut() {
            *target = None;
        }
    }

    /// Detach `id` from its parent and drop every reference link into or out of its subtree.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.nodes[parent.index()].children.retain(|child| *child != id);
            self.nodes[id.index()].parent = None;
        }

        for node in self.descendants(id) {
            self.unbind(node);
            let referring: Vec<NodeId> = self
                .kind(node)
                .references()
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            for reference in referring {
                self.unbind(reference);
            }
        }
    }

    /// Move `id` under `new_parent`, appending it to the new parent's children.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.nodes[parent.index()].children.retain(|child| *child != id);
        }
        self.nodes[id.index()].parent = Some(new_parent);
        self.nodes[new_parent.index()].children.push(id);
    }

    /// Indented outline of the subtree below `id`, without token leaves.
    pub fn outline(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_outline(id, 0, &mut out);
        out
    }

    fn write_outline(&self, id: NodeId, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.kind(id).label());
        out.push('\n');
        for child in self.child_nodes(id) {
            self.write_outline(child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;
    use crate::symbols::VariableKind;
    use std::path::Path;
    use std::sync::Arc;

    fn token(text: &str, offset: usize) -> Token {
        Token {
            kind: TokenKind::Identifier,
            text: text.to_string(),
            offset,
            line: 0,
            column: offset as u32,
            length: text.len(),
            path: Arc::from(Path::new("T.NSN")),
            relocated: None,
        }
    }

    fn variable(tree: &mut SyntaxTree, name: &str, level: u32, parent: Option<NodeId>) -> NodeId {
        let variable = Variable::new(token(name, 0), level, VariableScope::Local, VariableKind::Group);
        tree.alloc(NodeKind::Variable(Box::new(variable)), parent)
    }

    fn reference(tree: &mut SyntaxTree, name: &str, parent: NodeId) -> NodeId {
        tree.alloc(
            NodeKind::VariableReference {
                name: token(name, 0),
                indices: Vec::new(),
                reference: None,
            },
            Some(parent),
        )
    }

    #[test]
    fn qualified_name_uses_the_top_level_group() {
        let mut tree = SyntaxTree::new();
        let group = variable(&mut tree, "#GRP", 1, None);
        let inner = variable(&mut tree, "#INNER", 2, Some(group));
        let leaf = variable(&mut tree, "#LEAF", 3, Some(inner));
        assert_eq!(tree.qualified_name(group), Some("#GRP"));
        assert_eq!(tree.qualified_name(leaf), Some("#GRP.#LEAF"));
        assert_eq!(tree.qualified_name(leaf), Some("#GRP.#LEAF"));
    }

    #[test]
    fn binding_is_bidirectional() {
        let mut tree = SyntaxTree::new();
        let declaration = variable(&mut tree, "#A", 1, None);
        let list = tree.alloc(NodeKind::StatementList, None);
        let first = reference(&mut tree, "#A", list);
        assert!(tree.bind(first, declaration));
        assert_eq!(tree.reference_target(first), Some(declaration));
        assert!(tree.kind(declaration).references().unwrap().contains(&first));

        tree.unbind(first);
        assert_eq!(tree.reference_target(first), None);
        assert!(tree.kind(declaration).references().unwrap().is_empty());
    }

    #[test]
    fn rebinding_moves_the_reference() {
        let mut tree = SyntaxTree::new();
        let a = variable(&mut tree, "#A", 1, None);
        let b = variable(&mut tree, "#B", 1, None);
        let list = tree.alloc(NodeKind::StatementList, None);
        let r = reference(&mut tree, "#A", list);
        tree.bind(r, a);
        tree.bind(r, b);
        assert!(tree.kind(a).references().unwrap().is_empty());
        assert_eq!(tree.kind(b).references().unwrap().len(), 1);
    }

    #[test]
    fn removing_a_statement_clears_its_references() {
        let mut tree = SyntaxTree::new();
        let declaration = variable(&mut tree, "#A", 1, None);
        let list = tree.alloc(NodeKind::StatementList, None);
        let statement = tree.alloc(NodeKind::Ignore, Some(list));
        let r = reference(&mut tree, "#A", statement);
        tree.bind(r, declaration);

        tree.remove(statement);
        assert!(tree.children(list).is_empty());
        assert!(tree.kind(declaration).references().unwrap().is_empty());
        assert_eq!(tree.reference_target(r), None);
    }

    #[test]
    fn removing_a_declaration_unbinds_its_users() {
        let mut tree = SyntaxTree::new();
        let declaration = variable(&mut tree, "#A", 1, None);
        let list = tree.alloc(NodeKind::StatementList, None);
        let r = reference(&mut tree, "#A", list);
        tree.bind(r, declaration);
        tree.remove(declaration);
        assert_eq!(tree.reference_target(r), None);
    }

    #[test]
    fn position_spans_first_to_last_token() {
        let mut tree = SyntaxTree::new();
        let list = tree.alloc(NodeKind::StatementList, None);
        let statement = tree.alloc(NodeKind::Ignore, Some(list));
        tree.add_token(statement, token("ABC", 2));
        tree.add_token(statement, token("DE", 10));
        let position = tree.position(list).unwrap();
        assert_eq!(position.offset, 2);
        assert_eq!(position.length, 10);
    }

    #[test]
    fn outline_skips_tokens() {
        let mut tree = SyntaxTree::new();
        let list = tree.alloc(NodeKind::StatementList, None);
        let statement = tree.alloc(NodeKind::Ignore, Some(list));
        tree.add_token(statement, token("IGNORE", 0));
        assert_eq!(tree.outline(list), "StatementList\n  Ignore\n");
    }
}
