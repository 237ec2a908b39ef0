//! Semantic checks over a parsed module with bound references.
//!
//! The checker visits every node below the given roots once, in pre-order, and reports what the parser cannot see
//! on its own because it needs the declaration behind a reference.
//!
//! ## What is validated
//!
//! - Statements never modify constants, unmodifiable system variables or operands that are not variables (NPP039)
//! - `DIVIDE ... REMAINDER` operands don't use array ranges (NPP037)
//! - `WRITE WORK` without `VARIABLE` only writes fixed-length data (NPP037)
//! - Alphanumeric initial values fit into their variable (NPP037)
//! - `DECIDE ON` values belong to the same family as the decided operand (NPP037)
//! - Array access matches the declaration: indices only for arrays and periodic groups, the right number of
//!   dimensions, no bare array where a single value is expected (NPP042)
//!
//! ## Notes
//!
//! - **Unbound references are skipped**: their absence is reported by the resolver already.
//! - **Error accumulation**: a failing check of one node is reported as NPP000 and checking carries on with the next.
//! - References below `FIND` are not checked for array access. DDM fields that are not declared in the view carry no
//!   dimensions, so every access would look wrong.
//!
//! ## See also
//!
//! - [`resolver`](super::resolver) binds the references this pass relies on

mod check_decl;
mod check_expr;
mod check_stmt;


use crate::frontend::ast::{NodeId, NodeKind, SyntaxTree};
use crate::frontend::diagnostics::{Diagnostic, Position, errors};

/// Failure while checking a single node.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CheckError {
    #[error("node {0} has no source position")]
    MissingPosition(NodeId),
    #[error("reference {reference} is bound to {target}, which is not a variable")]
    NotAVariable { reference: NodeId, target: NodeId },
}

/// Run every check below `roots` and return the diagnostics in visiting order.
#[tracing::instrument(skip_all, fields(roots = roots.len()))]
pub fn check(tree: &SyntaxTree, roots: &[NodeId]) -> Vec<Diagnostic> {
    let mut checker = TypeChecker::new(tree);
    for root in roots {
        checker.check_tree(*root);
    }
    tracing::debug!(diagnostics = checker.diagnostics.len(), "type check finished");
    checker.diagnostics
}

/// Type checker state: the tree under inspection and the diagnostics found so far.
pub(crate) struct TypeChecker<'t> {
    pub(crate) tree: &'t SyntaxTree,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'t> TypeChecker<'t> {
    pub(crate) fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            tree,
            diagnostics: Vec::new(),
        }
    }

    fn check_tree(&mut self, root: NodeId) {
        let tree = self.tree;
        for node in tree.descendants(root) {
            if let Err(error) = self.check_node(node) {
                self.report_internal(node, root, &error);
            }
        }
    }

    fn check_node(&mut self, node: NodeId) -> Result<(), CheckError> {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::Variable(_) => self.check_initial_values(node),
            NodeKind::Assignment { target, .. } => self.ensure_modifiable(*target),
            NodeKind::Move { targets, .. } | NodeKind::Reset { targets, .. } => {
                targets.iter().try_for_each(|target| self.ensure_modifiable(Some(*target)))
            }
            NodeKind::ForLoop { variable, .. } => self.ensure_modifiable(*variable),
            NodeKind::ArrayResize { array, .. } => self.ensure_modifiable(*array),
            NodeKind::Calculation { .. } => self.check_calculation(node),
            NodeKind::WriteWork { variable: false, operands } => self.check_write_work(operands),
            NodeKind::DecideOn { operand, branches, .. } => self.check_decide_on(*operand, branches),
            NodeKind::VariableReference { .. } => self.check_array_access(node),
            _ => Ok(()),
        }
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Where diagnostics about `node` point.
    pub(crate) fn position_of(&self, node: NodeId) -> Result<Position, CheckError> {
        self.tree
            .diagnostic_position(node)
            .ok_or(CheckError::MissingPosition(node))
    }

    fn report_internal(&mut self, node: NodeId, root: NodeId, error: &CheckError) {
        let position = self
            .tree
            .diagnostic_position(node)
            .or_else(|| self.tree.diagnostic_position(root));
        let Some(position) = position else {
            tracing::warn!(%node, %error, "type check failed on a node without position");
            return;
        };
        let message = format!(
            "Error while type checking for node: ({},{}:{}). {error}",
            self.tree.kind(node).label(),
            position.line + 1,
            position.column + 1
        );
        self.report(errors::internal(&message, position));
    }
}
