//! Binding of variable references to their declarations.
//!
//! The parser collects every variable reference it sees without binding it, because subroutines, copycodes and data
//! areas can declare names the parser has not reached yet. Once a module is fully parsed, [`resolve`] walks that list
//! and links each reference to the variable it names.
//!
//! ## Notes
//!
//! - Lookup is by exact (uppercased) name first, then by qualified name (`GROUP.MEMBER`).
//! - A name declared more than once is ambiguous (NPP029) unless every candidate lives in a view and exactly one of
//!   those views is read by an enclosing `FIND`, `READ` or `HISTOGRAM`.
//! - Historic prefixes are stripped and the lookup retried: `+NAME`, `C*NAME`, `T*NAME` and `P*NAME`.
//! - Fields of a view's record definition that the view does not declare are accepted without a binding. Search
//!   criteria may name any descriptor.
//! - Copycode parameters (`&1&`) are never reported, and a function module may refer to its own name.
//! - References that stay unresolved get NPP016. For references inside an included copycode the diagnostic points at
//!   the `INCLUDE` and keeps the original location as a note.

use std::collections::HashMap;

use natfront_core::lang::file_types::FileType;

use crate::frontend::ast::{NodeId, NodeKind, SyntaxTree};
use crate::frontend::diagnostics::{Diagnostic, errors};
use crate::frontend::provider::ModuleProvider;
use crate::frontend::symbols::VariableKind;

/// What the resolver needs to know about the module it works on.
pub struct ResolveContext<'a> {
    pub module_name: &'a str,
    pub file_type: FileType,
    pub provider: &'a dyn ModuleProvider,
}

/// Result of looking up one name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Bound,
    /// Known, but nothing to bind to (a DDM field the view leaves out).
    Accepted,
    Ambiguous(Vec<NodeId>),
    Missing,
}

/// Bind `unresolved` references against `referencables`, returning the diagnostics for what could not be bound.
#[tracing::instrument(skip_all, fields(module = %context.module_name, references = unresolved.len()))]
pub fn resolve(
    tree: &mut SyntaxTree,
    referencables: &[NodeId],
    unresolved: &[NodeId],
    context: &ResolveContext<'_>,
) -> Vec<Diagnostic> {
    let mut resolver = Resolver::new(tree, referencables, context);
    for reference in unresolved {
        resolver.resolve_reference(*reference);
    }
    tracing::debug!(
        bound = resolver.bound,
        diagnostics = resolver.diagnostics.len(),
        "references resolved"
    );
    resolver.diagnostics
}

struct Resolver<'t, 'c> {
    tree: &'t mut SyntaxTree,
    context: &'c ResolveContext<'c>,
    by_name: HashMap<String, Vec<NodeId>>,
    by_qualified_name: HashMap<String, Vec<NodeId>>,
    /// Record definition names of the declared views.
    view_ddms: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    bound: usize,
}

impl<'t, 'c> Resolver<'t, 'c> {
    fn new(tree: &'t mut SyntaxTree, referencables: &[NodeId], context: &'c ResolveContext<'c>) -> Self {
        let mut by_name: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut by_qualified_name: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut view_ddms = Vec::new();
        for node in referencables {
            let Some(variable) = tree.variable(*node) else {
                continue;
            };
            if let VariableKind::View { ddm } = &variable.kind {
                view_ddms.push(ddm.symbol_name());
            }
            by_name.entry(variable.name.clone()).or_default().push(*node);
            if let Some(qualified) = tree.qualified_name(*node) {
                if qualified != variable.name {
                    by_qualified_name.entry(qualified.to_string()).or_default().push(*node);
                }
            }
        }

        Self {
            tree,
            context,
            by_name,
            by_qualified_name,
            view_ddms,
            diagnostics: Vec::new(),
            bound: 0,
        }
    }

    fn resolve_reference(&mut self, reference: NodeId) {
        let NodeKind::VariableReference { name, .. } = self.tree.kind(reference) else {
            return;
        };
        let token = name.clone();
        let name = token.symbol_name();
        if is_copycode_parameter(&name) {
            return;
        }

        let mut lookup = self.try_bind(reference, &name);
        if lookup == Lookup::Missing {
            if let Some(stripped) = strip_historic_prefix(&name) {
                lookup = self.try_bind(reference, &stripped);
            }
        }

        match lookup {
            Lookup::Bound => self.bound += 1,
            Lookup::Accepted => {}
            Lookup::Ambiguous(candidates) => {
                let candidates: Vec<String> = candidates
                    .iter()
                    .filter_map(|candidate| self.tree.qualified_name(*candidate).map(str::to_string))
                    .collect();
                let diagnostic = errors::ambiguous_reference(&name, &candidates, token.position());
                self.diagnostics.push(diagnostic.relocate(&token.diagnostic_position()));
            }
            Lookup::Missing => {
                if self.context.file_type == FileType::Function && name == self.context.module_name {
                    return;
                }
                let diagnostic = errors::unresolved_reference(&name, token.position());
                self.diagnostics.push(diagnostic.relocate(&token.diagnostic_position()));
            }
        }
    }

    fn try_bind(&mut self, reference: NodeId, name: &str) -> Lookup {
        let candidates = self.candidates(name);
        if candidates.is_empty() {
            return if self.is_ddm_field(name) {
                Lookup::Accepted
            } else {
                Lookup::Missing
            };
        }
        if let [declaration] = candidates[..] {
            self.tree.bind(reference, declaration);
            return Lookup::Bound;
        }

        let all_in_views = candidates.iter().all(|candidate| self.tree.is_in_view(*candidate));
        if all_in_views {
            if let Some(declaration) = self.candidate_in_accessed_view(reference, &candidates) {
                self.tree.bind(reference, declaration);
                return Lookup::Bound;
            }
        }
        Lookup::Ambiguous(candidates)
    }

    /// Declarations `name` may refer to.
    fn candidates(&self, name: &str) -> Vec<NodeId> {
        if let Some(found) = self.by_name.get(name) {
            return found.clone();
        }
        if let Some(found) = self.by_qualified_name.get(name) {
            return found.clone();
        }

        // `GROUP.MEMBER` where MEMBER sits deeper than level 2.
        let Some((qualifier, member)) = name.rsplit_once('.') else {
            return Vec::new();
        };
        let member = strip_historic_prefix(member).unwrap_or_else(|| member.to_string());
        self.by_name
            .get(&member)
            .map(|found| {
                found
                    .iter()
                    .copied()
                    .filter(|candidate| {
                        self.tree
                            .ancestors(*candidate)
                            .filter_map(|ancestor| self.tree.variable(ancestor))
                            .any(|ancestor| ancestor.name == qualifier)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The only candidate declared in a view that an enclosing database access statement reads.
    fn candidate_in_accessed_view(&self, reference: NodeId, candidates: &[NodeId]) -> Option<NodeId> {
        let accessed_views: Vec<NodeId> = self
            .tree
            .ancestors(reference)
            .filter_map(|ancestor| match self.tree.kind(ancestor) {
                NodeKind::Access { view: Some(view), .. } => self.tree.reference_target(*view),
                _ => None,
            })
            .collect();
        if accessed_views.is_empty() {
            return None;
        }

        let mut reachable = candidates.iter().copied().filter(|candidate| {
            self.tree
                .ancestors(*candidate)
                .any(|ancestor| accessed_views.contains(&ancestor))
        });
        let first = reachable.next()?;
        reachable.next().is_none().then_some(first)
    }

    fn is_ddm_field(&self, name: &str) -> bool {
        let field = name.rsplit_once('.').map_or(name, |(_, member)| member);
        self.view_ddms.iter().any(|ddm| {
            self.context
                .provider
                .find_record_definition(ddm)
                .is_some_and(|definition| definition.find_field(field).is_some())
        })
    }
}

/// `&1&` and `VIEW.&1&` stand for text substituted at `INCLUDE` time.
fn is_copycode_parameter(name: &str) -> bool {
    name.starts_with('&') || name.split_once('.').is_some_and(|(_, member)| member.starts_with('&'))
}

/// `+NAME` without the plus, or `C*NAME`, `T*NAME` and `P*NAME` without the prefix.
fn strip_historic_prefix(name: &str) -> Option<String> {
    if let Some(rest) = name.strip_prefix('+') {
        return (!rest.is_empty()).then(|| rest.to_string());
    }
    ["C*", "T*", "P*"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}
