//! Variable, scope and array-dimension model.
//!
//! Variables live in the [`SyntaxTree`](crate::ast::SyntaxTree) arena as [`NodeKind::Variable`]
//! nodes; group members are child nodes of their group, so the owning group is simply the parent. The tree holds
//! the back-references from declarations to the nodes that use them.
//!
//! ## Notes
//! - Names are stored uppercased; Natural is case-insensitive.
//! - The qualified name is computed on first use and never changes afterwards.
//!
//! [`NodeKind::Variable`]: crate::ast::NodeKind::Variable

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::fmt;

use natfront_core::lang::keywords::KeywordId;
use natfront_core::types::DataType;

use crate::ast::NodeId;
use crate::diagnostics::Position;
use crate::lexer::Token;

/// Lifetime and visibility class of a variable.
///
/// The declaration order is the order in which scope blocks are expected inside `DEFINE DATA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariableScope {
    Independent,
    Global,
    Parameter,
    Local,
}

impl VariableScope {
    pub fn from_keyword(id: KeywordId) -> Option<VariableScope> {
        match id {
            KeywordId::Independent => Some(VariableScope::Independent),
            KeywordId::Global => Some(VariableScope::Global),
            KeywordId::Parameter => Some(VariableScope::Parameter),
            KeywordId::Local => Some(VariableScope::Local),
            _ => None,
        }
    }

    pub fn keyword(self) -> KeywordId {
        match self {
            VariableScope::Independent => KeywordId::Independent,
            VariableScope::Global => KeywordId::Global,
            VariableScope::Parameter => KeywordId::Parameter,
            VariableScope::Local => KeywordId::Local,
        }
    }
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableScope::Independent => "INDEPENDENT",
            VariableScope::Global => "GLOBAL",
            VariableScope::Parameter => "PARAMETER",
            VariableScope::Local => "LOCAL",
        };
        f.write_str(name)
    }
}

/// One bound of an array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Value(i64),
    /// `*`: an X-array whose size changes at runtime.
    Unbound,
    /// `V`: size given by the caller of a parameter array.
    Variable,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Value(value) => write!(f, "{value}"),
            Bound::Unbound => f.write_str("*"),
            Bound::Variable => f.write_str("V"),
        }
    }
}

/// `lower:upper` of one array dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDimension {
    pub lower: Bound,
    pub upper: Bound,
    pub position: Position,
}

impl ArrayDimension {
    /// Number of occurrences if both bounds are known and the count fits an `i64`.
    pub fn occurrences(&self) -> Option<i64> {
        match (self.lower, self.upper) {
            (Bound::Value(lower), Bound::Value(upper)) => upper.checked_sub(lower)?.checked_add(1),
            _ => None,
        }
    }

    /// Return `true` if both bounds are numbers.
    pub fn is_fixed(&self) -> bool {
        matches!((self.lower, self.upper), (Bound::Value(_), Bound::Value(_)))
    }

    pub fn is_unbound(&self) -> bool {
        self.lower == Bound::Unbound || self.upper == Bound::Unbound
    }
}

impl fmt::Display for ArrayDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lower, self.upper)
    }
}

/// A variable with its own data type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedVariable {
    pub ty: DataType,
    pub constant: bool,
    /// Literal tokens of `INIT`/`CONST`, in source order.
    pub initial_values: Vec<Token>,
    pub by_value: bool,
    pub optional: bool,
}

impl TypedVariable {
    pub fn new(ty: DataType) -> Self {
        Self {
            ty,
            constant: false,
            initial_values: Vec::new(),
            by_value: false,
            optional: false,
        }
    }

    pub fn has_initializer(&self) -> bool {
        !self.initial_values.is_empty()
    }
}

/// What a variable declaration declares.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableKind {
    Typed(TypedVariable),
    /// Container of member variables without a type of its own.
    Group,
    /// Group bound to an external record definition.
    View { ddm: Token },
    /// Overlay of the byte layout of `target`.
    Redefinition { target: Option<NodeId>, filler_bytes: u32 },
}

/// A declared variable.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Uppercased name.
    pub name: String,
    /// 1-based nesting level.
    pub level: u32,
    pub scope: VariableScope,
    pub declaration: Token,
    pub kind: VariableKind,
    pub dimensions: Vec<ArrayDimension>,
    /// Nodes referring to this variable.
    pub references: BTreeSet<NodeId>,
    qualified_name: OnceCell<String>,
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.level == other.level
            && self.scope == other.scope
            && self.declaration == other.declaration
            && self.kind == other.kind
            && self.dimensions == other.dimensions
    }
}

impl Variable {
    pub fn new(declaration: Token, level: u32, scope: VariableScope, kind: VariableKind) -> Self {
        Self {
            name: declaration.symbol_name(),
            level,
            scope,
            declaration,
            kind,
            dimensions: Vec::new(),
            references: BTreeSet::new(),
            qualified_name: OnceCell::new(),
        }
    }

    pub fn typed(&self) -> Option<&TypedVariable> {
        match &self.kind {
            VariableKind::Typed(typed) => Some(typed),
            _ => None,
        }
    }

    pub fn typed_mut(&mut self) -> Option<&mut TypedVariable> {
        match &mut self.kind {
            VariableKind::Typed(typed) => Some(typed),
            _ => None,
        }
    }

    pub fn data_type(&self) -> Option<&DataType> {
        self.typed().map(|t| &t.ty)
    }

    pub fn is_constant(&self) -> bool {
        self.typed().is_some_and(|t| t.constant)
    }

    pub fn is_array(&self) -> bool {
        !self.dimensions.is_empty()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, VariableKind::Group | VariableKind::View { .. })
    }

    pub fn is_redefinition(&self) -> bool {
        matches!(self.kind, VariableKind::Redefinition { .. })
    }

    /// Qualified name if it was computed already.
    pub fn cached_qualified_name(&self) -> Option<&str> {
        self.qualified_name.get().map(String::as_str)
    }

    /// Qualified name, computing it with `compute` on first use.
    pub fn qualified_name_or_init(&self, compute: impl FnOnce() -> String) -> &str {
        self.qualified_name.get_or_init(compute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    fn position() -> Position {
        Position {
            path: Arc::from(Path::new("T.NSL")),
            offset: 0,
            line: 0,
            column: 0,
            length: 1,
        }
    }

    #[test]
    fn occurrences_need_both_bounds() {
        let fixed = ArrayDimension {
            lower: Bound::Value(1),
            upper: Bound::Value(10),
            position: position(),
        };
        assert_eq!(fixed.occurrences(), Some(10));
        let open = ArrayDimension {
            upper: Bound::Unbound,
            ..fixed.clone()
        };
        assert_eq!(open.occurrences(), None);
        assert!(open.is_unbound());
        assert_eq!(open.to_string(), "1:*");
    }

    #[test]
    fn occurrences_of_extreme_bounds_are_unknown() {
        let wide = ArrayDimension {
            lower: Bound::Value(-i64::MAX),
            upper: Bound::Value(i64::MAX),
            position: position(),
        };
        assert_eq!(wide.occurrences(), None);
        assert!(wide.is_fixed());

        let full = ArrayDimension {
            lower: Bound::Value(0),
            upper: Bound::Value(i64::MAX),
            position: position(),
        };
        assert_eq!(full.occurrences(), None);
    }

    #[test]
    fn scopes_map_to_keywords() {
        for scope in [
            VariableScope::Independent,
            VariableScope::Global,
            VariableScope::Parameter,
            VariableScope::Local,
        ] {
            assert_eq!(VariableScope::from_keyword(scope.keyword()), Some(scope));
        }
    }
}
