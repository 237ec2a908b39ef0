//! Operand checks: array access and type inference of literals and references.

use natfront_core::lang::keywords::KeywordId;
use natfront_core::lang::system::{self, SystemId};
use natfront_core::types::{DataFormat, DataType};

use crate::frontend::ast::{AccessKind, NodeId, NodeKind};
use crate::frontend::diagnostics::errors;
use crate::frontend::lexer::{Token, TokenKind};
use crate::frontend::symbols::VariableKind;

use super::{CheckError, TypeChecker};

impl TypeChecker<'_> {
    // ========================================================================
    // Array access
    // ========================================================================

    /// Compare the indices of a bound reference with the dimensions of its declaration.
    pub(crate) fn check_array_access(&mut self, reference: NodeId) -> Result<(), CheckError> {
        let tree = self.tree;
        let NodeKind::VariableReference {
            name,
            indices,
            reference: Some(target),
        } = tree.kind(reference)
        else {
            return Ok(());
        };
        // C*, T* and P* name a scalar pseudo-field of the array, not the array.
        if is_pseudo_field(&name.symbol_name()) {
            return Ok(());
        }
        let variable = tree.variable(*target).ok_or(CheckError::NotAVariable {
            reference,
            target: *target,
        })?;

        let below_find = tree.ancestors(reference).any(|ancestor| {
            matches!(
                tree.kind(ancestor),
                NodeKind::Access {
                    kind: AccessKind::Find,
                    ..
                }
            )
        });
        if below_find {
            return Ok(());
        }

        let periodic = self.is_periodic_group(*target);
        if !indices.is_empty() && !variable.is_array() && !periodic {
            let message = format!("Using index access for a reference to non-array {}", variable.name);
            let position = self.position_of(reference)?;
            self.report(errors::invalid_array_access(&message, position));
        }

        if indices.is_empty() && (variable.is_array() || periodic) && !self.accepts_whole_array(reference) {
            let what = if periodic { "a periodic group" } else { "an array" };
            let message = format!("Missing index access, because {} is {what}", variable.name);
            let position = self.position_of(reference)?;
            self.report(errors::invalid_array_access(&message, position));
        }

        if !indices.is_empty() && variable.is_array() && indices.len() != variable.dimensions.len() {
            let message = format!(
                "Missing dimensions in array access. Got {} dimensions but {} has {}",
                indices.len(),
                variable.name,
                variable.dimensions.len()
            );
            let position = self.position_of(reference)?;
            self.report(errors::invalid_array_access(&message, position));
        }
        Ok(())
    }

    /// A group of a view whose direct members are all arrays (a DDM periodic group).
    pub(crate) fn is_periodic_group(&self, node: NodeId) -> bool {
        let tree = self.tree;
        let Some(group) = tree.variable(node) else {
            return false;
        };
        if !matches!(group.kind, VariableKind::Group) || !tree.is_in_view(node) {
            return false;
        }
        tree.descendants(node)
            .into_iter()
            .skip(1)
            .filter_map(|member| tree.variable(member))
            .filter(|member| member.level == group.level + 1)
            .all(|member| member.is_array())
    }

    /// Statements that take an array as a whole: `*OCC`, `*LBOUND`, `*UBOUND`, the array resize statements and search
    /// criteria of database access.
    fn accepts_whole_array(&self, reference: NodeId) -> bool {
        let tree = self.tree;
        let Some(parent) = tree.parent(reference) else {
            return false;
        };
        match tree.kind(parent) {
            NodeKind::SystemFunction { function, .. } => matches!(
                function,
                SystemId::Occ | SystemId::Occurrence | SystemId::Lbound | SystemId::Ubound
            ),
            NodeKind::ArrayResize { .. } | NodeKind::Access { .. } => true,
            _ => false,
        }
    }

    /// A range whose length is only known at runtime: `*:5`, `#I:#J`.
    ///
    /// `(*)` spans the whole array and counts as fixed.
    pub(crate) fn is_dynamic_range(&self, index: NodeId) -> bool {
        let tree = self.tree;
        let NodeKind::RangedAccess { lower, upper } = tree.kind(index) else {
            return false;
        };
        let is_literal = |bound: NodeId| matches!(tree.kind(bound), NodeKind::Literal(_));
        match (lower, upper) {
            (None, None) => false,
            (Some(lower), Some(upper)) => !is_literal(*lower) || !is_literal(*upper),
            _ => true,
        }
    }

    // ========================================================================
    // Inference
    // ========================================================================

    /// Type of an operand, if it can be told without evaluating it.
    pub(crate) fn infer_type(&self, operand: NodeId) -> Option<DataType> {
        let tree = self.tree;
        match tree.kind(operand) {
            NodeKind::VariableReference {
                reference: Some(target), ..
            } => tree.variable(*target).and_then(|variable| variable.data_type().copied()),
            NodeKind::Literal(token) => literal_type(token),
            NodeKind::SystemVariable(id) | NodeKind::SystemFunction { function: id, .. } => {
                Some(system::info_for(*id).ty).filter(|ty| ty.format != DataFormat::None)
            }
            _ => None,
        }
    }
}

fn is_pseudo_field(name: &str) -> bool {
    let member = name.rsplit_once('.').map_or(name, |(_, member)| member);
    ["C*", "T*", "P*"].iter().any(|prefix| member.starts_with(prefix))
}

/// Type of a literal: strings are alphanumeric, numbers numeric (float with an exponent), `TRUE`/`FALSE` logical.
pub(crate) fn literal_type(token: &Token) -> Option<DataType> {
    match token.kind {
        TokenKind::String => {
            let length = token.string_value().chars().count().max(1);
            Some(DataType::fixed(DataFormat::Alphanumeric, length as u32))
        }
        TokenKind::Number if token.text.contains(['E', 'e']) => Some(DataType::fixed(DataFormat::Float, 8)),
        TokenKind::Number => {
            let digits = token.text.trim_start_matches(['+', '-']);
            let (integer, decimals) = digits.split_once(['.', ',']).unwrap_or((digits, ""));
            Some(DataType::numeric(
                DataFormat::Numeric,
                integer.len().max(1) as u32,
                decimals.len() as u8,
            ))
        }
        TokenKind::Keyword(KeywordId::True | KeywordId::False) => Some(DataType::fixed(DataFormat::Logic, 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: text.to_string(),
            offset: 0,
            line: 0,
            column: 0,
            length: text.len(),
            path: Arc::from(Path::new("TEST.NSN")),
            relocated: None,
        }
    }

    #[test]
    fn literal_types() {
        assert_eq!(
            literal_type(&token(TokenKind::String, "'ABC'")),
            Some(DataType::fixed(DataFormat::Alphanumeric, 3))
        );
        assert_eq!(
            literal_type(&token(TokenKind::Number, "12.50")),
            Some(DataType::numeric(DataFormat::Numeric, 2, 2))
        );
        assert_eq!(
            literal_type(&token(TokenKind::Number, "1E10")).map(|ty| ty.format),
            Some(DataFormat::Float)
        );
        assert_eq!(
            literal_type(&token(TokenKind::Keyword(KeywordId::True), "TRUE")).map(|ty| ty.format),
            Some(DataFormat::Logic)
        );
        assert_eq!(literal_type(&token(TokenKind::Identifier, "#A")), None);
    }
}
