//! Declaration checks.

use natfront_core::types::DataFormat;

use crate::frontend::ast::NodeId;
use crate::frontend::diagnostics::errors;
use crate::frontend::lexer::TokenKind;

use super::{CheckError, TypeChecker};

impl TypeChecker<'_> {
    /// String initial values of a fixed-length alphanumeric variable must fit into it.
    pub(crate) fn check_initial_values(&mut self, node: NodeId) -> Result<(), CheckError> {
        let tree = self.tree;
        let Some(typed) = tree.variable(node).and_then(|variable| variable.typed()) else {
            return Ok(());
        };
        if typed.ty.dynamic || typed.ty.format != DataFormat::Alphanumeric {
            return Ok(());
        }

        for value in typed.initial_values.iter().filter(|value| value.kind == TokenKind::String) {
            let length = value.string_value().chars().count();
            if length > typed.ty.length as usize {
                let message = format!(
                    "Initializer literal length {length} is longer than data type length {}",
                    typed.ty.length
                );
                let position = self.position_of(node)?;
                self.report(errors::type_mismatch(&message, position));
            }
        }
        Ok(())
    }
}
