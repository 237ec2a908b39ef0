//! Statement checks: modified operands, `DIVIDE ... REMAINDER`, `WRITE WORK` and `DECIDE ON`.

use natfront_core::lang::system;

use crate::frontend::ast::{CalculationKind, NodeId, NodeKind};
use crate::frontend::diagnostics::errors;

use super::{CheckError, TypeChecker};

impl TypeChecker<'_> {
    // ========================================================================
    // Modified operands
    // ========================================================================

    /// Report `operand` if the statement it belongs to may not write to it.
    ///
    /// `None` stands for an operand the parser could not read; it has been reported already.
    pub(crate) fn ensure_modifiable(&mut self, operand: Option<NodeId>) -> Result<(), CheckError> {
        let Some(operand) = operand else {
            return Ok(());
        };
        let tree = self.tree;
        match tree.kind(operand) {
            NodeKind::VariableReference { reference: None, .. } => Ok(()),
            NodeKind::VariableReference {
                reference: Some(target), ..
            } => {
                let variable = tree.variable(*target).ok_or(CheckError::NotAVariable {
                    reference: operand,
                    target: *target,
                })?;
                if variable.is_constant() {
                    let position = self.position_of(operand)?;
                    self.report(errors::reference_not_mutable(
                        "Variable can't be modified because it is CONST",
                        position,
                    ));
                }
                Ok(())
            }
            NodeKind::SystemVariable(id) | NodeKind::SystemFunction { function: id, .. } => {
                if !system::info_for(*id).modifiable {
                    let position = self.position_of(operand)?;
                    self.report(errors::reference_not_mutable(
                        "Unmodifiable system variables can't be modified",
                        position,
                    ));
                }
                Ok(())
            }
            _ => {
                let position = self.position_of(operand)?;
                self.report(errors::reference_not_mutable("Operand is not modifiable by statement", position));
                Ok(())
            }
        }
    }

    /// `ADD`, `SUBTRACT`, `MULTIPLY` and `DIVIDE` write to `GIVING` if present, to their target otherwise, and to
    /// `REMAINDER`.
    pub(crate) fn check_calculation(&mut self, node: NodeId) -> Result<(), CheckError> {
        let tree = self.tree;
        let NodeKind::Calculation {
            kind,
            operands,
            target,
            giving,
            remainder,
        } = tree.kind(node)
        else {
            return Ok(());
        };

        self.ensure_modifiable(giving.or(*target))?;
        self.ensure_modifiable(*remainder)?;

        if *kind == CalculationKind::Divide && remainder.is_some() {
            let mut involved: Vec<NodeId> = [*target, *giving, *remainder]
                .into_iter()
                .flatten()
                .chain(operands.iter().copied())
                .collect();
            involved.sort();
            involved.dedup();
            for operand in involved {
                self.forbid_array_range(operand)?;
            }
        }
        Ok(())
    }

    fn forbid_array_range(&mut self, operand: NodeId) -> Result<(), CheckError> {
        let tree = self.tree;
        let NodeKind::VariableReference { indices, .. } = tree.kind(operand) else {
            return Ok(());
        };
        for index in indices {
            if matches!(tree.kind(*index), NodeKind::RangedAccess { .. }) {
                let position = self.position_of(*index)?;
                self.report(errors::type_mismatch(
                    "Operand can't specify array range in this context",
                    position,
                ));
            }
        }
        Ok(())
    }

    // ========================================================================
    // WRITE WORK
    // ========================================================================

    /// Without `VARIABLE`, every record of a work file has the same layout, so nothing may change its length.
    pub(crate) fn check_write_work(&mut self, operands: &[NodeId]) -> Result<(), CheckError> {
        let tree = self.tree;
        for operand in operands {
            let NodeKind::VariableReference {
                indices,
                reference: Some(target),
                ..
            } = tree.kind(*operand)
            else {
                continue;
            };
            let Some(variable) = tree.variable(*target) else {
                continue;
            };
            let Some(ty) = variable.data_type() else {
                continue;
            };

            if ty.dynamic {
                let position = self.position_of(*operand)?;
                self.report(errors::type_mismatch(
                    "Can't use operand with dynamic length if WRITE WORK misses the VARIABLE keyword",
                    position,
                ));
            } else if variable.is_array() {
                for index in indices {
                    if self.is_dynamic_range(*index) {
                        let position = self.position_of(*operand)?;
                        self.report(errors::type_mismatch(
                            "Can't use operand with dynamic array access if WRITE WORK misses the VARIABLE keyword",
                            position,
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // DECIDE ON
    // ========================================================================

    /// Every `VALUE` must belong to the format family of the decided variable.
    pub(crate) fn check_decide_on(&mut self, operand: Option<NodeId>, branches: &[NodeId]) -> Result<(), CheckError> {
        let tree = self.tree;
        let Some(NodeKind::VariableReference {
            reference: Some(target), ..
        }) = operand.map(|operand| tree.kind(operand))
        else {
            return Ok(());
        };
        let Some(variable) = tree.variable(*target) else {
            return Ok(());
        };
        let Some(target_type) = variable.data_type() else {
            return Ok(());
        };

        for branch in branches {
            let NodeKind::DecideBranch { values, .. } = tree.kind(*branch) else {
                continue;
            };
            for value in values {
                let Some(inferred) = self.infer_type(*value) else {
                    continue;
                };
                if !inferred.has_same_family(target_type) {
                    let message = format!(
                        "Inferred format {} is not compatible with {} ({})",
                        inferred.format.identifier(),
                        variable.name,
                        target_type.format.identifier()
                    );
                    let position = self.position_of(*value)?;
                    self.report(errors::type_mismatch(&message, position));
                }
            }
        }
        Ok(())
    }
}
