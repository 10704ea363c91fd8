//! The single gate a proposed transition passes before commit.

use super::error::Rejection;
use super::table::TransitionTable;
use crate::core::{StateContext, StateId};
use std::sync::Arc;

/// Checks table membership, then the target's entry precondition against
/// the proposed (already merged) context. Stops at the first failing check.
#[derive(Clone, Debug)]
pub struct TransitionValidator {
    table: Arc<TransitionTable>,
}

impl TransitionValidator {
    pub fn new(table: Arc<TransitionTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn validate(
        &self,
        from: StateId,
        to: StateId,
        context: &StateContext,
    ) -> Result<(), Rejection> {
        if !self.table.allows(from, to) {
            return Err(Rejection::InvalidTransition { from, to });
        }

        // Staying put is not an entry.
        if from == to {
            return Ok(());
        }

        if let Some(precondition) = self.table.precondition(to) {
            if !precondition.is_satisfied(context) {
                let missing = precondition.missing(context);
                // Guards may assume the required fields exist.
                let failed_guards = if missing.is_empty() {
                    precondition.failed_guards(context)
                } else {
                    Vec::new()
                };
                return Err(Rejection::PreconditionFailed {
                    target: to,
                    missing,
                    failed_guards,
                });
            }
        }

        Ok(())
    }
}
