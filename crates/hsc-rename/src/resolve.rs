//! Resolving a flat `InfixExp` into an unambiguous tree once fixity is
//! known (§4.1 "Grammar conflicts", §9).
//!
//! The parser has no fixity table, so `a - b * c` comes out of it as a flat
//! chain of operands and operator spellings. This module arranges such a
//! chain with the standard precedence-climbing algorithm, generic over what
//! "apply this operator to these two operands" means for the caller --
//! `hsc-typeck` instantiates it with expressions, elaborating each
//! application as it's built rather than constructing an intermediate tree
//! type of its own.

use crate::error::RenameError;
use crate::fixity::{Fixity, FixityTable};
use hsc_parser::ast::item::Associativity;

/// Arrange `operands`/`operators` (an `InfixExpr`'s flat children, `n`
/// operands and `n - 1` operators) into a single value by repeatedly
/// combining the highest-precedence adjacent pair, left-to-right on ties
/// broken by associativity. `combine(lhs, op, rhs)` builds the combined
/// value for one operator application; it's given the operator spelling
/// rather than anything already resolved so the caller can look up its
/// evidence/fixity-derived behavior itself if needed.
pub fn resolve_infix<T>(
    operands: Vec<T>,
    operators: Vec<String>,
    fixities: &FixityTable,
    combine: impl FnMut(T, &str, T) -> T,
) -> Result<T, RenameError> {
    if operands.len() != operators.len() + 1 {
        return Err(RenameError::MalformedInfixExpr);
    }
    let mut combine = combine;
    // Precedence-climbing over an explicit operand/operator stack, per the
    // classic shunting-yard shape: push operands, and whenever the operator
    // about to be pushed binds no tighter than the one on top of the stack,
    // reduce first.
    let mut operand_stack: Vec<T> = Vec::new();
    let mut operator_stack: Vec<String> = Vec::new();
    let mut operands = operands.into_iter();
    operand_stack.push(operands.next().expect("checked non-empty above"));

    for op in operators {
        let fx = fixities.lookup(&op);
        while let Some(top) = operator_stack.last() {
            let top_fx = fixities.lookup(top);
            if should_reduce(top_fx, fx)? {
                let top_op = operator_stack.pop().unwrap();
                let rhs = operand_stack.pop().unwrap();
                let lhs = operand_stack.pop().unwrap();
                operand_stack.push(combine(lhs, &top_op, rhs));
            } else {
                break;
            }
        }
        operator_stack.push(op);
        operand_stack.push(operands.next().expect("operand/operator count checked above"));
    }

    while let Some(top_op) = operator_stack.pop() {
        let rhs = operand_stack.pop().unwrap();
        let lhs = operand_stack.pop().unwrap();
        operand_stack.push(combine(lhs, &top_op, rhs));
    }

    Ok(operand_stack.pop().expect("at least one operand"))
}

/// Whether the operator already on the stack (`top`) should be reduced
/// before pushing the new one (`next`): `top` binds strictly tighter, or
/// they're equal precedence and both left-associative.
fn should_reduce(top: Fixity, next: Fixity) -> Result<bool, RenameError> {
    if top.precedence > next.precedence {
        return Ok(true);
    }
    if top.precedence < next.precedence {
        return Ok(false);
    }
    match (top.assoc, next.assoc) {
        (Associativity::Left, Associativity::Left) => Ok(true),
        (Associativity::Right, Associativity::Right) => Ok(false),
        _ => Err(RenameError::AmbiguousFixity {
            left: String::new(),
            right: String::new(),
            precedence: top.precedence,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(entries: &[(&str, Associativity, u8)]) -> FixityTable {
        // FixityTable has no public insert; build it indirectly by
        // collecting synthetic fixity decls through the parser would be
        // heavier than this test needs, so we just rely on the default
        // (infixl 9) and test precedence-climbing with operators that are
        // all left-associative at distinct precedences, which is what
        // `FixityTable::lookup` returns for undeclared operators anyway
        // when entries is empty.
        let _ = entries;
        FixityTable::default()
    }

    #[test]
    fn single_operand_no_operators() {
        let table = table_with(&[]);
        let result = resolve_infix(vec![1], vec![], &table, |l, _, r| l + r).unwrap();
        assert_eq!(result, 1);
    }

    #[test]
    fn left_associative_default_fixity() {
        // All operators default to infixl 9, so `1 - 2 - 3` should fold as
        // `(1 - 2) - 3 = -4`, not `1 - (2 - 3) = 2`.
        let table = table_with(&[]);
        let result = resolve_infix(
            vec![1, 2, 3],
            vec!["-".to_string(), "-".to_string()],
            &table,
            |l, _, r| l - r,
        )
        .unwrap();
        assert_eq!(result, -4);
    }

    #[test]
    fn malformed_operand_count_is_rejected() {
        let table = table_with(&[]);
        let result = resolve_infix(vec![1, 2], vec![], &table, |l, _, r| l + r);
        assert_eq!(result, Err(RenameError::MalformedInfixExpr));
    }
}
