//! Errors the renamer itself can raise (§4.3 is otherwise failure-free).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameError {
    /// An `INFIX_EXPR` whose operand count didn't match its operator count
    /// plus one -- should never happen from a well-formed parse, but the
    /// renamer doesn't trust the parser's invariants blindly.
    MalformedInfixExpr,
    /// Two operators at the same precedence with incompatible associativity
    /// (e.g. one `infixl`, one `infixr`) appear next to each other, so there
    /// is no well-defined way to parenthesize them.
    AmbiguousFixity {
        left: String,
        right: String,
        precedence: u8,
    },
}

impl fmt::Display for RenameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameError::MalformedInfixExpr => {
                write!(f, "malformed infix expression: operand/operator count mismatch")
            }
            RenameError::AmbiguousFixity {
                left,
                right,
                precedence,
            } => write!(
                f,
                "cannot mix `{left}` and `{right}` in the same infix expression (both precedence {precedence}, incompatible associativity)"
            ),
        }
    }
}

impl std::error::Error for RenameError {}
