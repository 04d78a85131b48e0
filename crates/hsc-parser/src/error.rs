//! Parse error type for the hsc parser.

use std::fmt;

use hsc_common::span::Span;

/// A parse error: the first unexpected token plus an "expected one of" set
/// derived from the parse function active when it was hit (§4.1: "reports
/// the first syntax error with source location and an expected set").
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub expected: Vec<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: Vec::new(),
        }
    }

    pub fn expected_one_of(expected: Vec<String>, span: Span) -> Self {
        let message = if expected.len() == 1 {
            format!("expected {}", expected[0])
        } else {
            format!("expected one of: {}", expected.join(", "))
        };
        Self {
            message,
            span,
            expected,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message() {
        let err = ParseError::new("unexpected token", Span::new(0, 1));
        assert_eq!(err.to_string(), "unexpected token");
    }

    #[test]
    fn expected_one_of_singular() {
        let err = ParseError::expected_one_of(vec!["`=`".into()], Span::new(3, 4));
        assert_eq!(err.to_string(), "expected `=`");
    }

    #[test]
    fn expected_one_of_plural() {
        let err = ParseError::expected_one_of(
            vec!["`where`".into(), "`;`".into()],
            Span::new(3, 4),
        );
        assert_eq!(err.to_string(), "expected one of: `where`, `;`");
    }
}
