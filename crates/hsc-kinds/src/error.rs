//! Kind-checking errors (§7's `KindMismatch`, plus the arity/shape errors
//! §4.2 calls out as fatal).

use std::fmt;

use hsc_common::span::Span;

use crate::kind::Kind;

#[derive(Debug, Clone, PartialEq)]
pub enum KindErrorKind {
    /// Two kinds that should coincide do not, after substitution.
    Mismatch { expected: Kind, found: Kind },
    /// A type constructor or class was applied to more (or fewer)
    /// arguments than its declaration's arity.
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// A name used in a type expression has no kind assigned -- not a
    /// declared type constructor, class, or in-scope type variable.
    UnknownTypeName(String),
    /// A data/class/type-synonym header repeats the same type variable.
    RepeatedTypeVar(String),
    /// Kind unification hit an occurs check (`κ ~ κ → κ`, etc.).
    OccursCheck,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KindError {
    pub kind: KindErrorKind,
    pub span: Span,
}

impl KindError {
    pub fn new(kind: KindErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for KindErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindErrorKind::Mismatch { expected, found } => {
                write!(f, "kind mismatch: expected `{expected}`, found `{found}`")
            }
            KindErrorKind::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "`{name}` expects {expected} argument(s), but was given {found}"
            ),
            KindErrorKind::UnknownTypeName(name) => write!(f, "not in scope: type `{name}`"),
            KindErrorKind::RepeatedTypeVar(name) => {
                write!(f, "type variable `{name}` occurs more than once in this header")
            }
            KindErrorKind::OccursCheck => write!(f, "occurs check failed while unifying kinds"),
        }
    }
}

impl fmt::Display for KindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for KindError {}
