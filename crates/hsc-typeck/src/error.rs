//! Type errors (§7) and their provenance (§3 "Evidence"/§4.4.6).
//!
//! Style grounded on `mesh-typeck/src/error.rs`'s `ConstraintOrigin` +
//! `TypeError` pairing (an enum of "why was this constraint wanted" plus
//! an enum of "what went wrong"); the variant set itself follows
//! SPEC_FULL.md §7's ten named kinds rather than Mesh's own catalogue.

use std::fmt;

use hsc_common::span::Span;

/// Why a constraint or unification was asked for, carried on every
/// [`TypeError`] so diagnostics can point at the expression or pattern
/// that introduced the obligation rather than just the mismatch site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstraintOrigin {
    Application,
    IfBranches,
    CaseAlternatives,
    Literal,
    Signature,
    InstanceLookup,
    SuperclassEntailment,
    ListElements,
    TupleElements,
    Comprehension,
    Enumeration,
    Other(String),
}

impl fmt::Display for ConstraintOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintOrigin::Application => write!(f, "function application"),
            ConstraintOrigin::IfBranches => write!(f, "if-then-else branches"),
            ConstraintOrigin::CaseAlternatives => write!(f, "case alternatives"),
            ConstraintOrigin::Literal => write!(f, "a literal"),
            ConstraintOrigin::Signature => write!(f, "a type signature"),
            ConstraintOrigin::InstanceLookup => write!(f, "instance lookup"),
            ConstraintOrigin::SuperclassEntailment => write!(f, "superclass entailment"),
            ConstraintOrigin::ListElements => write!(f, "list elements"),
            ConstraintOrigin::TupleElements => write!(f, "tuple elements"),
            ConstraintOrigin::Comprehension => write!(f, "a list comprehension qualifier"),
            ConstraintOrigin::Enumeration => write!(f, "an enumeration range"),
            ConstraintOrigin::Other(s) => write!(f, "{s}"),
        }
    }
}

/// The ten named error kinds (§7), each carrying a [`ConstraintOrigin`]
/// except the purely syntactic ones that a signature check produces
/// before any constraint is involved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeError {
    TypeMismatch { expected: String, found: String, origin: ConstraintOrigin },
    OccursCheck { var: String, ty: String, origin: ConstraintOrigin },
    UnknownName { name: String, span: Option<Span> },
    AmbiguousConstraint { var: String, constraints: Vec<String> },
    NoInstance { constraint: String, origin: ConstraintOrigin },
    MonomorphismRestrictionViolated { name: String },
    InstanceHeadIllegal { class: String, reason: String },
    SuperclassCycle { classes: Vec<String> },
    /// Not one of spec.md's original ten but required to report a
    /// rejected-overlap instance (DESIGN.md Open Question #3): two
    /// instance heads for the same class unify but are not alpha-equivalent.
    OverlappingInstances { class: String, existing: String, new: String },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::TypeMismatch { expected, found, origin } => {
                write!(f, "type mismatch in {origin}: expected `{expected}`, found `{found}`")
            }
            TypeError::OccursCheck { var, ty, origin } => {
                write!(f, "occurs check failed in {origin}: `{var}` occurs in `{ty}`")
            }
            TypeError::UnknownName { name, .. } => write!(f, "unknown name `{name}`"),
            TypeError::AmbiguousConstraint { var, constraints } => {
                write!(f, "ambiguous constraint: `{var}` is constrained by [{}] but never determined", constraints.join(", "))
            }
            TypeError::NoInstance { constraint, origin } => {
                write!(f, "no instance for `{constraint}` arising from {origin}")
            }
            TypeError::MonomorphismRestrictionViolated { name } => {
                write!(f, "the monomorphism restriction prevents generalizing `{name}`'s type")
            }
            TypeError::InstanceHeadIllegal { class, reason } => {
                write!(f, "illegal instance head for class `{class}`: {reason}")
            }
            TypeError::SuperclassCycle { classes } => {
                write!(f, "superclass cycle among classes: {}", classes.join(" -> "))
            }
            TypeError::OverlappingInstances { class, existing, new } => {
                write!(f, "overlapping instances for `{class}`: `{new}` overlaps `{existing}`")
            }
        }
    }
}

impl std::error::Error for TypeError {}
