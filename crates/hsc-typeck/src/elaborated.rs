//! The elaborated output (§4.4.11): every generalized binding wrapped in
//! a `GenBind`, every variable occurrence annotated with its instantiated
//! type and explicit dictionary applications, class/instance declarations
//! turned into dictionary values and accessor/dfun bindings.
//!
//! There is no teacher file that produces exactly this shape (Mesh
//! monomorphizes generics away rather than passing dictionaries at
//! runtime), so the node shapes here are grounded directly on §3's
//! "Declarations" (elaborated `GenBind`) and "Evidence" subsections, kept
//! in the same plain-enum, no-interior-mutability style as
//! `hsc_parser::ast`'s typed wrappers.

use crate::ty::{PredType, Type, TypeVar};

/// An evidence term (§3 "Evidence"): either a variable bound by an
/// enclosing dictionary parameter, a saturated application of a dfun to
/// its sub-dictionaries, or a superclass projection out of another
/// dictionary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evidence {
    Var(crate::lie::EvidenceVar),
    Dfun { name: String, args: Vec<Evidence> },
    Extract { class: String, dict: Box<Evidence> },
}

/// A name bound by a generalized declaration group's quantifiers, paired
/// with the predicate that names its dictionary parameter's type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictParam {
    pub evidence_var: crate::lie::EvidenceVar,
    pub constraint: PredType,
}

/// One evidence binding produced while discharging a group's retained
/// LIE (§4.4.8 general case, step 9): `d := <evidence>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvidenceBinding {
    pub var: crate::lie::EvidenceVar,
    pub evidence: Evidence,
}

/// A generalized binding group (§3 "elaborated GenBind", §4.4.8/4.4.11):
/// `GenBind(qs, dict-params, ev-binds, decls)`.
#[derive(Clone, Debug)]
pub struct GenBind {
    pub quantified: Vec<TypeVar>,
    pub dict_params: Vec<DictParam>,
    pub evidence_bindings: Vec<EvidenceBinding>,
    pub decls: Vec<ElabDecl>,
}

/// One elaborated declaration inside a `GenBind`: a function/pattern
/// binding whose right-hand side is now a fully elaborated expression.
#[derive(Clone, Debug)]
pub struct ElabDecl {
    pub name: String,
    pub params: Vec<ElabPat>,
    pub body: ElabExpr,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub enum ElabPat {
    Var(String, Type),
    Wildcard(Type),
    Lit(ElabLit, Type),
    Con { name: String, args: Vec<ElabPat>, ty: Type },
    Tuple(Vec<ElabPat>, Type),
    List(Vec<ElabPat>, Type),
    As(String, Box<ElabPat>, Type),
    Lazy(Box<ElabPat>, Type),
    Strict(Box<ElabPat>, Type),
}

impl ElabPat {
    pub fn ty(&self) -> &Type {
        match self {
            ElabPat::Var(_, t)
            | ElabPat::Wildcard(t)
            | ElabPat::Lit(_, t)
            | ElabPat::Con { ty: t, .. }
            | ElabPat::Tuple(_, t)
            | ElabPat::List(_, t)
            | ElabPat::As(_, _, t)
            | ElabPat::Lazy(_, t)
            | ElabPat::Strict(_, t) => t,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElabLit {
    Int(i64),
    Rational(f64),
    Char(char),
    Str(String),
}

/// An elaborated expression: a variable occurrence carries its
/// instantiation's dictionary applications inline (§4.4.5 "Variable"),
/// and every `GenBind` that wraps a `let` is itself an expression-level
/// construct via `Let`.
#[derive(Clone, Debug)]
pub enum ElabExpr {
    /// `x` applied to zero or more dictionary arguments selected at
    /// instantiation time, plus the concrete type it was instantiated at.
    Var { name: String, dict_args: Vec<Evidence>, ty: Type },
    Lit(ElabLit, Type),
    App(Box<ElabExpr>, Box<ElabExpr>, Type),
    Lambda(Vec<ElabPat>, Box<ElabExpr>, Type),
    Let(Vec<GenBind>, Box<ElabExpr>, Type),
    If(Box<ElabExpr>, Box<ElabExpr>, Box<ElabExpr>, Type),
    Case(Box<ElabExpr>, Vec<ElabAlt>, Type),
    Tuple(Vec<ElabExpr>, Type),
    List(Vec<ElabExpr>, Type),
    /// A dictionary value itself, built from a class's accessor-ordered
    /// field list (§4.4.10 "dictionary record type").
    DictCon { class: String, fields: Vec<ElabExpr>, ty: Type },
    /// An [`Evidence`] term used where an ordinary expression is expected:
    /// a superclass dictionary embedded as a `DictCon` field, or the
    /// incoming dictionary an accessor function cases on.
    Witness(Evidence, Type),
}

impl ElabExpr {
    pub fn ty(&self) -> &Type {
        match self {
            ElabExpr::Var { ty, .. }
            | ElabExpr::Lit(_, ty)
            | ElabExpr::App(_, _, ty)
            | ElabExpr::Lambda(_, _, ty)
            | ElabExpr::Let(_, _, ty)
            | ElabExpr::If(_, _, _, ty)
            | ElabExpr::Case(_, _, ty)
            | ElabExpr::Tuple(_, ty)
            | ElabExpr::List(_, ty)
            | ElabExpr::DictCon { ty, .. }
            | ElabExpr::Witness(_, ty) => ty,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ElabAlt {
    pub pat: ElabPat,
    pub body: ElabExpr,
}

/// The top-level elaborated program: generalized value `GenBind`s plus
/// the dictionary-accessor and dfun bindings synthesized from class and
/// instance declarations (§4.4.10/4.4.11).
#[derive(Clone, Debug, Default)]
pub struct ElaboratedModule {
    pub bindings: Vec<GenBind>,
}
