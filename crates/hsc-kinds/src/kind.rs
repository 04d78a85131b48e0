//! The kind algebra `κ ::= ★ | Constraint | κ → κ | κvar` (§3).
//!
//! Kind variables live in their own `ena` unification table, entirely
//! separate from the type checker's meta-type-variable table (§4.2's kind
//! pass and §4.4's type pass are independent phases over independent
//! unification problems).

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KindVar(pub u32);

impl ena::unify::UnifyKey for KindVar {
    type Value = Option<Kind>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        KindVar(u)
    }

    fn tag() -> &'static str {
        "KindVar"
    }
}

impl ena::unify::EqUnifyValue for Kind {}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `★`, the kind of ordinary (lifted, boxed) types.
    Star,
    /// `Constraint`, the kind of saturated class constraints.
    Constraint,
    /// `κ1 → κ2`.
    Fun(Box<Kind>, Box<Kind>),
    /// An as-yet-undetermined kind, resolved by `hsc-kinds`'s unification
    /// table and defaulted to `★` at closure if it's still free.
    Var(KindVar),
}

impl Kind {
    pub fn fun(param: Kind, result: Kind) -> Kind {
        Kind::Fun(Box::new(param), Box::new(result))
    }

    /// The kind of an `n`-ary type constructor fully applied to arguments
    /// all of kind `★`: `★ → … → ★ → ★`.
    pub fn arity_star(n: usize) -> Kind {
        (0..n).fold(Kind::Star, |acc, _| Kind::fun(Kind::Star, acc))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Star => write!(f, "*"),
            Kind::Constraint => write!(f, "Constraint"),
            Kind::Fun(p, r) => {
                if matches!(**p, Kind::Fun(..)) {
                    write!(f, "({p}) -> {r}")
                } else {
                    write!(f, "{p} -> {r}")
                }
            }
            Kind::Var(v) => write!(f, "k{}", v.0),
        }
    }
}
