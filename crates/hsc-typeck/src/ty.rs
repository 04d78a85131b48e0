//! Type representation (§3): meta type variables, rigid type variables,
//! type constructors, monotypes, and polytypes (type schemes).
//!
//! Mirrors `mesh-typeck::ty` one layer richer: where Mesh's `Ty` has only
//! meta-variables, this algebra keeps meta-variables (`MetaTv`, unification
//! keys) and rigid/bound variables (`TypeVar`, never a unification key)
//! separate, matching §3's explicit rigid-vs-meta distinction.

use std::fmt;

use hsc_kinds::Kind;

/// A unification variable: a `u32` index into `InferCtx`'s `ena` table,
/// filled at most once.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetaTv(pub u32);

impl ena::unify::UnifyKey for MetaTv {
    type Value = Option<Type>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        MetaTv(u)
    }

    fn tag() -> &'static str {
        "MetaTv"
    }
}

impl ena::unify::EqUnifyValue for Type {}

/// A rigid (`∀`-bound) type variable: a name plus its kind. Never a key
/// into the meta-variable unification table -- it unifies only with
/// itself, which is why `InferCtx::unify` never binds one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub name: String,
    pub kind: Kind,
}

impl TypeVar {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        TypeVar { name: name.into(), kind }
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A named type constructor. `display_prefix` carries a module-qualifying
/// prefix purely for diagnostics; identity (`PartialEq`/`Hash`) is by
/// `name` alone, exactly as `mesh-typeck::ty::TyCon` separates identity
/// from display.
#[derive(Clone, Debug)]
pub struct TypeCon {
    pub name: String,
    pub kind: Kind,
    pub display_prefix: Option<String>,
}

impl TypeCon {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        TypeCon { name: name.into(), kind, display_prefix: None }
    }
}

impl PartialEq for TypeCon {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeCon {}

impl std::hash::Hash for TypeCon {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for TypeCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_prefix {
            Some(p) => write!(f, "{p}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A type (§3 "Types"): `Var`/`Con`/`App` plus the structural shortcuts
/// `Tuple`/`List`/`Fun`. `Forall`/`Constrained` live only in [`Scheme`] --
/// a bare `Type` here is always a monotype, matching §3's "a monotype
/// contains no ForallType" invariant by construction rather than by a
/// runtime check.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Meta(MetaTv),
    Rigid(TypeVar),
    Con(TypeCon),
    App(Box<Type>, Vec<Type>),
    Fun(Box<Type>, Box<Type>),
    Tuple(Vec<Type>),
    List(Box<Type>),
}

impl Type {
    pub fn fun(param: Type, result: Type) -> Type {
        Type::Fun(Box::new(param), Box::new(result))
    }

    pub fn curried_fun(params: impl IntoIterator<Item = Type, IntoIter: DoubleEndedIterator>, result: Type) -> Type {
        params.into_iter().rev().fold(result, |acc, p| Type::fun(p, acc))
    }

    pub fn app(head: Type, args: Vec<Type>) -> Type {
        if args.is_empty() {
            head
        } else {
            Type::App(Box::new(head), args)
        }
    }

    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Meta(v) => write!(f, "t{}", v.0),
            Type::Rigid(v) => write!(f, "{v}"),
            Type::Con(c) => write!(f, "{c}"),
            Type::Fun(p, r) => {
                if matches!(**p, Type::Fun(..)) {
                    write!(f, "({p}) -> {r}")
                } else {
                    write!(f, "{p} -> {r}")
                }
            }
            Type::App(head, args) => {
                write!(f, "{head}")?;
                for a in args {
                    write!(f, " {a}")?;
                }
                Ok(())
            }
            Type::Tuple(elems) => {
                write!(f, "(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
            Type::List(elem) => write!(f, "[{elem}]"),
        }
    }
}

/// A class constraint `C τ₁…τₙ`, represented as the applied head-class
/// name plus its argument types (§3 "Contexts and constraints").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredType {
    pub class: String,
    pub args: Vec<Type>,
}

impl PredType {
    pub fn new(class: impl Into<String>, args: Vec<Type>) -> Self {
        PredType { class: class.into(), args }
    }

    /// Head-normal form: every argument's head is a type variable
    /// (possibly applied to further arguments), never a saturated type
    /// constructor (§3).
    pub fn is_hnf(&self) -> bool {
        self.args.iter().all(|a| arg_is_hnf(a))
    }
}

fn arg_is_hnf(ty: &Type) -> bool {
    match ty {
        Type::Meta(_) | Type::Rigid(_) => true,
        Type::App(head, _) => arg_is_hnf(head),
        _ => false,
    }
}

impl fmt::Display for PredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// A polytype / type scheme `∀ vs. (Q ⇒ τ)` (§3, GLOSSARY).
#[derive(Clone, Debug)]
pub struct Scheme {
    pub vars: Vec<TypeVar>,
    pub context: Vec<PredType>,
    pub ty: Type,
}

impl Scheme {
    pub fn mono(ty: Type) -> Self {
        Scheme { vars: Vec::new(), context: Vec::new(), ty }
    }

    pub fn is_monomorphic(&self) -> bool {
        self.vars.is_empty() && self.context.is_empty()
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vars.is_empty() {
            write!(f, "forall")?;
            for v in &self.vars {
                write!(f, " {v}")?;
            }
            write!(f, ". ")?;
        }
        if !self.context.is_empty() {
            write!(f, "(")?;
            for (i, c) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{c}")?;
            }
            write!(f, ") => ")?;
        }
        write!(f, "{}", self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_function_type_parenthesizes_function_argument() {
        let int = Type::Con(TypeCon::new("Int", Kind::Star));
        let f = Type::fun(Type::fun(int.clone(), int.clone()), int);
        assert_eq!(format!("{f}"), "(Int -> Int) -> Int");
    }

    #[test]
    fn hnf_constraint_on_bare_var_is_hnf() {
        let v = Type::Rigid(TypeVar::new("a", Kind::Star));
        let pred = PredType::new("Eq", vec![v]);
        assert!(pred.is_hnf());
    }

    #[test]
    fn constraint_on_saturated_tycon_is_not_hnf() {
        let int = Type::Con(TypeCon::new("Int", Kind::Star));
        let pred = PredType::new("Eq", vec![int]);
        assert!(!pred.is_hnf());
    }

    #[test]
    fn constraint_on_applied_var_is_hnf() {
        let v = Type::Rigid(TypeVar::new("f", Kind::fun(Kind::Star, Kind::Star)));
        let inner = Type::Rigid(TypeVar::new("a", Kind::Star));
        let applied = Type::App(Box::new(v), vec![inner]);
        let pred = PredType::new("Functor", vec![applied]);
        assert!(pred.is_hnf());
    }
}
