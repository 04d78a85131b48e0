//! Unification over [`Type`] (§4.4.2): `InferCtx`'s `ena` table, the
//! occurs check, kind agreement, and substitution application.
//!
//! Mechanically grounded on `mesh-typeck/src/unify.rs`'s `resolve`/
//! `occurs_in`/`unify` structure and its `ena::unify::InPlaceUnificationTable`
//! use. Departs from it in one deliberate way: Mesh's `InferCtx` tracks a
//! `current_level`/`var_levels` pair for level-based generalization. This
//! checker generalizes by comparing free meta-variables against the
//! enclosing environment instead (§4.4.3), so there is no level bookkeeping
//! here at all -- see `decls.rs::generalize`.

use ena::unify::{InPlaceUnificationTable, UnifyKey};

use crate::error::{ConstraintOrigin, TypeError};
use crate::ty::{MetaTv, Type};

/// Owns the meta-type-variable unification table. A thin wrapper so
/// `InferCtx` (in `lib.rs`) can hand out `&mut UnifyTable` without
/// exposing the rest of its state to every helper in this module.
#[derive(Default)]
pub struct UnifyTable {
    table: InPlaceUnificationTable<MetaTv>,
}

impl UnifyTable {
    pub fn new() -> Self {
        UnifyTable::default()
    }

    pub fn fresh(&mut self) -> MetaTv {
        self.table.new_key(None)
    }

    pub fn snapshot(&mut self) -> ena::unify::Snapshot<InPlaceUnificationTable<MetaTv>> {
        self.table.snapshot()
    }

    pub fn rollback_to(&mut self, snap: ena::unify::Snapshot<InPlaceUnificationTable<MetaTv>>) {
        self.table.rollback_to(snap);
    }

    pub fn commit(&mut self, snap: ena::unify::Snapshot<InPlaceUnificationTable<MetaTv>>) {
        self.table.commit(snap);
    }

    /// Follows a meta-variable to the representative of its union-find
    /// class, returning the filled type if one is known.
    pub fn probe(&mut self, v: MetaTv) -> Option<Type> {
        self.table.probe_value(v)
    }

    pub fn find(&mut self, v: MetaTv) -> MetaTv {
        self.table.find(v)
    }

    /// Follows filled meta-variables to a normal form: any `Type::Meta`
    /// still present in the result is genuinely unfilled. Does not
    /// recurse into an already-resolved `Type` looking for further fills
    /// beyond what `probe` reveals at each level -- callers that need a
    /// deep normal form should use [`zonk`].
    pub fn resolve(&mut self, ty: &Type) -> Type {
        match ty {
            Type::Meta(v) => {
                let root = self.find(*v);
                match self.probe(root) {
                    Some(bound) => self.resolve(&bound),
                    None => Type::Meta(root),
                }
            }
            other => other.clone(),
        }
    }

    fn occurs_in(&mut self, v: MetaTv, ty: &Type) -> bool {
        match self.resolve(ty) {
            Type::Meta(other) => self.find(v) == self.find(other),
            Type::Rigid(_) | Type::Con(_) => false,
            Type::App(head, args) => {
                self.occurs_in(v, &head) || args.iter().any(|a| self.occurs_in(v, a))
            }
            Type::Fun(p, r) => self.occurs_in(v, &p) || self.occurs_in(v, &r),
            Type::Tuple(elems) => elems.iter().any(|e| self.occurs_in(v, e)),
            Type::List(elem) => self.occurs_in(v, &elem),
        }
    }

    /// Unifies `expected` and `found`, throwing a [`TypeError`] on mismatch
    /// or occurs-check failure. Kind agreement between the two sides is
    /// assumed already established by `hsc-kinds`, so this only compares
    /// structural shape.
    pub fn unify(&mut self, expected: &Type, found: &Type, origin: ConstraintOrigin) -> Result<(), TypeError> {
        let a = self.resolve(expected);
        let b = self.resolve(found);
        match (&a, &b) {
            (Type::Meta(v1), Type::Meta(v2)) => {
                let v1 = self.find(*v1);
                let v2 = self.find(*v2);
                if v1 != v2 {
                    self.table
                        .unify_var_var(v1, v2)
                        .expect("MetaTv unification is infallible (EqUnifyValue blanket impl)");
                }
                Ok(())
            }
            (Type::Meta(v), other) | (other, Type::Meta(v)) => {
                let v = self.find(*v);
                if self.occurs_in(v, other) {
                    return Err(TypeError::OccursCheck {
                        var: format!("t{}", v.0),
                        ty: other.to_string(),
                        origin,
                    });
                }
                self.table
                    .unify_var_value(v, Some(other.clone()))
                    .expect("MetaTv unification is infallible (EqUnifyValue blanket impl)");
                Ok(())
            }
            (Type::Rigid(v1), Type::Rigid(v2)) => {
                if v1 == v2 {
                    Ok(())
                } else {
                    Err(mismatch(&a, &b, origin))
                }
            }
            (Type::Con(c1), Type::Con(c2)) => {
                if c1 == c2 {
                    Ok(())
                } else {
                    Err(mismatch(&a, &b, origin))
                }
            }
            (Type::Fun(p1, r1), Type::Fun(p2, r2)) => {
                self.unify(p1, p2, origin.clone())?;
                self.unify(r1, r2, origin)
            }
            (Type::List(e1), Type::List(e2)) => self.unify(e1, e2, origin),
            (Type::Tuple(es1), Type::Tuple(es2)) => {
                if es1.len() != es2.len() {
                    return Err(mismatch(&a, &b, origin));
                }
                for (e1, e2) in es1.iter().zip(es2) {
                    self.unify(e1, e2, origin.clone())?;
                }
                Ok(())
            }
            (Type::App(h1, as1), Type::App(h2, as2)) => {
                if as1.len() != as2.len() {
                    return Err(mismatch(&a, &b, origin));
                }
                self.unify(h1, h2, origin.clone())?;
                for (x1, x2) in as1.iter().zip(as2) {
                    self.unify(x1, x2, origin.clone())?;
                }
                Ok(())
            }
            _ => Err(mismatch(&a, &b, origin)),
        }
    }

    /// Non-throwing variant (§4.4.2 "`maybe_unify`"): attempts the
    /// unification inside a snapshot, rolling back on failure so the
    /// table is left exactly as it was. Used by instance lookup, where a
    /// failed match must not leave partial bindings behind.
    pub fn maybe_unify(&mut self, expected: &Type, found: &Type) -> bool {
        let snap = self.snapshot();
        let ok = self.unify(expected, found, ConstraintOrigin::InstanceLookup).is_ok();
        if ok {
            self.commit(snap);
        } else {
            self.rollback_to(snap);
        }
        ok
    }

    /// Fully resolves every meta-variable reachable from `ty`, recursing
    /// into resolved substructure (unlike [`resolve`], which stops at the
    /// first unfilled variable it meets at each position).
    pub fn zonk(&mut self, ty: &Type) -> Type {
        match self.resolve(ty) {
            Type::Meta(v) => Type::Meta(v),
            Type::Rigid(v) => Type::Rigid(v),
            Type::Con(c) => Type::Con(c),
            Type::Fun(p, r) => Type::fun(self.zonk(&p), self.zonk(&r)),
            Type::List(e) => Type::list(self.zonk(&e)),
            Type::Tuple(es) => Type::Tuple(es.iter().map(|e| self.zonk(e)).collect()),
            Type::App(h, args) => Type::App(Box::new(self.zonk(&h)), args.iter().map(|a| self.zonk(a)).collect()),
        }
    }
}

fn mismatch(expected: &Type, found: &Type, origin: ConstraintOrigin) -> TypeError {
    TypeError::TypeMismatch { expected: expected.to_string(), found: found.to_string(), origin }
}

/// Collects every distinct unfilled meta-variable reachable from `ty`
/// (after following bindings shallowly -- callers typically zonk first).
/// Used by generalization and defaulting, which both need "the meta-vars
/// mentioned here" without a live `&mut UnifyTable` on hand.
pub fn free_meta_vars_in_type(ty: &Type, out: &mut Vec<MetaTv>) {
    match ty {
        Type::Meta(v) => {
            if !out.contains(v) {
                out.push(*v);
            }
        }
        Type::Rigid(_) | Type::Con(_) => {}
        Type::Fun(p, r) => {
            free_meta_vars_in_type(p, out);
            free_meta_vars_in_type(r, out);
        }
        Type::List(e) => free_meta_vars_in_type(e, out),
        Type::Tuple(es) => es.iter().for_each(|e| free_meta_vars_in_type(e, out)),
        Type::App(h, args) => {
            free_meta_vars_in_type(h, out);
            args.iter().for_each(|a| free_meta_vars_in_type(a, out));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::TypeCon;
    use hsc_kinds::Kind;

    fn int() -> Type {
        Type::Con(TypeCon::new("Int", Kind::Star))
    }

    #[test]
    fn unifies_meta_var_with_concrete_type() {
        let mut t = UnifyTable::new();
        let v = t.fresh();
        t.unify(&Type::Meta(v), &int(), ConstraintOrigin::Application).unwrap();
        assert_eq!(t.resolve(&Type::Meta(v)), int());
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let mut t = UnifyTable::new();
        let v = t.fresh();
        let list_of_v = Type::list(Type::Meta(v));
        let err = t.unify(&Type::Meta(v), &list_of_v, ConstraintOrigin::Application);
        assert!(matches!(err, Err(TypeError::OccursCheck { .. })));
    }

    #[test]
    fn mismatched_concrete_constructors_fail() {
        let mut t = UnifyTable::new();
        let bool_ty = Type::Con(TypeCon::new("Bool", Kind::Star));
        let err = t.unify(&int(), &bool_ty, ConstraintOrigin::Application);
        assert!(matches!(err, Err(TypeError::TypeMismatch { .. })));
    }

    #[test]
    fn maybe_unify_leaves_table_untouched_on_failure() {
        let mut t = UnifyTable::new();
        let v = t.fresh();
        let bool_ty = Type::Con(TypeCon::new("Bool", Kind::Star));
        assert!(!t.maybe_unify(&int(), &bool_ty));
        assert_eq!(t.resolve(&Type::Meta(v)), Type::Meta(v));
    }

    #[test]
    fn zonk_recurses_through_filled_structure() {
        let mut t = UnifyTable::new();
        let v1 = t.fresh();
        let v2 = t.fresh();
        t.unify(&Type::Meta(v1), &int(), ConstraintOrigin::Application).unwrap();
        let ty = Type::list(Type::Meta(v1));
        assert_eq!(t.zonk(&ty), Type::list(int()));
        assert_eq!(t.zonk(&Type::Meta(v2)), Type::Meta(t.find(v2)));
    }
}
