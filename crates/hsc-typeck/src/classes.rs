//! Constraint solving (§4.4.6): head-normal-form reduction, superclass
//! simplification, entailment, and instance lookup with overlap rejection.
//!
//! Grounded on `mesh-typeck/src/traits.rs`'s `TraitRegistry::find_impl`
//! (instance search via one-way unification against a registry keyed by
//! trait name) generalized to this language's dictionary-passing model:
//! where Mesh's resolver returns an `ImplDef` reference, this one emits an
//! explicit evidence *term* (`dfun d1 … dk` or `extract` projection) per
//! §3 "Evidence", since dictionaries here are ordinary values, not a
//! monomorphization-time-only concept.

use crate::elaborated::Evidence;
use crate::env::{ClassEnv, InstanceEnv};
use crate::error::{ConstraintOrigin, TypeError};
use crate::lie::{EvidenceVar, LieStack};
use crate::ty::{PredType, Type, TypeVar};
use crate::unify::UnifyTable;

/// Reduces `pred` to head-normal form, producing the evidence term that
/// builds a dictionary for it. If `pred` is already HNF (its argument's
/// head is a variable), the evidence is just the already-wanted variable
/// -- reduction bottoms out at instantiation, which registered it in the
/// LIE. Otherwise an instance must apply, and reduction recurses into that
/// instance's context.
pub fn hnf_reduce(
    pred: &PredType,
    ev: EvidenceVar,
    table: &mut UnifyTable,
    classes: &ClassEnv,
    instances: &InstanceEnv,
    lie: &mut LieStack,
    origin: ConstraintOrigin,
) -> Result<Evidence, TypeError> {
    if pred.is_hnf() {
        return Ok(Evidence::Var(ev));
    }
    let candidates: Vec<_> = instances
        .for_class(&pred.class)
        .iter()
        .filter(|inst| {
            let fresh = instantiate_instance_head(inst, table);
            let matches = table.maybe_unify(&pred_to_type(pred), &pred_to_type(&fresh));
            matches
        })
        .collect();
    let inst = match candidates.as_slice() {
        [one] => one,
        [] => {
            return Err(TypeError::NoInstance { constraint: pred.to_string(), origin });
        }
        _ => {
            return Err(TypeError::NoInstance {
                constraint: format!("{pred} (ambiguous: multiple matching instances)"),
                origin,
            });
        }
    };
    let (fresh_vars, fresh_context, fresh_head) = instantiate_instance(inst, table);
    table.unify(&pred_to_type(pred), &pred_to_type(&fresh_head), origin.clone())?;
    let _ = fresh_vars;
    let mut dict_args = Vec::new();
    for sub_pred in &fresh_context {
        let sub_ev = lie.want(sub_pred.clone());
        let sub_evidence = hnf_reduce(sub_pred, sub_ev, table, classes, instances, lie, ConstraintOrigin::SuperclassEntailment)?;
        dict_args.push(sub_evidence);
    }
    Ok(Evidence::Dfun { name: inst.dfun_name.clone(), args: dict_args })
}

fn instantiate_instance_head(inst: &crate::env::InstanceInfo, table: &mut UnifyTable) -> PredType {
    let (_, _, head) = instantiate_instance(inst, table);
    head
}

fn instantiate_instance(
    inst: &crate::env::InstanceInfo,
    table: &mut UnifyTable,
) -> (Vec<Type>, Vec<PredType>, PredType) {
    let fresh: Vec<Type> = inst.vars.iter().map(|_| Type::Meta(table.fresh())).collect();
    let subst = |ty: &Type| substitute_rigids(ty, &inst.vars, &fresh);
    let context = inst.context.iter().map(|p| PredType::new(p.class.clone(), p.args.iter().map(subst).collect())).collect();
    let head = PredType::new(inst.head.class.clone(), inst.head.args.iter().map(subst).collect());
    (fresh, context, head)
}

fn substitute_rigids(ty: &Type, vars: &[TypeVar], replacements: &[Type]) -> Type {
    match ty {
        Type::Rigid(v) => vars
            .iter()
            .position(|w| w == v)
            .map(|i| replacements[i].clone())
            .unwrap_or_else(|| ty.clone()),
        Type::Meta(_) | Type::Con(_) => ty.clone(),
        Type::Fun(p, r) => Type::fun(substitute_rigids(p, vars, replacements), substitute_rigids(r, vars, replacements)),
        Type::List(e) => Type::list(substitute_rigids(e, vars, replacements)),
        Type::Tuple(es) => Type::Tuple(es.iter().map(|e| substitute_rigids(e, vars, replacements)).collect()),
        Type::App(h, args) => Type::App(
            Box::new(substitute_rigids(h, vars, replacements)),
            args.iter().map(|a| substitute_rigids(a, vars, replacements)).collect(),
        ),
    }
}

/// A predicate's "type", for unification purposes: a synthetic
/// application of a constant tagged by class name to its arguments. Not a
/// real `TypeCon` in the TCE -- this only ever flows through
/// `UnifyTable::maybe_unify`/`unify`, never into an environment.
fn pred_to_type(pred: &PredType) -> Type {
    let head = Type::Con(crate::ty::TypeCon::new(format!("#class:{}", pred.class), hsc_kinds::Kind::Star));
    Type::app(head, pred.args.clone())
}

/// Simplification by superclasses (§4.4.6): if `kept` already entails
/// `candidate` via `extract`, drop `candidate` and record its evidence as
/// a superclass projection from `kept`'s dictionary.
pub fn try_simplify_by_superclass(
    kept_pred: &PredType,
    kept_ev: EvidenceVar,
    candidate: &PredType,
    classes: &ClassEnv,
) -> Option<Evidence> {
    if kept_pred.args != candidate.args {
        return None;
    }
    let path = extract_path(classes, &kept_pred.class, &candidate.class)?;
    let mut evidence = Evidence::Var(kept_ev);
    for step in path {
        evidence = Evidence::Extract { class: step, dict: Box::new(evidence) };
    }
    Some(evidence)
}

/// Finds a chain of immediate-superclass steps from `from` down to `to`,
/// returning the classes to project through in order (innermost first).
fn extract_path(classes: &ClassEnv, from: &str, to: &str) -> Option<Vec<String>> {
    if from == to {
        return Some(Vec::new());
    }
    let info = classes.get(from)?;
    for sup in &info.superclasses {
        if sup.class == to {
            return Some(vec![to.to_string()]);
        }
        if let Some(mut rest) = extract_path(classes, &sup.class, to) {
            rest.insert(0, sup.class.clone());
            return Some(rest);
        }
    }
    None
}

/// Entailment (§4.4.6 "`entails(givens, wanted)`"): true if every
/// predicate in `wanted` is a given, or a superclass of a given, under
/// exact (no-unification) structural match -- used to check a
/// signatured binding's body only uses what its signature promised.
pub fn entails(givens: &[PredType], wanted: &PredType, classes: &ClassEnv) -> bool {
    givens.iter().any(|g| {
        g.args == wanted.args && (g.class == wanted.class || extract_path(classes, &g.class, &wanted.class).is_some())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ClassInfo;
    use hsc_kinds::Kind;
    use rustc_hash::FxHashMap;

    fn class_env_with_eq_ord() -> ClassEnv {
        let mut env = ClassEnv::new();
        let a = TypeVar::new("a", Kind::Star);
        env.insert(ClassInfo {
            name: "Eq".into(),
            param: a.clone(),
            superclasses: vec![],
            methods: FxHashMap::default(),
            method_order: vec!["eq".into()],
        });
        env.insert(ClassInfo {
            name: "Ord".into(),
            param: a.clone(),
            superclasses: vec![PredType::new("Eq", vec![Type::Rigid(a.clone())])],
            methods: FxHashMap::default(),
            method_order: vec!["lt".into()],
        });
        env
    }

    #[test]
    fn entails_direct_given() {
        let classes = class_env_with_eq_ord();
        let a = Type::Rigid(TypeVar::new("a", Kind::Star));
        let givens = vec![PredType::new("Eq", vec![a.clone()])];
        assert!(entails(&givens, &PredType::new("Eq", vec![a]), &classes));
    }

    #[test]
    fn entails_via_superclass() {
        let classes = class_env_with_eq_ord();
        let a = Type::Rigid(TypeVar::new("a", Kind::Star));
        let givens = vec![PredType::new("Ord", vec![a.clone()])];
        assert!(entails(&givens, &PredType::new("Eq", vec![a]), &classes));
    }

    #[test]
    fn entails_fails_without_given() {
        let classes = class_env_with_eq_ord();
        let a = Type::Rigid(TypeVar::new("a", Kind::Star));
        let givens: Vec<PredType> = vec![];
        assert!(!entails(&givens, &PredType::new("Eq", vec![a]), &classes));
    }

    #[test]
    fn extract_path_finds_transitive_superclass() {
        let classes = class_env_with_eq_ord();
        let path = extract_path(&classes, "Ord", "Eq");
        assert_eq!(path, Some(vec!["Eq".to_string()]));
    }
}
