//! Defaulting (§4.4.9), grounded directly on
//! `original_source/src/computation/typecheck/default.cc`: `ambiguities`
//! partitions a reduced LIE into ambiguous and non-ambiguous meta-vars,
//! `candidates` checks one variable's eligibility, and `default_preds`
//! tries each module default type in order, using `ena`'s snapshot/
//! rollback (via [`UnifyTable`]) instead of a hand-rolled undo log.

use rustc_hash::FxHashMap;

use crate::builtins::{is_standard_class, NUMERIC_CLASSES};
use crate::classes::hnf_reduce;
use crate::env::{ClassEnv, InstanceEnv};
use crate::error::{ConstraintOrigin, TypeError};
use crate::lie::{EvidenceVar, Lie, LieStack};
use crate::ty::{MetaTv, Type};
use crate::unify::{free_meta_vars_in_type, UnifyTable};

/// A retained LIE entry grouped by the meta-variable it constrains, the
/// shape `ambiguities`/`candidates` operate over. Built by the caller
/// (`decls.rs`) from the retained partition of a group's reduced LIE.
pub struct Ambiguity {
    pub var: MetaTv,
    pub constraints: Vec<(EvidenceVar, String)>,
}

/// Finds every meta-variable that is free in the reduced LIE but not free
/// in any binder's type nor the enclosing environment -- exactly
/// `default.cc`'s `ambiguities` query.
pub fn ambiguities(reduced: &Lie, table: &mut UnifyTable, determined: &[MetaTv]) -> Vec<Ambiguity> {
    let mut by_var: FxHashMap<MetaTv, Vec<(EvidenceVar, String)>> = FxHashMap::default();
    for (&ev, pred) in reduced {
        let mut vars = Vec::new();
        for arg in &pred.args {
            let resolved = table.zonk(arg);
            free_meta_vars_in_type(&resolved, &mut vars);
        }
        for v in vars {
            if determined.contains(&v) {
                continue;
            }
            by_var.entry(v).or_default().push((ev, pred.class.clone()));
        }
    }
    by_var.into_iter().map(|(var, constraints)| Ambiguity { var, constraints }).collect()
}

/// Eligibility (§4.4.9): every constraint on the variable must be a
/// simple `K v` (exactly this one variable, no further structure), at
/// least one of the classes must be numeric, and every class must be in
/// the standard set.
pub fn is_eligible(ambiguity: &Ambiguity, reduced: &Lie, var: MetaTv, table: &mut UnifyTable) -> bool {
    let mut has_numeric = false;
    for (ev, _) in &ambiguity.constraints {
        let Some(pred) = reduced.get(ev) else { continue };
        if !is_standard_class(&pred.class) {
            return false;
        }
        if NUMERIC_CLASSES.contains(&pred.class.as_str()) {
            has_numeric = true;
        }
        if pred.args.len() != 1 {
            return false;
        }
        let arg = table.zonk(&pred.args[0]);
        if arg != Type::Meta(var) {
            return false;
        }
    }
    has_numeric
}

/// Tries every default type in order, using a snapshot so a failed trial
/// leaves the table untouched before the next is attempted (§4.4.9
/// "trial and rollback"). Returns the evidence bindings produced by
/// successfully discharging the variable's constraints against the
/// chosen default, or a type error if every default fails.
pub fn default_preds(
    ambiguity: &Ambiguity,
    reduced: &Lie,
    default_types: &[Type],
    table: &mut UnifyTable,
    classes: &ClassEnv,
    instances: &InstanceEnv,
    lie: &mut LieStack,
) -> Result<Vec<(EvidenceVar, crate::elaborated::Evidence)>, TypeError> {
    'outer: for default_ty in default_types {
        let snap = table.snapshot();
        let mut bindings = Vec::new();
        if table.unify(&Type::Meta(ambiguity.var), default_ty, ConstraintOrigin::Other("defaulting".into())).is_err() {
            table.rollback_to(snap);
            continue;
        }
        for (ev, class) in &ambiguity.constraints {
            let Some(pred) = reduced.get(ev) else { continue };
            let _ = class;
            match hnf_reduce(pred, *ev, table, classes, instances, lie, ConstraintOrigin::Other("defaulting".into())) {
                Ok(evidence) => bindings.push((*ev, evidence)),
                Err(_) => {
                    table.rollback_to(snap);
                    continue 'outer;
                }
            }
        }
        table.commit(snap);
        return Ok(bindings);
    }
    let classlist = ambiguity.constraints.iter().map(|(_, c)| c.clone()).collect::<Vec<_>>();
    Err(TypeError::AmbiguousConstraint { var: format!("t{}", ambiguity.var.0), constraints: classlist })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::PredType;

    #[test]
    fn eligible_ambiguity_requires_numeric_class() {
        let mut table = UnifyTable::new();
        let v = table.fresh();
        let mut reduced = Lie::default();
        let ev = EvidenceVar(0);
        reduced.insert(ev, PredType::new("Eq", vec![Type::Meta(v)]));
        let ambiguity = Ambiguity { var: v, constraints: vec![(ev, "Eq".into())] };
        assert!(!is_eligible(&ambiguity, &reduced, v, &mut table));
    }

    #[test]
    fn eligible_ambiguity_with_num_and_eq() {
        let mut table = UnifyTable::new();
        let v = table.fresh();
        let mut reduced = Lie::default();
        let ev_num = EvidenceVar(0);
        let ev_eq = EvidenceVar(1);
        reduced.insert(ev_num, PredType::new("Num", vec![Type::Meta(v)]));
        reduced.insert(ev_eq, PredType::new("Eq", vec![Type::Meta(v)]));
        let ambiguity = Ambiguity { var: v, constraints: vec![(ev_num, "Num".into()), (ev_eq, "Eq".into())] };
        assert!(is_eligible(&ambiguity, &reduced, v, &mut table));
    }
}
