//! The LIE: a stack of wanted-constraint frames, each mapping a fresh
//! evidence variable to the predicate it is evidence for (§3 "Evidence",
//! GLOSSARY "LIE").
//!
//! Grounded on `mesh-typeck/src/unify.rs::InferCtx`'s `push_lie`/`pop_lie`/
//! `pop_and_add_lie` trio, generalized from Mesh's trait-bound bookkeeping
//! to the §4.4.3 instantiation rule: every time a polytype is instantiated,
//! each constraint in its context becomes one wanted entry in the current
//! (innermost) LIE frame.

use rustc_hash::FxHashMap;

use crate::ty::PredType;

/// A fresh evidence variable: a dictionary-argument placeholder produced
/// by instantiation and later either discharged by an entailment proof or
/// bound as a dictionary-parameter on an emitted `GenBind`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvidenceVar(pub u32);

impl std::fmt::Display for EvidenceVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// One frame: the constraints wanted since the frame was pushed.
pub type Lie = FxHashMap<EvidenceVar, PredType>;

/// A stack of LIE frames, one per enclosing let-binding group currently
/// being inferred (§4.4.8 pushes one frame per group).
#[derive(Default)]
pub struct LieStack {
    frames: Vec<Lie>,
    next_evidence: u32,
}

impl LieStack {
    pub fn new() -> Self {
        LieStack { frames: vec![Lie::default()], next_evidence: 0 }
    }

    pub fn fresh_evidence(&mut self) -> EvidenceVar {
        let v = EvidenceVar(self.next_evidence);
        self.next_evidence += 1;
        v
    }

    /// Instantiation's per-constraint step: mint a fresh evidence variable,
    /// record it as wanted in the current frame, and return it so the
    /// elaborator can apply it as a dictionary argument at the use site.
    pub fn want(&mut self, pred: PredType) -> EvidenceVar {
        let ev = self.fresh_evidence();
        self.frames.last_mut().expect("LIE stack always has a frame").insert(ev, pred);
        ev
    }

    pub fn push_lie(&mut self) {
        self.frames.push(Lie::default());
    }

    /// Pops the current frame, discarding it (used when the frame's
    /// contents have already been folded into the parent by `want`, or
    /// when a scope closes without needing its own obligations).
    pub fn pop_lie(&mut self) -> Lie {
        self.frames.pop().expect("popped the root LIE frame")
    }

    /// Pops the current frame and merges its entries into the new top
    /// frame, for scopes (like a nested `let`'s RHS) whose wanted
    /// constraints should propagate to the enclosing group rather than
    /// be solved locally.
    pub fn pop_and_add_lie(&mut self) {
        let popped = self.pop_lie();
        self.frames
            .last_mut()
            .expect("LIE stack always has a frame")
            .extend(popped);
    }

    pub fn current(&self) -> &Lie {
        self.frames.last().expect("LIE stack always has a frame")
    }

    pub fn current_mut(&mut self) -> &mut Lie {
        self.frames.last_mut().expect("LIE stack always has a frame")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{Type, TypeVar};
    use hsc_kinds::Kind;

    #[test]
    fn want_records_in_current_frame() {
        let mut lie = LieStack::new();
        let a = Type::Rigid(TypeVar::new("a", Kind::Star));
        let ev = lie.want(PredType::new("Num", vec![a]));
        assert_eq!(lie.current().get(&ev).unwrap().class, "Num");
    }

    #[test]
    fn pop_and_add_merges_into_parent() {
        let mut lie = LieStack::new();
        let a = Type::Rigid(TypeVar::new("a", Kind::Star));
        lie.push_lie();
        let ev = lie.want(PredType::new("Eq", vec![a]));
        lie.pop_and_add_lie();
        assert!(lie.current().contains_key(&ev));
    }
}
