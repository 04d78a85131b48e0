//! The environments threaded through inference (§3 "Environments"):
//! TCE (type constructor env), CVE (constructor value env), GVE (global
//! value env), LVE (local value env, a scope stack), plus the class and
//! instance environments used by constraint solving (§4.4.6/4.4.10).
//!
//! Grounded on `snow-typeck/src/env.rs`'s scope-stack shape, generalized
//! from Mesh's single value namespace into the five namespaces §3 names.

use rustc_hash::FxHashMap;

use crate::ty::{PredType, Scheme, Type, TypeCon};

/// The type constructor environment: maps type constructor names to their
/// `TypeCon` (name + kind), mirroring `hsc_kinds::Tce` one layer up now
/// that kinds have already been checked.
#[derive(Clone, Debug, Default)]
pub struct Tce {
    cons: FxHashMap<String, TypeCon>,
}

impl Tce {
    pub fn new() -> Self {
        Tce::default()
    }

    pub fn insert(&mut self, con: TypeCon) {
        self.cons.insert(con.name.clone(), con);
    }

    pub fn get(&self, name: &str) -> Option<&TypeCon> {
        self.cons.get(name)
    }
}

/// The constructor value environment: maps data/newtype constructor names
/// to their polytype (e.g. `Just :: ∀a. a -> Maybe a`).
#[derive(Clone, Debug, Default)]
pub struct Cve {
    ctors: FxHashMap<String, Scheme>,
}

impl Cve {
    pub fn new() -> Self {
        Cve::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, scheme: Scheme) {
        self.ctors.insert(name.into(), scheme);
    }

    pub fn get(&self, name: &str) -> Option<&Scheme> {
        self.ctors.get(name)
    }
}

/// The global value environment: top-level bindings' polytypes, populated
/// as each let-generalized SCC finishes (§4.4.8).
#[derive(Clone, Debug, Default)]
pub struct Gve {
    bindings: FxHashMap<String, Scheme>,
}

impl Gve {
    pub fn new() -> Self {
        Gve::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, scheme: Scheme) {
        self.bindings.insert(name.into(), scheme);
    }

    pub fn get(&self, name: &str) -> Option<&Scheme> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}

/// The local value environment: a stack of scopes, innermost last, each
/// holding monotypes or (for signatured let-bound polymorphic recursion)
/// polytypes introduced by lambda/case/let/where/pattern binders.
#[derive(Clone, Debug, Default)]
pub struct Lve {
    scopes: Vec<FxHashMap<String, Scheme>>,
}

impl Lve {
    pub fn new() -> Self {
        Lve { scopes: vec![FxHashMap::default()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "popped the root LVE scope");
    }

    pub fn bind(&mut self, name: impl Into<String>, scheme: Scheme) {
        self.scopes
            .last_mut()
            .expect("LVE always has at least one scope")
            .insert(name.into(), scheme);
    }

    pub fn bind_mono(&mut self, name: impl Into<String>, ty: Type) {
        self.bind(name, Scheme::mono(ty));
    }

    pub fn lookup(&self, name: &str) -> Option<&Scheme> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Every meta-variable free in any binding currently in scope, used by
    /// generalization to compute "free in the enclosing environment"
    /// (§4.4.3, §4.4.8).
    pub fn free_meta_vars(&self, out: &mut Vec<crate::ty::MetaTv>) {
        for scope in &self.scopes {
            for scheme in scope.values() {
                crate::unify::free_meta_vars_in_type(&scheme.ty, out);
                for pred in &scheme.context {
                    for arg in &pred.args {
                        crate::unify::free_meta_vars_in_type(arg, out);
                    }
                }
            }
        }
    }
}

/// A class declaration's static shape (§4.4.10): its parameter kinds are
/// already recorded in `hsc_kinds`'s output, so this only needs the
/// superclass context, method signatures, and the dictionary field order
/// (superclasses first, then methods, matching the elaborated dictionary
/// record layout).
#[derive(Clone, Debug)]
pub struct ClassInfo {
    pub name: String,
    pub param: crate::ty::TypeVar,
    pub superclasses: Vec<PredType>,
    /// Method name -> its polytype, quantified over `param` plus any of
    /// the method's own signature variables, with `superclasses` and the
    /// class's own `param`-headed constraint folded into its context.
    pub methods: FxHashMap<String, Scheme>,
    /// Method names in declaration order, fixing the dictionary record's
    /// field order after the superclass dict fields.
    pub method_order: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ClassEnv {
    classes: FxHashMap<String, ClassInfo>,
}

impl ClassEnv {
    pub fn new() -> Self {
        ClassEnv::default()
    }

    pub fn insert(&mut self, info: ClassInfo) {
        self.classes.insert(info.name.clone(), info);
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Every registered class name, for the superclass-cycle DFS to start
    /// from each class in turn.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.keys().map(|s| s.as_str())
    }

    /// All superclasses of `class`, transitively, used by `extract` (§3
    /// "Evidence") to walk from a subclass dictionary to a superclass one.
    pub fn superclasses_transitive(&self, class: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![class.to_string()];
        while let Some(c) = stack.pop() {
            if let Some(info) = self.classes.get(&c) {
                for sup in &info.superclasses {
                    if !out.contains(&sup.class) {
                        out.push(sup.class.clone());
                        stack.push(sup.class.clone());
                    }
                }
            }
        }
        out
    }
}

/// One resolved instance `∀vs. Q ⇒ C τ1…τn` (§4.4.10), keyed by class name
/// in [`InstanceEnv`]. `dfun_name` is the top-level binding the elaborator
/// emits for this instance's dictionary-building function.
#[derive(Clone, Debug)]
pub struct InstanceInfo {
    pub dfun_name: String,
    pub vars: Vec<crate::ty::TypeVar>,
    pub context: Vec<PredType>,
    pub head: PredType,
}

#[derive(Clone, Debug, Default)]
pub struct InstanceEnv {
    by_class: FxHashMap<String, Vec<InstanceInfo>>,
}

impl InstanceEnv {
    pub fn new() -> Self {
        InstanceEnv::default()
    }

    pub fn insert(&mut self, info: InstanceInfo) {
        self.by_class.entry(info.head.class.clone()).or_default().push(info);
    }

    pub fn for_class(&self, class: &str) -> &[InstanceInfo] {
        self.by_class.get(class).map(Vec::as_slice).unwrap_or(&[])
    }
}
