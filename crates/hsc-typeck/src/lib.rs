//! Hindley-Milner type checking and dictionary-passing elaboration (§4.4):
//! unification, instantiation/generalization, pattern and expression
//! inference, constraint solving, let-binding-group generalization with
//! the monomorphism restriction, defaulting, and class/instance
//! dictionary synthesis.
//!
//! `InferCtx` is this crate's centerpiece, grounded on
//! `mesh-typeck::unify::InferCtx`: one unification table, one LIE stack,
//! the five §3 environments, and a non-fail-fast error accumulator. It
//! generalizes by comparing a binding's free meta-variables against the
//! enclosing environment rather than Mesh's level-based scheme (§4.4.3).

pub mod builtins;
pub mod classes;
pub mod decls;
pub mod defaulting;
pub mod diagnostics;
pub mod elaborated;
pub mod env;
pub mod error;
pub mod expr;
pub mod lie;
pub mod pat;
pub mod ty;
pub mod unify;

use env::{ClassEnv, Cve, Gve, InstanceEnv, Lve, Tce};
use error::{ConstraintOrigin, TypeError};
use lie::LieStack;
use ty::{MetaTv, PredType, Scheme, Type, TypeVar};
use unify::{free_meta_vars_in_type, UnifyTable};

/// The inference context threaded through every pattern/expression/
/// declaration check. Owns the unification table, the LIE stack, the five
/// environments, the fixed module default-type list, and the running
/// error accumulator (errors are collected, not raised, matching
/// `mesh-typeck::unify::InferCtx.errors`).
pub struct InferCtx {
    pub table: UnifyTable,
    pub lie: LieStack,
    pub tce: Tce,
    pub cve: Cve,
    pub gve: Gve,
    pub lve: Lve,
    pub classes: ClassEnv,
    pub instances: InstanceEnv,
    pub default_types: Vec<Type>,
    pub errors: Vec<TypeError>,
    pub fixities: hsc_rename::FixityTable,
    next_rigid: u32,
}

impl InferCtx {
    pub fn new(builtins: builtins::Builtins) -> Self {
        InferCtx {
            table: UnifyTable::new(),
            lie: LieStack::new(),
            tce: builtins.tce,
            cve: builtins.cve,
            gve: builtins.gve,
            lve: Lve::new(),
            classes: builtins.classes,
            instances: builtins.instances,
            default_types: builtins::default_default_types(),
            errors: Vec::new(),
            fixities: hsc_rename::FixityTable::default(),
            next_rigid: 0,
        }
    }

    pub fn fresh_meta(&mut self) -> Type {
        Type::Meta(self.table.fresh())
    }

    /// Mints a fresh rigid type variable for generalization (§4.4.3), with
    /// a display name distinct from any the programmer wrote.
    pub fn fresh_rigid(&mut self, kind: hsc_kinds::Kind) -> TypeVar {
        let name = rigid_name(self.next_rigid);
        self.next_rigid += 1;
        TypeVar::new(name, kind)
    }

    pub fn report(&mut self, err: TypeError) {
        self.errors.push(err);
    }

    /// Instantiation (§4.4.3): replaces every quantified variable with a
    /// fresh meta-variable, and registers a fresh evidence variable in the
    /// current LIE frame for each constraint in the scheme's context
    /// (substituted the same way). Returns the instantiated monotype and
    /// the evidence applications the elaborator should apply at the use
    /// site, innermost-declared-constraint first.
    pub fn instantiate(&mut self, scheme: &Scheme) -> (Type, Vec<elaborated::Evidence>) {
        let fresh: Vec<Type> = scheme.vars.iter().map(|_| self.fresh_meta()).collect();
        let subst = |ty: &Type| substitute_rigids(ty, &scheme.vars, &fresh);
        let mut dict_args = Vec::new();
        for pred in &scheme.context {
            let substituted = PredType::new(pred.class.clone(), pred.args.iter().map(subst).collect());
            let ev = self.lie.want(substituted);
            dict_args.push(elaborated::Evidence::Var(ev));
        }
        (subst(&scheme.ty), dict_args)
    }

    /// Generalization (§4.4.3/§4.4.8 step 8): quantifies every meta-
    /// variable free in `ty` that is not free in the enclosing
    /// environment (and, if `restricted`, not free in the retained LIE
    /// either), promoting each to a fresh rigid variable and substituting
    /// it throughout `ty` and `retained_context`.
    pub fn generalize(
        &mut self,
        ty: &Type,
        retained_context: &[PredType],
        restricted: bool,
    ) -> (Vec<TypeVar>, Vec<PredType>, Type) {
        let zonked = self.table.zonk(ty);
        let mut candidate_vars = Vec::new();
        free_meta_vars_in_type(&zonked, &mut candidate_vars);
        for pred in retained_context {
            for arg in &pred.args {
                free_meta_vars_in_type(&self.table.zonk(arg), &mut candidate_vars);
            }
        }

        let mut enclosing = Vec::new();
        self.lve.free_meta_vars(&mut enclosing);

        let mut lie_vars = Vec::new();
        if restricted {
            for pred in self.lie.current().values() {
                for arg in &pred.args {
                    free_meta_vars_in_type(&self.table.zonk(arg), &mut lie_vars);
                }
            }
        }

        let to_quantify: Vec<MetaTv> = candidate_vars
            .into_iter()
            .filter(|v| !enclosing.contains(v))
            .filter(|v| !restricted || !lie_vars.contains(v))
            .collect();

        let fresh_rigids: Vec<TypeVar> = to_quantify.iter().map(|_| self.fresh_rigid(hsc_kinds::Kind::Star)).collect();

        let subst_meta = |t: &Type| replace_metas(t, &to_quantify, &fresh_rigids);
        let gen_ty = subst_meta(&zonked);
        let gen_context: Vec<PredType> = retained_context
            .iter()
            .map(|p| PredType::new(p.class.clone(), p.args.iter().map(|a| subst_meta(&self.table.zonk(a))).collect()))
            .collect();

        (fresh_rigids, gen_context, gen_ty)
    }

    /// [`InferCtx::generalize`] over several binder types at once, sharing
    /// one quantifier list and one set of dictionary parameters across
    /// all of them -- the shape a binding group's own generalization step
    /// needs (§4.4.8 general case, step 8: "the quantified set `qs` is the
    /// free meta-variables of *any* binder type").
    pub fn generalize_many(
        &mut self,
        tys: &[Type],
        retained_context: &[PredType],
        restricted: bool,
    ) -> (Vec<TypeVar>, Vec<PredType>, Vec<Type>) {
        let zonked: Vec<Type> = tys.iter().map(|t| self.table.zonk(t)).collect();
        let mut candidate_vars = Vec::new();
        for ty in &zonked {
            free_meta_vars_in_type(ty, &mut candidate_vars);
        }
        for pred in retained_context {
            for arg in &pred.args {
                free_meta_vars_in_type(&self.table.zonk(arg), &mut candidate_vars);
            }
        }

        let mut enclosing = Vec::new();
        self.lve.free_meta_vars(&mut enclosing);

        let mut lie_vars = Vec::new();
        if restricted {
            for pred in self.lie.current().values() {
                for arg in &pred.args {
                    free_meta_vars_in_type(&self.table.zonk(arg), &mut lie_vars);
                }
            }
        }

        let to_quantify: Vec<MetaTv> = candidate_vars
            .into_iter()
            .filter(|v| !enclosing.contains(v))
            .filter(|v| !restricted || !lie_vars.contains(v))
            .collect();

        let fresh_rigids: Vec<TypeVar> = to_quantify.iter().map(|_| self.fresh_rigid(hsc_kinds::Kind::Star)).collect();

        let subst_meta = |t: &Type| replace_metas(t, &to_quantify, &fresh_rigids);
        let gen_tys: Vec<Type> = zonked.iter().map(&subst_meta).collect();
        let gen_context: Vec<PredType> = retained_context
            .iter()
            .map(|p| PredType::new(p.class.clone(), p.args.iter().map(|a| subst_meta(&self.table.zonk(a))).collect()))
            .collect();

        (fresh_rigids, gen_context, gen_tys)
    }
}

/// Unifies `expected` against `found`, reporting a [`TypeError`] through
/// `ctx`'s error accumulator rather than raising (§4.4.6/§9: class lookup
/// and unification failures are explicit values, collected, not
/// exceptions -- the checker keeps going after a mismatch so a single
/// module run surfaces more than its first error).
pub fn expr_unify(ctx: &mut InferCtx, expected: &Type, found: &Type, origin: ConstraintOrigin) {
    if let Err(err) = ctx.table.unify(expected, found, origin) {
        ctx.report(err);
    }
}

fn rigid_name(i: u32) -> String {
    let letter = (b'a' + (i % 26) as u8) as char;
    if i < 26 {
        letter.to_string()
    } else {
        format!("{letter}{}", i / 26)
    }
}

fn substitute_rigids(ty: &Type, vars: &[TypeVar], replacements: &[Type]) -> Type {
    match ty {
        Type::Rigid(v) => vars.iter().position(|w| w == v).map(|i| replacements[i].clone()).unwrap_or_else(|| ty.clone()),
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

fn replace_metas(ty: &Type, vars: &[MetaTv], replacements: &[TypeVar]) -> Type {
    match ty {
        Type::Meta(v) => vars
            .iter()
            .position(|w| w == v)
            .map(|i| Type::Rigid(replacements[i].clone()))
            .unwrap_or_else(|| ty.clone()),
        Type::Rigid(_) | Type::Con(_) => ty.clone(),
        Type::Fun(p, r) => Type::fun(replace_metas(p, vars, replacements), replace_metas(r, vars, replacements)),
        Type::List(e) => Type::list(replace_metas(e, vars, replacements)),
        Type::Tuple(es) => Type::Tuple(es.iter().map(|e| replace_metas(e, vars, replacements)).collect()),
        Type::App(h, args) => Type::App(
            Box::new(replace_metas(h, vars, replacements)),
            args.iter().map(|a| replace_metas(a, vars, replacements)).collect(),
        ),
    }
}

/// Entry point (§4.4.1): typechecks and elaborates a parsed module,
/// returning the elaborated program alongside any kind or type errors
/// found. Kind checking runs first since type checking assumes every
/// type constructor already has a settled kind (§4.2/§4.4 are
/// independent, sequential phases, not mutually recursive -- §9 Design
/// Notes).
pub fn typecheck(
    file: &hsc_parser::ast::item::SourceFile,
) -> (elaborated::ElaboratedModule, Vec<hsc_kinds::KindError>, Vec<TypeError>) {
    let (tce_kinds, class_param_kinds, kind_errors) = hsc_kinds::check_module(file);
    let mut builtins = builtins::prelude();
    let header_errors = decls::register_type_and_class_headers(file, &tce_kinds, &class_param_kinds, &mut builtins);
    let mut ctx = InferCtx::new(builtins);
    ctx.errors.extend(header_errors);
    ctx.fixities = hsc_rename::FixityTable::from_source_file(file);
    let module = decls::check_module(file, &mut ctx);
    (module, kind_errors, ctx.errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsc_kinds::Kind;

    #[test]
    fn instantiate_produces_fresh_meta_and_wants_constraint() {
        let mut ctx = InferCtx::new(builtins::prelude());
        let a = TypeVar::new("a", Kind::Star);
        let scheme = Scheme {
            vars: vec![a.clone()],
            context: vec![PredType::new("Num", vec![Type::Rigid(a.clone())])],
            ty: Type::Rigid(a),
        };
        let (ty, dict_args) = ctx.instantiate(&scheme);
        assert!(matches!(ty, Type::Meta(_)));
        assert_eq!(dict_args.len(), 1);
        assert_eq!(ctx.lie.current().len(), 1);
    }

    #[test]
    fn generalize_quantifies_fresh_meta_var_not_in_enclosing_env() {
        let mut ctx = InferCtx::new(builtins::prelude());
        let v = ctx.fresh_meta();
        let (vars, context, ty) = ctx.generalize(&v, &[], false);
        assert_eq!(vars.len(), 1);
        assert!(context.is_empty());
        assert!(matches!(ty, Type::Rigid(_)));
    }

    #[test]
    fn generalize_does_not_quantify_vars_free_in_lve() {
        let mut ctx = InferCtx::new(builtins::prelude());
        let v = ctx.fresh_meta();
        ctx.lve.bind_mono("x", v.clone());
        let (vars, _, ty) = ctx.generalize(&v, &[], false);
        assert!(vars.is_empty());
        assert!(matches!(ty, Type::Meta(_)));
    }
}
