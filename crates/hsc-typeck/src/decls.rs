//! Declaration checking (§4.4.8/§4.4.10): registers a module's own
//! type/class/instance headers on top of the prelude, drives
//! let-generalization over dependency-ordered binding groups (the special
//! single-signatured-function case and the general monomorphism-aware
//! case), and turns class/instance declarations into dictionary
//! accessors and dfun bindings.
//!
//! Grounded on `mesh-typeck`'s declaration-checking driver generalized
//! from Mesh's single-namespace binding groups to §4.4.8's five-step
//! (special case) and nine-step (general case) algorithms, and on
//! `original_source/src/computation/typecheck/typecheck.cc` for the
//! binding-group iteration order (dependency-first, one `GenBind` per SCC).

use rustc_hash::{FxHashMap, FxHashSet};

use hsc_parser::ast::item::{ClassDecl, DataDecl, Decl, InstanceDecl, NewtypeDecl, SourceFile};
use hsc_parser::ast::ty::{Context, Type as AstType};
use hsc_parser::ast::AstNode;

use hsc_rename::{collect_value_decls, group_value_decls, single_signatured_fun, ValueDecl};

use crate::builtins::Builtins;
use crate::classes::hnf_reduce;
use crate::elaborated::{DictParam, ElabAlt, ElabDecl, ElabExpr, ElabPat, ElaboratedModule, Evidence, EvidenceBinding, GenBind};
use crate::env::{ClassInfo, InstanceInfo, Tce};
use crate::error::{ConstraintOrigin, TypeError};
use crate::expr::infer_rhs;
use crate::lie::{EvidenceVar, Lie};
use crate::pat::infer_pattern;
use crate::ty::{PredType, Scheme, Type, TypeCon, TypeVar};
use crate::InferCtx;

// ── Header registration (§4.4.10 "class and instance environments") ────────

/// Populates the module's own type constructors, data/newtype
/// constructors, classes, and instance headers on top of the prelude
/// built by [`crate::builtins::prelude`]. Runs before an [`InferCtx`]
/// exists: everything here only needs a `Tce` and kind information, not
/// the unification table or LIE -- so header-time diagnoses
/// (`InstanceHeadIllegal`, `SuperclassCycle`, `OverlappingInstances`) are
/// returned rather than reported through `ctx.errors`, which doesn't exist
/// yet; the caller folds them in once it does.
pub fn register_type_and_class_headers(
    file: &SourceFile,
    tce_kinds: &hsc_kinds::Tce,
    class_param_kinds: &FxHashMap<String, Vec<hsc_kinds::Kind>>,
    builtins: &mut Builtins,
) -> Vec<TypeError> {
    let decls: Vec<Decl> = file.decls().collect();
    let mut errors = Vec::new();

    for decl in &decls {
        match decl {
            Decl::Data(d) => register_data(d, tce_kinds, builtins),
            Decl::Newtype(d) => register_newtype(d, tce_kinds, builtins),
            _ => {}
        }
    }
    for decl in &decls {
        if let Decl::Class(c) = decl {
            register_class(c, class_param_kinds, builtins);
        }
    }
    errors.extend(superclass_cycles(&builtins.classes));
    for decl in &decls {
        if let Decl::Instance(i) = decl {
            register_instance_header(i, builtins, &mut errors);
        }
    }
    errors
}

/// DFS over the superclass graph (§4.4.10 "Cycles in the class superclass
/// graph are forbidden"). Once a class is found inside some reported
/// cycle it's skipped as a later search root, so a cycle touching several
/// classes is reported once, not once per member.
fn superclass_cycles(classes: &crate::env::ClassEnv) -> Vec<TypeError> {
    let mut errors = Vec::new();
    let mut reported: FxHashSet<String> = FxHashSet::default();
    let names: Vec<String> = classes.names().map(|n| n.to_string()).collect();
    for name in names {
        if reported.contains(&name) {
            continue;
        }
        let mut path = vec![name.clone()];
        if let Some(cycle) = find_superclass_cycle(classes, &name, &mut path) {
            reported.extend(cycle.iter().cloned());
            errors.push(TypeError::SuperclassCycle { classes: cycle });
        }
    }
    errors
}

fn find_superclass_cycle(classes: &crate::env::ClassEnv, current: &str, path: &mut Vec<String>) -> Option<Vec<String>> {
    let info = classes.get(current)?;
    for sup in &info.superclasses {
        if let Some(pos) = path.iter().position(|c| c == &sup.class) {
            return Some(path[pos..].to_vec());
        }
        path.push(sup.class.clone());
        if let Some(cycle) = find_superclass_cycle(classes, &sup.class, path) {
            return Some(cycle);
        }
        path.pop();
    }
    None
}

fn split_param_kinds(kind: &hsc_kinds::Kind, n: usize) -> Vec<hsc_kinds::Kind> {
    let mut cur = kind.clone();
    let mut out = Vec::new();
    for _ in 0..n {
        match cur {
            hsc_kinds::Kind::Fun(p, r) => {
                out.push(*p);
                cur = *r;
            }
            other => {
                out.push(hsc_kinds::Kind::Star);
                cur = other;
            }
        }
    }
    out
}

fn register_data(d: &DataDecl, tce_kinds: &hsc_kinds::Tce, builtins: &mut Builtins) {
    let Some(name) = d.name().map(|t| t.text().to_string()) else { return };
    let kind = tce_kinds.get(&name).map(|info| info.kind.clone()).unwrap_or(hsc_kinds::Kind::Star);
    builtins.tce.insert(TypeCon::new(name.clone(), kind.clone()));

    let var_names = d.type_vars();
    let param_kinds = split_param_kinds(&kind, var_names.len());
    let rigids: Vec<TypeVar> = var_names.iter().cloned().zip(param_kinds).map(|(n, k)| TypeVar::new(n, k)).collect();
    let mut scope: Vec<(String, TypeVar)> = var_names.into_iter().zip(rigids.iter().cloned()).collect();
    let result_ty = Type::app(Type::Con(TypeCon::new(name, kind)), rigids.iter().map(|v| Type::Rigid(v.clone())).collect());

    for con in d.constructors() {
        let Some(con_name) = con.name().map(|t| t.text().to_string()) else { continue };
        let mut field_tys: Vec<Type> = con.field_types().map(|f| elaborate_type_in_scope(&f, &builtins.tce, &mut scope)).collect();
        if let Some(fields) = con.record_fields() {
            for f in fields.fields() {
                if let Some(ty) = f.field_type() {
                    field_tys.push(elaborate_type_in_scope(&ty, &builtins.tce, &mut scope));
                }
            }
        }
        let ty = Type::curried_fun(field_tys, result_ty.clone());
        builtins.cve.insert(con_name, Scheme { vars: rigids.clone(), context: vec![], ty });
    }
}

fn register_newtype(d: &NewtypeDecl, tce_kinds: &hsc_kinds::Tce, builtins: &mut Builtins) {
    let Some(name) = d.name().map(|t| t.text().to_string()) else { return };
    let kind = tce_kinds.get(&name).map(|info| info.kind.clone()).unwrap_or(hsc_kinds::Kind::Star);
    builtins.tce.insert(TypeCon::new(name.clone(), kind.clone()));

    let var_names = d.type_vars();
    let param_kinds = split_param_kinds(&kind, var_names.len());
    let rigids: Vec<TypeVar> = var_names.iter().cloned().zip(param_kinds).map(|(n, k)| TypeVar::new(n, k)).collect();
    let mut scope: Vec<(String, TypeVar)> = var_names.into_iter().zip(rigids.iter().cloned()).collect();
    let result_ty = Type::app(Type::Con(TypeCon::new(name, kind)), rigids.iter().map(|v| Type::Rigid(v.clone())).collect());

    let Some(con) = d.constructor() else { return };
    let Some(con_name) = con.name().map(|t| t.text().to_string()) else { return };
    let mut field_tys: Vec<Type> = con.field_types().map(|f| elaborate_type_in_scope(&f, &builtins.tce, &mut scope)).collect();
    if let Some(fields) = con.record_fields() {
        for f in fields.fields() {
            if let Some(ty) = f.field_type() {
                field_tys.push(elaborate_type_in_scope(&ty, &builtins.tce, &mut scope));
            }
        }
    }
    let ty = Type::curried_fun(field_tys, result_ty);
    builtins.cve.insert(con_name, Scheme { vars: rigids, context: vec![], ty });
}

fn register_class(c: &ClassDecl, class_param_kinds: &FxHashMap<String, Vec<hsc_kinds::Kind>>, builtins: &mut Builtins) {
    let Some(name) = c.name().map(|t| t.text().to_string()) else { return };
    let var_names = c.type_vars();
    let Some(first_var) = var_names.into_iter().next() else { return };
    let param_kind = class_param_kinds.get(&name).and_then(|ks| ks.first().cloned()).unwrap_or(hsc_kinds::Kind::Star);
    let param = TypeVar::new(first_var.clone(), param_kind);
    let scope: Vec<(String, TypeVar)> = vec![(first_var, param.clone())];

    let mut header_scope = scope.clone();
    let superclasses = c.superclass_context().map(|ctx| elaborate_context(&ctx, &builtins.tce, &mut header_scope)).unwrap_or_default();
    let own_pred = PredType::new(name.clone(), vec![Type::Rigid(param.clone())]);

    let mut method_order = Vec::new();
    let mut methods = FxHashMap::default();
    for decl in c.body_decls() {
        let Decl::TypeSig(sig) = decl else { continue };
        let Some(sig_ty) = sig.signature() else { continue };
        for sig_name in sig.names() {
            let Some(method_name) = sig_name.text() else { continue };
            let mut method_scope = scope.clone();
            let (extra_ctx, body_ast) = split_constrained(&sig_ty);
            let ty = elaborate_type_in_scope(&body_ast, &builtins.tce, &mut method_scope);
            let mut context = vec![own_pred.clone()];
            if let Some(ctx_ast) = extra_ctx {
                context.extend(elaborate_context(&ctx_ast, &builtins.tce, &mut method_scope));
            }
            let vars: Vec<TypeVar> = method_scope.iter().map(|(_, v)| v.clone()).collect();
            let method_scheme = Scheme { vars, context, ty };
            builtins.gve.insert(method_name.clone(), method_scheme.clone());
            methods.insert(method_name.clone(), method_scheme);
            method_order.push(method_name);
        }
    }

    builtins.classes.insert(ClassInfo { name, param, superclasses, methods, method_order });
}

/// Registers one instance head, validating the distinct-head condition and
/// checking for overlap against every instance already registered for the
/// same class before inserting it (§4.4.10). A malformed or overlapping
/// instance is still inserted -- its `dfun` has to exist for downstream
/// method-body checking to make progress -- but the violation is reported.
fn register_instance_header(i: &InstanceDecl, builtins: &mut Builtins, errors: &mut Vec<TypeError>) {
    let Some(class_name) = i.class_name().map(|t| t.text().to_string()) else { return };
    let mut scope: Vec<(String, TypeVar)> = Vec::new();
    let head_args: Vec<Type> = i.head_types().map(|t| elaborate_type_in_scope(&t, &builtins.tce, &mut scope)).collect();

    let mut head_vars: Vec<TypeVar> = Vec::new();
    let mut head_valid = true;
    for arg in &head_args {
        if let Err(reason) = distinct_head_vars(arg, &mut head_vars) {
            errors.push(TypeError::InstanceHeadIllegal { class: class_name.clone(), reason });
            head_valid = false;
        }
    }

    let context = i.context().map(|c| elaborate_context(&c, &builtins.tce, &mut scope)).unwrap_or_default();
    if head_valid {
        for pred in &context {
            for arg in &pred.args {
                let mut used = Vec::new();
                collect_rigid_vars(arg, &mut used);
                for v in used {
                    if !head_vars.contains(&v) {
                        errors.push(TypeError::InstanceHeadIllegal {
                            class: class_name.clone(),
                            reason: format!("context variable `{}` does not appear in the instance head", v.name),
                        });
                    }
                }
            }
        }
    }

    let vars: Vec<TypeVar> = scope.iter().map(|(_, v)| v.clone()).collect();
    let head = PredType::new(class_name.clone(), head_args);

    for existing in builtins.instances.for_class(&class_name) {
        if heads_overlap(&existing.head, &head) && !heads_alpha_equivalent(&existing.head, &head) {
            errors.push(TypeError::OverlappingInstances {
                class: class_name.clone(),
                existing: existing.head.to_string(),
                new: head.to_string(),
            });
        }
    }

    let dfun_name = format!("dfun_{class_name}_{}", instance_head_suffix(&head));
    builtins.instances.insert(InstanceInfo { dfun_name, vars, context, head });
}

/// The distinct-head condition (§4.4.10): `ty`, one instance-head argument,
/// must be a type constructor applied to distinct type variables, never a
/// bare variable or an argument repeated across the head. Every variable
/// accepted is pushed onto `seen_vars` so later arguments (and the
/// free-context-variable check) can see the whole head's variable set.
fn distinct_head_vars(ty: &Type, seen_vars: &mut Vec<TypeVar>) -> Result<(), String> {
    match ty {
        Type::Con(_) => Ok(()),
        Type::Rigid(v) => Err(format!("`{}` is a bare type variable, not a type constructor application", v.name)),
        Type::Meta(_) => Err("instance head argument is not a settled type".to_string()),
        Type::App(head, args) => {
            if !matches!(head.as_ref(), Type::Con(_)) {
                return Err(format!("`{head}` is not headed by a type constructor"));
            }
            for arg in args {
                push_distinct_head_var(arg, seen_vars)?;
            }
            Ok(())
        }
        Type::Fun(p, r) => {
            push_distinct_head_var(p, seen_vars)?;
            push_distinct_head_var(r, seen_vars)
        }
        Type::List(e) => push_distinct_head_var(e, seen_vars),
        Type::Tuple(es) => {
            for e in es {
                push_distinct_head_var(e, seen_vars)?;
            }
            Ok(())
        }
    }
}

fn push_distinct_head_var(ty: &Type, seen_vars: &mut Vec<TypeVar>) -> Result<(), String> {
    match ty {
        Type::Rigid(v) if seen_vars.contains(v) => Err(format!("type variable `{}` appears more than once in the instance head", v.name)),
        Type::Rigid(v) => {
            seen_vars.push(v.clone());
            Ok(())
        }
        _ => Err(format!("`{ty}` is not a distinct type variable")),
    }
}

/// Collects every rigid variable occurring in `ty`, duplicates included --
/// used by the free-context-variable check, which only cares about set
/// membership.
fn collect_rigid_vars(ty: &Type, out: &mut Vec<TypeVar>) {
    match ty {
        Type::Rigid(v) => out.push(v.clone()),
        Type::Meta(_) | Type::Con(_) => {}
        Type::App(h, args) => {
            collect_rigid_vars(h, out);
            for a in args {
                collect_rigid_vars(a, out);
            }
        }
        Type::Fun(p, r) => {
            collect_rigid_vars(p, out);
            collect_rigid_vars(r, out);
        }
        Type::List(e) => collect_rigid_vars(e, out),
        Type::Tuple(es) => {
            for e in es {
                collect_rigid_vars(e, out);
            }
        }
    }
}

/// Structural unifiability between two instance heads for the same class,
/// treating every rigid variable as matching anything (DESIGN.md Open
/// Question #3): the coarse half of the overlap check.
fn heads_overlap(a: &PredType, b: &PredType) -> bool {
    a.args.len() == b.args.len() && a.args.iter().zip(&b.args).all(|(x, y)| types_unifiable(x, y))
}

fn types_unifiable(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Rigid(_), _) | (_, Type::Rigid(_)) => true,
        (Type::Meta(_), _) | (_, Type::Meta(_)) => true,
        (Type::Con(x), Type::Con(y)) => x == y,
        (Type::App(h1, a1), Type::App(h2, a2)) => {
            a1.len() == a2.len() && types_unifiable(h1, h2) && a1.iter().zip(a2).all(|(x, y)| types_unifiable(x, y))
        }
        (Type::Fun(p1, r1), Type::Fun(p2, r2)) => types_unifiable(p1, p2) && types_unifiable(r1, r2),
        (Type::List(e1), Type::List(e2)) => types_unifiable(e1, e2),
        (Type::Tuple(es1), Type::Tuple(es2)) => es1.len() == es2.len() && es1.iter().zip(es2).all(|(x, y)| types_unifiable(x, y)),
        _ => false,
    }
}

/// True if `a` and `b` are identical up to a consistent renaming of their
/// rigid variables -- the escape hatch the overlap rule grants two heads
/// that unify (DESIGN.md Open Question #3).
fn heads_alpha_equivalent(a: &PredType, b: &PredType) -> bool {
    let mut mapping: Vec<(TypeVar, TypeVar)> = Vec::new();
    a.args.len() == b.args.len() && a.args.iter().zip(&b.args).all(|(x, y)| types_alpha_equivalent(x, y, &mut mapping))
}

fn types_alpha_equivalent(a: &Type, b: &Type, mapping: &mut Vec<(TypeVar, TypeVar)>) -> bool {
    match (a, b) {
        (Type::Rigid(x), Type::Rigid(y)) => match mapping.iter().find(|(lx, _)| lx == x) {
            Some((_, my)) => my == y,
            None if mapping.iter().any(|(_, my)| my == y) => false,
            None => {
                mapping.push((x.clone(), y.clone()));
                true
            }
        },
        (Type::Con(x), Type::Con(y)) => x == y,
        (Type::Meta(x), Type::Meta(y)) => x == y,
        (Type::App(h1, a1), Type::App(h2, a2)) => {
            a1.len() == a2.len() && types_alpha_equivalent(h1, h2, mapping) && a1.iter().zip(a2).all(|(x, y)| types_alpha_equivalent(x, y, mapping))
        }
        (Type::Fun(p1, r1), Type::Fun(p2, r2)) => types_alpha_equivalent(p1, p2, mapping) && types_alpha_equivalent(r1, r2, mapping),
        (Type::List(e1), Type::List(e2)) => types_alpha_equivalent(e1, e2, mapping),
        (Type::Tuple(es1), Type::Tuple(es2)) => {
            es1.len() == es2.len() && es1.iter().zip(es2).all(|(x, y)| types_alpha_equivalent(x, y, mapping))
        }
        _ => false,
    }
}

fn instance_head_suffix(pred: &PredType) -> String {
    pred.args.iter().map(head_name_of).collect::<Vec<_>>().join("_")
}

fn head_name_of(ty: &Type) -> String {
    match ty {
        Type::Con(c) => c.name.clone(),
        Type::App(h, _) => head_name_of(h),
        Type::List(_) => "List".to_string(),
        Type::Tuple(elems) => format!("Tuple{}", elems.len()),
        Type::Fun(_, _) => "Fun".to_string(),
        Type::Rigid(v) => v.name.clone(),
        Type::Meta(_) => "m".to_string(),
    }
}

// ── Type-expression elaboration (§4.1 surface syntax -> §3 representation) ──

/// Converts a parsed type-signature node into this checker's monotype,
/// instantiating the scheme it implicitly denotes (§4.4.5's "Typed expr"
/// rule treats a signature in expression position as if rewritten to a
/// `let`-bound name with that signature, which this mirrors by
/// instantiating rather than binding the quantifiers as rigid).
pub fn elaborate_type(ty_ast: &AstType, ctx: &mut InferCtx) -> Type {
    let scheme = elaborate_signature_tce(ty_ast, &ctx.tce);
    let (ty, _dict_args) = ctx.instantiate(&scheme);
    ty
}

fn elaborate_signature_tce(ty_ast: &AstType, tce: &Tce) -> Scheme {
    let mut scope: Vec<(String, TypeVar)> = Vec::new();
    let (context_ast, body_ast) = split_constrained(ty_ast);
    let ty = elaborate_type_in_scope(&body_ast, tce, &mut scope);
    let context = context_ast.map(|c| elaborate_context(&c, tce, &mut scope)).unwrap_or_default();
    Scheme { vars: scope.into_iter().map(|(_, v)| v).collect(), context, ty }
}

/// Peels `forall`/constrained wrappers off a signature's surface syntax,
/// returning its context (if any) and the bare body type underneath.
/// Variables bound by an explicit `forall` don't need separate treatment:
/// [`elaborate_type_in_scope`] binds any variable on first occurrence
/// regardless of whether a `forall` named it up front.
fn split_constrained(ty_ast: &AstType) -> (Option<Context>, AstType) {
    match ty_ast {
        AstType::Forall(ft) => match ft.body() {
            Some(inner) => split_constrained(&inner),
            None => (None, ty_ast.clone()),
        },
        AstType::Constrained(ct) => (ct.context(), ct.body().unwrap_or_else(|| ty_ast.clone())),
        _ => (None, ty_ast.clone()),
    }
}

fn elaborate_context(ctx_ast: &Context, tce: &Tce, scope: &mut Vec<(String, TypeVar)>) -> Vec<PredType> {
    ctx_ast.constraints().map(|c| elaborate_constraint(&c, tce, scope)).collect()
}

fn elaborate_constraint(c: &AstType, tce: &Tce, scope: &mut Vec<(String, TypeVar)>) -> PredType {
    match c {
        AstType::Con(con) => PredType::new(con.name().map(|t| t.text().to_string()).unwrap_or_default(), vec![]),
        AstType::App(app) => {
            let head_name = match app.head() {
                Some(AstType::Con(con)) => con.name().map(|t| t.text().to_string()).unwrap_or_default(),
                _ => String::new(),
            };
            let args = app.args().map(|a| elaborate_type_in_scope(&a, tce, scope)).collect();
            PredType::new(head_name, args)
        }
        _ => PredType::new(String::new(), vec![]),
    }
}

/// Walks a parsed type expression into this checker's `Type`, binding
/// each variable to a rigid on first occurrence (implicit quantification,
/// the same rule §4.2's kind checker applies to kinds). Needs only a
/// `Tce` for constructor kinds, not a live [`InferCtx`], so header
/// registration can call it before one exists.
fn elaborate_type_in_scope(ty: &AstType, tce: &Tce, scope: &mut Vec<(String, TypeVar)>) -> Type {
    match ty {
        AstType::Var(v) => {
            let name = v.name().map(|t| t.text().to_string()).unwrap_or_default();
            if let Some((_, tv)) = scope.iter().find(|(n, _)| *n == name) {
                Type::Rigid(tv.clone())
            } else {
                let tv = TypeVar::new(name.clone(), hsc_kinds::Kind::Star);
                scope.push((name, tv.clone()));
                Type::Rigid(tv)
            }
        }
        AstType::Con(c) => {
            let name = c.name().map(|t| t.text().to_string()).unwrap_or_default();
            let kind = tce.get(&name).map(|info| info.kind.clone()).unwrap_or(hsc_kinds::Kind::Star);
            Type::Con(TypeCon::new(name, kind))
        }
        AstType::App(app) => {
            let head = app.head().map(|h| elaborate_type_in_scope(&h, tce, scope)).unwrap_or_else(unit_ty);
            let args = app.args().map(|a| elaborate_type_in_scope(&a, tce, scope)).collect();
            Type::app(head, args)
        }
        AstType::Fun(f) => {
            let p = f.param().map(|p| elaborate_type_in_scope(&p, tce, scope)).unwrap_or_else(unit_ty);
            let r = f.result().map(|r| elaborate_type_in_scope(&r, tce, scope)).unwrap_or_else(unit_ty);
            Type::fun(p, r)
        }
        AstType::Tuple(t) => Type::Tuple(t.elements().map(|e| elaborate_type_in_scope(&e, tce, scope)).collect()),
        AstType::List(l) => Type::list(l.element().map(|e| elaborate_type_in_scope(&e, tce, scope)).unwrap_or_else(unit_ty)),
        AstType::Forall(ft) => {
            for v in ft.bound_vars() {
                if !scope.iter().any(|(n, _)| *n == v) {
                    scope.push((v.clone(), TypeVar::new(v, hsc_kinds::Kind::Star)));
                }
            }
            ft.body().map(|b| elaborate_type_in_scope(&b, tce, scope)).unwrap_or_else(unit_ty)
        }
        AstType::Constrained(ct) => ct.body().map(|b| elaborate_type_in_scope(&b, tce, scope)).unwrap_or_else(unit_ty),
        AstType::OfKind(tok) => tok.body().map(|b| elaborate_type_in_scope(&b, tce, scope)).unwrap_or_else(unit_ty),
    }
}

fn unit_ty() -> Type {
    Type::Con(TypeCon::new("()", hsc_kinds::Kind::Star))
}

// ── LIE reduction shared by both the module driver and instance bodies ─────

/// Reduces every entry of `lie` to evidence where possible (§4.4.6
/// `hnf_reduce`), splitting it into the bindings that were discharged and
/// the predicates that remain stuck (no matching instance, or a variable
/// not yet known to be given).
fn reduce_lie(lie: &Lie, ctx: &mut InferCtx, origin: ConstraintOrigin) -> (Vec<EvidenceBinding>, Vec<(EvidenceVar, PredType)>) {
    let mut resolved = Vec::new();
    let mut retained = Vec::new();
    for (&ev, pred) in lie {
        // A predicate already in head-normal form (its argument's head is a
        // variable, rigid or still-unresolved meta) has no instance to
        // decompose against -- it stays part of the context, to be checked
        // against the enclosing signature's givens, generalized into a
        // fresh dict parameter, or defaulted, not silently discharged.
        // `hnf_reduce` would happily hand back `Evidence::Var(ev)` for it
        // (correct when recursively reducing an instance's own premises,
        // where that's exactly the obligation to push up to the parent
        // frame), but at this top-level boundary that would conflate "still
        // open" with "solved".
        if pred.is_hnf() {
            retained.push((ev, pred.clone()));
            continue;
        }
        let table = &mut ctx.table;
        let classes = &ctx.classes;
        let instances = &ctx.instances;
        let lie_stack = &mut ctx.lie;
        match hnf_reduce(pred, ev, table, classes, instances, lie_stack, origin.clone()) {
            Ok(evidence) => resolved.push(EvidenceBinding { var: ev, evidence }),
            Err(_) => retained.push((ev, pred.clone())),
        }
    }
    (resolved, retained)
}

// ── Module/let driver (§4.4.8) ──────────────────────────────────────────────

/// Checks and elaborates an entire module (§4.4.1 entry point, continued):
/// registers constructors from data/newtype, synthesizes class/instance
/// dictionary bindings, then processes value declarations group by group
/// in dependency order, populating the GVE as each group generalizes.
pub fn check_module(file: &SourceFile, ctx: &mut InferCtx) -> ElaboratedModule {
    let decls: Vec<Decl> = file.decls().collect();

    if let Some(Decl::Default(def)) = decls.iter().find(|d| matches!(d, Decl::Default(_))) {
        let mut scope = Vec::new();
        let types: Vec<Type> = def.types().map(|t| elaborate_type_in_scope(&t, &ctx.tce, &mut scope)).collect();
        if !types.is_empty() {
            ctx.default_types = types;
        }
    }

    let mut sig_asts: FxHashMap<String, AstType> = FxHashMap::default();
    for decl in &decls {
        if let Decl::TypeSig(sig) = decl {
            if let Some(ty) = sig.signature() {
                for name in sig.names() {
                    if let Some(n) = name.text() {
                        sig_asts.insert(n, ty.clone());
                    }
                }
            }
        }
    }
    let sig_schemes: FxHashMap<String, Scheme> =
        sig_asts.iter().map(|(name, ty)| (name.clone(), elaborate_signature_tce(ty, &ctx.tce))).collect();

    let mut bindings = Vec::new();
    for decl in &decls {
        if let Decl::Class(c) = decl {
            bindings.extend(check_class_accessors(c, ctx));
        }
    }
    for decl in &decls {
        if let Decl::Instance(i) = decl {
            if let Some(gb) = check_instance(i, ctx) {
                bindings.push(gb);
            }
        }
    }

    let value_decls = collect_value_decls(decls.iter());
    let signatures: FxHashSet<String> = sig_schemes.keys().cloned().collect();
    let groups = group_value_decls(value_decls, &signatures);

    for group in groups {
        let gb = check_binding_group(&group, &sig_schemes, ctx, BindTarget::Global);
        bindings.push(gb);
    }

    ElaboratedModule { bindings }
}

/// The local counterpart to [`check_module`]: checks a `let`/`where`/
/// list-comprehension qualifier block's declarations, binding each
/// group's generalized scheme into the *current* (innermost) LVE scope
/// instead of the GVE.
pub fn check_let_decls(decls: &[Decl], ctx: &mut InferCtx) -> Vec<GenBind> {
    let mut sig_asts: FxHashMap<String, AstType> = FxHashMap::default();
    for decl in decls {
        if let Decl::TypeSig(sig) = decl {
            if let Some(ty) = sig.signature() {
                for name in sig.names() {
                    if let Some(n) = name.text() {
                        sig_asts.insert(n, ty.clone());
                    }
                }
            }
        }
    }
    let sig_schemes: FxHashMap<String, Scheme> =
        sig_asts.iter().map(|(name, ty)| (name.clone(), elaborate_signature_tce(ty, &ctx.tce))).collect();

    let value_decls = collect_value_decls(decls.iter());
    let signatures: FxHashSet<String> = sig_schemes.keys().cloned().collect();
    let groups = group_value_decls(value_decls, &signatures);

    let mut out = Vec::new();
    for group in groups {
        out.push(check_binding_group(&group, &sig_schemes, ctx, BindTarget::Local));
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum BindTarget {
    Global,
    Local,
}

/// The monomorphism restriction predicate (§4.4.8): a group must be
/// checked monomorphically if any of its bindings is a pattern binding,
/// or an unsignatured function binding with zero parameters (a "simple
/// pattern binding" in all but name).
fn is_restricted(group: &[ValueDecl], signatures: &FxHashSet<String>) -> bool {
    group.iter().any(|decl| match decl {
        ValueDecl::Pat(_) => true,
        ValueDecl::Fun { name, clauses } => {
            !signatures.contains(name) && clauses.iter().all(|c| c.params().map(|p| p.params().count()).unwrap_or(0) == 0)
        }
    })
}

/// Checks one binding group -- either the special single-signatured-
/// function case or the general monomorphism-aware case (§4.4.8) -- and
/// returns its `GenBind`. Binds the resulting scheme(s) into the GVE or
/// the current LVE scope depending on `target`.
fn check_binding_group(group: &[ValueDecl], sig_schemes: &FxHashMap<String, Scheme>, ctx: &mut InferCtx, target: BindTarget) -> GenBind {
    if let Some(fun) = single_signatured_fun(group, &sig_schemes.keys().cloned().collect()) {
        let name = fun.name().and_then(|n| n.text()).unwrap_or_default();
        if let Some(scheme) = sig_schemes.get(&name) {
            return check_signatured_fun(&name, fun, scheme, ctx, target);
        }
    }
    check_general_group(group, sig_schemes, ctx, target)
}

/// The special case (§4.4.8, five steps): a lone function with its own
/// signature is checked against that signature directly ("check, don't
/// infer") rather than generalized from an inferred type, and its body's
/// uses must be entailed by the signature's own context -- it may not
/// introduce a dictionary requirement its signature didn't declare.
fn check_signatured_fun(
    name: &str,
    fun: &hsc_parser::ast::item::FunBind,
    scheme: &Scheme,
    ctx: &mut InferCtx,
    target: BindTarget,
) -> GenBind {
    ctx.lve.push_scope();
    ctx.lie.push_lie();

    let given_context = scheme.context.clone();
    let mut dict_params = Vec::new();
    for pred in &given_context {
        let ev = ctx.lie.fresh_evidence();
        dict_params.push(DictParam { evidence_var: ev, constraint: pred.clone() });
    }

    let (param_tys, result_ty) = uncurry_n(&scheme.ty, fun.params().map(|p| p.params().count()).unwrap_or(0));

    let mut decl = None;
    if let Some(params_ast) = fun.params() {
        ctx.lve.push_scope();
        let params: Vec<_> = params_ast.params().map(|p| infer_pattern(&p, ctx)).collect();
        for (pat, expected) in params.iter().zip(&param_tys) {
            crate::expr_unify(ctx, expected, pat.ty(), ConstraintOrigin::Signature);
        }
        let bodies = fun.rhs().map(|rhs| infer_rhs(&rhs, ctx)).unwrap_or_default();
        let mut body = None;
        for b in bodies {
            crate::expr_unify(ctx, &result_ty, b.ty(), ConstraintOrigin::Signature);
            body = body.or(Some(b));
        }
        ctx.lve.pop_scope();
        if let Some(body) = body {
            decl = Some(ElabDecl { name: name.to_string(), params, body, ty: scheme.ty.clone() });
        }
    }

    let frame = ctx.lie.pop_lie();
    let (resolved, retained) = reduce_lie(&frame, ctx, ConstraintOrigin::Signature);
    let mut evidence_bindings = resolved;
    for (ev, pred) in &retained {
        if crate::classes::entails(&given_context, pred, &ctx.classes) {
            evidence_bindings.push(EvidenceBinding { var: *ev, evidence: find_given_evidence(pred, &given_context, &dict_params, &ctx.classes) });
        } else {
            ctx.report(TypeError::NoInstance { constraint: pred.to_string(), origin: ConstraintOrigin::Signature });
        }
    }

    ctx.lve.pop_scope();

    let decls = decl.into_iter().collect::<Vec<_>>();
    let gb = GenBind { quantified: scheme.vars.clone(), dict_params, evidence_bindings, decls };
    bind_group_result(&gb, target, ctx);
    gb
}

fn find_given_evidence(pred: &PredType, givens: &[PredType], dict_params: &[DictParam], classes: &crate::env::ClassEnv) -> Evidence {
    for (given, param) in givens.iter().zip(dict_params) {
        if let Some(evidence) = crate::classes::try_simplify_by_superclass(given, param.evidence_var, pred, classes) {
            return evidence;
        }
        if given.class == pred.class && given.args == pred.args {
            return Evidence::Var(param.evidence_var);
        }
    }
    dict_params.first().map(|p| Evidence::Var(p.evidence_var)).unwrap_or(Evidence::Var(EvidenceVar(0)))
}

/// The general case (§4.4.8, nine steps): every binder in the group gets
/// a fresh type variable, clauses/patterns are inferred against it, the
/// group's combined free meta-variables are generalized together
/// (sharing one quantifier list and one set of dictionary parameters),
/// and -- if the monomorphism restriction applies -- any context left
/// over after defaulting becomes an error rather than a quantifier.
fn check_general_group(group: &[ValueDecl], sig_schemes: &FxHashMap<String, Scheme>, ctx: &mut InferCtx, target: BindTarget) -> GenBind {
    let signatures: FxHashSet<String> = sig_schemes.keys().cloned().collect();
    let restricted = is_restricted(group, &signatures);

    ctx.lve.push_scope();
    ctx.lie.push_lie();

    let mut binder_tys: FxHashMap<String, Type> = FxHashMap::default();
    for decl in group {
        for name in decl.defined_names() {
            if let Some(scheme) = sig_schemes.get(&name) {
                let (ty, _) = ctx.instantiate(scheme);
                binder_tys.insert(name.clone(), ty.clone());
                ctx.lve.bind_mono(name, ty);
            } else {
                let fresh = ctx.fresh_meta();
                binder_tys.insert(name.clone(), fresh.clone());
                ctx.lve.bind_mono(name, fresh);
            }
        }
    }

    let mut elab_decls = Vec::new();
    for decl in group {
        match decl {
            ValueDecl::Fun { name, clauses } => {
                let declared_ty = binder_tys[name].clone();
                for clause in clauses {
                    ctx.lve.push_scope();
                    let params: Vec<_> = clause.params().map(|pl| pl.params().map(|p| infer_pattern(&p, ctx)).collect()).unwrap_or_default();
                    if let Some(where_clause) = clause.where_clause() {
                        let where_decls: Vec<_> = where_clause.decls().collect();
                        check_let_decls(&where_decls, ctx);
                    }
                    let bodies = clause.rhs().map(|rhs| infer_rhs(&rhs, ctx)).unwrap_or_default();
                    let mut clause_elab = None;
                    for body in bodies {
                        let clause_ty = Type::curried_fun(params.iter().map(|p| p.ty().clone()), body.ty().clone());
                        crate::expr_unify(ctx, &declared_ty, &clause_ty, ConstraintOrigin::Application);
                        clause_elab = clause_elab.or(Some((params.clone(), body)));
                    }
                    ctx.lve.pop_scope();
                    if let Some((params, body)) = clause_elab {
                        elab_decls.push(ElabDecl { name: name.clone(), params, body, ty: declared_ty.clone() });
                    }
                }
            }
            ValueDecl::Pat(pb) => {
                ctx.lve.push_scope();
                let pat = pb.pattern().map(|p| infer_pattern(&p, ctx));
                if let Some(where_clause) = pb.where_clause() {
                    let where_decls: Vec<_> = where_clause.decls().collect();
                    check_let_decls(&where_decls, ctx);
                }
                let bodies = pb.rhs().map(|rhs| infer_rhs(&rhs, ctx)).unwrap_or_default();
                if let (Some(pat), Some(body)) = (pat, bodies.into_iter().next()) {
                    crate::expr_unify(ctx, pat.ty(), body.ty(), ConstraintOrigin::Application);
                    for name in decl.defined_names() {
                        if let (Some(bound), Some(expected)) = (ctx.lve.lookup(&name).cloned(), binder_tys.get(&name)) {
                            crate::expr_unify(ctx, expected, &bound.ty, ConstraintOrigin::Application);
                        }
                    }
                    elab_decls.push(ElabDecl { name: "_".to_string(), params: vec![pat], body, ty: ctx.fresh_meta() });
                }
                ctx.lve.pop_scope();
            }
        }
    }

    ctx.lve.pop_scope();
    let frame = ctx.lie.pop_lie();
    let (mut resolved, retained_preds) = reduce_lie(&frame, ctx, ConstraintOrigin::Application);

    let binder_list: Vec<Type> = binder_tys.values().cloned().collect();
    let determined: Vec<crate::ty::MetaTv> = {
        let mut out = Vec::new();
        for ty in &binder_list {
            crate::unify::free_meta_vars_in_type(&ctx.table.zonk(ty), &mut out);
        }
        out
    };

    let retained_context: Vec<PredType> = retained_preds.iter().map(|(_, p)| p.clone()).collect();
    let mut final_retained: Vec<(EvidenceVar, PredType)> = retained_preds;

    if restricted && !final_retained.is_empty() {
        let mut reduced_lie: Lie = Lie::default();
        for (ev, pred) in &final_retained {
            reduced_lie.insert(*ev, pred.clone());
        }
        let ambiguities = crate::defaulting::ambiguities(&reduced_lie, &mut ctx.table, &[]);
        let mut still_stuck = Vec::new();
        for amb in ambiguities {
            if crate::defaulting::is_eligible(&amb, &reduced_lie, amb.var, &mut ctx.table) {
                let default_types = ctx.default_types.clone();
                match crate::defaulting::default_preds(&amb, &reduced_lie, &default_types, &mut ctx.table, &ctx.classes, &ctx.instances, &mut ctx.lie)
                {
                    Ok(bindings) => resolved.extend(bindings.into_iter().map(|(var, evidence)| EvidenceBinding { var, evidence })),
                    Err(err) => ctx.report(err),
                }
            } else {
                for (ev, _) in &amb.constraints {
                    still_stuck.push(*ev);
                }
            }
        }
        final_retained.retain(|(ev, _)| still_stuck.contains(ev));
        if !final_retained.is_empty() {
            for decl in group {
                for name in decl.defined_names() {
                    ctx.report(TypeError::MonomorphismRestrictionViolated { name });
                }
            }
            final_retained.clear();
        }
    }

    let retained_context: Vec<PredType> = if restricted { Vec::new() } else { retained_context };
    let _ = retained_context;
    let gen_context: Vec<PredType> = final_retained.iter().map(|(_, p)| p.clone()).collect();

    let (quantified, gen_context, gen_types) = {
        let (vars, ctxs, tys) = ctx.generalize_many(&binder_list, &gen_context, restricted);
        (vars, ctxs, tys)
    };
    let _ = determined;

    let mut dict_params = Vec::new();
    for (pred, (ev, _)) in gen_context.iter().zip(final_retained.iter()) {
        dict_params.push(DictParam { evidence_var: *ev, constraint: pred.clone() });
    }

    let binder_names: Vec<String> = binder_tys.keys().cloned().collect();
    let generalized_by_name: FxHashMap<String, Type> = binder_names.into_iter().zip(gen_types).collect();
    for decl in &mut elab_decls {
        if let Some(ty) = generalized_by_name.get(&decl.name) {
            decl.ty = ty.clone();
        }
    }

    let gb = GenBind { quantified, dict_params, evidence_bindings: resolved, decls: elab_decls };
    bind_group_result_with_types(&gb, &generalized_by_name, target, ctx);
    gb
}

fn bind_group_result(gb: &GenBind, target: BindTarget, ctx: &mut InferCtx) {
    for decl in &gb.decls {
        let scheme = Scheme { vars: gb.quantified.clone(), context: gb.dict_params.iter().map(|d| d.constraint.clone()).collect(), ty: decl.ty.clone() };
        match target {
            BindTarget::Global => ctx.gve.insert(decl.name.clone(), scheme),
            BindTarget::Local => ctx.lve.bind(decl.name.clone(), scheme),
        }
    }
}

fn bind_group_result_with_types(gb: &GenBind, by_name: &FxHashMap<String, Type>, target: BindTarget, ctx: &mut InferCtx) {
    let context: Vec<PredType> = gb.dict_params.iter().map(|d| d.constraint.clone()).collect();
    for (name, ty) in by_name {
        let scheme = Scheme { vars: gb.quantified.clone(), context: context.clone(), ty: ty.clone() };
        match target {
            BindTarget::Global => ctx.gve.insert(name.clone(), scheme),
            BindTarget::Local => ctx.lve.bind(name.clone(), scheme),
        }
    }
}

fn uncurry_n(ty: &Type, n: usize) -> (Vec<Type>, Type) {
    let mut args = Vec::new();
    let mut cur = ty.clone();
    for _ in 0..n {
        match cur {
            Type::Fun(p, r) => {
                args.push(*p);
                cur = *r;
            }
            other => {
                cur = other;
                break;
            }
        }
    }
    (args, cur)
}

// ── Class/instance dictionary synthesis (§4.4.10) ───────────────────────────

/// Emits one `GenBind` per dictionary field a class declaration introduces
/// -- a superclass projection for each entry in `superclasses`, then a
/// method accessor for each entry in `method_order` -- each a case over the
/// class's own dictionary record (§4.4.10 "each field `fᵢ` becomes
/// `fᵢ = λ dict → case dict of (…, x, …) → x`"). A superclass field's
/// accessor is named `{sup}From{class}` (e.g. `eqFromOrd` for `Eq`'s slot
/// inside `Ord`'s dictionary, §4.4.11's worked example); a method field's
/// accessor keeps the method's own name.
fn check_class_accessors(c: &ClassDecl, ctx: &mut InferCtx) -> Vec<GenBind> {
    let Some(class_name) = c.name().map(|t| t.text().to_string()) else { return Vec::new() };
    let Some(class_info) = ctx.classes.get(&class_name).cloned() else { return Vec::new() };

    let dict_con_name = format!("#dict:{class_name}");
    let dict_ty = Type::app(Type::Con(TypeCon::new(dict_con_name.clone(), hsc_kinds::Kind::Star)), vec![Type::Rigid(class_info.param.clone())]);
    let own_pred = PredType::new(class_name.clone(), vec![Type::Rigid(class_info.param.clone())]);

    let mut fields: Vec<(String, Type)> = Vec::new();
    for sup in &class_info.superclasses {
        fields.push((format!("{}From{}", decapitalize(&sup.class), class_name), pred_witness_ty(sup)));
    }
    for method_name in &class_info.method_order {
        let ty = class_info.methods.get(method_name).map(|s| s.ty.clone()).unwrap_or_else(|| ctx.fresh_meta());
        fields.push((method_name.clone(), ty));
    }
    let total = fields.len();

    let gen_binds: Vec<GenBind> = fields
        .into_iter()
        .enumerate()
        .map(|(idx, (name, field_ty))| {
            let ev = ctx.lie.fresh_evidence();
            let args: Vec<ElabPat> = (0..total)
                .map(|i| if i == idx { ElabPat::Var("x".to_string(), field_ty.clone()) } else { ElabPat::Wildcard(field_ty.clone()) })
                .collect();
            let alt = ElabAlt {
                pat: ElabPat::Con { name: dict_con_name.clone(), args, ty: dict_ty.clone() },
                body: ElabExpr::Var { name: "x".to_string(), dict_args: vec![], ty: field_ty.clone() },
            };
            let scrutinee = ElabExpr::Witness(Evidence::Var(ev), dict_ty.clone());
            let body = ElabExpr::Case(Box::new(scrutinee), vec![alt], field_ty.clone());
            let decl = ElabDecl { name, params: vec![], body, ty: field_ty };
            GenBind {
                quantified: vec![class_info.param.clone()],
                dict_params: vec![DictParam { evidence_var: ev, constraint: own_pred.clone() }],
                evidence_bindings: vec![],
                decls: vec![decl],
            }
        })
        .collect();

    // Method accessors reuse names `register_class` already bound to a GVE
    // scheme that may carry a method's own extra quantifiers/context
    // (§4.4.10's method signature instantiated at the class's parameter,
    // generalized further) -- only the superclass accessors' names are new,
    // so only those are (re)bound here.
    for gb in gen_binds.iter().take(class_info.superclasses.len()) {
        bind_group_result(gb, BindTarget::Global, ctx);
    }
    gen_binds
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Elaborates one `instance` declaration into a `GenBind` whose single
/// declaration constructs the instance's dictionary value: a `DictCon`
/// whose fields are its methods' elaborated bodies, in the class's
/// declared method order. Methods the instance doesn't override (default
/// method bodies) are simply omitted from the dictionary's field list --
/// this checker doesn't carry default method implementations forward from
/// the class declaration into every instance.
fn check_instance(i: &InstanceDecl, ctx: &mut InferCtx) -> Option<GenBind> {
    let class_name = i.class_name().map(|t| t.text().to_string())?;
    let class_info = ctx.classes.get(&class_name)?.clone();

    let mut scope: Vec<(String, TypeVar)> = Vec::new();
    let head_args: Vec<Type> = i.head_types().map(|t| elaborate_type_in_scope(&t, &ctx.tce, &mut scope)).collect();
    let context = i.context().map(|c| elaborate_context(&c, &ctx.tce, &mut scope)).unwrap_or_default();
    let vars: Vec<TypeVar> = scope.iter().map(|(_, v)| v.clone()).collect();

    let dfun_name = ctx
        .instances
        .for_class(&class_name)
        .iter()
        .find(|inst| inst.head.args == head_args)
        .map(|inst| inst.dfun_name.clone())
        .unwrap_or_else(|| format!("dfun_{class_name}"));

    ctx.lve.push_scope();
    ctx.lie.push_lie();

    let mut dict_params = Vec::new();
    for pred in &context {
        let ev = ctx.lie.fresh_evidence();
        dict_params.push(DictParam { evidence_var: ev, constraint: pred.clone() });
    }

    // Each superclass's dictionary is a field of this instance's own
    // dictionary (§4.4.10 "the superclass dictionaries ... followed by the
    // methods"), so it's wanted here and solved alongside the method
    // bodies' own obligations by the `reduce_lie` call below.
    let mut superclass_wants: Vec<(PredType, EvidenceVar)> = Vec::new();
    for sup in &class_info.superclasses {
        let sup_args: Vec<Type> = sup.args.iter().map(|a| substitute_one(a, &class_info.param, head_args.first().unwrap_or(a))).collect();
        let instantiated = PredType::new(sup.class.clone(), sup_args);
        let ev = ctx.lie.want(instantiated.clone());
        superclass_wants.push((instantiated, ev));
    }

    let method_binds: FxHashMap<String, Vec<hsc_parser::ast::item::FunBind>> = {
        let mut map: FxHashMap<String, Vec<hsc_parser::ast::item::FunBind>> = FxHashMap::default();
        for decl in i.method_binds() {
            if let Decl::FunBind(fb) = decl {
                if let Some(name) = fb.name().and_then(|n| n.text()) {
                    map.entry(name).or_default().push(fb);
                }
            }
        }
        map
    };

    let mut method_fields = Vec::new();
    for method_name in &class_info.method_order {
        let Some(clauses) = method_binds.get(method_name) else { continue };
        let Some(method_scheme) = class_info.methods.get(method_name) else { continue };
        let specialized = specialize_method(method_scheme, &class_info, &head_args);

        let mut body_elab = None;
        for clause in clauses {
            ctx.lve.push_scope();
            let params: Vec<_> = clause.params().map(|pl| pl.params().map(|p| infer_pattern(&p, ctx)).collect()).unwrap_or_default();
            let bodies = clause.rhs().map(|rhs| infer_rhs(&rhs, ctx)).unwrap_or_default();
            for body in bodies {
                let fn_ty = Type::curried_fun(params.iter().map(|p| p.ty().clone()), body.ty().clone());
                crate::expr_unify(ctx, &specialized, &fn_ty, ConstraintOrigin::InstanceLookup);
                let lambda = if params.is_empty() { body } else { ElabExpr::Lambda(params.clone(), Box::new(body), specialized.clone()) };
                body_elab = body_elab.or(Some(lambda));
            }
            ctx.lve.pop_scope();
        }
        if let Some(body) = body_elab {
            method_fields.push(body);
        }
    }

    ctx.lve.pop_scope();
    let frame = ctx.lie.pop_lie();
    let (resolved, retained) = reduce_lie(&frame, ctx, ConstraintOrigin::InstanceLookup);
    let mut evidence_bindings = resolved;
    for (ev, pred) in &retained {
        if crate::classes::entails(&context, pred, &ctx.classes) {
            evidence_bindings.push(EvidenceBinding { var: *ev, evidence: find_given_evidence(pred, &context, &dict_params, &ctx.classes) });
        } else {
            ctx.report(TypeError::NoInstance { constraint: pred.to_string(), origin: ConstraintOrigin::InstanceLookup });
        }
    }

    let superclass_fields: Vec<ElabExpr> = superclass_wants
        .iter()
        .map(|(pred, ev)| {
            let evidence = evidence_bindings.iter().find(|b| b.var == *ev).map(|b| b.evidence.clone()).unwrap_or(Evidence::Var(*ev));
            ElabExpr::Witness(evidence, pred_witness_ty(pred))
        })
        .collect();
    let fields: Vec<ElabExpr> = superclass_fields.into_iter().chain(method_fields).collect();

    let dict_ty = Type::app(Type::Con(TypeCon::new(format!("#dict:{class_name}"), hsc_kinds::Kind::Star)), head_args);
    let decl = ElabDecl {
        name: dfun_name,
        params: vec![],
        body: ElabExpr::DictCon { class: class_name, fields, ty: dict_ty.clone() },
        ty: Type::curried_fun(context.iter().map(pred_witness_ty), dict_ty),
    };

    Some(GenBind { quantified: vars, dict_params, evidence_bindings, decls: vec![decl] })
}

fn pred_witness_ty(pred: &PredType) -> Type {
    Type::app(Type::Con(TypeCon::new(format!("#dict:{}", pred.class), hsc_kinds::Kind::Star)), pred.args.clone())
}

/// Specializes a class method's scheme at a concrete instance head: the
/// class's own parameter is substituted by the instance head's
/// corresponding argument (so `(==) :: a -> a -> Bool` becomes
/// `Int -> Int -> Bool` inside `instance Eq Int`), leaving any of the
/// method's further quantifiers as-is.
fn specialize_method(scheme: &Scheme, class_info: &ClassInfo, head_args: &[Type]) -> Type {
    let Some(head) = head_args.first() else { return scheme.ty.clone() };
    substitute_one(&scheme.ty, &class_info.param, head)
}

fn substitute_one(ty: &Type, var: &TypeVar, replacement: &Type) -> Type {
    match ty {
        Type::Rigid(v) if v == var => replacement.clone(),
        Type::Rigid(_) | Type::Meta(_) | Type::Con(_) => ty.clone(),
        Type::Fun(p, r) => Type::fun(substitute_one(p, var, replacement), substitute_one(r, var, replacement)),
        Type::List(e) => Type::list(substitute_one(e, var, replacement)),
        Type::Tuple(es) => Type::Tuple(es.iter().map(|e| substitute_one(e, var, replacement)).collect()),
        Type::App(h, args) => {
            Type::App(Box::new(substitute_one(h, var, replacement)), args.iter().map(|a| substitute_one(a, var, replacement)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ClassEnv;
    use hsc_kinds::Kind;

    fn pair_con() -> Type {
        Type::Con(TypeCon::new("Pair", Kind::Fun(Box::new(Kind::Star), Box::new(Kind::Fun(Box::new(Kind::Star), Box::new(Kind::Star))))))
    }

    #[test]
    fn distinct_head_vars_accepts_a_constructor_applied_to_distinct_vars() {
        let a = TypeVar::new("a", Kind::Star);
        let b = TypeVar::new("b", Kind::Star);
        let ty = Type::app(pair_con(), vec![Type::Rigid(a), Type::Rigid(b)]);
        let mut seen = Vec::new();
        assert!(distinct_head_vars(&ty, &mut seen).is_ok());
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn distinct_head_vars_rejects_a_bare_variable() {
        let a = TypeVar::new("a", Kind::Star);
        let mut seen = Vec::new();
        assert!(distinct_head_vars(&Type::Rigid(a), &mut seen).is_err());
    }

    #[test]
    fn distinct_head_vars_rejects_a_repeated_variable() {
        let a = TypeVar::new("a", Kind::Star);
        let ty = Type::app(pair_con(), vec![Type::Rigid(a.clone()), Type::Rigid(a)]);
        let mut seen = Vec::new();
        assert!(distinct_head_vars(&ty, &mut seen).is_err());
    }

    #[test]
    fn heads_alpha_equivalent_true_under_consistent_renaming() {
        let a = TypeVar::new("a", Kind::Star);
        let b = TypeVar::new("b", Kind::Star);
        let x = TypeVar::new("x", Kind::Star);
        let y = TypeVar::new("y", Kind::Star);
        let head1 = PredType::new("Eq", vec![Type::app(pair_con(), vec![Type::Rigid(a), Type::Rigid(b)])]);
        let head2 = PredType::new("Eq", vec![Type::app(pair_con(), vec![Type::Rigid(x), Type::Rigid(y)])]);
        assert!(heads_overlap(&head1, &head2));
        assert!(heads_alpha_equivalent(&head1, &head2));
    }

    #[test]
    fn heads_overlap_but_not_alpha_equivalent_when_one_pins_a_shared_variable() {
        let a = TypeVar::new("a", Kind::Star);
        let b = TypeVar::new("b", Kind::Star);
        let head1 = PredType::new("Eq", vec![Type::app(pair_con(), vec![Type::Rigid(a.clone()), Type::Rigid(b)])]);
        let head2 = PredType::new("Eq", vec![Type::app(pair_con(), vec![Type::Rigid(a.clone()), Type::Rigid(a)])]);
        assert!(heads_overlap(&head1, &head2), "both heads unify (every variable matches anything)");
        assert!(!heads_alpha_equivalent(&head1, &head2), "head2 reuses `a` where head1 has a distinct variable");
    }

    #[test]
    fn superclass_cycles_detects_a_two_class_cycle() {
        let mut classes = ClassEnv::new();
        let a = TypeVar::new("a", Kind::Star);
        classes.insert(ClassInfo {
            name: "A".into(),
            param: a.clone(),
            superclasses: vec![PredType::new("B", vec![Type::Rigid(a.clone())])],
            methods: FxHashMap::default(),
            method_order: vec![],
        });
        classes.insert(ClassInfo {
            name: "B".into(),
            param: a.clone(),
            superclasses: vec![PredType::new("A", vec![Type::Rigid(a)])],
            methods: FxHashMap::default(),
            method_order: vec![],
        });
        let errors = superclass_cycles(&classes);
        assert_eq!(errors.len(), 1, "a cycle touching both classes should be reported once, not twice");
        assert!(matches!(&errors[0], TypeError::SuperclassCycle { classes } if classes.len() == 2));
    }

    #[test]
    fn superclass_cycles_empty_for_an_acyclic_hierarchy() {
        let mut classes = ClassEnv::new();
        let a = TypeVar::new("a", Kind::Star);
        classes.insert(ClassInfo { name: "Eq".into(), param: a.clone(), superclasses: vec![], methods: FxHashMap::default(), method_order: vec![] });
        classes.insert(ClassInfo {
            name: "Ord".into(),
            param: a.clone(),
            superclasses: vec![PredType::new("Eq", vec![Type::Rigid(a)])],
            methods: FxHashMap::default(),
            method_order: vec![],
        });
        assert!(superclass_cycles(&classes).is_empty());
    }

    #[test]
    fn find_given_evidence_extracts_through_a_superclass() {
        let mut classes = ClassEnv::new();
        let a = TypeVar::new("a", Kind::Star);
        classes.insert(ClassInfo { name: "Eq".into(), param: a.clone(), superclasses: vec![], methods: FxHashMap::default(), method_order: vec![] });
        classes.insert(ClassInfo {
            name: "Ord".into(),
            param: a.clone(),
            superclasses: vec![PredType::new("Eq", vec![Type::Rigid(a.clone())])],
            methods: FxHashMap::default(),
            method_order: vec![],
        });

        let ord_given = PredType::new("Ord", vec![Type::Rigid(a.clone())]);
        let eq_wanted = PredType::new("Eq", vec![Type::Rigid(a)]);
        let ev = EvidenceVar(0);
        let dict_params = vec![DictParam { evidence_var: ev, constraint: ord_given.clone() }];

        let evidence = find_given_evidence(&eq_wanted, &[ord_given], &dict_params, &classes);
        assert!(
            matches!(&evidence, Evidence::Extract { class, dict } if class == "Eq" && matches!(dict.as_ref(), Evidence::Var(v) if *v == ev)),
            "expected an `Eq` projection out of the given `Ord` dictionary, got {evidence:?}"
        );
    }

    #[test]
    fn find_given_evidence_matches_a_direct_given() {
        let classes = ClassEnv::new();
        let a = TypeVar::new("a", Kind::Star);
        let eq_given = PredType::new("Eq", vec![Type::Rigid(a.clone())]);
        let ev = EvidenceVar(7);
        let dict_params = vec![DictParam { evidence_var: ev, constraint: eq_given.clone() }];

        let evidence = find_given_evidence(&eq_given, &[eq_given], &dict_params, &classes);
        assert_eq!(evidence, Evidence::Var(ev));
    }
}
