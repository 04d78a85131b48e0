//! The kind checker proper (§4.2): a header pass that assigns every
//! declared type constructor and class a fresh kind skeleton, followed by
//! a body pass that walks every type expression in the module and unifies
//! kinds as it goes, defaulting whatever is still free to `★` at the end.

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashMap;

use hsc_common::span::Span;
use hsc_parser::ast::item::{ClassDecl, DataDecl, Decl, InstanceDecl, NewtypeDecl, SourceFile, TypeSynDecl};
use hsc_parser::ast::ty::{Context, Type};
use hsc_parser::ast::AstNode;

use crate::error::{KindError, KindErrorKind};
use crate::kind::{Kind, KindVar};

fn node_span(node: &hsc_parser::cst::SyntaxNode) -> Span {
    let range = node.text_range();
    Span::new(range.start().into(), range.end().into())
}

/// One entry of the type constructor environment (§3 TCE): a constructor's
/// kind and the arity its declaration fixes.
#[derive(Clone, Debug)]
pub struct TyConInfo {
    pub kind: Kind,
    pub arity: usize,
}

/// TCE: TypeCon -> (kind, arity).
#[derive(Default, Debug)]
pub struct Tce {
    map: FxHashMap<String, TyConInfo>,
}

impl Tce {
    pub fn get(&self, name: &str) -> Option<&TyConInfo> {
        self.map.get(name)
    }

    pub fn insert(&mut self, name: String, info: TyConInfo) {
        self.map.insert(name, info);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Every declared type constructor and its resolved kind, for
    /// diagnostics/dumping (e.g. `hscc dump-kinds`).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TyConInfo)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Builtin type constructors every module starts with: primitive types,
/// the list and function constructors, and tuples up to arity 7 (the
/// conventional Haskell report limit).
fn register_builtins(tce: &mut Tce) {
    for name in ["Int", "Integer", "Double", "Rational", "Char", "Bool"] {
        tce.insert(name.to_string(), TyConInfo { kind: Kind::Star, arity: 0 });
    }
    tce.insert(
        "[]".to_string(),
        TyConInfo { kind: Kind::fun(Kind::Star, Kind::Star), arity: 1 },
    );
    tce.insert(
        "->".to_string(),
        TyConInfo {
            kind: Kind::fun(Kind::Star, Kind::fun(Kind::Star, Kind::Star)),
            arity: 2,
        },
    );
    tce.insert("()".to_string(), TyConInfo { kind: Kind::Star, arity: 0 });
    for n in 2..=7usize {
        let name = format!("({})", ",".repeat(n - 1));
        tce.insert(name, TyConInfo { kind: Kind::arity_star(n), arity: n });
    }
}

pub struct KindChecker {
    table: InPlaceUnificationTable<KindVar>,
    pub tce: Tce,
    /// class name -> kind of each of its declared type parameters, in
    /// declaration order (§4.2: class parameter kinds are inferred from
    /// their uses, not assigned a combined arrow kind the way a TypeCon is).
    pub class_param_kinds: FxHashMap<String, Vec<Kind>>,
    pub errors: Vec<KindError>,
}

impl KindChecker {
    pub fn new() -> Self {
        let mut tce = Tce::default();
        register_builtins(&mut tce);
        Self {
            table: InPlaceUnificationTable::new(),
            tce,
            class_param_kinds: FxHashMap::default(),
            errors: Vec::new(),
        }
    }

    fn fresh(&mut self) -> Kind {
        Kind::Var(self.table.new_key(None))
    }

    pub fn resolve(&mut self, kind: Kind) -> Kind {
        match kind {
            Kind::Var(v) => match self.table.probe_value(v) {
                Some(k) => self.resolve(k),
                None => Kind::Var(self.table.find(v)),
            },
            Kind::Fun(p, r) => Kind::fun(self.resolve(*p), self.resolve(*r)),
            other => other,
        }
    }

    fn occurs(&mut self, v: KindVar, k: &Kind) -> bool {
        match k {
            Kind::Var(w) => {
                if *w == v {
                    return true;
                }
                match self.table.probe_value(*w) {
                    Some(inner) => self.occurs(v, &inner),
                    None => false,
                }
            }
            Kind::Fun(p, r) => self.occurs(v, p) || self.occurs(v, r),
            Kind::Star | Kind::Constraint => false,
        }
    }

    pub fn unify(&mut self, k1: Kind, k2: Kind, span: Span) {
        let k1 = self.resolve(k1);
        let k2 = self.resolve(k2);
        match (k1, k2) {
            (Kind::Var(a), Kind::Var(b)) if a == b => {}
            (Kind::Var(a), Kind::Var(b)) => {
                self.table.unify_var_var(a, b).expect("unbound kind vars unify");
            }
            (Kind::Var(v), k) | (k, Kind::Var(v)) => {
                if self.occurs(v, &k) {
                    self.errors.push(KindError::new(KindErrorKind::OccursCheck, span));
                    return;
                }
                self.table.unify_var_value(v, Some(k)).expect("binding a kind var cannot fail");
            }
            (Kind::Star, Kind::Star) | (Kind::Constraint, Kind::Constraint) => {}
            (Kind::Fun(p1, r1), Kind::Fun(p2, r2)) => {
                self.unify(*p1, *p2, span);
                self.unify(*r1, *r2, span);
            }
            (expected, found) => {
                self.errors
                    .push(KindError::new(KindErrorKind::Mismatch { expected, found }, span));
            }
        }
    }

    /// First pass: assign every declared type constructor and class a
    /// fresh kind skeleton (§4.2 "a first pass that assigns fresh kind
    /// variables... and enforces their arity from the declaration").
    pub fn register_headers(&mut self, file: &SourceFile) {
        for decl in file.decls() {
            match decl {
                Decl::Data(d) => self.register_data_like(d.name().map(|t| t.text().to_string()), d.type_vars()),
                Decl::Newtype(d) => {
                    self.register_data_like(d.name().map(|t| t.text().to_string()), d.type_vars())
                }
                Decl::TypeSyn(d) => {
                    self.register_data_like(d.name().map(|t| t.text().to_string()), d.type_vars())
                }
                Decl::Class(c) => self.register_class_header(&c),
                _ => {}
            }
        }
    }

    fn register_data_like(&mut self, name: Option<String>, vars: Vec<String>) {
        let Some(name) = name else { return };
        if self.tce.contains(&name) {
            return;
        }
        let arity = vars.len();
        let mut kind = self.fresh();
        for _ in 0..arity {
            let param = self.fresh();
            kind = Kind::fun(param, kind);
        }
        self.tce.insert(name, TyConInfo { kind, arity });
    }

    fn register_class_header(&mut self, c: &ClassDecl) {
        let Some(name) = c.name().map(|t| t.text().to_string()) else { return };
        if self.class_param_kinds.contains_key(&name) {
            return;
        }
        let kinds = c.type_vars().iter().map(|_| self.fresh()).collect();
        self.class_param_kinds.insert(name, kinds);
    }

    /// Second pass: kind-check every data/newtype/type-synonym/class/
    /// instance header's constituent types.
    pub fn check_module(&mut self, file: &SourceFile) {
        for decl in file.decls() {
            match decl {
                Decl::Data(d) => self.check_data(&d),
                Decl::Newtype(d) => self.check_newtype(&d),
                Decl::TypeSyn(d) => self.check_type_syn(&d),
                Decl::Class(c) => self.check_class(&c),
                Decl::Instance(i) => self.check_instance(&i),
                Decl::TypeSig(sig) => {
                    if let Some(ty) = sig.signature() {
                        let mut scope = FxHashMap::default();
                        self.kind_check_type_of_kind(&mut scope, &ty, Kind::Star);
                    }
                }
                Decl::ForeignImport(fi) => {
                    if let Some(ty) = fi.signature() {
                        let mut scope = FxHashMap::default();
                        self.kind_check_type_of_kind(&mut scope, &ty, Kind::Star);
                    }
                }
                _ => {}
            }
        }
    }

    fn header_scope(&mut self, vars: &[String]) -> FxHashMap<String, Kind> {
        let mut scope = FxHashMap::default();
        for v in vars {
            scope.insert(v.clone(), self.fresh());
        }
        scope
    }

    fn check_data(&mut self, d: &DataDecl) {
        let vars = d.type_vars();
        self.check_repeated(&vars, d.syntax());
        let mut scope = self.header_scope(&vars);
        // Re-seed the header's own kind vars from the TCE entry so
        // constructor fields unify against exactly the kind variables the
        // constructor's own arrow kind was built from.
        if let Some(info) = d.name().and_then(|n| self.tce.get(&n.text()).cloned()) {
            self.bind_param_kinds(&mut scope, &vars, &info.kind);
        }
        for con in d.constructors() {
            for field in con.field_types() {
                let k = self.infer_type(&mut scope, &field);
                self.unify(k, Kind::Star, node_span(field.syntax()));
            }
            if let Some(fields) = con.record_fields() {
                for f in fields.fields() {
                    if let Some(ty) = f.field_type() {
                        let k = self.infer_type(&mut scope, &ty);
                        self.unify(k, Kind::Star, node_span(ty.syntax()));
                    }
                }
            }
            if let Some(sig) = con.gadt_signature() {
                self.kind_check_type_of_kind(&mut scope, &sig, Kind::Star);
            }
        }
    }

    fn check_newtype(&mut self, d: &NewtypeDecl) {
        let vars = d.type_vars();
        self.check_repeated(&vars, d.syntax());
        let mut scope = self.header_scope(&vars);
        if let Some(info) = d.name().and_then(|n| self.tce.get(&n.text()).cloned()) {
            self.bind_param_kinds(&mut scope, &vars, &info.kind);
        }
        if let Some(con) = d.constructor() {
            for field in con.field_types() {
                let k = self.infer_type(&mut scope, &field);
                self.unify(k, Kind::Star, node_span(field.syntax()));
            }
            if let Some(fields) = con.record_fields() {
                for f in fields.fields() {
                    if let Some(ty) = f.field_type() {
                        let k = self.infer_type(&mut scope, &ty);
                        self.unify(k, Kind::Star, node_span(ty.syntax()));
                    }
                }
            }
        }
    }

    fn check_type_syn(&mut self, d: &TypeSynDecl) {
        let vars = d.type_vars();
        self.check_repeated(&vars, d.syntax());
        let mut scope = self.header_scope(&vars);
        if let Some(info) = d.name().and_then(|n| self.tce.get(&n.text()).cloned()) {
            self.bind_param_kinds(&mut scope, &vars, &info.kind);
        }
        if let Some(rhs) = d.rhs() {
            let result_kind = d
                .name()
                .and_then(|n| self.tce.get(&n.text()).cloned())
                .map(|info| self.result_kind_of(&info.kind, vars.len()))
                .unwrap_or(Kind::Star);
            self.kind_check_type_of_kind(&mut scope, &rhs, result_kind);
        }
    }

    /// Walk `kind = κ1 -> κ2 -> … -> κ_n -> result` and bind `params[i]` to
    /// `κ_i` in `scope`, so later type-expression kind checks reuse the
    /// exact variable the header pass created instead of a disconnected
    /// fresh one.
    fn bind_param_kinds(&mut self, scope: &mut FxHashMap<String, Kind>, params: &[String], kind: &Kind) {
        let mut cur = kind.clone();
        for p in params {
            if let Kind::Fun(param_kind, rest) = cur {
                scope.insert(p.clone(), *param_kind);
                cur = *rest;
            } else {
                break;
            }
        }
    }

    fn result_kind_of(&self, kind: &Kind, arity: usize) -> Kind {
        let mut cur = kind.clone();
        for _ in 0..arity {
            if let Kind::Fun(_, rest) = cur {
                cur = *rest;
            } else {
                break;
            }
        }
        cur
    }

    fn check_class(&mut self, c: &ClassDecl) {
        let vars = c.type_vars();
        self.check_repeated(&vars, c.syntax());
        let mut scope = FxHashMap::default();
        if let Some(kinds) = self.class_param_kinds.get(&c.name().map(|t| t.text().to_string()).unwrap_or_default()).cloned() {
            for (v, k) in vars.iter().zip(kinds) {
                scope.insert(v.clone(), k);
            }
        }
        if let Some(ctx) = c.superclass_context() {
            self.kind_check_context(&mut scope, &ctx);
        }
        for decl in c.body_decls() {
            if let Decl::TypeSig(sig) = decl {
                if let Some(ty) = sig.signature() {
                    self.kind_check_type_of_kind(&mut scope, &ty, Kind::Star);
                }
            }
        }
    }

    fn check_instance(&mut self, i: &InstanceDecl) {
        let mut scope = FxHashMap::default();
        if let Some(ctx) = i.context() {
            self.kind_check_context(&mut scope, &ctx);
        }
        let class_arity = i
            .class_name()
            .and_then(|n| self.class_param_kinds.get(&n.text().to_string()).cloned());
        let head_types: Vec<Type> = i.head_types().collect();
        if let Some(param_kinds) = class_arity {
            if param_kinds.len() != head_types.len() {
                self.errors.push(KindError::new(
                    KindErrorKind::ArityMismatch {
                        name: i.class_name().map(|t| t.text().to_string()).unwrap_or_default(),
                        expected: param_kinds.len(),
                        found: head_types.len(),
                    },
                    node_span(i.syntax()),
                ));
            }
            for (ty, expected) in head_types.iter().zip(param_kinds) {
                self.kind_check_type_of_kind(&mut scope, ty, expected);
            }
        } else {
            for ty in &head_types {
                let k = self.infer_type(&mut scope, ty);
                self.unify(k, Kind::Star, node_span(ty.syntax()));
            }
        }
    }

    fn check_repeated(&mut self, vars: &[String], node: &hsc_parser::cst::SyntaxNode) {
        let mut seen = rustc_hash::FxHashSet::default();
        for v in vars {
            if !seen.insert(v.clone()) {
                self.errors.push(KindError::new(
                    KindErrorKind::RepeatedTypeVar(v.clone()),
                    node_span(node),
                ));
            }
        }
    }

    /// `kind_check_context` (§4.2): each constraint's head must be a known
    /// class, applied to exactly as many arguments as it has parameters;
    /// each argument's kind is unified against the corresponding parameter
    /// kind (ordinarily `★`, but whatever the class's own use sites pin it
    /// to).
    pub fn kind_check_context(&mut self, scope: &mut FxHashMap<String, Kind>, ctx: &Context) {
        for constraint in ctx.constraints() {
            let (head, args) = decompose_type_app(&constraint);
            let Some(head_name) = head else {
                continue;
            };
            match self.class_param_kinds.get(&head_name).cloned() {
                Some(param_kinds) => {
                    if param_kinds.len() != args.len() {
                        self.errors.push(KindError::new(
                            KindErrorKind::ArityMismatch {
                                name: head_name,
                                expected: param_kinds.len(),
                                found: args.len(),
                            },
                            node_span(constraint.syntax()),
                        ));
                        continue;
                    }
                    for (arg, expected) in args.iter().zip(param_kinds) {
                        self.kind_check_type_of_kind(scope, arg, expected);
                    }
                }
                None => {
                    self.errors.push(KindError::new(
                        KindErrorKind::UnknownTypeName(head_name),
                        node_span(constraint.syntax()),
                    ));
                }
            }
        }
    }

    /// `kind_check_type_of_kind` (§4.2): infer `τ`'s kind and unify it
    /// against `κ`.
    pub fn kind_check_type_of_kind(&mut self, scope: &mut FxHashMap<String, Kind>, ty: &Type, expected: Kind) {
        let actual = self.infer_type(scope, ty);
        self.unify(actual, expected, node_span(ty.syntax()));
    }

    /// `kind_for_tycon`: infer the kind of a type expression, unifying
    /// along the way (§4.2). Type variables not yet in `scope` are bound
    /// there on first occurrence with a fresh kind variable -- this is how
    /// an implicitly-quantified signature variable (`id :: a -> a`, no
    /// `forall`) gets a kind without a prior declaration site.
    pub fn infer_type(&mut self, scope: &mut FxHashMap<String, Kind>, ty: &Type) -> Kind {
        match ty {
            Type::Var(v) => {
                let Some(name) = v.name().map(|t| t.text().to_string()) else {
                    return self.fresh();
                };
                scope.entry(name).or_insert_with(|| Kind::Var(self.table.new_key(None))).clone()
            }
            Type::Con(c) => {
                let Some(name) = c.name().map(|t| t.text().to_string()) else {
                    return self.fresh();
                };
                match self.tce.get(&name) {
                    Some(info) => info.kind.clone(),
                    None => {
                        self.errors
                            .push(KindError::new(KindErrorKind::UnknownTypeName(name), node_span(ty.syntax())));
                        self.fresh()
                    }
                }
            }
            Type::App(app) => {
                let Some(head) = app.head() else { return self.fresh() };
                let mut head_kind = self.infer_type(scope, &head);
                for arg in app.args() {
                    let arg_kind = self.infer_type(scope, &arg);
                    let result = self.fresh();
                    self.unify(head_kind.clone(), Kind::fun(arg_kind, result.clone()), node_span(ty.syntax()));
                    head_kind = result;
                }
                head_kind
            }
            Type::Fun(f) => {
                if let Some(p) = f.param() {
                    let k = self.infer_type(scope, &p);
                    self.unify(k, Kind::Star, node_span(p.syntax()));
                }
                if let Some(r) = f.result() {
                    let k = self.infer_type(scope, &r);
                    self.unify(k, Kind::Star, node_span(r.syntax()));
                }
                Kind::Star
            }
            Type::Tuple(t) => {
                for el in t.elements() {
                    let k = self.infer_type(scope, &el);
                    self.unify(k, Kind::Star, node_span(el.syntax()));
                }
                Kind::Star
            }
            Type::List(l) => {
                if let Some(el) = l.element() {
                    let k = self.infer_type(scope, &el);
                    self.unify(k, Kind::Star, node_span(el.syntax()));
                }
                Kind::Star
            }
            Type::Forall(ft) => {
                let mut inner = scope.clone();
                for v in ft.bound_vars() {
                    inner.entry(v).or_insert_with(|| self.fresh());
                }
                match ft.body() {
                    Some(body) => self.infer_type(&mut inner, &body),
                    None => Kind::Star,
                }
            }
            Type::Constrained(ct) => {
                if let Some(ctx) = ct.context() {
                    self.kind_check_context(scope, &ctx);
                }
                match ct.body() {
                    Some(body) => self.infer_type(scope, &body),
                    None => Kind::Star,
                }
            }
            Type::OfKind(tok) => {
                let expected = tok
                    .kind()
                    .map(|k| self.convert_kind(&k))
                    .unwrap_or(Kind::Star);
                if let Some(body) = tok.body() {
                    self.kind_check_type_of_kind(scope, &body, expected.clone());
                }
                expected
            }
        }
    }

    fn convert_kind(&mut self, k: &hsc_parser::ast::ty::Kind) -> Kind {
        use hsc_parser::ast::ty::Kind as AstKind;
        match k {
            AstKind::Star(_) => Kind::Star,
            AstKind::Constraint(_) => Kind::Constraint,
            AstKind::Var(_) => self.fresh(),
            AstKind::Fun(kf) => {
                let p = kf.param().map(|k| self.convert_kind(&k)).unwrap_or(Kind::Star);
                let r = kf.result().map(|k| self.convert_kind(&k)).unwrap_or(Kind::Star);
                Kind::fun(p, r)
            }
        }
    }

    /// Close out the checker: every remaining free kind variable in the
    /// TCE and class tables defaults to `★` (§3 "Kinds", closure rule).
    pub fn finish(mut self) -> (Tce, FxHashMap<String, Vec<Kind>>, Vec<KindError>) {
        let tce_names: Vec<String> = self.tce.map.keys().cloned().collect();
        for name in tce_names {
            let info = self.tce.map.get(&name).unwrap().clone();
            let resolved = self.default_star(self.resolve(info.kind));
            self.tce.map.insert(name, TyConInfo { kind: resolved, arity: info.arity });
        }
        let class_names: Vec<String> = self.class_param_kinds.keys().cloned().collect();
        for name in class_names {
            let kinds = self.class_param_kinds.get(&name).unwrap().clone();
            let resolved = kinds
                .into_iter()
                .map(|k| self.default_star(self.resolve(k)))
                .collect();
            self.class_param_kinds.insert(name, resolved);
        }
        (self.tce, self.class_param_kinds, self.errors)
    }

    fn default_star(&mut self, kind: Kind) -> Kind {
        match kind {
            Kind::Var(_) => Kind::Star,
            Kind::Fun(p, r) => Kind::fun(self.default_star(*p), self.default_star(*r)),
            other => other,
        }
    }
}

impl Default for KindChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Decompose a (possibly-applied) type into its head type constructor's
/// name and its argument list, the way a class constraint's `C τ1…τn`
/// needs to (§4.2 `kind_check_context`).
pub fn decompose_type_app(ty: &Type) -> (Option<String>, Vec<Type>) {
    match ty {
        Type::Con(c) => (c.name().map(|t| t.text().to_string()), Vec::new()),
        Type::App(app) => {
            let head_name = app.head().and_then(|h| match h {
                Type::Con(c) => c.name().map(|t| t.text().to_string()),
                _ => None,
            });
            (head_name, app.args().collect())
        }
        _ => (None, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsc_parser::parse;

    fn check(src: &str) -> Vec<KindError> {
        let parsed = parse(src);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        let file = parsed.source_file().unwrap();
        let mut checker = KindChecker::new();
        checker.register_headers(&file);
        checker.check_module(&file);
        let (_, _, errors) = checker.finish();
        errors
    }

    #[test]
    fn simple_data_decl_kind_checks() {
        let errors = check("data Bool2 = T | F\n");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn parametric_data_decl_infers_star_to_star() {
        let errors = check("data Maybe a = Nothing | Just a\n");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn unknown_type_constructor_is_rejected() {
        let errors = check("data T = T Frobnicate\n");
        assert!(errors.iter().any(|e| matches!(e.kind, KindErrorKind::UnknownTypeName(_))));
    }

    #[test]
    fn repeated_type_var_in_header_is_rejected() {
        let errors = check("data Pair a a = Pair a a\n");
        assert!(errors.iter().any(|e| matches!(e.kind, KindErrorKind::RepeatedTypeVar(_))));
    }

    #[test]
    fn class_header_and_superclass_context() {
        let errors = check(
            r#"
class Eq a where
  eq :: a -> a -> Bool

class Eq a => Ord a where
  lt :: a -> a -> Bool
"#,
        );
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn instance_head_must_match_class_arity() {
        let errors = check(
            r#"
class Eq a where
  eq :: a -> a -> Bool

instance Eq Int Int where
  eq x y = True
"#,
        );
        assert!(errors.iter().any(|e| matches!(e.kind, KindErrorKind::ArityMismatch { .. })));
    }

    #[test]
    fn higher_kinded_type_constructor_infers_correctly() {
        let errors = check("data Tree f a = Leaf a | Branch (f (Tree f a))\n");
        assert!(errors.is_empty(), "{errors:?}");
    }
}
