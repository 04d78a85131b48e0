//! Expression inference (§4.4.5): returns an elaborated expression and its
//! monotype. Variable/literal lookups instantiate their scheme and apply
//! the resulting dictionaries inline; application unifies the function's
//! type against its arguments one at a time; `let` defers to
//! [`crate::decls`] for generalization.

use hsc_parser::ast::expr::{Expr, Guard, GuardedRhs, Qualifier, Rhs, Stmt};
use hsc_parser::ast::AstNode;
use hsc_parser::syntax_kind::SyntaxKind;

use crate::elaborated::{ElabExpr, ElabLit, ElabPat};
use crate::error::{ConstraintOrigin, TypeError};
use crate::pat::infer_pattern;
use crate::ty::{PredType, Type, TypeCon};
use crate::InferCtx;

fn char_ty() -> Type {
    Type::Con(TypeCon::new("Char", hsc_kinds::Kind::Star))
}

fn bool_ty() -> Type {
    Type::Con(TypeCon::new("Bool", hsc_kinds::Kind::Star))
}

fn unify(ctx: &mut InferCtx, expected: &Type, found: &Type, origin: ConstraintOrigin) {
    if ctx.table.unify(expected, found, origin.clone()).is_err() {
        let e = ctx.table.zonk(expected);
        let f = ctx.table.zonk(found);
        ctx.report(TypeError::TypeMismatch { expected: e.to_string(), found: f.to_string(), origin });
    }
}

pub fn infer_expr(expr: &Expr, ctx: &mut InferCtx) -> ElabExpr {
    match expr {
        Expr::Var(v) => {
            let name = v.name().map(|t| t.text().to_string()).unwrap_or_default();
            infer_name_use(&name, ctx)
        }
        Expr::Con(c) => {
            let name = c.name().map(|t| t.text().to_string()).unwrap_or_default();
            infer_name_use(&name, ctx)
        }
        Expr::Lit(lit) => infer_lit(lit, ctx),
        Expr::Neg(n) => {
            let operand = n.operand().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            let ty = operand.ty().clone();
            ctx.lie.want(PredType::new("Num", vec![ty.clone()]));
            ElabExpr::App(
                Box::new(ElabExpr::Var { name: "negate".into(), dict_args: vec![], ty: Type::fun(ty.clone(), ty.clone()) }),
                Box::new(operand),
                ty,
            )
        }
        Expr::App(app) => {
            let Some(fun_expr) = app.function() else { return fresh_error_expr(ctx) };
            let mut fun_elab = infer_expr(&fun_expr, ctx);
            for arg in app.args() {
                let arg_elab = infer_expr(&arg, ctx);
                let result_ty = ctx.fresh_meta();
                let expected_fn = Type::fun(arg_elab.ty().clone(), result_ty.clone());
                unify(ctx, fun_elab.ty(), &expected_fn, ConstraintOrigin::Application);
                fun_elab = ElabExpr::App(Box::new(fun_elab), Box::new(arg_elab), result_ty);
            }
            fun_elab
        }
        Expr::Infix(infix) => infer_infix(infix, ctx),
        Expr::Lambda(lam) => {
            ctx.lve.push_scope();
            let params: Vec<ElabPat> = lam.params().map(|p| infer_pattern(&p, ctx)).collect();
            let body = lam.body().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            ctx.lve.pop_scope();
            let ty = crate::ty::Type::curried_fun(params.iter().map(|p| p.ty().clone()).collect::<Vec<_>>(), body.ty().clone());
            ElabExpr::Lambda(params, Box::new(body), ty)
        }
        Expr::Let(let_expr) => {
            ctx.lve.push_scope();
            let decls: Vec<_> = let_expr.decls().collect();
            let genbinds = crate::decls::check_let_decls(&decls, ctx);
            let body = let_expr.body().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            ctx.lve.pop_scope();
            let ty = body.ty().clone();
            ElabExpr::Let(genbinds, Box::new(body), ty)
        }
        Expr::If(if_expr) => {
            let cond = if_expr.condition().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            unify(ctx, cond.ty(), &bool_ty(), ConstraintOrigin::IfBranches);
            let then_b = if_expr.then_branch().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            let else_b = if_expr.else_branch().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            unify(ctx, then_b.ty(), else_b.ty(), ConstraintOrigin::IfBranches);
            let ty = then_b.ty().clone();
            ElabExpr::If(Box::new(cond), Box::new(then_b), Box::new(else_b), ty)
        }
        Expr::Case(case_expr) => {
            let scrutinee = case_expr.scrutinee().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            let scrutinee_ty = scrutinee.ty().clone();
            let result_ty = ctx.fresh_meta();
            let mut alts = Vec::new();
            for arm in case_expr.arms() {
                ctx.lve.push_scope();
                let pat = arm.pattern().map(|p| infer_pattern(&p, ctx)).unwrap_or_else(|| ElabPat::Wildcard(ctx.fresh_meta()));
                unify(ctx, &scrutinee_ty, pat.ty(), ConstraintOrigin::CaseAlternatives);
                if let Some(rhs) = arm.rhs() {
                    for body in infer_rhs(&rhs, ctx) {
                        unify(ctx, &result_ty, body.ty(), ConstraintOrigin::CaseAlternatives);
                        alts.push(crate::elaborated::ElabAlt { pat: pat.clone(), body });
                    }
                }
                ctx.lve.pop_scope();
            }
            ElabExpr::Case(Box::new(scrutinee), alts, result_ty)
        }
        Expr::Tuple(t) => {
            let elems: Vec<ElabExpr> = t.elements().map(|e| infer_expr(&e, ctx)).collect();
            let ty = Type::Tuple(elems.iter().map(|e| e.ty().clone()).collect());
            ElabExpr::Tuple(elems, ty)
        }
        Expr::List(l) => {
            let elem_ty = ctx.fresh_meta();
            let elems: Vec<ElabExpr> = l
                .elements()
                .map(|e| {
                    let elab = infer_expr(&e, ctx);
                    unify(ctx, &elem_ty, elab.ty(), ConstraintOrigin::ListElements);
                    elab
                })
                .collect();
            ElabExpr::List(elems, Type::list(elem_ty))
        }
        Expr::Paren(p) => p.inner().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx)),
        Expr::ListComp(comp) => infer_list_comp(comp, ctx),
        Expr::EnumFrom(e) => {
            let from = e.from().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            ctx.lie.want(PredType::new("Enum", vec![from.ty().clone()]));
            ElabExpr::List(vec![from.clone()], Type::list(from.ty().clone()))
        }
        Expr::EnumFromTo(e) => {
            let from = e.from().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            let to = e.to().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            unify(ctx, from.ty(), to.ty(), ConstraintOrigin::Enumeration);
            ctx.lie.want(PredType::new("Enum", vec![from.ty().clone()]));
            ElabExpr::List(vec![from.clone(), to], Type::list(from.ty().clone()))
        }
        Expr::EnumFromThen(e) => {
            let from = e.from().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            let then = e.then().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            unify(ctx, from.ty(), then.ty(), ConstraintOrigin::Enumeration);
            ctx.lie.want(PredType::new("Enum", vec![from.ty().clone()]));
            ElabExpr::List(vec![from.clone(), then], Type::list(from.ty().clone()))
        }
        Expr::EnumFromThenTo(e) => {
            let from = e.from().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            let then = e.then().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            let to = e.to().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            unify(ctx, from.ty(), then.ty(), ConstraintOrigin::Enumeration);
            unify(ctx, from.ty(), to.ty(), ConstraintOrigin::Enumeration);
            ctx.lie.want(PredType::new("Enum", vec![from.ty().clone()]));
            ElabExpr::List(vec![from.clone(), then, to], Type::list(from.ty().clone()))
        }
        Expr::SectionLeft(s) => {
            let operand = s.operand().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            let op = s.operator().into_iter().next().unwrap_or_default();
            let op_expr = infer_name_use(&op, ctx);
            let rhs_ty = ctx.fresh_meta();
            let result_ty = ctx.fresh_meta();
            let expected_fn = Type::fun(operand.ty().clone(), Type::fun(rhs_ty, result_ty.clone()));
            unify(ctx, op_expr.ty(), &expected_fn, ConstraintOrigin::Application);
            ElabExpr::App(Box::new(op_expr), Box::new(operand), result_ty)
        }
        Expr::SectionRight(s) => {
            let operand = s.operand().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            let op = s.operator().into_iter().next().unwrap_or_default();
            let op_expr = infer_name_use(&op, ctx);
            let lhs_ty = ctx.fresh_meta();
            let result_ty = ctx.fresh_meta();
            let expected_fn = Type::fun(lhs_ty, Type::fun(operand.ty().clone(), result_ty.clone()));
            unify(ctx, op_expr.ty(), &expected_fn, ConstraintOrigin::Application);
            ElabExpr::App(Box::new(op_expr), Box::new(operand), result_ty)
        }
        Expr::Typed(t) => {
            let inner = t.expr().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            if let Some(ty_ast) = t.signature() {
                let sig_ty = crate::decls::elaborate_type(&ty_ast, ctx);
                unify(ctx, inner.ty(), &sig_ty, ConstraintOrigin::Signature);
            }
            inner
        }
        Expr::RecordCon(r) => {
            let name = match r.base() {
                Some(Expr::Con(c)) => c.name().map(|t| t.text().to_string()).unwrap_or_default(),
                _ => String::new(),
            };
            let con_expr = infer_name_use(&name, ctx);
            let mut fields: Vec<ElabExpr> = Vec::new();
            for field in r.fields() {
                let value = field.value().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
                fields.push(value);
            }
            let result_ty = con_expr.ty().clone();
            ElabExpr::DictCon { class: name, fields, ty: result_ty }
        }
        Expr::RecordUpdate(r) => {
            let base = r.base().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
            for field in r.fields() {
                let _ = field.value().map(|e| infer_expr(&e, ctx));
            }
            base
        }
        Expr::Do(do_expr) => infer_do(do_expr, ctx),
    }
}

/// Looks a name up in the LVE first (shadowing), then the GVE, then the
/// CVE (constructors are ordinary values in expression position),
/// instantiating whichever scheme is found (§4.4.5 "Variable").
fn infer_name_use(name: &str, ctx: &mut InferCtx) -> ElabExpr {
    let scheme = ctx.lve.lookup(name).cloned().or_else(|| ctx.gve.get(name).cloned()).or_else(|| ctx.cve.get(name).cloned());
    match scheme {
        Some(scheme) => {
            let (ty, dict_args) = ctx.instantiate(&scheme);
            ElabExpr::Var { name: name.to_string(), dict_args, ty }
        }
        None => {
            ctx.report(TypeError::UnknownName { name: name.to_string(), span: None });
            ElabExpr::Var { name: name.to_string(), dict_args: vec![], ty: ctx.fresh_meta() }
        }
    }
}

fn fresh_error_expr(ctx: &mut InferCtx) -> ElabExpr {
    let ty = ctx.fresh_meta();
    ElabExpr::Var { name: "<error>".into(), dict_args: vec![], ty }
}

fn infer_lit(lit: &hsc_parser::ast::expr::LitExpr, ctx: &mut InferCtx) -> ElabExpr {
    let Some(tok) = lit.token() else { return fresh_error_expr(ctx) };
    match tok.kind() {
        SyntaxKind::INT_LITERAL => {
            let n: i64 = tok.text().parse().unwrap_or(0);
            let ty = ctx.fresh_meta();
            ctx.lie.want(PredType::new("Num", vec![ty.clone()]));
            ElabExpr::Lit(ElabLit::Int(n), ty)
        }
        SyntaxKind::FLOAT_LITERAL => {
            let n: f64 = tok.text().parse().unwrap_or(0.0);
            let ty = ctx.fresh_meta();
            ctx.lie.want(PredType::new("Fractional", vec![ty.clone()]));
            ElabExpr::Lit(ElabLit::Rational(n), ty)
        }
        SyntaxKind::CHAR_LITERAL => {
            let c = tok.text().chars().nth(1).unwrap_or('\0');
            ElabExpr::Lit(ElabLit::Char(c), char_ty())
        }
        SyntaxKind::STRING_LITERAL => {
            let s = tok.text().trim_matches('"').to_string();
            ElabExpr::Lit(ElabLit::Str(s), Type::list(char_ty()))
        }
        _ => fresh_error_expr(ctx),
    }
}

fn infer_infix(infix: &hsc_parser::ast::expr::InfixExpr, ctx: &mut InferCtx) -> ElabExpr {
    let operands: Vec<ElabExpr> = infix.operands().map(|e| infer_expr(&e, ctx)).collect();
    let operators = infix.operators();
    let fixities = ctx.fixities.clone();
    let result = hsc_rename::resolve_infix(operands, operators, &fixities, |lhs, op, rhs| {
        let op_expr = infer_name_use(op, ctx);
        let result_ty = ctx.fresh_meta();
        let expected_fn = Type::fun(lhs.ty().clone(), Type::fun(rhs.ty().clone(), result_ty.clone()));
        unify(ctx, op_expr.ty(), &expected_fn, ConstraintOrigin::Application);
        let partial = ElabExpr::App(Box::new(op_expr), Box::new(lhs), result_ty.clone());
        ElabExpr::App(Box::new(partial), Box::new(rhs), result_ty)
    });
    match result {
        Ok(expr) => expr,
        Err(_) => fresh_error_expr(ctx),
    }
}

fn infer_list_comp(comp: &hsc_parser::ast::expr::ListCompExpr, ctx: &mut InferCtx) -> ElabExpr {
    ctx.lve.push_scope();
    for qual in comp.qualifiers() {
        match qual {
            Qualifier::Generator(g) => {
                let source = g.source().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
                let elem_ty = ctx.fresh_meta();
                unify(ctx, source.ty(), &Type::list(elem_ty.clone()), ConstraintOrigin::Comprehension);
                if let Some(p) = g.pattern_expr() {
                    if let Expr::Var(v) = p {
                        let name = v.name().map(|t| t.text().to_string()).unwrap_or_default();
                        ctx.lve.bind_mono(name, elem_ty);
                    }
                }
            }
            Qualifier::Filter(f) => {
                let cond = f.expr().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
                unify(ctx, cond.ty(), &bool_ty(), ConstraintOrigin::Comprehension);
            }
            Qualifier::Let(l) => {
                let decls: Vec<_> = l.decls().collect();
                crate::decls::check_let_decls(&decls, ctx);
            }
        }
    }
    let result = comp.result().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
    ctx.lve.pop_scope();
    let ty = Type::list(result.ty().clone());
    ElabExpr::List(vec![result], ty)
}

/// Evaluates every guard in a chained filter (§4.4.7): boolean guards
/// require `Bool`, pattern guards bind fresh variables, let-guards bring
/// bindings into scope for the rest of the chain and the body.
pub(crate) fn infer_rhs(rhs: &Rhs, ctx: &mut InferCtx) -> Vec<ElabExpr> {
    if let Some(body) = rhs.unguarded_body() {
        return vec![infer_expr(&body, ctx)];
    }
    rhs.guarded_rhss().map(|g| infer_guarded_rhs(&g, ctx)).collect()
}

fn infer_guarded_rhs(guarded: &GuardedRhs, ctx: &mut InferCtx) -> ElabExpr {
    ctx.lve.push_scope();
    for guard in guarded.guards() {
        match guard {
            Guard::Bool(b) => {
                let cond = b.expr().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
                unify(ctx, cond.ty(), &bool_ty(), ConstraintOrigin::Comprehension);
            }
            Guard::Pat(p) => {
                let source = p.source().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
                if let Some(Expr::Var(v)) = p.pattern_expr() {
                    let name = v.name().map(|t| t.text().to_string()).unwrap_or_default();
                    ctx.lve.bind_mono(name, source.ty().clone());
                }
            }
            Guard::Let(l) => {
                let decls: Vec<_> = l.decls().collect();
                crate::decls::check_let_decls(&decls, ctx);
            }
        }
    }
    let body = guarded.body().map(|e| infer_expr(&e, ctx)).unwrap_or_else(|| fresh_error_expr(ctx));
    ctx.lve.pop_scope();
    body
}

/// `do`-notation is not part of this checker's expression grammar (§4.4.5
/// lists the forms it covers, and this isn't one of them); each statement
/// is still inferred so unknown names and structural mismatches inside it
/// are still reported, but the block's own type is left an unconstrained
/// meta-variable rather than threaded through a `Monad` desugaring.
fn infer_do(do_expr: &hsc_parser::ast::expr::DoExpr, ctx: &mut InferCtx) -> ElabExpr {
    ctx.lve.push_scope();
    for stmt in do_expr.statements() {
        match stmt {
            Stmt::Bind(b) => {
                let source = b.source().map(|e| infer_expr(&e, ctx));
                if let (Some(Expr::Var(v)), Some(source)) = (b.pattern_expr(), source) {
                    let name = v.name().map(|t| t.text().to_string()).unwrap_or_default();
                    ctx.lve.bind_mono(name, source.ty().clone());
                }
            }
            Stmt::Let(l) => {
                let decls: Vec<_> = l.decls().collect();
                crate::decls::check_let_decls(&decls, ctx);
            }
            Stmt::Expr(e) => {
                if let Some(e) = e.expr() {
                    infer_expr(&e, ctx);
                }
            }
        }
    }
    ctx.lve.pop_scope();
    fresh_error_expr(ctx)
}
