//! Pattern inference (§4.4.4): returns an elaborated pattern, its
//! monotype, and the local bindings it introduces. Var/constructor/
//! literal/as/lazy/strict/wildcard/list/tuple patterns each follow their
//! own rule from §4.4.4; constructor patterns go through [`InferCtx::instantiate`]
//! exactly like a variable expression does.

use hsc_parser::ast::pat::Pattern;
use hsc_parser::ast::AstNode;
use hsc_parser::syntax_kind::SyntaxKind;

use crate::elaborated::{ElabLit, ElabPat};
use crate::error::{ConstraintOrigin, TypeError};
use crate::ty::{PredType, Type};
use crate::InferCtx;

/// Infers a pattern, binding every variable it introduces into the
/// current (innermost) LVE scope as it goes, and returns the elaborated
/// pattern together with its monotype.
pub fn infer_pattern(pat: &Pattern, ctx: &mut InferCtx) -> ElabPat {
    match pat {
        Pattern::Var(v) => {
            let name = v.name().map(|t| t.text().to_string()).unwrap_or_default();
            let ty = ctx.fresh_meta();
            ctx.lve.bind_mono(name.clone(), ty.clone());
            ElabPat::Var(name, ty)
        }
        Pattern::Wildcard(_) => ElabPat::Wildcard(ctx.fresh_meta()),
        Pattern::Lit(lit) => infer_lit_pattern(lit, ctx),
        Pattern::Con(con) => {
            let name = con.con_name().map(|t| t.text().to_string()).unwrap_or_default();
            let args: Vec<Pattern> = con.args().collect();
            infer_con_pattern(&name, &args, ctx)
        }
        Pattern::InfixCon(con) => {
            let name = con.con_sym().map(|t| t.text().to_string()).unwrap_or_default();
            let args: Vec<Pattern> = [con.left(), con.right()].into_iter().flatten().collect();
            infer_con_pattern(&name, &args, ctx)
        }
        Pattern::Tuple(t) => {
            let elems: Vec<ElabPat> = t.elements().map(|p| infer_pattern(&p, ctx)).collect();
            let ty = Type::Tuple(elems.iter().map(|e| e.ty().clone()).collect());
            ElabPat::Tuple(elems, ty)
        }
        Pattern::List(l) => {
            let elem_ty = ctx.fresh_meta();
            let elems: Vec<ElabPat> = l
                .elements()
                .map(|p| {
                    let elab = infer_pattern(&p, ctx);
                    if ctx.table.unify(&elem_ty, elab.ty(), ConstraintOrigin::ListElements).is_err() {
                        ctx.report(mismatch(&elem_ty, elab.ty(), ctx));
                    }
                    elab
                })
                .collect();
            ElabPat::List(elems, Type::list(elem_ty))
        }
        Pattern::As(a) => {
            let name = a.name().map(|t| t.text().to_string()).unwrap_or_default();
            let inner = a.inner().map(|p| infer_pattern(&p, ctx)).unwrap_or_else(|| ElabPat::Wildcard(ctx.fresh_meta()));
            ctx.lve.bind_mono(name.clone(), inner.ty().clone());
            ElabPat::As(name, Box::new(inner.clone()), inner.ty().clone())
        }
        Pattern::Lazy(l) => {
            let inner = l.inner().map(|p| infer_pattern(&p, ctx)).unwrap_or_else(|| ElabPat::Wildcard(ctx.fresh_meta()));
            let ty = inner.ty().clone();
            ElabPat::Lazy(Box::new(inner), ty)
        }
        Pattern::Bang(b) => {
            let inner = b.inner().map(|p| infer_pattern(&p, ctx)).unwrap_or_else(|| ElabPat::Wildcard(ctx.fresh_meta()));
            let ty = inner.ty().clone();
            ElabPat::Strict(Box::new(inner), ty)
        }
        Pattern::Paren(p) => p.inner().map(|inner| infer_pattern(&inner, ctx)).unwrap_or_else(|| ElabPat::Wildcard(ctx.fresh_meta())),
        Pattern::Record(r) => {
            let name = r.con_name().map(|t| t.text().to_string()).unwrap_or_default();
            let Some(scheme) = ctx.cve.get(&name).cloned() else {
                ctx.report(TypeError::UnknownName { name: name.clone(), span: None });
                return ElabPat::Wildcard(ctx.fresh_meta());
            };
            let (con_ty, _) = ctx.instantiate(&scheme);
            let (_field_tys, result_ty) = uncurry(&con_ty);
            // Field declaration order isn't carried on `Scheme`, so record
            // patterns are elaborated positionally by appearance rather
            // than matched back to the constructor's declared field names.
            let args: Vec<ElabPat> = r
                .fields()
                .map(|field| field.value().map(|p| infer_pattern(&p, ctx)).unwrap_or_else(|| ElabPat::Wildcard(ctx.fresh_meta())))
                .collect();
            ElabPat::Con { name, args, ty: result_ty }
        }
    }
}

fn infer_lit_pattern(lit: &hsc_parser::ast::pat::LitPat, ctx: &mut InferCtx) -> ElabPat {
    let Some(tok) = lit.token() else {
        return ElabPat::Wildcard(ctx.fresh_meta());
    };
    match tok.kind() {
        SyntaxKind::INT_LITERAL => {
            let n: i64 = tok.text().parse().unwrap_or(0);
            let ty = ctx.fresh_meta();
            let a = PredType::new("Num", vec![ty.clone()]);
            ctx.lie.want(a);
            ElabPat::Lit(ElabLit::Int(n), ty)
        }
        SyntaxKind::FLOAT_LITERAL => {
            let n: f64 = tok.text().parse().unwrap_or(0.0);
            let ty = ctx.fresh_meta();
            ctx.lie.want(PredType::new("Fractional", vec![ty.clone()]));
            ElabPat::Lit(ElabLit::Rational(n), ty)
        }
        SyntaxKind::CHAR_LITERAL => {
            let text = tok.text();
            let c = text.chars().nth(1).unwrap_or('\0');
            ElabPat::Lit(ElabLit::Char(c), Type::Con(crate::ty::TypeCon::new("Char", hsc_kinds::Kind::Star)))
        }
        SyntaxKind::STRING_LITERAL => {
            let s = tok.text().trim_matches('"').to_string();
            let char_ty = Type::Con(crate::ty::TypeCon::new("Char", hsc_kinds::Kind::Star));
            ElabPat::Lit(ElabLit::Str(s), Type::list(char_ty))
        }
        _ => ElabPat::Wildcard(ctx.fresh_meta()),
    }
}

fn infer_con_pattern(name: &str, args: &[Pattern], ctx: &mut InferCtx) -> ElabPat {
    let Some(scheme) = ctx.cve.get(name).cloned() else {
        ctx.report(TypeError::UnknownName { name: name.to_string(), span: None });
        let elab_args: Vec<ElabPat> = args.iter().map(|p| infer_pattern(p, ctx)).collect();
        return ElabPat::Con { name: name.to_string(), args: elab_args, ty: ctx.fresh_meta() };
    };
    let (con_ty, _dict_args) = ctx.instantiate(&scheme);
    let (field_tys, result_ty) = uncurry(&con_ty);
    let mut elab_args = Vec::new();
    for (i, arg_pat) in args.iter().enumerate() {
        let elab = infer_pattern(arg_pat, ctx);
        if let Some(expected) = field_tys.get(i) {
            if ctx.table.unify(expected, elab.ty(), ConstraintOrigin::Application).is_err() {
                ctx.report(mismatch(expected, elab.ty(), ctx));
            }
        }
        elab_args.push(elab);
    }
    ElabPat::Con { name: name.to_string(), args: elab_args, ty: result_ty }
}

/// Splits a curried constructor type `τ1 -> … -> τn -> τ` into its
/// argument types and final result type.
fn uncurry(ty: &Type) -> (Vec<Type>, Type) {
    let mut args = Vec::new();
    let mut cur = ty.clone();
    loop {
        match cur {
            Type::Fun(p, r) => {
                args.push(*p);
                cur = *r;
            }
            other => return (args, other),
        }
    }
}

fn mismatch(expected: &Type, found: &Type, ctx: &mut InferCtx) -> TypeError {
    let e = ctx.table.zonk(expected);
    let f = ctx.table.zonk(found);
    TypeError::TypeMismatch { expected: e.to_string(), found: f.to_string(), origin: ConstraintOrigin::Application }
}
