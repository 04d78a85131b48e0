//! Scope-aware free-variable and bound-variable collection over the
//! surface AST, used by [`crate::graph`] to build the declaration
//! dependency graph (§4.3).
//!
//! These walks only need to be accurate about *which outer names a
//! declaration refers to*, not about producing a renamed tree -- so they
//! stay local Rust functions rather than a second AST pass.

use rustc_hash::FxHashSet;

use hsc_parser::ast::expr::{Expr, Guard, Qualifier, Rhs, Stmt};
use hsc_parser::ast::item::Decl;
use hsc_parser::ast::pat::Pattern;

/// Names a declaration binds: the function name for a `FunBind`, or every
/// variable pattern in a `PatBind`'s left-hand side (a tuple/constructor
/// pattern binding can introduce several names at once).
pub fn defined_names(decl: &Decl) -> Vec<String> {
    match decl {
        Decl::FunBind(fb) => fb.name().and_then(|n| n.text()).into_iter().collect(),
        Decl::PatBind(pb) => {
            let mut out = FxHashSet::default();
            if let Some(pat) = pb.pattern() {
                pattern_vars(&pat, &mut out);
            }
            out.into_iter().collect()
        }
        _ => Vec::new(),
    }
}

pub fn pattern_vars(pat: &Pattern, out: &mut FxHashSet<String>) {
    match pat {
        Pattern::Var(v) => {
            if let Some(tok) = v.name() {
                out.insert(tok.text().to_string());
            }
        }
        Pattern::Con(c) => {
            for p in c.args() {
                pattern_vars(&p, out);
            }
        }
        Pattern::Lit(_) | Pattern::Wildcard(_) => {}
        Pattern::Tuple(t) => {
            for p in t.elements() {
                pattern_vars(&p, out);
            }
        }
        Pattern::List(l) => {
            for p in l.elements() {
                pattern_vars(&p, out);
            }
        }
        Pattern::As(a) => {
            if let Some(tok) = a.name() {
                out.insert(tok.text().to_string());
            }
            if let Some(inner) = a.inner() {
                pattern_vars(&inner, out);
            }
        }
        Pattern::Lazy(l) => {
            if let Some(inner) = l.inner() {
                pattern_vars(&inner, out);
            }
        }
        Pattern::Bang(b) => {
            if let Some(inner) = b.inner() {
                pattern_vars(&inner, out);
            }
        }
        Pattern::Paren(p) => {
            if let Some(inner) = p.inner() {
                pattern_vars(&inner, out);
            }
        }
        Pattern::InfixCon(i) => {
            if let Some(l) = i.left() {
                pattern_vars(&l, out);
            }
            if let Some(r) = i.right() {
                pattern_vars(&r, out);
            }
        }
        Pattern::Record(r) => {
            for field in r.fields() {
                if let Some(v) = field.value() {
                    pattern_vars(&v, out);
                }
            }
        }
    }
}

/// `pat <- expr` / list-comprehension generators parse their left-hand side
/// as an ordinary `Expr` rather than a `Pattern` (simple patterns and simple
/// expressions share a grammar up to this point); this walks that shape
/// collecting the variables it binds the same way `pattern_vars` would.
fn bound_vars_of_expr_as_pattern(e: &Expr, out: &mut FxHashSet<String>) {
    match e {
        Expr::Var(v) => {
            if let Some(tok) = v.name() {
                let name = tok.text().to_string();
                if name != "_" {
                    out.insert(name);
                }
            }
        }
        Expr::Con(_) | Expr::Lit(_) => {}
        Expr::App(a) => {
            // The function position of a constructor pattern like `Just x`
            // is the constructor itself; only argument positions bind.
            for arg in a.args() {
                bound_vars_of_expr_as_pattern(&arg, out);
            }
        }
        Expr::Tuple(t) => {
            for el in t.elements() {
                bound_vars_of_expr_as_pattern(&el, out);
            }
        }
        Expr::List(l) => {
            for el in l.elements() {
                bound_vars_of_expr_as_pattern(&el, out);
            }
        }
        Expr::Paren(p) => {
            if let Some(inner) = p.inner() {
                bound_vars_of_expr_as_pattern(&inner, out);
            }
        }
        Expr::Neg(n) => {
            if let Some(inner) = n.operand() {
                bound_vars_of_expr_as_pattern(&inner, out);
            }
        }
        Expr::Typed(t) => {
            if let Some(inner) = t.expr() {
                bound_vars_of_expr_as_pattern(&inner, out);
            }
        }
        _ => {}
    }
}

/// Free variables referenced by a single declaration's right-hand side(s),
/// not counting its own parameters/`where`-bindings. `outer_bound` carries
/// names already in scope from an enclosing `where`/`let` so nested
/// declarations don't report them as free, but it is *not* subtracted from
/// the result -- callers only care which names resolve to sibling
/// declarations in the group being built (see [`crate::graph`]).
pub fn free_vars_of_decl(decl: &Decl) -> FxHashSet<String> {
    free_vars_of_decl_with_bound(decl, &FxHashSet::default())
}

fn free_vars_of_decl_with_bound(decl: &Decl, outer_bound: &FxHashSet<String>) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    match decl {
        Decl::FunBind(fb) => {
            let mut bound = outer_bound.clone();
            if let Some(params) = fb.params() {
                for p in params.params() {
                    pattern_vars(&p, &mut bound);
                }
            }
            if let Some(w) = fb.where_clause() {
                for d in w.decls() {
                    bound.extend(defined_names(&d));
                }
                for d in w.decls() {
                    out.extend(free_vars_of_decl_with_bound(&d, &bound));
                }
            }
            if let Some(rhs) = fb.rhs() {
                free_vars_of_rhs(&rhs, &bound, &mut out);
            }
        }
        Decl::PatBind(pb) => {
            let mut bound = outer_bound.clone();
            if let Some(w) = pb.where_clause() {
                for d in w.decls() {
                    bound.extend(defined_names(&d));
                }
                for d in w.decls() {
                    out.extend(free_vars_of_decl_with_bound(&d, &bound));
                }
            }
            if let Some(rhs) = pb.rhs() {
                free_vars_of_rhs(&rhs, &bound, &mut out);
            }
        }
        _ => {}
    }
    out
}

fn free_vars_of_rhs(rhs: &Rhs, bound: &FxHashSet<String>, out: &mut FxHashSet<String>) {
    if let Some(body) = rhs.unguarded_body() {
        free_vars_of_expr(&body, bound, out);
        return;
    }
    for g in rhs.guarded_rhss() {
        let mut local_bound = bound.clone();
        for guard in g.guards() {
            match guard {
                Guard::Bool(b) => {
                    if let Some(e) = b.expr() {
                        free_vars_of_expr(&e, &local_bound, out);
                    }
                }
                Guard::Pat(p) => {
                    if let Some(src) = p.source() {
                        free_vars_of_expr(&src, &local_bound, out);
                    }
                    if let Some(pe) = p.pattern_expr() {
                        bound_vars_of_expr_as_pattern(&pe, &mut local_bound);
                    }
                }
                Guard::Let(l) => {
                    let decls: Vec<Decl> = l.decls().collect();
                    for d in &decls {
                        local_bound.extend(defined_names(d));
                    }
                    for d in &decls {
                        out.extend(free_vars_of_decl_with_bound(d, &local_bound));
                    }
                }
            }
        }
        if let Some(body) = g.body() {
            free_vars_of_expr(&body, &local_bound, out);
        }
    }
}

fn free_vars_of_expr(expr: &Expr, bound: &FxHashSet<String>, out: &mut FxHashSet<String>) {
    match expr {
        Expr::Var(v) => {
            if let Some(tok) = v.name() {
                let name = tok.text().to_string();
                if name != "_" && !bound.contains(&name) {
                    out.insert(name);
                }
            }
        }
        Expr::Con(_) | Expr::Lit(_) => {}
        Expr::App(a) => {
            for e in a.exprs() {
                free_vars_of_expr(&e, bound, out);
            }
        }
        Expr::Infix(i) => {
            for e in i.operands() {
                free_vars_of_expr(&e, bound, out);
            }
            for op in i.operators() {
                if !op.starts_with(':') && !bound.contains(&op) {
                    out.insert(op);
                }
            }
        }
        Expr::Neg(n) => {
            if let Some(e) = n.operand() {
                free_vars_of_expr(&e, bound, out);
            }
        }
        Expr::Lambda(l) => {
            let mut b2 = bound.clone();
            for p in l.params() {
                pattern_vars(&p, &mut b2);
            }
            if let Some(body) = l.body() {
                free_vars_of_expr(&body, &b2, out);
            }
        }
        Expr::Let(l) => {
            let decls: Vec<Decl> = l.decls().collect();
            let mut b2 = bound.clone();
            for d in &decls {
                b2.extend(defined_names(d));
            }
            for d in &decls {
                out.extend(free_vars_of_decl_with_bound(d, &b2));
            }
            if let Some(body) = l.body() {
                free_vars_of_expr(&body, &b2, out);
            }
        }
        Expr::If(i) => {
            if let Some(e) = i.condition() {
                free_vars_of_expr(&e, bound, out);
            }
            if let Some(e) = i.then_branch() {
                free_vars_of_expr(&e, bound, out);
            }
            if let Some(e) = i.else_branch() {
                free_vars_of_expr(&e, bound, out);
            }
        }
        Expr::Case(c) => {
            if let Some(s) = c.scrutinee() {
                free_vars_of_expr(&s, bound, out);
            }
            for arm in c.arms() {
                let mut b2 = bound.clone();
                if let Some(p) = arm.pattern() {
                    pattern_vars(&p, &mut b2);
                }
                if let Some(w) = arm.where_clause() {
                    for d in w.decls() {
                        b2.extend(defined_names(&d));
                    }
                    for d in w.decls() {
                        out.extend(free_vars_of_decl_with_bound(&d, &b2));
                    }
                }
                if let Some(rhs) = arm.rhs() {
                    free_vars_of_rhs(&rhs, &b2, out);
                }
            }
        }
        Expr::Do(d) => {
            let mut b2 = bound.clone();
            for stmt in d.statements() {
                match stmt {
                    Stmt::Bind(bs) => {
                        if let Some(src) = bs.source() {
                            free_vars_of_expr(&src, &b2, out);
                        }
                        if let Some(pe) = bs.pattern_expr() {
                            bound_vars_of_expr_as_pattern(&pe, &mut b2);
                        }
                    }
                    Stmt::Let(ls) => {
                        let decls: Vec<Decl> = ls.decls().collect();
                        for dd in &decls {
                            b2.extend(defined_names(dd));
                        }
                        for dd in &decls {
                            out.extend(free_vars_of_decl_with_bound(dd, &b2));
                        }
                    }
                    Stmt::Expr(es) => {
                        if let Some(e) = es.expr() {
                            free_vars_of_expr(&e, &b2, out);
                        }
                    }
                }
            }
        }
        Expr::List(l) => {
            for e in l.elements() {
                free_vars_of_expr(&e, bound, out);
            }
        }
        Expr::Tuple(t) => {
            for e in t.elements() {
                free_vars_of_expr(&e, bound, out);
            }
        }
        Expr::Paren(p) => {
            if let Some(e) = p.inner() {
                free_vars_of_expr(&e, bound, out);
            }
        }
        Expr::ListComp(lc) => {
            let mut b2 = bound.clone();
            for q in lc.qualifiers() {
                match q {
                    Qualifier::Generator(g) => {
                        if let Some(src) = g.source() {
                            free_vars_of_expr(&src, &b2, out);
                        }
                        if let Some(pe) = g.pattern_expr() {
                            bound_vars_of_expr_as_pattern(&pe, &mut b2);
                        }
                    }
                    Qualifier::Filter(f) => {
                        if let Some(e) = f.expr() {
                            free_vars_of_expr(&e, &b2, out);
                        }
                    }
                    Qualifier::Let(lq) => {
                        let decls: Vec<Decl> = lq.decls().collect();
                        for dd in &decls {
                            b2.extend(defined_names(dd));
                        }
                        for dd in &decls {
                            out.extend(free_vars_of_decl_with_bound(dd, &b2));
                        }
                    }
                }
            }
            if let Some(r) = lc.result() {
                free_vars_of_expr(&r, &b2, out);
            }
        }
        Expr::EnumFrom(e) => {
            if let Some(x) = e.from() {
                free_vars_of_expr(&x, bound, out);
            }
        }
        Expr::EnumFromTo(e) => {
            if let Some(x) = e.from() {
                free_vars_of_expr(&x, bound, out);
            }
            if let Some(x) = e.to() {
                free_vars_of_expr(&x, bound, out);
            }
        }
        Expr::EnumFromThen(e) => {
            if let Some(x) = e.from() {
                free_vars_of_expr(&x, bound, out);
            }
            if let Some(x) = e.then() {
                free_vars_of_expr(&x, bound, out);
            }
        }
        Expr::EnumFromThenTo(e) => {
            if let Some(x) = e.from() {
                free_vars_of_expr(&x, bound, out);
            }
            if let Some(x) = e.then() {
                free_vars_of_expr(&x, bound, out);
            }
            if let Some(x) = e.to() {
                free_vars_of_expr(&x, bound, out);
            }
        }
        Expr::SectionLeft(s) => {
            if let Some(e) = s.operand() {
                free_vars_of_expr(&e, bound, out);
            }
            for op in s.operator() {
                if !op.starts_with(':') && !bound.contains(&op) {
                    out.insert(op);
                }
            }
        }
        Expr::SectionRight(s) => {
            if let Some(e) = s.operand() {
                free_vars_of_expr(&e, bound, out);
            }
            for op in s.operator() {
                if !op.starts_with(':') && !bound.contains(&op) {
                    out.insert(op);
                }
            }
        }
        Expr::Typed(t) => {
            if let Some(e) = t.expr() {
                free_vars_of_expr(&e, bound, out);
            }
        }
        Expr::RecordCon(r) => {
            for field in r.fields() {
                if let Some(v) = field.value() {
                    free_vars_of_expr(&v, bound, out);
                }
            }
        }
        Expr::RecordUpdate(r) => {
            if let Some(b) = r.base() {
                free_vars_of_expr(&b, bound, out);
            }
            for field in r.fields() {
                if let Some(v) = field.value() {
                    free_vars_of_expr(&v, bound, out);
                }
            }
        }
    }
}
