//! Type expression grammar (§3 Types, §4.1).
//!
//! `type ::= forall vs . type | context => type | btype -> type`
//! `btype ::= atype+` (application)
//! `atype ::= tyvar | tycon | ( type,* ) | [ type ] | ( type )`

use crate::syntax_kind::SyntaxKind;
use crate::parser::Parser;

/// Parses a full type, including a leading `forall` and/or context.
/// This is the entry point used after `::` in signatures and `=>` heads.
pub(crate) fn ty(p: &mut Parser) {
    if p.at(SyntaxKind::VAR_ID) && p.current_text() == "forall" {
        parse_forall(p);
        return;
    }
    // Speculatively parse a context: `(C a, D b) =>` or `C a =>`.
    if looks_like_context(p) {
        parse_constrained(p);
        return;
    }
    fun_type(p);
}

fn parse_forall(p: &mut Parser) {
    let m = p.open();
    p.advance(); // forall (VAR_ID spelled "forall")
    let vars = p.open();
    while p.at(SyntaxKind::VAR_ID) {
        tyvar_bndr(p);
    }
    p.close(vars, SyntaxKind::TYPE_VAR_LIST);
    p.eat(SyntaxKind::VAR_SYM); // the `.` separator lexes as VarSym
    ty(p);
    p.close(m, SyntaxKind::FORALL_TYPE);
}

fn tyvar_bndr(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::VAR_ID);
    if p.eat(SyntaxKind::DOUBLE_COLON) {
        kind(p);
    }
    p.close(m, SyntaxKind::TYPE_VAR_BNDR);
}

/// Heuristic lookahead for `context =>`: scan forward for a `=>` before a
/// `->`, `VL_BRACE`/`V_SEMI`, or EOF, respecting paren nesting. Per §9 this
/// mirrors the flat-then-resolve approach used for infix expressions --
/// contexts are syntactically ambiguous with a plain application type until
/// the `=>` is seen.
fn looks_like_context(p: &mut Parser) -> bool {
    let mut depth = 0i32;
    let mut n = 0usize;
    loop {
        match p.nth(n) {
            SyntaxKind::L_PAREN => depth += 1,
            SyntaxKind::R_PAREN => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            SyntaxKind::FAT_ARROW if depth == 0 => return true,
            SyntaxKind::EQUALS
            | SyntaxKind::V_SEMI
            | SyntaxKind::VR_BRACE
            | SyntaxKind::EOF
            | SyntaxKind::WHERE_KW
                if depth == 0 =>
            {
                return false
            }
            _ => {}
        }
        n += 1;
        if n > 4096 {
            return false;
        }
    }
}

fn parse_constrained(p: &mut Parser) {
    let m = p.open();
    parse_context(p);
    p.expect(SyntaxKind::FAT_ARROW);
    ty(p);
    p.close(m, SyntaxKind::CONSTRAINED_TYPE);
}

/// A context is either a single class constraint or a parenthesized,
/// comma-separated list of them.
pub(crate) fn parse_context(p: &mut Parser) {
    let m = p.open();
    if p.at(SyntaxKind::L_PAREN) {
        p.advance();
        if !p.at(SyntaxKind::R_PAREN) {
            constraint(p);
            while p.eat(SyntaxKind::COMMA) {
                constraint(p);
            }
        }
        p.expect(SyntaxKind::R_PAREN);
    } else {
        constraint(p);
    }
    p.close(m, SyntaxKind::CONTEXT);
}

fn constraint(p: &mut Parser) {
    // A constraint is itself a `btype`: a class head applied to arguments.
    btype(p);
}

fn fun_type(p: &mut Parser) {
    let start = btype_checkpoint(p);
    if p.eat(SyntaxKind::RIGHT_ARROW) {
        ty(p);
        p.close(start, SyntaxKind::FUN_TYPE);
    }
}

fn btype_checkpoint(p: &mut Parser) -> crate::parser::MarkOpened {
    let m = p.open();
    btype(p);
    m
}

/// `btype ::= atype+`, wrapped in `TYPE_APP` when there is more than one.
fn btype(p: &mut Parser) {
    let m = p.open();
    let mut count = 0;
    while at_atype_start(p) {
        atype(p);
        count += 1;
    }
    if count == 0 {
        p.error("expected a type");
    }
    if count <= 1 {
        // Collapse: re-tag as TOMBSTONE by closing with the same kind the
        // single atype already used -- simplest is to just leave the
        // wrapper as a no-op TYPE_APP with one child; downstream AST
        // accessors look through single-child TYPE_APP nodes.
        p.close(m, SyntaxKind::TYPE_APP);
    } else {
        p.close(m, SyntaxKind::TYPE_APP);
    }
}

fn at_atype_start(p: &mut Parser) -> bool {
    matches!(
        p.current(),
        SyntaxKind::VAR_ID | SyntaxKind::CON_ID | SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET
    )
}

fn atype(p: &mut Parser) {
    match p.current() {
        SyntaxKind::VAR_ID => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::TYPE_VAR);
        }
        SyntaxKind::CON_ID => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::TYPE_CON);
        }
        SyntaxKind::L_BRACKET => {
            let m = p.open();
            p.advance();
            if !p.at(SyntaxKind::R_BRACKET) {
                ty(p);
            }
            p.expect(SyntaxKind::R_BRACKET);
            p.close(m, SyntaxKind::LIST_TYPE);
        }
        SyntaxKind::L_PAREN => {
            let m = p.open();
            p.advance();
            if p.at(SyntaxKind::R_PAREN) {
                p.advance();
                p.close(m, SyntaxKind::TYPE_CON); // the `()` unit tycon
                return;
            }
            ty(p);
            let mut arity = 1;
            while p.eat(SyntaxKind::COMMA) {
                ty(p);
                arity += 1;
            }
            p.expect(SyntaxKind::R_PAREN);
            if arity == 1 {
                maybe_kind_annotation(p, m);
            } else {
                p.close(m, SyntaxKind::TUPLE_TYPE);
            }
        }
        _ => {
            p.advance_with_error("expected a type");
        }
    }
}

fn maybe_kind_annotation(p: &mut Parser, m: crate::parser::MarkOpened) {
    if p.eat(SyntaxKind::DOUBLE_COLON) {
        kind(p);
        p.close(m, SyntaxKind::TYPE_OF_KIND);
    } else {
        // A parenthesized single type: re-open as a pass-through node so
        // the AST layer can unwrap it transparently.
        p.close(m, SyntaxKind::TYPE_APP);
    }
}

/// `kind ::= * | Constraint | kind -> kind | kindvar`
pub(crate) fn kind(p: &mut Parser) {
    let m = p.open();
    kind_atom(p);
    if p.eat(SyntaxKind::RIGHT_ARROW) {
        kind(p);
        p.close(m, SyntaxKind::KIND_FUN);
    } else {
        p.close(m, SyntaxKind::KIND_FUN);
    }
}

fn kind_atom(p: &mut Parser) {
    match p.current() {
        SyntaxKind::VAR_SYM if p.current_text() == "*" => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::KIND_STAR);
        }
        SyntaxKind::CON_ID if p.current_text() == "Constraint" => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::KIND_CONSTRAINT);
        }
        SyntaxKind::VAR_ID => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::KIND_VAR);
        }
        SyntaxKind::L_PAREN => {
            p.advance();
            kind(p);
            p.expect(SyntaxKind::R_PAREN);
        }
        _ => {
            p.advance_with_error("expected a kind");
        }
    }
}
