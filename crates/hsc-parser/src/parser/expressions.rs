//! Expression grammar (§4.1, §4.4.5).
//!
//! Operator expressions are parsed into a flat `INFIX_EXPR` list rather
//! than a precedence-climbed tree (§4.1, §9 "Grammar conflicts"): fixity
//! isn't known until `hsc-rename` has collected the module's fixity
//! declarations, so the parser defers associativity entirely.

use crate::parser::{items, patterns, types};
use crate::syntax_kind::SyntaxKind;
use crate::parser::Parser;

/// Consumes a `VL_BRACE ... VR_BRACE` block, calling `item` once per
/// element and eating `V_SEMI`/`SEMI` separators between them. Used for
/// `do`/`let`/`where`/`of` bodies, all of which the lexer's layout pass
/// opens with a virtual or explicit brace.
pub(crate) fn block(p: &mut Parser, item: impl FnMut(&mut Parser)) {
    let explicit = p.at(SyntaxKind::L_BRACE);
    if explicit {
        p.advance();
    } else {
        p.expect(SyntaxKind::VL_BRACE);
    }
    block_items(p, item);
    if explicit {
        p.expect(SyntaxKind::R_BRACE);
    } else {
        p.expect(SyntaxKind::VR_BRACE);
    }
}

/// The separator-aware item loop shared by [`block`] and, for the
/// top-level module body, `items::parse_module` -- the latter needs it
/// without the matching brace pair, since the outer layout block always
/// opens once at the very start of the file (§2), independent of whether
/// a `module ... where` header reopens its own nested one.
pub(crate) fn block_items(p: &mut Parser, mut item: impl FnMut(&mut Parser)) {
    p.eat_separators();
    while !p.at_end_of_block() {
        item(p);
        if p.at_end_of_block() {
            break;
        }
        if !p.eat(SyntaxKind::V_SEMI) && !p.eat(SyntaxKind::SEMI) {
            break;
        }
        p.eat_separators();
    }
}

/// Top-level entry point: an expression optionally annotated with `:: type`
/// (§4.4.5, "Typed expression `e :: sigma`").
pub(crate) fn expr(p: &mut Parser) {
    let lhs = opexp(p);
    if p.at(SyntaxKind::DOUBLE_COLON) {
        let m = p.open_before(lhs);
        p.advance();
        types::ty(p);
        p.close(m, SyntaxKind::TYPED_EXPR);
    }
}

fn is_op_token(p: &mut Parser) -> bool {
    matches!(
        p.current(),
        SyntaxKind::VAR_SYM | SyntaxKind::CON_SYM | SyntaxKind::BACKTICK
    )
}

fn eat_op(p: &mut Parser) {
    if p.eat(SyntaxKind::BACKTICK) {
        if !p.eat(SyntaxKind::VAR_ID) {
            p.expect(SyntaxKind::CON_ID);
        }
        p.expect(SyntaxKind::BACKTICK);
    } else if !p.eat(SyntaxKind::VAR_SYM) {
        p.expect(SyntaxKind::CON_SYM);
    }
}

/// A flat operator expression: `appexp (op appexp)*`, collapsed to
/// `INFIX_EXPR` only when at least one operator is present. A leading `-`
/// is unary negation (`NEG_EXPR`), the one precedence fact Haskell's
/// grammar itself fixes rather than deferring to fixity resolution.
fn opexp(p: &mut Parser) -> crate::parser::MarkClosed {
    let start;
    if p.current() == SyntaxKind::VAR_SYM && p.current_text() == "-" {
        let m = p.open();
        p.advance();
        appexp(p);
        start = p.close(m, SyntaxKind::NEG_EXPR);
    } else {
        start = appexp(p);
    }
    if !is_op_token(p) {
        return start;
    }
    let m = p.open_before(start);
    while is_op_token(p) {
        eat_op(p);
        if p.current() == SyntaxKind::VAR_SYM && p.current_text() == "-" {
            let neg = p.open();
            p.advance();
            appexp(p);
            p.close(neg, SyntaxKind::NEG_EXPR);
        } else {
            appexp(p);
        }
    }
    p.close(m, SyntaxKind::INFIX_EXPR)
}

/// `fexp ::= aexp+`, collapsed to `APP_EXPR` only when more than one atom
/// is seen.
fn appexp(p: &mut Parser) -> crate::parser::MarkClosed {
    let head = aexp(p);
    if !at_aexp_start(p) {
        return head;
    }
    let m = p.open_before(head);
    while at_aexp_start(p) {
        aexp(p);
    }
    p.close(m, SyntaxKind::APP_EXPR)
}

fn at_aexp_start(p: &mut Parser) -> bool {
    matches!(
        p.current(),
        SyntaxKind::VAR_ID
            | SyntaxKind::CON_ID
            | SyntaxKind::INT_LITERAL
            | SyntaxKind::FLOAT_LITERAL
            | SyntaxKind::CHAR_LITERAL
            | SyntaxKind::STRING_LITERAL
            | SyntaxKind::L_PAREN
            | SyntaxKind::L_BRACKET
            | SyntaxKind::BACKSLASH
            | SyntaxKind::LET_KW
            | SyntaxKind::IF_KW
            | SyntaxKind::CASE_KW
            | SyntaxKind::DO_KW
            | SyntaxKind::UNDERSCORE
    )
}

fn aexp(p: &mut Parser) -> crate::parser::MarkClosed {
    match p.current() {
        SyntaxKind::VAR_ID => {
            let m = p.open();
            p.advance();
            let closed = p.close(m, SyntaxKind::VAR_EXPR);
            maybe_record_con(p, closed)
        }
        SyntaxKind::CON_ID => {
            let m = p.open();
            p.advance();
            let closed = p.close(m, SyntaxKind::CON_EXPR);
            maybe_record_con(p, closed)
        }
        SyntaxKind::INT_LITERAL
        | SyntaxKind::FLOAT_LITERAL
        | SyntaxKind::CHAR_LITERAL
        | SyntaxKind::STRING_LITERAL => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::LIT_EXPR)
        }
        SyntaxKind::UNDERSCORE => {
            // A typed-hole placeholder; treated as an ordinary variable
            // occurrence by the rest of the pipeline.
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::VAR_EXPR)
        }
        SyntaxKind::BACKSLASH => lambda(p),
        SyntaxKind::LET_KW => let_expr(p),
        SyntaxKind::IF_KW => if_expr(p),
        SyntaxKind::CASE_KW => case_expr(p),
        SyntaxKind::DO_KW => do_expr(p),
        SyntaxKind::L_BRACKET => bracket_expr(p),
        SyntaxKind::L_PAREN => paren_expr(p),
        _ => {
            p.advance_with_error("expected an expression");
            let m = p.open();
            p.close(m, SyntaxKind::ERROR_NODE)
        }
    }
}

/// Record construction/update: `Con { field = e, ... }` or `e { field = e }`.
fn maybe_record_con(p: &mut Parser, base: crate::parser::MarkClosed) -> crate::parser::MarkClosed {
    if !p.at(SyntaxKind::L_BRACE) {
        return base;
    }
    let m = p.open_before(base);
    p.advance(); // {
    let fields = p.open();
    if !p.at(SyntaxKind::R_BRACE) {
        field_bind(p);
        while p.eat(SyntaxKind::COMMA) {
            field_bind(p);
        }
    }
    p.close(fields, SyntaxKind::FIELD_BIND_LIST);
    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::RECORD_CON_EXPR)
}

fn field_bind(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::VAR_ID);
    p.expect(SyntaxKind::EQUALS);
    expr(p);
    p.close(m, SyntaxKind::FIELD_BIND);
}

fn lambda(p: &mut Parser) -> crate::parser::MarkClosed {
    let m = p.open();
    p.advance(); // backslash
    let params = p.open();
    while !p.at(SyntaxKind::RIGHT_ARROW) && !p.at_end_of_block() {
        patterns::apat(p);
    }
    p.close(params, SyntaxKind::PARAM_LIST);
    p.expect(SyntaxKind::RIGHT_ARROW);
    expr(p);
    p.close(m, SyntaxKind::LAMBDA_EXPR)
}

fn let_expr(p: &mut Parser) -> crate::parser::MarkClosed {
    let m = p.open();
    p.advance(); // let
    block(p, items::local_decl);
    p.expect(SyntaxKind::IN_KW);
    expr(p);
    p.close(m, SyntaxKind::LET_EXPR)
}

fn if_expr(p: &mut Parser) -> crate::parser::MarkClosed {
    let m = p.open();
    p.advance(); // if
    expr(p);
    p.eat_separators();
    p.expect(SyntaxKind::THEN_KW);
    expr(p);
    p.eat_separators();
    p.expect(SyntaxKind::ELSE_KW);
    expr(p);
    p.close(m, SyntaxKind::IF_EXPR)
}

fn case_expr(p: &mut Parser) -> crate::parser::MarkClosed {
    let m = p.open();
    p.advance(); // case
    expr(p);
    p.expect(SyntaxKind::OF_KW);
    block(p, case_alt);
    p.close(m, SyntaxKind::CASE_EXPR)
}

fn case_alt(p: &mut Parser) {
    let m = p.open();
    patterns::pat(p);
    rhs(p, SyntaxKind::RIGHT_ARROW);
    if p.at(SyntaxKind::WHERE_KW) {
        items::where_clause(p);
    }
    p.close(m, SyntaxKind::MATCH_ARM);
}

fn do_expr(p: &mut Parser) -> crate::parser::MarkClosed {
    let m = p.open();
    p.advance(); // do
    let stmts = p.open();
    block(p, do_stmt);
    p.close(stmts, SyntaxKind::STMT_LIST);
    p.close(m, SyntaxKind::DO_EXPR)
}

fn do_stmt(p: &mut Parser) {
    if p.at(SyntaxKind::LET_KW) {
        let m = p.open();
        p.advance();
        block(p, items::local_decl);
        p.close(m, SyntaxKind::LET_STMT);
        return;
    }
    // `pat <- expr` vs a bare expression statement: parse the expression
    // first, then check for a following `<-` the way GHC's parser does
    // (patterns are a subset of expressions syntactically).
    let e = p.open();
    expr(p);
    if p.eat(SyntaxKind::LEFT_ARROW) {
        expr(p);
        p.close(e, SyntaxKind::BIND_STMT);
    } else {
        p.close(e, SyntaxKind::EXPR_STMT);
    }
}

fn bracket_expr(p: &mut Parser) -> crate::parser::MarkClosed {
    let m = p.open();
    p.advance(); // [
    if p.at(SyntaxKind::R_BRACKET) {
        p.advance();
        return p.close(m, SyntaxKind::LIST_EXPR);
    }
    expr(p);
    if p.eat(SyntaxKind::DOT_DOT) {
        if p.at(SyntaxKind::R_BRACKET) {
            p.expect(SyntaxKind::R_BRACKET);
            return p.close(m, SyntaxKind::ENUM_FROM_EXPR);
        }
        expr(p);
        p.expect(SyntaxKind::R_BRACKET);
        return p.close(m, SyntaxKind::ENUM_FROM_TO_EXPR);
    }
    if p.eat(SyntaxKind::PIPE) {
        qualifier(p);
        while p.eat(SyntaxKind::COMMA) {
            qualifier(p);
        }
        p.expect(SyntaxKind::R_BRACKET);
        return p.close(m, SyntaxKind::LIST_COMP_EXPR);
    }
    if p.eat(SyntaxKind::COMMA) {
        expr(p);
        if p.eat(SyntaxKind::DOT_DOT) {
            if p.at(SyntaxKind::R_BRACKET) {
                p.expect(SyntaxKind::R_BRACKET);
                return p.close(m, SyntaxKind::ENUM_FROM_THEN_EXPR);
            }
            expr(p);
            p.expect(SyntaxKind::R_BRACKET);
            return p.close(m, SyntaxKind::ENUM_FROM_THEN_TO_EXPR);
        }
        while p.eat(SyntaxKind::COMMA) {
            expr(p);
        }
        p.expect(SyntaxKind::R_BRACKET);
        return p.close(m, SyntaxKind::LIST_EXPR);
    }
    p.expect(SyntaxKind::R_BRACKET);
    p.close(m, SyntaxKind::LIST_EXPR)
}

fn qualifier(p: &mut Parser) {
    if p.at(SyntaxKind::LET_KW) {
        let m = p.open();
        p.advance();
        block(p, items::local_decl);
        p.close(m, SyntaxKind::LET_QUAL);
        return;
    }
    // Disambiguate a generator (`pat <- expr`) from a boolean filter the
    // same way `do`-statements do: parse an expression, then check `<-`.
    let m = p.open();
    expr(p);
    if p.eat(SyntaxKind::LEFT_ARROW) {
        expr(p);
        p.close(m, SyntaxKind::GENERATOR_QUAL);
    } else {
        p.close(m, SyntaxKind::FILTER_QUAL);
    }
}

/// `(expr)`, `(expr, expr,*)` tuple, or an operator section: `(expr op)` /
/// `(op expr)` / `(op)` bare operator.
fn paren_expr(p: &mut Parser) -> crate::parser::MarkClosed {
    let m = p.open();
    p.advance(); // (

    if p.at(SyntaxKind::R_PAREN) {
        p.advance();
        return p.close(m, SyntaxKind::CON_EXPR); // unit constructor `()`
    }

    // Right section: `(op expr)` / `(- expr)` is instead unary negation
    // handled by `opexp`, so a leading non-`-` operator here is a section.
    if is_op_token(p) && !(p.current() == SyntaxKind::VAR_SYM && p.current_text() == "-") {
        eat_op(p);
        opexp(p);
        p.expect(SyntaxKind::R_PAREN);
        return p.close(m, SyntaxKind::SECTION_RIGHT);
    }

    expr(p);

    if is_op_token(p) {
        // Could be `(e op)` left section or `(e op e')` a normal infix
        // expression continuing -- but `expr` above already consumed any
        // full operator expression via `opexp`, so remaining operator
        // tokens here mean the inner `expr` stopped at a bare atom because
        // what follows is `)`, i.e. a left section.
        eat_op(p);
        p.expect(SyntaxKind::R_PAREN);
        return p.close(m, SyntaxKind::SECTION_LEFT);
    }

    if p.eat(SyntaxKind::COMMA) {
        expr(p);
        while p.eat(SyntaxKind::COMMA) {
            expr(p);
        }
        p.expect(SyntaxKind::R_PAREN);
        return p.close(m, SyntaxKind::TUPLE_EXPR);
    }

    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::PAREN_EXPR)
}

/// `rhs ::= = exp | ( | guard = exp )+`, used for equation right-hand
/// sides (with `=`) and case alternatives (with `->`).
pub(crate) fn rhs(p: &mut Parser, arrow: SyntaxKind) {
    let m = p.open();
    if p.at(SyntaxKind::PIPE) {
        while p.eat(SyntaxKind::PIPE) {
            let g = p.open();
            guard(p);
            while p.eat(SyntaxKind::COMMA) {
                guard(p);
            }
            p.expect(arrow);
            expr(p);
            p.close(g, SyntaxKind::GUARDED_RHS);
        }
    } else {
        p.expect(arrow);
        expr(p);
    }
    p.close(m, SyntaxKind::RHS);
}

fn guard(p: &mut Parser) {
    if p.at(SyntaxKind::LET_KW) {
        let m = p.open();
        p.advance();
        block(p, items::local_decl);
        p.close(m, SyntaxKind::LET_GUARD);
        return;
    }
    let m = p.open();
    expr(p);
    if p.eat(SyntaxKind::LEFT_ARROW) {
        expr(p);
        p.close(m, SyntaxKind::PAT_GUARD);
    } else {
        p.close(m, SyntaxKind::BOOL_GUARD);
    }
}
