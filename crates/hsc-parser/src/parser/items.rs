//! Module header, imports, and top-level/local declarations (§4.1).

use crate::parser::expressions::{block, block_items, rhs};
use crate::parser::{patterns, types};
use crate::syntax_kind::SyntaxKind;
use crate::parser::Parser;

/// `module ::= [ module modid exports? where ] body`
///
/// The layout pass always opens an implicit block at the very start of the
/// file (§2), independent of whether a header is present. A `where` that
/// follows a header reopens a *second*, nested implicit block for the
/// declarations themselves, so a file with a header has two brace levels
/// and a file without one has only the outer level.
pub(crate) fn parse_module(p: &mut Parser) {
    let outer_explicit = p.at(SyntaxKind::L_BRACE);
    if outer_explicit {
        p.advance();
    } else {
        p.expect(SyntaxKind::VL_BRACE);
    }

    if p.at(SyntaxKind::MODULE_KW) {
        let m = p.open();
        p.advance();
        modid(p);
        if p.at(SyntaxKind::L_PAREN) {
            export_list(p);
        }
        p.expect(SyntaxKind::WHERE_KW);
        p.close(m, SyntaxKind::MODULE_HEADER);
        block(p, top_decl);
    } else {
        block_items(p, top_decl);
    }

    if outer_explicit {
        p.expect(SyntaxKind::R_BRACE);
    } else {
        p.expect(SyntaxKind::VR_BRACE);
    }
}

/// `modid ::= conid ('.' conid)*` -- the lexer emits a qualified name like
/// `Data.Map` as separate `ConId`/`VarSym(".")`/`ConId` tokens (qualification
/// is left to the parser), so this merges the dotted run into one node.
fn modid(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::CON_ID);
    while p.current() == SyntaxKind::VAR_SYM
        && p.current_text() == "."
        && p.nth(1) == SyntaxKind::CON_ID
    {
        p.advance(); // .
        p.advance(); // CON_ID
    }
    p.close(m, SyntaxKind::MODULE_NAME);
}

fn export_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    if !p.at(SyntaxKind::R_PAREN) {
        export_item(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_PAREN) {
                break;
            }
            export_item(p);
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::EXPORT_LIST);
}

fn export_item(p: &mut Parser) {
    let m = p.open();
    p.expect_one_of(&[SyntaxKind::VAR_ID, SyntaxKind::CON_ID]);
    if p.eat(SyntaxKind::L_PAREN) {
        if p.current_text() == ".." {
            p.advance();
        } else if !p.at(SyntaxKind::R_PAREN) {
            p.expect_one_of(&[SyntaxKind::VAR_ID, SyntaxKind::CON_ID]);
            while p.eat(SyntaxKind::COMMA) {
                p.expect_one_of(&[SyntaxKind::VAR_ID, SyntaxKind::CON_ID]);
            }
        }
        p.expect(SyntaxKind::R_PAREN);
    }
    p.close(m, SyntaxKind::EXPORT_ITEM);
}

fn top_decl(p: &mut Parser) {
    match p.current() {
        SyntaxKind::IMPORT_KW => import_decl(p),
        SyntaxKind::TYPE_KW if p.nth(1) == SyntaxKind::FAMILY_KW => type_family_decl(p),
        SyntaxKind::TYPE_KW => type_syn_decl(p),
        SyntaxKind::DATA_KW => data_decl(p),
        SyntaxKind::NEWTYPE_KW => newtype_decl(p),
        SyntaxKind::CLASS_KW => class_decl(p),
        SyntaxKind::INSTANCE_KW => instance_decl(p),
        SyntaxKind::INFIXL_KW | SyntaxKind::INFIXR_KW | SyntaxKind::INFIX_KW => fixity_decl(p),
        SyntaxKind::DEFAULT_KW => default_decl(p),
        SyntaxKind::FOREIGN_KW => foreign_import_decl(p),
        _ => local_decl(p),
    }
}

fn import_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // import
    p.eat(SyntaxKind::QUALIFIED_KW);
    modid(p);
    if p.at(SyntaxKind::AS_KW) {
        p.advance();
        modid(p);
    }
    p.eat(SyntaxKind::HIDING_KW);
    if p.at(SyntaxKind::L_PAREN) {
        import_list(p);
    }
    p.close(m, SyntaxKind::IMPORT_DECL);
}

fn import_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    if !p.at(SyntaxKind::R_PAREN) {
        import_item(p);
        while p.eat(SyntaxKind::COMMA) {
            if p.at(SyntaxKind::R_PAREN) {
                break;
            }
            import_item(p);
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::IMPORT_LIST);
}

fn import_item(p: &mut Parser) {
    let m = p.open();
    p.expect_one_of(&[SyntaxKind::VAR_ID, SyntaxKind::CON_ID]);
    if p.eat(SyntaxKind::L_PAREN) {
        if !p.at(SyntaxKind::R_PAREN) {
            p.expect_one_of(&[SyntaxKind::VAR_ID, SyntaxKind::CON_ID]);
            while p.eat(SyntaxKind::COMMA) {
                p.expect_one_of(&[SyntaxKind::VAR_ID, SyntaxKind::CON_ID]);
            }
        }
        p.expect(SyntaxKind::R_PAREN);
    }
    p.close(m, SyntaxKind::IMPORT_ITEM);
}

fn type_syn_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // type
    p.expect(SyntaxKind::CON_ID);
    tyvar_list(p);
    p.expect(SyntaxKind::EQUALS);
    types::ty(p);
    p.close(m, SyntaxKind::TYPE_SYN_DECL);
}

/// Type families parse (§9 Open Question 2) but are not elaborated beyond
/// their header -- `hsc-kinds`/`hsc-typeck` reject programs that reduce
/// them.
fn type_family_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // type
    p.advance(); // family
    p.expect(SyntaxKind::CON_ID);
    tyvar_list(p);
    if p.eat(SyntaxKind::DOUBLE_COLON) {
        types::kind(p);
    }
    p.close(m, SyntaxKind::TYPE_SYN_DECL);
}

fn tyvar_list(p: &mut Parser) {
    let m = p.open();
    while p.at(SyntaxKind::VAR_ID) {
        let v = p.open();
        p.advance();
        if p.eat(SyntaxKind::DOUBLE_COLON) {
            types::kind(p);
            p.close(v, SyntaxKind::TYPE_OF_KIND);
        } else {
            p.close(v, SyntaxKind::TYPE_VAR);
        }
    }
    p.close(m, SyntaxKind::TYPE_VAR_LIST);
}

fn data_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // data
    p.expect(SyntaxKind::CON_ID);
    tyvar_list(p);
    if p.eat(SyntaxKind::EQUALS) {
        con_decls(p);
    }
    if p.at(SyntaxKind::DERIVING_KW) {
        deriving_clause(p);
    }
    p.close(m, SyntaxKind::DATA_DECL);
}

fn newtype_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // newtype
    p.expect(SyntaxKind::CON_ID);
    tyvar_list(p);
    p.expect(SyntaxKind::EQUALS);
    con_decls(p);
    if p.at(SyntaxKind::DERIVING_KW) {
        deriving_clause(p);
    }
    p.close(m, SyntaxKind::NEWTYPE_DECL);
}

fn con_decls(p: &mut Parser) {
    let m = p.open();
    con_decl(p);
    while p.eat(SyntaxKind::PIPE) {
        con_decl(p);
    }
    p.close(m, SyntaxKind::CON_DECL_LIST);
}

/// A single constructor alternative: plain (`Con t1 t2`), record
/// (`Con { f1 :: t1, f2 :: t2 }`), or a GADT-style signature alternative
/// (`Con :: t1 -> t2 -> T a`, parsed but only fully elaborated for the
/// non-GADT fragment per §9 Open Question 2).
fn con_decl(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::CON_ID);
    if p.eat(SyntaxKind::DOUBLE_COLON) {
        types::ty(p);
    } else if p.at(SyntaxKind::L_BRACE) {
        field_decls(p);
    } else {
        while at_atype_for_con(p) {
            btype_arg(p);
        }
    }
    p.close(m, SyntaxKind::CON_DECL);
}

fn at_atype_for_con(p: &mut Parser) -> bool {
    matches!(
        p.current(),
        SyntaxKind::VAR_ID | SyntaxKind::CON_ID | SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET
    ) && p.current() != SyntaxKind::PIPE
}

fn btype_arg(p: &mut Parser) {
    // Constructor fields may be `!strict` or plain `atype`s.
    let m = p.open();
    if p.current() == SyntaxKind::VAR_SYM && p.current_text() == "!" {
        p.advance();
        types::ty(p);
        p.close(m, SyntaxKind::STRICT_TYPE);
    } else {
        types::ty(p);
        p.close(m, SyntaxKind::LAZY_TYPE);
    }
}

fn field_decls(p: &mut Parser) {
    let m = p.open();
    p.advance(); // {
    if !p.at(SyntaxKind::R_BRACE) {
        field_decl(p);
        while p.eat(SyntaxKind::COMMA) {
            field_decl(p);
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.close(m, SyntaxKind::FIELD_DECL_LIST);
}

fn field_decl(p: &mut Parser) {
    let m = p.open();
    p.expect(SyntaxKind::VAR_ID);
    while p.eat(SyntaxKind::COMMA) {
        p.expect(SyntaxKind::VAR_ID);
    }
    p.expect(SyntaxKind::DOUBLE_COLON);
    if p.current() == SyntaxKind::VAR_SYM && p.current_text() == "!" {
        p.advance();
        types::ty(p);
    } else {
        types::ty(p);
    }
    p.close(m, SyntaxKind::FIELD_DECL);
}

fn deriving_clause(p: &mut Parser) {
    let m = p.open();
    p.advance(); // deriving
    if p.eat(SyntaxKind::L_PAREN) {
        if !p.at(SyntaxKind::R_PAREN) {
            p.expect(SyntaxKind::CON_ID);
            while p.eat(SyntaxKind::COMMA) {
                p.expect(SyntaxKind::CON_ID);
            }
        }
        p.expect(SyntaxKind::R_PAREN);
    } else {
        p.expect(SyntaxKind::CON_ID);
    }
    p.close(m, SyntaxKind::DERIVING_CLAUSE);
}

fn class_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // class
    maybe_superclass_context(p);
    p.expect(SyntaxKind::CON_ID);
    tyvar_list(p);
    if p.at(SyntaxKind::WHERE_KW) {
        where_clause(p);
    }
    p.close(m, SyntaxKind::CLASS_DECL);
}

fn maybe_superclass_context(p: &mut Parser) {
    let mut n = 0usize;
    let mut depth = 0i32;
    loop {
        match p.nth(n) {
            SyntaxKind::L_PAREN => depth += 1,
            SyntaxKind::R_PAREN => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            SyntaxKind::FAT_ARROW if depth == 0 => {
                types::parse_context(p);
                p.expect(SyntaxKind::FAT_ARROW);
                return;
            }
            SyntaxKind::WHERE_KW | SyntaxKind::V_SEMI | SyntaxKind::VR_BRACE | SyntaxKind::EOF
                if depth == 0 =>
            {
                break
            }
            _ => {}
        }
        n += 1;
        if n > 4096 {
            break;
        }
    }
}

fn instance_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // instance
    maybe_superclass_context(p);
    p.expect(SyntaxKind::CON_ID);
    while at_instance_head_arg(p) {
        types::ty(p);
    }
    if p.at(SyntaxKind::WHERE_KW) {
        where_clause(p);
    }
    p.close(m, SyntaxKind::INSTANCE_DECL);
}

fn at_instance_head_arg(p: &mut Parser) -> bool {
    matches!(
        p.current(),
        SyntaxKind::VAR_ID | SyntaxKind::CON_ID | SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET
    )
}

fn fixity_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // infixl/infixr/infix
    if p.at(SyntaxKind::INT_LITERAL) {
        p.advance();
    }
    op_name(p);
    while p.eat(SyntaxKind::COMMA) {
        op_name(p);
    }
    p.close(m, SyntaxKind::FIXITY_DECL);
}

fn op_name(p: &mut Parser) {
    if p.eat(SyntaxKind::BACKTICK) {
        p.expect_one_of(&[SyntaxKind::VAR_ID, SyntaxKind::CON_ID]);
        p.expect(SyntaxKind::BACKTICK);
    } else {
        p.expect_one_of(&[SyntaxKind::VAR_SYM, SyntaxKind::CON_SYM]);
    }
}

fn default_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // default
    p.expect(SyntaxKind::L_PAREN);
    if !p.at(SyntaxKind::R_PAREN) {
        types::ty(p);
        while p.eat(SyntaxKind::COMMA) {
            types::ty(p);
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    p.close(m, SyntaxKind::DEFAULT_DECL);
}

fn foreign_import_decl(p: &mut Parser) {
    let m = p.open();
    p.advance(); // foreign
    p.expect(SyntaxKind::IMPORT_KW);
    // calling convention / entity string, both optional/implementation-
    // defined lexically; accept any run of var/con ids and a string
    // literal before the binder.
    while matches!(p.current(), SyntaxKind::VAR_ID | SyntaxKind::STRING_LITERAL)
        && p.nth(1) != SyntaxKind::DOUBLE_COLON
    {
        p.advance();
    }
    p.expect(SyntaxKind::VAR_ID);
    p.expect(SyntaxKind::DOUBLE_COLON);
    types::ty(p);
    p.close(m, SyntaxKind::FOREIGN_IMPORT_DECL);
}

/// A local declaration: anything legal inside `let`/`where` -- signatures
/// and equations, no type/class/instance/import headers (§4.3 operates
/// only over this value-declaration subset).
pub(crate) fn local_decl(p: &mut Parser) {
    if looks_like_signature(p) {
        type_sig_decl(p);
        return;
    }
    equation(p);
}

/// `var (, var)* :: type` -- lookahead to distinguish a signature from a
/// pattern/function binding, both of which can start with a `VAR_ID`.
fn looks_like_signature(p: &mut Parser) -> bool {
    if !p.at(SyntaxKind::VAR_ID) && !p.at(SyntaxKind::L_PAREN) {
        return false;
    }
    let mut n = 0usize;
    loop {
        match p.nth(n) {
            SyntaxKind::VAR_ID | SyntaxKind::COMMA => {}
            SyntaxKind::DOUBLE_COLON => return true,
            _ => return false,
        }
        n += 1;
        if n > 64 {
            return false;
        }
    }
}

fn type_sig_decl(p: &mut Parser) {
    let m = p.open();
    var_name(p);
    while p.eat(SyntaxKind::COMMA) {
        var_name(p);
    }
    p.expect(SyntaxKind::DOUBLE_COLON);
    types::ty(p);
    p.close(m, SyntaxKind::TYPE_SIG_DECL);
}

fn var_name(p: &mut Parser) {
    let m = p.open();
    if p.eat(SyntaxKind::L_PAREN) {
        p.expect(SyntaxKind::VAR_SYM);
        p.expect(SyntaxKind::R_PAREN);
    } else {
        p.expect(SyntaxKind::VAR_ID);
    }
    p.close(m, SyntaxKind::NAME);
}

/// One clause of a function/pattern binding: `lhs rhs [where ...]`.
/// Multiple clauses of the same function are left as separate `FUN_BIND`
/// siblings; `hsc-rename` groups them by name before type checking.
fn equation(p: &mut Parser) {
    let m = p.open();
    let is_fun = parse_lhs(p);
    rhs(p, SyntaxKind::EQUALS);
    if p.at(SyntaxKind::WHERE_KW) {
        where_clause(p);
    }
    p.close(m, if is_fun { SyntaxKind::FUN_BIND } else { SyntaxKind::PAT_BIND });
}

/// Parses the equation head and returns whether it is a function binding
/// (named, with a `NAME` + `PARAM_LIST`) or a pattern binding (headed by an
/// arbitrary pattern). A bare `var` head is always a function binding, with
/// zero or more parameters -- `x = 5` is `FUN_BIND` with an empty
/// `PARAM_LIST`, matching how `FunBind`'s typed AST exposes a `name()`
/// rather than a `pattern()`.
fn parse_lhs(p: &mut Parser) -> bool {
    if p.at(SyntaxKind::VAR_ID) {
        let name = p.open();
        p.advance();
        p.close(name, SyntaxKind::NAME);
        parse_params(p);
        return true;
    }
    if p.at(SyntaxKind::L_PAREN) && p.nth(1) == SyntaxKind::VAR_SYM && p.nth(2) == SyntaxKind::R_PAREN {
        // `var -> varid | ( varsym )` -- a parenthesized operator symbol
        // used as an ordinary prefix function name, e.g. `(==) x y = ...`.
        let name = p.open();
        p.advance(); // (
        p.advance(); // varsym
        p.advance(); // )
        p.close(name, SyntaxKind::NAME);
        parse_params(p);
        return true;
    }
    // A general pattern, e.g. `(x, y)`, `Just x`, or the left operand of an
    // infix operator definition. `patterns::pat` consumes matching parens
    // itself (tuples, grouping, `x:xs`), so no paren-stripping is needed
    // here.
    patterns::pat(p);
    if is_varop(p) {
        // `pat varop pat = ...` -- an infix operator definition, e.g.
        // `a +++ b = ...` or `` x `elem` xs = ... ``.
        let name = p.open();
        varop(p);
        p.close(name, SyntaxKind::NAME);
        patterns::pat(p);
        return true;
    }
    false
}

fn is_varop(p: &mut Parser) -> bool {
    p.at(SyntaxKind::VAR_SYM) || p.at(SyntaxKind::BACKTICK)
}

fn varop(p: &mut Parser) {
    if p.eat(SyntaxKind::BACKTICK) {
        p.expect(SyntaxKind::VAR_ID);
        p.expect(SyntaxKind::BACKTICK);
    } else {
        p.expect(SyntaxKind::VAR_SYM);
    }
}

fn parse_params(p: &mut Parser) {
    let params = p.open();
    while at_apat_start(p) {
        patterns::apat(p);
    }
    p.close(params, SyntaxKind::PARAM_LIST);
}

fn at_apat_start(p: &mut Parser) -> bool {
    matches!(
        p.current(),
        SyntaxKind::VAR_ID
            | SyntaxKind::CON_ID
            | SyntaxKind::UNDERSCORE
            | SyntaxKind::INT_LITERAL
            | SyntaxKind::FLOAT_LITERAL
            | SyntaxKind::CHAR_LITERAL
            | SyntaxKind::STRING_LITERAL
            | SyntaxKind::L_PAREN
            | SyntaxKind::L_BRACKET
            | SyntaxKind::TILDE
    )
}

pub(crate) fn where_clause(p: &mut Parser) {
    let m = p.open();
    p.advance(); // where
    block(p, local_decl);
    p.close(m, SyntaxKind::WHERE_CLAUSE);
}
