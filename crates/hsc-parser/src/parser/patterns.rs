//! Pattern grammar (§4.1, §4.4.4).
//!
//! `pat ::= apat | con apat+ | pat conop pat | pat :: type`
//! `apat ::= var | var@apat | con | literal | _ | ~apat | !apat | (pat) |
//!           (pat, pat,*) | [pat,*]`

use crate::syntax_kind::SyntaxKind;
use crate::parser::Parser;

pub(crate) fn pat(p: &mut Parser) {
    let lhs = apat_or_con_app(p);
    // Infix constructor pattern: `x : xs`, `a `Cons` b`.
    if is_pat_consym(p) {
        let m = p.open_before(lhs);
        consym(p);
        pat(p);
        p.close(m, SyntaxKind::INFIX_CON_PAT);
    }
}

fn is_pat_consym(p: &mut Parser) -> bool {
    matches!(p.current(), SyntaxKind::CON_SYM) || p.at(SyntaxKind::BACKTICK)
}

fn consym(p: &mut Parser) {
    if p.eat(SyntaxKind::BACKTICK) {
        p.expect(SyntaxKind::CON_ID);
        p.expect(SyntaxKind::BACKTICK);
    } else {
        p.expect(SyntaxKind::CON_SYM);
    }
}

/// A constructor application pattern (`Just x`) or a bare atomic pattern,
/// returning the completed mark so callers can wrap it (infix, `::`).
fn apat_or_con_app(p: &mut Parser) -> crate::parser::MarkClosed {
    if p.at(SyntaxKind::CON_ID) {
        let m = p.open();
        p.advance();
        let mut arity = 0;
        while at_apat_start(p) {
            apat(p);
            arity += 1;
        }
        return p.close(m, if arity == 0 { SyntaxKind::CON_PAT } else { SyntaxKind::CON_PAT });
    }
    apat_mark(p)
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
    ) || (p.current() == SyntaxKind::VAR_SYM && p.current_text() == "!")
}

fn apat_mark(p: &mut Parser) -> crate::parser::MarkClosed {
    match p.current() {
        SyntaxKind::VAR_ID => {
            let m = p.open();
            p.advance();
            if p.at(SyntaxKind::AT) {
                p.advance();
                apat(p);
                return p.close(m, SyntaxKind::AS_PAT);
            }
            p.close(m, SyntaxKind::VAR_PAT)
        }
        SyntaxKind::CON_ID => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::CON_PAT)
        }
        SyntaxKind::UNDERSCORE => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::WILDCARD_PAT)
        }
        SyntaxKind::INT_LITERAL
        | SyntaxKind::FLOAT_LITERAL
        | SyntaxKind::CHAR_LITERAL
        | SyntaxKind::STRING_LITERAL => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::LIT_PAT)
        }
        SyntaxKind::TILDE => {
            let m = p.open();
            p.advance();
            apat(p);
            p.close(m, SyntaxKind::LAZY_PAT)
        }
        SyntaxKind::VAR_SYM if p.current_text() == "!" => {
            let m = p.open();
            p.advance();
            apat(p);
            p.close(m, SyntaxKind::BANG_PAT)
        }
        SyntaxKind::L_BRACKET => {
            let m = p.open();
            p.advance();
            if !p.at(SyntaxKind::R_BRACKET) {
                pat(p);
                while p.eat(SyntaxKind::COMMA) {
                    pat(p);
                }
            }
            p.expect(SyntaxKind::R_BRACKET);
            p.close(m, SyntaxKind::LIST_PAT)
        }
        SyntaxKind::L_PAREN => {
            let m = p.open();
            p.advance();
            if p.at(SyntaxKind::R_PAREN) {
                p.advance();
                return p.close(m, SyntaxKind::TUPLE_PAT);
            }
            pat(p);
            let mut arity = 1;
            while p.eat(SyntaxKind::COMMA) {
                pat(p);
                arity += 1;
            }
            p.expect(SyntaxKind::R_PAREN);
            p.close(m, if arity == 1 { SyntaxKind::PAREN_PAT } else { SyntaxKind::TUPLE_PAT })
        }
        _ => {
            p.advance_with_error("expected a pattern");
            let m = p.open();
            p.close(m, SyntaxKind::ERROR_NODE)
        }
    }
}

pub(crate) fn apat(p: &mut Parser) {
    apat_mark(p);
}
