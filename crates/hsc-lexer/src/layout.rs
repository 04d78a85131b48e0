//! Offside-rule layout resolution.
//!
//! Turns the indentation that follows `let`, `where`, `do`, and `of` into
//! explicit `VLBrace`/`VSemi`/`VRBrace` tokens, the way GHC's lexer does
//! before handing tokens to the parser. This is a practical simplification
//! of the algorithm in the Haskell report: it omits the `parse-error(t)`
//! side condition (which requires feedback from the parser itself) and
//! instead special-cases the one construct that condition exists almost
//! entirely to support -- closing an implicit block when a bare `in` is
//! met without a preceding dedent, as in `let x = 1 in x`.

use hsc_common::span::LineIndex;
use hsc_common::token::{Token, TokenKind};

fn opens_layout(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Let | TokenKind::Where | TokenKind::Do | TokenKind::Of
    )
}

/// Resolve layout over a raw token stream (as produced by [`crate::Lexer`]).
///
/// `source` is the original text the tokens were lexed from; it is needed
/// to recover the column of each token for the offside comparisons.
pub fn resolve_layout(tokens: Vec<Token>, source: &str) -> Vec<Token> {
    let line_index = LineIndex::new(source);
    let col_of = |tok: &Token| line_index.line_col(tok.span.start).1 as i64;

    let mut out = Vec::with_capacity(tokens.len());
    // 0 marks an explicit `{ ... }` context; any other value is the
    // indentation column of an implicit context.
    let mut stack: Vec<i64> = Vec::new();
    let mut expect_open = true; // the whole module starts an implicit block
    let mut pending_newline = false;

    for tok in tokens {
        match tok.kind {
            TokenKind::LineComment | TokenKind::BlockComment => {
                out.push(tok);
                continue;
            }
            TokenKind::Newline => {
                pending_newline = true;
                continue;
            }
            TokenKind::Eof => {
                while let Some(top) = stack.pop() {
                    if top != 0 {
                        out.push(Token::new(TokenKind::VRBrace, tok.span.start, tok.span.start));
                    }
                }
                out.push(tok);
                continue;
            }
            _ => {}
        }

        if expect_open {
            expect_open = false;
            pending_newline = false;
            if tok.kind == TokenKind::LBrace {
                stack.push(0);
                out.push(tok);
                continue;
            }
            let col = col_of(&tok);
            let should_open = match stack.last() {
                None => true,
                Some(&m) => col > m,
            };
            out.push(Token::new(TokenKind::VLBrace, tok.span.start, tok.span.start));
            if should_open {
                stack.push(col);
            } else {
                // An empty implicit block (e.g. `where` followed immediately
                // by a dedent): close it right back up.
                out.push(Token::new(TokenKind::VRBrace, tok.span.start, tok.span.start));
            }
        } else if pending_newline {
            pending_newline = false;
            let col = col_of(&tok);
            loop {
                match stack.last() {
                    Some(&m) if m != 0 => {
                        if col == m {
                            out.push(Token::new(TokenKind::VSemi, tok.span.start, tok.span.start));
                            break;
                        } else if col < m {
                            out.push(Token::new(TokenKind::VRBrace, tok.span.start, tok.span.start));
                            stack.pop();
                            continue;
                        } else {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        }

        if tok.kind == TokenKind::In {
            if let Some(&top) = stack.last() {
                if top != 0 {
                    out.push(Token::new(TokenKind::VRBrace, tok.span.start, tok.span.start));
                    stack.pop();
                }
            }
        }

        match tok.kind {
            TokenKind::LBrace => stack.push(0),
            TokenKind::RBrace => {
                if stack.last() == Some(&0) {
                    stack.pop();
                }
            }
            _ => {}
        }

        let reopen = opens_layout(tok.kind);
        out.push(tok);
        if reopen {
            expect_open = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;

    fn layout_kinds(source: &str) -> Vec<TokenKind> {
        resolve_layout(Lexer::tokenize_raw(source), source)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn top_level_bindings_get_virtual_braces_and_semis() {
        assert_eq!(
            layout_kinds("x = 1\ny = 2"),
            vec![
                TokenKind::VLBrace,
                TokenKind::VarId,
                TokenKind::Equals,
                TokenKind::IntLiteral,
                TokenKind::VSemi,
                TokenKind::VarId,
                TokenKind::Equals,
                TokenKind::IntLiteral,
                TokenKind::VRBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn continuation_line_does_not_insert_semicolon() {
        // The second line is indented further than the binding's column,
        // so it's a continuation, not a new statement.
        assert_eq!(
            layout_kinds("x = 1\n  + 2"),
            vec![
                TokenKind::VLBrace,
                TokenKind::VarId,
                TokenKind::Equals,
                TokenKind::IntLiteral,
                TokenKind::VarSym,
                TokenKind::IntLiteral,
                TokenKind::VRBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn where_clause_opens_nested_block() {
        let kinds = layout_kinds("f x = y\n  where\n    y = 1");
        assert_eq!(
            kinds,
            vec![
                TokenKind::VLBrace,
                TokenKind::VarId,
                TokenKind::VarId,
                TokenKind::Equals,
                TokenKind::VarId,
                TokenKind::Where,
                TokenKind::VLBrace,
                TokenKind::VarId,
                TokenKind::Equals,
                TokenKind::IntLiteral,
                TokenKind::VRBrace,
                TokenKind::VRBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn let_in_closes_implicit_block_without_dedent() {
        let kinds = layout_kinds("let x = 1 in x");
        assert_eq!(
            kinds,
            vec![
                TokenKind::VLBrace,
                TokenKind::Let,
                TokenKind::VLBrace,
                TokenKind::VarId,
                TokenKind::Equals,
                TokenKind::IntLiteral,
                TokenKind::VRBrace,
                TokenKind::In,
                TokenKind::VarId,
                TokenKind::VRBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn explicit_braces_suppress_layout() {
        let kinds = layout_kinds("do { x; y }");
        assert_eq!(
            kinds,
            vec![
                TokenKind::VLBrace,
                TokenKind::Do,
                TokenKind::LBrace,
                TokenKind::VarId,
                TokenKind::Semi,
                TokenKind::VarId,
                TokenKind::RBrace,
                TokenKind::VRBrace,
                TokenKind::Eof,
            ]
        );
    }
}
