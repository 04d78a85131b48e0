//! Tokenizer for the hsc front end, plus the layout pass that turns
//! indentation into explicit `{`/`;`/`}` tokens before the parser sees them.
//!
//! Lexing and layout are external collaborators from the perspective of the
//! specified core (parsing, kind checking, type checking) — this crate just
//! has to produce a concrete `Vec<Token>` so the rest of the pipeline has
//! something to run on.

mod cursor;
pub mod layout;

use cursor::Cursor;
use hsc_common::token::{keyword_from_str, reserved_op_from_str, Token, TokenKind};

/// Converts source text into a stream of raw tokens (before layout).
///
/// Implements `Iterator<Item = Token>`, so callers can consume tokens lazily
/// or collect them into a `Vec`.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    emitted_eof: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
        }
    }

    /// Tokenize the entire source into a `Vec<Token>`, including the final
    /// `Eof` token, with no layout resolution applied.
    pub fn tokenize_raw(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    /// Tokenize and resolve layout in one step — the entry point callers
    /// outside this crate should use.
    pub fn tokenize(source: &str) -> Vec<Token> {
        layout::resolve_layout(Self::tokenize_raw(source), source)
    }

    fn next_token(&mut self) -> Token {
        self.skip_inline_whitespace();

        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            '\n' => {
                self.cursor.advance();
                Token::new(TokenKind::Newline, start, self.cursor.pos())
            }
            '\r' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('\n') {
                    self.cursor.advance();
                }
                Token::new(TokenKind::Newline, start, self.cursor.pos())
            }

            '(' => self.single(TokenKind::LParen, start),
            ')' => self.single(TokenKind::RParen, start),
            '[' => self.single(TokenKind::LBracket, start),
            ']' => self.single(TokenKind::RBracket, start),
            '{' => {
                if self.cursor.peek_next() == Some('-') {
                    self.lex_block_comment(start)
                } else {
                    self.single(TokenKind::LBrace, start)
                }
            }
            '}' => self.single(TokenKind::RBrace, start),
            ',' => self.single(TokenKind::Comma, start),
            ';' => self.single(TokenKind::Semi, start),
            '`' => self.single(TokenKind::Backtick, start),

            '-' if self.cursor.peek_next() == Some('-') => self.lex_line_comment(start),

            '"' => self.lex_string(start),
            '\'' => self.lex_char(start),

            '0'..='9' => self.lex_number(start),

            c if is_symbol_char(c) => self.lex_operator(start),
            c if c == '_' || c.is_lowercase() => self.lex_var_ident(start),
            c if c.is_uppercase() => self.lex_con_ident(start),

            _ => {
                self.cursor.advance();
                Token::new(TokenKind::Error, start, self.cursor.pos())
            }
        }
    }

    fn skip_inline_whitespace(&mut self) {
        self.cursor.eat_while(|c| c == ' ' || c == '\t');
    }

    fn single(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    fn lex_line_comment(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c != '\n' && c != '\r');
        Token::new(TokenKind::LineComment, start, self.cursor.pos())
    }

    /// Nestable block comment `{- ... -}`.
    fn lex_block_comment(&mut self, start: u32) -> Token {
        self.cursor.advance(); // '{'
        self.cursor.advance(); // '-'
        let mut depth: u32 = 1;
        loop {
            match self.cursor.peek() {
                None => return Token::new(TokenKind::Error, start, self.cursor.pos()),
                Some('{') if self.cursor.peek_next() == Some('-') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth += 1;
                }
                Some('-') if self.cursor.peek_next() == Some('}') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth -= 1;
                    if depth == 0 {
                        return Token::new(TokenKind::BlockComment, start, self.cursor.pos());
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn lex_string(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.peek() {
                None | Some('\n') => return Token::new(TokenKind::Error, start, self.cursor.pos()),
                Some('"') => {
                    self.cursor.advance();
                    return Token::new(TokenKind::StringLiteral, start, self.cursor.pos());
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn lex_char(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening quote
        match self.cursor.peek() {
            Some('\\') => {
                self.cursor.advance();
                self.cursor.advance();
            }
            Some(_) => {
                self.cursor.advance();
            }
            None => return Token::new(TokenKind::Error, start, self.cursor.pos()),
        }
        if self.cursor.peek() == Some('\'') {
            self.cursor.advance();
            Token::new(TokenKind::CharLiteral, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Error, start, self.cursor.pos())
        }
    }

    fn lex_number(&mut self, start: u32) -> Token {
        let first = self.cursor.advance().unwrap();
        if first == '0' {
            match self.cursor.peek() {
                Some('x' | 'X') => {
                    self.cursor.advance();
                    self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
                    return Token::new(TokenKind::IntLiteral, start, self.cursor.pos());
                }
                Some('o' | 'O') => {
                    self.cursor.advance();
                    self.cursor.eat_while(|c| matches!(c, '0'..='7' | '_'));
                    return Token::new(TokenKind::IntLiteral, start, self.cursor.pos());
                }
                _ => {}
            }
        }

        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');

        let mut is_float = false;
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            is_float = true;
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        Token::new(kind, start, self.cursor.pos())
    }

    /// Lowercase identifier, or a qualified name's trailing lowercase part
    /// (`Mod.name`) -- qualification is resolved by the parser from a run of
    /// `ConId '.' ...` tokens, not by the lexer.
    fn lex_var_ident(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::VarId);
        Token::new(kind, start, self.cursor.pos())
    }

    fn lex_con_ident(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        Token::new(TokenKind::ConId, start, self.cursor.pos())
    }

    fn lex_operator(&mut self, start: u32) -> Token {
        let first = self.cursor.advance().unwrap();
        self.cursor.eat_while(is_symbol_char);
        let text = self.cursor.slice(start, self.cursor.pos());
        if let Some(kind) = reserved_op_from_str(text) {
            return Token::new(kind, start, self.cursor.pos());
        }
        let kind = if first == ':' {
            TokenKind::ConSym
        } else {
            TokenKind::VarSym
        };
        Token::new(kind, start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

fn is_symbol_char(c: char) -> bool {
    matches!(
        c,
        '!' | '#' | '$' | '%' | '&' | '*' | '+' | '.' | '/' | '<' | '=' | '>' | '?' | '@' | '\\'
            | '^' | '|' | '-' | '~' | ':'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize_raw(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_simple_binding() {
        assert_eq!(
            kinds("x = 42"),
            vec![
                TokenKind::VarId,
                TokenKind::Equals,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_keywords_vs_identifiers() {
        assert_eq!(
            kinds("case x of"),
            vec![TokenKind::Case, TokenKind::VarId, TokenKind::Of, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_qualified_name_as_dotted_cons_and_var() {
        // The lexer does not itself merge `Mod.name` -- it emits the
        // individual tokens and leaves qualification to the parser.
        assert_eq!(
            kinds("Data.List.map"),
            vec![
                TokenKind::ConId,
                TokenKind::VarSym,
                TokenKind::ConId,
                TokenKind::VarSym,
                TokenKind::VarId,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_string_and_char_literals() {
        assert_eq!(
            kinds(r#""hi" 'a'"#),
            vec![TokenKind::StringLiteral, TokenKind::CharLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_number_literals() {
        assert_eq!(kinds("42"), vec![TokenKind::IntLiteral, TokenKind::Eof]);
        assert_eq!(kinds("3.14"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
        assert_eq!(kinds("0x1F"), vec![TokenKind::IntLiteral, TokenKind::Eof]);
        assert_eq!(kinds("1.0e10"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
    }

    #[test]
    fn lex_reserved_vs_custom_operators() {
        assert_eq!(kinds("->"), vec![TokenKind::RightArrow, TokenKind::Eof]);
        assert_eq!(kinds("<+>"), vec![TokenKind::VarSym, TokenKind::Eof]);
        assert_eq!(kinds(":"), vec![TokenKind::ConSym, TokenKind::Eof]);
    }

    #[test]
    fn lex_nested_block_comment() {
        assert_eq!(
            kinds("{- outer {- inner -} still -}"),
            vec![TokenKind::BlockComment, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_line_comment() {
        assert_eq!(
            kinds("x -- trailing comment\ny"),
            vec![
                TokenKind::VarId,
                TokenKind::LineComment,
                TokenKind::Newline,
                TokenKind::VarId,
                TokenKind::Eof,
            ]
        );
    }
}
