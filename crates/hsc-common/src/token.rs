use serde::Serialize;

use crate::span::Span;

/// A single lexical token: its kind plus the byte span it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every lexeme this front end's lexer can produce, plus the virtual
/// braces/semicolons the layout algorithm inserts (§2: lexing/layout is an
/// external collaborator to the parser, but a concrete token source is
/// needed to drive the pipeline end to end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u16)]
pub enum TokenKind {
    // ── Keywords ─────────────────────────────────────────────────────
    Module,
    Where,
    Import,
    Qualified,
    As,
    Hiding,
    Let,
    In,
    If,
    Then,
    Else,
    Case,
    Of,
    Data,
    Type,
    Newtype,
    Class,
    Instance,
    Deriving,
    Do,
    Infixl,
    Infixr,
    Infix,
    Default,
    Family,
    Foreign,
    Underscore,

    // ── Reserved operators ──────────────────────────────────────────
    Equals,
    Backslash,
    Pipe,
    LeftArrow,
    RightArrow,
    FatArrow,
    At,
    Tilde,
    DotDot,
    DoubleColon,

    // ── Identifiers / symbolic operators ────────────────────────────
    VarId,
    ConId,
    VarSym,
    ConSym,

    // ── Literals ─────────────────────────────────────────────────────
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,

    // ── Delimiters / punctuation ─────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Backtick,

    // ── Layout (virtual tokens inserted by the offside-rule pass) ────
    VLBrace,
    VRBrace,
    VSemi,

    // ── Trivia ────────────────────────────────────────────────────────
    Newline,
    LineComment,
    BlockComment,

    // ── Special ───────────────────────────────────────────────────────
    Error,
    Eof,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// Look up a reserved keyword by its exact source spelling.
///
/// Returns `None` for anything that should lex as `VarId`/`ConId` instead.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    Some(match s {
        "module" => TokenKind::Module,
        "where" => TokenKind::Where,
        "import" => TokenKind::Import,
        "qualified" => TokenKind::Qualified,
        "as" => TokenKind::As,
        "hiding" => TokenKind::Hiding,
        "let" => TokenKind::Let,
        "in" => TokenKind::In,
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "else" => TokenKind::Else,
        "case" => TokenKind::Case,
        "of" => TokenKind::Of,
        "data" => TokenKind::Data,
        "type" => TokenKind::Type,
        "newtype" => TokenKind::Newtype,
        "class" => TokenKind::Class,
        "instance" => TokenKind::Instance,
        "deriving" => TokenKind::Deriving,
        "do" => TokenKind::Do,
        "infixl" => TokenKind::Infixl,
        "infixr" => TokenKind::Infixr,
        "infix" => TokenKind::Infix,
        "default" => TokenKind::Default,
        "family" => TokenKind::Family,
        "foreign" => TokenKind::Foreign,
        "_" => TokenKind::Underscore,
        _ => return None,
    })
}

/// Look up a reserved symbolic operator by its exact source spelling.
/// Anything else made up of symbol characters lexes as `VarSym`/`ConSym`.
pub fn reserved_op_from_str(s: &str) -> Option<TokenKind> {
    Some(match s {
        "=" => TokenKind::Equals,
        "\\" => TokenKind::Backslash,
        "|" => TokenKind::Pipe,
        "<-" => TokenKind::LeftArrow,
        "->" => TokenKind::RightArrow,
        "=>" => TokenKind::FatArrow,
        "@" => TokenKind::At,
        "~" => TokenKind::Tilde,
        ".." => TokenKind::DotDot,
        "::" => TokenKind::DoubleColon,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip() {
        for (text, kind) in [
            ("module", TokenKind::Module),
            ("where", TokenKind::Where),
            ("import", TokenKind::Import),
            ("qualified", TokenKind::Qualified),
            ("data", TokenKind::Data),
            ("newtype", TokenKind::Newtype),
            ("class", TokenKind::Class),
            ("instance", TokenKind::Instance),
            ("deriving", TokenKind::Deriving),
            ("case", TokenKind::Case),
            ("of", TokenKind::Of),
            ("let", TokenKind::Let),
            ("in", TokenKind::In),
            ("do", TokenKind::Do),
            ("infixl", TokenKind::Infixl),
            ("infixr", TokenKind::Infixr),
            ("infix", TokenKind::Infix),
            ("_", TokenKind::Underscore),
        ] {
            assert_eq!(keyword_from_str(text), Some(kind));
        }
    }

    #[test]
    fn non_keyword_identifier_is_none() {
        assert_eq!(keyword_from_str("foo"), None);
        assert_eq!(keyword_from_str("Maybe"), None);
    }

    #[test]
    fn reserved_ops_round_trip() {
        for (text, kind) in [
            ("=", TokenKind::Equals),
            ("\\", TokenKind::Backslash),
            ("|", TokenKind::Pipe),
            ("<-", TokenKind::LeftArrow),
            ("->", TokenKind::RightArrow),
            ("=>", TokenKind::FatArrow),
            ("@", TokenKind::At),
            ("~", TokenKind::Tilde),
            ("..", TokenKind::DotDot),
            ("::", TokenKind::DoubleColon),
        ] {
            assert_eq!(reserved_op_from_str(text), Some(kind));
        }
    }

    #[test]
    fn custom_operator_is_not_reserved() {
        assert_eq!(reserved_op_from_str("<+>"), None);
        assert_eq!(reserved_op_from_str(">>="), None);
    }

    #[test]
    fn trivia_kinds() {
        assert!(TokenKind::LineComment.is_trivia());
        assert!(TokenKind::BlockComment.is_trivia());
        assert!(!TokenKind::VarId.is_trivia());
    }
}
