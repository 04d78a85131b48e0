//! `SyntaxKind` enum for the hsc CST.
//!
//! A superset of [`TokenKind`](hsc_common::token::TokenKind) (mapped 1:1,
//! same variant names) plus composite node kinds produced by the parser.

use hsc_common::token::TokenKind;

/// Every kind of syntax element in the hsc CST: leaves (tokens, via
/// `From<TokenKind>`) and the composite nodes the parser builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ────────────────────────────────────────────────────
    TOMBSTONE = 0,
    ERROR_NODE,

    // ── Token kinds (mirrors hsc_common::token::TokenKind) ──────────
    MODULE_KW,
    WHERE_KW,
    IMPORT_KW,
    QUALIFIED_KW,
    AS_KW,
    HIDING_KW,
    LET_KW,
    IN_KW,
    IF_KW,
    THEN_KW,
    ELSE_KW,
    CASE_KW,
    OF_KW,
    DATA_KW,
    TYPE_KW,
    NEWTYPE_KW,
    CLASS_KW,
    INSTANCE_KW,
    DERIVING_KW,
    DO_KW,
    INFIXL_KW,
    INFIXR_KW,
    INFIX_KW,
    DEFAULT_KW,
    FAMILY_KW,
    FOREIGN_KW,
    UNDERSCORE,

    EQUALS,
    BACKSLASH,
    PIPE,
    LEFT_ARROW,
    RIGHT_ARROW,
    FAT_ARROW,
    AT,
    TILDE,
    DOT_DOT,
    DOUBLE_COLON,

    VAR_ID,
    CON_ID,
    VAR_SYM,
    CON_SYM,

    INT_LITERAL,
    FLOAT_LITERAL,
    CHAR_LITERAL,
    STRING_LITERAL,

    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,
    COMMA,
    SEMI,
    BACKTICK,

    VL_BRACE,
    VR_BRACE,
    V_SEMI,

    NEWLINE,
    LINE_COMMENT,
    BLOCK_COMMENT,

    ERROR_TOKEN,
    EOF,

    // ── Module / imports ─────────────────────────────────────────────
    SOURCE_FILE,
    MODULE_HEADER,
    EXPORT_LIST,
    EXPORT_ITEM,
    IMPORT_DECL,
    IMPORT_LIST,
    IMPORT_ITEM,
    MODULE_NAME,

    // ── Declarations ─────────────────────────────────────────────────
    TYPE_SYN_DECL,
    DATA_DECL,
    NEWTYPE_DECL,
    CLASS_DECL,
    INSTANCE_DECL,
    FIXITY_DECL,
    TYPE_SIG_DECL,
    KIND_SIG_DECL,
    FOREIGN_IMPORT_DECL,
    DEFAULT_DECL,
    FUN_BIND,
    PAT_BIND,
    CLAUSE,
    PARAM_LIST,
    WHERE_CLAUSE,
    DERIVING_CLAUSE,

    CON_DECL_LIST,
    CON_DECL,
    FIELD_DECL_LIST,
    FIELD_DECL,
    STRICT_TYPE,
    LAZY_TYPE,

    RHS,
    GUARDED_RHS,
    GUARD_LIST,
    BOOL_GUARD,
    PAT_GUARD,
    LET_GUARD,

    // ── Types ─────────────────────────────────────────────────────────
    TYPE_VAR,
    TYPE_CON,
    TYPE_APP,
    FUN_TYPE,
    TUPLE_TYPE,
    LIST_TYPE,
    FORALL_TYPE,
    CONTEXT,
    CONSTRAINED_TYPE,
    TYPE_OF_KIND,
    TYPE_VAR_LIST,
    TYPE_VAR_BNDR,

    // ── Kinds ─────────────────────────────────────────────────────────
    KIND_STAR,
    KIND_CONSTRAINT,
    KIND_FUN,
    KIND_VAR,

    // ── Patterns ──────────────────────────────────────────────────────
    VAR_PAT,
    CON_PAT,
    LIT_PAT,
    WILDCARD_PAT,
    TUPLE_PAT,
    LIST_PAT,
    AS_PAT,
    LAZY_PAT,
    BANG_PAT,
    PAREN_PAT,
    INFIX_CON_PAT,
    RECORD_PAT,
    FIELD_PAT,

    // ── Expressions ───────────────────────────────────────────────────
    VAR_EXPR,
    CON_EXPR,
    LIT_EXPR,
    APP_EXPR,
    INFIX_EXPR,
    NEG_EXPR,
    LAMBDA_EXPR,
    LET_EXPR,
    IF_EXPR,
    CASE_EXPR,
    DO_EXPR,
    LIST_EXPR,
    TUPLE_EXPR,
    PAREN_EXPR,
    LIST_COMP_EXPR,
    ENUM_FROM_EXPR,
    ENUM_FROM_TO_EXPR,
    ENUM_FROM_THEN_EXPR,
    ENUM_FROM_THEN_TO_EXPR,
    SECTION_LEFT,
    SECTION_RIGHT,
    TYPED_EXPR,
    RECORD_CON_EXPR,
    RECORD_UPDATE_EXPR,
    FIELD_BIND_LIST,
    FIELD_BIND,

    MATCH,
    MATCH_ARM,
    GENERATOR_QUAL,
    FILTER_QUAL,
    LET_QUAL,

    STMT_LIST,
    BIND_STMT,
    LET_STMT,
    EXPR_STMT,

    NAME,
    QUAL_NAME,
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Module => SyntaxKind::MODULE_KW,
            TokenKind::Where => SyntaxKind::WHERE_KW,
            TokenKind::Import => SyntaxKind::IMPORT_KW,
            TokenKind::Qualified => SyntaxKind::QUALIFIED_KW,
            TokenKind::As => SyntaxKind::AS_KW,
            TokenKind::Hiding => SyntaxKind::HIDING_KW,
            TokenKind::Let => SyntaxKind::LET_KW,
            TokenKind::In => SyntaxKind::IN_KW,
            TokenKind::If => SyntaxKind::IF_KW,
            TokenKind::Then => SyntaxKind::THEN_KW,
            TokenKind::Else => SyntaxKind::ELSE_KW,
            TokenKind::Case => SyntaxKind::CASE_KW,
            TokenKind::Of => SyntaxKind::OF_KW,
            TokenKind::Data => SyntaxKind::DATA_KW,
            TokenKind::Type => SyntaxKind::TYPE_KW,
            TokenKind::Newtype => SyntaxKind::NEWTYPE_KW,
            TokenKind::Class => SyntaxKind::CLASS_KW,
            TokenKind::Instance => SyntaxKind::INSTANCE_KW,
            TokenKind::Deriving => SyntaxKind::DERIVING_KW,
            TokenKind::Do => SyntaxKind::DO_KW,
            TokenKind::Infixl => SyntaxKind::INFIXL_KW,
            TokenKind::Infixr => SyntaxKind::INFIXR_KW,
            TokenKind::Infix => SyntaxKind::INFIX_KW,
            TokenKind::Default => SyntaxKind::DEFAULT_KW,
            TokenKind::Family => SyntaxKind::FAMILY_KW,
            TokenKind::Foreign => SyntaxKind::FOREIGN_KW,
            TokenKind::Underscore => SyntaxKind::UNDERSCORE,

            TokenKind::Equals => SyntaxKind::EQUALS,
            TokenKind::Backslash => SyntaxKind::BACKSLASH,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::LeftArrow => SyntaxKind::LEFT_ARROW,
            TokenKind::RightArrow => SyntaxKind::RIGHT_ARROW,
            TokenKind::FatArrow => SyntaxKind::FAT_ARROW,
            TokenKind::At => SyntaxKind::AT,
            TokenKind::Tilde => SyntaxKind::TILDE,
            TokenKind::DotDot => SyntaxKind::DOT_DOT,
            TokenKind::DoubleColon => SyntaxKind::DOUBLE_COLON,

            TokenKind::VarId => SyntaxKind::VAR_ID,
            TokenKind::ConId => SyntaxKind::CON_ID,
            TokenKind::VarSym => SyntaxKind::VAR_SYM,
            TokenKind::ConSym => SyntaxKind::CON_SYM,

            TokenKind::IntLiteral => SyntaxKind::INT_LITERAL,
            TokenKind::FloatLiteral => SyntaxKind::FLOAT_LITERAL,
            TokenKind::CharLiteral => SyntaxKind::CHAR_LITERAL,
            TokenKind::StringLiteral => SyntaxKind::STRING_LITERAL,

            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Semi => SyntaxKind::SEMI,
            TokenKind::Backtick => SyntaxKind::BACKTICK,

            TokenKind::VLBrace => SyntaxKind::VL_BRACE,
            TokenKind::VRBrace => SyntaxKind::VR_BRACE,
            TokenKind::VSemi => SyntaxKind::V_SEMI,

            TokenKind::Newline => SyntaxKind::NEWLINE,
            TokenKind::LineComment => SyntaxKind::LINE_COMMENT,
            TokenKind::BlockComment => SyntaxKind::BLOCK_COMMENT,

            TokenKind::Error => SyntaxKind::ERROR_TOKEN,
            TokenKind::Eof => SyntaxKind::EOF,
        }
    }
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_first() {
        assert_eq!(SyntaxKind::TOMBSTONE as u16, 0);
        assert_eq!(SyntaxKind::ERROR_NODE as u16, 1);
    }

    #[test]
    fn token_kind_round_trips() {
        assert_eq!(SyntaxKind::from(TokenKind::Module), SyntaxKind::MODULE_KW);
        assert_eq!(SyntaxKind::from(TokenKind::VarId), SyntaxKind::VAR_ID);
        assert_eq!(SyntaxKind::from(TokenKind::Eof), SyntaxKind::EOF);
    }
}
