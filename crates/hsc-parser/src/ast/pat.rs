//! Typed AST nodes for patterns (§4.1, §4.4.4).

use crate::ast::{ast_node, child_node, child_nodes, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone)]
pub enum Pattern {
    Var(VarPat),
    Con(ConPat),
    Lit(LitPat),
    Wildcard(WildcardPat),
    Tuple(TuplePat),
    List(ListPat),
    As(AsPat),
    Lazy(LazyPat),
    Bang(BangPat),
    Paren(ParenPat),
    InfixCon(InfixConPat),
    Record(RecordPat),
}

impl Pattern {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::VAR_PAT => Some(Pattern::Var(VarPat { syntax: node })),
            SyntaxKind::CON_PAT => Some(Pattern::Con(ConPat { syntax: node })),
            SyntaxKind::LIT_PAT => Some(Pattern::Lit(LitPat { syntax: node })),
            SyntaxKind::WILDCARD_PAT => Some(Pattern::Wildcard(WildcardPat { syntax: node })),
            SyntaxKind::TUPLE_PAT => Some(Pattern::Tuple(TuplePat { syntax: node })),
            SyntaxKind::LIST_PAT => Some(Pattern::List(ListPat { syntax: node })),
            SyntaxKind::AS_PAT => Some(Pattern::As(AsPat { syntax: node })),
            SyntaxKind::LAZY_PAT => Some(Pattern::Lazy(LazyPat { syntax: node })),
            SyntaxKind::BANG_PAT => Some(Pattern::Bang(BangPat { syntax: node })),
            SyntaxKind::PAREN_PAT => Some(Pattern::Paren(ParenPat { syntax: node })),
            SyntaxKind::INFIX_CON_PAT => Some(Pattern::InfixCon(InfixConPat { syntax: node })),
            SyntaxKind::RECORD_PAT => Some(Pattern::Record(RecordPat { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Pattern::Var(p) => p.syntax(),
            Pattern::Con(p) => p.syntax(),
            Pattern::Lit(p) => p.syntax(),
            Pattern::Wildcard(p) => p.syntax(),
            Pattern::Tuple(p) => p.syntax(),
            Pattern::List(p) => p.syntax(),
            Pattern::As(p) => p.syntax(),
            Pattern::Lazy(p) => p.syntax(),
            Pattern::Bang(p) => p.syntax(),
            Pattern::Paren(p) => p.syntax(),
            Pattern::InfixCon(p) => p.syntax(),
            Pattern::Record(p) => p.syntax(),
        }
    }
}

ast_node!(VarPat, VAR_PAT);

impl VarPat {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::VAR_ID)
    }
}

ast_node!(ConPat, CON_PAT);

impl ConPat {
    pub fn con_name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CON_ID)
    }

    pub fn args(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.syntax.children().filter_map(Pattern::cast)
    }
}

ast_node!(LitPat, LIT_PAT);

impl LitPat {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::INT_LITERAL
                        | SyntaxKind::FLOAT_LITERAL
                        | SyntaxKind::CHAR_LITERAL
                        | SyntaxKind::STRING_LITERAL
                )
            })
    }
}

ast_node!(WildcardPat, WILDCARD_PAT);

ast_node!(TuplePat, TUPLE_PAT);

impl TuplePat {
    pub fn elements(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.syntax.children().filter_map(Pattern::cast)
    }
}

ast_node!(ListPat, LIST_PAT);

impl ListPat {
    pub fn elements(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.syntax.children().filter_map(Pattern::cast)
    }
}

ast_node!(AsPat, AS_PAT);

impl AsPat {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::VAR_ID)
    }

    pub fn inner(&self) -> Option<Pattern> {
        self.syntax.children().find_map(Pattern::cast)
    }
}

ast_node!(LazyPat, LAZY_PAT);

impl LazyPat {
    pub fn inner(&self) -> Option<Pattern> {
        child_node_pattern(&self.syntax)
    }
}

ast_node!(BangPat, BANG_PAT);

impl BangPat {
    pub fn inner(&self) -> Option<Pattern> {
        child_node_pattern(&self.syntax)
    }
}

ast_node!(ParenPat, PAREN_PAT);

impl ParenPat {
    pub fn inner(&self) -> Option<Pattern> {
        child_node_pattern(&self.syntax)
    }
}

ast_node!(InfixConPat, INFIX_CON_PAT);

impl InfixConPat {
    pub fn con_sym(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::CON_SYM)
    }

    pub fn left(&self) -> Option<Pattern> {
        self.syntax.children().filter_map(Pattern::cast).next()
    }

    pub fn right(&self) -> Option<Pattern> {
        self.syntax.children().filter_map(Pattern::cast).nth(1)
    }
}

ast_node!(RecordPat, RECORD_PAT);

impl RecordPat {
    pub fn con_name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::CON_ID)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldPat> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(FieldPat, FIELD_PAT);

impl FieldPat {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::VAR_ID)
    }

    pub fn value(&self) -> Option<Pattern> {
        child_node_pattern(&self.syntax)
    }
}

fn child_node_pattern(parent: &SyntaxNode) -> Option<Pattern> {
    parent.children().find_map(Pattern::cast)
}
