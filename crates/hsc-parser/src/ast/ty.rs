//! Typed AST nodes for types and kinds (§3, §4.1).

use crate::ast::{ast_node, child_node, unwrap_single_child, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone)]
pub enum Type {
    Var(TypeVarRef),
    Con(TypeConRef),
    App(TypeApp),
    Fun(FunType),
    Tuple(TupleType),
    List(ListType),
    Forall(ForallType),
    Constrained(ConstrainedType),
    OfKind(TypeOfKind),
}

impl Type {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let node = unwrap_single_child(&node);
        match node.kind() {
            SyntaxKind::TYPE_VAR => Some(Type::Var(TypeVarRef { syntax: node })),
            SyntaxKind::TYPE_CON => Some(Type::Con(TypeConRef { syntax: node })),
            SyntaxKind::TYPE_APP => Some(Type::App(TypeApp { syntax: node })),
            SyntaxKind::FUN_TYPE => Some(Type::Fun(FunType { syntax: node })),
            SyntaxKind::TUPLE_TYPE => Some(Type::Tuple(TupleType { syntax: node })),
            SyntaxKind::LIST_TYPE => Some(Type::List(ListType { syntax: node })),
            SyntaxKind::FORALL_TYPE => Some(Type::Forall(ForallType { syntax: node })),
            SyntaxKind::CONSTRAINED_TYPE => {
                Some(Type::Constrained(ConstrainedType { syntax: node }))
            }
            SyntaxKind::TYPE_OF_KIND => Some(Type::OfKind(TypeOfKind { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Type::Var(t) => t.syntax(),
            Type::Con(t) => t.syntax(),
            Type::App(t) => t.syntax(),
            Type::Fun(t) => t.syntax(),
            Type::Tuple(t) => t.syntax(),
            Type::List(t) => t.syntax(),
            Type::Forall(t) => t.syntax(),
            Type::Constrained(t) => t.syntax(),
            Type::OfKind(t) => t.syntax(),
        }
    }
}

ast_node!(TypeVarRef, TYPE_VAR);

impl TypeVarRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::VAR_ID)
    }
}

ast_node!(TypeConRef, TYPE_CON);

impl TypeConRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::CON_ID)
    }
}

/// A type application `f a b`: `head()` is the applied-to type, `args()`
/// the remaining children in argument position.
ast_node!(TypeApp, TYPE_APP);

impl TypeApp {
    pub fn children(&self) -> impl Iterator<Item = Type> + '_ {
        self.syntax.children().filter_map(Type::cast)
    }

    pub fn head(&self) -> Option<Type> {
        self.children().next()
    }

    pub fn args(&self) -> impl Iterator<Item = Type> + '_ {
        self.children().skip(1)
    }
}

ast_node!(FunType, FUN_TYPE);

impl FunType {
    pub fn param(&self) -> Option<Type> {
        self.syntax.children().filter_map(Type::cast).next()
    }

    pub fn result(&self) -> Option<Type> {
        self.syntax.children().filter_map(Type::cast).nth(1)
    }
}

ast_node!(TupleType, TUPLE_TYPE);

impl TupleType {
    pub fn elements(&self) -> impl Iterator<Item = Type> + '_ {
        self.syntax.children().filter_map(Type::cast)
    }
}

ast_node!(ListType, LIST_TYPE);

impl ListType {
    pub fn element(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

ast_node!(ForallType, FORALL_TYPE);

impl ForallType {
    pub fn bound_vars(&self) -> Vec<String> {
        self.syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::TYPE_VAR_LIST)
            .map(|list| {
                list.children_with_tokens()
                    .filter_map(|it| it.into_token())
                    .filter(|t| t.kind() == SyntaxKind::VAR_ID)
                    .map(|t| t.text().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn body(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

ast_node!(ConstrainedType, CONSTRAINED_TYPE);

impl ConstrainedType {
    pub fn context(&self) -> Option<Context> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

ast_node!(Context, CONTEXT);

impl Context {
    /// Each constraint in the context, e.g. `Eq a` in `(Eq a, Show b) => ...`.
    pub fn constraints(&self) -> impl Iterator<Item = Type> + '_ {
        self.syntax.children().filter_map(Type::cast)
    }
}

ast_node!(TypeOfKind, TYPE_OF_KIND);

impl TypeOfKind {
    pub fn body(&self) -> Option<Type> {
        child_node(&self.syntax)
    }

    pub fn kind(&self) -> Option<Kind> {
        child_node(&self.syntax)
    }
}

// ── Kinds ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Kind {
    Star(KindStar),
    Constraint(KindConstraint),
    Fun(KindFun),
    Var(KindVar),
}

impl Kind {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::KIND_STAR => Some(Kind::Star(KindStar { syntax: node })),
            SyntaxKind::KIND_CONSTRAINT => Some(Kind::Constraint(KindConstraint { syntax: node })),
            SyntaxKind::KIND_FUN => {
                let fun = KindFun { syntax: node };
                if fun.arrow().is_none() {
                    // A `KIND_FUN` wrapping a single atom (no `->`) stands
                    // for that atom; unwrap it transparently.
                    return fun.param();
                }
                Some(Kind::Fun(fun))
            }
            SyntaxKind::KIND_VAR => Some(Kind::Var(KindVar { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Kind::Star(k) => k.syntax(),
            Kind::Constraint(k) => k.syntax(),
            Kind::Fun(k) => k.syntax(),
            Kind::Var(k) => k.syntax(),
        }
    }
}

ast_node!(KindStar, KIND_STAR);
ast_node!(KindConstraint, KIND_CONSTRAINT);
ast_node!(KindVar, KIND_VAR);

impl KindVar {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::VAR_ID)
    }
}

ast_node!(KindFun, KIND_FUN);

impl KindFun {
    fn arrow(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::RIGHT_ARROW)
    }

    pub fn param(&self) -> Option<Kind> {
        self.syntax.children().find_map(Kind::cast)
    }

    pub fn result(&self) -> Option<Kind> {
        self.syntax.children().filter_map(Kind::cast).nth(1)
    }
}
