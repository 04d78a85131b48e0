//! Typed AST layer on top of the rowan CST.
//!
//! Zero-cost wrappers around `SyntaxNode` with typed accessor methods,
//! following the rust-analyzer pattern: [`AstNode`] gives every wrapper a
//! `cast()`/`syntax()` pair, and `ast_node!` generates the boilerplate.

pub mod expr;
pub mod item;
pub mod pat;
pub mod ty;

use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

pub trait AstNode: Sized {
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub(crate) syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == SyntaxKind::$kind {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

pub(crate) use ast_node;

/// Find the first child node that can be cast to type `N`.
pub fn child_node<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

/// Find all child nodes that can be cast to type `N`.
pub fn child_nodes<'a, N: AstNode + 'a>(parent: &'a SyntaxNode) -> impl Iterator<Item = N> + 'a {
    parent.children().filter_map(N::cast)
}

/// Find the first child token with the given kind.
pub fn child_token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|it| it.kind() == kind)
}

/// A single unwrap of a `TYPE_APP`/`btype` node that turned out to have only
/// one child type -- the parser always wraps application heads in
/// `TYPE_APP` (§4.1), so callers that want "the type, whatever it is" use
/// this to see through single-child wrappers transparently.
pub fn unwrap_single_child(node: &SyntaxNode) -> SyntaxNode {
    let mut current = node.clone();
    loop {
        let mut children = current.children();
        match (children.next(), children.next()) {
            (Some(only), None) if current.kind() == SyntaxKind::TYPE_APP => {
                current = only;
            }
            _ => return current,
        }
    }
}

ast_node!(Name, NAME);

impl Name {
    pub fn text(&self) -> Option<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::VAR_ID | SyntaxKind::CON_ID | SyntaxKind::VAR_SYM))
            .map(|t| t.text().to_string())
    }
}

ast_node!(ModuleName, MODULE_NAME);

impl ModuleName {
    /// The full dotted name, e.g. `"Data.Map"` for a qualified module.
    pub fn text(&self) -> Option<String> {
        let segments: Vec<String> = self
            .syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::CON_ID)
            .map(|t| t.text().to_string())
            .collect();
        if segments.is_empty() {
            None
        } else {
            Some(segments.join("."))
        }
    }
}
