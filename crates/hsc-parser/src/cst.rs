//! Rowan-based concrete syntax tree types for hsc.

use crate::syntax_kind::SyntaxKind;

/// Marker type connecting [`SyntaxKind`] to rowan's generic tree machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HscLanguage {}

impl rowan::Language for HscLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        // Safety: SyntaxKind is #[repr(u16)] and rowan only ever hands back
        // a kind this crate itself produced via kind_to_raw.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<HscLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<HscLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<HscLanguage>;
