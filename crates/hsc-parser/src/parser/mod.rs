//! Event-based parser core.
//!
//! Consumes the token stream produced by `hsc_lexer` (layout already
//! resolved into explicit `VL_BRACE`/`V_SEMI`/`VR_BRACE` tokens) and
//! produces events (Open/Close/Advance) that [`Parser::build_tree`] turns
//! into a rowan green tree. This decouples parsing logic from tree
//! construction, following the matklad/rust-analyzer event-based recipe:
//! `open()` starts a node, `advance()` consumes a token, `close()` finishes
//! a node with its real kind, and `open_before()` wraps an already-closed
//! node in a new parent using the "forward parent" trick (used here to turn
//! a bare atom into an `APP_EXPR` once a following argument is seen).
//!
//! Unlike a newline-significant grammar, there is no delimiter-depth
//! bookkeeping here: `hsc-lexer`'s layout pass has already turned
//! indentation into the only separators/terminators the parser needs to
//! see (`VL_BRACE`/`V_SEMI`/`VR_BRACE`), so `current`/`nth` just skip
//! comments.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod patterns;
pub(crate) mod types;

use hsc_common::span::Span;
use hsc_common::token::{Token, TokenKind};

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug)]
enum Event {
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    Close,
    Advance,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

pub(crate) struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    source: &'src str,
    errors: Vec<ParseError>,
    has_error: bool,
    /// Guards against infinite loops in list-parsing helpers when a parse
    /// function fails to make progress.
    fuel: std::cell::Cell<u32>,
}

const START_FUEL: u32 = 256;

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
            has_error: false,
            fuel: std::cell::Cell::new(START_FUEL),
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────

    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        if self.fuel.get() == 0 {
            panic!("parser stuck: no progress made, fuel exhausted");
        }
        self.fuel.set(self.fuel.get() - 1);
        let mut pos = self.pos;
        let mut remaining = n;
        while pos < self.tokens.len() {
            let kind = self.tokens[pos].kind;
            if kind.is_trivia() {
                pos += 1;
                continue;
            }
            if remaining == 0 {
                return SyntaxKind::from(kind);
            }
            remaining -= 1;
            pos += 1;
        }
        SyntaxKind::EOF
    }

    pub(crate) fn current_text(&self) -> &'src str {
        let pos = self.skip_to_significant(self.pos);
        if pos < self.tokens.len() {
            let span = self.tokens[pos].span;
            &self.source[span.start as usize..span.end as usize]
        } else {
            ""
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        let pos = self.skip_to_significant(self.pos);
        if pos < self.tokens.len() {
            self.tokens[pos].span
        } else {
            let end = self.source.len() as u32;
            Span::new(end, end)
        }
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// True at a token that can start an equation/declaration/statement --
    /// used by list-parsing loops to decide when to stop.
    pub(crate) fn at_end_of_block(&self) -> bool {
        matches!(self.current(), SyntaxKind::VR_BRACE | SyntaxKind::R_BRACE | SyntaxKind::EOF)
    }

    // ── Node management ────────────────────────────────────────────

    pub(crate) fn open(&mut self) -> MarkOpened {
        self.reset_fuel();
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open { kind: slot, .. } = &mut self.events[m.index] {
            *slot = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Token consumption ──────────────────────────────────────────

    pub(crate) fn advance(&mut self) {
        self.reset_fuel();
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
        if self.pos < self.tokens.len() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    pub(crate) fn advance_with_error(&mut self, message: &str) {
        let m = self.open();
        self.error(message);
        self.advance();
        self.close(m, SyntaxKind::ERROR_NODE);
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            self.error(&format!("expected {kind:?}"));
            false
        }
    }

    pub(crate) fn expect_one_of(&mut self, kinds: &[SyntaxKind]) -> bool {
        if self.at_any(kinds) {
            self.advance();
            true
        } else {
            let expected: Vec<String> = kinds.iter().map(|k| format!("{k:?}")).collect();
            let span = self.current_span();
            self.errors.push(ParseError::expected_one_of(expected, span));
            self.has_error = true;
            false
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Eat one or more `V_SEMI`/`SEMI` separators (empty statements between
    /// them are legal per the layout rule).
    pub(crate) fn eat_separators(&mut self) {
        while self.eat(SyntaxKind::V_SEMI) || self.eat(SyntaxKind::SEMI) {}
    }

    // ── Error reporting ────────────────────────────────────────────

    pub(crate) fn error(&mut self, message: &str) {
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
        self.has_error = true;
    }

    pub(crate) fn has_error(&self) -> bool {
        self.has_error
    }

    fn reset_fuel(&self) {
        self.fuel.set(START_FUEL);
    }

    fn skip_to_significant(&self, mut pos: usize) -> usize {
        while pos < self.tokens.len() && self.tokens[pos].kind.is_trivia() {
            pos += 1;
        }
        pos
    }

    // ── Tree building ──────────────────────────────────────────────

    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<ParseError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos: usize = 0;
        let mut forward_parents: Vec<(usize, SyntaxKind)> = Vec::new();

        let mut i = 0;
        while i < self.events.len() {
            match self.events[i] {
                Event::Open { kind, forward_parent } => {
                    if forward_parent.is_some() {
                        forward_parents.clear();
                        let mut current = i;
                        loop {
                            let (fk, fp) = match self.events[current] {
                                Event::Open { kind, forward_parent } => (kind, forward_parent),
                                _ => unreachable!(),
                            };
                            forward_parents.push((current, fk));
                            match fp {
                                Some(next) => current = next,
                                None => break,
                            }
                        }
                        for &(fp_idx, _) in forward_parents.iter().skip(1) {
                            if let Event::Open { kind, forward_parent } = &mut self.events[fp_idx] {
                                *kind = SyntaxKind::TOMBSTONE;
                                *forward_parent = None;
                            }
                        }
                        if let Event::Open { forward_parent, .. } = &mut self.events[i] {
                            *forward_parent = None;
                        }
                        for &(_, fk) in forward_parents.iter().rev() {
                            if fk != SyntaxKind::TOMBSTONE {
                                builder.start_node(rowan::SyntaxKind(fk as u16));
                            }
                        }
                    } else if kind != SyntaxKind::TOMBSTONE {
                        builder.start_node(rowan::SyntaxKind(kind as u16));
                    }
                }
                Event::Close => builder.finish_node(),
                Event::Advance => {
                    if token_pos < self.tokens.len() {
                        let token = &self.tokens[token_pos];
                        let kind = SyntaxKind::from(token.kind);
                        let text = &self.source[token.span.start as usize..token.span.end as usize];
                        builder.token(rowan::SyntaxKind(kind as u16), text);
                        token_pos += 1;
                    }
                }
            }
            i += 1;
        }

        (builder.finish(), self.errors)
    }
}

/// Parse a complete module: `VL_BRACE decls VR_BRACE EOF` (the implicit
/// top-level block the layout pass always opens).
pub(crate) fn parse_source_file(p: &mut Parser) {
    let root = p.open();
    items::parse_module(p);
    while !p.at(SyntaxKind::EOF) {
        p.advance();
    }
    p.advance(); // EOF
    p.close(root, SyntaxKind::SOURCE_FILE);
}
