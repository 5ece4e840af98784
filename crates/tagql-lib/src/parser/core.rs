//! Core parser state machine and low-level operations.
//!
//! This module contains the `Parser` struct and all foundational methods:
//! - Token access and lookahead
//! - Trivia buffering and attachment
//! - Tree construction via Rowan
//! - Error recording and recovery
//! - Recursion depth limiting

use rowan::{Checkpoint, GreenNodeBuilder, TextRange, TextSize};

use super::{MAX_DEPTH, Parse};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::syntax::kind::{SyntaxKind, TokenSet};
use crate::syntax::lexer::{Token, token_text};

#[cfg(debug_assertions)]
const DEFAULT_FUEL: u32 = 256;

/// Tracks an open `(` for better error messages on unclosed groups.
#[derive(Debug, Clone, Copy)]
pub(super) struct OpenDelimiter {
    pub span: TextRange,
}

/// Parser state machine.
///
/// The token stream is processed left-to-right. Trivia tokens (whitespace)
/// are buffered separately and flushed as leading trivia when starting a new
/// node or consuming the next significant token. This gives predictable trivia
/// attachment without backtracking.
pub(super) struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    /// Current position in `tokens`. Monotonically increases.
    pub(super) pos: usize,
    /// Trivia accumulated since last non-trivia token.
    /// Drained into the tree at `start_node()` / `checkpoint()` / `bump()`.
    pub(super) trivia_buffer: Vec<Token>,
    pub(super) builder: GreenNodeBuilder<'static>,
    pub(super) diagnostics: Diagnostics,
    pub(super) depth: u32,
    /// Last error position - used to suppress cascading errors at same span
    pub(super) last_error_pos: Option<TextSize>,
    /// Stack of open `(` spans for "group opened here" errors.
    pub(super) delimiter_stack: Vec<OpenDelimiter>,
    #[cfg(debug_assertions)]
    pub(super) fuel: std::cell::Cell<u32>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>, diagnostics: Diagnostics) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics,
            depth: 0,
            last_error_pos: None,
            delimiter_stack: Vec::with_capacity(4),
            #[cfg(debug_assertions)]
            fuel: std::cell::Cell::new(DEFAULT_FUEL),
        }
    }

    pub fn finish(mut self) -> Parse {
        self.drain_trivia();
        Parse {
            green: self.builder.finish(),
            diagnostics: self.diagnostics,
        }
    }

    /// Current token kind. Returns `Error` at EOF (acts as sentinel).
    pub(super) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Lookahead by `n` tokens (0 = current). Consumes fuel in debug mode.
    /// The EOF sentinel is fuel-free: every loop terminates there, and deep
    /// call stacks unwinding after the recursion limit re-check it often.
    pub(super) fn nth(&self, lookahead: usize) -> SyntaxKind {
        let Some(token) = self.tokens.get(self.pos + lookahead) else {
            return SyntaxKind::Error;
        };
        #[cfg(debug_assertions)]
        {
            if self.fuel.get() == 0 {
                panic!(
                    "parser is stuck: no progress made in {} iterations",
                    DEFAULT_FUEL
                );
            }
            self.fuel.set(self.fuel.get() - 1);
        }
        token.kind
    }

    pub(super) fn current_span(&self) -> TextRange {
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    pub(super) fn current_text(&self) -> &'src str {
        self.tokens
            .get(self.pos)
            .map_or("", |t| token_text(self.source, t))
    }

    pub(super) fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Peek past trivia. Buffers trivia tokens for later attachment.
    pub(super) fn peek(&mut self) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.current()
    }

    /// Lookahead `n` non-trivia tokens. Used for the `field cmp_op` decision.
    pub(super) fn peek_nth(&mut self, n: usize) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        let mut count = 0;
        let mut pos = self.pos;
        while pos < self.tokens.len() {
            let kind = self.tokens[pos].kind;
            if !kind.is_trivia() {
                if count == n {
                    return kind;
                }
                count += 1;
            }
            pos += 1;
        }
        SyntaxKind::Error
    }

    pub(super) fn skip_trivia_to_buffer(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.trivia_buffer.push(self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    pub(super) fn drain_trivia(&mut self) {
        for token in self.trivia_buffer.drain(..) {
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
        }
    }

    pub(super) fn eat_trivia(&mut self) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
    }

    /// Start node, attaching any buffered trivia to the parent first.
    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    /// Wrap previously-parsed content. Used for the n-ary connectives: parse
    /// one operand, then see `|`, wrap retroactively into `OrExpr(...)`.
    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    /// Checkpoint before parsing. If we later need to wrap, use `start_node_at`.
    pub(super) fn checkpoint(&mut self) -> Checkpoint {
        self.drain_trivia();
        self.builder.checkpoint()
    }

    /// Consume current token into the tree, flushing buffered trivia first so
    /// token order in the tree matches source order. Resets fuel.
    pub(super) fn bump(&mut self) {
        assert!(!self.eof(), "bump called at EOF");
        #[cfg(debug_assertions)]
        self.fuel.set(DEFAULT_FUEL);
        self.drain_trivia();
        let token = self.tokens[self.pos];
        let text = token_text(self.source, &token);
        self.builder.token(token.kind.into(), text);
        self.pos += 1;
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(super) fn error(&mut self, kind: DiagnosticKind) {
        let range = self.current_span();
        let pos = range.start();
        if self.last_error_pos == Some(pos) {
            return;
        }
        self.last_error_pos = Some(pos);
        self.diagnostics.report(kind, range).emit();
    }

    pub(super) fn error_with(&mut self, kind: DiagnosticKind, detail: impl Into<String>) {
        let range = self.current_span();
        let pos = range.start();
        if self.last_error_pos == Some(pos) {
            return;
        }
        self.last_error_pos = Some(pos);
        self.diagnostics.report(kind, range).message(detail).emit();
    }

    pub(super) fn error_related(
        &mut self,
        kind: DiagnosticKind,
        related_range: TextRange,
        related_message: &str,
    ) {
        let range = self.current_span();
        let pos = range.start();
        if self.last_error_pos == Some(pos) {
            return;
        }
        self.last_error_pos = Some(pos);
        self.diagnostics
            .report(kind, range)
            .related_to(related_range, related_message)
            .emit();
    }

    /// Wrap the unexpected current token in an Error node and consume it.
    /// Ensures progress even on garbage input.
    pub(super) fn error_and_bump(&mut self, kind: DiagnosticKind) {
        if self.at(SyntaxKind::UnexpectedFragment) {
            // Lexical diagnostic was already recorded from the token stream
            self.start_node(SyntaxKind::Error);
            self.bump();
            self.finish_node();
            return;
        }
        self.error_with(kind, format!("`{}`", self.current_text()));
        if !self.eof() {
            self.start_node(SyntaxKind::Error);
            self.bump();
            self.finish_node();
        }
    }

    /// Skip tokens until a recovery point, wrapping them in an Error node.
    /// If already at a recovery token or EOF, only the error is emitted.
    pub(super) fn error_recover(&mut self, kind: DiagnosticKind, recovery: TokenSet) {
        self.error(kind);
        if recovery.contains(self.peek()) || self.eof() {
            return;
        }

        self.start_node(SyntaxKind::Error);
        loop {
            let current = self.peek();
            if self.eof() || recovery.contains(current) {
                break;
            }
            self.bump();
        }
        self.finish_node();
    }

    pub(super) fn enter_recursion(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            self.error(DiagnosticKind::RecursionLimit);
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Push the current `(` span onto the stack for unclosed-group tracking.
    pub(super) fn push_delimiter(&mut self) {
        self.delimiter_stack.push(OpenDelimiter {
            span: self.current_span(),
        });
    }

    pub(super) fn pop_delimiter(&mut self) -> Option<OpenDelimiter> {
        self.delimiter_stack.pop()
    }

    /// End position of the last non-trivia token before the current position.
    /// Used for adjacency checks when trivia may have been buffered.
    pub(super) fn last_non_trivia_end(&self) -> Option<TextSize> {
        for i in (0..self.pos).rev() {
            if !self.tokens[i].kind.is_trivia() {
                return Some(self.tokens[i].span.end());
            }
        }
        None
    }
}
