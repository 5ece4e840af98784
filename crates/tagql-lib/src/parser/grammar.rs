//! Grammar productions for the query language.
//!
//! All `parse_*` methods are an extension of `Parser`. The connective
//! productions (`or_expr`, `and_expr`) build n-ary nodes by wrapping their
//! first operand retroactively via checkpoints, so `a b c` becomes one
//! `AndExpr` with three children rather than a left-leaning chain.

use crate::diagnostics::DiagnosticKind;
use crate::syntax::kind::SyntaxKind;
use crate::syntax::kind::token_sets::{CMP_OPS, EXPR_FIRST, SORT_DIRECTIONS, SYNC, VALUE_FIRST};

use super::core::Parser;

impl Parser<'_> {
    pub fn parse_query(&mut self) {
        self.start_node(SyntaxKind::Query);

        if EXPR_FIRST.contains(self.peek()) {
            self.parse_or_expr();
        }
        if self.peek() == SyntaxKind::SortMarker {
            self.parse_sort_clause();
        }

        // Anything left over is unexpected, but the tree must stay lossless
        // and later clauses should still get analyzed and annotated.
        loop {
            let kind = self.peek();
            if self.eof() {
                break;
            }
            if EXPR_FIRST.contains(kind) {
                self.error_with(
                    DiagnosticKind::UnexpectedToken,
                    format!("`{}`", self.current_text()),
                );
                self.parse_or_expr();
            } else if kind == SyntaxKind::SortMarker {
                self.error_with(DiagnosticKind::UnexpectedToken, "`order:`");
                self.parse_sort_clause();
            } else {
                self.error_and_bump(DiagnosticKind::UnexpectedToken);
            }
        }

        self.eat_trivia();
        self.finish_node();
    }

    /// `or_expr = and_expr ("|" and_expr)*`
    pub(super) fn parse_or_expr(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_and_expr();

        if self.peek() != SyntaxKind::Pipe {
            return;
        }
        self.start_node_at(checkpoint, SyntaxKind::OrExpr);
        while self.peek() == SyntaxKind::Pipe {
            self.bump();
            if EXPR_FIRST.contains(self.peek()) {
                self.parse_and_expr();
            } else {
                self.error(DiagnosticKind::ExpectedClause);
            }
        }
        self.finish_node();
    }

    /// `and_expr = unary (["&"] unary)*` - juxtaposition is implicit AND.
    fn parse_and_expr(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_unary();

        if !self.at_and_continue() {
            return;
        }
        self.start_node_at(checkpoint, SyntaxKind::AndExpr);
        while self.at_and_continue() {
            if self.peek() == SyntaxKind::Ampersand {
                self.bump();
                if EXPR_FIRST.contains(self.peek()) {
                    self.parse_unary();
                } else {
                    self.error(DiagnosticKind::ExpectedClause);
                    break;
                }
            } else {
                self.parse_unary();
            }
        }
        self.finish_node();
    }

    fn at_and_continue(&mut self) -> bool {
        let kind = self.peek();
        kind == SyntaxKind::Ampersand || EXPR_FIRST.contains(kind)
    }

    /// `unary = "-" unary | element`
    fn parse_unary(&mut self) {
        if !self.enter_recursion() {
            // On limit: consume everything as error, prevent stack overflow
            self.start_node(SyntaxKind::Error);
            while !self.eof() {
                self.bump();
            }
            self.finish_node();
            return;
        }

        if self.peek() == SyntaxKind::Minus {
            self.start_node(SyntaxKind::NotExpr);
            self.bump();
            if EXPR_FIRST.contains(self.peek()) {
                self.parse_unary();
            } else {
                self.error(DiagnosticKind::ExpectedClause);
            }
            self.finish_node();
        } else {
            self.parse_element();
        }

        self.exit_recursion();
    }

    /// `element = "(" expr ")" | field_term | simple_tag`
    fn parse_element(&mut self) {
        match self.peek() {
            SyntaxKind::ParenOpen => self.parse_group(),
            SyntaxKind::Word => {
                // A word followed by `.` or a comparison operator is a field;
                // anything else is a bare tag.
                let next = self.peek_nth(1);
                if next == SyntaxKind::Dot || CMP_OPS.contains(next) {
                    self.parse_field_term();
                } else {
                    self.parse_simple_tag();
                }
            }
            kind if kind.is_literal() => self.parse_simple_tag(),
            _ => self.error_and_bump(DiagnosticKind::UnexpectedToken),
        }
    }

    fn parse_group(&mut self) {
        self.start_node(SyntaxKind::Group);
        self.push_delimiter();
        self.bump(); // (

        if EXPR_FIRST.contains(self.peek()) {
            self.parse_or_expr();
        } else {
            // Covers `()` too: an empty group would otherwise vanish silently
            // during analysis.
            self.error(DiagnosticKind::ExpectedClause);
        }

        let open = self.pop_delimiter();
        if !self.eat(SyntaxKind::ParenClose) {
            let mut closed = false;
            if !self.eof() {
                // Junk before the `)`: skip to a sync point, then retry once.
                self.error_recover(DiagnosticKind::UnexpectedToken, SYNC);
                closed = self.eat(SyntaxKind::ParenClose);
            }
            if !closed {
                // Still unclosed; point back at the `(`.
                match open {
                    Some(d) => self.error_related(
                        DiagnosticKind::UnclosedGroup,
                        d.span,
                        "group opened here",
                    ),
                    None => self.error(DiagnosticKind::UnclosedGroup),
                }
            }
        }
        self.finish_node();
    }

    /// `field_term = WORD ("." WORD)* cmp_op value`
    fn parse_field_term(&mut self) {
        self.start_node(SyntaxKind::FieldTerm);
        self.parse_field_path();

        if CMP_OPS.contains(self.peek()) {
            self.bump();
        } else {
            self.error(DiagnosticKind::ExpectedOperator);
        }

        if VALUE_FIRST.contains(self.peek()) {
            self.start_node(SyntaxKind::Value);
            self.bump();
            self.finish_node();
        } else {
            self.error(DiagnosticKind::ExpectedValue);
        }

        self.finish_node();
    }

    fn parse_field_path(&mut self) {
        self.start_node(SyntaxKind::FieldPath);
        self.bump(); // leading WORD, guaranteed by the dispatch in parse_element
        while self.peek() == SyntaxKind::Dot {
            self.bump();
            if self.peek() == SyntaxKind::Word {
                self.bump();
            } else {
                self.error(DiagnosticKind::ExpectedFieldName);
                break;
            }
        }
        self.finish_node();
    }

    fn parse_simple_tag(&mut self) {
        self.start_node(SyntaxKind::SimpleTag);
        self.bump();
        self.finish_node();
    }

    /// `sort_clause = SORT_MARKER sort_field ("," sort_field)*`
    fn parse_sort_clause(&mut self) {
        self.start_node(SyntaxKind::SortClause);
        self.bump(); // order:
        self.parse_sort_field();
        while self.peek() == SyntaxKind::Comma {
            self.bump();
            self.parse_sort_field();
        }
        self.finish_node();
    }

    /// `sort_field = WORD ["+" | "-"]`
    fn parse_sort_field(&mut self) {
        if self.peek() != SyntaxKind::Word {
            self.error(DiagnosticKind::ExpectedSortField);
            return;
        }
        self.start_node(SyntaxKind::SortField);
        self.bump();

        // A direction suffix must be glued to the field name; a detached `-`
        // would read as negation of whatever follows.
        let next = self.peek();
        let adjacent = self.last_non_trivia_end() == Some(self.current_span().start());
        if SORT_DIRECTIONS.contains(next) && adjacent {
            self.bump();
        }
        self.finish_node();
    }
}
