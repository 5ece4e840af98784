//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind` - validation happens elsewhere.

use std::fmt::Write;

use crate::syntax::kind::token_sets::{CMP_OPS, SORT_DIRECTIONS};
use crate::syntax::kind::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(Query, Query);
ast_node!(OrExpr, OrExpr);
ast_node!(AndExpr, AndExpr);
ast_node!(NotExpr, NotExpr);
ast_node!(Group, Group);
ast_node!(FieldTerm, FieldTerm);
ast_node!(FieldPath, FieldPath);
ast_node!(Value, Value);
ast_node!(SimpleTag, SimpleTag);
ast_node!(SortClause, SortClause);
ast_node!(SortField, SortField);

/// Expression: any clause that can appear in the boolean tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Or(OrExpr),
    And(AndExpr),
    Not(NotExpr),
    Group(Group),
    FieldTerm(FieldTerm),
    SimpleTag(SimpleTag),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::OrExpr => OrExpr::cast(node).map(Expr::Or),
            SyntaxKind::AndExpr => AndExpr::cast(node).map(Expr::And),
            SyntaxKind::NotExpr => NotExpr::cast(node).map(Expr::Not),
            SyntaxKind::Group => Group::cast(node).map(Expr::Group),
            SyntaxKind::FieldTerm => FieldTerm::cast(node).map(Expr::FieldTerm),
            SyntaxKind::SimpleTag => SimpleTag::cast(node).map(Expr::SimpleTag),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Or(n) => n.syntax(),
            Expr::And(n) => n.syntax(),
            Expr::Not(n) => n.syntax(),
            Expr::Group(n) => n.syntax(),
            Expr::FieldTerm(n) => n.syntax(),
            Expr::SimpleTag(n) => n.syntax(),
        }
    }
}

// --- Accessors ---

impl Query {
    pub fn expr(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    /// Recovery can leave extra clauses at the top level; the analyzer walks
    /// all of them so their spans still get feedback.
    pub fn exprs(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }

    pub fn sort_clause(&self) -> Option<SortClause> {
        self.0.children().find_map(SortClause::cast)
    }
}

impl OrExpr {
    pub fn operands(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

impl AndExpr {
    pub fn operands(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

impl NotExpr {
    pub fn operand(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl Group {
    pub fn inner(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

impl FieldTerm {
    pub fn path(&self) -> Option<FieldPath> {
        self.0.children().find_map(FieldPath::cast)
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| CMP_OPS.contains(t.kind()))
    }

    pub fn value(&self) -> Option<Value> {
        self.0.children().find_map(Value::cast)
    }
}

impl FieldPath {
    pub fn segments(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| t.kind() == SyntaxKind::Word)
    }

    /// The dotted path as written, without trivia.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(segment.text());
        }
        out
    }
}

impl Value {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind().is_literal())
    }
}

impl SimpleTag {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind().is_literal())
    }
}

impl SortClause {
    pub fn fields(&self) -> impl Iterator<Item = SortField> + '_ {
        self.0.children().filter_map(SortField::cast)
    }
}

impl SortField {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::Word)
    }

    pub fn direction(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| SORT_DIRECTIONS.contains(t.kind()))
    }

    pub fn is_descending(&self) -> bool {
        self.direction()
            .is_some_and(|t| t.kind() == SyntaxKind::Minus)
    }
}

/// Debug dump of the syntax tree.
///
/// One line per element: `Kind@start..end` for nodes, plus the quoted text
/// for tokens. Used by the CLI.
pub fn format_syntax(node: &SyntaxNode, include_trivia: bool) -> String {
    let mut out = String::new();
    format_node(node, 0, &mut out, include_trivia);
    out
}

fn format_node(node: &SyntaxNode, indent: usize, out: &mut String, include_trivia: bool) {
    let prefix = "  ".repeat(indent);
    let range = node.text_range();
    let _ = writeln!(
        out,
        "{}{:?}@{}..{}",
        prefix,
        node.kind(),
        u32::from(range.start()),
        u32::from(range.end())
    );
    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => format_node(&n, indent + 1, out, include_trivia),
            rowan::NodeOrToken::Token(t) => {
                if !include_trivia && t.kind().is_trivia() {
                    continue;
                }
                let prefix = "  ".repeat(indent + 1);
                let range = t.text_range();
                let _ = writeln!(
                    out,
                    "{}{:?}@{}..{} {:?}",
                    prefix,
                    t.kind(),
                    u32::from(range.start()),
                    u32::from(range.end()),
                    t.text()
                );
            }
        }
    }
}
