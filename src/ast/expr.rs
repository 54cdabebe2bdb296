use serde::Serialize;

use super::attr::Attrs;
use super::trivia::{CommentNode, Missing};
use crate::token::{Location, NumberLiteral};

/// A value with the comments attached to it.
///
/// `post_expr_comment` is only set for a comment that starts on the same line
/// the value ends on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub pre_expr_comments: Vec<CommentNode>,
    pub value: SubExpr,
    pub post_expr_comment: Option<CommentNode>,
    pub start: Location,
    pub end: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubExpr {
    pub value: SubExprValue,
    pub start: Location,
    pub end: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SubExprValue {
    Number(NumberNode),
    String(StringNode),
    Bool(BoolNode),
    Attrs(Attrs),
    List(List),
    Missing(Missing),
}

impl SubExprValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, SubExprValue::Missing(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberNode {
    pub literal: NumberLiteral,
    pub start: Location,
    pub end: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringNode {
    pub lines: Vec<String>,
    pub start: Location,
    pub end: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolNode {
    pub value: bool,
    pub start: Location,
    pub end: Location,
}

/// `[ ... ]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub items: Vec<ListItem>,
    pub start: Location,
    pub end: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ListItem {
    Expr(Expr),
    Comment(CommentNode),
}

impl ListItem {
    pub fn start(&self) -> Location {
        match self {
            ListItem::Expr(expr) => expr.start,
            ListItem::Comment(comment) => comment.start,
        }
    }

    pub fn end(&self) -> Location {
        match self {
            ListItem::Expr(expr) => expr.end,
            ListItem::Comment(comment) => comment.end,
        }
    }
}
