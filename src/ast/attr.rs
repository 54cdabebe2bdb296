use serde::Serialize;

use super::expr::Expr;
use super::trivia::{CommentNode, Missing};
use crate::token::Location;

/// A whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Root {
    pub nodes: Vec<AttrNode>,
    pub start: Location,
    pub end: Location,
}

/// An entry in an attribute body: an attribute or a standalone comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttrNode {
    Attr(Attr),
    Comment(CommentNode),
}

impl AttrNode {
    pub fn start(&self) -> Location {
        match self {
            AttrNode::Attr(attr) => attr.start,
            AttrNode::Comment(comment) => comment.start,
        }
    }

    pub fn end(&self) -> Location {
        match self {
            AttrNode::Attr(attr) => attr.end,
            AttrNode::Comment(comment) => comment.end,
        }
    }
}

/// `{ ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attrs {
    pub nodes: Vec<AttrNode>,
    pub start: Location,
    pub end: Location,
}

/// `name = value`, with the comments written before the name and between the
/// name and `=`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attr {
    pub pre_name_comments: Vec<CommentNode>,
    pub name: AttrName,
    pub post_name_comments: Vec<CommentNode>,
    pub expr: AttrExpr,
    pub start: Location,
    pub end: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident {
    pub value: String,
    pub start: Location,
    pub end: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttrName {
    Ident(Ident),
    /// A quoted name, kept as its lines.
    String(super::expr::StringNode),
    Missing(Missing),
}

impl AttrName {
    pub fn is_missing(&self) -> bool {
        matches!(self, AttrName::Missing(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttrExpr {
    Expr(Expr),
    Missing(Missing),
}

impl AttrExpr {
    pub fn start(&self) -> Location {
        match self {
            AttrExpr::Expr(expr) => expr.start,
            AttrExpr::Missing(missing) => missing.start,
        }
    }

    pub fn end(&self) -> Location {
        match self {
            AttrExpr::Expr(expr) => expr.end,
            AttrExpr::Missing(missing) => missing.end,
        }
    }
}
