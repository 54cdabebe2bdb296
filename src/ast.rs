//! # DotBox syntax tree
//!
//! The parser produces a lossless tree: comments are kept at the positions
//! where they were written and every node carries its source range. Holes left
//! by syntax errors are filled with [`Missing`] nodes so that a partial tree is
//! always available.
//!
//! ## Shape
//!
//! - [`Root`] holds the top-level attributes and standalone comments.
//! - [`Attr`] is `name = value` with the comments around its name.
//! - [`Expr`] wraps a [`SubExpr`] value with its leading comments and an
//!   optional trailing comment on the same line.

mod attr;
mod expr;
mod trivia;

pub use attr::{Attr, AttrExpr, AttrName, AttrNode, Attrs, Ident, Root};
pub use expr::{BoolNode, Expr, List, ListItem, NumberNode, StringNode, SubExpr, SubExprValue};
pub use trivia::{CommentNode, Missing};
