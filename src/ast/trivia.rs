use serde::Serialize;

use crate::token::{Comment, Expected, Location, Spanned, Token};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub start: Location,
    pub end: Location,
}

impl CommentNode {
    pub fn new(comment: Comment, start: Location, end: Location) -> Self {
        CommentNode {
            comment,
            start,
            end,
        }
    }
}

/// A hole in the tree where a required element was not found.
///
/// `actual` is the token that was scanned in its place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Missing {
    pub expected: Expected,
    pub actual: Box<Spanned>,
    pub start: Location,
    pub end: Location,
}

impl Missing {
    /// Builds a hole for `expected` from whatever token was scanned instead.
    ///
    /// A `Missing` token from the lexer is unwrapped so the hole records the
    /// token that was really there.
    pub fn from_token(expected: Expected, token: Spanned) -> Self {
        let (start, end) = (token.start, token.end);
        let actual = match token.token {
            Token::Missing { actual, .. } => actual,
            other => Box::new(Spanned::new(other, start, end)),
        };

        Missing {
            expected,
            actual,
            start,
            end,
        }
    }
}
