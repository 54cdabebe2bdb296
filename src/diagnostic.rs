use serde::Serialize;
use thiserror::Error;

use crate::token::Location;

/// Which pipeline stage reported a diagnostic. Lexical sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Stage {
    Lexical,
    Syntax,
}

/// An error with a source range.
///
/// `start` and `end` are 1-based positions coming from the lexer. For errors
/// at end of input both point at the end-of-file location, so locations are
/// never `0:0`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{start}: {message}")]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
    pub start: Location,
    pub end: Location,
}

impl Diagnostic {
    pub fn lexical(message: impl Into<String>, start: Location, end: Location) -> Self {
        Diagnostic {
            stage: Stage::Lexical,
            message: message.into(),
            start,
            end,
        }
    }

    pub fn syntax(message: impl Into<String>, start: Location, end: Location) -> Self {
        Diagnostic {
            stage: Stage::Syntax,
            message: message.into(),
            start,
            end,
        }
    }
}

/// Ordered diagnostics for one document: lexical errors first, then syntax
/// errors, each group in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("{} error(s) in document", .items.len())]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Merges the lexer's and the parser's lists.
    ///
    /// The lexer also records token-kind mismatches, which are syntax errors,
    /// so both lists are regrouped by stage and then by position.
    pub fn new(lexer: Vec<Diagnostic>, parser: Vec<Diagnostic>) -> Self {
        let mut items = lexer;
        items.extend(parser);
        items.sort_by_key(|d| (d.stage, d.start));
        Diagnostics { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
