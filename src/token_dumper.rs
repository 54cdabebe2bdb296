use std::fmt::Write;

use crate::token::{Spanned, Token};

/// Renders a token stream as one line per token, for `dotbox tokens`.
pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints source-like text for tokens
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const RED: &'static str = "\x1b[31m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, tokens: &[Spanned]) -> String {
        let mut out = String::new();
        for s in tokens {
            self.write_one(&mut out, s);
        }
        out
    }

    fn write_one(&self, out: &mut String, s: &Spanned) {
        let line = s.start.line;
        let col = s.start.col;

        let kind = self.kind(&s.token);
        let colr = if self.color { self.color(&s.token) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        // Writing to a String cannot fail.
        let _ = if self.show_debug_repr {
            writeln!(
                out,
                "[{:02}:{:02}] {}{:<8} {:?}{}",
                line, col, colr, kind, s.token, reset
            )
        } else {
            match &s.token {
                Token::Whitespace(text) => writeln!(
                    out,
                    "[{:02}:{:02}] {}{:<8} {} newline(s){}",
                    line,
                    col,
                    colr,
                    kind,
                    text.matches('\n').count(),
                    reset
                ),
                _ => writeln!(
                    out,
                    "[{:02}:{:02}] {}{:<8} {}{}",
                    line, col, colr, kind, s.token, reset
                ),
            }
        };
    }

    fn kind(&self, t: &Token) -> &'static str {
        use Token::*;
        match t {
            Eof => "EOF",
            Missing { .. } => "MISSING",
            Char(_) => "CHAR",
            Whitespace(_) => "SPACE",
            Comment(_) => "COMMENT",

            Number(_) => "NUMBER",
            String(_) => "STRING",
            Bool(_) => "BOOL",

            Ident(_) => "IDENT",

            OpenBrace | CloseBrace => "BRACE",
            OpenBracket | CloseBracket => "BRACKET",
            Eq => "EQ",
        }
    }

    fn color(&self, t: &Token) -> &'static str {
        use Token::*;
        match t {
            Whitespace(_) | Comment(_) | Eof => Self::DIM,
            Missing { .. } | Char(_) => Self::RED,
            String(_) => Self::GRN,
            Number(_) | Bool(_) => Self::CYN,
            Ident(_) => Self::YEL,
            Eq => Self::MAG,
            OpenBrace | CloseBrace | OpenBracket | CloseBracket => Self::RESET,
        }
    }
}
