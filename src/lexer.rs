use tracing::trace;

use crate::diagnostic::Diagnostic;
use crate::token::{Comment, Expected, Location, NumberLiteral, Radix, Spanned, Token, TokenKind};

/// Saved scanner position used for speculative scans.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    line: usize,
    col: usize,
}

/// On-demand scanner for DotBox source text.
///
/// The lexer produces one token per call and never looks at grammar. Callers
/// drive it with:
/// - `lex(expected)`: scan the next token, recording an error (and returning a
///   `Missing` token) when it is not of the expected kind
/// - `peek(offset)`: scan ahead without moving the cursor or recording errors
/// - `try_lex(kind)`: consume the next token only if it is of `kind`
///
/// Whitespace is a token of its own so the parser can see line breaks.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    errors: Vec<Diagnostic>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            errors: Vec::new(),
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        Some(ch)
    }

    /// Location of the next unread character.
    pub fn location(&self) -> Location {
        Location {
            line: self.line,
            col: self.col,
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Diagnostic> {
        self.errors
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.line = checkpoint.line;
        self.col = checkpoint.col;
    }

    fn error(&mut self, message: impl Into<String>, start: Location, end: Location) {
        let diagnostic = Diagnostic::lexical(message, start, end);
        trace!(%diagnostic, "lexical error");
        self.errors.push(diagnostic);
    }

    /// Runs `scan` speculatively: the cursor is restored afterwards and any
    /// errors raised during the scan are discarded.
    fn lookahead<T>(&mut self, scan: impl FnOnce(&mut Self) -> T) -> T {
        let checkpoint = self.checkpoint();
        let errors = std::mem::take(&mut self.errors);

        let result = scan(self);

        self.restore(checkpoint);
        self.errors = errors;
        result
    }

    /// Returns the token `offset` positions ahead without consuming anything.
    pub fn peek(&mut self, offset: usize) -> Spanned {
        self.lookahead(|lexer| {
            let mut token = lexer.lex_any();
            for _ in 0..offset {
                token = lexer.lex_any();
            }
            token
        })
    }

    /// Consumes the next token, whatever it is.
    pub fn next(&mut self) {
        self.lex_any();
    }

    /// Scans the next token and checks it against `expected`.
    ///
    /// On a mismatch an error is recorded and a `Missing` token is returned.
    /// The offending token stays consumed; the caller resumes after it.
    pub fn lex(&mut self, expected: Expected) -> Spanned {
        let token = self.lex_any();

        if expected.matches(token.kind()) {
            return token;
        }

        // A token of the wrong kind is a grammar problem, not a scanning one.
        let diagnostic = Diagnostic::syntax(
            format!("Expected {} but got {}", expected, token.kind()),
            token.start,
            token.end,
        );
        trace!(%diagnostic, "token mismatch");
        self.errors.push(diagnostic);

        let (start, end) = (token.start, token.end);
        Spanned::new(
            Token::Missing {
                expected,
                actual: Box::new(token),
            },
            start,
            end,
        )
    }

    /// Like `lex`, but only advances when the next token is of `kind`.
    ///
    /// On a mismatch the cursor is left untouched and no error is recorded;
    /// the returned token is `Missing`.
    pub fn try_lex(&mut self, kind: TokenKind) -> Spanned {
        let token = self.lookahead(|lexer| lexer.lex(Expected::Token(kind)));

        if token.kind() == kind {
            self.next();
        }

        token
    }

    /// Scans the remaining input into a token list ending with `Eof`.
    pub fn tokenize(&mut self) -> Vec<Spanned> {
        let mut tokens = Vec::new();

        loop {
            let token = self.lex_any();
            let done = matches!(token.token, Token::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }

        tokens
    }

    fn lex_any(&mut self) -> Spanned {
        let start = self.location();

        let Some(ch) = self.current() else {
            return Spanned::new(Token::Eof, start, start);
        };

        match ch {
            c if c.is_whitespace() => self.read_whitespace(),
            '/' => self.read_comment(),
            '"' => self.read_string(),
            '-' | '0'..='9' => self.read_number(),
            '{' => self.read_punct(Token::OpenBrace),
            '}' => self.read_punct(Token::CloseBrace),
            '[' => self.read_punct(Token::OpenBracket),
            ']' => self.read_punct(Token::CloseBracket),
            '=' => self.read_punct(Token::Eq),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier(),
            c => {
                self.advance();
                let end = self.location();
                self.error(format!("Unexpected character '{}'.", c), start, end);
                missing(
                    Expected::Any,
                    Spanned::new(Token::Char(c), start, end),
                    start,
                    end,
                )
            }
        }
    }

    fn read_punct(&mut self, token: Token) -> Spanned {
        let start = self.location();
        self.advance();
        Spanned::new(token, start, self.location())
    }

    fn read_whitespace(&mut self) -> Spanned {
        let start = self.location();
        let mut text = String::new();

        while let Some(ch) = self.current() {
            if !ch.is_whitespace() {
                break;
            }
            text.push(ch);
            self.advance();
        }

        Spanned::new(Token::Whitespace(text), start, self.location())
    }

    fn read_comment(&mut self) -> Spanned {
        let start = self.location();
        self.advance(); // '/'

        match self.current() {
            Some('/') => self.read_line_comment(start),
            Some('*') => self.read_block_comment(start),
            Some(c) => {
                let end = self.location();
                self.error(
                    format!("Expected a comment marker but got '{}'.", c),
                    start,
                    end,
                );
                missing(
                    Expected::Token(TokenKind::Comment),
                    Spanned::new(Token::Char(c), end, end),
                    start,
                    end,
                )
            }
            None => {
                let end = self.location();
                self.error("Expected a comment marker but got end of file.", end, end);
                missing(
                    Expected::Token(TokenKind::Comment),
                    Spanned::new(Token::Eof, end, end),
                    start,
                    end,
                )
            }
        }
    }

    fn read_line_comment(&mut self, start: Location) -> Spanned {
        self.advance(); // second '/'

        if self.current() == Some(' ') {
            self.advance();
        }

        let mut text = String::new();
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.advance();
        }

        Spanned::new(
            Token::Comment(Comment::SingleLine(text)),
            start,
            self.location(),
        )
    }

    /// Reads a `/* ... */` comment. Inner `/*` markers open a nested level and
    /// are kept in the text together with their `*/`.
    fn read_block_comment(&mut self, start: Location) -> Spanned {
        self.advance(); // '*'

        if matches!(self.current(), Some(' ') | Some('\n')) {
            self.advance();
        }

        let mut depth = 0usize;
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut closed = false;

        loop {
            match (self.current(), self.peek_char()) {
                (None, _) => break,
                (Some('*'), Some('/')) => {
                    self.advance();
                    self.advance();
                    if depth == 0 {
                        closed = true;
                        break;
                    }
                    depth -= 1;
                    line.push_str("*/");
                }
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    depth += 1;
                    line.push_str("/*");
                }
                (Some('\n'), _) => {
                    self.advance();
                    lines.push(std::mem::take(&mut line));
                }
                (Some(ch), _) => {
                    self.advance();
                    line.push(ch);
                }
            }
        }

        if !line.is_empty() || lines.is_empty() {
            // A single space before the closing marker belongs to the marker.
            if !is_blank(&line) && line.ends_with(' ') {
                line.pop();
            }
            lines.push(line);
        }

        if !closed {
            let end = self.location();
            self.error("Expected a closing \"*/\", but got end of file.", end, end);
        }

        Spanned::new(
            Token::Comment(Comment::MultiLine(lines)),
            start,
            self.location(),
        )
    }

    /// Reads a string literal into its lines.
    ///
    /// A `|` that follows only whitespace at the start of a line is a margin
    /// marker: it and one following space are dropped, and the string becomes
    /// an indented multi-line string whose unmarked blank edge lines are
    /// discarded. `\` takes the next character literally.
    fn read_string(&mut self) -> Spanned {
        let start = self.location();
        self.advance(); // opening quote

        let mut lines: Vec<(String, bool)> = Vec::new();
        let mut line = String::new();
        let mut marked = false;
        let mut margin = false;
        let mut closed = false;

        loop {
            match self.current() {
                None => break,
                Some('"') => {
                    self.advance();
                    closed = true;
                    break;
                }
                Some('\n') => {
                    self.advance();
                    lines.push((std::mem::take(&mut line), marked));
                    marked = false;
                }
                Some('|')
                    if !marked && is_blank(&line) && (!line.is_empty() || !lines.is_empty()) =>
                {
                    self.advance();
                    line.clear();
                    marked = true;
                    margin = true;
                    if self.current() == Some(' ') {
                        self.advance();
                    }
                }
                Some('\\') => {
                    self.advance();
                    if let Some(ch) = self.advance() {
                        line.push(ch);
                    }
                }
                Some(ch) => {
                    self.advance();
                    line.push(ch);
                }
            }
        }

        if marked || (!line.is_empty() && !(margin && is_blank(&line))) {
            lines.push((line, marked));
        }

        if margin {
            while lines.first().is_some_and(|(l, m)| !m && is_blank(l)) {
                lines.remove(0);
            }
            while lines.last().is_some_and(|(l, m)| !m && is_blank(l)) {
                lines.pop();
            }
        }

        if !closed {
            let end = self.location();
            self.error("Expected a closing quote, but got end of file.", end, end);
        }

        Spanned::new(
            Token::String(lines.into_iter().map(|(l, _)| l).collect()),
            start,
            self.location(),
        )
    }

    fn read_number(&mut self) -> Spanned {
        let start = self.location();

        // Handle leading '-': keep it out of the digit buffers
        let is_negative = self.current() == Some('-');
        if is_negative {
            self.advance();

            match self.current() {
                Some(c) if c.is_ascii_digit() => {}
                other => {
                    let end = self.location();
                    let (actual, found) = match other {
                        Some(c) => (Token::Char(c), format!("'{}'", c)),
                        None => (Token::Eof, "end of file".to_string()),
                    };
                    self.error(
                        format!("Expected a number after '-' but got {}.", found),
                        start,
                        end,
                    );
                    return missing(
                        Expected::Token(TokenKind::Number),
                        Spanned::new(actual, end, end),
                        start,
                        end,
                    );
                }
            }
        }

        let radix = match (self.current(), self.peek_char()) {
            (Some('0'), Some('b')) => Radix::Binary,
            (Some('0'), Some('o')) => Radix::Octal,
            (Some('0'), Some('x')) => Radix::Hex,
            _ => Radix::Decimal,
        };

        if radix != Radix::Decimal {
            return self.read_prefixed_number(start, radix, is_negative);
        }

        let mut raw = String::new();
        let mut value = String::new();
        let mut has_dot = false;

        while let Some(ch) = self.current() {
            match ch {
                '.' if has_dot => {
                    self.error(
                        "Decimal numbers may not have more than one decimal point.",
                        start,
                        self.location(),
                    );
                    break;
                }
                '.' => has_dot = true,
                '_' => {}
                c if c.is_ascii_digit() => {}
                _ => break,
            }
            self.push_digit(ch, &mut raw, &mut value);
        }

        self.finish_number(start, radix, raw, value, is_negative)
    }

    fn read_prefixed_number(&mut self, start: Location, radix: Radix, is_negative: bool) -> Spanned {
        self.advance(); // '0'
        self.advance(); // 'b' | 'o' | 'x'

        match self.current() {
            Some(c) if radix.accepts(c) => {}
            Some(c) => {
                self.error(
                    format!(
                        "Expected {} literal but got \"{}\".",
                        radix_article(radix),
                        c.escape_debug()
                    ),
                    start,
                    self.location(),
                );
                return self.zero(start, radix, is_negative);
            }
            None => {
                self.error(
                    "Expected a number but got end of file.",
                    start,
                    self.location(),
                );
                return self.zero(start, radix, is_negative);
            }
        }

        let mut raw = String::new();
        let mut value = String::new();

        while let Some(ch) = self.current() {
            if !radix.accepts(ch) && ch != '_' {
                break;
            }
            self.push_digit(ch, &mut raw, &mut value);
        }

        self.finish_number(start, radix, raw, value, is_negative)
    }

    fn push_digit(&mut self, ch: char, raw: &mut String, value: &mut String) {
        let start = self.location();
        self.advance();

        if ch == '_' && raw.ends_with('_') {
            self.error(
                "Multiple underscores in number literals are not allowed.",
                start,
                self.location(),
            );
        }

        raw.push(ch);
        if ch != '_' {
            value.push(ch);
        }
    }

    fn finish_number(
        &mut self,
        start: Location,
        radix: Radix,
        raw: String,
        value: String,
        is_negative: bool,
    ) -> Spanned {
        if raw.ends_with('_') {
            let here = self.location();
            self.error("Numbers may not end with an underscore.", here, here);
        }

        Spanned::new(
            Token::Number(NumberLiteral {
                radix,
                value,
                raw,
                is_negative,
            }),
            start,
            self.location(),
        )
    }

    /// Placeholder literal for a radix prefix with no digits after it.
    fn zero(&self, start: Location, radix: Radix, is_negative: bool) -> Spanned {
        Spanned::new(
            Token::Number(NumberLiteral {
                radix,
                value: "0".to_string(),
                raw: "0".to_string(),
                is_negative,
            }),
            start,
            self.location(),
        )
    }

    fn read_identifier(&mut self) -> Spanned {
        let start = self.location();
        let mut ident = String::new();

        while let Some(ch) = self.current() {
            if ch.is_ascii_alphabetic() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current() == Some('?') {
            ident.push('?');
            self.advance();
        }

        let token = match ident.as_str() {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            _ => Token::Ident(ident),
        };

        Spanned::new(token, start, self.location())
    }
}

fn missing(expected: Expected, actual: Spanned, start: Location, end: Location) -> Spanned {
    Spanned::new(
        Token::Missing {
            expected,
            actual: Box::new(actual),
        },
        start,
        end,
    )
}

fn radix_article(radix: Radix) -> &'static str {
    match radix {
        Radix::Decimal => "a decimal",
        Radix::Binary => "a binary",
        Radix::Octal => "an octal",
        Radix::Hex => "a hex",
    }
}

pub(crate) fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}
