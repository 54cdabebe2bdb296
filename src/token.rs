use serde::Serialize;

/// A position in the source text.
///
/// Both fields are 1-based. `col` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn new(line: usize, col: usize) -> Self {
        Location { line, col }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location { line: 1, col: 1 }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A token together with the source range it was scanned from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spanned {
    pub token: Token,
    pub start: Location,
    pub end: Location,
}

impl Spanned {
    pub fn new(token: Token, start: Location, end: Location) -> Self {
        Spanned { token, start, end }
    }

    pub fn kind(&self) -> TokenKind {
        self.token.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Radix {
    Decimal,
    Binary,
    Octal,
    Hex,
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Decimal => 10,
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Hex => 16,
        }
    }

    /// Literal prefix that selects this radix (`""` for decimal).
    pub fn prefix(self) -> &'static str {
        match self {
            Radix::Decimal => "",
            Radix::Binary => "0b",
            Radix::Octal => "0o",
            Radix::Hex => "0x",
        }
    }

    pub fn accepts(self, ch: char) -> bool {
        match self {
            Radix::Decimal => ch.is_ascii_digit(),
            Radix::Binary => matches!(ch, '0' | '1'),
            Radix::Octal => matches!(ch, '0'..='7'),
            Radix::Hex => ch.is_ascii_hexdigit(),
        }
    }
}

/// A numeric literal as written in the source.
///
/// `raw` keeps the digits with their `_` separators, `value` has them
/// stripped. Neither contains the sign or the radix prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberLiteral {
    pub radix: Radix,
    pub value: String,
    pub raw: String,
    pub is_negative: bool,
}

impl NumberLiteral {
    /// Source spelling of the literal: sign, prefix and raw digits.
    pub fn source_text(&self) -> String {
        let sign = if self.is_negative { "-" } else { "" };
        format!("{}{}{}", sign, self.radix.prefix(), self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Comment {
    /// `// ...` up to the end of the line.
    SingleLine(String),
    /// `/* ... */`, split into lines. Nested markers are kept verbatim.
    MultiLine(Vec<String>),
}

impl Comment {
    pub fn is_single_line(&self) -> bool {
        matches!(self, Comment::SingleLine(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Token {
    Eof,

    /// Recovery marker for a token that was required but not found.
    Missing {
        expected: Expected,
        actual: Box<Spanned>,
    },

    /// A single raw character that starts no token. Only ever appears as the
    /// `actual` payload of a `Missing` token.
    Char(char),

    Whitespace(String),
    Comment(Comment),

    Ident(String),
    Number(NumberLiteral),
    String(Vec<String>),
    Bool(bool),

    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Eq,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Eof => TokenKind::Eof,
            Token::Missing { .. } => TokenKind::Missing,
            Token::Char(_) => TokenKind::Char,
            Token::Whitespace(_) => TokenKind::Whitespace,
            Token::Comment(_) => TokenKind::Comment,
            Token::Ident(_) => TokenKind::Ident,
            Token::Number(_) => TokenKind::Number,
            Token::String(_) => TokenKind::String,
            Token::Bool(_) => TokenKind::Bool,
            Token::OpenBrace => TokenKind::OpenBrace,
            Token::CloseBrace => TokenKind::CloseBrace,
            Token::OpenBracket => TokenKind::OpenBracket,
            Token::CloseBracket => TokenKind::CloseBracket,
            Token::Eq => TokenKind::Eq,
        }
    }

    /// Returns true if this token can begin an expression value.
    pub fn starts_value(&self) -> bool {
        matches!(
            self,
            Token::Number(_)
                | Token::String(_)
                | Token::Bool(_)
                | Token::OpenBrace
                | Token::OpenBracket
        )
    }
}

/// Payload-free discriminant of [`Token`], used for expectations and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Eof,
    Missing,
    Char,
    Whitespace,
    Comment,
    Ident,
    Number,
    String,
    Bool,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Eq,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Missing => "Missing",
            TokenKind::Char => "Char",
            TokenKind::Whitespace => "Whitespace",
            TokenKind::Comment => "Comment",
            TokenKind::Ident => "Ident",
            TokenKind::Number => "Number",
            TokenKind::String => "String",
            TokenKind::Bool => "Bool",
            TokenKind::OpenBrace => "OpenBrace",
            TokenKind::CloseBrace => "CloseBrace",
            TokenKind::OpenBracket => "OpenBracket",
            TokenKind::CloseBracket => "CloseBracket",
            TokenKind::Eq => "Eq",
        };
        write!(f, "{}", name)
    }
}

/// What a lexing call (or a `Missing` placeholder) was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Expected {
    Any,
    Token(TokenKind),
}

impl Expected {
    pub fn matches(self, kind: TokenKind) -> bool {
        match self {
            Expected::Any => true,
            Expected::Token(expected) => expected == kind,
        }
    }
}

impl From<TokenKind> for Expected {
    fn from(kind: TokenKind) -> Self {
        Expected::Token(kind)
    }
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Any => write!(f, "Any"),
            Expected::Token(kind) => write!(f, "{}", kind),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Eof => write!(f, "EOF"),
            Token::Missing { expected, actual } => {
                write!(f, "<missing {}, found {}>", expected, actual.token)
            }
            Token::Char(ch) => write!(f, "{:?}", ch),
            Token::Whitespace(s) => write!(f, "{:?}", s),
            Token::Comment(Comment::SingleLine(text)) => write!(f, "// {}", text),
            Token::Comment(Comment::MultiLine(lines)) => write!(f, "/* {} */", lines.join("\n")),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Number(n) => write!(f, "{}", n.source_text()),
            Token::String(lines) => write!(f, "{:?}", lines.join("\n")),
            Token::Bool(b) => write!(f, "{}", b),
            Token::OpenBrace => write!(f, "{{"),
            Token::CloseBrace => write!(f, "}}"),
            Token::OpenBracket => write!(f, "["),
            Token::CloseBracket => write!(f, "]"),
            Token::Eq => write!(f, "="),
        }
    }
}
