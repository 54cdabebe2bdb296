use tracing::trace;

use crate::ast::{
    Attr, AttrExpr, AttrName, AttrNode, Attrs, BoolNode, CommentNode, Expr, Ident, List, ListItem,
    Missing, NumberNode, Root, StringNode, SubExpr, SubExprValue,
};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::lexer::Lexer;
use crate::token::{Expected, Location, Token, TokenKind};

/// Result of parsing one document: the tree and everything that went wrong
/// while building it.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub root: Root,
    pub diagnostics: Diagnostics,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Error-recovering recursive-descent parser for DotBox.
///
/// The parser pulls tokens from its own [`Lexer`] on demand and always
/// produces a [`Root`]. Malformed constructs are represented in place by
/// [`Missing`] nodes and reported through [`ParseOutput::diagnostics`];
/// parsing of sibling nodes continues after an error.
///
/// Notes:
/// - Comments are kept in the tree. Comments before a value are attached to
///   its expression; a comment on the same line after a value becomes that
///   expression's trailing comment; anything else is a standalone node.
/// - Unrecognized tokens inside an attribute body are skipped without an error.
/// - Nesting is parsed recursively with no depth limit. Tens of thousands of
///   nested `[` or `{` exhaust the stack.
pub struct Parser {
    lexer: Lexer,
    errors: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            errors: Vec::new(),
        }
    }

    fn error(&mut self, message: impl Into<String>, start: Location, end: Location) {
        let diagnostic = Diagnostic::syntax(message, start, end);
        trace!(%diagnostic, "syntax error");
        self.errors.push(diagnostic);
    }

    /// Parses the whole document.
    ///
    /// Diagnostics are ordered lexical first, then syntax, each group in
    /// source order.
    pub fn parse(mut self) -> ParseOutput {
        let root = self.parse_root();
        let diagnostics = Diagnostics::new(self.lexer.into_errors(), self.errors);

        ParseOutput { root, diagnostics }
    }

    /// Parses top-level attributes until end of input.
    ///
    /// # Errors
    /// - A `}` with no matching `{` is reported, consumed, and parsing resumes.
    fn parse_root(&mut self) -> Root {
        let start = self.lexer.location();
        let mut nodes = Vec::new();

        loop {
            nodes.extend(self.parse_attr_nodes());

            let token = self.lexer.peek(0);
            if !matches!(token.token, Token::CloseBrace) {
                break;
            }

            self.error(
                format!("Unexpected {} at top level", token.kind()),
                token.start,
                token.end,
            );
            self.lexer.next();
        }

        let end = self.lexer.location();
        Root { nodes, start, end }
    }

    /// Parses the entries of an attribute body, stopping before `}` or at end
    /// of input.
    fn parse_attr_nodes(&mut self) -> Vec<AttrNode> {
        let mut nodes = Vec::new();

        loop {
            let token = self.lexer.peek(0);

            match token.token {
                Token::Eof | Token::CloseBrace => break,
                Token::Ident(_) | Token::String(_) => {
                    let attr = self.parse_attr();
                    nodes.push(AttrNode::Attr(attr));
                }
                Token::Comment(comment) => {
                    self.lexer.next();
                    nodes.push(AttrNode::Comment(CommentNode::new(
                        comment, token.start, token.end,
                    )));
                }
                Token::Whitespace(_) => self.lexer.next(),
                other => {
                    trace!(token = %other, at = %token.start, "skipping token in attribute body");
                    self.lexer.next();
                }
            }
        }

        nodes
    }

    /// Parses `name = value`:
    ///
    /// ```text
    /// <comments> <name> <comments> = <expr>
    /// ```
    ///
    /// # Errors
    /// - If `=` is not found after the name and its comments.
    /// - If no value follows `=`. The attribute's expression is then `Missing`.
    fn parse_attr(&mut self) -> Attr {
        let pre_name_comments = self.parse_comments();

        let name = self.parse_attr_name();

        self.lexer.try_lex(TokenKind::Whitespace);

        let post_name_comments = self.parse_comments();

        self.lexer.try_lex(TokenKind::Whitespace);

        self.lexer.lex(Expected::Token(TokenKind::Eq));

        self.lexer.try_lex(TokenKind::Whitespace);

        let expr = self.parse_expr();
        let expr = if let SubExprValue::Missing(missing) = &expr.value.value {
            AttrExpr::Missing(missing.clone())
        } else {
            AttrExpr::Expr(expr)
        };

        let start = match &name {
            AttrName::Ident(ident) => ident.start,
            AttrName::String(string) => string.start,
            AttrName::Missing(missing) => missing.start,
        };
        let end = expr.end();

        Attr {
            pre_name_comments,
            name,
            post_name_comments,
            expr,
            start,
            end,
        }
    }

    fn parse_attr_name(&mut self) -> AttrName {
        let token = self.lexer.peek(0);

        match token.token {
            Token::Ident(value) => {
                self.lexer.next();
                AttrName::Ident(Ident {
                    value,
                    start: token.start,
                    end: token.end,
                })
            }
            Token::String(lines) => {
                self.lexer.next();
                AttrName::String(StringNode {
                    lines,
                    start: token.start,
                    end: token.end,
                })
            }
            _ => AttrName::Missing(Missing::from_token(
                Expected::Token(TokenKind::Ident),
                token,
            )),
        }
    }

    /// Collects consecutive comments, each with the whitespace after it.
    fn parse_comments(&mut self) -> Vec<CommentNode> {
        let mut comments = Vec::new();

        loop {
            let token = self.lexer.peek(0);
            let Token::Comment(comment) = token.token else {
                break;
            };

            self.lexer.next();
            comments.push(CommentNode::new(comment, token.start, token.end));

            self.lexer.try_lex(TokenKind::Whitespace);
        }

        comments
    }

    /// Parses a value with its leading comments and, when one starts on the
    /// same line, its trailing comment.
    fn parse_expr(&mut self) -> Expr {
        let pre_expr_comments = self.parse_comments();

        let value = self.parse_sub_expr();

        let whitespace = self.lexer.try_lex(TokenKind::Whitespace);

        let post_expr_comment = match whitespace.token {
            Token::Whitespace(text) if !text.contains('\n') => {
                let token = self.lexer.try_lex(TokenKind::Comment);
                match token.token {
                    Token::Comment(comment) => {
                        Some(CommentNode::new(comment, token.start, token.end))
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        let start = value.start;
        let end = post_expr_comment
            .as_ref()
            .map_or(value.end, |comment| comment.end);

        Expr {
            pre_expr_comments,
            value,
            post_expr_comment,
            start,
            end,
        }
    }

    /// Parses a single value.
    ///
    /// # Errors
    /// - If the next token cannot start a value. The token is left unconsumed.
    fn parse_sub_expr(&mut self) -> SubExpr {
        let token = self.lexer.peek(0);
        let (start, end) = (token.start, token.end);

        match token.token {
            Token::Number(literal) => {
                self.lexer.next();
                SubExpr {
                    value: SubExprValue::Number(NumberNode {
                        literal,
                        start,
                        end,
                    }),
                    start,
                    end,
                }
            }
            Token::String(lines) => {
                self.lexer.next();
                SubExpr {
                    value: SubExprValue::String(StringNode { lines, start, end }),
                    start,
                    end,
                }
            }
            Token::Bool(value) => {
                self.lexer.next();
                SubExpr {
                    value: SubExprValue::Bool(BoolNode { value, start, end }),
                    start,
                    end,
                }
            }
            Token::OpenBrace => {
                let attrs = self.parse_attrs();
                let (start, end) = (attrs.start, attrs.end);
                SubExpr {
                    value: SubExprValue::Attrs(attrs),
                    start,
                    end,
                }
            }
            Token::OpenBracket => {
                let list = self.parse_list();
                let (start, end) = (list.start, list.end);
                SubExpr {
                    value: SubExprValue::List(list),
                    start,
                    end,
                }
            }
            _ => {
                let missing = Missing::from_token(Expected::Any, token);
                self.error(
                    format!("Expected a value but got {}", missing.actual.kind()),
                    missing.start,
                    missing.end,
                );
                SubExpr {
                    value: SubExprValue::Missing(missing),
                    start,
                    end,
                }
            }
        }
    }

    /// Parses `{ ... }`.
    ///
    /// # Errors
    /// - If the closing `}` is missing. The node then ends where scanning
    ///   stopped.
    fn parse_attrs(&mut self) -> Attrs {
        let open = self.lexer.lex(Expected::Token(TokenKind::OpenBrace));

        let nodes = if matches!(self.lexer.peek(0).token, Token::CloseBrace) {
            Vec::new()
        } else {
            self.parse_attr_nodes()
        };

        let close = self.lexer.lex(Expected::Token(TokenKind::CloseBrace));

        Attrs {
            nodes,
            start: open.start,
            end: close.end,
        }
    }

    /// Parses `[ ... ]`.
    ///
    /// Items are values and comments. Scanning stops at `]`, at end of input,
    /// or at the first token that cannot start a value.
    ///
    /// # Errors
    /// - If the closing `]` is not found where scanning stopped.
    fn parse_list(&mut self) -> List {
        let open = self.lexer.lex(Expected::Token(TokenKind::OpenBracket));

        let mut items = Vec::new();

        loop {
            let token = self.lexer.peek(0);

            match &token.token {
                Token::Missing { .. } | Token::Eof | Token::CloseBracket => break,
                Token::Comment(_) => {
                    items.extend(self.parse_comments().into_iter().map(ListItem::Comment));
                }
                Token::Whitespace(_) => self.lexer.next(),
                t if t.starts_value() => {
                    let expr = self.parse_expr();
                    if !expr.value.value.is_missing() {
                        items.push(ListItem::Expr(expr));
                    }
                }
                _ => break,
            }
        }

        let close = self.lexer.lex(Expected::Token(TokenKind::CloseBracket));

        List {
            items,
            start: open.start,
            end: close.end,
        }
    }
}
