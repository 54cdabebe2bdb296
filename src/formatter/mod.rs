//! Canonical text rendering for DotBox documents.
//!
//! Layout rules:
//! - One tab per nesting level. Non-empty `{ }` and `[ ]` always span several
//!   lines; empty ones render as `{ }` and `[ ]`.
//! - A single blank line separates siblings that had at least one blank line
//!   between them in the source.
//! - Strings with more than one line use the `|` margin form.
//! - Numbers keep their source spelling.

mod line_writer;

pub use line_writer::LineWriter;

use crate::ast::{
    Attr, AttrExpr, AttrName, AttrNode, CommentNode, Expr, List, ListItem, Root, SubExpr,
    SubExprValue,
};
use crate::lexer::is_blank;
use crate::token::Comment;

/// Longest post-name comment that stays on the name's line.
const INLINE_NAME_COMMENT_WIDTH: usize = 40;

/// Standalone `/* */` comments shorter than this stay on one line.
const SINGLE_LINE_COMMENT_WIDTH: usize = 120;

/// Renders `root` as canonical text without a trailing newline.
///
/// Attributes whose name or expression is `Missing` are left out.
pub fn format_root(root: &Root) -> String {
    let mut out = LineWriter::new();
    write_attr_nodes(&mut out, &root.nodes);
    out.finish()
}

fn write_attr_nodes(out: &mut LineWriter, nodes: &[AttrNode]) {
    for (i, node) in nodes.iter().enumerate() {
        match node {
            AttrNode::Attr(attr) => write_attr(out, attr),
            AttrNode::Comment(comment) => write_comment(out, comment),
        }

        if let Some(next) = nodes.get(i + 1) {
            if next.start().line.saturating_sub(node.end().line) > 1 {
                out.blank();
            }
        }
    }
}

fn write_attr(out: &mut LineWriter, attr: &Attr) {
    let AttrExpr::Expr(expr) = &attr.expr else {
        return;
    };
    let Some(mut head) = render_name(&attr.name) else {
        return;
    };

    for comment in &attr.pre_name_comments {
        write_comment(out, comment);
    }

    let value = render_value(expr);

    if is_stacked(&attr.post_name_comments) {
        out.import(head);
        out.indent();
        for comment in &attr.post_name_comments {
            write_comment(out, comment);
        }
        out.line("=");
        for comment in &expr.pre_expr_comments {
            write_comment(out, comment);
        }
        out.import(value);
        out.dedent();
        return;
    }

    if let Some(comment) = attr.post_name_comments.first() {
        head.append(" ");
        head.append(inline_comment(&comment.comment));
    }

    if !expr.pre_expr_comments.is_empty() || is_multiline_string(&expr.value) {
        head.append(" =");
        out.import(head);
        out.indent();
        for comment in &expr.pre_expr_comments {
            write_comment(out, comment);
        }
        out.import(value);
        out.dedent();
    } else {
        head.append(" = ");
        out.import(head);
        out.import_joined(value);
    }
}

fn render_name(name: &AttrName) -> Option<LineWriter> {
    let mut w = LineWriter::new();

    match name {
        AttrName::Ident(ident) => w.line(&ident.value),
        AttrName::String(string) => write_string(&mut w, &string.lines),
        AttrName::Missing(_) => return None,
    }

    Some(w)
}

/// Post-name comments move `=` and the value onto their own lines unless
/// there is exactly one short single-line `/* */` comment.
fn is_stacked(comments: &[CommentNode]) -> bool {
    match comments {
        [] => false,
        [comment] => match &comment.comment {
            Comment::SingleLine(_) => true,
            Comment::MultiLine(lines) => {
                let lines = normalize_comment_lines(lines);
                lines.len() > 1
                    || lines
                        .first()
                        .is_some_and(|line| line.chars().count() > INLINE_NAME_COMMENT_WIDTH)
            }
        },
        _ => true,
    }
}

fn is_multiline_string(sub_expr: &SubExpr) -> bool {
    match &sub_expr.value {
        SubExprValue::String(string) => string_lines(&string.lines).len() > 1,
        _ => false,
    }
}

/// String lines as they will be written. An escaped newline inside a line
/// starts a new one.
fn string_lines(lines: &[String]) -> Vec<&str> {
    lines.iter().flat_map(|line| line.split('\n')).collect()
}

/// Renders a value together with its same-line trailing comment.
fn render_value(expr: &Expr) -> LineWriter {
    let mut w = LineWriter::new();

    match &expr.value.value {
        SubExprValue::Number(number) => w.line(number.literal.source_text()),
        SubExprValue::String(string) => write_string(&mut w, &string.lines),
        SubExprValue::Bool(boolean) => w.line(if boolean.value { "true" } else { "false" }),
        SubExprValue::Attrs(attrs) if attrs.nodes.is_empty() => w.line("{ }"),
        SubExprValue::Attrs(attrs) => {
            w.line("{");
            w.indent();
            write_attr_nodes(&mut w, &attrs.nodes);
            w.dedent();
            w.line("}");
        }
        SubExprValue::List(list) if list.items.is_empty() => w.line("[ ]"),
        SubExprValue::List(list) => {
            w.line("[");
            w.indent();
            write_list_items(&mut w, list);
            w.dedent();
            w.line("]");
        }
        SubExprValue::Missing(_) => {}
    }

    if let Some(comment) = &expr.post_expr_comment {
        write_trailing_comment(&mut w, &comment.comment);
    }

    w
}

fn write_list_items(out: &mut LineWriter, list: &List) {
    for (i, item) in list.items.iter().enumerate() {
        match item {
            ListItem::Expr(expr) => {
                for comment in &expr.pre_expr_comments {
                    write_comment(out, comment);
                }
                out.import(render_value(expr));
            }
            ListItem::Comment(comment) => write_comment(out, comment),
        }

        if let Some(next) = list.items.get(i + 1) {
            if next.start().line.saturating_sub(item.end().line) > 1 {
                out.blank();
            }
        }
    }
}

fn write_string(out: &mut LineWriter, lines: &[String]) {
    match string_lines(lines).as_slice() {
        [] => out.line("\"\""),
        [line] => out.line(format!("\"{}\"", escape_string_line(line))),
        lines => {
            out.line("\"");
            for line in lines {
                if line.is_empty() {
                    out.line("|");
                } else {
                    out.line(format!("| {}", escape_string_line(line)));
                }
            }
            out.line("\"");
        }
    }
}

/// Escapes `\`, `"` and any `|` that would read as a margin marker.
fn escape_string_line(line: &str) -> String {
    let mut escaped = String::with_capacity(line.len());
    let mut leading = true;

    for ch in line.chars() {
        match ch {
            '\\' | '"' => escaped.push('\\'),
            '|' if leading => escaped.push('\\'),
            _ => {}
        }
        escaped.push(ch);
        leading = leading && ch.is_whitespace();
    }

    escaped
}

/// Comment lines without leading tab runs and without blank first or last
/// lines.
fn normalize_comment_lines(lines: &[String]) -> Vec<&str> {
    let mut lines: Vec<&str> = lines
        .iter()
        .map(|line| line.trim_start_matches('\t'))
        .collect();

    while lines.first().is_some_and(|line| is_blank(line)) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|line| is_blank(line)) {
        lines.pop();
    }

    lines
}

fn line_comment(text: &str) -> String {
    if text.is_empty() {
        "//".to_string()
    } else {
        format!("// {}", text)
    }
}

/// A comment that has a line of its own.
fn write_comment(out: &mut LineWriter, comment: &CommentNode) {
    match &comment.comment {
        Comment::SingleLine(text) => out.line(line_comment(text)),
        Comment::MultiLine(lines) => match normalize_comment_lines(lines).as_slice() {
            [] => out.line("/* */"),
            [line] if line.chars().count() < SINGLE_LINE_COMMENT_WIDTH => {
                out.line(format!("/* {} */", line))
            }
            lines => {
                out.line("/*");
                out.indent();
                for line in lines {
                    out.line(line);
                }
                out.dedent();
                out.line("*/");
            }
        },
    }
}

/// A short comment placed after a name, on the same line.
fn inline_comment(comment: &Comment) -> String {
    match comment {
        Comment::SingleLine(text) => line_comment(text),
        Comment::MultiLine(lines) => match normalize_comment_lines(lines).first() {
            Some(line) => format!("/* {} */", line),
            None => "/* */".to_string(),
        },
    }
}

/// A comment continuing the last line of a value.
fn write_trailing_comment(out: &mut LineWriter, comment: &Comment) {
    match comment {
        Comment::SingleLine(text) => out.append(format!(" {}", line_comment(text))),
        Comment::MultiLine(lines) => match normalize_comment_lines(lines).as_slice() {
            [] => out.append(" /* */"),
            [line] => out.append(format!(" /* {} */", line)),
            lines => {
                out.append(" /*");
                out.indent();
                for line in lines {
                    out.line(line);
                }
                out.dedent();
                out.line("*/");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn format(source: &str) -> String {
        let output = Parser::new(source).parse();
        assert!(
            output.diagnostics.is_empty(),
            "unexpected diagnostics: {:?}",
            output.diagnostics
        );
        format_root(&output.root)
    }

    // --------------------
    // Whitespace
    // --------------------

    #[test]
    fn test_empty_containers_inline() {
        assert_eq!(format("x = {\n\n}"), "x = { }");
        assert_eq!(format("a = [\n\n]"), "a = [ ]");
    }

    #[test]
    fn test_containers_expand() {
        let source = r#"x = { /* a note */ some_key = 42 /* a comment */ some_other_key = "hello, world" /* something important */ }"#;
        let expected = "x = {\n\t/* a note */\n\tsome_key = 42 /* a comment */\n\tsome_other_key = \"hello, world\" /* something important */\n}";
        assert_eq!(format(source), expected);
    }

    #[test]
    fn test_blank_lines_kept_once() {
        assert_eq!(format("a = 1\n\nb = 2\nc = 3\n\nd = 4"), "a = 1\n\nb = 2\nc = 3\n\nd = 4");
        assert_eq!(
            format("// Comment\n\n\na = 1\n\n\n\n\nb = 2\n\nc = 3\n"),
            "// Comment\n\na = 1\n\nb = 2\n\nc = 3"
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(format(""), "");
        assert_eq!(format("\n\n  \n"), "");
    }

    // --------------------
    // Values
    // --------------------

    #[test]
    fn test_numbers_keep_spelling() {
        let source = "a = -1_000.000\nb = 0b0000_0000\nc = -0o0123_4567\nd = 0xdead_beef";
        assert_eq!(format(source), source);
    }

    #[test]
    fn test_single_line_string() {
        assert_eq!(format("a = \"hello world\""), "a = \"hello world\"");
        assert_eq!(format("a = \"\""), "a = \"\"");
    }

    #[test]
    fn test_multi_line_strings() {
        let source = "a = \"hello\nworld\"\n\nb =\n\t\"\n\t| hello\n\t| world\n\t\"";
        let expected = "a =\n\t\"\n\t| hello\n\t| world\n\t\"\n\nb =\n\t\"\n\t| hello\n\t| world\n\t\"";
        assert_eq!(format(source), expected);
    }

    #[test]
    fn test_escaped_newline_uses_margin_form() {
        let formatted = format("a = \"x\\\ny\"");
        assert_eq!(formatted, "a =\n\t\"\n\t| x\n\t| y\n\t\"");
        assert_eq!(format(&formatted), formatted);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(format(r#"a = "say \"hi\" \\""#), r#"a = "say \"hi\" \\""#);
        assert_eq!(format("a = \"  \\|x\""), "a = \"  \\|x\"");
    }

    #[test]
    fn test_bools() {
        assert_eq!(format("a = true\nb   =   false"), "a = true\nb = false");
    }

    #[test]
    fn test_nested_attrs() {
        let source = "a = {\n\tx = 1\n\n\ty = {\n\t\t\"z\" = true\n\n\t\t\"\n\t\t| hello\n\t\t| world\n\t\t\" = false\n\t}\n}";
        assert_eq!(format(source), source);
    }

    #[test]
    fn test_lists() {
        let source = "a = [\"hello\" \"world\"]\n\nb = [\n1\ntrue\n\"three\"\n[ \"sublist\" ]\n{ x = \"subattrs\" }\n]";
        let expected = "a = [\n\t\"hello\"\n\t\"world\"\n]\n\nb = [\n\t1\n\ttrue\n\t\"three\"\n\t[\n\t\t\"sublist\"\n\t]\n\t{\n\t\tx = \"subattrs\"\n\t}\n]";
        assert_eq!(format(source), expected);
    }

    // --------------------
    // Comments
    // --------------------

    #[test]
    fn test_single_line_comment() {
        assert_eq!(format("  // hello\n"), "// hello");
        assert_eq!(format("//"), "//");
    }

    #[test]
    fn test_multi_line_comments() {
        let source = "/* hello */\n\n/*\n\t\t\thello\n\t\t\tworld\n*/";
        assert_eq!(format(source), "/* hello */\n\n/*\n\thello\n\tworld\n*/");
    }

    #[test]
    fn test_long_comment_uses_block_form() {
        let text = "x".repeat(SINGLE_LINE_COMMENT_WIDTH);
        let formatted = format(&format!("/* {} */", text));
        assert_eq!(formatted, format!("/*\n\t{}\n*/", text));
    }

    #[test]
    fn test_post_name_comments() {
        let source = "a /* hello */ = true\n\nb // world\n\t= true";
        assert_eq!(
            format(source),
            "a /* hello */ = true\n\nb\n\t// world\n\t=\n\ttrue"
        );
    }

    #[test]
    fn test_long_post_name_comment_stacks() {
        let source = format!("a /* {} */ = 1", "y".repeat(41));
        assert_eq!(
            format(&source),
            format!("a\n\t/* {} */\n\t=\n\t1", "y".repeat(41))
        );
    }

    #[test]
    fn test_post_expression_comments() {
        let source = "a = true // hello\n\nb = true /*\n\thello\n\n*/\n\nc = true /*\n\thello\n\n\tworld\n*/";
        let expected = "a = true // hello\n\nb = true /* hello */\n\nc = true /*\n\thello\n\n\tworld\n*/";
        assert_eq!(format(source), expected);
    }

    #[test]
    fn test_pre_expression_comment() {
        assert_eq!(format("a = /* lead */ 1"), "a =\n\t/* lead */\n\t1");
    }

    #[test]
    fn test_comments_inside_list() {
        let source = "a = [ // first\n1 /* one */\n\n// gap\n2 ]";
        let expected = "a = [\n\t// first\n\t1 /* one */\n\n\t// gap\n\t2\n]";
        assert_eq!(format(source), expected);
    }

    #[test]
    fn test_trailing_comment_after_container() {
        let source = "a = { b = 1 } // done";
        assert_eq!(format(source), "a = {\n\tb = 1\n} // done");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let source = "a /* n */ = { b = [1 2 /* two */] // t\n\n\nc // s\n= \"x\ny\" }\n/*\n  block\n*/\nd = -0x1_f";
        let once = format(source);
        assert_eq!(format(&once), once);
    }

    #[test]
    fn test_escape_string_line() {
        assert_eq!(escape_string_line(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_string_line(" \t|a|b"), " \t\\|a|b");
        assert_eq!(escape_string_line("x|"), "x|");
    }
}
