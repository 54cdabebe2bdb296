use tracing::trace;

use crate::ast::{AttrExpr, AttrName, AttrNode, List, ListItem, Root, SubExpr, SubExprValue};
use crate::lang::value::{Map, Number, Value};
use crate::token::{NumberLiteral, Radix};

/// Reduces a parsed document to its value.
///
/// Attributes whose name or expression is `Missing` are left out of the
/// resulting mapping, as are list items without a value. Comments never reach
/// the value. When a name repeats, the later value wins and keeps the first
/// position.
pub fn compile_root(root: &Root) -> Value {
    Value::Map(compile_attr_nodes(&root.nodes))
}

fn compile_attr_nodes(nodes: &[AttrNode]) -> Map {
    let mut map = Map::new();

    for node in nodes {
        let AttrNode::Attr(attr) = node else {
            continue;
        };

        let name = match &attr.name {
            AttrName::Ident(ident) => ident.value.clone(),
            AttrName::String(string) => string.lines.join("\n"),
            AttrName::Missing(_) => continue,
        };

        let AttrExpr::Expr(expr) = &attr.expr else {
            continue;
        };

        let Some(value) = compile_sub_expr(&expr.value) else {
            continue;
        };

        if map.insert(name.as_str(), value).is_some() {
            trace!(key = %name, at = %attr.start, "attribute replaces an earlier value");
        }
    }

    map
}

/// Value of a single expression, or `None` for a `Missing` hole.
pub fn compile_sub_expr(sub_expr: &SubExpr) -> Option<Value> {
    let value = match &sub_expr.value {
        SubExprValue::Number(number) => Value::Number(number_value(&number.literal)),
        SubExprValue::String(string) => Value::String(string.lines.join("\n")),
        SubExprValue::Bool(boolean) => Value::Bool(boolean.value),
        SubExprValue::Attrs(attrs) => Value::Map(compile_attr_nodes(&attrs.nodes)),
        SubExprValue::List(list) => Value::List(compile_list(list)),
        SubExprValue::Missing(_) => return None,
    };

    Some(value)
}

fn compile_list(list: &List) -> Vec<Value> {
    list.items
        .iter()
        .filter_map(|item| match item {
            ListItem::Expr(expr) => compile_sub_expr(&expr.value),
            ListItem::Comment(_) => None,
        })
        .collect()
}

/// Numeric value of a literal in its own radix, with the sign applied.
pub fn number_value(literal: &NumberLiteral) -> Number {
    if literal.radix == Radix::Decimal && literal.value.contains('.') {
        let magnitude = literal.value.parse::<f64>().unwrap_or(f64::INFINITY);
        return Number::Float(if literal.is_negative {
            -magnitude
        } else {
            magnitude
        });
    }

    match u64::from_str_radix(&literal.value, literal.radix.base()) {
        Ok(magnitude) if literal.is_negative => {
            // i64::MIN has no positive counterpart, go through i128.
            match i64::try_from(-i128::from(magnitude)) {
                Ok(n) => Number::Integer(n),
                Err(_) => Number::Float(-(magnitude as f64)),
            }
        }
        Ok(magnitude) => match i64::try_from(magnitude) {
            Ok(n) => Number::Integer(n),
            Err(_) => Number::Float(magnitude as f64),
        },
        Err(_) => {
            let magnitude = fold_digits(&literal.value, literal.radix.base());
            Number::Float(if literal.is_negative {
                -magnitude
            } else {
                magnitude
            })
        }
    }
}

/// Approximates a digit string too long for `u64`.
fn fold_digits(digits: &str, base: u32) -> f64 {
    digits
        .chars()
        .filter_map(|ch| ch.to_digit(base))
        .fold(0.0, |acc, digit| acc * f64::from(base) + f64::from(digit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Attr, Expr, Ident, Missing, NumberNode};
    use crate::parser::Parser;
    use crate::token::{Expected, Location, Spanned, Token, TokenKind};
    use serde_json::json;

    fn compile_value(source: &str) -> Value {
        let output = Parser::new(source).parse();
        assert!(
            output.diagnostics.is_empty(),
            "unexpected diagnostics: {:?}",
            output.diagnostics
        );
        compile_root(&output.root)
    }

    fn compile(source: &str) -> serde_json::Value {
        serde_json::to_value(compile_value(source)).unwrap()
    }

    fn keys(value: &Value) -> Vec<&str> {
        value.as_map().map(|map| map.keys().collect()).unwrap_or_default()
    }

    fn literal(radix: Radix, value: &str, is_negative: bool) -> NumberLiteral {
        NumberLiteral {
            radix,
            value: value.to_string(),
            raw: value.to_string(),
            is_negative,
        }
    }

    fn loc() -> Location {
        Location::default()
    }

    fn missing(kind: TokenKind) -> Missing {
        Missing {
            expected: Expected::Token(kind),
            actual: Box::new(Spanned::new(Token::Eof, loc(), loc())),
            start: loc(),
            end: loc(),
        }
    }

    fn number_expr(n: &str) -> AttrExpr {
        let node = NumberNode {
            literal: literal(Radix::Decimal, n, false),
            start: loc(),
            end: loc(),
        };
        AttrExpr::Expr(Expr {
            pre_expr_comments: vec![],
            value: SubExpr {
                value: SubExprValue::Number(node),
                start: loc(),
                end: loc(),
            },
            post_expr_comment: None,
            start: loc(),
            end: loc(),
        })
    }

    fn attr(name: AttrName, expr: AttrExpr) -> AttrNode {
        AttrNode::Attr(Attr {
            pre_name_comments: vec![],
            name,
            post_name_comments: vec![],
            expr,
            start: loc(),
            end: loc(),
        })
    }

    fn ident(value: &str) -> AttrName {
        AttrName::Ident(Ident {
            value: value.to_string(),
            start: loc(),
            end: loc(),
        })
    }

    // --------------------
    // Documents
    // --------------------

    #[test]
    fn test_compile_example_document() {
        let value = compile("a = 1\nb = [1 true \"x\"]\n// note\nc = { d = true }");
        assert_eq!(
            value,
            json!({ "a": 1, "b": [1, true, "x"], "c": { "d": true } })
        );
    }

    #[test]
    fn test_compile_keeps_key_order() {
        let value = compile_value("z = 1\na = 2\nm = 3");
        assert_eq!(keys(&value), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_comments_are_not_values() {
        let value = compile("/* lead */\na /* n */ = /* v */ [\n\t// c\n\t1 // t\n]");
        assert_eq!(value, json!({ "a": [1] }));
    }

    #[test]
    fn test_string_name_and_lines() {
        let value = compile("\"a b\" = \"\n\t| one\n\t| two\n\t\"");
        assert_eq!(value, json!({ "a b": "one\ntwo" }));
    }

    #[test]
    fn test_duplicate_key_replaces_value() {
        let value = compile_value("a = 1\nb = 2\na = 3");
        assert_eq!(keys(&value), vec!["a", "b"]);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({ "a": 3, "b": 2 }));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(compile(""), json!({}));
        assert_eq!(compile("// only a comment"), json!({}));
    }

    // --------------------
    // Drop rule
    // --------------------

    #[test]
    fn test_incomplete_attrs_are_dropped() {
        let root = Root {
            nodes: vec![
                attr(AttrName::Missing(missing(TokenKind::Ident)), number_expr("1")),
                attr(ident("b"), AttrExpr::Missing(missing(TokenKind::Number))),
                attr(ident("c"), number_expr("3")),
            ],
            start: loc(),
            end: loc(),
        };

        let value = serde_json::to_value(compile_root(&root)).unwrap();
        assert_eq!(value, json!({ "c": 3 }));
        assert_eq!(root.nodes.len(), 3);
    }

    // --------------------
    // Numbers
    // --------------------

    #[test]
    fn test_radix_values() {
        assert_eq!(number_value(&literal(Radix::Binary, "0010", false)), Number::Integer(2));
        assert_eq!(number_value(&literal(Radix::Octal, "0755", false)), Number::Integer(493));
        assert_eq!(number_value(&literal(Radix::Hex, "dEaD", false)), Number::Integer(57005));
        assert_eq!(number_value(&literal(Radix::Decimal, "1000", true)), Number::Integer(-1000));
    }

    #[test]
    fn test_fractional_decimal() {
        assert_eq!(number_value(&literal(Radix::Decimal, "1.5", false)), Number::Float(1.5));
        assert_eq!(number_value(&literal(Radix::Decimal, "0.25", true)), Number::Float(-0.25));
        assert_eq!(number_value(&literal(Radix::Decimal, "2.", false)), Number::Float(2.0));
    }

    #[test]
    fn test_integer_limits() {
        assert_eq!(
            number_value(&literal(Radix::Decimal, "9223372036854775808", true)),
            Number::Integer(i64::MIN)
        );
        assert_eq!(
            number_value(&literal(Radix::Decimal, "9223372036854775808", false)),
            Number::Float(9223372036854775808.0)
        );
        assert_eq!(
            number_value(&literal(Radix::Hex, "ffffffffffffffffff", false)),
            Number::Float(4722366482869645213696.0)
        );
    }

    #[test]
    fn test_compiled_numbers_in_document() {
        let value = compile("a = 0b0000_0010\nb = -0x10\nc = 1_000.5\nd = -7");
        assert_eq!(value, json!({ "a": 2, "b": -16, "c": 1000.5, "d": -7 }));
    }
}
