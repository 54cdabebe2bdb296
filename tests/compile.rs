use dotbox::ast::{AttrExpr, AttrNode};
use dotbox::{Number, Stage, Value};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn compile_json(source: &str) -> serde_json::Value {
    let value = dotbox::compile(source).unwrap_or_else(|e| panic!("compile failed: {:?}", e));
    serde_json::to_value(&value).unwrap()
}

fn compact(source: &str) -> String {
    let value = dotbox::compile(source).unwrap_or_else(|e| panic!("compile failed: {:?}", e));
    serde_json::to_string(&value).unwrap()
}

fn error_messages(source: &str) -> Vec<String> {
    match dotbox::compile(source) {
        Ok(value) => panic!("expected errors, got {:?}", value),
        Err(diagnostics) => diagnostics.into_iter().map(|d| d.message).collect(),
    }
}

// --------------------
// Documents
// --------------------

#[test]
fn compiles_example_document() {
    let value = compile_json("a = 1\nb = [1 true \"x\"]\n// note\nc = { d = true }");
    assert_eq!(value, json!({ "a": 1, "b": [1, true, "x"], "c": { "d": true } }));
}

#[test]
fn keeps_key_order_in_output() {
    insta::assert_snapshot!(
        compact("zeta = 1\nalpha = { y = 2 x = 3 }\nmid = []"),
        @r#"{"zeta":1,"alpha":{"y":2,"x":3},"mid":[]}"#
    );
}

#[test]
fn compiles_a_realistic_config() {
    let source = r#"
// Service definition
name = "api"
port = 8_080
debug? = false

limits = {
	requests_per_second = 2.5
	burst = 0x20
}

hosts = [
	"a.example.com" // primary
	"b.example.com"
]

banner = "
	| Welcome!
	|
	| Have a \"nice\" day.
	"
"#;

    insta::assert_snapshot!(
        compact(source),
        @r#"{"name":"api","port":8080,"debug?":false,"limits":{"requests_per_second":2.5,"burst":32},"hosts":["a.example.com","b.example.com"],"banner":"Welcome!\n\nHave a \"nice\" day."}"#
    );
}

#[test]
fn empty_document_is_empty_mapping() {
    assert_eq!(compile_json(""), json!({}));
    assert_eq!(compile_json("  \n\n/* nothing */\n"), json!({}));
}

#[test]
fn nested_containers() {
    let value = compile_json("a = [[1 [2]] { b = [ { c = [] } ] }]");
    assert_eq!(value, json!({ "a": [[1, [2]], { "b": [{ "c": [] }] }] }));
}

// --------------------
// Numbers
// --------------------

#[rstest]
#[case("0b1010", Number::Integer(10))]
#[case("-0b1", Number::Integer(-1))]
#[case("0o17", Number::Integer(15))]
#[case("0x1_f", Number::Integer(31))]
#[case("0xFF_FF", Number::Integer(65535))]
#[case("1_000_000", Number::Integer(1_000_000))]
#[case("-12", Number::Integer(-12))]
#[case("3.25", Number::Float(3.25))]
#[case("-0.5", Number::Float(-0.5))]
#[case("007", Number::Integer(7))]
fn compiles_numbers(#[case] literal: &str, #[case] expected: Number) {
    let value = dotbox::compile(&format!("n = {}", literal)).unwrap();
    assert_eq!(value.get("n"), Some(&Value::Number(expected)));
}

// --------------------
// Strings
// --------------------

#[rstest]
#[case("\"\n| one\n| two\n\"")]
#[case("\"\n\t| one\n\t| two\n\t\"")]
#[case("\"\n\t\t\t\t| one\n\t\t\t\t| two\n\t\t\t\t\"")]
#[case("\"\n        | one\n        | two\n    \"")]
fn margin_strings_ignore_indentation(#[case] string: &str) {
    let value = dotbox::compile(&format!("s = {}", string)).unwrap();
    assert_eq!(value.get("s").and_then(Value::as_str), Some("one\ntwo"));
}

#[test]
fn plain_multi_line_string_keeps_lines() {
    let value = dotbox::compile("s = \"one\n  two\"").unwrap();
    assert_eq!(value.get("s").and_then(Value::as_str), Some("one\n  two"));
}

// --------------------
// Errors
// --------------------

#[test]
fn missing_value_is_an_error() {
    assert_eq!(error_messages("x = "), vec!["Expected a value but got EOF"]);
}

#[test]
fn errors_carry_locations() {
    let diagnostics = dotbox::compile("a = 1\nb = 1__0\nc = @").unwrap_err();
    let rendered: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "2:7: Multiple underscores in number literals are not allowed.",
            "3:5: Unexpected character '@'.",
            "3:5: Expected a value but got Char",
        ]
    );
}

#[test]
fn lexical_errors_precede_syntax_errors() {
    let diagnostics = dotbox::compile("a = \nb = \"open").unwrap_err();
    let stages: Vec<Stage> = diagnostics.iter().map(|d| d.stage).collect();
    assert_eq!(stages, vec![Stage::Lexical, Stage::Syntax]);
    assert_eq!(diagnostics.to_string(), "2 error(s) in document");
}

#[test]
fn unterminated_comment_is_an_error() {
    assert_eq!(
        error_messages("a = 1 /* never closed"),
        vec!["Expected a closing \"*/\", but got end of file."]
    );
}

#[test]
fn one_error_does_not_hide_the_rest() {
    assert_eq!(
        error_messages("a = [1 2\nb = 0x\nc = 3"),
        vec![
            "Expected a hex literal but got \"\\n\".",
            "Expected CloseBracket but got Ident",
        ]
    );
}

#[test]
fn token_mismatches_are_grouped_with_syntax_errors() {
    let diagnostics = dotbox::compile("a 1\nb = 1__0").unwrap_err();
    let order: Vec<(Stage, String)> = diagnostics
        .into_iter()
        .map(|d| (d.stage, d.message))
        .collect();
    assert_eq!(
        order,
        vec![
            (
                Stage::Lexical,
                "Multiple underscores in number literals are not allowed.".to_string()
            ),
            (Stage::Syntax, "Expected Eq but got Number".to_string()),
            (Stage::Syntax, "Expected a value but got Ident".to_string()),
        ]
    );
}

#[test]
fn parse_recovers_missing_value() {
    let output = dotbox::parse("x = ");
    assert!(output.has_errors());
    assert_eq!(output.root.nodes.len(), 1);
    assert!(matches!(
        &output.root.nodes[0],
        AttrNode::Attr(attr) if matches!(attr.expr, AttrExpr::Missing(_))
    ));
}
