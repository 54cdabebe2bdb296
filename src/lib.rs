//! DotBox: a small configuration language.
//!
//! A document is a list of `name = value` attributes. Values are numbers,
//! strings, booleans, nested `{ }` attribute blocks and `[ ]` lists. Comments
//! are `// ...` and nestable `/* ... */`.
//!
//! The pipeline is lexer → parser → (compiler | formatter). The parser always
//! produces a tree; [`compile`] and [`format`] only succeed on documents with
//! no diagnostics at all.
//!
//! ```
//! let value = dotbox::compile("a = 1\nb = [true \"x\"]").unwrap();
//! assert_eq!(
//!     serde_json::to_string(&value).unwrap(),
//!     r#"{"a":1,"b":[true,"x"]}"#
//! );
//!
//! assert_eq!(dotbox::format("a={b=1}").unwrap(), "a = {\n\tb = 1\n}");
//! ```

pub mod ast;
pub mod compiler;
pub mod diagnostic;
pub mod formatter;
pub mod lang;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod token_dumper;

use tracing::debug;

pub use diagnostic::{Diagnostic, Diagnostics, Stage};
pub use lang::value::{Map, Number, Value};
pub use parser::{ParseOutput, Parser};

/// Parses `text` into a tree, collecting every diagnostic on the way.
pub fn parse(text: &str) -> ParseOutput {
    let output = Parser::new(text).parse();
    debug!(
        nodes = output.root.nodes.len(),
        diagnostics = output.diagnostics.len(),
        "parsed document"
    );
    output
}

/// Compiles `text` to its value.
///
/// # Errors
/// Returns every lexical and syntax diagnostic if there is at least one.
pub fn compile(text: &str) -> Result<Value, Diagnostics> {
    let output = parse(text);

    if output.has_errors() {
        debug!(errors = output.diagnostics.len(), "compile rejected document");
        return Err(output.diagnostics);
    }

    Ok(compiler::compile_root(&output.root))
}

/// Formats `text` into canonical form, without a trailing newline.
///
/// # Errors
/// Returns every lexical and syntax diagnostic if there is at least one.
pub fn format(text: &str) -> Result<String, Diagnostics> {
    let output = parse(text);

    if output.has_errors() {
        debug!(errors = output.diagnostics.len(), "format rejected document");
        return Err(output.diagnostics);
    }

    Ok(formatter::format_root(&output.root))
}
