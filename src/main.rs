//! `dotbox` command-line front end.
//!
//! # Usage
//!
//! ```bash
//! # Compile to JSON on stdout, or into a file
//! dotbox compile config.box
//! dotbox compile config.box -o config.json
//!
//! # Format files in place, or only check them
//! dotbox format a.box b.box
//! dotbox format --check a.box
//!
//! # Inspect the token stream or the syntax tree
//! dotbox tokens config.box --pretty
//! dotbox ast config.box
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dotbox::Diagnostic;
use dotbox::lexer::Lexer;
use dotbox::token_dumper::TokenDumper;

#[derive(Parser)]
#[command(name = "dotbox")]
#[command(version)]
#[command(about = "Compile and format DotBox documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a document to JSON
    Compile {
        file: PathBuf,

        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Format documents in place
    Format {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Report files that would change without writing them
        #[arg(long)]
        check: bool,
    },

    /// Print the token stream of a document
    Tokens {
        file: PathBuf,

        #[arg(long)]
        no_color: bool,

        /// Show source-like token text instead of debug output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the syntax tree of a document as JSON
    Ast { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compile { file, output } => cmd_compile(&file, output.as_deref()),
        Commands::Format { files, check } => cmd_format(&files, check),
        Commands::Tokens {
            file,
            no_color,
            pretty,
        } => cmd_tokens(&file, no_color, pretty),
        Commands::Ast { file } => cmd_ast(&file),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// COMMANDS
// =============================================================================
//
// Each command returns Ok(false) when the input had diagnostics. I/O failures
// are errors.

fn cmd_compile(file: &Path, output: Option<&Path>) -> Result<bool> {
    let text = read_source(file)?;

    let value = match dotbox::compile(&text) {
        Ok(value) => value,
        Err(diagnostics) => {
            report(file, &diagnostics);
            return Ok(false);
        }
    };

    let json = to_json(&value)?;

    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            info!(input = %file.display(), output = %path.display(), "compiled");
        }
        None => println!("{}", json),
    }

    Ok(true)
}

fn cmd_format(files: &[PathBuf], check: bool) -> Result<bool> {
    let mut ok = true;

    for file in files {
        let text = read_source(file)?;

        let formatted = match dotbox::format(&text) {
            Ok(formatted) => format!("{}\n", formatted),
            Err(diagnostics) => {
                report(file, &diagnostics);
                ok = false;
                continue;
            }
        };

        if formatted == text {
            debug!(file = %file.display(), "already formatted");
            continue;
        }

        if check {
            eprintln!("{}: not formatted", file.display());
            ok = false;
            continue;
        }

        fs::write(file, formatted)
            .with_context(|| format!("failed to write '{}'", file.display()))?;
        info!(file = %file.display(), "formatted");
    }

    Ok(ok)
}

fn cmd_tokens(file: &Path, no_color: bool, pretty: bool) -> Result<bool> {
    let text = read_source(file)?;

    let mut lexer = Lexer::new(&text);
    let tokens = lexer.tokenize();

    let mut dumper = TokenDumper::new();
    if no_color {
        dumper = dumper.no_color();
    }
    if pretty {
        dumper = dumper.pretty();
    }

    print!("{}", dumper.dump(&tokens));

    report(file, lexer.errors());
    Ok(lexer.errors().is_empty())
}

fn cmd_ast(file: &Path) -> Result<bool> {
    let text = read_source(file)?;

    let output = dotbox::parse(&text);
    println!("{}", to_json(&output.root)?);

    report(file, &output.diagnostics);
    Ok(!output.has_errors())
}

// =============================================================================
// HELPERS
// =============================================================================

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

/// Prints diagnostics as `path:line:col: message`.
fn report<'a>(path: &Path, diagnostics: impl IntoIterator<Item = &'a Diagnostic>) {
    for diagnostic in diagnostics {
        eprintln!("{}:{}", path.display(), diagnostic);
    }
}

/// Tab-indented JSON, keeping mapping order.
fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

    value
        .serialize(&mut serializer)
        .context("failed to serialize JSON")?;

    String::from_utf8(buf).context("serialized JSON is not valid UTF-8")
}
