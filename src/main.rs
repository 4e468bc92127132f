/// pyrite main: lex, parse, and visualize Python-like sources.
use anyhow::Context;
use clap::Parser;
use std::path::Path;

use pyrite::cli::{Command, PyriteCli};
use pyrite::core::compiler::Compiler;
use pyrite::core::diagnostics::{self, Span};
use pyrite::core::lexer::Lexer;
use pyrite::core::token::TokenKind;

fn main() -> anyhow::Result<()> {
    let args = PyriteCli::parse();
    match args.cmd {
        Command::Tokens { input } => cmd_tokens(&input),
        Command::Symbols { input, json } => cmd_symbols(&input, json),
        Command::Parse { input, dot } => cmd_parse(&input, &dot, args.pretty_errors),
    }
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

fn cmd_tokens(input: &Path) -> anyhow::Result<()> {
    let source = read_source(input)?;
    let mut lexer = Lexer::new(&source);
    loop {
        let token = lexer.next_token();
        let done = token.kind == TokenKind::Eof;
        println!("{}", token);
        if done {
            break;
        }
    }
    for err in lexer.errors() {
        eprintln!("{}", err);
    }
    if !lexer.errors().is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_symbols(input: &Path, json: bool) -> anyhow::Result<()> {
    let source = read_source(input)?;
    let mut lexer = Lexer::new(&source);
    let _ = lexer.tokenize();
    if json {
        let entries: Vec<_> = lexer.symbol_table().values().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for info in lexer.symbol_table().values() {
            println!("{:<24} {:<10} {}", info.name, info.ty, info.value);
        }
    }
    Ok(())
}

fn cmd_parse(input: &Path, dot: &Path, pretty: bool) -> anyhow::Result<()> {
    let source = read_source(input)?;
    let report = Compiler::new().run(&source, dot)?;
    let filename = input.display().to_string();

    for err in &report.lex_errors {
        if pretty {
            diagnostics::print_error(
                &filename,
                &source,
                &err.message,
                Span::for_lexeme(err.line, &err.lexeme),
            );
        } else {
            eprintln!("{}", err);
        }
    }
    for err in &report.syntax_errors {
        if pretty {
            diagnostics::print_error(&filename, &source, &err.message, Span::single(err.line, 1));
        } else {
            eprintln!("{}", err);
        }
    }

    if report.dot_artifact_exists() {
        println!("AST written to {}", report.dot_path.display());
    } else {
        eprintln!("warning: DOT artifact was not generated");
    }
    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}
