// src/core/compiler.rs
//! Front-end pipeline: validation, lexing, parsing, DOT export.
//!
//! Recoverable diagnostics never abort a run; the report carries whatever
//! was collected alongside the (possibly degraded) tree.

use std::path::{Path, PathBuf};

use crate::core::ast::AstNode;
use crate::core::error::CoreError;
use crate::core::lexer::{LexError, Lexer};
use crate::core::parser::{Parser, SyntaxError};
use crate::core::symbols::SymbolTable;
use crate::debug_log;

/// Everything a run produces. The DOT artifact is written as a side
/// effect of parsing; a missing file afterwards means generation failed,
/// which is a distinct condition from an empty graph.
pub struct FrontendReport {
    pub ast: AstNode,
    pub token_count: usize,
    pub symbols: SymbolTable,
    pub lex_errors: Vec<LexError>,
    pub syntax_errors: Vec<SyntaxError>,
    pub dot_path: PathBuf,
}

impl FrontendReport {
    pub fn is_clean(&self) -> bool {
        self.lex_errors.is_empty() && self.syntax_errors.is_empty()
    }

    pub fn dot_artifact_exists(&self) -> bool {
        self.dot_path.exists()
    }
}

pub struct Compiler;

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Compiler
    }

    /// Validates input before the pipeline runs.
    pub fn validate_and_summarize(&self, source: &str) -> Result<String, CoreError> {
        if source.trim().is_empty() {
            return Err(CoreError::EmptySource);
        }
        let lines = source.lines().count();
        let chars = source.chars().count();
        Ok(format!(
            "Validation complete: {} lines, {} characters.",
            lines, chars
        ))
    }

    /// Runs lexing and parsing over `source`, writing the DOT artifact to
    /// `dot_path`.
    pub fn run(&self, source: &str, dot_path: &Path) -> Result<FrontendReport, CoreError> {
        let summary = self.validate_and_summarize(source)?;
        debug_log!("{}", summary);

        let lexer = Lexer::new(source);
        let mut parser = Parser::with_dot_path(lexer, dot_path);
        debug_log!("Lexer: {} tokens generated.", parser.token_count());

        let ast = parser.parse();
        debug_log!(
            "Parser: AST generated, {} syntax error(s).",
            parser.syntax_errors().len()
        );

        Ok(FrontendReport {
            ast,
            token_count: parser.token_count(),
            symbols: parser.symbol_table().clone(),
            lex_errors: parser.lex_errors().to_vec(),
            syntax_errors: parser.syntax_errors().to_vec(),
            dot_path: dot_path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_fails_validation() {
        let compiler = Compiler::new();
        assert!(compiler.validate_and_summarize("   \n").is_err());
    }

    #[test]
    fn validation_summarizes_dimensions() {
        let compiler = Compiler::new();
        let summary = compiler.validate_and_summarize("x = 42").unwrap();
        assert_eq!(summary, "Validation complete: 1 lines, 6 characters.");
    }
}
