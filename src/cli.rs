use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "pyrite",
    about = "Python-like front end: tokens, symbols, AST, and DOT export",
    version,
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct PyriteCli {
    /// Global: pretty diagnostics with source underlines
    #[arg(long = "pretty-errors", action = ArgAction::SetTrue, global = true)]
    pub pretty_errors: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Dump the token stream of a source file
    ///
    /// Example:
    ///   pyrite tokens demo.py
    Tokens {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Print the collected symbol table
    Symbols {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Emit JSON instead of aligned text
        #[arg(long = "json", action = ArgAction::SetTrue)]
        json: bool,
    },

    /// Parse a source file and write the AST as Graphviz DOT
    ///
    /// Render the artifact externally, e.g.:
    ///   dot -Tpng AST.dot -o AST.png
    Parse {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// DOT output path
        #[arg(long = "dot", value_name = "FILE", default_value = "AST.dot")]
        dot: PathBuf,
    },
}
