// src/core/diagnostics.rs
//! Pretty, colored, file+line diagnostics for the CLI.

use colored::Colorize;

pub struct Span {
    pub line: usize,
    pub col: usize,
    pub len: usize,
}

impl Span {
    pub fn single(line: usize, col: usize) -> Self {
        Self { line, col, len: 1 }
    }

    /// Underline covering a whole lexeme, starting at column 1 when the
    /// precise column is unknown.
    pub fn for_lexeme(line: usize, lexeme: &str) -> Self {
        Self {
            line,
            col: 1,
            len: lexeme.chars().count().max(1),
        }
    }
}

pub fn print_error(filename: &str, source: &str, title: &str, span: Span) {
    eprintln!("{} {}", "error:".bright_red().bold(), title.bright_white());
    let (line, col) = (span.line, span.col);
    let line_text = nth_line(source, line).unwrap_or_default();

    let gutter = format!("{:>4}", line);
    eprintln!(
        "{} {}",
        "-->".bright_blue(),
        format!("{}:{}:{}", filename, line, col).bright_white()
    );
    eprintln!(" {} {}", gutter.dimmed(), "|".dimmed());
    eprintln!("{} {} {}", gutter.dimmed(), "|".dimmed(), line_text);

    let underline = " ".repeat(col.saturating_sub(1)) + &"^".repeat(span.len.max(1));
    eprintln!(
        " {} {} {}",
        " ".repeat(gutter.len()).dimmed(),
        "|".dimmed(),
        underline.bright_red()
    );
    eprintln!();
}

fn nth_line(src: &str, n: usize) -> Option<String> {
    src.lines().nth(n.saturating_sub(1)).map(|s| s.to_string())
}
