// src/core/parser.rs
//! Recursive-descent parser over a fully materialized token vector.
//!
//! The grammar needs more than one token of lookahead in a few places
//! (assignment targets vs. bare expressions, `is not` / `not in`, keyword
//! arguments). Those productions speculate with a saved cursor position and
//! restore it when the speculative shape is rejected; errors recorded
//! during a rejected speculation are rolled back with it, so every
//! production reports at most one diagnostic for its own context.
//!
//! Parsing never aborts: a failed production records one error, the caller
//! skips one token and resumes, and the tree that comes out is simply
//! missing the pieces that failed.

use std::path::{Path, PathBuf};

use crate::core::ast::AstNode;
use crate::core::dot::DotGenerator;
use crate::core::lexer::{LexError, Lexer};
use crate::core::symbols::SymbolTable;
use crate::core::token::{Token, TokenKind};

/// One collected syntax diagnostic.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Syntax error at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<SyntaxError>,
    dot_path: PathBuf,
    lex_errors: Vec<LexError>,
    symbols: SymbolTable,
}

impl Parser {
    /// Drains the lexer up front; the token vector is the replay buffer.
    pub fn new(lexer: Lexer) -> Self {
        Self::with_dot_path(lexer, "AST.dot")
    }

    pub fn with_dot_path(mut lexer: Lexer, dot_path: impl Into<PathBuf>) -> Self {
        let mut tokens = lexer.tokenize();
        if !matches!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof)) {
            tokens.push(Token::new(TokenKind::Eof, "", 0, 0));
        }
        let lex_errors = lexer.errors().to_vec();
        let symbols = lexer.symbol_table().clone();
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            dot_path: dot_path.into(),
            lex_errors,
            symbols,
        }
    }

    /// Parses the whole translation unit, then serializes the tree to the
    /// DOT artifact before returning. Callers read the artifact path via
    /// `dot_file_path`.
    pub fn parse(&mut self) -> AstNode {
        let root = self.parse_file();
        if !self.at_end() {
            self.error_here("expected end of file");
        }
        let mut generator = DotGenerator::new();
        if let Err(err) = generator.generate(&root, &self.dot_path) {
            eprintln!(
                "warning: could not write {}: {}",
                self.dot_path.display(),
                err
            );
        }
        root
    }

    /// Collected diagnostics, formatted.
    pub fn errors(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    pub fn syntax_errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Diagnostics carried over from the lexer that fed this parser.
    pub fn lex_errors(&self) -> &[LexError] {
        &self.lex_errors
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Number of tokens in the materialized stream, Eof included.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Where `parse()` wrote (or tried to write) the DOT artifact.
    pub fn dot_file_path(&self) -> &Path {
        &self.dot_path
    }

    /* ── Token cursor ────────────────────────────────────── */

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn mark(&self) -> (usize, usize) {
        (self.pos, self.errors.len())
    }

    fn reset(&mut self, mark: (usize, usize)) {
        self.pos = mark.0;
        self.errors.truncate(mark.1);
    }

    /// Consuming check. On mismatch records a diagnostic and leaves the
    /// offending token in place; the caller decides how to resynchronize.
    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            self.error_here(what);
            false
        }
    }

    fn error_here(&mut self, what: &str) {
        let token = self.peek().clone();
        self.errors.push(SyntaxError {
            line: token.line,
            message: format!("{} but got {}", what, token.describe()),
        });
    }

    /* ── Statements ──────────────────────────────────────── */

    fn parse_file(&mut self) -> AstNode {
        let line = self.peek().line;
        let mut body = Vec::new();
        self.parse_statement_run(&mut body, &[]);
        AstNode::Program { body, line }
    }

    /// Statement loop shared by the file level and indented blocks. Always
    /// makes forward progress, even when a production yields nothing.
    fn parse_statement_run(&mut self, out: &mut Vec<AstNode>, terminators: &[TokenKind]) {
        loop {
            while self.match_kind(TokenKind::Newline) {}
            if self.at_end() || terminators.contains(&self.peek_kind()) {
                break;
            }
            let before = self.pos;
            self.parse_statement_line(out);
            if self.pos == before {
                self.advance();
            }
        }
    }

    fn parse_statement_line(&mut self, out: &mut Vec<AstNode>) {
        match self.peek_kind() {
            TokenKind::Def => {
                if let Some(stmt) = self.parse_function_def() {
                    out.push(stmt);
                }
            }
            TokenKind::Class => {
                if let Some(stmt) = self.parse_class_def() {
                    out.push(stmt);
                }
            }
            TokenKind::If => {
                if let Some(stmt) = self.parse_if() {
                    out.push(stmt);
                }
            }
            TokenKind::While => {
                if let Some(stmt) = self.parse_while() {
                    out.push(stmt);
                }
            }
            TokenKind::For => {
                if let Some(stmt) = self.parse_for() {
                    out.push(stmt);
                }
            }
            TokenKind::Try => {
                if let Some(stmt) = self.parse_try() {
                    out.push(stmt);
                }
            }
            TokenKind::Indent => {
                self.error_here("unexpected indent");
                self.advance();
            }
            _ => self.parse_simple_line(out),
        }
    }

    /// One or more `;`-separated simple statements, then the line end.
    fn parse_simple_line(&mut self, out: &mut Vec<AstNode>) {
        loop {
            let before = self.pos;
            if let Some(stmt) = self.parse_simple_stmt() {
                out.push(stmt);
            }
            if self.pos == before {
                self.advance();
            }
            if self.match_kind(TokenKind::Semicolon) {
                if self.line_end_ahead() {
                    break;
                }
                continue;
            }
            break;
        }
        self.consume_line_end();
    }

    fn line_end_ahead(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
        )
    }

    fn consume_line_end(&mut self) {
        if self.match_kind(TokenKind::Newline) {
            return;
        }
        if matches!(self.peek_kind(), TokenKind::Dedent | TokenKind::Eof) {
            return;
        }
        self.error_here("expected newline after statement");
        self.advance();
    }

    fn parse_simple_stmt(&mut self) -> Option<AstNode> {
        match self.peek_kind() {
            TokenKind::Return => self.parse_return(),
            TokenKind::Raise => self.parse_raise(),
            TokenKind::Pass => {
                let line = self.advance().line;
                Some(AstNode::Pass { line })
            }
            TokenKind::Break => {
                let line = self.advance().line;
                Some(AstNode::Break { line })
            }
            TokenKind::Continue => {
                let line = self.advance().line;
                Some(AstNode::Continue { line })
            }
            TokenKind::Global => self.parse_scope_decl(true),
            TokenKind::Nonlocal => self.parse_scope_decl(false),
            TokenKind::Import => self.parse_import(),
            TokenKind::From => self.parse_import_from(),
            _ => self.parse_assign_or_expr(),
        }
    }

    fn parse_return(&mut self) -> Option<AstNode> {
        let line = self.advance().line;
        let value = if self.line_end_ahead() || self.check(TokenKind::Semicolon) {
            Option::None
        } else {
            Some(Box::new(self.parse_expression_list()?))
        };
        Some(AstNode::Return { value, line })
    }

    fn parse_raise(&mut self) -> Option<AstNode> {
        let line = self.advance().line;
        let exc = if self.line_end_ahead() || self.check(TokenKind::Semicolon) {
            Option::None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        Some(AstNode::Raise { exc, line })
    }

    fn parse_scope_decl(&mut self, global: bool) -> Option<AstNode> {
        let line = self.advance().line;
        let keyword = if global { "global" } else { "nonlocal" };
        let mut names = Vec::new();
        loop {
            if self.check(TokenKind::Identifier) {
                names.push(self.advance().lexeme);
            } else {
                self.error_here(&format!("expected name after '{}'", keyword));
                break;
            }
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        if names.is_empty() {
            return Option::None;
        }
        Some(if global {
            AstNode::Global { names, line }
        } else {
            AstNode::Nonlocal { names, line }
        })
    }

    fn parse_import(&mut self) -> Option<AstNode> {
        let line = self.advance().line;
        let mut names = Vec::new();
        loop {
            match self.parse_import_alias() {
                Some(alias) => names.push(alias),
                Option::None => break,
            }
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        if names.is_empty() {
            return Option::None;
        }
        Some(AstNode::Import { names, line })
    }

    fn parse_import_alias(&mut self) -> Option<AstNode> {
        if !self.check(TokenKind::Identifier) {
            self.error_here("expected module name");
            return Option::None;
        }
        let first = self.advance();
        let line = first.line;
        let mut name = first.lexeme;
        while self.match_kind(TokenKind::Dot) {
            if self.check(TokenKind::Identifier) {
                name.push('.');
                name.push_str(&self.advance().lexeme);
            } else {
                self.error_here("expected name after '.'");
                break;
            }
        }
        let alias = if self.match_kind(TokenKind::As) {
            if self.check(TokenKind::Identifier) {
                Some(self.advance().lexeme)
            } else {
                self.error_here("expected name after 'as'");
                Option::None
            }
        } else {
            Option::None
        };
        Some(AstNode::ImportAlias { name, alias, line })
    }

    fn parse_import_from(&mut self) -> Option<AstNode> {
        let line = self.advance().line;
        if !self.check(TokenKind::Identifier) {
            self.error_here("expected module name after 'from'");
            return Option::None;
        }
        let mut module = self.advance().lexeme;
        while self.match_kind(TokenKind::Dot) {
            if self.check(TokenKind::Identifier) {
                module.push('.');
                module.push_str(&self.advance().lexeme);
            } else {
                self.error_here("expected name after '.'");
                break;
            }
        }
        if !self.expect(TokenKind::Import, "expected 'import' in from-import") {
            return Option::None;
        }
        if self.match_kind(TokenKind::Star) {
            return Some(AstNode::ImportFrom {
                module,
                names: Vec::new(),
                wildcard: true,
                line,
            });
        }
        let parenthesized = self.match_kind(TokenKind::LeftParen);
        let mut names = Vec::new();
        loop {
            match self.parse_import_alias() {
                Some(alias) => names.push(alias),
                Option::None => break,
            }
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
            if parenthesized && self.check(TokenKind::RightParen) {
                break;
            }
        }
        if parenthesized {
            self.expect(TokenKind::RightParen, "expected ')' after import names");
        }
        if names.is_empty() {
            return Option::None;
        }
        Some(AstNode::ImportFrom {
            module,
            names,
            wildcard: false,
            line,
        })
    }

    /// Assignment vs. expression statement. A speculative target parse
    /// decides; if no assignment operator follows, the cursor (and any
    /// speculation-local errors) rewind and the line reparses as a plain
    /// expression statement.
    fn parse_assign_or_expr(&mut self) -> Option<AstNode> {
        let line = self.peek().line;
        let mark = self.mark();
        if let Some(first) = self.try_parse_target_group() {
            if matches!(self.peek_kind(), TokenKind::Assign | TokenKind::ColonAssign) {
                return self.parse_assignment(first, line);
            }
            if let Some(op) = self.peek_kind().augmented_op() {
                if first.len() == 1 {
                    self.advance();
                    let target = first.into_iter().next()?;
                    let value = self.parse_expression_list()?;
                    return Some(AstNode::AugAssign {
                        target: Box::new(target),
                        op: op.to_string(),
                        value: Box::new(value),
                        line,
                    });
                }
            }
        }
        self.reset(mark);
        let value = self.parse_expression_list()?;
        Some(AstNode::ExprStmt {
            value: Box::new(value),
            line,
        })
    }

    fn parse_assignment(&mut self, first: Vec<AstNode>, line: usize) -> Option<AstNode> {
        let mut target_groups = vec![first];
        self.advance(); // '=' or ':='
        loop {
            let mark = self.mark();
            if let Some(group) = self.try_parse_target_group() {
                if self.check(TokenKind::Assign) {
                    self.advance();
                    target_groups.push(group);
                    continue;
                }
            }
            self.reset(mark);
            break;
        }
        let value = self.parse_expression_list()?;
        let targets = target_groups
            .into_iter()
            .map(|group| Self::group_to_target(group, line))
            .collect();
        Some(AstNode::Assign {
            targets,
            value: Box::new(value),
            line,
        })
    }

    fn group_to_target(mut group: Vec<AstNode>, line: usize) -> AstNode {
        if group.len() == 1 {
            group.remove(0)
        } else {
            let line = group.first().map(|n| n.line()).unwrap_or(line);
            AstNode::TupleLiteral {
                elements: group,
                line,
            }
        }
    }

    /// Comma-separated assignment targets. Silent: rejection leaves no
    /// diagnostics behind (the caller rewinds).
    fn try_parse_target_group(&mut self) -> Option<Vec<AstNode>> {
        let mut targets = vec![self.try_parse_target()?];
        while self.check(TokenKind::Comma) {
            let mark = self.mark();
            self.advance();
            match self.try_parse_target() {
                Some(target) => targets.push(target),
                Option::None => {
                    self.reset(mark);
                    break;
                }
            }
        }
        Some(targets)
    }

    /// A single target: a name followed by any chain of `.attr` and
    /// `[index]`. A call anywhere in the chain rejects the target, which
    /// sends the whole line down the expression-statement path.
    fn try_parse_target(&mut self) -> Option<AstNode> {
        if !self.check(TokenKind::Identifier) {
            return Option::None;
        }
        let name_tok = self.advance();
        let mut node = AstNode::Name {
            name: name_tok.lexeme,
            line: name_tok.line,
        };
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    if self.check(TokenKind::Identifier) {
                        let attr = self.advance();
                        node = AstNode::new_attribute(node, &attr.lexeme, attr.line);
                    } else {
                        return Option::None;
                    }
                }
                TokenKind::LeftBracket => {
                    let tok = self.advance();
                    let index = self.parse_expression()?;
                    if !self.match_kind(TokenKind::RightBracket) {
                        return Option::None;
                    }
                    node = AstNode::new_subscript(node, index, tok.line);
                }
                TokenKind::LeftParen => return Option::None,
                _ => break,
            }
        }
        Some(node)
    }

    /* ── Compound statements ─────────────────────────────── */

    fn parse_function_def(&mut self) -> Option<AstNode> {
        let line = self.advance().line; // 'def'
        let name = if self.check(TokenKind::Identifier) {
            self.advance().lexeme
        } else {
            self.error_here("expected function name after 'def'");
            String::new()
        };
        self.expect(TokenKind::LeftParen, "expected '(' after function name");
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if self.check(TokenKind::Identifier) {
                    let param = self.advance();
                    let default = if self.match_kind(TokenKind::Assign) {
                        self.parse_expression().map(Box::new)
                    } else {
                        Option::None
                    };
                    params.push(AstNode::Parameter {
                        name: param.lexeme,
                        default,
                        line: param.line,
                    });
                } else {
                    self.error_here("expected parameter name");
                    break;
                }
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
                if self.check(TokenKind::RightParen) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "expected ')' after parameters");
        let returns = if self.match_kind(TokenKind::Arrow) {
            self.parse_expression().map(Box::new)
        } else {
            Option::None
        };
        let body = self.parse_block("function body")?;
        Some(AstNode::FunctionDef {
            name,
            params,
            returns,
            body: Box::new(body),
            line,
        })
    }

    fn parse_class_def(&mut self) -> Option<AstNode> {
        let line = self.advance().line; // 'class'
        let name = if self.check(TokenKind::Identifier) {
            self.advance().lexeme
        } else {
            self.error_here("expected class name after 'class'");
            String::new()
        };
        let mut bases = Vec::new();
        if self.match_kind(TokenKind::LeftParen) {
            if !self.check(TokenKind::RightParen) {
                loop {
                    bases.push(self.parse_expression()?);
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                    if self.check(TokenKind::RightParen) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RightParen, "expected ')' after base classes");
        }
        let body = self.parse_block("class body")?;
        Some(AstNode::ClassDef {
            name,
            bases,
            body: Box::new(body),
            line,
        })
    }

    fn parse_if(&mut self) -> Option<AstNode> {
        let line = self.advance().line; // 'if'
        let condition = self.parse_expression()?;
        let then_block = self.parse_block("'if' block")?;
        let mut elif_clauses = Vec::new();
        while self.check(TokenKind::Elif) {
            self.advance();
            let clause_cond = self.parse_expression()?;
            let clause_block = self.parse_block("'elif' block")?;
            elif_clauses.push((clause_cond, clause_block));
        }
        let else_block = if self.match_kind(TokenKind::Else) {
            Some(Box::new(self.parse_block("'else' block")?))
        } else {
            Option::None
        };
        Some(AstNode::If {
            condition: Box::new(condition),
            then_block: Box::new(then_block),
            elif_clauses,
            else_block,
            line,
        })
    }

    fn parse_while(&mut self) -> Option<AstNode> {
        let line = self.advance().line; // 'while'
        let condition = self.parse_expression()?;
        let body = self.parse_block("'while' block")?;
        Some(AstNode::While {
            condition: Box::new(condition),
            body: Box::new(body),
            line,
        })
    }

    fn parse_for(&mut self) -> Option<AstNode> {
        let line = self.advance().line; // 'for'
        let target = match self.try_parse_target_group() {
            Some(group) => Self::group_to_target(group, line),
            Option::None => {
                self.error_here("expected loop target after 'for'");
                return Option::None;
            }
        };
        if !self.expect(TokenKind::In, "expected 'in' after loop target") {
            return Option::None;
        }
        let iterable = self.parse_expression_list()?;
        let body = self.parse_block("'for' block")?;
        Some(AstNode::For {
            target: Box::new(target),
            iterable: Box::new(iterable),
            body: Box::new(body),
            line,
        })
    }

    fn parse_try(&mut self) -> Option<AstNode> {
        let line = self.advance().line; // 'try'
        let body = self.parse_block("'try' block")?;
        let mut handlers = Vec::new();
        while self.check(TokenKind::Except) {
            let handler_line = self.advance().line;
            let exc_type = if self.check(TokenKind::Colon) {
                Option::None
            } else {
                Some(Box::new(self.parse_expression()?))
            };
            let alias = if self.match_kind(TokenKind::As) {
                if self.check(TokenKind::Identifier) {
                    Some(self.advance().lexeme)
                } else {
                    self.error_here("expected name after 'as'");
                    Option::None
                }
            } else {
                Option::None
            };
            let handler_body = self.parse_block("'except' block")?;
            handlers.push(AstNode::ExceptHandler {
                exc_type,
                alias,
                body: Box::new(handler_body),
                line: handler_line,
            });
        }
        let else_block = if self.match_kind(TokenKind::Else) {
            Some(Box::new(self.parse_block("'else' block")?))
        } else {
            Option::None
        };
        let finally_block = if self.match_kind(TokenKind::Finally) {
            Some(Box::new(self.parse_block("'finally' block")?))
        } else {
            Option::None
        };
        if handlers.is_empty() && finally_block.is_none() {
            self.error_here("expected 'except' or 'finally' after 'try' block");
        }
        Some(AstNode::Try {
            body: Box::new(body),
            handlers,
            else_block,
            finally_block,
            line,
        })
    }

    /// `: NEWLINE INDENT statements DEDENT`, or an inline suite on the
    /// same line.
    fn parse_block(&mut self, what: &str) -> Option<AstNode> {
        if !self.expect(TokenKind::Colon, &format!("expected ':' before {}", what)) {
            return Option::None;
        }
        let line = self.peek().line;
        if self.match_kind(TokenKind::Newline) {
            if !self.expect(TokenKind::Indent, &format!("expected indented {}", what)) {
                return Option::None;
            }
            let mut statements = Vec::new();
            self.parse_statement_run(&mut statements, &[TokenKind::Dedent]);
            self.expect(TokenKind::Dedent, &format!("expected dedent after {}", what));
            Some(AstNode::Block { statements, line })
        } else {
            let mut statements = Vec::new();
            self.parse_simple_line(&mut statements);
            Some(AstNode::Block { statements, line })
        }
    }

    /* ── Expressions ─────────────────────────────────────── */

    pub fn parse_expression(&mut self) -> Option<AstNode> {
        self.parse_disjunction()
    }

    /// `expr (',' expr)*`; more than one element folds into a tuple.
    fn parse_expression_list(&mut self) -> Option<AstNode> {
        let line = self.peek().line;
        let first = self.parse_expression()?;
        if !self.check(TokenKind::Comma) {
            return Some(first);
        }
        let mut elements = vec![first];
        while self.match_kind(TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            elements.push(self.parse_expression()?);
        }
        Some(AstNode::TupleLiteral { elements, line })
    }

    fn starts_expression(&self) -> bool {
        let kind = self.peek_kind();
        kind.is_type_name()
            || matches!(
                kind,
                TokenKind::Identifier
                    | TokenKind::Number
                    | TokenKind::String
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::None
                    | TokenKind::Not
                    | TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Tilde
                    | TokenKind::LeftParen
                    | TokenKind::LeftBracket
                    | TokenKind::LeftBrace
            )
    }

    fn parse_disjunction(&mut self) -> Option<AstNode> {
        let mut left = self.parse_conjunction()?;
        while self.check(TokenKind::Or) {
            let line = self.advance().line;
            let right = self.parse_conjunction()?;
            left = AstNode::new_bool_op("or", left, right, line);
        }
        Some(left)
    }

    fn parse_conjunction(&mut self) -> Option<AstNode> {
        let mut left = self.parse_inversion()?;
        while self.check(TokenKind::And) {
            let line = self.advance().line;
            let right = self.parse_inversion()?;
            left = AstNode::new_bool_op("and", left, right, line);
        }
        Some(left)
    }

    fn parse_inversion(&mut self) -> Option<AstNode> {
        if self.check(TokenKind::Not) {
            let line = self.advance().line;
            let operand = self.parse_inversion()?;
            return Some(AstNode::new_unary("not", operand, line));
        }
        self.parse_comparison()
    }

    /// Chained comparisons produce one node per operator, left-folded.
    /// `is not` and `not in` are merged with one extra token of lookahead.
    fn parse_comparison(&mut self) -> Option<AstNode> {
        let mut left = self.parse_bitwise_or()?;
        loop {
            match self.peek_kind() {
                TokenKind::Less
                | TokenKind::LessEqual
                | TokenKind::Greater
                | TokenKind::GreaterEqual
                | TokenKind::EqualEqual
                | TokenKind::NotEqual
                | TokenKind::In => {
                    let tok = self.advance();
                    let right = self.parse_bitwise_or()?;
                    left = AstNode::new_comparison(&tok.lexeme, left, right, tok.line);
                }
                TokenKind::Is => {
                    let tok = self.advance();
                    let op = if self.match_kind(TokenKind::Not) {
                        "is not"
                    } else {
                        "is"
                    };
                    let right = self.parse_bitwise_or()?;
                    left = AstNode::new_comparison(op, left, right, tok.line);
                }
                TokenKind::Not => {
                    let mark = self.mark();
                    let tok = self.advance();
                    if self.match_kind(TokenKind::In) {
                        let right = self.parse_bitwise_or()?;
                        left = AstNode::new_comparison("not in", left, right, tok.line);
                    } else {
                        self.reset(mark);
                        break;
                    }
                }
                _ => break,
            }
        }
        Some(left)
    }

    fn parse_bitwise_or(&mut self) -> Option<AstNode> {
        let mut left = self.parse_bitwise_xor()?;
        while self.check(TokenKind::Pipe) {
            let tok = self.advance();
            let right = self.parse_bitwise_xor()?;
            left = AstNode::new_binary(&tok.lexeme, left, right, tok.line);
        }
        Some(left)
    }

    fn parse_bitwise_xor(&mut self) -> Option<AstNode> {
        let mut left = self.parse_bitwise_and()?;
        while self.check(TokenKind::Caret) {
            let tok = self.advance();
            let right = self.parse_bitwise_and()?;
            left = AstNode::new_binary(&tok.lexeme, left, right, tok.line);
        }
        Some(left)
    }

    fn parse_bitwise_and(&mut self) -> Option<AstNode> {
        let mut left = self.parse_shift()?;
        while self.check(TokenKind::Ampersand) {
            let tok = self.advance();
            let right = self.parse_shift()?;
            left = AstNode::new_binary(&tok.lexeme, left, right, tok.line);
        }
        Some(left)
    }

    fn parse_shift(&mut self) -> Option<AstNode> {
        let mut left = self.parse_sum()?;
        while matches!(self.peek_kind(), TokenKind::LeftShift | TokenKind::RightShift) {
            let tok = self.advance();
            let right = self.parse_sum()?;
            left = AstNode::new_binary(&tok.lexeme, left, right, tok.line);
        }
        Some(left)
    }

    fn parse_sum(&mut self) -> Option<AstNode> {
        let mut left = self.parse_term()?;
        while matches!(self.peek_kind(), TokenKind::Plus | TokenKind::Minus) {
            let tok = self.advance();
            let right = self.parse_term()?;
            left = AstNode::new_binary(&tok.lexeme, left, right, tok.line);
        }
        Some(left)
    }

    fn parse_term(&mut self) -> Option<AstNode> {
        let mut left = self.parse_factor()?;
        while matches!(
            self.peek_kind(),
            TokenKind::Star
                | TokenKind::Slash
                | TokenKind::DoubleSlash
                | TokenKind::Percent
                | TokenKind::At
        ) {
            let tok = self.advance();
            let right = self.parse_factor()?;
            left = AstNode::new_binary(&tok.lexeme, left, right, tok.line);
        }
        Some(left)
    }

    fn parse_factor(&mut self) -> Option<AstNode> {
        match self.peek_kind() {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Tilde => {
                let tok = self.advance();
                let operand = self.parse_factor()?;
                Some(AstNode::new_unary(&tok.lexeme, operand, tok.line))
            }
            _ => self.parse_power(),
        }
    }

    /// `**` binds right: the exponent recurses back into factor.
    fn parse_power(&mut self) -> Option<AstNode> {
        let base = self.parse_primary()?;
        if self.check(TokenKind::DoubleStar) {
            let tok = self.advance();
            let exponent = self.parse_factor()?;
            return Some(AstNode::new_binary("**", base, exponent, tok.line));
        }
        Some(base)
    }

    /// Postfix chain: attribute access, calls, subscripts.
    fn parse_primary(&mut self) -> Option<AstNode> {
        let mut node = self.parse_atom()?;
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    if self.check(TokenKind::Identifier) {
                        let attr = self.advance();
                        node = AstNode::new_attribute(node, &attr.lexeme, attr.line);
                    } else {
                        self.error_here("expected attribute name after '.'");
                        break;
                    }
                }
                TokenKind::LeftParen => {
                    let tok = self.advance();
                    let args = self.parse_call_args()?;
                    node = AstNode::new_call(node, args, tok.line);
                }
                TokenKind::LeftBracket => {
                    let tok = self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RightBracket, "expected ']' after subscript");
                    node = AstNode::new_subscript(node, index, tok.line);
                }
                _ => break,
            }
        }
        Some(node)
    }

    fn parse_call_args(&mut self) -> Option<Vec<AstNode>> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let mark = self.mark();
                if self.check(TokenKind::Identifier) {
                    let name_tok = self.advance();
                    if self.match_kind(TokenKind::Assign) {
                        let value = self.parse_expression()?;
                        args.push(AstNode::KeywordArg {
                            name: name_tok.lexeme,
                            value: Box::new(value),
                            line: name_tok.line,
                        });
                        if !self.match_kind(TokenKind::Comma) {
                            break;
                        }
                        if self.check(TokenKind::RightParen) {
                            break;
                        }
                        continue;
                    }
                    self.reset(mark);
                }
                args.push(self.parse_expression()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
                if self.check(TokenKind::RightParen) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "expected ')' after call arguments");
        Some(args)
    }

    fn parse_atom(&mut self) -> Option<AstNode> {
        let kind = self.peek_kind();
        if kind.is_type_name() {
            let tok = self.advance();
            return Some(AstNode::Name {
                name: tok.lexeme,
                line: tok.line,
            });
        }
        match kind {
            TokenKind::Identifier => {
                let tok = self.advance();
                Some(AstNode::Name {
                    name: tok.lexeme,
                    line: tok.line,
                })
            }
            TokenKind::Number => {
                let tok = self.advance();
                Some(AstNode::NumberLiteral {
                    value: tok.lexeme,
                    line: tok.line,
                })
            }
            TokenKind::String => {
                let tok = self.advance();
                Some(AstNode::StringLiteral {
                    value: tok.lexeme,
                    line: tok.line,
                })
            }
            TokenKind::True => {
                let line = self.advance().line;
                Some(AstNode::BoolLiteral { value: true, line })
            }
            TokenKind::False => {
                let line = self.advance().line;
                Some(AstNode::BoolLiteral { value: false, line })
            }
            TokenKind::None => {
                let line = self.advance().line;
                Some(AstNode::NoneLiteral { line })
            }
            TokenKind::LeftParen => self.parse_paren_form(),
            TokenKind::LeftBracket => self.parse_list_display(),
            TokenKind::LeftBrace => self.parse_brace_display(),
            TokenKind::Unknown => {
                self.error_here("unexpected symbols");
                self.advance();
                Option::None
            }
            _ => {
                self.error_here("expected an expression");
                Option::None
            }
        }
    }

    fn parse_paren_form(&mut self) -> Option<AstNode> {
        let open = self.advance();
        if self.match_kind(TokenKind::RightParen) {
            return Some(AstNode::TupleLiteral {
                elements: Vec::new(),
                line: open.line,
            });
        }
        let first = self.parse_expression()?;
        if self.check(TokenKind::Comma) {
            let mut elements = vec![first];
            while self.match_kind(TokenKind::Comma) {
                if self.check(TokenKind::RightParen) {
                    break;
                }
                elements.push(self.parse_expression()?);
            }
            self.expect(TokenKind::RightParen, "expected ')' after tuple");
            return Some(AstNode::TupleLiteral {
                elements,
                line: open.line,
            });
        }
        self.expect(TokenKind::RightParen, "expected ')' after expression");
        Some(first)
    }

    fn parse_list_display(&mut self) -> Option<AstNode> {
        let open = self.advance();
        let mut elements = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
                if self.check(TokenKind::RightBracket) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightBracket, "expected ']' after list");
        Some(AstNode::ListLiteral {
            elements,
            line: open.line,
        })
    }

    /// `{}` is an empty dict; `{k: v, ...}` a dict; `{a, b}` a set.
    fn parse_brace_display(&mut self) -> Option<AstNode> {
        let open = self.advance();
        if self.match_kind(TokenKind::RightBrace) {
            return Some(AstNode::DictLiteral {
                pairs: Vec::new(),
                line: open.line,
            });
        }
        let first = self.parse_expression()?;
        if self.match_kind(TokenKind::Colon) {
            let value = self.parse_expression()?;
            let mut pairs = vec![(first, value)];
            while self.match_kind(TokenKind::Comma) {
                if self.check(TokenKind::RightBrace) {
                    break;
                }
                let key = self.parse_expression()?;
                if !self.expect(TokenKind::Colon, "expected ':' in dict entry") {
                    break;
                }
                let val = self.parse_expression()?;
                pairs.push((key, val));
            }
            self.expect(TokenKind::RightBrace, "expected '}' after dict");
            return Some(AstNode::DictLiteral {
                pairs,
                line: open.line,
            });
        }
        let mut elements = vec![first];
        while self.match_kind(TokenKind::Comma) {
            if self.check(TokenKind::RightBrace) {
                break;
            }
            elements.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RightBrace, "expected '}' after set");
        Some(AstNode::SetLiteral {
            elements,
            line: open.line,
        })
    }
}
