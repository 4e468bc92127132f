// src/core/lexer.rs
//! Hand-written, indentation-aware scanner.
//!
//! Pull model: `next_token` produces one token per call and keeps going on
//! malformed input. Every failure path downgrades to an `Unknown` token plus
//! an appended diagnostic; scanning always reaches end of input.

use once_cell::sync::Lazy;
use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::core::symbols::{literal_type, SymbolInfo, SymbolTable};
use crate::core::token::{Token, TokenKind};

/// Identifier length cap carried over from the 79-character limit of the
/// original language tooling.
pub const MAX_IDENTIFIER_LEN: usize = 79;

/// Reserved words, including the built-in type names.
static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    HashMap::from([
        ("and", And),
        ("as", As),
        ("assert", Assert),
        ("async", Async),
        ("await", Await),
        ("break", Break),
        ("class", Class),
        ("continue", Continue),
        ("def", Def),
        ("del", Del),
        ("elif", Elif),
        ("else", Else),
        ("except", Except),
        ("False", False),
        ("finally", Finally),
        ("for", For),
        ("from", From),
        ("global", Global),
        ("if", If),
        ("import", Import),
        ("in", In),
        ("is", Is),
        ("lambda", Lambda),
        ("None", None),
        ("nonlocal", Nonlocal),
        ("not", Not),
        ("or", Or),
        ("pass", Pass),
        ("raise", Raise),
        ("return", Return),
        ("True", True),
        ("try", Try),
        ("while", While),
        ("with", With),
        ("yield", Yield),
        ("str", TypeStr),
        ("int", TypeInt),
        ("float", TypeFloat),
        ("complex", TypeComplex),
        ("list", TypeList),
        ("tuple", TypeTuple),
        ("range", TypeRange),
        ("dict", TypeDict),
        ("set", TypeSet),
        ("frozenset", TypeFrozenset),
        ("bool", TypeBool),
        ("bytes", TypeBytes),
        ("bytearray", TypeBytearray),
        ("memoryview", TypeMemoryview),
        ("NoneType", TypeNoneType),
    ])
});

/// Characters that can begin a known symbol token (or a comment/string).
/// Panic recovery stops a bad-character run at any of these.
const SYMBOL_START_CHARS: &[char] = &[
    '+', '-', '*', '/', '%', '@', '&', '|', '^', '<', '>', '=', '!', ':', ';', ',', '.', '(',
    ')', '[', ']', '{', '}', '~', '"', '\'', '#',
];

fn is_symbol_start(ch: char) -> bool {
    SYMBOL_START_CHARS.contains(&ch)
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

/// A recoverable scanning diagnostic. Appended once per failure; the
/// offending text is kept verbatim in `lexeme`.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub lexeme: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lexeme.is_empty() {
            write!(f, "Lexical error at line {}: {}", self.line, self.message)
        } else {
            write!(
                f,
                "Lexical error at line {}: {} '{}'",
                self.line, self.message, self.lexeme
            )
        }
    }
}

impl std::error::Error for LexError {}

/// Tracks the `name = literal` adjacency used for the best-effort symbol
/// type guess. Reset at every statement boundary.
enum AssignScan {
    StmtStart,
    SawName(String),
    SawAssign(String),
    Other,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    /// Indentation stack; the bottom entry is the implicit zero level.
    indents: Vec<usize>,
    /// Indent/Dedent tokens waiting to be handed out.
    pending: VecDeque<Token>,
    /// Open `(`/`[`/`{` depth; newlines inside brackets are joined.
    nesting: usize,
    at_line_start: bool,
    reached_eof: bool,
    eof_line: usize,
    eof_column: usize,
    symbols: SymbolTable,
    errors: Vec<LexError>,
    assign_scan: AssignScan,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            indents: vec![0],
            pending: VecDeque::new(),
            nesting: 0,
            at_line_start: true,
            reached_eof: false,
            eof_line: 1,
            eof_column: 1,
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            assign_scan: AssignScan::StmtStart,
        }
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Produces the next token. Idempotent at end of input: once `Eof` has
    /// been returned, every further call returns `Eof` at the same line.
    pub fn next_token(&mut self) -> Token {
        let token = self.scan_token();
        self.observe(&token);
        token
    }

    /// Drains the stream into a vector, `Eof` token included.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn scan_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return token;
            }
            if self.reached_eof {
                return Token::new(TokenKind::Eof, "", self.eof_line, self.eof_column);
            }
            if self.at_line_start && self.nesting == 0 {
                self.measure_indentation();
                continue;
            }
            let ch = match self.current() {
                Some(ch) => ch,
                Option::None => {
                    self.finish();
                    continue;
                }
            };
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    let (line, column) = (self.line, self.column);
                    self.advance();
                    if self.nesting == 0 {
                        self.at_line_start = true;
                        return Token::new(TokenKind::Newline, "", line, column);
                    }
                }
                '#' => self.skip_line_comment(),
                '"' if self.matches_triple() => self.skip_triple_quoted(),
                '"' | '\'' => return self.lex_string(ch),
                _ if ch.is_ascii_digit() => return self.lex_number(),
                _ if is_identifier_start(ch) => return self.lex_identifier(),
                _ => {
                    if let Some(token) = self.lex_symbol(ch) {
                        return token;
                    }
                    return self.lex_unknown_run();
                }
            }
        }
    }

    #[inline]
    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    #[inline]
    fn advance(&mut self) {
        if let Some(ch) = self.current() {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn collect_from(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn push_error(&mut self, message: impl Into<String>, line: usize, lexeme: &str) {
        self.errors.push(LexError {
            message: message.into(),
            line,
            lexeme: lexeme.to_string(),
        });
    }

    /// Consumes leading whitespace, blank lines, and comment-only lines at
    /// the start of a logical line, then reconciles the indent stack with
    /// the measured width. Queues Indent/Dedent tokens as needed.
    fn measure_indentation(&mut self) {
        loop {
            let mut width = 0usize;
            loop {
                match self.current() {
                    Some(' ') => {
                        width += 1;
                        self.advance();
                    }
                    Some('\t') => {
                        width += 8 - (width % 8);
                        self.advance();
                    }
                    Some('\r') => {
                        self.advance();
                    }
                    _ => break,
                }
            }
            match self.current() {
                Some('\n') => {
                    self.advance();
                }
                Some('#') => {
                    self.skip_line_comment();
                }
                Option::None => {
                    self.at_line_start = false;
                    return;
                }
                Some(_) => {
                    self.compare_indent(width);
                    self.at_line_start = false;
                    return;
                }
            }
        }
    }

    fn compare_indent(&mut self, width: usize) {
        let line = self.line;
        let top = self.indents.last().copied().unwrap_or(0);
        if width > top {
            self.indents.push(width);
            self.pending
                .push_back(Token::new(TokenKind::Indent, "", line, 1));
        } else if width < top {
            while self.indents.last().copied().unwrap_or(0) > width && self.indents.len() > 1 {
                self.indents.pop();
                self.pending
                    .push_back(Token::new(TokenKind::Dedent, "", line, 1));
            }
            if self.indents.last().copied().unwrap_or(0) != width {
                self.push_error("inconsistent dedent", line, "");
            }
        }
    }

    /// Queues the dedents still open at end of input and latches Eof.
    fn finish(&mut self) {
        while self.indents.len() > 1 {
            self.indents.pop();
            self.pending
                .push_back(Token::new(TokenKind::Dedent, "", self.line, 1));
        }
        self.reached_eof = true;
        self.eof_line = self.line;
        self.eof_column = self.column;
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn matches_triple(&self) -> bool {
        self.peek_at(0) == Some('"') && self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"')
    }

    /// Skips a `"""` region verbatim, embedded newlines included. The
    /// region is treated as a comment/docstring, never tokenized.
    fn skip_triple_quoted(&mut self) {
        let line = self.line;
        for _ in 0..3 {
            self.advance();
        }
        loop {
            if self.matches_triple() {
                for _ in 0..3 {
                    self.advance();
                }
                return;
            }
            match self.current() {
                Some(_) => self.advance(),
                Option::None => {
                    self.push_error("unterminated triple-quoted block", line, "\"\"\"");
                    return;
                }
            }
        }
    }

    /// Single- or double-quoted string. A backslash consumes the following
    /// character raw; no unescaping is performed, the lexeme keeps the
    /// delimiters and escapes exactly as written. A bare newline before the
    /// closing quote, or end of input, is an unterminated-string error.
    fn lex_string(&mut self, quote: char) -> Token {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        self.advance();
        loop {
            match self.current() {
                Some(ch) if ch == quote => {
                    self.advance();
                    return Token::new(TokenKind::String, self.collect_from(start), line, column);
                }
                Some('\\') => {
                    self.advance();
                    if self.current().is_some() {
                        self.advance();
                    }
                }
                Some('\n') | Option::None => {
                    let text = self.collect_from(start);
                    self.push_error("unterminated string", line, &text);
                    return Token::new(TokenKind::Unknown, text, line, column);
                }
                Some(_) => self.advance(),
            }
        }
    }

    /// One or more digits, with a fractional part only when a digit
    /// actually follows the dot, so `x.y` never steals the attribute dot.
    /// No exponents, no underscore separators.
    fn lex_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        while matches!(self.current(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
        }
        if self.current() == Some('.')
            && matches!(self.peek_at(1), Some(ch) if ch.is_ascii_digit())
        {
            self.advance();
            while matches!(self.current(), Some(ch) if ch.is_ascii_digit()) {
                self.advance();
            }
        }
        Token::new(TokenKind::Number, self.collect_from(start), line, column)
    }

    fn lex_identifier(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        while matches!(self.current(), Some(ch) if is_identifier_part(ch)) {
            self.advance();
        }
        let text = self.collect_from(start);
        if let Some(&kind) = KEYWORDS.get(text.as_str()) {
            return Token::new(kind, text, line, column);
        }
        if text.chars().count() > MAX_IDENTIFIER_LEN {
            self.push_error(
                format!("identifier longer than {} characters", MAX_IDENTIFIER_LEN),
                line,
                &text,
            );
            return Token::new(TokenKind::Unknown, text, line, column);
        }
        self.symbols
            .entry(text.clone())
            .or_insert_with(|| SymbolInfo::undiscovered(&text));
        Token::new(TokenKind::Identifier, text, line, column)
    }

    /// Longest-match over the fixed operator/punctuation table. Returns
    /// None when `ch` starts no known symbol (panic recovery takes over).
    fn lex_symbol(&mut self, ch: char) -> Option<Token> {
        use TokenKind::*;
        let (line, column) = (self.line, self.column);
        let one = self.peek_at(1);
        let two = self.peek_at(2);
        let (kind, len): (TokenKind, usize) = match ch {
            '+' => match one {
                Some('=') => (PlusAssign, 2),
                _ => (Plus, 1),
            },
            '-' => match one {
                Some('=') => (MinusAssign, 2),
                Some('>') => (Arrow, 2),
                _ => (Minus, 1),
            },
            '*' => match (one, two) {
                (Some('*'), Some('=')) => (DoubleStarAssign, 3),
                (Some('*'), _) => (DoubleStar, 2),
                (Some('='), _) => (StarAssign, 2),
                _ => (Star, 1),
            },
            '/' => match (one, two) {
                (Some('/'), Some('=')) => (DoubleSlashAssign, 3),
                (Some('/'), _) => (DoubleSlash, 2),
                (Some('='), _) => (SlashAssign, 2),
                _ => (Slash, 1),
            },
            '%' => match one {
                Some('=') => (PercentAssign, 2),
                _ => (Percent, 1),
            },
            '@' => match one {
                Some('=') => (AtAssign, 2),
                _ => (At, 1),
            },
            '&' => match one {
                Some('=') => (AmpersandAssign, 2),
                _ => (Ampersand, 1),
            },
            '|' => match one {
                Some('=') => (PipeAssign, 2),
                _ => (Pipe, 1),
            },
            '^' => match one {
                Some('=') => (CaretAssign, 2),
                _ => (Caret, 1),
            },
            '<' => match (one, two) {
                (Some('<'), Some('=')) => (LeftShiftAssign, 3),
                (Some('<'), _) => (LeftShift, 2),
                (Some('='), _) => (LessEqual, 2),
                _ => (Less, 1),
            },
            '>' => match (one, two) {
                (Some('>'), Some('=')) => (RightShiftAssign, 3),
                (Some('>'), _) => (RightShift, 2),
                (Some('='), _) => (GreaterEqual, 2),
                _ => (Greater, 1),
            },
            '=' => match one {
                Some('=') => (EqualEqual, 2),
                _ => (Assign, 1),
            },
            '!' => match one {
                Some('=') => (NotEqual, 2),
                _ => return Option::None,
            },
            ':' => match one {
                Some('=') => (ColonAssign, 2),
                _ => (Colon, 1),
            },
            '~' => (Tilde, 1),
            ',' => (Comma, 1),
            ';' => (Semicolon, 1),
            '.' => (Dot, 1),
            '(' => (LeftParen, 1),
            ')' => (RightParen, 1),
            '[' => (LeftBracket, 1),
            ']' => (RightBracket, 1),
            '{' => (LeftBrace, 1),
            '}' => (RightBrace, 1),
            _ => return Option::None,
        };
        match kind {
            LeftParen | LeftBracket | LeftBrace => self.nesting += 1,
            RightParen | RightBracket | RightBrace => {
                self.nesting = self.nesting.saturating_sub(1)
            }
            _ => {}
        }
        let start = self.pos;
        for _ in 0..len {
            self.advance();
        }
        Some(Token::new(kind, self.collect_from(start), line, column))
    }

    /// Panic recovery: consume a maximal run of characters that cannot
    /// start any token, report one aggregated error for the whole run, and
    /// emit a single Unknown token carrying it.
    fn lex_unknown_run(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        while let Some(ch) = self.current() {
            if ch.is_whitespace()
                || ch.is_ascii_alphanumeric()
                || ch == '_'
                || is_symbol_start(ch)
            {
                break;
            }
            self.advance();
        }
        if self.pos == start {
            // The lone character was symbol-shaped but formed no token
            // (e.g. a bare '!').
            self.advance();
        }
        let text = self.collect_from(start);
        self.push_error("unknown symbols", line, &text);
        Token::new(TokenKind::Unknown, text, line, column)
    }

    /// Feeds every emitted token through the shallow assignment
    /// recognizer that upgrades symbol-table entries on `name = literal`.
    fn observe(&mut self, token: &Token) {
        use TokenKind::*;
        match token.kind {
            Newline | Semicolon | Indent | Dedent => {
                self.assign_scan = AssignScan::StmtStart;
                return;
            }
            Eof => return,
            _ => {}
        }
        self.assign_scan = match std::mem::replace(&mut self.assign_scan, AssignScan::Other) {
            AssignScan::StmtStart if token.kind == Identifier => {
                AssignScan::SawName(token.lexeme.clone())
            }
            AssignScan::SawName(name) if matches!(token.kind, Assign | ColonAssign) => {
                AssignScan::SawAssign(name)
            }
            AssignScan::SawAssign(name) => {
                if let Some(ty) = literal_type(token.kind, &token.lexeme) {
                    if let Some(info) = self.symbols.get_mut(&name) {
                        info.ty = ty.to_string();
                        info.value = token.lexeme.clone();
                    }
                }
                AssignScan::Other
            }
            _ => AssignScan::Other,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keyword_table_reserves_type_names() {
        assert_eq!(KEYWORDS.get("frozenset"), Some(&TokenKind::TypeFrozenset));
        assert_eq!(KEYWORDS.get("NoneType"), Some(&TokenKind::TypeNoneType));
        assert_eq!(KEYWORDS.get("elif"), Some(&TokenKind::Elif));
        assert!(KEYWORDS.get("foo").is_none());
    }

    #[test]
    fn tabs_advance_to_eight_column_stops() {
        let mut lexer = Lexer::new("if x:\n\tpass");
        let tokens = lexer.tokenize();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Indent));
        assert!(lexer.errors().is_empty());
    }

    #[test]
    fn arrow_and_minus_disambiguate() {
        assert_eq!(
            kinds("a->b-c-=d"),
            vec![
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::Identifier,
                TokenKind::Minus,
                TokenKind::Identifier,
                TokenKind::MinusAssign,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }
}
