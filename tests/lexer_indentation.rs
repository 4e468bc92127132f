// tests/lexer_indentation.rs
use pyrite::core::lexer::Lexer;
use pyrite::core::token::TokenKind;

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::new(source).tokenize().iter().map(|t| t.kind).collect()
}

#[test]
fn block_emits_indent_and_dedent() {
    assert_eq!(
        kinds("if x:\n    y = 1\n"),
        vec![
            TokenKind::If,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn closing_two_levels_emits_two_dedents() {
    let tokens = kinds("if a:\n  if b:\n    pass\nz = 1");
    let dedents = tokens.iter().filter(|k| **k == TokenKind::Dedent).count();
    assert_eq!(dedents, 2);
    // both dedents arrive before the z identifier
    let first_dedent = tokens.iter().position(|k| *k == TokenKind::Dedent);
    let z_pos = tokens.iter().rposition(|k| *k == TokenKind::Identifier);
    assert!(first_dedent.unwrap() < z_pos.unwrap());
}

#[test]
fn dedents_still_close_at_eof_without_trailing_newline() {
    let tokens = kinds("while t:\n    pass");
    assert!(tokens.contains(&TokenKind::Indent));
    assert!(tokens.contains(&TokenKind::Dedent));
    assert_eq!(tokens.last(), Some(&TokenKind::Eof));
}

#[test]
fn no_newline_is_synthesized_at_eof() {
    assert_eq!(
        kinds("x = 5"),
        vec![
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn blank_and_comment_lines_emit_nothing() {
    assert_eq!(
        kinds("x = 1\n\n   \n# note\ny = 2"),
        vec![
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn newlines_inside_brackets_are_joined() {
    let tokens = kinds("x = (1 +\n     2)\ny = 3");
    let newlines = tokens.iter().filter(|k| **k == TokenKind::Newline).count();
    assert_eq!(newlines, 1);
    assert!(!tokens.contains(&TokenKind::Indent));

    let tokens = kinds("items = [\n    1,\n    2,\n]");
    assert!(!tokens.contains(&TokenKind::Indent));
    assert!(!tokens.contains(&TokenKind::Newline));
}

#[test]
fn tab_indentation_works() {
    let mut lexer = Lexer::new("if x:\n\ty = 1\n");
    let tokens = lexer.tokenize();
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Indent));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Dedent));
    assert!(lexer.errors().is_empty());
}

#[test]
fn inconsistent_dedent_is_reported_but_recoverable() {
    let mut lexer = Lexer::new("if a:\n    pass\n  x = 1\n");
    let tokens = lexer.tokenize();
    assert_eq!(lexer.errors().len(), 1);
    assert_eq!(lexer.errors()[0].message, "inconsistent dedent");
    // scanning continued past the bad line
    assert!(tokens
        .iter()
        .any(|t| t.kind == TokenKind::Identifier && t.lexeme == "x"));
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
}
