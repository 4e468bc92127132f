// tests/lexer_tokens.rs
use pyrite::core::lexer::Lexer;
use pyrite::core::token::{TokenCategory, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::new(source).tokenize().iter().map(|t| t.kind).collect()
}

#[test]
fn simple_assignment_token_stream() {
    let mut lexer = Lexer::new("x = 5");
    let tokens = lexer.tokenize();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[0].lexeme, "x");
    assert_eq!(tokens[1].lexeme, "=");
    assert_eq!(tokens[2].lexeme, "5");
    assert_eq!(tokens[0].line, 1);
    assert_eq!(tokens[0].column, 1);
    assert_eq!(tokens[1].column, 3);
    assert_eq!(tokens[2].column, 5);
    assert!(lexer.errors().is_empty());
}

#[test]
fn float_is_one_token_but_attribute_dot_is_not() {
    let mut lexer = Lexer::new("3.14");
    let tokens = lexer.tokenize();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].lexeme, "3.14");

    assert_eq!(
        kinds("x.y"),
        vec![
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn trailing_dot_without_digit_stays_separate() {
    // `1.foo` must not absorb the dot into the number
    assert_eq!(
        kinds("1.foo"),
        vec![
            TokenKind::Number,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn floor_divide_assign_is_one_operator() {
    let mut lexer = Lexer::new("x //= 2");
    let tokens = lexer.tokenize();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::DoubleSlashAssign,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[1].lexeme, "//=");
}

#[test]
fn compound_operators_longest_match() {
    assert_eq!(
        kinds("a <<= 1"),
        vec![
            TokenKind::Identifier,
            TokenKind::LeftShiftAssign,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("b **= 2"),
        vec![
            TokenKind::Identifier,
            TokenKind::DoubleStarAssign,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("c @= d"),
        vec![
            TokenKind::Identifier,
            TokenKind::AtAssign,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("n := 1"),
        vec![
            TokenKind::Identifier,
            TokenKind::ColonAssign,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn shifts_and_comparisons_disambiguate() {
    assert_eq!(
        kinds("a << b <= c < d"),
        vec![
            TokenKind::Identifier,
            TokenKind::LeftShift,
            TokenKind::Identifier,
            TokenKind::LessEqual,
            TokenKind::Identifier,
            TokenKind::Less,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_and_type_names_are_reserved() {
    let tokens = Lexer::new("def f if elif None True frozenset NoneType while").tokenize();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Def,
            TokenKind::Identifier,
            TokenKind::If,
            TokenKind::Elif,
            TokenKind::None,
            TokenKind::True,
            TokenKind::TypeFrozenset,
            TokenKind::TypeNoneType,
            TokenKind::While,
            TokenKind::Eof,
        ]
    );
    for tok in &tokens {
        if tok.kind != TokenKind::Identifier && tok.kind != TokenKind::Eof {
            assert_eq!(tok.category(), TokenCategory::Keyword);
        }
    }
}

#[test]
fn eof_is_idempotent_with_stable_line() {
    let mut lexer = Lexer::new("x = 1\ny = 2");
    let _ = lexer.tokenize();
    let first = lexer.next_token();
    assert_eq!(first.kind, TokenKind::Eof);
    for _ in 0..5 {
        let again = lexer.next_token();
        assert_eq!(again.kind, TokenKind::Eof);
        assert_eq!(again.line, first.line);
    }
}

#[test]
fn operator_skeleton_round_trips() {
    let source = "a = (b + c) * d[0]";
    let tokens = Lexer::new(source).tokenize();
    let skeleton: String = tokens
        .iter()
        .filter(|t| {
            matches!(
                t.category(),
                TokenCategory::Operator | TokenCategory::Punctuation
            )
        })
        .map(|t| t.lexeme.as_str())
        .collect();
    assert_eq!(skeleton, "=(+)*[]");
}

#[test]
fn strings_keep_raw_escapes_and_delimiters() {
    let tokens = Lexer::new(r#"s = "a\"b""#).tokenize();
    assert_eq!(tokens[2].kind, TokenKind::String);
    assert_eq!(tokens[2].lexeme, r#""a\"b""#);

    let tokens = Lexer::new("t = 'ok'").tokenize();
    assert_eq!(tokens[2].kind, TokenKind::String);
    assert_eq!(tokens[2].lexeme, "'ok'");
}

#[test]
fn comments_are_stripped() {
    assert_eq!(
        kinds("x = 1  # trailing comment"),
        vec![
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}
