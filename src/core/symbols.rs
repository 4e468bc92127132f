// src/core/symbols.rs
//! Identifier symbol table with a best-effort literal type guess.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::token::TokenKind;

/// One discovered identifier. `ty` and `value` stay at their defaults
/// until a simple `name = literal` (or `name := literal`) pattern is
/// recognized in the token stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: String,
}

impl SymbolInfo {
    pub fn undiscovered(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: "unknown".to_string(),
            value: "undefined".to_string(),
        }
    }
}

/// Ordered so consumers iterate sorted by name.
pub type SymbolTable = BTreeMap<String, SymbolInfo>;

/// Best-effort type label for a literal token. Not type inference: a
/// shallow single-assignment heuristic over adjacent tokens.
pub fn literal_type(kind: TokenKind, lexeme: &str) -> Option<&'static str> {
    match kind {
        TokenKind::Number => {
            if lexeme.contains('.') {
                Some("float")
            } else {
                Some("int")
            }
        }
        TokenKind::String => Some("str"),
        TokenKind::True | TokenKind::False => Some("bool"),
        TokenKind::None => Some("NoneType"),
        _ => Option::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_types_cover_the_label_set() {
        assert_eq!(literal_type(TokenKind::Number, "5"), Some("int"));
        assert_eq!(literal_type(TokenKind::Number, "3.14"), Some("float"));
        assert_eq!(literal_type(TokenKind::String, "\"hi\""), Some("str"));
        assert_eq!(literal_type(TokenKind::True, "True"), Some("bool"));
        assert_eq!(literal_type(TokenKind::None, "None"), Some("NoneType"));
        assert_eq!(literal_type(TokenKind::Identifier, "y"), None);
    }

    #[test]
    fn undiscovered_defaults() {
        let info = SymbolInfo::undiscovered("x");
        assert_eq!(info.ty, "unknown");
        assert_eq!(info.value, "undefined");
    }

    #[test]
    fn serializes_with_type_key() {
        let info = SymbolInfo::undiscovered("x");
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"type\":\"unknown\""));
    }
}
