use serde::{Deserialize, Serialize};
use std::fmt;

/// A single token from the statement text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Token text (numbers are normalized, `pi` becomes `3.14`)
    pub lexeme: String,
    /// Column number where the token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, column: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            column,
        }
    }

    /// True for `+ - * /` tokens
    pub fn is_operator(&self) -> bool {
        self.kind == TokenKind::Operator
    }

    /// True for identifier and number tokens
    pub fn is_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::Int | TokenKind::Float
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(type={}, value='{}')", self.kind, self.lexeme)
    }
}

/// All token types of the statement language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Identifier (`x`, `rate_2`)
    Identifier,
    /// Integer literal (no decimal point)
    Int,
    /// Floating-point literal (contains a decimal point)
    Float,
    /// Assignment operator (=)
    Assign,
    /// Binary operator (+ - * /)
    Operator,
    /// Left parenthesis
    LeftParen,
    /// Right parenthesis
    RightParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Operator => "OPERATOR",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
        };
        f.write_str(name)
    }
}

/// Identifier to display-name table (`x` → `ID1`)
///
/// Names are handed out in first-occurrence order. The table is only used
/// when printing trees; code generation always works on the real names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNames {
    entries: Vec<(String, String)>,
}

impl DisplayNames {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an identifier, returning its display name
    pub fn intern(&mut self, ident: &str) -> &str {
        let idx = match self.entries.iter().position(|(name, _)| name == ident) {
            Some(idx) => idx,
            None => {
                let display = format!("ID{}", self.entries.len() + 1);
                self.entries.push((ident.to_string(), display));
                self.entries.len() - 1
            }
        };
        &self.entries[idx].1
    }

    /// Looks up the display name of an identifier
    pub fn get(&self, ident: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == ident)
            .map(|(_, display)| display.as_str())
    }

    /// Display name of `ident`, or `ident` itself when it is not in the table
    pub fn display<'a>(&'a self, ident: &'a str) -> &'a str {
        self.get(ident).unwrap_or(ident)
    }

    /// Iterates `(identifier, display name)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }

    /// Number of registered identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no identifier has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_are_stable() {
        let mut names = DisplayNames::new();
        assert_eq!(names.intern("x"), "ID1");
        assert_eq!(names.intern("y"), "ID2");
        assert_eq!(names.intern("x"), "ID1");
        assert_eq!(names.len(), 2);
        assert_eq!(names.display("y"), "ID2");
        assert_eq!(names.display("z"), "z");
    }

    #[test]
    fn test_token_display() {
        let token = Token::new(TokenKind::Int, "3", 5);
        assert_eq!(token.to_string(), "Token(type=INT, value='3')");
    }
}
