use super::token::{DisplayNames, Token, TokenKind};
use crate::error::{Error, Result};

/// Scanner for arithmetic assignment statements
pub struct Scanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Identifier display names, filled while scanning
    names: DisplayNames,
    /// Start position of current token
    start: usize,
    /// Current position in source
    current: usize,
}

impl Scanner {
    /// Creates a new scanner from source text
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            names: DisplayNames::new(),
            start: 0,
            current: 0,
        }
    }

    /// Scans all tokens from the source and returns them as a vector
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        tracing::trace!(count = self.tokens.len(), "scanned tokens");
        Ok(self.tokens.clone())
    }

    /// Identifier display names collected by [`Scanner::scan_tokens`]
    pub fn display_names(&self) -> &DisplayNames {
        &self.names
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.advance();

        match c {
            c if c.is_whitespace() => {}

            '=' => self.add_token(TokenKind::Assign),
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '+' | '-' | '*' | '/' => self.add_token(TokenKind::Operator),

            c if c.is_ascii_digit() => self.scan_number()?,
            '.' if self.peek().is_ascii_digit() => self.scan_number()?,

            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier()?,

            _ => {
                return Err(Error::lex(
                    self.start + 1,
                    format!("Invalid character '{}' at position {}", c, self.start),
                ));
            }
        }

        Ok(())
    }

    fn scan_number(&mut self) -> Result<()> {
        let mut has_dot = self.source[self.start] == '.';

        while self.peek().is_ascii_digit() || self.peek() == '.' {
            if self.peek() == '.' {
                if has_dot {
                    return Err(Error::lex(
                        self.current + 1,
                        format!("Invalid token '.' at position {}", self.current),
                    ));
                }
                has_dot = true;
            }
            self.advance();
        }

        let mut text: String = self.source[self.start..self.current].iter().collect();

        if self.peek().is_ascii_alphabetic() || self.peek() == '_' {
            return Err(Error::lex(
                self.current + 1,
                format!("Invalid token '{}' after number '{}'", self.peek(), text),
            ));
        }

        if text.starts_with('.') {
            text.insert(0, '0');
        }
        if text.ends_with('.') {
            text.push('0');
        }

        let kind = if has_dot {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        self.tokens.push(Token::new(kind, text, self.start + 1));
        Ok(())
    }

    fn scan_identifier(&mut self) -> Result<()> {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let ident: String = self.source[self.start..self.current].iter().collect();

        if self.peek() == '.' {
            return Err(Error::lex(
                self.current + 1,
                format!("Invalid token: identifier '{}' cannot be followed by '.'", ident),
            ));
        }

        if ident.eq_ignore_ascii_case("pi") {
            self.tokens
                .push(Token::new(TokenKind::Float, "3.14", self.start + 1));
        } else {
            self.names.intern(&ident);
            self.tokens
                .push(Token::new(TokenKind::Identifier, ident, self.start + 1));
        }
        Ok(())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, lexeme, self.start + 1));
    }
}

/// Scans `source` into tokens plus the identifier display-name table
pub fn lex(source: &str) -> Result<(Vec<Token>, DisplayNames)> {
    let mut scanner = Scanner::new(source);
    let tokens = scanner.scan_tokens()?;
    Ok((tokens, scanner.names))
}

/// Identifiers that are read somewhere in the statement
///
/// An occurrence immediately followed by `=` is a write; every other
/// occurrence is a read. Identifiers that are only ever written need no
/// declared type.
pub fn read_identifiers(tokens: &[Token]) -> Vec<String> {
    let mut read: Vec<String> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Identifier {
            continue;
        }
        let is_write = tokens
            .get(i + 1)
            .is_some_and(|next| next.kind == TokenKind::Assign);
        if !is_write && !read.contains(&token.lexeme) {
            read.push(token.lexeme.clone());
        }
    }
    read
}
