//! Lexical analysis for arithc
//!
//! Converts statement text into a token stream plus the identifier
//! display-name table.

mod scanner;
mod token;

pub use scanner::{lex, read_identifiers, Scanner};
pub use token::{DisplayNames, Token, TokenKind};
