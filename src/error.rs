//! Error types for the arithc compiler

use thiserror::Error;

/// Compilation errors
///
/// Every stage either returns a complete structure or one of these. None of
/// them are recovered inside the pipeline; the caller reports the failure and
/// moves on to the next statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid character or malformed number/identifier in the source text
    ///
    /// **Triggered by:** characters outside the statement alphabet, `1.2.3`,
    /// `3x`, `x.y`
    #[error("Lexer error at column {column}: {message}")]
    LexError {
        /// Column where the scanner stopped (1-indexed)
        column: usize,
        /// Error description
        message: String,
    },

    /// Syntax error encountered during tree construction
    ///
    /// **Triggered by:** empty input, missing or misplaced `=`, unmatched
    /// parentheses, an operator with no operand on one side
    /// **Example:** `x = + 1` (operator at position 0 of the expression)
    #[error("Syntax error at position {position}: {message}")]
    SyntaxError {
        /// Index of the offending item in the list being reduced
        position: usize,
        /// Error description
        message: String,
    },

    /// An identifier is read but has no declared type (strict policy only)
    #[error("No type declared for identifier '{name}'")]
    UndeclaredType {
        /// Identifier name
        name: String,
    },

    /// A textual IR line could not be parsed back into an instruction
    #[error("Invalid IR line '{line}': {reason}")]
    IrParseError {
        /// The offending line
        line: String,
        /// Why it was rejected
        reason: String,
    },

    /// A type name other than `int` or `float`
    #[error("Invalid type name '{0}' (expected int or float)")]
    InvalidTypeName(String),
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Aborts the current statement
    Fatal,
    /// Caller may fix the input and retry
    Recoverable,
}

impl Error {
    /// Create a syntax error at the given position
    pub fn syntax(position: usize, msg: impl Into<String>) -> Self {
        Error::SyntaxError {
            position,
            message: msg.into(),
        }
    }

    /// Create a lexer error at the given column
    pub fn lex(column: usize, msg: impl Into<String>) -> Self {
        Error::LexError {
            column,
            message: msg.into(),
        }
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::LexError { .. } | Error::SyntaxError { .. } => ErrorSeverity::Fatal,
            Error::IrParseError { .. } => ErrorSeverity::Fatal,
            Error::UndeclaredType { .. } | Error::InvalidTypeName(_) => {
                ErrorSeverity::Recoverable
            }
        }
    }
}

/// Result type for arithc operations
pub type Result<T> = std::result::Result<T, Error>;
