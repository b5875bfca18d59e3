//! Parser for arithmetic assignment statements
//!
//! Builds a binary expression tree from the token stream, honoring `*`/`/`
//! over `+`/`-` precedence and a single top-level assignment.

mod ast;
mod expr_parser;

pub use ast::{BinaryOp, Expr, INT_TO_FLOAT};
pub use expr_parser::{parse, ExprParser, MAX_NESTING};
