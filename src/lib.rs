//! # arithc - An Arithmetic Statement Compiler
//!
//! Compiles one assignment statement (`x = (1 + 2) * y`) to assembly for a
//! small load/store machine with two registers.
//!
//! ## Features
//!
//! - **Implicit promotion** - Integer operands in a statement that touches a
//!   float are wrapped in explicit `int_to_float` conversions
//! - **Three-address IR** - Structured instructions with a stable text form
//! - **Optimizer** - Forward substitution, merge into the final assignment,
//!   contiguous temporary renumbering
//! - **Two-register backend** - Residency tracking, commutative operand
//!   reordering and immediates
//!
//! ## Quick Start
//!
//! ```rust
//! use arithc::{Compiler, CompileOptions, TypeMap};
//!
//! # fn main() -> arithc::Result<()> {
//! let compiler = Compiler::new(CompileOptions::default());
//! let result = compiler.compile("x = 3 + 4", &TypeMap::new())?;
//!
//! let asm: Vec<String> = result.assembly.iter().map(|i| i.to_string()).collect();
//! assert_eq!(asm, ["LOAD R1, #3", "ADD R1, R1, #4", "STR x, R1"]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Stage by Stage
//!
//! Every stage is also usable on its own:
//!
//! ```rust
//! use arithc::{analyze, emit, generate, lex, optimize, parse, ScalarType, TypeMap};
//!
//! # fn main() -> arithc::Result<()> {
//! let types: TypeMap = [("y", ScalarType::Int)].into_iter().collect();
//!
//! let (tokens, _names) = lex("x = y + 1.5")?;
//! let tree = parse(tokens)?;
//! let promoted = analyze(&tree, &types);
//! let ir = generate(&promoted);
//! assert_eq!(ir[0].to_string(), "temp1 = int_to_float(y)");
//!
//! let optimized = optimize(&ir);
//! assert_eq!(optimized[0].to_string(), "x = int_to_float(y) + 1.5");
//!
//! let asm = emit(&optimized, &types);
//! assert_eq!(asm[1].to_string(), "ADDF R1, R1, #1.5");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source → Scanner → Tokens → ExprParser → Expr → SemanticAnalyzer → Expr
//!        → IrGenerator → IR → Optimizer → IR → AsmGenerator → Assembly
//! ```
//!
//! ### Main Components
//!
//! - [`Scanner`] - Tokenizes a statement
//! - [`ExprParser`] - Builds the binary statement tree
//! - [`SemanticAnalyzer`] - Inserts `int_to_float` promotions
//! - [`IrGenerator`] - Lowers the tree to three-address code
//! - [`Optimizer`] - Removes trivial temporaries
//! - [`AsmGenerator`] - Emits two-register assembly
//! - [`Compiler`] - Runs all of the above
//!
//! ## Error Handling
//!
//! ```rust
//! use arithc::{Compiler, Error, TypeMap};
//!
//! let err = Compiler::default().compile("x = + 1", &TypeMap::new()).unwrap_err();
//! assert!(matches!(err, Error::SyntaxError { position: 0, .. }));
//! assert!(err.to_string().contains("operator at position 0"));
//! ```

/// Version of the arithc compiler
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod types;

// Re-export main types
pub use compiler::ir::{generate, parse_ir};
pub use compiler::optimizer::optimize;
pub use compiler::{
    emit, AsmGenerator, AsmInstruction, CompileOptions, CompileResult, Compiler, IrGenerator,
    IrInstruction, Optimizer, TypePolicy,
};
pub use error::{Error, ErrorSeverity, Result};
pub use lexer::{lex, read_identifiers, DisplayNames, Scanner, Token, TokenKind};
pub use parser::{parse, BinaryOp, Expr, ExprParser};
pub use types::{analyze, ScalarType, SemanticAnalyzer, TypeMap};
