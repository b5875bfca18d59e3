//! # arithc Compiler - Assignment Statement to Two-Register Assembly
//!
//! This module drives one statement through every stage of the pipeline.
//!
//! ## Architecture
//!
//! ```text
//! Source → Tokens → Tree → Promoted Tree → IR → Optimized IR → Assembly
//! ```
//!
//! ## Usage
//!
//! ```
//! use arithc::compiler::{CompileOptions, Compiler};
//! use arithc::{ScalarType, TypeMap};
//!
//! let types: TypeMap = [("y", ScalarType::Int)].into_iter().collect();
//! let compiler = Compiler::new(CompileOptions::default());
//! let result = compiler.compile("x = y + 1.5", &types)?;
//! assert_eq!(result.assembly[0].to_string(), "LOADF R1, y");
//! # Ok::<(), arithc::Error>(())
//! ```

pub mod asm_codegen;
pub mod debug;
pub mod ir;
pub mod optimizer;

pub use asm_codegen::{emit, ArithOp, AsmGenerator, AsmInstruction, AsmOperand, Reg};
pub use debug::{format_asm, format_ir, format_tree};
pub use ir::{Dest, IrGenerator, IrInstruction, Operand, Temp};
pub use optimizer::Optimizer;

use crate::lexer::{lex, read_identifiers, DisplayNames, Token};
use crate::parser::{Expr, ExprParser};
use crate::types::{SemanticAnalyzer, TypeMap};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Handling of identifiers that are read but have no declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypePolicy {
    /// Undeclared identifiers resolve to INT
    #[default]
    Permissive,
    /// Undeclared identifiers are an error
    Strict,
}

/// Compilation options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Run the IR optimizer
    pub optimize: bool,
    /// Undeclared identifier handling
    pub type_policy: TypePolicy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            type_policy: TypePolicy::Permissive,
        }
    }
}

/// Every intermediate product of one compilation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResult {
    /// Lexer output
    pub tokens: Vec<Token>,
    /// Identifier display names (`x → ID1`)
    pub display_names: DisplayNames,
    /// Parser output
    pub syntax_tree: Expr,
    /// Tree after int_to_float promotion
    pub semantic_tree: Expr,
    /// Unoptimized IR
    pub ir: Vec<IrInstruction>,
    /// IR after optimization (equal to `ir` when optimization is off)
    pub optimized_ir: Vec<IrInstruction>,
    /// Final assembly
    pub assembly: Vec<AsmInstruction>,
}

/// Statement compiler
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// Create a new compiler with options
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Options this compiler was built with
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile one statement of source text
    pub fn compile(&self, source: &str, types: &TypeMap) -> Result<CompileResult> {
        let (tokens, display_names) = lex(source)?;
        let mut result = self.compile_tokens(tokens, types)?;
        result.display_names = display_names;
        Ok(result)
    }

    /// Compile a statement from an existing token stream
    ///
    /// The display-name table of the result is empty; [`Compiler::compile`]
    /// fills it from the lexer.
    pub fn compile_tokens(&self, tokens: Vec<Token>, types: &TypeMap) -> Result<CompileResult> {
        if self.options.type_policy == TypePolicy::Strict {
            check_declared(&tokens, types)?;
        }

        // Phase 1: Parse
        let syntax_tree = ExprParser::new(tokens.clone()).parse()?;

        // Phase 2: Promote
        let semantic_tree = SemanticAnalyzer::new(types).analyze(&syntax_tree);

        // Phase 3: Generate IR
        let ir = IrGenerator::new().generate(&semantic_tree);

        // Phase 4: Optimize
        let optimized_ir = if self.options.optimize {
            Optimizer::new().optimize(&ir)
        } else {
            ir.clone()
        };

        // Phase 5: Emit
        let assembly = AsmGenerator::new(types).generate(&optimized_ir);

        tracing::debug!(
            statement = %syntax_tree,
            ir = ir.len(),
            optimized = optimized_ir.len(),
            assembly = assembly.len(),
            "compiled statement"
        );

        Ok(CompileResult {
            tokens,
            display_names: DisplayNames::new(),
            syntax_tree,
            semantic_tree,
            ir,
            optimized_ir,
            assembly,
        })
    }

    /// Optimize (if enabled) and emit already-lowered IR
    pub fn compile_ir(
        &self,
        ir: &[IrInstruction],
        types: &TypeMap,
    ) -> (Vec<IrInstruction>, Vec<AsmInstruction>) {
        let optimized = if self.options.optimize {
            Optimizer::new().optimize(ir)
        } else {
            ir.to_vec()
        };
        let assembly = AsmGenerator::new(types).generate(&optimized);
        (optimized, assembly)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

fn check_declared(tokens: &[Token], types: &TypeMap) -> Result<()> {
    match read_identifiers(tokens)
        .into_iter()
        .find(|name| !types.contains(name))
    {
        Some(name) => {
            tracing::warn!(%name, "identifier has no declared type");
            Err(Error::UndeclaredType { name })
        }
        None => Ok(()),
    }
}
