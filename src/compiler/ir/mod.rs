//! # Intermediate Representation (IR)
//!
//! Statements are lowered to three-address code over user identifiers,
//! literals and synthesized temporaries.
//!
//! ## Module Structure
//!
//! ```text
//! ir/
//! ├── mod.rs          # This file - module definition and re-exports
//! ├── instruction.rs  # Temp, Operand, Dest, IrInstruction (+ text form)
//! └── generator.rs    # IrGenerator (post-order tree lowering)
//! ```

mod generator;
mod instruction;

pub use generator::{generate, IrGenerator};
pub use instruction::{Dest, IrInstruction, Operand, Temp};

/// Parses one IR line per non-empty input line
pub fn parse_ir(text: &str) -> crate::Result<Vec<IrInstruction>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::parse)
        .collect()
}
