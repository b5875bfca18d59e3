//! # IR Optimizer
//!
//! Single forward pass plus renumbering:
//! - Forward substitution of trivial temporaries (literal, identifier,
//!   `int_to_float(...)`)
//! - Merge of a complex temporary into the user assignment that consumes it
//!   right after its definition
//! - Contiguous renumbering of the surviving temporaries

use super::ir::{Dest, IrInstruction, Operand, Temp};
use std::collections::HashMap;

/// Forward-substitution and merge optimizer
///
/// State is per call to [`Optimizer::optimize`].
pub struct Optimizer {
    /// Inlinable definitions of deferred temporaries
    definitions: HashMap<Temp, Operand>,
    /// Output index and temporary of the most recent complex instruction
    last_complex: Option<(usize, Temp)>,
}

impl Optimizer {
    /// Creates a new optimizer
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            last_complex: None,
        }
    }

    /// Optimizes an instruction list, returning a new one
    pub fn optimize(&mut self, instructions: &[IrInstruction]) -> Vec<IrInstruction> {
        self.definitions.clear();
        self.last_complex = None;

        let mut optimized: Vec<IrInstruction> = Vec::with_capacity(instructions.len());
        let mut merged = 0usize;

        for instr in instructions {
            let instr = self.substitute(instr);

            match (instr.dest().clone(), instr) {
                (Dest::Temp(temp), IrInstruction::Assign { src, .. }) => {
                    self.definitions.insert(temp, src);
                }
                (Dest::Temp(temp), complex) => {
                    optimized.push(complex);
                    self.last_complex = Some((optimized.len() - 1, temp));
                }
                (Dest::Var(name), instr) => {
                    let merge_into = match (&instr, self.last_complex) {
                        (IrInstruction::Assign { src, .. }, Some((index, temp)))
                            if *src == Operand::Temp(temp) =>
                        {
                            Some(index)
                        }
                        _ => None,
                    };

                    match merge_into {
                        Some(index) => {
                            let previous = optimized[index].clone();
                            optimized[index] = previous.with_dest(Dest::Var(name));
                            merged += 1;
                        }
                        None => optimized.push(instr),
                    }
                    self.last_complex = None;
                }
            }
        }

        let deferred = self.definitions.len();
        let renumbered = renumber(optimized);

        tracing::debug!(
            input = instructions.len(),
            output = renumbered.len(),
            deferred,
            merged,
            "optimized IR"
        );
        renumbered
    }

    fn substitute(&self, instr: &IrInstruction) -> IrInstruction {
        let lookup = |temp: Temp| self.definitions.get(&temp).cloned();
        match instr {
            IrInstruction::Assign { dest, src } => IrInstruction::Assign {
                dest: dest.clone(),
                src: src.substitute(&lookup),
            },
            IrInstruction::BinOp { dest, op, lhs, rhs } => IrInstruction::BinOp {
                dest: dest.clone(),
                op: *op,
                lhs: lhs.substitute(&lookup),
                rhs: rhs.substitute(&lookup),
            },
        }
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Renames temporaries to `temp1..tempK` in first-definition order
fn renumber(instructions: Vec<IrInstruction>) -> Vec<IrInstruction> {
    let mut names: HashMap<Temp, Temp> = HashMap::new();
    for instr in &instructions {
        if let Some(temp) = instr.dest().as_temp() {
            let next = Temp(names.len() as u32 + 1);
            names.entry(temp).or_insert(next);
        }
    }

    let lookup = |temp: Temp| names.get(&temp).copied().map(Operand::Temp);
    let rename_dest = |dest: &Dest| match dest {
        Dest::Temp(temp) => Dest::Temp(names.get(temp).copied().unwrap_or(*temp)),
        Dest::Var(name) => Dest::Var(name.clone()),
    };

    instructions
        .iter()
        .map(|instr| match instr {
            IrInstruction::Assign { dest, src } => IrInstruction::Assign {
                dest: rename_dest(dest),
                src: src.substitute(&lookup),
            },
            IrInstruction::BinOp { dest, op, lhs, rhs } => IrInstruction::BinOp {
                dest: rename_dest(dest),
                op: *op,
                lhs: lhs.substitute(&lookup),
                rhs: rhs.substitute(&lookup),
            },
        })
        .collect()
}

/// Optimizes `instructions` with a fresh optimizer
pub fn optimize(instructions: &[IrInstruction]) -> Vec<IrInstruction> {
    Optimizer::new().optimize(instructions)
}
