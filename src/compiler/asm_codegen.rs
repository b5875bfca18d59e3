//! # Two-Register Assembly Generator
//!
//! Lowers optimized IR to a tiny load/store machine with two registers.
//!
//! ## Key Technical Details
//! - R1 is the accumulator; R2 is scratch unless R1 already holds a
//!   temporary that is still needed, in which case the new temporary is
//!   computed in R2.
//! - Each register remembers which temporary it holds, so a temporary that
//!   is already resident is never reloaded.
//! - `+` and `*` are reordered to keep literals on the right and the
//!   resident value on the left.
//! - Float operations carry an `F` suffix (`ADDF`, `LOADF`, `STRF`).
//! - If a third live value ever needs a register, the victim is stored to
//!   a spill slot (`STR spill1, R1`) and reloaded from it. Slot names use a
//!   prefix that no identifier of the statement starts with.

use super::ir::{Dest, IrInstruction, Operand, Temp};
use crate::parser::BinaryOp;
use crate::types::{ScalarType, TypeMap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Physical register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg {
    /// Accumulator
    R1,
    /// Scratch / second accumulator
    R2,
}

impl Reg {
    /// Both registers, in allocation preference order
    pub const ALL: [Reg; 2] = [Reg::R1, Reg::R2];

    fn index(self) -> usize {
        match self {
            Reg::R1 => 0,
            Reg::R2 => 1,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::R1 => f.write_str("R1"),
            Reg::R2 => f.write_str("R2"),
        }
    }
}

/// Assembly operand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsmOperand {
    /// Register
    Reg(Reg),
    /// Immediate literal (`#3`)
    Imm(String),
    /// Named memory location (`x`, or a stored temporary)
    Mem(String),
}

impl fmt::Display for AsmOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmOperand::Reg(reg) => write!(f, "{}", reg),
            AsmOperand::Imm(text) => write!(f, "#{}", text),
            AsmOperand::Mem(name) => f.write_str(name),
        }
    }
}

/// Arithmetic operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
}

impl ArithOp {
    /// Base mnemonic, without the float suffix
    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "ADD",
            ArithOp::Sub => "SUB",
            ArithOp::Mul => "MUL",
            ArithOp::Div => "DIV",
        }
    }
}

impl From<BinaryOp> for ArithOp {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => ArithOp::Add,
            BinaryOp::Sub => ArithOp::Sub,
            BinaryOp::Mul => ArithOp::Mul,
            BinaryOp::Div => ArithOp::Div,
        }
    }
}

/// Assembly instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsmInstruction {
    /// `LOAD[F] reg, src`
    Load {
        /// Float load
        float: bool,
        /// Destination register
        reg: Reg,
        /// Immediate or memory source
        src: AsmOperand,
    },
    /// `STR[F] dest, reg`
    Store {
        /// Float store
        float: bool,
        /// Memory destination
        dest: String,
        /// Source register
        reg: Reg,
    },
    /// `OP[F] dst, lhs, rhs`
    Arith {
        /// Operation
        op: ArithOp,
        /// Float operation
        float: bool,
        /// Destination register
        dst: Reg,
        /// Left source
        lhs: AsmOperand,
        /// Right source
        rhs: AsmOperand,
    },
}

impl AsmInstruction {
    /// Full mnemonic including the float suffix
    pub fn mnemonic(&self) -> String {
        let (base, float) = match self {
            AsmInstruction::Load { float, .. } => ("LOAD", *float),
            AsmInstruction::Store { float, .. } => ("STR", *float),
            AsmInstruction::Arith { op, float, .. } => (op.mnemonic(), *float),
        };
        if float {
            format!("{}F", base)
        } else {
            base.to_string()
        }
    }
}

impl fmt::Display for AsmInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.mnemonic();
        match self {
            AsmInstruction::Load { reg, src, .. } => write!(f, "{} {}, {}", mnemonic, reg, src),
            AsmInstruction::Store { dest, reg, .. } => write!(f, "{} {}, {}", mnemonic, dest, reg),
            AsmInstruction::Arith { dst, lhs, rhs, .. } => {
                write!(f, "{} {}, {}, {}", mnemonic, dst, lhs, rhs)
            }
        }
    }
}

/// Two-register code generator
pub struct AsmGenerator {
    /// Declared identifier types
    types: TypeMap,
    /// Types inferred for temporaries while emitting
    temp_types: HashMap<Temp, ScalarType>,
    /// Temporary resident in each register
    registers: [Option<Temp>; 2],
    /// Index of the last instruction reading each temporary
    last_use: HashMap<Temp, usize>,
    /// Number of temporaries stored to memory
    spills: usize,
    /// Prefix of spill slot names, disjoint from the statement's identifiers
    slot_prefix: String,
    code: Vec<AsmInstruction>,
}

impl AsmGenerator {
    /// Creates a generator over the declared identifier types
    pub fn new(types: &TypeMap) -> Self {
        Self {
            types: types.clone(),
            temp_types: HashMap::new(),
            registers: [None, None],
            last_use: HashMap::new(),
            spills: 0,
            slot_prefix: SPILL_PREFIX.to_string(),
            code: Vec::new(),
        }
    }

    /// Emits assembly for an instruction list
    pub fn generate(&mut self, instructions: &[IrInstruction]) -> Vec<AsmInstruction> {
        self.temp_types.clear();
        self.registers = [None, None];
        self.spills = 0;
        self.code.clear();
        self.last_use = last_uses(instructions);
        self.slot_prefix = slot_prefix(instructions);

        for (index, instr) in instructions.iter().enumerate() {
            tracing::trace!(%instr, "emitting");
            match instr {
                IrInstruction::Assign { dest, src } => self.emit_copy(index, dest, src),
                IrInstruction::BinOp { dest, op, lhs, rhs } => {
                    self.emit_binop(index, dest, *op, lhs, rhs)
                }
            }
        }

        tracing::debug!(
            instructions = self.code.len(),
            spills = self.spills,
            "generated assembly"
        );
        std::mem::take(&mut self.code)
    }

    fn emit_copy(&mut self, index: usize, dest: &Dest, src: &Operand) {
        let ty = self.type_of(src);
        let reg = match self.register_of(src) {
            Some(reg) => {
                self.preserve(reg, index);
                reg
            }
            None => {
                let reg = self.acquire(&[]);
                self.load(reg, src, ty);
                reg
            }
        };
        self.finish(index, dest, reg, ty);
    }

    fn emit_binop(&mut self, index: usize, dest: &Dest, op: BinaryOp, lhs: &Operand, rhs: &Operand) {
        let ty = if self.type_of(lhs).is_float() || self.type_of(rhs).is_float() {
            ScalarType::Float
        } else {
            ScalarType::Int
        };
        let float = ty.is_float();

        let (mut a, mut b) = (lhs, rhs);
        if op.is_commutative() {
            if a.is_literal() && !b.is_literal() {
                std::mem::swap(&mut a, &mut b);
            }
            if self.register_of(b).is_some() && self.register_of(a).is_none() {
                std::mem::swap(&mut a, &mut b);
            }
        }

        let op = ArithOp::from(op);
        let acc = if let Some(acc) = self.register_of(a) {
            self.preserve(acc, index);
            let rhs = self.source_operand(b, acc);
            self.arith(op, float, acc, AsmOperand::Reg(acc), rhs);
            acc
        } else if let Some(acc) = self.register_of(b) {
            // Only reachable for `-` and `/`: the resident right operand keeps
            // its position.
            self.preserve(acc, index);
            let lhs = self.source_operand(a, acc);
            self.arith(op, float, acc, lhs, AsmOperand::Reg(acc));
            acc
        } else if a.is_literal() && !b.is_literal() {
            let acc = self.acquire(&[]);
            let b_ty = self.type_of(b);
            self.load(acc, b, b_ty);
            let lhs = self.memory_operand(a);
            self.arith(op, float, acc, lhs, AsmOperand::Reg(acc));
            acc
        } else {
            let acc = self.acquire(&[]);
            let a_ty = self.type_of(a);
            self.load(acc, a, a_ty);
            let rhs = self.source_operand(b, acc);
            self.arith(op, float, acc, AsmOperand::Reg(acc), rhs);
            acc
        };

        self.finish(index, dest, acc, ty);
    }

    /// Stores to a user variable or records the new resident temporary
    fn finish(&mut self, index: usize, dest: &Dest, reg: Reg, ty: ScalarType) {
        self.release_dead(index);
        match dest {
            Dest::Temp(temp) => {
                self.registers[reg.index()] = Some(*temp);
                self.temp_types.insert(*temp, ty);
            }
            Dest::Var(name) => {
                self.code.push(AsmInstruction::Store {
                    float: ty.is_float(),
                    dest: name.clone(),
                    reg,
                });
                self.registers[reg.index()] = None;
            }
        }
    }

    /// Operand form of `operand` for use next to the accumulator `acc`
    fn source_operand(&mut self, operand: &Operand, acc: Reg) -> AsmOperand {
        if let Some(reg) = self.register_of(operand) {
            return AsmOperand::Reg(reg);
        }
        if operand.is_literal() {
            return self.memory_operand(operand);
        }
        let scratch = self.acquire(&[acc]);
        let ty = self.type_of(operand);
        self.load(scratch, operand, ty);
        AsmOperand::Reg(scratch)
    }

    /// Immediate or memory form of an operand that is not in a register
    fn memory_operand(&self, operand: &Operand) -> AsmOperand {
        match operand {
            Operand::Literal(text) => AsmOperand::Imm(text.clone()),
            Operand::Var(name) => AsmOperand::Mem(name.clone()),
            Operand::Temp(temp) => AsmOperand::Mem(self.slot(*temp)),
            Operand::IntToFloat(inner) => self.memory_operand(inner),
        }
    }

    fn load(&mut self, reg: Reg, operand: &Operand, ty: ScalarType) {
        let src = self.memory_operand(operand);
        self.code.push(AsmInstruction::Load {
            float: ty.is_float(),
            reg,
            src,
        });
        self.registers[reg.index()] = None;
    }

    fn arith(&mut self, op: ArithOp, float: bool, dst: Reg, lhs: AsmOperand, rhs: AsmOperand) {
        self.code.push(AsmInstruction::Arith {
            op,
            float,
            dst,
            lhs,
            rhs,
        });
    }

    /// Register holding the temporary named by `operand`, if resident
    fn register_of(&self, operand: &Operand) -> Option<Reg> {
        let temp = operand.as_temp()?;
        Reg::ALL
            .into_iter()
            .find(|reg| self.registers[reg.index()] == Some(temp))
    }

    /// A register that may be overwritten, spilling a live temporary if needed
    fn acquire(&mut self, exclude: &[Reg]) -> Reg {
        let candidates: Vec<Reg> = Reg::ALL
            .into_iter()
            .filter(|reg| !exclude.contains(reg))
            .collect();

        if let Some(free) = candidates
            .iter()
            .copied()
            .find(|reg| self.registers[reg.index()].is_none())
        {
            return free;
        }

        // Every candidate holds a live temporary: evict the one needed last.
        let victim = candidates
            .iter()
            .copied()
            .max_by_key(|reg| {
                self.registers[reg.index()]
                    .and_then(|temp| self.last_use.get(&temp).copied())
                    .unwrap_or(0)
            })
            .unwrap_or(Reg::R2);
        self.spill(victim);
        victim
    }

    /// Spills the temporary in `reg` if it is still read after `index`
    fn preserve(&mut self, reg: Reg, index: usize) {
        if let Some(temp) = self.registers[reg.index()] {
            if self.last_use.get(&temp).is_some_and(|&last| last > index) {
                self.spill(reg);
            }
        }
    }

    fn spill(&mut self, reg: Reg) {
        if let Some(temp) = self.registers[reg.index()].take() {
            let float = self.temp_type(temp).is_float();
            tracing::debug!(%temp, %reg, "spilling temporary");
            self.code.push(AsmInstruction::Store {
                float,
                dest: self.slot(temp),
                reg,
            });
            self.spills += 1;
        }
    }

    /// Frees registers whose temporaries are not read after `index`
    fn release_dead(&mut self, index: usize) {
        for slot in self.registers.iter_mut() {
            if let Some(temp) = *slot {
                if self.last_use.get(&temp).map_or(true, |&last| last <= index) {
                    *slot = None;
                }
            }
        }
    }

    fn type_of(&self, operand: &Operand) -> ScalarType {
        match operand {
            Operand::IntToFloat(_) => ScalarType::Float,
            Operand::Literal(text) => ScalarType::of_literal(text),
            Operand::Var(name) => self.types.resolve(name),
            Operand::Temp(temp) => self.temp_type(*temp),
        }
    }

    /// Memory name of a spilled temporary
    fn slot(&self, temp: Temp) -> String {
        format!("{}{}", self.slot_prefix, temp.0)
    }

    fn temp_type(&self, temp: Temp) -> ScalarType {
        self.temp_types.get(&temp).copied().unwrap_or(ScalarType::Int)
    }
}

const SPILL_PREFIX: &str = "spill";

/// `spill`, extended with `_` until no identifier read or written by the
/// instructions starts with it
fn slot_prefix(instructions: &[IrInstruction]) -> String {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for instr in instructions {
        if let Dest::Var(name) = instr.dest() {
            names.insert(name.as_str());
        }
        for operand in instr.operands() {
            if let Operand::Var(name) = operand.base() {
                names.insert(name.as_str());
            }
        }
    }

    let mut prefix = SPILL_PREFIX.to_string();
    while names.iter().any(|name| name.starts_with(prefix.as_str())) {
        prefix.push('_');
    }
    prefix
}

fn last_uses(instructions: &[IrInstruction]) -> HashMap<Temp, usize> {
    let mut last_use = HashMap::new();
    for (index, instr) in instructions.iter().enumerate() {
        for operand in instr.operands() {
            if let Some(temp) = operand.as_temp() {
                last_use.insert(temp, index);
            }
        }
    }
    last_use
}

/// Emits assembly for `instructions` with a fresh generator
pub fn emit(instructions: &[IrInstruction], type_hints: &TypeMap) -> Vec<AsmInstruction> {
    AsmGenerator::new(type_hints).generate(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::parse_ir;

    fn asm(text: &str, types: &TypeMap) -> Vec<String> {
        let instrs = parse_ir(text).unwrap();
        emit(&instrs, types).iter().map(|i| i.to_string()).collect()
    }

    fn int_types(names: &[&str]) -> TypeMap {
        names.iter().map(|n| (*n, ScalarType::Int)).collect()
    }

    #[test]
    fn test_literal_add() {
        assert_eq!(
            asm("x = 3 + 4", &TypeMap::new()),
            vec!["LOAD R1, #3", "ADD R1, R1, #4", "STR x, R1"]
        );
    }

    #[test]
    fn test_float_promotion() {
        assert_eq!(
            asm("x = int_to_float(y) + 1.5", &int_types(&["y"])),
            vec!["LOADF R1, y", "ADDF R1, R1, #1.5", "STRF x, R1"]
        );
    }

    #[test]
    fn test_second_subexpression_goes_to_r2() {
        assert_eq!(
            asm("temp1 = 1 + 2\ntemp2 = 3 + 4\nx = temp1 * temp2", &TypeMap::new()),
            vec![
                "LOAD R1, #1",
                "ADD R1, R1, #2",
                "LOAD R2, #3",
                "ADD R2, R2, #4",
                "MUL R1, R1, R2",
                "STR x, R1",
            ]
        );
    }

    #[test]
    fn test_commutative_literal_moves_right() {
        assert_eq!(
            asm("temp1 = y * 2\nx = 3 + temp1", &int_types(&["y"])),
            vec!["LOAD R1, y", "MUL R1, R1, #2", "ADD R1, R1, #3", "STR x, R1"]
        );
    }

    #[test]
    fn test_resident_right_operand_keeps_position() {
        assert_eq!(
            asm("temp1 = y * 2\nx = 10 - temp1", &int_types(&["y"])),
            vec!["LOAD R1, y", "MUL R1, R1, #2", "SUB R1, #10, R1", "STR x, R1"]
        );
        assert_eq!(
            asm("temp1 = y * 2\nx = a / temp1", &int_types(&["y", "a"])),
            vec![
                "LOAD R1, y",
                "MUL R1, R1, #2",
                "LOAD R2, a",
                "DIV R1, R2, R1",
                "STR x, R1",
            ]
        );
    }

    #[test]
    fn test_literal_minus_variable() {
        assert_eq!(
            asm("x = 3 - y", &int_types(&["y"])),
            vec!["LOAD R1, y", "SUB R1, #3, R1", "STR x, R1"]
        );
    }

    #[test]
    fn test_variable_operands_use_r2() {
        assert_eq!(
            asm("x = a + b", &int_types(&["a", "b"])),
            vec!["LOAD R1, a", "LOAD R2, b", "ADD R1, R1, R2", "STR x, R1"]
        );
    }

    #[test]
    fn test_simple_copies() {
        assert_eq!(asm("x = y", &int_types(&["y"])), vec!["LOAD R1, y", "STR x, R1"]);
        assert_eq!(asm("x = 2.5", &TypeMap::new()), vec!["LOADF R1, #2.5", "STRF x, R1"]);
        assert_eq!(
            asm("x = int_to_float(3)", &TypeMap::new()),
            vec!["LOADF R1, #3", "STRF x, R1"]
        );
    }

    #[test]
    fn test_third_live_value_is_spilled() {
        let text = "temp1 = a + b\ntemp2 = c + d\nx = temp1 * temp2";
        let out = asm(text, &int_types(&["a", "b", "c", "d"]));
        assert_eq!(
            out,
            vec![
                "LOAD R1, a",
                "LOAD R2, b",
                "ADD R1, R1, R2",
                "LOAD R2, c",
                "STR spill1, R1",
                "LOAD R1, d",
                "ADD R2, R2, R1",
                "LOAD R1, spill1",
                "MUL R2, R2, R1",
                "STR x, R2",
            ]
        );
    }

    #[test]
    fn test_spill_slot_avoids_identifiers() {
        // `temp1` here is a user variable, not a temporary.
        let instrs = vec![
            IrInstruction::BinOp {
                dest: Dest::Temp(Temp(1)),
                op: BinaryOp::Add,
                lhs: Operand::Var("a".into()),
                rhs: Operand::Var("b".into()),
            },
            IrInstruction::BinOp {
                dest: Dest::Temp(Temp(2)),
                op: BinaryOp::Add,
                lhs: Operand::Var("c".into()),
                rhs: Operand::Var("temp1".into()),
            },
            IrInstruction::BinOp {
                dest: Dest::Var("x".into()),
                op: BinaryOp::Mul,
                lhs: Operand::Temp(Temp(1)),
                rhs: Operand::Temp(Temp(2)),
            },
        ];
        let out: Vec<String> = emit(&instrs, &TypeMap::new())
            .iter()
            .map(|i| i.to_string())
            .collect();
        assert_eq!(
            out,
            vec![
                "LOAD R1, a",
                "LOAD R2, b",
                "ADD R1, R1, R2",
                "LOAD R2, c",
                "STR spill1, R1",
                "LOAD R1, temp1",
                "ADD R2, R2, R1",
                "LOAD R1, spill1",
                "MUL R2, R2, R1",
                "STR x, R2",
            ]
        );

        let mut shadowed = instrs.clone();
        shadowed[0] = IrInstruction::BinOp {
            dest: Dest::Temp(Temp(1)),
            op: BinaryOp::Add,
            lhs: Operand::Var("spill1".into()),
            rhs: Operand::Var("b".into()),
        };
        let out = emit(&shadowed, &TypeMap::new());
        assert!(out.iter().any(|i| i.to_string() == "STR spill_1, R1"));
    }

    #[test]
    fn test_temp_types_are_inferred() {
        let types: TypeMap = [("r", ScalarType::Float)].into_iter().collect();
        assert_eq!(
            asm("temp1 = r * r\nx = temp1 - 1.0", &types),
            vec![
                "LOADF R1, r",
                "LOADF R2, r",
                "MULF R1, R1, R2",
                "SUBF R1, R1, #1.0",
                "STRF x, R1",
            ]
        );
    }
}
