//! IR instruction definitions
//!
//! Instructions are structured values from generation through emission.
//! The textual form (`temp1 = int_to_float(y) + 1.5`) is produced by
//! `Display` and accepted back by `FromStr`; it never carries state between
//! stages.

use crate::error::{Error, Result};
use crate::parser::{BinaryOp, INT_TO_FLOAT};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compiler-synthesized temporary (`temp<N>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Temp(pub u32);

impl Temp {
    /// Creates the temporary with the given number
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "temp{}", self.0)
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Numeric literal text
    Literal(String),
    /// User identifier
    Var(String),
    /// Temporary
    Temp(Temp),
    /// Integer operand converted to float
    IntToFloat(Box<Operand>),
}

impl Operand {
    /// Wraps an operand in a promotion
    pub fn int_to_float(inner: Operand) -> Self {
        Operand::IntToFloat(Box::new(inner))
    }

    /// The operand with any promotion wrappers removed
    pub fn base(&self) -> &Operand {
        match self {
            Operand::IntToFloat(inner) => inner.base(),
            other => other,
        }
    }

    /// True if the base operand is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self.base(), Operand::Literal(_))
    }

    /// The temporary this operand names, ignoring promotion wrappers
    pub fn as_temp(&self) -> Option<Temp> {
        match self.base() {
            Operand::Temp(temp) => Some(*temp),
            _ => None,
        }
    }

    /// Replaces every temporary for which `lookup` returns a value
    pub fn substitute(&self, lookup: &impl Fn(Temp) -> Option<Operand>) -> Operand {
        match self {
            Operand::Temp(temp) => lookup(*temp).unwrap_or_else(|| self.clone()),
            Operand::IntToFloat(inner) => Operand::int_to_float(inner.substitute(lookup)),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(text) | Operand::Var(text) => f.write_str(text),
            Operand::Temp(temp) => write!(f, "{}", temp),
            Operand::IntToFloat(inner) => write!(f, "{}({})", INT_TO_FLOAT, inner),
        }
    }
}

/// Instruction destination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dest {
    /// Temporary
    Temp(Temp),
    /// User identifier
    Var(String),
}

impl Dest {
    /// The temporary, if this is one
    pub fn as_temp(&self) -> Option<Temp> {
        match self {
            Dest::Temp(temp) => Some(*temp),
            Dest::Var(_) => None,
        }
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dest::Temp(temp) => write!(f, "{}", temp),
            Dest::Var(name) => f.write_str(name),
        }
    }
}

/// IR instruction (three-address code)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrInstruction {
    /// Copy: dest = src
    Assign {
        /// Destination
        dest: Dest,
        /// Source operand
        src: Operand,
    },
    /// Binary operation: dest = lhs op rhs
    BinOp {
        /// Destination
        dest: Dest,
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Operand,
        /// Right operand
        rhs: Operand,
    },
}

impl IrInstruction {
    /// Destination of the instruction
    pub fn dest(&self) -> &Dest {
        match self {
            IrInstruction::Assign { dest, .. } | IrInstruction::BinOp { dest, .. } => dest,
        }
    }

    /// Operands read by the instruction, left to right
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            IrInstruction::Assign { src, .. } => vec![src],
            IrInstruction::BinOp { lhs, rhs, .. } => vec![lhs, rhs],
        }
    }

    /// True if the right-hand side contains a binary operator
    pub fn is_complex(&self) -> bool {
        matches!(self, IrInstruction::BinOp { .. })
    }

    /// Same instruction writing to `dest`
    pub fn with_dest(self, dest: Dest) -> Self {
        match self {
            IrInstruction::Assign { src, .. } => IrInstruction::Assign { dest, src },
            IrInstruction::BinOp { op, lhs, rhs, .. } => IrInstruction::BinOp { dest, op, lhs, rhs },
        }
    }
}

impl fmt::Display for IrInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrInstruction::Assign { dest, src } => write!(f, "{} = {}", dest, src),
            IrInstruction::BinOp { dest, op, lhs, rhs } => {
                write!(f, "{} = {} {} {}", dest, lhs, op, rhs)
            }
        }
    }
}

lazy_static! {
    static ref LINE_RE: Regex = Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+?)\s*$").unwrap();
    static ref BINOP_RE: Regex = Regex::new(
        r"^((?:int_to_float\(\s*)*[A-Za-z0-9_.]+(?:\s*\))*)\s*([-+*/])\s*((?:int_to_float\(\s*)*[A-Za-z0-9_.]+(?:\s*\))*)$"
    )
    .unwrap();
    static ref TEMP_RE: Regex = Regex::new(r"^temp([0-9]+)$").unwrap();
    static ref LITERAL_RE: Regex = Regex::new(r"^[0-9]+(?:\.[0-9]+)?$").unwrap();
    static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

impl FromStr for IrInstruction {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::IrParseError {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let caps = LINE_RE
            .captures(line)
            .ok_or_else(|| invalid("expected '<dest> = <rhs>'"))?;
        let dest = parse_dest(&caps[1]);
        let rhs = &caps[2];

        if let Some(bin) = BINOP_RE.captures(rhs) {
            let op = BinaryOp::from_symbol(&bin[2]).ok_or_else(|| invalid("unknown operator"))?;
            let lhs = parse_operand(&bin[1]).ok_or_else(|| invalid("bad left operand"))?;
            let rhs = parse_operand(&bin[3]).ok_or_else(|| invalid("bad right operand"))?;
            return Ok(IrInstruction::BinOp { dest, op, lhs, rhs });
        }

        let src = parse_operand(rhs).ok_or_else(|| invalid("bad operand"))?;
        Ok(IrInstruction::Assign { dest, src })
    }
}

fn parse_dest(text: &str) -> Dest {
    match parse_temp(text) {
        Some(temp) => Dest::Temp(temp),
        None => Dest::Var(text.to_string()),
    }
}

fn parse_temp(text: &str) -> Option<Temp> {
    TEMP_RE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .map(Temp)
}

fn parse_operand(text: &str) -> Option<Operand> {
    let text = text.trim();
    if let Some(inner) = text
        .strip_prefix(INT_TO_FLOAT)
        .and_then(|rest| rest.trim_start().strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_operand(inner).map(Operand::int_to_float);
    }
    if LITERAL_RE.is_match(text) {
        return Some(Operand::Literal(text.to_string()));
    }
    if let Some(temp) = parse_temp(text) {
        return Some(Operand::Temp(temp));
    }
    if IDENT_RE.is_match(text) {
        return Some(Operand::Var(text.to_string()));
    }
    None
}
