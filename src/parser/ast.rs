use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker value carried by promotion nodes in the `{value, left, right}` view
pub const INT_TO_FLOAT: &str = "int_to_float";

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Div,
}

impl BinaryOp {
    /// Operator for a `+ - * /` lexeme
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            _ => None,
        }
    }

    /// Source symbol of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// `*` and `/` bind tighter than `+` and `-`
    pub fn is_multiplicative(self) -> bool {
        matches!(self, BinaryOp::Mul | BinaryOp::Div)
    }

    /// Operand order does not matter for `+` and `*`
    pub fn is_commutative(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Mul)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expression tree of a single assignment statement
///
/// Nodes own their children. Passes never mutate a tree in place; they
/// build a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Numeric literal, kept as its normalized lexeme (`3`, `1.5`)
    Number(String),
    /// Identifier reference
    Ident(String),
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
    /// Top-level assignment `target = value`
    Assign {
        /// Assigned identifier
        target: String,
        /// Right-hand side
        value: Box<Expr>,
    },
    /// Integer leaf converted to float at evaluation time
    Promote {
        /// Display value (`3.0` for literal `3`, the name for identifiers)
        value: String,
        /// The original integer leaf
        operand: Box<Expr>,
    },
}

impl Expr {
    /// Creates a numeric literal leaf
    pub fn number(text: impl Into<String>) -> Self {
        Expr::Number(text.into())
    }

    /// Creates an identifier leaf
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    /// Creates a binary node
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Creates the assignment root
    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Expr::Assign {
            target: target.into(),
            value: Box::new(value),
        }
    }

    /// Node value text: `=`, the operator symbol, the leaf lexeme, or the
    /// promotion display value
    pub fn value(&self) -> &str {
        match self {
            Expr::Number(text) | Expr::Ident(text) => text,
            Expr::Binary { op, .. } => op.symbol(),
            Expr::Assign { .. } => "=",
            Expr::Promote { value, .. } => value,
        }
    }

    /// True for literals and identifiers
    pub fn is_leaf(&self) -> bool {
        matches!(self, Expr::Number(_) | Expr::Ident(_))
    }

    /// True for promotion wrappers
    pub fn is_promotion(&self) -> bool {
        matches!(self, Expr::Promote { .. })
    }

    /// True for literals written with a decimal point
    pub fn is_float_literal(&self) -> bool {
        matches!(self, Expr::Number(text) if text.contains('.'))
    }

    /// Number of promotion wrappers in the tree
    pub fn promotion_count(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::Ident(_) => 0,
            Expr::Binary { lhs, rhs, .. } => lhs.promotion_count() + rhs.promotion_count(),
            Expr::Assign { value, .. } => value.promotion_count(),
            Expr::Promote { operand, .. } => 1 + operand.promotion_count(),
        }
    }
}

/// Infix rendering with explicit parentheses around every binary node
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(text) | Expr::Ident(text) => f.write_str(text),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Assign { target, value } => write!(f, "{} = {}", target, value),
            Expr::Promote { operand, .. } => write!(f, "{}({})", INT_TO_FLOAT, operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_view() {
        let tree = Expr::assign(
            "x",
            Expr::binary(BinaryOp::Add, Expr::number("3"), Expr::ident("y")),
        );
        assert_eq!(tree.value(), "=");
        assert_eq!(tree.to_string(), "x = (3 + y)");

        let promoted = Expr::Promote {
            value: "3.0".to_string(),
            operand: Box::new(Expr::number("3")),
        };
        assert_eq!(promoted.value(), "3.0");
        assert!(promoted.is_promotion());
        assert!(!promoted.is_leaf());
        assert_eq!(promoted.to_string(), "int_to_float(3)");
    }

    #[test]
    fn test_operator_classes() {
        assert!(BinaryOp::Mul.is_multiplicative());
        assert!(!BinaryOp::Sub.is_multiplicative());
        assert!(BinaryOp::Add.is_commutative());
        assert!(!BinaryOp::Div.is_commutative());
        assert_eq!(BinaryOp::from_symbol("/"), Some(BinaryOp::Div));
        assert_eq!(BinaryOp::from_symbol("%"), None);
    }
}
