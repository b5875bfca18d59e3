//! Tree to three-address code lowering

use super::instruction::{Dest, IrInstruction, Operand, Temp};
use crate::parser::Expr;

/// Post-order IR generator
///
/// Owns the temporary counter and the instruction buffer. Both are reset at
/// the start of every [`IrGenerator::generate`] call, so one generator can
/// be reused for any number of statements.
pub struct IrGenerator {
    next_temp: u32,
    instructions: Vec<IrInstruction>,
}

impl IrGenerator {
    /// Creates a new generator
    pub fn new() -> Self {
        Self {
            next_temp: 1,
            instructions: Vec::new(),
        }
    }

    /// Lowers a (possibly promoted) statement tree to IR
    pub fn generate(&mut self, tree: &Expr) -> Vec<IrInstruction> {
        self.next_temp = 1;
        self.instructions.clear();

        self.lower(tree);

        tracing::debug!(
            instructions = self.instructions.len(),
            temps = self.next_temp - 1,
            "generated IR"
        );
        std::mem::take(&mut self.instructions)
    }

    fn new_temp(&mut self) -> Temp {
        let temp = Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }

    /// Emits code for `node` and returns the operand holding its value
    fn lower(&mut self, node: &Expr) -> Operand {
        match node {
            Expr::Number(text) => Operand::Literal(text.clone()),
            Expr::Ident(name) => Operand::Var(name.clone()),

            Expr::Promote { operand, .. } => {
                let inner = self.lower(operand);
                let temp = self.new_temp();
                self.instructions.push(IrInstruction::Assign {
                    dest: Dest::Temp(temp),
                    src: Operand::int_to_float(inner),
                });
                Operand::Temp(temp)
            }

            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.lower(lhs);
                let rhs = self.lower(rhs);
                let temp = self.new_temp();
                self.instructions.push(IrInstruction::BinOp {
                    dest: Dest::Temp(temp),
                    op: *op,
                    lhs,
                    rhs,
                });
                Operand::Temp(temp)
            }

            Expr::Assign { target, value } => {
                let src = self.lower(value);
                self.instructions.push(IrInstruction::Assign {
                    dest: Dest::Var(target.clone()),
                    src,
                });
                Operand::Var(target.clone())
            }
        }
    }
}

impl Default for IrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowers `tree` to IR with a fresh generator
pub fn generate(tree: &Expr) -> Vec<IrInstruction> {
    IrGenerator::new().generate(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::BinaryOp;

    fn lines(instrs: &[IrInstruction]) -> Vec<String> {
        instrs.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_single_operator() {
        let tree = Expr::assign(
            "x",
            Expr::binary(BinaryOp::Add, Expr::number("3"), Expr::number("4")),
        );
        assert_eq!(lines(&generate(&tree)), vec!["temp1 = 3 + 4", "x = temp1"]);
    }

    #[test]
    fn test_post_order_numbering() {
        let tree = Expr::assign(
            "x",
            Expr::binary(
                BinaryOp::Mul,
                Expr::binary(BinaryOp::Add, Expr::number("1"), Expr::number("2")),
                Expr::binary(BinaryOp::Add, Expr::number("3"), Expr::number("4")),
            ),
        );
        assert_eq!(
            lines(&generate(&tree)),
            vec![
                "temp1 = 1 + 2",
                "temp2 = 3 + 4",
                "temp3 = temp1 * temp2",
                "x = temp3",
            ]
        );
    }

    #[test]
    fn test_promotion_gets_its_own_temp() {
        let tree = Expr::assign(
            "x",
            Expr::binary(
                BinaryOp::Add,
                Expr::Promote {
                    value: "y".to_string(),
                    operand: Box::new(Expr::ident("y")),
                },
                Expr::number("1.5"),
            ),
        );
        assert_eq!(
            lines(&generate(&tree)),
            vec![
                "temp1 = int_to_float(y)",
                "temp2 = temp1 + 1.5",
                "x = temp2",
            ]
        );
    }

    #[test]
    fn test_bare_copy_and_counter_reset() {
        let tree = Expr::assign("x", Expr::ident("y"));
        let mut generator = IrGenerator::new();
        assert_eq!(lines(&generator.generate(&tree)), vec!["x = y"]);

        let tree = Expr::assign(
            "z",
            Expr::binary(BinaryOp::Sub, Expr::ident("a"), Expr::ident("b")),
        );
        assert_eq!(
            lines(&generator.generate(&tree)),
            vec!["temp1 = a - b", "z = temp1"]
        );
    }
}
