//! Debug dumps for every pipeline stage
//!
//! Tools for inspecting trees, IR and assembly as text.

use super::asm_codegen::AsmInstruction;
use super::ir::IrInstruction;
use crate::lexer::DisplayNames;
use crate::parser::{Expr, INT_TO_FLOAT};

/// Child slot of a printed node
enum Branch<'a> {
    Node(&'a Expr),
    Leaf(&'a str),
    Empty,
}

struct TreePrinter<'a> {
    names: Option<&'a DisplayNames>,
    out: String,
}

impl<'a> TreePrinter<'a> {
    fn label(&self, text: &str) -> String {
        match self.names {
            Some(names) => names.display(text).to_string(),
            None => text.to_string(),
        }
    }

    fn print(&mut self, branch: Branch<'_>, prefix: &str, is_left: Option<bool>) {
        let (label, children) = match branch {
            Branch::Node(expr) => (self.label(expr.value()), children(expr)),
            Branch::Leaf(text) => (self.label(text), None),
            Branch::Empty => ("None".to_string(), None),
        };

        let child_prefix = match is_left {
            None => {
                self.out.push_str(&format!("{}\n", label));
                String::new()
            }
            Some(true) => {
                self.out.push_str(&format!("{}├── {}\n", prefix, label));
                format!("{}│   ", prefix)
            }
            Some(false) => {
                self.out.push_str(&format!("{}└── {}\n", prefix, label));
                format!("{}    ", prefix)
            }
        };

        if let Some((left, right)) = children {
            self.print(left, &child_prefix, Some(true));
            self.print(right, &child_prefix, Some(false));
        }
    }
}

fn children(expr: &Expr) -> Option<(Branch<'_>, Branch<'_>)> {
    match expr {
        Expr::Number(_) | Expr::Ident(_) => None,
        Expr::Binary { lhs, rhs, .. } => Some((Branch::Node(lhs), Branch::Node(rhs))),
        Expr::Assign { target, value } => Some((Branch::Leaf(target), Branch::Node(value))),
        Expr::Promote { .. } => Some((Branch::Leaf(INT_TO_FLOAT), Branch::Empty)),
    }
}

/// Box-drawing rendering of a statement tree
///
/// With a display-name table, identifiers are printed as `ID<n>`.
pub fn format_tree(tree: &Expr, names: Option<&DisplayNames>) -> String {
    let mut printer = TreePrinter {
        names,
        out: String::new(),
    };
    printer.print(Branch::Node(tree), "", None);
    printer.out
}

/// One IR instruction per line
pub fn format_ir(instructions: &[IrInstruction]) -> String {
    instructions
        .iter()
        .map(|instr| format!("{}\n", instr))
        .collect()
}

/// One assembly instruction per line
pub fn format_asm(instructions: &[AsmInstruction]) -> String {
    instructions
        .iter()
        .map(|instr| format!("{}\n", instr))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::parse_ir;
    use crate::lexer::lex;
    use crate::parser::{parse, BinaryOp};

    #[test]
    fn test_tree_layout() {
        let (tokens, _) = lex("x = 3 + y * 2").unwrap();
        let tree = parse(tokens).unwrap();
        let expected = "\
=
├── x
└── +
    ├── 3
    └── *
        ├── y
        └── 2
";
        assert_eq!(format_tree(&tree, None), expected);
    }

    #[test]
    fn test_tree_with_display_names() {
        let (tokens, names) = lex("x = (a + b) * c").unwrap();
        let tree = parse(tokens).unwrap();
        let expected = "\
=
├── ID1
└── *
    ├── +
    │   ├── ID2
    │   └── ID3
    └── ID4
";
        assert_eq!(format_tree(&tree, Some(&names)), expected);
    }

    #[test]
    fn test_promotion_node() {
        let tree = Expr::assign(
            "x",
            Expr::binary(
                BinaryOp::Add,
                Expr::Promote {
                    value: "3.0".to_string(),
                    operand: Box::new(Expr::number("3")),
                },
                Expr::number("1.5"),
            ),
        );
        let expected = "\
=
├── x
└── +
    ├── 3.0
    │   ├── int_to_float
    │   └── None
    └── 1.5
";
        assert_eq!(format_tree(&tree, None), expected);
    }

    #[test]
    fn test_line_dumps() {
        let ir = parse_ir("temp1 = 3 + 4\nx = temp1").unwrap();
        assert_eq!(format_ir(&ir), "temp1 = 3 + 4\nx = temp1\n");
        assert_eq!(format_ir(&[]), "");

        let asm = crate::compiler::emit(&parse_ir("x = 3 + 4").unwrap(), &Default::default());
        assert_eq!(format_asm(&asm), "LOAD R1, #3\nADD R1, R1, #4\nSTR x, R1\n");
    }
}
