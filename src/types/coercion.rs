use super::{ScalarType, TypeMap};
use crate::parser::Expr;

/// Inserts `int_to_float` promotions into mixed-type statements
///
/// Promotion is all-or-nothing per statement: if any leaf is a float, every
/// integer leaf read by the statement is wrapped; otherwise the tree comes
/// back unchanged. The input tree is never modified.
pub struct SemanticAnalyzer<'a> {
    types: &'a TypeMap,
}

impl<'a> SemanticAnalyzer<'a> {
    /// Creates an analyzer over the declared identifier types
    pub fn new(types: &'a TypeMap) -> Self {
        Self { types }
    }

    /// Returns the (possibly promoted) copy of `tree`
    pub fn analyze(&self, tree: &Expr) -> Expr {
        let promote = has_float(tree, self.types);
        let analyzed = if promote {
            self.promote(tree)
        } else {
            tree.clone()
        };

        tracing::debug!(
            float = promote,
            promotions = analyzed.promotion_count(),
            "semantic analysis"
        );
        analyzed
    }

    fn promote(&self, node: &Expr) -> Expr {
        match node {
            Expr::Number(text) if !text.contains('.') => Expr::Promote {
                value: float_text(text),
                operand: Box::new(node.clone()),
            },
            Expr::Ident(name) if self.types.resolve(name) == ScalarType::Int => Expr::Promote {
                value: name.clone(),
                operand: Box::new(node.clone()),
            },
            Expr::Number(_) | Expr::Ident(_) | Expr::Promote { .. } => node.clone(),
            Expr::Binary { op, lhs, rhs } => Expr::binary(*op, self.promote(lhs), self.promote(rhs)),
            // The target is written, not read, so only the value is promoted.
            Expr::Assign { target, value } => Expr::assign(target.clone(), self.promote(value)),
        }
    }
}

/// True if any leaf of `tree` is a float literal or a FLOAT identifier
pub fn has_float(tree: &Expr, types: &TypeMap) -> bool {
    match tree {
        Expr::Number(text) => text.contains('.'),
        Expr::Ident(name) => types.resolve(name).is_float(),
        Expr::Binary { lhs, rhs, .. } => has_float(lhs, types) || has_float(rhs, types),
        Expr::Assign { value, .. } => has_float(value, types),
        Expr::Promote { .. } => true,
    }
}

/// Runs semantic analysis on `tree`
pub fn analyze(tree: &Expr, types: &TypeMap) -> Expr {
    SemanticAnalyzer::new(types).analyze(tree)
}

/// Float spelling of an integer literal (`3` → `3.0`)
fn float_text(text: &str) -> String {
    match text.parse::<u64>() {
        Ok(n) => format!("{}.0", n),
        Err(_) => format!("{}.0", text),
    }
}
