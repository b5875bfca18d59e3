use super::ast::{BinaryOp, Expr};
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

/// Deepest tree (or parenthesis nesting) accepted by the parser. Every later
/// stage walks the tree recursively.
pub const MAX_NESTING: usize = 512;

/// Item of the flat list being reduced: either a finished sub-tree (with its
/// depth) or a token still waiting to be folded
#[derive(Debug, Clone)]
enum Item {
    Node(Expr, usize),
    Op(BinaryOp),
    LeftParen,
    RightParen,
    Assign,
}

impl Item {
    fn from_token(token: &Token) -> Result<Self> {
        Ok(match token.kind {
            TokenKind::Int | TokenKind::Float => Item::Node(Expr::number(&token.lexeme), 1),
            TokenKind::Identifier => Item::Node(Expr::ident(&token.lexeme), 1),
            TokenKind::Operator => {
                let op = BinaryOp::from_symbol(&token.lexeme).ok_or_else(|| {
                    Error::lex(token.column, format!("Unknown operator '{}'", token.lexeme))
                })?;
                Item::Op(op)
            }
            TokenKind::LeftParen => Item::LeftParen,
            TokenKind::RightParen => Item::RightParen,
            TokenKind::Assign => Item::Assign,
        })
    }

    fn is_node(&self) -> bool {
        matches!(self, Item::Node(..))
    }

    fn into_node(self) -> Option<(Expr, usize)> {
        match self {
            Item::Node(expr, depth) => Some((expr, depth)),
            _ => None,
        }
    }
}

/// Grammar-substitution parser for `IDENT '=' expr` statements
///
/// The expression is reduced over the flat token list in four scans:
/// parenthesized spans, then `*`/`/`, then `+`/`-`, then a singleton check.
pub struct ExprParser {
    tokens: Vec<Token>,
}

impl ExprParser {
    /// Creates a parser over a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        ExprParser { tokens }
    }

    /// Parses the statement into an `Expr::Assign` tree
    pub fn parse(&self) -> Result<Expr> {
        if self.tokens.is_empty() {
            return Err(Error::syntax(0, "Empty token list"));
        }

        let assign_at = 1;
        match self.tokens.get(assign_at) {
            Some(token) if token.kind == TokenKind::Assign => {}
            _ => return Err(Error::syntax(assign_at, "Expected '=' as the second token")),
        }
        if assign_at >= self.tokens.len() - 1 {
            return Err(Error::syntax(assign_at, "Invalid assignment expression"));
        }

        let target = &self.tokens[0];
        if target.kind != TokenKind::Identifier {
            return Err(Error::syntax(0, "Assignment target must be an identifier"));
        }

        let items = self.tokens[assign_at + 1..]
            .iter()
            .map(Item::from_token)
            .collect::<Result<Vec<_>>>()?;
        check_nesting(&items)?;
        let (value, _) = parse_expr(items)?;

        let tree = Expr::assign(target.lexeme.clone(), value);
        tracing::debug!(tree = %tree, "parsed statement");
        Ok(tree)
    }
}

/// Parses a token stream into an expression tree
pub fn parse(tokens: Vec<Token>) -> Result<Expr> {
    ExprParser::new(tokens).parse()
}

fn parse_expr(mut items: Vec<Item>) -> Result<(Expr, usize)> {
    if items.is_empty() {
        return Err(Error::syntax(0, "Empty expression"));
    }

    reduce_parens(&mut items)?;
    fold_operators(&mut items, true)?;
    fold_operators(&mut items, false)?;

    if items.len() != 1 {
        return Err(Error::syntax(items.len() - 1, "Invalid expression structure"));
    }
    items
        .pop()
        .and_then(Item::into_node)
        .ok_or_else(|| Error::syntax(0, "Invalid expression structure"))
}

/// Rejects parenthesis nesting beyond [`MAX_NESTING`] before any recursion
fn check_nesting(items: &[Item]) -> Result<()> {
    let mut depth = 0usize;
    for (i, item) in items.iter().enumerate() {
        match item {
            Item::LeftParen => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(Error::syntax(i, "Expression nested too deeply"));
                }
            }
            Item::RightParen => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Replaces each outermost parenthesized span with its parsed sub-tree
fn reduce_parens(items: &mut Vec<Item>) -> Result<()> {
    let mut i = 0;
    while i < items.len() {
        match items[i] {
            Item::LeftParen => {
                let mut depth = 1;
                let mut j = i + 1;
                while j < items.len() && depth > 0 {
                    match items[j] {
                        Item::LeftParen => depth += 1,
                        Item::RightParen => depth -= 1,
                        _ => {}
                    }
                    j += 1;
                }
                if depth != 0 {
                    return Err(Error::syntax(i, "Unmatched parentheses"));
                }

                let mut inner: Vec<Item> = items.drain(i..j).collect();
                inner.pop();
                inner.remove(0);
                let (sub_tree, sub_depth) = parse_expr(inner)?;
                items.insert(i, Item::Node(sub_tree, sub_depth));
            }
            Item::RightParen => return Err(Error::syntax(i, "Unmatched parentheses")),
            Item::Assign => return Err(Error::syntax(i, "Unexpected '=' inside expression")),
            _ => {}
        }
        i += 1;
    }
    Ok(())
}

/// Folds every operator of one precedence class, left to right
fn fold_operators(items: &mut Vec<Item>, multiplicative: bool) -> Result<()> {
    let mut i = 0;
    while i < items.len() {
        let op = match items[i] {
            Item::Op(op) if op.is_multiplicative() == multiplicative => op,
            _ => {
                i += 1;
                continue;
            }
        };

        let fillable = i > 0
            && i + 1 < items.len()
            && items[i - 1].is_node()
            && items[i + 1].is_node();
        if !fillable {
            return Err(Error::syntax(
                i,
                format!("Invalid expression: operator at position {}", i),
            ));
        }

        let mut folded = items.drain(i - 1..=i + 1);
        let lhs = folded.next().and_then(Item::into_node);
        folded.next();
        let rhs = folded.next().and_then(Item::into_node);
        drop(folded);

        match (lhs, rhs) {
            (Some((lhs, lhs_depth)), Some((rhs, rhs_depth))) => {
                let depth = lhs_depth.max(rhs_depth) + 1;
                if depth > MAX_NESTING {
                    return Err(Error::syntax(i, "Expression nested too deeply"));
                }
                items.insert(i - 1, Item::Node(Expr::binary(op, lhs, rhs), depth));
            }
            _ => {
                return Err(Error::syntax(
                    i,
                    format!("Invalid expression: operator at position {}", i),
                ))
            }
        }
        // The folded node now sits at i - 1; the next candidate is at i.
    }
    Ok(())
}
