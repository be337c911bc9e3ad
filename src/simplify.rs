//! Tree simplification: bottom-up constant folding, then a peephole that
//! rewrites multiplication/division by a power of two into a shift.
//!
//! Both rewrites only ever look at a node whose children have already
//! been simplified, so folding a whole constant subtree happens in one
//! pass and the peephole never sees an unfolded constant operand.

use crate::ast::{BinOp, Node, NodeKind, UnOp};

pub fn simplify(node: Node) -> Node {
    let Node { kind, children, symbol } = node;
    let children: Vec<Node> = children.into_iter().map(simplify).collect();
    let node = Node { kind, children, symbol };

    match fold(&node) {
        Some(folded) => folded,
        None => peephole(node),
    }
}

fn fold(node: &Node) -> Option<Node> {
    match &node.kind {
        NodeKind::Unary(UnOp::Neg) => {
            let value = node.children[0].as_number()?;
            Some(Node::number(value.wrapping_neg()))
        }
        NodeKind::Binary(op) => {
            let lhs = node.children[0].as_number()?;
            let rhs = node.children[1].as_number()?;
            fold_binary(*op, lhs, rhs).map(Node::number)
        }
        _ => None,
    }
}

fn fold_binary(op: BinOp, lhs: i64, rhs: i64) -> Option<i64> {
    let shift_amount = || (rhs as u32) & 63;
    match op {
        BinOp::Add => Some(lhs.wrapping_add(rhs)),
        BinOp::Sub => Some(lhs.wrapping_sub(rhs)),
        BinOp::Mul => Some(lhs.wrapping_mul(rhs)),
        // Division by zero is undefined at runtime on real hardware; we
        // leave the expression unfolded rather than fold it into a bogus
        // value or panic the compiler (see DESIGN.md).
        BinOp::Div if rhs == 0 => None,
        BinOp::Div => Some(lhs.wrapping_div(rhs)),
        BinOp::Shl => Some(lhs.wrapping_shl(shift_amount())),
        BinOp::Shr => Some(lhs.wrapping_shr(shift_amount())),
    }
}

/// Rewrites `x * 1` / `x / 1` to `x`, and `x * 2^k` / `x / 2^k` (k > 0) to
/// `x << k` / `x >> k`. Only reached for binary nodes that folding left
/// alone, i.e. whose left operand isn't a known constant.
fn peephole(node: Node) -> Node {
    let is_mul_or_div = matches!(node.kind, NodeKind::Binary(BinOp::Mul) | NodeKind::Binary(BinOp::Div));
    if !is_mul_or_div {
        return node;
    }
    let Some(rhs) = node.children[1].as_number() else {
        return node;
    };

    let NodeKind::Binary(op) = node.kind else { unreachable!() };
    let Node { children, symbol, .. } = node;
    let mut children = children;
    let lhs = children.remove(0);

    if rhs == 1 {
        return lhs;
    }
    if let Some(shift) = power_of_two_log2(rhs) {
        let new_op = match op {
            BinOp::Mul => BinOp::Shl,
            BinOp::Div => BinOp::Shr,
            _ => unreachable!(),
        };
        return Node {
            kind: NodeKind::Binary(new_op),
            children: vec![lhs, Node::number(shift as i64)],
            symbol,
        };
    }

    Node {
        kind: NodeKind::Binary(op),
        children: vec![lhs, Node::number(rhs)],
        symbol,
    }
}

fn power_of_two_log2(n: i64) -> Option<u32> {
    if n > 0 && (n as u64).is_power_of_two() {
        Some((n as u64).trailing_zeros())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    #[test]
    fn folds_nested_constant_expression() {
        // (2 * 8) / 4
        let expr = Node::binary(
            BinOp::Div,
            Node::binary(BinOp::Mul, Node::number(2), Node::number(8)),
            Node::number(4),
        );
        assert_eq!(simplify(expr), Node::number(4));
    }

    #[test]
    fn multiply_by_power_of_two_becomes_shift() {
        let expr = Node::binary(BinOp::Mul, Node::identifier("x"), Node::number(8));
        let simplified = simplify(expr);
        assert_eq!(simplified.kind, NodeKind::Binary(BinOp::Shl));
        assert_eq!(simplified.children[1].as_number(), Some(3));
    }

    #[test]
    fn divide_by_one_drops_to_operand() {
        let expr = Node::binary(BinOp::Div, Node::identifier("x"), Node::number(1));
        let simplified = simplify(expr);
        assert_eq!(simplified.kind, NodeKind::Identifier("x".to_owned()));
    }

    #[test]
    fn division_by_zero_is_left_unfolded() {
        let expr = Node::binary(BinOp::Div, Node::number(10), Node::number(0));
        let simplified = simplify(expr);
        assert_eq!(simplified.kind, NodeKind::Binary(BinOp::Div));
    }

    #[test]
    fn fold_is_idempotent() {
        let expr = Node::binary(BinOp::Add, Node::number(1), Node::number(2));
        let once = simplify(expr.clone());
        let twice = simplify(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn unary_negation_folds() {
        let expr = Node::unary(UnOp::Neg, Node::number(5));
        assert_eq!(simplify(expr), Node::number(-5));
    }

    #[test]
    fn shift_amount_is_masked_to_low_bits() {
        let expr = Node::binary(BinOp::Shl, Node::number(1), Node::number(64));
        // 64 & 63 == 0, so this should be a no-op shift.
        assert_eq!(simplify(expr), Node::number(1));
    }
}
