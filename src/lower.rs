//! Converts a [`RawNode`] tree into the typed internal [`Node`] tree,
//! resolving operator tokens to [`BinOp`]/[`RelOp`]/[`UnOp`] along the way.
//! An unrecognized token or a node with the wrong number of children is a
//! malformed external AST — a compiler-internal assertion failure, not a
//! VSL-program error, matching the taxonomy's "internal consistency" group.

use crate::ast::{BinOp, Node, NodeKind, RelOp, UnOp};
use crate::error::LowerError;
use crate::raw::{RawKind, RawNode};

pub fn lower(raw: RawNode) -> Result<Node, LowerError> {
    let RawNode { kind, children } = raw;
    match kind {
        RawKind::List => Ok(Node::new(NodeKind::List, lower_all(children)?)),
        RawKind::GlobalDeclaration => {
            Ok(Node::new(NodeKind::GlobalDeclaration, lower_all(children)?))
        }
        RawKind::Function => {
            let mut it = children.into_iter();
            let name_node = it.next().ok_or(LowerError::WrongArity {
                kind: "FUNCTION",
                expected: "name, parameter list, body",
                got: 0,
            })?;
            let name = match name_node.kind {
                RawKind::Identifier(name) => name,
                _ => {
                    return Err(LowerError::WrongArity {
                        kind: "FUNCTION",
                        expected: "an identifier as its first child",
                        got: 0,
                    })
                }
            };
            let rest: Vec<RawNode> = it.collect();
            if rest.len() != 2 {
                return Err(LowerError::WrongArity {
                    kind: "FUNCTION",
                    expected: "name, parameter list, body",
                    got: rest.len() + 1,
                });
            }
            let mut rest = lower_all(rest)?;
            let body = rest.pop().unwrap();
            let params = rest.pop().unwrap();
            Ok(Node::new(NodeKind::Function { name }, vec![params, body]))
        }
        RawKind::Block => Ok(Node::new(NodeKind::Block, lower_all(children)?)),
        RawKind::AssignmentStatement => {
            expect_arity("ASSIGNMENT_STATEMENT", &children, 2)?;
            Ok(Node::new(NodeKind::AssignmentStatement, lower_all(children)?))
        }
        RawKind::ReturnStatement => {
            expect_arity("RETURN_STATEMENT", &children, 1)?;
            Ok(Node::new(NodeKind::ReturnStatement, lower_all(children)?))
        }
        RawKind::PrintStatement => {
            expect_arity("PRINT_STATEMENT", &children, 1)?;
            Ok(Node::new(NodeKind::PrintStatement, lower_all(children)?))
        }
        RawKind::BreakStatement => {
            expect_arity("BREAK_STATEMENT", &children, 0)?;
            Ok(Node::leaf(NodeKind::BreakStatement))
        }
        RawKind::IfStatement => {
            if children.len() != 2 && children.len() != 3 {
                return Err(LowerError::WrongArity {
                    kind: "IF_STATEMENT",
                    expected: "2 or 3 children",
                    got: children.len(),
                });
            }
            Ok(Node::new(NodeKind::IfStatement, lower_all(children)?))
        }
        RawKind::WhileStatement => {
            expect_arity("WHILE_STATEMENT", &children, 2)?;
            Ok(Node::new(NodeKind::WhileStatement, lower_all(children)?))
        }
        RawKind::Relation(op) => {
            expect_arity("RELATION", &children, 2)?;
            let op = RelOp::from_str(&op).ok_or(LowerError::UnknownOperator { found: op })?;
            Ok(Node::new(NodeKind::Relation(op), lower_all(children)?))
        }
        RawKind::Expression(op) => match children.len() {
            1 => {
                let op = UnOp::from_str(&op).ok_or(LowerError::UnknownOperator { found: op })?;
                Ok(Node::new(NodeKind::Unary(op), lower_all(children)?))
            }
            2 => {
                let op = BinOp::from_str(&op).ok_or(LowerError::UnknownOperator { found: op })?;
                Ok(Node::new(NodeKind::Binary(op), lower_all(children)?))
            }
            got => Err(LowerError::WrongArity {
                kind: "EXPRESSION",
                expected: "1 or 2 children",
                got,
            }),
        },
        RawKind::FunctionCall => {
            expect_arity("FUNCTION_CALL", &children, 2)?;
            Ok(Node::new(NodeKind::FunctionCall, lower_all(children)?))
        }
        RawKind::ArrayIndexing => {
            expect_arity("ARRAY_INDEXING", &children, 2)?;
            Ok(Node::new(NodeKind::ArrayIndexing, lower_all(children)?))
        }
        RawKind::Identifier(name) => Ok(Node::leaf(NodeKind::Identifier(name))),
        RawKind::Number(value) => Ok(Node::leaf(NodeKind::Number(value))),
        RawKind::StringLiteral(s) => Ok(Node::leaf(NodeKind::StringLiteral(s))),
    }
}

fn expect_arity(kind: &'static str, children: &[RawNode], expected: usize) -> Result<(), LowerError> {
    if children.len() != expected {
        return Err(LowerError::WrongArity {
            kind,
            expected: match expected {
                0 => "no children",
                1 => "1 child",
                _ => "2 children",
            },
            got: children.len(),
        });
    }
    Ok(())
}

fn lower_all(children: Vec<RawNode>) -> Result<Vec<Node>, LowerError> {
    children.into_iter().map(lower).collect()
}
