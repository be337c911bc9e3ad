//! The literal external AST shape: what a lexer/parser (out of scope for
//! this crate — see the top-level docs) is expected to hand the core.
//! Operators are still bare strings here; [`crate::lower`] is the one
//! place that turns them into the closed [`crate::ast::BinOp`] /
//! [`crate::ast::RelOp`] / [`crate::ast::UnOp`] sum types the rest of the
//! compiler matches on exhaustively.
//!
//! `Serialize`/`Deserialize` make this tree a JSON wire format, which is
//! what the CLI driver reads from stdin in place of a real front end.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawKind {
    List,
    GlobalDeclaration,
    Function,
    Block,
    AssignmentStatement,
    ReturnStatement,
    PrintStatement,
    BreakStatement,
    IfStatement,
    WhileStatement,
    Relation(String),
    Expression(String),
    FunctionCall,
    ArrayIndexing,
    Identifier(String),
    Number(i64),
    StringLiteral(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub kind: RawKind,
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn new(kind: RawKind, children: Vec<RawNode>) -> RawNode {
        RawNode { kind, children }
    }

    pub fn leaf(kind: RawKind) -> RawNode {
        RawNode::new(kind, Vec::new())
    }

    pub fn identifier(name: impl Into<String>) -> RawNode {
        RawNode::leaf(RawKind::Identifier(name.into()))
    }

    pub fn number(value: i64) -> RawNode {
        RawNode::leaf(RawKind::Number(value))
    }

    pub fn list(children: Vec<RawNode>) -> RawNode {
        RawNode::new(RawKind::List, children)
    }
}
