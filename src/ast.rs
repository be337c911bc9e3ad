//! The abstract syntax tree the core operates on.
//!
//! A [`Node`] owns its children directly; there is no arena and no manual
//! memory management. The only non-owning reference in the tree is the
//! [`SymbolRef`] the binder attaches to resolved identifiers, and that is a
//! plain `Copy` index rather than a pointer, so nothing here needs a
//! lifetime parameter.
//!
//! Binary and relational operators are closed sum types rather than the
//! operator strings an external parser would hand us; see [`crate::lower`]
//! for where the string tokens get turned into these.

use vslc_derive::OperatorFromStr;

use crate::symbols::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, OperatorFromStr)]
pub enum BinOp {
    #[op("+")]
    Add,
    #[op("-")]
    Sub,
    #[op("*")]
    Mul,
    #[op("/")]
    Div,
    #[op("<<")]
    Shl,
    #[op(">>")]
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, OperatorFromStr)]
pub enum UnOp {
    #[op("-")]
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, OperatorFromStr)]
pub enum RelOp {
    #[op("=")]
    Eq,
    #[op("!=")]
    Ne,
    #[op("<")]
    Lt,
    #[op(">")]
    Gt,
    #[op("<=")]
    Le,
    #[op(">=")]
    Ge,
}

/// A resolved identifier: either a global (variable, array or function) or
/// a symbol local to the enclosing function (parameter or local variable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRef {
    Global(SymbolId),
    Local(SymbolId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Generic variadic container; used for parameter lists, argument
    /// lists, declaration lists, statement lists and print-item lists.
    List,
    GlobalDeclaration,
    Function { name: String },
    /// `[statements]` or `[declarations, statements]`, distinguished by
    /// child count.
    Block,
    AssignmentStatement,
    ReturnStatement,
    PrintStatement,
    BreakStatement,
    IfStatement,
    WhileStatement,
    Relation(RelOp),
    Unary(UnOp),
    Binary(BinOp),
    FunctionCall,
    /// Doubles as an array-access expression and, when it appears directly
    /// under a [`NodeKind::GlobalDeclaration`] list, as the array's
    /// declarator (its second child is then the declared length).
    ArrayIndexing,
    Identifier(String),
    Number(i64),
    /// Present only before the binder runs; replaced with [`NodeKind::StringRef`].
    StringLiteral(String),
    /// Index into the global string table. Never present in input handed
    /// to the binder; only ever produced by it.
    StringRef(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub symbol: Option<SymbolRef>,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Node {
        Node {
            kind,
            children,
            symbol: None,
        }
    }

    pub fn leaf(kind: NodeKind) -> Node {
        Node::new(kind, Vec::new())
    }

    pub fn identifier(name: impl Into<String>) -> Node {
        Node::leaf(NodeKind::Identifier(name.into()))
    }

    pub fn number(value: i64) -> Node {
        Node::leaf(NodeKind::Number(value))
    }

    pub fn list(children: Vec<Node>) -> Node {
        Node::new(NodeKind::List, children)
    }

    pub fn binary(op: BinOp, lhs: Node, rhs: Node) -> Node {
        Node::new(NodeKind::Binary(op), vec![lhs, rhs])
    }

    pub fn unary(op: UnOp, operand: Node) -> Node {
        Node::new(NodeKind::Unary(op), vec![operand])
    }

    pub fn relation(op: RelOp, lhs: Node, rhs: Node) -> Node {
        Node::new(NodeKind::Relation(op), vec![lhs, rhs])
    }

    pub fn as_number(&self) -> Option<i64> {
        match self.kind {
            NodeKind::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Whether the node is a fully folded integer literal.
    pub fn is_number(&self) -> bool {
        matches!(self.kind, NodeKind::Number(_))
    }
}

/// The whole program: a list of `GlobalDeclaration` and `Function` nodes
/// in source order, exactly as the spec's `LIST` node is reused everywhere
/// else in the tree.
pub type Program = Node;
