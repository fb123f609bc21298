use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operator {
    Print,
    Call,
    Set,
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Print => write!(f, "print"),
            Operator::Call => write!(f, "call"),
            Operator::Set => write!(f, "set"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Integer(i64),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Root {
        statements: Vec<Node>
    },
    ProcDecl {
        name: String,
        line: usize
    },
    UnaryOp {
        op: Operator,
        operand: Box<Node>,
        line: usize
    },
    BinOp {
        op: Operator,
        lhs: Box<Node>,
        rhs: Box<Node>,
        line: usize
    },
    Param(Param),
}

impl Node {
    pub fn line(&self) -> Option<usize> {
        match self {
            Node::ProcDecl { line, .. } | Node::UnaryOp { line, .. } | Node::BinOp { line, .. } => Some(*line),
            Node::Root { .. } | Node::Param(_) => None,
        }
    }
}

/// Executable reading of a statement node, borrowed from the tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Instruction<'a> {
    Print(&'a Param),
    Call(&'a str),
    Set(&'a str, &'a Param),
}

impl<'a> Instruction<'a> {
    /// Returns `None` for declarations, the root and operator/operand shapes no statement can take.
    pub fn decode(node: &'a Node) -> Option<Self> {
        match node {
            Node::UnaryOp { op: Operator::Print, operand, .. } => match operand.as_ref() {
                Node::Param(param) => Some(Instruction::Print(param)),
                _ => None
            },
            Node::UnaryOp { op: Operator::Call, operand, .. } => match operand.as_ref() {
                Node::Param(Param::Variable(name)) => Some(Instruction::Call(name)),
                _ => None
            },
            Node::BinOp { op: Operator::Set, lhs, rhs, .. } => match (lhs.as_ref(), rhs.as_ref()) {
                (Node::Param(Param::Variable(name)), Node::Param(param)) => Some(Instruction::Set(name, param)),
                _ => None
            },
            Node::UnaryOp { op: Operator::Set, .. }
            | Node::BinOp { op: Operator::Print | Operator::Call, .. }
            | Node::Root { .. }
            | Node::ProcDecl { .. }
            | Node::Param(_) => None,
        }
    }
}
