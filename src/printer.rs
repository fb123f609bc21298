use std::fmt::{Display, Formatter};
use crate::ast::{Node, Param};

const INDENT_STEP: usize = 2;

/// Renders a node and everything below it, one node per line.
pub struct Tree<'a>(pub &'a Node);

impl Display for Tree<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_node(f, self.0, 0)
    }
}

pub fn print_tree(node: &Node) -> String {
    Tree(node).to_string()
}

fn write_node(f: &mut Formatter<'_>, node: &Node, indent: usize) -> std::fmt::Result {
    let pad = " ".repeat(indent);
    match node {
        Node::Root { statements } => {
            writeln!(f, "{pad}(Root)")?;
            for statement in statements {
                write_node(f, statement, indent + INDENT_STEP)?;
            }
            Ok(())
        }
        Node::ProcDecl { name, line } => writeln!(f, "{pad}(ProcDecl name = '{name}', line = {line})"),
        Node::UnaryOp { op, operand, line } => {
            writeln!(f, "{pad}(UnaryOp op = {op}, line = {line})")?;
            write_node(f, operand, indent + INDENT_STEP)
        }
        Node::BinOp { op, lhs, rhs, line } => {
            writeln!(f, "{pad}(BinOp op = {op}, line = {line})")?;
            write_node(f, lhs, indent + INDENT_STEP)?;
            write_node(f, rhs, indent + INDENT_STEP)
        }
        Node::Param(Param::Integer(value)) => writeln!(f, "{pad}(Param integer = {value})"),
        Node::Param(Param::Variable(name)) => writeln!(f, "{pad}(Param variable = '{name}')"),
    }
}
