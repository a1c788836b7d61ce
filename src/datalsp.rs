//! Syntax tree data (frontend side, recursive)

use crate::datair::{BinOp, PriType};

////////////////////////////////////////////////////////////////////////////////
//// Program

/// AST root: the ordered statement list of the whole source buffer.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}


////////////////////////////////////////////////////////////////////////////////
//// Stmt

#[derive(Debug, Clone)]
pub enum Stmt {
    Declaration {
        ty: PriType,
        name: String,
        value: Option<Expr>,
    },
    Assignment {
        name: String,
        expr: Expr,
    },
    IfStatement {
        condition: Expr,
        true_block: Vec<Stmt>,
        false_block: Option<Vec<Stmt>>,
    },
    WhileLoop {
        condition: Expr,
        body: Vec<Stmt>,
    },
    PrintStatement(Expr),
}


////////////////////////////////////////////////////////////////////////////////
//// Expr

/// Expression subtree, strictly owned top-down.
#[derive(Debug, Clone)]
pub enum Expr {
    BinaryOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Number(i64),
    FloatNumber(f64),
    StringLiteral(String),
    Variable(String),
}
