//! Semantic Analyzer: single top-down pass over the AST producing the flat
//! global symbol table. The AST itself is never mutated.

use std::error::Error;

use itertools::Itertools;

use crate::datair::{SymItem, SymTbl};
use crate::datalsp::{Expr, Program, Stmt};
use crate::error::TrapCode;

pub fn analyze_semantic(prog: &Program) -> Result<SymTbl, Box<dyn Error>> {
    let mut analyzer = SemanticAnalyzer::new();

    for stmt in &prog.statements {
        analyzer.analyze_stmt(stmt)?;
    }

    Ok(analyzer.symtbl)
}


////////////////////////////////////////////////////////////////////////////////
//// SemanticAnalyzer

struct SemanticAnalyzer {
    symtbl: SymTbl,
}

impl SemanticAnalyzer {
    fn new() -> Self {
        Self {
            symtbl: SymTbl::new(),
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<(), Box<dyn Error>> {
        match stmt {
            Stmt::Declaration { ty, name, value } => {
                if self.symtbl.contains_key(name) {
                    return Err(TrapCode::AlreadyDeclaredVar(name).emit_box_err());
                }
                self.symtbl.insert(
                    name.clone(),
                    SymItem {
                        ty: *ty,
                        initialized: false,
                    },
                );

                if let Some(value) = value {
                    self.analyze_expr(value)?;
                    self.mark_initialized(name)?;
                }
            }
            Stmt::Assignment { name, expr } => {
                self.lookup(name)?;
                self.analyze_expr(expr)?;
                self.mark_initialized(name)?;
            }
            Stmt::IfStatement {
                condition,
                true_block,
                false_block,
            } => {
                self.analyze_expr(condition)?;
                for stmt in true_block {
                    self.analyze_stmt(stmt)?;
                }
                if let Some(false_block) = false_block {
                    for stmt in false_block {
                        self.analyze_stmt(stmt)?;
                    }
                }
            }
            Stmt::WhileLoop { condition, body } => {
                self.analyze_expr(condition)?;
                for stmt in body {
                    self.analyze_stmt(stmt)?;
                }
            }
            Stmt::PrintStatement(expr) => {
                self.analyze_expr(expr)?;
            }
        }

        Ok(())
    }

    /// Reads of declared-but-uninitialized names are accepted; only the
    /// name's existence is checked.
    fn analyze_expr(&mut self, expr: &Expr) -> Result<(), Box<dyn Error>> {
        match expr {
            Expr::Number(_) | Expr::FloatNumber(_) | Expr::StringLiteral(_) => Ok(()),
            Expr::Variable(name) => self.lookup(name).map(|_| ()),
            Expr::BinaryOp { left, right, .. } => {
                self.analyze_expr(left)?;
                self.analyze_expr(right)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<&SymItem, Box<dyn Error>> {
        self.symtbl
            .get(name)
            .ok_or_else(|| TrapCode::UndeclaredVar(name).emit_box_err())
    }

    fn mark_initialized(&mut self, name: &str) -> Result<(), Box<dyn Error>> {
        match self.symtbl.get_mut(name) {
            Some(item) => {
                item.initialized = true;
                Ok(())
            }
            None => Err(TrapCode::UndeclaredVar(name).emit_box_err()),
        }
    }
}


////////////////////////////////////////////////////////////////////////////////
//// Symbol table listing

pub fn fmt_symtbl(symtbl: &SymTbl) -> String {
    let header = format!(
        "{:<15} {:<10} {:<15}\n{}\n",
        "Variable",
        "Type",
        "Initialized",
        "-".repeat(42)
    );

    let rows = symtbl
        .iter()
        .map(|(name, item)| {
            format!(
                "{:<15} {:<10} {:<15}",
                name,
                item.ty.to_string(),
                item.initialized
            )
        })
        .join("\n");

    header + &rows
}
