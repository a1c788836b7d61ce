//! Intermediate code generator: lowers the AST into a flat three-address
//! code list plus the string-literal table.
//!
//! All generation state (temporary counter, label counter, string table) is
//! instance state of one `TacGen`, reset per invocation. Independent runs
//! cannot interfere and always number from zero.

use crate::datair::{StrLitTbl, TacInstr};
use crate::datalsp::{Expr, Program, Stmt};
use crate::utils::{gen_counter, CounterType};

pub fn gen_tac(prog: &Program) -> (Vec<TacInstr>, StrLitTbl) {
    let mut tacgen = TacGen::new();

    for stmt in &prog.statements {
        tacgen.gen_stmt(stmt);
    }

    (tacgen.code, tacgen.strlit_tbl)
}


////////////////////////////////////////////////////////////////////////////////
//// TacGen

struct TacGen {
    code: Vec<TacInstr>,
    strlit_tbl: StrLitTbl,

    temp_counter: CounterType,
    label_counter: CounterType,
    strlit_counter: CounterType,
}

impl TacGen {
    fn new() -> Self {
        Self {
            code: vec![],
            strlit_tbl: StrLitTbl::new(),
            temp_counter: gen_counter(),
            label_counter: gen_counter(),
            strlit_counter: gen_counter(),
        }
    }

    fn new_temp(&mut self) -> String {
        format!("t{}", (self.temp_counter)())
    }

    fn new_label(&mut self) -> String {
        format!("L{}", (self.label_counter)())
    }

    /// Label for a string literal; identical text always maps to the same
    /// label.
    fn strlit_label(&mut self, value: &str) -> String {
        if let Some(label) = self.strlit_tbl.get(value) {
            return label.clone();
        }

        let label = format!("str{}", (self.strlit_counter)());
        self.strlit_tbl.insert(value.to_owned(), label.clone());

        label
    }

    fn emit(&mut self, instr: TacInstr) {
        self.code.push(instr);
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration { name, value, .. } => {
                // a bare declaration reserves the name only, no code
                if let Some(value) = value {
                    let src = self.gen_expr(value);
                    self.emit(TacInstr::Copy {
                        dest: name.clone(),
                        src,
                    });
                }
            }
            Stmt::Assignment { name, expr } => {
                let src = self.gen_expr(expr);
                self.emit(TacInstr::Copy {
                    dest: name.clone(),
                    src,
                });
            }
            Stmt::PrintStatement(expr) => {
                let operand = self.gen_expr(expr);
                self.emit(TacInstr::Print(operand));
            }
            Stmt::IfStatement {
                condition,
                true_block,
                false_block,
            } => {
                let cond = self.gen_expr(condition);
                let false_label = self.new_label();
                let end_label = self.new_label();

                // both labels are emitted even without an else branch
                self.emit(TacInstr::IfFalse {
                    cond,
                    label: false_label.clone(),
                });

                for stmt in true_block {
                    self.gen_stmt(stmt);
                }

                self.emit(TacInstr::Goto(end_label.clone()));
                self.emit(TacInstr::Label(false_label));

                if let Some(false_block) = false_block {
                    for stmt in false_block {
                        self.gen_stmt(stmt);
                    }
                }

                self.emit(TacInstr::Label(end_label));
            }
            Stmt::WhileLoop { condition, body } => {
                let start_label = self.new_label();
                let end_label = self.new_label();

                // the condition is lowered inside the loop so that jumping
                // back to the start label re-evaluates it each iteration
                self.emit(TacInstr::Label(start_label.clone()));
                let cond = self.gen_expr(condition);
                self.emit(TacInstr::IfFalse {
                    cond,
                    label: end_label.clone(),
                });

                for stmt in body {
                    self.gen_stmt(stmt);
                }

                self.emit(TacInstr::Goto(start_label));
                self.emit(TacInstr::Label(end_label));
            }
        }
    }

    /// Lower an expression and return the operand text holding its value.
    fn gen_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Number(value) => value.to_string(),
            Expr::FloatNumber(value) => value.to_string(),
            Expr::StringLiteral(value) => self.strlit_label(value),
            Expr::Variable(name) => name.clone(),
            Expr::BinaryOp { left, op, right } => {
                let left = self.gen_expr(left);
                let right = self.gen_expr(right);
                let dest = self.new_temp();

                self.emit(TacInstr::Bin {
                    dest: dest.clone(),
                    left,
                    op: *op,
                    right,
                });

                dest
            }
        }
    }
}
