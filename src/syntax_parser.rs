//! Syntax Parser: recursive descent over the token stream, one method per
//! grammar rule.

use std::error::Error;

use crate::datair::{BinOp, PriType};
use crate::datalsp::{Expr, Program, Stmt};
use crate::error::TrapCode;
use crate::lexer::{Token, TokenKind};

/// Operators of the flat (left-associative, single tier) expression level.
const EXPR_OPS: [TokenKind; 8] = [
    TokenKind::Add,
    TokenKind::Sub,
    TokenKind::Lt,
    TokenKind::Gt,
    TokenKind::Eq,
    TokenKind::Neq,
    TokenKind::Lte,
    TokenKind::Gte,
];

/// Operators of the term level.
const TERM_OPS: [TokenKind; 2] = [TokenKind::Mul, TokenKind::Div];


////////////////////////////////////////////////////////////////////////////////
//// Parser

pub struct Parser {
    cursor: usize,
    tokens: Vec<Token>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { cursor: 0, tokens }
    }

    fn is_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek1(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn peek1_kind(&self) -> Option<TokenKind> {
        self.peek1().map(|tok| tok.kind())
    }

    fn peek1_t(&self, kind: TokenKind) -> bool {
        self.peek1_kind() == Some(kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }

        tok
    }

    /// Consume a token of the expected kind or raise `ParseError`.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, Box<dyn Error>> {
        if self.peek1_t(kind) {
            // peeked just above
            Ok(self.advance().unwrap())
        } else {
            Err(self.unexpected(format!("{:?}", kind).as_str()))
        }
    }

    /// `ParseError` describing the current position: what was expected
    /// against what is actually there (`<eof>` when input ran out).
    fn unexpected(&self, expected: &str) -> Box<dyn Error> {
        let (found, line) = match self.peek1() {
            Some(tok) => (format!("{:?}", tok.kind()), tok.line()),
            None => (
                "<eof>".to_owned(),
                self.tokens.last().map(|tok| tok.line()).unwrap_or(1),
            ),
        };

        TrapCode::UnexpectedToken {
            expected,
            found,
            line,
        }
        .emit_box_err()
    }

    ////////////////////////////////////////////////////////////////////////////
    //// Entry point

    /// ```none
    /// Program:
    ///   0 -> Stmt*;
    /// ```
    pub fn parse(&mut self) -> Result<Program, Box<dyn Error>> {
        let mut statements = vec![];

        while !self.is_end() {
            statements.push(self.parse_stmt()?);
        }

        Ok(Program { statements })
    }

    /// ```none
    /// Stmt:
    ///   0 -> Declaration;
    ///   1 -> Assignment;
    ///   2 -> If;
    ///   3 -> While;
    ///   4 -> Print;
    /// ```
    fn parse_stmt(&mut self) -> Result<Stmt, Box<dyn Error>> {
        match self.peek1_kind() {
            Some(TokenKind::Int) | Some(TokenKind::Float) | Some(TokenKind::StrType) => {
                self.parse_declaration()
            }
            Some(TokenKind::Id) => self.parse_assignment(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::Print) => self.parse_print(),
            _ => Err(self.unexpected("statement")),
        }
    }

    /// ```none
    /// Declaration:
    ///   0 -> (int | float | string) id (= Expr)? semi;
    /// ```
    fn parse_declaration(&mut self) -> Result<Stmt, Box<dyn Error>> {
        // dispatch guarantees the type keyword
        let type_tok = self.advance().unwrap();
        let ty = PriType::from_token_kind(type_tok.kind()).unwrap();

        let name = self.expect(TokenKind::Id)?.value().to_owned();

        let value = if self.peek1_t(TokenKind::Assign) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.expect(TokenKind::Semi)?;

        Ok(Stmt::Declaration { ty, name, value })
    }

    /// ```none
    /// Assignment:
    ///   0 -> id = Expr semi;
    /// ```
    fn parse_assignment(&mut self) -> Result<Stmt, Box<dyn Error>> {
        let name = self.expect(TokenKind::Id)?.value().to_owned();
        self.expect(TokenKind::Assign)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semi)?;

        Ok(Stmt::Assignment { name, expr })
    }

    /// ```none
    /// If:
    ///   0 -> if lparen Expr rparen lbrace Stmt* rbrace (else lbrace Stmt* rbrace)?;
    /// ```
    fn parse_if(&mut self) -> Result<Stmt, Box<dyn Error>> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::Lparen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Rparen)?;

        let true_block = self.parse_block()?;

        let false_block = if self.peek1_t(TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::IfStatement {
            condition,
            true_block,
            false_block,
        })
    }

    /// ```none
    /// While:
    ///   0 -> while lparen Expr rparen lbrace Stmt* rbrace;
    /// ```
    fn parse_while(&mut self) -> Result<Stmt, Box<dyn Error>> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::Lparen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Rparen)?;

        let body = self.parse_block()?;

        Ok(Stmt::WhileLoop { condition, body })
    }

    /// ```none
    /// Print:
    ///   0 -> print lparen Expr rparen semi;
    /// ```
    fn parse_print(&mut self) -> Result<Stmt, Box<dyn Error>> {
        self.expect(TokenKind::Print)?;
        self.expect(TokenKind::Lparen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Rparen)?;
        self.expect(TokenKind::Semi)?;

        Ok(Stmt::PrintStatement(expr))
    }

    /// Brace-delimited statement list (no new scope is introduced).
    fn parse_block(&mut self) -> Result<Vec<Stmt>, Box<dyn Error>> {
        self.expect(TokenKind::Lbrace)?;

        let mut stmts = vec![];
        while !self.is_end() && !self.peek1_t(TokenKind::Rbrace) {
            stmts.push(self.parse_stmt()?);
        }

        self.expect(TokenKind::Rbrace)?;

        Ok(stmts)
    }

    ////////////////////////////////////////////////////////////////////////////
    //// Expression rules

    /// ```none
    /// Expr:
    ///   0 -> Term ((add | sub | lt | gt | eq | neq | lte | gte) Term)*;
    /// ```
    ///
    /// Single flat tier: additive and relational operators chain left to
    /// right with no precedence distinction among them.
    fn parse_expr(&mut self) -> Result<Expr, Box<dyn Error>> {
        let mut left = self.parse_term()?;

        while let Some(kind) = self.peek1_kind() {
            if !EXPR_OPS.contains(&kind) {
                break;
            }

            let op = BinOp::from_token_kind(kind).unwrap();
            self.advance();
            let right = self.parse_term()?;

            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// ```none
    /// Term:
    ///   0 -> Factor ((mul | div) Factor)*;
    /// ```
    fn parse_term(&mut self) -> Result<Expr, Box<dyn Error>> {
        let mut left = self.parse_factor()?;

        while let Some(kind) = self.peek1_kind() {
            if !TERM_OPS.contains(&kind) {
                break;
            }

            let op = BinOp::from_token_kind(kind).unwrap();
            self.advance();
            let right = self.parse_factor()?;

            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// ```none
    /// Factor:
    ///   0 -> number;
    ///   1 -> floatnum;
    ///   2 -> str;
    ///   3 -> id;
    ///   4 -> lparen Expr rparen;
    /// ```
    fn parse_factor(&mut self) -> Result<Expr, Box<dyn Error>> {
        if self.is_end() {
            return Err(self.unexpected("expression"));
        }

        let tok = self.advance().unwrap();

        match tok.kind() {
            TokenKind::Number => Ok(Expr::Number(tok.value().parse::<i64>()?)),
            TokenKind::FloatNum => Ok(Expr::FloatNumber(tok.value().parse::<f64>()?)),
            TokenKind::Str => Ok(Expr::StringLiteral(
                tok.value().trim_matches('"').to_owned(),
            )),
            TokenKind::Id => Ok(Expr::Variable(tok.value().to_owned())),
            TokenKind::Lparen => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Rparen)?;
                Ok(expr)
            }
            found => Err(TrapCode::UnexpectedToken {
                expected: "expression",
                found: format!("{:?}", found),
                line: tok.line(),
            }
            .emit_box_err()),
        }
    }
}


////////////////////////////////////////////////////////////////////////////////
//// AST dump (diagnostic, not part of the AST contract)

pub fn dump_ast(prog: &Program) -> String {
    let mut buf = String::new();

    buf.push_str("Program:\n");
    for stmt in &prog.statements {
        dump_stmt(stmt, 1, &mut buf);
    }

    buf
}

fn dump_stmt(stmt: &Stmt, indent: usize, buf: &mut String) {
    let prefix = "  ".repeat(indent);

    match stmt {
        Stmt::Declaration { ty, name, value } => {
            buf.push_str(&format!("{}Declaration: {} {}\n", prefix, ty, name));
            if let Some(value) = value {
                dump_expr(value, indent + 1, buf);
            }
        }
        Stmt::Assignment { name, expr } => {
            buf.push_str(&format!("{}Assignment: {} =\n", prefix, name));
            dump_expr(expr, indent + 1, buf);
        }
        Stmt::IfStatement {
            condition,
            true_block,
            false_block,
        } => {
            buf.push_str(&format!("{}If Statement:\n", prefix));
            dump_expr(condition, indent + 1, buf);
            for stmt in true_block {
                dump_stmt(stmt, indent + 1, buf);
            }
            if let Some(false_block) = false_block {
                buf.push_str(&format!("{}Else:\n", prefix));
                for stmt in false_block {
                    dump_stmt(stmt, indent + 1, buf);
                }
            }
        }
        Stmt::WhileLoop { condition, body } => {
            buf.push_str(&format!("{}While Loop:\n", prefix));
            dump_expr(condition, indent + 1, buf);
            for stmt in body {
                dump_stmt(stmt, indent + 1, buf);
            }
        }
        Stmt::PrintStatement(expr) => {
            buf.push_str(&format!("{}Print:\n", prefix));
            dump_expr(expr, indent + 1, buf);
        }
    }
}

fn dump_expr(expr: &Expr, indent: usize, buf: &mut String) {
    let prefix = "  ".repeat(indent);

    match expr {
        Expr::BinaryOp { left, op, right } => {
            buf.push_str(&format!("{}BinaryOp: {}\n", prefix, op));
            dump_expr(left, indent + 1, buf);
            dump_expr(right, indent + 1, buf);
        }
        Expr::Number(value) => {
            buf.push_str(&format!("{}Number: {}\n", prefix, value));
        }
        Expr::FloatNumber(value) => {
            buf.push_str(&format!("{}Float: {}\n", prefix, value));
        }
        Expr::StringLiteral(value) => {
            buf.push_str(&format!("{}String: \"{}\"\n", prefix, value));
        }
        Expr::Variable(name) => {
            buf.push_str(&format!("{}Variable: {}\n", prefix, name));
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ParseError;
    use crate::lexer::tokenize;

    fn parse_source(source: &str) -> Result<Program, Box<dyn Error>> {
        Parser::new(tokenize(source)?).parse()
    }

    #[test]
    fn test_parse_declaration() {
        let prog = parse_source("int x = 10;").unwrap();

        assert_eq!(prog.statements.len(), 1);
        match &prog.statements[0] {
            Stmt::Declaration { ty, name, value } => {
                assert_eq!(*ty, PriType::Int);
                assert_eq!(name, "x");
                assert!(matches!(value, Some(Expr::Number(10))));
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_declaration_without_initializer() {
        let prog = parse_source("float y;").unwrap();

        match &prog.statements[0] {
            Stmt::Declaration { ty, name, value } => {
                assert_eq!(*ty, PriType::Float);
                assert_eq!(name, "y");
                assert!(value.is_none());
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_term_precedence() {
        // `a + b * c` groups as `a + (b * c)`
        let prog = parse_source("x = a + b * c;").unwrap();

        match &prog.statements[0] {
            Stmt::Assignment { expr, .. } => match expr {
                Expr::BinaryOp { left, op, right } => {
                    assert_eq!(*op, BinOp::Add);
                    assert!(matches!(left.as_ref(), Expr::Variable(name) if name == "a"));
                    assert!(matches!(
                        right.as_ref(),
                        Expr::BinaryOp { op: BinOp::Mul, .. }
                    ));
                }
                other => panic!("expected binary op, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_flat_tier_left_associative() {
        // relational and additive ops share one tier: `a + b < c` is `(a + b) < c`
        let prog = parse_source("x = a + b < c;").unwrap();

        match &prog.statements[0] {
            Stmt::Assignment { expr, .. } => match expr {
                Expr::BinaryOp { left, op, .. } => {
                    assert_eq!(*op, BinOp::Lt);
                    assert!(matches!(
                        left.as_ref(),
                        Expr::BinaryOp { op: BinOp::Add, .. }
                    ));
                }
                other => panic!("expected binary op, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_parenthesized_factor() {
        // parentheses override the tiering: `(a + b) * c`
        let prog = parse_source("x = (a + b) * c;").unwrap();

        match &prog.statements[0] {
            Stmt::Assignment { expr, .. } => match expr {
                Expr::BinaryOp { left, op, .. } => {
                    assert_eq!(*op, BinOp::Mul);
                    assert!(matches!(
                        left.as_ref(),
                        Expr::BinaryOp { op: BinOp::Add, .. }
                    ));
                }
                other => panic!("expected binary op, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_if_else() {
        let prog =
            parse_source("if (x > 0) { print(x); } else { x = 0; }").unwrap();

        match &prog.statements[0] {
            Stmt::IfStatement {
                true_block,
                false_block,
                ..
            } => {
                assert_eq!(true_block.len(), 1);
                assert_eq!(false_block.as_ref().unwrap().len(), 1);
            }
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_while() {
        let prog = parse_source("while (i < 10) { i = i + 1; print(i); }").unwrap();

        match &prog.statements[0] {
            Stmt::WhileLoop { body, .. } => assert_eq!(body.len(), 2),
            other => panic!("expected while loop, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_semicolon() {
        let err = parse_source("int x = 10").unwrap_err();
        let parse_err = err.downcast_ref::<ParseError>().unwrap();

        assert_eq!(parse_err.expected, "Semi");
        assert_eq!(parse_err.found, "<eof>");
    }

    #[test]
    fn test_parse_unexpected_statement_token() {
        // `return` is tokenized but no statement rule consumes it
        let err = parse_source("return 1;").unwrap_err();
        let parse_err = err.downcast_ref::<ParseError>().unwrap();

        assert_eq!(parse_err.expected, "statement");
        assert_eq!(parse_err.found, "Return");
    }

    #[test]
    fn test_dump_ast() {
        let prog = parse_source("int x = 1 + 2;").unwrap();
        let dump = dump_ast(&prog);

        assert!(dump.contains("Program:"));
        assert!(dump.contains("Declaration: int x"));
        assert!(dump.contains("BinaryOp: +"));
        assert!(dump.contains("Number: 1"));
        assert!(dump.contains("Number: 2"));
    }
}
