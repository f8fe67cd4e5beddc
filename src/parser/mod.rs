//! CMM recursive-descent parser.
//!
//! LL(k) with up to two tokens of lookahead, producing a single `Program`
//! tree. Any mismatch between the current token and what the production
//! expects aborts immediately with "Invalid token: <lexeme> in line <N>" —
//! there is no error recovery or accumulation, so `parse` returns on the
//! first failure rather than collecting a `Vec` of diagnostics the way a
//! line-oriented assembler parser would.

pub mod ast;


use crate::error::{CmmError, Result};
use crate::lexer::token::{Token, TokenKind};
use ast::*;

pub fn parse(tokens: &[Token]) -> Result<Program> {
    let mut parser = Parser { tokens, pos: 0 };
    let program = parser.parse_program()?;
    parser.expect(&TokenKind::Eof)?;
    Ok(program)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn line(&self) -> usize {
        self.tokens[self.pos].line
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error_here(&self) -> CmmError {
        CmmError::InvalidToken {
            lexeme: self.peek().lexeme(),
            line: self.line(),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        if self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here())
        }
    }

    fn expect_id(&mut self) -> Result<String> {
        match self.peek().clone() {
            TokenKind::Id(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_here()),
        }
    }

    fn parse_type(&mut self) -> Result<Type> {
        match self.peek() {
            TokenKind::KwInt => {
                self.advance();
                Ok(Type::Int)
            }
            TokenKind::KwVoid => {
                self.advance();
                Ok(Type::Void)
            }
            _ => Err(self.error_here()),
        }
    }

    fn is_type_start(&self) -> bool {
        matches!(self.peek(), TokenKind::KwInt | TokenKind::KwVoid)
    }

    // Program ::= Decl { Decl }
    fn parse_program(&mut self) -> Result<Program> {
        let mut decls = Vec::new();
        while !matches!(self.peek(), TokenKind::Eof) {
            decls.push(self.parse_decl()?);
        }
        Ok(Program { decls })
    }

    // Decl ::= VarDecl | FuncDecl, discriminated by whether '(' follows the
    // identifier (FuncDecl) or '[' / ';' follows it (VarDecl).
    fn parse_decl(&mut self) -> Result<Decl> {
        if matches!(self.peek_at(2), TokenKind::LParen) {
            Ok(Decl::Func(self.parse_func_decl()?))
        } else {
            Ok(Decl::Var(self.parse_var_decl()?))
        }
    }

    // VarDecl ::= Type Id [ '[' Number ']' ] ';'
    fn parse_var_decl(&mut self) -> Result<VarDecl> {
        let line = self.line();
        let ty = self.parse_type()?;
        let name = self.expect_id()?;
        let array_len = if matches!(self.peek(), TokenKind::LBracket) {
            self.advance();
            let n = self.expect_number()?;
            self.expect(&TokenKind::RBracket)?;
            Some(n)
        } else {
            None
        };
        self.expect(&TokenKind::Semi)?;
        Ok(VarDecl { ty, name, array_len, line })
    }

    fn expect_number(&mut self) -> Result<i32> {
        match *self.peek() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.error_here()),
        }
    }

    // FuncDecl ::= Type Id '(' [ParamList] ')' '{' LocalDecl StmtList '}'
    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        let line = self.line();
        let ty = self.parse_type()?;
        let name = self.expect_id()?;
        self.expect(&TokenKind::LParen)?;
        let params = if matches!(self.peek(), TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_param_list()?
        };
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;
        let locals = self.parse_local_decls()?;
        let body = self.parse_stmt_list()?;
        self.expect(&TokenKind::RBrace)?;
        Ok(FuncDecl { ty, name, params, locals, body, line })
    }

    // ParamList ::= Param { ',' Param }
    //
    // `int f(void)` is accepted as an empty parameter list, per the frozen
    // reading of the open question on `void`-as-sole-parameter.
    fn parse_param_list(&mut self) -> Result<Vec<Param>> {
        if matches!(self.peek(), TokenKind::KwVoid) && matches!(self.peek_at(1), TokenKind::RParen)
        {
            self.advance();
            return Ok(Vec::new());
        }

        let mut params = vec![self.parse_param()?];
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    // Param ::= Type Id [ '[' ']' ]
    fn parse_param(&mut self) -> Result<Param> {
        let ty = self.parse_type()?;
        let name = self.expect_id()?;
        let is_array = if matches!(self.peek(), TokenKind::LBracket) {
            self.advance();
            self.expect(&TokenKind::RBracket)?;
            true
        } else {
            false
        };
        Ok(Param { ty, name, is_array })
    }

    // LocalDecl ::= { VarDecl } — every VarDecl starts with a type keyword,
    // which no statement does, so one token of lookahead suffices.
    fn parse_local_decls(&mut self) -> Result<Vec<VarDecl>> {
        let mut locals = Vec::new();
        while self.is_type_start() {
            locals.push(self.parse_var_decl()?);
        }
        Ok(locals)
    }

    // StmtList ::= { Stmt }
    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !matches!(self.peek(), TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    // Stmt ::= ExprStmt | IfStmt | WhileStmt | ReturnStmt
    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek() {
            TokenKind::KwIf => self.parse_if_stmt(),
            TokenKind::KwWhile => self.parse_while_stmt(),
            TokenKind::KwReturn => self.parse_return_stmt(),
            _ => self.parse_expr_stmt(),
        }
    }

    // ExprStmt ::= [ Expr ] ';'
    fn parse_expr_stmt(&mut self) -> Result<Stmt> {
        let expr = if matches!(self.peek(), TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt::Expr(expr))
    }

    // IfStmt ::= 'if' '(' Expr ')' '{' StmtList '}' [ 'else' '{' StmtList '}' ]
    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        self.advance(); // 'if'
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;
        let then_branch = self.parse_stmt_list()?;
        self.expect(&TokenKind::RBrace)?;

        let else_branch = if matches!(self.peek(), TokenKind::KwElse) {
            self.advance();
            self.expect(&TokenKind::LBrace)?;
            let stmts = self.parse_stmt_list()?;
            self.expect(&TokenKind::RBrace)?;
            Some(stmts)
        } else {
            None
        };

        Ok(Stmt::If { cond, then_branch, else_branch })
    }

    // WhileStmt ::= 'while' '(' Expr ')' '{' StmtList '}'
    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        self.advance(); // 'while'
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;
        let body = self.parse_stmt_list()?;
        self.expect(&TokenKind::RBrace)?;
        Ok(Stmt::While { cond, body })
    }

    // ReturnStmt ::= 'return' [ Expr ] ';'
    fn parse_return_stmt(&mut self) -> Result<Stmt> {
        self.advance(); // 'return'
        let expr = if matches!(self.peek(), TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semi)?;
        Ok(Stmt::Return(expr))
    }

    // Expr ::= Var '=' Expr | SimpleExpr
    //
    // Both alternatives can start with an identifier, so the choice can't
    // be made by lookahead alone. We speculatively parse a `Var`, check
    // whether `=` follows, and roll the cursor back if it doesn't — a true
    // backtracking step, per the first option in the design notes.
    fn parse_expr(&mut self) -> Result<Expr> {
        if matches!(self.peek(), TokenKind::Id(_)) {
            let checkpoint = self.pos;
            if let Ok(var) = self.parse_var() {
                if matches!(self.peek(), TokenKind::Assign) {
                    self.advance();
                    let value = Box::new(self.parse_expr()?);
                    return Ok(Expr::Assign { target: var, value });
                }
            }
            self.pos = checkpoint;
        }
        Ok(Expr::Simple(self.parse_simple_expr()?))
    }

    // Var ::= Id [ '[' Expr ']' ]
    fn parse_var(&mut self) -> Result<Var> {
        let line = self.line();
        let name = self.expect_id()?;
        let index = if matches!(self.peek(), TokenKind::LBracket) {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::RBracket)?;
            Some(Box::new(expr))
        } else {
            None
        };
        Ok(Var { name, index, line })
    }

    // SimpleExpr ::= AddExpr [ RelOp AddExpr ]
    fn parse_simple_expr(&mut self) -> Result<SimpleExpr> {
        let left = self.parse_add_expr()?;
        let rel = match self.peek() {
            TokenKind::Lt => Some(RelOp::Lt),
            TokenKind::Le => Some(RelOp::Le),
            TokenKind::Gt => Some(RelOp::Gt),
            TokenKind::Ge => Some(RelOp::Ge),
            TokenKind::Eq => Some(RelOp::Eq),
            TokenKind::Ne => Some(RelOp::Ne),
            _ => None,
        };
        let rel = match rel {
            Some(op) => {
                self.advance();
                Some((op, self.parse_add_expr()?))
            }
            None => None,
        };
        Ok(SimpleExpr { left, rel })
    }

    // AddExpr ::= Term { AddOp Term }
    fn parse_add_expr(&mut self) -> Result<AddExpr> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                TokenKind::Plus => AddOp::Add,
                TokenKind::Minus => AddOp::Sub,
                _ => break,
            };
            self.advance();
            rest.push((op, self.parse_term()?));
        }
        Ok(AddExpr { first, rest })
    }

    // Term ::= Factor { MulOp Factor }
    fn parse_term(&mut self) -> Result<Term> {
        let first = self.parse_factor()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                TokenKind::Star => MulOp::Mul,
                TokenKind::Slash => MulOp::Div,
                _ => break,
            };
            self.advance();
            rest.push((op, self.parse_factor()?));
        }
        Ok(Term { first, rest })
    }

    // Factor ::= '(' Expr ')' | Number | Call | Var
    fn parse_factor(&mut self) -> Result<Factor> {
        match self.peek().clone() {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Factor::Paren(Box::new(expr)))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Factor::Number(n))
            }
            TokenKind::Id(_) if matches!(self.peek_at(1), TokenKind::LParen) => {
                Ok(Factor::Call(self.parse_call()?))
            }
            TokenKind::Id(_) => Ok(Factor::Var(self.parse_var()?)),
            _ => Err(self.error_here()),
        }
    }

    // Call ::= Id '(' [ArgList] ')'
    fn parse_call(&mut self) -> Result<Call> {
        let line = self.line();
        let name = self.expect_id()?;
        self.expect(&TokenKind::LParen)?;
        let args = if matches!(self.peek(), TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_arg_list()?
        };
        self.expect(&TokenKind::RParen)?;
        Ok(Call { name, args, line })
    }

    // ArgList ::= Expr { ',' Expr }
    fn parse_arg_list(&mut self) -> Result<Vec<Expr>> {
        let mut args = vec![self.parse_expr()?];
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }
}
