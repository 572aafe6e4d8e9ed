//! Recursive-descent parser.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! program     → declaration* EOF
//! declaration → varDecl | funDecl | statement
//! statement   → exprStmt | forStmt | ifStmt | printStmt | whileStmt | returnStmt | block
//! expression  → assignment
//! assignment  → IDENTIFIER "=" assignment | logic_or
//! logic_or    → logic_and ( "or" logic_and )*
//! logic_and   → equality ( "and" equality )*
//! equality    → comparison ( ("!=" | "==") comparison )*
//! comparison  → term ( (">" | ">=" | "<" | "<=") term )*
//! term        → factor ( ("-" | "+") factor )*
//! factor      → unary ( ("/" | "*") unary )*
//! unary       → ("!" | "-") unary | call
//! call        → primary ( "(" arguments? ")" )*
//! primary     → NUMBER | STRING | "true" | "false" | "nil" | IDENTIFIER | "(" expression ")"
//! ```

use std::mem;
use std::rc::Rc;

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::diag::{Location, ParseError, SyntaxError};
use crate::token::{Literal, Token, TokenKind};

type ParseResult<T> = Result<T, SyntaxError>;

#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    // Number of function bodies enclosing the current token.
    function_depth: usize,
    errors: Vec<SyntaxError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Parser {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::Eof, "", None, line));
        }
        Parser {
            tokens,
            current: 0,
            function_depth: 0,
            errors: vec![],
        }
    }

    /// Parse the whole token sequence.
    ///
    /// Parsing goes on after a syntax error so that all of them get reported, but the
    /// statements are only returned when there was none.
    pub fn parse_program(&mut self) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
        let mut prg = vec![];
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                prg.push(stmt);
            }
        }
        if self.errors.is_empty() {
            Ok(prg)
        } else {
            Err(mem::take(&mut self.errors))
        }
    }

    #[cfg(test)]
    fn parse_expression(&mut self) -> Result<Expr, Vec<SyntaxError>> {
        match self.expression() {
            Ok(expr) if self.errors.is_empty() => Ok(expr),
            Ok(_) => Err(mem::take(&mut self.errors)),
            Err(e) => {
                self.errors.push(e);
                Err(mem::take(&mut self.errors))
            }
        }
    }

    /// Parse a declaration, recovering from any syntax error inside it.
    fn declaration(&mut self) -> Option<Stmt> {
        let stmt = match self.peek().kind {
            TokenKind::Var => {
                self.advance();
                self.var_decl()
            }
            TokenKind::Fun => {
                self.advance();
                self.fun_decl()
            }
            _ => self.statement(),
        };
        match stmt {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    /// Parse variable declaration.
    /// `var` has been consumed.
    fn var_decl(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "variable name")?;
        let initializer = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "';' after variable declaration")?;
        Ok(Stmt::Var { name, initializer })
    }

    fn fun_decl(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "function name")?;
        self.consume(TokenKind::LeftParen, "'(' after function name")?;
        let mut params = vec![];
        if !self.check(TokenKind::RightParen) {
            loop {
                params.push(self.consume(TokenKind::Identifier, "parameter name")?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "')' after parameters")?;
        self.consume(TokenKind::LeftBrace, "'{' before function body")?;

        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;

        Ok(Stmt::Function(Rc::new(FunctionDecl {
            name,
            params,
            body: body?,
        })))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Print => {
                self.advance();
                let value = self.expression()?;
                self.consume(TokenKind::Semicolon, "';' after value")?;
                Ok(Stmt::Print(value))
            }
            TokenKind::LeftBrace => {
                self.advance();
                Ok(Stmt::Block(self.block()?))
            }
            TokenKind::If => {
                self.advance();
                self.consume(TokenKind::LeftParen, "'(' after 'if'")?;
                let condition = self.expression()?;
                self.consume(TokenKind::RightParen, "')' after if condition")?;
                let then_branch = Box::new(self.statement()?);
                let else_branch = if self.matches(&[TokenKind::Else]) {
                    Some(Box::new(self.statement()?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                })
            }
            TokenKind::While => {
                self.advance();
                self.consume(TokenKind::LeftParen, "'(' after 'while'")?;
                let condition = self.expression()?;
                self.consume(TokenKind::RightParen, "')' after condition")?;
                let body = Box::new(self.statement()?);
                Ok(Stmt::While { condition, body })
            }
            TokenKind::For => {
                self.advance();
                self.for_stmt()
            }
            TokenKind::Return => {
                let keyword = self.advance();
                if self.function_depth == 0 {
                    // The statement parses fine, so no resynchronization.
                    self.errors
                        .push(Self::error_at(&keyword, ParseError::TopLevelReturn));
                }
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.consume(TokenKind::Semicolon, "';' after return value")?;
                Ok(Stmt::Return { keyword, value })
            }
            _ => self.expr_stmt(),
        }
    }

    fn expr_stmt(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "';' after expression")?;
        Ok(Stmt::Expression(expr))
    }

    /// Parse a `for` loop and rewrite it as a `while` loop.
    /// `for` has been consumed.
    fn for_stmt(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "'(' after 'for'")?;
        let initializer = match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Var => {
                self.advance();
                Some(self.var_decl()?)
            }
            _ => Some(self.expr_stmt()?),
        };
        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "';' after loop condition")?;
        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "')' after for clauses")?;

        let mut body = self.statement()?;
        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }
        body = Stmt::While {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
        };
        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }
        Ok(body)
    }

    /// Parse the statements of a block up to and including the closing brace.
    /// The opening brace has been consumed.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = vec![];
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "'}' after block")?;
        Ok(stmts)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let lhs = self.logic_or()?;
        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let rhs = self.assignment()?;
            match lhs {
                Expr::Variable(name) => Ok(Expr::Assign {
                    name,
                    value: Box::new(rhs),
                }),
                target => {
                    // Reported without resynchronizing.
                    self.errors.push(Self::error_at(
                        &equals,
                        ParseError::InvalidAssignmentTarget,
                    ));
                    Ok(target)
                }
            }
        } else {
            Ok(lhs)
        }
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.logic_and()?;
        while self.matches(&[TokenKind::Or]) {
            let op = self.previous().clone();
            let right = self.logic_and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let op = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.left_assoc(&[TokenKind::Minus, TokenKind::Plus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.left_assoc(&[TokenKind::Slash, TokenKind::Star], Self::unary)
    }

    /// Parse a left-associative chain of binary operators drawn from `ops`, whose operands
    /// are parsed by `operand`.
    fn left_assoc(
        &mut self,
        ops: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while self.matches(ops) {
            let op = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            Ok(Expr::Unary {
                op,
                right: Box::new(right),
            })
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        while self.matches(&[TokenKind::LeftParen]) {
            let mut arguments = vec![];
            if !self.check(TokenKind::RightParen) {
                loop {
                    arguments.push(self.expression()?);
                    if !self.matches(&[TokenKind::Comma]) {
                        break;
                    }
                }
            }
            let paren = self.consume(TokenKind::RightParen, "')' after arguments")?;
            expr = Expr::Call {
                callee: Box::new(expr),
                paren,
                arguments,
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        match self.peek().kind {
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Literal(Literal::Nil))
            }
            TokenKind::Number | TokenKind::String => {
                let token = self.advance();
                match token.literal {
                    Some(literal) => Ok(Expr::Literal(literal)),
                    None => Err(Self::error_at(&token, ParseError::ExpectedExpression)),
                }
            }
            TokenKind::Identifier => Ok(Expr::Variable(self.advance())),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "')' after expression")?;
                Ok(Expr::Grouping(Box::new(expr)))
            }
            _ => Err(Self::error_at(self.peek(), ParseError::ExpectedExpression)),
        }
    }

    /// Skip tokens until the probable start of the next statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn consume(&mut self, expected: TokenKind, what: &'static str) -> ParseResult<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(Self::error_at(self.peek(), ParseError::Expected(what)))
        }
    }

    /// Consume the current token if it is one of `kinds`.
    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn error_at(token: &Token, error: ParseError) -> SyntaxError {
        SyntaxError {
            line: token.line,
            location: Location::of(token),
            error,
        }
    }
}

/// Parse a token sequence ending with `TokenKind::Eof`.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, Vec<SyntaxError>> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner;

    type Errors = Vec<SyntaxError>;

    fn tokens(input: &str) -> Vec<Token> {
        let (tokens, errors) = scanner::scan(input);
        assert!(errors.is_empty(), "scan errors: {:?}", errors);
        tokens
    }

    fn parse_expr(input: &str) -> Result<Expr, Errors> {
        Parser::new(tokens(input)).parse_expression()
    }

    fn parse_prg(input: &str) -> Result<Vec<Stmt>, Errors> {
        parse(tokens(input))
    }

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, None, 1)
    }

    fn num(n: f64) -> Expr {
        Expr::Literal(Literal::Number(n))
    }

    fn boolean(b: bool) -> Expr {
        Expr::Literal(Literal::Bool(b))
    }

    fn var(name: &str) -> Expr {
        Expr::Variable(tok(TokenKind::Identifier, name))
    }

    fn binary(left: Expr, kind: TokenKind, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            op: tok(kind, &kind.to_string()),
            right: Box::new(right),
        }
    }

    fn logical(left: Expr, kind: TokenKind, right: Expr) -> Expr {
        Expr::Logical {
            left: Box::new(left),
            op: tok(kind, &kind.to_string()),
            right: Box::new(right),
        }
    }

    fn unary(kind: TokenKind, right: Expr) -> Expr {
        Expr::Unary {
            op: tok(kind, &kind.to_string()),
            right: Box::new(right),
        }
    }

    fn errors_of<T: std::fmt::Debug>(r: Result<T, Errors>) -> Vec<ParseError> {
        match r {
            Err(errors) => errors.into_iter().map(|e| e.error).collect(),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn number() -> Result<(), Errors> {
        assert_eq!(parse_expr("42")?, num(42.0));
        Ok(())
    }

    #[test]
    fn literals() -> Result<(), Errors> {
        assert_eq!(parse_expr("true")?, boolean(true));
        assert_eq!(parse_expr("false")?, boolean(false));
        assert_eq!(parse_expr("nil")?, Expr::Literal(Literal::Nil));
        assert_eq!(
            parse_expr("\"hi\"")?,
            Expr::Literal(Literal::Str("hi".to_string()))
        );
        Ok(())
    }

    #[test]
    fn unary_operators_nest() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("!-42")?,
            unary(TokenKind::Bang, unary(TokenKind::Minus, num(42.0)))
        );
        Ok(())
    }

    #[test]
    fn addition_is_left_associative() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("1 + 2 - 3")?,
            binary(
                binary(num(1.0), TokenKind::Plus, num(2.0)),
                TokenKind::Minus,
                num(3.0)
            )
        );
        Ok(())
    }

    #[test]
    fn factors_have_precedence_over_terms() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("1 + 2 * 3")?,
            binary(
                num(1.0),
                TokenKind::Plus,
                binary(num(2.0), TokenKind::Star, num(3.0))
            )
        );
        Ok(())
    }

    #[test]
    fn braced_expr_takes_precedence() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("1 / (2 + 3)")?,
            binary(
                num(1.0),
                TokenKind::Slash,
                Expr::Grouping(Box::new(binary(num(2.0), TokenKind::Plus, num(3.0))))
            )
        );
        Ok(())
    }

    #[test]
    fn comparison_binds_tighter_than_equality() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("1 <= 2 == 3 >= 4")?,
            binary(
                binary(num(1.0), TokenKind::LessEqual, num(2.0)),
                TokenKind::EqualEqual,
                binary(num(3.0), TokenKind::GreaterEqual, num(4.0))
            )
        );
        Ok(())
    }

    #[test]
    fn and_binds_tighter_than_or() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("a or b and c")?,
            logical(
                var("a"),
                TokenKind::Or,
                logical(var("b"), TokenKind::And, var("c"))
            )
        );
        Ok(())
    }

    #[test]
    fn conjunction_uses_and_token() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("a and b")?,
            logical(var("a"), TokenKind::And, var("b"))
        );
        Ok(())
    }

    #[test]
    fn missing_right_paren() {
        match parse_expr("(1") {
            Err(errors)
                if errors
                    == vec![SyntaxError {
                        line: 1,
                        location: Location::AtEnd,
                        error: ParseError::Expected("')' after expression"),
                    }] => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn simple_assignment() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("a = b")?,
            Expr::Assign {
                name: tok(TokenKind::Identifier, "a"),
                value: Box::new(var("b")),
            }
        );
        Ok(())
    }

    #[test]
    fn assignment_is_right_associative() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("a = b = 1")?,
            Expr::Assign {
                name: tok(TokenKind::Identifier, "a"),
                value: Box::new(Expr::Assign {
                    name: tok(TokenKind::Identifier, "b"),
                    value: Box::new(num(1.0)),
                }),
            }
        );
        Ok(())
    }

    #[test]
    fn bad_assignment_lhs() {
        match parse_expr("a + b = c") {
            Err(errors)
                if errors
                    == vec![SyntaxError {
                        line: 1,
                        location: Location::At("=".to_string()),
                        error: ParseError::InvalidAssignmentTarget,
                    }] => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn calls_chain() -> Result<(), Errors> {
        assert_eq!(
            parse_expr("f(1, true)()")?,
            Expr::Call {
                callee: Box::new(Expr::Call {
                    callee: Box::new(var("f")),
                    paren: tok(TokenKind::RightParen, ")"),
                    arguments: vec![num(1.0), boolean(true)],
                }),
                paren: tok(TokenKind::RightParen, ")"),
                arguments: vec![],
            }
        );
        Ok(())
    }

    #[test]
    fn expr_stmts() -> Result<(), Errors> {
        assert_eq!(
            parse_prg("1; 1+2;")?,
            vec![
                Stmt::Expression(num(1.0)),
                Stmt::Expression(binary(num(1.0), TokenKind::Plus, num(2.0))),
            ]
        );
        Ok(())
    }

    #[test]
    fn print_stmt() -> Result<(), Errors> {
        assert_eq!(
            parse_prg("print 1;")?,
            vec![Stmt::Print(num(1.0))]
        );
        Ok(())
    }

    #[test]
    fn var_decl() -> Result<(), Errors> {
        assert_eq!(
            parse_prg("var foo; var bar = 2;")?,
            vec![
                Stmt::Var {
                    name: tok(TokenKind::Identifier, "foo"),
                    initializer: None,
                },
                Stmt::Var {
                    name: tok(TokenKind::Identifier, "bar"),
                    initializer: Some(num(2.0)),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn blocks() -> Result<(), Errors> {
        assert_eq!(parse_prg("{ }")?, vec![Stmt::Block(vec![])]);
        assert_eq!(
            parse_prg("{ 1; { 2; } }")?,
            vec![Stmt::Block(vec![
                Stmt::Expression(num(1.0)),
                Stmt::Block(vec![Stmt::Expression(num(2.0))]),
            ])]
        );
        Ok(())
    }

    #[test]
    fn if_else_stmt() -> Result<(), Errors> {
        assert_eq!(
            parse_prg("if (true) 1; else 2;")?,
            vec![Stmt::If {
                condition: boolean(true),
                then_branch: Box::new(Stmt::Expression(num(1.0))),
                else_branch: Some(Box::new(Stmt::Expression(num(2.0)))),
            }]
        );
        assert_eq!(
            parse_prg("if (true) 1;")?,
            vec![Stmt::If {
                condition: boolean(true),
                then_branch: Box::new(Stmt::Expression(num(1.0))),
                else_branch: None,
            }]
        );
        Ok(())
    }

    #[test]
    fn while_stmt() -> Result<(), Errors> {
        assert_eq!(
            parse_prg("while (true) 1;")?,
            vec![Stmt::While {
                condition: boolean(true),
                body: Box::new(Stmt::Expression(num(1.0))),
            }]
        );
        Ok(())
    }

    #[test]
    fn for_is_desugared_to_while() -> Result<(), Errors> {
        let i = || tok(TokenKind::Identifier, "i");
        assert_eq!(
            parse_prg("for (var i = 0; i < 3; i = i + 1) print i;")?,
            vec![Stmt::Block(vec![
                Stmt::Var {
                    name: i(),
                    initializer: Some(num(0.0)),
                },
                Stmt::While {
                    condition: binary(var("i"), TokenKind::Less, num(3.0)),
                    body: Box::new(Stmt::Block(vec![
                        Stmt::Print(var("i")),
                        Stmt::Expression(Expr::Assign {
                            name: i(),
                            value: Box::new(binary(var("i"), TokenKind::Plus, num(1.0))),
                        }),
                    ])),
                },
            ])]
        );
        Ok(())
    }

    #[test]
    fn empty_for_clauses_loop_forever() -> Result<(), Errors> {
        assert_eq!(
            parse_prg("for (;;) 1;")?,
            vec![Stmt::While {
                condition: boolean(true),
                body: Box::new(Stmt::Expression(num(1.0))),
            }]
        );
        Ok(())
    }

    #[test]
    fn declare_fn_with_params_and_return() -> Result<(), Errors> {
        assert_eq!(
            parse_prg("fun foo(a, b) { return a; }")?,
            vec![Stmt::Function(Rc::new(FunctionDecl {
                name: tok(TokenKind::Identifier, "foo"),
                params: vec![
                    tok(TokenKind::Identifier, "a"),
                    tok(TokenKind::Identifier, "b")
                ],
                body: vec![Stmt::Return {
                    keyword: tok(TokenKind::Return, "return"),
                    value: Some(var("a")),
                }],
            }))]
        );
        Ok(())
    }

    #[test]
    fn return_without_value() -> Result<(), Errors> {
        assert_eq!(
            parse_prg("fun f() { return; }")?,
            vec![Stmt::Function(Rc::new(FunctionDecl {
                name: tok(TokenKind::Identifier, "f"),
                params: vec![],
                body: vec![Stmt::Return {
                    keyword: tok(TokenKind::Return, "return"),
                    value: None,
                }],
            }))]
        );
        Ok(())
    }

    #[test]
    fn return_at_top_level_is_rejected() {
        assert_eq!(
            errors_of(parse_prg("return 1;")),
            vec![ParseError::TopLevelReturn]
        );
        assert_eq!(
            errors_of(parse_prg("{ if (true) return; }")),
            vec![ParseError::TopLevelReturn]
        );
    }

    #[test]
    fn return_in_nested_function_is_accepted() -> Result<(), Errors> {
        parse_prg("fun f() { fun g() { return 1; } return g; }")?;
        Ok(())
    }

    #[test]
    fn errors_after_recovery_are_reported_too() {
        match parse_prg("var = 1;\nprint 2;\nprint (3;\nvar ok = 4;") {
            Err(errors) => {
                let lines = errors.iter().map(|e| e.line).collect::<Vec<_>>();
                assert_eq!(lines, vec![1, 3]);
                assert_eq!(errors[0].error, ParseError::Expected("variable name"));
                assert_eq!(errors[1].error, ParseError::Expected("')' after expression"));
            }
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn recovery_inside_block() {
        assert_eq!(
            errors_of(parse_prg("{ 1 + ; print 2; }\n)")),
            vec![ParseError::ExpectedExpression, ParseError::ExpectedExpression]
        );
    }

    #[test]
    fn missing_semicolon_at_end() {
        match parse_prg("print 1") {
            Err(errors) => assert_eq!(
                errors[0].to_string(),
                "[line 1] Error at end: Expect ';' after value."
            ),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn reserved_words_are_not_expressions() {
        assert_eq!(
            errors_of(parse_prg("print this;")),
            vec![ParseError::ExpectedExpression]
        );
    }

    #[test]
    fn tokens_without_eof_are_accepted() -> Result<(), Errors> {
        let mut toks = tokens("print 1;");
        toks.pop();
        assert_eq!(parse(toks)?, vec![Stmt::Print(num(1.0))]);
        Ok(())
    }
}
