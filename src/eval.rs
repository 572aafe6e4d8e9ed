//! Tree-walking evaluator.

use std::io::prelude::*;
use std::rc::Rc;

use log::trace;

use crate::ast::{Expr, Stmt};
use crate::callable::{self, Callable, UserFunction};
use crate::diag::RuntimeError;
use crate::env::Environment;
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// Maximum number of Lox function calls in progress at once.
pub const MAX_CALL_DEPTH: usize = 255;

/// How a statement finished executing.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Normal,
    /// A `return` is unwinding to the nearest function call.
    Return(Value),
}

#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    globals: Rc<Environment>,
    /// Number of user function calls in progress.
    depth: usize,
}

impl<'a, W: Write> Evaluator<'a, W> {
    /// Creates an evaluator printing to `output`, with native functions bound in the global
    /// scope.
    pub fn new(output: &'a mut W) -> Evaluator<'a, W> {
        let globals = Environment::new();
        globals.define("clock", Value::Callable(callable::clock()));
        Evaluator {
            output,
            globals,
            depth: 0,
        }
    }

    pub fn globals(&self) -> &Rc<Environment> {
        &self.globals
    }

    /// Execute top-level statements in order, stopping at the first runtime error.
    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        let globals = self.globals.clone();
        for stmt in stmts {
            if let Flow::Return(_) = self.execute(stmt, &globals)? {
                return Err(RuntimeError::TopLevelReturn);
            }
        }
        Ok(())
    }

    /// Evaluate an expression in the global scope.
    pub fn evaluate_global(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let globals = self.globals.clone();
        self.evaluate(expr, &globals)
    }

    /// Write `value` and a newline to the program output.
    pub fn print(&mut self, value: &Value) -> Result<(), RuntimeError> {
        writeln!(self.output, "{}", value)?;
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt, env: &Rc<Environment>) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(e) => {
                self.evaluate(e, env)?;
            }
            Stmt::Print(e) => {
                let v = self.evaluate(e, env)?;
                self.print(&v)?;
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(e) => self.evaluate(e, env)?,
                    None => Value::Nil,
                };
                env.define(&name.lexeme, value);
            }
            Stmt::Block(stmts) => {
                return self.execute_block(stmts, Environment::with_enclosing(env.clone()));
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    return self.execute(then_branch, env);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch, env);
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, env)?.is_truthy() {
                    if let Flow::Return(v) = self.execute(body, env)? {
                        return Ok(Flow::Return(v));
                    }
                }
            }
            Stmt::Function(declaration) => {
                let function = UserFunction {
                    declaration: declaration.clone(),
                    closure: env.clone(),
                };
                env.define(
                    &declaration.name.lexeme,
                    Value::Callable(Callable::User(Rc::new(function))),
                );
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(e) => self.evaluate(e, env)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return(value));
            }
        };
        Ok(Flow::Normal)
    }

    /// Execute `stmts` in `env`.
    ///
    /// The caller's scope is untouched whatever happens: `env` is dropped on every exit path
    /// unless a closure captured it.
    fn execute_block(
        &mut self,
        stmts: &[Stmt],
        env: Rc<Environment>,
    ) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            if let Flow::Return(v) = self.execute(stmt, &env)? {
                return Ok(Flow::Return(v));
            }
        }
        Ok(Flow::Normal)
    }

    fn evaluate(&mut self, expr: &Expr, env: &Rc<Environment>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal)),
            Expr::Grouping(e) => self.evaluate(e, env),
            Expr::Variable(name) => env.get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value, env)?;
                env.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Logical { left, op, right } => {
                let l = self.evaluate(left, env)?;
                let short_circuits = match op.kind {
                    TokenKind::Or => l.is_truthy(),
                    TokenKind::And => !l.is_truthy(),
                    _ => return Err(RuntimeError::BadOperator(op.clone())),
                };
                if short_circuits {
                    Ok(l)
                } else {
                    self.evaluate(right, env)
                }
            }
            Expr::Unary { op, right } => {
                let r = self.evaluate(right, env)?;
                match op.kind {
                    TokenKind::Bang => Ok(Value::Bool(!r.is_truthy())),
                    TokenKind::Minus => match r {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::OperandNotNumber(op.clone())),
                    },
                    _ => Err(RuntimeError::BadOperator(op.clone())),
                }
            }
            Expr::Binary { left, op, right } => {
                let l = self.evaluate(left, env)?;
                let r = self.evaluate(right, env)?;
                binary(op, l, r)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee, env)?;
                let args = arguments
                    .iter()
                    .map(|a| self.evaluate(a, env))
                    .collect::<Result<Vec<Value>, RuntimeError>>()?;
                match callee {
                    Value::Callable(c) => self.call(&c, paren, args),
                    _ => Err(RuntimeError::NotCallable(paren.clone())),
                }
            }
        }
    }

    fn call(
        &mut self,
        callee: &Callable,
        paren: &Token,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if args.len() != callee.arity() {
            return Err(RuntimeError::BadNumberOfArguments {
                paren: paren.clone(),
                expected: callee.arity(),
                got: args.len(),
            });
        }
        trace!("calling {} with {} argument(s)", callee.name(), args.len());
        match callee {
            Callable::Native(f) => (f.body)(&args).map_err(|message| RuntimeError::Native {
                paren: paren.clone(),
                message,
            }),
            Callable::User(f) => {
                if self.depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::StackOverflow(paren.clone()));
                }
                // Parameters live in a scope nested in the declaration scope, not the caller's.
                let env = Environment::with_enclosing(f.closure.clone());
                for (param, arg) in f.declaration.params.iter().zip(args) {
                    env.define(&param.lexeme, arg);
                }
                self.depth += 1;
                let flow = self.execute_block(&f.declaration.body, env);
                self.depth -= 1;
                match flow? {
                    Flow::Return(v) => Ok(v),
                    Flow::Normal => Ok(Value::Nil),
                }
            }
        }
    }
}

fn binary(op: &Token, l: Value, r: Value) -> Result<Value, RuntimeError> {
    match op.kind {
        TokenKind::EqualEqual => return Ok(Value::Bool(l == r)),
        TokenKind::BangEqual => return Ok(Value::Bool(l != r)),
        TokenKind::Plus => {
            return match (l, r) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (l, r) if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) => {
                    Ok(Value::Str(format!("{}{}", l, r)))
                }
                _ => Err(RuntimeError::BadAddOperands(op.clone())),
            }
        }
        TokenKind::Minus
        | TokenKind::Star
        | TokenKind::Slash
        | TokenKind::Greater
        | TokenKind::GreaterEqual
        | TokenKind::Less
        | TokenKind::LessEqual => (),
        _ => return Err(RuntimeError::BadOperator(op.clone())),
    }

    let (l, r) = match (l, r) {
        (Value::Number(l), Value::Number(r)) => (l, r),
        _ => return Err(RuntimeError::OperandsNotNumbers(op.clone())),
    };
    match op.kind {
        TokenKind::Minus => Ok(Value::Number(l - r)),
        TokenKind::Star => Ok(Value::Number(l * r)),
        TokenKind::Slash => {
            if r == 0.0 {
                Err(RuntimeError::DivByZero(op.clone()))
            } else {
                Ok(Value::Number(l / r))
            }
        }
        TokenKind::Greater => Ok(Value::Bool(l > r)),
        TokenKind::GreaterEqual => Ok(Value::Bool(l >= r)),
        TokenKind::Less => Ok(Value::Bool(l < r)),
        TokenKind::LessEqual => Ok(Value::Bool(l <= r)),
        _ => Err(RuntimeError::BadOperator(op.clone())),
    }
}
