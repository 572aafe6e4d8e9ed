//! API to control the interpreter.

use std::io;
use std::io::prelude::*;

use log::debug;
use thiserror::Error;

use crate::ast::Stmt;
use crate::callable::Callable;
use crate::diag::{RuntimeError, SyntaxError};
use crate::eval::Evaluator;
use crate::value::Value;
use crate::{parser, scanner};

/// Tree-walk interpreter.
///
/// Program output goes to one writer and diagnostics to another.  Global definitions persist
/// from one run to the next.
///
/// # Example
///
/// Invoke the interpreter a first time to define a function then additional times to call this
/// function:
///
/// ```
/// # use loxwalk::interpreter::{Interpreter, LoxError};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut diagnostics: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output, &mut diagnostics);
///
/// let func_def = r#"
///     fun max(x, y) {
///         if (x > y) {
///             return x;
///         } else {
///             return y;
///         }
///     }
/// "#;
/// interp.run(func_def)?;
///
/// interp.run("print max(10, 20);").expect("interpreter error");
/// interp.run("print max(5, 4);").expect("interpreter error");
/// assert!(interp.run("print max(1);").is_err());
/// assert!(interp.had_runtime_error());
///
/// drop(interp);
/// assert_eq!(output, b"20\n5\n");
/// assert_eq!(diagnostics, b"Expected 2 arguments but got 1.\n[line 1]\n");
/// # Ok::<(), LoxError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write, D: Write> {
    evaluator: Evaluator<'t, W>,
    diagnostics: &'t mut D,
    had_error: bool,
    had_runtime_error: bool,
}

/// Errors the interpreter can raise.
#[derive(Debug, Error)]
pub enum LoxError {
    /// Errors found during lexical or syntactic analysis.
    #[error("{}", lines(.0))]
    Syntax(Vec<SyntaxError>),

    /// Error aborting evaluation.
    #[error("{}", .0.report())]
    Runtime(#[from] RuntimeError),

    /// Failure to write diagnostics.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn lines(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl<'t, W: Write, D: Write> Interpreter<'t, W, D> {
    pub fn new(output: &'t mut W, diagnostics: &'t mut D) -> Interpreter<'t, W, D> {
        Interpreter {
            evaluator: Evaluator::new(output),
            diagnostics,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Whether a lexical or syntax error was reported.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// Whether a runtime error was reported.
    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Make a host function callable from Lox under `name`.
    pub fn define_native<F>(&mut self, name: &str, arity: usize, body: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        self.evaluator
            .globals()
            .define(name, Value::Callable(Callable::native(name, arity, body)));
    }

    /// Run a whole program.
    ///
    /// Errors are reported on the diagnostic stream as well as returned.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let prg = self.parse(source)?;
        self.execute(&prg)
    }

    /// Run one line typed at the prompt.
    ///
    /// A syntax error in a previous line is forgotten.  A line made of a single expression
    /// statement has the value of the expression printed.
    pub fn run_line(&mut self, line: &str) -> Result<(), LoxError> {
        self.had_error = false;
        let prg = self.parse(line)?;
        match prg.as_slice() {
            [Stmt::Expression(expr)] => {
                let result = self
                    .evaluator
                    .evaluate_global(expr)
                    .and_then(|value| self.evaluator.print(&value));
                self.check(result)
            }
            _ => self.execute(&prg),
        }
    }

    /// Scan and parse `source`, reporting any error.
    pub fn parse(&mut self, source: &str) -> Result<Vec<Stmt>, LoxError> {
        let (tokens, mut errors) = scanner::scan(source);
        debug!("scanned {} tokens", tokens.len());
        match parser::parse(tokens) {
            Ok(prg) if errors.is_empty() => {
                debug!("parsed {} statements", prg.len());
                Ok(prg)
            }
            Ok(_) => self.syntax_errors(errors),
            Err(parse_errors) => {
                errors.extend(parse_errors);
                self.syntax_errors(errors)
            }
        }
    }

    fn execute(&mut self, prg: &[Stmt]) -> Result<(), LoxError> {
        let result = self.evaluator.interpret(prg);
        self.check(result)
    }

    fn check(&mut self, result: Result<(), RuntimeError>) -> Result<(), LoxError> {
        result.or_else(|e| {
            self.had_runtime_error = true;
            self.report(LoxError::Runtime(e))
        })
    }

    fn syntax_errors<T>(&mut self, mut errors: Vec<SyntaxError>) -> Result<T, LoxError> {
        // Lexical and syntax errors are collected separately; report them in source order.
        errors.sort_by_key(|e| e.line);
        debug!("{} syntax error(s)", errors.len());
        self.had_error = true;
        self.report(LoxError::Syntax(errors))
    }

    /// Write `error` to the diagnostic stream and hand it back.
    fn report<T>(&mut self, error: LoxError) -> Result<T, LoxError> {
        writeln!(self.diagnostics, "{}", error)?;
        Err(error)
    }
}
