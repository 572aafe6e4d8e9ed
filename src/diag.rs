//! Diagnostics raised by the scanner, the parser and the evaluator.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Line number (starting at one).
pub type Position = u32;

/// What went wrong while scanning or parsing.
#[derive(Debug, PartialEq, Clone, Error)]
pub enum ParseError {
    #[error("Unexpected character '{0}'.")]
    BadChar(char),
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Cannot parse number literal '{0}'.")]
    BadFloatLiteral(String),
    #[error("Expect {0}.")]
    Expected(&'static str),
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
    #[error("Can't return from top-level code.")]
    TopLevelReturn,
}

/// Where on its line a syntax error was detected.
#[derive(Debug, PartialEq, Clone)]
pub enum Location {
    /// Scanner errors, which are not attached to a token.
    Nowhere,
    AtEnd,
    At(String),
}

impl Location {
    pub fn of(token: &Token) -> Location {
        match token.kind {
            TokenKind::Eof => Location::AtEnd,
            _ => Location::At(token.lexeme.clone()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Nowhere => Ok(()),
            Location::AtEnd => write!(f, " at end"),
            Location::At(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

/// A `ParseError` together with its position in the source.
#[derive(Debug, PartialEq, Clone, Error)]
#[error("[line {line}] Error{location}: {error}")]
pub struct SyntaxError {
    pub line: Position,
    pub location: Location,
    pub error: ParseError,
}

/// Errors aborting evaluation.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{}'.", .0.lexeme)]
    UndefinedVariable(Token),
    #[error("Operand of '{}' must be a number.", .0.lexeme)]
    OperandNotNumber(Token),
    #[error("Operands of '{}' must be numbers.", .0.lexeme)]
    OperandsNotNumbers(Token),
    #[error("Operands of '+' must be two numbers or include a string.")]
    BadAddOperands(Token),
    #[error("Cannot divide by zero.")]
    DivByZero(Token),
    #[error("Can only call functions.")]
    NotCallable(Token),
    #[error("Expected {expected} arguments but got {got}.")]
    BadNumberOfArguments {
        paren: Token,
        expected: usize,
        got: usize,
    },
    #[error("{message}")]
    Native { paren: Token, message: String },
    #[error("Unknown operator '{}'.", .0.lexeme)]
    BadOperator(Token),
    #[error("Stack overflow.")]
    StackOverflow(Token),
    #[error("Can't return from top-level code.")]
    TopLevelReturn,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RuntimeError {
    /// Line of the token the error is attached to, if any.
    pub fn line(&self) -> Option<Position> {
        match self {
            RuntimeError::UndefinedVariable(t)
            | RuntimeError::OperandNotNumber(t)
            | RuntimeError::OperandsNotNumbers(t)
            | RuntimeError::BadAddOperands(t)
            | RuntimeError::DivByZero(t)
            | RuntimeError::NotCallable(t)
            | RuntimeError::BadOperator(t)
            | RuntimeError::StackOverflow(t)
            | RuntimeError::BadNumberOfArguments { paren: t, .. }
            | RuntimeError::Native { paren: t, .. } => Some(t.line),
            RuntimeError::TopLevelReturn | RuntimeError::Io(_) => None,
        }
    }

    /// Renders the error the way it is reported on the diagnostic stream.
    pub fn report(&self) -> String {
        match self.line() {
            Some(line) => format!("{}\n[line {}]", self, line),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_at_token() {
        let e = SyntaxError {
            line: 3,
            location: Location::At("+".to_string()),
            error: ParseError::ExpectedExpression,
        };
        assert_eq!(e.to_string(), "[line 3] Error at '+': Expect expression.");
    }

    #[test]
    fn syntax_error_at_end() {
        let eof = Token::new(TokenKind::Eof, "", None, 7);
        let e = SyntaxError {
            line: 7,
            location: Location::of(&eof),
            error: ParseError::Expected("';' after value"),
        };
        assert_eq!(e.to_string(), "[line 7] Error at end: Expect ';' after value.");
    }

    #[test]
    fn scanner_error_has_no_location() {
        let e = SyntaxError {
            line: 1,
            location: Location::Nowhere,
            error: ParseError::BadChar('@'),
        };
        assert_eq!(e.to_string(), "[line 1] Error: Unexpected character '@'.");
    }

    #[test]
    fn runtime_error_report_includes_line() {
        let name = Token::new(TokenKind::Identifier, "x", None, 2);
        let e = RuntimeError::UndefinedVariable(name);
        assert_eq!(e.report(), "Undefined variable 'x'.\n[line 2]");
    }

    #[test]
    fn arity_message_names_counts() {
        let paren = Token::new(TokenKind::RightParen, ")", None, 1);
        let e = RuntimeError::BadNumberOfArguments {
            paren,
            expected: 1,
            got: 2,
        };
        assert_eq!(e.to_string(), "Expected 1 arguments but got 2.");
    }
}
