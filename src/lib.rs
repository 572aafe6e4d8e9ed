//! A tree-walking interpreter for the Lox language.
//!
//! See [Crafting Interpreters](https://craftinginterpreters.com/).
//!
//! Source text goes through three stages:
//!
//! - [`scanner`] turns it into tokens,
//! - [`parser`] builds a list of statements,
//! - [`eval`] walks the statements.
//!
//! [`interpreter::Interpreter`] chains them and reports errors.
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - No classes: `class`, `this` and `super` are reserved but cannot be parsed.
//! - Variables are resolved by name at runtime.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod ast;
pub mod callable;
pub mod diag;
pub mod env;
pub mod eval;
pub mod interpreter;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod token;
pub mod value;

pub use parser::parse;
pub use scanner::scan;
