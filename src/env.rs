//! Lexical scopes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::diag::RuntimeError;
use crate::token::Token;
use crate::value::Value;

/// A scope mapping names to values, chained to the scope it is nested in.
///
/// Scopes are shared with `Rc` so that closures keep the scope they were declared in alive.
/// A scope only points at its parent, never at its children.
#[derive(Debug, Default)]
pub struct Environment {
    enclosing: Option<Rc<Environment>>,
    values: RefCell<HashMap<String, Value>>,
}

impl Environment {
    /// Creates a global scope.
    pub fn new() -> Rc<Environment> {
        Rc::new(Environment::default())
    }

    pub fn with_enclosing(enclosing: Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            enclosing: Some(enclosing),
            values: RefCell::new(HashMap::new()),
        })
    }

    /// Bind `name` in this scope, replacing any previous binding of the same name here.
    pub fn define(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    /// Look `name` up from this scope outwards.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.get(name),
            None => Err(RuntimeError::UndefinedVariable(name.clone())),
        }
    }

    /// Update the innermost existing binding of `name`.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.borrow_mut().get_mut(&name.lexeme) {
            *slot = value;
            return Ok(());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.assign(name, value),
            None => Err(RuntimeError::UndefinedVariable(name.clone())),
        }
    }
}
