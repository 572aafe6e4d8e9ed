//! Values that can be called: functions declared in Lox and functions provided by the host.

use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::FunctionDecl;
use crate::env::Environment;
use crate::value::Value;

/// Host implementation of a native function.
///
/// The error string becomes the message of the runtime error raised by the call.
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, String>;

#[derive(Clone)]
pub enum Callable {
    User(Rc<UserFunction>),
    Native(Rc<NativeFunction>),
}

/// Function declared in Lox, along with the environment it was declared in.
pub struct UserFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<Environment>,
}

pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub body: Box<NativeFn>,
}

impl Callable {
    pub fn native<F>(name: &str, arity: usize, body: F) -> Callable
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        Callable::Native(Rc::new(NativeFunction {
            name: name.to_string(),
            arity,
            body: Box::new(body),
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::User(f) => &f.declaration.name.lexeme,
            Callable::Native(f) => &f.name,
        }
    }

    /// Number of arguments the callable must be invoked with.
    pub fn arity(&self) -> usize {
        match self {
            Callable::User(f) => f.declaration.params.len(),
            Callable::Native(f) => f.arity,
        }
    }
}

// Two callables are equal only if they are the very same function value.
impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::User(l), Callable::User(r)) => Rc::ptr_eq(l, r),
            (Callable::Native(l), Callable::Native(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

// The closure environment is left out as it may hold the function itself.
impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Callable::User(_) => "User",
            Callable::Native(_) => "Native",
        };
        f.debug_struct("Callable")
            .field("kind", &kind)
            .field("name", &self.name())
            .field("arity", &self.arity())
            .finish()
    }
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFunction")
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::User(func) => write!(f, "<fn {}>", func.declaration.name.lexeme),
            Callable::Native(_) => write!(f, "<native fn>"),
        }
    }
}

/// `clock()`: seconds elapsed since the Unix epoch.
pub fn clock() -> Callable {
    Callable::native("clock", 0, |_| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| Value::Number(d.as_secs_f64()))
            .map_err(|e| format!("Clock error: {}", e))
    })
}
