//! Textual forms of the syntax tree.
//!
//! - `sexpr` and `sexpr_stmt` render trees fully parenthesized, prefix style, for debugging:
//!   `-123 * (45.67)` prints as `(* (- 123) (group 45.67))`.
//! - `Display` on `Expr` renders source text.  Parentheses only appear where the tree has a
//!   `Grouping`, so a tree whose groupings reflect precedence parses back to itself.  This
//!   only holds for finite, non-negative number literals: `NaN` and `inf` print as identifiers,
//!   and a negative literal under a unary `-` prints as `--1`, which parses as two negations.

use std::fmt;

use crate::ast::{Expr, Stmt};
use crate::token::Literal;

pub fn sexpr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(literal) => literal.to_string(),
        Expr::Grouping(e) => parenthesize("group", &[&**e]),
        Expr::Unary { op, right } => parenthesize(&op.lexeme, &[&**right]),
        Expr::Binary { left, op, right } | Expr::Logical { left, op, right } => {
            parenthesize(&op.lexeme, &[&**left, &**right])
        }
        Expr::Variable(name) => name.lexeme.clone(),
        Expr::Assign { name, value } => format!("(= {} {})", name.lexeme, sexpr(value)),
        Expr::Call {
            callee, arguments, ..
        } => {
            let mut operands: Vec<&Expr> = vec![&**callee];
            operands.extend(arguments.iter());
            parenthesize("call", &operands)
        }
    }
}

pub fn sexpr_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expression(e) => format!("(; {})", sexpr(e)),
        Stmt::Print(e) => format!("(print {})", sexpr(e)),
        Stmt::Var {
            name,
            initializer: None,
        } => format!("(var {})", name.lexeme),
        Stmt::Var {
            name,
            initializer: Some(e),
        } => format!("(var {} = {})", name.lexeme, sexpr(e)),
        Stmt::Block(stmts) => sequence("(block", stmts),
        Stmt::If {
            condition,
            then_branch,
            else_branch: None,
        } => format!("(if {} {})", sexpr(condition), sexpr_stmt(then_branch)),
        Stmt::If {
            condition,
            then_branch,
            else_branch: Some(else_branch),
        } => format!(
            "(if-else {} {} {})",
            sexpr(condition),
            sexpr_stmt(then_branch),
            sexpr_stmt(else_branch)
        ),
        Stmt::While { condition, body } => {
            format!("(while {} {})", sexpr(condition), sexpr_stmt(body))
        }
        Stmt::Function(decl) => {
            let params = decl
                .params
                .iter()
                .map(|p| p.lexeme.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            sequence(&format!("(fun {}({})", decl.name.lexeme, params), &decl.body)
        }
        Stmt::Return { value: None, .. } => "(return)".to_string(),
        Stmt::Return { value: Some(e), .. } => format!("(return {})", sexpr(e)),
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut s = format!("({}", name);
    for e in exprs {
        s.push(' ');
        s.push_str(&sexpr(e));
    }
    s.push(')');
    s
}

fn sequence(head: &str, stmts: &[Stmt]) -> String {
    let mut s = head.to_string();
    for stmt in stmts {
        s.push(' ');
        s.push_str(&sexpr_stmt(stmt));
    }
    s.push(')');
    s
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Nil => write!(f, "nil"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Str(s) => {
                write!(f, "\"")?;
                for ch in s.chars() {
                    match ch {
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        _ => write!(f, "{}", ch)?,
                    }
                }
                write!(f, "\"")
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => write!(f, "{}", literal),
            Expr::Grouping(e) => write!(f, "({})", e),
            Expr::Unary { op, right } => write!(f, "{}{}", op.lexeme, right),
            Expr::Binary { left, op, right } | Expr::Logical { left, op, right } => {
                write!(f, "{} {} {}", left, op.lexeme, right)
            }
            Expr::Variable(name) => write!(f, "{}", name.lexeme),
            Expr::Assign { name, value } => write!(f, "{} = {}", name.lexeme, value),
            Expr::Call {
                callee, arguments, ..
            } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
