//! Lox interpreter command-line.
//!
//! When called without a script it drops into an interactive read-evaluate-print loop.
//!
//! Exit status follows the sysexits convention: 65 after a syntax error, 70 after a runtime
//! error.  Set `RUST_LOG=debug` to trace the interpreter phases on stderr.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{self, Context};
use clap::Parser;

use loxwalk::ast::Stmt;
use loxwalk::interpreter::{Interpreter, LoxError};
use loxwalk::printer::sexpr_stmt;

const EXIT_SYNTAX_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(Parser, Debug)]
#[command(version, about = "Tree-walking interpreter for the Lox language")]
struct Args {
    /// Path of the script to run; starts a prompt when omitted
    script: Option<PathBuf>,
    /// Print the syntax tree of each statement instead of running it
    #[arg(long, default_value_t = false)]
    print_ast: bool,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args = Args::parse();
    match &args.script {
        Some(path) => {
            let status = run_file(path, args.print_ast)?;
            if status != 0 {
                process::exit(status);
            }
        }
        None => run_prompt(args.print_ast)?,
    }
    Ok(())
}

fn run_file(path: &Path, print_ast: bool) -> Result<i32, anyhow::Error> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut interp_stdout = io::stdout();
    let mut interp_stderr = io::stderr();
    let mut interp = Interpreter::new(&mut interp_stdout, &mut interp_stderr);

    if print_ast {
        dump(interp.parse(&source))?;
    } else {
        keep_going(interp.run(&source))?;
    }

    Ok(if interp.had_error() {
        EXIT_SYNTAX_ERROR
    } else if interp.had_runtime_error() {
        EXIT_RUNTIME_ERROR
    } else {
        0
    })
}

fn run_prompt(print_ast: bool) -> Result<(), anyhow::Error> {
    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();
    let mut interp_stdout = io::stdout();
    let mut interp_stderr = io::stderr();

    let mut interp = Interpreter::new(&mut interp_stdout, &mut interp_stderr);

    let mut input = String::new();
    loop {
        repl_stdout.write_all(b"> ")?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }

        if print_ast {
            dump(interp.parse(&input))?;
        } else {
            keep_going(interp.run_line(&input))?;
        }
    }

    Ok(())
}

fn dump(parsed: Result<Vec<Stmt>, LoxError>) -> Result<(), anyhow::Error> {
    match parsed {
        Ok(prg) => {
            for stmt in &prg {
                println!("{}", sexpr_stmt(stmt));
            }
            Ok(())
        }
        Err(e) => keep_going(Err(e)),
    }
}

/// Lox errors were already reported by the interpreter; only I/O failures abort.
fn keep_going(result: Result<(), LoxError>) -> Result<(), anyhow::Error> {
    match result {
        Err(LoxError::Io(e)) => Err(e).context("failed to write diagnostics"),
        _ => Ok(()),
    }
}
