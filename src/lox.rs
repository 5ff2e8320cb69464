//! Session facade: scan → parse → resolve → interpret.
//!
//! The static stages collect every diagnostic they find and stop the run
//! before anything executes; interpretation stops at the first runtime error.
//! A session keeps one interpreter, so globals persist across calls to
//! [`Lox::run`], which is how the REPL evaluates line after line.

use std::io::{self, Write};

use log::{debug, info};

use crate::ast::Stmt;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;
use crate::value::Value;

/// Outcome of one run: the trailing expression's value (if any), or the
/// errors of whichever stage failed.
pub type RunResult = std::result::Result<Option<Value>, Vec<LoxError>>;

pub struct Lox<W: Write> {
    filename: String,
    interpreter: Interpreter<W>,
}

impl Lox<io::Stdout> {
    pub fn with_stdout<S: Into<String>>(filename: S) -> Self {
        Self::new(filename, io::stdout())
    }
}

impl<W: Write> Lox<W> {
    pub fn new<S: Into<String>>(filename: S, out: W) -> Self {
        let filename: String = filename.into();

        info!("Lox session created for {}", filename);

        Self {
            filename,
            interpreter: Interpreter::new(out),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn interpreter(&self) -> &Interpreter<W> {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter<W> {
        &mut self.interpreter
    }

    /// Run a piece of source text in this session.
    pub fn run(&mut self, source: &str) -> RunResult {
        let statements: Vec<Stmt> = parse_source(source)?;

        self.execute(&statements)
    }

    /// Resolve and run an already‑parsed program.
    pub fn execute(&mut self, statements: &[Stmt]) -> RunResult {
        let locals = Resolver::new().resolve(statements)?;
        debug!("Resolved {} local(s)", locals.len());

        self.interpreter.resolve(locals);
        self.interpreter.interpret(statements).map_err(|e| vec![e])
    }
}

/// Scan `source`, collecting every lexical error.
pub fn scan_source(source: &str) -> std::result::Result<Vec<Token>, Vec<LoxError>> {
    Scanner::new(source.as_bytes()).scan_tokens()
}

/// Scan and parse `source` into a program.
pub fn parse_source(source: &str) -> std::result::Result<Vec<Stmt>, Vec<LoxError>> {
    let tokens: Vec<Token> = scan_source(source)?;

    Parser::new(tokens).parse()
}

/// One‑shot run in a fresh session printing to stdout.
pub fn run(source: &str, filename: &str) -> RunResult {
    Lox::with_stdout(filename).run(source)
}
