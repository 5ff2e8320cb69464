//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime) convert their internal
//! failure modes into one of the variants defined here.  Every language error
//! carries the source range it refers to, so hosts can format diagnostics
//! uniformly as `[line:col-line:col]: message`.
//!
//! The module **does not** print diagnostics itself.

use std::fmt;
use std::io;

use log::info;
use serde::Serialize;
use thiserror::Error;

/// A 1‑based line/column pair inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Inclusive source range spanned by a token or syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// A span paired with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub filename: String,
    pub span: Span,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.filename, self.span)
    }
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error.
    #[error("[{span}]: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// Offending source range.
        span: Span,
    },

    /// Syntactic (parser) error.
    #[error("[{span}]: {message}")]
    Parse { message: String, span: Span },

    /// Static resolution failure (redeclaration, read in own initializer, …).
    #[error("[{span}]: {message}")]
    Resolve { message: String, span: Span },

    /// Runtime evaluation error.
    #[error("[{span}]: {message}")]
    Runtime { message: String, span: Span },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(span: Span, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: span={}, msg={}", span, message);

        LoxError::Lex { message, span }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(span: Span, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: span={}, msg={}", span, message);

        LoxError::Parse { message, span }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(span: Span, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: span={}, msg={}", span, message);

        LoxError::Resolve { message, span }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(span: Span, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: span={}, msg={}", span, message);

        LoxError::Runtime { message, span }
    }

    /// The bare diagnostic text, without location.
    pub fn message(&self) -> String {
        match self {
            LoxError::Lex { message, .. }
            | LoxError::Parse { message, .. }
            | LoxError::Resolve { message, .. }
            | LoxError::Runtime { message, .. } => message.clone(),
            LoxError::Io(e) => e.to_string(),
            LoxError::Utf8(e) => e.to_string(),
        }
    }

    /// Source range of the error, if it refers to program text.
    pub fn span(&self) -> Option<Span> {
        match self {
            LoxError::Lex { span, .. }
            | LoxError::Parse { span, .. }
            | LoxError::Resolve { span, .. }
            | LoxError::Runtime { span, .. } => Some(*span),
            LoxError::Io(_) | LoxError::Utf8(_) => None,
        }
    }

    pub fn location(&self, filename: &str) -> Option<SourceLocation> {
        self.span().map(|span| SourceLocation {
            filename: filename.to_string(),
            span,
        })
    }

    /// `true` for errors found before execution starts.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Resolve { .. }
        )
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
