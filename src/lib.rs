//! A tree‑walking interpreter for Lox.
//!
//! Source text flows through [`scanner`] → [`parser`] → [`resolver`] →
//! [`interpreter`]; [`lox::Lox`] wires the stages together for hosts.

pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lox;
pub mod parser;
pub mod printer;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

pub use error::{LoxError, Result};
pub use lox::Lox;
pub use value::Value;
