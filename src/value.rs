//! Runtime values.
//!
//! `nil` and `false` are falsy; everything else (including `0`, `""` and
//! `NaN`) is truthy.  Equality is structural for primitives, by identity for
//! callables, and treats two `NaN`s as equal.

use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::ast::FunExpr;
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result, Span};
use crate::interpreter::Interpreter;

/// Signature of a host‑provided function.  An `Err` message becomes a runtime
/// error located at the call site.
pub type NativeFn = fn(&[Value]) -> std::result::Result<Value, String>;

#[derive(Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
    Callable(Callable),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Runtime type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Nil => "nil",
            Value::Callable(_) => "function",
        }
    }

    /// Rendering for diagnostics: like `Display`, but strings are quoted.
    pub fn quoted(&self) -> String {
        match self {
            Value::String(s) => serde_json::to_string(s).unwrap_or_else(|_| format!("{:?}", s)),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Callable(a), Value::Callable(b)) => a.same(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Number(n) => write!(f, "Number({:?})", n),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Nil => write!(f, "Nil"),
            Value::Callable(c) => write!(f, "Callable({})", c),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.is_infinite() {
                    write!(f, "{}", if *n > 0.0 { "Infinity" } else { "-Infinity" })
                } else if *n == 0.0 {
                    write!(f, "0")
                } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
                    write!(f, "{}", exponential(*n))
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::Callable(c) => write!(f, "{}", c),
        }
    }
}

/// Exponent form with an explicitly signed exponent: `1e+23`, `1.5e-7`.
fn exponential(n: f64) -> String {
    let formatted = format!("{:e}", n);

    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// A host function exposed to scripts.
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: NativeFn,
}

/// A user function: its declaration plus the environment it closed over.
pub struct LoxFunction {
    pub declaration: Rc<FunExpr>,
    pub closure: EnvRef,
}

impl LoxFunction {
    /// Build a closure over `closure`.  A named function *expression* gets
    /// its own frame holding the name, so its body can recurse without the
    /// name leaking into the surrounding scope.
    pub fn new(declaration: Rc<FunExpr>, closure: EnvRef, bind_own_name: bool) -> Rc<Self> {
        if let (true, Some(name)) = (bind_own_name, declaration.name.as_ref()) {
            let frame: EnvRef = Environment::with_enclosing(closure).into_ref();
            let function = Rc::new(LoxFunction {
                declaration: Rc::clone(&declaration),
                closure: Rc::clone(&frame),
            });
            frame
                .borrow_mut()
                .define(&name.lexeme, Value::Callable(Callable::Function(Rc::clone(&function))));
            return function;
        }

        Rc::new(LoxFunction {
            declaration,
            closure,
        })
    }
}

/// Anything a call expression can invoke.
#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.declaration.params.len(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::Native(native) => &native.name,
            Callable::Function(function) => function.declaration.display_name(),
        }
    }

    /// Invoke with already‑evaluated arguments.  Arity has been checked by
    /// the caller; `call_site` locates errors raised by native functions.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
        call_site: Span,
    ) -> Result<Value> {
        match self {
            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);
                (native.func)(&arguments).map_err(|message| LoxError::runtime(call_site, message))
            }

            Callable::Function(function) => {
                debug!("Calling user function '{}'", self.name());

                // Lexical scoping: the new frame hangs off the closure, not the caller.
                let mut frame = Environment::with_enclosing(Rc::clone(&function.closure));
                for (param, argument) in function.declaration.params.iter().zip(arguments) {
                    frame.define(&param.lexeme, argument);
                }

                let returned: Option<Value> =
                    interpreter.execute_block(&function.declaration.body, frame.into_ref())?.returned();

                Ok(returned.unwrap_or(Value::Nil))
            }
        }
    }

    fn same(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "<native fn {}>", native.name),
            Callable::Function(_) => write!(f, "<fn {}>", self.name()),
        }
    }
}

impl fmt::Debug for Callable {
    // Closures can reach themselves through their environment, so only the
    // name is printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
