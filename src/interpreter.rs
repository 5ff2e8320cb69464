//! Tree‑walking evaluator.
//!
//! Statements run top to bottom against a chain of [`Environment`] frames.
//! Variable accesses consult the [`ResolutionTable`] first and hop straight to
//! the owning frame; unresolved names are looked up in the globals.
//!
//! Early `return` is not an error: every statement yields a [`Completion`],
//! and the function‑call boundary unwraps `Completion::Return` into the call's
//! value.  `Err` is reserved for real runtime failures, and the first one
//! stops the program.

use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result, Span};
use crate::resolver::ResolutionTable;
use crate::token::{Token, TokenType};
use crate::value::{Callable, LoxFunction, NativeFn, NativeFunction, Value};

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Ran to the end.  Expression statements carry their value so a REPL
    /// can echo it.
    Normal(Option<Value>),

    /// A `return` is unwinding to the enclosing call.
    Return(Value),
}

impl Completion {
    /// The value carried by a `return`, if this is one.
    pub fn returned(self) -> Option<Value> {
        match self {
            Completion::Return(value) => Some(value),
            Completion::Normal(_) => None,
        }
    }
}

pub struct Interpreter<W: Write> {
    globals: EnvRef,
    environment: EnvRef,
    locals: ResolutionTable,
    out: W,
}

impl Interpreter<io::Stdout> {
    /// Interpreter printing to the process's standard output.
    pub fn with_stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    /// Creates a new Interpreter writing `print` output to `out`, with native
    /// functions such as `clock` already defined.
    pub fn new(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Environment::new().into_ref();

        let mut interpreter = Self {
            environment: Rc::clone(&globals),
            globals,
            locals: ResolutionTable::new(),
            out,
        };

        interpreter.define_native("clock", 0, |_args: &[Value]| {
            let millis: i64 = chrono::Utc::now().timestamp_millis();
            Ok(Value::Number(millis as f64 / 1000.0))
        });

        interpreter
    }

    /// Register a host function in the global scope.
    pub fn define_native(&mut self, name: &str, arity: usize, func: NativeFn) {
        debug!("Defining native function '{}'", name);

        let native = NativeFunction {
            name: name.to_string(),
            arity,
            func,
        };

        self.globals
            .borrow_mut()
            .define(name, Value::Callable(Callable::Native(Rc::new(native))));
    }

    /// Merge a resolver pass's binding distances.  Tables from earlier passes
    /// stay valid because node ids never repeat.
    pub fn resolve(&mut self, locals: ResolutionTable) {
        debug!("Recording {} resolved local(s)", locals.len());

        self.locals.extend(locals);
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Interprets a list of statements (a "program").  Returns the value of
    /// the last statement when it is an expression statement.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<Option<Value>> {
        debug!("Interpreting {} statements", statements.len());

        let mut last: Option<Value> = None;

        for stmt in statements {
            match self.execute(stmt)? {
                Completion::Normal(value) => last = value,
                // Only reachable when the resolver was skipped.
                Completion::Return(value) => return Ok(Some(value)),
            }
        }

        info!("Interpretation completed successfully");
        Ok(last)
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Completion> {
        match stmt {
            Stmt::Expression(expr) => {
                let value: Value = self.evaluate(expr)?;
                Ok(Completion::Normal(Some(value)))
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Completion::Normal(None))
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Completion::Normal(None))
            }

            Stmt::Block(statements) => {
                let frame: EnvRef =
                    Environment::with_enclosing(Rc::clone(&self.environment)).into_ref();
                self.execute_block(statements, frame)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Completion::Normal(None))
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Completion::Return(value) = self.execute(body)? {
                        return Ok(Completion::Return(value));
                    }
                }
                Ok(Completion::Normal(None))
            }

            Stmt::Function { name, fun } => {
                // The closure is the current frame, which is also where the
                // name goes, so the body can call itself.
                let function = LoxFunction::new(Rc::clone(fun), Rc::clone(&self.environment), false);
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Callable(Callable::Function(function)));
                info!(
                    "Function '{}' defined with {} parameters",
                    name.lexeme,
                    fun.params.len()
                );
                Ok(Completion::Normal(None))
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Completion::Return(value))
            }
        }
    }

    /// Run `statements` with `environment` as the current frame.  The
    /// previous frame is restored on every exit path, errors included.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<Completion> {
        let previous: EnvRef = std::mem::replace(&mut self.environment, environment);

        let result = self.run_statements(statements);

        self.environment = previous;
        result
    }

    fn run_statements(&mut self, statements: &[Stmt]) -> Result<Completion> {
        let mut last = Completion::Normal(None);

        for stmt in statements {
            last = self.execute(stmt)?;
            if let Completion::Return(_) = last {
                break;
            }
        }

        Ok(last)
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(match value {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping { expr, .. } => self.evaluate(expr),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_val: Value = self.evaluate(left)?;

                let short_circuit: bool = match operator.token_type {
                    TokenType::OR => left_val.is_truthy(),
                    _ => !left_val.is_truthy(),
                };

                if short_circuit {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;
                self.assign_variable(*id, name, value.clone())?;
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val: Value = self.evaluate(callee)?;

                let mut arg_values: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    arg_values.push(self.evaluate(arg)?);
                }

                self.invoke(callee_val, paren, arg_values, expr.span())
            }

            Expr::Fun(fun) => {
                let function = LoxFunction::new(Rc::clone(fun), Rc::clone(&self.environment), true);
                Ok(Value::Callable(Callable::Function(function)))
            }

            Expr::Invalid(invalid) => Err(LoxError::parse(invalid.span(), invalid.message())),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(LoxError::runtime(
                    operator.span(),
                    format!(
                        "Cannot negate {} ({}) - expected number",
                        other.type_name(),
                        other.quoted()
                    ),
                )),
            },
            _ => Err(LoxError::runtime(
                operator.span(),
                format!("Invalid unary operator '{}'", operator.lexeme),
            )),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;
        debug!("Binary '{}' on {} and {}", operator.lexeme, left_val, right_val);

        let span: Span = operator.span();

        match operator.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (a @ Value::String(_), b) | (a, b @ Value::String(_)) => {
                    Ok(Value::String(format!("{}{}", a, b)))
                }
                (a, b) => Err(LoxError::runtime(
                    span,
                    format!(
                        "Cannot add {} ({}) and {} ({}) - expected two numbers, or at least one string",
                        a.type_name(),
                        a.quoted(),
                        b.type_name(),
                        b.quoted()
                    ),
                )),
            },
            TokenType::MINUS => numeric(span, "subtract", left_val, right_val, |a, b| (a - b).into()),
            TokenType::STAR => numeric(span, "multiply", left_val, right_val, |a, b| (a * b).into()),
            TokenType::SLASH => numeric(span, "divide", left_val, right_val, |a, b| (a / b).into()),
            TokenType::GREATER => numeric(span, "compare", left_val, right_val, |a, b| (a > b).into()),
            TokenType::GREATER_EQUAL => {
                numeric(span, "compare", left_val, right_val, |a, b| (a >= b).into())
            }
            TokenType::LESS => numeric(span, "compare", left_val, right_val, |a, b| (a < b).into()),
            TokenType::LESS_EQUAL => {
                numeric(span, "compare", left_val, right_val, |a, b| (a <= b).into())
            }
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),
            _ => Err(LoxError::runtime(
                span,
                format!("Invalid binary operator '{}'", operator.lexeme),
            )),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        let value: Option<Value> = match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme),
            None => self.globals.borrow().get(&name.lexeme),
        };

        value.ok_or_else(|| {
            LoxError::runtime(
                name.span(),
                format!("Undefined variable '{}'.", name.lexeme),
            )
        })
    }

    fn assign_variable(&mut self, id: ExprId, name: &Token, value: Value) -> Result<()> {
        let assigned: bool = match self.locals.get(&id) {
            Some(&distance) => {
                Environment::assign_at(&self.environment, distance, &name.lexeme, value)
            }
            None => self.globals.borrow_mut().assign(&name.lexeme, value),
        };

        if assigned {
            Ok(())
        } else {
            Err(LoxError::runtime(
                name.span(),
                format!("No variable named '{}' to assign a value to.", name.lexeme),
            ))
        }
    }

    /// Invokes a callable (native or user‑defined function).
    fn invoke(
        &mut self,
        callee: Value,
        paren: &Token,
        arguments: Vec<Value>,
        call_site: Span,
    ) -> Result<Value> {
        let callable: Callable = match callee {
            Value::Callable(callable) => callable,
            other => {
                return Err(LoxError::runtime(
                    paren.span(),
                    format!("Can only call functions, not {}.", other.type_name()),
                ))
            }
        };

        if arguments.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren.span(),
                format!(
                    "Expected {} arguments, but got {}.",
                    callable.arity(),
                    arguments.len()
                ),
            ));
        }

        let result: Value = callable.call(self, arguments, call_site)?;
        debug!("'{}' returned {}", callable.name(), result);
        Ok(result)
    }
}

/// Apply a number‑only operator, or report both operand types.
fn numeric(
    span: Span,
    verb: &str,
    left: Value,
    right: Value,
    op: impl FnOnce(f64, f64) -> Value,
) -> Result<Value> {
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => Ok(op(*a, *b)),
        _ => Err(LoxError::runtime(
            span,
            format!(
                "Cannot {} {} ({}) and {} ({}) - expected two numbers",
                verb,
                left.type_name(),
                left.quoted(),
                right.type_name(),
                right.quoted()
            ),
        )),
    }
}
