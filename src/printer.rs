//! Debug renderings of the syntax tree.
//!
//! * [`AstPrinter`]: parenthesised prefix form: `(+ 1 (* 2 3))`.
//! * [`RpnPrinter`]: reverse Polish notation: `1 2 3 * +`.
//! * [`SourcePrinter`]: Lox source text; re‑parsing its output yields a tree
//!   of the same shape.

use crate::ast::{Expr, InvalidExpr, LiteralValue, Stmt};

fn number(n: f64) -> String {
    crate::value::Value::Number(n).to_string()
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

fn invalid(invalid: &InvalidExpr) -> String {
    format!("<<Error: {}>>", invalid.message())
}

/// Converts an expression to the Crafting‑Interpreters prefix form.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal { value, .. } => match value {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => quote(s),

                LiteralValue::Number(n) => number(*n),
            },

            // ── grouping ────────────────────────────────────────────────
            Expr::Grouping { expr, .. } => format!("(group {})", Self::print(expr)),

            // ── unary operator ──────────────────────────────────────────
            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            // ── binary / logical operator ───────────────────────────────
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Fun(fun) => {
                let params: Vec<&str> = fun.params.iter().map(|p| p.lexeme.as_str()).collect();
                format!("(fun {} ({}))", fun.display_name(), params.join(" "))
            }

            Expr::Invalid(inv) => invalid(inv),
        }
    }
}

/// Reverse Polish rendering; operands first, operator last.
pub struct RpnPrinter;

impl RpnPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => match value {
                LiteralValue::True => "true".into(),
                LiteralValue::False => "false".into(),
                LiteralValue::Nil => "nil".into(),
                LiteralValue::Str(s) => quote(s),
                LiteralValue::Number(n) => number(*n),
            },

            // Postfix order already encodes grouping.
            Expr::Grouping { expr, .. } => Self::print(expr),

            Expr::Unary { operator, right } => {
                format!("{} {}", Self::print(right), operator.lexeme)
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "{} {} {}",
                Self::print(left),
                Self::print(right),
                operator.lexeme
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("{} {} =", name.lexeme, Self::print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut parts: Vec<String> = arguments.iter().map(Self::print).collect();
                parts.push(format!("call::{}", Self::print(callee)));
                parts.join(" ")
            }

            Expr::Fun(_) => "fun".into(),

            Expr::Invalid(inv) => invalid(inv),
        }
    }
}

/// Renders trees back to Lox source.
///
/// Only the groupings present in the tree are parenthesised; precedence and
/// associativity take care of the rest, which is what makes the output parse
/// back into the same shape.
pub struct SourcePrinter;

impl SourcePrinter {
    pub fn expr(expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => match value {
                LiteralValue::True => "true".into(),
                LiteralValue::False => "false".into(),
                LiteralValue::Nil => "nil".into(),
                LiteralValue::Str(s) => format!("\"{}\"", s),
                LiteralValue::Number(n) => number(*n),
            },

            Expr::Grouping { expr, .. } => format!("({})", Self::expr(expr)),

            Expr::Unary { operator, right } => {
                format!("{}{}", operator.lexeme, Self::expr(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "{} {} {}",
                Self::expr(left),
                operator.lexeme,
                Self::expr(right)
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("{} = {}", name.lexeme, Self::expr(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let args: Vec<String> = arguments.iter().map(Self::expr).collect();
                format!("{}({})", Self::expr(callee), args.join(", "))
            }

            Expr::Fun(fun) => {
                let params: Vec<&str> = fun.params.iter().map(|p| p.lexeme.as_str()).collect();
                let name: &str = fun.name.as_ref().map_or("", |n| n.lexeme.as_str());
                format!(
                    "fun {}({}) {}",
                    name,
                    params.join(", "),
                    Self::block(&fun.body)
                )
            }

            Expr::Invalid(InvalidExpr::Unary {
                operator, right, ..
            }) => format!("{} {}", operator.lexeme, Self::expr(right)),
        }
    }

    pub fn stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("{};", Self::expr(expr)),

            Stmt::Print(expr) => format!("print {};", Self::expr(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("var {} = {};", name.lexeme, Self::expr(init)),
                None => format!("var {};", name.lexeme),
            },

            Stmt::Block(statements) => Self::block(statements),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut s = format!("if ({}) {}", Self::expr(condition), Self::stmt(then_branch));
                if let Some(else_branch) = else_branch {
                    s.push_str(" else ");
                    s.push_str(&Self::stmt(else_branch));
                }
                s
            }

            Stmt::While { condition, body } => {
                format!("while ({}) {}", Self::expr(condition), Self::stmt(body))
            }

            Stmt::Function { name, fun } => {
                let params: Vec<&str> = fun.params.iter().map(|p| p.lexeme.as_str()).collect();
                format!(
                    "fun {}({}) {}",
                    name.lexeme,
                    params.join(", "),
                    Self::block(&fun.body)
                )
            }

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("return {};", Self::expr(value)),
                None => "return;".into(),
            },
        }
    }

    pub fn program(statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(Self::stmt)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn block(statements: &[Stmt]) -> String {
        if statements.is_empty() {
            return "{}".into();
        }

        let body: Vec<String> = statements.iter().map(Self::stmt).collect();
        format!("{{ {} }}", body.join(" "))
    }
}
