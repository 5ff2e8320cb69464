//! Syntax tree produced by the [`Parser`](crate::parser::Parser) and walked by
//! both the resolver and the interpreter.
//!
//! Nodes own the tokens they were built from, so a tree outlives the token
//! buffer.  Function literals live behind an [`Rc`] because closures created
//! at run time keep pointing at their declaration.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Span;
use crate::token::Token;

/// Identity of a variable‑accessing node (`Variable` / `Assign`).
///
/// Ids are unique for the whole process, so resolution tables built for
/// separate REPL inputs can be merged into one interpreter without clashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal.
    Nil,
}

/// A function literal: `fun name? ( params ) { body }`.
///
/// Shared by the declaring statement and every closure created from it.
#[derive(Debug, PartialEq)]
pub struct FunExpr {
    /// The `fun` keyword.
    pub keyword: Token,

    /// Present for declarations and named function expressions.
    pub name: Option<Token>,

    pub params: Vec<Token>,

    pub body: Vec<Stmt>,

    /// The closing `}` of the body.
    pub close: Token,
}

impl FunExpr {
    pub fn span(&self) -> Span {
        self.keyword.span().to(self.close.span())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_ref().map_or("anonymous", |t| t.lexeme.as_str())
    }
}

/// Nodes the parser builds instead of failing, so a best‑effort tree can
/// still be printed or inspected.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidExpr {
    /// A binary operator with no left‑hand operand, e.g. `* 3`.
    Unary {
        message: String,
        operator: Token,
        right: Box<Expr>,
    },
}

impl InvalidExpr {
    pub fn message(&self) -> &str {
        match self {
            InvalidExpr::Unary { message, .. } => message,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            InvalidExpr::Unary {
                operator, right, ..
            } => operator.span().to(right.span()),
        }
    }
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal { value: LiteralValue, span: Span },

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        /// Operand to which the operator is applied.
        right: Box<Expr>,
    },

    /// Infix binary operator expression
    /// *Example:* `a + b`, `x <= y`
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token, // `AND` or `OR`
        right: Box<Expr>,
    },

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping { expr: Box<Expr>, span: Span },

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// Assignment expression: `identifier "=" expression`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function call
    /// *Example:* `clock()` or `add(1, 2)`
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// Function literal / closure expression.
    Fun(Rc<FunExpr>),

    Invalid(InvalidExpr),
}

impl Expr {
    /// Source range spanned by the node's constituent tokens.
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. } | Expr::Grouping { span, .. } => *span,
            Expr::Unary { operator, right } => operator.span().to(right.span()),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                left.span().to(right.span())
            }
            Expr::Variable { name, .. } => name.span(),
            Expr::Assign { name, value, .. } => name.span().to(value.span()),
            Expr::Call { callee, paren, .. } => callee.span().to(paren.span()),
            Expr::Fun(fun) => fun.span(),
            Expr::Invalid(invalid) => invalid.span(),
        }
    }
}

/// **Abstract‑Syntax‑Tree node** for *statements*.  A program is a sequence
/// of these nodes returned by [`Parser::parse`](crate::parser::Parser::parse).
///
/// There is no `for` node: the parser lowers `for` loops into `While` inside
/// a `Block`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.
    While { condition: Expr, body: Box<Stmt> },

    /// Named function declaration.
    Function { name: Token, fun: Rc<FunExpr> },

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },
}
