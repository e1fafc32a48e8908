//! Syntax tree produced by the external frontend.
//!
//! This is the only input of semantic lowering. Nodes are owned trees
//! (`Box`/`Vec`), each tagged with its source [`Line`]. Type annotations
//! are plain type names, resolved later against the type scope.
//!
//! The constructor helpers on [`Expr`] and [`Stmt`] exist so that drivers
//! and tests can assemble trees without a parser.

use crate::{BinaryOp, Line, Literal, LogicalOp, UnaryOp};

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: Line,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Assign {
        name: String,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    Grouping(Box<Expr>),
    Literal(Literal),
    Unary {
        op: UnaryOp,
        right: Box<Expr>,
    },
    Var(String),
    /// Arguments are positional; the frontend drops argument labels.
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Get {
        receiver: Box<Expr>,
        name: String,
    },
    Set {
        receiver: Box<Expr>,
        name: String,
        value: Box<Expr>,
    },
    This,
    If {
        condition: Box<Expr>,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    Func(FuncDecl),
    /// `func Int.twice(): Int { ... }`
    ExtensionFunc {
        receiver: String,
        decl: FuncDecl,
    },
    AnonymousFunc {
        parameters: Vec<Param>,
        return_type: Option<String>,
        body: Vec<Stmt>,
    },
    /// `external func println(message: Any);`
    NativeFunc {
        name: String,
        parameters: Vec<Param>,
        return_type: Option<String>,
    },
}

/// A named function declaration. A missing return annotation means `Unit`.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub parameters: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Vec<Stmt>,
}

impl FuncDecl {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Param>,
        return_type: Option<&str>,
        body: Vec<Stmt>,
    ) -> Self {
        FuncDecl {
            name: name.into(),
            parameters,
            return_type: return_type.map(str::to_string),
            body,
        }
    }
}

/// `name: Type`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A statement node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: Line,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Block(Vec<Stmt>),
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    Return(Expr),
    Val {
        name: String,
        ty: Option<String>,
        value: Expr,
    },
    Var {
        name: String,
        ty: Option<String>,
        value: Expr,
    },
    Use(String),
    Module(String),
    Record {
        name: String,
        parameters: Vec<Param>,
    },
}

fn boxed(expr: Expr) -> Box<Expr> {
    Box::new(expr)
}

impl Expr {
    pub fn new(kind: ExprKind, line: Line) -> Self {
        Expr { kind, line }
    }

    pub fn literal(literal: Literal, line: Line) -> Self {
        Expr::new(ExprKind::Literal(literal), line)
    }

    pub fn int(value: i64, line: Line) -> Self {
        Expr::literal(Literal::Int(value), line)
    }

    pub fn double(value: f64, line: Line) -> Self {
        Expr::literal(Literal::Double(value), line)
    }

    pub fn boolean(value: bool, line: Line) -> Self {
        Expr::literal(Literal::Boolean(value), line)
    }

    pub fn string(value: impl Into<String>, line: Line) -> Self {
        Expr::literal(Literal::String(value.into()), line)
    }

    pub fn unit(line: Line) -> Self {
        Expr::literal(Literal::Unit, line)
    }

    pub fn var(name: impl Into<String>, line: Line) -> Self {
        Expr::new(ExprKind::Var(name.into()), line)
    }

    pub fn this(line: Line) -> Self {
        Expr::new(ExprKind::This, line)
    }

    pub fn assign(name: impl Into<String>, value: Expr, line: Line) -> Self {
        Expr::new(
            ExprKind::Assign {
                name: name.into(),
                value: boxed(value),
            },
            line,
        )
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr, line: Line) -> Self {
        Expr::new(
            ExprKind::Binary {
                left: boxed(left),
                op,
                right: boxed(right),
            },
            line,
        )
    }

    pub fn logical(left: Expr, op: LogicalOp, right: Expr, line: Line) -> Self {
        Expr::new(
            ExprKind::Logical {
                left: boxed(left),
                op,
                right: boxed(right),
            },
            line,
        )
    }

    pub fn unary(op: UnaryOp, right: Expr, line: Line) -> Self {
        Expr::new(
            ExprKind::Unary {
                op,
                right: boxed(right),
            },
            line,
        )
    }

    pub fn grouping(inner: Expr, line: Line) -> Self {
        Expr::new(ExprKind::Grouping(boxed(inner)), line)
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>, line: Line) -> Self {
        Expr::new(
            ExprKind::Call {
                callee: boxed(callee),
                arguments,
            },
            line,
        )
    }

    pub fn get(receiver: Expr, name: impl Into<String>, line: Line) -> Self {
        Expr::new(
            ExprKind::Get {
                receiver: boxed(receiver),
                name: name.into(),
            },
            line,
        )
    }

    pub fn set(receiver: Expr, name: impl Into<String>, value: Expr, line: Line) -> Self {
        Expr::new(
            ExprKind::Set {
                receiver: boxed(receiver),
                name: name.into(),
                value: boxed(value),
            },
            line,
        )
    }

    pub fn if_else(
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        line: Line,
    ) -> Self {
        Expr::new(
            ExprKind::If {
                condition: boxed(condition),
                then_branch,
                else_branch,
            },
            line,
        )
    }

    pub fn func(decl: FuncDecl, line: Line) -> Self {
        Expr::new(ExprKind::Func(decl), line)
    }

    pub fn extension_func(receiver: impl Into<String>, decl: FuncDecl, line: Line) -> Self {
        Expr::new(
            ExprKind::ExtensionFunc {
                receiver: receiver.into(),
                decl,
            },
            line,
        )
    }

    pub fn anonymous_func(
        parameters: Vec<Param>,
        return_type: Option<&str>,
        body: Vec<Stmt>,
        line: Line,
    ) -> Self {
        Expr::new(
            ExprKind::AnonymousFunc {
                parameters,
                return_type: return_type.map(str::to_string),
                body,
            },
            line,
        )
    }

    pub fn native_func(
        name: impl Into<String>,
        parameters: Vec<Param>,
        return_type: Option<&str>,
        line: Line,
    ) -> Self {
        Expr::new(
            ExprKind::NativeFunc {
                name: name.into(),
                parameters,
                return_type: return_type.map(str::to_string),
            },
            line,
        )
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, line: Line) -> Self {
        Stmt { kind, line }
    }

    /// Expression statement, on the expression's line.
    pub fn expr(expr: Expr) -> Self {
        let line = expr.line;
        Stmt::new(StmtKind::Expr(expr), line)
    }

    pub fn block(body: Vec<Stmt>, line: Line) -> Self {
        Stmt::new(StmtKind::Block(body), line)
    }

    pub fn while_loop(condition: Expr, body: Vec<Stmt>, line: Line) -> Self {
        Stmt::new(StmtKind::While { condition, body }, line)
    }

    pub fn ret(value: Expr, line: Line) -> Self {
        Stmt::new(StmtKind::Return(value), line)
    }

    pub fn val(name: impl Into<String>, ty: Option<&str>, value: Expr, line: Line) -> Self {
        Stmt::new(
            StmtKind::Val {
                name: name.into(),
                ty: ty.map(str::to_string),
                value,
            },
            line,
        )
    }

    pub fn var(name: impl Into<String>, ty: Option<&str>, value: Expr, line: Line) -> Self {
        Stmt::new(
            StmtKind::Var {
                name: name.into(),
                ty: ty.map(str::to_string),
                value,
            },
            line,
        )
    }

    pub fn use_module(name: impl Into<String>, line: Line) -> Self {
        Stmt::new(StmtKind::Use(name.into()), line)
    }

    pub fn module(name: impl Into<String>, line: Line) -> Self {
        Stmt::new(StmtKind::Module(name.into()), line)
    }

    pub fn record(name: impl Into<String>, parameters: Vec<Param>, line: Line) -> Self {
        Stmt::new(
            StmtKind::Record {
                name: name.into(),
                parameters,
            },
            line,
        )
    }

    /// `func name(...) { ... }` as a statement.
    pub fn func(decl: FuncDecl, line: Line) -> Self {
        Stmt::expr(Expr::func(decl, line))
    }
}
