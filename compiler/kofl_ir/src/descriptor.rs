//! Resolved, typed IR.
//!
//! Callable declarations sit behind `Rc` so that runtime callables can
//! hold on to their declaration without copying the body.

use kofl_types::{FunctionType, Parameters, Type};
use std::fmt;
use std::rc::Rc;

use crate::{BinaryOp, Line, Literal, LogicalOp, UnaryOp};

/// One IR node: what it does, its static type, where it came from.
#[derive(Clone, Debug)]
pub struct Descriptor {
    pub kind: DescriptorKind,
    pub ty: Type,
    pub line: Line,
}

#[derive(Clone, Debug)]
pub enum DescriptorKind {
    Const(Literal),
    This,
    /// Variable access by name.
    AccessVar(String),
    /// Function-table access by overload-indexed name.
    AccessFunction(String),
    Get {
        receiver: Box<Descriptor>,
        name: String,
    },
    Set {
        receiver: Box<Descriptor>,
        name: String,
        value: Box<Descriptor>,
    },
    /// Arguments keyed by parameter name, in parameter order.
    Call {
        callee: Box<Descriptor>,
        arguments: Vec<(String, Descriptor)>,
    },
    Unary {
        op: UnaryOp,
        right: Box<Descriptor>,
    },
    Binary {
        left: Box<Descriptor>,
        op: BinaryOp,
        right: Box<Descriptor>,
    },
    Logical {
        left: Box<Descriptor>,
        op: LogicalOp,
        right: Box<Descriptor>,
    },
    Val {
        name: String,
        value: Box<Descriptor>,
    },
    Var {
        name: String,
        value: Box<Descriptor>,
    },
    Assign {
        name: String,
        value: Box<Descriptor>,
    },
    Return(Box<Descriptor>),
    Block(Vec<Descriptor>),
    While {
        condition: Box<Descriptor>,
        body: Vec<Descriptor>,
    },
    If {
        condition: Box<Descriptor>,
        then_branch: Vec<Descriptor>,
        else_branch: Vec<Descriptor>,
    },
    Function(Rc<FunctionDescriptor>),
    NativeFunction(Rc<NativeFunctionDescriptor>),
    LocalFunction(Rc<LocalFunctionDescriptor>),
    Class(Rc<ClassDescriptor>),
    Module(String),
    Use(String),
}

impl Descriptor {
    pub fn new(kind: DescriptorKind, ty: Type, line: Line) -> Self {
        Descriptor { kind, ty, line }
    }

    /// Whether this node is a `return` (not whether it contains one).
    pub fn is_return(&self) -> bool {
        matches!(self.kind, DescriptorKind::Return(_))
    }
}

/// A named, interpreted function (plain or extension).
#[derive(Debug)]
pub struct FunctionDescriptor {
    /// Overload-indexed name, e.g. `add-1`.
    pub name: String,
    /// Name as written in source.
    pub simple_name: String,
    /// Extension functions have a leading `this` parameter and a receiver.
    pub ty: FunctionType,
    pub body: Vec<Descriptor>,
    pub line: Line,
}

impl FunctionDescriptor {
    pub fn parameters(&self) -> &Parameters {
        self.ty.parameters()
    }

    pub fn return_type(&self) -> &Type {
        self.ty.return_type()
    }
}

/// A function implemented by the host, bound through the native bridge.
#[derive(Debug)]
pub struct NativeFunctionDescriptor {
    /// Overload-indexed name.
    pub name: String,
    /// Name the native bridge dispatches on.
    pub native_name: String,
    pub ty: FunctionType,
    pub line: Line,
}

impl NativeFunctionDescriptor {
    pub fn parameters(&self) -> &Parameters {
        self.ty.parameters()
    }

    pub fn return_type(&self) -> &Type {
        self.ty.return_type()
    }
}

/// An anonymous function expression.
#[derive(Debug)]
pub struct LocalFunctionDescriptor {
    pub ty: FunctionType,
    pub body: Vec<Descriptor>,
    pub line: Line,
}

impl LocalFunctionDescriptor {
    pub fn parameters(&self) -> &Parameters {
        self.ty.parameters()
    }

    pub fn return_type(&self) -> &Type {
        self.ty.return_type()
    }
}

/// A record declaration.
#[derive(Debug)]
pub struct ClassDescriptor {
    pub name: String,
    pub fields: Parameters,
    pub line: Line,
}

// Dumper

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut each: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        each(f, item)?;
    }
    Ok(())
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &[Descriptor]) -> fmt::Result {
    f.write_str("{")?;
    for descriptor in body {
        write!(f, " {descriptor};")?;
    }
    f.write_str(" }")
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DescriptorKind::Const(literal) => write!(f, "{literal}"),
            DescriptorKind::This => f.write_str("this"),
            DescriptorKind::AccessVar(name) | DescriptorKind::AccessFunction(name) => {
                f.write_str(name)
            }
            DescriptorKind::Get { receiver, name } => {
                write!(f, "get {receiver}.{name}: {}", self.ty)
            }
            DescriptorKind::Set {
                receiver,
                name,
                value,
            } => write!(f, "set {receiver}.{name} {value}"),
            DescriptorKind::Call { callee, arguments } => {
                write!(f, "call {callee}(")?;
                write_list(f, arguments, |f, (name, value)| write!(f, "{name}: {value}"))?;
                write!(f, "): {}", self.ty)
            }
            DescriptorKind::Unary { op, right } => write!(f, "({op}{right})"),
            DescriptorKind::Binary { left, op, right } => write!(f, "({left} {op} {right})"),
            DescriptorKind::Logical { left, op, right } => write!(f, "({left} {op} {right})"),
            DescriptorKind::Val { name, value } => write!(f, "val {name} {value}"),
            DescriptorKind::Var { name, value } => write!(f, "var {name} {value}"),
            DescriptorKind::Assign { name, value } => write!(f, "assign {name} {value}"),
            DescriptorKind::Return(value) => write!(f, "return {value}"),
            DescriptorKind::Block(body) => {
                f.write_str("block ")?;
                write_body(f, body)
            }
            DescriptorKind::While { condition, body } => {
                write!(f, "while {condition} ")?;
                write_body(f, body)
            }
            DescriptorKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                write!(f, "if {condition} ")?;
                write_body(f, then_branch)?;
                if !else_branch.is_empty() {
                    f.write_str(" else ")?;
                    write_body(f, else_branch)?;
                }
                Ok(())
            }
            DescriptorKind::Function(function) => write!(f, "{function}"),
            DescriptorKind::NativeFunction(native) => write!(f, "{native}"),
            DescriptorKind::LocalFunction(local) => write!(f, "{local}"),
            DescriptorKind::Class(class) => write!(f, "{class}"),
            DescriptorKind::Module(name) => write!(f, "module {name}"),
            DescriptorKind::Use(name) => write!(f, "use {name}"),
        }
    }
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "func {}({}): {}",
            self.name,
            self.parameters(),
            self.return_type()
        )
    }
}

impl fmt::Display for NativeFunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "external func {}({}): {}",
            self.name,
            self.parameters(),
            self.return_type()
        )
    }
}

impl fmt::Display for LocalFunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func ({}): {}", self.parameters(), self.return_type())
    }
}

impl fmt::Display for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type class {}({})", self.name, self.fields)
    }
}
