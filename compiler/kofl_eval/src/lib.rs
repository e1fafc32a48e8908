//! Kofl runtime: values, environments and the tree-walking evaluator.
//!
//! # Pipeline Position
//!
//! ```text
//! kofl_canon -> Vec<Descriptor> -> Interpreter::evaluate_unit -> Vec<KoflObject>
//! ```
//!
//! The evaluator is strict, synchronous and single-threaded. Builtins are
//! bootstrapped once, explicitly, by [`InterpreterBuilder::build`].

mod builtins;
mod environment;
mod errors;
mod interpreter;
mod native;
mod print_handler;
mod value;

pub use builtins::{initialize, BuiltinClasses};
pub use environment::{CallSite, Environment, LocalScope, Mutability};
pub use errors::{
    BacktraceFrame, ControlAction, EvalBacktrace, EvalError, EvalErrorKind, EvalResult,
};
pub use interpreter::{Interpreter, InterpreterBuilder};
pub use native::{bridge, NativeRegistry};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use value::{
    Arguments, Callable, ClassObject, HostValue, Instance, KoflObject, LocalNative, NativeFn,
    NativeObject,
};
