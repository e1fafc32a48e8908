//! Runtime scopes.
//!
//! Environments form a tree through `enclosing` links. A child is created
//! per block, loop iteration, branch and invocation; closures keep their
//! defining environment alive by holding a clone of it.
//!
//! Lookup order: own bindings, then the enclosing chain, then the
//! environments this one expanded with `use` (their own bindings only).
//!
//! Expansion links are weak: a module environment is owned by whoever
//! registered it (the interpreter's module table) and stops being consulted
//! once that owner drops it. A closure stored in the environment it
//! captured, as in `val f = func ...`, is a reference cycle; such frames live
//! until the interpreter is dropped and are not reclaimed even then.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use kofl_ir::Line;

use crate::errors::{
    already_declared, reassign_immutable, undefined_function, undefined_variable, BacktraceFrame,
    EvalBacktrace, EvalError,
};
use crate::value::{Callable, KoflObject};

/// Whether a variable binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// `var`
    Mutable,
    /// `val`, call arguments, builtins
    Immutable,
}

impl Mutability {
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Single-threaded shared cell. All environment frames are allocated
/// through [`LocalScope::new`].
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn downgrade(&self) -> Weak<RefCell<T>> {
        Rc::downgrade(&self.0)
    }

    /// Whether `weak` points at this cell.
    #[inline]
    pub fn is(&self, weak: &Weak<RefCell<T>>) -> bool {
        std::ptr::eq(weak.as_ptr(), Rc::as_ptr(&self.0))
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// What opened an environment, for backtraces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub label: String,
    pub line: Line,
}

impl CallSite {
    pub fn new(label: impl Into<String>, line: Line) -> Self {
        CallSite {
            label: label.into(),
            line,
        }
    }
}

#[derive(Clone)]
struct Binding {
    value: KoflObject,
    mutability: Mutability,
}

struct Frame {
    variables: FxHashMap<String, Binding>,
    functions: FxHashMap<String, Callable>,
    expanded: Vec<Weak<RefCell<Frame>>>,
    enclosing: Option<Environment>,
    call_site: Option<CallSite>,
    is_global: bool,
}

impl Frame {
    fn new(enclosing: Option<Environment>, call_site: Option<CallSite>) -> Self {
        Frame {
            variables: FxHashMap::default(),
            functions: FxHashMap::default(),
            expanded: Vec::new(),
            is_global: enclosing.is_none(),
            enclosing,
            call_site,
        }
    }
}

/// A node in the runtime scope tree. Clones share the node.
#[derive(Clone)]
pub struct Environment(LocalScope<Frame>);

impl Environment {
    /// The root environment.
    pub fn global() -> Self {
        Environment(LocalScope::new(Frame::new(None, None)))
    }

    pub fn child(&self, call_site: Option<CallSite>) -> Self {
        Environment(LocalScope::new(Frame::new(Some(self.clone()), call_site)))
    }

    pub fn is_global(&self) -> bool {
        self.0.borrow().is_global
    }

    pub fn enclosing(&self) -> Option<Environment> {
        self.0.borrow().enclosing.clone()
    }

    pub fn call_site(&self) -> Option<CallSite> {
        self.0.borrow().call_site.clone()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        self.0.ptr_eq(&other.0)
    }

    /// Declare a variable here. Shadowing an outer declaration is allowed,
    /// redeclaring one in this environment is not.
    pub fn declare(
        &self,
        name: &str,
        value: KoflObject,
        mutability: Mutability,
    ) -> Result<(), EvalError> {
        let mut frame = self.0.borrow_mut();
        if frame.variables.contains_key(name) {
            return Err(already_declared(name));
        }
        frame
            .variables
            .insert(name.to_string(), Binding { value, mutability });
        Ok(())
    }

    /// Register a callable under its overload-indexed name.
    pub fn declare_function(&self, name: &str, callable: Callable) {
        self.0
            .borrow_mut()
            .functions
            .insert(name.to_string(), callable);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().variables.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Result<KoflObject, EvalError> {
        self.find(|frame| frame.variables.get(name).map(|b| b.value.clone()))
            .ok_or_else(|| undefined_variable(name))
    }

    pub fn lookup_function(&self, name: &str) -> Result<Callable, EvalError> {
        self.find(|frame| frame.functions.get(name).cloned())
            .ok_or_else(|| undefined_function(name))
    }

    fn find<T>(&self, local: impl Fn(&Frame) -> Option<T> + Copy) -> Option<T> {
        let frame = self.0.borrow();
        if let Some(found) = local(&frame) {
            return Some(found);
        }
        if let Some(found) = frame.enclosing.as_ref().and_then(|env| env.find(local)) {
            return Some(found);
        }
        frame.expanded.iter().find_map(|module| {
            let scope = module.upgrade()?;
            let frame = scope.borrow();
            local(&frame)
        })
    }

    /// Reassign the nearest declaration of `name` along the enclosing chain.
    pub fn assign(&self, name: &str, value: KoflObject) -> Result<(), EvalError> {
        let enclosing = {
            let mut frame = self.0.borrow_mut();
            if let Some(binding) = frame.variables.get_mut(name) {
                if !binding.mutability.is_mutable() {
                    return Err(reassign_immutable(name));
                }
                binding.value = value;
                return Ok(());
            }
            frame.enclosing.clone()
        };
        match enclosing {
            Some(enclosing) => enclosing.assign(name, value),
            None => Err(undefined_variable(name)),
        }
    }

    /// The environment `distance` enclosing links away.
    pub fn ancestor(&self, distance: usize) -> Option<Environment> {
        let mut env = self.clone();
        for _ in 0..distance {
            env = env.enclosing()?;
        }
        Some(env)
    }

    /// Consult `module`'s own bindings after everything else, for as long
    /// as `module` is kept alive elsewhere.
    pub fn expand(&self, module: &Environment) {
        if self.ptr_eq(module) {
            return;
        }
        let mut frame = self.0.borrow_mut();
        if frame.expanded.iter().any(|env| module.0.is(env)) {
            return;
        }
        tracing::trace!(expanded = frame.expanded.len() + 1, "expand environment");
        frame.expanded.push(module.0.downgrade());
    }

    /// Call sites from this environment outwards.
    pub fn backtrace(&self) -> EvalBacktrace {
        let mut frames = Vec::new();
        let mut env = Some(self.clone());
        while let Some(current) = env {
            if let Some(site) = current.call_site() {
                frames.push(BacktraceFrame {
                    name: site.label,
                    line: site.line,
                });
            }
            env = current.enclosing();
        }
        EvalBacktrace::new(frames)
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut env = self.enclosing();
        while let Some(current) = env {
            depth += 1;
            env = current.enclosing();
        }
        depth
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.0.borrow();
        let mut variables: Vec<&str> = frame.variables.keys().map(String::as_str).collect();
        variables.sort_unstable();
        let mut functions: Vec<&str> = frame.functions.keys().map(String::as_str).collect();
        functions.sort_unstable();
        f.debug_struct("Environment")
            .field("depth", &self.depth())
            .field("variables", &variables)
            .field("functions", &functions)
            .field("expanded", &frame.expanded.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
