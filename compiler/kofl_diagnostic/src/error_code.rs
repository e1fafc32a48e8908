use std::fmt;

/// Error codes for all diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E2xxx: semantic lowering (compile time)
/// - E6xxx: evaluation (runtime)
/// - E9xxx: internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lowering Errors (E2xxx)
    /// Unresolved variable
    E2001,
    /// Unresolved function (no overload matches)
    E2002,
    /// Unresolved parameter (argument without a matching parameter)
    E2003,
    /// Unexpected type
    E2004,
    /// Missing return in a non-Unit function
    E2005,
    /// Name already resolved in this scope
    E2006,
    /// Class declaration without a name
    E2007,

    // Runtime Errors (E6xxx)
    /// Undefined variable
    E6001,
    /// Undefined function
    E6002,
    /// Variable already declared in this environment
    E6003,
    /// Reassignment of an immutable binding
    E6004,
    /// Invalid type (e.g. callee is not callable)
    E6005,
    /// Callable body finished without returning
    E6006,
    /// Undefined module
    E6007,
    /// Module declared outside the global environment
    E6008,
    /// Invalid operands for an operator
    E6009,
    /// Feature not supported by the evaluator
    E6010,
    /// No `main` entry point
    E6011,
    /// `main` returned something other than an Int
    E6012,

    // Internal Errors (E9xxx)
    /// Return signal escaped every callable
    E9001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6008 => "E6008",
            ErrorCode::E6009 => "E6009",
            ErrorCode::E6010 => "E6010",
            ErrorCode::E6011 => "E6011",
            ErrorCode::E6012 => "E6012",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn is_compile_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_runtime_error(&self) -> bool {
        self.as_str().starts_with("E6")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
