//! Output sink for the `println` native.
//!
//! The interpreter never writes to stdout directly. It goes through a
//! [`SharedPrintHandler`] chosen at build time:
//! - [`stdout_handler`]: the process's stdout (default)
//! - [`buffer_handler`]: an in-memory buffer, read back with [`PrintHandler::output`]
//! - [`silent_handler`]: discards everything

use parking_lot::Mutex;
use std::sync::Arc;

/// Where printed text goes.
pub enum PrintHandler {
    Stdout,
    Buffer(Mutex<String>),
    Silent,
}

impl PrintHandler {
    /// Print `msg` followed by a newline.
    pub fn println(&self, msg: &str) {
        match self {
            PrintHandler::Stdout => println!("{msg}"),
            PrintHandler::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(msg);
                buffer.push('\n');
            }
            PrintHandler::Silent => {}
        }
    }

    pub fn print(&self, msg: &str) {
        match self {
            PrintHandler::Stdout => print!("{msg}"),
            PrintHandler::Buffer(buffer) => buffer.lock().push_str(msg),
            PrintHandler::Silent => {}
        }
    }

    /// Everything captured so far. Empty unless this is a buffer.
    pub fn output(&self) -> String {
        match self {
            PrintHandler::Buffer(buffer) => buffer.lock().clone(),
            PrintHandler::Stdout | PrintHandler::Silent => String::new(),
        }
    }

    /// Drop captured output.
    pub fn clear(&self) {
        if let PrintHandler::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

/// Print handler shared between the interpreter and its natives.
pub type SharedPrintHandler = Arc<PrintHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(Mutex::new(String::new())))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}
