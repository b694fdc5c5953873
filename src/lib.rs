//! # Introduction
//!
//! Ouroboros parses and executes a subset of C by walking its syntax tree.
//! Memory is simulated: variables live in a chain of scope frames and
//! `malloc`/`free` operate on a cell-addressed heap that detects
//! use-after-free, double free and out-of-bounds access.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter → Terminal
//!                                      ↕
//!                              ScopeChain + Heap
//! ```
//!
//! 1. [`parser`] — tokenises the source and builds an AST.
//! 2. [`interpreter`] — walks the AST; statements yield a
//!    [`ControlFlow`](interpreter::ControlFlow), expressions a value.
//! 3. [`memory`] — tagged [`Value`]s, the [`memory::ScopeChain`] and the
//!    [`memory::Heap`].
//! 4. [`terminal`] — the console seam used by `printf`, `puts`, `gets` and
//!    `scanf`, with a capturing [`MockTerminal`] for tests.
//!
//! ## Supported C subset
//!
//! Types: `int`, `float`, `double`, `char`, `void`, pointers, 1-D and 2-D
//! arrays. Control flow: `if/else`, `while`, `for`, `break`, `continue`,
//! `return`. Built-ins: `printf`, `puts`, `gets`, `scanf`, `strlen`,
//! `strcpy`, `strcmp`, `malloc`, `free`, `realloc`, `sizeof`.
//!
//! ```
//! use ouroboros::{Interpreter, Value};
//!
//! let mut interp = Interpreter::new();
//! let results = interp
//!     .interpret("int square(int x) { return x * x; } int main() { return square(7); }")
//!     .unwrap();
//! assert_eq!(results, vec![Value::Int(49)]);
//! ```

pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod terminal;

pub use interpreter::{ControlFlow, ErrorKind, Interpreter, InterpreterConfig, RuntimeError};
pub use memory::value::Value;
pub use parser::lexer::LexError;
pub use parser::ParseError;
pub use terminal::{MockTerminal, StdTerminal, Terminal};

use thiserror::Error;

/// Any failure from lexing, parsing or running a program
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// Line the error points at
    pub fn line(&self) -> usize {
        match self {
            Error::Lex(e) => e.location.line,
            Error::Parse(e) => e.location.line,
            Error::Runtime(e) => e.location.line,
        }
    }
}
