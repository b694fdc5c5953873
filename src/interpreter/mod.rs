//! C interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: Main interpreter, statement dispatch and function calls
//! - [`statements`], [`loops`], [`expressions`]: evaluation of each node kind
//! - [`ops`]: operator semantics
//! - [`builtins`]: the C library subset (`printf`, `scanf`, `malloc`, ...)
//! - [`errors`]: Runtime error types
//! - [`config`]: Per-instance limits
//!
//! # Execution Model
//!
//! The interpreter walks the AST recursively. Statements produce a
//! [`ControlFlow`](engine::ControlFlow) that carries `break`, `continue` and
//! `return` up to the loop or call that consumes them; runtime errors travel
//! separately as `Err` and abort the run.

pub mod builtins;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod loops;
pub mod ops;
pub mod statements;
pub mod type_system;

pub use config::InterpreterConfig;
pub use engine::{ControlFlow, Interpreter};
pub use errors::{ErrorKind, RuntimeError};
