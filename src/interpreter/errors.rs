//! Runtime error types for the C interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to lex or parse errors).
//!
//! All runtime errors are fatal: loops and function calls never catch them, so
//! the first one aborts the run and is reported with its source location.

use crate::memory::heap::HeapError;
use crate::parser::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// Category of a runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UndefinedVariable,
    UndefinedFunction,
    DivisionByZero,
    InvalidIndexTarget,
    InvalidAssignmentTarget,
    InvalidAddress,
    UseAfterFree,
    DoubleFree,
    OutOfBounds,
    InvalidSize,
    StackOverflow,
    TypeMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UndefinedVariable => "Undefined variable",
            ErrorKind::UndefinedFunction => "Undefined function",
            ErrorKind::DivisionByZero => "Division by zero",
            ErrorKind::InvalidIndexTarget => "Invalid index target",
            ErrorKind::InvalidAssignmentTarget => "Invalid assignment target",
            ErrorKind::InvalidAddress => "Invalid address",
            ErrorKind::UseAfterFree => "Use after free",
            ErrorKind::DoubleFree => "Double free",
            ErrorKind::OutOfBounds => "Out of bounds",
            ErrorKind::InvalidSize => "Invalid size",
            ErrorKind::StackOverflow => "Stack overflow",
            ErrorKind::TypeMismatch => "Type mismatch",
        };
        f.write_str(name)
    }
}

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at line {}: {message}", location.line)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn undefined_variable(name: &str, location: SourceLocation) -> Self {
        Self::new(
            ErrorKind::UndefinedVariable,
            format!("'{}' is not defined", name),
            location,
        )
    }

    pub fn undefined_function(name: &str, location: SourceLocation) -> Self {
        Self::new(
            ErrorKind::UndefinedFunction,
            format!("'{}' is not defined", name),
            location,
        )
    }

    pub fn type_mismatch(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::TypeMismatch, message, location)
    }

    /// Attach a source location to a heap fault
    pub fn from_heap(err: HeapError, location: SourceLocation) -> Self {
        let kind = match err {
            HeapError::InvalidSize(_) => ErrorKind::InvalidSize,
            HeapError::InvalidAddress(_) => ErrorKind::InvalidAddress,
            HeapError::UseAfterFree(_) => ErrorKind::UseAfterFree,
            HeapError::DoubleFree(_) => ErrorKind::DoubleFree,
            HeapError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
        };
        Self::new(kind, err.to_string(), location)
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }
}

/// Extension for attaching locations to heap results
pub(crate) trait HeapResultExt<T> {
    fn at(self, location: SourceLocation) -> Result<T, RuntimeError>;
}

impl<T> HeapResultExt<T> for Result<T, HeapError> {
    fn at(self, location: SourceLocation) -> Result<T, RuntimeError> {
        self.map_err(|err| RuntimeError::from_heap(err, location))
    }
}
