//! C source code parser
//!
//! This module transforms C source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser struct, helpers and the [`parse`](parse::parse) entry point
//! - `declarations`, `statements`, `expressions`: `impl Parser` blocks per grammar area
//! - [`ast`]: AST node definitions
//!
//! # Supported C Subset
//!
//! - Types: `int`, `float`, `double`, `char`, `void`, pointers, 1-D and 2-D arrays
//! - Statements: declarations, assignments, `if`, `while`, `for`, `return`,
//!   `break`, `continue`, blocks
//! - Expressions: arithmetic, logical, bitwise, shifts, casts, `sizeof`, calls
//! - Preprocessor lines are kept as directive nodes, never expanded
//! - No structs, unions, typedefs, enums, `switch` or function pointers
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one method per precedence tier.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{parse, ParseError, Parser};
