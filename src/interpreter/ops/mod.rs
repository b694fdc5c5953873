//! Operator semantics, as `impl Interpreter` blocks
//!
//! - [`binary`]: arithmetic with the Int/Float/Pointer coercion table,
//!   comparisons and bitwise operators
//! - [`unary`]: negation, logical/bitwise not, dereference and address-of
//! - [`assign`]: lvalue resolution, assignment and `++`/`--`
//! - [`access`]: subscripting arrays, matrices, strings and pointers

pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;
