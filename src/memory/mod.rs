//! Memory model for the C interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (Int, Float, Char, Str, Array, Matrix, Pointer)
//! - [`scope`]: Scope chain of name → value frames
//! - [`heap`]: Simulated heap with first-fit allocation and coalescing
//!
//! # Addressing
//!
//! Heap memory is cell-addressed rather than byte-addressed: `malloc(n)`
//! returns a block of `n` cells, and `p + k` names the `k`-th cell after `p`
//! regardless of the pointee type.

pub mod heap;
pub mod scope;
pub mod value;

pub use heap::{Heap, HeapError, HeapStats};
pub use scope::ScopeChain;
pub use value::{Address, ArrayRef, Matrix, MatrixRef, Value};
