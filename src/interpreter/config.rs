// Runtime limits and layout knobs for an interpreter instance

use crate::interpreter::constants::{
    DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_HEAP_CELLS, HEAP_ADDRESS_START,
};
use crate::memory::value::Address;

/// Interpreter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Nested user function calls allowed before `StackOverflow`
    pub max_call_depth: usize,
    /// Address handed out by the first `malloc`
    pub heap_start: Address,
    /// Cells the heap may hold live at once, and the largest array a
    /// declaration may create
    pub max_heap_cells: usize,
}

impl InterpreterConfig {
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_heap_start(mut self, start: Address) -> Self {
        self.heap_start = start;
        self
    }

    pub fn with_max_heap_cells(mut self, cells: usize) -> Self {
        self.max_heap_cells = cells;
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            heap_start: HEAP_ADDRESS_START,
            max_heap_cells: DEFAULT_MAX_HEAP_CELLS,
        }
    }
}
