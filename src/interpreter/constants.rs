// Constants for the C interpreter

/// Starting address for heap allocations
pub const HEAP_ADDRESS_START: u64 = 0x1000;

/// Default bound on nested user function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Default bound on cells a single heap block or array may hold
pub const DEFAULT_MAX_HEAP_CELLS: usize = 1 << 24;

/// Value every `sizeof` expression folds to
pub const SIZEOF_VALUE: i64 = 4;

/// Remaining native stack below which a recursive walk moves to a new segment
pub const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each native stack segment added by a recursive walk
pub const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;
