//! Heap implementation for the interpreter
//!
//! This module provides a simulated heap with:
//! - Explicit allocation/deallocation (malloc/free/realloc)
//! - First-fit reuse of freed ranges, splitting off the unused tail
//! - Coalescing of adjacent free ranges
//! - Use-after-free, double-free and bounds detection
//!
//! Memory is cell-addressed: a block of `size` holds `size` [`Value`] cells,
//! each starting as `Int(0)`. Addresses are opaque integers starting at
//! [`HEAP_ADDRESS_START`](crate::interpreter::constants::HEAP_ADDRESS_START).
//!
//! # Error Handling
//!
//! Methods return [`HeapError`], which the interpreter converts into a
//! `RuntimeError` carrying the source location of the faulting expression.

use super::value::{Address, Value};
use crate::interpreter::constants::{DEFAULT_MAX_HEAP_CELLS, HEAP_ADDRESS_START};
use rustc_hash::FxHashMap;
use std::fmt::Write as _;
use thiserror::Error;

/// Faults raised by heap operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error("Invalid size {0}")]
    InvalidSize(i64),
    #[error("Invalid address 0x{0:x}")]
    InvalidAddress(Address),
    #[error("Use after free at address 0x{0:x}")]
    UseAfterFree(Address),
    #[error("Double free detected at address 0x{0:x}")]
    DoubleFree(Address),
    #[error("Offset {offset} out of bounds for block 0x{address:x} of size {size}")]
    OutOfBounds {
        address: Address,
        offset: i64,
        size: usize,
    },
}

/// State of a heap block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Allocated,
    Freed,
}

/// A block of heap memory
#[derive(Debug, Clone)]
pub struct HeapBlock {
    pub size: usize,
    pub data: Vec<Value>,
    pub state: BlockState,
}

impl HeapBlock {
    pub fn new(size: usize) -> Self {
        HeapBlock {
            size,
            data: vec![Value::Int(0); size],
            state: BlockState::Allocated,
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.state == BlockState::Allocated
    }
}

/// Heap usage snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeapStats {
    /// Bytes in live blocks
    pub live_bytes: usize,
    /// Successful allocations over the heap's lifetime
    pub allocation_count: usize,
    pub live_blocks: usize,
    pub free_blocks: usize,
    pub free_bytes: usize,
}

/// The heap
#[derive(Debug, Clone)]
pub struct Heap {
    blocks: FxHashMap<Address, HeapBlock>,
    free_list: Vec<(Address, usize)>,
    next_address: Address,
    live_bytes: usize,
    allocation_count: usize,
    /// Ceiling on `live_bytes`
    max_cells: usize,
}

impl Heap {
    /// Create an empty heap whose first fresh block lands at `start`
    pub fn new(start: Address) -> Self {
        Heap {
            blocks: FxHashMap::default(),
            free_list: Vec::new(),
            next_address: start,
            live_bytes: 0,
            allocation_count: 0,
            max_cells: DEFAULT_MAX_HEAP_CELLS,
        }
    }

    /// Cap the cells that may be live at once
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    /// Allocate a zero-filled block of `size` cells
    ///
    /// Fails with `InvalidSize` unless `size` is positive and fits under the
    /// live-cell ceiling.
    pub fn allocate(&mut self, size: i64) -> Result<Address, HeapError> {
        let room = self.max_cells.saturating_sub(self.live_bytes);
        let size = match usize::try_from(size) {
            Ok(cells) if cells > 0 && cells <= room => cells,
            _ => return Err(HeapError::InvalidSize(size)),
        };

        let address = match self.take_free_range(size) {
            Some(address) => {
                // Freed records inside the reused range are stale now
                self.blocks.retain(|&base, block| {
                    block.is_allocated() || base < address || base >= address + size as Address
                });
                address
            }
            None => {
                let address = self.next_address;
                self.next_address += size as Address;
                address
            }
        };

        self.blocks.insert(address, HeapBlock::new(size));
        self.live_bytes += size;
        self.allocation_count += 1;
        Ok(address)
    }

    /// Free the block starting at `address`
    pub fn deallocate(&mut self, address: Address) -> Result<(), HeapError> {
        let block = self
            .blocks
            .get_mut(&address)
            .ok_or(HeapError::InvalidAddress(address))?;
        if !block.is_allocated() {
            return Err(HeapError::DoubleFree(address));
        }

        block.state = BlockState::Freed;
        self.live_bytes -= block.size;
        self.free_list.push((address, block.size));
        self.coalesce();
        Ok(())
    }

    /// Resize a block, moving its contents to a fresh one
    ///
    /// `new_size <= 0` frees `address` (unless null) and returns 0, and a null
    /// `address` behaves like [`allocate`](Self::allocate).
    pub fn reallocate(&mut self, address: Address, new_size: i64) -> Result<Address, HeapError> {
        if new_size <= 0 {
            if address != 0 {
                self.deallocate(address)?;
            }
            return Ok(0);
        }
        if address == 0 {
            return self.allocate(new_size);
        }

        let old = self.live_block(address)?.data.clone();
        let new_address = self.allocate(new_size)?;
        let copy = old.len().min(new_size as usize);
        if let Some(block) = self.blocks.get_mut(&new_address) {
            block.data[..copy].clone_from_slice(&old[..copy]);
        }
        self.deallocate(address)?;
        Ok(new_address)
    }

    /// Read cell `offset` of the block at `address`
    pub fn read(&self, address: Address, offset: i64) -> Result<Value, HeapError> {
        let block = self.live_block(address)?;
        let index = Self::check_offset(address, offset, block.size)?;
        Ok(block.data[index].clone())
    }

    /// Write cell `offset` of the block at `address`
    pub fn write(&mut self, address: Address, offset: i64, value: Value) -> Result<(), HeapError> {
        let block = self.live_block_mut(address)?;
        let index = Self::check_offset(address, offset, block.size)?;
        block.data[index] = value;
        Ok(())
    }

    /// Map a possibly interior address to `(block base, offset)`
    ///
    /// Live blocks win over freed records covering the same address.
    pub fn resolve(&self, address: Address) -> Result<(Address, i64), HeapError> {
        if self.blocks.contains_key(&address) {
            return Ok((address, 0));
        }

        let mut freed_hit = None;
        for (&base, block) in &self.blocks {
            if address >= base && address < base + block.size as Address {
                if block.is_allocated() {
                    return Ok((base, (address - base) as i64));
                }
                freed_hit = Some((base, (address - base) as i64));
            }
        }
        freed_hit.ok_or(HeapError::InvalidAddress(address))
    }

    /// Read through a possibly interior address
    pub fn load(&self, address: Address) -> Result<Value, HeapError> {
        let (base, offset) = self.resolve(address)?;
        self.read(base, offset)
    }

    /// Write through a possibly interior address
    pub fn store(&mut self, address: Address, value: Value) -> Result<(), HeapError> {
        let (base, offset) = self.resolve(address)?;
        self.write(base, offset, value)
    }

    /// Size of the block starting at `address`, live or freed
    pub fn block_size(&self, address: Address) -> Result<usize, HeapError> {
        self.blocks
            .get(&address)
            .map(|block| block.size)
            .ok_or(HeapError::InvalidAddress(address))
    }

    /// True when `address` starts a live block
    pub fn is_valid_address(&self, address: Address) -> bool {
        self.blocks
            .get(&address)
            .is_some_and(HeapBlock::is_allocated)
    }

    /// Free ranges, sorted by address
    pub fn free_list(&self) -> &[(Address, usize)] {
        &self.free_list
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            live_bytes: self.live_bytes,
            allocation_count: self.allocation_count,
            live_blocks: self.blocks.values().filter(|b| b.is_allocated()).count(),
            free_blocks: self.free_list.len(),
            free_bytes: self.free_list.iter().map(|&(_, size)| size).sum(),
        }
    }

    /// Text rendering of the heap for diagnostics
    pub fn debug_dump(&self) -> String {
        let stats = self.stats();
        let mut out = String::new();
        let _ = writeln!(out, "=== Heap ===");
        let _ = writeln!(out, "Live bytes: {}", stats.live_bytes);
        let _ = writeln!(out, "Allocations: {}", stats.allocation_count);
        let _ = writeln!(out, "Free ranges: {}", stats.free_blocks);

        let mut live: Vec<_> = self
            .blocks
            .iter()
            .filter(|(_, block)| block.is_allocated())
            .map(|(&addr, block)| (addr, block.size))
            .collect();
        live.sort_unstable();

        let _ = writeln!(out, "Allocated blocks:");
        for (addr, size) in live {
            let _ = writeln!(out, "  0x{:08x}: {} bytes", addr, size);
        }
        let _ = writeln!(out, "Free blocks:");
        for &(addr, size) in &self.free_list {
            let _ = writeln!(out, "  0x{:08x}: {} bytes", addr, size);
        }
        out
    }

    // ===== Internals =====

    fn live_block(&self, address: Address) -> Result<&HeapBlock, HeapError> {
        match self.blocks.get(&address) {
            Some(block) if block.is_allocated() => Ok(block),
            Some(_) => Err(HeapError::UseAfterFree(address)),
            None => Err(HeapError::InvalidAddress(address)),
        }
    }

    fn live_block_mut(&mut self, address: Address) -> Result<&mut HeapBlock, HeapError> {
        match self.blocks.get_mut(&address) {
            Some(block) if block.is_allocated() => Ok(block),
            Some(_) => Err(HeapError::UseAfterFree(address)),
            None => Err(HeapError::InvalidAddress(address)),
        }
    }

    fn check_offset(address: Address, offset: i64, size: usize) -> Result<usize, HeapError> {
        if offset < 0 || offset as usize >= size {
            return Err(HeapError::OutOfBounds {
                address,
                offset,
                size,
            });
        }
        Ok(offset as usize)
    }

    /// First-fit: take the first free range that is large enough
    fn take_free_range(&mut self, size: usize) -> Option<Address> {
        let index = self
            .free_list
            .iter()
            .position(|&(_, range_size)| range_size >= size)?;
        let (address, range_size) = self.free_list.remove(index);
        if range_size > size {
            self.free_list
                .push((address + size as Address, range_size - size));
            self.coalesce();
        }
        Some(address)
    }

    /// Sort by address and merge touching ranges until none are adjacent
    fn coalesce(&mut self) {
        self.free_list.sort_unstable_by_key(|&(addr, _)| addr);

        let mut merged: Vec<(Address, usize)> = Vec::with_capacity(self.free_list.len());
        for &(addr, size) in &self.free_list {
            match merged.last_mut() {
                Some((last_addr, last_size)) if *last_addr + *last_size as Address == addr => {
                    *last_size += size;
                }
                _ => merged.push((addr, size)),
            }
        }
        self.free_list = merged;
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(HEAP_ADDRESS_START)
    }
}
