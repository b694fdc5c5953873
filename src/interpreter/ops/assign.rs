//! Assignment and lvalue resolution
//!
//! Every write goes through a [`Place`]:
//!
//! - Variables: written in the top scope frame (reads search the whole chain)
//! - Array elements and matrix cells: written in place, visible through
//!   every alias of the shared storage
//! - Heap cells: written through the heap, resolving interior pointers

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ErrorKind, HeapResultExt, RuntimeError};
use crate::memory::value::{Address, ArrayRef, MatrixRef, Value};
use crate::parser::ast::{AssignOp, AstNode, BinOp, SourceLocation, UnOp};
use crate::terminal::Terminal;

/// A resolved assignable location
#[derive(Debug, Clone)]
pub(crate) enum Place {
    Variable(String),
    ArrayElement(ArrayRef, usize),
    /// Flat row-major index
    MatrixCell(MatrixRef, usize),
    HeapCell(Address),
}

impl<T: Terminal> Interpreter<T> {
    pub(crate) fn evaluate_assignment(
        &mut self,
        target: &AstNode,
        op: AssignOp,
        value: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(target, location)?;
        let current = match op {
            AssignOp::Assign => self.peek_place(&place),
            _ => Some(self.read_place(&place, location)?),
        };
        let rhs = self.evaluate(value)?;

        let new_value = match (op.binary_op(), &current) {
            (Some(bin_op), Some(current)) => {
                self.binary_op(bin_op, current.clone(), rhs, location)?
            }
            _ => rhs,
        };
        let stored = Self::coerce_like(current.as_ref(), new_value);

        self.write_place(&place, stored.clone(), location)?;
        Ok(stored)
    }

    /// `++`/`--` on any place; yields the new value for prefix forms and the
    /// old one for postfix forms
    pub(crate) fn increment(
        &mut self,
        operand: &AstNode,
        delta: i64,
        prefix: bool,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(operand, location)?;
        let old = self.read_place(&place, location)?;
        let new = self.binary_op(BinOp::Add, old.clone(), Value::Int(delta), location)?;
        let new = Self::coerce_like(Some(&old), new);
        self.write_place(&place, new.clone(), location)?;
        Ok(if prefix { new } else { old })
    }

    /// Turn an lvalue expression into a [`Place`]
    pub(crate) fn resolve_place(
        &mut self,
        target: &AstNode,
        location: SourceLocation,
    ) -> Result<Place, RuntimeError> {
        match target {
            AstNode::Identifier(name, _) => Ok(Place::Variable(name.clone())),

            AstNode::ArrayAccess { base, index, .. } => {
                // `m[i][j]` on a matrix addresses the cell, not the row copy
                if let AstNode::ArrayAccess {
                    base: inner,
                    index: row,
                    ..
                } = base.as_ref()
                {
                    let container = self.evaluate(inner)?;
                    if let Value::Matrix(m) = container {
                        let row = Self::index_of(&self.evaluate(row)?, location)?;
                        let col = Self::index_of(&self.evaluate(index)?, location)?;
                        let flat = Self::matrix_cell(&m.borrow(), row, col, location)?;
                        return Ok(Place::MatrixCell(m, flat));
                    }
                    let row = self.evaluate(row)?;
                    let base_value = self.index_value(&container, &row, location)?;
                    return self.element_place(base_value, index, location);
                }

                let base_value = self.evaluate(base)?;
                self.element_place(base_value, index, location)
            }

            AstNode::UnaryOp {
                op: UnOp::Deref,
                operand,
                ..
            } => match self.evaluate(operand)? {
                Value::Array(items) => Ok(Place::ArrayElement(items, 0)),
                value => match value.as_address() {
                    Some(addr) if addr != 0 && value.is_integer_like() => Ok(Place::HeapCell(addr)),
                    _ => Err(RuntimeError::new(
                        ErrorKind::InvalidAddress,
                        format!("cannot write through a {} ({})", value.type_name(), value),
                        location,
                    )),
                },
            },

            _ => Err(RuntimeError::new(
                ErrorKind::InvalidAssignmentTarget,
                "expression is not assignable",
                location,
            )),
        }
    }

    fn element_place(
        &mut self,
        base: Value,
        index: &AstNode,
        location: SourceLocation,
    ) -> Result<Place, RuntimeError> {
        let i = Self::index_of(&self.evaluate(index)?, location)?;
        match base {
            Value::Array(items) => {
                let len = items.borrow().len();
                let i = Self::checked_index(i, len, location)?;
                Ok(Place::ArrayElement(items, i))
            }
            Value::Pointer(addr) if addr != 0 => addr
                .checked_add_signed(i)
                .map(Place::HeapCell)
                .ok_or_else(|| {
                    RuntimeError::new(
                        ErrorKind::InvalidAddress,
                        format!("index {} from 0x{:x} is out of range", i, addr),
                        location,
                    )
                }),
            Value::Int(n) if n > 0 => Ok(Place::HeapCell((n as Address).wrapping_add_signed(i))),
            Value::Str(_) => Err(RuntimeError::new(
                ErrorKind::InvalidAssignmentTarget,
                "string literals are read-only",
                location,
            )),
            Value::Pointer(_) | Value::Int(_) => Err(RuntimeError::new(
                ErrorKind::InvalidAddress,
                "indexing a null pointer",
                location,
            )),
            other => Err(RuntimeError::new(
                ErrorKind::InvalidIndexTarget,
                format!("cannot index a {}", other.type_name()),
                location,
            )),
        }
    }

    pub(crate) fn read_place(
        &self,
        place: &Place,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match place {
            Place::Variable(name) => self.lookup_variable(name, location),
            Place::ArrayElement(items, i) => Ok(items.borrow()[*i].clone()),
            Place::MatrixCell(m, i) => Ok(m.borrow().data[*i].clone()),
            Place::HeapCell(addr) => self.heap.load(*addr).at(location),
        }
    }

    /// Current value if the place can be read, used to pick a representation
    pub(crate) fn peek_place(&self, place: &Place) -> Option<Value> {
        match place {
            Place::Variable(name) => self.scopes.get(name).cloned(),
            Place::ArrayElement(items, i) => items.borrow().get(*i).cloned(),
            Place::MatrixCell(m, i) => m.borrow().data.get(*i).cloned(),
            Place::HeapCell(addr) => self.heap.load(*addr).ok(),
        }
    }

    pub(crate) fn write_place(
        &mut self,
        place: &Place,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match place {
            Place::Variable(name) => {
                self.scopes.set(name, value);
                Ok(())
            }
            Place::ArrayElement(items, i) => {
                items.borrow_mut()[*i] = value;
                Ok(())
            }
            Place::MatrixCell(m, i) => {
                m.borrow_mut().data[*i] = value;
                Ok(())
            }
            Place::HeapCell(addr) => self.heap.store(*addr, value).at(location),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::ErrorKind;
    use crate::memory::value::Value;
    use crate::Error;

    fn eval(source: &str) -> Result<Value, ErrorKind> {
        match Interpreter::new().interpret(source) {
            Ok(mut results) => Ok(results.pop().unwrap_or_default()),
            Err(Error::Runtime(e)) => Err(e.kind),
            Err(other) => panic!("Expected runtime result, got {:?}", other),
        }
    }

    #[test]
    fn test_compound_assignment() {
        assert_eq!(eval("int x = 10; x += 5; x *= 2; x -= 1; x /= 3; x %= 4;"), Ok(Value::Int(1)));
        assert_eq!(eval("double d = 1.0; d += 2;"), Ok(Value::Float(3.0)));
    }

    #[test]
    fn test_assignment_keeps_int_type() {
        assert_eq!(eval("int x = 1; x = 7.8; x;"), Ok(Value::Int(7)));
    }

    #[test]
    fn test_increments() {
        assert_eq!(eval("int i = 5; i++;"), Ok(Value::Int(5)));
        assert_eq!(eval("int i = 5; ++i;"), Ok(Value::Int(6)));
        assert_eq!(eval("int i = 5; i--; i;"), Ok(Value::Int(4)));
        assert_eq!(eval("char c = 'a'; ++c;"), Ok(Value::Char(b'b')));
        assert_eq!(eval("int a[2] = {1, 1}; a[1]++; a[1];"), Ok(Value::Int(2)));
    }

    #[test]
    fn test_matrix_cell_writes() {
        assert_eq!(eval("int m[2][3]; m[1][2] = 9; m[1][2] + m[0][0];"), Ok(Value::Int(9)));
        assert_eq!(eval("int m[2][3]; m[2][0] = 1;"), Err(ErrorKind::OutOfBounds));
        assert_eq!(eval("int m[2][3]; m[0][3] = 1;"), Err(ErrorKind::OutOfBounds));
        assert_eq!(eval("int m[2][3]; m[-1][0] += 1;"), Err(ErrorKind::OutOfBounds));
    }

    #[test]
    fn test_arrays_are_shared() {
        let src = r#"
            void fill(int arr[], int n) {
                for (int i = 0; i < n; i++) arr[i] = i * 10;
            }
            int a[3];
            fill(a, 3);
            a[2];
        "#;
        assert_eq!(eval(src), Ok(Value::Int(20)));
    }

    #[test]
    fn test_heap_writes() {
        assert_eq!(eval("int *p = malloc(2); *p = 3; p[1] = 4; *p * p[1];"), Ok(Value::Int(12)));
        assert_eq!(eval("int *p = 0; *p = 1;"), Err(ErrorKind::InvalidAddress));
    }

    #[test]
    fn test_invalid_targets() {
        assert_eq!(eval("1 = 2;"), Err(ErrorKind::InvalidAssignmentTarget));
        assert_eq!(eval("char *s = \"ab\"; s[0] = 'x';"), Err(ErrorKind::InvalidAssignmentTarget));
    }
}
