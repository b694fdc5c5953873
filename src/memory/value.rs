//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime values
//! in the C interpreter. Unlike C's raw memory model, values are tagged and type-safe.
//!
//! # Value Types
//!
//! - [`Value::Int`]: signed integer, also used for C truth values
//! - [`Value::Float`]: `float` and `double` share one representation
//! - [`Value::Char`]: unsigned byte
//! - [`Value::Str`]: string literal value
//! - [`Value::Array`]: shared, interior-mutable element vector
//! - [`Value::Matrix`]: shared row-major 2-D array
//! - [`Value::Pointer`]: heap address
//! - [`Value::Void`]: result of statements and `void` expressions
//!
//! # Sharing
//!
//! Arrays and matrices are reference values. Cloning a [`Value::Array`] aliases
//! the same storage, so passing an array to a function lets the callee write
//! through to the caller's elements.

use crate::parser::ast::BaseType;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Memory address type (64-bit)
pub type Address = u64;

/// Shared storage of a 1-D array
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Shared storage of a 2-D array
pub type MatrixRef = Rc<RefCell<Matrix>>;

/// Row-major 2-D array
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Value>,
}

impl Matrix {
    /// Build a `rows × cols` matrix, filling from `values` then `fill`;
    /// `None` when the cell count overflows
    pub fn new(rows: usize, cols: usize, values: Vec<Value>, fill: Value) -> Option<Self> {
        let mut data = values;
        data.resize(rows.checked_mul(cols)?, fill);
        Some(Matrix { rows, cols, data })
    }

    /// Flat index of `(row, col)`, if in range
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }

    /// Copy of one row
    pub fn row(&self, row: usize) -> Option<Vec<Value>> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(self.data[start..start + self.cols].to_vec())
    }
}

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Int(i64),
    Float(f64),
    Char(u8),
    Str(String),
    Array(ArrayRef),
    Matrix(MatrixRef),
    Pointer(Address),
    #[default]
    Void,
}

impl Value {
    /// Wrap a vector as a fresh shared array
    pub fn new_array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Wrap a matrix as a fresh shared value
    pub fn new_matrix(matrix: Matrix) -> Value {
        Value::Matrix(Rc::new(RefCell::new(matrix)))
    }

    /// NUL-terminated char array holding the bytes of `s`
    pub fn char_array(s: &str) -> Value {
        let mut chars: Vec<Value> = s.bytes().map(Value::Char).collect();
        chars.push(Value::Char(0));
        Value::new_array(chars)
    }

    /// Zero value of a scalar C type
    pub fn zero_of(base: BaseType, pointer_level: usize) -> Value {
        if pointer_level > 0 {
            return Value::Pointer(0);
        }
        match base {
            BaseType::Int => Value::Int(0),
            BaseType::Float | BaseType::Double => Value::Float(0.0),
            BaseType::Char => Value::Char(0),
            BaseType::Void => Value::Void,
        }
    }

    /// C truthiness: non-zero numbers, non-null pointers, non-empty strings and arrays
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Char(c) => *c != 0,
            Value::Pointer(addr) => *addr != 0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(items) => !items.borrow().is_empty(),
            Value::Matrix(m) => !m.borrow().data.is_empty(),
            Value::Void => false,
        }
    }

    /// Integer view of integer-like values (Int, Char, Pointer); floats truncate
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Char(c) => Some(*c as i64),
            Value::Pointer(addr) => Some(*addr as i64),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Floating view of numeric values
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            Value::Char(c) => Some(*c as f64),
            _ => None,
        }
    }

    /// Address view, for values used as pointers
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Pointer(addr) => Some(*addr),
            Value::Int(n) if *n >= 0 => Some(*n as Address),
            Value::Char(c) => Some(*c as Address),
            _ => None,
        }
    }

    /// True for Int, Char and Pointer
    pub fn is_integer_like(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Char(_) | Value::Pointer(_))
    }

    /// Read a C string out of a string value or a NUL-terminated char array
    pub fn as_c_string(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Array(items) => {
                let bytes: Vec<u8> = items
                    .borrow()
                    .iter()
                    .map_while(|v| match v.as_int() {
                        Some(0) | None => None,
                        Some(n) => Some(n as u8),
                    })
                    .collect();
                Some(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => None,
        }
    }

    /// Human-readable tag name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Matrix(_) => "matrix",
            Value::Pointer(_) => "pointer",
            Value::Void => "void",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", *c as char),
            Value::Str(s) => write!(f, "{}", s),
            Value::Pointer(addr) => write!(f, "0x{:x}", addr),
            Value::Void => write!(f, "void"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Matrix(m) => {
                let m = m.borrow();
                write!(f, "[")?;
                for row in 0..m.rows {
                    if row > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[")?;
                    for col in 0..m.cols {
                        if col > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", m.data[row * m.cols + col])?;
                    }
                    write!(f, "]")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Pointer(0).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::new_array(vec![]).is_truthy());
        assert!(!Value::Void.is_truthy());
    }

    #[test]
    fn test_arrays_alias_on_clone() {
        let a = Value::new_array(vec![Value::Int(1), Value::Int(2)]);
        let b = a.clone();
        if let Value::Array(items) = &b {
            items.borrow_mut()[0] = Value::Int(9);
        }
        assert_eq!(a.to_string(), "[9, 2]");
    }

    #[test]
    fn test_char_array_round_trip() {
        let v = Value::char_array("Hi");
        match &v {
            Value::Array(items) => assert_eq!(items.borrow().len(), 3),
            other => panic!("Expected array, got {:?}", other),
        }
        assert_eq!(v.as_c_string().as_deref(), Some("Hi"));
    }

    #[test]
    fn test_matrix_layout() {
        let m = Matrix::new(2, 3, vec![Value::Int(1), Value::Int(2)], Value::Int(0)).unwrap();
        assert_eq!(m.data.len(), 6);
        assert_eq!(m.index_of(1, 2), Some(5));
        assert_eq!(m.index_of(2, 0), None);
        assert_eq!(m.row(0), Some(vec![Value::Int(1), Value::Int(2), Value::Int(0)]));
        assert_eq!(Value::new_matrix(m).to_string(), "[[1, 2, 0], [0, 0, 0]]");
        assert!(Matrix::new(usize::MAX, 2, Vec::new(), Value::Int(0)).is_none());
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(Value::zero_of(BaseType::Int, 0), Value::Int(0));
        assert_eq!(Value::zero_of(BaseType::Double, 0), Value::Float(0.0));
        assert_eq!(Value::zero_of(BaseType::Char, 0), Value::Char(0));
        assert_eq!(Value::zero_of(BaseType::Char, 1), Value::Pointer(0));
        assert_eq!(Value::zero_of(BaseType::Void, 0), Value::Void);
    }
}
