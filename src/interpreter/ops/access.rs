use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ErrorKind, HeapResultExt, RuntimeError};
use crate::memory::value::{Matrix, Value};
use crate::parser::ast::SourceLocation;
use crate::terminal::Terminal;

impl<T: Terminal> Interpreter<T> {
    /// Integer value of a subscript
    pub(crate) fn index_of(index: &Value, location: SourceLocation) -> Result<i64, RuntimeError> {
        match index {
            Value::Int(n) => Ok(*n),
            Value::Char(c) => Ok(*c as i64),
            other => Err(RuntimeError::type_mismatch(
                format!("array index must be an integer, got {}", other.type_name()),
                location,
            )),
        }
    }

    /// `base[index]` as an rvalue
    ///
    /// Indexing a matrix yields a copy of the row; writes go through
    /// [`resolve_place`](Self::resolve_place) instead.
    pub(crate) fn index_value(
        &self,
        base: &Value,
        index: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let i = Self::index_of(index, location)?;

        match base {
            Value::Array(items) => {
                let items = items.borrow();
                Self::checked_index(i, items.len(), location).map(|i| items[i].clone())
            }

            Value::Matrix(m) => {
                let m = m.borrow();
                let row = Self::checked_index(i, m.rows, location)?;
                Ok(Value::new_array(m.row(row).unwrap_or_default()))
            }

            Value::Str(s) => {
                // The terminator is readable
                let bytes = s.as_bytes();
                let i = Self::checked_index(i, bytes.len() + 1, location)?;
                Ok(Value::Char(bytes.get(i).copied().unwrap_or(0)))
            }

            Value::Pointer(_) | Value::Int(_) => {
                let addr = base.as_address().unwrap_or(0);
                if addr == 0 {
                    return Err(RuntimeError::new(
                        ErrorKind::InvalidAddress,
                        "indexing a null pointer",
                        location,
                    ));
                }
                let target = addr.checked_add_signed(i).ok_or_else(|| {
                    RuntimeError::new(
                        ErrorKind::InvalidAddress,
                        format!("index {} from 0x{:x} is out of range", i, addr),
                        location,
                    )
                })?;
                self.heap.load(target).at(location)
            }

            other => Err(RuntimeError::new(
                ErrorKind::InvalidIndexTarget,
                format!("cannot index a {}", other.type_name()),
                location,
            )),
        }
    }

    /// Flat index of `m[row][col]`
    pub(crate) fn matrix_cell(
        matrix: &Matrix,
        row: i64,
        col: i64,
        location: SourceLocation,
    ) -> Result<usize, RuntimeError> {
        usize::try_from(row)
            .ok()
            .zip(usize::try_from(col).ok())
            .and_then(|(row, col)| matrix.index_of(row, col))
            .ok_or_else(|| {
                RuntimeError::new(
                    ErrorKind::OutOfBounds,
                    format!(
                        "index [{}][{}] out of bounds for a {}x{} matrix",
                        row, col, matrix.rows, matrix.cols
                    ),
                    location,
                )
            })
    }

    pub(crate) fn checked_index(
        index: i64,
        len: usize,
        location: SourceLocation,
    ) -> Result<usize, RuntimeError> {
        if index < 0 || index as usize >= len {
            return Err(RuntimeError::new(
                ErrorKind::OutOfBounds,
                format!("index {} out of bounds for length {}", index, len),
                location,
            ));
        }
        Ok(index as usize)
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
    fn test_array_and_matrix_reads() {
        assert_eq!(eval("int a[3] = {1, 2, 3}; a[2];"), Ok(Value::Int(3)));
        assert_eq!(eval("int m[2][2] = {1, 2, 3, 4}; m[1][0];"), Ok(Value::Int(3)));
        assert_eq!(eval("\"abc\"[1];"), Ok(Value::Char(b'b')));
        assert_eq!(eval("char *s = \"abc\"; s[3];"), Ok(Value::Char(0)));
    }

    #[test]
    fn test_bad_subscripts() {
        assert_eq!(eval("int a[3]; a[3];"), Err(ErrorKind::OutOfBounds));
        assert_eq!(eval("int a[3]; a[-1];"), Err(ErrorKind::OutOfBounds));
        assert_eq!(eval("double d = 1.0; d[0];"), Err(ErrorKind::InvalidIndexTarget));
        assert_eq!(eval("int a[3]; a[1.5];"), Err(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_pointer_indexing_reads_heap() {
        let src = "int *p = malloc(3); p[1] = 8; int *q = p + 1; q[0] + p[1];";
        assert_eq!(eval(src), Ok(Value::Int(16)));
        assert_eq!(eval("int *p = malloc(3); p[3];"), Err(ErrorKind::InvalidAddress));
    }
}
