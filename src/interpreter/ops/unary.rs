use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ErrorKind, HeapResultExt, RuntimeError};
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, BinOp, SourceLocation, UnOp};
use crate::terminal::Terminal;

impl<T: Terminal> Interpreter<T> {
    pub(crate) fn evaluate_unary(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            UnOp::PreInc => return self.increment(operand, 1, true, location),
            UnOp::PreDec => return self.increment(operand, -1, true, location),
            UnOp::AddrOf => return self.address_of(operand, location),
            _ => {}
        }

        let value = self.evaluate(operand)?;
        match op {
            UnOp::Neg => match value {
                Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                Value::Char(c) => Ok(Value::Int(-(c as i64))),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(Self::unary_error(op, &other, location)),
            },
            UnOp::Plus => match value {
                Value::Char(c) => Ok(Value::Int(c as i64)),
                Value::Int(_) | Value::Float(_) => Ok(value),
                other => Err(Self::unary_error(op, &other, location)),
            },
            UnOp::Not => Ok(Value::Int(!value.is_truthy() as i64)),
            UnOp::BitNot => match value {
                Value::Int(_) | Value::Char(_) => Ok(Value::Int(!value.as_int().unwrap_or(0))),
                other => Err(Self::unary_error(op, &other, location)),
            },
            UnOp::Deref => self.dereference(value, location),
            UnOp::PreInc | UnOp::PreDec | UnOp::AddrOf => unreachable!(),
        }
    }

    /// `*value`: heap pointers read through the heap, arrays and strings
    /// yield their first element
    pub(crate) fn dereference(
        &self,
        value: Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match value {
            Value::Array(items) => items.borrow().first().cloned().ok_or_else(|| {
                RuntimeError::new(ErrorKind::OutOfBounds, "dereference of an empty array", location)
            }),
            Value::Str(s) => Ok(Value::Char(s.bytes().next().unwrap_or(0))),
            other => match other.as_address() {
                Some(0) => Err(RuntimeError::new(
                    ErrorKind::InvalidAddress,
                    "null pointer dereference",
                    location,
                )),
                Some(addr) if other.is_integer_like() => self.heap.load(addr).at(location),
                _ => Err(RuntimeError::new(
                    ErrorKind::InvalidAddress,
                    format!("cannot dereference a {}", other.type_name()),
                    location,
                )),
            },
        }
    }

    /// `&operand`
    ///
    /// Only addresses the heap can honour are produced: `&p[i]` for a pointer
    /// `p` gives `p + i`, and `&*p` gives `p`. Arrays and pointers evaluate to
    /// themselves. Scalars have no address (outside of `scanf`).
    pub(crate) fn address_of(
        &mut self,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match operand {
            AstNode::ArrayAccess { base, index, .. } => {
                let base = self.evaluate(base)?;
                let index = self.evaluate(index)?;
                match base {
                    Value::Pointer(_) | Value::Int(_) => {
                        let offset = Self::index_of(&index, location)?;
                        self.binary_op(
                            BinOp::Add,
                            Self::as_pointer(&base),
                            Value::Int(offset),
                            location,
                        )
                    }
                    other => Err(RuntimeError::new(
                        ErrorKind::InvalidAddress,
                        format!("cannot take the address of an element of a {}", other.type_name()),
                        location,
                    )),
                }
            }

            AstNode::UnaryOp {
                op: UnOp::Deref,
                operand,
                ..
            } => {
                let value = self.evaluate(operand)?;
                Ok(Self::as_pointer(&value))
            }

            AstNode::Identifier(name, loc) => match self.lookup_variable(name, *loc)? {
                value @ (Value::Array(_)
                | Value::Matrix(_)
                | Value::Pointer(_)
                | Value::Str(_)) => Ok(value),
                _ => Err(RuntimeError::new(
                    ErrorKind::InvalidAddress,
                    format!("cannot take the address of scalar variable '{}'", name),
                    location,
                )),
            },

            _ => Err(RuntimeError::new(
                ErrorKind::InvalidAddress,
                "expression has no address",
                location,
            )),
        }
    }

    fn as_pointer(value: &Value) -> Value {
        match value {
            Value::Int(n) if *n >= 0 => Value::Pointer(*n as u64),
            other => other.clone(),
        }
    }

    fn unary_error(op: UnOp, value: &Value, location: SourceLocation) -> RuntimeError {
        let symbol = match op {
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::PreInc => "++",
            UnOp::PreDec => "--",
            UnOp::Deref => "*",
            UnOp::AddrOf => "&",
        };
        RuntimeError::type_mismatch(
            format!("unsupported operand for '{}': {}", symbol, value.type_name()),
            location,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::ErrorKind;
    use crate::memory::value::Value;
    use crate::Error;

    fn eval(source: &str) -> Value {
        Interpreter::new().interpret(source).unwrap().pop().unwrap()
    }

    fn runtime_error(source: &str) -> ErrorKind {
        match Interpreter::new().interpret(source) {
            Err(Error::Runtime(e)) => e.kind,
            other => panic!("Expected runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_unary() {
        assert_eq!(eval("-5;"), Value::Int(-5));
        assert_eq!(eval("-2.5;"), Value::Float(-2.5));
        assert_eq!(eval("!0;"), Value::Int(1));
        assert_eq!(eval("!7;"), Value::Int(0));
        assert_eq!(eval("~5;"), Value::Int(-6));
        assert_eq!(eval("+'a';"), Value::Int(97));
    }

    #[test]
    fn test_pointer_deref_and_address() {
        let src = "int *p = malloc(4); *(p + 2) = 7; int *q = &p[2]; *q;";
        assert_eq!(eval(src), Value::Int(7));
        assert_eq!(eval("int *p = malloc(2); &*p == p;"), Value::Int(1));
        assert_eq!(eval("int a[3] = {4, 5, 6}; *a;"), Value::Int(4));
    }

    #[test]
    fn test_invalid_address_cases() {
        assert_eq!(runtime_error("int x = 1; &x;"), ErrorKind::InvalidAddress);
        assert_eq!(runtime_error("int *p = 0; *p;"), ErrorKind::InvalidAddress);
        assert_eq!(runtime_error("*5.0;"), ErrorKind::InvalidAddress);
    }
}
