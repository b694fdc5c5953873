use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ErrorKind, RuntimeError};
use crate::memory::value::{Address, Value};
use crate::parser::ast::{BinOp, SourceLocation};
use crate::terminal::Terminal;
use std::cmp::Ordering;

impl<T: Terminal> Interpreter<T> {
    /// Apply a (non short-circuit) binary operator to two evaluated operands
    pub(crate) fn binary_op(
        &self,
        op: BinOp,
        left: Value,
        right: Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                Self::arithmetic(op, &left, &right, location)
            }
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                Self::comparison(op, &left, &right, location)
            }
            BinOp::And => Ok(Value::Int((left.is_truthy() && right.is_truthy()) as i64)),
            BinOp::Or => Ok(Value::Int((left.is_truthy() || right.is_truthy()) as i64)),
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor | BinOp::Shl | BinOp::Shr => {
                Self::bitwise(op, &left, &right, location)
            }
        }
    }

    fn arithmetic(
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match (left, right) {
            // Pointer arithmetic is in cells
            (Value::Pointer(addr), Value::Pointer(other)) if op == BinOp::Sub => {
                Ok(Value::Int(*addr as i64 - *other as i64))
            }
            (Value::Pointer(addr), Value::Int(_) | Value::Char(_))
                if matches!(op, BinOp::Add | BinOp::Sub) =>
            {
                let offset = right.as_int().unwrap_or(0);
                let offset = if op == BinOp::Sub { -offset } else { offset };
                Self::offset_pointer(*addr, offset, location)
            }
            (Value::Int(_) | Value::Char(_), Value::Pointer(addr)) if op == BinOp::Add => {
                Self::offset_pointer(*addr, left.as_int().unwrap_or(0), location)
            }
            (Value::Pointer(_), _) | (_, Value::Pointer(_)) => {
                Err(Self::operand_error(op, left, right, location))
            }

            (Value::Int(_) | Value::Char(_), Value::Int(_) | Value::Char(_)) => {
                let (a, b) = (left.as_int().unwrap_or(0), right.as_int().unwrap_or(0));
                Self::integer_arithmetic(op, a, b, location).map(Value::Int)
            }

            _ => match (left.as_float(), right.as_float()) {
                (Some(a), Some(b)) => Self::float_arithmetic(op, a, b, location).map(Value::Float),
                _ => Err(Self::operand_error(op, left, right, location)),
            },
        }
    }

    /// Integer arithmetic: division truncates toward zero, `%` takes the
    /// sign of the dividend
    fn integer_arithmetic(
        op: BinOp,
        a: i64,
        b: i64,
        location: SourceLocation,
    ) -> Result<i64, RuntimeError> {
        match op {
            BinOp::Add => Ok(a.wrapping_add(b)),
            BinOp::Sub => Ok(a.wrapping_sub(b)),
            BinOp::Mul => Ok(a.wrapping_mul(b)),
            BinOp::Div | BinOp::Mod if b == 0 => Err(Self::division_by_zero(op, location)),
            BinOp::Div => Ok(a.wrapping_div(b)),
            BinOp::Mod => Ok(a.wrapping_rem(b)),
            _ => unreachable!("integer_arithmetic called with {:?}", op),
        }
    }

    fn float_arithmetic(
        op: BinOp,
        a: f64,
        b: f64,
        location: SourceLocation,
    ) -> Result<f64, RuntimeError> {
        match op {
            BinOp::Add => Ok(a + b),
            BinOp::Sub => Ok(a - b),
            BinOp::Mul => Ok(a * b),
            BinOp::Div | BinOp::Mod if b == 0.0 => Err(Self::division_by_zero(op, location)),
            BinOp::Div => Ok(a / b),
            BinOp::Mod => Ok(a % b),
            _ => unreachable!("float_arithmetic called with {:?}", op),
        }
    }

    fn comparison(
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let ordering = match (left, right) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                match (left.as_float(), right.as_float()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => return Err(Self::operand_error(op, left, right, location)),
                }
            }
            (a, b) if a.is_integer_like() && b.is_integer_like() => {
                Some(a.as_int().cmp(&b.as_int()))
            }
            // Aggregates only support identity checks
            (a, b) if matches!(op, BinOp::Eq | BinOp::Ne) => {
                let same = a == b;
                return Ok(Value::Int((same == (op == BinOp::Eq)) as i64));
            }
            _ => return Err(Self::operand_error(op, left, right, location)),
        };

        // NaN compares false for everything but `!=`
        let result = match ordering {
            None => op == BinOp::Ne,
            Some(ordering) => match op {
                BinOp::Eq => ordering == Ordering::Equal,
                BinOp::Ne => ordering != Ordering::Equal,
                BinOp::Lt => ordering == Ordering::Less,
                BinOp::Le => ordering != Ordering::Greater,
                BinOp::Gt => ordering == Ordering::Greater,
                BinOp::Ge => ordering != Ordering::Less,
                _ => unreachable!("comparison called with {:?}", op),
            },
        };
        Ok(Value::Int(result as i64))
    }

    fn bitwise(
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if !left.is_integer_like() || !right.is_integer_like() {
            return Err(Self::operand_error(op, left, right, location));
        }
        let (a, b) = (left.as_int().unwrap_or(0), right.as_int().unwrap_or(0));
        let result = match op {
            BinOp::BitAnd => a & b,
            BinOp::BitOr => a | b,
            BinOp::BitXor => a ^ b,
            BinOp::Shl => a.wrapping_shl(b as u32),
            BinOp::Shr => a.wrapping_shr(b as u32),
            _ => unreachable!("bitwise called with {:?}", op),
        };
        Ok(Value::Int(result))
    }

    fn offset_pointer(
        addr: Address,
        offset: i64,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        addr.checked_add_signed(offset)
            .map(Value::Pointer)
            .ok_or_else(|| {
                RuntimeError::new(
                    ErrorKind::InvalidAddress,
                    format!("pointer 0x{:x} offset by {} is out of range", addr, offset),
                    location,
                )
            })
    }

    fn division_by_zero(op: BinOp, location: SourceLocation) -> RuntimeError {
        let message = if op == BinOp::Mod {
            "modulo by zero"
        } else {
            "division by zero"
        };
        RuntimeError::new(ErrorKind::DivisionByZero, message, location)
    }

    fn operand_error(
        op: BinOp,
        left: &Value,
        right: &Value,
        location: SourceLocation,
    ) -> RuntimeError {
        RuntimeError::type_mismatch(
            format!(
                "unsupported operands for '{}': {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
            location,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::ErrorKind;
    use crate::memory::value::Value;
    use crate::parser::ast::{BinOp, SourceLocation};

    fn apply(op: BinOp, left: Value, right: Value) -> Result<Value, ErrorKind> {
        Interpreter::new()
            .binary_op(op, left, right, SourceLocation::default())
            .map_err(|e| e.kind)
    }

    #[test]
    fn test_truncating_division() {
        assert_eq!(apply(BinOp::Div, Value::Int(-7), Value::Int(2)), Ok(Value::Int(-3)));
        assert_eq!(apply(BinOp::Div, Value::Int(7), Value::Int(-2)), Ok(Value::Int(-3)));
        assert_eq!(apply(BinOp::Mod, Value::Int(-7), Value::Int(2)), Ok(Value::Int(-1)));
        assert_eq!(apply(BinOp::Mod, Value::Int(7), Value::Int(-2)), Ok(Value::Int(1)));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(apply(BinOp::Div, Value::Int(1), Value::Int(0)), Err(ErrorKind::DivisionByZero));
        assert_eq!(apply(BinOp::Mod, Value::Int(1), Value::Int(0)), Err(ErrorKind::DivisionByZero));
        assert_eq!(
            apply(BinOp::Div, Value::Float(1.0), Value::Float(0.0)),
            Err(ErrorKind::DivisionByZero)
        );
    }

    #[test]
    fn test_coercion_table() {
        assert_eq!(apply(BinOp::Add, Value::Char(b'a'), Value::Int(1)), Ok(Value::Int(98)));
        assert_eq!(apply(BinOp::Mul, Value::Int(2), Value::Float(1.5)), Ok(Value::Float(3.0)));
        assert_eq!(
            apply(BinOp::Add, Value::Pointer(0x1000), Value::Int(3)),
            Ok(Value::Pointer(0x1003))
        );
        assert_eq!(
            apply(BinOp::Add, Value::Int(2), Value::Pointer(0x1000)),
            Ok(Value::Pointer(0x1002))
        );
        assert_eq!(
            apply(BinOp::Sub, Value::Pointer(0x1004), Value::Int(4)),
            Ok(Value::Pointer(0x1000))
        );
        assert_eq!(
            apply(BinOp::Sub, Value::Pointer(0x1008), Value::Pointer(0x1002)),
            Ok(Value::Int(6))
        );
        assert_eq!(
            apply(BinOp::Add, Value::Pointer(0x1000), Value::Float(1.0)),
            Err(ErrorKind::TypeMismatch)
        );
        assert_eq!(
            apply(BinOp::Mul, Value::Pointer(0x1000), Value::Int(2)),
            Err(ErrorKind::TypeMismatch)
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(apply(BinOp::Lt, Value::Int(1), Value::Float(1.5)), Ok(Value::Int(1)));
        assert_eq!(apply(BinOp::Eq, Value::Pointer(0), Value::Int(0)), Ok(Value::Int(1)));
        assert_eq!(
            apply(BinOp::Eq, Value::Str("ab".into()), Value::Str("ab".into())),
            Ok(Value::Int(1))
        );
        assert_eq!(apply(BinOp::Ge, Value::Char(b'b'), Value::Char(b'a')), Ok(Value::Int(1)));
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(apply(BinOp::Shl, Value::Int(1), Value::Int(4)), Ok(Value::Int(16)));
        assert_eq!(apply(BinOp::Shr, Value::Int(-16), Value::Int(2)), Ok(Value::Int(-4)));
        assert_eq!(apply(BinOp::BitXor, Value::Int(6), Value::Int(3)), Ok(Value::Int(5)));
        assert_eq!(
            apply(BinOp::BitAnd, Value::Float(1.0), Value::Int(1)),
            Err(ErrorKind::TypeMismatch)
        );
    }
}
