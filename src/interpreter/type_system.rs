//! Value conversions driven by C types
//!
//! Values carry their own tags, so "types" only matter at three points:
//!
//! - Declarations and parameter binding convert an initializer to the
//!   declared scalar type ([`coerce_to_declared`](Interpreter::coerce_to_declared))
//! - Assignments keep the representation of the value being overwritten
//!   ([`coerce_like`](Interpreter::coerce_like))
//! - Explicit `(type)` casts ([`cast_value`](Interpreter::cast_value))

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::*;
use crate::terminal::Terminal;

impl<T: Terminal> Interpreter<T> {
    /// Convert a scalar to the representation of a declared type
    ///
    /// Arrays, matrices and strings are kept as they are, so `int *p = arr`
    /// aliases `arr` and `char *s = "..."` keeps the string.
    pub(crate) fn coerce_to_declared(
        var_type: BaseType,
        pointer_level: usize,
        value: Value,
    ) -> Value {
        if pointer_level > 0 {
            return match value {
                Value::Int(n) if n >= 0 => Value::Pointer(n as u64),
                other => other,
            };
        }

        match (var_type, value) {
            (BaseType::Int, Value::Float(f)) => Value::Int(f as i64),
            (BaseType::Int, Value::Char(c)) => Value::Int(c as i64),
            (BaseType::Float | BaseType::Double, Value::Int(n)) => Value::Float(n as f64),
            (BaseType::Float | BaseType::Double, Value::Char(c)) => Value::Float(c as f64),
            (BaseType::Char, Value::Int(n)) => Value::Char(n as u8),
            (BaseType::Char, Value::Float(f)) => Value::Char(f as i64 as u8),
            (_, other) => other,
        }
    }

    /// Convert `value` to the scalar representation of `current`
    ///
    /// Used on assignment so an `int` variable stays an `int` after `x = 2.5`.
    pub(crate) fn coerce_like(current: Option<&Value>, value: Value) -> Value {
        match (current, value) {
            (Some(Value::Int(_)), Value::Float(f)) => Value::Int(f as i64),
            (Some(Value::Float(_)), Value::Int(n)) => Value::Float(n as f64),
            (Some(Value::Float(_)), Value::Char(c)) => Value::Float(c as f64),
            (Some(Value::Char(_)), Value::Int(n)) => Value::Char(n as u8),
            (Some(Value::Char(_)), Value::Float(f)) => Value::Char(f as i64 as u8),
            (Some(Value::Pointer(_)), Value::Int(n)) if n >= 0 => Value::Pointer(n as u64),
            (_, value) => value,
        }
    }

    /// Apply an explicit `(type)` cast
    pub(crate) fn cast_value(
        target: BaseType,
        pointer_level: usize,
        value: Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if pointer_level > 0 {
            return match value {
                Value::Pointer(_) | Value::Array(_) | Value::Matrix(_) | Value::Str(_) => Ok(value),
                Value::Int(n) if n >= 0 => Ok(Value::Pointer(n as u64)),
                Value::Char(c) => Ok(Value::Pointer(c as u64)),
                other => Err(RuntimeError::type_mismatch(
                    format!("cannot cast {} to a pointer", other.type_name()),
                    location,
                )),
            };
        }

        let cast = match (target, &value) {
            (BaseType::Void, _) => Some(Value::Void),
            (BaseType::Int, Value::Float(f)) => Some(Value::Int(*f as i64)),
            (BaseType::Int, v) if v.is_integer_like() => v.as_int().map(Value::Int),
            (BaseType::Float | BaseType::Double, v) => v.as_float().map(Value::Float),
            (BaseType::Char, v) => v.as_int().map(|n| Value::Char((n & 0xFF) as u8)),
            _ => None,
        };

        cast.ok_or_else(|| {
            RuntimeError::type_mismatch(
                format!("cannot cast {} to {}", value.type_name(), target),
                location,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::errors::ErrorKind;

    type Interp = Interpreter;

    #[test]
    fn test_casts() {
        let loc = SourceLocation::default();
        assert_eq!(Interp::cast_value(BaseType::Int, 0, Value::Float(7.9), loc), Ok(Value::Int(7)));
        assert_eq!(
            Interp::cast_value(BaseType::Int, 0, Value::Float(-7.9), loc),
            Ok(Value::Int(-7))
        );
        assert_eq!(
            Interp::cast_value(BaseType::Double, 0, Value::Int(3), loc),
            Ok(Value::Float(3.0))
        );
        assert_eq!(
            Interp::cast_value(BaseType::Char, 0, Value::Int(321), loc),
            Ok(Value::Char(65))
        );
        assert_eq!(
            Interp::cast_value(BaseType::Int, 1, Value::Int(4096), loc),
            Ok(Value::Pointer(4096))
        );
        assert_eq!(
            Interp::cast_value(BaseType::Int, 0, Value::Pointer(16), loc),
            Ok(Value::Int(16))
        );

        let err = Interp::cast_value(BaseType::Int, 0, Value::Str("x".into()), loc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_assignment_keeps_representation() {
        assert_eq!(Interp::coerce_like(Some(&Value::Int(1)), Value::Float(2.5)), Value::Int(2));
        assert_eq!(Interp::coerce_like(Some(&Value::Char(0)), Value::Int(66)), Value::Char(b'B'));
        assert_eq!(Interp::coerce_like(None, Value::Float(2.5)), Value::Float(2.5));
        assert_eq!(Interp::coerce_like(Some(&Value::Pointer(0)), Value::Int(8)), Value::Pointer(8));
    }
}
