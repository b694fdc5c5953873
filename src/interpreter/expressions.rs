//! Expression evaluation implementation
//!
//! This module handles evaluation of all C expression types, including:
//!
//! - Literals (integers, floats, characters, strings)
//! - Variables and identifiers
//! - Binary operators, with `&&`/`||` short-circuiting here
//! - Unary and postfix operators
//! - Array subscripting
//! - Function calls (user functions first, then built-ins)
//! - Type casts and assignments
//!
//! Operator semantics live in the [`ops`](crate::interpreter::ops) modules.
//! Evaluation order is left to right.

use crate::interpreter::constants::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{ErrorKind, RuntimeError};
use crate::memory::value::Value;
use crate::parser::ast::*;
use crate::terminal::Terminal;

impl<T: Terminal> Interpreter<T> {
    /// Evaluate an expression and return its value
    pub fn evaluate(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_node(expr))
    }

    fn evaluate_node(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        match expr {
            AstNode::Literal(literal, _) => Ok(match literal {
                Literal::Int(n) => Value::Int(*n),
                Literal::Float(f) => Value::Float(*f),
                Literal::Char(c) => Value::Char(*c),
                Literal::Str(s) => Value::Str(s.clone()),
            }),

            AstNode::Identifier(name, location) => self.lookup_variable(name, *location),

            AstNode::BinaryOp {
                left,
                op: BinOp::And,
                right,
                ..
            } => {
                let result = self.evaluate(left)?.is_truthy() && self.evaluate(right)?.is_truthy();
                Ok(Value::Int(result as i64))
            }

            AstNode::BinaryOp {
                left,
                op: BinOp::Or,
                right,
                ..
            } => {
                let result = self.evaluate(left)?.is_truthy() || self.evaluate(right)?.is_truthy();
                Ok(Value::Int(result as i64))
            }

            AstNode::BinaryOp {
                left,
                op,
                right,
                location,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary_op(*op, left, right, *location)
            }

            AstNode::UnaryOp {
                op,
                operand,
                location,
            } => self.evaluate_unary(*op, operand, *location),

            AstNode::PostfixOp {
                operand,
                op,
                location,
            } => {
                let delta = match op {
                    PostOp::Inc => 1,
                    PostOp::Dec => -1,
                };
                self.increment(operand, delta, false, *location)
            }

            AstNode::FunctionCall {
                name,
                args,
                location,
            } => self.evaluate_call(name, args, *location),

            AstNode::ArrayAccess {
                base,
                index,
                location,
            } => {
                let base = self.evaluate(base)?;
                let index = self.evaluate(index)?;
                self.index_value(&base, &index, *location)
            }

            AstNode::ArrayInitializer { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::new_array(values))
            }

            AstNode::TypeCast {
                target_type,
                pointer_level,
                expr,
                location,
            } => {
                let value = self.evaluate(expr)?;
                Self::cast_value(*target_type, *pointer_level, value, *location)
            }

            AstNode::Assignment {
                target,
                op,
                value,
                location,
            } => self.evaluate_assignment(target, *op, value, *location),

            other => Err(RuntimeError::new(
                ErrorKind::TypeMismatch,
                "statement used where a value is expected",
                other.location(),
            )),
        }
    }

    /// Call `name`: user functions first, then the built-in library
    fn evaluate_call(
        &mut self,
        name: &str,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let Some(func) = self.functions.get(name).cloned() {
            let values = self.evaluate_args(args)?;
            return self.call_user_function(&func, values, location);
        }

        // scanf stores through `&x`, which needs the argument expressions
        if name == "scanf" {
            return self.builtin_scanf(args, location);
        }

        let values = self.evaluate_args(args)?;
        self.call_builtin(name, values, location)
    }

    fn evaluate_args(&mut self, args: &[AstNode]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg)?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::ErrorKind;
    use crate::memory::value::Value;
    use crate::Error;

    fn eval(source: &str) -> Value {
        let mut interp = Interpreter::new();
        interp.interpret(source).unwrap().pop().unwrap()
    }

    #[test]
    fn test_short_circuit() {
        // The right side would divide by zero
        assert_eq!(eval("int z = 0; 0 && 1 / z;"), Value::Int(0));
        assert_eq!(eval("int z = 0; 1 || 1 / z;"), Value::Int(1));
        assert_eq!(eval("2 && 3;"), Value::Int(1));
    }

    #[test]
    fn test_literals_and_casts() {
        assert_eq!(eval("'a';"), Value::Char(b'a'));
        assert_eq!(eval("1.5;"), Value::Float(1.5));
        assert_eq!(eval("(int)3.99;"), Value::Int(3));
        assert_eq!(eval("(char)66;"), Value::Char(b'B'));
        assert_eq!(eval("sizeof(int);"), Value::Int(4));
    }

    #[test]
    fn test_assignment_yields_value() {
        assert_eq!(eval("int a; int b; a = b = 4;"), Value::Int(4));
        assert_eq!(eval("int a = 10; a -= 3;"), Value::Int(7));
    }

    #[test]
    fn test_undefined_names() {
        let mut interp = Interpreter::new();
        match interp.interpret("missing(1);") {
            Err(Error::Runtime(e)) => assert_eq!(e.kind, ErrorKind::UndefinedFunction),
            other => panic!("Expected runtime error, got {:?}", other),
        }
        match interp.interpret("nope + 1;") {
            Err(Error::Runtime(e)) => assert_eq!(e.kind, ErrorKind::UndefinedVariable),
            other => panic!("Expected runtime error, got {:?}", other),
        }
    }
}
