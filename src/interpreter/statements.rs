//! Statement execution implementation
//!
//! This module handles the execution of the non-loop C statements:
//!
//! - Variable declarations, including arrays, matrices and char buffers
//! - Blocks and compound statements
//! - `if`/`else`
//!
//! # Frames
//!
//! A free-standing `{ ... }` block pushes a scope frame for its duration.
//! The body of a function, `if`, `while` or `for` does not: its statements
//! run in the frame already opened by that construct (the call frame, the
//! `for` frame, or the enclosing frame). Writes always land in the top frame,
//! so this decides which assignments survive the construct.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::{ErrorKind, RuntimeError};
use crate::memory::value::{Matrix, Value};
use crate::parser::ast::*;
use crate::terminal::Terminal;

impl<T: Terminal> Interpreter<T> {
    /// Run statements in order in the current frame
    ///
    /// The result is the last non-`Void` value; a control signal stops the
    /// sequence and is handed to the caller.
    pub(crate) fn run_statements(
        &mut self,
        statements: &[AstNode],
    ) -> Result<ControlFlow, RuntimeError> {
        let mut last = Value::Void;
        for stmt in statements {
            match self.execute(stmt)? {
                ControlFlow::Normal(Value::Void) => {}
                ControlFlow::Normal(value) => last = value,
                signal => return Ok(signal),
            }
        }
        Ok(ControlFlow::Normal(last))
    }

    pub(crate) fn execute_block(
        &mut self,
        statements: &[AstNode],
        scoped: bool,
    ) -> Result<ControlFlow, RuntimeError> {
        if !scoped {
            return self.run_statements(statements);
        }

        self.scopes.push_frame();
        let result = self.run_statements(statements);
        self.scopes.pop_frame();
        result
    }

    /// Run the body of a function, branch or loop without a frame of its own
    pub(crate) fn execute_body(&mut self, body: &AstNode) -> Result<ControlFlow, RuntimeError> {
        match body {
            AstNode::Block { statements, .. } => self.run_statements(statements),
            other => self.execute(other),
        }
    }

    pub(crate) fn execute_if(
        &mut self,
        condition: &AstNode,
        then_branch: &AstNode,
        else_branch: Option<&AstNode>,
    ) -> Result<ControlFlow, RuntimeError> {
        if self.evaluate(condition)?.is_truthy() {
            self.execute_body(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute_body(else_branch)
        } else {
            Ok(ControlFlow::Normal(Value::Void))
        }
    }

    /// Bind a declared variable in the top frame
    ///
    /// Returns the stored value when there is an initializer, `Void` otherwise.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn execute_declaration(
        &mut self,
        var_type: BaseType,
        name: &str,
        pointer_level: usize,
        dimensions: &[AstNode],
        init: Option<&AstNode>,
        initializer_list: Option<&AstNode>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let zero = Value::zero_of(var_type, pointer_level);

        let mut dims = Vec::with_capacity(dimensions.len());
        for dim in dimensions {
            dims.push(self.evaluate_dimension(dim)?);
        }

        let listed = match initializer_list {
            Some(list) => Some(self.evaluate_initializer(list, var_type, pointer_level)?),
            None => None,
        };
        let initialized = listed.is_some() || init.is_some();

        let value = if dims.is_empty() {
            match (listed, init) {
                (Some(elements), _) => Value::new_array(elements),
                (None, Some(init)) => {
                    let value = self.evaluate(init)?;
                    match value {
                        Value::Str(s) if var_type == BaseType::Char && pointer_level == 0 => {
                            Value::char_array(&s)
                        }
                        other => Self::coerce_to_declared(var_type, pointer_level, other),
                    }
                }
                (None, None) => zero,
            }
        } else {
            let max_cells = self.config().max_heap_cells;
            let too_large = || {
                RuntimeError::new(
                    ErrorKind::InvalidSize,
                    format!("array '{}' exceeds {} cells", name, max_cells),
                    location,
                )
            };

            let elements = match (listed, init) {
                (Some(elements), _) => elements,
                (None, Some(init)) => self.initializer_elements(init, var_type, pointer_level)?,
                (None, None) => Vec::new(),
            };

            if dims.len() == 2 {
                let cols = dims[1];
                if cols == 0 {
                    return Err(RuntimeError::new(
                        ErrorKind::InvalidSize,
                        format!("array '{}' needs a column count", name),
                        location,
                    ));
                }
                // `int m[][3] = {...}` takes its row count from the initializer
                let rows = if dims[0] == 0 {
                    elements.len().div_ceil(cols)
                } else {
                    dims[0]
                };
                if !matches!(rows.checked_mul(cols), Some(cells) if cells <= max_cells) {
                    return Err(too_large());
                }
                let matrix = Matrix::new(rows, cols, elements, zero).ok_or_else(too_large)?;
                Value::new_matrix(matrix)
            } else {
                // Three or more dimensions flatten into one array
                let declared = dims
                    .iter()
                    .try_fold(1usize, |cells, &dim| cells.checked_mul(dim))
                    .filter(|&cells| cells <= max_cells)
                    .ok_or_else(too_large)?;
                let mut elements = elements;
                let len = declared.max(elements.len());
                elements.resize(len, zero);
                Value::new_array(elements)
            }
        };

        self.scopes.set(name, value.clone());
        Ok(if initialized { value } else { Value::Void })
    }

    /// Evaluate an array dimension; an unsized `[]` parses as 0
    fn evaluate_dimension(&mut self, dim: &AstNode) -> Result<usize, RuntimeError> {
        let location = dim.location();
        let value = self.evaluate(dim)?;
        match value.as_int() {
            Some(n) if n >= 0 && value.is_integer_like() => Ok(n as usize),
            Some(n) => Err(RuntimeError::new(
                ErrorKind::InvalidSize,
                format!("invalid array size {}", n),
                location,
            )),
            None => Err(RuntimeError::type_mismatch(
                format!("array size must be an integer, got {}", value.type_name()),
                location,
            )),
        }
    }

    /// Evaluate a `{ ... }` list eagerly, coercing each element
    fn evaluate_initializer(
        &mut self,
        list: &AstNode,
        var_type: BaseType,
        pointer_level: usize,
    ) -> Result<Vec<Value>, RuntimeError> {
        match list {
            AstNode::ArrayInitializer { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    let value = self.evaluate(element)?;
                    values.push(Self::coerce_to_declared(var_type, pointer_level, value));
                }
                Ok(values)
            }
            other => Ok(vec![self.evaluate(other)?]),
        }
    }

    /// Elements for an array declared with `= expr` instead of a list
    fn initializer_elements(
        &mut self,
        init: &AstNode,
        var_type: BaseType,
        pointer_level: usize,
    ) -> Result<Vec<Value>, RuntimeError> {
        match self.evaluate(init)? {
            Value::Str(s) => {
                let mut chars: Vec<Value> = s.bytes().map(Value::Char).collect();
                chars.push(Value::Char(0));
                Ok(chars)
            }
            Value::Array(items) => Ok(items.borrow().clone()),
            other => Ok(vec![Self::coerce_to_declared(var_type, pointer_level, other)]),
        }
    }
}
