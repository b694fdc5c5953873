//! Loop statement execution (`while`, `for`).
//!
//! Adds `impl Interpreter` methods for the two loop forms supported by the
//! C subset. `break` and `continue` are folded into [`LoopBodyResult`] so the
//! loop driver can react without matching on [`ControlFlow`] directly.
//!
//! A `return` inside a loop body yields [`LoopBodyResult::Return`], which makes
//! the loop unwind immediately and hand the signal to the enclosing call.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::AstNode;
use crate::terminal::Terminal;

/// How one pass through a loop body ended
pub(crate) enum LoopBodyResult {
    /// Ran to completion with this value
    Completed(Value),
    /// `continue`: go straight to the update/condition
    Continue,
    /// `break`: leave the loop
    Break,
    /// `return`: leave the loop and the enclosing function
    Return(Value),
}

impl<T: Terminal> Interpreter<T> {
    /// Runs `body` once in the current frame.
    pub(crate) fn execute_loop_body(
        &mut self,
        body: &AstNode,
    ) -> Result<LoopBodyResult, RuntimeError> {
        Ok(match self.execute_body(body)? {
            ControlFlow::Normal(value) => LoopBodyResult::Completed(value),
            ControlFlow::Continue => LoopBodyResult::Continue,
            ControlFlow::Break => LoopBodyResult::Break,
            ControlFlow::Return(value) => LoopBodyResult::Return(value),
        })
    }

    /// Executes a `while (condition) body` loop.
    ///
    /// The loop's value is the result of the last body pass that completed.
    pub(crate) fn execute_while(
        &mut self,
        condition: &AstNode,
        body: &AstNode,
    ) -> Result<ControlFlow, RuntimeError> {
        let mut last = Value::Void;

        while self.evaluate(condition)?.is_truthy() {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Completed(value) => last = value,
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Return(value) => return Ok(ControlFlow::Return(value)),
            }
        }

        Ok(ControlFlow::Normal(last))
    }

    /// Executes a `for (init; condition; update) body` loop.
    ///
    /// `init` runs in a frame owned by the loop, so variables declared there
    /// (and writes made by the body) disappear once the loop ends. A missing
    /// condition loops until `break` or `return`.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        update: Option<&AstNode>,
        body: &AstNode,
    ) -> Result<ControlFlow, RuntimeError> {
        self.scopes.push_frame();
        let result = self.run_for(init, condition, update, body);
        self.scopes.pop_frame();
        result
    }

    fn run_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        update: Option<&AstNode>,
        body: &AstNode,
    ) -> Result<ControlFlow, RuntimeError> {
        if let Some(init) = init {
            self.execute(init)?;
        }

        let mut last = Value::Void;
        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition)?.is_truthy() {
                    break;
                }
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Completed(value) => last = value,
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Return(value) => return Ok(ControlFlow::Return(value)),
            }

            if let Some(update) = update {
                self.evaluate(update)?;
            }
        }

        Ok(ControlFlow::Normal(last))
    }
}
