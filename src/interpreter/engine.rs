// Execution engine for the C interpreter

use crate::interpreter::config::InterpreterConfig;
use crate::interpreter::constants::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::interpreter::errors::{ErrorKind, RuntimeError};
use crate::memory::{heap::Heap, scope::ScopeChain, value::Value};
use crate::parser::ast::*;
use crate::parser::lexer::Lexer;
use crate::parser::parse::Parser;
use crate::terminal::{MockTerminal, Terminal};
use crate::Error;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Outcome of executing one statement
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    /// Completed; carries the statement's value (`Void` for none)
    Normal(Value),
    Break,
    Continue,
    Return(Value),
}

/// A user-defined function, registered when its definition executes
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub return_type: BaseType,
    pub params: Vec<Param>,
    pub body: AstNode,
    pub location: SourceLocation,
}

/// The main interpreter that executes a C program
pub struct Interpreter<T: Terminal = MockTerminal> {
    /// Variable frames, global frame at the bottom
    pub(crate) scopes: ScopeChain,

    /// Function table (name -> definition)
    pub(crate) functions: FxHashMap<String, Rc<Function>>,

    /// Heap memory
    pub(crate) heap: Heap,

    /// Console used by the I/O builtins
    pub(crate) terminal: T,

    config: InterpreterConfig,

    /// Nested user calls currently active
    call_depth: usize,
}

impl Interpreter<MockTerminal> {
    /// Interpreter with default limits and a capturing terminal
    pub fn new() -> Self {
        Self::with_terminal(MockTerminal::new(), InterpreterConfig::default())
    }
}

impl Default for Interpreter<MockTerminal> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Terminal> Interpreter<T> {
    pub fn with_terminal(terminal: T, config: InterpreterConfig) -> Self {
        Interpreter {
            scopes: ScopeChain::new(),
            functions: FxHashMap::default(),
            heap: Heap::new(config.heap_start).with_max_cells(config.max_heap_cells),
            terminal,
            config,
            call_depth: 0,
        }
    }

    /// Lex, parse and run `source`
    ///
    /// Returns one value per top-level statement that produced a non-`Void`
    /// result. Defining `main` runs it, so its return value is among them.
    pub fn interpret(&mut self, source: &str) -> Result<Vec<Value>, Error> {
        let tokens = Lexer::new(source).tokenize()?;
        let program = Parser::from_tokens(tokens).parse_program()?;
        Ok(self.run_program(&program)?)
    }

    /// Run an already parsed program
    pub fn run_program(&mut self, program: &Program) -> Result<Vec<Value>, RuntimeError> {
        let mut results = Vec::new();

        for stmt in &program.statements {
            match self.execute(stmt)? {
                ControlFlow::Normal(Value::Void) => {}
                ControlFlow::Normal(value) => results.push(value),
                ControlFlow::Return(value) => {
                    if value != Value::Void {
                        results.push(value);
                    }
                    break;
                }
                ControlFlow::Break | ControlFlow::Continue => break,
            }
        }

        Ok(results)
    }

    /// Execute one statement
    ///
    /// Deeply nested programs continue on a fresh native stack segment, so
    /// recursion depth is bounded by `max_call_depth` and not by the host
    /// thread's stack size.
    pub fn execute(&mut self, node: &AstNode) -> Result<ControlFlow, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.execute_node(node))
    }

    fn execute_node(&mut self, node: &AstNode) -> Result<ControlFlow, RuntimeError> {
        match node {
            AstNode::Declaration {
                var_type,
                name,
                pointer_level,
                dimensions,
                init,
                initializer_list,
                location,
            } => {
                let value = self.execute_declaration(
                    *var_type,
                    name,
                    *pointer_level,
                    dimensions,
                    init.as_deref(),
                    initializer_list.as_deref(),
                    *location,
                )?;
                Ok(ControlFlow::Normal(value))
            }

            AstNode::Block {
                statements, scoped, ..
            } => self.execute_block(statements, *scoped),

            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.execute_if(condition, then_branch, else_branch.as_deref()),

            AstNode::While {
                condition, body, ..
            } => self.execute_while(condition, body),

            AstNode::For {
                init,
                condition,
                update,
                body,
                ..
            } => self.execute_for(
                init.as_deref(),
                condition.as_deref(),
                update.as_deref(),
                body,
            ),

            AstNode::Return { expr, .. } => {
                let value = match expr {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Int(0),
                };
                Ok(ControlFlow::Return(value))
            }

            AstNode::Break { .. } => Ok(ControlFlow::Break),
            AstNode::Continue { .. } => Ok(ControlFlow::Continue),

            AstNode::ExpressionStatement { expr, .. } => {
                Ok(ControlFlow::Normal(self.evaluate(expr)?))
            }

            AstNode::FunctionDef {
                return_type,
                name,
                params,
                body,
                location,
            } => self.execute_function_def(*return_type, name, params, body, *location),

            AstNode::PreprocessorDirective { .. } => Ok(ControlFlow::Normal(Value::Void)),

            // Bare expressions
            _ => Ok(ControlFlow::Normal(self.evaluate(node)?)),
        }
    }

    /// Call a function by name with evaluated arguments
    ///
    /// User definitions shadow builtins of the same name.
    pub fn call_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match self.functions.get(name).cloned() {
            Some(func) => self.call_user_function(&func, args, location),
            None => self.call_builtin(name, args, location),
        }
    }

    /// Bind arguments in a fresh frame and run the body
    pub(crate) fn call_user_function(
        &mut self,
        func: &Function,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(RuntimeError::new(
                ErrorKind::StackOverflow,
                format!(
                    "call to '{}' exceeds maximum call depth of {}",
                    func.name, self.config.max_call_depth
                ),
                location,
            ));
        }

        self.call_depth += 1;
        self.scopes.push_frame();

        let mut args = args.into_iter();
        for param in &func.params {
            // Missing arguments default to 0
            let value = args.next().unwrap_or(Value::Int(0));
            let value = Self::coerce_to_declared(param.param_type, param.pointer_level, value);
            self.scopes.set(&param.name, value);
        }

        let result = self.execute_body(&func.body);

        self.scopes.pop_frame();
        self.call_depth -= 1;

        match result? {
            ControlFlow::Return(value) => Ok(value),
            _ => Ok(Value::Int(0)),
        }
    }

    /// Register a function; defining `main` also runs it
    fn execute_function_def(
        &mut self,
        return_type: BaseType,
        name: &str,
        params: &[Param],
        body: &AstNode,
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        let func = Rc::new(Function {
            name: name.to_string(),
            return_type,
            params: params.to_vec(),
            body: body.clone(),
            location,
        });
        self.functions.insert(name.to_string(), Rc::clone(&func));

        if name == "main" {
            let value = self.call_user_function(&func, Vec::new(), location)?;
            return Ok(ControlFlow::Normal(value));
        }
        Ok(ControlFlow::Normal(Value::Void))
    }

    /// Read a variable through the scope chain
    pub(crate) fn lookup_variable(
        &self,
        name: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        self.scopes
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_variable(name, location))
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Global variable, if defined
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.scopes.globals().get(name)
    }

    /// True if a user function with this name has been defined
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }
}
