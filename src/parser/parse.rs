//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: variable declarations, function definitions, initializers
//! - `statements`: control flow, blocks, jumps, expression statements
//! - `expressions`: one method per precedence tier
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state. Tokens are pulled from the
//! [`Lexer`] up front; parsing stops at the first error.

use crate::interpreter::constants::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use thiserror::Error;

/// Deepest nesting of statements and unary/parenthesised expressions accepted
pub const MAX_NESTING_DEPTH: usize = 1024;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Statement and expression levels currently open
    depth: usize,
}

impl Parser {
    /// Lex `source` completely. Lexical errors surface here, before parsing.
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Build a parser over an already lexed stream. A missing trailing `Eof`
    /// is appended.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token::Eof(_))) {
            let loc = tokens.last().map(Token::location).unwrap_or_default();
            tokens.push(Token::Eof(loc));
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse the entire program
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            // Stray semicolons are empty statements
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            let stmt = self.parse_statement()?;
            program.statements.push(stmt);
        }

        Ok(program)
    }

    // ===== Helper methods =====

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`]
    pub(crate) fn nested<R>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<R, ParseError>,
    ) -> Result<R, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::new(
                format!("Nesting exceeds {} levels", MAX_NESTING_DEPTH),
                self.current_location(),
            ));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || parse(self));
        self.depth -= 1;
        result
    }

    pub(crate) fn is_type_keyword(&self) -> bool {
        is_type_token(self.peek())
    }

    /// Consume a base type keyword
    pub(crate) fn parse_base_type(&mut self) -> Result<BaseType, ParseError> {
        let base = match self.peek() {
            Token::Int(_) => BaseType::Int,
            Token::Float(_) => BaseType::Float,
            Token::Double(_) => BaseType::Double,
            Token::Char(_) => BaseType::Char,
            Token::Void(_) => BaseType::Void,
            other => {
                return Err(ParseError::new(
                    format!("Expected type, found {}", other),
                    self.current_location(),
                ));
            }
        };
        self.advance();
        Ok(base)
    }

    /// Count and consume a run of `*`
    pub(crate) fn parse_pointer_level(&mut self) -> usize {
        let mut level = 0;
        while self.match_token(&Token::Star(self.current_location())) {
            level += 1;
        }
        level
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    // The token vector always ends with `Eof` and `advance` never moves past it
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.peek().clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn expect_token(
        &mut self,
        token: &Token,
        message: &str,
    ) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(
                format!("{}, found {}", message, self.peek()),
                self.current_location(),
            ))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    pub(crate) fn expect_rbracket(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBracket(self.current_location()),
            &format!("Expected ']' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::new(
                format!("Expected identifier, found {}", self.peek()),
                self.current_location(),
            ))
        }
    }
}

pub(crate) fn is_type_token(token: &Token) -> bool {
    matches!(
        token,
        Token::Int(_) | Token::Float(_) | Token::Double(_) | Token::Char(_) | Token::Void(_)
    )
}

/// Lex and parse `source` in one step
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_function() {
        let source = "int main() { return 0; }";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            AstNode::FunctionDef {
                name,
                params,
                return_type,
                body,
                ..
            } => {
                assert_eq!(name, "main");
                assert_eq!(params.len(), 0);
                assert_eq!(*return_type, BaseType::Int);
                match body.as_ref() {
                    AstNode::Block { statements, .. } => assert_eq!(statements.len(), 1),
                    other => panic!("Expected block body, got {:?}", other),
                }
            }
            _ => panic!("Expected function definition"),
        }
    }

    #[test]
    fn test_parse_precedence() {
        let program = parse("1 + 2 * 3;").unwrap();

        match &program.statements[0] {
            AstNode::ExpressionStatement { expr, .. } => match expr.as_ref() {
                AstNode::BinaryOp {
                    op: BinOp::Add,
                    right,
                    ..
                } => {
                    assert!(matches!(
                        right.as_ref(),
                        AstNode::BinaryOp { op: BinOp::Mul, .. }
                    ));
                }
                other => panic!("Expected addition at the root, got {:?}", other),
            },
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_shift_below_additive() {
        let program = parse("1 << 2 + 3;").unwrap();

        match &program.statements[0] {
            AstNode::ExpressionStatement { expr, .. } => {
                assert!(matches!(
                    expr.as_ref(),
                    AstNode::BinaryOp { op: BinOp::Shl, .. }
                ));
            }
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_assignment_right_assoc() {
        let program = parse("a = b = 3;").unwrap();

        match &program.statements[0] {
            AstNode::ExpressionStatement { expr, .. } => match expr.as_ref() {
                AstNode::Assignment { value, .. } => {
                    assert!(matches!(value.as_ref(), AstNode::Assignment { .. }));
                }
                other => panic!("Expected assignment, got {:?}", other),
            },
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_if_statement() {
        let source = "int main() { if (x > 0) return 1; else return 0; }";
        let program = parse(source).unwrap();
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_parse_multi_declarator() {
        let program = parse("int a = 1, *b, c[3];").unwrap();

        match &program.statements[0] {
            AstNode::Block {
                statements, scoped, ..
            } => {
                assert!(!scoped);
                assert_eq!(statements.len(), 3);
                assert!(matches!(
                    &statements[1],
                    AstNode::Declaration { pointer_level: 1, .. }
                ));
                assert!(matches!(
                    &statements[2],
                    AstNode::Declaration { dimensions, .. } if dimensions.len() == 1
                ));
            }
            other => panic!("Expected declaration group, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_initializer_flattens() {
        let program = parse("int m[2][2] = {{1, 2}, {3, 4}};").unwrap();

        match &program.statements[0] {
            AstNode::Declaration {
                dimensions,
                initializer_list: Some(list),
                ..
            } => {
                assert_eq!(dimensions.len(), 2);
                match list.as_ref() {
                    AstNode::ArrayInitializer { elements, .. } => assert_eq!(elements.len(), 4),
                    other => panic!("Expected initializer list, got {:?}", other),
                }
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_sizeof_and_cast() {
        let program = parse("x = sizeof(int *); y = (char) 300;").unwrap();

        match &program.statements[0] {
            AstNode::ExpressionStatement { expr, .. } => match expr.as_ref() {
                AstNode::Assignment { value, .. } => {
                    assert!(matches!(
                        value.as_ref(),
                        AstNode::Literal(Literal::Int(4), _)
                    ));
                }
                other => panic!("Expected assignment, got {:?}", other),
            },
            other => panic!("Expected expression statement, got {:?}", other),
        }
        match &program.statements[1] {
            AstNode::ExpressionStatement { expr, .. } => match expr.as_ref() {
                AstNode::Assignment { value, .. } => {
                    assert!(matches!(
                        value.as_ref(),
                        AstNode::TypeCast {
                            target_type: BaseType::Char,
                            ..
                        }
                    ));
                }
                other => panic!("Expected assignment, got {:?}", other),
            },
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_directive_and_stray_semicolons() {
        let program = parse("#include <stdio.h>\n;;int x;").unwrap();

        assert_eq!(program.statements.len(), 2);
        assert!(matches!(
            &program.statements[0],
            AstNode::PreprocessorDirective { name, value, .. }
                if name == "include" && value == "stdio.h"
        ));
    }

    #[test]
    fn test_parse_errors_fail_fast() {
        let err = parse("int main() { return 0 }").unwrap_err();
        assert!(err.message.contains("Expected ';'"));

        let err = parse("int x = ;").unwrap_err();
        assert_eq!(err.location.line, 1);

        assert!(parse("int main() { if (1 { } }").is_err());
    }

    #[test]
    fn test_parse_deep_nesting_is_an_error() {
        let depth = 20_000;
        let source = format!(
            "int main() {{ return {}1{}; }}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let err = parse(&source).expect_err("nesting past the limit should fail");
        assert!(err.message.contains("Nesting"), "got {}", err);

        let err = parse(&format!("int x = {}1;", "-".repeat(depth))).expect_err("unary chain");
        assert!(err.message.contains("Nesting"), "got {}", err);

        let blocks = format!("{}{}", "{".repeat(depth), "}".repeat(depth));
        assert!(parse(&blocks).is_err());

        let list = format!("int a[1] = {}1{};", "{".repeat(depth), "}".repeat(depth));
        assert!(parse(&list).is_err());
    }

    #[test]
    fn test_parse_nesting_below_limit() {
        let depth = MAX_NESTING_DEPTH / 2;
        let source = format!("{}1{};", "(".repeat(depth), ")".repeat(depth));
        let program = parse(&source).unwrap();
        assert_eq!(program.statements.len(), 1);
    }
}
