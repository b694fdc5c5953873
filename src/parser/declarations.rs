//! Declaration parsing implementation
//!
//! This module handles parsing of everything that starts with a type keyword:
//!
//! - Variable declarations: `int x = 42;`, `char *s, buf[16];`
//! - Array declarations and `{ ... }` initializer lists
//! - Function definitions: `type name(params) { ... }`
//! - Function prototypes, which are accepted and produce no code
//!
//! # Grammar
//!
//! ```text
//! declaration  ::= base_type declarator ("," declarator)* ";"
//!                | base_type "*"* identifier "(" params ")" (block | ";")
//! declarator   ::= "*"* identifier ("[" expr? "]")* ("=" initializer)?
//! initializer  ::= "{" (initializer ("," initializer)*)? ","? "}" | expr
//! ```
//!
//! Nested initializer braces are flattened into a single element list.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a declaration or a function definition, starting at the type keyword
    pub(crate) fn parse_declaration(&mut self) -> Result<AstNode, ParseError> {
        let start = self.current_location();
        let base = self.parse_base_type()?;

        let pointer_level = self.parse_pointer_level();
        let name = self.expect_identifier()?;
        let loc = self.previous_location();

        if self.check(&Token::LParen(self.current_location())) {
            return self.parse_function_definition(base, name, loc);
        }

        let mut declarations = vec![self.parse_declarator_rest(base, name, pointer_level, loc)?];

        while self.match_token(&Token::Comma(self.current_location())) {
            let pointer_level = self.parse_pointer_level();
            let name = self.expect_identifier()?;
            let loc = self.previous_location();
            declarations.push(self.parse_declarator_rest(base, name, pointer_level, loc)?);
        }

        self.expect_semicolon("after variable declaration")?;

        if declarations.len() == 1 {
            Ok(declarations.remove(0))
        } else {
            Ok(AstNode::Block {
                statements: declarations,
                scoped: false,
                location: start,
            })
        }
    }

    /// Parse dimensions and initializer of one declarator whose name is consumed
    fn parse_declarator_rest(
        &mut self,
        var_type: BaseType,
        name: String,
        pointer_level: usize,
        location: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        let mut dimensions = Vec::new();
        while self.match_token(&Token::LBracket(self.current_location())) {
            if self.check(&Token::RBracket(self.current_location())) {
                // Unsized `[]`, length comes from the initializer
                let loc = self.current_location();
                self.advance();
                dimensions.push(AstNode::Literal(Literal::Int(0), loc));
            } else {
                dimensions.push(self.parse_expression()?);
                self.expect_rbracket("after array size")?;
            }
        }

        let mut init = None;
        let mut initializer_list = None;
        if self.match_token(&Token::Eq(self.current_location())) {
            if self.check(&Token::LBrace(self.current_location())) {
                initializer_list = Some(Box::new(self.parse_initializer_list()?));
            } else {
                init = Some(Box::new(self.parse_expression()?));
            }
        }

        Ok(AstNode::Declaration {
            var_type,
            name,
            pointer_level,
            dimensions,
            init,
            initializer_list,
            location,
        })
    }

    /// Parse `{ a, b, {c, d} }` into one flat [`AstNode::ArrayInitializer`]
    pub(crate) fn parse_initializer_list(&mut self) -> Result<AstNode, ParseError> {
        let location = self.current_location();
        let mut elements = Vec::new();
        self.collect_initializer_elements(&mut elements)?;
        Ok(AstNode::ArrayInitializer { elements, location })
    }

    fn collect_initializer_elements(
        &mut self,
        elements: &mut Vec<AstNode>,
    ) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            "Expected '{' to start initializer list",
        )?;

        while !self.check(&Token::RBrace(self.current_location())) {
            if self.check(&Token::LBrace(self.current_location())) {
                self.nested(|p| p.collect_initializer_elements(elements))?;
            } else {
                elements.push(self.parse_expression()?);
            }

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_rbrace("after initializer list")
    }

    /// Parse function definition once `type name` has been consumed
    fn parse_function_definition(
        &mut self,
        return_type: BaseType,
        name: String,
        location: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        // Prototype: nothing to run
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(AstNode::Block {
                statements: Vec::new(),
                scoped: false,
                location,
            });
        }

        if !self.check(&Token::LBrace(self.current_location())) {
            return Err(ParseError::new(
                format!("Expected '{{' before function body, found {}", self.peek()),
                self.current_location(),
            ));
        }
        let body = Box::new(self.parse_statement()?);

        Ok(AstNode::FunctionDef {
            return_type,
            name,
            params,
            body,
            location,
        })
    }

    /// Parse parameter list: (type name, type name, ...)
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        // Special case: (void) means no parameters in C
        if self.check(&Token::Void(self.current_location()))
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance();
            return Ok(params);
        }

        loop {
            let param_type = self.parse_base_type()?;
            let mut pointer_level = self.parse_pointer_level();
            let name = self.expect_identifier()?;

            // `int arr[]` decays to a pointer parameter
            while self.match_token(&Token::LBracket(self.current_location())) {
                if !self.check(&Token::RBracket(self.current_location())) {
                    self.parse_expression()?;
                }
                self.expect_rbracket("in array parameter")?;
                pointer_level += 1;
            }

            params.push(Param {
                param_type,
                name,
                pointer_level,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }
}
