//! Statement parsing implementation
//!
//! This module handles parsing of all C statement types:
//!
//! - Declarations (delegated to `declarations`)
//! - Control flow: `if`, `while`, `for`
//! - Jump statements: `return`, `break`, `continue`
//! - Compound statements: `{ ... }`
//! - Preprocessor lines, kept as [`AstNode::PreprocessorDirective`]
//! - Expression statements: function calls, assignments
//!
//! # Grammar
//!
//! ```text
//! statement ::= declaration | if_stmt | while_stmt | for_stmt
//!             | return_stmt | break_stmt | continue_stmt
//!             | block | directive | ";" | expr ";"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_statement_level)
    }

    fn parse_statement_level(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        if let Token::Directive(name, value, _) = self.peek_token() {
            self.advance();
            return Ok(AstNode::PreprocessorDirective {
                name,
                value,
                location: loc,
            });
        }

        if self.match_token(&Token::Return(loc)) {
            return self.parse_return_statement();
        }

        if self.match_token(&Token::If(loc)) {
            return self.parse_if_statement();
        }

        if self.match_token(&Token::While(loc)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::For(loc)) {
            return self.parse_for_statement();
        }

        if self.match_token(&Token::Break(loc)) {
            self.expect_semicolon("after 'break'")?;
            return Ok(AstNode::Break { location: loc });
        }

        if self.match_token(&Token::Continue(loc)) {
            self.expect_semicolon("after 'continue'")?;
            return Ok(AstNode::Continue { location: loc });
        }

        if self.match_token(&Token::LBrace(loc)) {
            let statements = self.parse_block_statements()?;
            self.expect_rbrace("after block")?;
            return Ok(AstNode::Block {
                statements,
                scoped: true,
                location: loc,
            });
        }

        // Empty statement, e.g. the body of `while (x--);`
        if self.match_token(&Token::Semicolon(loc)) {
            return Ok(AstNode::Block {
                statements: Vec::new(),
                scoped: false,
                location: loc,
            });
        }

        if self.is_type_keyword() {
            return self.parse_declaration();
        }

        // Otherwise, it's an expression statement
        let expr = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        Ok(AstNode::ExpressionStatement {
            expr: Box::new(expr),
            location: loc,
        })
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let expr = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_semicolon("after return")?;

        Ok(AstNode::Return {
            expr,
            location: loc,
        })
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after if condition")?;

        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after while condition")?;

        let body = Box::new(self.parse_statement()?);

        Ok(AstNode::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse for statement
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'for'")?;

        // Init (optional)
        let init = if self.match_token(&Token::Semicolon(self.current_location())) {
            None
        } else if self.is_type_keyword() {
            // Declaration consumes its own semicolon
            Some(Box::new(self.parse_declaration()?))
        } else {
            let expr_loc = self.current_location();
            let expr = self.parse_expression()?;
            self.expect_semicolon("after for init")?;
            Some(Box::new(AstNode::ExpressionStatement {
                expr: Box::new(expr),
                location: expr_loc,
            }))
        };

        // Condition (optional)
        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_semicolon("after for condition")?;

        // Update (optional)
        let update = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_rparen("after for clauses")?;

        let body = Box::new(self.parse_statement()?);

        Ok(AstNode::For {
            init,
            condition,
            update,
            body,
            location: loc,
        })
    }
}
