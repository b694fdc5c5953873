//! Expression parsing implementation
//!
//! This module handles parsing of C expressions with one method per precedence
//! tier. Every binary tier is left-associative; assignment is right-associative.
//!
//! # Precedence (low to high)
//!
//! ```text
//! assignment  = += -= *= /= %=
//! logical_or  ||
//! logical_and &&
//! bitwise_or  |
//! bitwise_xor ^
//! bitwise_and &
//! equality    == !=
//! relational  < <= > >=
//! shift       << >>
//! additive    + -
//! multiplicative * / %
//! unary       - + ! ~ * & ++ -- sizeof (type)
//! postfix     [] () ++ --
//! primary     literals, identifiers, ( expr )
//! ```
//!
//! `sizeof` folds to the constant `4` for every operand.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::interpreter::constants::SIZEOF_VALUE;
use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{is_type_token, ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment (right-associative)
    fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        let target = self.parse_logical_or()?;

        let loc = self.current_location();
        let op = match self.peek() {
            Token::Eq(_) => AssignOp::Assign,
            Token::PlusEq(_) => AssignOp::Add,
            Token::MinusEq(_) => AssignOp::Sub,
            Token::StarEq(_) => AssignOp::Mul,
            Token::SlashEq(_) => AssignOp::Div,
            Token::PercentEq(_) => AssignOp::Mod,
            _ => return Ok(target),
        };
        self.advance();

        let value = Box::new(self.parse_assignment()?);
        Ok(AstNode::Assignment {
            target: Box::new(target),
            op,
            value,
            location: loc,
        })
    }

    /// Parse one left-associative binary tier
    fn parse_binary_tier(
        &mut self,
        next: fn(&mut Parser) -> Result<AstNode, ParseError>,
        select: fn(&Token) -> Option<BinOp>,
    ) -> Result<AstNode, ParseError> {
        let mut left = next(self)?;

        while let Some(op) = select(self.peek()) {
            let loc = self.current_location();
            self.advance();
            let right = Box::new(next(self)?);
            left = AstNode::BinaryOp {
                left: Box::new(left),
                op,
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_logical_and, |t| match t {
            Token::OrOr(_) => Some(BinOp::Or),
            _ => None,
        })
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_bitwise_or, |t| match t {
            Token::AndAnd(_) => Some(BinOp::And),
            _ => None,
        })
    }

    /// Parse bitwise OR (|)
    fn parse_bitwise_or(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_bitwise_xor, |t| match t {
            Token::Pipe(_) => Some(BinOp::BitOr),
            _ => None,
        })
    }

    /// Parse bitwise XOR (^)
    fn parse_bitwise_xor(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_bitwise_and, |t| match t {
            Token::Caret(_) => Some(BinOp::BitXor),
            _ => None,
        })
    }

    /// Parse bitwise AND (&)
    fn parse_bitwise_and(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_equality, |t| match t {
            Token::Amp(_) => Some(BinOp::BitAnd),
            _ => None,
        })
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_relational, |t| match t {
            Token::EqEq(_) => Some(BinOp::Eq),
            Token::NotEq(_) => Some(BinOp::Ne),
            _ => None,
        })
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_shift, |t| match t {
            Token::Lt(_) => Some(BinOp::Lt),
            Token::Le(_) => Some(BinOp::Le),
            Token::Gt(_) => Some(BinOp::Gt),
            Token::Ge(_) => Some(BinOp::Ge),
            _ => None,
        })
    }

    /// Parse bitwise shift (<< >>)
    fn parse_shift(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_additive, |t| match t {
            Token::LtLt(_) => Some(BinOp::Shl),
            Token::GtGt(_) => Some(BinOp::Shr),
            _ => None,
        })
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_multiplicative, |t| match t {
            Token::Plus(_) => Some(BinOp::Add),
            Token::Minus(_) => Some(BinOp::Sub),
            _ => None,
        })
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<AstNode, ParseError> {
        self.parse_binary_tier(Parser::parse_unary, |t| match t {
            Token::Star(_) => Some(BinOp::Mul),
            Token::Slash(_) => Some(BinOp::Div),
            Token::Percent(_) => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// Parse unary (- + ! ~ * & ++ -- sizeof) and casts
    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_unary_level)
    }

    fn parse_unary_level(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let op = match self.peek() {
            Token::Minus(_) => Some(UnOp::Neg),
            Token::Plus(_) => Some(UnOp::Plus),
            Token::Bang(_) => Some(UnOp::Not),
            Token::Tilde(_) => Some(UnOp::BitNot),
            Token::Star(_) => Some(UnOp::Deref),
            Token::Amp(_) => Some(UnOp::AddrOf),
            Token::PlusPlus(_) => Some(UnOp::PreInc),
            Token::MinusMinus(_) => Some(UnOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = Box::new(self.parse_unary()?);
            return Ok(AstNode::UnaryOp {
                op,
                operand,
                location: loc,
            });
        }

        if self.match_token(&Token::Sizeof(loc)) {
            return self.parse_sizeof(loc);
        }

        // Cast: `(` followed by a type keyword
        if self.check(&Token::LParen(loc)) && self.peek_ahead(1).is_some_and(is_type_token) {
            self.advance(); // consume '('
            let target_type = self.parse_base_type()?;
            let pointer_level = self.parse_pointer_level();
            self.expect_rparen("after cast type")?;
            let expr = Box::new(self.parse_unary()?);
            return Ok(AstNode::TypeCast {
                target_type,
                pointer_level,
                expr,
                location: loc,
            });
        }

        self.parse_postfix()
    }

    /// Parse the operand of `sizeof`, which is discarded
    fn parse_sizeof(&mut self, loc: SourceLocation) -> Result<AstNode, ParseError> {
        if self.check(&Token::LParen(self.current_location()))
            && self.peek_ahead(1).is_some_and(is_type_token)
        {
            self.advance(); // consume '('
            self.parse_base_type()?;
            self.parse_pointer_level();
            self.expect_rparen("after sizeof type")?;
        } else {
            self.parse_unary()?;
        }

        Ok(AstNode::Literal(Literal::Int(SIZEOF_VALUE), loc))
    }

    /// Parse postfix (++ -- [] ())
    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();

            if self.match_token(&Token::PlusPlus(loc)) {
                expr = AstNode::PostfixOp {
                    operand: Box::new(expr),
                    op: PostOp::Inc,
                    location: loc,
                };
            } else if self.match_token(&Token::MinusMinus(loc)) {
                expr = AstNode::PostfixOp {
                    operand: Box::new(expr),
                    op: PostOp::Dec,
                    location: loc,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect_rbracket("after array index")?;
                expr = AstNode::ArrayAccess {
                    base: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.check(&Token::LParen(loc)) {
                let (name, call_loc) = match &expr {
                    AstNode::Identifier(name, call_loc) => (name.clone(), *call_loc),
                    _ => {
                        return Err(ParseError::new(
                            "Function call must be on identifier",
                            loc,
                        ));
                    }
                };
                self.advance(); // consume '('
                let args = self.parse_argument_list()?;
                self.expect_rparen("after function arguments")?;
                expr = AstNode::FunctionCall {
                    name,
                    args,
                    location: call_loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse argument list: (expr, expr, ...)
    fn parse_argument_list(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse primary (literals, identifiers, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::IntLiteral(n, _) => {
                self.advance();
                Ok(AstNode::Literal(Literal::Int(n), loc))
            }
            Token::FloatLiteral(f, _) => {
                self.advance();
                Ok(AstNode::Literal(Literal::Float(f), loc))
            }
            Token::CharLiteral(c, _) => {
                self.advance();
                Ok(AstNode::Literal(Literal::Char(c), loc))
            }
            Token::StringLiteral(mut s, _) => {
                self.advance();
                // Adjacent string literals concatenate
                while let Token::StringLiteral(next, _) = self.peek_token() {
                    self.advance();
                    s.push_str(&next);
                }
                Ok(AstNode::Literal(Literal::Str(s), loc))
            }
            Token::Null(_) => {
                self.advance();
                Ok(AstNode::Literal(Literal::Int(0), loc))
            }
            Token::Ident(name, _) => {
                self.advance();
                Ok(AstNode::Identifier(name, loc))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(expr)
            }
            other => Err(ParseError::new(
                format!("Unexpected token: {}", other),
                loc,
            )),
        }
    }
}
