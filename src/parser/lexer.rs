//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into [`Token`]s on demand. The parser pulls tokens
//! one at a time through [`Lexer::next_token`]; once the input is exhausted the
//! lexer keeps returning [`Token::Eof`].
//!
//! # Preprocessor lines
//!
//! A `#` line is not expanded. It becomes a single [`Token::Directive`] holding
//! the directive name and the rest of the line, so `#include <stdio.h>` lexes
//! to `Directive("include", "stdio.h")`.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    CharLiteral(u8, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Keywords
    Int(SourceLocation),
    Float(SourceLocation),
    Double(SourceLocation),
    Char(SourceLocation),
    Void(SourceLocation),
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    For(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    Return(SourceLocation),
    Sizeof(SourceLocation),
    Null(SourceLocation),

    // Preprocessor line: name and raw argument text
    Directive(String, String, SourceLocation),

    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEq(SourceLocation),  // ==
    NotEq(SourceLocation), // !=
    Lt(SourceLocation),    // <
    Le(SourceLocation),    // <=
    Gt(SourceLocation),    // >
    Ge(SourceLocation),    // >=

    // Logical
    AndAnd(SourceLocation), // &&
    OrOr(SourceLocation),   // ||
    Bang(SourceLocation),   // !

    // Bitwise
    Amp(SourceLocation),   // &
    Pipe(SourceLocation),  // |
    Caret(SourceLocation), // ^
    Tilde(SourceLocation), // ~
    LtLt(SourceLocation),  // <<
    GtGt(SourceLocation),  // >>

    // Assignment
    Eq(SourceLocation),        // =
    PlusEq(SourceLocation),    // +=
    MinusEq(SourceLocation),   // -=
    StarEq(SourceLocation),    // *=
    SlashEq(SourceLocation),   // /=
    PercentEq(SourceLocation), // %=

    // Increment/Decrement
    PlusPlus(SourceLocation),   // ++
    MinusMinus(SourceLocation), // --

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::FloatLiteral(_, loc)
            | Token::CharLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Directive(_, _, loc)
            | Token::Int(loc)
            | Token::Float(loc)
            | Token::Double(loc)
            | Token::Char(loc)
            | Token::Void(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::For(loc)
            | Token::Break(loc)
            | Token::Continue(loc)
            | Token::Return(loc)
            | Token::Sizeof(loc)
            | Token::Null(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::Bang(loc)
            | Token::Amp(loc)
            | Token::Pipe(loc)
            | Token::Caret(loc)
            | Token::Tilde(loc)
            | Token::LtLt(loc)
            | Token::GtGt(loc)
            | Token::Eq(loc)
            | Token::PlusEq(loc)
            | Token::MinusEq(loc)
            | Token::StarEq(loc)
            | Token::SlashEq(loc)
            | Token::PercentEq(loc)
            | Token::PlusPlus(loc)
            | Token::MinusMinus(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "int literal {}", n),
            Token::FloatLiteral(n, _) => write!(f, "float literal {}", n),
            Token::CharLiteral(c, _) => {
                if c.is_ascii_graphic() || *c == b' ' {
                    write!(f, "char literal '{}'", *c as char)
                } else {
                    write!(f, "char literal '\\x{:02x}'", c)
                }
            }
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Directive(name, _, _) => write!(f, "directive '#{}'", name),
            Token::Int(_) => write!(f, "'int'"),
            Token::Float(_) => write!(f, "'float'"),
            Token::Double(_) => write!(f, "'double'"),
            Token::Char(_) => write!(f, "'char'"),
            Token::Void(_) => write!(f, "'void'"),
            Token::If(_) => write!(f, "'if'"),
            Token::Else(_) => write!(f, "'else'"),
            Token::While(_) => write!(f, "'while'"),
            Token::For(_) => write!(f, "'for'"),
            Token::Break(_) => write!(f, "'break'"),
            Token::Continue(_) => write!(f, "'continue'"),
            Token::Return(_) => write!(f, "'return'"),
            Token::Sizeof(_) => write!(f, "'sizeof'"),
            Token::Null(_) => write!(f, "'NULL'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::AndAnd(_) => write!(f, "'&&'"),
            Token::OrOr(_) => write!(f, "'||'"),
            Token::Bang(_) => write!(f, "'!'"),
            Token::Amp(_) => write!(f, "'&'"),
            Token::Pipe(_) => write!(f, "'|'"),
            Token::Caret(_) => write!(f, "'^'"),
            Token::Tilde(_) => write!(f, "'~'"),
            Token::LtLt(_) => write!(f, "'<<'"),
            Token::GtGt(_) => write!(f, "'>>'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::PlusEq(_) => write!(f, "'+='"),
            Token::MinusEq(_) => write!(f, "'-='"),
            Token::StarEq(_) => write!(f, "'*='"),
            Token::SlashEq(_) => write!(f, "'/='"),
            Token::PercentEq(_) => write!(f, "'%='"),
            Token::PlusPlus(_) => write!(f, "'++'"),
            Token::MinusMinus(_) => write!(f, "'--'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of file"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lexer error at line {}, column {}: {message}", location.line, location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl LexError {
    fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input, ending with a single `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = matches!(token, Token::Eof(_));
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Pull the next token. Returns `Eof` forever once the input is consumed.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let loc = self.current_location();
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(Token::Eof(loc)),
        };

        match ch {
            '#' => self.directive(loc),

            // String literals
            '"' => self.string_literal(loc),

            // Character literals
            '\'' => self.char_literal(loc),

            // Numeric literals
            '0'..='9' => self.number_literal(ch, loc),

            // Identifiers and keywords
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, loc)),

            // Operators and punctuation
            '+' => Ok(if self.eat('+') {
                Token::PlusPlus(loc)
            } else if self.eat('=') {
                Token::PlusEq(loc)
            } else {
                Token::Plus(loc)
            }),
            '-' => Ok(if self.eat('-') {
                Token::MinusMinus(loc)
            } else if self.eat('=') {
                Token::MinusEq(loc)
            } else {
                Token::Minus(loc)
            }),
            '*' => Ok(if self.eat('=') {
                Token::StarEq(loc)
            } else {
                Token::Star(loc)
            }),
            '/' => Ok(if self.eat('=') {
                Token::SlashEq(loc)
            } else {
                Token::Slash(loc)
            }),
            '%' => Ok(if self.eat('=') {
                Token::PercentEq(loc)
            } else {
                Token::Percent(loc)
            }),
            '=' => Ok(if self.eat('=') {
                Token::EqEq(loc)
            } else {
                Token::Eq(loc)
            }),
            '!' => Ok(if self.eat('=') {
                Token::NotEq(loc)
            } else {
                Token::Bang(loc)
            }),
            '<' => Ok(if self.eat('=') {
                Token::Le(loc)
            } else if self.eat('<') {
                Token::LtLt(loc)
            } else {
                Token::Lt(loc)
            }),
            '>' => Ok(if self.eat('=') {
                Token::Ge(loc)
            } else if self.eat('>') {
                Token::GtGt(loc)
            } else {
                Token::Gt(loc)
            }),
            '&' => Ok(if self.eat('&') {
                Token::AndAnd(loc)
            } else {
                Token::Amp(loc)
            }),
            '|' => Ok(if self.eat('|') {
                Token::OrOr(loc)
            } else {
                Token::Pipe(loc)
            }),
            '^' => Ok(Token::Caret(loc)),
            '~' => Ok(Token::Tilde(loc)),
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            '[' => Ok(Token::LBracket(loc)),
            ']' => Ok(Token::RBracket(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),

            _ => Err(LexError::new(
                format!("Unexpected character: '{}'", ch),
                loc,
            )),
        }
    }

    /// Read the rest of a `#` line as `(name, value)`
    fn directive(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut line = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            line.push(ch);
            self.advance();
        }

        let line = line.trim();
        let (name, rest) = match line.find(char::is_whitespace) {
            Some(split) => (&line[..split], line[split..].trim()),
            None => (line, ""),
        };
        if name.is_empty() {
            return Err(LexError::new("Empty preprocessor directive", loc));
        }

        // `<stdio.h>` and `"local.h"` both name the header only
        let value = rest
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .or_else(|| rest.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
            .unwrap_or(rest);

        Ok(Token::Directive(name.to_string(), value.to_string(), loc))
    }

    /// Decode the character after a backslash
    fn escape_sequence(&mut self) -> Result<char, LexError> {
        let loc = self.current_location();
        let escaped = self
            .advance()
            .ok_or_else(|| LexError::new("Unexpected end of file in escape sequence", loc))?;

        let unescaped = match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '0' => '\0',
            'x' => {
                // Hex escape: \xHH
                let mut hex = String::new();
                while hex.len() < 2 {
                    match self.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            hex.push(c);
                            self.advance();
                        }
                        _ => break,
                    }
                }
                let byte = u8::from_str_radix(&hex, 16).map_err(|_| {
                    LexError::new(format!("Invalid hex escape sequence: \\x{}", hex), loc)
                })?;
                byte as char
            }
            other => {
                return Err(LexError::new(
                    format!("Unknown escape sequence: \\{}", other),
                    loc,
                ));
            }
        };
        Ok(unescaped)
    }

    /// Parse string literal
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance(); // consume closing quote
                    return Ok(Token::StringLiteral(string, loc));
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    string.push(self.escape_sequence()?);
                }
                _ => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new("Unterminated string literal", loc))
    }

    /// Parse character literal
    fn char_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let ch = self.advance().ok_or_else(|| {
            LexError::new("Unexpected end of file in character literal", loc)
        })?;

        let value = if ch == '\\' {
            self.escape_sequence()?
        } else {
            ch
        };

        if !self.eat('\'') {
            return Err(LexError::new(
                "Expected closing quote in character literal",
                self.current_location(),
            ));
        }

        Ok(Token::CharLiteral(value as u32 as u8, loc))
    }

    /// Parse numeric literal: decimal or hex integers, and decimals with a fraction
    fn number_literal(
        &mut self,
        first_digit: char,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        if first_digit == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            let mut hex = String::new();
            while let Some(ch) = self.peek().filter(|c| c.is_ascii_hexdigit()) {
                hex.push(ch);
                self.advance();
            }
            let value = i64::from_str_radix(&hex, 16).map_err(|_| {
                LexError::new(format!("Invalid hex literal: 0x{}", hex), loc)
            })?;
            return Ok(Token::IntLiteral(value, loc));
        }

        let mut num_str = String::new();
        num_str.push(first_digit);
        let mut is_float = false;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !is_float {
                is_float = true;
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Float suffix
        if is_float && matches!(self.peek(), Some('f') | Some('F')) {
            self.advance();
        }

        if is_float {
            let value = num_str.parse::<f64>().map_err(|_| {
                LexError::new(format!("Invalid float literal: {}", num_str), loc)
            })?;
            Ok(Token::FloatLiteral(value, loc))
        } else {
            let value = num_str.parse::<i64>().map_err(|_| {
                LexError::new(format!("Invalid integer literal: {}", num_str), loc)
            })?;
            Ok(Token::IntLiteral(value, loc))
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "int" => Token::Int(loc),
            "float" => Token::Float(loc),
            "double" => Token::Double(loc),
            "char" => Token::Char(loc),
            "void" => Token::Void(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "while" => Token::While(loc),
            "for" => Token::For(loc),
            "break" => Token::Break(loc),
            "continue" => Token::Continue(loc),
            "return" => Token::Return(loc),
            "sizeof" => Token::Sizeof(loc),
            "NULL" => Token::Null(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::new("Unterminated block comment", start_loc))
    }

    /// Consume the current character if it matches `expected`
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("int main() { return 0; }");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "main"));
        assert!(matches!(tokens[2], Token::LParen(_)));
        assert!(matches!(tokens[3], Token::RParen(_)));
        assert!(matches!(tokens[4], Token::LBrace(_)));
        assert!(matches!(tokens[5], Token::Return(_)));
        assert!(matches!(tokens[6], Token::IntLiteral(0, _)));
        assert!(matches!(tokens[7], Token::Semicolon(_)));
        assert!(matches!(tokens[8], Token::RBrace(_)));
        assert!(matches!(tokens[9], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("++ -- += -= == != && || << >> %=");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::PlusPlus(_)));
        assert!(matches!(tokens[1], Token::MinusMinus(_)));
        assert!(matches!(tokens[2], Token::PlusEq(_)));
        assert!(matches!(tokens[3], Token::MinusEq(_)));
        assert!(matches!(tokens[4], Token::EqEq(_)));
        assert!(matches!(tokens[5], Token::NotEq(_)));
        assert!(matches!(tokens[6], Token::AndAnd(_)));
        assert!(matches!(tokens[7], Token::OrOr(_)));
        assert!(matches!(tokens[8], Token::LtLt(_)));
        assert!(matches!(tokens[9], Token::GtGt(_)));
        assert!(matches!(tokens[10], Token::PercentEq(_)));
    }

    #[test]
    fn test_comments() {
        let mut lexer =
            Lexer::new("int x; // comment\nint y; /* block\ncomment */ int z;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Semicolon(_)));
        assert!(matches!(tokens[3], Token::Int(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
        assert!(matches!(tokens[5], Token::Semicolon(_)));
        assert!(matches!(tokens[6], Token::Int(_)));
        assert!(matches!(tokens[7], Token::Ident(ref s, _) if s == "z"));
    }

    #[test]
    fn test_string_literal_escapes() {
        let mut lexer = Lexer::new(r#""hello\n\tworld\x41""#);
        let tokens = lexer.tokenize().unwrap();

        match &tokens[0] {
            Token::StringLiteral(s, _) => assert_eq!(s, "hello\n\tworldA"),
            other => panic!("Expected string literal, got {}", other),
        }
    }

    #[test]
    fn test_char_literals() {
        let mut lexer = Lexer::new(r"'a' '\n' '\0' '\''");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::CharLiteral(b'a', _)));
        assert!(matches!(tokens[1], Token::CharLiteral(b'\n', _)));
        assert!(matches!(tokens[2], Token::CharLiteral(0, _)));
        assert!(matches!(tokens[3], Token::CharLiteral(b'\'', _)));
    }

    #[test]
    fn test_numbers() {
        let mut lexer = Lexer::new("42 3.14 2.5f 0x1F");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::IntLiteral(42, _)));
        assert!(matches!(tokens[1], Token::FloatLiteral(f, _) if (f - 3.14).abs() < 1e-9));
        assert!(matches!(tokens[2], Token::FloatLiteral(f, _) if (f - 2.5).abs() < 1e-9));
        assert!(matches!(tokens[3], Token::IntLiteral(31, _)));
    }

    #[test]
    fn test_directives() {
        let mut lexer = Lexer::new("#include <stdio.h>\n#define N 10\nint x;");
        let tokens = lexer.tokenize().unwrap();

        assert!(
            matches!(&tokens[0], Token::Directive(n, v, _) if n == "include" && v == "stdio.h")
        );
        assert!(matches!(&tokens[1], Token::Directive(n, v, _) if n == "define" && v == "N 10"));
        assert!(matches!(tokens[2], Token::Int(_)));
        assert_eq!(tokens[2].location().line, 3);
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x");
        assert!(matches!(lexer.next_token().unwrap(), Token::Ident(..)));
        assert!(matches!(lexer.next_token().unwrap(), Token::Eof(_)));
        assert!(matches!(lexer.next_token().unwrap(), Token::Eof(_)));
    }

    #[test]
    fn test_errors() {
        assert!(Lexer::new("\"open").tokenize().is_err());
        assert!(Lexer::new("/* never closed").tokenize().is_err());
        assert!(Lexer::new("int @").tokenize().is_err());
    }
}
