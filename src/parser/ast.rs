// AST (Abstract Syntax Tree) definitions for the C interpreter

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Base types supported by the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Float,
    Double,
    Char,
    Void,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaseType::Int => "int",
            BaseType::Float => "float",
            BaseType::Double => "double",
            BaseType::Char => "char",
            BaseType::Void => "void",
        };
        f.write_str(name)
    }
}

/// Literal payloads produced by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Char(u8),
    Str(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }
}

/// Prefix unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,    // -x
    Plus,   // +x
    Not,    // !x
    BitNot, // ~x
    PreInc, // ++x
    PreDec, // --x
    Deref,  // *x
    AddrOf, // &x
}

/// Postfix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOp {
    Inc, // x++
    Dec, // x--
}

/// Assignment operators, plain and compound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    /// The arithmetic operator a compound assignment applies, if any
    pub fn binary_op(&self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinOp::Add),
            AssignOp::Sub => Some(BinOp::Sub),
            AssignOp::Mul => Some(BinOp::Mul),
            AssignOp::Div => Some(BinOp::Div),
            AssignOp::Mod => Some(BinOp::Mod),
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub param_type: BaseType,
    pub name: String,
    pub pointer_level: usize,
}

/// AST nodes representing statements and expressions
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    // Expressions
    Literal(Literal, SourceLocation),
    Identifier(String, SourceLocation),
    BinaryOp {
        left: Box<AstNode>,
        op: BinOp,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<AstNode>,
        location: SourceLocation,
    },
    PostfixOp {
        operand: Box<AstNode>,
        op: PostOp,
        location: SourceLocation,
    },
    FunctionCall {
        name: String,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
    ArrayAccess {
        base: Box<AstNode>,
        index: Box<AstNode>,
        location: SourceLocation,
    },
    ArrayInitializer {
        elements: Vec<AstNode>,
        location: SourceLocation,
    },
    TypeCast {
        target_type: BaseType,
        pointer_level: usize,
        expr: Box<AstNode>,
        location: SourceLocation,
    },

    // Statements
    Declaration {
        var_type: BaseType,
        name: String,
        pointer_level: usize,
        dimensions: Vec<AstNode>,
        init: Option<Box<AstNode>>,
        initializer_list: Option<Box<AstNode>>,
        location: SourceLocation,
    },
    Assignment {
        target: Box<AstNode>,
        op: AssignOp,
        value: Box<AstNode>,
        location: SourceLocation,
    },
    If {
        condition: Box<AstNode>,
        then_branch: Box<AstNode>,
        else_branch: Option<Box<AstNode>>,
        location: SourceLocation,
    },
    While {
        condition: Box<AstNode>,
        body: Box<AstNode>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<AstNode>>,
        condition: Option<Box<AstNode>>,
        update: Option<Box<AstNode>>,
        body: Box<AstNode>,
        location: SourceLocation,
    },
    Return {
        expr: Option<Box<AstNode>>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    /// `scoped` is true for a braced `{ ... }`; a group of comma-separated
    /// declarators is an unscoped block that binds into the enclosing frame.
    Block {
        statements: Vec<AstNode>,
        scoped: bool,
        location: SourceLocation,
    },
    ExpressionStatement {
        expr: Box<AstNode>,
        location: SourceLocation,
    },
    FunctionDef {
        return_type: BaseType,
        name: String,
        params: Vec<Param>,
        body: Box<AstNode>,
        location: SourceLocation,
    },
    PreprocessorDirective {
        name: String,
        value: String,
        location: SourceLocation,
    },
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> SourceLocation {
        match self {
            AstNode::Literal(_, loc) | AstNode::Identifier(_, loc) => *loc,
            AstNode::BinaryOp { location, .. }
            | AstNode::UnaryOp { location, .. }
            | AstNode::PostfixOp { location, .. }
            | AstNode::FunctionCall { location, .. }
            | AstNode::ArrayAccess { location, .. }
            | AstNode::ArrayInitializer { location, .. }
            | AstNode::TypeCast { location, .. }
            | AstNode::Declaration { location, .. }
            | AstNode::Assignment { location, .. }
            | AstNode::If { location, .. }
            | AstNode::While { location, .. }
            | AstNode::For { location, .. }
            | AstNode::Return { location, .. }
            | AstNode::Break { location }
            | AstNode::Continue { location }
            | AstNode::Block { location, .. }
            | AstNode::ExpressionStatement { location, .. }
            | AstNode::FunctionDef { location, .. }
            | AstNode::PreprocessorDirective { location, .. } => *location,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<AstNode>, // Top-level statements, in source order
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
