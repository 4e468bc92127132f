// src/core/ast.rs
//! Abstract syntax tree for the Python-like front end.
//!
//! A closed sum type: traversals are plain `match` expressions, so adding
//! a variant breaks every walker at compile time. Each node owns its
//! children exclusively and carries the source line it started on.

/// All node kinds: the program root, statements, expressions, and the
/// helper nodes the parser builds for parameters, keyword arguments,
/// import names, and exception handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Program {
        body: Vec<AstNode>,
        line: usize,
    },
    Block {
        statements: Vec<AstNode>,
        line: usize,
    },

    // Statements
    FunctionDef {
        name: String,
        params: Vec<AstNode>,
        returns: Option<Box<AstNode>>,
        body: Box<AstNode>,
        line: usize,
    },
    ClassDef {
        name: String,
        bases: Vec<AstNode>,
        body: Box<AstNode>,
        line: usize,
    },
    If {
        condition: Box<AstNode>,
        then_block: Box<AstNode>,
        elif_clauses: Vec<(AstNode, AstNode)>,
        else_block: Option<Box<AstNode>>,
        line: usize,
    },
    While {
        condition: Box<AstNode>,
        body: Box<AstNode>,
        line: usize,
    },
    For {
        target: Box<AstNode>,
        iterable: Box<AstNode>,
        body: Box<AstNode>,
        line: usize,
    },
    Try {
        body: Box<AstNode>,
        handlers: Vec<AstNode>,
        else_block: Option<Box<AstNode>>,
        finally_block: Option<Box<AstNode>>,
        line: usize,
    },
    Return {
        value: Option<Box<AstNode>>,
        line: usize,
    },
    Raise {
        exc: Option<Box<AstNode>>,
        line: usize,
    },
    Import {
        names: Vec<AstNode>,
        line: usize,
    },
    ImportFrom {
        module: String,
        names: Vec<AstNode>,
        wildcard: bool,
        line: usize,
    },
    Global {
        names: Vec<String>,
        line: usize,
    },
    Nonlocal {
        names: Vec<String>,
        line: usize,
    },
    Pass {
        line: usize,
    },
    Break {
        line: usize,
    },
    Continue {
        line: usize,
    },
    Assign {
        targets: Vec<AstNode>,
        value: Box<AstNode>,
        line: usize,
    },
    AugAssign {
        target: Box<AstNode>,
        op: String,
        value: Box<AstNode>,
        line: usize,
    },
    ExprStmt {
        value: Box<AstNode>,
        line: usize,
    },

    // Expressions
    BoolOp {
        op: String,
        left: Box<AstNode>,
        right: Box<AstNode>,
        line: usize,
    },
    UnaryOp {
        op: String,
        operand: Box<AstNode>,
        line: usize,
    },
    Comparison {
        op: String,
        left: Box<AstNode>,
        right: Box<AstNode>,
        line: usize,
    },
    BinaryOp {
        op: String,
        left: Box<AstNode>,
        right: Box<AstNode>,
        line: usize,
    },
    Call {
        callee: Box<AstNode>,
        args: Vec<AstNode>,
        line: usize,
    },
    Attribute {
        object: Box<AstNode>,
        name: String,
        line: usize,
    },
    Subscript {
        object: Box<AstNode>,
        index: Box<AstNode>,
        line: usize,
    },
    Name {
        name: String,
        line: usize,
    },
    NumberLiteral {
        value: String,
        line: usize,
    },
    StringLiteral {
        value: String,
        line: usize,
    },
    BoolLiteral {
        value: bool,
        line: usize,
    },
    NoneLiteral {
        line: usize,
    },
    TupleLiteral {
        elements: Vec<AstNode>,
        line: usize,
    },
    ListLiteral {
        elements: Vec<AstNode>,
        line: usize,
    },
    DictLiteral {
        pairs: Vec<(AstNode, AstNode)>,
        line: usize,
    },
    SetLiteral {
        elements: Vec<AstNode>,
        line: usize,
    },

    // Helper nodes
    Parameter {
        name: String,
        default: Option<Box<AstNode>>,
        line: usize,
    },
    KeywordArg {
        name: String,
        value: Box<AstNode>,
        line: usize,
    },
    ImportAlias {
        name: String,
        alias: Option<String>,
        line: usize,
    },
    ExceptHandler {
        exc_type: Option<Box<AstNode>>,
        alias: Option<String>,
        body: Box<AstNode>,
        line: usize,
    },
}

impl AstNode {
    /// Stable variant name used for diagnostics and graph labels.
    pub fn node_name(&self) -> &'static str {
        use AstNode::*;
        match self {
            Program { .. } => "Program",
            Block { .. } => "Block",
            FunctionDef { .. } => "FunctionDef",
            ClassDef { .. } => "ClassDef",
            If { .. } => "If",
            While { .. } => "While",
            For { .. } => "For",
            Try { .. } => "Try",
            Return { .. } => "Return",
            Raise { .. } => "Raise",
            Import { .. } => "Import",
            ImportFrom { .. } => "ImportFrom",
            Global { .. } => "Global",
            Nonlocal { .. } => "Nonlocal",
            Pass { .. } => "Pass",
            Break { .. } => "Break",
            Continue { .. } => "Continue",
            Assign { .. } => "Assign",
            AugAssign { .. } => "AugAssign",
            ExprStmt { .. } => "ExprStmt",
            BoolOp { .. } => "BoolOp",
            UnaryOp { .. } => "UnaryOp",
            Comparison { .. } => "Comparison",
            BinaryOp { .. } => "BinaryOp",
            Call { .. } => "Call",
            Attribute { .. } => "Attribute",
            Subscript { .. } => "Subscript",
            Name { .. } => "Name",
            NumberLiteral { .. } => "NumberLiteral",
            StringLiteral { .. } => "StringLiteral",
            BoolLiteral { .. } => "BoolLiteral",
            NoneLiteral { .. } => "NoneLiteral",
            TupleLiteral { .. } => "TupleLiteral",
            ListLiteral { .. } => "ListLiteral",
            DictLiteral { .. } => "DictLiteral",
            SetLiteral { .. } => "SetLiteral",
            Parameter { .. } => "Parameter",
            KeywordArg { .. } => "KeywordArg",
            ImportAlias { .. } => "ImportAlias",
            ExceptHandler { .. } => "ExceptHandler",
        }
    }

    /// Source line the node started on.
    pub fn line(&self) -> usize {
        use AstNode::*;
        match self {
            Program { line, .. }
            | Block { line, .. }
            | FunctionDef { line, .. }
            | ClassDef { line, .. }
            | If { line, .. }
            | While { line, .. }
            | For { line, .. }
            | Try { line, .. }
            | Return { line, .. }
            | Raise { line, .. }
            | Import { line, .. }
            | ImportFrom { line, .. }
            | Global { line, .. }
            | Nonlocal { line, .. }
            | Pass { line }
            | Break { line }
            | Continue { line }
            | Assign { line, .. }
            | AugAssign { line, .. }
            | ExprStmt { line, .. }
            | BoolOp { line, .. }
            | UnaryOp { line, .. }
            | Comparison { line, .. }
            | BinaryOp { line, .. }
            | Call { line, .. }
            | Attribute { line, .. }
            | Subscript { line, .. }
            | Name { line, .. }
            | NumberLiteral { line, .. }
            | StringLiteral { line, .. }
            | BoolLiteral { line, .. }
            | NoneLiteral { line }
            | TupleLiteral { line, .. }
            | ListLiteral { line, .. }
            | DictLiteral { line, .. }
            | SetLiteral { line, .. }
            | Parameter { line, .. }
            | KeywordArg { line, .. }
            | ImportAlias { line, .. }
            | ExceptHandler { line, .. } => *line,
        }
    }

    pub fn new_bool_op(op: &str, left: AstNode, right: AstNode, line: usize) -> Self {
        AstNode::BoolOp {
            op: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
            line,
        }
    }

    pub fn new_comparison(op: &str, left: AstNode, right: AstNode, line: usize) -> Self {
        AstNode::Comparison {
            op: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
            line,
        }
    }

    pub fn new_binary(op: &str, left: AstNode, right: AstNode, line: usize) -> Self {
        AstNode::BinaryOp {
            op: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
            line,
        }
    }

    pub fn new_unary(op: &str, operand: AstNode, line: usize) -> Self {
        AstNode::UnaryOp {
            op: op.to_string(),
            operand: Box::new(operand),
            line,
        }
    }

    pub fn new_call(callee: AstNode, args: Vec<AstNode>, line: usize) -> Self {
        AstNode::Call {
            callee: Box::new(callee),
            args,
            line,
        }
    }

    pub fn new_attribute(object: AstNode, name: &str, line: usize) -> Self {
        AstNode::Attribute {
            object: Box::new(object),
            name: name.to_string(),
            line,
        }
    }

    pub fn new_subscript(object: AstNode, index: AstNode, line: usize) -> Self {
        AstNode::Subscript {
            object: Box::new(object),
            index: Box::new(index),
            line,
        }
    }

    pub fn new_name(name: &str, line: usize) -> Self {
        AstNode::Name {
            name: name.to_string(),
            line,
        }
    }
}
