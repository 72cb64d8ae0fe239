//! Output AST
//!
//! The compiled program: slot-addressed instructions grouped into template
//! functions, plus the output expressions that appear in their operands.

use crate::constant_pool::ConstantPool;
use crate::render3::r3_identifiers::Opcode;
use serde::Serialize;
use smallvec::SmallVec;

//// Expressions

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralMapEntry {
    pub key: String,
    pub quoted: bool,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Expression {
    Literal { value: Literal },
    ReadVar { name: String },
    ReadProp { receiver: Box<Expression>, name: String },
    ReadKey { receiver: Box<Expression>, index: Box<Expression> },
    WriteVar { name: String, value: Box<Expression> },
    WriteProp { receiver: Box<Expression>, name: String, value: Box<Expression> },
    WriteKey { receiver: Box<Expression>, index: Box<Expression>, value: Box<Expression> },
    Call { receiver: Box<Expression>, args: Vec<Expression> },
    /// A runtime helper used inside a binding value: `pipeBind1(...)`
    Instruction { opcode: Opcode, args: Vec<Expression> },
    Binary { operator: String, left: Box<Expression>, right: Box<Expression> },
    Not { expr: Box<Expression> },
    Unary { operator: String, expr: Box<Expression> },
    Conditional { condition: Box<Expression>, true_case: Box<Expression>, false_case: Box<Expression> },
    LiteralArray { entries: Vec<Expression> },
    LiteralMap { entries: Vec<LiteralMapEntry> },
    /// Entry of the shared constant pool
    Const { index: u32 },
    /// A directive, component or pipe type
    External { name: String },
    Fn { params: Vec<String>, body: Vec<Statement> },
}

impl Expression {
    pub fn null() -> Expression {
        Expression::Literal { value: Literal::Null }
    }

    pub fn str(value: impl Into<String>) -> Expression {
        Expression::Literal {
            value: Literal::Str(value.into()),
        }
    }

    pub fn number(value: f64) -> Expression {
        Expression::Literal {
            value: Literal::Number(value),
        }
    }

    pub fn var(name: impl Into<String>) -> Expression {
        Expression::ReadVar { name: name.into() }
    }

    pub fn prop(self, name: impl Into<String>) -> Expression {
        Expression::ReadProp {
            receiver: Box::new(self),
            name: name.into(),
        }
    }

    pub fn key(self, index: Expression) -> Expression {
        Expression::ReadKey {
            receiver: Box::new(self),
            index: Box::new(index),
        }
    }

    pub fn call(self, args: Vec<Expression>) -> Expression {
        Expression::Call {
            receiver: Box::new(self),
            args,
        }
    }

    pub fn binary(operator: impl Into<String>, left: Expression, right: Expression) -> Expression {
        Expression::Binary {
            operator: operator.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn conditional(condition: Expression, true_case: Expression, false_case: Expression) -> Expression {
        Expression::Conditional {
            condition: Box::new(condition),
            true_case: Box::new(true_case),
            false_case: Box::new(false_case),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal { .. })
    }

    /// Whether the value is known at compile time: literals, and arrays or
    /// maps built only from such values.
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal { .. } | Expression::Const { .. } | Expression::External { .. } => true,
            Expression::LiteralArray { entries } => entries.iter().all(Expression::is_constant),
            Expression::LiteralMap { entries } => entries.iter().all(|e| e.value.is_constant()),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Statement {
    Expression { expr: Expression },
    Return { value: Expression },
    DeclareVar { name: String, value: Expression },
}

//// Instructions

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Operand {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Slot(u32),
    Const(u32),
    /// A type name emitted as a reference
    Type(String),
    Expr(Expression),
    Statements(Vec<Statement>),
    /// Name of a nested template function
    Template(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub slot: Option<u32>,
    pub operands: SmallVec<[Operand; 4]>,
}

impl Instruction {
    pub fn new(opcode: Opcode, slot: Option<u32>) -> Self {
        Instruction {
            opcode,
            slot,
            operands: SmallVec::new(),
        }
    }

    pub fn at(opcode: Opcode, slot: u32) -> Self {
        Instruction::new(opcode, Some(slot))
    }

    pub fn with(mut self, operand: Operand) -> Self {
        self.operands.push(operand);
        self
    }

    pub fn with_all(mut self, operands: impl IntoIterator<Item = Operand>) -> Self {
        self.operands.extend(operands);
        self
    }
}

/// Host bindings of one directive, run in update mode against its host element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostBindings {
    pub directive_slot: u32,
    pub element_slot: u32,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateFunction {
    pub name: String,
    /// Name of the context parameter
    pub context: String,
    pub creation: Vec<Instruction>,
    pub update: Vec<Instruction>,
    pub host: Vec<HostBindings>,
    /// Nested template functions, emitted after this one
    pub postfix: Vec<TemplateFunction>,
    /// Slots allocated at this level
    pub decls: u32,
    /// Binding slots consumed at this level
    pub vars: u32,
}

impl TemplateFunction {
    /// Every function of the program, this one first, depth-first.
    pub fn functions(&self) -> Vec<&TemplateFunction> {
        let mut all = vec![self];
        for nested in &self.postfix {
            all.extend(nested.functions());
        }
        all
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateProgram {
    /// Type name of the compiled component
    pub component: String,
    pub root: TemplateFunction,
    pub constants: ConstantPool,
    pub ng_content_selectors: Vec<String>,
}
