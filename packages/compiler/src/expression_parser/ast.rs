/**
 * Binding Expression AST
 *
 * Node types produced by the expression parser for property, event,
 * interpolation and template-binding expressions.
 */
use serde::{Deserialize, Serialize};
use std::fmt;

/// Span relative to the start of the parsed expression text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }

    pub fn to_absolute(&self, absolute_offset: usize) -> AbsoluteSourceSpan {
        AbsoluteSourceSpan::new(absolute_offset + self.start, absolute_offset + self.end)
    }
}

/// Span relative to the start of the template source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsoluteSourceSpan {
    pub start: usize,
    pub end: usize,
}

impl AbsoluteSourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        AbsoluteSourceSpan { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AST {
    EmptyExpr(EmptyExpr),
    ImplicitReceiver(ImplicitReceiver),
    ThisReceiver(ImplicitReceiver),
    Chain(Chain),
    Conditional(Conditional),
    PropertyRead(PropertyRead),
    SafePropertyRead(PropertyRead),
    KeyedRead(KeyedRead),
    SafeKeyedRead(KeyedRead),
    PropertyWrite(PropertyWrite),
    KeyedWrite(KeyedWrite),
    BindingPipe(BindingPipe),
    LiteralPrimitive(LiteralPrimitive),
    LiteralArray(LiteralArray),
    LiteralMap(LiteralMap),
    Interpolation(Interpolation),
    Binary(Binary),
    PrefixNot(PrefixNot),
    Unary(Unary),
    NonNullAssert(PrefixNot),
    Call(Call),
    SafeCall(Call),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyExpr {
    pub span: ParseSpan,
}

/// The component instance (or, inside host bindings, the directive instance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitReceiver {
    pub span: ParseSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub span: ParseSpan,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub span: ParseSpan,
    pub condition: Box<AST>,
    pub true_exp: Box<AST>,
    pub false_exp: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRead {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRead {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyWrite {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub name: String,
    pub value: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedWrite {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
    pub value: Box<AST>,
}

/// `exp | name:arg1:arg2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingPipe {
    pub span: ParseSpan,
    pub exp: Box<AST>,
    pub name: String,
    pub args: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralPrimitive {
    pub span: ParseSpan,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralArray {
    pub span: ParseSpan,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralMapKey {
    pub key: String,
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralMap {
    pub span: ParseSpan,
    pub keys: Vec<LiteralMapKey>,
    pub values: Vec<AST>,
}

/// Interpolated text: `strings.len() == expressions.len() + 1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    pub span: ParseSpan,
    pub strings: Vec<String>,
    pub expressions: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub span: ParseSpan,
    pub operation: String,
    pub left: Box<AST>,
    pub right: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixNot {
    pub span: ParseSpan,
    pub expression: Box<AST>,
}

/// `-expr` or `+expr`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub span: ParseSpan,
    pub operator: String,
    pub expr: Box<AST>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub args: Vec<AST>,
}

impl AST {
    pub fn span(&self) -> ParseSpan {
        match self {
            AST::EmptyExpr(e) => e.span,
            AST::ImplicitReceiver(r) | AST::ThisReceiver(r) => r.span,
            AST::Chain(c) => c.span,
            AST::Conditional(c) => c.span,
            AST::PropertyRead(p) | AST::SafePropertyRead(p) => p.span,
            AST::KeyedRead(k) | AST::SafeKeyedRead(k) => k.span,
            AST::PropertyWrite(p) => p.span,
            AST::KeyedWrite(k) => k.span,
            AST::BindingPipe(p) => p.span,
            AST::LiteralPrimitive(l) => l.span,
            AST::LiteralArray(a) => a.span,
            AST::LiteralMap(m) => m.span,
            AST::Interpolation(i) => i.span,
            AST::Binary(b) => b.span,
            AST::PrefixNot(p) | AST::NonNullAssert(p) => p.span,
            AST::Unary(u) => u.span,
            AST::Call(c) | AST::SafeCall(c) => c.span,
        }
    }

    pub fn is_implicit_receiver(&self) -> bool {
        matches!(self, AST::ImplicitReceiver(_) | AST::ThisReceiver(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AST::EmptyExpr(_))
    }

    pub fn string_literal(span: ParseSpan, value: impl Into<String>) -> AST {
        AST::LiteralPrimitive(LiteralPrimitive {
            span,
            value: LiteralValue::String(value.into()),
        })
    }

    /// Walks the tree depth-first, calling `f` on every node.
    pub fn walk(&self, f: &mut dyn FnMut(&AST)) {
        f(self);
        match self {
            AST::EmptyExpr(_)
            | AST::ImplicitReceiver(_)
            | AST::ThisReceiver(_)
            | AST::LiteralPrimitive(_) => {}
            AST::Chain(c) => c.expressions.iter().for_each(|e| e.walk(f)),
            AST::Conditional(c) => {
                c.condition.walk(f);
                c.true_exp.walk(f);
                c.false_exp.walk(f);
            }
            AST::PropertyRead(p) | AST::SafePropertyRead(p) => p.receiver.walk(f),
            AST::KeyedRead(k) | AST::SafeKeyedRead(k) => {
                k.receiver.walk(f);
                k.key.walk(f);
            }
            AST::PropertyWrite(p) => {
                p.receiver.walk(f);
                p.value.walk(f);
            }
            AST::KeyedWrite(k) => {
                k.receiver.walk(f);
                k.key.walk(f);
                k.value.walk(f);
            }
            AST::BindingPipe(p) => {
                p.exp.walk(f);
                p.args.iter().for_each(|a| a.walk(f));
            }
            AST::LiteralArray(a) => a.expressions.iter().for_each(|e| e.walk(f)),
            AST::LiteralMap(m) => m.values.iter().for_each(|v| v.walk(f)),
            AST::Interpolation(i) => i.expressions.iter().for_each(|e| e.walk(f)),
            AST::Binary(b) => {
                b.left.walk(f);
                b.right.walk(f);
            }
            AST::PrefixNot(p) | AST::NonNullAssert(p) => p.expression.walk(f),
            AST::Unary(u) => u.expr.walk(f),
            AST::Call(c) | AST::SafeCall(c) => {
                c.receiver.walk(f);
                c.args.iter().for_each(|a| a.walk(f));
            }
        }
    }
}

/// Unparses the tree back into expression text.
impl fmt::Display for AST {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn receiver(f: &mut fmt::Formatter<'_>, ast: &AST, op: &str) -> fmt::Result {
            if ast.is_implicit_receiver() {
                Ok(())
            } else {
                write!(f, "{}{}", ast, op)
            }
        }
        fn list(f: &mut fmt::Formatter<'_>, items: &[AST]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }

        match self {
            AST::EmptyExpr(_) | AST::ImplicitReceiver(_) => Ok(()),
            AST::ThisReceiver(_) => f.write_str("this"),
            AST::Chain(c) => {
                for (i, e) in c.expressions.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
            AST::Conditional(c) => {
                write!(f, "{} ? {} : {}", c.condition, c.true_exp, c.false_exp)
            }
            AST::PropertyRead(p) => {
                receiver(f, &p.receiver, ".")?;
                f.write_str(&p.name)
            }
            AST::SafePropertyRead(p) => write!(f, "{}?.{}", p.receiver, p.name),
            AST::KeyedRead(k) => write!(f, "{}[{}]", k.receiver, k.key),
            AST::SafeKeyedRead(k) => write!(f, "{}?.[{}]", k.receiver, k.key),
            AST::PropertyWrite(p) => {
                receiver(f, &p.receiver, ".")?;
                write!(f, "{} = {}", p.name, p.value)
            }
            AST::KeyedWrite(k) => write!(f, "{}[{}] = {}", k.receiver, k.key, k.value),
            AST::BindingPipe(p) => {
                write!(f, "({} | {}", p.exp, p.name)?;
                for arg in &p.args {
                    write!(f, ":{}", arg)?;
                }
                f.write_str(")")
            }
            AST::LiteralPrimitive(l) => match &l.value {
                LiteralValue::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
                LiteralValue::Number(n) => write!(f, "{}", n),
                LiteralValue::Boolean(b) => write!(f, "{}", b),
                LiteralValue::Null => f.write_str("null"),
                LiteralValue::Undefined => f.write_str("undefined"),
            },
            AST::LiteralArray(a) => {
                f.write_str("[")?;
                list(f, &a.expressions)?;
                f.write_str("]")
            }
            AST::LiteralMap(m) => {
                f.write_str("{")?;
                for (i, (key, value)) in m.keys.iter().zip(&m.values).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if key.quoted {
                        write!(f, "\"{}\": {}", key.key, value)?;
                    } else {
                        write!(f, "{}: {}", key.key, value)?;
                    }
                }
                f.write_str("}")
            }
            AST::Interpolation(i) => {
                for (idx, s) in i.strings.iter().enumerate() {
                    f.write_str(s)?;
                    if let Some(e) = i.expressions.get(idx) {
                        write!(f, "{{{{ {} }}}}", e)?;
                    }
                }
                Ok(())
            }
            AST::Binary(b) => write!(f, "{} {} {}", b.left, b.operation, b.right),
            AST::PrefixNot(p) => write!(f, "!{}", p.expression),
            AST::NonNullAssert(p) => write!(f, "{}!", p.expression),
            AST::Unary(u) => write!(f, "{}{}", u.operator, u.expr),
            AST::Call(c) => {
                write!(f, "{}(", c.receiver)?;
                list(f, &c.args)?;
                f.write_str(")")
            }
            AST::SafeCall(c) => {
                write!(f, "{}?.(", c.receiver)?;
                list(f, &c.args)?;
                f.write_str(")")
            }
        }
    }
}

/// A parsed expression together with the text it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ASTWithSource {
    pub ast: AST,
    pub source: String,
    pub location: String,
    pub absolute_offset: usize,
}

impl ASTWithSource {
    pub fn new(ast: AST, source: impl Into<String>, location: impl Into<String>, absolute_offset: usize) -> Self {
        ASTWithSource {
            ast,
            source: source.into(),
            location: location.into(),
            absolute_offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBindingIdentifier {
    pub source: String,
    pub span: AbsoluteSourceSpan,
}

/// One entry of a structural micro-syntax: `let item = $implicit` or `ngForOf items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TemplateBinding {
    Variable {
        span: AbsoluteSourceSpan,
        key: TemplateBindingIdentifier,
        value: Option<TemplateBindingIdentifier>,
    },
    Expression {
        span: AbsoluteSourceSpan,
        key: TemplateBindingIdentifier,
        value: Option<ASTWithSource>,
    },
}

impl TemplateBinding {
    pub fn key(&self) -> &TemplateBindingIdentifier {
        match self {
            TemplateBinding::Variable { key, .. } | TemplateBinding::Expression { key, .. } => key,
        }
    }
}
