//! Expression Converter
//!
//! Lowers binding expressions into output expressions against a binding
//! scope. Pipes become `pipeBindN` calls on their memoized slot, and array
//! or map literals become shared constants or `pureFunctionN` calls.
//!
//! Locals are read through their identifier. The locals that the consuming
//! function has to declare first are collected as captures.

use super::binding_scope::{BindingScope, ScopeEntry};
use crate::constant_pool::ConstantPool;
use crate::expression_parser::{Interpolation, LiteralValue, AST};
use crate::output::output_ast::{Expression, Literal, LiteralMapEntry, Statement};
use crate::render3::r3_identifiers::{Arity, Opcode, MAX_FIXED_PIPE_ARITY, MAX_FIXED_PURE_FUNCTION_ARITY};
use indexmap::IndexMap;

pub struct ExpressionConverter<'s> {
    scope: &'s BindingScope,
    /// Receiver of unqualified reads; `None` is the component context
    implicit_receiver: Option<Expression>,
    pipe_slots: &'s IndexMap<String, u32>,
    pool: &'s mut ConstantPool,
    /// Next free binding slot for pipes and pure functions
    next_var: &'s mut u32,
    /// Handlers run outside the update block and declare every local they read
    in_action: bool,
    captures: IndexMap<String, ScopeEntry>,
    errors: Vec<String>,
}

impl<'s> ExpressionConverter<'s> {
    pub fn new(
        scope: &'s BindingScope,
        implicit_receiver: Option<Expression>,
        pipe_slots: &'s IndexMap<String, u32>,
        pool: &'s mut ConstantPool,
        next_var: &'s mut u32,
    ) -> Self {
        ExpressionConverter {
            scope,
            implicit_receiver,
            pipe_slots,
            pool,
            next_var,
            in_action: false,
            captures: IndexMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    /// Locals read so far that the consuming function must declare, in
    /// order of first use.
    pub fn take_captures(&mut self) -> Vec<ScopeEntry> {
        std::mem::take(&mut self.captures).into_values().collect()
    }

    /// A value read in update mode.
    pub fn convert_binding(&mut self, ast: &AST) -> Expression {
        self.convert(ast, false)
    }

    /// The interpolation operands `[s0, e0, s1, ..., sN]`.
    pub fn convert_interpolation(&mut self, interpolation: &Interpolation) -> Vec<Expression> {
        let mut parts = Vec::with_capacity(interpolation.expressions.len() * 2 + 1);
        for (i, expr) in interpolation.expressions.iter().enumerate() {
            parts.push(Expression::str(interpolation.strings.get(i).cloned().unwrap_or_default()));
            parts.push(self.convert(expr, false));
        }
        parts.push(Expression::str(
            interpolation
                .strings
                .get(interpolation.expressions.len())
                .cloned()
                .unwrap_or_default(),
        ));
        parts
    }

    /// An event handler: one statement per chained expression. Literals stay
    /// inline since handlers run once per event.
    pub fn convert_action(&mut self, ast: &AST) -> Vec<Statement> {
        self.in_action = true;
        match ast {
            AST::Chain(chain) => chain
                .expressions
                .iter()
                .map(|expr| Statement::Expression {
                    expr: self.convert(expr, true),
                })
                .collect(),
            _ => vec![Statement::Expression {
                expr: self.convert(ast, true),
            }],
        }
    }

    fn convert_all(&mut self, asts: &[AST], in_action: bool) -> Vec<Expression> {
        asts.iter().map(|ast| self.convert(ast, in_action)).collect()
    }

    fn convert(&mut self, ast: &AST, in_action: bool) -> Expression {
        match ast {
            AST::EmptyExpr(_) => Expression::Literal {
                value: Literal::Undefined,
            },
            AST::ImplicitReceiver(_) | AST::ThisReceiver(_) => {
                if let Some(receiver) = &self.implicit_receiver {
                    return receiver.clone();
                }
                self.read_local(&ScopeEntry::component())
            }
            AST::Chain(chain) => {
                // Only actions chain; a chained binding keeps its last value.
                let mut converted = self.convert_all(&chain.expressions, in_action);
                converted.pop().unwrap_or_else(Expression::null)
            }
            AST::Conditional(cond) => Expression::conditional(
                self.convert(&cond.condition, in_action),
                self.convert(&cond.true_exp, in_action),
                self.convert(&cond.false_exp, in_action),
            ),
            AST::PropertyRead(read) => {
                if read.receiver.is_implicit_receiver() {
                    let scope = self.scope;
                    if let Some(entry) = scope.get(&read.name) {
                        return self.read_local(entry);
                    }
                }
                self.convert(&read.receiver, in_action).prop(&read.name)
            }
            AST::SafePropertyRead(read) => {
                let receiver = self.convert(&read.receiver, in_action);
                guard_null(receiver.clone(), receiver.prop(&read.name))
            }
            AST::KeyedRead(read) => {
                let receiver = self.convert(&read.receiver, in_action);
                receiver.key(self.convert(&read.key, in_action))
            }
            AST::SafeKeyedRead(read) => {
                let receiver = self.convert(&read.receiver, in_action);
                let key = self.convert(&read.key, in_action);
                guard_null(receiver.clone(), receiver.key(key))
            }
            AST::PropertyWrite(write) => {
                if write.receiver.is_implicit_receiver() && self.scope.get(&write.name).is_some() {
                    self.errors
                        .push(format!("Cannot assign to a reference or variable: \"{}\"", write.name));
                }
                Expression::WriteProp {
                    receiver: Box::new(self.convert(&write.receiver, in_action)),
                    name: write.name.clone(),
                    value: Box::new(self.convert(&write.value, in_action)),
                }
            }
            AST::KeyedWrite(write) => Expression::WriteKey {
                receiver: Box::new(self.convert(&write.receiver, in_action)),
                index: Box::new(self.convert(&write.key, in_action)),
                value: Box::new(self.convert(&write.value, in_action)),
            },
            AST::BindingPipe(pipe) => {
                let mut args = vec![self.convert(&pipe.exp, in_action)];
                args.extend(self.convert_all(&pipe.args, in_action));
                self.pipe_bind(&pipe.name, args)
            }
            AST::LiteralPrimitive(primitive) => Expression::Literal {
                value: match &primitive.value {
                    LiteralValue::String(s) => Literal::Str(s.clone()),
                    LiteralValue::Number(n) => Literal::Number(*n),
                    LiteralValue::Boolean(b) => Literal::Bool(*b),
                    LiteralValue::Null => Literal::Null,
                    LiteralValue::Undefined => Literal::Undefined,
                },
            },
            AST::LiteralArray(array) => {
                let literal = Expression::LiteralArray {
                    entries: self.convert_all(&array.expressions, in_action),
                };
                self.literal(literal, in_action)
            }
            AST::LiteralMap(map) => {
                let entries = map
                    .keys
                    .iter()
                    .zip(&map.values)
                    .map(|(key, value)| LiteralMapEntry {
                        key: key.key.clone(),
                        quoted: key.quoted,
                        value: self.convert(value, in_action),
                    })
                    .collect();
                self.literal(Expression::LiteralMap { entries }, in_action)
            }
            AST::Interpolation(interpolation) => {
                // Outside attribute/text position an interpolation is a string concatenation.
                self.convert_interpolation(interpolation)
                    .into_iter()
                    .reduce(|left, right| Expression::binary("+", left, right))
                    .unwrap_or_else(|| Expression::str(""))
            }
            AST::Binary(binary) => Expression::binary(
                binary.operation.clone(),
                self.convert(&binary.left, in_action),
                self.convert(&binary.right, in_action),
            ),
            AST::PrefixNot(not) => Expression::Not {
                expr: Box::new(self.convert(&not.expression, in_action)),
            },
            AST::NonNullAssert(assert) => self.convert(&assert.expression, in_action),
            AST::Unary(unary) => Expression::Unary {
                operator: unary.operator.clone(),
                expr: Box::new(self.convert(&unary.expr, in_action)),
            },
            AST::Call(call) => {
                let receiver = self.convert(&call.receiver, in_action);
                receiver.call(self.convert_all(&call.args, in_action))
            }
            AST::SafeCall(call) => {
                let receiver = self.convert(&call.receiver, in_action);
                let args = self.convert_all(&call.args, in_action);
                guard_null(receiver.clone(), receiver.call(args))
            }
        }
    }

    fn read_local(&mut self, entry: &ScopeEntry) -> Expression {
        if entry.needs_declaration(self.scope.level(), self.in_action) && !self.captures.contains_key(&entry.name) {
            self.captures.insert(entry.name.clone(), entry.clone());
        }
        entry.read()
    }

    fn pipe_bind(&mut self, name: &str, args: Vec<Expression>) -> Expression {
        let slot = match self.pipe_slots.get(name) {
            Some(&slot) => slot,
            // Reported when the slot was allocated.
            None => return Expression::null(),
        };
        let offset = self.reserve_vars(1 + args.len() as u32);
        let arity = Arity::for_count(args.len(), MAX_FIXED_PIPE_ARITY);
        let mut call_args = vec![Expression::number(slot as f64), Expression::number(offset as f64)];
        if arity.is_variadic() {
            call_args.push(Expression::LiteralArray { entries: args });
        } else {
            call_args.extend(args);
        }
        Expression::Instruction {
            opcode: Opcode::PipeBind(arity),
            args: call_args,
        }
    }

    fn literal(&mut self, literal: Expression, in_action: bool) -> Expression {
        if in_action {
            return literal;
        }
        if literal.is_constant() {
            return Expression::Const {
                index: self.pool.get_const_literal(literal),
            };
        }
        let factory = self.pool.get_literal_factory(literal);
        let count = factory.arguments.len();
        let offset = self.reserve_vars(1 + count as u32);
        let arity = Arity::for_count(count, MAX_FIXED_PURE_FUNCTION_ARITY);
        let mut args = vec![
            Expression::number(offset as f64),
            Expression::Const {
                index: factory.factory,
            },
        ];
        if arity.is_variadic() {
            args.push(Expression::LiteralArray {
                entries: factory.arguments,
            });
        } else {
            args.extend(factory.arguments);
        }
        Expression::Instruction {
            opcode: Opcode::PureFunction(arity),
            args,
        }
    }

    fn reserve_vars(&mut self, count: u32) -> u32 {
        let offset = *self.next_var;
        *self.next_var += count;
        offset
    }
}

/// `receiver == null ? null : access`
fn guard_null(receiver: Expression, access: Expression) -> Expression {
    Expression::conditional(
        Expression::binary("==", receiver, Expression::null()),
        Expression::null(),
        access,
    )
}
