//! Static evaluation of metadata expressions.
//!
//! Metadata expressions are JSON values. Plain JSON evaluates to itself;
//! objects tagged with `__symbolic` describe references, operators and calls
//! that are folded here into plain values.

use super::bundle::MetadataBundle;
use crate::error::MetadataError;
use serde_json::{Map, Number, Value};
use tracing::trace;

const SYMBOLIC: &str = "__symbolic";

/// Metadata constructors whose single argument object is the evaluated value.
pub const METADATA_CONSTRUCTORS: &[&str] = &["Directive", "Component", "Pipe"];

pub struct StaticEvaluator<'a> {
    bundle: &'a MetadataBundle,
    /// `module#name` of every symbol currently being evaluated
    stack: Vec<String>,
}

impl<'a> StaticEvaluator<'a> {
    pub fn new(bundle: &'a MetadataBundle) -> Self {
        StaticEvaluator {
            bundle,
            stack: Vec::new(),
        }
    }

    /// Evaluates the exported symbol `name` of `module`.
    pub fn evaluate_symbol(&mut self, module: &str, name: &str) -> Result<Value, MetadataError> {
        let key = format!("{}#{}", module, name);
        if let Some(start) = self.stack.iter().position(|entry| entry == &key) {
            let mut chain = self.stack[start..].to_vec();
            chain.push(key);
            return Err(MetadataError::CircularReference { chain });
        }

        let metadata = self
            .bundle
            .modules
            .get(module)
            .ok_or_else(|| MetadataError::UnresolvedModule(module.to_string()))?;
        let value = match metadata.exports.get(name) {
            Some(value) => value,
            None if metadata.locals.iter().any(|local| local == name) => {
                return Err(MetadataError::NotAnalyzable {
                    symbol: key,
                    reason: "reference to a non-exported symbol".to_string(),
                })
            }
            None => {
                return Err(MetadataError::UnresolvedSymbol {
                    module: module.to_string(),
                    name: name.to_string(),
                })
            }
        };

        if symbolic_kind(value) == Some("class") {
            return Ok(Value::String(name.to_string()));
        }

        trace!(symbol = %key, "evaluating metadata symbol");
        self.stack.push(key);
        let result = self.evaluate(module, value);
        self.stack.pop();
        result
    }

    /// Evaluates `expr` in the context of `module`.
    pub fn evaluate(&mut self, module: &str, expr: &Value) -> Result<Value, MetadataError> {
        match expr {
            Value::Array(items) => items
                .iter()
                .map(|item| self.evaluate(module, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(object) => match symbolic_kind(expr) {
                None => {
                    let mut result = Map::new();
                    for (key, value) in object {
                        result.insert(key.clone(), self.evaluate(module, value)?);
                    }
                    Ok(Value::Object(result))
                }
                Some(kind) => self.evaluate_symbolic(module, kind, object),
            },
            _ => Ok(expr.clone()),
        }
    }

    fn evaluate_symbolic(&mut self, module: &str, kind: &str, object: &Map<String, Value>) -> Result<Value, MetadataError> {
        match kind {
            "reference" => {
                let name = object
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| self.not_analyzable(module, "reference without a name"))?;
                let target = object.get("module").and_then(Value::as_str).unwrap_or(module);
                self.evaluate_symbol(target, name)
            }
            "binop" => {
                let operator = string_field(object, "operator").unwrap_or_default();
                let left = self.evaluate(module, field(object, "left"))?;
                // `&&` and `||` short-circuit like the source language.
                match operator {
                    "&&" if !truthy(&left) => return Ok(left),
                    "||" if truthy(&left) => return Ok(left),
                    "&&" | "||" => return self.evaluate(module, field(object, "right")),
                    _ => {}
                }
                let right = self.evaluate(module, field(object, "right"))?;
                binary(operator, &left, &right)
                    .ok_or_else(|| self.not_analyzable(module, &format!("unsupported binary operator {}", operator)))
            }
            "pre" => {
                let operator = string_field(object, "operator").unwrap_or_default();
                let operand = self.evaluate(module, field(object, "operand"))?;
                match operator {
                    "!" => Ok(Value::Bool(!truthy(&operand))),
                    "-" => Ok(number(-to_number(&operand))),
                    "+" => Ok(number(to_number(&operand))),
                    "~" => Ok(number(!(to_number(&operand) as i64) as f64)),
                    _ => Err(self.not_analyzable(module, &format!("unsupported prefix operator {}", operator))),
                }
            }
            "if" => {
                let condition = self.evaluate(module, field(object, "condition"))?;
                let branch = if truthy(&condition) { "thenExpression" } else { "elseExpression" };
                self.evaluate(module, field(object, branch))
            }
            "select" => {
                let target = self.evaluate(module, field(object, "expression"))?;
                let member = string_field(object, "member").unwrap_or_default();
                Ok(target.get(member).cloned().unwrap_or(Value::Null))
            }
            "index" => {
                let target = self.evaluate(module, field(object, "expression"))?;
                let index = self.evaluate(module, field(object, "index"))?;
                let value = match (&target, &index) {
                    (Value::Array(items), Value::Number(n)) => {
                        n.as_u64().and_then(|i| items.get(i as usize)).cloned()
                    }
                    (Value::Object(map), Value::String(key)) => map.get(key).cloned(),
                    _ => None,
                };
                Ok(value.unwrap_or(Value::Null))
            }
            "call" => {
                let callee = field(object, "expression");
                let callee_name = match symbolic_kind(callee) {
                    Some("reference") => callee.get("name").and_then(Value::as_str),
                    _ => None,
                };
                match callee_name {
                    Some(name) if METADATA_CONSTRUCTORS.contains(&name) => {
                        let argument = object
                            .get("arguments")
                            .and_then(Value::as_array)
                            .and_then(|args| args.first())
                            .unwrap_or(&Value::Null);
                        self.evaluate(module, argument)
                    }
                    Some(name) => Err(self.not_analyzable(module, &format!("call to function {} is not supported", name))),
                    None => Err(self.not_analyzable(module, "function calls are not supported")),
                }
            }
            "error" => {
                let message = string_field(object, "message").unwrap_or("metadata collection error");
                Err(self.not_analyzable(module, message))
            }
            "spread" => Err(self.not_analyzable(module, "destructuring and spread are not supported")),
            "class" => Err(self.not_analyzable(module, "class expressions are not supported")),
            other => Err(self.not_analyzable(module, &format!("expression form {} is not supported", other))),
        }
    }

    fn not_analyzable(&self, module: &str, reason: &str) -> MetadataError {
        MetadataError::NotAnalyzable {
            symbol: self.stack.last().cloned().unwrap_or_else(|| module.to_string()),
            reason: reason.to_string(),
        }
    }
}

/// The `__symbolic` tag of a metadata expression, if any.
pub fn symbolic_kind(value: &Value) -> Option<&str> {
    value.get(SYMBOLIC).and_then(Value::as_str)
}

fn field<'v>(object: &'v Map<String, Value>, name: &str) -> &'v Value {
    object.get(name).unwrap_or(&Value::Null)
}

fn string_field<'v>(object: &'v Map<String, Value>, name: &str) -> Option<&'v str> {
    object.get(name).and_then(Value::as_str)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => *b as i32 as f64,
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn binary(operator: &str, left: &Value, right: &Value) -> Option<Value> {
    let (l, r) = (to_number(left), to_number(right));
    let value = match operator {
        "+" => match (left, right) {
            (Value::String(a), b) => Value::String(format!("{}{}", a, display(b))),
            (a, Value::String(b)) => Value::String(format!("{}{}", display(a), b)),
            _ => number(l + r),
        },
        "-" => number(l - r),
        "*" => number(l * r),
        "/" => number(l / r),
        "%" => number(l % r),
        "==" | "===" => Value::Bool(left == right),
        "!=" | "!==" => Value::Bool(left != right),
        "<" => Value::Bool(l < r),
        "<=" => Value::Bool(l <= r),
        ">" => Value::Bool(l > r),
        ">=" => Value::Bool(l >= r),
        "&" => number(((l as i64) & (r as i64)) as f64),
        "|" => number(((l as i64) | (r as i64)) as f64),
        "^" => number(((l as i64) ^ (r as i64)) as f64),
        "<<" => number(((l as i64) << ((r as i64) & 31)) as f64),
        ">>" => number(((l as i64) >> ((r as i64) & 31)) as f64),
        _ => return None,
    };
    Some(value)
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
