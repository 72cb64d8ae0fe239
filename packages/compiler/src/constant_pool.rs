//! Constant Pool
//!
//! Shares literals across one compilation. Two literals with the same
//! content always resolve to the same entry, whichever template level asks
//! first. The pool only grows.

use crate::output::output_ast::{Expression, Statement};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::trace;

const CONSTANT_PREFIX: &str = "_c";
const FACTORY_PARAM_PREFIX: &str = "a";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantEntry {
    pub name: String,
    pub value: Expression,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstantPool {
    entries: Vec<ConstantEntry>,
    #[serde(skip)]
    keys: IndexMap<String, u32>,
}

/// A literal with dynamic parts, split into a shared pure function and the
/// arguments it is called with.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralFactory {
    pub factory: u32,
    pub arguments: Vec<Expression>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a compile-time constant and returns its index.
    pub fn get_const_literal(&mut self, literal: Expression) -> u32 {
        let key = key_of(&literal);
        self.intern(key, literal)
    }

    /// Lowers an array or map literal with dynamic entries into a shared
    /// factory `(a0, a1, ...) => literal`. Constant entries stay inline.
    pub fn get_literal_factory(&mut self, literal: Expression) -> LiteralFactory {
        let mut arguments = Vec::new();
        let mut parameterize = |value: Expression| {
            if value.is_constant() {
                value
            } else {
                let param = Expression::var(format!("{}{}", FACTORY_PARAM_PREFIX, arguments.len()));
                arguments.push(value);
                param
            }
        };
        let body = match literal {
            Expression::LiteralArray { entries } => Expression::LiteralArray {
                entries: entries.into_iter().map(&mut parameterize).collect(),
            },
            Expression::LiteralMap { entries } => Expression::LiteralMap {
                entries: entries
                    .into_iter()
                    .map(|mut entry| {
                        entry.value = parameterize(entry.value);
                        entry
                    })
                    .collect(),
            },
            other => parameterize(other),
        };
        let params = (0..arguments.len())
            .map(|i| format!("{}{}", FACTORY_PARAM_PREFIX, i))
            .collect();
        let factory = Expression::Fn {
            params,
            body: vec![Statement::Return { value: body }],
        };
        let key = key_of(&factory);
        LiteralFactory {
            factory: self.intern(key, factory),
            arguments,
        }
    }

    pub fn get(&self, index: u32) -> Option<&ConstantEntry> {
        self.entries.get(index as usize)
    }

    pub fn entries(&self) -> &[ConstantEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name_of(index: u32) -> String {
        format!("{}{}", CONSTANT_PREFIX, index)
    }

    fn intern(&mut self, key: String, value: Expression) -> u32 {
        if let Some(&index) = self.keys.get(&key) {
            return index;
        }
        let index = self.entries.len() as u32;
        let name = Self::name_of(index);
        trace!(name = name.as_str(), "interned constant");
        self.entries.push(ConstantEntry { name, value });
        self.keys.insert(key, index);
        index
    }
}

/// Structural key: two expressions share a key exactly when they are equal.
fn key_of(expr: &Expression) -> String {
    serde_json::to_string(expr).unwrap_or_else(|_| format!("{:?}", expr))
}
