//! Binding Scope
//!
//! Lexical chain of template-local names: variables, `#ref` exports and the
//! `$event` object inside listeners. One scope per template level; lookups
//! walk outward to the root.
//!
//! Every entry remembers the level that declares it. A function only sees
//! its own context parameter, so a level reading a local of an outer level
//! declares it again, reaching the outer view with `nextContext(depth)`.

use crate::output::output_ast::Expression;
use crate::render3::r3_identifiers::Opcode;
use indexmap::IndexMap;

pub const EVENT_NAME: &str = "$event";
pub const CONTEXT_NAME: &str = "ctx";

/// Name of the context parameter of a level's template function.
pub fn context_name(level: usize) -> String {
    if level == 0 {
        CONTEXT_NAME.to_string()
    } else {
        format!("{}{}", CONTEXT_NAME, level)
    }
}

/// `nextContext(depth)`: the context object `depth` levels up.
pub fn next_context(depth: usize) -> Expression {
    Expression::Instruction {
        opcode: Opcode::NextContext,
        args: vec![Expression::number(depth as f64)],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocalKind {
    /// The component instance, the context of the root level
    Component,
    /// Reads `key` off the context of the declaring level
    Variable { key: String },
    /// The node or directive held in a `localRef` slot
    Reference { slot: u32 },
    Event,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeEntry {
    pub kind: LocalKind,
    /// Identifier the local is read through
    pub name: String,
    /// Level that declares the local
    pub level: usize,
}

impl ScopeEntry {
    pub fn component() -> Self {
        ScopeEntry {
            kind: LocalKind::Component,
            name: CONTEXT_NAME.to_string(),
            level: 0,
        }
    }

    pub fn read(&self) -> Expression {
        Expression::var(&self.name)
    }

    /// Whether reading the local at `level` needs a declaration there:
    /// locals of outer levels always, own ones only inside listeners.
    pub fn needs_declaration(&self, level: usize, in_listener: bool) -> bool {
        match self.kind {
            LocalKind::Event => false,
            LocalKind::Component => level > 0,
            _ => self.level < level || in_listener,
        }
    }

    /// The value of the local as computed by a function at `level`.
    pub fn value_at(&self, level: usize) -> Expression {
        let depth = level.saturating_sub(self.level);
        match &self.kind {
            LocalKind::Component if depth == 0 => Expression::var(CONTEXT_NAME),
            LocalKind::Component => next_context(depth),
            LocalKind::Variable { key } if depth == 0 => Expression::var(context_name(self.level)).prop(key),
            LocalKind::Variable { key } => next_context(depth).prop(key),
            LocalKind::Reference { slot } => {
                let mut args = vec![Expression::number(*slot as f64)];
                if depth > 0 {
                    args.push(Expression::number(depth as f64));
                }
                Expression::Instruction {
                    opcode: Opcode::Reference,
                    args,
                }
            }
            LocalKind::Event => Expression::var(EVENT_NAME),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BindingScope {
    parent: Option<Box<BindingScope>>,
    level: usize,
    map: IndexMap<String, ScopeEntry>,
}

impl BindingScope {
    pub fn root() -> Self {
        Self::default()
    }

    /// A scope for the next template level down.
    pub fn nested(&self) -> BindingScope {
        BindingScope {
            parent: Some(Box::new(self.clone())),
            level: self.level + 1,
            map: IndexMap::new(),
        }
    }

    /// Listener scope: this scope plus `$event`.
    pub fn with_event(&self) -> BindingScope {
        let mut scope = BindingScope {
            parent: Some(Box::new(self.clone())),
            level: self.level,
            map: IndexMap::new(),
        };
        scope.map.insert(
            EVENT_NAME.to_string(),
            ScopeEntry {
                kind: LocalKind::Event,
                name: EVENT_NAME.to_string(),
                level: self.level,
            },
        );
        scope
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Declares `name` at this level, read through `local`. Redefining a
    /// name of the same scope is an error; shadowing an outer one is not.
    pub fn set(&mut self, name: &str, kind: LocalKind, local: impl Into<String>) -> Result<(), String> {
        if self.map.contains_key(name) {
            return Err(format!("Cannot redefine local name \"{}\" in the same template scope", name));
        }
        let entry = ScopeEntry {
            kind,
            name: local.into(),
            level: self.level,
        };
        self.map.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ScopeEntry> {
        match self.map.get(name) {
            Some(entry) => Some(entry),
            None => self.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Local names declared in this scope, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}
