//! Styling Builder
//!
//! Collects the `[style]`, `[class]`, `[style.x]` and `[class.x]` bindings
//! of one node and orders their instructions: the map binding first, then
//! the keyed bindings, then `stylingApply`.

use crate::template_parser::{BoundElementPropertyAst, PropertyBindingType};
use indexmap::IndexSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylingKind {
    Class,
    Style,
}

/// One keyed binding, addressed by its index in the declared names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyedStyling<'a> {
    pub kind: StylingKind,
    pub index: usize,
    pub binding: &'a BoundElementPropertyAst,
}

#[derive(Debug, Default)]
pub struct StylingBuilder<'a> {
    class_map: Option<&'a BoundElementPropertyAst>,
    style_map: Option<&'a BoundElementPropertyAst>,
    class_names: IndexSet<String>,
    style_names: IndexSet<String>,
    keyed: Vec<KeyedStyling<'a>>,
}

impl<'a> StylingBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the binding if it is a styling binding. `[attr.style]` and
    /// `[attr.class]` are plain attributes and are left to the caller.
    pub fn register(&mut self, binding: &'a BoundElementPropertyAst) -> bool {
        let kind = match binding.kind {
            PropertyBindingType::Class => StylingKind::Class,
            PropertyBindingType::Style => StylingKind::Style,
            _ => return false,
        };
        if binding.name.is_empty() {
            // A later map binding replaces an earlier one.
            match kind {
                StylingKind::Class => self.class_map = Some(binding),
                StylingKind::Style => self.style_map = Some(binding),
            }
            return true;
        }
        let names = match kind {
            StylingKind::Class => &mut self.class_names,
            StylingKind::Style => &mut self.style_names,
        };
        let (index, _) = names.insert_full(binding.name.clone());
        self.keyed.push(KeyedStyling { kind, index, binding });
        true
    }

    pub fn has_bindings(&self) -> bool {
        self.has_map() || !self.keyed.is_empty()
    }

    pub fn has_map(&self) -> bool {
        self.class_map.is_some() || self.style_map.is_some()
    }

    pub fn class_map(&self) -> Option<&'a BoundElementPropertyAst> {
        self.class_map
    }

    pub fn style_map(&self) -> Option<&'a BoundElementPropertyAst> {
        self.style_map
    }

    pub fn class_names(&self) -> Vec<String> {
        self.class_names.iter().cloned().collect()
    }

    pub fn style_names(&self) -> Vec<String> {
        self.style_names.iter().cloned().collect()
    }

    /// Style bindings first, then class bindings, each in source order.
    pub fn keyed_bindings(&self) -> Vec<KeyedStyling<'a>> {
        let mut keyed = self.keyed.clone();
        keyed.sort_by_key(|k| k.kind == StylingKind::Class);
        keyed
    }

    /// Binding slots the node's styling consumes.
    pub fn binding_count(&self) -> u32 {
        self.class_map.is_some() as u32 + self.style_map.is_some() as u32 + self.keyed.len() as u32
    }
}
