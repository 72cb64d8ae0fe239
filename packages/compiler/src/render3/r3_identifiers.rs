//! Render3 Identifiers
//!
//! The runtime instruction set targeted by the emitter, and the render
//! flags a template function is invoked with.

use bitflags::bitflags;
use serde::{Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Which instruction buffer a template function invocation executes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u32 {
        const CREATE = 1;
        const UPDATE = 2;
    }
}

/// Largest operand count with a dedicated fixed-arity instruction.
pub const MAX_FIXED_INTERPOLATION_ARITY: usize = 8;
pub const MAX_FIXED_PURE_FUNCTION_ARITY: usize = 8;
/// Pipe arguments, the piped value included.
pub const MAX_FIXED_PIPE_ARITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Fixed(u8),
    /// Takes its arguments as one array
    Variadic,
}

impl Arity {
    /// Picks the fixed variant for `count` up to `max`, the variadic one beyond.
    pub fn for_count(count: usize, max: usize) -> Arity {
        if count <= max {
            Arity::Fixed(count as u8)
        } else {
            Arity::Variadic
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Arity::Variadic)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Variadic => f.write_str("V"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /* Creation */
    ElementStart,
    ElementEnd,
    ElementContainerStart,
    ElementContainerEnd,
    Component,
    Directive,
    LocalRef,
    Text,
    Template,
    Listener,
    Styling,
    Pipe,
    Projection,
    ProjectionDef,
    Query,

    /* Update */
    Variable,
    Reference,
    Property,
    PropertyInterpolate(Arity),
    Attribute,
    AttributeInterpolate(Arity),
    TextInterpolate(Arity),
    StylingMap,
    StyleProp,
    ClassProp,
    StylingApply,
    QueryRefresh,

    /* Expression helpers */
    PipeBind(Arity),
    PureFunction(Arity),
    LoadDirective,
    NextContext,
}

impl Opcode {
    pub fn name(&self) -> String {
        let base = match self {
            Opcode::ElementStart => "elementStart",
            Opcode::ElementEnd => "elementEnd",
            Opcode::ElementContainerStart => "elementContainerStart",
            Opcode::ElementContainerEnd => "elementContainerEnd",
            Opcode::Component => "component",
            Opcode::Directive => "directive",
            Opcode::LocalRef => "localRef",
            Opcode::Text => "text",
            Opcode::Template => "template",
            Opcode::Listener => "listener",
            Opcode::Styling => "styling",
            Opcode::Pipe => "pipe",
            Opcode::Projection => "projection",
            Opcode::ProjectionDef => "projectionDef",
            Opcode::Query => "query",
            Opcode::Variable => "variable",
            Opcode::Reference => "reference",
            Opcode::Property => "property",
            Opcode::PropertyInterpolate(arity) => return format!("propertyInterpolate{}", arity),
            Opcode::Attribute => "attribute",
            Opcode::AttributeInterpolate(arity) => return format!("attributeInterpolate{}", arity),
            Opcode::TextInterpolate(arity) => return format!("textInterpolate{}", arity),
            Opcode::StylingMap => "stylingMap",
            Opcode::StyleProp => "styleProp",
            Opcode::ClassProp => "classProp",
            Opcode::StylingApply => "stylingApply",
            Opcode::QueryRefresh => "queryRefresh",
            Opcode::PipeBind(arity) => return format!("pipeBind{}", arity),
            Opcode::PureFunction(arity) => return format!("pureFunction{}", arity),
            Opcode::LoadDirective => "loadDirective",
            Opcode::NextContext => "nextContext",
        };
        base.to_string()
    }

    /// Whether the instruction belongs in the creation buffer.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Opcode::ElementStart
                | Opcode::ElementEnd
                | Opcode::ElementContainerStart
                | Opcode::ElementContainerEnd
                | Opcode::Component
                | Opcode::Directive
                | Opcode::LocalRef
                | Opcode::Text
                | Opcode::Template
                | Opcode::Listener
                | Opcode::Styling
                | Opcode::Pipe
                | Opcode::Projection
                | Opcode::ProjectionDef
                | Opcode::Query
        )
    }

    /// Creation instructions whose slot operand is a fresh allocation.
    pub fn allocates_slot(&self) -> bool {
        matches!(
            self,
            Opcode::ElementStart
                | Opcode::ElementContainerStart
                | Opcode::Component
                | Opcode::Directive
                | Opcode::LocalRef
                | Opcode::Text
                | Opcode::Template
                | Opcode::Pipe
                | Opcode::Projection
                | Opcode::Query
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for Opcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}
