//! Render3 View Module
//!
//! Lowers a parsed template into template functions.

pub mod api;
pub mod binding_scope;
pub mod compiler;
pub mod expression_converter;
pub mod styling;

pub use api::R3ComponentMetadata;
pub use binding_scope::{context_name, next_context, BindingScope, LocalKind, ScopeEntry, CONTEXT_NAME, EVENT_NAME};
pub use compiler::{compile_component_from_metadata, CompiledTemplate};
pub use expression_converter::ExpressionConverter;
pub use styling::{KeyedStyling, StylingBuilder, StylingKind};
