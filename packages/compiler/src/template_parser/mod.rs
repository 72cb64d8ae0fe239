//! Template Parser Module
//!
//! Turns a markup tree plus the directives in scope into the Template AST.

pub mod attribute_name;
pub mod binding_parser;
pub mod template_ast;
#[allow(clippy::module_inception)]
pub mod template_parser;
pub mod template_preparser;

pub use attribute_name::{AttributeKind, AttributeName};
pub use binding_parser::{BindingParser, BindingTargets, ParsedEvent, ParsedProperty, ParsedVariable};
pub use template_ast::*;
pub use template_parser::{TemplateParseResult, TemplateParser};
pub use template_preparser::{preparse_element, PreparsedElement, PreparsedElementType};
