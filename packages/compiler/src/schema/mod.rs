//! Schema Module
//!
//! Native element schema, attribute-to-property mapping and security contexts.

pub mod dom_element_schema_registry;
pub mod dom_security_schema;
pub mod element_schema_registry;

pub use dom_element_schema_registry::DomElementSchemaRegistry;
pub use element_schema_registry::{ElementSchemaRegistry, SecurityContext, ValidationResult};
