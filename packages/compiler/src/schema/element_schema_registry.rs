//! Element Schema Registry
//!
//! The schema service consulted by the template parser for native element
//! properties and attribute-to-property name mapping.

use serde::{Deserialize, Serialize};

/// Security context of a bound DOM property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityContext {
    None,
    Html,
    Style,
    Script,
    Url,
    ResourceUrl,
}

/// Validation result for properties/attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub error: bool,
    pub msg: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        ValidationResult { error: false, msg: None }
    }

    pub fn error(msg: String) -> Self {
        ValidationResult {
            error: true,
            msg: Some(msg),
        }
    }
}

pub trait ElementSchemaRegistry: Send + Sync {
    /// Check if a property exists on an element
    fn has_property(&self, tag_name: &str, prop_name: &str) -> bool;

    /// Check if an element exists
    fn has_element(&self, tag_name: &str) -> bool;

    /// Get security context for a property
    fn security_context(&self, element_name: &str, prop_name: &str, is_attribute: bool) -> SecurityContext;

    /// Maps an attribute name to its DOM property, e.g. `class` to `className`
    fn get_mapped_prop_name(&self, prop_name: &str) -> String;

    /// Validate property name
    fn validate_property(&self, name: &str) -> ValidationResult;

    /// Validate attribute name
    fn validate_attribute(&self, name: &str) -> ValidationResult;
}
