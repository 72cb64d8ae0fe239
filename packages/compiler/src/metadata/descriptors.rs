//! Directive, component, pipe and query descriptors.
//!
//! Descriptors are the statically resolved, typed view of a declaration's
//! annotation. They are validated once at the compiler boundary.

use crate::error::MetadataError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a query selects: template reference names or a directive type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryPredicate {
    References(Vec<String>),
    Type(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub property_name: String,
    pub predicate: QueryPredicate,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub descendants: bool,
    /// Token to read from the matched node instead of the default
    #[serde(default)]
    pub read: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectiveDescriptor {
    /// Runtime type reference emitted into instructions
    pub type_name: String,
    pub selector: String,
    pub is_component: bool,
    pub export_as: Option<String>,
    /// Directive property name to template binding name
    pub inputs: IndexMap<String, String>,
    /// Directive property name to event name
    pub outputs: IndexMap<String, String>,
    /// Host binding target (`title`, `class.active`, `attr.role`) to expression
    pub host_properties: IndexMap<String, String>,
    /// Host event (`click`, `window:resize`) to handler statement
    pub host_listeners: IndexMap<String, String>,
    /// Static host attributes
    pub host_attributes: IndexMap<String, String>,
    pub queries: Vec<QueryDescriptor>,
    pub view_queries: Vec<QueryDescriptor>,
    /// Components only: `<ng-content select>` selectors of the component's own template
    pub ng_content_selectors: Vec<String>,
}

impl DirectiveDescriptor {
    pub fn directive(type_name: impl Into<String>, selector: impl Into<String>) -> Self {
        DirectiveDescriptor {
            type_name: type_name.into(),
            selector: selector.into(),
            ..Default::default()
        }
    }

    pub fn component(type_name: impl Into<String>, selector: impl Into<String>) -> Self {
        DirectiveDescriptor {
            is_component: true,
            ..Self::directive(type_name, selector)
        }
    }

    /// Adds inputs written as `prop` or `prop: bindingName`.
    pub fn with_inputs(mut self, inputs: &[&str]) -> Self {
        for input in inputs {
            let (prop, binding) = split_binding_mapping(input);
            self.inputs.insert(prop, binding);
        }
        self
    }

    /// Adds outputs written as `prop` or `prop: eventName`.
    pub fn with_outputs(mut self, outputs: &[&str]) -> Self {
        for output in outputs {
            let (prop, event) = split_binding_mapping(output);
            self.outputs.insert(prop, event);
        }
        self
    }

    /// Adds host entries: `[target]` is a property binding, `(event)` a
    /// listener, and anything else a static attribute.
    pub fn with_host(mut self, host: &[(&str, &str)]) -> Self {
        for (key, value) in host {
            self.add_host_entry(key, value);
        }
        self
    }

    pub fn with_export_as(mut self, export_as: impl Into<String>) -> Self {
        self.export_as = Some(export_as.into());
        self
    }

    pub fn with_ng_content_selectors(mut self, selectors: &[&str]) -> Self {
        self.ng_content_selectors = selectors.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_view_query(mut self, query: QueryDescriptor) -> Self {
        self.view_queries.push(query);
        self
    }

    pub fn with_query(mut self, query: QueryDescriptor) -> Self {
        self.queries.push(query);
        self
    }

    fn add_host_entry(&mut self, key: &str, value: &str) {
        if let Some(target) = key.strip_prefix('[').and_then(|k| k.strip_suffix(']')) {
            self.host_properties.insert(target.to_string(), value.to_string());
        } else if let Some(event) = key.strip_prefix('(').and_then(|k| k.strip_suffix(')')) {
            self.host_listeners.insert(event.to_string(), value.to_string());
        } else {
            self.host_attributes.insert(key.to_string(), value.to_string());
        }
    }

    /// The template binding name for a directive property, if it is an input.
    pub fn input_binding_name(&self, prop: &str) -> Option<&str> {
        self.inputs.get(prop).map(String::as_str)
    }

    /// Whether any output publishes `event_name`.
    pub fn has_output(&self, event_name: &str) -> bool {
        self.outputs.values().any(|event| event == event_name)
    }

    /// Checks the invariants the compiler relies on.
    pub fn validate(&self) -> Result<(), MetadataError> {
        let invalid = |reason: &str| MetadataError::InvalidDescriptor {
            type_name: if self.type_name.is_empty() {
                "<anonymous>".to_string()
            } else {
                self.type_name.clone()
            },
            reason: reason.to_string(),
        };
        if self.type_name.is_empty() {
            return Err(invalid("missing type name"));
        }
        if self.selector.trim().is_empty() {
            return Err(invalid("missing selector"));
        }
        if !self.is_component && !self.ng_content_selectors.is_empty() {
            return Err(invalid("only components declare ng-content selectors"));
        }
        Ok(())
    }

    /// Builds a descriptor from an evaluated `Directive({...})` or
    /// `Component({...})` annotation object.
    pub fn from_annotation(type_name: &str, annotation: &Value, is_component: bool) -> Result<Self, MetadataError> {
        let invalid = |reason: String| MetadataError::InvalidDescriptor {
            type_name: type_name.to_string(),
            reason,
        };
        let object = annotation
            .as_object()
            .ok_or_else(|| invalid("annotation argument must be an object literal".to_string()))?;

        let mut descriptor = DirectiveDescriptor {
            type_name: type_name.to_string(),
            is_component,
            ..Default::default()
        };

        if let Some(selector) = object.get("selector") {
            descriptor.selector = selector
                .as_str()
                .ok_or_else(|| invalid("selector must be a string".to_string()))?
                .to_string();
        }
        if let Some(export_as) = object.get("exportAs") {
            descriptor.export_as = Some(
                export_as
                    .as_str()
                    .ok_or_else(|| invalid("exportAs must be a string".to_string()))?
                    .to_string(),
            );
        }
        for (field, target) in [("inputs", &mut descriptor.inputs), ("outputs", &mut descriptor.outputs)] {
            if let Some(list) = object.get(field) {
                for entry in string_list(list).ok_or_else(|| invalid(format!("{} must be a string array", field)))? {
                    let (prop, binding) = split_binding_mapping(&entry);
                    target.insert(prop, binding);
                }
            }
        }
        if let Some(host) = object.get("host") {
            let host = host
                .as_object()
                .ok_or_else(|| invalid("host must be an object literal".to_string()))?;
            for (key, value) in host {
                let value = value
                    .as_str()
                    .ok_or_else(|| invalid(format!("host value for {} must be a string", key)))?;
                descriptor.add_host_entry(key, value);
            }
        }
        if let Some(queries) = object.get("queries") {
            let queries = queries
                .as_object()
                .ok_or_else(|| invalid("queries must be an object literal".to_string()))?;
            for (property_name, query) in queries {
                let (query, is_view_query) = query_from_annotation(property_name, query).map_err(invalid)?;
                if is_view_query {
                    descriptor.view_queries.push(query);
                } else {
                    descriptor.queries.push(query);
                }
            }
        }
        if let Some(selectors) = object.get("ngContentSelectors") {
            descriptor.ng_content_selectors = string_list(selectors)
                .ok_or_else(|| invalid("ngContentSelectors must be a string array".to_string()))?;
        }

        descriptor.validate()?;
        Ok(descriptor)
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn query_from_annotation(property_name: &str, query: &Value) -> Result<(QueryDescriptor, bool), String> {
    let object = query
        .as_object()
        .ok_or_else(|| format!("query {} must be an object literal", property_name))?;
    let predicate = match object.get("selector") {
        Some(Value::String(selector)) if selector.chars().next().map_or(false, char::is_uppercase) => {
            QueryPredicate::Type(selector.clone())
        }
        Some(Value::String(selector)) => {
            QueryPredicate::References(selector.split(',').map(|s| s.trim().to_string()).collect())
        }
        Some(list @ Value::Array(_)) => QueryPredicate::References(
            string_list(list).ok_or_else(|| format!("query {} selector must be strings", property_name))?,
        ),
        _ => return Err(format!("query {} is missing a selector", property_name)),
    };
    let flag = |name: &str| object.get(name).and_then(Value::as_bool).unwrap_or(false);
    Ok((
        QueryDescriptor {
            property_name: property_name.to_string(),
            predicate,
            first: flag("first"),
            descendants: flag("descendants"),
            read: object.get("read").and_then(Value::as_str).map(str::to_string),
        },
        flag("isViewQuery"),
    ))
}

/// Splits `prop: binding` into its parts; a bare `prop` binds under its own name.
fn split_binding_mapping(entry: &str) -> (String, String) {
    match entry.split_once(':') {
        Some((prop, binding)) => (prop.trim().to_string(), binding.trim().to_string()),
        None => (entry.trim().to_string(), entry.trim().to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeDescriptor {
    pub name: String,
    pub type_name: String,
    #[serde(default = "default_pure")]
    pub pure: bool,
}

fn default_pure() -> bool {
    true
}

impl PipeDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        PipeDescriptor {
            name: name.into(),
            type_name: type_name.into(),
            pure: true,
        }
    }

    pub fn impure(mut self) -> Self {
        self.pure = false;
        self
    }

    pub fn from_annotation(type_name: &str, annotation: &Value) -> Result<Self, MetadataError> {
        let invalid = |reason: &str| MetadataError::InvalidDescriptor {
            type_name: type_name.to_string(),
            reason: reason.to_string(),
        };
        let name = annotation
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("pipe name must be a string"))?;
        let pure = match annotation.get("pure") {
            None => true,
            Some(Value::Bool(pure)) => *pure,
            Some(_) => return Err(invalid("pure must be a boolean")),
        };
        Ok(PipeDescriptor {
            name: name.to_string(),
            type_name: type_name.to_string(),
            pure,
        })
    }
}
