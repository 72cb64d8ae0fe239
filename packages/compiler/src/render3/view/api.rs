//! Render3 View API
//!
//! What the emitter needs to know about the component being compiled.

use crate::metadata::{DirectiveDescriptor, PipeDescriptor, QueryDescriptor};
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct R3ComponentMetadata {
    /// Name of the component type; also the prefix of every emitted function
    pub name: String,
    /// Queries over the component's own view
    pub view_queries: Vec<QueryDescriptor>,
    /// Pipes in scope, by pipe name
    pub pipes: IndexMap<String, PipeDescriptor>,
    /// `<ng-content>` selectors found in the template, in document order
    pub ng_content_selectors: Vec<String>,
    /// Name nested functions after their host element
    pub emit_template_names: bool,
}

impl R3ComponentMetadata {
    pub fn new(
        component: &DirectiveDescriptor,
        pipes: &[PipeDescriptor],
        ng_content_selectors: Vec<String>,
        emit_template_names: bool,
    ) -> Self {
        R3ComponentMetadata {
            name: component.type_name.clone(),
            view_queries: component.view_queries.clone(),
            // The last declaration of a name wins.
            pipes: pipes.iter().map(|pipe| (pipe.name.clone(), pipe.clone())).collect(),
            ng_content_selectors,
            emit_template_names,
        }
    }
}
