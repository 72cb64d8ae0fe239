//! DOM Security Schema
//!
//! Security contexts of DOM properties, keyed by `tag|property`. Properties
//! applying to all tags use `*`.

use super::element_schema_registry::SecurityContext;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static SECURITY_SCHEMA: Lazy<HashMap<String, SecurityContext>> = Lazy::new(|| {
    let mut schema = HashMap::new();

    // Case is insignificant; all names are lower-cased for lookup.
    register_context(&mut schema, SecurityContext::Html, &["iframe|srcdoc", "*|innerhtml", "*|outerhtml"]);
    register_context(&mut schema, SecurityContext::Style, &["*|style"]);
    register_context(
        &mut schema,
        SecurityContext::Url,
        &[
            "*|formaction",
            "area|href",
            "a|href",
            "audio|src",
            "blockquote|cite",
            "form|action",
            "img|src",
            "input|src",
            "q|cite",
            "source|src",
            "track|src",
            "video|poster",
            "video|src",
        ],
    );
    register_context(
        &mut schema,
        SecurityContext::ResourceUrl,
        &["base|href", "embed|src", "iframe|src", "link|href", "object|data", "script|src"],
    );

    schema
});

fn register_context(schema: &mut HashMap<String, SecurityContext>, ctx: SecurityContext, specs: &[&str]) {
    for spec in specs {
        schema.insert(spec.to_lowercase(), ctx);
    }
}

pub fn security_schema() -> &'static HashMap<String, SecurityContext> {
    &SECURITY_SCHEMA
}
