//! Serialized module metadata.

use super::descriptors::{DirectiveDescriptor, PipeDescriptor};
use super::static_evaluator::{symbolic_kind, StaticEvaluator};
use crate::error::MetadataError;
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// The metadata format version this compiler reads.
pub const METADATA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleMetadata {
    /// Exported symbol name to metadata expression
    pub exports: IndexMap<String, Value>,
    /// Symbols declared in the module but not exported
    pub locals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataBundle {
    pub version: u32,
    #[serde(default)]
    pub modules: IndexMap<String, ModuleMetadata>,
}

/// Descriptors resolved from every annotated class in a bundle, in
/// declaration order.
#[derive(Debug, Default)]
pub struct ResolvedMetadata {
    pub directives: Vec<DirectiveDescriptor>,
    pub pipes: Vec<PipeDescriptor>,
    /// Classes whose annotation failed to resolve, by class name
    pub failures: Vec<(String, MetadataError)>,
}

impl ResolvedMetadata {
    pub fn failure(&self, type_name: &str) -> Option<&MetadataError> {
        self.failures
            .iter()
            .find(|(name, _)| name == type_name)
            .map(|(_, error)| error)
    }
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

impl MetadataBundle {
    pub fn from_json(text: &str) -> Result<Self, MetadataError> {
        // Check the version before the shape, so old bundles report a mismatch.
        let header: VersionHeader = serde_json::from_str(text)?;
        if header.version != METADATA_VERSION {
            return Err(MetadataError::VersionMismatch {
                found: header.version,
                expected: METADATA_VERSION,
            });
        }
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read metadata bundle {}", path.display()))?;
        let bundle = Self::from_json(&text)
            .with_context(|| format!("failed to load metadata bundle {}", path.display()))?;
        debug!(path = %path.display(), modules = bundle.modules.len(), "loaded metadata bundle");
        Ok(bundle)
    }

    /// Evaluates the decorators of every exported class and validates them
    /// into descriptors. A class that fails to resolve is recorded in
    /// `failures` and does not stop the others.
    pub fn resolve_descriptors(&self) -> ResolvedMetadata {
        let mut resolved = ResolvedMetadata::default();
        let mut evaluator = StaticEvaluator::new(self);

        for (module, metadata) in &self.modules {
            for (name, export) in &metadata.exports {
                if symbolic_kind(export) != Some("class") {
                    continue;
                }
                let decorators = export.get("decorators").and_then(Value::as_array);
                for decorator in decorators.into_iter().flatten() {
                    let constructor = decorator
                        .get("expression")
                        .filter(|callee| symbolic_kind(callee) == Some("reference"))
                        .and_then(|callee| callee.get("name"))
                        .and_then(Value::as_str);
                    let constructor = match constructor {
                        Some(c @ ("Component" | "Directive" | "Pipe")) => c,
                        _ => continue,
                    };
                    let outcome =
                        resolve_decorator(&mut evaluator, &mut resolved, module, name, decorator, constructor);
                    if let Err(error) = outcome {
                        warn!(module = %module, class = %name, error = %error, "skipping unresolvable declaration");
                        resolved.failures.push((name.clone(), error));
                    }
                }
            }
        }

        debug!(
            directives = resolved.directives.len(),
            pipes = resolved.pipes.len(),
            failures = resolved.failures.len(),
            "resolved metadata descriptors"
        );
        resolved
    }
}

fn resolve_decorator(
    evaluator: &mut StaticEvaluator<'_>,
    resolved: &mut ResolvedMetadata,
    module: &str,
    name: &str,
    decorator: &Value,
    constructor: &str,
) -> Result<(), MetadataError> {
    let annotation = evaluator.evaluate(module, decorator)?;
    match constructor {
        "Pipe" => resolved.pipes.push(PipeDescriptor::from_annotation(name, &annotation)?),
        kind => resolved.directives.push(DirectiveDescriptor::from_annotation(
            name,
            &annotation,
            kind == "Component",
        )?),
    }
    Ok(())
}
