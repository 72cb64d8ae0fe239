//! Compiler options.

use crate::error::CompileError;
use crate::ml_parser::defaults::InterpolationConfig;
use serde::{Deserialize, Serialize};

/// Options threaded through the template parser and the instruction emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Keep whitespace-only text nodes and runs of whitespace
    pub preserve_whitespaces: bool,
    pub interpolation: InterpolationConfig,
    /// Report property bindings that no native element or directive accepts
    pub check_unknown_properties: bool,
    /// Name nested template functions after their host element
    pub emit_template_names: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            preserve_whitespaces: false,
            interpolation: InterpolationConfig::default(),
            check_unknown_properties: true,
            emit_template_names: true,
        }
    }
}

impl CompilerOptions {
    pub fn from_json(text: &str) -> Result<Self, CompileError> {
        let options: CompilerOptions =
            serde_json::from_str(text).map_err(|e| CompileError::Options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), CompileError> {
        self.interpolation.validate().map_err(CompileError::Options)
    }
}
