//! Compiler errors.
//!
//! Two tiers: template problems are accumulated as [`ParseError`]s and
//! reported together in [`CompileError::Template`]; metadata problems abort
//! the enclosing declaration immediately as a [`MetadataError`].

use crate::parse_util::ParseError;
use std::fmt::Write;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Every recoverable error found while compiling one template.
    #[error("Template parse errors:\n{}", format_errors(.errors))]
    Template { errors: Vec<ParseError> },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("invalid compiler options: {0}")]
    Options(String),
}

impl CompileError {
    /// The accumulated template errors; empty for the other tiers.
    pub fn template_errors(&self) -> &[ParseError] {
        match self {
            CompileError::Template { errors } => errors,
            _ => &[],
        }
    }
}

fn format_errors(errors: &[ParseError]) -> String {
    let mut out = String::new();
    for (i, error) in errors.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}", error);
    }
    out
}

/// Static metadata resolution failures.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata version mismatch: found version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    /// The chain of `module#symbol` references that loops back on itself.
    #[error("circular reference while resolving {}", .chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    #[error("could not resolve module {0}")]
    UnresolvedModule(String),

    #[error("could not resolve symbol {name} in module {module}")]
    UnresolvedSymbol { module: String, name: String },

    #[error("{symbol} is not statically analyzable: {reason}")]
    NotAnalyzable { symbol: String, reason: String },

    #[error("invalid descriptor for {type_name}: {reason}")]
    InvalidDescriptor { type_name: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
