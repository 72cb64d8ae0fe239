//! Metadata
//!
//! Typed directive and pipe descriptors, and their static resolution from
//! serialized module metadata.

pub mod bundle;
pub mod descriptors;
pub mod static_evaluator;

pub use bundle::{MetadataBundle, ModuleMetadata, ResolvedMetadata, METADATA_VERSION};
pub use descriptors::{DirectiveDescriptor, PipeDescriptor, QueryDescriptor, QueryPredicate};
pub use static_evaluator::StaticEvaluator;
