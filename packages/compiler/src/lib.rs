#![deny(clippy::all)]

/**
 * Template Compiler
 *
 * Compiles component templates into creation/update instruction programs
 * for a slot-indexed incremental DOM runtime.
 */

// Core modules
pub mod chars;
pub mod compiler;
pub mod config;
pub mod constant_pool;
pub mod directive_matching;
pub mod error;
pub mod parse_util;

// Parser modules
pub mod expression_parser;
pub mod ml_parser;
pub mod template_parser;

// Compilation modules
pub mod metadata;
pub mod output;
pub mod render3;
pub mod schema;

// Re-exports
pub use compiler::{CompileRequest, TemplateCompiler};
pub use config::CompilerOptions;
pub use constant_pool::ConstantPool;
pub use directive_matching::{CssSelector, SelectorMatcher};
pub use error::{CompileError, MetadataError};
pub use metadata::{DirectiveDescriptor, MetadataBundle, PipeDescriptor, QueryDescriptor, QueryPredicate};
pub use output::{print_program, Instruction, Operand, TemplateFunction, TemplateProgram};
pub use parse_util::{ParseError, ParseErrorLevel, ParseSourceSpan};
pub use render3::{Opcode, RenderFlags};
