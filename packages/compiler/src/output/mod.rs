//! Output Module
//!
//! The instruction program produced by the emitter and its printer.

pub mod output_ast;
pub mod printer;

pub use output_ast::*;
pub use printer::print_program;
