//! Render3 Module
//!
//! Instruction set and the view compiler that targets it.

pub mod r3_identifiers;
pub mod view;

pub use r3_identifiers::{
    Arity, Opcode, RenderFlags, MAX_FIXED_INTERPOLATION_ARITY, MAX_FIXED_PIPE_ARITY, MAX_FIXED_PURE_FUNCTION_ARITY,
};
