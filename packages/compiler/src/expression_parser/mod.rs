/**
 * Expression Parser Module
 *
 * Lexer, AST and parser for binding expressions and the structural micro-syntax.
 */
pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{ExpressionParser, ParseResult, Parser, ParserError, SplitInterpolation};
