//! ML (Markup Language) Parser Module
//!
//! Parses HTML template text into the markup tree the template parser walks.

pub mod ast;
pub mod defaults;
pub mod entities;
pub mod html_parser;
pub mod parser;
pub mod tags;

pub use ast::*;
pub use defaults::InterpolationConfig;
pub use html_parser::HtmlParser;
pub use parser::{ParseOptions, ParseTreeResult};
pub use tags::*;
