//! HTML Parser
//!
//! Entry point for parsing template markup with HTML tag definitions.

use super::parser::{ParseOptions, ParseTreeResult, Parser};
use tracing::trace;

/// HTML parser
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        HtmlParser
    }

    /// Parses `source`; `url` names the template in error locations.
    pub fn parse(&self, source: &str, url: &str, options: &ParseOptions) -> ParseTreeResult {
        let result = Parser::parse(source, url, options);
        trace!(url, nodes = result.root_nodes.len(), errors = result.errors.len(), "parsed markup");
        result
    }
}
