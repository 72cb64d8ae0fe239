//! ML Parser
//!
//! Single-pass HTML tree builder. Scans the source once, keeps a stack of
//! open elements and records recoverable errors for malformed markup.

use super::ast::{Attribute, Comment, Element, Node, Text};
use super::defaults::InterpolationConfig;
use super::entities::decode_entities;
use super::tags::{get_html_tag_definition, HtmlTagDefinition, TagContentType};
use crate::chars;
use crate::parse_util::{ParseError, ParseLocation, ParseSourceFile, ParseSourceSpan};
use std::sync::Arc;

/// Result of parsing one template
#[derive(Debug, Clone)]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
}

impl ParseTreeResult {
    pub fn new(root_nodes: Vec<Node>, errors: Vec<ParseError>) -> Self {
        ParseTreeResult { root_nodes, errors }
    }
}

/// Tokenization options
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub interpolation: InterpolationConfig,
}

pub struct Parser;

impl Parser {
    pub fn parse(source: &str, url: &str, options: &ParseOptions) -> ParseTreeResult {
        let file = Arc::new(ParseSourceFile::new(source, url));
        let mut builder = TreeBuilder::new(file, source, &options.interpolation);
        builder.build();
        ParseTreeResult::new(builder.root_nodes, builder.errors)
    }
}

struct OpenElement {
    name: String,
    attrs: Vec<Attribute>,
    children: Vec<Node>,
    start_source_span: ParseSourceSpan,
    definition: HtmlTagDefinition,
}

struct TreeBuilder<'a> {
    file: Arc<ParseSourceFile>,
    input: &'a str,
    interpolation: &'a InterpolationConfig,
    offset: usize,
    line: usize,
    col: usize,
    stack: Vec<OpenElement>,
    root_nodes: Vec<Node>,
    errors: Vec<ParseError>,
}

impl<'a> TreeBuilder<'a> {
    fn new(file: Arc<ParseSourceFile>, input: &'a str, interpolation: &'a InterpolationConfig) -> Self {
        TreeBuilder {
            file,
            input,
            interpolation,
            offset: 0,
            line: 0,
            col: 0,
            stack: Vec::new(),
            root_nodes: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn build(&mut self) {
        while !self.at_end() {
            if self.starts_with("<!--") {
                self.consume_comment();
            } else if self.starts_with("<!") || self.starts_with("<?") {
                self.consume_declaration();
            } else if self.starts_with("</") && self.peek_at(2).map_or(false, chars::is_ascii_letter) {
                self.consume_end_tag();
            } else if self.starts_with("<") && self.peek_at(1).map_or(false, chars::is_ascii_letter) {
                self.consume_start_tag();
            } else {
                self.consume_text();
            }
        }

        while let Some(open) = self.stack.pop() {
            if open.definition.closed_by_children.is_empty() {
                self.errors.push(ParseError::new(
                    open.start_source_span.clone(),
                    format!("Unclosed element \"{}\"", open.name),
                ));
            }
            let end = self.location();
            self.close_element(open, end, None);
        }
    }

    // Cursor

    fn at_end(&self) -> bool {
        self.offset >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    fn starts_with(&self, text: &str) -> bool {
        self.rest().starts_with(text)
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.rest().chars().nth(ahead)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek() {
            self.offset += ch.len_utf8();
            if ch == chars::NEWLINE {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
    }

    fn advance_by(&mut self, text: &str) {
        for _ in text.chars() {
            self.advance();
        }
    }

    fn location(&self) -> ParseLocation {
        ParseLocation::new(self.file.clone(), self.offset, self.line, self.col)
    }

    fn span_from(&self, start: &ParseLocation) -> ParseSourceSpan {
        ParseSourceSpan::new(start.clone(), self.location())
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, chars::is_whitespace) {
            self.advance();
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.offset;
        while self.peek().map_or(false, chars::is_name_char) {
            self.advance();
        }
        self.input[start..self.offset].to_string()
    }

    /// Consumes up to and including `terminator`; false when the input ran out.
    fn advance_past(&mut self, terminator: &str) -> bool {
        while !self.at_end() {
            if self.starts_with(terminator) {
                self.advance_by(terminator);
                return true;
            }
            self.advance();
        }
        false
    }

    // Nodes

    fn add_to_parent(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root_nodes.push(node),
        }
    }

    fn consume_comment(&mut self) {
        let start = self.location();
        self.advance_by("<!--");
        let value_start = self.offset;
        if !self.advance_past("-->") {
            self.errors.push(ParseError::new(self.span_from(&start), "Unexpected character \"EOF\""));
            return;
        }
        let value = self.input[value_start..self.offset - 3].trim().to_string();
        let span = self.span_from(&start);
        self.add_to_parent(Node::Comment(Comment::new(value, span)));
    }

    fn consume_declaration(&mut self) {
        let start = self.location();
        if !self.advance_past(">") {
            self.errors.push(ParseError::new(self.span_from(&start), "Unexpected character \"EOF\""));
        }
    }

    fn consume_text(&mut self) {
        let start = self.location();
        let text_start = self.offset;
        while !self.at_end() {
            if self.starts_with(&self.interpolation.start) {
                let start_marker = self.interpolation.start.clone();
                self.advance_by(&start_marker);
                let end_marker = self.interpolation.end.clone();
                if !self.advance_past(&end_marker) {
                    break;
                }
                continue;
            }
            if self.peek() == Some(chars::LT) && self.offset > text_start {
                let next = self.peek_at(1);
                if next.map_or(false, |c| chars::is_ascii_letter(c) || c == chars::SLASH || c == chars::BANG || c == chars::QUESTION) {
                    break;
                }
            }
            self.advance();
        }
        let raw = &self.input[text_start..self.offset];
        let span = self.span_from(&start);
        self.push_text(raw, span, true);
    }

    fn push_text(&mut self, raw: &str, span: ParseSourceSpan, decode: bool) {
        let mut value = if decode {
            let (decoded, unknown) = decode_entities(raw);
            for entity in unknown {
                self.errors.push(ParseError::new(
                    span.clone(),
                    format!("Unknown entity \"{}\"", entity.0.trim_start_matches('&').trim_end_matches(';')),
                ));
            }
            decoded
        } else {
            raw.to_string()
        };

        if let Some(parent) = self.stack.last() {
            if parent.definition.ignore_first_lf && parent.children.is_empty() && value.starts_with('\n') {
                value.remove(0);
            }
        }
        if value.is_empty() {
            return;
        }

        // merge adjacent text nodes
        let siblings = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root_nodes,
        };
        if let Some(Node::Text(prev)) = siblings.last_mut() {
            prev.value.push_str(&value);
            prev.source_span.end = span.end;
            return;
        }
        siblings.push(Node::Text(Text::new(value, span)));
    }

    fn consume_start_tag(&mut self) {
        let start = self.location();
        self.advance();
        let name = self.read_name();
        let mut attrs = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    self.errors.push(ParseError::new(
                        self.span_from(&start),
                        format!("Unexpected character \"EOF\" in tag \"{}\"", name),
                    ));
                    return;
                }
                Some(chars::GT) => {
                    self.advance();
                    break;
                }
                Some(chars::SLASH) if self.peek_at(1) == Some(chars::GT) => {
                    self.advance_by("/>");
                    self_closing = true;
                    break;
                }
                Some(chars::SLASH) => self.advance(),
                Some(_) => match self.consume_attribute() {
                    Some(attr) => attrs.push(attr),
                    None => {
                        let bad_start = self.location();
                        self.advance();
                        self.errors.push(ParseError::new(
                            self.span_from(&bad_start),
                            format!("Unexpected character in tag \"{}\"", name),
                        ));
                    }
                },
            }
        }

        let start_source_span = self.span_from(&start);
        let definition = get_html_tag_definition(&name);

        if let Some(parent) = self.stack.last() {
            if parent.definition.is_closed_by_child(&name) {
                if let Some(open) = self.stack.pop() {
                    let end = start.clone();
                    self.close_element(open, end, None);
                }
            }
        }

        let open = OpenElement {
            name: name.clone(),
            attrs,
            children: Vec::new(),
            start_source_span: start_source_span.clone(),
            definition,
        };

        if definition.is_void || self_closing {
            let end = self.location();
            self.close_element(open, end, Some(start_source_span));
            return;
        }

        match definition.content_type {
            TagContentType::RawText | TagContentType::EscapableRawText => {
                self.stack.push(open);
                self.consume_raw_text(&name, definition.content_type == TagContentType::EscapableRawText);
            }
            TagContentType::ParsableData => self.stack.push(open),
        }
    }

    fn consume_raw_text(&mut self, name: &str, decode: bool) {
        let start = self.location();
        let text_start = self.offset;
        let closing = format!("</{}", name.to_lowercase());
        while !self.at_end()
            && !self
                .rest()
                .get(..closing.len())
                .map_or(false, |head| head.eq_ignore_ascii_case(&closing))
        {
            self.advance();
        }
        let raw = self.input[text_start..self.offset].to_string();
        let span = self.span_from(&start);
        self.push_text(&raw, span, decode);
    }

    fn consume_attribute(&mut self) -> Option<Attribute> {
        let start = self.location();
        let name = self.read_name();
        if name.is_empty() {
            return None;
        }
        let key_span = self.span_from(&start);

        let before_eq = (self.offset, self.line, self.col);
        self.skip_whitespace();
        if self.peek() != Some(chars::EQ) {
            (self.offset, self.line, self.col) = before_eq;
            let span = self.span_from(&start);
            return Some(Attribute::new(name, String::new(), span, key_span, None));
        }
        self.advance();
        self.skip_whitespace();

        let (raw, value_span) = match self.peek() {
            Some(quote) if chars::is_quote(quote) => {
                self.advance();
                let value_start = self.location();
                let text_start = self.offset;
                while !self.at_end() && self.peek() != Some(quote) {
                    self.advance();
                }
                let raw = self.input[text_start..self.offset].to_string();
                let value_span = self.span_from(&value_start);
                if self.at_end() {
                    self.errors.push(ParseError::new(self.span_from(&start), "Unterminated attribute value"));
                } else {
                    self.advance();
                }
                (raw, value_span)
            }
            _ => {
                let value_start = self.location();
                let text_start = self.offset;
                while self
                    .peek()
                    .map_or(false, |c| !chars::is_whitespace(c) && c != chars::GT && !self.starts_with("/>"))
                {
                    self.advance();
                }
                let raw = self.input[text_start..self.offset].to_string();
                (raw, self.span_from(&value_start))
            }
        };

        let (value, unknown) = decode_entities(&raw);
        for entity in unknown {
            self.errors.push(ParseError::new(value_span.clone(), format!("Unknown entity \"{}\"", entity.0)));
        }
        let span = self.span_from(&start);
        Some(Attribute::new(name, value, span, key_span, Some(value_span)))
    }

    fn consume_end_tag(&mut self) {
        let start = self.location();
        self.advance_by("</");
        let name = self.read_name();
        self.skip_whitespace();
        if self.peek() == Some(chars::GT) {
            self.advance();
        } else {
            self.errors.push(ParseError::new(
                self.span_from(&start),
                format!("Unexpected character in closing tag \"{}\"", name),
            ));
            self.advance_past(">");
        }
        let end_span = self.span_from(&start);

        if get_html_tag_definition(&name).is_void {
            self.errors.push(ParseError::new(
                end_span,
                format!("Void elements do not have end tags \"{}\"", name),
            ));
            return;
        }

        let position = self
            .stack
            .iter()
            .rposition(|open| open.name == name || open.name.eq_ignore_ascii_case(&name));
        let Some(position) = position else {
            self.errors.push(ParseError::new(
                end_span,
                format!(
                    "Unexpected closing tag \"{}\". It may happen when the tag has already been closed by another tag.",
                    name
                ),
            ));
            return;
        };

        while self.stack.len() > position + 1 {
            if let Some(open) = self.stack.pop() {
                if open.definition.closed_by_children.is_empty() {
                    self.errors.push(ParseError::new(
                        open.start_source_span.clone(),
                        format!("Unclosed element \"{}\"", open.name),
                    ));
                }
                self.close_element(open, start.clone(), None);
            }
        }
        if let Some(open) = self.stack.pop() {
            let end = self.location();
            self.close_element(open, end, Some(end_span));
        }
    }

    fn close_element(&mut self, open: OpenElement, end: ParseLocation, end_source_span: Option<ParseSourceSpan>) {
        let source_span = ParseSourceSpan::new(open.start_source_span.start.clone(), end);
        let element = Element::new(
            open.name,
            open.attrs,
            open.children,
            source_span,
            open.start_source_span,
            end_source_span,
        );
        self.add_to_parent(Node::Element(element));
    }
}
