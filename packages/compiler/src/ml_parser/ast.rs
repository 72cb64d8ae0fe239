//! ML Parser AST
//!
//! The markup tree consumed by the template parser: elements, attributes,
//! text and comments, each with its source span.

use crate::parse_util::ParseSourceSpan;

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Element(e) => &e.source_span,
            Node::Text(t) => &t.source_span,
            Node::Comment(c) => &c.source_span,
        }
    }
}

/// Text node; entities are already decoded
#[derive(Debug, Clone)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

impl Text {
    pub fn new(value: String, source_span: ParseSourceSpan) -> Self {
        Text { value, source_span }
    }
}

/// Attribute node
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
    pub key_span: ParseSourceSpan,
    pub value_span: Option<ParseSourceSpan>,
}

impl Attribute {
    pub fn new(
        name: String,
        value: String,
        source_span: ParseSourceSpan,
        key_span: ParseSourceSpan,
        value_span: Option<ParseSourceSpan>,
    ) -> Self {
        Attribute {
            name,
            value,
            source_span,
            key_span,
            value_span,
        }
    }

    /// Absolute offset of the first value character, or of the name when valueless.
    pub fn value_offset(&self) -> usize {
        match &self.value_span {
            Some(span) => span.start.offset,
            None => self.key_span.end.offset,
        }
    }
}

/// Element node
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
}

impl Element {
    pub fn new(
        name: String,
        attrs: Vec<Attribute>,
        children: Vec<Node>,
        source_span: ParseSourceSpan,
        start_source_span: ParseSourceSpan,
        end_source_span: Option<ParseSourceSpan>,
    ) -> Self {
        Element {
            name,
            attrs,
            children,
            source_span,
            start_source_span,
            end_source_span,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

/// Comment node
#[derive(Debug, Clone)]
pub struct Comment {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

impl Comment {
    pub fn new(value: String, source_span: ParseSourceSpan) -> Self {
        Comment { value, source_span }
    }
}
