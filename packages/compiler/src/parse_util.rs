//! Parse Utilities
//!
//! Source files, locations and spans shared by every parser in the crate,
//! plus the recoverable `ParseError` accumulated during template compilation.

use crate::chars;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        ParseSourceFile {
            content: content.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseLocation {
    pub file: Arc<ParseSourceFile>,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: Arc<ParseSourceFile>, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file,
            offset,
            line,
            col,
        }
    }

    /// Returns a location moved by `delta` bytes, tracking line and column.
    pub fn move_by(&self, delta: isize) -> ParseLocation {
        let source = self.file.content.as_bytes();
        let mut offset = self.offset.min(source.len());
        let mut line = self.line;
        let mut col = self.col;
        let mut delta = delta;

        while offset > 0 && delta < 0 {
            offset -= 1;
            delta += 1;
            if source[offset] == chars::NEWLINE as u8 {
                line = line.saturating_sub(1);
                col = match self.file.content[..offset].rfind('\n') {
                    Some(prior_line) => offset - prior_line - 1,
                    None => offset,
                };
            } else {
                col = col.saturating_sub(1);
            }
        }

        while offset < source.len() && delta > 0 {
            let ch = source[offset];
            offset += 1;
            delta -= 1;
            if ch == chars::NEWLINE as u8 {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }

        ParseLocation::new(self.file.clone(), offset, line, col)
    }

    /// Source text around the location: up to `max_chars` characters or
    /// `max_lines` lines on each side. Offsets inside a multibyte character
    /// snap back to its first byte.
    pub fn get_context(&self, max_chars: usize, max_lines: usize) -> Option<(String, String)> {
        let content = &self.file.content;
        if content.is_empty() || self.offset > content.len() {
            return None;
        }
        let mut offset = self.offset;
        while !content.is_char_boundary(offset) {
            offset -= 1;
        }

        let mut start_offset = offset;
        let mut ctx_lines = 0;
        for (index, ch) in content[..offset].char_indices().rev().take(max_chars) {
            start_offset = index;
            if ch == '\n' {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
        }

        let mut end_offset = offset;
        ctx_lines = 0;
        for (index, ch) in content[offset..].char_indices().take(max_chars) {
            if ch == '\n' {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
            end_offset = offset + index + ch.len_utf8();
        }

        Some((content[start_offset..offset].to_string(), content[offset..end_offset].to_string()))
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.file.url, self.line, self.col)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
    pub details: Option<String>,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan {
            start,
            end,
            details: None,
        }
    }

    /// A zero-width span at the start of `file`, for synthesized nodes.
    pub fn empty(file: Arc<ParseSourceFile>) -> Self {
        let loc = ParseLocation::new(file, 0, 0, 0);
        ParseSourceSpan::new(loc.clone(), loc)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// The source text covered by the span.
    pub fn text(&self) -> &str {
        self.start
            .file
            .content
            .get(self.start.offset..self.end.offset)
            .unwrap_or("")
    }
}

impl fmt::Display for ParseSourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
    pub level: ParseErrorLevel,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Error,
        }
    }

    pub fn warning(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Warning,
        }
    }

    pub fn contextual_message(&self) -> String {
        match self.span.start.get_context(100, 3) {
            Some((before, after)) => {
                let level = match self.level {
                    ParseErrorLevel::Warning => "WARNING",
                    ParseErrorLevel::Error => "ERROR",
                };
                format!("{} (\"{}[{} ->]{}\")", self.msg, before, level, after)
            }
            None => self.msg.clone(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details = self
            .span
            .details
            .as_ref()
            .map(|d| format!(", {}", d))
            .unwrap_or_default();
        write!(f, "{}: {}{}", self.contextual_message(), self.span.start, details)
    }
}
