//! ML Parser Tags
//!
//! HTML tag definitions: void elements, raw-text content and implicit closing.

/// Tag content types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagContentType {
    RawText,
    EscapableRawText,
    ParsableData,
}

#[derive(Debug, Clone, Copy)]
pub struct HtmlTagDefinition {
    pub is_void: bool,
    pub content_type: TagContentType,
    /// Open tags of these names implicitly close this element
    pub closed_by_children: &'static [&'static str],
    pub ignore_first_lf: bool,
}

impl HtmlTagDefinition {
    const fn parsable() -> Self {
        HtmlTagDefinition {
            is_void: false,
            content_type: TagContentType::ParsableData,
            closed_by_children: &[],
            ignore_first_lf: false,
        }
    }

    const fn void() -> Self {
        HtmlTagDefinition {
            is_void: true,
            ..Self::parsable()
        }
    }

    const fn content(content_type: TagContentType) -> Self {
        HtmlTagDefinition {
            content_type,
            ..Self::parsable()
        }
    }

    const fn closed_by(closed_by_children: &'static [&'static str]) -> Self {
        HtmlTagDefinition {
            closed_by_children,
            ..Self::parsable()
        }
    }

    pub fn is_closed_by_child(&self, name: &str) -> bool {
        self.is_void || self.closed_by_children.contains(&name.to_lowercase().as_str())
    }
}

const BLOCK_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "main", "nav", "ol", "p", "pre", "section",
    "table", "ul",
];

/// Returns the tag definition for an element name, case-insensitively.
pub fn get_html_tag_definition(tag_name: &str) -> HtmlTagDefinition {
    match tag_name.to_lowercase().as_str() {
        "base" | "meta" | "area" | "embed" | "link" | "img" | "input" | "param" | "hr" | "br"
        | "source" | "track" | "wbr" | "col" => HtmlTagDefinition::void(),
        "p" => HtmlTagDefinition::closed_by(BLOCK_CLOSERS),
        "li" => HtmlTagDefinition::closed_by(&["li"]),
        "dt" | "dd" => HtmlTagDefinition::closed_by(&["dt", "dd"]),
        "option" => HtmlTagDefinition::closed_by(&["option", "optgroup"]),
        "optgroup" => HtmlTagDefinition::closed_by(&["optgroup"]),
        "tr" => HtmlTagDefinition::closed_by(&["tr"]),
        "td" | "th" => HtmlTagDefinition::closed_by(&["td", "th"]),
        "thead" | "tbody" => HtmlTagDefinition::closed_by(&["tbody", "tfoot"]),
        "script" | "style" => HtmlTagDefinition::content(TagContentType::RawText),
        "title" => HtmlTagDefinition::content(TagContentType::EscapableRawText),
        "textarea" => HtmlTagDefinition {
            ignore_first_lf: true,
            ..HtmlTagDefinition::content(TagContentType::EscapableRawText)
        },
        "pre" | "listing" => HtmlTagDefinition {
            ignore_first_lf: true,
            ..HtmlTagDefinition::parsable()
        },
        _ => HtmlTagDefinition::parsable(),
    }
}

pub fn is_ng_container(tag_name: &str) -> bool {
    tag_name == "ng-container"
}

pub fn is_ng_content(tag_name: &str) -> bool {
    tag_name == "ng-content"
}

/// `<ng-template>` and the legacy `<template>` both declare an embedded template.
pub fn is_ng_template(tag_name: &str) -> bool {
    tag_name == "ng-template" || tag_name == "template"
}
