//! Template Preparser
//!
//! Classifies elements before binding: projection points, elements dropped
//! from the template, and the attributes that change how an element binds.

use crate::ml_parser::ast::Element;
use crate::ml_parser::tags::is_ng_content;

const NG_CONTENT_SELECT_ATTR: &str = "select";
const NG_NON_BINDABLE_ATTR: &str = "ngNonBindable";
const NG_PROJECT_AS_ATTR: &str = "ngProjectAs";
const WILDCARD_SELECTOR: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparsedElementType {
    NgContent,
    /// `<style>`, inlined into the component styles elsewhere
    Style,
    /// `<link rel="stylesheet">`
    Stylesheet,
    Script,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparsedElement {
    pub element_type: PreparsedElementType,
    /// Normalized `select` of an `<ng-content>`; `*` when absent or blank
    pub select_attr: String,
    pub non_bindable: bool,
    /// Selector to project the element as, from `ngProjectAs`
    pub project_as: Option<String>,
}

impl PreparsedElement {
    /// Whether the element is removed from the template entirely.
    pub fn is_dropped(&self) -> bool {
        matches!(
            self.element_type,
            PreparsedElementType::Style | PreparsedElementType::Stylesheet | PreparsedElementType::Script
        )
    }
}

pub fn preparse_element(element: &Element) -> PreparsedElement {
    let mut select = None;
    let mut is_stylesheet_link = false;
    let mut non_bindable = false;
    let mut project_as = None;

    for attr in &element.attrs {
        match attr.name.as_str() {
            NG_NON_BINDABLE_ATTR => non_bindable = true,
            NG_PROJECT_AS_ATTR if !attr.value.is_empty() => project_as = Some(attr.value.clone()),
            name if name.eq_ignore_ascii_case(NG_CONTENT_SELECT_ATTR) => select = Some(attr.value.as_str()),
            name if name.eq_ignore_ascii_case("rel") => {
                is_stylesheet_link = attr.value.eq_ignore_ascii_case("stylesheet")
            }
            _ => {}
        }
    }

    let tag = element.name.to_ascii_lowercase();
    let element_type = if is_ng_content(&element.name) {
        PreparsedElementType::NgContent
    } else if tag == "style" {
        PreparsedElementType::Style
    } else if tag == "script" {
        PreparsedElementType::Script
    } else if tag == "link" && is_stylesheet_link {
        PreparsedElementType::Stylesheet
    } else {
        PreparsedElementType::Other
    };

    PreparsedElement {
        element_type,
        select_attr: normalize_ng_content_select(select),
        non_bindable,
        project_as,
    }
}

fn normalize_ng_content_select(select: Option<&str>) -> String {
    match select.map(str::trim) {
        Some(select) if !select.is_empty() => select.to_string(),
        _ => WILDCARD_SELECTOR.to_string(),
    }
}
