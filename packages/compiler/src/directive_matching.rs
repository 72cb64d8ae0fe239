//! Directive Matching
//!
//! CSS-like selector parsing (`CssSelector`) and the indexed `SelectorMatcher`
//! used to find every directive whose selector applies to an element.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

static SELECTOR_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(\:not\()|(([\.\#]?)[-\w]+)|(?:\[([-.\w*\\$]+)(?:=(?:"([^"]*)"|'([^']*)'|([^\]]*)))?\])|(\))|(\s*,\s*)"#,
    )
    .expect("selector regexp is valid")
});

/// Capture groups of `SELECTOR_REGEXP`.
#[derive(Debug, Clone, Copy)]
enum SelectorGroup {
    Not = 1,
    Tag = 2,
    Prefix = 3,
    Attribute = 4,
    AttributeValueDouble = 5,
    AttributeValueSingle = 6,
    AttributeValueUnquoted = 7,
    NotEnd = 8,
    Separator = 9,
}

/// A parsed selector: optional element name, attribute pairs, classes and
/// negated sub-selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssSelector {
    pub element: Option<String>,
    pub class_names: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub not_selectors: Vec<CssSelector>,
}

impl CssSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated selector list into its alternatives.
    pub fn parse(selector: &str) -> Result<Vec<CssSelector>, String> {
        let mut results = Vec::new();
        let mut current = CssSelector::new();
        let mut in_not = false;

        for cap in SELECTOR_REGEXP.captures_iter(selector) {
            if cap.get(SelectorGroup::Not as usize).is_some() {
                if in_not {
                    return Err("Nesting :not in a selector is not allowed".to_string());
                }
                in_not = true;
                current.not_selectors.push(CssSelector::new());
            }

            if let Some(tag) = cap.get(SelectorGroup::Tag as usize) {
                let tag = tag.as_str();
                let target = selection_target(&mut current, in_not);
                match cap.get(SelectorGroup::Prefix as usize).map(|m| m.as_str()) {
                    Some("#") => target.add_attribute("id", &tag[1..]),
                    Some(".") => target.add_class_name(&tag[1..]),
                    _ => target.set_element(tag),
                }
            }

            if let Some(attr) = cap.get(SelectorGroup::Attribute as usize) {
                let value = [
                    SelectorGroup::AttributeValueDouble,
                    SelectorGroup::AttributeValueSingle,
                    SelectorGroup::AttributeValueUnquoted,
                ]
                .iter()
                .find_map(|group| cap.get(*group as usize))
                .map(|m| m.as_str())
                .unwrap_or("");
                let target = selection_target(&mut current, in_not);
                target.add_attribute(&unescape_attribute(attr.as_str())?, value);
            }

            if cap.get(SelectorGroup::NotEnd as usize).is_some() {
                in_not = false;
            }

            if cap.get(SelectorGroup::Separator as usize).is_some() {
                if in_not {
                    return Err("Multiple selectors in :not are not supported".to_string());
                }
                push_result(&mut results, std::mem::take(&mut current));
            }
        }

        push_result(&mut results, current);
        Ok(results)
    }

    pub fn set_element(&mut self, element: &str) {
        self.element = Some(element.to_string());
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        self.attrs.push((name.to_string(), value.to_lowercase()));
    }

    pub fn add_class_name(&mut self, name: &str) {
        self.class_names.push(name.to_lowercase());
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Builds the candidate selector describing an element: its name, every
    /// attribute and one class term per token of `class`.
    pub fn for_element<'a>(
        element: &str,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> CssSelector {
        let mut selector = CssSelector::new();
        selector.set_element(element);
        for (name, value) in attrs {
            selector.add_attribute(name, value);
            if name.eq_ignore_ascii_case("class") {
                for class_name in value.split_whitespace() {
                    selector.add_class_name(class_name);
                }
            }
        }
        selector
    }
}

/// The selector receiving terms: the open `:not(...)` group, if any.
fn selection_target(current: &mut CssSelector, in_not: bool) -> &mut CssSelector {
    if in_not {
        if let Some(last) = current.not_selectors.len().checked_sub(1) {
            return &mut current.not_selectors[last];
        }
    }
    current
}

fn push_result(results: &mut Vec<CssSelector>, mut selector: CssSelector) {
    if !selector.not_selectors.is_empty()
        && selector.element.is_none()
        && selector.class_names.is_empty()
        && selector.attrs.is_empty()
    {
        selector.element = Some("*".to_string());
    }
    results.push(selector);
}

/// Removes `\$` escapes; an unescaped `$` is rejected.
fn unescape_attribute(attr: &str) -> Result<String, String> {
    let mut result = String::with_capacity(attr.len());
    let mut escaping = false;
    for ch in attr.chars() {
        if ch == '\\' {
            escaping = true;
            continue;
        }
        if ch == '$' && !escaping {
            return Err(format!(
                "Error in attribute selector \"{}\". Unescaped \"$\" is not supported. Please escape with \"\\$\".",
                attr
            ));
        }
        escaping = false;
        result.push(ch);
    }
    Ok(result)
}

impl fmt::Display for CssSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element.as_deref().unwrap_or(""))?;
        for class_name in &self.class_names {
            write!(f, ".{}", class_name)?;
        }
        for (name, value) in &self.attrs {
            let name = name.replace('$', "\\$");
            if value.is_empty() {
                write!(f, "[{}]", name)?;
            } else {
                write!(f, "[{}={}]", name, value)?;
            }
        }
        for not_selector in &self.not_selectors {
            write!(f, ":not({})", not_selector)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct SelectorContext<T> {
    selector: CssSelector,
    payload: T,
    id: usize,
}

/// Maps registered selectors to payloads. Lookups are indexed by element
/// name, class name and attribute name/value.
#[derive(Debug, Clone)]
pub struct SelectorMatcher<T> {
    element_map: HashMap<String, Vec<SelectorContext<T>>>,
    class_map: HashMap<String, Vec<SelectorContext<T>>>,
    attr_map: HashMap<String, HashMap<String, Vec<SelectorContext<T>>>>,
    /// Selectors with neither element, class nor attribute terms.
    unindexed: Vec<SelectorContext<T>>,
    payload_count: usize,
}

impl<T: Clone> SelectorMatcher<T> {
    pub fn new() -> Self {
        SelectorMatcher {
            element_map: HashMap::new(),
            class_map: HashMap::new(),
            attr_map: HashMap::new(),
            unindexed: Vec::new(),
            payload_count: 0,
        }
    }

    /// Registers alternative selectors for one payload; the payload matches
    /// when any alternative does, and is reported once.
    pub fn add_selectables(&mut self, selectors: &[CssSelector], payload: T) {
        let id = self.payload_count;
        self.payload_count += 1;
        for selector in selectors {
            self.add_context(SelectorContext {
                selector: selector.clone(),
                payload: payload.clone(),
                id,
            });
        }
    }

    pub fn add_selectable(&mut self, selector: CssSelector, payload: T) {
        self.add_selectables(std::slice::from_ref(&selector), payload);
    }

    fn add_context(&mut self, context: SelectorContext<T>) {
        let selector = &context.selector;
        if let Some(element) = &selector.element {
            self.element_map
                .entry(element.clone())
                .or_default()
                .push(context.clone());
        } else if let Some(class_name) = selector.class_names.first() {
            self.class_map
                .entry(class_name.clone())
                .or_default()
                .push(context.clone());
        } else if let Some((name, value)) = selector.attrs.first() {
            self.attr_map
                .entry(name.clone())
                .or_default()
                .entry(value.clone())
                .or_default()
                .push(context.clone());
        } else {
            self.unindexed.push(context);
        }
    }

    /// Invokes `callback` once per payload whose selector matches `candidate`.
    /// Returns whether anything matched.
    pub fn match_selector<F>(&self, candidate: &CssSelector, mut callback: F) -> bool
    where
        F: FnMut(&CssSelector, &T),
    {
        let mut seen = HashSet::new();
        let mut visit = |contexts: Option<&Vec<SelectorContext<T>>>| {
            for context in contexts.into_iter().flatten() {
                if !seen.contains(&context.id) && is_match(candidate, &context.selector) {
                    seen.insert(context.id);
                    callback(&context.selector, &context.payload);
                }
            }
        };

        if let Some(element) = &candidate.element {
            visit(self.element_map.get(element));
        }
        visit(self.element_map.get("*"));
        for class_name in &candidate.class_names {
            visit(self.class_map.get(class_name));
        }
        for (name, value) in &candidate.attrs {
            if let Some(values) = self.attr_map.get(name) {
                visit(values.get(value));
                if !value.is_empty() {
                    visit(values.get(""));
                }
            }
        }
        visit(Some(&self.unindexed));

        !seen.is_empty()
    }

    /// Collects every matching payload.
    pub fn match_all(&self, candidate: &CssSelector) -> Vec<T> {
        let mut matched = Vec::new();
        self.match_selector(candidate, |_, payload| matched.push(payload.clone()));
        matched
    }
}

impl<T: Clone> Default for SelectorMatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn is_match(candidate: &CssSelector, pattern: &CssSelector) -> bool {
    if let Some(element) = &pattern.element {
        if element != "*" && candidate.element.as_deref() != Some(element.as_str()) {
            return false;
        }
    }

    if !pattern
        .class_names
        .iter()
        .all(|class_name| candidate.class_names.contains(class_name))
    {
        return false;
    }

    let attrs_match = pattern.attrs.iter().all(|(name, value)| {
        candidate.attrs.iter().any(|(candidate_name, candidate_value)| {
            candidate_name == name && (value.is_empty() || candidate_value.eq_ignore_ascii_case(value))
        })
    });
    if !attrs_match {
        return false;
    }

    !pattern
        .not_selectors
        .iter()
        .any(|negated| is_match(candidate, negated))
}
