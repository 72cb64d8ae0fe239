//! Template Parser
//!
//! Walks the markup tree and builds the Template AST: matches directives per
//! element, splits element and directive bindings, expands structural
//! attributes into embedded templates and resolves content projection.
//! Validation problems are collected and never stop the traversal.

use super::attribute_name::{AttributeKind, AttributeName};
use super::binding_parser::{BindingParser, BindingTargets, ParsedEvent, ParsedProperty, ParsedVariable};
use super::template_ast::*;
use super::template_preparser::{preparse_element, PreparsedElementType};
use crate::config::CompilerOptions;
use crate::directive_matching::{CssSelector, SelectorMatcher};
use crate::expression_parser::ExpressionParser;
use crate::metadata::DirectiveDescriptor;
use crate::ml_parser::{is_ng_template, Element, HtmlParser, Node, ParseOptions, ParseTreeResult, Text};
use crate::parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};
use crate::schema::ElementSchemaRegistry;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

const TEMPLATE_ELEMENT: &str = "ng-template";
const IMPLICIT_VARIABLE: &str = "$implicit";
/// Decoded `&ngsp;`: a space that survives whitespace removal
const NGSP_UNICODE: char = '\u{E500}';

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\n\r\x0C]+").expect("static regex"));

#[derive(Debug, Clone)]
pub struct TemplateParseResult {
    pub template_ast: Vec<TemplateAst>,
    /// `select` of every `<ng-content>` in document order, `*` when absent
    pub ng_content_selectors: Vec<String>,
    pub errors: Vec<ParseError>,
}

pub struct TemplateParser<'a> {
    options: &'a CompilerOptions,
    expr_parser: &'a dyn ExpressionParser,
    schema_registry: &'a dyn ElementSchemaRegistry,
}

impl<'a> TemplateParser<'a> {
    pub fn new(
        options: &'a CompilerOptions,
        expr_parser: &'a dyn ExpressionParser,
        schema_registry: &'a dyn ElementSchemaRegistry,
    ) -> Self {
        TemplateParser {
            options,
            expr_parser,
            schema_registry,
        }
    }

    #[instrument(skip(self, template, directives))]
    pub fn parse(&self, template: &str, url: &str, directives: &[DirectiveDescriptor]) -> TemplateParseResult {
        let options = ParseOptions {
            interpolation: self.options.interpolation.clone(),
        };
        let html = HtmlParser::new().parse(template, url, &options);
        self.try_parse_html(html, url, directives)
    }

    /// Builds the Template AST from an already parsed markup tree.
    pub fn try_parse_html(
        &self,
        html: ParseTreeResult,
        url: &str,
        directives: &[DirectiveDescriptor],
    ) -> TemplateParseResult {
        let root_span = ParseSourceSpan::empty(Arc::new(ParseSourceFile::new("", url)));
        let mut visitor = TemplateParseVisitor::new(self, directives, &root_span);
        let template_ast = visitor.visit_children(&html.root_nodes, &ElementContext::empty(), false);

        let mut errors = html.errors;
        errors.append(&mut visitor.errors);
        errors.append(&mut visitor.binding_parser.take_errors());
        debug!(
            url,
            nodes = template_ast.len(),
            ng_content = visitor.ng_content_selectors.len(),
            errors = errors.len(),
            "built template ast"
        );
        TemplateParseResult {
            template_ast,
            ng_content_selectors: visitor.ng_content_selectors,
            errors,
        }
    }
}

/// A `#name="exportAs"` declaration before it is resolved.
struct ElementOrDirectiveRef {
    name: String,
    value: String,
    source_span: ParseSourceSpan,
}

struct TemplateParseVisitor<'p> {
    options: &'p CompilerOptions,
    schema_registry: &'p dyn ElementSchemaRegistry,
    binding_parser: BindingParser<'p>,
    directives: Vec<Arc<DirectiveDescriptor>>,
    selector_matcher: SelectorMatcher<usize>,
    ng_content_count: usize,
    ng_content_selectors: Vec<String>,
    errors: Vec<ParseError>,
}

impl<'p> TemplateParseVisitor<'p> {
    fn new(parser: &TemplateParser<'p>, directives: &[DirectiveDescriptor], root_span: &ParseSourceSpan) -> Self {
        let mut selector_matcher = SelectorMatcher::new();
        let mut errors = Vec::new();
        for (index, directive) in directives.iter().enumerate() {
            match CssSelector::parse(&directive.selector) {
                Ok(selectors) => selector_matcher.add_selectables(&selectors, index),
                Err(msg) => errors.push(ParseError::new(
                    root_span.clone(),
                    format!("Invalid selector \"{}\" of {}: {}", directive.selector, directive.type_name, msg),
                )),
            }
        }
        TemplateParseVisitor {
            options: parser.options,
            schema_registry: parser.schema_registry,
            binding_parser: BindingParser::new(
                parser.expr_parser,
                parser.options.interpolation.clone(),
                parser.schema_registry,
            ),
            directives: directives.iter().cloned().map(Arc::new).collect(),
            selector_matcher,
            ng_content_count: 0,
            ng_content_selectors: Vec::new(),
            errors,
        }
    }

    fn visit_children(&mut self, nodes: &[Node], parent: &ElementContext, non_bindable: bool) -> Vec<TemplateAst> {
        nodes
            .iter()
            .filter_map(|node| match node {
                Node::Element(element) if non_bindable => self.visit_non_bindable_element(element, parent),
                Node::Element(element) => self.visit_element(element, parent),
                Node::Text(text) => self.visit_text(text, parent, non_bindable),
                Node::Comment(_) => None,
            })
            .collect()
    }

    fn visit_text(&mut self, text: &Text, parent: &ElementContext, non_bindable: bool) -> Option<TemplateAst> {
        let value = if self.options.preserve_whitespaces {
            text.value.replace(NGSP_UNICODE, " ")
        } else {
            if text.value.trim_matches(|c: char| c.is_ascii_whitespace()).is_empty() {
                return None;
            }
            WHITESPACE_RUN.replace_all(&text.value, " ").replace(NGSP_UNICODE, " ")
        };
        let ng_content_index = parent.find_ng_content_index_for_text();
        if !non_bindable {
            if let Some(expr) = self.binding_parser.parse_interpolation(&value, &text.source_span) {
                return Some(TemplateAst::BoundText(BoundTextAst {
                    value: expr,
                    ng_content_index,
                    source_span: text.source_span.clone(),
                }));
            }
        }
        Some(TemplateAst::Text(TextAst {
            value,
            ng_content_index,
            source_span: text.source_span.clone(),
        }))
    }

    fn visit_element(&mut self, element: &Element, parent: &ElementContext) -> Option<TemplateAst> {
        let preparsed = preparse_element(element);
        if preparsed.is_dropped() {
            return None;
        }
        if preparsed.non_bindable {
            return self.visit_non_bindable_element(element, parent);
        }

        let is_template_element = is_ng_template(&element.name);
        let mut targets = BindingTargets::default();
        let mut template_targets = BindingTargets::default();
        let mut attrs = Vec::new();
        let mut element_refs = Vec::new();
        let mut has_inline_template = false;

        for attr in &element.attrs {
            let name = AttributeName::parse(&attr.name);
            let span = &attr.source_span;
            let offset = attr.value_offset();
            match name.kind {
                AttributeKind::Template => {
                    if has_inline_template {
                        self.report_error(
                            "Can't have multiple template bindings on one element. Use only one attribute prefixed with *",
                            span,
                        );
                        continue;
                    }
                    has_inline_template = true;
                    self.binding_parser.parse_inline_template_binding(
                        &name.name,
                        &attr.value,
                        span,
                        offset,
                        &mut template_targets,
                    );
                }
                AttributeKind::Property => {
                    self.binding_parser
                        .parse_property_binding(&name.name, &attr.value, span, offset, &mut targets)
                }
                AttributeKind::Event => {
                    self.binding_parser.parse_event(&name.name, &attr.value, span, offset, &mut targets)
                }
                AttributeKind::TwoWay => {
                    self.binding_parser
                        .parse_two_way_binding(&name.name, &attr.value, span, offset, &mut targets)
                }
                AttributeKind::Reference => self.parse_reference(&name.name, &attr.value, span, &mut element_refs),
                AttributeKind::Variable if is_template_element => {
                    self.parse_variable(&name.name, &attr.value, span, &mut targets.vars)
                }
                AttributeKind::Variable => {
                    self.report_error("\"let-\" is only supported on ng-template elements.", span)
                }
                AttributeKind::Var if is_template_element => {
                    self.parse_variable(&name.name, &attr.value, span, &mut targets.vars)
                }
                AttributeKind::Var => self.parse_reference(&name.name, &attr.value, span, &mut element_refs),
                AttributeKind::Literal => {
                    let bound = self
                        .binding_parser
                        .parse_property_interpolation(&attr.name, &attr.value, span, &mut targets);
                    if !bound {
                        self.binding_parser
                            .parse_literal_attr(&attr.name, &attr.value, span, &mut targets);
                        targets.matchable_attrs.push((attr.name.clone(), attr.value.clone()));
                        attrs.push(AttrAst {
                            name: attr.name.clone(),
                            value: attr.value.clone(),
                            source_span: span.clone(),
                        });
                    }
                }
            }
        }

        let match_name = if is_template_element { TEMPLATE_ELEMENT } else { element.name.as_str() };
        let element_selector = create_element_css_selector(match_name, &targets.matchable_attrs);
        let directive_metas = self.parse_directives(&element_selector);
        let mut references = Vec::new();
        let mut bound_directive_prop_names = HashSet::new();
        let directive_asts = self.create_directive_asts(
            is_template_element,
            &element.name,
            &directive_metas,
            &targets.props,
            &element_refs,
            &element.source_span,
            &mut references,
            &mut bound_directive_prop_names,
        );
        let element_props = self.create_element_property_asts(
            &element.name,
            &targets.props,
            &bound_directive_prop_names,
            is_template_element,
        );
        let events: Vec<BoundEventAst> = targets.events.into_iter().map(bound_event).collect();

        let projection_selector = preparsed
            .project_as
            .as_deref()
            .and_then(|selector| CssSelector::parse(selector).ok())
            .and_then(|selectors| selectors.into_iter().next())
            .unwrap_or_else(|| element_selector.clone());
        let ng_content_index = parent.find_ng_content_index(&projection_selector);
        let own_ng_content_index = if has_inline_template { None } else { ng_content_index };

        let mut parsed = if preparsed.element_type == PreparsedElementType::NgContent {
            if element.children.iter().any(|child| !is_whitespace(child)) {
                self.report_error("<ng-content> element cannot have content.", &element.source_span);
            }
            let index = self.ng_content_count;
            self.ng_content_count += 1;
            self.ng_content_selectors.push(preparsed.select_attr.clone());
            TemplateAst::NgContent(NgContentAst {
                index,
                ng_content_index: own_ng_content_index,
                source_span: element.source_span.clone(),
            })
        } else if is_template_element {
            self.assert_all_events_published_by_directives(&directive_asts, &events);
            self.assert_no_components_nor_element_bindings_on_template(
                &directive_asts,
                &element_props,
                &element.source_span,
            );
            let context = ElementContext::create(&directive_asts);
            let children = self.visit_children(&element.children, &context, false);
            TemplateAst::EmbeddedTemplate(EmbeddedTemplateAst {
                attrs,
                outputs: events,
                references,
                variables: targets.vars.into_iter().map(variable).collect(),
                directives: directive_asts,
                children,
                ng_content_index: own_ng_content_index,
                source_span: element.source_span.clone(),
            })
        } else {
            self.assert_only_one_component(&directive_asts, &element.source_span);
            let context = ElementContext::create(&directive_asts);
            let children = self.visit_children(&element.children, &context, false);
            TemplateAst::Element(ElementAst {
                name: element.name.clone(),
                attrs,
                inputs: element_props,
                outputs: events,
                references,
                directives: directive_asts,
                children,
                ng_content_index: own_ng_content_index,
                source_span: element.source_span.clone(),
            })
        };

        if has_inline_template {
            let template_selector = create_element_css_selector(TEMPLATE_ELEMENT, &template_targets.matchable_attrs);
            let template_metas = self.parse_directives(&template_selector);
            let mut template_bound_names = HashSet::new();
            let template_directive_asts = self.create_directive_asts(
                true,
                &element.name,
                &template_metas,
                &template_targets.props,
                &[],
                &element.source_span,
                &mut Vec::new(),
                &mut template_bound_names,
            );
            let template_element_props = self.create_element_property_asts(
                &element.name,
                &template_targets.props,
                &template_bound_names,
                true,
            );
            self.assert_no_components_nor_element_bindings_on_template(
                &template_directive_asts,
                &template_element_props,
                &element.source_span,
            );
            let template_attrs = template_targets
                .props
                .iter()
                .filter(|prop| prop.is_literal)
                .map(|prop| AttrAst {
                    name: prop.name.clone(),
                    value: prop.expression.source.clone(),
                    source_span: prop.source_span.clone(),
                })
                .collect();
            parsed = TemplateAst::EmbeddedTemplate(EmbeddedTemplateAst {
                attrs: template_attrs,
                outputs: Vec::new(),
                references: Vec::new(),
                variables: template_targets.vars.into_iter().map(variable).collect(),
                directives: template_directive_asts,
                children: vec![parsed],
                ng_content_index,
                source_span: element.source_span.clone(),
            });
        }
        Some(parsed)
    }

    /// Inside `ngNonBindable` markup is kept as written: literal attributes,
    /// no directives and no interpolation.
    fn visit_non_bindable_element(&mut self, element: &Element, parent: &ElementContext) -> Option<TemplateAst> {
        if preparse_element(element).is_dropped() {
            return None;
        }
        let attrs: Vec<AttrAst> = element
            .attrs
            .iter()
            .map(|attr| AttrAst {
                name: attr.name.clone(),
                value: attr.value.clone(),
                source_span: attr.source_span.clone(),
            })
            .collect();
        let selector = CssSelector::for_element(
            &element.name,
            attrs.iter().map(|attr| (attr.name.as_str(), attr.value.as_str())),
        );
        let ng_content_index = parent.find_ng_content_index(&selector);
        let children = self.visit_children(&element.children, &ElementContext::empty(), true);
        Some(TemplateAst::Element(ElementAst {
            name: element.name.clone(),
            attrs,
            inputs: Vec::new(),
            outputs: Vec::new(),
            references: Vec::new(),
            directives: Vec::new(),
            children,
            ng_content_index,
            source_span: element.source_span.clone(),
        }))
    }

    fn parse_variable(&mut self, name: &str, value: &str, span: &ParseSourceSpan, vars: &mut Vec<ParsedVariable>) {
        if name.contains('-') {
            self.report_error("\"-\" is not allowed in variable names", span);
            return;
        }
        vars.push(ParsedVariable {
            name: name.to_string(),
            value: if value.is_empty() { IMPLICIT_VARIABLE.to_string() } else { value.to_string() },
            source_span: span.clone(),
        });
    }

    fn parse_reference(
        &mut self,
        name: &str,
        value: &str,
        span: &ParseSourceSpan,
        refs: &mut Vec<ElementOrDirectiveRef>,
    ) {
        if name.contains('-') {
            self.report_error("\"-\" is not allowed in reference names", span);
            return;
        }
        if refs.iter().any(|r| r.name == name) {
            self.report_error(format!("Reference \"#{}\" is defined more than once", name), span);
            return;
        }
        refs.push(ElementOrDirectiveRef {
            name: name.to_string(),
            value: value.to_string(),
            source_span: span.clone(),
        });
    }

    /// Matching directives, the component first and the rest in declaration order.
    fn parse_directives(&self, selector: &CssSelector) -> Vec<Arc<DirectiveDescriptor>> {
        let mut matched = self.selector_matcher.match_all(selector);
        matched.sort_unstable();
        matched.dedup();
        let mut directives: Vec<_> = matched.into_iter().map(|index| self.directives[index].clone()).collect();
        directives.sort_by_key(|directive| !directive.is_component);
        directives
    }

    #[allow(clippy::too_many_arguments)]
    fn create_directive_asts(
        &mut self,
        is_template_element: bool,
        element_name: &str,
        directives: &[Arc<DirectiveDescriptor>],
        props: &[ParsedProperty],
        element_refs: &[ElementOrDirectiveRef],
        source_span: &ParseSourceSpan,
        target_references: &mut Vec<ReferenceAst>,
        bound_directive_prop_names: &mut HashSet<String>,
    ) -> Vec<DirectiveAst> {
        let mut matched_reference_names = HashSet::new();
        let mut directive_asts = Vec::with_capacity(directives.len());

        for directive in directives {
            let host_properties =
                self.binding_parser
                    .create_directive_host_property_asts(directive, element_name, source_span);
            let host_events = self.binding_parser.create_directive_host_event_asts(directive, source_span);
            let inputs = create_directive_property_asts(directive, props, bound_directive_prop_names);

            let mut export_as_vars = Vec::new();
            for element_ref in element_refs {
                let exported = directive
                    .export_as
                    .as_deref()
                    .map_or(false, |names| names.split(',').any(|n| n.trim() == element_ref.value));
                if (element_ref.value.is_empty() && directive.is_component) || exported {
                    target_references.push(ReferenceAst {
                        name: element_ref.name.clone(),
                        value: ReferenceTarget::Directive {
                            type_name: directive.type_name.clone(),
                        },
                        source_span: element_ref.source_span.clone(),
                    });
                    matched_reference_names.insert(element_ref.name.clone());
                    export_as_vars.push(element_ref.name.clone());
                }
            }

            directive_asts.push(DirectiveAst {
                directive: directive.clone(),
                inputs,
                host_properties,
                host_events,
                export_as_vars,
                source_span: source_span.clone(),
            });
        }

        for element_ref in element_refs {
            if matched_reference_names.contains(&element_ref.name) {
                continue;
            }
            if !element_ref.value.is_empty() {
                self.report_error(
                    format!("There is no directive with \"exportAs\" set to \"{}\"", element_ref.value),
                    &element_ref.source_span,
                );
            } else {
                target_references.push(ReferenceAst {
                    name: element_ref.name.clone(),
                    value: if is_template_element {
                        ReferenceTarget::TemplateRef
                    } else {
                        ReferenceTarget::Element
                    },
                    source_span: element_ref.source_span.clone(),
                });
            }
        }
        directive_asts
    }

    /// Element-level bindings: every bound property not consumed by a directive input.
    fn create_element_property_asts(
        &mut self,
        element_name: &str,
        props: &[ParsedProperty],
        bound_directive_prop_names: &HashSet<String>,
        is_template_element: bool,
    ) -> Vec<BoundElementPropertyAst> {
        let bound: Vec<BoundElementPropertyAst> = props
            .iter()
            .filter(|prop| !prop.is_literal && !bound_directive_prop_names.contains(&prop.name))
            .map(|prop| self.binding_parser.create_bound_element_property(element_name, prop))
            .collect();
        if !is_template_element {
            self.check_properties_in_schema(element_name, &bound);
        }
        bound
    }

    fn check_properties_in_schema(&mut self, element_name: &str, bound_props: &[BoundElementPropertyAst]) {
        if !self.options.check_unknown_properties {
            return;
        }
        for prop in bound_props {
            if prop.kind == PropertyBindingType::Property && !self.schema_registry.has_property(element_name, &prop.name) {
                self.report_error(
                    format!(
                        "Can't bind to '{}' since it isn't a known property of '{}'.",
                        prop.name, element_name
                    ),
                    &prop.source_span,
                );
            }
        }
    }

    fn assert_only_one_component(&mut self, directives: &[DirectiveAst], source_span: &ParseSourceSpan) {
        let components = component_type_names(directives);
        if components.len() > 1 {
            self.report_error(
                format!(
                    "More than one component matched on this element.\n\
                     Make sure that only one component's selector can match a given element.\n\
                     Conflicting components: {}",
                    components.join(",")
                ),
                source_span,
            );
        }
    }

    fn assert_no_components_nor_element_bindings_on_template(
        &mut self,
        directives: &[DirectiveAst],
        element_props: &[BoundElementPropertyAst],
        source_span: &ParseSourceSpan,
    ) {
        let components = component_type_names(directives);
        if !components.is_empty() {
            self.report_error(
                format!("Components on an embedded template: {}", components.join(",")),
                source_span,
            );
        }
        for prop in element_props {
            let name = match (prop.kind, prop.name.is_empty()) {
                (PropertyBindingType::Class, true) => "class",
                (PropertyBindingType::Style, true) => "style",
                _ => prop.name.as_str(),
            };
            self.report_error(
                format!(
                    "Property binding {} not used by any directive on an embedded template. \
                     Make sure that the property name is spelled correctly and all directives are listed.",
                    name
                ),
                &prop.source_span,
            );
        }
    }

    fn assert_all_events_published_by_directives(&mut self, directives: &[DirectiveAst], events: &[BoundEventAst]) {
        let outputs: HashSet<&str> = directives
            .iter()
            .flat_map(|d| d.directive.outputs.values().map(String::as_str))
            .collect();
        for event in events {
            if event.target.is_some() || !outputs.contains(event.name.as_str()) {
                self.report_error(
                    format!(
                        "Event binding {} not emitted by any directive on an embedded template. \
                         Make sure that the event name is spelled correctly and all directives are listed.",
                        event.full_name()
                    ),
                    &event.source_span,
                );
            }
        }
    }

    fn report_error(&mut self, message: impl Into<String>, source_span: &ParseSourceSpan) {
        self.errors.push(ParseError::new(source_span.clone(), message));
    }
}

/// Binds directive inputs. A property binding wins over a plain attribute
/// of the same name; inputs without a value are skipped.
fn create_directive_property_asts(
    directive: &DirectiveDescriptor,
    props: &[ParsedProperty],
    bound_directive_prop_names: &mut HashSet<String>,
) -> Vec<BoundDirectivePropertyAst> {
    let mut bound_props_by_name: HashMap<&str, &ParsedProperty> = HashMap::new();
    for prop in props {
        let replace = bound_props_by_name
            .get(prop.name.as_str())
            .map_or(true, |previous| previous.is_literal);
        if replace {
            bound_props_by_name.insert(&prop.name, prop);
        }
    }

    let mut inputs = Vec::new();
    for (directive_name, template_name) in &directive.inputs {
        if let Some(prop) = bound_props_by_name.get(template_name.as_str()) {
            bound_directive_prop_names.insert(prop.name.clone());
            if !prop.expression.ast.is_empty() {
                inputs.push(BoundDirectivePropertyAst {
                    directive_name: directive_name.clone(),
                    template_name: template_name.clone(),
                    value: prop.expression.clone(),
                    is_literal: prop.is_literal,
                    source_span: prop.source_span.clone(),
                });
            }
        }
    }
    inputs
}

fn create_element_css_selector(element_name: &str, matchable_attrs: &[(String, String)]) -> CssSelector {
    CssSelector::for_element(
        element_name,
        matchable_attrs.iter().map(|(name, value)| (name.as_str(), value.as_str())),
    )
}

fn component_type_names(directives: &[DirectiveAst]) -> Vec<&str> {
    directives
        .iter()
        .filter(|d| d.directive.is_component)
        .map(|d| d.directive.type_name.as_str())
        .collect()
}

fn bound_event(event: ParsedEvent) -> BoundEventAst {
    BoundEventAst {
        name: event.name,
        target: event.target,
        handler: event.handler,
        source_span: event.source_span,
    }
}

fn variable(var: ParsedVariable) -> VariableAst {
    VariableAst {
        name: var.name,
        value: var.value,
        source_span: var.source_span,
    }
}

fn is_whitespace(node: &Node) -> bool {
    match node {
        Node::Text(text) => text.value.trim().is_empty(),
        Node::Comment(_) => true,
        Node::Element(_) => false,
    }
}

/// Content projection state of the element whose children are being visited.
struct ElementContext {
    ng_content_index_matcher: SelectorMatcher<usize>,
    wildcard_ng_content_index: Option<usize>,
}

impl ElementContext {
    fn empty() -> Self {
        ElementContext {
            ng_content_index_matcher: SelectorMatcher::new(),
            wildcard_ng_content_index: None,
        }
    }

    /// Only a component host projects its children.
    fn create(directives: &[DirectiveAst]) -> Self {
        let mut context = ElementContext::empty();
        let component = directives.iter().find(|d| d.directive.is_component);
        for (index, selector) in component
            .map(|c| c.directive.ng_content_selectors.as_slice())
            .unwrap_or_default()
            .iter()
            .enumerate()
        {
            if selector == "*" {
                context.wildcard_ng_content_index = Some(index);
            } else if let Ok(selectors) = CssSelector::parse(selector) {
                context.ng_content_index_matcher.add_selectables(&selectors, index);
            }
        }
        context
    }

    /// The lowest matching projection index, else the wildcard index.
    fn find_ng_content_index(&self, selector: &CssSelector) -> Option<usize> {
        self.ng_content_index_matcher
            .match_all(selector)
            .into_iter()
            .min()
            .or(self.wildcard_ng_content_index)
    }

    fn find_ng_content_index_for_text(&self) -> Option<usize> {
        self.find_ng_content_index(&CssSelector::for_element("*", std::iter::empty()))
    }
}
