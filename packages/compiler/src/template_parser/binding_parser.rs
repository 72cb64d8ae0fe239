//! Binding Parser
//!
//! Turns attribute values into parsed property, event and variable bindings,
//! delegating expression text to the [`ExpressionParser`]. Parse failures are
//! recorded and replaced with a placeholder literal so traversal continues.

use super::template_ast::{BoundElementPropertyAst, BoundEventAst, PropertyBindingType};
use crate::expression_parser::{
    ASTWithSource, ExpressionParser, LiteralPrimitive, LiteralValue, ParseSpan, TemplateBinding,
    TemplateBindingIdentifier, AbsoluteSourceSpan, AST,
};
use crate::metadata::DirectiveDescriptor;
use crate::ml_parser::InterpolationConfig;
use crate::parse_util::{ParseError, ParseSourceSpan};
use crate::schema::{ElementSchemaRegistry, SecurityContext};

const PROPERTY_PARTS_SEPARATOR: char = '.';
const ATTRIBUTE_PREFIX: &str = "attr";
const CLASS_PREFIX: &str = "class";
const STYLE_PREFIX: &str = "style";

/// Substituted for any expression that failed to parse.
pub const ERROR_PLACEHOLDER: &str = "ERROR";

/// Event targets that may prefix an event name, `(window:resize)`.
const GLOBAL_EVENT_TARGETS: &[&str] = &["window", "document", "body"];

#[derive(Debug, Clone)]
pub struct ParsedProperty {
    pub name: String,
    pub expression: ASTWithSource,
    /// Bound from a plain attribute value rather than a binding
    pub is_literal: bool,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone)]
pub struct ParsedEvent {
    pub name: String,
    pub target: Option<String>,
    pub handler: ASTWithSource,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone)]
pub struct ParsedVariable {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// Where the bindings of one attribute land.
#[derive(Debug, Default)]
pub struct BindingTargets {
    /// `(name, value)` pairs the directive selectors are matched against
    pub matchable_attrs: Vec<(String, String)>,
    pub props: Vec<ParsedProperty>,
    pub events: Vec<ParsedEvent>,
    pub vars: Vec<ParsedVariable>,
}

pub struct BindingParser<'a> {
    expr_parser: &'a dyn ExpressionParser,
    schema_registry: &'a dyn ElementSchemaRegistry,
    interpolation_config: InterpolationConfig,
    errors: Vec<ParseError>,
}

impl<'a> BindingParser<'a> {
    pub fn new(
        expr_parser: &'a dyn ExpressionParser,
        interpolation_config: InterpolationConfig,
        schema_registry: &'a dyn ElementSchemaRegistry,
    ) -> Self {
        BindingParser {
            expr_parser,
            schema_registry,
            interpolation_config,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Parses text that may contain interpolations. `None` when it has none.
    pub fn parse_interpolation(&mut self, value: &str, source_span: &ParseSourceSpan) -> Option<ASTWithSource> {
        let location = source_span.start.to_string();
        match self.expr_parser.parse_interpolation(
            value,
            &location,
            source_span.start.offset,
            &self.interpolation_config,
        ) {
            Ok(ast) => ast,
            Err(error) => {
                self.report_error(error.to_string(), source_span);
                Some(self.error_placeholder(value, &location, source_span.start.offset))
            }
        }
    }

    /// Expands a structural micro-syntax into properties and variables.
    /// `tpl_key` is empty for the literal `template="..."` form.
    pub fn parse_inline_template_binding(
        &mut self,
        tpl_key: &str,
        tpl_value: &str,
        source_span: &ParseSourceSpan,
        absolute_value_offset: usize,
        targets: &mut BindingTargets,
    ) {
        let location = source_span.start.to_string();
        let key = (!tpl_key.is_empty()).then(|| TemplateBindingIdentifier {
            source: tpl_key.to_string(),
            span: AbsoluteSourceSpan::new(source_span.start.offset, source_span.start.offset + tpl_key.len() + 1),
        });
        let bindings = match self
            .expr_parser
            .parse_template_bindings(key.as_ref(), tpl_value, &location, absolute_value_offset)
        {
            Ok(bindings) => bindings,
            Err(error) => {
                self.report_error(error.to_string(), source_span);
                return;
            }
        };

        for binding in bindings {
            match binding {
                TemplateBinding::Variable { key, value, .. } => {
                    targets.vars.push(ParsedVariable {
                        name: key.source,
                        value: value.map_or_else(|| "$implicit".to_string(), |v| v.source),
                        source_span: source_span.clone(),
                    });
                }
                TemplateBinding::Expression { key, value: Some(value), .. } => {
                    targets.matchable_attrs.push((key.source.clone(), String::new()));
                    targets.props.push(ParsedProperty {
                        name: key.source,
                        expression: value,
                        is_literal: false,
                        source_span: source_span.clone(),
                    });
                }
                TemplateBinding::Expression { key, value: None, .. } => {
                    targets.matchable_attrs.push((key.source.clone(), String::new()));
                    self.parse_literal_attr(&key.source, "", source_span, targets);
                }
            }
        }
    }

    pub fn parse_property_binding(
        &mut self,
        name: &str,
        expression: &str,
        source_span: &ParseSourceSpan,
        absolute_offset: usize,
        targets: &mut BindingTargets,
    ) {
        let ast = self.parse_binding(expression, source_span, absolute_offset);
        targets.matchable_attrs.push((name.to_string(), String::new()));
        targets.props.push(ParsedProperty {
            name: name.to_string(),
            expression: ast,
            is_literal: false,
            source_span: source_span.clone(),
        });
    }

    /// Binds an interpolated attribute value as a property. Returns whether
    /// the value held any interpolation.
    pub fn parse_property_interpolation(
        &mut self,
        name: &str,
        value: &str,
        source_span: &ParseSourceSpan,
        targets: &mut BindingTargets,
    ) -> bool {
        match self.parse_interpolation(value, source_span) {
            Some(ast) => {
                targets.matchable_attrs.push((name.to_string(), String::new()));
                targets.props.push(ParsedProperty {
                    name: name.to_string(),
                    expression: ast,
                    is_literal: false,
                    source_span: source_span.clone(),
                });
                true
            }
            None => false,
        }
    }

    /// Records a plain attribute as a literal property, for directive inputs.
    pub fn parse_literal_attr(
        &mut self,
        name: &str,
        value: &str,
        source_span: &ParseSourceSpan,
        targets: &mut BindingTargets,
    ) {
        let ast = AST::LiteralPrimitive(LiteralPrimitive {
            span: ParseSpan::new(0, value.len()),
            value: LiteralValue::String(value.to_string()),
        });
        targets.props.push(ParsedProperty {
            name: name.to_string(),
            expression: ASTWithSource::new(ast, value, source_span.start.to_string(), source_span.start.offset),
            is_literal: true,
            source_span: source_span.clone(),
        });
    }

    /// `(name)="handler"` or `(target:name)="handler"`.
    pub fn parse_event(
        &mut self,
        name: &str,
        expression: &str,
        source_span: &ParseSourceSpan,
        absolute_offset: usize,
        targets: &mut BindingTargets,
    ) {
        let (target, event_name) = match name.split_once(':') {
            Some((target, event)) if GLOBAL_EVENT_TARGETS.contains(&target.trim()) => {
                (Some(target.trim().to_string()), event.trim().to_string())
            }
            _ => (None, name.to_string()),
        };
        let handler = self.parse_action(expression, source_span, absolute_offset);
        targets.matchable_attrs.push((name.to_string(), String::new()));
        targets.events.push(ParsedEvent {
            name: event_name,
            target,
            handler,
            source_span: source_span.clone(),
        });
    }

    /// `[(name)]="expr"`: a property binding plus a `name-change` event
    /// assigning `$event` back to `expr`.
    pub fn parse_two_way_binding(
        &mut self,
        name: &str,
        expression: &str,
        source_span: &ParseSourceSpan,
        absolute_offset: usize,
        targets: &mut BindingTargets,
    ) {
        self.parse_property_binding(name, expression, source_span, absolute_offset, targets);
        let handler = format!("{}=$event", expression);
        let event_name = format!("{}-change", name);
        let ast = self.parse_action(&handler, source_span, absolute_offset);
        targets.events.push(ParsedEvent {
            name: event_name,
            target: None,
            handler: ast,
            source_span: source_span.clone(),
        });
    }

    pub fn parse_binding(&mut self, value: &str, source_span: &ParseSourceSpan, absolute_offset: usize) -> ASTWithSource {
        let location = source_span.start.to_string();
        match self.expr_parser.parse_binding(value, &location, absolute_offset) {
            Ok(ast) => ast,
            Err(error) => {
                self.report_error(error.to_string(), source_span);
                self.error_placeholder(value, &location, absolute_offset)
            }
        }
    }

    fn parse_action(&mut self, value: &str, source_span: &ParseSourceSpan, absolute_offset: usize) -> ASTWithSource {
        let location = source_span.start.to_string();
        if value.trim().is_empty() {
            self.report_error("Empty expressions are not allowed", source_span);
            return self.error_placeholder(value, &location, absolute_offset);
        }
        match self.expr_parser.parse_action(value, &location, absolute_offset) {
            Ok(ast) => ast,
            Err(error) => {
                self.report_error(error.to_string(), source_span);
                self.error_placeholder(value, &location, absolute_offset)
            }
        }
    }

    /// Splits `attr.x`, `class.x` and `style.x[.unit]` targets into their
    /// binding kind, and resolves plain properties through the schema.
    pub fn create_bound_element_property(
        &mut self,
        element_name: &str,
        bound_prop: &ParsedProperty,
    ) -> BoundElementPropertyAst {
        let parts: Vec<&str> = bound_prop.name.split(PROPERTY_PARTS_SEPARATOR).collect();
        let (name, kind, unit, security_context) = match parts.as_slice() {
            [ATTRIBUTE_PREFIX, rest @ ..] if !rest.is_empty() => {
                let name = rest.join(".");
                self.validate_attribute_name(&name, &bound_prop.source_span);
                let context = self.schema_registry.security_context(element_name, &name, true);
                (name, PropertyBindingType::Attribute, None, context)
            }
            [CLASS_PREFIX, rest @ ..] if !rest.is_empty() => {
                (rest.join("."), PropertyBindingType::Class, None, SecurityContext::None)
            }
            [STYLE_PREFIX, style, unit @ ..] => {
                let unit = (!unit.is_empty()).then(|| unit.join("."));
                (style.to_string(), PropertyBindingType::Style, unit, SecurityContext::Style)
            }
            [CLASS_PREFIX] | ["className"] => (String::new(), PropertyBindingType::Class, None, SecurityContext::None),
            [STYLE_PREFIX] => (String::new(), PropertyBindingType::Style, None, SecurityContext::Style),
            _ => {
                let name = self.schema_registry.get_mapped_prop_name(&bound_prop.name);
                self.validate_property_name(&name, &bound_prop.source_span);
                let context = self.schema_registry.security_context(element_name, &name, false);
                (name, PropertyBindingType::Property, None, context)
            }
        };
        BoundElementPropertyAst {
            name,
            kind,
            security_context,
            value: bound_prop.expression.clone(),
            unit,
            source_span: bound_prop.source_span.clone(),
        }
    }

    /// Parses a directive's host property bindings against its host element.
    pub fn create_directive_host_property_asts(
        &mut self,
        directive: &DirectiveDescriptor,
        element_name: &str,
        source_span: &ParseSourceSpan,
    ) -> Vec<BoundElementPropertyAst> {
        let mut targets = BindingTargets::default();
        for (name, expression) in &directive.host_properties {
            self.parse_property_binding(name, expression, source_span, source_span.start.offset, &mut targets);
        }
        targets
            .props
            .iter()
            .map(|prop| self.create_bound_element_property(element_name, prop))
            .collect()
    }

    pub fn create_directive_host_event_asts(
        &mut self,
        directive: &DirectiveDescriptor,
        source_span: &ParseSourceSpan,
    ) -> Vec<BoundEventAst> {
        let mut targets = BindingTargets::default();
        for (name, handler) in &directive.host_listeners {
            self.parse_event(name, handler, source_span, source_span.start.offset, &mut targets);
        }
        targets
            .events
            .into_iter()
            .map(|event| BoundEventAst {
                name: event.name,
                target: event.target,
                handler: event.handler,
                source_span: event.source_span,
            })
            .collect()
    }

    fn validate_property_name(&mut self, name: &str, source_span: &ParseSourceSpan) {
        let report = self.schema_registry.validate_property(name);
        if report.error {
            self.report_error(report.msg.unwrap_or_default(), source_span);
        }
    }

    fn validate_attribute_name(&mut self, name: &str, source_span: &ParseSourceSpan) {
        let report = self.schema_registry.validate_attribute(name);
        if report.error {
            self.report_error(report.msg.unwrap_or_default(), source_span);
        }
    }

    fn error_placeholder(&self, value: &str, location: &str, absolute_offset: usize) -> ASTWithSource {
        let ast = AST::string_literal(ParseSpan::new(0, value.len()), ERROR_PLACEHOLDER);
        ASTWithSource::new(ast, value, location, absolute_offset)
    }

    pub fn report_error(&mut self, message: impl Into<String>, source_span: &ParseSourceSpan) {
        self.errors.push(ParseError::new(source_span.clone(), message));
    }
}
