/**
 * Binding Parser Tests
 *
 * Property targets, events, two-way bindings, micro-syntax expansion and
 * error recovery of the binding parser.
 */

use std::sync::Arc;
use template_compiler::expression_parser::Parser;
use template_compiler::ml_parser::InterpolationConfig;
use template_compiler::parse_util::{ParseSourceFile, ParseSourceSpan};
use template_compiler::schema::{DomElementSchemaRegistry, SecurityContext};
use template_compiler::template_parser::binding_parser::ERROR_PLACEHOLDER;
use template_compiler::template_parser::{
    AttributeKind, AttributeName, BindingParser, BindingTargets, BoundElementPropertyAst, PropertyBindingType,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> ParseSourceSpan {
        ParseSourceSpan::empty(Arc::new(ParseSourceFile::new("", "TestComp")))
    }

    /// Runs `f` against a fresh binding parser and returns its result with the reported errors.
    fn with_parser<T>(f: impl FnOnce(&mut BindingParser, &mut BindingTargets) -> T) -> (T, BindingTargets, Vec<String>) {
        let expr_parser = Parser::new();
        let schema = DomElementSchemaRegistry::new();
        let mut parser = BindingParser::new(&expr_parser, InterpolationConfig::default(), &schema);
        let mut targets = BindingTargets::default();
        let result = f(&mut parser, &mut targets);
        let errors = parser.take_errors().into_iter().map(|e| e.msg).collect();
        (result, targets, errors)
    }

    fn bound_property(element: &str, name: &str) -> (BoundElementPropertyAst, Vec<String>) {
        let (prop, _, errors) = with_parser(|parser, targets| {
            parser.parse_property_binding(name, "v", &span(), 0, targets);
            parser.create_bound_element_property(element, &targets.props[0])
        });
        (prop, errors)
    }

    mod properties {
        use super::*;

        #[test]
        fn should_bind_plain_properties() {
            let (prop, errors) = bound_property("div", "title");
            assert!(errors.is_empty());
            assert_eq!(prop.kind, PropertyBindingType::Property);
            assert_eq!(prop.name, "title");
            assert_eq!(prop.value.ast.to_string(), "v");
            assert_eq!(prop.security_context, SecurityContext::None);
        }

        #[test]
        fn should_map_attribute_names_to_property_names() {
            let (prop, _) = bound_property("div", "innerHtml");
            assert_eq!(prop.name, "innerHTML");
            assert_eq!(prop.security_context, SecurityContext::Html);
        }

        #[test]
        fn should_bind_attributes() {
            let (prop, _) = bound_property("div", "attr.aria-label");
            assert_eq!(prop.kind, PropertyBindingType::Attribute);
            assert_eq!(prop.name, "aria-label");
        }

        #[test]
        fn should_bind_single_classes_and_styles() {
            let (class, _) = bound_property("div", "class.active");
            assert_eq!((class.kind, class.name.as_str()), (PropertyBindingType::Class, "active"));

            let (style, _) = bound_property("div", "style.width.px");
            assert_eq!((style.kind, style.name.as_str()), (PropertyBindingType::Style, "width"));
            assert_eq!(style.unit.as_deref(), Some("px"));
            assert_eq!(style.security_context, SecurityContext::Style);
        }

        #[test]
        fn should_bind_class_and_style_maps() {
            for name in ["class", "className"] {
                let (prop, _) = bound_property("div", name);
                assert!(prop.is_styling_map(), "{}", name);
                assert_eq!(prop.kind, PropertyBindingType::Class);
            }
            let (style, _) = bound_property("div", "style");
            assert!(style.is_styling_map());
            assert_eq!(style.kind, PropertyBindingType::Style);
        }

        #[test]
        fn should_treat_attr_style_as_a_plain_attribute() {
            let (prop, _) = bound_property("div", "attr.style");
            assert!(prop.is_styling_attribute());
            assert!(!prop.is_styling_map());
        }

        #[test]
        fn should_reject_event_properties() {
            let (_, errors) = bound_property("div", "onclick");
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("Binding to event property 'onclick' is disallowed for security reasons"));

            let (_, errors) = bound_property("div", "attr.onclick");
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("Binding to event attribute 'onclick' is disallowed for security reasons"));
        }

        #[test]
        fn should_record_matchable_attributes() {
            let (_, targets, _) = with_parser(|parser, targets| {
                parser.parse_property_binding("dir", "v", &span(), 0, targets);
            });
            assert_eq!(targets.matchable_attrs, vec![("dir".to_string(), String::new())]);
            assert!(!targets.props[0].is_literal);
        }

        #[test]
        fn should_bind_interpolated_values() {
            let (bound, targets, _) = with_parser(|parser, targets| {
                let interpolated = parser.parse_property_interpolation("title", "a{{ b }}c", &span(), targets);
                let plain = parser.parse_property_interpolation("id", "plain", &span(), targets);
                (interpolated, plain)
            });
            assert_eq!(bound, (true, false));
            assert_eq!(targets.props.len(), 1);
            assert_eq!(targets.props[0].expression.ast.to_string(), "a{{ b }}c");
        }

        #[test]
        fn should_record_literal_attributes() {
            let (_, targets, _) = with_parser(|parser, targets| {
                parser.parse_literal_attr("role", "button", &span(), targets);
            });
            assert!(targets.props[0].is_literal);
            assert_eq!(targets.props[0].expression.ast.to_string(), "\"button\"");
        }
    }

    mod events {
        use super::*;

        #[test]
        fn should_parse_event_handlers() {
            let (_, targets, errors) = with_parser(|parser, targets| {
                parser.parse_event("click", "a(); b = $event", &span(), 0, targets);
            });
            assert!(errors.is_empty());
            assert_eq!(targets.events[0].name, "click");
            assert_eq!(targets.events[0].target, None);
            assert_eq!(targets.events[0].handler.ast.to_string(), "a(); b = $event");
        }

        #[test]
        fn should_split_global_event_targets() {
            let (_, targets, _) = with_parser(|parser, targets| {
                parser.parse_event("window:resize", "r()", &span(), 0, targets);
                parser.parse_event("foo:bar", "r()", &span(), 0, targets);
            });
            assert_eq!(targets.events[0].target.as_deref(), Some("window"));
            assert_eq!(targets.events[0].name, "resize");
            assert_eq!(targets.events[1].target, None);
            assert_eq!(targets.events[1].name, "foo:bar");
        }

        #[test]
        fn should_report_empty_handlers() {
            let (_, targets, errors) = with_parser(|parser, targets| {
                parser.parse_event("click", "  ", &span(), 0, targets);
            });
            assert_eq!(errors, vec!["Empty expressions are not allowed"]);
            assert_eq!(targets.events[0].handler.ast.to_string(), format!("\"{}\"", ERROR_PLACEHOLDER));
        }

        #[test]
        fn should_reject_pipes_in_handlers() {
            let (_, _, errors) = with_parser(|parser, targets| {
                parser.parse_event("click", "a | b", &span(), 0, targets);
            });
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("Cannot have a pipe in an action expression"));
        }

        #[test]
        fn should_expand_two_way_bindings() {
            let (_, targets, errors) = with_parser(|parser, targets| {
                parser.parse_two_way_binding("model", "value", &span(), 0, targets);
            });
            assert!(errors.is_empty());
            assert_eq!(targets.props[0].name, "model");
            assert_eq!(targets.events[0].name, "model-change");
            assert_eq!(targets.events[0].handler.ast.to_string(), "value = $event");
        }
    }

    mod template_bindings {
        use super::*;

        #[test]
        fn should_expand_micro_syntax_into_props_and_vars() {
            let (_, targets, errors) = with_parser(|parser, targets| {
                parser.parse_inline_template_binding("ngFor", "let item of items; index as i", &span(), 0, targets);
            });
            assert!(errors.is_empty());
            assert_eq!(
                targets.matchable_attrs,
                vec![("ngFor".to_string(), String::new()), ("ngForOf".to_string(), String::new())]
            );
            let props: Vec<_> = targets
                .props
                .iter()
                .map(|p| (p.name.as_str(), p.is_literal, p.expression.source.as_str()))
                .collect();
            assert_eq!(props, vec![("ngFor", true, ""), ("ngForOf", false, "items")]);
            let vars: Vec<_> = targets.vars.iter().map(|v| (v.name.as_str(), v.value.as_str())).collect();
            assert_eq!(vars, vec![("item", "$implicit"), ("i", "index")]);
        }

        #[test]
        fn should_report_micro_syntax_errors() {
            let (_, targets, errors) = with_parser(|parser, targets| {
                parser.parse_inline_template_binding("ngIf", "a = b", &span(), 0, targets);
            });
            assert_eq!(errors.len(), 1);
            assert!(targets.props.is_empty());
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_substitute_a_placeholder_for_bad_expressions() {
            let (ast, _, errors) = with_parser(|parser, _| parser.parse_binding("a +", &span(), 0));
            assert_eq!(ast.ast.to_string(), "\"ERROR\"");
            assert_eq!(ast.source, "a +");
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("Parser Error: Unexpected end of expression: a +"));
        }

        #[test]
        fn should_hand_over_errors_once() {
            let expr_parser = Parser::new();
            let schema = DomElementSchemaRegistry::new();
            let mut parser = BindingParser::new(&expr_parser, InterpolationConfig::default(), &schema);
            parser.report_error("first", &span());
            assert_eq!(parser.errors().len(), 1);
            assert_eq!(parser.take_errors().len(), 1);
            assert!(parser.errors().is_empty());
        }
    }

    mod attribute_names {
        use super::*;

        #[test]
        fn should_classify_binding_prefixes() {
            let cases = [
                ("[title]", AttributeKind::Property, "title"),
                ("bind-title", AttributeKind::Property, "title"),
                ("(click)", AttributeKind::Event, "click"),
                ("on-click", AttributeKind::Event, "click"),
                ("[(model)]", AttributeKind::TwoWay, "model"),
                ("bindon-model", AttributeKind::TwoWay, "model"),
                ("#ref", AttributeKind::Reference, "ref"),
                ("let-item", AttributeKind::Variable, "item"),
                ("*ngIf", AttributeKind::Template, "ngIf"),
                ("title", AttributeKind::Literal, "title"),
            ];
            for (raw, kind, name) in cases {
                let parsed = AttributeName::parse(raw);
                assert_eq!((parsed.kind, parsed.name.as_str()), (kind, name), "{}", raw);
                assert_eq!(parsed.is_bound(), kind != AttributeKind::Literal);
            }
        }
    }
}
