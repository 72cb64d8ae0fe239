/**
 * Template Parser Tests
 *
 * Directive matching, binding classification, structural templates,
 * references, content projection and template validation.
 */

#[path = "util.rs"]
mod util;

use template_compiler::config::CompilerOptions;
use template_compiler::metadata::DirectiveDescriptor;
use template_compiler::template_parser::TemplateAst;
use util::{humanize_tpl, parse, parse_errors, parse_with_options};

#[cfg(test)]
mod tests {
    use super::*;

    fn ng_if() -> DirectiveDescriptor {
        DirectiveDescriptor::directive("NgIf", "[ngIf]").with_inputs(&["ngIf"])
    }

    fn ng_for() -> DirectiveDescriptor {
        DirectiveDescriptor::directive("NgFor", "[ngFor][ngForOf]").with_inputs(&["ngForOf"])
    }

    fn expect_rows(template: &str, directives: &[DirectiveDescriptor], expected: &[&str]) {
        assert_eq!(humanize_tpl(&parse(template, directives)), expected, "template {:?}", template);
    }

    mod nodes {
        use super::*;

        #[test]
        fn should_parse_elements_and_text() {
            expect_rows("<div>a</div>", &[], &["Element div", "Text a"]);
        }

        #[test]
        fn should_parse_bound_text() {
            expect_rows("<div>{{ a }}</div>", &[], &["Element div", "BoundText {{ a }}"]);
        }

        #[test]
        fn should_collapse_whitespace_by_default() {
            expect_rows("<div> a   b </div>\n<span>  </span>", &[], &["Element div", "Text  a b ", "Element span"]);
        }

        #[test]
        fn should_preserve_whitespace_when_asked() {
            let options = CompilerOptions {
                preserve_whitespaces: true,
                ..CompilerOptions::default()
            };
            let result = parse_with_options("<div>  </div>", &[], &options);
            assert!(result.errors.is_empty());
            assert_eq!(humanize_tpl(&result.template_ast), vec!["Element div", "Text   "]);
        }

        #[test]
        fn should_drop_style_and_script_elements() {
            expect_rows("<style>a {}</style><script>x()</script><div></div>", &[], &["Element div"]);
        }

        #[test]
        fn should_collect_ng_content_selectors_in_document_order() {
            let result = parse_with_options(
                "<div><ng-content select=\"header\"></ng-content></div><ng-content></ng-content>",
                &[],
                &CompilerOptions::default(),
            );
            assert!(result.errors.is_empty());
            assert_eq!(result.ng_content_selectors, vec!["header", "*"]);
            assert_eq!(
                humanize_tpl(&result.template_ast),
                vec!["Element div", "NgContent 0", "NgContent 1"]
            );
        }
    }

    mod bindings {
        use super::*;

        #[test]
        fn should_parse_property_bindings() {
            expect_rows("<div [title]=\"a\"></div>", &[], &["Element div", "Property title=a"]);
            expect_rows("<div bind-title=\"a\"></div>", &[], &["Element div", "Property title=a"]);
        }

        #[test]
        fn should_parse_interpolated_attributes_as_properties() {
            expect_rows("<div title=\"{{ a }}\"></div>", &[], &["Element div", "Property title={{ a }}"]);
        }

        #[test]
        fn should_keep_plain_attributes() {
            expect_rows("<div title=\"a\"></div>", &[], &["Element div", "Attr title=a"]);
        }

        #[test]
        fn should_classify_attribute_class_and_style_bindings() {
            expect_rows(
                "<div [attr.role]=\"r\" [class.active]=\"on\" [style.width.px]=\"w\"></div>",
                &[],
                &["Element div", "Attribute role=r", "Class active=on", "Style width.px=w"],
            );
        }

        #[test]
        fn should_map_attribute_names_to_properties() {
            expect_rows("<label [for]=\"id\"></label>", &[], &["Element label", "Property htmlFor=id"]);
        }

        #[test]
        fn should_parse_events() {
            expect_rows(
                "<div (click)=\"go($event)\" on-focus=\"f()\" (window:resize)=\"r()\"></div>",
                &[],
                &["Element div", "Event click=go($event)", "Event focus=f()", "Event window:resize=r()"],
            );
        }

        #[test]
        fn should_parse_two_way_bindings() {
            expect_rows(
                "<my-el [(value)]=\"v\"></my-el>",
                &[],
                &["Element my-el", "Property value=v", "Event value-change=v = $event"],
            );
        }

        #[test]
        fn should_accept_any_property_of_custom_elements() {
            expect_rows("<my-el [anything]=\"v\"></my-el>", &[], &["Element my-el", "Property anything=v"]);
        }
    }

    mod directives {
        use super::*;

        #[test]
        fn should_order_the_component_first_then_by_declaration() {
            let directives = [
                DirectiveDescriptor::directive("D1", "[a]"),
                DirectiveDescriptor::component("D2", "div"),
            ];
            expect_rows("<div a></div>", &directives, &["Element div", "Attr a=", "Directive D2", "Directive D1"]);
        }

        #[test]
        fn should_bind_directive_inputs_instead_of_element_properties() {
            let dir = DirectiveDescriptor::directive("Dir", "[dir]").with_inputs(&["dirProp"]);
            expect_rows(
                "<div dir [dirProp]=\"a\"></div>",
                &[dir],
                &["Element div", "Attr dir=", "Directive Dir", "DirectiveProperty dirProp=a"],
            );
        }

        #[test]
        fn should_bind_literal_attributes_to_directive_inputs() {
            let dir = DirectiveDescriptor::directive("Dir", "[dir]").with_inputs(&["dirProp"]);
            expect_rows(
                "<div dir dirProp=\"lit\"></div>",
                &[dir],
                &["Element div", "Attr dir=", "Attr dirProp=lit", "Directive Dir", "DirectiveProperty dirProp=\"lit\""],
            );
        }

        #[test]
        fn should_prefer_property_bindings_over_literal_attributes() {
            let dir = DirectiveDescriptor::directive("Dir", "[dir]").with_inputs(&["dirProp"]);
            for template in ["<div dir dirProp=\"lit\" [dirProp]=\"v\"></div>", "<div dir [dirProp]=\"v\" dirProp=\"lit\"></div>"] {
                let rows = humanize_tpl(&parse(template, &[dir.clone()]));
                assert!(rows.contains(&"DirectiveProperty dirProp=v".to_string()), "{:?}", rows);
            }
        }

        #[test]
        fn should_bind_inputs_under_their_template_name() {
            let dir = DirectiveDescriptor::directive("Dir", "[dir]").with_inputs(&["value: dirAlias"]);
            expect_rows(
                "<div dir [dirAlias]=\"x\"></div>",
                &[dir],
                &["Element div", "Attr dir=", "Directive Dir", "DirectiveProperty value=x"],
            );
        }

        #[test]
        fn should_match_directives_on_bound_attributes() {
            let dir = DirectiveDescriptor::directive("Dir", "[dir]").with_inputs(&["dir"]);
            expect_rows(
                "<div [dir]=\"v\"></div>",
                &[dir],
                &["Element div", "Directive Dir", "DirectiveProperty dir=v"],
            );
        }

        #[test]
        fn should_parse_directive_host_bindings() {
            let dir = DirectiveDescriptor::directive("Dir", "[dir]").with_host(&[
                ("[title]", "t"),
                ("(click)", "h()"),
                ("role", "button"),
            ]);
            let nodes = parse("<div dir></div>", &[dir]);
            let TemplateAst::Element(div) = &nodes[0] else {
                panic!("expected an element");
            };
            let directive = &div.directives[0];
            assert_eq!(directive.host_properties.len(), 1);
            assert_eq!(directive.host_properties[0].name, "title");
            assert_eq!(directive.host_properties[0].value.ast.to_string(), "t");
            assert_eq!(directive.host_events.len(), 1);
            assert_eq!(directive.host_events[0].name, "click");
        }

        #[test]
        fn should_expose_the_component_of_an_element() {
            let nodes = parse("<my-cmp></my-cmp>", &[DirectiveDescriptor::component("MyCmp", "my-cmp")]);
            let TemplateAst::Element(cmp) = &nodes[0] else {
                panic!("expected an element");
            };
            assert_eq!(cmp.component().map(|c| c.directive.type_name.as_str()), Some("MyCmp"));
        }
    }

    mod references_and_variables {
        use super::*;

        #[test]
        fn should_reference_elements_and_templates() {
            expect_rows(
                "<div #d></div><span ref-s></span><ng-template #t></ng-template>",
                &[],
                &[
                    "Element div",
                    "Reference d=Element",
                    "Element span",
                    "Reference s=Element",
                    "EmbeddedTemplate",
                    "Reference t=TemplateRef",
                ],
            );
        }

        #[test]
        fn should_reference_components_without_export_as() {
            expect_rows(
                "<my-cmp #c></my-cmp>",
                &[DirectiveDescriptor::component("MyCmp", "my-cmp")],
                &["Element my-cmp", "Reference c=MyCmp", "Directive MyCmp"],
            );
        }

        #[test]
        fn should_reference_directives_by_export_as() {
            let dir = DirectiveDescriptor::directive("Dir", "[dir]").with_export_as("dirRef");
            expect_rows(
                "<div dir #r=\"dirRef\"></div>",
                &[dir],
                &["Element div", "Attr dir=", "Reference r=Dir", "Directive Dir"],
            );
        }

        #[test]
        fn should_parse_template_variables() {
            expect_rows(
                "<ng-template let-item let-i=\"index\"></ng-template>",
                &[],
                &["EmbeddedTemplate", "Variable item=$implicit", "Variable i=index"],
            );
        }
    }

    mod structural_templates {
        use super::*;

        #[test]
        fn should_desugar_star_attributes_like_explicit_templates() {
            let sugared = humanize_tpl(&parse("<div *ngIf=\"c\"></div>", &[ng_if()]));
            let explicit = humanize_tpl(&parse("<ng-template [ngIf]=\"c\"><div></div></ng-template>", &[ng_if()]));
            assert_eq!(sugared, explicit);
            assert_eq!(
                sugared,
                vec!["EmbeddedTemplate", "Directive NgIf", "DirectiveProperty ngIf=c", "Element div"]
            );
        }

        #[test]
        fn should_share_the_source_span_with_the_wrapped_element() {
            let nodes = parse("<div *ngIf=\"c\"></div>", &[ng_if()]);
            let TemplateAst::EmbeddedTemplate(template) = &nodes[0] else {
                panic!("expected a template");
            };
            assert_eq!(&template.source_span, template.children[0].source_span());
        }

        #[test]
        fn should_expand_ng_for_micro_syntax() {
            expect_rows(
                "<li *ngFor=\"let item of items; let i = index\"></li>",
                &[ng_for()],
                &[
                    "EmbeddedTemplate",
                    "Attr ngFor=",
                    "Variable item=$implicit",
                    "Variable i=index",
                    "Directive NgFor",
                    "DirectiveProperty ngForOf=items",
                    "Element li",
                ],
            );
        }

        #[test]
        fn should_declare_as_aliases() {
            expect_rows(
                "<div *ngIf=\"user$ | async as user\"></div>",
                &[ng_if()],
                &[
                    "EmbeddedTemplate",
                    "Variable user=ngIf",
                    "Directive NgIf",
                    "DirectiveProperty ngIf=(user$ | async)",
                    "Element div",
                ],
            );
        }

        #[test]
        fn should_keep_element_bindings_on_the_wrapped_element() {
            expect_rows(
                "<div *ngIf=\"c\" [title]=\"t\"></div>",
                &[ng_if()],
                &[
                    "EmbeddedTemplate",
                    "Directive NgIf",
                    "DirectiveProperty ngIf=c",
                    "Element div",
                    "Property title=t",
                ],
            );
        }
    }

    mod content_projection {
        use super::*;

        #[test]
        fn should_assign_children_to_projection_slots() {
            let comp = DirectiveDescriptor::component("Comp", "comp").with_ng_content_selectors(&["header", "*"]);
            let nodes = parse("<comp><header></header><span></span>text</comp>", &[comp]);
            let indices: Vec<_> = nodes[0].children().iter().map(|child| child.ng_content_index()).collect();
            assert_eq!(indices, vec![Some(0), Some(1), Some(1)]);
        }

        #[test]
        fn should_only_project_into_components() {
            let nodes = parse("<div><span></span></div>", &[]);
            assert_eq!(nodes[0].children()[0].ng_content_index(), None);
        }

        #[test]
        fn should_project_by_ng_project_as() {
            let comp = DirectiveDescriptor::component("Comp", "comp").with_ng_content_selectors(&["[title]", "*"]);
            let nodes = parse("<comp><span ngProjectAs=\"[title]\"></span></comp>", &[comp]);
            assert_eq!(nodes[0].children()[0].ng_content_index(), Some(0));
        }
    }

    mod errors {
        use super::*;

        const UNUSED_PROPERTY_HINT: &str =
            "Make sure that the property name is spelled correctly and all directives are listed.";
        const UNUSED_EVENT_HINT: &str = "Make sure that the event name is spelled correctly and all directives are listed.";

        #[test]
        fn should_report_unknown_properties() {
            assert_eq!(
                parse_errors("<div [foo]=\"a\"></div>", &[]),
                vec!["Can't bind to 'foo' since it isn't a known property of 'div'."]
            );
        }

        #[test]
        fn should_skip_the_schema_check_when_disabled() {
            let options = CompilerOptions {
                check_unknown_properties: false,
                ..CompilerOptions::default()
            };
            let result = parse_with_options("<div [foo]=\"a\"></div>", &[], &options);
            assert!(result.errors.is_empty());
        }

        #[test]
        fn should_report_more_than_one_component() {
            let directives = [
                DirectiveDescriptor::component("C1", "div"),
                DirectiveDescriptor::component("C2", "[a]"),
            ];
            assert_eq!(
                parse_errors("<div a></div>", &directives),
                vec![
                    "More than one component matched on this element.\n\
                     Make sure that only one component's selector can match a given element.\n\
                     Conflicting components: C1,C2"
                ]
            );
        }

        #[test]
        fn should_report_components_on_templates() {
            assert_eq!(
                parse_errors("<ng-template c></ng-template>", &[DirectiveDescriptor::component("C", "[c]")]),
                vec!["Components on an embedded template: C"]
            );
        }

        #[test]
        fn should_report_template_properties_not_used_by_directives() {
            assert_eq!(
                parse_errors("<ng-template [foo]=\"a\"></ng-template>", &[]),
                vec![format!(
                    "Property binding foo not used by any directive on an embedded template. {}",
                    UNUSED_PROPERTY_HINT
                )]
            );
        }

        #[test]
        fn should_report_template_events_not_emitted_by_directives() {
            assert_eq!(
                parse_errors("<ng-template (foo)=\"a()\"></ng-template>", &[]),
                vec![format!(
                    "Event binding foo not emitted by any directive on an embedded template. {}",
                    UNUSED_EVENT_HINT
                )]
            );
        }

        #[test]
        fn should_accept_template_events_emitted_by_directives() {
            let dir = DirectiveDescriptor::directive("D", "[d]").with_outputs(&["fooEmitter: foo"]);
            assert!(parse_errors("<ng-template d (foo)=\"a()\"></ng-template>", &[dir]).is_empty());
        }

        #[test]
        fn should_report_let_outside_templates() {
            assert_eq!(
                parse_errors("<div let-a></div>", &[]),
                vec!["\"let-\" is only supported on ng-template elements."]
            );
        }

        #[test]
        fn should_report_duplicate_references() {
            assert_eq!(
                parse_errors("<div #a #a></div>", &[]),
                vec!["Reference \"#a\" is defined more than once"]
            );
        }

        #[test]
        fn should_report_unknown_export_as() {
            assert_eq!(
                parse_errors("<div #a=\"missing\"></div>", &[]),
                vec!["There is no directive with \"exportAs\" set to \"missing\""]
            );
        }

        #[test]
        fn should_report_ng_content_with_content() {
            assert_eq!(
                parse_errors("<ng-content>x</ng-content>", &[]),
                vec!["<ng-content> element cannot have content."]
            );
        }

        #[test]
        fn should_report_multiple_template_bindings() {
            let errors = parse_errors("<div *ngIf=\"a\" *ngFor=\"let x of xs\"></div>", &[ng_if(), ng_for()]);
            assert_eq!(
                errors,
                vec!["Can't have multiple template bindings on one element. Use only one attribute prefixed with *"]
            );
        }

        #[test]
        fn should_report_empty_event_handlers() {
            assert_eq!(
                parse_errors("<div (click)=\"\"></div>", &[]),
                vec!["Empty expressions are not allowed"]
            );
        }

        #[test]
        fn should_report_expression_errors() {
            let errors = parse_errors("<div [title]=\"a = b\"></div>", &[]);
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("Parser Error: Bindings cannot contain assignments"), "{}", errors[0]);
        }

        #[test]
        fn should_report_invalid_directive_selectors() {
            let errors = parse_errors("<div></div>", &[DirectiveDescriptor::directive("Bad", "[a$]")]);
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("Invalid selector \"[a$]\" of Bad"), "{}", errors[0]);
        }

        #[test]
        fn should_keep_going_after_errors() {
            let result = parse_with_options(
                "<div [foo]=\"a\"></div><span [bar]=\"b\"></span>",
                &[],
                &CompilerOptions::default(),
            );
            assert_eq!(result.errors.len(), 2);
            assert_eq!(result.template_ast.len(), 2);
        }
    }
}
