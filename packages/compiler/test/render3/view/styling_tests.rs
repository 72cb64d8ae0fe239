/**
 * Styling Tests
 *
 * Registration of `[class]`/`[style]` bindings and the order of the styling
 * instructions of elements and host bindings.
 */

#[path = "util.rs"]
mod util;

use template_compiler::config::CompilerOptions;
use template_compiler::expression_parser::Parser;
use template_compiler::metadata::DirectiveDescriptor;
use template_compiler::render3::view::{StylingBuilder, StylingKind};
use template_compiler::schema::DomElementSchemaRegistry;
use template_compiler::template_parser::{BoundElementPropertyAst, TemplateAst, TemplateParser};
use util::*;

#[cfg(test)]
mod tests {
    use super::*;

    /// Bound properties of the single root element of `template`.
    fn element_inputs(template: &str) -> Vec<BoundElementPropertyAst> {
        let options = CompilerOptions::default();
        let expr_parser = Parser::new();
        let schema = DomElementSchemaRegistry::new();
        let parsed = TemplateParser::new(&options, &expr_parser, &schema).parse(template, TEMPLATE_URL, &[]);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        match parsed.template_ast.into_iter().next() {
            Some(TemplateAst::Element(element)) => element.inputs,
            other => panic!("expected an element, got {:?}", other),
        }
    }

    mod builder {
        use super::*;

        #[test]
        fn should_keep_the_last_map_binding() {
            let inputs = element_inputs("<div [class]=\"a\" [className]=\"b\"></div>");
            let mut builder = StylingBuilder::new();
            for input in &inputs {
                assert!(builder.register(input));
            }
            assert!(builder.has_map());
            assert!(builder.style_map().is_none());
            assert_eq!(builder.class_map().map(|b| b.value.source.as_str()), Some("b"));
            assert_eq!(builder.binding_count(), 1);
        }

        #[test]
        fn should_index_keyed_bindings_by_declared_name() {
            let inputs = element_inputs(
                "<div [style.width.px]=\"w\" [class.on]=\"x\" [style.height]=\"h\" [style.width]=\"w2\"></div>",
            );
            let mut builder = StylingBuilder::new();
            for input in &inputs {
                builder.register(input);
            }
            assert_eq!(builder.style_names(), vec!["width", "height"]);
            assert_eq!(builder.class_names(), vec!["on"]);

            let keyed = builder.keyed_bindings();
            assert_eq!(
                keyed.iter().map(|k| (k.kind, k.index)).collect::<Vec<_>>(),
                vec![
                    (StylingKind::Style, 0),
                    (StylingKind::Style, 1),
                    (StylingKind::Style, 0),
                    (StylingKind::Class, 0),
                ]
            );
            assert_eq!(keyed[0].binding.unit.as_deref(), Some("px"));
            assert_eq!(keyed[2].binding.unit, None);
            assert!(!builder.has_map());
            assert_eq!(builder.binding_count(), 4);
        }

        #[test]
        fn should_ignore_non_styling_bindings() {
            let inputs = element_inputs("<div [attr.style]=\"s\" [title]=\"t\"></div>");
            let mut builder = StylingBuilder::new();
            for input in &inputs {
                assert!(!builder.register(input));
            }
            assert!(!builder.has_bindings());
            assert_eq!(builder.binding_count(), 0);
        }
    }

    mod instructions {
        use super::*;

        #[test]
        fn should_declare_style_and_class_names_once_at_creation() {
            let compiled = compile("<div [class.a]=\"x\" [class.b]=\"y\" [class.a]=\"z\"></div>", &[], &[]);
            let root = &compiled.program.root;
            let styling = find(&root.creation, "styling");
            assert_eq!(styling.slot, None);
            assert_eq!(styling.operands.len(), 2);
            assert_eq!(
                opcodes(&root.update),
                vec!["classProp", "classProp", "classProp", "stylingApply"]
            );
            let indices: Vec<_> = root.update[..3].iter().map(|i| i.operands[0].clone()).collect();
            assert_eq!(
                indices,
                vec![
                    template_compiler::output::Operand::Number(0.0),
                    template_compiler::output::Operand::Number(1.0),
                    template_compiler::output::Operand::Number(0.0),
                ]
            );
            assert_eq!(root.vars, 3);
        }

        #[test]
        fn should_not_emit_styling_without_styling_bindings() {
            let compiled = compile("<div [title]=\"t\" class=\"static\"></div>", &[], &[]);
            let root = &compiled.program.root;
            assert!(!opcodes(&root.creation).contains(&"styling".to_string()));
            assert_eq!(opcodes(&root.update), vec!["property"]);
        }

        #[test]
        fn should_apply_host_styling_inside_host_bindings() {
            let directive = DirectiveDescriptor::directive("Active", "[active]")
                .with_host(&[("[class.active]", "isActive"), ("[style.color]", "color")]);
            let compiled = compile("<div active></div>", &[directive], &[]);
            let root = &compiled.program.root;
            assert!(root.update.is_empty());
            assert_eq!(root.host.len(), 1);
            assert_eq!(
                opcodes(&root.host[0].instructions),
                vec!["styleProp", "classProp", "stylingApply"]
            );
            assert_eq!(root.vars, 2);
        }
    }
}
