/**
 * Parser Tests
 *
 * Binding, action, interpolation and micro-syntax parsing.
 */

use template_compiler::expression_parser::{
    AbsoluteSourceSpan, ExpressionParser, LiteralValue, Parser, TemplateBinding, TemplateBindingIdentifier, AST,
};
use template_compiler::ml_parser::InterpolationConfig;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_action(text: &str) -> AST {
        Parser::new().parse_action(text, "location", 0).unwrap().ast
    }

    fn parse_binding(text: &str) -> AST {
        Parser::new().parse_binding(text, "location", 0).unwrap().ast
    }

    fn check_action(text: &str, expected: &str) {
        assert_eq!(parse_action(text).to_string(), expected, "action {:?}", text);
    }

    fn check_binding(text: &str, expected: &str) {
        assert_eq!(parse_binding(text).to_string(), expected, "binding {:?}", text);
    }

    fn expect_action_error(text: &str, message: &str) {
        let error = Parser::new().parse_action(text, "location", 0).unwrap_err();
        assert!(error.message.contains(message), "{:?} should contain {:?}", error.message, message);
    }

    fn expect_binding_error(text: &str, message: &str) {
        let error = Parser::new().parse_binding(text, "location", 0).unwrap_err();
        assert!(error.message.contains(message), "{:?} should contain {:?}", error.message, message);
    }

    fn interpolation(text: &str) -> Option<AST> {
        Parser::new()
            .parse_interpolation(text, "location", 0, &InterpolationConfig::default())
            .unwrap()
            .map(|ast| ast.ast)
    }

    /// `key=value` pairs of the expression bindings and `let key=value` of the variables.
    fn template_bindings(key: &str, text: &str) -> Vec<String> {
        let parser = Parser::new();
        let key = TemplateBindingIdentifier {
            source: key.to_string(),
            span: AbsoluteSourceSpan::new(0, key.len()),
        };
        parser
            .parse_template_bindings(Some(&key), text, "location", 0)
            .unwrap()
            .iter()
            .map(|binding| match binding {
                TemplateBinding::Variable { key, value, .. } => format!(
                    "let {}={}",
                    key.source,
                    value.as_ref().map_or("$implicit", |v| v.source.as_str())
                ),
                TemplateBinding::Expression { key, value, .. } => format!(
                    "{}={}",
                    key.source,
                    value.as_ref().map_or(String::new(), |v| v.source.clone())
                ),
            })
            .collect()
    }

    mod parse_action {
        use super::*;

        #[test]
        fn should_parse_numbers() {
            check_action("1", "1");
        }

        #[test]
        fn should_parse_strings() {
            check_action("'1'", "\"1\"");
            check_action("\"1\"", "\"1\"");
        }

        #[test]
        fn should_parse_null() {
            check_action("null", "null");
        }

        #[test]
        fn should_parse_undefined() {
            check_action("undefined", "undefined");
        }

        #[test]
        fn should_parse_unary_minus_and_plus() {
            check_action("-1", "-1");
            check_action("+1", "+1");
            check_action("-a", "-a");
        }

        #[test]
        fn should_parse_unary_not() {
            check_action("true", "true");
            check_action("!true", "!true");
            check_action("!!true", "!!true");
        }

        #[test]
        fn should_parse_multiplicative_expressions() {
            check_action("3*4/2%5", "3 * 4 / 2 % 5");
        }

        #[test]
        fn should_parse_additive_expressions() {
            check_action("3 + 6 - 2", "3 + 6 - 2");
        }

        #[test]
        fn should_parse_relational_expressions() {
            check_action("2 < 3", "2 < 3");
            check_action("2 >= 3", "2 >= 3");
        }

        #[test]
        fn should_parse_equality_expressions() {
            check_action("2 == 3", "2 == 3");
            check_action("2 !== 3", "2 !== 3");
        }

        #[test]
        fn should_parse_logical_expressions() {
            check_action("true && true", "true && true");
            check_action("true || false", "true || false");
            check_action("null ?? 0", "null ?? 0");
        }

        #[test]
        fn should_parse_ternary_expressions() {
            check_action("7 == 3 + 4 ? 10 : 20", "7 == 3 + 4 ? 10 : 20");
        }

        #[test]
        fn should_give_multiplication_precedence_over_addition() {
            match parse_action("1 + 2 * 3") {
                AST::Binary(binary) => {
                    assert_eq!(binary.operation, "+");
                    assert_eq!(binary.right.to_string(), "2 * 3");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_parse_property_access() {
            check_action("a", "a");
            check_action("a.a", "a.a");
            check_action("this.a", "a");
        }

        #[test]
        fn should_parse_safe_property_access() {
            check_action("a?.a", "a?.a");
            check_action("a.a?.a", "a.a?.a");
        }

        #[test]
        fn should_parse_keyed_reads() {
            check_action("a['a']", "a[\"a\"]");
            check_action("a?.['a']", "a?.[\"a\"]");
        }

        #[test]
        fn should_parse_calls() {
            check_action("fn()", "fn()");
            check_action("add(1, 2)", "add(1, 2)");
            check_action("a.add(1, 2)", "a.add(1, 2)");
            check_action("fn?.()", "fn?.()");
        }

        #[test]
        fn should_parse_non_null_assertions() {
            check_action("a!.b", "a!.b");
        }

        #[test]
        fn should_parse_array_and_map_literals() {
            check_action("[1, 2]", "[1, 2]");
            check_action("{a: 1, 'b': 2}", "{a: 1, \"b\": 2}");
            check_action("{}", "{}");
        }

        #[test]
        fn should_parse_assignments() {
            check_action("a = 12", "a = 12");
            check_action("a.a.a = 123", "a.a.a = 123");
            check_action("a[0] = 200", "a[0] = 200");
        }

        #[test]
        fn should_parse_chains() {
            check_action("1;2", "1; 2");
            check_action("a(); b()", "a(); b()");
        }

        #[test]
        fn should_accept_trailing_semicolons() {
            check_action("a();", "a()");
        }

        #[test]
        fn should_reject_pipes() {
            expect_action_error("a | b", "Cannot have a pipe in an action expression");
        }

        #[test]
        fn should_reject_interpolation() {
            expect_action_error("{{a}}", "Got interpolation ({{}}) where expression was expected");
        }

        #[test]
        fn should_reject_safe_assignment() {
            expect_action_error("a?.a = 1", "The '?.' operator cannot be used in the assignment");
        }

        #[test]
        fn should_report_incomplete_conditionals() {
            expect_action_error("true ? 1", "Conditional expression true ? 1 requires all 3 expressions");
        }

        #[test]
        fn should_report_missing_brackets() {
            expect_action_error("[1, 2", "Missing expected ]");
        }

        #[test]
        fn should_report_error_location() {
            let error = Parser::new().parse_action("a b", "MyCmp", 0).unwrap_err();
            assert_eq!(error.err_location, "at column 3 in");
            assert_eq!(error.location, "MyCmp");
            assert_eq!(error.input, "a b");
        }
    }

    mod parse_binding {
        use super::*;

        #[test]
        fn should_parse_pipes() {
            check_binding("a | b", "(a | b)");
            check_binding("a | b:c", "(a | b:c)");
            check_binding("a | b:(c | d)", "(a | b:(c | d))");
            check_binding("a | b | c", "((a | b) | c)");
        }

        #[test]
        fn should_parse_pipe_arguments_with_conditionals() {
            check_binding("a | b:c ? d : e", "(a | b:c ? d : e)");
        }

        #[test]
        fn should_only_allow_identifier_or_keyword_as_pipe_names() {
            expect_binding_error("\"Foo\"|(", "identifier or keyword");
            expect_binding_error("\"Foo\"|1234", "identifier or keyword");
        }

        #[test]
        fn should_parse_conditional_expressions() {
            check_binding("a < b ? a : b", "a < b ? a : b");
        }

        #[test]
        fn should_parse_empty_bindings() {
            assert!(parse_binding("").is_empty());
            assert!(parse_binding("   ").is_empty());
        }

        #[test]
        fn should_reject_assignments() {
            expect_binding_error("a = 2", "Bindings cannot contain assignments");
            expect_binding_error("a[0] = 2", "Bindings cannot contain assignments");
        }

        #[test]
        fn should_reject_chains() {
            expect_binding_error("1;2", "Bindings cannot contain chained expressions");
        }

        #[test]
        fn should_reject_interpolation() {
            expect_binding_error("{{a.b}}", "Got interpolation ({{}}) where expression was expected");
        }

        #[test]
        fn should_keep_the_source_and_offset() {
            let ast = Parser::new().parse_binding("a + b", "location", 7).unwrap();
            assert_eq!(ast.source, "a + b");
            assert_eq!(ast.absolute_offset, 7);
            assert_eq!(ast.location, "location");
        }

        #[test]
        fn should_parse_number_literals() {
            match parse_binding("1.5") {
                AST::LiteralPrimitive(literal) => assert_eq!(literal.value, LiteralValue::Number(1.5)),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    mod parse_interpolation {
        use super::*;

        #[test]
        fn should_return_none_if_no_interpolation() {
            assert!(interpolation("nothing").is_none());
        }

        #[test]
        fn should_parse_no_prefix_or_suffix_interpolation() {
            match interpolation("{{a}}").unwrap() {
                AST::Interpolation(interpolation) => {
                    assert_eq!(interpolation.strings, vec!["", ""]);
                    assert_eq!(interpolation.expressions.len(), 1);
                    assert_eq!(interpolation.expressions[0].to_string(), "a");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_parse_prefix_suffix_with_multiple_interpolation() {
            let ast = interpolation("before {{ a }} middle {{ b }} after").unwrap();
            assert_eq!(ast.to_string(), "before {{ a }} middle {{ b }} after");
            match ast {
                AST::Interpolation(interpolation) => {
                    assert_eq!(interpolation.strings, vec!["before ", " middle ", " after"]);
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_not_end_inside_quoted_strings() {
            match interpolation("{{ 'a}}b' }}").unwrap() {
                AST::Interpolation(interpolation) => {
                    assert_eq!(interpolation.expressions[0].to_string(), "\"a}}b\"");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_parse_pipes_inside_interpolation() {
            assert_eq!(interpolation("{{ a | b }}").unwrap().to_string(), "{{ (a | b) }}");
        }

        #[test]
        fn should_report_blank_expressions() {
            let error = Parser::new()
                .parse_interpolation("a {{ }} b", "location", 0, &InterpolationConfig::default())
                .unwrap_err();
            assert_eq!(error.message, "Blank expressions are not allowed in interpolated strings");
        }

        #[test]
        fn should_support_custom_interpolation() {
            let config = InterpolationConfig::new("[[", "]]");
            let ast = Parser::new()
                .parse_interpolation("{{ a }} [[ b ]]", "location", 0, &config)
                .unwrap()
                .unwrap()
                .ast;
            match ast {
                AST::Interpolation(interpolation) => {
                    assert_eq!(interpolation.strings, vec!["{{ a }} ", ""]);
                    assert_eq!(interpolation.expressions[0].to_string(), "b");
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    mod parse_template_bindings {
        use super::*;

        #[test]
        fn should_parse_a_key_without_value() {
            assert_eq!(template_bindings("a", ""), vec!["a="]);
        }

        #[test]
        fn should_parse_a_key_with_value() {
            assert_eq!(template_bindings("ngIf", "cond"), vec!["ngIf=cond"]);
        }

        #[test]
        fn should_parse_ng_for_micro_syntax() {
            assert_eq!(
                template_bindings("ngFor", "let item of items; index as i"),
                vec!["ngFor=", "let item=$implicit", "ngForOf=items", "let i=index"]
            );
        }

        #[test]
        fn should_parse_let_with_value() {
            assert_eq!(
                template_bindings("ngFor", "let item of items; let i = index"),
                vec!["ngFor=", "let item=$implicit", "ngForOf=items", "let i=index"]
            );
        }

        #[test]
        fn should_parse_as_alias_after_an_expression() {
            assert_eq!(
                template_bindings("ngIf", "user$ | async as user"),
                vec!["ngIf=user$ | async", "let user=ngIf"]
            );
        }

        #[test]
        fn should_read_the_key_from_the_input_without_a_template_key() {
            let bindings = Parser::new()
                .parse_template_bindings(None, "ngIf cond", "location", 0)
                .unwrap();
            assert_eq!(bindings.len(), 1);
            assert_eq!(bindings[0].key().source, "ngIf");
        }
    }
}
