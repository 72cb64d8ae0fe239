/**
 * HTML Parser Tests
 *
 * Tree building, attributes, entities, implicit closing and error recovery.
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{humanize_dom, humanize_dom_source_spans, humanize_errors, humanize_line_column};
    use template_compiler::ml_parser::{HtmlParser, InterpolationConfig, Node, ParseOptions, ParseTreeResult};

    fn parse(html: &str) -> ParseTreeResult {
        HtmlParser::new().parse(html, "TestComp", &ParseOptions::default())
    }

    fn rows(expected: &[(&'static str, &str, usize)]) -> Vec<(&'static str, String, usize)> {
        expected
            .iter()
            .map(|(kind, value, depth)| (*kind, value.to_string(), *depth))
            .collect()
    }

    mod text_nodes {
        use super::*;

        #[test]
        fn should_parse_root_level_text_nodes() {
            assert_eq!(humanize_dom(&parse("a")), rows(&[("Text", "a", 0)]));
        }

        #[test]
        fn should_parse_text_nodes_inside_regular_elements() {
            assert_eq!(
                humanize_dom(&parse("<div>a</div>")),
                rows(&[("Element", "div", 0), ("Text", "a", 1)])
            );
        }

        #[test]
        fn should_keep_whitespace_only_text() {
            assert_eq!(
                humanize_dom(&parse("<div> </div>")),
                rows(&[("Element", "div", 0), ("Text", " ", 1)])
            );
        }

        #[test]
        fn should_decode_entities() {
            assert_eq!(
                humanize_dom(&parse("<div>a&amp;&#65;&#x42;</div>")),
                rows(&[("Element", "div", 0), ("Text", "a&AB", 1)])
            );
        }

        #[test]
        fn should_keep_less_than_signs_inside_interpolation() {
            assert_eq!(
                humanize_dom(&parse("<p>{{ a < b }}</p>")),
                rows(&[("Element", "p", 0), ("Text", "{{ a < b }}", 1)])
            );
        }

        #[test]
        fn should_keep_less_than_signs_not_starting_a_tag() {
            assert_eq!(humanize_dom(&parse("a < b")), rows(&[("Text", "a < b", 0)]));
        }

        #[test]
        fn should_honor_custom_interpolation_markers() {
            let options = ParseOptions {
                interpolation: InterpolationConfig::new("[[", "]]"),
            };
            let result = HtmlParser::new().parse("<p>[[ a < b ]]</p>", "TestComp", &options);
            assert_eq!(
                humanize_dom(&result),
                rows(&[("Element", "p", 0), ("Text", "[[ a < b ]]", 1)])
            );
        }

        #[test]
        fn should_not_decode_raw_text_of_scripts() {
            assert_eq!(
                humanize_dom(&parse("<script><div>&amp;</div></script>")),
                rows(&[("Element", "script", 0), ("Text", "<div>&amp;</div>", 1)])
            );
        }

        #[test]
        fn should_drop_the_first_line_feed_of_textarea_and_pre() {
            assert_eq!(
                humanize_dom(&parse("<textarea>\nhi</textarea>")),
                rows(&[("Element", "textarea", 0), ("Text", "hi", 1)])
            );
            assert_eq!(
                humanize_dom(&parse("<pre>\nhi</pre>")),
                rows(&[("Element", "pre", 0), ("Text", "hi", 1)])
            );
        }
    }

    mod elements {
        use super::*;

        #[test]
        fn should_parse_nested_elements() {
            assert_eq!(
                humanize_dom(&parse("<div><span></span></div>")),
                rows(&[("Element", "div", 0), ("Element", "span", 1)])
            );
        }

        #[test]
        fn should_preserve_element_name_case() {
            assert_eq!(
                humanize_dom(&parse("<myCmp></myCmp>")),
                rows(&[("Element", "myCmp", 0)])
            );
        }

        #[test]
        fn should_support_void_elements() {
            assert_eq!(
                humanize_dom(&parse("<input><br><div></div>")),
                rows(&[("Element", "input", 0), ("Element", "br", 0), ("Element", "div", 0)])
            );
        }

        #[test]
        fn should_support_self_closing_elements() {
            assert_eq!(
                humanize_dom(&parse("<my-cmp/><p>a</p>")),
                rows(&[("Element", "my-cmp", 0), ("Element", "p", 0), ("Text", "a", 1)])
            );
        }

        #[test]
        fn should_close_paragraphs_implicitly() {
            assert_eq!(
                humanize_dom(&parse("<p>a<div>b</div>")),
                rows(&[
                    ("Element", "p", 0),
                    ("Text", "a", 1),
                    ("Element", "div", 0),
                    ("Text", "b", 1),
                ])
            );
        }

        #[test]
        fn should_close_list_items_implicitly() {
            assert_eq!(
                humanize_dom(&parse("<ul><li>a<li>b</ul>")),
                rows(&[
                    ("Element", "ul", 0),
                    ("Element", "li", 1),
                    ("Text", "a", 2),
                    ("Element", "li", 1),
                    ("Text", "b", 2),
                ])
            );
        }

        #[test]
        fn should_skip_doctype_declarations() {
            assert_eq!(
                humanize_dom(&parse("<!DOCTYPE html><div></div>")),
                rows(&[("Element", "div", 0)])
            );
        }
    }

    mod attributes {
        use super::*;

        #[test]
        fn should_parse_attributes_in_order() {
            assert_eq!(
                humanize_dom(&parse("<div k=\"v\" [p]='expr' (e)=\"h()\" #ref *ngIf=\"c\"></div>")),
                rows(&[
                    ("Element", "div", 0),
                    ("Attribute", "k=v", 0),
                    ("Attribute", "[p]=expr", 0),
                    ("Attribute", "(e)=h()", 0),
                    ("Attribute", "#ref=", 0),
                    ("Attribute", "*ngIf=c", 0),
                ])
            );
        }

        #[test]
        fn should_parse_unquoted_values() {
            assert_eq!(
                humanize_dom(&parse("<div k=v></div>")),
                rows(&[("Element", "div", 0), ("Attribute", "k=v", 0)])
            );
        }

        #[test]
        fn should_decode_entities_in_values() {
            assert_eq!(
                humanize_dom(&parse("<div title=\"a &amp; b\"></div>")),
                rows(&[("Element", "div", 0), ("Attribute", "title=a & b", 0)])
            );
        }

        #[test]
        fn should_find_attributes_by_name() {
            let result = parse("<div id=\"main\" hidden></div>");
            match &result.root_nodes[0] {
                Node::Element(div) => {
                    assert_eq!(div.attr("id").map(|a| a.value.as_str()), Some("main"));
                    assert!(div.attr("hidden").is_some());
                    assert!(div.attr("title").is_none());
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    mod comments {
        use super::*;

        #[test]
        fn should_parse_trimmed_comments() {
            assert_eq!(
                humanize_dom(&parse("<div><!-- hello --></div>")),
                rows(&[("Element", "div", 0), ("Comment", "hello", 1)])
            );
        }
    }

    mod source_spans {
        use super::*;

        #[test]
        fn should_store_the_source_of_every_node() {
            let result = parse("<div>a<!--c--></div>");
            assert_eq!(
                humanize_dom_source_spans(&result.root_nodes),
                rows(&[("Element", "<div>a<!--c--></div>", 0), ("Text", "a", 1), ("Comment", "<!--c-->", 1)])
            );
        }

        #[test]
        fn should_store_start_and_end_spans() {
            let result = parse("<div [title]=\"t\">x</div>");
            let Node::Element(div) = &result.root_nodes[0] else {
                panic!("expected an element");
            };
            assert_eq!(div.start_source_span.text(), "<div [title]=\"t\">");
            assert_eq!(div.end_source_span.as_ref().map(|s| s.text()), Some("</div>"));

            let attr = &div.attrs[0];
            assert_eq!(attr.source_span.text(), "[title]=\"t\"");
            assert_eq!(attr.key_span.text(), "[title]");
            assert_eq!(attr.value_span.as_ref().map(|s| s.text()), Some("t"));
            assert_eq!(attr.value_offset(), 14);
        }

        #[test]
        fn should_use_the_name_end_as_offset_of_valueless_attributes() {
            let result = parse("<div hidden></div>");
            let Node::Element(div) = &result.root_nodes[0] else {
                panic!("expected an element");
            };
            assert!(div.attrs[0].value_span.is_none());
            assert_eq!(div.attrs[0].value_offset(), 11);
        }

        #[test]
        fn should_reuse_the_start_span_as_end_of_self_closing_elements() {
            let result = parse("<my-cmp/>");
            let Node::Element(cmp) = &result.root_nodes[0] else {
                panic!("expected an element");
            };
            assert_eq!(cmp.end_source_span.as_ref(), Some(&cmp.start_source_span));
        }

        #[test]
        fn should_track_lines_and_columns() {
            let result = parse("<div>\n  <span></span></div>");
            let Node::Element(div) = &result.root_nodes[0] else {
                panic!("expected an element");
            };
            let span = div
                .children
                .iter()
                .find(|n| matches!(n, Node::Element(_)))
                .map(|n| n.source_span().clone())
                .unwrap();
            assert_eq!(humanize_line_column(&span.start), "1:2");
            assert_eq!(span.start.file.url, "TestComp");
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_unexpected_closing_tags() {
            let result = parse("<div></span></div>");
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors[0].msg.starts_with("Unexpected closing tag \"span\""));
            assert_eq!(humanize_line_column(&result.errors[0].span.start), "0:5");
        }

        #[test]
        fn should_report_unclosed_elements() {
            let result = parse("<div><span></div>");
            assert_eq!(
                humanize_errors(&result.errors),
                vec![("Unclosed element \"span\"".to_string(), "0:5".to_string())]
            );
            // the tree is still built
            assert_eq!(result.root_nodes.len(), 1);
        }

        #[test]
        fn should_report_end_tags_of_void_elements() {
            let result = parse("<input></input>");
            assert_eq!(
                humanize_errors(&result.errors),
                vec![("Void elements do not have end tags \"input\"".to_string(), "0:7".to_string())]
            );
        }

        #[test]
        fn should_report_eof_inside_a_tag() {
            let result = parse("<div");
            assert_eq!(
                humanize_errors(&result.errors),
                vec![("Unexpected character \"EOF\" in tag \"div\"".to_string(), "0:0".to_string())]
            );
            assert!(result.root_nodes.is_empty());
        }

        #[test]
        fn should_report_unterminated_comments() {
            let result = parse("<!-- abc");
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.errors[0].msg, "Unexpected character \"EOF\"");
        }

        #[test]
        fn should_report_unknown_entities_and_keep_the_text() {
            let result = parse("<div>&bogus;</div>");
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.errors[0].msg, "Unknown entity \"bogus\"");
            let Node::Element(div) = &result.root_nodes[0] else {
                panic!("expected an element");
            };
            match &div.children[0] {
                Node::Text(text) => assert_eq!(text.value, "&bogus;"),
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
