/**
 * Metadata Tests
 *
 * Loading serialized bundles, static evaluation of metadata expressions and
 * resolution of directive and pipe descriptors.
 */

use serde_json::{json, Value};
use template_compiler::error::MetadataError;
use template_compiler::metadata::{
    DirectiveDescriptor, MetadataBundle, QueryPredicate, StaticEvaluator, METADATA_VERSION,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(modules: Value) -> MetadataBundle {
        MetadataBundle::from_json(&json!({"version": METADATA_VERSION, "modules": modules}).to_string())
            .expect("valid bundle")
    }

    fn reference(module: Option<&str>, name: &str) -> Value {
        match module {
            Some(module) => json!({"__symbolic": "reference", "module": module, "name": name}),
            None => json!({"__symbolic": "reference", "name": name}),
        }
    }

    /// An exported class carrying one `kind({...})` decorator.
    fn decorated_class(kind: &str, argument: Value) -> Value {
        json!({
            "__symbolic": "class",
            "decorators": [{
                "__symbolic": "call",
                "expression": reference(Some("@core"), kind),
                "arguments": [argument]
            }]
        })
    }

    mod loading {
        use super::*;

        #[test]
        fn should_reject_other_versions_before_reading_the_shape() {
            let error = MetadataBundle::from_json(r#"{"version": 2, "modules": "not a map"}"#).unwrap_err();
            assert!(matches!(error, MetadataError::VersionMismatch { found: 2, expected: 1 }));
            assert_eq!(
                error.to_string(),
                "metadata version mismatch: found version 2, expected 1"
            );
        }

        #[test]
        fn should_report_malformed_json() {
            assert!(matches!(MetadataBundle::from_json("{"), Err(MetadataError::Json(_))));
            assert!(matches!(
                MetadataBundle::from_json(r#"{"modules": {}}"#),
                Err(MetadataError::Json(_))
            ));
        }

        #[test]
        fn should_default_missing_sections() {
            let bundle = MetadataBundle::from_json(r#"{"version": 1, "modules": {"a": {}}}"#).unwrap();
            assert!(bundle.modules["a"].exports.is_empty());
            assert!(bundle.modules["a"].locals.is_empty());
        }

        #[test]
        fn should_load_bundles_from_disk() {
            let path = std::env::temp_dir().join(format!("template-compiler-metadata-{}.json", std::process::id()));
            std::fs::write(&path, json!({"version": 1, "modules": {}}).to_string()).unwrap();
            let loaded = MetadataBundle::from_path(&path);
            std::fs::remove_file(&path).ok();
            assert!(loaded.unwrap().modules.is_empty());
        }
    }

    mod evaluation {
        use super::*;

        #[test]
        fn should_evaluate_plain_json_to_itself() {
            let bundle = bundle(json!({"a": {"exports": {"LIST": [1, "two", {"three": 3}]}}}));
            let mut evaluator = StaticEvaluator::new(&bundle);
            assert_eq!(
                evaluator.evaluate_symbol("a", "LIST").unwrap(),
                json!([1, "two", {"three": 3}])
            );
        }

        #[test]
        fn should_follow_references_across_modules() {
            let bundle = bundle(json!({
                "./consts": {"exports": {"PREFIX": "app"}},
                "./cmp": {"exports": {"SELECTOR": {
                    "__symbolic": "binop", "operator": "+",
                    "left": reference(Some("./consts"), "PREFIX"), "right": "-list"
                }}}
            }));
            let mut evaluator = StaticEvaluator::new(&bundle);
            assert_eq!(evaluator.evaluate_symbol("./cmp", "SELECTOR").unwrap(), json!("app-list"));
        }

        #[test]
        fn should_fold_prefix_and_logical_operators() {
            let bundle = bundle(json!({"a": {"exports": {
                "NEG": {"__symbolic": "pre", "operator": "-", "operand": 3},
                "NOT": {"__symbolic": "pre", "operator": "!", "operand": ""},
                "OR": {"__symbolic": "binop", "operator": "||", "left": "", "right": "fallback"},
                "AND": {"__symbolic": "binop", "operator": "&&", "left": 0,
                    "right": reference(None, "MISSING")},
                "SUM": {"__symbolic": "binop", "operator": "*", "left": 6, "right": 7}
            }}}));
            let mut evaluator = StaticEvaluator::new(&bundle);
            assert_eq!(evaluator.evaluate_symbol("a", "NEG").unwrap(), json!(-3));
            assert_eq!(evaluator.evaluate_symbol("a", "NOT").unwrap(), json!(true));
            assert_eq!(evaluator.evaluate_symbol("a", "OR").unwrap(), json!("fallback"));
            // the right side is never evaluated
            assert_eq!(evaluator.evaluate_symbol("a", "AND").unwrap(), json!(0));
            assert_eq!(evaluator.evaluate_symbol("a", "SUM").unwrap(), json!(42));
        }

        #[test]
        fn should_evaluate_class_references_to_their_name() {
            let bundle = bundle(json!({"a": {"exports": {
                "Child": {"__symbolic": "class"},
                "TOKEN": reference(None, "Child")
            }}}));
            let mut evaluator = StaticEvaluator::new(&bundle);
            assert_eq!(evaluator.evaluate_symbol("a", "TOKEN").unwrap(), json!("Child"));
        }

        #[test]
        fn should_detect_circular_references() {
            let bundle = bundle(json!({"a": {"exports": {
                "X": reference(None, "Y"),
                "Y": reference(None, "X")
            }}}));
            match StaticEvaluator::new(&bundle).evaluate_symbol("a", "X") {
                Err(MetadataError::CircularReference { chain }) => {
                    assert_eq!(chain, vec!["a#X", "a#Y", "a#X"]);
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_report_unresolved_symbols() {
            let bundle = bundle(json!({"a": {"exports": {"X": reference(Some("b"), "Missing")}}, "b": {}}));
            match StaticEvaluator::new(&bundle).evaluate_symbol("a", "X") {
                Err(MetadataError::UnresolvedSymbol { module, name }) => {
                    assert_eq!((module.as_str(), name.as_str()), ("b", "Missing"));
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_surface_collection_errors() {
            let bundle = bundle(json!({"a": {"exports": {
                "X": {"__symbolic": "error", "message": "Lambda not supported"}
            }}}));
            let error = StaticEvaluator::new(&bundle).evaluate_symbol("a", "X").unwrap_err();
            assert_eq!(error.to_string(), "a#X is not statically analyzable: Lambda not supported");
        }
    }

    mod resolution {
        use super::*;

        #[test]
        fn should_resolve_directives_and_pipes_in_declaration_order() {
            let bundle = bundle(json!({
                "./consts": {"exports": {"PREFIX": "app"}},
                "./app": {"exports": {
                    "ListCmp": decorated_class("Component", json!({
                        "selector": {"__symbolic": "binop", "operator": "+",
                            "left": reference(Some("./consts"), "PREFIX"), "right": "-list"},
                        "inputs": ["items", "trackBy: listTrackBy"],
                        "host": {"[class.empty]": "!items.length", "(keydown)": "onKey($event)", "role": "list"},
                        "queries": {"rows": {"selector": {"__symbolic": "reference", "name": "Row"},
                            "isViewQuery": true, "first": false}},
                        "ngContentSelectors": ["header", "*"]
                    })),
                    "Row": decorated_class("Directive", json!({"selector": "[appRow]", "exportAs": "row"})),
                    "Service": decorated_class("Injectable", json!({})),
                    "Plain": {"__symbolic": "class"},
                    "JoinPipe": decorated_class("Pipe", json!({"name": "join", "pure": false}))
                }}
            }));
            let resolved = bundle.resolve_descriptors();
            assert!(resolved.failures.is_empty());

            let names: Vec<_> = resolved.directives.iter().map(|d| d.type_name.as_str()).collect();
            assert_eq!(names, vec!["ListCmp", "Row"]);

            let list = &resolved.directives[0];
            assert!(list.is_component);
            assert_eq!(list.selector, "app-list");
            assert_eq!(list.input_binding_name("trackBy"), Some("listTrackBy"));
            assert_eq!(list.host_properties.get("class.empty").map(String::as_str), Some("!items.length"));
            assert_eq!(list.host_listeners.get("keydown").map(String::as_str), Some("onKey($event)"));
            assert_eq!(list.host_attributes.get("role").map(String::as_str), Some("list"));
            assert_eq!(list.view_queries.len(), 1);
            assert_eq!(list.view_queries[0].predicate, QueryPredicate::Type("Row".to_string()));
            assert_eq!(list.ng_content_selectors, vec!["header", "*"]);

            assert_eq!(resolved.directives[1].export_as.as_deref(), Some("row"));
            assert_eq!(resolved.pipes.len(), 1);
            assert_eq!(resolved.pipes[0].name, "join");
            assert_eq!(resolved.pipes[0].type_name, "JoinPipe");
            assert!(!resolved.pipes[0].pure);
        }

        #[test]
        fn should_keep_resolving_past_an_invalid_descriptor() {
            let bundle = bundle(json!({"./app": {"exports": {
                "Broken": decorated_class("Directive", json!({"selector": 42})),
                "Fine": decorated_class("Directive", json!({"selector": "[fine]"}))
            }}}));
            let resolved = bundle.resolve_descriptors();

            let names: Vec<_> = resolved.directives.iter().map(|d| d.type_name.as_str()).collect();
            assert_eq!(names, vec!["Fine"]);
            assert_eq!(resolved.failures.len(), 1);
            match resolved.failure("Broken") {
                Some(MetadataError::InvalidDescriptor { type_name, reason }) => {
                    assert_eq!(type_name, "Broken");
                    assert_eq!(reason, "selector must be a string");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[test]
        fn should_record_evaluation_failures_per_class() {
            let bundle = bundle(json!({"./app": {"exports": {
                "Cmp": decorated_class("Component", json!({"selector": reference(Some("./gone"), "SELECTOR")})),
                "UpperPipe": decorated_class("Pipe", json!({"name": "upper"}))
            }}}));
            let resolved = bundle.resolve_descriptors();
            assert!(matches!(
                resolved.failure("Cmp"),
                Some(MetadataError::UnresolvedModule(module)) if module == "./gone"
            ));
            assert!(resolved.directives.is_empty());
            assert_eq!(resolved.pipes.len(), 1);
            assert!(resolved.failure("UpperPipe").is_none());
        }

        #[test]
        fn should_reject_ng_content_selectors_on_directives() {
            let error = DirectiveDescriptor::from_annotation(
                "Dir",
                &json!({"selector": "[dir]", "ngContentSelectors": ["*"]}),
                false,
            )
            .unwrap_err();
            assert_eq!(
                error.to_string(),
                "invalid descriptor for Dir: only components declare ng-content selectors"
            );
        }

        #[test]
        fn should_deserialize_descriptors_with_camel_case_fields() {
            let descriptor: DirectiveDescriptor = serde_json::from_value(json!({
                "typeName": "Tooltip",
                "selector": "[tooltip]",
                "exportAs": "tooltip",
                "inputs": {"text": "tooltip"}
            }))
            .unwrap();
            assert!(!descriptor.is_component);
            assert_eq!(descriptor.input_binding_name("text"), Some("tooltip"));
            assert!(descriptor.validate().is_ok());
        }
    }
}
