mod common;

use common::{core_snapshot, snapshot};
use defquill::format::{summarize, SummaryOptions};
use defquill::xpath::{dedup_matches, Match, QueryEngine, QueryError};
use std::time::Duration;

fn texts(matches: &[Match<'_>]) -> Vec<String> {
    matches.iter().map(|m| m.node.text()).collect()
}

#[test]
fn test_attribute_predicate_selects_single_definition() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);

    let matches = engine.evaluate(r#"Defs/ThingDef[@Name="ResourceBase"]"#).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].document_id, "Defs/Items.xml");
    assert_eq!(matches[0].node.attribute("Abstract"), Some("True"));
}

#[test]
fn test_descendants_follow_store_then_document_order() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);

    let matches = engine.evaluate("//defName").unwrap();
    assert_eq!(
        texts(&matches),
        vec!["Steel", "WoodLog", "WoodPlank", "Orphan", "MaxHitPoints", "Mass"]
    );
    assert_eq!(matches[3].document_id, "Defs/Items.xml");
    assert_eq!(matches[4].document_id, "Defs/Stats.xml");
}

#[test]
fn test_evaluation_is_stable() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);
    let expression = "Defs/ThingDef[stuffProps/color]/defName";

    let first = engine.evaluate(expression).unwrap();
    let second = engine.evaluate(expression).unwrap();
    assert_eq!(first, second);
    assert_eq!(texts(&first), vec!["Steel", "WoodLog"]);
}

#[test]
fn test_child_text_and_boolean_predicates() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);

    let label = engine.first(r#"Defs/ThingDef[defName="Steel"]/label"#).unwrap().unwrap();
    assert_eq!(label.node.text(), "steel");

    let concrete = engine.evaluate("Defs/ThingDef[not(@Abstract)]/defName").unwrap();
    assert_eq!(texts(&concrete), vec!["Steel", "WoodLog", "WoodPlank", "Orphan"]);

    let children = engine
        .evaluate(r#"Defs/ThingDef[@ParentName="ResourceBase" and stuffProps]/defName"#)
        .unwrap();
    assert_eq!(texts(&children), vec!["WoodLog"]);

    let either = engine
        .evaluate(r#"Defs/ThingDef[defName="Orphan" or label="wood"]/defName"#)
        .unwrap();
    assert_eq!(texts(&either), vec!["WoodLog", "Orphan"]);

    let not_item = engine.evaluate(r#"Defs/ThingDef[category!="Item"]"#).unwrap();
    assert!(not_item.is_empty());
}

#[test]
fn test_case_folded_name_search() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);

    let expression = r#"Defs/ThingDef[translate(defName,'ABCDEFGHIJKLMNOPQRSTUVWXYZ','abcdefghijklmnopqrstuvwxyz')="woodlog"]/label"#;
    assert_eq!(texts(&engine.evaluate(expression).unwrap()), vec!["wood"]);

    let partial = engine.evaluate(r#"Defs/ThingDef[contains(label, "wood")]/defName"#).unwrap();
    assert_eq!(texts(&partial), vec!["WoodLog", "WoodPlank"]);
}

#[test]
fn test_no_match_is_empty_not_error() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);
    assert!(engine.evaluate("Defs/PawnKindDef").unwrap().is_empty());
    assert!(engine.first("Defs/PawnKindDef").unwrap().is_none());
}

#[test]
fn test_malformed_expressions_report_descriptive_errors() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);

    let err = engine.evaluate(r#"Defs/ThingDef[defName="Steel""#).unwrap_err();
    assert!(matches!(err, QueryError::UnexpectedEnd { .. }));
    assert_eq!(err.to_string(), "Unexpected end of expression, expected ']'");

    let err = engine.evaluate("Defs/ThingDef[").unwrap_err();
    assert!(matches!(err, QueryError::UnexpectedEnd { .. }));

    let err = engine.evaluate("Defs/..").unwrap_err();
    assert!(matches!(err, QueryError::InvalidSyntax { .. }));
    assert!(err.to_string().starts_with("Invalid path syntax: "));
}

#[test]
fn test_traversal_limit_aborts_query() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot).with_traversal_limit(10);

    let err = engine.evaluate("//*").unwrap_err();
    assert_eq!(err, QueryError::TraversalLimit { limit: 10 });
    assert_eq!(err.to_string(), "Query aborted after visiting 10 nodes");

    let roomy = QueryEngine::new(&snapshot);
    assert!(!roomy.evaluate("//*").unwrap().is_empty());
}

#[test]
fn test_evaluate_at_is_relative_to_node() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);
    let steel = engine.first(r#"Defs/ThingDef[defName="Steel"]"#).unwrap().unwrap();

    let color = engine.evaluate_at(steel.node, "stuffProps/color").unwrap();
    assert_eq!(color.len(), 1);
    assert_eq!(color[0].text(), "(0.6,0.6,0.6)");

    let beauty = engine.evaluate_at(steel.node, "stuffProps//Beauty").unwrap();
    assert_eq!(beauty.iter().map(|n| n.text()).collect::<Vec<_>>(), vec!["0.5", "0"]);
}

#[test]
fn test_union_of_queries_dedups_by_identity() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);

    let by_label = engine.evaluate(r#"Defs/ThingDef[label="wood"]"#).unwrap();
    let by_substring = engine.evaluate(r#"Defs/ThingDef[contains(label, "wood")]"#).unwrap();
    let union = dedup_matches(by_label.into_iter().chain(by_substring));

    let names: Vec<String> = union.iter().filter_map(|m| m.node.child_text("defName")).collect();
    assert_eq!(names, vec!["WoodLog", "WoodPlank"]);
}

#[test]
fn test_equal_subtrees_in_different_documents_are_distinct() {
    let xml = "<Defs><ThingDef><defName>Twin</defName></ThingDef></Defs>";
    let snapshot = snapshot(&[("a.xml", xml), ("b.xml", xml)]);
    let engine = QueryEngine::new(&snapshot);

    let matches = engine.evaluate("Defs/ThingDef").unwrap();
    let ids: Vec<&str> = matches.iter().map(|m| m.document_id).collect();
    assert_eq!(ids, vec!["a.xml", "b.xml"]);
    assert_eq!(dedup_matches(matches.clone().into_iter().chain(matches)).len(), 2);
}

#[test]
fn test_summary_of_real_query() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);

    let matches = engine.evaluate("//label").unwrap();
    let options = SummaryOptions {
        max_shown: 2,
        ..SummaryOptions::default()
    };
    let text = summarize(&matches, Duration::from_micros(42), &options);

    assert!(text.starts_with("<!-- In Defs/Items.xml: -->\n<label>steel</label>\n\n"));
    assert!(text.contains("<label>wood</label>"));
    assert!(!text.contains("wood plank"));
    assert!(text.contains("Found 6 results total (showing first 2 if applicable)"));
    assert!(text.ends_with("<!-- Evaluation time 42µs (0ms) -->"));
}

#[test]
fn test_nested_contexts_return_document_order() {
    let xml = "<Defs><li><li><defName>inner</defName></li><defName>outer</defName></li></Defs>";
    let snapshot = snapshot(&[("Nested.xml", xml)]);
    let engine = QueryEngine::new(&snapshot);

    assert_eq!(texts(&engine.evaluate("//li/defName").unwrap()), vec!["inner", "outer"]);
    assert_eq!(texts(&engine.evaluate("//li//defName").unwrap()), vec!["inner", "outer"]);
}

#[test]
fn test_nested_lists_across_definitions_keep_order() {
    let xml = r#"<Defs>
      <ThingDef>
        <comps>
          <li><compClass>A</compClass><li><compClass>B</compClass></li></li>
          <li><compClass>C</compClass></li>
        </comps>
      </ThingDef>
      <ThingDef><comps><li><compClass>D</compClass></li></comps></ThingDef>
    </Defs>"#;
    let snapshot = snapshot(&[("Comps.xml", xml)]);
    let engine = QueryEngine::new(&snapshot);

    let classes = engine.evaluate("Defs/ThingDef//li/compClass").unwrap();
    assert_eq!(texts(&classes), vec!["A", "B", "C", "D"]);
}

#[test]
fn test_root_path_selects_whole_document() {
    let snapshot = core_snapshot();
    let engine = QueryEngine::new(&snapshot);

    let documents = engine.evaluate("/").unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].document_id, "Defs/Items.xml");
    assert_eq!(documents[0].node.tag(), Some("Defs"));
    assert!(documents[1].node.outer_xml().starts_with("<Defs><StatDef><defName>MaxHitPoints</defName>"));
}
