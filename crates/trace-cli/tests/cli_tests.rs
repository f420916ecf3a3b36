//! Tests for the xslt-trace command line

use std::fs;
use std::path::Path;

use clap::Parser;
use pretty_assertions::assert_eq;
use xslt_trace_cli::{load_config, run, Cli};
use xslt_trace_core::{BuiltInRulePolicy, Checkpoint, CheckpointKind, DetailLevel};

const EVENTS: &str = r#"[
  {"kind": "document-enter", "level": 1, "attributes": [["engine", "xalan"]]},
  {"kind": "template-enter", "tag": "template-match", "level": 1,
   "location": {"system_id": "file:///work/main.xsl", "line": 3, "column": 5},
   "match_expression": "/"},
  {"kind": "instruction-enter", "tag": "misc", "name": "xsl:apply-templates", "level": 2,
   "location": {"system_id": "file:///work/main.xsl", "line": 4, "column": 9}},
  {"kind": "selection", "level": 2, "selected_node": "item"},
  {"kind": "template-enter", "tag": "template-match", "level": 1,
   "match_expression": "text()", "built_in": true},
  {"kind": "leave", "level": 1},
  {"kind": "leave", "level": 2},
  {"kind": "leave", "level": 1},
  {"kind": "document-leave", "level": 1}
]"#;

const MAIN_XSL: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/">
    <out><xsl:apply-templates/></out>
  </xsl:template>
</xsl:stylesheet>"#;

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path.display().to_string()
}

fn run_to_string(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
    let mut out = Vec::new();
    run(&cli, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// ====== Configuration ======

#[test]
fn test_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "trace.json",
        r#"{"detail_level": 1, "built_in_rules": "skip"}"#,
    );
    let events = write(dir.path(), "events.json", EVENTS);

    let cli = Cli::try_parse_from([
        "xslt-trace",
        "render",
        events.as_str(),
        "--config",
        config.as_str(),
        "--include-built-in",
    ])
    .unwrap();
    let loaded = load_config(&cli).unwrap();
    assert_eq!(loaded.detail_level, DetailLevel::Low);
    assert_eq!(loaded.built_in_rules, BuiltInRulePolicy::Emit);

    let cli = Cli::try_parse_from(["xslt-trace", "render", events.as_str(), "--detail", "2"])
        .unwrap();
    assert_eq!(load_config(&cli).unwrap().detail_level, DetailLevel::Normal);
}

#[test]
fn test_invalid_detail_flag_fails() {
    let cli = Cli::try_parse_from(["xslt-trace", "render", "events.json", "--detail", "9"])
        .unwrap();
    assert!(load_config(&cli).is_err());
}

// ====== Render ======

#[test]
fn test_render_prints_complete_trace() {
    let dir = tempfile::tempdir().unwrap();
    let events = write(dir.path(), "events.json", EVENTS);

    let text = run_to_string(&["xslt-trace", "render", events.as_str(), "--no-separator"]);
    assert_eq!(
        text,
        concat!(
            "<xsl:template match=\"/\" line=\"3\" column=\"5\" module=\"main.xsl\">\n",
            "  <xsl:apply-templates line=\"4\" column=\"9\" module=\"main.xsl\">\n",
            "    <selected node=\"item\"/>\n",
            "    <xsl:template match=\"text()\" built-in=\"true\" location=\"unknown\">\n",
            "\n",
        )
    );
}

#[test]
fn test_render_at_rule_detail() {
    let dir = tempfile::tempdir().unwrap();
    let events = write(dir.path(), "events.json", EVENTS);

    let text = run_to_string(&["xslt-trace", "render", events.as_str(), "--detail", "1"]);
    assert!(text.starts_with("--------------------------------------------New template"));
    assert!(!text.contains("xsl:apply-templates"));
    assert!(text.contains("match=\"text()\""));
}

#[test]
fn test_missing_events_file_is_reported() {
    let cli = Cli::try_parse_from(["xslt-trace", "render", "/nonexistent/events.json"]).unwrap();
    let mut out = Vec::new();
    let err = run(&cli, &mut out).unwrap_err();
    assert!(err.to_string().contains("Failed to read events"));
}

// ====== Report ======

#[test]
fn test_report_writes_checkpoint_lines() {
    let dir = tempfile::tempdir().unwrap();
    let events = write(dir.path(), "events.json", EVENTS);
    let xml = write(dir.path(), "input.xml", "<items><item/></items>");
    let xsl = write(dir.path(), "main.xsl", MAIN_XSL);
    let output = write(dir.path(), "result.xml", "<out/>");

    let text = run_to_string(&[
        "xslt-trace",
        "report",
        events.as_str(),
        "--xml",
        xml.as_str(),
        "--xsl",
        xsl.as_str(),
        "--output",
        output.as_str(),
        "--correlation-id",
        "run-42",
    ]);
    let checkpoints: Vec<Checkpoint> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let labels: Vec<_> = checkpoints.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "XSLT Trace",
            "Start XSLT",
            "XML input file",
            "XSL input file",
            "Complete XSLT Trace",
            "XML after full transformation",
            "Trace layout",
            "template match=/",
            "Line #2 Column #3: main.xsl",
            "xsl:apply-templates",
            "template match=/",
            "Trace layout",
            "Start XSLT",
            "XSLT Trace",
        ]
    );
    assert!(checkpoints.iter().all(|c| c.correlation_id == "run-42"));
    assert_eq!(checkpoints[5].content.as_deref(), Some("<out/>"));
    assert_eq!(checkpoints[0].kind, CheckpointKind::Start);
    assert_eq!(checkpoints[13].kind, CheckpointKind::End);
}

#[test]
fn test_report_includes_built_in_rules_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let events = write(dir.path(), "events.json", EVENTS);
    let xml = write(dir.path(), "input.xml", "<items/>");
    let xsl = write(dir.path(), "main.xsl", MAIN_XSL);
    let common = write(
        dir.path(),
        "common.xsl",
        r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform"/>"#,
    );

    let text = run_to_string(&[
        "xslt-trace",
        "report",
        events.as_str(),
        "--xml",
        xml.as_str(),
        "--xsl",
        xsl.as_str(),
        "--import",
        common.as_str(),
        "--include-built-in",
    ]);
    assert!(text.contains("\"label\":\"built-in-rule match=text() node=\""));
    assert!(text.contains("\"label\":\"common.xsl\""));
}
