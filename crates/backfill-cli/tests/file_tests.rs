//! File-level tests for the CLI shell

use backfill_cli::{describe_spans, load_rules, outcomes_json, process_file, Mode};
use backfill_core::Delimiters;
use backfill_test_utils::{MARKETPLACE_SOURCE, PRODUCT_RULES_TOML};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_write_mode_rewrites_in_place() {
    let dir = TempDir::new().unwrap();
    let rules = load_rules(&write(&dir, "rules.toml", PRODUCT_RULES_TOML)).unwrap();
    let source = write(&dir, "marketplace_service.dart", MARKETPLACE_SOURCE);

    let outcome = process_file(&source, &rules, Mode::Write).unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.report.insertions.len(), 6);
    assert!(outcome.output.is_none());
    let written = fs::read_to_string(&source).unwrap();
    assert!(written.contains("sellerId: 'seller-3',\ntags: [],"));

    // second run finds nothing to do
    let again = process_file(&source, &rules, Mode::Write).unwrap();
    assert!(!again.changed);
    assert_eq!(fs::read_to_string(&source).unwrap(), written);
}

#[test]
fn test_check_mode_leaves_file_alone() {
    let dir = TempDir::new().unwrap();
    let rules = load_rules(&write(&dir, "rules.toml", PRODUCT_RULES_TOML)).unwrap();
    let source = write(&dir, "svc.dart", MARKETPLACE_SOURCE);

    let outcome = process_file(&source, &rules, Mode::Check).unwrap();

    assert!(outcome.changed);
    assert_eq!(fs::read_to_string(&source).unwrap(), MARKETPLACE_SOURCE);
}

#[test]
fn test_print_mode_returns_output() {
    let dir = TempDir::new().unwrap();
    let rules = load_rules(&write(&dir, "rules.toml", PRODUCT_RULES_TOML)).unwrap();
    let source = write(&dir, "svc.dart", MARKETPLACE_SOURCE);

    let outcome = process_file(&source, &rules, Mode::Print).unwrap();

    let output = outcome.output.unwrap();
    assert!(output.contains("type: ProductType.crop,"));
    assert_eq!(fs::read_to_string(&source).unwrap(), MARKETPLACE_SOURCE);
}

#[test]
fn test_unbalanced_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let rules = load_rules(&write(&dir, "rules.toml", PRODUCT_RULES_TOML)).unwrap();
    let source = write(&dir, "broken.dart", "Product(\n  id: 'p',\n");

    let err = process_file(&source, &rules, Mode::Write).unwrap_err();

    assert!(format!("{err:#}").contains("unbalanced delimiters"));
    assert_eq!(fs::read_to_string(&source).unwrap(), "Product(\n  id: 'p',\n");
}

#[test]
fn test_bad_rule_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "rules.toml", "construct = \"\"\n");
    assert!(load_rules(&path).is_err());
    assert!(load_rules(&dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let rules = load_rules(&write(&dir, "rules.toml", PRODUCT_RULES_TOML)).unwrap();
    let source = write(&dir, "svc.dart", MARKETPLACE_SOURCE);
    let outcome = process_file(&source, &rules, Mode::Check).unwrap();

    let json = outcomes_json(&[outcome]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value[0]["changed"], true);
    assert_eq!(value[0]["report"]["construct"], "Product");
    assert_eq!(value[0]["report"]["invocations"], 3);
    assert_eq!(value[0]["report"]["insertions"].as_array().unwrap().len(), 6);
}

#[test]
fn test_describe_spans_positions() {
    let spans = describe_spans(MARKETPLACE_SOURCE, "Product", Delimiters::default()).unwrap();

    assert_eq!(spans.len(), 3);
    assert_eq!((spans[0].line, spans[0].column), (4, 7));
    assert_eq!(spans[0].text, "Product(");
    assert!(spans.windows(2).all(|w| w[0].start < w[1].start));
}
