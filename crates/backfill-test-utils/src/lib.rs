//! Testing utilities for the backfill workspace
//!
//! Shared fixtures, rule sets and proptest strategies.

#![allow(missing_docs)]

use backfill_core::{InsertionRule, RuleSet};
use proptest::prelude::*;

/// Service file with three `Product` constructors, one already complete
pub const MARKETPLACE_SOURCE: &str = r#"class MarketplaceService {
  List<Product> seed() {
    return [
      Product(
        id: 'p1',
        name: 'Tomatoes',
        sellerId: 'seller-1',
        price: Price(amount: 3, currency: 'EUR'),
      ),
      Product(
        id: 'p2',
        type: ProductType.livestock,
        listingType: ListingType.buy,
        name: 'Goats',
        sellerId: 'seller-2',
        tags: ['farm'],
      ),
      Product(
        id: 'p3',
        name: 'Seeds (mixed)',
        sellerId: 'seller-3',
      ),
    ];
  }
}
"#;

/// The three rules the marketplace fix needs, in dependency order
pub fn product_rules() -> Vec<InsertionRule> {
    vec![
        rule("type", "id", "ProductType.crop"),
        rule("listingType", "type", "ListingType.sell"),
        rule("tags", "sellerId", "[]"),
    ]
}

pub fn product_rule_set() -> RuleSet {
    RuleSet::new("Product", product_rules())
}

/// TOML equivalent of [`product_rule_set`]
pub const PRODUCT_RULES_TOML: &str = r#"construct = "Product"

[[rules]]
required_key = "type"
anchor_key = "id"
literal = "ProductType.crop"

[[rules]]
required_key = "listingType"
anchor_key = "type"
literal = "ListingType.sell"

[[rules]]
required_key = "tags"
anchor_key = "sellerId"
literal = "[]"
"#;

pub fn rule(required: &str, anchor: &str, literal: &str) -> InsertionRule {
    InsertionRule::new(required, anchor, literal).unwrap()
}

/// Rules used with [`arb_widget_buffer`], in dependency order
pub fn widget_rules() -> Vec<InsertionRule> {
    vec![
        rule("type", "id", "Kind.basic"),
        rule("mode", "type", "Mode.auto"),
        rule("tags", "sellerId", "[]"),
    ]
}

/// Count `name(` occurrences at identifier boundaries
pub fn count_invocations(buffer: &str, name: &str) -> usize {
    backfill_core::locate(buffer, name).map_or(0, |spans| spans.len())
}

const ARG_POOL: &[(&str, &str)] = &[
    ("id", "'w'"),
    ("name", "'a, b'"),
    ("type", "Kind.fancy"),
    ("sellerId", "'s'"),
    ("tags", "['x', 'y']"),
    ("price", "calc(1, 2)"),
];

/// Comment line with an unpaired quote, placed among the arguments
const COMMENT_LINE: &str = "  // it's fine\n";

/// One `Widget(...)` invocation with a random subset of arguments
///
/// Up to one nested `Widget` appears as a `child:` value, and a comment
/// containing an apostrophe may sit between the arguments.
pub fn arb_widget(depth: u32) -> BoxedStrategy<String> {
    let flat = proptest::collection::vec(any::<bool>(), ARG_POOL.len() + 1)
        .prop_map(|picks| render_widget(&picks, None));
    if depth == 0 {
        return flat.boxed();
    }
    (
        proptest::collection::vec(any::<bool>(), ARG_POOL.len() + 1),
        proptest::option::of(arb_widget(depth - 1)),
    )
        .prop_map(|(picks, child)| render_widget(&picks, child.as_deref()))
        .boxed()
}

/// Buffer of unrelated text interleaved with `Widget` invocations
pub fn arb_widget_buffer() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        (
            arb_widget(1),
            prop_oneof![
                Just("\n"),
                Just(";\nfinal x = 1;\n"),
                Just(" MyWidget(id: 'z',) "),
                Just("\n// it's a widget: type: none\n"),
            ],
        ),
        0..5,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(widget, filler)| format!("{widget}{filler}"))
            .collect::<String>()
    })
}

fn render_widget(picks: &[bool], child: Option<&str>) -> String {
    let mut out = String::from("Widget(\n");
    if let Some(child) = child {
        out.push_str(&format!("  child: {child},\n"));
    }
    let comment = picks.get(ARG_POOL.len()).copied().unwrap_or(false);
    for (slot, ((key, value), _)) in ARG_POOL
        .iter()
        .zip(picks)
        .enumerate()
        .filter(|(_, (_, pick))| **pick)
    {
        out.push_str(&format!("  {key}: {value},\n"));
        if comment && slot == 1 {
            out.push_str(COMMENT_LINE);
        }
    }
    out.push(')');
    out
}
