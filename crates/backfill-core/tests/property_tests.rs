use backfill_core::{apply, apply_with_report, locate};
use backfill_test_utils::{arb_widget_buffer, count_invocations, widget_rules};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_apply_is_idempotent(buffer in arb_widget_buffer()) {
        let rules = widget_rules();
        let once = apply(&buffer, "Widget", &rules).unwrap();
        let twice = apply(&once, "Widget", &rules).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_invocation_count_is_unchanged(buffer in arb_widget_buffer()) {
        let out = apply(&buffer, "Widget", &widget_rules()).unwrap();
        prop_assert_eq!(
            count_invocations(&out, "Widget"),
            count_invocations(&buffer, "Widget")
        );
        prop_assert_eq!(out.matches("MyWidget(").count(), buffer.matches("MyWidget(").count());
    }

    #[test]
    fn prop_output_only_grows_by_insertions(buffer in arb_widget_buffer()) {
        let rules = widget_rules();
        let (out, report) = apply_with_report(&buffer, "Widget", &rules).unwrap();
        let inserted: usize = report
            .insertions
            .iter()
            .map(|ins| {
                rules
                    .iter()
                    .find(|r| r.required_key == ins.required_key)
                    .map_or(0, |r| r.insertion_text("").len())
            })
            .sum();
        prop_assert_eq!(out.len(), buffer.len() + inserted);
    }

    #[test]
    fn prop_every_span_is_balanced(buffer in arb_widget_buffer()) {
        let out = apply(&buffer, "Widget", &widget_rules()).unwrap();
        for span in locate(&out, "Widget").unwrap() {
            let args = span.args_text(&out);
            prop_assert_eq!(args.matches('(').count(), args.matches(')').count());
        }
    }

    #[test]
    fn prop_apply_is_deterministic(buffer in arb_widget_buffer()) {
        let rules = widget_rules();
        prop_assert_eq!(
            apply(&buffer, "Widget", &rules).unwrap(),
            apply(&buffer, "Widget", &rules).unwrap()
        );
    }
}
