use core_revset::{
    AUTO_EXPAND_STEP, expand_for_more_history, find_ancestors_ranges,
    increment_largest_ancestors_range,
};
use proptest::prelude::*;

fn base_expr() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("trunk()".to_string()),
        Just("@".to_string()),
        Just("immutable_heads()..".to_string()),
        Just(r#"description(glob:"a,(b")"#.to_string()),
        Just(r#"author('x\'y,z')"#.to_string()),
        "[a-z]{1,6}",
    ]
}

fn clauses() -> impl Strategy<Value = Vec<(String, u32)>> {
    prop::collection::vec((base_expr(), 0u32..500), 1..5)
}

fn render(clauses: &[(String, u32)]) -> String {
    clauses
        .iter()
        .map(|(base, n)| format!("ancestors({base}, {n})"))
        .collect::<Vec<_>>()
        .join(" | ")
}

proptest! {
    #[test]
    fn finds_every_clause_limit(clauses in clauses()) {
        let revset = render(&clauses);
        let found: Vec<i64> = find_ancestors_ranges(&revset).iter().map(|r| r.value).collect();
        let expected: Vec<i64> = clauses.iter().map(|(_, n)| i64::from(*n)).collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn only_the_first_largest_limit_changes(clauses in clauses(), step in 1i64..200) {
        let revset = render(&clauses);
        let updated = increment_largest_ancestors_range(&revset, step).unwrap();

        let max = clauses.iter().map(|(_, n)| *n).max().unwrap();
        let idx = clauses.iter().position(|(_, n)| *n == max).unwrap();
        let mut expected = clauses.clone();
        expected[idx].1 = max + step as u32;
        prop_assert_eq!(updated, render(&expected));
    }

    #[test]
    fn fallback_wraps_unbounded_revsets(name in "[a-z]{1,8}", base in "[a-z0-9]{1,8}") {
        let revset = format!("present({name})");
        let expanded = expand_for_more_history(&revset, &base, AUTO_EXPAND_STEP).unwrap();
        prop_assert_eq!(expanded, format!("({revset}) | ancestors({base}, {AUTO_EXPAND_STEP})"));
    }

    #[test]
    fn expansion_never_panics(text in "[a-z(),'\"\\\\ 0-9|]{0,40}", base in "[a-z]{0,3}") {
        let _ = expand_for_more_history(&text, &base, AUTO_EXPAND_STEP);
    }
}
