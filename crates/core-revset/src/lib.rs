//! Revset window expansion.
//!
//! When the user scrolls past the oldest loaded revision, the current revset
//! is rewritten to ask for more history: the largest `ancestors(base, N)`
//! limit is raised by a step, or, if there is none, a bounded ancestor clause
//! rooted at the oldest visible revision is appended.

use tracing::trace;

mod scan;

pub use scan::{find_matching_paren, first_top_level_comma, trim_range};

/// How many extra ancestors each expansion asks for.
pub const AUTO_EXPAND_STEP: i64 = 50;

const ANCESTORS: &str = "ancestors";

/// An integer limit inside an `ancestors(...)` call, located by byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AncestorsRange {
    pub start: usize,
    pub end: usize,
    pub value: i64,
}

/// Rewrite `revset` to cover more history. `None` means no expansion is
/// possible (empty revset, non-positive step, or nothing to anchor on).
pub fn expand_for_more_history(revset: &str, fallback_base: &str, step: i64) -> Option<String> {
    let revset = revset.trim();
    if revset.is_empty() || step <= 0 {
        return None;
    }
    if let Some(expanded) = increment_largest_ancestors_range(revset, step) {
        trace!(target: "revset.expand", %expanded, "incremented");
        return Some(expanded);
    }
    let base = fallback_base.trim();
    if base.is_empty() {
        return None;
    }
    Some(format!("({revset}) | ancestors({base}, {step})"))
}

/// Raise the largest bounded-ancestor limit by `step`. The first of several
/// equal limits wins.
pub fn increment_largest_ancestors_range(revset: &str, step: i64) -> Option<String> {
    let ranges = find_ancestors_ranges(revset);
    let mut iter = ranges.into_iter();
    let mut target = iter.next()?;
    for candidate in iter {
        if candidate.value > target.value {
            target = candidate;
        }
    }
    let next = target.value.saturating_add(step);
    Some(format!(
        "{}{}{}",
        &revset[..target.start],
        next,
        &revset[target.end..]
    ))
}

/// Every `ancestors(base, <integer>)` limit in `revset`, left to right.
/// Calls nested inside a matched call's arguments are not visited.
pub fn find_ancestors_ranges(revset: &str) -> Vec<AncestorsRange> {
    let token = "ancestors(";
    let mut ranges = Vec::new();
    let mut from = 0;
    while let Some(found) = revset[from..].find(token) {
        let start = from + found;
        let open = start + ANCESTORS.len();
        let Some(close) = find_matching_paren(revset, open) else {
            from = start + token.len();
            continue;
        };
        let args_start = open + 1;
        let args = &revset[args_start..close];
        if let Some(comma) = first_top_level_comma(args) {
            let (lo, hi) = trim_range(args, comma + 1, args.len());
            if lo < hi {
                if let Ok(value) = args[lo..hi].parse::<i64>() {
                    ranges.push(AncestorsRange {
                        start: args_start + lo,
                        end: args_start + hi,
                        value,
                    });
                }
            }
        }
        from = close + 1;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn increments_largest_limit_only() {
        let revset = "present(@) | ancestors(immutable_heads().., 2) | present(trunk()) | ancestors(trunk(), 20)";
        assert_eq!(
            expand_for_more_history(revset, "ignored", AUTO_EXPAND_STEP).as_deref(),
            Some(
                "present(@) | ancestors(immutable_heads().., 2) | present(trunk()) | ancestors(trunk(), 70)"
            )
        );
    }

    #[test]
    fn appends_clause_when_unbounded() {
        assert_eq!(
            expand_for_more_history("present(@)", "b", 50).as_deref(),
            Some("(present(@)) | ancestors(b, 50)")
        );
    }

    #[test]
    fn quoted_commas_do_not_split_arguments() {
        let revset = r#"present(@) | ancestors(description(glob:"foo,bar"), 3) | ancestors(trunk(), 20)"#;
        assert_eq!(
            expand_for_more_history(revset, "", 50).as_deref(),
            Some(r#"present(@) | ancestors(description(glob:"foo,bar"), 3) | ancestors(trunk(), 70)"#)
        );
    }

    #[test]
    fn nothing_to_expand() {
        assert_eq!(expand_for_more_history("   ", "b", 50), None);
        assert_eq!(expand_for_more_history("all()", "", 50), None);
        assert_eq!(expand_for_more_history("all()", "  ", 50), None);
        assert_eq!(expand_for_more_history("ancestors(x, 3)", "b", 0), None);
    }

    #[test]
    fn ties_rewrite_first_occurrence() {
        assert_eq!(
            increment_largest_ancestors_range("ancestors(a, 5) | ancestors(b, 5)", 1).as_deref(),
            Some("ancestors(a, 6) | ancestors(b, 5)")
        );
    }

    #[test]
    fn non_integer_limits_are_skipped() {
        assert!(find_ancestors_ranges("ancestors(a, x) | ancestors(b)").is_empty());
        assert_eq!(
            expand_for_more_history("ancestors(@)", "q", 50).as_deref(),
            Some("(ancestors(@)) | ancestors(q, 50)")
        );
    }

    #[test]
    fn unbalanced_call_is_skipped() {
        let ranges = find_ancestors_ranges("ancestors(a, 1 | ancestors(b, 9)");
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].value, 9);
    }

    #[test]
    fn limit_whitespace_is_preserved() {
        assert_eq!(
            increment_largest_ancestors_range("ancestors(a,\n  7 )", 3).as_deref(),
            Some("ancestors(a,\n  10 )")
        );
    }

    #[test]
    fn input_is_trimmed_before_rewrite() {
        assert_eq!(
            expand_for_more_history("  ancestors(a, 1)  ", "", 2).as_deref(),
            Some("ancestors(a, 3)")
        );
    }
}
