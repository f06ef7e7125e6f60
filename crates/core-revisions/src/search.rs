use core_model::Row;

/// Cyclic search over rendered row text. `term` must be lowercase; scanning
/// starts at `start` (wrapped) and visits every row at most once.
pub fn quick_search(rows: &[Row], term: &str, start: isize, reverse: bool) -> Option<usize> {
    if term.is_empty() || rows.is_empty() {
        return None;
    }
    let n = rows.len() as isize;
    (0..n)
        .map(|i| {
            let idx = if reverse { start - i } else { start + i };
            idx.rem_euclid(n) as usize
        })
        .find(|&idx| rows[idx].matches_lowercase(term))
}
