//! Mapping revision identifiers to row indices.

pub use core_model::WORKING_COPY;
use core_model::Row;
use tracing::trace;

/// Index of the first row matching `target`: the working-copy sentinel, then
/// an exact case-insensitive id match, then a case-insensitive id prefix.
pub fn select_revision(rows: &[Row], target: &str) -> Option<usize> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    if target == WORKING_COPY {
        return rows.iter().position(|row| row.commit.is_working_copy);
    }

    let exact = |id: &str| !id.is_empty() && id.eq_ignore_ascii_case(target);
    let found = rows
        .iter()
        .position(|row| {
            let c = &row.commit;
            exact(c.change_id()) || exact(c.change_id.trim()) || exact(c.commit_id.trim())
        })
        .or_else(|| {
            let prefix = |id: &str| {
                id.get(..target.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(target))
            };
            rows.iter()
                .position(|row| prefix(row.commit.change_id()) || prefix(row.commit.commit_id.trim()))
        });
    trace!(target: "revisions.resolve", %target, index = ?found, "select_revision");
    found
}

/// Cursor after the row set was replaced: `hint`, then the previously
/// selected revision, then the working copy, then the first row.
pub fn restore_cursor(rows: &[Row], hint: Option<&str>, previous: Option<&str>) -> usize {
    [hint, previous, Some(WORKING_COPY)]
        .into_iter()
        .flatten()
        .find_map(|target| select_revision(rows, target))
        .unwrap_or(0)
}
