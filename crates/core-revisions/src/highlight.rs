use core_model::Row;

/// Mark rows named in a mutating command's output. Only indented lines are
/// considered; their first token must start with the row's change id.
/// Returns the number of rows marked.
pub fn highlight_changes(rows: &mut [Row], output: &str) -> usize {
    let mut marked = 0;
    for line in output.lines().filter(|l| l.starts_with(' ')) {
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        let hit = rows.iter_mut().find(|row| {
            let id = row.commit.change_id();
            !id.is_empty() && token.starts_with(id)
        });
        if let Some(row) = hit {
            row.is_affected = true;
            marked += 1;
        }
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::Commit;

    #[test]
    fn marks_rows_from_indented_lines() {
        let mut rows = vec![
            Row::new(Commit::new("kxqv", "1"), Vec::new()),
            Row::new(Commit::new("ytrs", "2"), Vec::new()),
            Row::new(Commit::new("", "3"), Vec::new()),
        ];
        let output = "Rebased 1 commits\n  ytrsabcd 5e6f add feature\nWorking copy now at: kxqv\n";
        assert_eq!(highlight_changes(&mut rows, output), 1);
        assert!(!rows[0].is_affected);
        assert!(rows[1].is_affected);
        assert!(!rows[2].is_affected);
    }
}
