//! Ordered set of explicitly checked revisions.
//!
//! Invariants: no two entries denote the same revision (see
//! `Commit::same_revision`), and insertion order is preserved. The set is the
//! operand list for multi-revision operations and is independent of the
//! cursor.

use crate::Commit;

#[derive(Debug, Clone, Default)]
pub struct SelectedRevisions {
    revisions: Vec<Commit>,
    /// Slot vacated by the most recent toggle-off, reused if the same
    /// revision is toggled straight back on.
    vacated: Option<(Commit, usize)>,
}

impl PartialEq for SelectedRevisions {
    fn eq(&self, other: &Self) -> bool {
        self.revisions == other.revisions
    }
}

impl Eq for SelectedRevisions {}

impl SelectedRevisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(commit: Commit) -> Self {
        Self {
            revisions: vec![commit],
            vacated: None,
        }
    }

    /// Build from an iterator, dropping later duplicates.
    pub fn from_commits<I: IntoIterator<Item = Commit>>(commits: I) -> Self {
        let mut out = Self::new();
        for commit in commits {
            out.add(commit);
        }
        out
    }

    /// Returns false when the revision was already present.
    pub fn add(&mut self, commit: Commit) -> bool {
        if self.contains(&commit) {
            return false;
        }
        self.vacated = None;
        self.revisions.push(commit);
        true
    }

    pub fn remove(&mut self, commit: &Commit) -> bool {
        self.vacated = None;
        self.take(commit).is_some()
    }

    fn take(&mut self, commit: &Commit) -> Option<(Commit, usize)> {
        let idx = self.revisions.iter().position(|c| c.same_revision(commit))?;
        Some((self.revisions.remove(idx), idx))
    }

    /// Check or uncheck `commit`; returns whether it is checked afterwards.
    /// Toggling the same revision twice in a row restores both contents and
    /// order.
    pub fn toggle(&mut self, commit: Commit) -> bool {
        if let Some(removed) = self.take(&commit) {
            self.vacated = Some(removed);
            return false;
        }
        match self.vacated.take() {
            Some((prev, idx)) if prev.same_revision(&commit) => {
                self.revisions.insert(idx.min(self.revisions.len()), commit);
            }
            _ => self.revisions.push(commit),
        }
        true
    }

    pub fn contains(&self, commit: &Commit) -> bool {
        self.revisions.iter().any(|c| c.same_revision(commit))
    }

    pub fn clear(&mut self) {
        self.revisions.clear();
        self.vacated = None;
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Commit> {
        self.revisions.iter()
    }

    pub fn first(&self) -> Option<&Commit> {
        self.revisions.first()
    }

    pub fn last(&self) -> Option<&Commit> {
        self.revisions.last()
    }

    pub fn change_ids(&self) -> Vec<String> {
        self.revisions
            .iter()
            .map(|c| c.change_id().to_string())
            .collect()
    }

    /// Union revset over all entries, e.g. `abc | def`.
    pub fn as_revset(&self) -> String {
        self.change_ids().join(" | ")
    }
}

impl IntoIterator for SelectedRevisions {
    type Item = Commit;
    type IntoIter = std::vec::IntoIter<Commit>;

    fn into_iter(self) -> Self::IntoIter {
        self.revisions.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(id: &str) -> Commit {
        Commit::new(id, format!("{id}-commit"))
    }

    #[test]
    fn toggle_twice_restores_contents_and_order() {
        let mut set = SelectedRevisions::from_commits([c("a"), c("b"), c("c")]);
        let original = set.clone();
        assert!(!set.toggle(c("b")));
        assert_eq!(set.change_ids(), vec!["a", "c"]);
        assert!(set.toggle(c("b")));
        assert_eq!(set.change_ids(), vec!["a", "b", "c"]);

        assert!(set.toggle(c("d")));
        assert!(!set.toggle(c("d")));
        assert_eq!(set, original);
    }

    #[test]
    fn toggle_after_other_change_appends() {
        let mut set = SelectedRevisions::from_commits([c("a"), c("b")]);
        set.toggle(c("a"));
        set.add(c("x"));
        set.toggle(c("a"));
        assert_eq!(set.change_ids(), vec!["b", "x", "a"]);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut set = SelectedRevisions::new();
        assert!(set.add(c("a")));
        assert!(!set.add(Commit::new("A", "other")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn revset_joins_in_insertion_order() {
        let set = SelectedRevisions::from_commits([c("b"), c("a"), c("b")]);
        assert_eq!(set.as_revset(), "b | a");
        assert_eq!(set.last().map(Commit::change_id), Some("a"));
    }
}
