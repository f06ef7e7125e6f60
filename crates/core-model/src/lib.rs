//! Value types shared across the revision list.
//!
//! * `Commit` is one revision as reported by the backend (change id, commit id,
//!   working-copy flag and a few display fields).
//! * `Row` pairs a commit with the graph lines drawn for it. Rows are owned by
//!   the revision engine and replaced wholesale on every completed load.
//! * `SelectedRevisions` is the ordered set of revisions the user checked.
//!
//! The `@` symbol never names a literal id: resolution code treats it as "the
//! row flagged as working copy".

pub mod selection;

pub use selection::SelectedRevisions;

/// Symbol resolved to the working-copy row.
pub const WORKING_COPY: &str = "@";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// Change id exactly as printed by the backend; divergent changes carry a
    /// `??` or `/N` suffix here.
    pub change_id: String,
    pub commit_id: String,
    pub is_working_copy: bool,
    pub immutable: bool,
    pub bookmarks: Vec<String>,
    pub author: String,
    pub description: String,
}

impl Commit {
    pub fn new(change_id: impl Into<String>, commit_id: impl Into<String>) -> Self {
        Self {
            change_id: change_id.into(),
            commit_id: commit_id.into(),
            ..Self::default()
        }
    }

    pub fn working_copy(mut self) -> Self {
        self.is_working_copy = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Change id without any divergence suffix; this is the form passed back
    /// to the backend in commands.
    pub fn change_id(&self) -> &str {
        let id = self.change_id.trim();
        let id = id.strip_suffix("??").unwrap_or(id);
        match id.find('/') {
            Some(idx) => &id[..idx],
            None => id,
        }
    }

    /// Two commits denote the same revision when their change ids match, or,
    /// lacking change ids, their commit ids.
    pub fn same_revision(&self, other: &Commit) -> bool {
        let (a, b) = (self.change_id(), other.change_id());
        if !a.is_empty() && !b.is_empty() {
            return a.eq_ignore_ascii_case(b);
        }
        !self.commit_id.is_empty() && self.commit_id.eq_ignore_ascii_case(&other.commit_id)
    }
}

/// A run of text inside a graph line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub role: SegmentRole,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SegmentRole {
    #[default]
    Text,
    ChangeId,
    CommitId,
    Bookmark,
    Author,
    Description,
}

impl Segment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: SegmentRole::Text,
        }
    }

    pub fn with_role(text: impl Into<String>, role: SegmentRole) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LineFlags: u8 {
        /// The line carrying the node glyph and revision fields.
        const REVISION = 0b0000_0001;
        /// Connector-only line between nodes.
        const CONNECTOR = 0b0000_0010;
        /// `~` marker for history cut off by the revset.
        const ELIDED = 0b0000_0100;
    }
}

/// One terminal line belonging to a row: graph gutter glyphs followed by text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphRowLine {
    pub gutter: Vec<Segment>,
    pub segments: Vec<Segment>,
    pub flags: LineFlags,
}

impl GraphRowLine {
    pub fn gutter_text(&self) -> String {
        self.gutter.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if segment.text.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&segment.text);
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub commit: Commit,
    pub lines: Vec<GraphRowLine>,
    /// Set when the last mutating command reported this revision as changed.
    pub is_affected: bool,
}

impl Row {
    pub fn new(commit: Commit, lines: Vec<GraphRowLine>) -> Self {
        Self {
            commit,
            lines,
            is_affected: false,
        }
    }

    /// Screen lines occupied by the row; never zero.
    pub fn height(&self) -> usize {
        self.lines.len().max(1)
    }

    /// Case-insensitive substring match over every rendered segment. `term`
    /// must already be lowercase.
    pub fn matches_lowercase(&self, term: &str) -> bool {
        self.lines.iter().any(|line| {
            line.segments
                .iter()
                .any(|s| !s.text.is_empty() && s.text.to_lowercase().contains(term))
        })
    }
}
