use core_events::KeyEvent;
use core_keymap::{KeyAction, KeyMap};
use core_model::Commit;

use crate::{OpOutcome, Operation, OperationKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Status letter as printed by `jj diff --summary` (`M`, `A`, `D`, `R`, `C`).
    pub status: char,
    pub path: String,
}

/// Parse `jj diff --summary` output. Lines that do not look like
/// `<status> <path>` are skipped.
pub fn parse_diff_summary(output: &str) -> Vec<ChangedFile> {
    output
        .lines()
        .filter_map(|line| {
            let (status, path) = line.trim_end().split_once(' ')?;
            let mut chars = status.chars();
            let status = chars.next().filter(|c| c.is_ascii_uppercase())?;
            if chars.next().is_some() || path.trim().is_empty() {
                return None;
            }
            Some(ChangedFile {
                status,
                path: path.trim().to_string(),
            })
        })
        .collect()
}

/// Overlay listing the files changed by one revision.
#[derive(Debug)]
pub struct Details {
    commit: Commit,
    files: Vec<ChangedFile>,
    cursor: usize,
}

impl Details {
    pub fn new(commit: Commit, files: Vec<ChangedFile>) -> Self {
        Self {
            commit,
            files,
            cursor: 0,
        }
    }

    pub fn commit(&self) -> &Commit {
        &self.commit
    }

    pub fn files(&self) -> &[ChangedFile] {
        &self.files
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn move_by(&mut self, delta: isize) {
        if self.files.is_empty() {
            return;
        }
        let last = self.files.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }
}

impl Operation for Details {
    fn kind(&self) -> OperationKind {
        OperationKind::Details
    }

    fn is_focused(&self) -> bool {
        true
    }

    fn is_overlay(&self) -> bool {
        true
    }

    fn handle_key(&mut self, key: &KeyEvent, keymap: &KeyMap) -> OpOutcome {
        const KEYS: &[KeyAction] = &[
            KeyAction::Up,
            KeyAction::Down,
            KeyAction::Cancel,
            KeyAction::Details,
            KeyAction::CloseDetails,
        ];
        match keymap.resolve(key, KEYS) {
            Some(KeyAction::Up) => self.move_by(-1),
            Some(KeyAction::Down) => self.move_by(1),
            Some(_) => return OpOutcome::Close,
            None => {}
        }
        OpOutcome::Handled
    }

    fn render_marker(&self, commit: &Commit, _is_cursor: bool) -> Option<String> {
        commit
            .same_revision(&self.commit)
            .then(|| format!("<< {} file(s) >>", self.files.len()))
    }

    fn overlay_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Changes in {}", self.commit.change_id())];
        if self.files.is_empty() {
            lines.push("  (no changes)".to_string());
        }
        for (idx, file) in self.files.iter().enumerate() {
            let pointer = if idx == self.cursor { '>' } else { ' ' };
            lines.push(format!("{pointer} {} {}", file.status, file.path));
        }
        lines
    }

    fn help(&self, keymap: &KeyMap) -> Option<String> {
        Some(format!(
            "{} move  {} close",
            keymap.describe(KeyAction::Down),
            keymap.describe(KeyAction::Cancel)
        ))
    }
}
