use core_jj::{RebaseSource, RebaseTarget};
use core_model::{Commit, SelectedRevisions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateTarget {
    Parent,
    Child,
    WorkingCopy,
    Top,
    Bottom,
}

/// Cursor movement request. Exactly one of three forms applies, checked in
/// order: explicit revision id, symbolic target, relative delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigate {
    /// Rows to move; zero means one row down.
    pub delta: isize,
    /// Move by a viewport page instead of `delta` rows (sign taken from `delta`).
    pub is_page: bool,
    pub target: Option<NavigateTarget>,
    pub change_id: Option<String>,
    /// Tried when `change_id` does not resolve.
    pub fallback_id: Option<String>,
    /// Scroll the viewport to keep the cursor visible; defaults to true.
    pub ensure_view: Option<bool>,
    /// Allow pulling more rows or expanding the revset past the end; defaults
    /// to true.
    pub allow_stream: Option<bool>,
}

impl Navigate {
    pub fn by(delta: isize) -> Self {
        Self {
            delta,
            ..Self::default()
        }
    }

    pub fn page(delta: isize) -> Self {
        Self {
            delta,
            is_page: true,
            ..Self::default()
        }
    }

    pub fn to(target: NavigateTarget) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn to_revision(change_id: impl Into<String>) -> Self {
        Self {
            change_id: Some(change_id.into()),
            ..Self::default()
        }
    }

    pub fn or_else(mut self, fallback_id: impl Into<String>) -> Self {
        self.fallback_id = Some(fallback_id.into());
        self
    }

    pub fn without_stream(mut self) -> Self {
        self.allow_stream = Some(false);
        self
    }

    pub fn keep_view(mut self) -> Self {
        self.ensure_view = Some(false);
        self
    }

    pub fn step(&self) -> isize {
        if self.delta == 0 { 1 } else { self.delta }
    }

    pub fn ensure_view(&self) -> bool {
        self.ensure_view.unwrap_or(true)
    }

    pub fn allow_stream(&self) -> bool {
        self.allow_stream.unwrap_or(true)
    }

    pub fn has_explicit_id(&self) -> bool {
        let non_empty = |id: &Option<String>| id.as_deref().is_some_and(|s| !s.trim().is_empty());
        non_empty(&self.change_id) || non_empty(&self.fallback_id)
    }
}

/// Explicit selections on `Start*` intents override the checked set and the
/// cursor; empty means "use the engine's effective selection".
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Navigate(Navigate),
    ToggleSelect,
    Cancel,
    Refresh {
        keep_selections: bool,
        selected_revision: Option<String>,
    },
    QuickSearchCycle {
        reverse: bool,
    },
    QuickSearchClear,
    CopyCommitSha,
    CopyChangeId,
    OpenDetails,
    StartInlineDescribe {
        selected: Option<Commit>,
    },
    StartNew {
        selected: SelectedRevisions,
        no_edit: bool,
    },
    StartEdit {
        selected: Option<Commit>,
        ignore_immutable: bool,
    },
    StartAbsorb {
        selected: Option<Commit>,
    },
    StartAbandon {
        selected: SelectedRevisions,
    },
    StartRebase {
        selected: SelectedRevisions,
        source: RebaseSource,
        target: RebaseTarget,
    },
    StartSquash {
        selected: SelectedRevisions,
    },
    /// Confirm the active operation.
    Apply,
    SetRebaseSource(RebaseSource),
    SetRebaseTarget(RebaseTarget),
    Quit,
}

impl Intent {
    pub fn refresh() -> Self {
        Intent::Refresh {
            keep_selections: false,
            selected_revision: None,
        }
    }

    /// Short stable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Navigate(_) => "navigate",
            Intent::ToggleSelect => "toggle_select",
            Intent::Cancel => "cancel",
            Intent::Refresh { .. } => "refresh",
            Intent::QuickSearchCycle { .. } => "quick_search_cycle",
            Intent::QuickSearchClear => "quick_search_clear",
            Intent::CopyCommitSha => "copy_commit_sha",
            Intent::CopyChangeId => "copy_change_id",
            Intent::OpenDetails => "open_details",
            Intent::StartInlineDescribe { .. } => "start_inline_describe",
            Intent::StartNew { .. } => "start_new",
            Intent::StartEdit { .. } => "start_edit",
            Intent::StartAbsorb { .. } => "start_absorb",
            Intent::StartAbandon { .. } => "start_abandon",
            Intent::StartRebase { .. } => "start_rebase",
            Intent::StartSquash { .. } => "start_squash",
            Intent::Apply => "apply",
            Intent::SetRebaseSource(_) => "set_rebase_source",
            Intent::SetRebaseTarget(_) => "set_rebase_target",
            Intent::Quit => "quit",
        }
    }
}
