//! Catalog of backend invocations.
//!
//! Every constructor returns a self-contained argument vector (the program
//! name itself is supplied by the runner). Colour is always disabled so
//! captured output can be parsed verbatim.

use std::fmt;

use core_model::{Commit, SelectedRevisions};

/// Template printing one short change id per line.
const CHANGE_ID_LINE: &str = r#"change_id.short() ++ "\n""#;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JjCommand {
    args: Vec<String>,
    mutating: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RebaseSource {
    #[default]
    Revision,
    Branch,
    Descendants,
}

impl RebaseSource {
    pub fn flag(self) -> &'static str {
        match self {
            RebaseSource::Revision => "-r",
            RebaseSource::Branch => "-b",
            RebaseSource::Descendants => "-s",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RebaseSource::Revision => "revision",
            RebaseSource::Branch => "branch",
            RebaseSource::Descendants => "descendants",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RebaseTarget {
    #[default]
    Destination,
    After,
    Before,
}

impl RebaseTarget {
    pub fn flag(self) -> &'static str {
        match self {
            RebaseTarget::Destination => "-d",
            RebaseTarget::After => "-A",
            RebaseTarget::Before => "-B",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RebaseTarget::Destination => "onto",
            RebaseTarget::After => "after",
            RebaseTarget::Before => "before",
        }
    }
}

impl JjCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            mutating: false,
        }
    }

    fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn no_color(self) -> Self {
        self.arg("--color").arg("never")
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// True for commands that rewrite repository state.
    pub fn is_mutating(&self) -> bool {
        self.mutating
    }

    /// Graph log for `revset`; `limit == 0` means unlimited.
    pub fn log(revset: &str, limit: usize, template: &str) -> Self {
        let mut cmd = Self::new(["log"]).no_color();
        if !revset.trim().is_empty() {
            cmd = cmd.arg("-r").arg(revset);
        }
        if limit > 0 {
            cmd = cmd.arg("--limit").arg(limit.to_string());
        }
        cmd.arg("-T").arg(template)
    }

    fn single_id(revset: &str, template: &str) -> Self {
        Self::new(["log", "--no-graph", "--limit", "1"])
            .no_color()
            .arg("-r")
            .arg(revset)
            .arg("-T")
            .arg(template)
    }

    /// Closest parent outside the given set.
    pub fn parent(revisions: &SelectedRevisions) -> Self {
        let set = revisions.as_revset();
        Self::single_id(
            &format!("heads(::({set}) ~ ({set}))"),
            CHANGE_ID_LINE,
        )
    }

    pub fn first_child(commit: &Commit) -> Self {
        Self::single_id(
            &format!("roots(children({}))", commit.change_id()),
            CHANGE_ID_LINE,
        )
    }

    pub fn full_commit_id(revision: &str) -> Self {
        Self::single_id(revision, "commit_id")
    }

    pub fn full_change_id(revision: &str) -> Self {
        Self::single_id(revision, "change_id")
    }

    /// Short change ids for every revision in `revset`, newest first.
    pub fn ids_from_revset(revset: &str) -> Self {
        Self::new(["log", "--no-graph"])
            .no_color()
            .arg("-r")
            .arg(revset)
            .arg("-T")
            .arg(CHANGE_ID_LINE)
    }

    pub fn op_log_id() -> Self {
        Self::new([
            "op",
            "log",
            "--no-graph",
            "--limit",
            "1",
            "--ignore-working-copy",
        ])
        .no_color()
        .arg("-T")
        .arg("id.short()")
    }

    pub fn diff_summary(change_id: &str) -> Self {
        Self::new(["diff", "--summary"])
            .no_color()
            .arg("-r")
            .arg(change_id)
    }

    pub fn root() -> Self {
        Self::new(["root"])
    }

    pub fn new_change(parents: &SelectedRevisions, no_edit: bool) -> Self {
        let mut cmd = Self::new(["new"]).no_color();
        if no_edit {
            cmd = cmd.arg("--no-edit");
        }
        for id in parents.change_ids() {
            cmd = cmd.arg("-r").arg(id);
        }
        cmd.mutating()
    }

    pub fn edit(change_id: &str, ignore_immutable: bool) -> Self {
        let mut cmd = Self::new(["edit"]).no_color().arg("-r").arg(change_id);
        if ignore_immutable {
            cmd = cmd.arg("--ignore-immutable");
        }
        cmd.mutating()
    }

    pub fn absorb(change_id: &str) -> Self {
        Self::new(["absorb"])
            .no_color()
            .arg("--from")
            .arg(change_id)
            .mutating()
    }

    pub fn abandon(revisions: &SelectedRevisions) -> Self {
        let mut cmd = Self::new(["abandon"]).no_color();
        for id in revisions.change_ids() {
            cmd = cmd.arg("-r").arg(id);
        }
        cmd.mutating()
    }

    pub fn rebase(
        revisions: &SelectedRevisions,
        target: &str,
        source: RebaseSource,
        placement: RebaseTarget,
    ) -> Self {
        let mut cmd = Self::new(["rebase"]).no_color();
        for id in revisions.change_ids() {
            cmd = cmd.arg(source.flag()).arg(id);
        }
        cmd.arg(placement.flag()).arg(target).mutating()
    }

    pub fn squash(from: &SelectedRevisions, into: &str) -> Self {
        let mut cmd = Self::new(["squash"]).no_color();
        for id in from.change_ids() {
            cmd = cmd.arg("--from").arg(id);
        }
        cmd.arg("--into").arg(into).mutating()
    }

    pub fn describe(change_id: &str, message: &str) -> Self {
        Self::new(["describe"])
            .no_color()
            .arg("-r")
            .arg(change_id)
            .arg("-m")
            .arg(message)
            .mutating()
    }
}

impl fmt::Display for JjCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("jj")?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
