use core_jj::JjCommand;

/// Work chained after a successful command, executed strictly in order.
/// The first failure stops the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    Run(JjCommand),
    Refresh { keep_selections: bool },
    RefreshAndSelect(String),
    /// Refresh selecting the newest child of `base`, or `@` when it has none.
    SelectLatestChild { base: String },
    CloseOperation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTask {
    pub command: JjCommand,
    pub follow_ups: Vec<FollowUp>,
}

impl CommandTask {
    pub fn new(command: JjCommand) -> Self {
        Self {
            command,
            follow_ups: Vec::new(),
        }
    }

    pub fn then(mut self, follow_up: FollowUp) -> Self {
        self.follow_ups.push(follow_up);
        self
    }

    /// Common case: run, then refresh dropping checked revisions.
    pub fn refreshing(command: JjCommand) -> Self {
        Self::new(command).then(FollowUp::Refresh {
            keep_selections: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_ups_keep_insertion_order() {
        let task = CommandTask::new(JjCommand::root())
            .then(FollowUp::RefreshAndSelect("@".into()))
            .then(FollowUp::CloseOperation);
        assert_eq!(
            task.follow_ups,
            vec![FollowUp::RefreshAndSelect("@".into()), FollowUp::CloseOperation]
        );
    }
}
