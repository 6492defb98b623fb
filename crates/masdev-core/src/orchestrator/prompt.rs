//! The rerun confirmation the orchestrator asks for when an application is
//! already running.

use async_trait::async_trait;

/// What to do about an application that is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunChoice {
    /// Stop the running instance, then launch again.
    StopAndRerun,
    /// Leave it alone and skip the launch. Also the answer for a dismissed
    /// prompt.
    Cancel,
}

/// Source of rerun decisions. The wait is unbounded.
#[async_trait]
pub trait RerunPrompt: Send {
    async fn confirm_rerun(&mut self, app_name: &str) -> RerunChoice;
}

/// Answers every prompt the same way. Used for non-interactive runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub RerunChoice);

#[async_trait]
impl RerunPrompt for FixedAnswer {
    async fn confirm_rerun(&mut self, app_name: &str) -> RerunChoice {
        tracing::debug!(app = app_name, choice = ?self.0, "answering rerun prompt without asking");
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_answer_always_answers_the_same() {
        let mut prompt = FixedAnswer(RerunChoice::Cancel);
        assert_eq!(prompt.confirm_rerun("a").await, RerunChoice::Cancel);
        assert_eq!(prompt.confirm_rerun("b").await, RerunChoice::Cancel);
    }
}
