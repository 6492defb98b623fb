//! Interactive rerun confirmation on the terminal.

use async_trait::async_trait;
use inquire::Select;

use masdev_core::orchestrator::{RerunChoice, RerunPrompt};

const STOP_AND_RERUN: &str = "Stop and Rerun";
const CANCEL: &str = "Cancel";

/// Asks on the terminal whether to stop and rerun an application that is
/// already running. Escape, Ctrl-C or a prompt error all count as `Cancel`.
#[derive(Debug, Default)]
pub struct InquirePrompt;

fn choice_for(answer: &str) -> RerunChoice {
    if answer == STOP_AND_RERUN {
        RerunChoice::StopAndRerun
    } else {
        RerunChoice::Cancel
    }
}

#[async_trait]
impl RerunPrompt for InquirePrompt {
    async fn confirm_rerun(&mut self, app_name: &str) -> RerunChoice {
        let message = format!("The MAS '{app_name}' is already running. Stop and rerun?");
        // inquire blocks on terminal input.
        let answer = tokio::task::spawn_blocking(move || {
            Select::new(&message, vec![STOP_AND_RERUN, CANCEL]).prompt()
        })
        .await;

        match answer {
            Ok(Ok(choice)) => choice_for(choice),
            Ok(Err(e)) => {
                tracing::debug!(app = app_name, error = %e, "rerun prompt dismissed");
                RerunChoice::Cancel
            }
            Err(e) => {
                tracing::warn!(app = app_name, error = %e, "rerun prompt task failed");
                RerunChoice::Cancel
            }
        }
    }
}
