//! PR review command implementation

use clap::ValueEnum;
use colored::Colorize;

use crate::cli::context::{AppContext, RepoSession};
use crate::cli::output::Output;
use crate::cli::precondition::require_id;
use crate::cli::prompt::Prompter;
use crate::platform::ReviewStatus;

/// Review verdicts accepted by `bb pr review --action`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReviewAction {
    Approve,
    Unapprove,
    NeedsWork,
}

impl ReviewAction {
    pub fn status(self) -> ReviewStatus {
        match self {
            ReviewAction::Approve => ReviewStatus::Approved,
            ReviewAction::Unapprove => ReviewStatus::Unapproved,
            ReviewAction::NeedsWork => ReviewStatus::NeedsWork,
        }
    }

    fn progress(self) -> &'static str {
        match self {
            ReviewAction::Approve => "Approving",
            ReviewAction::Unapprove => "Unapproving",
            ReviewAction::NeedsWork => "Work required on",
        }
    }

    fn paint(self, text: &str) -> String {
        match self {
            ReviewAction::Approve => text.green().bold().to_string(),
            ReviewAction::Unapprove => text.red().bold().to_string(),
            ReviewAction::NeedsWork => text.yellow().bold().to_string(),
        }
    }
}

/// Set the current user's review status on a pull request.
pub async fn review_pull_request(
    session: &RepoSession<'_>,
    id: u64,
    action: ReviewAction,
) -> anyhow::Result<ReviewStatus> {
    let user = session.api.whoami().await?;
    let status = action.status();
    session
        .api
        .set_review_status(&session.repo, id, &user, status)
        .await?;
    Ok(status)
}

/// Run the PR review command
pub async fn run_pr_review(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    id: Option<u64>,
    action: ReviewAction,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let session = RepoSession::open(&api, prompter, &ctx.cwd)?;
    let id = require_id(id, prompter)?;

    let spinner = Output::spinner(&format!("{} pull request '{}' ...", action.progress(), id));
    let status = review_pull_request(&session, id, action).await?;
    spinner.finish_with_message(format!(
        "{} pull request '{}' ... {}",
        action.progress(),
        id,
        action.paint(status.as_str())
    ));
    Ok(())
}
