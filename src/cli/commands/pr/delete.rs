//! PR delete command implementation

use colored::Colorize;

use super::diff::show_diff;
use crate::cli::context::{AppContext, RepoSession};
use crate::cli::output::{Output, Table};
use crate::cli::precondition::{parse_ids, require_input};
use crate::cli::prompt::Prompter;
use crate::platform::PullRequest;

/// ID / State / branches / title / description summary
pub fn summary_table(pr: &PullRequest) -> Table {
    let id = pr.id.to_string();
    let state = pr.state.to_string();
    Table::summary(&[
        ("ID", id.as_str()),
        ("State", state.as_str()),
        ("From Branch", pr.from_branch()),
        ("To Branch", pr.to_branch()),
        ("Title", pr.title.as_str()),
        ("Description", pr.description_or_dash()),
    ])
}

/// Delete each pull request after showing it and asking for confirmation.
///
/// Returns the ids that were deleted.
pub async fn delete_pull_requests(
    session: &RepoSession<'_>,
    ids: &[u64],
    yes: bool,
    diff: bool,
) -> anyhow::Result<Vec<u64>> {
    let mut deleted = Vec::new();

    for &id in ids {
        let spinner = Output::spinner(&format!("Fetching info on {} ...", id));
        let pr = session.api.pull_request(&session.repo, id).await?;
        spinner.finish_and_clear();

        summary_table(&pr).print();
        if diff {
            show_diff(session, id).await?;
        }

        if !yes && !session.prompter.confirm("Proceed", false)? {
            Output::info(&format!("Skipped pull request #{}", id));
            continue;
        }

        let spinner = Output::spinner("Deleting pull request ...");
        session
            .api
            .delete_pull_request(&session.repo, id, pr.version)
            .await?;
        spinner.finish_and_clear();
        println!(
            "{}",
            format!("Pull Request Deleted: {}", pr.url()).green().bold()
        );
        deleted.push(id);
    }

    Ok(deleted)
}

/// Run the PR delete command
pub async fn run_pr_delete(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    ids: Option<&str>,
    yes: bool,
    diff: bool,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let session = RepoSession::open(&api, prompter, &ctx.cwd)?;
    let ids = parse_ids(&require_input(ids, "Pull request id(s)", prompter)?)?;
    delete_pull_requests(&session, &ids, yes, diff).await?;
    Ok(())
}
