//! PR view command implementation

use colored::Colorize;

use crate::cli::browser::open_url;
use crate::cli::context::{AppContext, RepoSession};
use crate::cli::output::{Output, Table};
use crate::cli::precondition::require_id;
use crate::cli::prompt::Prompter;
use crate::platform::PullRequest;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Title, description, state and timestamps
pub fn details_table(pr: &PullRequest) -> Table {
    let created = pr
        .created_at()
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string());
    let updated = pr
        .updated_at()
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string());
    let state = pr.state.to_string();
    Table::summary(&[
        ("Title", pr.title.as_str()),
        ("Description", pr.description_or_dash()),
        ("State", state.as_str()),
        ("Created", created.as_str()),
        ("Updated", updated.as_str()),
    ])
}

pub fn author_table(pr: &PullRequest) -> Table {
    let user = &pr.author.user;
    Table::summary(&[
        ("ID", user.name.as_str()),
        ("Name", user.display_name.as_deref().unwrap_or("-")),
        ("Email", user.email_address.as_deref().unwrap_or("-")),
    ])
}

/// Run the PR view command
pub async fn run_pr_view(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    id: Option<u64>,
    web: bool,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let session = RepoSession::open(&api, prompter, &ctx.cwd)?;
    let id = require_id(id, prompter)?;

    let spinner = Output::spinner(&format!("Fetching info on pr #{} ...", id));
    let pr = session.api.pull_request(&session.repo, id).await?;
    Output::spinner_done(&spinner, "DONE");

    if web {
        if pr.url().is_empty() {
            anyhow::bail!("Pull request #{} has no web link", id);
        }
        open_url(pr.url())?;
        Output::success(&format!("Opened {} in the default browser", pr.url()));
        return Ok(());
    }

    println!(
        "{}",
        format!("PR #({}): {} -> {}", pr.id, pr.from_branch(), pr.to_branch()).bold()
    );
    details_table(&pr).print();
    Output::header("Authored by:");
    author_table(&pr).print();
    Ok(())
}
