//! PR copy command implementation

use crate::cli::clipboard::copy_to_clipboard;
use crate::cli::context::{AppContext, RepoSession};
use crate::cli::output::Output;
use crate::cli::precondition::require_id;
use crate::cli::prompt::Prompter;

pub const CLIPBOARD_TIP: &str = "Tip: Pull request url is copied to clipboard ('ctrl+v' to paste)";

/// Copy `url` and print the outcome.
pub fn copy_and_report(url: &str) {
    if copy_to_clipboard(url) {
        Output::hint(CLIPBOARD_TIP);
    } else {
        Output::warning("Clipboard unavailable, copy the url above manually");
    }
}

/// Run the PR copy command
pub async fn run_pr_copy(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    id: Option<u64>,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let session = RepoSession::open(&api, prompter, &ctx.cwd)?;
    let id = require_id(id, prompter)?;

    let spinner = Output::spinner("Fetching pull request url ...");
    let pr = session.api.pull_request(&session.repo, id).await?;
    Output::spinner_done(&spinner, "COPIED");

    println!("{}", pr.url());
    copy_and_report(pr.url());
    Ok(())
}
