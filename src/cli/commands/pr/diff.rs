//! PR diff command implementation

use crate::cli::context::{AppContext, RepoSession};
use crate::cli::output::{Output, Table};
use crate::cli::precondition::require_id;
use crate::cli::prompt::Prompter;
use crate::git::diff_remote_branches;
use crate::platform::Changes;

fn short_hash(hash: &str) -> &str {
    hash.get(..11).unwrap_or(hash)
}

/// Changed files as a FROM HASH / TO HASH / FILE / TYPE table
pub fn changes_table(changes: &Changes) -> Table {
    let mut table = Table::new(vec!["FROM HASH", "TO HASH", "FILE", "TYPE"]);
    for change in &changes.values {
        table.add_row(vec![
            short_hash(&changes.from_hash),
            short_hash(&changes.to_hash),
            &change.path.to_string,
            &change.change_type,
        ]);
    }
    table
}

/// Print the changed files of a pull request followed by the local git diff
/// between its two remote branches.
pub async fn show_diff(session: &RepoSession<'_>, id: u64) -> anyhow::Result<()> {
    let spinner = Output::spinner("Fetching contents from pull request ...");
    let changes = session.api.pull_request_changes(&session.repo, id).await?;
    let pr = session.api.pull_request(&session.repo, id).await?;
    spinner.finish_and_clear();

    changes_table(&changes).print();

    let diff = diff_remote_branches(&session.git, pr.from_branch(), pr.to_branch())?;
    if !diff.is_empty() {
        println!("{}", diff);
    }
    Ok(())
}

/// Run the PR diff command
pub async fn run_pr_diff(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    id: Option<u64>,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let session = RepoSession::open(&api, prompter, &ctx.cwd)?;
    let id = require_id(id, prompter)?;
    show_diff(&session, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Change, ChangePath};

    #[test]
    fn test_changes_table_shortens_hashes() {
        colored::control::set_override(false);
        let changes = Changes {
            from_hash: "0123456789abcdef".to_string(),
            to_hash: "fedcba".to_string(),
            values: vec![Change {
                path: ChangePath {
                    to_string: "src/main.rs".to_string(),
                },
                change_type: "MODIFY".to_string(),
            }],
        };
        let lines = changes_table(&changes).render();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("0123456789a  fedcba"));
        assert!(lines[2].ends_with("src/main.rs  MODIFY"));
    }
}
