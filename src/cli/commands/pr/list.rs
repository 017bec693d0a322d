//! PR list command implementation
//!
//! Pull requests are grouped as repository → state → pull request and
//! rendered as one tree per repository.

use std::collections::BTreeMap;

use clap::ValueEnum;

use crate::cli::context::{AppContext, RepoSession};
use crate::cli::output::{Output, Tree, TreeEntry};
use crate::cli::prompt::Prompter;
use crate::platform::{PrState, PullRequest};

/// Which pull requests `bb pr list` shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ListRole {
    /// Pull requests of the current repository
    #[default]
    Current,
    /// Pull requests you authored
    Author,
    /// Pull requests you are reviewing
    Reviewer,
}

impl ListRole {
    /// Inbox role parameter, `None` for the repository listing
    pub fn inbox_role(self) -> Option<&'static str> {
        match self {
            ListRole::Current => None,
            ListRole::Author => Some("AUTHOR"),
            ListRole::Reviewer => Some("REVIEWER"),
        }
    }
}

/// Status line: `from -> to | outcome | review statuses`
pub fn status_line(pr: &PullRequest) -> String {
    let reviews: Vec<String> = pr
        .review_summary()
        .iter()
        .map(|s| Output::status(s))
        .collect();
    format!(
        "{} -> {} | {} | {}",
        pr.from_branch(),
        pr.to_branch(),
        Output::status(pr.merge_outcome()),
        reviews.join(" & ")
    )
}

fn entry(pr: &PullRequest) -> TreeEntry {
    let url = pr.url();
    TreeEntry {
        label: format!("#{}", pr.id),
        fields: vec![
            ("Status".to_string(), status_line(pr)),
            ("Title".to_string(), pr.title.clone()),
            (
                "Description".to_string(),
                pr.description_or_dash().replace('\n', " "),
            ),
            ("Author".to_string(), pr.author.user.describe()),
            ("Url".to_string(), Output::link(url, url)),
        ],
    }
}

/// Group pull requests by repository slug, then state.
pub fn group_pull_requests(
    prs: &[PullRequest],
) -> BTreeMap<String, BTreeMap<PrState, Vec<&PullRequest>>> {
    let mut grouped: BTreeMap<String, BTreeMap<PrState, Vec<&PullRequest>>> = BTreeMap::new();
    for pr in prs {
        let repo = pr.repository_slug().unwrap_or("-").to_string();
        grouped
            .entry(repo)
            .or_default()
            .entry(pr.state)
            .or_default()
            .push(pr);
    }
    grouped
}

/// One tree per repository; only `current` unless `all` is set.
pub fn build_trees(prs: &[PullRequest], current: &str, all: bool) -> Vec<Tree> {
    group_pull_requests(prs)
        .into_iter()
        .filter(|(repo, _)| all || repo.eq_ignore_ascii_case(current))
        .map(|(repo, states)| {
            let mut tree = Tree::new(&repo);
            for (state, prs) in states {
                for pr in prs {
                    tree.push(&state.to_string(), entry(pr));
                }
            }
            tree
        })
        .collect()
}

/// Run the PR list command
pub async fn run_pr_list(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    role: ListRole,
    all: bool,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let session = RepoSession::open(&api, prompter, &ctx.cwd)?;

    let spinner = Output::spinner(&format!(
        "Fetching pull requests ({:?}) ...",
        role
    ));
    let prs = match role.inbox_role() {
        Some(inbox_role) => session.api.inbox_pull_requests(inbox_role).await?,
        None => session.api.repository_pull_requests(&session.repo).await?,
    };
    Output::spinner_done(&spinner, "DONE");

    let trees = build_trees(&prs, &session.repo.repository, all);
    if trees.is_empty() {
        Output::info("There are no open pull requests");
        return Ok(());
    }
    for tree in trees {
        tree.print();
    }
    Ok(())
}
