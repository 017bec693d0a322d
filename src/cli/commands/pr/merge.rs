//! PR merge command implementation
//!
//! Merging is a linear sequence of server calls with confirmation gates:
//! delete check, merge validation, pull request info and auto-merge path,
//! optional rebase, merge, and optional source branch cleanup. Nothing
//! mutating is sent until every check has passed and the user has agreed.

use colored::Colorize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cli::context::{AppContext, RepoSession};
use crate::cli::output::Output;
use crate::cli::precondition::require_id;
use crate::cli::prompt::Prompter;
use crate::git::{branch_exists, checkout_and_pull, delete_local_branch};
use crate::platform::{AutoMergePath, MergeOutcome, MergeRequest, MergeValidation, PullRequest};

/// Failures that stop a merge before anything is changed
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Source branch deletion validation failed: {}", .0.join("; "))]
    DeleteBlocked(Vec<String>),

    #[error("Merge validation failed for pull request #{id}")]
    ValidationFailed { id: u64, validation: MergeValidation },

    #[error("Unknown merge state '{0}'")]
    UnknownMergeState(String),
}

/// Flags accepted by `bb pr merge`
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub id: Option<u64>,
    pub delete_source_branch: bool,
    pub rebase: bool,
    pub yes: bool,
}

/// Where a merge of `from` into `to` ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergePlan {
    /// Merge into the target only
    Direct,
    /// Merge into the target, then propagate through these branches
    Chain(Vec<String>),
}

impl MergePlan {
    pub fn describe(&self, from_branch: &str, to_branch: &str) -> String {
        match self {
            MergePlan::Direct => format!("'{}' will merge to '{}'", from_branch, to_branch),
            MergePlan::Chain(branches) => format!(
                "'{}' will merge to '{}'",
                from_branch,
                branches.join("' and '")
            ),
        }
    }
}

/// Interpret the server's auto-merge path for the target branch.
pub fn merge_plan(path: &AutoMergePath) -> Result<MergePlan, MergeError> {
    let status = &path.status;
    match (status.id.as_str(), status.available) {
        ("AUTO_MERGE_DISABLED" | "NO_PATH", false) => Ok(MergePlan::Direct),
        ("PROCEED", true) => Ok(MergePlan::Chain(
            path.path.iter().map(|r| r.display_id.clone()).collect(),
        )),
        (id, available) => Err(MergeError::UnknownMergeState(format!(
            "{} (available: {})",
            id, available
        ))),
    }
}

/// Commit message sent with the merge request
pub fn merge_message(session: &RepoSession<'_>, pr: &PullRequest) -> String {
    format!(
        "Merge pull request #{} in {} from {} to {}",
        pr.id,
        session.repo,
        pr.from_branch(),
        pr.to_branch()
    )
}

/// What happened to the pull request
#[derive(Debug)]
pub enum MergeReport {
    /// The user declined to proceed; nothing was sent
    Aborted,
    /// The server refused the merge with a 409
    Conflict { message: String },
    Merged {
        pull_request: PullRequest,
        /// Source branch removed on the server
        source_deleted: bool,
        /// Local checkout/branch deletion problem, reported but not fatal
        local_cleanup_error: Option<String>,
    },
}

async fn check_source_deletable(session: &RepoSession<'_>, id: u64) -> anyhow::Result<()> {
    let blockers = session
        .api
        .source_branch_delete_blockers(&session.repo, id)
        .await?;
    if !blockers.is_empty() {
        return Err(MergeError::DeleteBlocked(blockers).into());
    }
    Ok(())
}

fn confirm_optional(
    prompter: &dyn Prompter,
    flag: bool,
    yes: bool,
    question: &str,
) -> anyhow::Result<bool> {
    if flag {
        return Ok(true);
    }
    if yes {
        return Ok(false);
    }
    prompter.confirm(question, false)
}

/// Run the merge workflow for one pull request.
pub async fn merge_pull_request(
    session: &RepoSession<'_>,
    options: &MergeOptions,
) -> anyhow::Result<MergeReport> {
    let id = require_id(options.id, session.prompter)?;
    let repo = &session.repo;

    if options.delete_source_branch {
        check_source_deletable(session, id).await?;
    }

    let spinner = Output::spinner(&format!("Validating merge for '{}' ...", id));
    let validation = session.api.validate_merge(repo, id).await?;
    if !validation.is_mergeable() {
        Output::spinner_failed(&spinner, "FAILED");
        return Err(MergeError::ValidationFailed { id, validation }.into());
    }
    Output::spinner_done(&spinner, "OK");

    let spinner = Output::spinner(&format!(
        "Checking for '{}' auto-merge conditions ...",
        repo.repository
    ));
    let pr = session.api.pull_request(repo, id).await?;
    let path = session.api.automerge_path(repo, pr.to_branch()).await?;
    spinner.finish_and_clear();

    let plan = merge_plan(&path)?;
    println!(
        "{}",
        format!("> {}", plan.describe(pr.from_branch(), pr.to_branch()))
            .cyan()
            .bold()
    );

    let prompter = session.prompter;
    let rebase = confirm_optional(
        prompter,
        options.rebase,
        options.yes,
        &format!(
            "Do you want rebase '{}' branch from '{}'",
            pr.from_branch(),
            pr.to_branch()
        ),
    )?;

    if !options.yes && !prompter.confirm("Proceed with merge", false)? {
        debug!(id, "merge declined");
        return Ok(MergeReport::Aborted);
    }

    // `--yes` skips rebase and proceed only; deletion needs the flag or an answer.
    let delete_source = confirm_optional(
        prompter,
        options.delete_source_branch,
        false,
        &format!("Do you want to delete source '{}' branch", pr.from_branch()),
    )?;
    if delete_source && !options.delete_source_branch {
        check_source_deletable(session, id).await?;
    }

    let spinner = Output::spinner(&format!(
        "{}Merging '{}' ...",
        if rebase { "Rebasing and " } else { "" },
        pr.url()
    ));

    let mut version = pr.version;
    if rebase {
        session.api.rebase(repo, id, version).await?;
        // Rebasing bumps the version; merge with the one the server now holds.
        version = session.api.pull_request(repo, id).await?.version;
    }

    let request = MergeRequest {
        auto_subject: false,
        message: merge_message(session, &pr),
    };
    let merged = match session.api.merge(repo, id, version, &request).await? {
        MergeOutcome::Merged(merged) => {
            Output::spinner_done(&spinner, "MERGED");
            merged
        }
        MergeOutcome::Conflict { message } => {
            Output::spinner_failed(&spinner, "FAILED");
            return Ok(MergeReport::Conflict { message });
        }
    };

    if !delete_source {
        return Ok(MergeReport::Merged {
            pull_request: merged,
            source_deleted: false,
            local_cleanup_error: None,
        });
    }

    let spinner = Output::spinner(&format!("Deleting source ref '{}' ...", pr.from_branch()));
    session.api.cleanup(repo, id).await?;
    session.api.delete_branch(repo, pr.from_branch()).await?;
    Output::spinner_done(&spinner, "DONE");

    let local_cleanup_error = cleanup_local(session, pr.from_branch(), pr.to_branch()).err();
    if let Some(err) = &local_cleanup_error {
        warn!(error = %err, "local cleanup failed");
    }

    Ok(MergeReport::Merged {
        pull_request: merged,
        source_deleted: true,
        local_cleanup_error: local_cleanup_error.map(|e| e.to_string()),
    })
}

/// Switch to the target, pull it, and drop the local source branch.
fn cleanup_local(
    session: &RepoSession<'_>,
    from_branch: &str,
    to_branch: &str,
) -> anyhow::Result<()> {
    checkout_and_pull(&session.git, to_branch)?;
    if branch_exists(&session.git, from_branch) {
        delete_local_branch(&session.git, from_branch, true)?;
    }
    Ok(())
}

/// Run the PR merge command
pub async fn run_pr_merge(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    options: MergeOptions,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let session = RepoSession::open(&api, prompter, &ctx.cwd)?;

    let report = match merge_pull_request(&session, &options).await {
        Err(err) => {
            if let Some(MergeError::ValidationFailed { validation, .. }) = err.downcast_ref::<MergeError>() {
                print_validation(validation);
            }
            return Err(err);
        }
        Ok(report) => report,
    };

    match report {
        MergeReport::Aborted => Output::info("Merge aborted"),
        MergeReport::Conflict { message } => Output::error(&message),
        MergeReport::Merged {
            pull_request,
            source_deleted,
            local_cleanup_error,
        } => {
            Output::success(&format!(
                "Merged pull request #{} into {}",
                pull_request.id,
                Output::branch_name(pull_request.to_branch())
            ));
            if source_deleted {
                Output::success(&format!(
                    "Deleted source branch {}",
                    Output::branch_name(pull_request.from_branch())
                ));
            }
            if let Some(err) = local_cleanup_error {
                Output::warning(&format!("Local cleanup skipped: {}", err));
            }
        }
    }

    Ok(())
}

fn print_validation(validation: &MergeValidation) {
    match serde_json::to_string_pretty(validation) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{:?}", validation),
    }
}
