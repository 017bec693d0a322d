//! PR create command implementation

use colored::Colorize;
use tracing::debug;

use super::copy::copy_and_report;
use super::diff::show_diff;
use crate::cli::context::{AppContext, RepoSession};
use crate::cli::output::{Output, Table};
use crate::cli::precondition::{require_input, PreconditionError};
use crate::cli::prompt::Prompter;
use crate::git::{rebase_onto_remote, title_and_description};
use crate::platform::{CreateOutcome, NewPullRequest, NewRef, PrState, PullRequest, ReviewerRef};

/// Flags accepted by `bb pr create`
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub target: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub yes: bool,
    pub diff: bool,
    pub rebase: bool,
}

/// What the server did with the new pull request
#[derive(Debug)]
pub enum CreateReport {
    /// The user declined the summary; nothing was sent
    Aborted,
    Created(PullRequest),
    /// A pull request between the same branches is already open
    AlreadyExists {
        message: String,
        id: Option<u64>,
        url: Option<String>,
    },
}

impl CreateReport {
    /// Id of the pull request the user ends up with, if any
    pub fn pull_request_id(&self) -> Option<u64> {
        match self {
            CreateReport::Aborted => None,
            CreateReport::Created(pr) => Some(pr.id),
            CreateReport::AlreadyExists { id, .. } => *id,
        }
    }
}

/// Resolve the title/description pair from flags, the latest commit, and prompts.
fn resolve_text(
    session: &RepoSession<'_>,
    options: &CreateOptions,
) -> anyhow::Result<(String, String)> {
    if let (Some(title), Some(description)) = (&options.title, &options.description) {
        return Ok((title.clone(), description.clone()));
    }

    let (commit_title, commit_body) = title_and_description(&session.git)?;
    let title = match &options.title {
        Some(t) => t.clone(),
        None if options.yes => commit_title,
        None => session.prompter.input("Title", Some(&commit_title))?,
    };
    let description = match &options.description {
        Some(d) => d.clone(),
        None if options.yes => commit_body,
        None => session.prompter.input("Description", Some(&commit_body))?,
    };
    Ok((title, description))
}

/// Open a pull request from the current branch into the target.
pub async fn create_pull_request(
    session: &RepoSession<'_>,
    options: &CreateOptions,
) -> anyhow::Result<CreateReport> {
    let target = require_input(options.target.as_deref(), "Target branch", session.prompter)?;
    let from_branch = session.current_branch()?;
    if target == from_branch {
        return Err(PreconditionError::SameBranch(target).into());
    }

    if options.rebase {
        let spinner = Output::spinner(&format!("Rebasing {} with {} ...", from_branch, target));
        rebase_onto_remote(&session.git, &target)?;
        Output::spinner_done(&spinner, "REBASED");
    }

    let (title, description) = resolve_text(session, options)?;
    let title = require_input(Some(title.as_str()), "Title", session.prompter)?;
    let repo = &session.repo;

    let spinner = Output::spinner(&format!("Gathering facts on '{}' ...", repo.repository));
    let repo_id = session
        .api
        .project_repositories(&repo.project)
        .await?
        .into_iter()
        .find(|r| r.slug == repo.repository || r.name == repo.repository)
        .and_then(|r| r.id);
    let reviewers: Vec<ReviewerRef> = match repo_id {
        Some(repo_id) => session
            .api
            .default_reviewers(repo, repo_id, &from_branch, &target)
            .await?
            .iter()
            .map(|user| ReviewerRef::new(&user.name))
            .collect(),
        None => {
            debug!(repo = %repo, "repository id not found, skipping default reviewers");
            Vec::new()
        }
    };
    spinner.finish_and_clear();

    let repo_id_text = repo_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    Table::summary(&[
        ("Project", repo.project.as_str()),
        ("Repository", repo.repository.as_str()),
        ("Repository ID", repo_id_text.as_str()),
        ("From Branch", from_branch.as_str()),
        ("To Branch", target.as_str()),
        ("Title", title.as_str()),
        ("Description", description.as_str()),
    ])
    .print();
    if !reviewers.is_empty() {
        let names: Vec<&str> = reviewers.iter().map(|r| r.user.name.as_str()).collect();
        Output::kv("Reviewers", &names.join(", "));
    }

    if !options.yes && !session.prompter.confirm("Proceed", false)? {
        return Ok(CreateReport::Aborted);
    }

    let request = NewPullRequest {
        title,
        description,
        state: PrState::Open,
        open: true,
        closed: false,
        locked: false,
        from_ref: NewRef::branch(&from_branch, &repo.project, &repo.repository),
        to_ref: NewRef::branch(&target, &repo.project, &repo.repository),
        reviewers,
    };

    let spinner = Output::spinner("Creating pull request ...");
    let outcome = session.api.create_pull_request(repo, &request).await?;
    spinner.finish_and_clear();

    Ok(match outcome {
        CreateOutcome::Created(pr) => CreateReport::Created(pr),
        CreateOutcome::AlreadyExists {
            message,
            existing_id,
            existing_url,
        } => CreateReport::AlreadyExists {
            message,
            id: existing_id,
            url: existing_url,
        },
    })
}

/// Run the PR create command
pub async fn run_pr_create(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    options: CreateOptions,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let session = RepoSession::open(&api, prompter, &ctx.cwd)?;

    let report = create_pull_request(&session, &options).await?;
    match &report {
        CreateReport::Aborted => {
            Output::info("Pull request not created");
            return Ok(());
        }
        CreateReport::Created(pr) => {
            println!(
                "{}",
                format!("Pull Request Created: {}", pr.url()).green().bold()
            );
            copy_and_report(pr.url());
        }
        CreateReport::AlreadyExists { message, url, .. } => {
            println!("{}", format!("Message: {}", message).red().bold());
            if let Some(url) = url {
                println!("{}", format!("Existing Pull Request: {}", url).yellow().bold());
                copy_and_report(url);
            }
        }
    }

    if let Some(id) = report.pull_request_id() {
        let show = options.diff
            || (!options.yes
                && prompter.confirm(&format!("Review diff in PR #{}?", id), false)?);
        if show {
            show_diff(&session, id).await?;
        }
    }
    Ok(())
}
