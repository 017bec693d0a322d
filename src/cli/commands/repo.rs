//! Repo command implementation
//!
//! Creates, deletes, archives and clones Bitbucket repositories.

use colored::Colorize;

use crate::cli::context::AppContext;
use crate::cli::output::Output;
use crate::cli::precondition::{require_input, PreconditionError};
use crate::cli::prompt::Prompter;
use crate::core::RepoIdentity;
use crate::git::clone_repo;
use crate::platform::{BitbucketApi, NewRepository, RepoCreateOutcome};

/// Project and repository from flags or prompts
pub fn resolve_identity(
    project: Option<&str>,
    repo: Option<&str>,
    prompter: &dyn Prompter,
) -> anyhow::Result<RepoIdentity> {
    let project = require_input(project, "Project", prompter)?;
    let repo = require_input(repo, "Repository", prompter)?;
    Ok(RepoIdentity::new(project, repo))
}

/// Run the repo clone command
pub fn run_repo_clone(ctx: &AppContext, name: &str) -> anyhow::Result<()> {
    let identity =
        RepoIdentity::parse_slug(name).ok_or_else(|| PreconditionError::InvalidInput {
            what: "project/repository".to_string(),
            value: name.to_string(),
        })?;
    let credentials = ctx.credentials()?;
    let dest = ctx.cwd.join(&identity.repository);

    println!("Cloning '{}' into '{}'...", identity, identity.repository);
    clone_repo(&identity.clone_url(&credentials.host), &dest)?;
    Output::success(&format!("Cloned {}", Output::repo_name(&identity.to_string())));
    Ok(())
}

/// Create a repository; a 409 is reported, not returned as an error.
pub async fn create_repository(
    api: &dyn BitbucketApi,
    identity: &RepoIdentity,
    forkable: bool,
    default_branch: &str,
) -> anyhow::Result<RepoCreateOutcome> {
    let request = NewRepository::git(
        &identity.project,
        &identity.repository,
        forkable,
        default_branch,
    );
    let spinner = Output::spinner(&format!("Creating '{}' repository ...", identity));
    let outcome = api.create_repository(&request).await?;
    match &outcome {
        RepoCreateOutcome::Created => Output::spinner_done(&spinner, "DONE"),
        RepoCreateOutcome::Conflict { message } => {
            spinner.finish_with_message(format!(
                "{} {}",
                spinner.message(),
                "CONFLICT".yellow().bold()
            ));
            println!("{}", format!("Message: {}", message).yellow().bold());
        }
    }
    Ok(outcome)
}

/// Run the repo create command
pub async fn run_repo_create(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    project: Option<&str>,
    repo: Option<&str>,
    forkable: bool,
    default_branch: &str,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let identity = resolve_identity(project, repo, prompter)?;
    create_repository(&api, &identity, forkable, default_branch).await?;
    Ok(())
}

/// Delete a repository after the user types its `project/repo` name and
/// confirms a second time.
pub async fn delete_repository(
    api: &dyn BitbucketApi,
    prompter: &dyn Prompter,
    identity: &RepoIdentity,
) -> anyhow::Result<()> {
    println!(
        "{}",
        "Note: Deleting this repository cannot be undone.".yellow().bold()
    );
    println!(
        "{}",
        "If you don't have a backup, you'll permanently lose its contents and pull requests."
            .red()
    );
    println!(
        "{}",
        "If you prefer, archive this repository instead via 'bb repo archive'".yellow()
    );

    let expected = identity.to_string();
    let typed = prompter.input(
        &format!("To go ahead and delete this repository, type '{}'", expected),
        None,
    )?;
    if typed.trim() != expected {
        return Err(PreconditionError::Declined(format!(
            "'{}' does not match '{}'",
            typed.trim(),
            expected
        ))
        .into());
    }
    if !prompter.confirm("This action can't be undone, Proceed ?", false)? {
        return Err(
            PreconditionError::Declined(format!("repository '{}' kept", expected)).into(),
        );
    }

    let spinner = Output::spinner(&format!("Deleting repository '{}' ...", expected));
    api.delete_repository(identity).await?;
    Output::spinner_done(&spinner, "DONE");
    Ok(())
}

/// Run the repo delete command
pub async fn run_repo_delete(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    project: Option<&str>,
    repo: Option<&str>,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let identity = resolve_identity(project, repo, prompter)?;
    delete_repository(&api, prompter, &identity).await
}

/// Archive or unarchive a repository after confirmation.
pub async fn set_archived(
    api: &dyn BitbucketApi,
    prompter: &dyn Prompter,
    identity: &RepoIdentity,
    archived: bool,
) -> anyhow::Result<()> {
    let verb = if archived { "archive" } else { "unarchive" };
    if !prompter.confirm(&format!("Proceed to {} '{}'?", verb, identity), false)? {
        return Err(PreconditionError::Declined(format!("{} of '{}'", verb, identity)).into());
    }

    let spinner = Output::spinner(&format!(
        "{} repository '{}' ...",
        if archived { "Archiving" } else { "Unarchiving" },
        identity
    ));
    api.set_archived(identity, archived).await?;
    Output::spinner_done(&spinner, "DONE");
    Ok(())
}

/// Run the repo archive/unarchive command
pub async fn run_repo_archive(
    ctx: &AppContext,
    prompter: &dyn Prompter,
    project: Option<&str>,
    repo: Option<&str>,
    archived: bool,
) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let identity = resolve_identity(project, repo, prompter)?;
    set_archived(&api, prompter, &identity, archived).await
}
