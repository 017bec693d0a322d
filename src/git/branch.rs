//! Git branch operations

use super::{get_current_branch, GitError, GitRepo};

/// Checkout an existing branch
pub fn checkout_branch(repo: &GitRepo, branch_name: &str) -> Result<(), GitError> {
    repo.run(&["checkout", branch_name]).map_err(|e| match e {
        GitError::CommandFailed { stderr, .. } if stderr.contains("would be overwritten") => {
            GitError::OperationFailed(format!(
                "Cannot checkout '{}': local changes would be overwritten. \
                 Commit or stash them first.",
                branch_name
            ))
        }
        other => other,
    })?;
    Ok(())
}

/// Check if a local branch exists
pub fn branch_exists(repo: &GitRepo, branch_name: &str) -> bool {
    repo.run(&[
        "rev-parse",
        "--verify",
        "--quiet",
        &format!("refs/heads/{}", branch_name),
    ])
    .is_ok()
}

/// Delete a local branch.
///
/// Refuses, without touching the branch, when `branch_name` is checked out.
pub fn delete_local_branch(
    repo: &GitRepo,
    branch_name: &str,
    force: bool,
) -> Result<(), GitError> {
    let current = get_current_branch(repo)?;
    if current == branch_name {
        return Err(GitError::OperationFailed(format!(
            "Cannot delete the currently checked out branch '{}'",
            branch_name
        )));
    }

    let flag = if force { "-D" } else { "-d" };
    repo.run(&["branch", flag, branch_name]).map_err(|e| match e {
        GitError::CommandFailed { stderr, .. } if stderr.contains("not fully merged") => {
            GitError::OperationFailed(format!(
                "Branch '{}' is not fully merged. Use force to delete anyway.",
                branch_name
            ))
        }
        other => other,
    })?;
    Ok(())
}
