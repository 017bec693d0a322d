//! Commit message helpers

use super::{GitError, GitRepo};

/// Full message of the latest commit on HEAD.
pub fn last_commit_message(repo: &GitRepo) -> Result<String, GitError> {
    repo.run(&["log", "--format=%B", "-n", "1"])
}

/// Split a raw commit message into title and body.
///
/// The title is the first line; the body is everything after the blank
/// separator lines that follow it, with trailing whitespace removed.
pub fn split_commit_message(raw: &str) -> (String, String) {
    let mut lines = raw.lines();
    let title = lines.next().unwrap_or_default().trim().to_string();
    let body: Vec<&str> = lines.skip_while(|l| l.trim().is_empty()).collect();
    (title, body.join("\n").trim_end().to_string())
}

/// Title and body of the latest commit.
pub fn title_and_description(repo: &GitRepo) -> Result<(String, String), GitError> {
    Ok(split_commit_message(&last_commit_message(repo)?))
}
