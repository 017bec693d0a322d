//! Git remote operations

use super::{checkout_branch, GitError, GitRepo};
use crate::core::repo::{first_remote_url, parse_remote_url, RepoIdentity};

/// Default remote name used for pulls and pushes
pub const ORIGIN: &str = "origin";

/// URL of the first remote listed by `git remote -v`.
pub fn first_remote(repo: &GitRepo) -> Result<String, GitError> {
    let listing = repo.run(&["remote", "-v"])?;
    first_remote_url(&listing)
        .map(str::to_string)
        .ok_or_else(|| GitError::NoRemote(repo.workdir().display().to_string()))
}

/// Project and repository derived from the first remote.
pub fn repo_identity(repo: &GitRepo) -> Result<RepoIdentity, GitError> {
    let url = first_remote(repo)?;
    parse_remote_url(&url).ok_or(GitError::UnrecognizedRemote(url))
}

/// `git pull` on the current branch
pub fn pull(repo: &GitRepo) -> Result<(), GitError> {
    repo.run(&["pull"])?;
    Ok(())
}

/// Checkout `branch` and pull it.
pub fn checkout_and_pull(repo: &GitRepo, branch: &str) -> Result<(), GitError> {
    checkout_branch(repo, branch)?;
    pull(repo)
}

/// Rebase the current branch onto `origin/<target>` and force-push with lease.
pub fn rebase_onto_remote(repo: &GitRepo, target: &str) -> Result<(), GitError> {
    repo.run(&["pull", "--rebase", ORIGIN, target])?;
    repo.run(&["push", "--force-with-lease"])?;
    Ok(())
}

/// Diff between two remote-tracking branches (`origin/to...origin/from`).
pub fn diff_remote_branches(
    repo: &GitRepo,
    from_branch: &str,
    to_branch: &str,
) -> Result<String, GitError> {
    let range = format!("{ORIGIN}/{to_branch}...{ORIGIN}/{from_branch}");
    repo.run(&["diff", "--color=always", &range])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::get_current_branch;
    use std::path::Path;
    use std::process::Command;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .current_dir(dir)
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Bare remote plus a clone with one commit on main pushed.
    fn setup_remote_and_clone() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let remote = temp.path().join("remote.git");
        std::fs::create_dir_all(&remote).unwrap();
        git(&remote, &["init", "--bare", "-b", "main"]);

        let work = temp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        git(&work, &["init", "-b", "main"]);
        git(&work, &["config", "user.email", "test@example.com"]);
        git(&work, &["config", "user.name", "Test User"]);
        git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);
        std::fs::write(work.join("README.md"), "# test\n").unwrap();
        git(&work, &["add", "README.md"]);
        git(&work, &["commit", "-m", "Initial commit"]);
        git(&work, &["push", "-u", "origin", "main"]);

        let repo = GitRepo::discover(&work).unwrap();
        (temp, repo)
    }

    #[test]
    fn test_repo_identity_from_remote() {
        let temp = TempDir::new().unwrap();
        git(temp.path(), &["init", "-b", "main"]);
        git(
            temp.path(),
            &["remote", "add", "origin", "https://bb.example.com/scm/plat/api.git"],
        );
        let repo = GitRepo::discover(temp.path()).unwrap();
        assert_eq!(
            repo_identity(&repo).unwrap(),
            RepoIdentity::new("plat", "api")
        );
    }

    #[test]
    fn test_repo_identity_without_remote() {
        let temp = TempDir::new().unwrap();
        git(temp.path(), &["init", "-b", "main"]);
        let repo = GitRepo::discover(temp.path()).unwrap();
        assert!(matches!(
            repo_identity(&repo).unwrap_err(),
            GitError::NoRemote(_)
        ));
    }

    #[test]
    fn test_checkout_and_pull() {
        let (_temp, repo) = setup_remote_and_clone();
        git(repo.workdir(), &["checkout", "-b", "feature/x"]);
        checkout_and_pull(&repo, "main").unwrap();
        assert_eq!(get_current_branch(&repo).unwrap(), "main");
    }

    #[test]
    fn test_diff_remote_branches() {
        let (_temp, repo) = setup_remote_and_clone();
        let work = repo.workdir().to_path_buf();
        git(&work, &["checkout", "-b", "feature/x"]);
        std::fs::write(work.join("new.txt"), "hello\n").unwrap();
        git(&work, &["add", "new.txt"]);
        git(&work, &["commit", "-m", "Add new file"]);
        git(&work, &["push", "origin", "feature/x"]);

        let diff = diff_remote_branches(&repo, "feature/x", "main").unwrap();
        assert!(diff.contains("new.txt"));
    }

    #[test]
    fn test_rebase_onto_remote() {
        let (_temp, repo) = setup_remote_and_clone();
        let work = repo.workdir().to_path_buf();
        git(&work, &["checkout", "-b", "feature/x"]);
        std::fs::write(work.join("x.txt"), "x\n").unwrap();
        git(&work, &["add", "x.txt"]);
        git(&work, &["commit", "-m", "Add x"]);
        git(&work, &["push", "-u", "origin", "feature/x"]);

        rebase_onto_remote(&repo, "main").unwrap();
        assert_eq!(get_current_branch(&repo).unwrap(), "feature/x");
    }
}
