//! Git operations wrapper
//!
//! Every repository query shells out to the `git` binary; its exit status
//! is authoritative and failures carry the command line and stderr.

pub mod branch;
pub mod commit;
pub mod remote;

pub use branch::*;
pub use commit::*;
pub use remote::*;

use crate::util::{display_cmd, run_cmd};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found on PATH")]
    GitNotFound,

    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("No git remote configured in {0}")]
    NoRemote(String),

    #[error("Could not parse project/repository from remote '{0}'")]
    UnrecognizedRemote(String),

    #[error("'{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that a `git` binary is reachable.
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Handle to a local working tree
#[derive(Debug, Clone)]
pub struct GitRepo {
    workdir: PathBuf,
}

impl GitRepo {
    /// Open the working tree containing `path`.
    ///
    /// Fails with [`GitError::NotARepo`] unless
    /// `git rev-parse --is-inside-work-tree` prints `true`.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        if !git_available() {
            return Err(GitError::GitNotFound);
        }
        let repo = Self {
            workdir: path.as_ref().to_path_buf(),
        };
        match repo.run(&["rev-parse", "--is-inside-work-tree"]) {
            Ok(out) if out == "true" => Ok(repo),
            _ => Err(GitError::NotARepo(path.as_ref().display().to_string())),
        }
    }

    /// Working directory commands run in
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.workdir);
        cmd
    }

    /// Run git and return trimmed stdout, or the command and stderr on failure.
    pub(crate) fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let mut cmd = self.command(args);
        let output = run_cmd(&mut cmd)?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: display_cmd(&cmd),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Get the current branch name
pub fn get_current_branch(repo: &GitRepo) -> Result<String, GitError> {
    repo.run(&["rev-parse", "--abbrev-ref", "HEAD"])
}

/// Clone `url` into `dest`.
pub fn clone_repo<P: AsRef<Path>>(url: &str, dest: P) -> Result<(), GitError> {
    let dest = dest.as_ref();
    if dest.exists() {
        return Err(GitError::OperationFailed(format!(
            "destination '{}' already exists",
            dest.display()
        )));
    }

    let mut cmd = Command::new("git");
    cmd.arg("clone").arg(url).arg(dest);
    let output = run_cmd(&mut cmd)?;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command: display_cmd(&cmd),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
