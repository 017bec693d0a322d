//! Context passed to command handlers
//!
//! Bundles global CLI flags and the pieces every command needs (credential
//! store, API adapter, local repository) so handlers take one argument
//! instead of threading flags through each call.

use std::path::PathBuf;

use crate::cli::precondition::PreconditionError;
use crate::cli::prompt::Prompter;
use crate::core::{CredentialStore, Credentials, RepoIdentity};
use crate::git::{get_current_branch, remote::repo_identity, GitError, GitRepo};
use crate::platform::{BitbucketApi, BitbucketServer};

/// Global state available to all command handlers.
///
/// Created once in `main()` from the parsed flags.
pub struct AppContext {
    /// Show verbose output (`--verbose`)
    pub verbose: bool,
    /// Credential file override (`--config` / `BB_CONFIG`)
    pub config_path: Option<PathBuf>,
    /// Directory the command was started in
    pub cwd: PathBuf,
}

impl AppContext {
    pub fn new(verbose: bool, config_path: Option<PathBuf>, cwd: PathBuf) -> Self {
        Self {
            verbose,
            config_path,
            cwd,
        }
    }

    /// Credential store at the configured or default location
    pub fn store(&self) -> anyhow::Result<CredentialStore> {
        Ok(CredentialStore::locate(self.config_path.clone())?)
    }

    /// Load credentials, failing with a setup hint when absent
    pub fn credentials(&self) -> anyhow::Result<Credentials> {
        Ok(self.store()?.load()?)
    }

    /// API adapter for the configured host
    pub fn api(&self) -> anyhow::Result<BitbucketServer> {
        Ok(BitbucketServer::new(&self.credentials()?)?)
    }
}

/// A command running inside a local clone of a Bitbucket repository
pub struct RepoSession<'a> {
    pub api: &'a dyn BitbucketApi,
    pub git: GitRepo,
    pub repo: RepoIdentity,
    pub prompter: &'a dyn Prompter,
}

impl<'a> RepoSession<'a> {
    /// Open the repository containing `cwd` and resolve its identity from
    /// the first remote.
    pub fn open(
        api: &'a dyn BitbucketApi,
        prompter: &'a dyn Prompter,
        cwd: &std::path::Path,
    ) -> anyhow::Result<Self> {
        let git = GitRepo::discover(cwd).map_err(|e| match e {
            GitError::NotARepo(path) => PreconditionError::NotARepo(path).into(),
            other => anyhow::Error::from(other),
        })?;
        let repo = repo_identity(&git)?;
        Ok(Self {
            api,
            git,
            repo,
            prompter,
        })
    }

    pub fn current_branch(&self) -> anyhow::Result<String> {
        Ok(get_current_branch(&self.git)?)
    }
}
