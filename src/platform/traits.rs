//! Bitbucket API trait definition

use async_trait::async_trait;
use thiserror::Error;

use super::types::*;
use crate::core::RepoIdentity;

fn server_message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

/// Errors that can occur while talking to the server
#[derive(Error, Debug)]
pub enum ApiError {
    /// Response status outside the accepted set for the verb
    #[error("[{status}] {reason}{}", server_message_suffix(.message))]
    Status {
        status: u16,
        reason: String,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not build HTTP client: {0}")]
    Client(String),

    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl ApiError {
    /// Turn an accepted-but-unwanted status (e.g. a 409 on rebase) into an error.
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        ApiError::Status {
            status,
            reason: super::client::reason_phrase(status),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result of creating a pull request
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created(PullRequest),
    /// 409: a pull request between the same branches is already open
    AlreadyExists {
        message: String,
        existing_id: Option<u64>,
        existing_url: Option<String>,
    },
}

/// Result of the merge call
#[derive(Debug, Clone)]
pub enum MergeOutcome {
    Merged(PullRequest),
    /// 409: the server refused the merge
    Conflict { message: String },
}

/// Result of creating a repository
#[derive(Debug, Clone)]
pub enum RepoCreateOutcome {
    Created,
    /// 409: the repository already exists
    Conflict { message: String },
}

/// Operations bbcli performs against a Bitbucket Server
#[async_trait]
pub trait BitbucketApi: Send + Sync {
    /// Number of pull requests in the user's inbox (health check)
    async fn inbox_count(&self) -> Result<u64, ApiError>;

    /// All repositories of a project
    async fn project_repositories(&self, project: &str) -> Result<Vec<Repository>, ApiError>;

    /// Default reviewers for a source/target branch pair
    async fn default_reviewers(
        &self,
        repo: &RepoIdentity,
        repo_id: u64,
        from_branch: &str,
        to_branch: &str,
    ) -> Result<Vec<User>, ApiError>;

    /// Create a pull request
    async fn create_pull_request(
        &self,
        repo: &RepoIdentity,
        request: &NewPullRequest,
    ) -> Result<CreateOutcome, ApiError>;

    /// Get pull request details
    async fn pull_request(&self, repo: &RepoIdentity, id: u64) -> Result<PullRequest, ApiError>;

    /// Delete a pull request at the given version
    async fn delete_pull_request(
        &self,
        repo: &RepoIdentity,
        id: u64,
        version: u64,
    ) -> Result<(), ApiError>;

    /// Files changed by a pull request
    async fn pull_request_changes(&self, repo: &RepoIdentity, id: u64)
        -> Result<Changes, ApiError>;

    /// Pull requests in the inbox for a role (`AUTHOR` or `REVIEWER`)
    async fn inbox_pull_requests(&self, role: &str) -> Result<Vec<PullRequest>, ApiError>;

    /// Pull requests of one repository
    async fn repository_pull_requests(
        &self,
        repo: &RepoIdentity,
    ) -> Result<Vec<PullRequest>, ApiError>;

    /// Username of the authenticated user
    async fn whoami(&self) -> Result<String, ApiError>;

    /// Set the calling user's review status on a pull request
    async fn set_review_status(
        &self,
        repo: &RepoIdentity,
        id: u64,
        user: &str,
        status: ReviewStatus,
    ) -> Result<(), ApiError>;

    /// Conditions blocking deletion of the source branch; empty when deletion is allowed
    async fn source_branch_delete_blockers(
        &self,
        repo: &RepoIdentity,
        id: u64,
    ) -> Result<Vec<String>, ApiError>;

    /// Check whether the pull request can be merged
    async fn validate_merge(&self, repo: &RepoIdentity, id: u64)
        -> Result<MergeValidation, ApiError>;

    /// Automatic merge chain starting at the target branch
    async fn automerge_path(
        &self,
        repo: &RepoIdentity,
        target_branch: &str,
    ) -> Result<AutoMergePath, ApiError>;

    /// Rebase the source branch server-side
    async fn rebase(&self, repo: &RepoIdentity, id: u64, version: u64) -> Result<(), ApiError>;

    /// Merge the pull request at the given version
    async fn merge(
        &self,
        repo: &RepoIdentity,
        id: u64,
        version: u64,
        request: &MergeRequest,
    ) -> Result<MergeOutcome, ApiError>;

    /// Mark the source ref for deletion and retarget dependents
    async fn cleanup(&self, repo: &RepoIdentity, id: u64) -> Result<(), ApiError>;

    /// Delete a branch on the server
    async fn delete_branch(&self, repo: &RepoIdentity, branch: &str) -> Result<(), ApiError>;

    /// Create a repository
    async fn create_repository(
        &self,
        request: &NewRepository,
    ) -> Result<RepoCreateOutcome, ApiError>;

    /// Delete a repository
    async fn delete_repository(&self, repo: &RepoIdentity) -> Result<(), ApiError>;

    /// Archive or unarchive a repository
    async fn set_archived(&self, repo: &RepoIdentity, archived: bool) -> Result<(), ApiError>;
}
