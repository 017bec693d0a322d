//! Bitbucket Server adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::client::{ApiResponse, HttpClient};
use super::endpoints::Endpoints;
use super::traits::{ApiError, BitbucketApi, CreateOutcome, MergeOutcome, RepoCreateOutcome};
use super::types::*;
use crate::core::{Credentials, RepoIdentity};

#[derive(Debug, Deserialize)]
struct InboxCount {
    count: u64,
}

/// REST adapter for a single Bitbucket Server host
pub struct BitbucketServer {
    endpoints: Endpoints,
    http: HttpClient,
}

impl BitbucketServer {
    pub fn new(credentials: &Credentials) -> Result<Self, ApiError> {
        Ok(Self {
            endpoints: Endpoints::new(&credentials.host),
            http: HttpClient::new(credentials)?,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, ApiError> {
        self.http.get(url).await?.json(url)
    }

    /// POST where a 409 is a failure rather than an alternate outcome.
    async fn post_strict(
        &self,
        url: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<ApiResponse, ApiError> {
        let response = self.http.post(url, body).await?;
        if response.is_conflict() {
            return Err(ApiError::rejected(response.status, response.error_message()));
        }
        Ok(response)
    }
}

/// Render one entry of the delete-check response for display.
fn describe_blocker(item: &Value) -> String {
    ["message", "summaryMessage", "title"]
        .iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| item.to_string())
}

#[async_trait]
impl BitbucketApi for BitbucketServer {
    async fn inbox_count(&self) -> Result<u64, ApiError> {
        let count: InboxCount = self.get_json(&self.endpoints.inbox_count()).await?;
        Ok(count.count)
    }

    async fn project_repositories(&self, project: &str) -> Result<Vec<Repository>, ApiError> {
        let page: Page<Repository> = self
            .get_json(&self.endpoints.project_repositories(project))
            .await?;
        Ok(page.values)
    }

    async fn default_reviewers(
        &self,
        repo: &RepoIdentity,
        repo_id: u64,
        from_branch: &str,
        to_branch: &str,
    ) -> Result<Vec<User>, ApiError> {
        self.get_json(
            &self
                .endpoints
                .default_reviewers(repo, repo_id, from_branch, to_branch),
        )
        .await
    }

    async fn create_pull_request(
        &self,
        repo: &RepoIdentity,
        request: &NewPullRequest,
    ) -> Result<CreateOutcome, ApiError> {
        let url = self.endpoints.create_pull_request(repo);
        let response = self.http.post(&url, request).await?;

        if response.is_conflict() {
            let errors: ApiErrors = response.json(&url)?;
            let first = errors.errors.into_iter().next();
            let message = first
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_default();
            let existing = first.and_then(|e| e.existing_pull_request);
            debug!(?existing, "pull request already exists");
            return Ok(CreateOutcome::AlreadyExists {
                message,
                existing_id: existing.as_ref().map(|pr| pr.id),
                existing_url: existing
                    .as_ref()
                    .and_then(|pr| pr.links.self_href().map(str::to_string)),
            });
        }

        Ok(CreateOutcome::Created(response.json(&url)?))
    }

    async fn pull_request(&self, repo: &RepoIdentity, id: u64) -> Result<PullRequest, ApiError> {
        self.get_json(&self.endpoints.pull_request(repo, id)).await
    }

    async fn delete_pull_request(
        &self,
        repo: &RepoIdentity,
        id: u64,
        version: u64,
    ) -> Result<(), ApiError> {
        let body = json!({ "version": version });
        self.http
            .delete(&self.endpoints.pull_request(repo, id), Some(&body))
            .await?;
        Ok(())
    }

    async fn pull_request_changes(
        &self,
        repo: &RepoIdentity,
        id: u64,
    ) -> Result<Changes, ApiError> {
        self.get_json(&self.endpoints.pull_request_changes(repo, id))
            .await
    }

    async fn inbox_pull_requests(&self, role: &str) -> Result<Vec<PullRequest>, ApiError> {
        let page: Page<PullRequest> = self
            .get_json(&self.endpoints.inbox_pull_requests(role))
            .await?;
        Ok(page.values)
    }

    async fn repository_pull_requests(
        &self,
        repo: &RepoIdentity,
    ) -> Result<Vec<PullRequest>, ApiError> {
        let page: Page<PullRequest> = self
            .get_json(&self.endpoints.repository_pull_requests(repo))
            .await?;
        Ok(page.values)
    }

    async fn whoami(&self) -> Result<String, ApiError> {
        let url = self.endpoints.whoami();
        let user = self.http.get(&url).await?.text();
        if user.is_empty() {
            return Err(ApiError::Decode {
                url,
                reason: "empty username".to_string(),
            });
        }
        Ok(user)
    }

    async fn set_review_status(
        &self,
        repo: &RepoIdentity,
        id: u64,
        user: &str,
        status: ReviewStatus,
    ) -> Result<(), ApiError> {
        self.http
            .put(
                &self.endpoints.participant(repo, id, user),
                &ParticipantUpdate { status },
            )
            .await?;
        Ok(())
    }

    async fn source_branch_delete_blockers(
        &self,
        repo: &RepoIdentity,
        id: u64,
    ) -> Result<Vec<String>, ApiError> {
        let url = self.endpoints.source_branch_delete_check(repo, id);
        let response = self.http.get(&url).await?;
        match response.body {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items.iter().map(describe_blocker).collect()),
            other => Err(ApiError::Decode {
                url,
                reason: format!("expected a list, got {}", other),
            }),
        }
    }

    async fn validate_merge(
        &self,
        repo: &RepoIdentity,
        id: u64,
    ) -> Result<MergeValidation, ApiError> {
        self.get_json(&self.endpoints.merge(repo, id)).await
    }

    async fn automerge_path(
        &self,
        repo: &RepoIdentity,
        target_branch: &str,
    ) -> Result<AutoMergePath, ApiError> {
        self.get_json(&self.endpoints.automerge_path(repo, target_branch))
            .await
    }

    async fn rebase(&self, repo: &RepoIdentity, id: u64, version: u64) -> Result<(), ApiError> {
        self.post_strict(&self.endpoints.rebase(repo, id), &VersionBody { version })
            .await?;
        Ok(())
    }

    async fn merge(
        &self,
        repo: &RepoIdentity,
        id: u64,
        version: u64,
        request: &MergeRequest,
    ) -> Result<MergeOutcome, ApiError> {
        let url = self.endpoints.merge_with_version(repo, id, version);
        let response = self.http.post(&url, request).await?;

        if response.is_conflict() {
            return Ok(MergeOutcome::Conflict {
                message: response
                    .error_message()
                    .unwrap_or_else(|| "Merge conflict".to_string()),
            });
        }

        let merged: PullRequest = response.json(&url)?;
        if merged.state != PrState::Merged {
            return Err(ApiError::Decode {
                url,
                reason: format!("pull request is {} after merge", merged.state),
            });
        }
        Ok(MergeOutcome::Merged(merged))
    }

    async fn cleanup(&self, repo: &RepoIdentity, id: u64) -> Result<(), ApiError> {
        let body = CleanupRequest {
            delete_source_ref: true,
            retarget_dependents: true,
        };
        self.post_strict(&self.endpoints.cleanup(repo, id), &body)
            .await?;
        Ok(())
    }

    async fn delete_branch(&self, repo: &RepoIdentity, branch: &str) -> Result<(), ApiError> {
        let body = json!({ "name": branch });
        self.http
            .delete(&self.endpoints.branches(repo), Some(&body))
            .await?;
        Ok(())
    }

    async fn create_repository(
        &self,
        request: &NewRepository,
    ) -> Result<RepoCreateOutcome, ApiError> {
        let url = self.endpoints.create_repository(&request.project.key);
        let response = self.http.post(&url, request).await?;
        if response.is_conflict() {
            return Ok(RepoCreateOutcome::Conflict {
                message: response
                    .error_message()
                    .unwrap_or_else(|| "Repository already exists".to_string()),
            });
        }
        Ok(RepoCreateOutcome::Created)
    }

    async fn delete_repository(&self, repo: &RepoIdentity) -> Result<(), ApiError> {
        self.http
            .delete(&self.endpoints.repository(repo), None)
            .await?;
        Ok(())
    }

    async fn set_archived(&self, repo: &RepoIdentity, archived: bool) -> Result<(), ApiError> {
        self.http
            .put(&self.endpoints.repository(repo), &ArchiveUpdate { archived })
            .await?;
        Ok(())
    }
}
