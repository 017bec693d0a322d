//! Request and response schemas for the Bitbucket Server REST API
//!
//! Responses are deserialized once at the API boundary; an unexpected
//! shape surfaces as [`ApiError::Decode`](super::ApiError::Decode).

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Pull request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    Open,
    Merged,
    Declined,
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrState::Open => write!(f, "OPEN"),
            PrState::Merged => write!(f, "MERGED"),
            PrState::Declined => write!(f, "DECLINED"),
        }
    }
}

/// Review status of a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Approved,
    #[default]
    Unapproved,
    NeedsWork,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Approved => "APPROVED",
            ReviewStatus::Unapproved => "UNAPPROVED",
            ReviewStatus::NeedsWork => "NEEDS_WORK",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default)]
    pub self_links: Vec<Link>,
}

impl Links {
    pub fn self_href(&self) -> Option<&str> {
        self.self_links.first().map(|l| l.href.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectKey {
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default)]
    pub id: Option<u64>,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project: Option<ProjectKey>,
    #[serde(default)]
    pub archived: bool,
}

/// Branch reference on either side of a pull request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ref {
    pub id: String,
    pub display_id: String,
    #[serde(default)]
    pub latest_commit: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl User {
    /// `Display Name [name](email)`
    pub fn describe(&self) -> String {
        format!(
            "{} [{}]({})",
            self.display_name.as_deref().unwrap_or("name not found"),
            self.name,
            self.email_address.as_deref().unwrap_or("email not found")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user: User,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeResult {
    pub outcome: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrProperties {
    #[serde(default)]
    pub merge_result: Option<MergeResult>,
}

/// Label shown when a pull request has no reviewer activity
pub const NOT_REVIEWED: &str = "NOT REVIEWED";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: u64,
    /// Optimistic-concurrency token echoed back on every mutation
    pub version: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: PrState,
    pub from_ref: Ref,
    pub to_ref: Ref,
    pub author: Participant,
    #[serde(default)]
    pub reviewers: Vec<Participant>,
    #[serde(default)]
    pub properties: PrProperties,
    #[serde(default)]
    pub links: Links,
    #[serde(default)]
    pub created_date: Option<i64>,
    #[serde(default)]
    pub updated_date: Option<i64>,
}

impl PullRequest {
    pub fn from_branch(&self) -> &str {
        &self.from_ref.display_id
    }

    pub fn to_branch(&self) -> &str {
        &self.to_ref.display_id
    }

    /// Web URL of the pull request (empty if the server sent no link).
    pub fn url(&self) -> &str {
        self.links.self_href().unwrap_or_default()
    }

    pub fn description_or_dash(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => "-",
        }
    }

    /// Merge outcome computed by the server, `CLEAN` when absent.
    pub fn merge_outcome(&self) -> &str {
        self.properties
            .merge_result
            .as_ref()
            .map(|m| m.outcome.as_str())
            .unwrap_or("CLEAN")
    }

    /// Distinct statuses of active reviewers, or `NOT REVIEWED`.
    pub fn review_summary(&self) -> Vec<String> {
        if self.reviewers.is_empty() {
            return vec![NOT_REVIEWED.to_string()];
        }
        let statuses: BTreeSet<ReviewStatus> = self
            .reviewers
            .iter()
            .filter(|r| r.user.active)
            .map(|r| r.status)
            .collect();
        statuses.into_iter().map(|s| s.to_string()).collect()
    }

    /// Slug of the repository the source branch lives in.
    pub fn repository_slug(&self) -> Option<&str> {
        self.from_ref.repository.as_ref().map(|r| r.slug.as_str())
    }

    pub fn created_at(&self) -> Option<DateTime<Local>> {
        self.created_date.and_then(millis_to_local)
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_date.and_then(millis_to_local)
    }
}

fn millis_to_local(millis: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(millis).single()
}

/// Paged collection wrapper
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
    #[serde(default = "default_true")]
    pub is_last_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePath {
    pub to_string: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    pub path: ChangePath,
    #[serde(rename = "type")]
    pub change_type: String,
}

/// Files changed by a pull request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changes {
    pub from_hash: String,
    pub to_hash: String,
    #[serde(default)]
    pub values: Vec<Change>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeVeto {
    pub summary_message: String,
    #[serde(default)]
    pub detailed_message: Option<String>,
}

/// Result of `GET .../merge`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeValidation {
    pub can_merge: bool,
    pub conflicted: bool,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub vetoes: Vec<MergeVeto>,
}

impl MergeValidation {
    pub fn is_mergeable(&self) -> bool {
        self.can_merge && !self.conflicted && self.outcome.as_deref() == Some("CLEAN")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutoMergeStatus {
    pub id: String,
    pub available: bool,
}

/// Chain of branches a merge propagates through
#[derive(Debug, Clone, Deserialize)]
pub struct AutoMergePath {
    pub status: AutoMergeStatus,
    #[serde(default)]
    pub path: Vec<Ref>,
}

/// Pull request reference embedded in a 409 create response
#[derive(Debug, Clone, Deserialize)]
pub struct ExistingPullRequest {
    pub id: u64,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorEntry {
    pub message: String,
    #[serde(default)]
    pub existing_pull_request: Option<ExistingPullRequest>,
}

/// Error envelope returned by the server
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrors {
    pub errors: Vec<ApiErrorEntry>,
}

// Request bodies

#[derive(Debug, Clone, Serialize)]
pub struct RefRepository {
    pub slug: String,
    pub name: String,
    pub project: ProjectKey,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRef {
    pub id: String,
    pub repository: RefRepository,
}

impl NewRef {
    pub fn branch(branch: &str, project: &str, repository: &str) -> Self {
        Self {
            id: format!("refs/heads/{}", branch),
            repository: RefRepository {
                slug: repository.to_string(),
                name: repository.to_string(),
                project: ProjectKey {
                    key: project.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerRef {
    pub user: UserName,
}

impl ReviewerRef {
    pub fn new(name: &str) -> Self {
        Self {
            user: UserName {
                name: name.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPullRequest {
    pub title: String,
    pub description: String,
    pub state: PrState,
    pub open: bool,
    pub closed: bool,
    pub locked: bool,
    pub from_ref: NewRef,
    pub to_ref: NewRef,
    pub reviewers: Vec<ReviewerRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRepository {
    pub name: String,
    pub slug: String,
    pub scm_id: String,
    pub forkable: bool,
    pub project: ProjectKey,
    pub default_branch: String,
}

impl NewRepository {
    pub fn git(project: &str, name: &str, forkable: bool, default_branch: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: name.to_string(),
            scm_id: "git".to_string(),
            forkable,
            project: ProjectKey {
                key: project.to_string(),
            },
            default_branch: format!("refs/heads/{}", default_branch),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    pub auto_subject: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionBody {
    pub version: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    pub delete_source_ref: bool,
    pub retarget_dependents: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantUpdate {
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveUpdate {
    pub archived: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pull_request_json() -> serde_json::Value {
        json!({
            "id": 7,
            "version": 3,
            "title": "Add login",
            "state": "OPEN",
            "fromRef": {"id": "refs/heads/feature/login", "displayId": "feature/login",
                        "repository": {"id": 1, "slug": "api", "name": "api"}},
            "toRef": {"id": "refs/heads/main", "displayId": "main"},
            "author": {"user": {"name": "jdoe", "displayName": "Jane Doe",
                                "emailAddress": "jane@example.com"},
                       "status": "UNAPPROVED"},
            "reviewers": [
                {"user": {"name": "a", "active": true}, "status": "APPROVED"},
                {"user": {"name": "b", "active": true}, "status": "APPROVED"},
                {"user": {"name": "c", "active": true}, "status": "NEEDS_WORK"},
                {"user": {"name": "d", "active": false}, "status": "UNAPPROVED"}
            ],
            "properties": {},
            "links": {"self": [{"href": "https://bb.example.com/projects/PLAT/repos/api/pull-requests/7"}]},
            "createdDate": 1700000000000i64
        })
    }

    #[test]
    fn test_pull_request_deserialize() {
        let pr: PullRequest = serde_json::from_value(pull_request_json()).unwrap();
        assert_eq!(pr.id, 7);
        assert_eq!(pr.version, 3);
        assert_eq!(pr.state, PrState::Open);
        assert_eq!(pr.from_branch(), "feature/login");
        assert_eq!(pr.to_branch(), "main");
        assert_eq!(pr.repository_slug(), Some("api"));
        assert_eq!(pr.description_or_dash(), "-");
        assert_eq!(pr.merge_outcome(), "CLEAN");
        assert!(pr.url().ends_with("/pull-requests/7"));
        assert!(pr.created_at().is_some());
        assert!(pr.updated_at().is_none());
    }

    #[test]
    fn test_review_summary_distinct_active() {
        let pr: PullRequest = serde_json::from_value(pull_request_json()).unwrap();
        assert_eq!(pr.review_summary(), vec!["APPROVED", "NEEDS_WORK"]);
    }

    #[test]
    fn test_review_summary_no_reviewers() {
        let mut value = pull_request_json();
        value["reviewers"] = json!([]);
        value["properties"] = json!({"mergeResult": {"outcome": "CONFLICTED"}});
        let pr: PullRequest = serde_json::from_value(value).unwrap();
        assert_eq!(pr.review_summary(), vec![NOT_REVIEWED]);
        assert_eq!(pr.merge_outcome(), "CONFLICTED");
    }

    #[test]
    fn test_merge_validation() {
        let ok: MergeValidation =
            serde_json::from_value(json!({"canMerge": true, "conflicted": false, "outcome": "CLEAN"}))
                .unwrap();
        assert!(ok.is_mergeable());

        let vetoed: MergeValidation = serde_json::from_value(json!({
            "canMerge": false, "conflicted": false, "outcome": "CLEAN",
            "vetoes": [{"summaryMessage": "Needs approval"}]
        }))
        .unwrap();
        assert!(!vetoed.is_mergeable());
        assert_eq!(vetoed.vetoes[0].summary_message, "Needs approval");

        let unknown: MergeValidation =
            serde_json::from_value(json!({"canMerge": true, "conflicted": false})).unwrap();
        assert!(!unknown.is_mergeable());
    }

    #[test]
    fn test_new_pull_request_body() {
        let body = NewPullRequest {
            title: "Add login".to_string(),
            description: "Body".to_string(),
            state: PrState::Open,
            open: true,
            closed: false,
            locked: false,
            from_ref: NewRef::branch("feature/login", "PLAT", "api"),
            to_ref: NewRef::branch("main", "PLAT", "api"),
            reviewers: vec![ReviewerRef::new("alice")],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["state"], "OPEN");
        assert_eq!(value["fromRef"]["id"], "refs/heads/feature/login");
        assert_eq!(value["toRef"]["repository"]["project"]["key"], "PLAT");
        assert_eq!(value["reviewers"][0]["user"]["name"], "alice");
    }

    #[test]
    fn test_new_repository_body() {
        let value = serde_json::to_value(NewRepository::git("PLAT", "api", true, "main")).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "api", "slug": "api", "scmId": "git", "forkable": true,
                "project": {"key": "PLAT"}, "defaultBranch": "refs/heads/main"
            })
        );
    }

    #[test]
    fn test_review_status_wire_names() {
        let body = serde_json::to_value(ParticipantUpdate {
            status: ReviewStatus::NeedsWork,
        })
        .unwrap();
        assert_eq!(body, json!({"status": "NEEDS_WORK"}));
    }

    #[test]
    fn test_existing_pull_request_error() {
        let errors: ApiErrors = serde_json::from_value(json!({
            "errors": [{
                "message": "Only one pull request may be open for a given source and target branch",
                "existingPullRequest": {"id": 5, "links": {"self": [{"href": "https://bb/pr/5"}]}}
            }]
        }))
        .unwrap();
        let existing = errors.errors[0].existing_pull_request.as_ref().unwrap();
        assert_eq!(existing.id, 5);
        assert_eq!(existing.links.self_href(), Some("https://bb/pr/5"));
    }
}
