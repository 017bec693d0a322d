//! wiremock-based mock helpers for Bitbucket Server API tests.
//!
//! Provides response builders for the REST endpoints bbcli talks to,
//! allowing fully offline testing of the adapter and command workflows.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use bbcli::platform::BitbucketServer;
use bbcli::Credentials;

pub const PROJECT: &str = "PLAT";
pub const REPO: &str = "api";

/// Start a wiremock server and return an adapter pointed at it.
pub async fn setup_bitbucket_mock() -> (MockServer, BitbucketServer) {
    let server = MockServer::start().await;
    let credentials = Credentials::new(&server.uri(), "jdoe", "s3cret-token").unwrap();
    let adapter = BitbucketServer::new(&credentials).unwrap();
    (server, adapter)
}

fn repo_api(project: &str, repo: &str) -> String {
    format!("/rest/api/latest/projects/{}/repos/{}", project, repo)
}

pub fn pr_path(id: u64) -> String {
    format!("{}/pull-requests/{}", repo_api(PROJECT, REPO), id)
}

pub fn cleanup_path(id: u64) -> String {
    format!(
        "/rest/pull-request-cleanup/latest/projects/{}/repos/{}/pull-requests/{}",
        PROJECT, REPO, id
    )
}

pub fn branches_path() -> String {
    format!(
        "/rest/branch-utils/latest/projects/{}/repos/{}/branches",
        PROJECT, REPO
    )
}

pub fn rebase_path(id: u64) -> String {
    format!(
        "/rest/git/latest/projects/{}/repos/{}/pull-requests/{}/rebase",
        PROJECT, REPO, id
    )
}

/// Pull request JSON as returned by `GET .../pull-requests/{id}`.
pub fn pull_request_json(id: u64, from: &str, to: &str, version: u64, state: &str) -> Value {
    json!({
        "id": id,
        "version": version,
        "title": format!("Pull request {}", id),
        "description": "Adds things",
        "state": state,
        "fromRef": {
            "id": format!("refs/heads/{}", from),
            "displayId": from,
            "latestCommit": "0123456789abcdef0123",
            "repository": {"id": 7, "slug": REPO, "name": REPO, "project": {"key": PROJECT}}
        },
        "toRef": {
            "id": format!("refs/heads/{}", to),
            "displayId": to,
            "latestCommit": "fedcba9876543210fedc",
            "repository": {"id": 7, "slug": REPO, "name": REPO, "project": {"key": PROJECT}}
        },
        "author": {
            "user": {"name": "jdoe", "displayName": "Jane Doe", "emailAddress": "jdoe@example.com", "active": true},
            "status": "UNAPPROVED",
            "approved": false
        },
        "reviewers": [],
        "properties": {"mergeResult": {"outcome": "CLEAN"}},
        "links": {"self": [{"href": format!("https://bb.example.com/projects/{}/repos/{}/pull-requests/{}", PROJECT, REPO, id)}]},
        "createdDate": 1700000000000i64,
        "updatedDate": 1700000360000i64
    })
}

pub fn validation_json(can_merge: bool, conflicted: bool, outcome: &str) -> Value {
    json!({
        "canMerge": can_merge,
        "conflicted": conflicted,
        "outcome": outcome,
        "vetoes": []
    })
}

pub fn automerge_json(status: &str, available: bool, path: &[&str]) -> Value {
    let path: Vec<Value> = path
        .iter()
        .map(|b| json!({"id": format!("refs/heads/{}", b), "displayId": b}))
        .collect();
    json!({"status": {"id": status, "available": available}, "path": path})
}

/// Mount `GET` of the pull request.
pub async fn mock_get_pr(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(pr_path(body["id"].as_u64().unwrap())))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount the delete-check returning the given blockers.
pub async fn mock_delete_check(server: &MockServer, id: u64, blockers: Value) {
    Mock::given(method("GET"))
        .and(path(cleanup_path(id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(blockers))
        .mount(server)
        .await;
}

pub async fn mock_validate_merge(server: &MockServer, id: u64, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{}/merge", pr_path(id))))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mock_automerge(server: &MockServer, target: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/rest/branch-utils/latest/projects/{}/repos/{}/automerge/path/refs/heads/{}",
            PROJECT, REPO, target
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mock_merge(server: &MockServer, id: u64, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path(format!("{}/merge", pr_path(id))))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mock_rebase(server: &MockServer, id: u64) {
    Mock::given(method("POST"))
        .and(path(rebase_path(id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

pub async fn mock_cleanup(server: &MockServer, id: u64) {
    Mock::given(method("POST"))
        .and(path(cleanup_path(id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

pub async fn mock_delete_branch(server: &MockServer) {
    Mock::given(method("DELETE"))
        .and(path(branches_path()))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

/// Mount every endpoint a clean merge of `id` from `from` into `to` touches.
pub async fn mock_clean_merge(server: &MockServer, id: u64, from: &str, to: &str) {
    mock_delete_check(server, id, json!([])).await;
    mock_validate_merge(server, id, validation_json(true, false, "CLEAN")).await;
    mock_get_pr(server, pull_request_json(id, from, to, 3, "OPEN")).await;
    mock_automerge(server, to, automerge_json("NO_PATH", false, &[])).await;
    mock_merge(server, id, 200, pull_request_json(id, from, to, 4, "MERGED")).await;
    mock_cleanup(server, id).await;
    mock_delete_branch(server).await;
}

/// Requests that change server state, as `METHOD path` strings in arrival order.
pub async fn mutating_requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() != "GET")
        .map(describe)
        .collect()
}

fn describe(request: &Request) -> String {
    format!("{} {}", request.method, request.url.path())
}
