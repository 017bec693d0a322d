//! REST URL builders for Bitbucket Server
//!
//! Every URL is absolute and built from the configured host. Branch names
//! in query strings are percent-encoded as full `refs/heads/...` ids.

use urlencoding::encode;

use crate::core::RepoIdentity;

/// Builds endpoint URLs relative to one Bitbucket host
#[derive(Debug, Clone)]
pub struct Endpoints {
    host: String,
}

fn branch_ref(branch: &str) -> String {
    format!("refs/heads/{}", branch)
}

impl Endpoints {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
        }
    }

    fn api(&self, repo: &RepoIdentity) -> String {
        format!(
            "{}/rest/api/latest/projects/{}/repos/{}",
            self.host, repo.project, repo.repository
        )
    }

    fn pull_request_path(&self, repo: &RepoIdentity, id: u64) -> String {
        format!("{}/pull-requests/{}", self.api(repo), id)
    }

    /// Inbox count, used as the connection health check.
    pub fn inbox_count(&self) -> String {
        format!("{}/rest/api/latest/inbox/pull-requests/count", self.host)
    }

    pub fn create_pull_request(&self, repo: &RepoIdentity) -> String {
        format!(
            "{}/rest/api/1.0/projects/{}/repos/{}/pull-requests",
            self.host, repo.project, repo.repository
        )
    }

    pub fn project_repositories(&self, project: &str) -> String {
        format!(
            "{}/rest/api/latest/projects/{}/repos?start=0&limit=10000",
            self.host, project
        )
    }

    pub fn default_reviewers(
        &self,
        repo: &RepoIdentity,
        repo_id: u64,
        from_branch: &str,
        to_branch: &str,
    ) -> String {
        format!(
            "{}/rest/default-reviewers/latest/projects/{}/repos/{}/reviewers\
             ?avatarSize=32&sourceRepoId={id}&sourceRefId={}&targetRepoId={id}&targetRefId={}",
            self.host,
            repo.project,
            repo.repository,
            encode(&branch_ref(from_branch)),
            encode(&branch_ref(to_branch)),
            id = repo_id,
        )
    }

    pub fn pull_request_changes(&self, repo: &RepoIdentity, id: u64) -> String {
        format!(
            "{}/changes?start=0&limit=1000&changeScope=unreviewed",
            self.pull_request_path(repo, id)
        )
    }

    /// Pull request resource: GET reads it, DELETE removes it.
    pub fn pull_request(&self, repo: &RepoIdentity, id: u64) -> String {
        self.pull_request_path(repo, id)
    }

    pub fn inbox_pull_requests(&self, role: &str) -> String {
        format!(
            "{}/rest/api/latest/inbox/pull-requests?role={}&avatarSize=64",
            self.host,
            encode(role)
        )
    }

    pub fn repository_pull_requests(&self, repo: &RepoIdentity) -> String {
        format!("{}/pull-requests", self.api(repo))
    }

    pub fn whoami(&self) -> String {
        format!("{}/plugins/servlet/applinks/whoami", self.host)
    }

    pub fn participant(&self, repo: &RepoIdentity, id: u64, user: &str) -> String {
        format!(
            "{}/participants/{}?avatarSize=32",
            self.pull_request_path(repo, id),
            encode(user)
        )
    }

    fn cleanup_path(&self, repo: &RepoIdentity, id: u64) -> String {
        format!(
            "{}/rest/pull-request-cleanup/latest/projects/{}/repos/{}/pull-requests/{}",
            self.host, repo.project, repo.repository, id
        )
    }

    /// Lists conditions that would block deleting the source branch.
    pub fn source_branch_delete_check(&self, repo: &RepoIdentity, id: u64) -> String {
        format!(
            "{}?deleteSourceRef=true&retargetDependents=true",
            self.cleanup_path(repo, id)
        )
    }

    pub fn cleanup(&self, repo: &RepoIdentity, id: u64) -> String {
        self.cleanup_path(repo, id)
    }

    /// GET validates mergeability, POST performs the merge.
    pub fn merge(&self, repo: &RepoIdentity, id: u64) -> String {
        format!("{}/merge", self.pull_request_path(repo, id))
    }

    pub fn merge_with_version(&self, repo: &RepoIdentity, id: u64, version: u64) -> String {
        format!("{}?avatarSize=32&version={}", self.merge(repo, id), version)
    }

    pub fn automerge_path(&self, repo: &RepoIdentity, target_branch: &str) -> String {
        format!(
            "{}/rest/branch-utils/latest/projects/{}/repos/{}/automerge/path/{}",
            self.host,
            repo.project,
            repo.repository,
            branch_ref(target_branch)
        )
    }

    pub fn rebase(&self, repo: &RepoIdentity, id: u64) -> String {
        format!(
            "{}/rest/git/latest/projects/{}/repos/{}/pull-requests/{}/rebase",
            self.host, repo.project, repo.repository, id
        )
    }

    pub fn branches(&self, repo: &RepoIdentity) -> String {
        format!(
            "{}/rest/branch-utils/latest/projects/{}/repos/{}/branches",
            self.host, repo.project, repo.repository
        )
    }

    pub fn create_repository(&self, project: &str) -> String {
        format!("{}/rest/api/latest/projects/{}/repos", self.host, project)
    }

    /// Repository resource: DELETE removes it, PUT updates it (archive flag).
    pub fn repository(&self, repo: &RepoIdentity) -> String {
        self.api(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> (Endpoints, RepoIdentity) {
        (
            Endpoints::new("https://bb.example.com/"),
            RepoIdentity::new("PLAT", "api"),
        )
    }

    #[test]
    fn test_inbox_and_whoami() {
        let (e, _) = endpoints();
        assert_eq!(
            e.inbox_count(),
            "https://bb.example.com/rest/api/latest/inbox/pull-requests/count"
        );
        assert_eq!(
            e.whoami(),
            "https://bb.example.com/plugins/servlet/applinks/whoami"
        );
        assert_eq!(
            e.inbox_pull_requests("REVIEWER"),
            "https://bb.example.com/rest/api/latest/inbox/pull-requests?role=REVIEWER&avatarSize=64"
        );
    }

    #[test]
    fn test_create_pull_request() {
        let (e, repo) = endpoints();
        assert_eq!(
            e.create_pull_request(&repo),
            "https://bb.example.com/rest/api/1.0/projects/PLAT/repos/api/pull-requests"
        );
    }

    #[test]
    fn test_default_reviewers_encodes_refs() {
        let (e, repo) = endpoints();
        let url = e.default_reviewers(&repo, 42, "feature/login", "main");
        assert_eq!(
            url,
            "https://bb.example.com/rest/default-reviewers/latest/projects/PLAT/repos/api/reviewers\
             ?avatarSize=32&sourceRepoId=42&sourceRefId=refs%2Fheads%2Ffeature%2Flogin\
             &targetRepoId=42&targetRefId=refs%2Fheads%2Fmain"
        );
    }

    #[test]
    fn test_pull_request_urls() {
        let (e, repo) = endpoints();
        let base = "https://bb.example.com/rest/api/latest/projects/PLAT/repos/api/pull-requests/7";
        assert_eq!(e.pull_request(&repo, 7), base);
        assert_eq!(
            e.pull_request_changes(&repo, 7),
            format!("{}/changes?start=0&limit=1000&changeScope=unreviewed", base)
        );
        assert_eq!(e.merge(&repo, 7), format!("{}/merge", base));
        assert_eq!(
            e.merge_with_version(&repo, 7, 3),
            format!("{}/merge?avatarSize=32&version=3", base)
        );
        assert_eq!(
            e.participant(&repo, 7, "jdoe"),
            format!("{}/participants/jdoe?avatarSize=32", base)
        );
    }

    #[test]
    fn test_plugin_urls() {
        let (e, repo) = endpoints();
        assert_eq!(
            e.source_branch_delete_check(&repo, 7),
            "https://bb.example.com/rest/pull-request-cleanup/latest/projects/PLAT/repos/api/pull-requests/7\
             ?deleteSourceRef=true&retargetDependents=true"
        );
        assert_eq!(
            e.automerge_path(&repo, "release/1.0"),
            "https://bb.example.com/rest/branch-utils/latest/projects/PLAT/repos/api/automerge/path/refs/heads/release/1.0"
        );
        assert_eq!(
            e.rebase(&repo, 7),
            "https://bb.example.com/rest/git/latest/projects/PLAT/repos/api/pull-requests/7/rebase"
        );
        assert_eq!(
            e.branches(&repo),
            "https://bb.example.com/rest/branch-utils/latest/projects/PLAT/repos/api/branches"
        );
    }

    #[test]
    fn test_repository_urls() {
        let (e, repo) = endpoints();
        assert_eq!(
            e.project_repositories("PLAT"),
            "https://bb.example.com/rest/api/latest/projects/PLAT/repos?start=0&limit=10000"
        );
        assert_eq!(
            e.create_repository("PLAT"),
            "https://bb.example.com/rest/api/latest/projects/PLAT/repos"
        );
        assert_eq!(
            e.repository(&repo),
            "https://bb.example.com/rest/api/latest/projects/PLAT/repos/api"
        );
    }
}
