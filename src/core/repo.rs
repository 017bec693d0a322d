//! Repository identity derived from a git remote URL

use std::fmt;

/// The `{project, repository}` pair every Bitbucket endpoint is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    /// Project key (e.g. `PLAT`, or `~user` for personal repositories)
    pub project: String,
    /// Repository slug
    pub repository: String,
}

impl RepoIdentity {
    pub fn new(project: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            repository: repository.into(),
        }
    }

    /// Parse a `project/repository` argument as given to `bb repo clone`.
    pub fn parse_slug(slug: &str) -> Option<Self> {
        let (project, repository) = slug.trim().split_once('/')?;
        let repository = repository.trim_end_matches('/').trim_end_matches(".git");
        if project.is_empty() || repository.is_empty() || repository.contains('/') {
            return None;
        }
        Some(Self::new(project, repository))
    }

    /// HTTP clone URL on the given host.
    pub fn clone_url(&self, host: &str) -> String {
        format!(
            "{}/scm/{}/{}.git",
            host.trim_end_matches('/'),
            self.project.to_lowercase(),
            self.repository
        )
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.repository)
    }
}

/// Parse a remote URL of the form `.../project/repository.git`.
///
/// Handles HTTP(S) (`https://host/scm/project/repo.git`), ssh
/// (`ssh://git@host:7999/project/repo.git`) and scp-like
/// (`git@host:project/repo.git`) remotes. The project is the
/// second-to-last path segment and the repository the last one with a
/// trailing `.git` stripped.
pub fn parse_remote_url(url: &str) -> Option<RepoIdentity> {
    let url = url.trim().trim_end_matches('/');
    let segments: Vec<&str> = url
        .split(['/', ':'])
        .filter(|s| !s.is_empty())
        .collect();

    if segments.len() < 2 {
        return None;
    }

    let repository = segments[segments.len() - 1].trim_end_matches(".git");
    let project = segments[segments.len() - 2];
    if repository.is_empty() {
        return None;
    }

    Some(RepoIdentity::new(project, repository))
}

/// Pick the fetch URL of the first remote from `git remote -v` output.
///
/// Lines look like `origin\thttps://host/scm/proj/repo.git (fetch)`.
pub fn first_remote_url(remote_listing: &str) -> Option<&str> {
    remote_listing
        .lines()
        .next()?
        .split_whitespace()
        .nth(1)
}
