//! Test fixtures for creating local clones of a Bitbucket-style remote.
//!
//! The bare remote lives at `<temp>/remotes/<PROJECT>/<repo>.git`, so the
//! clone's `origin` URL parses to the same project/repository pair the
//! server would use.

use std::path::PathBuf;
use tempfile::TempDir;

use super::git_helpers;

/// A clone with a bare remote, cleaned up on drop.
pub struct RepoFixture {
    /// Kept alive for the lifetime of the fixture.
    pub _temp: TempDir,
    /// Working tree of the clone.
    pub work: PathBuf,
    /// Bare remote the clone pushes to.
    pub remote: PathBuf,
}

impl RepoFixture {
    /// Bare remote + clone with one commit on `main` pushed.
    pub fn new(project: &str, repository: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let remote = temp
            .path()
            .join("remotes")
            .join(project)
            .join(format!("{}.git", repository));
        git_helpers::init_bare_repo(&remote);

        let work = temp.path().join("work");
        git_helpers::clone_repo(&format!("file://{}", remote.display()), &work);
        git_helpers::commit_file(&work, "README.md", "# readme\n", "Initial commit");
        git_helpers::push_upstream(&work, "origin", "main");

        Self {
            _temp: temp,
            work,
            remote,
        }
    }

    /// Create `branch` with one commit and push it; leaves it checked out.
    pub fn with_feature_branch(self, branch: &str, message: &str) -> Self {
        git_helpers::create_branch(&self.work, branch);
        git_helpers::commit_file(&self.work, "feature.txt", "feature\n", message);
        git_helpers::push_upstream(&self.work, "origin", branch);
        self
    }

    /// A directory inside the temp dir that is not a git repository.
    pub fn outside_repo(&self) -> PathBuf {
        let dir = self._temp.path().join("plain");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
