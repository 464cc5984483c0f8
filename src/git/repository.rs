use crate::domain::CommitRecord;
use crate::error::{Result, SemrelError};
use git2::{Oid, Repository as Git2Repo, Sort};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn to_record(commit: &git2::Commit<'_>) -> CommitRecord {
        CommitRecord {
            hash: commit.id().to_string(),
            author_time: commit.author().when().seconds(),
            commit_time: commit.time().seconds(),
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            squash_container: false,
            inherited_merge_request: None,
        }
    }
}

impl super::Repository for Git2Repository {
    fn head_oid(&self) -> Result<Oid> {
        let head = self
            .repo
            .head()
            .map_err(|e| SemrelError::tag(format!("Cannot resolve HEAD: {}", e)))?;
        Ok(head.peel_to_commit()?.id())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(|s| s.to_string()))
    }

    fn resolve_ref(&self, name: &str) -> Result<Oid> {
        let object = self
            .repo
            .revparse_single(name)
            .map_err(|e| SemrelError::tag(format!("Cannot resolve '{}': {}", name, e)))?;
        Ok(object.peel_to_commit()?.id())
    }

    fn list_commits(&self, from: Option<Oid>, to: Oid) -> Result<Vec<CommitRecord>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(to)?;
        if let Some(from) = from {
            revwalk.hide(from)?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let commit = self.repo.find_commit(oid_result?)?;
            commits.push(Self::to_record(&commit));
        }

        debug!(count = commits.len(), ?from, %to, "listed commits");
        Ok(commits)
    }

    fn list_tags(&self) -> Result<Vec<(String, Oid)>> {
        let names = self.repo.tag_names(None)?;

        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            match reference.peel_to_commit() {
                Ok(commit) => tags.push((name.to_string(), commit.id())),
                Err(e) => debug!(tag = name, error = %e, "tag does not point at a commit"),
            }
        }

        tags.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(tags)
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    fn create_tag(&self, name: &str, oid: Oid) -> Result<()> {
        let object = self
            .repo
            .find_object(oid, None)
            .map_err(|e| SemrelError::tag(format!("Cannot find object: {}", e)))?;

        self.repo
            .tag_lightweight(name, &object, false)
            .map_err(|e| SemrelError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }
}

// SAFETY: the resolver only reads through the handle from one thread at a
// time; libgit2 is initialised thread-safe by the git2 crate.
unsafe impl Sync for Git2Repository {}
