use crate::domain::CommitRecord;
use crate::error::{Result, SemrelError};
use crate::git::Repository;
use git2::Oid;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory commit graph for testing without an actual repository
///
/// Commits must be added parents first; the insertion sequence doubles as
/// commit time, so "newest" means "added last".
pub struct MockRepository {
    commits: Vec<CommitRecord>,
    index: HashMap<Oid, usize>,
    head: Option<Oid>,
    branch: Option<String>,
    tags: Mutex<Vec<(String, Oid)>>,
}

impl MockRepository {
    /// Create a new empty mock repository on branch `main`
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            index: HashMap::new(),
            head: None,
            branch: Some("main".to_string()),
            tags: Mutex::new(Vec::new()),
        }
    }

    /// Add a commit with explicit parents; HEAD is not moved
    pub fn add_commit(&mut self, message: &str, parents: &[Oid]) -> Result<Oid> {
        for parent in parents {
            if !self.index.contains_key(parent) {
                return Err(SemrelError::tag(format!("Unknown parent commit {}", parent)));
            }
        }

        let position = self.commits.len();
        let mut bytes = [0u8; 20];
        bytes[0] = 0xc0;
        bytes[12..].copy_from_slice(&(position as u64 + 1).to_be_bytes());
        let oid = Oid::from_bytes(&bytes)?;

        let mut record = CommitRecord::new(oid.to_string(), message)
            .with_parents(parents.iter().map(|p| p.to_string()).collect());
        record.author_time = position as i64;
        record.commit_time = position as i64;

        self.commits.push(record);
        self.index.insert(oid, position);
        Ok(oid)
    }

    /// Add a commit on top of HEAD and move HEAD to it
    pub fn commit(&mut self, message: &str) -> Result<Oid> {
        let parents: Vec<Oid> = self.head.into_iter().collect();
        let oid = self.add_commit(message, &parents)?;
        self.head = Some(oid);
        Ok(oid)
    }

    /// Merge commit of HEAD and `other`, moving HEAD to it
    pub fn merge(&mut self, message: &str, other: Oid) -> Result<Oid> {
        let head = self
            .head
            .ok_or_else(|| SemrelError::tag("Cannot merge into an empty repository"))?;
        let oid = self.add_commit(message, &[head, other])?;
        self.head = Some(oid);
        Ok(oid)
    }

    /// Point HEAD at an existing commit
    pub fn checkout(&mut self, oid: Oid, branch: Option<&str>) {
        self.head = Some(oid);
        self.branch = branch.map(|b| b.to_string());
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        let tags = self.tags.get_mut().unwrap_or_else(|e| e.into_inner());
        tags.push((name.into(), oid));
    }

    fn parents_of(&self, oid: Oid) -> Result<Vec<Oid>> {
        let position = self
            .index
            .get(&oid)
            .ok_or_else(|| SemrelError::tag(format!("Unknown commit {}", oid)))?;
        self.commits[*position]
            .parents
            .iter()
            .map(|p| Oid::from_str(p).map_err(SemrelError::from))
            .collect()
    }

    fn ancestry(&self, start: Oid) -> Result<HashSet<Oid>> {
        let mut seen = HashSet::new();
        let mut pending = vec![start];
        while let Some(oid) = pending.pop() {
            if seen.insert(oid) {
                pending.extend(self.parents_of(oid)?);
            }
        }
        Ok(seen)
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn head_oid(&self) -> Result<Oid> {
        self.head
            .ok_or_else(|| SemrelError::tag("Cannot resolve HEAD: repository has no commits"))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn resolve_ref(&self, name: &str) -> Result<Oid> {
        if name == "HEAD" {
            return self.head_oid();
        }
        let tags = self.tags.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, oid)) = tags.iter().find(|(tag, _)| tag == name) {
            return Ok(*oid);
        }
        Oid::from_str(name)
            .ok()
            .filter(|oid| self.index.contains_key(oid))
            .ok_or_else(|| SemrelError::tag(format!("Cannot resolve '{}'", name)))
    }

    fn list_commits(&self, from: Option<Oid>, to: Oid) -> Result<Vec<CommitRecord>> {
        let reachable = self.ancestry(to)?;
        let hidden = match from {
            Some(from) => self.ancestry(from)?,
            None => HashSet::new(),
        };

        Ok(self
            .commits
            .iter()
            .rev()
            .filter(|record| {
                Oid::from_str(&record.hash)
                    .map(|oid| reachable.contains(&oid) && !hidden.contains(&oid))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn list_tags(&self) -> Result<Vec<(String, Oid)>> {
        let mut tags = self.tags.lock().unwrap_or_else(|e| e.into_inner()).clone();
        tags.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(tags)
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        Ok(self.ancestry(descendant)?.contains(&ancestor))
    }

    fn create_tag(&self, name: &str, oid: Oid) -> Result<()> {
        if !self.index.contains_key(&oid) {
            return Err(SemrelError::tag(format!("Cannot find object: {}", oid)));
        }
        let mut tags = self.tags.lock().unwrap_or_else(|e| e.into_inner());
        if tags.iter().any(|(tag, _)| tag == name) {
            return Err(SemrelError::tag(format!("Tag '{}' already exists", name)));
        }
        tags.push((name.to_string(), oid));
        Ok(())
    }
}
