/// Normalized, read-only view of one repository commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Full commit hash
    pub hash: String,
    /// Author time, seconds since the epoch
    pub author_time: i64,
    /// Committer time, seconds since the epoch
    pub commit_time: i64,
    /// Parent hashes: empty for a root, one for a normal commit, more for a merge
    pub parents: Vec<String>,
    /// Raw message, subject and body
    pub message: String,
    /// Set when the message embeds logical commits of its own
    pub squash_container: bool,
    /// Merge request of the squash container this record was split from
    pub inherited_merge_request: Option<String>,
}

impl CommitRecord {
    /// Create a record with a single message and no parents
    pub fn new(hash: impl Into<String>, message: impl Into<String>) -> Self {
        CommitRecord {
            hash: hash.into(),
            author_time: 0,
            commit_time: 0,
            parents: Vec::new(),
            message: message.into(),
            squash_container: false,
            inherited_merge_request: None,
        }
    }

    /// Builder-style parent list
    pub fn with_parents(mut self, parents: Vec<String>) -> Self {
        self.parents = parents;
        self
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() >= 2
    }

    /// Seven character abbreviation of the hash
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }

    /// Synthetic record carrying one block of a squash container
    ///
    /// `merge_request` is the container's own reference, used for blocks
    /// that do not name one themselves.
    pub fn split_off(&self, message: impl Into<String>, merge_request: Option<String>) -> Self {
        CommitRecord {
            hash: self.hash.clone(),
            author_time: self.author_time,
            commit_time: self.commit_time,
            parents: self.parents.clone(),
            message: message.into(),
            squash_container: false,
            inherited_merge_request: merge_request,
        }
    }
}
