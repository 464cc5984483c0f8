use std::fmt;

/// Warnings that occur when reading release history near repository
/// boundaries. These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No new commits since the latest tag
    NoNewCommits {
        latest_tag: String,
        current_commit_hash: String,
    },
    /// Tag follows the tag format but its version cannot be parsed
    UnparsableTag { tag: String, reason: String },
    /// A release exists that is newer than anything reachable from HEAD
    UnreachableRelease { tag: String, reachable_max: String },
    /// Several tags name the same version
    DuplicateVersion { version: String, tags: Vec<String> },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits {
                latest_tag,
                current_commit_hash,
            } => {
                let short_hash = if current_commit_hash.len() > 7 {
                    &current_commit_hash[..7]
                } else {
                    current_commit_hash.as_str()
                };
                write!(
                    f,
                    "No new commits since tag '{}' (current: {})",
                    latest_tag, short_hash
                )
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::UnreachableRelease { tag, reachable_max } => {
                write!(
                    f,
                    "Tag '{}' is not reachable from HEAD; highest reachable release is {}",
                    tag, reachable_max
                )
            }
            BoundaryWarning::DuplicateVersion { version, tags } => {
                write!(
                    f,
                    "Version {} is tagged more than once: {}",
                    version,
                    tags.join(", ")
                )
            }
        }
    }
}
