//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the read-only
//! repository access the resolver needs, plus the single write it performs
//! (creating a lightweight tag), allowing the whole pipeline to run against
//! a real repository or an in-memory one.
//!
//! # Overview
//!
//! The concrete implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory commit graph for testing
//!
//! # Usage
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations.
//!
//! ```rust
//! # use semrel::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> semrel::Result<()> {
//! let head = repo.head_oid()?;
//! let commits = repo.list_commits(None, head)?;
//! println!("{} commits reachable from HEAD", commits.len());
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::domain::CommitRecord;
use crate::error::Result;
use git2::Oid;

/// Common git operation trait for abstraction
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync`.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to [crate::error::SemrelError]
/// variants.
pub trait Repository: Send + Sync {
    /// Commit HEAD points at
    fn head_oid(&self) -> Result<Oid>;

    /// Short name of the checked-out branch, `None` on a detached HEAD
    fn current_branch(&self) -> Result<Option<String>>;

    /// Resolve a branch, tag or revision expression to a commit
    fn resolve_ref(&self, name: &str) -> Result<Oid>;

    /// Commits reachable from `to` but not from `from`
    ///
    /// Returned newest first. `from` itself and all its ancestors are
    /// excluded; with no `from` the walk runs down to the root commits.
    /// Two calls with the same arguments return the same sequence.
    ///
    /// # Example
    /// ```rust
    /// # use semrel::git::Repository;
    /// # fn example<R: Repository>(repo: &R) -> semrel::Result<()> {
    /// let release = repo.resolve_ref("v1.0.0")?;
    /// let head = repo.head_oid()?;
    /// for commit in repo.list_commits(Some(release), head)? {
    ///     println!("{} {}", commit.short_hash(), commit.subject());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_commits(&self, from: Option<Oid>, to: Oid) -> Result<Vec<CommitRecord>>;

    /// Every tag with the commit it points to, sorted by tag name
    ///
    /// Annotated tags are peeled; tags that do not reach a commit are left
    /// out.
    fn list_tags(&self) -> Result<Vec<(String, Oid)>>;

    /// Whether `ancestor` is `descendant` or one of its ancestors
    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool>;

    /// Create a lightweight tag at given OID
    ///
    /// Fails if the tag already exists.
    fn create_tag(&self, name: &str, oid: Oid) -> Result<()>;
}
