//! Domain logic - pure value types independent of git operations

pub mod branch;
pub mod classification;
pub mod commit;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::BranchRule;
pub use classification::Classification;
pub use commit::CommitRecord;
pub use prerelease::PreRelease;
pub use tag::TagFormat;
pub use version::{BumpLevel, Version};
