//! Repository history as the resolver sees it
//!
//! - [`walker`]: commit ranges, merge filtering and squash expansion
//! - [`releases`]: previously released versions rebuilt from tags

pub mod releases;
pub mod walker;

pub use releases::{ReleaseHistory, ReleaseRecord};
pub use walker::{CommitWalk, HistoryOptions, HistoryWalker};
