use crate::boundary::BoundaryWarning;
use crate::domain::{TagFormat, Version};
use crate::error::Result;
use crate::git::Repository;
use git2::Oid;
use tracing::{debug, warn};

/// One previously emitted version and the commit it was cut from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub version: Version,
    pub tag: String,
    pub commit: Oid,
    /// Whether the tagged commit is HEAD or one of its ancestors
    pub reachable: bool,
}

/// Every release found in the repository, ordered by version
///
/// Rebuilt from tags on each run and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReleaseHistory {
    records: Vec<ReleaseRecord>,
    warnings: Vec<BoundaryWarning>,
}

impl ReleaseHistory {
    pub fn new(mut records: Vec<ReleaseRecord>) -> Self {
        records.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.tag.cmp(&b.tag)));
        ReleaseHistory {
            records,
            warnings: Vec::new(),
        }
    }

    /// Read every tag that follows `tag_format` and note its reachability
    /// from `head`
    ///
    /// Tags in another format are skipped silently; tags in this format
    /// whose version does not parse are skipped with a warning.
    pub fn from_repository<R: Repository + ?Sized>(
        repo: &R,
        tag_format: &TagFormat,
        head: Oid,
    ) -> Result<Self> {
        let mut records = Vec::new();
        let mut warnings = Vec::new();

        for (tag, commit) in repo.list_tags()? {
            let version = match tag_format.parse(&tag) {
                Ok(Some(version)) => version,
                Ok(None) => {
                    debug!(tag = %tag, format = %tag_format.format, "tag does not follow the tag format");
                    continue;
                }
                Err(e) => {
                    warn!(tag = %tag, error = %e, "skipping unparsable release tag");
                    warnings.push(BoundaryWarning::UnparsableTag {
                        tag,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let reachable = repo.is_ancestor(commit, head)?;
            records.push(ReleaseRecord {
                version,
                tag,
                commit,
                reachable,
            });
        }

        let mut history = ReleaseHistory::new(records);
        warnings.extend(history.duplicate_warnings());
        warnings.extend(history.unreachable_warnings());
        history.warnings = warnings;

        debug!(
            releases = history.records.len(),
            reachable = history.reachable().count(),
            "release history loaded"
        );
        Ok(history)
    }

    pub fn records(&self) -> &[ReleaseRecord] {
        &self.records
    }

    pub fn warnings(&self) -> &[BoundaryWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn reachable(&self) -> impl Iterator<Item = &ReleaseRecord> {
        self.records.iter().filter(|r| r.reachable)
    }

    /// Highest version reachable from HEAD, final or prerelease
    pub fn highest_reachable(&self) -> Option<&ReleaseRecord> {
        self.reachable().last()
    }

    /// Highest final release reachable from HEAD
    pub fn highest_reachable_final(&self) -> Option<&ReleaseRecord> {
        self.reachable().filter(|r| !r.version.is_prerelease()).last()
    }

    /// Highest final release anywhere in the repository
    pub fn highest_final(&self) -> Option<&ReleaseRecord> {
        self.records
            .iter()
            .filter(|r| !r.version.is_prerelease())
            .last()
    }

    /// Highest prerelease number used for `base` with `token`, on any branch
    pub fn highest_prerelease_number(&self, base: &Version, token: &str) -> Option<u64> {
        self.records
            .iter()
            .filter(|r| r.version.prerelease_token() == Some(token))
            .filter(|r| r.version.finalized() == base.finalized())
            .filter_map(|r| r.version.prerelease_number())
            .max()
    }

    fn duplicate_warnings(&self) -> Vec<BoundaryWarning> {
        let mut warnings = Vec::new();
        for group in self.records.chunk_by(|a, b| a.version == b.version) {
            if group.len() > 1 {
                warnings.push(BoundaryWarning::DuplicateVersion {
                    version: group[0].version.to_string(),
                    tags: group.iter().map(|r| r.tag.clone()).collect(),
                });
            }
        }
        warnings
    }

    fn unreachable_warnings(&self) -> Vec<BoundaryWarning> {
        let Some(highest) = self.highest_reachable() else {
            return Vec::new();
        };
        self.records
            .iter()
            .filter(|r| !r.reachable && r.version > highest.version)
            .map(|r| BoundaryWarning::UnreachableRelease {
                tag: r.tag.clone(),
                reachable_max: highest.version.to_string(),
            })
            .collect()
    }
}
