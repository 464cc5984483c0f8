use crate::domain::CommitRecord;
use crate::error::Result;
use crate::git::Repository;
use crate::parser::CommitParser;
use git2::Oid;
use tracing::debug;

/// How raw commits turn into logical commits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Drop commits with two or more parents before classification
    pub ignore_merge_commits: bool,
    /// Split messages that embed commits into one record per block
    pub parse_squash_commits: bool,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        HistoryOptions {
            ignore_merge_commits: true,
            parse_squash_commits: true,
        }
    }
}

/// Enumerates commit ranges of a repository
pub struct HistoryWalker<'a, R: Repository + ?Sized> {
    repo: &'a R,
    parser: &'a CommitParser,
    options: HistoryOptions,
}

impl<'a, R: Repository + ?Sized> HistoryWalker<'a, R> {
    pub fn new(repo: &'a R, parser: &'a CommitParser, options: HistoryOptions) -> Self {
        HistoryWalker {
            repo,
            parser,
            options,
        }
    }

    /// Commits reachable from `to` and not from `from`, newest first
    ///
    /// Squash containers, including a pull request title over a single
    /// embedded commit, are flagged here using the active scheme's header
    /// rule, but not yet expanded.
    pub fn walk(&self, from: Option<Oid>, to: Oid) -> Result<CommitWalk> {
        let mut commits = self.repo.list_commits(from, to)?;

        if self.options.parse_squash_commits {
            for commit in commits.iter_mut() {
                let blocks = self.parser.unsquash(&commit.message);
                commit.squash_container = blocks != [commit.message.as_str()];
            }
        }

        debug!(
            count = commits.len(),
            from = ?from.map(|oid| oid.to_string()),
            to = %to,
            "walked history"
        );
        Ok(CommitWalk {
            commits,
            options: self.options,
        })
    }
}

/// A finite, immutable commit range; iterate it as often as needed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitWalk {
    commits: Vec<CommitRecord>,
    options: HistoryOptions,
}

impl CommitWalk {
    pub fn iter(&self) -> std::slice::Iter<'_, CommitRecord> {
        self.commits.iter()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Records ready for classification
    ///
    /// Merge commits are dropped first (when configured) and only the
    /// survivors are expanded, so a merge never contributes squashed blocks.
    /// Expanded blocks keep their top-to-bottom order.
    pub fn logical_commits<'w>(
        &'w self,
        parser: &'w CommitParser,
    ) -> impl Iterator<Item = CommitRecord> + 'w {
        let options = self.options;
        self.commits
            .iter()
            .filter(move |commit| {
                let skip = options.ignore_merge_commits && commit.is_merge();
                if skip {
                    debug!(commit = commit.short_hash(), "ignoring merge commit");
                }
                !skip
            })
            .flat_map(move |commit| expand(commit, parser))
    }
}

impl<'w> IntoIterator for &'w CommitWalk {
    type Item = &'w CommitRecord;
    type IntoIter = std::slice::Iter<'w, CommitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn expand(commit: &CommitRecord, parser: &CommitParser) -> Vec<CommitRecord> {
    if !commit.squash_container {
        return vec![commit.clone()];
    }
    let blocks = parser.unsquash(&commit.message);
    let merge_request = parser.container_merge_request(commit.subject());
    debug!(
        commit = commit.short_hash(),
        blocks = blocks.len(),
        merge_request = ?merge_request,
        "expanding squash commit"
    );
    blocks
        .into_iter()
        .map(|block| commit.split_off(block, merge_request.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommitParserOptions;
    use crate::git::MockRepository;
    use crate::parser::ParserKind;

    fn parser() -> CommitParser {
        CommitParser::new(ParserKind::Conventional, &CommitParserOptions::default()).unwrap()
    }

    fn subjects(records: impl Iterator<Item = CommitRecord>) -> Vec<String> {
        records.map(|r| r.subject().to_string()).collect()
    }

    #[test]
    fn test_walk_is_restartable() {
        let mut repo = MockRepository::new();
        let first = repo.commit("feat: one").unwrap();
        repo.commit("fix: two").unwrap();
        let head = repo.commit("docs: three").unwrap();

        let parser = parser();
        let walker = HistoryWalker::new(&repo, &parser, HistoryOptions::default());
        let walk = walker.walk(Some(first), head).unwrap();

        assert_eq!(walk.len(), 2);
        let once: Vec<&CommitRecord> = walk.iter().collect();
        let twice: Vec<&CommitRecord> = walk.iter().collect();
        assert_eq!(once, twice);
        assert_eq!(walk, walker.walk(Some(first), head).unwrap());
    }

    #[test]
    fn test_merge_commits_are_dropped_before_expansion() {
        let mut repo = MockRepository::new();
        let base = repo.commit("feat: base").unwrap();
        let side = repo.add_commit("fix: side", &[base]).unwrap();
        repo.commit("feat: main").unwrap();
        let head = repo
            .merge("Merge pull request #3\n\n* feat: hidden one\n* fix: hidden two", side)
            .unwrap();

        let parser = parser();
        let walker = HistoryWalker::new(&repo, &parser, HistoryOptions::default());
        let walk = walker.walk(Some(base), head).unwrap();
        assert!(walk.iter().next().is_some_and(|c| c.squash_container));

        assert_eq!(
            subjects(walk.logical_commits(&parser)),
            vec!["feat: main", "fix: side"]
        );
    }

    #[test]
    fn test_merge_commits_kept_when_configured() {
        let mut repo = MockRepository::new();
        let base = repo.commit("feat: base").unwrap();
        let side = repo.add_commit("fix: side", &[base]).unwrap();
        let head = repo.merge("Merge branch 'side'", side).unwrap();

        let parser = parser();
        let options = HistoryOptions {
            ignore_merge_commits: false,
            parse_squash_commits: true,
        };
        let walk = HistoryWalker::new(&repo, &parser, options)
            .walk(Some(base), head)
            .unwrap();
        assert_eq!(
            subjects(walk.logical_commits(&parser)),
            vec!["Merge branch 'side'", "fix: side"]
        );
    }

    #[test]
    fn test_squash_expansion_preserves_block_order() {
        let mut repo = MockRepository::new();
        let head = repo
            .commit("feat(api): endpoints (#12)\n\n* feat: one\n\n* fix: two\n\n* docs: three")
            .unwrap();

        let parser = parser();
        let walk = HistoryWalker::new(&repo, &parser, HistoryOptions::default())
            .walk(None, head)
            .unwrap();
        let logical: Vec<CommitRecord> = walk.logical_commits(&parser).collect();

        assert_eq!(logical.len(), 4);
        assert!(logical.iter().all(|c| c.hash == head.to_string()));
        assert!(logical.iter().all(|c| !c.squash_container));
        assert_eq!(
            subjects(logical.into_iter()),
            vec!["feat(api): endpoints (#12)", "feat: one", "fix: two", "docs: three"]
        );
    }

    #[test]
    fn test_single_commit_squashes_are_expanded() {
        let mut repo = MockRepository::new();
        let base = repo.commit("feat: base").unwrap();
        repo.commit("Widget work (#12)\n\n* feat: two\n").unwrap();
        let head = repo
            .commit("Merged in feature/x  (pull request #5)\n\nAdd stuff\n\n* feat: one\n")
            .unwrap();

        let parser = parser();
        let walk = HistoryWalker::new(&repo, &parser, HistoryOptions::default())
            .walk(Some(base), head)
            .unwrap();
        assert!(walk.iter().all(|c| c.squash_container));

        let logical: Vec<CommitRecord> = walk.logical_commits(&parser).collect();
        let references: Vec<Option<&str>> = logical
            .iter()
            .map(|c| c.inherited_merge_request.as_deref())
            .collect();
        assert_eq!(references, vec![Some("#5"), Some("#12")]);
        assert_eq!(subjects(logical.into_iter()), vec!["feat: one", "feat: two"]);
    }

    #[test]
    fn test_plain_commits_are_not_containers() {
        let mut repo = MockRepository::new();
        repo.commit("Update README\n\nwording only").unwrap();
        let head = repo.commit("fix: crash\n\n- details").unwrap();

        let parser = parser();
        let walk = HistoryWalker::new(&repo, &parser, HistoryOptions::default())
            .walk(None, head)
            .unwrap();
        assert!(!walk.iter().any(|c| c.squash_container));
        assert_eq!(walk.logical_commits(&parser).count(), 2);
    }

    #[test]
    fn test_squash_expansion_disabled() {
        let mut repo = MockRepository::new();
        let head = repo.commit("feat: one\n\n* fix: two").unwrap();

        let parser = parser();
        let options = HistoryOptions {
            ignore_merge_commits: true,
            parse_squash_commits: false,
        };
        let walk = HistoryWalker::new(&repo, &parser, options)
            .walk(None, head)
            .unwrap();
        assert!(!walk.iter().any(|c| c.squash_container));
        assert_eq!(walk.logical_commits(&parser).count(), 1);
    }
}
