//! End-to-end resolution: branch rule, history, classification,
//! aggregation and the version engine wired together

use crate::analyzer::AggregationConfig;
use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::branch::resolve;
use crate::domain::{BranchRule, BumpLevel, Classification, TagFormat, Version};
use crate::engine::{Decision, EngineInput, NoReleaseReason, VersionEngine, VersionOptions};
use crate::error::Result;
use crate::git::Repository;
use crate::history::{HistoryOptions, HistoryWalker, ReleaseHistory};
use crate::parser::CommitParser;
use git2::Oid;
use tracing::{debug, info};

/// Validated inputs of one resolution run
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub branch: String,
    pub rules: Vec<BranchRule>,
    /// Start of the commit range; defaults to the last reachable final release
    pub from: Option<Oid>,
    pub to: Oid,
    pub tag_format: TagFormat,
    pub parser: CommitParser,
    pub history_options: HistoryOptions,
    pub aggregation: AggregationConfig,
    pub version_options: VersionOptions,
}

impl ResolveRequest {
    pub fn from_config(config: &Config, branch: impl Into<String>, to: Oid) -> Result<Self> {
        Ok(ResolveRequest {
            branch: branch.into(),
            rules: config.branch_rules()?,
            from: None,
            to,
            tag_format: config.tag_format()?,
            parser: config.parser()?,
            history_options: config.history_options(),
            aggregation: config.aggregation_config()?,
            version_options: config.version_options(),
        })
    }
}

/// A version to publish and what led to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: Version,
    pub tag: String,
    /// Highest release reachable before this one
    pub previous: Option<Version>,
    pub level: BumpLevel,
    /// Name of the branch rule that matched
    pub rule: String,
    /// Changelog entries, newest commit first
    pub entries: Vec<Classification>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Release(Release),
    NoReleaseNeeded {
        reason: NoReleaseReason,
        current: Option<Version>,
    },
}

/// Outcome plus the non-fatal findings collected on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: ReleaseOutcome,
    pub warnings: Vec<BoundaryWarning>,
}

/// Classify one raw commit message with the configured scheme
pub fn classify_commit(parser: &CommitParser, raw_message: &str) -> Vec<Classification> {
    parser.classify_message(raw_message)
}

/// Compute the next version for `request.branch` at `request.to`
///
/// # Errors
/// * `SemrelError::Config` - no branch rule matches the branch
/// * `SemrelError::VersionRegression` - the computed version would not
///   exceed a reachable release
/// * `SemrelError::Git` - repository access failed
pub fn resolve_next_version<R: Repository + ?Sized>(
    repo: &R,
    request: &ResolveRequest,
) -> Result<Resolution> {
    let rule = resolve(&request.branch, &request.rules)?;
    info!(
        branch = %request.branch,
        rule = %rule.name,
        prerelease = rule.is_prerelease,
        parser = %request.parser.kind(),
        "branch rule selected"
    );

    let history = ReleaseHistory::from_repository(repo, &request.tag_format, request.to)?;
    let mut warnings = history.warnings().to_vec();

    let highest = history.highest_reachable();
    let last_final = history.highest_reachable_final();
    let from = request.from.or(last_final.map(|r| r.commit));

    let walker = HistoryWalker::new(repo, &request.parser, request.history_options);
    let walk = walker.walk(from, request.to)?;
    let classifications: Vec<Classification> = walk
        .logical_commits(&request.parser)
        .flat_map(|commit| request.parser.classify(&commit))
        .collect();

    let current = highest.map_or_else(Version::zero, |r| r.version.clone());
    let aggregation = request.aggregation.aggregate(&classifications, &current);

    let new_commits = match highest {
        Some(cut) if request.from.is_some() || Some(cut.commit) != from => {
            repo.list_commits(Some(cut.commit), request.to)?.len()
        }
        _ => walk.len(),
    };
    debug!(
        commits = walk.len(),
        new_commits,
        level = %aggregation.level,
        "history classified"
    );

    let engine = VersionEngine::new(request.version_options.clone());
    let decision = engine.next_version(&EngineInput {
        history: &history,
        rule,
        level: aggregation.level,
        new_commits,
    })?;

    let previous = highest.map(|r| r.version.clone());
    let outcome = match decision {
        Decision::Release { version, level } => {
            let tag = request.tag_format.format(&version);
            info!(version = %version, tag = %tag, %level, "next version resolved");
            ReleaseOutcome::Release(Release {
                version,
                tag,
                previous,
                level,
                rule: rule.name.clone(),
                entries: aggregation.entries,
            })
        }
        Decision::NoRelease(reason) => {
            if let (NoReleaseReason::NoNewCommits, Some(cut)) = (reason, highest) {
                warnings.push(BoundaryWarning::NoNewCommits {
                    latest_tag: cut.tag.clone(),
                    current_commit_hash: request.to.to_string(),
                });
            }
            info!(%reason, "no release needed");
            ReleaseOutcome::NoReleaseNeeded {
                reason,
                current: previous,
            }
        }
    };

    Ok(Resolution { outcome, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SemrelError;
    use crate::git::MockRepository;

    fn config(toml: &str) -> Config {
        Config::from_toml(toml).unwrap()
    }

    const BRANCHES: &str = r#"
[branches.main]
match = "(main|master)"

[branches.features]
match = "feat/.+"
prerelease = true
prerelease_token = "alpha"
"#;

    fn resolve_on(repo: &MockRepository, config: &Config, branch: &str) -> Result<Resolution> {
        let head = repo.head_oid()?;
        let request = ResolveRequest::from_config(config, branch, head)?;
        resolve_next_version(repo, &request)
    }

    fn version_of(resolution: &Resolution) -> String {
        match &resolution.outcome {
            ReleaseOutcome::Release(release) => release.version.to_string(),
            other => panic!("expected a release, got {:?}", other),
        }
    }

    #[test]
    fn test_release_on_main() {
        let mut repo = MockRepository::new();
        let tagged = repo.commit("feat: initial").unwrap();
        repo.add_tag("v1.2.3", tagged);
        repo.commit("fix: crash").unwrap();
        repo.commit("feat: export").unwrap();
        repo.commit("chore: tidy").unwrap();

        let resolution = resolve_on(&repo, &config(BRANCHES), "main").unwrap();
        match resolution.outcome {
            ReleaseOutcome::Release(release) => {
                assert_eq!(release.version, Version::new(1, 3, 0));
                assert_eq!(release.tag, "v1.3.0");
                assert_eq!(release.previous, Some(Version::new(1, 2, 3)));
                assert_eq!(release.level, BumpLevel::Minor);
                assert_eq!(release.rule, "main");
                let subjects: Vec<&str> =
                    release.entries.iter().map(|e| e.raw_subject.as_str()).collect();
                assert_eq!(subjects, vec!["chore: tidy", "feat: export", "fix: crash"]);
            }
            other => panic!("expected a release, got {:?}", other),
        }
    }

    #[test]
    fn test_prerelease_lifecycle() {
        let config = config(BRANCHES);
        let mut repo = MockRepository::new();
        let base = repo.commit("feat: initial").unwrap();
        repo.add_tag("v1.0.0", base);

        let first = repo.commit("feat: new widget").unwrap();
        let resolution = resolve_on(&repo, &config, "feat/widget").unwrap();
        assert_eq!(version_of(&resolution), "1.1.0-alpha.1");
        repo.add_tag("v1.1.0-alpha.1", first);

        let resolution = resolve_on(&repo, &config, "feat/widget").unwrap();
        assert!(matches!(
            resolution.outcome,
            ReleaseOutcome::NoReleaseNeeded {
                reason: NoReleaseReason::NoNewCommits,
                ..
            }
        ));
        assert!(matches!(
            resolution.warnings.as_slice(),
            [BoundaryWarning::NoNewCommits { .. }]
        ));

        let second = repo.commit("fix: widget colour").unwrap();
        let resolution = resolve_on(&repo, &config, "feat/widget").unwrap();
        assert_eq!(version_of(&resolution), "1.1.0-alpha.2");
        repo.add_tag("v1.1.0-alpha.2", second);

        assert_eq!(version_of(&resolve_on(&repo, &config, "main").unwrap()), "1.1.0");
    }

    #[test]
    fn test_first_release_and_nothing_to_do() {
        let mut repo = MockRepository::new();
        repo.commit("docs: readme").unwrap();
        let resolution = resolve_on(&repo, &Config::default(), "main").unwrap();
        assert_eq!(
            resolution.outcome,
            ReleaseOutcome::NoReleaseNeeded {
                reason: NoReleaseReason::NoBump,
                current: None
            }
        );

        repo.commit("feat: first feature").unwrap();
        let resolution = resolve_on(&repo, &Config::default(), "main").unwrap();
        assert_eq!(version_of(&resolution), "0.1.0");
    }

    #[test]
    fn test_unmatched_branch_is_config_error() {
        let mut repo = MockRepository::new();
        repo.commit("feat: x").unwrap();
        let err = resolve_on(&repo, &Config::default(), "feature/x").unwrap_err();
        assert!(matches!(err, SemrelError::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_merge_and_squash_handling() {
        let mut repo = MockRepository::new();
        let base = repo.commit("fix: base").unwrap();
        repo.add_tag("v1.0.0", base);
        let side = repo
            .add_commit("Big change (#7)\n\n* fix: one\n\n* feat: two", &[base])
            .unwrap();
        repo.merge("Merge branch 'side'\n\nBREAKING CHANGE: not a real commit", side)
            .unwrap();

        let resolution = resolve_on(&repo, &Config::default(), "main").unwrap();
        match resolution.outcome {
            ReleaseOutcome::Release(release) => {
                assert_eq!(release.version, Version::new(1, 1, 0));
                assert_eq!(release.entries.len(), 2);
            }
            other => panic!("expected a release, got {:?}", other),
        }
    }

    #[test]
    fn test_single_commit_squashes_release() {
        for message in [
            "Widget work (#12)\n\n* feat: two\n",
            "Merged in feature/x  (pull request #5)\n\nAdd stuff\n\n* feat: one\n",
        ] {
            let mut repo = MockRepository::new();
            let base = repo.commit("fix: base").unwrap();
            repo.add_tag("v1.0.0", base);
            repo.commit(message).unwrap();

            let resolution = resolve_on(&repo, &Config::default(), "main").unwrap();
            assert_eq!(version_of(&resolution), "1.1.0", "message: {:?}", message);
        }
    }

    #[test]
    fn test_squashed_entries_inherit_pull_request() {
        let mut repo = MockRepository::new();
        let base = repo.commit("fix: base").unwrap();
        repo.add_tag("v1.0.0", base);
        repo.commit("Widget work (#12)\n\n* fix: one\n\n* feat: two (#3)").unwrap();

        let resolution = resolve_on(&repo, &Config::default(), "main").unwrap();
        match resolution.outcome {
            ReleaseOutcome::Release(release) => {
                let references: Vec<Option<&str>> = release
                    .entries
                    .iter()
                    .map(|e| e.linked_merge_request.as_deref())
                    .collect();
                assert_eq!(references, vec![Some("#12"), Some("#3")]);
            }
            other => panic!("expected a release, got {:?}", other),
        }
    }

    #[test]
    fn test_emoji_squash_release() {
        let mut repo = MockRepository::new();
        let base = repo.commit(":bug: base").unwrap();
        repo.add_tag("v1.0.0", base);
        repo.commit("Widget work (#12)\n\n* :sparkles: add widget\n").unwrap();

        let resolution = resolve_on(&repo, &config("commit_parser = \"emoji\""), "main").unwrap();
        assert_eq!(version_of(&resolution), "1.1.0");
    }

    #[test]
    fn test_breaking_change_demoted_on_zero() {
        let mut repo = MockRepository::new();
        let base = repo.commit("feat: start").unwrap();
        repo.add_tag("v0.4.0", base);
        repo.commit("feat!: drop old api").unwrap();

        let config = config("major_on_zero = false");
        let demoted = resolve_on(&repo, &config, "main").unwrap();
        assert_eq!(version_of(&demoted), "0.5.0");
        let promoted = resolve_on(&repo, &Config::default(), "main").unwrap();
        assert_eq!(version_of(&promoted), "1.0.0");
    }

    #[test]
    fn test_classify_commit() {
        let parser = Config::default().parser().unwrap();
        let result = classify_commit(&parser, "perf(db)!: new index");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].bump_level, BumpLevel::Major);
        assert_eq!(result[0].scope.as_deref(), Some("db"));
    }
}
