//! Next-version state machine
//!
//! The engine looks at the highest release reachable from HEAD. When it is a
//! final version the repository is in the *released* state, otherwise in the
//! *prerelease* state; the active branch rule and the aggregated bump level
//! then pick the transition. Every candidate passes [`guard`] before it is
//! returned.

use crate::domain::{BranchRule, BumpLevel, PreRelease, Version};
use crate::error::{Result, SemrelError};
use crate::history::ReleaseHistory;
use std::borrow::Cow;
use std::fmt;
use tracing::debug;

/// Per-run knobs that are not part of the commit history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOptions {
    /// When false the first release is `1.0.0` rather than a `0.x` version
    pub allow_zero_version: bool,
    /// Replaces the aggregated level
    pub forced_level: Option<BumpLevel>,
    /// Treat the matched rule as a prerelease rule for this run
    pub as_prerelease: bool,
    pub prerelease_token: Option<String>,
}

impl Default for VersionOptions {
    fn default() -> Self {
        VersionOptions {
            allow_zero_version: true,
            forced_level: None,
            as_prerelease: false,
            prerelease_token: None,
        }
    }
}

impl VersionOptions {
    pub fn effective_level(&self, aggregated: BumpLevel) -> BumpLevel {
        self.forced_level.unwrap_or(aggregated)
    }

    pub fn effective_rule<'r>(&self, rule: &'r BranchRule) -> Result<Cow<'r, BranchRule>> {
        if self.as_prerelease || (rule.is_prerelease && self.prerelease_token.is_some()) {
            let token = self.prerelease_token.as_deref();
            Ok(Cow::Owned(rule.as_prerelease(token)?))
        } else {
            Ok(Cow::Borrowed(rule))
        }
    }
}

/// Everything the engine decides from
#[derive(Debug, Clone, Copy)]
pub struct EngineInput<'a> {
    pub history: &'a ReleaseHistory,
    pub rule: &'a BranchRule,
    /// Aggregated level of the commits since the last reachable final release
    pub level: BumpLevel,
    /// Commits between the highest reachable release and HEAD
    pub new_commits: usize,
}

/// Why a run ends without a version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoReleaseReason {
    /// Commits exist but none of them moves the version
    NoBump,
    /// Nothing was committed since the last cut
    NoNewCommits,
}

impl fmt::Display for NoReleaseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoReleaseReason::NoBump => write!(f, "no commit since the last release requires one"),
            NoReleaseReason::NoNewCommits => write!(f, "no new commits since the last release"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Release { version: Version, level: BumpLevel },
    NoRelease(NoReleaseReason),
}

pub struct VersionEngine {
    options: VersionOptions,
}

impl VersionEngine {
    pub fn new(options: VersionOptions) -> Self {
        VersionEngine { options }
    }

    /// Compute the next version, or the reason there is none
    ///
    /// # Errors
    /// * `SemrelError::Config` - a prerelease rule without a usable token
    /// * `SemrelError::Version` - a version component or prerelease number
    ///   would overflow
    /// * `SemrelError::VersionRegression` - the candidate does not exceed the
    ///   highest reachable release
    pub fn next_version(&self, input: &EngineInput<'_>) -> Result<Decision> {
        let rule = self.options.effective_rule(input.rule)?;
        let level = self.options.effective_level(input.level);

        let decision = match input.history.highest_reachable() {
            None => self.first_release(input.history, &rule, level)?,
            Some(current) if current.version.is_prerelease() => {
                self.from_prerelease(&current.version, input, &rule, level)?
            }
            Some(current) => self.from_release(&current.version, input, &rule, level)?,
        };

        if let Decision::Release { version, .. } = &decision {
            guard(version, input.history)?;
        }
        Ok(decision)
    }

    fn first_release(
        &self,
        history: &ReleaseHistory,
        rule: &BranchRule,
        level: BumpLevel,
    ) -> Result<Decision> {
        if level == BumpLevel::None {
            return Ok(Decision::NoRelease(NoReleaseReason::NoBump));
        }
        let base = self.bump_from(None, level)?;
        debug!(%base, rule = %rule.name, "first release");
        release_on(history, rule, base, level)
    }

    fn from_release(
        &self,
        current: &Version,
        input: &EngineInput<'_>,
        rule: &BranchRule,
        level: BumpLevel,
    ) -> Result<Decision> {
        if level == BumpLevel::None {
            let reason = if input.new_commits == 0 {
                NoReleaseReason::NoNewCommits
            } else {
                NoReleaseReason::NoBump
            };
            return Ok(Decision::NoRelease(reason));
        }
        let next = current.bump(level)?;
        debug!(%current, %next, rule = %rule.name, "bumping released version");
        release_on(input.history, rule, next, level)
    }

    fn from_prerelease(
        &self,
        current: &Version,
        input: &EngineInput<'_>,
        rule: &BranchRule,
        level: BumpLevel,
    ) -> Result<Decision> {
        let base = current.finalized();
        let last_final = input.history.highest_reachable_final().map(|r| &r.version);
        let natural = self.bump_from(last_final, level)?;

        if !rule.is_prerelease {
            let version = natural.max(base);
            debug!(%current, %version, "finalizing prerelease line");
            return Ok(Decision::Release { version, level });
        }

        let token = prerelease_token(rule)?;
        if current.prerelease_token() == Some(token) {
            if input.new_commits == 0 {
                return Ok(Decision::NoRelease(NoReleaseReason::NoNewCommits));
            }
            let target = if level > BumpLevel::None && natural > base {
                debug!(%base, %natural, "prerelease base moves up");
                natural
            } else {
                base
            };
            let version = next_prerelease(input.history, target, token)?;
            return Ok(Decision::Release { version, level });
        }

        let mut target = natural.max(base);
        if let Some(released) = input.history.highest_final() {
            if released.version >= target {
                let rebased = released.version.bump(level.max(BumpLevel::Patch))?;
                debug!(
                    %target,
                    released = %released.version,
                    %rebased,
                    "token switch target already released, rebasing"
                );
                target = rebased;
            }
        }
        let version = next_prerelease(input.history, target, token)?;
        debug!(from = %current, to = %version, "switching prerelease token");
        Ok(Decision::Release { version, level })
    }

    /// `last_final` bumped by `level`, or the first-release base without one
    fn bump_from(&self, last_final: Option<&Version>, level: BumpLevel) -> Result<Version> {
        match last_final {
            Some(version) => version.bump(level),
            None if level == BumpLevel::None => Ok(Version::zero()),
            None if self.options.allow_zero_version => Version::zero().bump(level),
            None => Ok(Version::new(1, 0, 0)),
        }
    }
}

fn prerelease_token(rule: &BranchRule) -> Result<&str> {
    rule.prerelease_token.as_deref().ok_or_else(|| {
        SemrelError::config(format!(
            "Branch rule '{}' is a prerelease rule without a prerelease token",
            rule.name
        ))
    })
}

fn release_on(
    history: &ReleaseHistory,
    rule: &BranchRule,
    base: Version,
    level: BumpLevel,
) -> Result<Decision> {
    let version = if rule.is_prerelease {
        next_prerelease(history, base, prerelease_token(rule)?)?
    } else {
        base
    };
    Ok(Decision::Release { version, level })
}

/// `base-token.N` with N one past any number already used for that pair
fn next_prerelease(history: &ReleaseHistory, base: Version, token: &str) -> Result<Version> {
    let number = match history.highest_prerelease_number(&base, token) {
        Some(n) => n.checked_add(1).ok_or_else(|| {
            SemrelError::version(format!(
                "Prerelease numbers for {}-{} are exhausted",
                base, token
            ))
        })?,
        None => 1,
    };
    Ok(base.with_prerelease(PreRelease::new(token, number)?))
}

/// Reject a candidate that does not exceed every reachable release
pub fn guard(candidate: &Version, history: &ReleaseHistory) -> Result<()> {
    match history.highest_reachable() {
        Some(highest) if *candidate <= highest.version => Err(SemrelError::VersionRegression {
            candidate: candidate.clone(),
            highest: highest.version.clone(),
        }),
        _ => Ok(()),
    }
}
