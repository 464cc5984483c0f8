use crate::domain::PreRelease;
use crate::error::{Result, SemrelError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version with an optional `token.number` prerelease suffix
///
/// Values are immutable; every operation returns a new `Version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<PreRelease>,
}

impl Version {
    /// Create a final version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// `0.0.0`, the base a repository without releases bumps from
    pub fn zero() -> Self {
        Version::new(0, 0, 0)
    }

    /// Parse `MAJOR.MINOR.PATCH[-TOKEN.NUMBER]`
    ///
    /// Build metadata is accepted and dropped. A prerelease that is not
    /// exactly one token followed by one counter is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let parsed = semver::Version::parse(text).map_err(|e| {
            SemrelError::version(format!("Invalid version '{}': {}", text, e))
        })?;

        let prerelease = if parsed.pre.is_empty() {
            None
        } else {
            Some(PreRelease::parse(parsed.pre.as_str())?)
        };

        Ok(Version {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            prerelease,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    pub fn prerelease_token(&self) -> Option<&str> {
        self.prerelease.as_ref().map(|pr| pr.token.as_str())
    }

    pub fn prerelease_number(&self) -> Option<u64> {
        self.prerelease.as_ref().map(|pr| pr.number)
    }

    /// The final version this prerelease leads up to (identity for finals)
    pub fn finalized(&self) -> Self {
        Version::new(self.major, self.minor, self.patch)
    }

    /// Attach a prerelease to the final part of this version
    pub fn with_prerelease(&self, prerelease: PreRelease) -> Self {
        Version {
            prerelease: Some(prerelease),
            ..self.finalized()
        }
    }

    /// Bump according to level
    ///
    /// `None` returns the version unchanged. Any other level increments the
    /// matching component of the numeric part, zeroes the lower ones and
    /// drops the prerelease. Fails when the component is already `u64::MAX`.
    pub fn bump(&self, level: BumpLevel) -> Result<Self> {
        let next = |component: u64| {
            component.checked_add(1).ok_or_else(|| {
                SemrelError::version(format!("Cannot apply a {} bump to {}", level, self))
            })
        };
        Ok(match level {
            BumpLevel::None => self.clone(),
            BumpLevel::Major => Version::new(next(self.major)?, 0, 0),
            BumpLevel::Minor => Version::new(self.major, next(self.minor)?, 0),
            BumpLevel::Patch => Version::new(self.major, self.minor, next(self.patch)?),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pr) = &self.prerelease {
            write!(f, "-{}", pr)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = SemrelError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                // a prerelease sorts before its final version
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

/// Magnitude of change implied by a commit or a set of commits
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    #[default]
    #[serde(alias = "no_release")]
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BumpLevel::None => "none",
            BumpLevel::Patch => "patch",
            BumpLevel::Minor => "minor",
            BumpLevel::Major => "major",
        };
        f.write_str(name)
    }
}
