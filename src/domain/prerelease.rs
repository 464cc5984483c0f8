//! Pre-release component of a version
//!
//! A pre-release is always a token plus a counter, rendered as `token.number`
//! (e.g. `alpha.1`, `rc.3`). Bare tokens without a counter are rejected so a
//! prerelease version can never lose its position in the ordering.

use crate::error::{Result, SemrelError};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Pre-release token plus counter, e.g. `alpha.2`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreRelease {
    /// Label distinguishing the prerelease line (alpha, beta, rc, ...)
    pub token: String,
    /// Counter within the line, starting at 1
    pub number: u64,
}

impl PreRelease {
    /// Create a pre-release after validating the token
    pub fn new(token: impl Into<String>, number: u64) -> Result<Self> {
        let token = token.into();
        validate_token(&token)?;
        Ok(PreRelease { token, number })
    }

    /// Parse `token.number`
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

/// Checks a prerelease token is a single non-numeric semver identifier.
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(SemrelError::version("Empty pre-release token"));
    }
    if !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(SemrelError::version(format!(
            "Invalid pre-release token: '{}'",
            token
        )));
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return Err(SemrelError::version(format!(
            "Pre-release token must not be numeric: '{}'",
            token
        )));
    }
    Ok(())
}

impl FromStr for PreRelease {
    type Err = SemrelError;

    fn from_str(s: &str) -> Result<Self> {
        let (token, number) = s.rsplit_once('.').ok_or_else(|| {
            SemrelError::version(format!(
                "Pre-release '{}' must have the form TOKEN.NUMBER",
                s
            ))
        })?;

        let number = number.parse::<u64>().map_err(|_| {
            SemrelError::version(format!("Invalid pre-release number: '{}'", number))
        })?;

        PreRelease::new(token, number)
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.token, self.number)
    }
}

impl PartialOrd for PreRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PreRelease {
    // Alphanumeric identifiers compare in ASCII order, then the numeric counter.
    fn cmp(&self, other: &Self) -> Ordering {
        self.token
            .cmp(&other.token)
            .then(self.number.cmp(&other.number))
    }
}
