use crate::domain::prerelease::validate_token;
use crate::error::{Result, SemrelError};
use regex::Regex;

/// One entry of the ordered branch rule list
#[derive(Debug, Clone)]
pub struct BranchRule {
    pub name: String,
    /// Source text of the pattern as configured
    pub pattern: String,
    matcher: Regex,
    pub is_prerelease: bool,
    pub prerelease_token: Option<String>,
}

impl BranchRule {
    /// Compile a rule
    ///
    /// The pattern is matched from the start of the branch name, the way a
    /// leading-anchored regular expression match works; it does not have to
    /// consume the whole name.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        is_prerelease: bool,
        prerelease_token: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        let matcher = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
            SemrelError::config(format!(
                "Branch rule '{}' has a malformed match pattern '{}': {}",
                name, pattern, e
            ))
        })?;

        if is_prerelease {
            let token = prerelease_token.as_deref().ok_or_else(|| {
                SemrelError::config(format!(
                    "Branch rule '{}' is a prerelease rule without a prerelease token",
                    name
                ))
            })?;
            validate_token(token)
                .map_err(|e| SemrelError::config(format!("Branch rule '{}': {}", name, e)))?;
        }

        Ok(BranchRule {
            name,
            pattern: pattern.to_string(),
            matcher,
            is_prerelease,
            prerelease_token,
        })
    }

    /// Release rule (no prerelease token)
    pub fn release(name: impl Into<String>, pattern: &str) -> Result<Self> {
        Self::new(name, pattern, false, None)
    }

    /// Prerelease rule cutting `token.N` versions
    pub fn prerelease(name: impl Into<String>, pattern: &str, token: &str) -> Result<Self> {
        Self::new(name, pattern, true, Some(token.to_string()))
    }

    pub fn matches(&self, branch_name: &str) -> bool {
        self.matcher.is_match(branch_name)
    }

    /// Same rule with the prerelease flag forced on for a single run
    pub fn as_prerelease(&self, token: Option<&str>) -> Result<Self> {
        let token = token
            .map(str::to_string)
            .or_else(|| self.prerelease_token.clone())
            .unwrap_or_else(|| "rc".to_string());
        Self::new(self.name.clone(), &self.pattern, true, Some(token))
    }
}

/// Pick the first rule whose pattern matches `branch_name`
pub fn resolve<'a>(branch_name: &str, rules: &'a [BranchRule]) -> Result<&'a BranchRule> {
    rules
        .iter()
        .find(|rule| rule.matches(branch_name))
        .ok_or_else(|| {
            SemrelError::config(format!(
                "No branch rule matches branch '{}'; add a catch-all rule such as '.+'",
                branch_name
            ))
        })
}
