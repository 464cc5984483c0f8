use crate::domain::Version;
use crate::error::{Result, SemrelError};
use regex::Regex;

const VERSION_CAPTURE: &str = r"(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)";

/// Tag naming format (e.g. "v{version}", "release-{version}")
#[derive(Debug, Clone)]
pub struct TagFormat {
    pub format: String,
    matcher: Regex,
}

impl TagFormat {
    /// Compile a format; it must contain the `{version}` placeholder exactly once
    pub fn new(format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        if format.matches("{version}").count() != 1 {
            return Err(SemrelError::config(format!(
                "Tag format '{}' must contain the {{version}} placeholder exactly once",
                format
            )));
        }

        let escaped = regex::escape(&format);
        let pattern = escaped.replace(r"\{version\}", VERSION_CAPTURE);
        let matcher = Regex::new(&format!("^{}$", pattern))
            .map_err(|e| SemrelError::config(format!("Invalid tag format '{}': {}", format, e)))?;

        Ok(TagFormat { format, matcher })
    }

    /// Tag name for a version
    /// Example: format="v{version}", version=1.2.3 -> "v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        self.format.replace("{version}", &version.to_string())
    }

    /// Extract the version from a tag name
    ///
    /// Returns `Ok(None)` for tags that do not follow the format at all and an
    /// error for tags that follow it but carry an invalid version.
    pub fn parse(&self, tag: &str) -> Result<Option<Version>> {
        let Some(captures) = self.matcher.captures(tag) else {
            return Ok(None);
        };
        match captures.get(1) {
            Some(m) => Version::parse(m.as_str()).map(Some),
            None => Ok(None),
        }
    }
}
