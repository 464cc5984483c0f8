use crate::domain::BumpLevel;

/// Result of classifying one logical commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub bump_level: BumpLevel,
    pub is_breaking: bool,
    /// Scheme-defined section name, e.g. "features"
    pub category: String,
    /// The commit type or tag as written, e.g. "feat", "BUG", ":sparkles:"
    pub commit_type: String,
    pub scope: Option<String>,
    pub short_description: String,
    pub long_description: Option<String>,
    pub breaking_description: Option<String>,
    /// Merge/pull request reference such as `#123` or `!45`
    pub linked_merge_request: Option<String>,
    pub exclude_from_changelog: bool,
    /// Hash of the commit this came from
    pub commit_hash: String,
    /// First line of the (possibly unsquashed) message
    pub raw_subject: String,
}

impl Classification {
    /// Classification for a message no pattern recognises
    pub fn unrecognized(
        commit_hash: impl Into<String>,
        subject: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let subject = subject.into();
        Classification {
            bump_level: BumpLevel::None,
            is_breaking: false,
            category: category.into(),
            commit_type: "unknown".to_string(),
            scope: None,
            short_description: subject.clone(),
            long_description: None,
            breaking_description: None,
            linked_merge_request: None,
            exclude_from_changelog: true,
            commit_hash: commit_hash.into(),
            raw_subject: subject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_defaults() {
        let c = Classification::unrecognized("abc", "Updated stuff", "Unknown");
        assert_eq!(c.bump_level, BumpLevel::None);
        assert!(c.exclude_from_changelog);
        assert!(!c.is_breaking);
        assert_eq!(c.short_description, "Updated stuff");
        assert_eq!(c.raw_subject, "Updated stuff");
    }
}
