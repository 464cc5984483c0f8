use crate::config::CommitParserOptions;
use crate::domain::{BumpLevel, Classification};
use crate::error::{Result, SemrelError};
use crate::parser::{TagRules, TextRules};
use regex::Regex;

/// Scipy-style `TAG: subject` commits
#[derive(Debug, Clone)]
pub struct ScipyParser {
    tags: TagRules,
    header: Regex,
    text: TextRules,
}

impl ScipyParser {
    pub fn default_tags() -> TagRules {
        let list = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        TagRules {
            major: list(&["API"]),
            minor: list(&["DEP", "DEV", "ENH", "REV", "FEAT"]),
            patch: list(&["BLD", "BUG", "MAINT"]),
            other: list(&["BENCH", "DOC", "STY", "TST", "REL", "TEST"]),
            default_level: BumpLevel::None,
        }
    }

    pub fn new(options: &CommitParserOptions) -> Result<Self> {
        let tags = Self::default_tags().with_overrides(options)?;
        let pattern = format!(
            r"^(?P<tag>{})(?:\((?P<scope>[^\n)]+)\))?:\s*(?P<subject>.+)$",
            tags.alternation()
        );
        let header = Regex::new(&pattern)
            .map_err(|e| SemrelError::config(format!("Invalid scipy commit tags: {}", e)))?;

        Ok(ScipyParser {
            tags,
            header,
            text: TextRules::new()?,
        })
    }

    pub(crate) fn text(&self) -> &TextRules {
        &self.text
    }

    pub fn is_header(&self, line: &str) -> bool {
        self.header.is_match(line.trim())
    }

    pub fn parse(&self, hash: &str, message: &str) -> Classification {
        let (subject, body) = self.text.split(message);

        let Some(captures) = self.header.captures(subject) else {
            return Classification::unrecognized(hash, subject, "Unknown");
        };

        let tag = captures.name("tag").map_or("", |m| m.as_str());
        let scope = captures.name("scope").map(|m| m.as_str().trim().to_string());
        let description = captures.name("subject").map_or("", |m| m.as_str());

        let (long_description, breaking_description) = self.text.body_sections(body);
        let tag_level = self.tags.level_for(tag);
        let is_breaking = tag_level == BumpLevel::Major || breaking_description.is_some();
        let bump_level = if breaking_description.is_some() {
            BumpLevel::Major
        } else {
            tag_level
        };

        let (short_description, linked_merge_request) =
            self.text.split_linked_merge_request(description);

        Classification {
            bump_level,
            is_breaking,
            category: category_for(tag),
            commit_type: tag.to_string(),
            scope,
            short_description,
            long_description,
            breaking_description,
            linked_merge_request,
            exclude_from_changelog: false,
            commit_hash: hash.to_string(),
            raw_subject: subject.to_string(),
        }
    }
}

fn category_for(tag: &str) -> String {
    let category = match tag {
        "API" => "breaking",
        "BENCH" => "benchmarking",
        "BLD" => "build",
        "BUG" | "MAINT" => "fix",
        "DEP" => "deprecation",
        "DEV" => "development",
        "DOC" => "documentation",
        "ENH" | "FEAT" => "feature",
        "REV" => "other",
        "STY" => "style",
        "TST" | "TEST" => "test",
        "REL" => "release",
        other => other,
    };
    category.to_string()
}
