use crate::config::CommitParserOptions;
use crate::domain::{BumpLevel, Classification};
use crate::error::{Result, SemrelError};
use crate::parser::{TagRules, TextRules};
use regex::Regex;
use tracing::debug;

/// Conventional commits: `type(scope)!: subject` plus `BREAKING CHANGE:` footers
#[derive(Debug, Clone)]
pub struct ConventionalParser {
    tags: TagRules,
    header: Regex,
    text: TextRules,
}

impl ConventionalParser {
    pub fn default_tags() -> TagRules {
        let list = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        TagRules {
            major: Vec::new(),
            minor: list(&["feat"]),
            patch: list(&["fix", "perf"]),
            other: list(&[
                "build", "chore", "ci", "docs", "style", "refactor", "test", "revert",
            ]),
            default_level: BumpLevel::None,
        }
    }

    pub fn new(options: &CommitParserOptions) -> Result<Self> {
        let tags = Self::default_tags().with_overrides(options)?;
        let pattern = format!(
            r"^(?P<type>{})(?:\((?P<scope>[^\n)]+)\))?(?P<breaking>!)?:\s+(?P<subject>.+)$",
            tags.alternation()
        );
        let header = Regex::new(&pattern).map_err(|e| {
            SemrelError::config(format!("Invalid conventional commit tags: {}", e))
        })?;

        Ok(ConventionalParser {
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

    /// Classify a trimmed, non-empty message
    pub fn parse(&self, hash: &str, message: &str) -> Classification {
        let (subject, body) = self.text.split(message);

        let Some(captures) = self.header.captures(subject) else {
            return Classification::unrecognized(hash, subject, "unknown");
        };

        let commit_type = captures.name("type").map_or("", |m| m.as_str());
        let scope = captures.name("scope").map(|m| m.as_str().trim().to_string());
        let has_bang = captures.name("breaking").is_some();
        let description = captures.name("subject").map_or("", |m| m.as_str());

        let (long_description, breaking_description) = self.text.body_sections(body);
        let is_breaking = has_bang || breaking_description.is_some();

        let type_level = self.tags.level_for(commit_type);
        let bump_level = if is_breaking {
            if type_level != BumpLevel::Major {
                debug!(
                    commit = hash,
                    commit_type, "breaking-change marker overrides the type's bump level"
                );
            }
            BumpLevel::Major
        } else {
            type_level
        };

        let (short_description, linked_merge_request) =
            self.text.split_linked_merge_request(description);

        Classification {
            bump_level,
            is_breaking,
            category: category_for(commit_type),
            commit_type: commit_type.to_string(),
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

/// Changelog section for a conventional commit type
fn category_for(commit_type: &str) -> String {
    let section = match commit_type {
        "feat" => "features",
        "fix" => "bug fixes",
        "perf" => "performance improvements",
        "build" => "build system",
        "chore" => "chores",
        "ci" => "continuous integration",
        "docs" => "documentation",
        "style" => "code style",
        "refactor" => "refactoring",
        "test" => "testing",
        "revert" => "reverts",
        other => other,
    };
    section.to_string()
}
