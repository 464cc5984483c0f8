use crate::config::CommitParserOptions;
use crate::domain::{BumpLevel, Classification};
use crate::error::Result;
use crate::parser::{TagRules, TextRules};
use tracing::debug;

/// Gitmoji detection, best effort: any configured emoji found in the
/// subject counts, the strongest one decides the level
#[derive(Debug, Clone)]
pub struct EmojiParser {
    tags: TagRules,
    text: TextRules,
}

impl EmojiParser {
    pub fn default_tags() -> TagRules {
        let list = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        TagRules {
            major: list(&[":boom:"]),
            minor: list(&[
                ":sparkles:",
                ":children_crossing:",
                ":lipstick:",
                ":iphone:",
                ":egg:",
                ":chart_with_upwards_trend:",
            ]),
            patch: list(&[
                ":ambulance:",
                ":lock:",
                ":bug:",
                ":zap:",
                ":goal_net:",
                ":alien:",
                ":wheelchair:",
                ":speech_balloon:",
                ":mag:",
                ":apple:",
                ":penguin:",
                ":checkered_flag:",
                ":robot:",
                ":green_apple:",
            ]),
            other: list(&[
                ":memo:",
                ":art:",
                ":fire:",
                ":white_check_mark:",
                ":recycle:",
                ":construction:",
                ":arrow_up:",
                ":arrow_down:",
                ":wrench:",
            ]),
            default_level: BumpLevel::None,
        }
    }

    pub fn new(options: &CommitParserOptions) -> Result<Self> {
        Ok(EmojiParser {
            tags: Self::default_tags().with_overrides(options)?,
            text: TextRules::new()?,
        })
    }

    pub(crate) fn text(&self) -> &TextRules {
        &self.text
    }

    pub fn is_header(&self, line: &str) -> bool {
        let line = line.trim();
        self.tags
            .declaration_order()
            .iter()
            .any(|tag| line.starts_with(tag))
    }

    pub fn parse(&self, hash: &str, message: &str) -> Classification {
        let (subject, body) = self.text.split(message);

        // Strongest level wins, declaration order breaks ties
        let mut found: Vec<(&str, BumpLevel)> = self
            .tags
            .declaration_order()
            .into_iter()
            .filter(|tag| subject.contains(tag))
            .map(|tag| (tag, self.tags.level_for(tag)))
            .collect();

        if found.is_empty() {
            return Classification::unrecognized(hash, subject, "Other");
        }
        if found.len() > 1 {
            debug!(
                commit = hash,
                emojis = ?found.iter().map(|(t, _)| *t).collect::<Vec<_>>(),
                "several gitmoji in one subject, keeping the strongest"
            );
        }

        // Stable sort keeps declaration order among equal levels
        found.sort_by(|a, b| b.1.cmp(&a.1));
        let (emoji, tag_level) = found[0];

        let (long_description, breaking_description) = self.text.body_sections(body);
        let is_breaking = tag_level == BumpLevel::Major || breaking_description.is_some();
        let bump_level = if breaking_description.is_some() {
            BumpLevel::Major
        } else {
            tag_level
        };

        let (short_description, linked_merge_request) =
            self.text.split_linked_merge_request(subject);

        Classification {
            bump_level,
            is_breaking,
            category: emoji.to_string(),
            commit_type: emoji.to_string(),
            scope: None,
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
