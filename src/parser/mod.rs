//! Commit classification schemes
//!
//! Every scheme is a pure function from one commit message to its
//! classifications. The active scheme is picked once per run from
//! configuration and carried around as a [`CommitParser`] value; adding a
//! scheme means adding a variant here.
//!
//! - [`ConventionalParser`]: `type(scope)!: subject` headers with
//!   `BREAKING CHANGE:` footers
//! - [`EmojiParser`]: best-effort gitmoji detection anywhere in the subject
//! - [`ScipyParser`]: `TAG(scope): subject` headers using the scipy tag set

pub mod conventional;
pub mod emoji;
pub mod scipy;
pub mod squash;

pub use conventional::ConventionalParser;
pub use emoji::EmojiParser;
pub use scipy::ScipyParser;

use crate::config::CommitParserOptions;
use crate::domain::{BumpLevel, Classification, CommitRecord};
use crate::error::{Result, SemrelError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which classification scheme a run uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    #[default]
    Conventional,
    Emoji,
    Scipy,
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserKind::Conventional => "conventional",
            ParserKind::Emoji => "emoji",
            ParserKind::Scipy => "scipy",
        };
        f.write_str(name)
    }
}

/// The configured classification scheme
#[derive(Debug, Clone)]
pub enum CommitParser {
    Conventional(ConventionalParser),
    Emoji(EmojiParser),
    Scipy(ScipyParser),
}

impl CommitParser {
    /// Build the scheme selected by `kind`, applying tag overrides from `options`
    pub fn new(kind: ParserKind, options: &CommitParserOptions) -> Result<Self> {
        Ok(match kind {
            ParserKind::Conventional => CommitParser::Conventional(ConventionalParser::new(options)?),
            ParserKind::Emoji => CommitParser::Emoji(EmojiParser::new(options)?),
            ParserKind::Scipy => CommitParser::Scipy(ScipyParser::new(options)?),
        })
    }

    pub fn kind(&self) -> ParserKind {
        match self {
            CommitParser::Conventional(_) => ParserKind::Conventional,
            CommitParser::Emoji(_) => ParserKind::Emoji,
            CommitParser::Scipy(_) => ParserKind::Scipy,
        }
    }

    /// Classify one commit record
    ///
    /// Yields nothing for an empty message and exactly one classification
    /// otherwise; squash containers are split by the history walker before
    /// they get here. A block split off a container falls back to the
    /// container's merge request when it names none itself.
    pub fn classify(&self, commit: &CommitRecord) -> Vec<Classification> {
        let mut classifications = self.classify_with_hash(&commit.hash, &commit.message);
        if let Some(reference) = &commit.inherited_merge_request {
            for c in classifications
                .iter_mut()
                .filter(|c| c.linked_merge_request.is_none())
            {
                c.linked_merge_request = Some(reference.clone());
            }
        }
        classifications
    }

    /// Classify a raw message that is not attached to a commit
    pub fn classify_message(&self, message: &str) -> Vec<Classification> {
        self.classify_with_hash("", message)
    }

    fn classify_with_hash(&self, hash: &str, message: &str) -> Vec<Classification> {
        let message = message.trim();
        if message.is_empty() {
            return Vec::new();
        }
        let classification = match self {
            CommitParser::Conventional(p) => p.parse(hash, message),
            CommitParser::Emoji(p) => p.parse(hash, message),
            CommitParser::Scipy(p) => p.parse(hash, message),
        };
        vec![classification]
    }

    /// Whether a single line opens a commit message in this scheme
    pub fn is_header(&self, line: &str) -> bool {
        match self {
            CommitParser::Conventional(p) => p.is_header(line),
            CommitParser::Emoji(p) => p.is_header(line),
            CommitParser::Scipy(p) => p.is_header(line),
        }
    }

    /// Split a squash container into its embedded messages using this
    /// scheme's header rule
    pub fn unsquash(&self, message: &str) -> Vec<String> {
        squash::unsquash(message, |line| self.is_header(line))
    }

    /// Merge request a squash container's subject line points at
    pub fn container_merge_request(&self, subject: &str) -> Option<String> {
        self.text().merge_request_reference(subject)
    }

    fn text(&self) -> &TextRules {
        match self {
            CommitParser::Conventional(p) => p.text(),
            CommitParser::Emoji(p) => p.text(),
            CommitParser::Scipy(p) => p.text(),
        }
    }
}

/// Tag lists driving the bump level of a scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRules {
    pub major: Vec<String>,
    pub minor: Vec<String>,
    pub patch: Vec<String>,
    /// Recognised tags that do not move the version by themselves
    pub other: Vec<String>,
    pub default_level: BumpLevel,
}

impl TagRules {
    /// Overlay user-configured lists on top of a scheme's defaults.
    ///
    /// `allowed_tags` replaces the full recognised set: tags it omits are
    /// removed from the level lists too.
    pub fn with_overrides(mut self, options: &CommitParserOptions) -> Result<Self> {
        if let Some(major) = &options.major_tags {
            self.major = major.clone();
        }
        if let Some(minor) = &options.minor_tags {
            self.minor = minor.clone();
        }
        if let Some(patch) = &options.patch_tags {
            self.patch = patch.clone();
        }
        if let Some(default_level) = options.default_bump_level {
            self.default_level = default_level;
        }
        if let Some(allowed) = &options.allowed_tags {
            self.major.retain(|t| allowed.contains(t));
            self.minor.retain(|t| allowed.contains(t));
            self.patch.retain(|t| allowed.contains(t));
            self.other = allowed
                .iter()
                .filter(|t| {
                    !self.major.contains(t) && !self.minor.contains(t) && !self.patch.contains(t)
                })
                .cloned()
                .collect();
        }

        if self.declaration_order().is_empty() {
            return Err(SemrelError::config(
                "Commit parser options leave no recognised commit tags",
            ));
        }
        if let Some(empty) = self.declaration_order().into_iter().find(|t| t.trim().is_empty()) {
            return Err(SemrelError::config(format!(
                "Commit parser tag list contains an empty tag: '{}'",
                empty
            )));
        }
        Ok(self)
    }

    /// Level implied by a recognised tag
    pub fn level_for(&self, tag: &str) -> BumpLevel {
        let has = |list: &[String]| list.iter().any(|t| t == tag);
        if has(&self.major) {
            BumpLevel::Major
        } else if has(&self.minor) {
            BumpLevel::Minor
        } else if has(&self.patch) {
            BumpLevel::Patch
        } else {
            self.default_level
        }
    }

    /// Every recognised tag, strongest list first, without duplicates
    pub fn declaration_order(&self) -> Vec<&str> {
        let mut ordered: Vec<&str> = Vec::new();
        for tag in self
            .major
            .iter()
            .chain(&self.minor)
            .chain(&self.patch)
            .chain(&self.other)
        {
            if !ordered.contains(&tag.as_str()) {
                ordered.push(tag);
            }
        }
        ordered
    }

    /// Regex alternation of every recognised tag, longest first so that a tag
    /// never shadows a longer one sharing its prefix
    pub(crate) fn alternation(&self) -> String {
        let mut tags = self.declaration_order();
        tags.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        tags.iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Body and subject rules shared by all schemes
#[derive(Debug, Clone)]
pub(crate) struct TextRules {
    breaking_footer: Regex,
    linked_merge_request: Regex,
    pull_request: Regex,
}

impl TextRules {
    pub(crate) fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| SemrelError::config(format!("Invalid built-in pattern: {}", e)))
        };
        Ok(TextRules {
            breaking_footer: compile(r"(?m)^BREAKING[ -]CHANGE:[ \t]*")?,
            linked_merge_request: compile(r"[\t ]+\((?P<mr>[#!]\d+)\)[\t ]*$")?,
            pull_request: compile(r"\(pull request #(?P<number>\d+)\)[\t ]*$")?,
        })
    }

    /// Subject line and optional body of a trimmed message
    pub(crate) fn split<'m>(&self, message: &'m str) -> (&'m str, Option<&'m str>) {
        match message.split_once('\n') {
            Some((subject, rest)) => {
                let rest = rest.trim();
                (subject.trim(), (!rest.is_empty()).then_some(rest))
            }
            None => (message.trim(), None),
        }
    }

    /// Separate body paragraphs into (long description, breaking description)
    pub(crate) fn body_sections(&self, body: Option<&str>) -> (Option<String>, Option<String>) {
        let Some(body) = body else {
            return (None, None);
        };

        let mut descriptions = Vec::new();
        let mut breaking = Vec::new();
        for paragraph in body.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            match self.breaking_footer.find(paragraph) {
                Some(marker) => {
                    let before = paragraph[..marker.start()].trim();
                    if !before.is_empty() {
                        descriptions.push(before.to_string());
                    }
                    breaking.push(paragraph[marker.end()..].trim().to_string());
                }
                None => descriptions.push(paragraph.to_string()),
            }
        }

        let join = |parts: Vec<String>| (!parts.is_empty()).then(|| parts.join("\n\n"));
        (join(descriptions), join(breaking))
    }

    /// `#123` / `!45` from a subject ending in `(#123)`, `(!45)` or
    /// BitBucket's `(pull request #123)`
    pub(crate) fn merge_request_reference(&self, subject: &str) -> Option<String> {
        self.split_linked_merge_request(subject).1.or_else(|| {
            self.pull_request
                .captures(subject)
                .and_then(|caps| caps.name("number"))
                .map(|number| format!("#{}", number.as_str()))
        })
    }

    /// Strip a trailing `(#123)` / `(!45)` reference from a subject
    pub(crate) fn split_linked_merge_request(&self, subject: &str) -> (String, Option<String>) {
        match self.linked_merge_request.captures(subject) {
            Some(caps) => {
                let start = caps.get(0).map_or(subject.len(), |m| m.start());
                (
                    subject[..start].trim_end().to_string(),
                    caps.name("mr").map(|m| m.as_str().to_string()),
                )
            }
            None => (subject.to_string(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(kind: ParserKind) -> CommitParser {
        CommitParser::new(kind, &CommitParserOptions::default()).unwrap()
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [ParserKind::Conventional, ParserKind::Emoji, ParserKind::Scipy] {
            assert_eq!(parser(kind).kind(), kind);
        }
    }

    #[test]
    fn test_empty_message_yields_nothing() {
        assert!(parser(ParserKind::Conventional)
            .classify_message("   \n")
            .is_empty());
    }

    #[test]
    fn test_classify_uses_commit_hash() {
        let commit = CommitRecord::new("deadbeef", "fix: crash on start");
        let result = parser(ParserKind::Conventional).classify(&commit);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].commit_hash, "deadbeef");
        assert_eq!(result[0].bump_level, BumpLevel::Patch);
    }

    #[test]
    fn test_unsquash_uses_scheme_headers() {
        let msg = "Big change (#4)\n\n* feat: one\n\n* fix: two";
        let parts = parser(ParserKind::Conventional).unsquash(msg);
        assert_eq!(parts, vec!["feat: one".to_string(), "fix: two".to_string()]);

        let scipy_parts = parser(ParserKind::Scipy).unsquash(msg);
        assert_eq!(scipy_parts, vec![msg.to_string()]);
    }

    #[test]
    fn test_tag_rules_overrides() {
        let defaults = TagRules {
            major: vec![],
            minor: vec!["feat".into()],
            patch: vec!["fix".into(), "perf".into()],
            other: vec!["docs".into()],
            default_level: BumpLevel::None,
        };
        let options = CommitParserOptions {
            allowed_tags: Some(vec!["feat".into(), "fix".into(), "chore".into()]),
            patch_tags: Some(vec!["fix".into(), "perf".into(), "chore".into()]),
            ..CommitParserOptions::default()
        };
        let rules = defaults.with_overrides(&options).unwrap();
        assert_eq!(rules.level_for("chore"), BumpLevel::Patch);
        assert_eq!(rules.declaration_order(), vec!["feat", "fix", "chore"]);
    }

    #[test]
    fn test_tag_rules_rejects_empty_set() {
        let defaults = TagRules {
            major: vec![],
            minor: vec!["feat".into()],
            patch: vec![],
            other: vec![],
            default_level: BumpLevel::None,
        };
        let options = CommitParserOptions {
            allowed_tags: Some(vec![]),
            ..CommitParserOptions::default()
        };
        assert!(defaults.with_overrides(&options).is_err());
    }

    #[test]
    fn test_body_sections() {
        let rules = TextRules::new().unwrap();
        let (long, breaking) = rules.body_sections(Some(
            "first paragraph\n\nBREAKING CHANGE: api gone\nreally gone\n\nlast words",
        ));
        assert_eq!(long.as_deref(), Some("first paragraph\n\nlast words"));
        assert_eq!(breaking.as_deref(), Some("api gone\nreally gone"));
    }

    #[test]
    fn test_linked_merge_request() {
        let rules = TextRules::new().unwrap();
        assert_eq!(
            rules.split_linked_merge_request("add thing (#42)"),
            ("add thing".to_string(), Some("#42".to_string()))
        );
        assert_eq!(
            rules.split_linked_merge_request("add thing (!7) "),
            ("add thing".to_string(), Some("!7".to_string()))
        );
        assert_eq!(
            rules.split_linked_merge_request("add thing"),
            ("add thing".to_string(), None)
        );
    }

    #[test]
    fn test_container_merge_request() {
        let parser = parser(ParserKind::Conventional);
        assert_eq!(
            parser.container_merge_request("Widget work (#12)").as_deref(),
            Some("#12")
        );
        assert_eq!(
            parser
                .container_merge_request("Merged in feature/x  (pull request #5)")
                .as_deref(),
            Some("#5")
        );
        assert_eq!(parser.container_merge_request("Squashed commit of the following:"), None);
    }

    #[test]
    fn test_split_block_inherits_container_merge_request() {
        let parser = parser(ParserKind::Conventional);
        let container = CommitRecord::new("abc", "Widget work (#12)");

        let plain = container.split_off("feat: two", Some("#12".to_string()));
        assert_eq!(
            parser.classify(&plain)[0].linked_merge_request.as_deref(),
            Some("#12")
        );

        let own = container.split_off("fix: one (#9)", Some("#12".to_string()));
        assert_eq!(
            parser.classify(&own)[0].linked_merge_request.as_deref(),
            Some("#9")
        );
    }

    #[test]
    fn test_emoji_unsquash() {
        let msg = "Widget work (#12)\n\n* :sparkles: add widget\n\n* :bug: fix colour";
        let parts = parser(ParserKind::Emoji).unsquash(msg);
        assert_eq!(
            parts,
            vec![":sparkles: add widget".to_string(), ":bug: fix colour".to_string()]
        );

        let single = "Widget work (#12)\n\n* :sparkles: add widget";
        assert_eq!(
            parser(ParserKind::Emoji).unsquash(single),
            vec![":sparkles: add widget".to_string()]
        );
    }
}
