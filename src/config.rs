use crate::analyzer::AggregationConfig;
use crate::domain::{BranchRule, BumpLevel, TagFormat};
use crate::engine::VersionOptions;
use crate::error::{Result, SemrelError};
use crate::history::HistoryOptions;
use crate::parser::{CommitParser, ParserKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the working directory and
/// in the user configuration directory
pub const CONFIG_FILE_NAME: &str = "semrel.toml";

/// Represents the complete configuration for semrel.
///
/// Contains the tag naming format, the commit classification scheme, branch
/// rules in evaluation order and changelog filtering.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    #[serde(default)]
    pub commit_parser: ParserKind,

    #[serde(default = "default_true")]
    pub major_on_zero: bool,

    #[serde(default = "default_true")]
    pub allow_zero_version: bool,

    #[serde(default)]
    pub commit_parser_options: CommitParserOptions,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// Branch rules keyed by rule name, evaluated in document order
    #[serde(default = "default_branches")]
    pub branches: IndexMap<String, BranchConfig>,
}

fn default_tag_format() -> String {
    "v{version}".to_string()
}

fn default_true() -> bool {
    true
}

fn default_prerelease_token() -> String {
    "rc".to_string()
}

/// Returns the default branch rules: releases from `main` or `master` only.
fn default_branches() -> IndexMap<String, BranchConfig> {
    let mut branches = IndexMap::new();
    branches.insert(
        "main".to_string(),
        BranchConfig {
            match_pattern: "(main|master)".to_string(),
            prerelease: false,
            prerelease_token: default_prerelease_token(),
        },
    );
    branches
}

/// Options shared by every commit classification scheme.
///
/// Tag lists left unset fall back to the active scheme's defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitParserOptions {
    #[serde(default)]
    pub allowed_tags: Option<Vec<String>>,

    #[serde(default)]
    pub major_tags: Option<Vec<String>>,

    #[serde(default)]
    pub minor_tags: Option<Vec<String>>,

    #[serde(default)]
    pub patch_tags: Option<Vec<String>>,

    /// Level for recognised tags that appear in no level list
    #[serde(default)]
    pub default_bump_level: Option<BumpLevel>,

    #[serde(default = "default_true")]
    pub parse_squash_commits: bool,

    #[serde(default = "default_true")]
    pub ignore_merge_commits: bool,
}

impl Default for CommitParserOptions {
    fn default() -> Self {
        CommitParserOptions {
            allowed_tags: None,
            major_tags: None,
            minor_tags: None,
            patch_tags: None,
            default_bump_level: None,
            parse_squash_commits: true,
            ignore_merge_commits: true,
        }
    }
}

/// Changelog entry filtering
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ChangelogConfig {
    /// Regular expressions matched against the raw commit subject
    #[serde(default)]
    pub exclude_commit_patterns: Vec<String>,
}

/// One `[branches.<name>]` table
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchConfig {
    #[serde(rename = "match")]
    pub match_pattern: String,

    #[serde(default)]
    pub prerelease: bool,

    #[serde(default = "default_prerelease_token")]
    pub prerelease_token: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tag_format: default_tag_format(),
            commit_parser: ParserKind::default(),
            major_on_zero: true,
            allow_zero_version: true,
            commit_parser_options: CommitParserOptions::default(),
            changelog: ChangelogConfig::default(),
            branches: default_branches(),
        }
    }
}

impl Config {
    /// Parse a TOML document and validate it
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)
            .map_err(|e| SemrelError::config(format!("Invalid configuration file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every regex, token and tag list; first problem wins
    pub fn validate(&self) -> Result<()> {
        self.tag_format()?;
        self.parser()?;
        self.branch_rules()?;
        self.aggregation_config()?;
        Ok(())
    }

    pub fn tag_format(&self) -> Result<TagFormat> {
        TagFormat::new(self.tag_format.as_str())
    }

    /// Compiled branch rules in evaluation order
    pub fn branch_rules(&self) -> Result<Vec<BranchRule>> {
        if self.branches.is_empty() {
            return Err(SemrelError::config("No branch rules configured"));
        }
        self.branches
            .iter()
            .map(|(name, branch)| {
                let token = branch.prerelease.then(|| branch.prerelease_token.clone());
                BranchRule::new(name, &branch.match_pattern, branch.prerelease, token)
            })
            .collect()
    }

    pub fn parser(&self) -> Result<CommitParser> {
        CommitParser::new(self.commit_parser, &self.commit_parser_options)
    }

    pub fn history_options(&self) -> HistoryOptions {
        HistoryOptions {
            ignore_merge_commits: self.commit_parser_options.ignore_merge_commits,
            parse_squash_commits: self.commit_parser_options.parse_squash_commits,
        }
    }

    pub fn aggregation_config(&self) -> Result<AggregationConfig> {
        AggregationConfig::new(
            self.changelog.exclude_commit_patterns.as_slice(),
            self.major_on_zero,
        )
    }

    pub fn version_options(&self) -> VersionOptions {
        VersionOptions {
            allow_zero_version: self.allow_zero_version,
            ..VersionOptions::default()
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `semrel.toml` in current directory
/// 3. `semrel.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded and validated, or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path).map_err(|e| {
            SemrelError::config(format!("Cannot read configuration file '{}': {}", path, e))
        })?
    } else if local.exists() {
        fs::read_to_string(&local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    Config::from_toml(&config_str)
}
