// tests/config_test.rs
use semrel::config::{load_config, Config, CONFIG_FILE_NAME};
use semrel::domain::BumpLevel;
use semrel::parser::ParserKind;
use semrel::SemrelError;
use serial_test::serial;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// Runs `f` with the working directory switched to `dir`
fn in_dir<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir).unwrap();
    let result = f();
    std::env::set_current_dir(original).unwrap();
    result
}

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.tag_format, "v{version}");
    assert_eq!(config.commit_parser, ParserKind::Conventional);
    assert_eq!(config.branches.len(), 1);
    assert_eq!(config.branches["main"].match_pattern, "(main|master)");
    assert!(!config.branches["main"].prerelease);
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
tag_format = "release-{version}"
commit_parser = "scipy"
allow_zero_version = false

[commit_parser_options]
minor_tags = ["ENH", "DEP"]
default_bump_level = "patch"
parse_squash_commits = false

[branches.main]
match = "main"

[branches.beta]
match = "beta/.+"
prerelease = true
prerelease_token = "beta"

[branches.everything]
match = ".+"
prerelease = true
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.tag_format, "release-{version}");
    assert_eq!(config.commit_parser, ParserKind::Scipy);
    assert!(!config.allow_zero_version);
    assert!(!config.history_options().parse_squash_commits);
    assert!(config.history_options().ignore_merge_commits);
    assert_eq!(
        config.commit_parser_options.default_bump_level,
        Some(BumpLevel::Patch)
    );

    // Document order is evaluation order
    let names: Vec<&str> = config.branches.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["main", "beta", "everything"]);

    let rules = config.branch_rules().unwrap();
    assert_eq!(rules[1].prerelease_token.as_deref(), Some("beta"));
    assert_eq!(rules[2].prerelease_token.as_deref(), Some("rc"));
    assert!(rules[0].prerelease_token.is_none());
}

#[test]
fn test_invalid_branch_regex_is_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[branches.main]\nmatch = \"(main\"\n")
        .unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, SemrelError::Config(_)));
}

#[test]
fn test_invalid_prerelease_token_is_config_error() {
    let result = Config::from_toml(
        r#"
[branches.dev]
match = "dev"
prerelease = true
prerelease_token = "not.valid"
"#,
    );
    assert!(matches!(result, Err(SemrelError::Config(_))));
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(load_config(Some(missing.to_str().unwrap())).is_err());
}

#[test]
#[serial]
fn test_load_from_working_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "tag_format = \"{version}\"\ncommit_parser = \"emoji\"\n",
    )
    .unwrap();

    let config = in_dir(dir.path(), || load_config(None)).unwrap();
    assert_eq!(config.tag_format, "{version}");
    assert_eq!(config.commit_parser, ParserKind::Emoji);
}

#[test]
#[serial]
fn test_explicit_path_wins_over_working_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "tag_format = \"{version}\"\n").unwrap();
    let explicit = dir.path().join("other.toml");
    std::fs::write(&explicit, "tag_format = \"x{version}\"\n").unwrap();

    let config = in_dir(dir.path(), || load_config(explicit.to_str())).unwrap();
    assert_eq!(config.tag_format, "x{version}");
}
