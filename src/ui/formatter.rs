//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.
//! `format_*` functions build the text, `display_*` functions print it.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::domain::{BranchRule, Classification, Version};
use crate::engine::NoReleaseReason;
use crate::pipeline::Release;

/// Entries shown before the list is cut short
const MAX_LISTED_ENTRIES: usize = 10;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Summary of a resolved release: version change, level and rule.
///
/// Shows either:
/// - If a release exists: "From: old -> To: new"
/// - Otherwise: "Initial release: new"
pub fn format_release(release: &Release) -> String {
    let mut out = String::new();
    match &release.previous {
        Some(previous) => {
            out.push_str(&format!("{}\n", style("Next version:").bold()));
            out.push_str(&format!("  From: {}\n", style(previous).red()));
            out.push_str(&format!("  To:   {}\n", style(&release.version).green()));
        }
        None => {
            out.push_str(&format!("{}\n", style("Initial release:").bold()));
            out.push_str(&format!("  Version: {}\n", style(&release.version).green()));
        }
    }
    out.push_str(&format!("  Tag:   {}\n", release.tag));
    out.push_str(&format!(
        "  Bump:  {} (branch rule '{}')\n",
        release.level, release.rule
    ));
    out.push_str(&format_entries(&release.entries));
    out
}

pub fn display_release(release: &Release) {
    eprint!("{}", format_release(release));
}

/// Changelog preview grouped by category, categories in order of first
/// appearance.
///
/// Shows up to 10 entries; if more exist, displays the count of the rest.
pub fn format_entries(entries: &[Classification]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut categories: Vec<&str> = Vec::new();
    for entry in entries {
        if !categories.contains(&entry.category.as_str()) {
            categories.push(&entry.category);
        }
    }

    let mut out = format!("\n{}\n", style("Changes:").underlined());
    let mut listed = 0;
    for category in categories {
        if listed >= MAX_LISTED_ENTRIES {
            break;
        }
        out.push_str(&format!("  {}\n", style(category).bold()));
        for entry in entries.iter().filter(|e| e.category == category) {
            if listed >= MAX_LISTED_ENTRIES {
                break;
            }
            out.push_str(&format!("    - {}\n", describe(entry)));
            listed += 1;
        }
    }
    if entries.len() > listed {
        out.push_str(&format!("  ... and {} more\n", entries.len() - listed));
    }
    out
}

fn describe(entry: &Classification) -> String {
    let mut text = match &entry.scope {
        Some(scope) => format!("{}: {}", style(scope).cyan(), entry.short_description),
        None => entry.short_description.clone(),
    };
    if entry.is_breaking {
        text.push_str(&format!(" {}", style("[breaking]").red()));
    }
    if let Some(mr) = &entry.linked_merge_request {
        text.push_str(&format!(" ({})", mr));
    }
    text
}

pub fn format_no_release(reason: NoReleaseReason, current: Option<&Version>) -> String {
    match current {
        Some(version) => format!("No release needed: {} (current: {})", reason, version),
        None => format!("No release needed: {}", reason),
    }
}

/// One block per classification of a single message.
pub fn format_classifications(classifications: &[Classification]) -> String {
    if classifications.is_empty() {
        return "No classifications (empty message)\n".to_string();
    }
    let mut out = String::new();
    for c in classifications {
        out.push_str(&format!("{}\n", style(&c.raw_subject).bold()));
        out.push_str(&format!("  bump level:  {}\n", c.bump_level));
        out.push_str(&format!("  category:    {}\n", c.category));
        out.push_str(&format!("  type:        {}\n", c.commit_type));
        if let Some(scope) = &c.scope {
            out.push_str(&format!("  scope:       {}\n", scope));
        }
        out.push_str(&format!("  breaking:    {}\n", c.is_breaking));
        if let Some(breaking) = &c.breaking_description {
            out.push_str(&format!("  breaking change: {}\n", breaking));
        }
        if let Some(mr) = &c.linked_merge_request {
            out.push_str(&format!("  linked merge request: {}\n", mr));
        }
        out.push_str(&format!(
            "  changelog:   {}\n",
            if c.exclude_from_changelog {
                "excluded"
            } else {
                "included"
            }
        ));
    }
    out
}

/// Display branch rules in evaluation order.
pub fn format_branch_rules(rules: &[BranchRule]) -> String {
    let mut out = format!("{}\n", style("Branch rules (first match wins):").bold());
    for (i, rule) in rules.iter().enumerate() {
        let kind = match &rule.prerelease_token {
            Some(token) if rule.is_prerelease => format!("prerelease '{}'", token),
            _ => "release".to_string(),
        };
        out.push_str(&format!(
            "  {}. {} /{}/ -> {}\n",
            i + 1,
            rule.name,
            rule.pattern,
            kind
        ));
    }
    out
}
