//! Splitting squash-merge messages back into their logical commits
//!
//! Three layouts are recognised:
//! - git's own `Squashed commit of the following:` listing, split on its
//!   `commit <sha>` lines
//! - hosting-platform bullet lists (`* feat: ...`), optionally preceded by a
//!   pull request title or a `Merged in <branch> (pull request #N)` line
//! - plain multi-header messages
//!
//! Outside git's listing a block starts at any line that, once a leading
//! bullet is removed, satisfies the caller's header rule.

const GIT_SQUASH_PREAMBLE: &str = "Squashed commit of the following:";

fn is_git_commit_line(line: &str) -> bool {
    line.trim_end()
        .strip_prefix("commit ")
        .is_some_and(|sha| (7..=64).contains(&sha.len()) && sha.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Split `message` into the messages of the commits it embeds.
///
/// Blocks come back in their original top-to-bottom order. A message embeds
/// commits when it holds two or more blocks, or when its subject is a
/// preamble (a pull request title, git's listing header) followed by at least
/// one block; the preamble is dropped. Any other message is returned as a
/// single-element list holding the message unchanged.
pub fn unsquash<F>(message: &str, is_header: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let (blocks, has_preamble) = if message.trim_start().starts_with(GIT_SQUASH_PREAMBLE) {
        (split_git_listing(message), true)
    } else {
        let subject = message.trim_start().lines().next().unwrap_or("");
        (
            split_on_headers(message, &is_header),
            !is_header(strip_bullet(subject)),
        )
    };

    if blocks.len() >= 2 || (has_preamble && !blocks.is_empty()) {
        blocks
    } else {
        vec![message.to_string()]
    }
}

fn split_git_listing(message: &str) -> Vec<String> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut in_header = false;

    let listing = message
        .lines()
        .skip_while(|l| !l.trim_start().starts_with(GIT_SQUASH_PREAMBLE))
        .skip(1);

    for line in listing {
        if is_git_commit_line(line) {
            blocks.push(Vec::new());
            in_header = true;
            continue;
        }
        let Some(current) = blocks.last_mut() else {
            continue;
        };
        if in_header {
            if ["Author:", "Date:", "Merge:"]
                .iter()
                .any(|field| line.starts_with(field))
            {
                continue;
            }
            if line.trim().is_empty() {
                in_header = false;
                continue;
            }
            in_header = false;
        }
        current.push(line.strip_prefix("    ").unwrap_or(line));
    }

    blocks
        .into_iter()
        .map(|lines| lines.join("\n").trim().to_string())
        .filter(|block| !block.is_empty())
        .collect()
}

fn split_on_headers<F>(message: &str, is_header: &F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut blocks: Vec<Vec<&str>> = Vec::new();

    for line in message.lines() {
        let candidate = strip_bullet(line);
        if is_header(candidate) {
            blocks.push(vec![candidate]);
        } else if let Some(current) = blocks.last_mut() {
            current.push(line.trim());
        }
    }

    blocks
        .into_iter()
        .map(|lines| lines.join("\n").trim().to_string())
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix("* ")
        .or_else(|| trimmed.strip_prefix("- "))
        .unwrap_or(trimmed)
        .trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conventional_header(line: &str) -> bool {
        ["feat", "fix", "docs"]
            .iter()
            .any(|t| line.starts_with(&format!("{}:", t)) || line.starts_with(&format!("{}(", t)))
    }

    #[test]
    fn test_single_commit_is_untouched() {
        let msg = "feat: add thing\n\nsome body";
        assert_eq!(unsquash(msg, conventional_header), vec![msg.to_string()]);
    }

    #[test]
    fn test_git_squash_listing() {
        let msg = "Squashed commit of the following:\n\n\
commit 1234567890abcdef1234567890abcdef12345678\n\
Author: someone <a@b.c>\n\
Date:   Mon Jan 1 00:00:00 2024 +0000\n\
\n    feat: first thing\n\n    details of first\n\n\
commit abcdef1234567890abcdef1234567890abcdef12\n\
Author: someone <a@b.c>\n\
Date:   Mon Jan 1 00:00:00 2024 +0000\n\
\n    fix: second thing\n";

        let blocks = unsquash(msg, conventional_header);
        assert_eq!(
            blocks,
            vec![
                "feat: first thing\n\ndetails of first".to_string(),
                "fix: second thing".to_string()
            ]
        );
    }

    #[test]
    fn test_github_bullets_keep_order() {
        let msg = "feat(api): add endpoints (#12)\n\n* feat: one\n\n* fix: two\n\n* docs: three\n";
        let blocks = unsquash(msg, conventional_header);
        assert_eq!(
            blocks,
            vec![
                "feat(api): add endpoints (#12)".to_string(),
                "feat: one".to_string(),
                "fix: two".to_string(),
                "docs: three".to_string()
            ]
        );
    }

    #[test]
    fn test_bitbucket_preamble_is_dropped() {
        let msg = "Merged in feature/x  (pull request #5)\n\nAdd stuff\n\n* feat: one\n\n* fix: two\n";
        let blocks = unsquash(msg, conventional_header);
        assert_eq!(blocks, vec!["feat: one".to_string(), "fix: two".to_string()]);
    }

    #[test]
    fn test_single_embedded_commit_behind_pr_title() {
        let msg = "Widget work (#12)\n\n* feat: two\n";
        assert_eq!(unsquash(msg, conventional_header), vec!["feat: two".to_string()]);
    }

    #[test]
    fn test_single_embedded_commit_behind_bitbucket_preamble() {
        let msg = "Merged in feature/x  (pull request #5)\n\nAdd stuff\n\n* feat: one\n";
        assert_eq!(unsquash(msg, conventional_header), vec!["feat: one".to_string()]);
    }

    #[test]
    fn test_git_listing_with_one_commit() {
        let msg = "Squashed commit of the following:\n\n\
commit 1234567890abcdef1234567890abcdef12345678\n\
Author: someone <a@b.c>\n\
Date:   Mon Jan 1 00:00:00 2024 +0000\n\
\n    fix: only thing\n";
        assert_eq!(unsquash(msg, conventional_header), vec!["fix: only thing".to_string()]);
    }

    #[test]
    fn test_plain_message_without_headers_is_untouched() {
        let msg = "Update README\n\nmore words here";
        assert_eq!(unsquash(msg, conventional_header), vec![msg.to_string()]);
    }

    #[test]
    fn test_body_lines_stay_with_their_block() {
        let msg = "* feat: one\n  more about one\n* fix: two";
        let blocks = unsquash(msg, conventional_header);
        assert_eq!(blocks[0], "feat: one\nmore about one");
        assert_eq!(blocks[1], "fix: two");
    }
}
