//! Main workflow orchestration logic
//!
//! Keeps CLI argument parsing (in `main.rs`) apart from the resolution
//! workflow, so the workflow can be driven programmatically and tested
//! against any [`Repository`].

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::BumpLevel;
use crate::git::{Git2Repository, Repository};
use crate::pipeline::{resolve_next_version, ReleaseOutcome, ResolveRequest};
use crate::ui;

/// Arguments for the version workflow
///
/// Mirrors the CLI flags in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionWorkflowArgs {
    /// Directory inside the repository
    pub repo_path: PathBuf,

    /// Branch name used for rule matching; defaults to the checked-out branch
    pub branch: Option<String>,

    /// Tag or revision the commit range starts after; defaults to the last
    /// final release reachable from HEAD
    pub from: Option<String>,

    /// Bump level replacing the one derived from commits
    pub forced_level: Option<BumpLevel>,

    /// Cut a prerelease even on a release branch
    pub as_prerelease: bool,

    pub prerelease_token: Option<String>,

    /// Create a lightweight tag for the new version at HEAD
    pub create_tag: bool,

    /// Skip confirmation prompts
    pub assume_yes: bool,
}

impl Default for VersionWorkflowArgs {
    fn default() -> Self {
        VersionWorkflowArgs {
            repo_path: PathBuf::from("."),
            branch: None,
            from: None,
            forced_level: None,
            as_prerelease: false,
            prerelease_token: None,
            create_tag: false,
            assume_yes: false,
        }
    }
}

/// Result of a successful version workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub outcome: ReleaseOutcome,

    /// Non-fatal findings to show the user
    pub warnings: Vec<BoundaryWarning>,

    /// The branch whose rule was applied
    pub branch: String,

    /// The tag that was created, if any
    pub tag_created: Option<String>,
}

/// Version workflow against the repository at `args.repo_path`
pub fn run_version_workflow(
    args: &VersionWorkflowArgs,
    config: &Config,
) -> Result<WorkflowResult> {
    let repo = Git2Repository::open(&args.repo_path).with_context(|| {
        format!(
            "Cannot open git repository at '{}'",
            args.repo_path.display()
        )
    })?;
    run_version_workflow_on(&repo, args, config)
}

/// Version workflow
///
/// Orchestrates the whole run:
/// 1. Determine the branch to resolve for and the start of the range
/// 2. Resolve the next version from history
/// 3. Optionally create the tag (after confirmation unless `assume_yes`)
pub fn run_version_workflow_on<R: Repository + ?Sized>(
    repo: &R,
    args: &VersionWorkflowArgs,
    config: &Config,
) -> Result<WorkflowResult> {
    let head = repo.head_oid()?;
    let branch = match &args.branch {
        Some(branch) => branch.clone(),
        None => repo.current_branch()?.ok_or_else(|| {
            anyhow!("HEAD is detached; pass --branch to choose the branch rule")
        })?,
    };

    let mut request = ResolveRequest::from_config(config, branch.clone(), head)?;
    if let Some(reference) = &args.from {
        let from = repo
            .resolve_ref(reference)
            .with_context(|| format!("Cannot use '{}' as the start of the range", reference))?;
        request.from = Some(from);
    }
    request.version_options.forced_level = args.forced_level;
    request.version_options.as_prerelease = args.as_prerelease;
    request.version_options.prerelease_token = args.prerelease_token.clone();

    let resolution = resolve_next_version(repo, &request)?;

    let mut tag_created = None;
    if let ReleaseOutcome::Release(release) = &resolution.outcome {
        if args.create_tag
            && (args.assume_yes || ui::confirm_action(&format!("Create tag {}?", release.tag))?)
        {
            repo.create_tag(&release.tag, head)?;
            info!(tag = %release.tag, commit = %head, "tag created");
            tag_created = Some(release.tag.clone());
        }
    }

    Ok(WorkflowResult {
        outcome: resolution.outcome,
        warnings: resolution.warnings,
        branch,
        tag_created,
    })
}
