use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};

use semrel::cli::{self, VersionWorkflowArgs};
use semrel::config::{self, Config};
use semrel::domain::BumpLevel;
use semrel::pipeline::ReleaseOutcome;
use semrel::{logging, ui};

#[derive(Parser)]
#[command(
    name = "semrel",
    version,
    about = "Compute the next semantic version from commit history"
)]
struct Args {
    #[arg(long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short = 'C',
        long = "repo",
        global = true,
        default_value = ".",
        help = "Path inside the git repository"
    )]
    repo: PathBuf,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "More log output (repeatable)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the next version for a branch
    #[command(group(ArgGroup::new("level").args(["major", "minor", "patch"])))]
    Version {
        #[arg(
            short,
            long,
            help = "Branch used for rule matching (default: current branch)"
        )]
        branch: Option<String>,

        #[arg(
            long,
            value_name = "REF",
            help = "Count commits after this tag or revision (default: last release)"
        )]
        from: Option<String>,

        #[arg(long, help = "Print only the version to stdout")]
        print: bool,

        #[arg(
            long,
            conflicts_with = "print",
            help = "Print only the tag name to stdout"
        )]
        print_tag: bool,

        #[arg(long, help = "Create a lightweight tag for the new version on HEAD")]
        tag: bool,

        #[arg(short, long, help = "Skip confirmation prompts")]
        yes: bool,

        #[arg(long, help = "Force a major bump")]
        major: bool,

        #[arg(long, help = "Force a minor bump")]
        minor: bool,

        #[arg(long, help = "Force a patch bump")]
        patch: bool,

        #[arg(long, help = "Cut a prerelease even on a release branch")]
        as_prerelease: bool,

        #[arg(long, help = "Prerelease token to use instead of the branch rule's")]
        prerelease_token: Option<String>,
    },

    /// Show how a commit message is classified
    Classify {
        /// Full commit message (subject, body and footers)
        message: String,
    },

    /// List configured branch rules in evaluation order
    Branches,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Version {
            branch,
            from,
            print,
            print_tag,
            tag,
            yes,
            major,
            minor,
            patch,
            as_prerelease,
            prerelease_token,
        } => {
            let forced_level = if major {
                Some(BumpLevel::Major)
            } else if minor {
                Some(BumpLevel::Minor)
            } else if patch {
                Some(BumpLevel::Patch)
            } else {
                None
            };
            let workflow = VersionWorkflowArgs {
                repo_path: args.repo,
                branch,
                from,
                forced_level,
                as_prerelease,
                prerelease_token,
                create_tag: tag,
                assume_yes: yes,
            };
            run_version(&workflow, &config, print, print_tag)
        }
        Command::Classify { message } => {
            let parser = config.parser()?;
            let classifications = parser.classify_message(&message);
            print!("{}", ui::format_classifications(&classifications));
            Ok(())
        }
        Command::Branches => {
            print!("{}", ui::format_branch_rules(&config.branch_rules()?));
            Ok(())
        }
    }
}

fn run_version(
    workflow: &VersionWorkflowArgs,
    config: &Config,
    print: bool,
    print_tag: bool,
) -> Result<()> {
    let quiet = print || print_tag;
    if !quiet {
        ui::display_status("Resolving next version...");
    }

    let result = match cli::run_version_workflow(workflow, config) {
        Ok(result) => result,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    for warning in &result.warnings {
        ui::display_boundary_warning(warning);
    }

    match &result.outcome {
        ReleaseOutcome::Release(release) => {
            if print {
                println!("{}", release.version);
            } else if print_tag {
                println!("{}", release.tag);
            } else {
                ui::display_release(release);
            }
        }
        ReleaseOutcome::NoReleaseNeeded { reason, current } => {
            // Scripts still get the current version so they can compare
            if print {
                if let Some(version) = current {
                    println!("{}", version);
                }
            } else if print_tag {
                if let Some(version) = current {
                    println!("{}", config.tag_format()?.format(version));
                }
            } else {
                ui::display_status(&ui::format_no_release(*reason, current.as_ref()));
            }
        }
    }

    if let Some(tag) = &result.tag_created {
        ui::display_success(&format!("Created tag: {} on branch {}", tag, result.branch));
    }

    Ok(())
}
