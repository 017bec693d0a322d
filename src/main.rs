//! bb CLI entry point

use std::path::PathBuf;

use bbcli::cli::commands::{auth, pr, repo};
use bbcli::cli::{AppContext, TerminalPrompter};
use bbcli::telemetry::{init_telemetry, TelemetryConfig};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "bb")]
#[command(author, version, about = "Work with Bitbucket Server from the command line", long_about = None)]
struct Cli {
    /// Show debug logs and full error chains
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Credential file location
    #[arg(long, global = true, env = "BB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure and validate credentials
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Pull request operations
    Pr {
        #[command(subcommand)]
        action: PrCommands,
    },
    /// Repository operations
    Repo {
        #[command(subcommand)]
        action: RepoCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Write a new credential file
    Setup,
    /// Test configuration and connection
    Test,
    /// Show the stored configuration
    Status {
        /// Display the token instead of a mask
        #[arg(long)]
        token: bool,
    },
    /// Remove the credential file
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum PrCommands {
    /// Create a pull request from the current branch
    Create {
        /// Target branch name
        #[arg(short, long)]
        target: Option<String>,
        /// Title (defaults to the latest commit subject)
        #[arg(long)]
        title: Option<String>,
        /// Description (defaults to the latest commit body)
        #[arg(long)]
        description: Option<String>,
        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,
        /// Show diff after raising the pull request
        #[arg(long)]
        diff: bool,
        /// Rebase onto the target and force-push before creating
        #[arg(long)]
        rebase: bool,
    },
    /// Delete pull request(s)
    Delete {
        /// Pull request number(s), comma separated
        #[arg(long)]
        id: Option<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Show diff before deleting
        #[arg(long)]
        diff: bool,
    },
    /// List pull requests
    List {
        /// Which pull requests to show
        #[arg(long, value_enum, default_value_t = pr::ListRole::Current)]
        role: pr::ListRole,
        /// Show pull requests of every repository
        #[arg(long)]
        all: bool,
    },
    /// Approve, unapprove or request work on a pull request
    Review {
        /// Pull request number
        #[arg(long)]
        id: Option<u64>,
        /// Review verdict
        #[arg(long, value_enum)]
        action: pr::ReviewAction,
    },
    /// Merge a pull request
    Merge {
        /// Pull request number
        #[arg(long)]
        id: Option<u64>,
        /// Delete the source branch after merging
        #[arg(long)]
        delete_source_branch: bool,
        /// Rebase the source branch before merging
        #[arg(long)]
        rebase: bool,
        /// Skip the rebase and proceed prompts (source deletion is still asked)
        #[arg(short, long)]
        yes: bool,
    },
    /// Show files changed and the diff of a pull request
    Diff {
        /// Pull request number
        #[arg(long)]
        id: Option<u64>,
    },
    /// Copy the pull request url to the clipboard
    Copy {
        /// Pull request number
        #[arg(long)]
        id: Option<u64>,
    },
    /// Show a pull request
    View {
        /// Pull request number
        #[arg(long)]
        id: Option<u64>,
        /// Open in the default browser
        #[arg(long)]
        web: bool,
    },
}

#[derive(Subcommand)]
enum RepoCommands {
    /// Clone a repository
    Clone {
        /// Repository, format: project/repository
        name: String,
    },
    /// Create a repository
    Create {
        /// Project key
        #[arg(long)]
        project: Option<String>,
        /// Repository name
        #[arg(long)]
        repo: Option<String>,
        /// Make the repository forkable
        #[arg(long)]
        forkable: bool,
        /// Default branch
        #[arg(long, default_value = "main")]
        default_branch: String,
    },
    /// Delete a repository
    Delete {
        /// Project key
        #[arg(long)]
        project: Option<String>,
        /// Repository name
        #[arg(long)]
        repo: Option<String>,
    },
    /// Archive a repository
    Archive {
        /// Project key
        #[arg(long)]
        project: Option<String>,
        /// Repository name
        #[arg(long)]
        repo: Option<String>,
    },
    /// Unarchive a repository
    Unarchive {
        /// Project key
        #[arg(long)]
        project: Option<String>,
        /// Repository name
        #[arg(long)]
        repo: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = match init_telemetry(&TelemetryConfig::for_verbosity(cli.verbose)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("{} Cannot read the current directory: {}", "✗".red(), e);
            std::process::exit(1);
        }
    };
    let ctx = AppContext::new(cli.verbose, cli.config, cwd);

    if let Err(err) = run(&ctx, cli.command).await {
        report_error(&ctx, &err);
        std::process::exit(1);
    }
}

/// Print a failed command: the full chain with `--verbose`, one line otherwise.
fn report_error(ctx: &AppContext, err: &anyhow::Error) {
    if ctx.verbose {
        eprintln!("{} {:?}", "✗".red(), err);
    } else {
        eprintln!("{} {}", "✗".red(), err.to_string().red());
        eprintln!(
            "{}",
            "Try running 'bb --verbose <COMMAND>' to debug".dimmed()
        );
    }
}

async fn run(ctx: &AppContext, command: Option<Commands>) -> anyhow::Result<()> {
    let prompter = TerminalPrompter::new();

    match command {
        Some(Commands::Auth { action }) => match action {
            AuthCommands::Setup => auth::run_auth_setup(ctx, &prompter)?,
            AuthCommands::Test => auth::run_auth_test(ctx).await?,
            AuthCommands::Status { token } => auth::run_auth_status(ctx, token)?,
            AuthCommands::Reset { yes } => auth::run_auth_reset(ctx, &prompter, yes)?,
        },
        Some(Commands::Pr { action }) => match action {
            PrCommands::Create {
                target,
                title,
                description,
                yes,
                diff,
                rebase,
            } => {
                pr::run_pr_create(
                    ctx,
                    &prompter,
                    pr::CreateOptions {
                        target,
                        title,
                        description,
                        yes,
                        diff,
                        rebase,
                    },
                )
                .await?
            }
            PrCommands::Delete { id, yes, diff } => {
                pr::run_pr_delete(ctx, &prompter, id.as_deref(), yes, diff).await?
            }
            PrCommands::List { role, all } => pr::run_pr_list(ctx, &prompter, role, all).await?,
            PrCommands::Review { id, action } => {
                pr::run_pr_review(ctx, &prompter, id, action).await?
            }
            PrCommands::Merge {
                id,
                delete_source_branch,
                rebase,
                yes,
            } => {
                pr::run_pr_merge(
                    ctx,
                    &prompter,
                    pr::MergeOptions {
                        id,
                        delete_source_branch,
                        rebase,
                        yes,
                    },
                )
                .await?
            }
            PrCommands::Diff { id } => pr::run_pr_diff(ctx, &prompter, id).await?,
            PrCommands::Copy { id } => pr::run_pr_copy(ctx, &prompter, id).await?,
            PrCommands::View { id, web } => pr::run_pr_view(ctx, &prompter, id, web).await?,
        },
        Some(Commands::Repo { action }) => match action {
            RepoCommands::Clone { name } => repo::run_repo_clone(ctx, &name)?,
            RepoCommands::Create {
                project,
                repo: name,
                forkable,
                default_branch,
            } => {
                repo::run_repo_create(
                    ctx,
                    &prompter,
                    project.as_deref(),
                    name.as_deref(),
                    forkable,
                    &default_branch,
                )
                .await?
            }
            RepoCommands::Delete { project, repo: name } => {
                repo::run_repo_delete(ctx, &prompter, project.as_deref(), name.as_deref()).await?
            }
            RepoCommands::Archive { project, repo: name } => {
                repo::run_repo_archive(ctx, &prompter, project.as_deref(), name.as_deref(), true)
                    .await?
            }
            RepoCommands::Unarchive { project, repo: name } => {
                repo::run_repo_archive(ctx, &prompter, project.as_deref(), name.as_deref(), false)
                    .await?
            }
        },
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "bb", &mut std::io::stdout());
        }
        None => {
            println!("bb - Bitbucket Server from the command line");
            println!("Run 'bb --help' for usage");
        }
    }

    Ok(())
}
