mod cmd;
mod interact;
mod output;
mod repo;
mod resources;
mod tools;

use clap::{Parser, Subcommand};
use interact::Terminal;
use tshirts_core::config::{GitHubConfig, ModelConfig};
use tshirts_core::github::GitHubClient;
use tshirts_core::model::ClaudeModel;
use tshirts_core::{Size, TshirtsError};

#[derive(Parser)]
#[command(
    name = "tshirts",
    about = "T-shirt size, break down and groom GitHub issues with Claude",
    version,
    propagate_version = true
)]
struct Cli {
    /// Repository as owner/name (default: git remote origin, then a picker)
    #[arg(long, short = 'r', global = true, env = "TSHIRTS_REPO")]
    repo: Option<String>,

    /// Claude model to use
    #[arg(long, global = true, env = "TSHIRTS_MODEL")]
    model: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest sizes for open issues without a size label
    Estimate {
        /// Accept every suggestion without asking
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Apply a size label to an issue
    Label {
        number: u64,
        /// XS, S, M, L or XL
        #[arg(value_parser = parse_size)]
        size: Size,
    },

    /// Break an issue down into sub-issues
    Breakdown {
        number: u64,
        /// Create every suggested sub-issue without asking
        #[arg(long)]
        create: bool,
    },

    /// Draft new issues through a conversation
    New,

    /// Refine an issue's description (omit the number to list candidates)
    #[command(alias = "refine")]
    Groom { number: Option<u64> },

    /// Close an issue with a generated closing comment
    Close { number: u64 },

    /// List open issues
    List {
        /// Only issues without a size label
        #[arg(long = "unsized", conflicts_with = "groomable")]
        unsized_only: bool,
        /// Only sized issues that may need refinement
        #[arg(long)]
        groomable: bool,
    },

    /// Run as an MCP stdio server
    Mcp,
}

fn parse_size(s: &str) -> Result<Size, String> {
    s.parse().map_err(|e: TshirtsError| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Mcp => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let repo = cli.repo.as_deref();
    let model = cli.model;
    let json = cli.json;

    let result = match cli.command {
        Commands::Mcp => cmd::mcp::run(model),
        Commands::Estimate { yes } => with_repo(repo, model, |store, model, io| {
            cmd::estimate::run(store, model, io, yes)
        }),
        Commands::Label { number, size } => with_repo(repo, model, |store, _, io| {
            cmd::label::run(store, io, number, size, json)
        }),
        Commands::Breakdown { number, create } => with_repo(repo, model, |store, model, io| {
            cmd::breakdown::run(store, model, io, number, create, json)
        }),
        Commands::New => with_repo(repo, model, |store, model, io| {
            cmd::new::run(store, model, io)
        }),
        Commands::Groom { number } => with_repo(repo, model, |store, model, io| {
            cmd::groom::run(store, model, io, number, json)
        }),
        Commands::Close { number } => with_repo(repo, model, |store, model, io| {
            cmd::close::run(store, model, io, number)
        }),
        Commands::List {
            unsized_only,
            groomable,
        } => {
            let filter = if unsized_only {
                cmd::list::Filter::Unsized
            } else if groomable {
                cmd::list::Filter::Groomable
            } else {
                cmd::list::Filter::Open
            };
            with_repo(repo, model, |store, _, io| {
                cmd::list::run(store, io, filter, json)
            })
        }
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// Resolve the repository, connect to it and hand the command its
/// collaborators.
fn with_repo<F>(explicit: Option<&str>, model: Option<String>, command: F) -> anyhow::Result<()>
where
    F: FnOnce(&GitHubClient, &ClaudeModel, &mut Terminal) -> anyhow::Result<()>,
{
    let github = GitHubConfig::from_env();
    if !github.token.as_deref().is_some_and(|t| !t.trim().is_empty()) {
        return Err(TshirtsError::MissingToken.into());
    }

    let mut io = interact::terminal();
    let cwd = std::env::current_dir()?;
    let repo = repo::resolve_repo(
        explicit,
        &cwd,
        || GitHubClient::list_user_repos(&github),
        &mut io,
    )?;
    tracing::debug!(repo = %repo, "resolved repository");

    let store = GitHubClient::connect(&github, repo)?;
    let model = ClaudeModel::new(ModelConfig::from_env().with_model(model));
    command(&store, &model, &mut io)
}
