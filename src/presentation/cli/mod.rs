pub mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::exit;

use crate::domain::value_objects::clone_strategy::CloneStrategy;
use crate::domain::value_objects::provider_type::ProviderType;

use commands::bulk::{BulkCommand, BulkKind};
use commands::init::InitCommand;
use commands::list::ListCommand;
use commands::validate_config::ValidateConfigCommand;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// synclone - clone and refresh organizations from GitHub, GitLab and Gitea
#[derive(Debug, Parser)]
#[command(name = "synclone")]
#[command(about = "Clone and refresh every repository of your hosting organizations")]
#[command(version)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), " ", env!("BUILD_DATE"), ")"))]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by `clone` and `refresh`
#[derive(Debug, Clone, Args)]
pub struct BulkArgs {
    /// Configuration file (defaults to the standard search path)
    #[arg(short, long, env = "SYNCLONE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only these providers
    #[arg(short, long)]
    pub provider: Vec<String>,

    /// Only these organizations
    #[arg(short, long)]
    pub org: Vec<String>,

    /// Override the configured strategy (reset, pull, fetch)
    #[arg(short, long)]
    pub strategy: Option<CloneStrategy>,

    /// Check providers without cloning or updating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Remove working copies of repositories no longer selected (clone only)
    #[arg(long)]
    pub cleanup_orphans: bool,

    /// Extra attempts after a network or rate-limit failure (overrides the configuration)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clone every configured organization
    Clone(BulkArgs),

    /// Update existing clones of every configured organization
    Refresh(BulkArgs),

    /// List the repositories of one organization
    List {
        /// Provider name (github, gitlab, gitea)
        #[arg(short, long)]
        provider: ProviderType,

        /// Organization, group or user
        #[arg(short, long)]
        org: String,

        /// Access token (defaults to the provider's token variable)
        #[arg(long)]
        token: Option<String>,

        /// API root for self-hosted instances
        #[arg(long)]
        api_url: Option<String>,

        /// public, private or all
        #[arg(long, default_value = "all")]
        visibility: String,

        /// Name pattern (regex, glob or substring)
        #[arg(long)]
        pattern: Option<String>,

        /// Exclude pattern, repeatable
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Hide archived repositories
        #[arg(long)]
        skip_archived: bool,

        /// Hide forks
        #[arg(long)]
        skip_forks: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Check a configuration file
    ValidateConfig {
        /// Configuration file (defaults to the standard search path)
        #[arg(short, long, env = "SYNCLONE_CONFIG")]
        config: Option<PathBuf>,

        /// Also ask every provider whether its token is accepted
        #[arg(long)]
        check_tokens: bool,
    },

    /// Write a sample configuration file
    Init {
        /// Where to write the file (defaults to ~/.config/synclone/synclone.yaml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Force overwrite existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    /// Run already parsed arguments
    pub fn with_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        colored::control::set_override(!self.cli.no_color);

        match self.handle_command().await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self) -> anyhow::Result<()> {
        match &self.cli.command {
            Commands::Clone(args) => BulkCommand::new(BulkKind::Clone, args.clone()).execute().await,
            Commands::Refresh(args) => {
                BulkCommand::new(BulkKind::Refresh, args.clone())
                    .execute()
                    .await
            }
            Commands::List {
                provider,
                org,
                token,
                api_url,
                visibility,
                pattern,
                exclude,
                skip_archived,
                skip_forks,
                output,
            } => {
                ListCommand {
                    provider: *provider,
                    org: org.clone(),
                    token: token.clone(),
                    api_url: api_url.clone(),
                    visibility: visibility.clone(),
                    pattern: pattern.clone(),
                    exclude: exclude.clone(),
                    skip_archived: *skip_archived,
                    skip_forks: *skip_forks,
                    output: *output,
                }
                .execute()
                .await
            }
            Commands::ValidateConfig {
                config,
                check_tokens,
            } => {
                ValidateConfigCommand::new(config.clone())
                    .with_token_check(*check_tokens)
                    .execute()
                    .await
            }
            Commands::Init { path, force } => InitCommand::new(path.clone(), *force).execute().await,
        }
    }
}
