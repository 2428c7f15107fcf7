//! asak CLI — entry point.
//!
//! # Commands
//!
//! - `asak chat [-m MESSAGE] [--mode M] [--filter EXPR]` — chat through the selector (single-shot or REPL)
//! - `asak pick [--mode M] [--filter EXPR]` — reserve a model and print where to send the request
//! - `asak status` — configured models and their current quota usage
//! - `asak usage <export|import|merge|reset>` — manage the usage snapshot
//! - `asak init` — write a starter config

mod chat;
mod helpers;
mod init;
mod repl;
mod status;
mod usage_cmd;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use asak_core::config::{get_config_path, load_config};
use asak_core::utils::get_usage_path;
use asak_router::{Mode, ModelFilter, Selector};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// asak — route chat requests across rate-limited models and providers
#[derive(Parser)]
#[command(name = "asak", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.asak/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Usage snapshot file (default: ~/.asak/usage.json)
    #[arg(long, global = true)]
    usage_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Selection flags shared by `chat` and `pick`.
#[derive(Args, Clone, Debug)]
struct SelectArgs {
    /// Selection mode: index, available or random
    #[arg(long, default_value = "index")]
    mode: String,

    /// Model filter, e.g. "provider=groq,model~70b"
    #[arg(long, default_value = "")]
    filter: String,
}

impl SelectArgs {
    fn parse(&self) -> Result<(Mode, ModelFilter)> {
        let mode: Mode = self.mode.parse()?;
        let filter: ModelFilter = self.filter.parse()?;
        Ok((mode, filter))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Chat through the selected model (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        #[command(flatten)]
        select: SelectArgs,

        /// System prompt sent before the conversation
        #[arg(long)]
        system: Option<String>,

        /// Wait for the full reply instead of streaming it
        #[arg(long, default_value_t = false)]
        no_stream: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Reserve a model without sending anything
    Pick {
        #[command(flatten)]
        select: SelectArgs,
    },

    /// Show configured models and their quota usage
    Status,

    /// Manage the usage snapshot
    Usage {
        #[command(subcommand)]
        action: usage_cmd::UsageCommands,
    },

    /// Write a starter config file
    Init,
}

/// Resolved file locations for this invocation.
struct Paths {
    config: PathBuf,
    usage: PathBuf,
}

impl Paths {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            config: cli
                .config
                .as_deref()
                .map(helpers::expand_tilde)
                .unwrap_or_else(get_config_path),
            usage: cli
                .usage_file
                .as_deref()
                .map(helpers::expand_tilde)
                .unwrap_or_else(get_usage_path),
        }
    }
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::from_cli(&cli);

    match cli.command {
        Commands::Chat {
            message,
            select,
            system,
            no_stream,
            logs,
        } => {
            init_logging(logs);
            let (mode, filter) = select.parse()?;
            let options = chat::ChatOptions {
                mode,
                filter,
                system,
                stream: !no_stream,
            };
            run_chat(&paths, message, options).await
        }
        Commands::Pick { select } => {
            init_logging(false);
            let (mode, filter) = select.parse()?;
            run_pick(&paths, mode, &filter)
        }
        Commands::Status => {
            init_logging(false);
            status::run(&paths.config, &paths.usage)
        }
        Commands::Usage { action } => {
            init_logging(false);
            let selector = build_selector(&paths.config, &paths.usage)?;
            usage_cmd::dispatch(action, &selector, &paths.usage)
        }
        Commands::Init => init::run(&paths.config),
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_chat(
    paths: &Paths,
    message: Option<String>,
    options: chat::ChatOptions,
) -> Result<()> {
    let selector = build_selector(&paths.config, &paths.usage)?;

    match message {
        Some(msg) => {
            // Single-shot mode
            let messages = chat::initial_messages(options.system.as_deref(), &msg);
            let result = chat::ask(&selector, &options, messages).await;
            usage_cmd::save(&selector, &paths.usage)?;
            result?;
        }
        None => {
            repl::run(&selector, &options, &paths.usage).await?;
        }
    }

    Ok(())
}

fn run_pick(paths: &Paths, mode: Mode, filter: &ModelFilter) -> Result<()> {
    let selector = build_selector(&paths.config, &paths.usage)?;
    let selected = selector.get_model_with(mode, filter)?;
    usage_cmd::save(&selector, &paths.usage)?;
    helpers::print_selection(&selected);
    Ok(())
}

/// Load the config, build a selector and restore persisted usage into it.
pub(crate) fn build_selector(config_path: &Path, usage_path: &Path) -> Result<Selector> {
    let config = load_config(Some(config_path))
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let selector = Selector::new(config)?;
    usage_cmd::restore(&selector, usage_path);
    debug!(models = selector.config().models.len(), "selector built");
    Ok(selector)
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("asak_core=debug,asak_providers=debug,asak_router=debug,asak=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
