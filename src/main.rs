//! Notewise - AI-assisted note transformation
//!
//! Entry point for the `notewise` binary: runs the HTTP API server or
//! performs one-shot transforms and definitions from the terminal.

mod cli;

use clap::{Parser, Subcommand};
use cli::config::ConfigAction;
use cli::transform::{OutputFormat, TransformArgs};
use notewise_core::{config::NotewiseConfig, error::Result, TransformOptions};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "notewise")]
#[command(about = "Format, highlight and annotate study notes with an LLM", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file (default: <config dir>/notewise/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Listen address (overrides server.addr)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Transform notes read from a file or stdin
    Transform {
        /// Input file (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Restructure the notes into simple HTML (headings, paragraphs, lists)
        #[arg(long)]
        auto_format: bool,

        /// Extract and highlight key terms
        #[arg(long)]
        highlight: bool,

        /// Add study comments
        #[arg(long)]
        comments: bool,

        /// Use a running notewise server instead of calling the model directly
        #[arg(long)]
        server: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Define a single term
    Define {
        /// Term to define
        term: String,

        /// Surrounding note text used as context
        #[arg(long)]
        context: Option<String>,

        /// Use a running notewise server instead of calling the model directly
        #[arg(long)]
        server: Option<String>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Requested level for our crates, WARN for noisy HTTP dependencies
    let level = level.as_str().to_lowercase();
    let filter = EnvFilter::new(format!(
        "notewise={level},notewise_core={level},hyper=warn,reqwest=warn,tower_http=warn"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Notewise v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.unwrap_or_else(NotewiseConfig::default_path);
    let config = NotewiseConfig::load(Some(config_path.as_path()))?;

    match cli.command {
        Commands::Serve { addr } => cli::serve::handle(config, addr).await,
        Commands::Transform {
            file,
            auto_format,
            highlight,
            comments,
            server,
            format,
        } => {
            let args = TransformArgs {
                file,
                options: TransformOptions {
                    auto_format,
                    highlight_key_terms: highlight,
                    comments,
                },
                server,
                format,
            };
            cli::transform::handle(config, args).await
        }
        Commands::Define {
            term,
            context,
            server,
        } => cli::define::handle(config, term, context, server).await,
        Commands::Config { action } => cli::config::handle(action, config, &config_path).await,
    }
}
