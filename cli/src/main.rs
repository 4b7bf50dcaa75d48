//! KVQ CLI
//!
//! Command-line client for the KVQ key-value store and queue.
//!
//! # Usage
//!
//! ```bash
//! kvq user new --save
//! kvq kv set greeting hello --ttl 60000
//! kvq kv get greeting --format json
//! kvq queue send jobs '{"task": 1}'
//! kvq queue receive jobs --visibility-timeout 20000
//! kvq queue delete jobs <id>
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod config;
mod error;
mod output;

const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(name = "kvq")]
#[command(version)]
#[command(about = "KVQ Command Line Interface", long_about = None)]
struct Cli {
    /// API endpoint URL
    #[arg(long, env = "KVQ_API_URL")]
    api_url: Option<String>,

    /// Bearer token from `kvq user new`
    #[arg(long, env = "KVQ_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output format
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Key-value store
    Kv {
        #[command(subcommand)]
        action: KvCommands,
    },
    /// Message queues
    Queue {
        #[command(subcommand)]
        action: QueueCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user and print its token
    New {
        /// Store the token in the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum KvCommands {
    /// Store a value
    Set {
        key: String,
        value: String,
        /// Time to live in milliseconds
        #[arg(long, allow_hyphen_values = true)]
        ttl: Option<i64>,
    },
    /// Read a value
    Get { key: String },
    /// Remove a key
    Delete { key: String },
}

#[derive(Subcommand)]
enum QueueCommands {
    /// Enqueue a message
    Send { namespace: String, message: String },
    /// Lease the oldest visible message
    Receive {
        namespace: String,
        /// Lease length in milliseconds
        #[arg(long)]
        visibility_timeout: Option<i64>,
    },
    /// Acknowledge a message
    Delete { namespace: String, id: String },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    let config = match config::Config::load(profile) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Warning:".yellow(), e);
            config::Config::default()
        }
    };
    let api_url = cli
        .api_url
        .or(config.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.into());
    let token = cli.token.or(config.token);
    let format = cli.format.or(config.default_format).unwrap_or_default();

    let client = commands::ApiClient::new(&api_url, token.as_deref());

    let result = match cli.command {
        Commands::User { action } => commands::user::handle(action, &client, format, profile).await,
        Commands::Kv { action } => commands::kv::handle(action, &client, format).await,
        Commands::Queue { action } => commands::queue::handle(action, &client, format).await,
        Commands::Config { action } => commands::config::handle(action, profile).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
