//! Domain Insights CLI
//!
//! Fetches traffic, engagement and channel metrics for a domain and prints
//! a normalized, partial-tolerant summary.

use anyhow::Result;
use clap::{Parser, Subcommand};
use domain_insights::commands::{execute_query, validate_args, QueryArgs};
use domain_insights::domain::normalize_domain;
use domain_insights::parser::InsightMode;
use domain_insights::ratelimit::RateGovernor;
use domain_insights::utils::config::{DEFAULT_PROVIDER_BASE_URL, DEFAULT_PROVIDER_TIMEOUT};
use domain_insights::utils::ProviderConfig;
use env_logger::Env;
use std::path::PathBuf;
use std::time::Duration;

/// Domain Insights - traffic metrics for any public domain
#[derive(Parser, Debug)]
#[command(name = "domain-insights")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch insights for a domain
    Query {
        /// Domain or URL to look up
        #[arg(short, long)]
        url: String,

        /// Reporting mode
        #[arg(short, long, value_enum, default_value_t = InsightMode::Monthly)]
        mode: InsightMode,

        /// Output path for JSON (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Caller IP the request is attributed to
        #[arg(long)]
        client_ip: Option<String>,

        /// Provider API key
        #[arg(long, env = "PROVIDER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Send the API key as a header instead of a query parameter
        #[arg(long, env = "PROVIDER_API_KEY_IN_HEADER")]
        api_key_in_header: bool,

        /// Provider REST base URL
        #[arg(long, env = "PROVIDER_BASE_URL", default_value = DEFAULT_PROVIDER_BASE_URL)]
        base_url: String,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_PROVIDER_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },

    /// Normalize a domain without querying the provider
    Normalize {
        /// Domain or URL to normalize
        #[arg(short, long)]
        url: String,
    },

    /// Display version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Query {
            url,
            mode,
            output,
            summary,
            client_ip,
            api_key,
            api_key_in_header,
            base_url,
            timeout_secs,
        } => {
            let provider = ProviderConfig::new(api_key)
                .with_base_url(base_url)
                .with_key_in_header(api_key_in_header)
                .with_timeout(Duration::from_secs(timeout_secs));

            let args = QueryArgs {
                url,
                mode,
                provider,
                client_ip,
                output_json: output,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_query(args, RateGovernor::in_memory()).await?;
        }

        Commands::Normalize { url } => {
            let domain = normalize_domain(&url)?;
            println!("{}", domain);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Domain Insights v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Partial-tolerant traffic and marketing insights for public domains.");
}
