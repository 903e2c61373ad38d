//! Command-line client for the Bookshop API V1.
//!
//! # Usage Examples
//!
//! ```bash
//! # Send 100 requests with the built-in weight tables
//! bookshop-testgen --url https://localhost:5000/v1 --count 100 --no-verify
//!
//! # Replay an exact request sequence
//! bookshop-testgen --count 100 --seed 714025 -v
//!
//! # Custom weights and corpus, single-book orders only
//! bookshop-testgen --config-file weights.yaml \
//!   --database-file books.jsonl \
//!   --no-loops --count 500
//! ```

use anyhow::Context;
use bookshop_testgen::client::BookshopClient;
use bookshop_testgen::config::{Config, Distributions, DEFAULT_SERVICE_URL, DEFAULT_WEIGHTS};
use bookshop_testgen::engine::Engine;
use bookshop_testgen::random::RandomContext;
use bookshop_testgen::request::Method;
use clap::Parser;
use reqwest::StatusCode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bookshop-testgen")]
#[command(about = "Reproducible request generator for the Bookshop API V1")]
struct Cli {
    /// Common service URL
    #[arg(long, default_value = DEFAULT_SERVICE_URL)]
    url: String,

    /// Books endpoint (overrides the common URL)
    #[arg(long)]
    books_url: Option<String>,

    /// Customers endpoint (overrides the common URL)
    #[arg(long)]
    customers_url: Option<String>,

    /// Number of requests to send (0 = unlimited)
    #[arg(long, default_value_t = 1, value_name = "N")]
    count: u64,

    /// Weight configuration file (built-in defaults when omitted)
    #[arg(long, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Books corpus file (newline-delimited JSON)
    #[arg(long, default_value = "books.jsonl", value_name = "FILE")]
    database_file: PathBuf,

    /// API catalog client id, sent as X-IBM-Client-Id
    #[arg(long)]
    client_id: Option<String>,

    /// Disable HTTPS certificate verification
    #[arg(long)]
    no_verify: bool,

    /// Disable asynchronous behaviour in the API
    #[arg(long)]
    no_async: bool,

    /// Disable multi-book orders
    #[arg(long)]
    no_loops: bool,

    /// Random seed to reproduce a request sequence (0 = pick one and report it)
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Show request summaries (-v) or full request/response detail (-vv)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = build_config(&cli).context("Failed to build run configuration")?;
    // Always visible, whatever the log filter: without the seed a run
    // cannot be replayed.
    println!("Using seed {} (pass --seed {} to replay)", config.seed, config.seed);

    run(config).await
}

fn init_tracing(cli: &Cli) {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let distributions = match &cli.config_file {
        Some(path) => Distributions::from_path(path)?,
        None => Distributions::from_yaml(DEFAULT_WEIGHTS)?,
    };
    let (default_books_url, default_customers_url) = Config::endpoints(&cli.url);
    let seed = if cli.seed == 0 {
        RandomContext::fresh_seed()
    } else {
        cli.seed
    };

    Ok(Config {
        books_url: cli.books_url.clone().unwrap_or(default_books_url),
        customers_url: cli.customers_url.clone().unwrap_or(default_customers_url),
        books_file: cli.database_file.clone(),
        request_count: cli.count,
        looping: !cli.no_loops,
        seed,
        distributions,
        verify_tls: !cli.no_verify,
        async_api: !cli.no_async,
        client_id: cli.client_id.clone(),
    })
}

/// Generate and send requests until the configured count is reached.
/// Responses resolve fully before the next tick, so the engine's view of
/// created entities is always exactly the responses seen so far.
async fn run(config: Config) -> anyhow::Result<()> {
    let client = BookshopClient::new(
        config.verify_tls,
        config.async_api,
        config.client_id.clone(),
    )?;
    let mut engine = Engine::new(&config)?;

    let limit = config.request_count;
    let mut count = 0u64;
    while limit == 0 || count < limit {
        let generated = engine.next_request()?;
        if let Some(body) = &generated.request.body {
            tracing::debug!(
                body = %serde_json::Value::Object(body.clone()),
                "request body"
            );
        }

        let response = client.send(&generated.request).await?;
        tracing::info!(
            method = %generated.request.method,
            url = %generated.request.url,
            status = %response.status,
            "request resolved"
        );
        if let Some(body) = &response.body {
            tracing::debug!(body = %body, "response body");
        }

        if response.status == StatusCode::CREATED && generated.request.method == Method::Post {
            match response.body {
                Some(serde_json::Value::Object(record)) => {
                    engine.register_created(generated.resource, record)?;
                }
                _ => tracing::warn!(
                    resource = %generated.resource,
                    "created entity response had no JSON body to register"
                ),
            }
        }
        count += 1;
    }

    tracing::info!(requests = count, "run complete");
    Ok(())
}
