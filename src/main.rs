//! Sentiview CLI
//!
//! Terminal front end for the sentiment dashboard:
//! - Watch the live dashboard
//! - Print a one-shot snapshot
//! - List posts
//! - Check API health

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use sentiview::api::{PostFilters, PostQuery};
use sentiview::config::generate_default_config;
use sentiview::model::parse_instant;
use sentiview::{
    logging, reduce, ApiClient, Config, ConnectionStatus, Dashboard, DataFetcher, FetchSettings,
    Renderer, SentimentLabel, SentimentSource, TextRenderer, ViewEvent, ViewState,
};

#[derive(Parser)]
#[command(name = "sentiview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live sentiment dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Sentiment API base URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the live dashboard until Ctrl-C
    Watch,

    /// Load the dashboard once and print it
    Snapshot,

    /// List analyzed posts
    Posts {
        #[arg(short, long, default_value = "10")]
        limit: u32,
        #[arg(short, long, default_value = "0")]
        offset: u32,
        /// Only posts from this source (twitter, reddit, ...)
        #[arg(long)]
        source: Option<String>,
        /// Only posts with this label (positive, negative, neutral)
        #[arg(long)]
        sentiment: Option<SentimentLabel>,
        /// Earliest post time (YYYY-MM-DD or ISO 8601)
        #[arg(long, value_parser = parse_date)]
        start_date: Option<DateTime<Utc>>,
        /// Latest post time (YYYY-MM-DD or ISO 8601)
        #[arg(long, value_parser = parse_date)]
        end_date: Option<DateTime<Utc>>,
    },

    /// Show API health
    Health,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Some(ts) = parse_instant(s) {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}'", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        return write_default_config(output.as_ref());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    logging::init(&config.logging)?;
    tracing::debug!(api = %config.api.base_url, "Sentiview v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Watch => watch(&config, cli.format).await,
        Commands::Snapshot => snapshot(&config, cli.format).await,
        Commands::Posts {
            limit,
            offset,
            source,
            sentiment,
            start_date,
            end_date,
        } => {
            let query = PostQuery {
                limit,
                offset,
                filters: PostFilters {
                    source,
                    sentiment,
                    start_date,
                    end_date,
                },
            };
            posts(&config, &query, cli.format).await
        }
        Commands::Health => health(&config, cli.format).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn print_state(
    renderer: &mut TextRenderer<io::Stdout>,
    state: &ViewState,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => renderer.render(state)?,
        OutputFormat::Json => println!("{}", serde_json::to_string(state)?),
    }
    Ok(())
}

async fn watch(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let mut handle = Dashboard::from_config(config)
        .context("Failed to create dashboard")?
        .mount();
    let mut renderer = TextRenderer::new(io::stdout()).utc(config.display.utc);

    loop {
        if format == OutputFormat::Table {
            // Clear screen and home the cursor before each redraw.
            print!("\x1B[2J\x1B[H");
        }
        print_state(&mut renderer, &handle.snapshot(), format)?;

        let changed = tokio::select! {
            _ = tokio::signal::ctrl_c() => false,
            changed = handle.changed() => changed,
        };
        if !changed {
            break;
        }
    }

    handle.unmount().await;
    Ok(())
}

async fn snapshot(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let fetcher = DataFetcher::new(Arc::new(client), FetchSettings::from(&config.fetch));

    let outcome = fetcher.load().await;
    let state = reduce(&ViewState::new(), ViewEvent::InitialLoad(outcome), Utc::now());

    let mut renderer = TextRenderer::new(io::stdout()).utc(config.display.utc);
    print_state(&mut renderer, &state, format)?;

    if state.status == ConnectionStatus::Disconnected {
        std::process::exit(1);
    }
    Ok(())
}

async fn posts(config: &Config, query: &PostQuery, format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(&config.api)?;
    let page = client
        .fetch_posts(query)
        .await
        .with_context(|| format!("Cannot fetch posts from {}", client.base_url()))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.posts.is_empty() {
        println!("No posts available");
        return Ok(());
    }

    println!("{:<12} {:<10} {:<9} {}", "ID", "Source", "Label", "Content");
    println!("{}", "-".repeat(72));
    for post in &page.posts {
        let content: String = post.content.chars().take(40).collect();
        println!(
            "{:<12} {:<10} {:<9} {}",
            post.post_id.as_str(),
            post.source,
            post.sentiment.label.as_str(),
            content
        );
    }
    if let Some(total) = page.total {
        println!();
        println!("Showing {} of {} posts", page.posts.len(), total);
    }
    Ok(())
}

async fn health(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(&config.api)?;

    let report = match client.health_report().await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Cannot reach sentiment API at {}", client.base_url());
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Sentiview v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!(
        "API Status: {}",
        report.status.as_deref().unwrap_or("unknown")
    );
    if let Some(ts) = &report.timestamp {
        println!("Checked at: {}", ts);
    }

    if !report.services.is_empty() {
        println!();
        println!("Services:");
        let mut services: Vec<_> = report.services.iter().collect();
        services.sort();
        for (name, status) in services {
            println!("  {}: {}", name, status);
        }
    }

    if !report.stats.is_empty() {
        println!();
        println!("Stats:");
        let mut stats: Vec<_> = report.stats.iter().collect();
        stats.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in stats {
            println!("  {}: {}", name, value);
        }
    }
    Ok(())
}

fn write_default_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", config),
    }
    Ok(())
}
