// Command-line front end for the content engine
//
// Every subcommand prints one JSON document on stdout; logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use kodegen_tools_webfetch::{ContentEngine, load_yaml_config, load_yaml_config_from};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kodegen-webfetch")]
#[command(about = "Headless page extraction and search aggregation for LLM prompts")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to config.yaml in the package root)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch short previews of one or more URLs
    Links {
        /// URLs to fetch
        urls: Vec<String>,
    },

    /// Query a search engine and optionally follow result links
    Search {
        /// Search query
        #[arg(short, long)]
        query: String,

        /// Search URL template containing one %s placeholder
        #[arg(short, long)]
        url: String,

        /// Response format of the search engine (json, html)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Number of results
        #[arg(short, long)]
        limit: Option<i64>,

        /// Extract the page behind every result
        #[arg(long)]
        follow_links: bool,
    },

    /// Extract one page
    Extract {
        /// Page URL
        url: String,

        /// Byte budget for the extracted text
        #[arg(short, long)]
        max_bytes: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_yaml_config_from(path)?,
        None => load_yaml_config()?,
    };
    let default_max_bytes = config.extractor.max_content_bytes;
    let engine = ContentEngine::new(config)?;

    let output = match cli.command {
        Commands::Links { urls } => serde_json::to_string_pretty(&engine.fetch_link_content(&urls).await)?,
        Commands::Search {
            query,
            url,
            format,
            limit,
            follow_links,
        } => {
            let response = engine.search(&query, &url, &format, limit, follow_links).await;
            serde_json::to_string_pretty(&response)?
        }
        Commands::Extract { url, max_bytes } => {
            let content = engine
                .extract_page(&url, max_bytes.unwrap_or(default_max_bytes))
                .await;
            serde_json::to_string_pretty(&serde_json::json!({ "url": url, "content": content }))?
        }
    };

    println!("{output}");
    Ok(())
}
