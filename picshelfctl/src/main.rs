//! `picshelfctl`: browse, upload and download images from a picshelf backend.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use picshelf_client::ClientConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "picshelfctl", version, about = "Picshelf image gallery client")]
struct Cli {
    /// Image API base URL (overrides config file and PICSHELF_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Config file (TOML or JSON)
    #[arg(long, global = true, env = "PICSHELF_CONFIG_PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List images, newest first
    List(ListArgs),
    /// Upload one JPG, PNG or WEBP file
    Upload(UploadArgs),
    /// Save the original image bytes to disk
    Download(DownloadArgs),
    /// Print the full-size URL of an image
    Url {
        file_id: String,
    },
}

#[derive(Args)]
pub(crate) struct ListArgs {
    /// Only images whose title or description matches
    #[arg(long)]
    pub search: Option<String>,
    /// Page size (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<u32>,
    /// Number of pages to fetch
    #[arg(long, default_value_t = 1, conflicts_with = "all")]
    pub pages: u32,
    /// Keep fetching until the listing ends
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    pub path: PathBuf,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
}

#[derive(Args)]
pub(crate) struct DownloadArgs {
    pub file_id: String,
    /// Title used to name the saved file
    #[arg(long, default_value = "")]
    pub title: String,
    /// Media type of the image; sniffed from the bytes when omitted
    #[arg(long, default_value = "")]
    pub content_type: String,
    /// Target directory (defaults to the configured download directory)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::List(args) => commands::list(config, args).await,
        Command::Upload(args) => commands::upload(config, args).await,
        Command::Download(args) => commands::download(config, args).await,
        Command::Url { file_id } => commands::url(config, &file_id),
    }
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let (mut config, source) = ClientConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    tracing::debug!(?source, "configuration loaded");

    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
        config
            .validate()
            .with_context(|| format!("invalid --api-url '{}'", url))?;
    }
    Ok(config)
}
