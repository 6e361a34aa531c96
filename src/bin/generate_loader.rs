//! Loader generator CLI
//!
//! Renders the CDN bootstrap script with the SDK version and CDN base URL
//! baked in.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use grace_sdk::config::{SdkConfig, DEFAULT_CDN_URL};
use grace_sdk::logging::init_logging_with_level;
use grace_sdk::script::{LoaderScript, DEFAULT_OUTPUT_PATH};
use grace_sdk::VERSION;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "generate-loader")]
#[command(author = "Grace")]
#[command(version = VERSION)]
#[command(about = "Generate the Grace Chat SDK loader script", long_about = None)]
struct Cli {
    /// CDN base URL the compiled module is served from
    #[arg(long, env = "CDN_URL", default_value = DEFAULT_CDN_URL)]
    cdn_url: String,

    /// Output file
    #[arg(long, short, default_value = DEFAULT_OUTPUT_PATH)]
    out: PathBuf,

    /// Version to record in the flag (defaults to the crate version)
    #[arg(long)]
    sdk_version: Option<String>,

    /// User-facing message shown when the chat fails to load
    #[arg(long, env = "GRACE_ERROR_MESSAGE")]
    error_message: Option<String>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging_with_level(if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });

    let mut config = SdkConfig::new()
        .with_cdn_url(cli.cdn_url.as_str())
        .with_context(|| format!("invalid CDN URL '{}'", cli.cdn_url))?;
    if let Some(version) = cli.sdk_version {
        config = config.with_version(version);
    }
    if let Some(message) = cli.error_message {
        config = config.with_error_message(message);
    }

    LoaderScript::new(&config)
        .write_to(&cli.out)
        .with_context(|| format!("failed to write {}", cli.out.display()))?;

    info!(
        path = %cli.out.display(),
        cdn = config.cdn_url().unwrap_or_default(),
        "Loader script generated"
    );
    println!(
        "Generated {} with CDN: {}",
        cli.out.display(),
        config.cdn_url().unwrap_or_default()
    );
    Ok(())
}
