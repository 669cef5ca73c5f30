//! custweb main entry point

use anyhow::Context;
use clap::Parser;
use custweb_api::start_server;
use custweb_client::{GeneratorClient, ServiceClient};
use custweb_config::{Config, ConfigError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "custweb")]
#[command(version = "0.1.0")]
#[command(about = "Administrative console for customers and their transactions", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Missing config file means defaults; anything else is fatal
fn load_config(path: PathBuf) -> anyhow::Result<(Config, bool)> {
    match Config::load(path.clone()) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound { .. }) => Ok((Config::default(), false)),
        Err(e) => {
            if let Some(hint) = e.hint() {
                eprintln!("hint: {}", hint);
            }
            Err(anyhow::Error::new(e).context(format!("Failed to load {}", path.display())))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, from_file) = load_config(args.config.clone())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    if from_file {
        log::info!("Config loaded from {}", args.config.display());
    } else {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!(
        "Upstream: api={}, generator={}, timeout={}s",
        config.upstream.api_base_url,
        config.upstream.generator_base_url,
        config.upstream.request_timeout_secs
    );

    let timeout = config.request_timeout();
    let service = Arc::new(
        ServiceClient::new(config.upstream.api_base_url.clone(), timeout)
            .context("Failed to create service client")?,
    );
    let generator = Arc::new(
        GeneratorClient::new(config.upstream.generator_base_url.clone(), timeout)
            .context("Failed to create generator client")?,
    );

    let rt = Runtime::new()?;
    rt.block_on(start_server(config, service.clone(), service, generator))
}
