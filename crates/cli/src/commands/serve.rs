//! Serve command.

use anyhow::{Context, Result};
use clap::Args;
use clarke_node::{NodeConfig, Server};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ServeArgs {
    /// Directory holding config.json
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Host to listen on, overriding config.json
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overriding config.json
    #[arg(short, long)]
    port: Option<u16>,
}

pub fn run(args: ServeArgs) -> Result<()> {
    let mut config = NodeConfig::load_from_dir(&args.data_dir).context("Failed to load config")?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async {
        let server = Server::bind(&config)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_addr()))?;
        println!(
            "{} on {}",
            "Node listening".bold().cyan(),
            server.local_addr()?.to_string().bright_yellow()
        );
        server.serve().await?;
        Ok::<(), anyhow::Error>(())
    })
}
