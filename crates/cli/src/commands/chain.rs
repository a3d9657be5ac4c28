//! Chain inspection command.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use clarke_core::{Block, Hash};
use clarke_storage::{ChainStore, Storage};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ChainArgs {
    #[command(subcommand)]
    command: ChainCommand,
}

#[derive(Subcommand)]
enum ChainCommand {
    /// List recent blocks
    List {
        /// Directory to store blockchain data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Number of blocks to show
        #[arg(short, long, default_value = "10")]
        count: u64,
    },
    /// Show one block as JSON
    Show {
        /// Directory to store blockchain data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Block height or hash (hex format)
        block_id: String,
    },
}

pub fn run(args: ChainArgs) -> Result<()> {
    match args.command {
        ChainCommand::List { data_dir, count } => list_blocks(data_dir, count),
        ChainCommand::Show { data_dir, block_id } => show_block(data_dir, block_id),
    }
}

fn open_storage(data_dir: &Path) -> Result<Storage> {
    Storage::open(super::chain_dir(data_dir))
        .with_context(|| "Failed to open storage. Did you run 'clarke mine'?")
}

fn list_blocks(data_dir: PathBuf, count: u64) -> Result<()> {
    let storage = open_storage(&data_dir)?;
    let chain = ChainStore::new(&storage);

    println!();
    println!("{}", "Recent Blocks:".bold().cyan());
    println!();

    if !chain.is_initialized()? {
        println!("  {}", "(empty chain)".bright_black());
        println!();
        return Ok(());
    }

    let head_height = chain.get_height()?;
    for (offset, block) in chain.get_recent_blocks(count)?.iter().enumerate() {
        let height = head_height - offset as u64;
        println!(
            "  {} {} {}",
            format!("#{}", height).bright_black(),
            block.hash().to_hex()[..16].bright_yellow(),
            format!("({} txs, nonce {})", block.tx_count(), block.nonce).bright_black()
        );
    }

    println!();
    Ok(())
}

fn show_block(data_dir: PathBuf, block_id: String) -> Result<()> {
    let storage = open_storage(&data_dir)?;
    let chain = ChainStore::new(&storage);

    let block = find_block(&chain, &block_id)?;

    println!("{}", serde_json::to_string_pretty(&block)?);
    eprintln!(
        "{} {}  {}",
        "hash".bright_black(),
        block.hash().to_hex().bright_yellow(),
        if block.is_valid() {
            "meets target".green()
        } else {
            "does not meet target".red()
        }
    );
    Ok(())
}

/// Look a block up by height first, then by hash.
fn find_block(chain: &ChainStore<'_>, block_id: &str) -> Result<Block> {
    if let Ok(height) = block_id.parse::<u64>() {
        return chain
            .get_block_by_height(height)?
            .with_context(|| format!("No block at height {}", height));
    }
    let hash = Hash::from_hex(block_id)
        .with_context(|| format!("Invalid block hash: {}", block_id))?;
    chain
        .get_block_by_hash(&hash)?
        .with_context(|| format!("Block not found: {}", hash))
}
