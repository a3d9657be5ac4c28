//! Mine command.

use anyhow::{bail, Context, Result};
use clap::Args;
use clarke_core::{Block, Hash, Miner, MinerConfig, MiningOutcome, Target, Transaction};
use clarke_node::NodeConfig;
use clarke_storage::{ChainStore, Storage};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args)]
pub struct MineArgs {
    /// Directory to store blockchain data
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Path to the wallet PEM file receiving the reward (default: ~/.wallet.pem)
    #[arg(short, long)]
    wallet: Option<PathBuf>,

    /// Target as hex, overriding config.json
    #[arg(short, long)]
    target: Option<String>,

    /// Mining threads, overriding config.json
    #[arg(long)]
    workers: Option<usize>,
}

pub fn run(args: MineArgs) -> Result<()> {
    fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", args.data_dir))?;

    let config = NodeConfig::load_from_dir(&args.data_dir).context("Failed to load config")?;
    let target = match &args.target {
        Some(hex) => {
            Target::from_hex(hex).with_context(|| format!("Invalid target: {}", hex))?
        }
        None => config.target,
    };
    let workers = args.workers.unwrap_or(config.mining_workers).max(1);
    let wallet = super::open_wallet(args.wallet)?;

    let storage = Storage::open(super::chain_dir(&args.data_dir))
        .with_context(|| "Failed to open storage")?;
    let chain = ChainStore::new(&storage);
    let head = chain.get_head()?;
    let parent = head.unwrap_or(Hash::ZERO);

    let reward = Transaction::coinbase(wallet.public_key().clone(), config.reward);
    let mut block = Block::new(parent, vec![reward], target);

    println!(
        "{} target {} with {} worker(s)...",
        "Mining".bold().cyan(),
        target.to_hex().bright_black(),
        workers
    );

    let miner = Miner::new(MinerConfig {
        workers,
        ..MinerConfig::default()
    })?;
    let started = Instant::now();
    let (hash, attempts) = match miner.mine(&mut block) {
        MiningOutcome::Found { hash, attempts, .. } => (hash, attempts),
        outcome => bail!("Mining stopped without a valid nonce: {:?}", outcome),
    };
    let elapsed = started.elapsed();

    let height = if head.is_none() {
        chain
            .init_genesis(&block)
            .with_context(|| "Failed to initialize genesis block")?;
        0
    } else {
        chain
            .append_block(&block)
            .with_context(|| "Failed to append block")?
    };
    storage.flush()?;

    println!();
    println!("{}  Mined block", "✓".green().bold());
    println!("    Height:   {}", height.to_string().bright_cyan());
    println!("    Hash:     {}", hash.to_hex().bright_yellow());
    println!("    Parent:   {}", parent.to_hex().bright_black());
    println!("    Nonce:    {}", block.nonce.to_string().bright_cyan());
    println!("    Attempts: {} in {:.2?}", attempts, elapsed);
    println!("    Reward:   {}", config.reward.to_string().bright_green());

    Ok(())
}
