//! Wallet command.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use clarke_core::DEFAULT_KEY_BITS;
use clarke_storage::Wallet;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct WalletArgs {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand)]
enum WalletCommand {
    /// Print the wallet's public key, creating the wallet if needed
    Show {
        /// Path to the wallet PEM file (default: ~/.wallet.pem)
        #[arg(short, long)]
        wallet: Option<PathBuf>,
    },
    /// Generate a new wallet
    New {
        /// Path to the wallet PEM file (default: ~/.wallet.pem)
        #[arg(short, long)]
        wallet: Option<PathBuf>,

        /// RSA modulus size in bits
        #[arg(short, long, default_value_t = DEFAULT_KEY_BITS)]
        bits: usize,

        /// Replace an existing wallet file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: WalletArgs) -> Result<()> {
    match args.command {
        WalletCommand::Show { wallet } => show_wallet(wallet),
        WalletCommand::New {
            wallet,
            bits,
            force,
        } => new_wallet(wallet, bits, force),
    }
}

fn show_wallet(wallet: Option<PathBuf>) -> Result<()> {
    let wallet = super::open_wallet(wallet)?;
    print_wallet(&wallet);
    Ok(())
}

fn new_wallet(wallet: Option<PathBuf>, bits: usize, force: bool) -> Result<()> {
    let path = super::wallet_path(wallet);
    if path.exists() && !force {
        anyhow::bail!(
            "Wallet already exists at {} (use --force to replace it)",
            path.display()
        );
    }

    println!("{}", "Generating wallet...".bold().cyan());
    let wallet = Wallet::create(&path, bits)
        .with_context(|| format!("Failed to create wallet: {}", path.display()))?;

    println!("{}  Saved wallet to: {}", "✓".green().bold(), path.display().to_string().bright_black());
    print_wallet(&wallet);
    Ok(())
}

fn print_wallet(wallet: &Wallet) {
    println!();
    println!("{}", "Wallet:".bold().cyan());
    println!("  Path: {}", wallet.path().display().to_string().bright_black());
    println!("  Bits: {}", wallet.identity().bits().to_string().bright_cyan());
    println!();
    print!("{}", wallet.public_key().as_pem().bright_yellow());
}
