//! Transaction operations command.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use clarke_core::{Hash, PublicKey, Transaction, TransactionInput, TransactionOutput};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct TxArgs {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand)]
enum TxCommand {
    /// Build and sign a single-input, single-output transaction
    Sign {
        /// Path to the signing wallet PEM file (default: ~/.wallet.pem)
        #[arg(short, long)]
        wallet: Option<PathBuf>,

        /// Hash of the transaction being spent (hex format)
        #[arg(short, long)]
        source: String,

        /// Output index within the source transaction
        #[arg(short, long)]
        index: u64,

        /// File holding the recipient's public key PEM
        #[arg(long)]
        to: PathBuf,

        /// Amount to send
        #[arg(short, long)]
        amount: u64,
    },
    /// Check a transaction's signatures against a public key
    Verify {
        /// File holding the transaction JSON
        file: PathBuf,

        /// File holding the signer's public key PEM
        #[arg(short, long)]
        key: PathBuf,
    },
}

pub fn run(args: TxArgs) -> Result<()> {
    match args.command {
        TxCommand::Sign {
            wallet,
            source,
            index,
            to,
            amount,
        } => sign_transaction(wallet, source, index, to, amount),
        TxCommand::Verify { file, key } => verify_transaction(file, key),
    }
}

fn read_public_key(path: &Path) -> Result<PublicKey> {
    let pem = fs::read_to_string(path)
        .with_context(|| format!("Failed to read public key: {}", path.display()))?;
    PublicKey::from_pem(pem).with_context(|| format!("Invalid public key in {}", path.display()))
}

fn sign_transaction(
    wallet: Option<PathBuf>,
    source: String,
    index: u64,
    to: PathBuf,
    amount: u64,
) -> Result<()> {
    let wallet = super::open_wallet(wallet)?;
    let source_hash =
        Hash::from_hex(&source).with_context(|| format!("Invalid source hash: {}", source))?;
    let recipient = read_public_key(&to)?;

    let tx = Transaction::new(
        vec![TransactionInput::new(source_hash, index)],
        vec![TransactionOutput::new(amount, recipient)],
    )
    .signed(wallet.identity())
    .context("Failed to sign transaction")?;

    println!("{}", serde_json::to_string_pretty(&tx)?);
    eprintln!("{} {}", "hash".bright_black(), tx.hash().to_hex().bright_yellow());
    Ok(())
}

fn verify_transaction(file: PathBuf, key: PathBuf) -> Result<()> {
    let json = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read transaction: {}", file.display()))?;
    let tx: Transaction = serde_json::from_str(&json).context("Invalid transaction JSON")?;
    let public_key = read_public_key(&key)?;

    if tx.verify_signatures(&public_key) {
        println!("{}  Signatures valid", "✓".green().bold());
        Ok(())
    } else {
        bail!("Signature check failed for transaction {}", tx.hash())
    }
}
