//! CLI commands module.

use anyhow::{Context, Result};
use clap::Subcommand;
use clarke_storage::Wallet;
use std::path::{Path, PathBuf};

mod chain;
mod mine;
mod send;
mod serve;
mod tx;
mod wallet;

/// Wallet file used when `--wallet` is not given.
const DEFAULT_WALLET_FILE: &str = ".wallet.pem";

/// Subdirectory of the data directory holding the block database.
const CHAIN_DIR: &str = "chain";

#[derive(Subcommand)]
pub enum Commands {
    /// Wallet management
    Wallet(wallet::WalletArgs),
    /// Mine a block paying the wallet and append it to the chain
    Mine(mine::MineArgs),
    /// Inspect stored blocks
    Chain(chain::ChainArgs),
    /// Transaction operations
    Tx(tx::TxArgs),
    /// Run a node
    Serve(serve::ServeArgs),
    /// Send one protocol message to a node
    Send(send::SendArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Wallet(args) => wallet::run(args),
        Commands::Mine(args) => mine::run(args),
        Commands::Chain(args) => chain::run(args),
        Commands::Tx(args) => tx::run(args),
        Commands::Serve(args) => serve::run(args),
        Commands::Send(args) => send::run(args),
    }
}

/// `--wallet` if given, otherwise `~/.wallet.pem`.
pub(crate) fn wallet_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_WALLET_FILE)
    })
}

/// Open the wallet, creating it on first use.
pub(crate) fn open_wallet(explicit: Option<PathBuf>) -> Result<Wallet> {
    let path = wallet_path(explicit);
    Wallet::open(&path).with_context(|| format!("Failed to open wallet: {}", path.display()))
}

pub(crate) fn chain_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(CHAIN_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wallet_path_wins() {
        let path = PathBuf::from("/tmp/custom.pem");
        assert_eq!(wallet_path(Some(path.clone())), path);
    }

    #[test]
    fn test_default_wallet_file_name() {
        assert!(wallet_path(None).ends_with(DEFAULT_WALLET_FILE));
    }

    #[test]
    fn test_chain_dir() {
        assert_eq!(chain_dir(Path::new("./data")), PathBuf::from("./data/chain"));
    }
}
