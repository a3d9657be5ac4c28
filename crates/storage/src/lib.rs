//! Persistence for Clarke Coin.
//!
//! This crate provides the on-disk pieces around the core types:
//! - Block storage indexed by hash and height, with head tracking
//! - PEM wallet files (load if present, otherwise generate and save)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                    │
//! │                  (CLI, node, mining)                    │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                     Storage Layer                       │
//! │  ┌─────────────┐  ┌─────────────────┐  ┌─────────────┐  │
//! │  │ ChainStore  │  │ Storage (DB)    │  │ Wallet      │  │
//! │  │  - Blocks   │  │  - sled wrapper │  │  - PEM file │  │
//! │  │  - Height   │  │  - bincode      │  │  - keygen   │  │
//! │  │  - Genesis  │  │  - typed keys   │  │             │  │
//! │  └─────────────┘  └─────────────────┘  └─────────────┘  │
//! └────────────────────────┬──────────────────────┬─────────┘
//!                          │                      │
//!               ┌──────────▼──────────┐   ┌───────▼────────┐
//!               │   sled Database     │   │  filesystem    │
//!               └─────────────────────┘   └────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use clarke_core::{Block, Hash, Target};
//! use clarke_storage::{ChainStore, Storage, Wallet};
//!
//! let wallet = Wallet::open("./data/wallet.pem").unwrap();
//! let storage = Storage::open("./data/chain").unwrap();
//! let chain = ChainStore::new(&storage);
//!
//! let mut genesis = Block::genesis(wallet.public_key().clone(), Target::default());
//! genesis.mine();
//! chain.init_genesis(&genesis).unwrap();
//! ```

pub mod chain;
pub mod db;
pub mod wallet;

// Re-export commonly used types
pub use chain::ChainStore;
pub use db::{Key, Result, Storage, StorageError, WriteBatch};
pub use wallet::{Wallet, WalletError};
