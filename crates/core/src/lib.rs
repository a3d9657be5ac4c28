//! Core primitives for the Clarke Coin blockchain.
//!
//! This crate provides the fundamental types used throughout the workspace:
//! - Canonical byte encoding shared by signing and block hashing
//! - SHA-256 hashes and 256-bit proof-of-work targets
//! - RSA key identities, PEM public keys and signatures
//! - Transactions spending prior outputs
//! - Blocks and the nonce-search miner
//!
//! # Example
//!
//! ```rust,no_run
//! use clarke_core::{Block, Hash, KeyIdentity, Target, Transaction};
//!
//! let wallet = KeyIdentity::generate().unwrap();
//! let reward = Transaction::reward(wallet.public_key().clone());
//!
//! let mut block = Block::new(Hash::ZERO, vec![reward], Target::default());
//! block.mine();
//! assert!(block.is_valid());
//! ```

pub mod block;
pub mod codec;
pub mod crypto;
pub mod hash;
pub mod mining;
pub mod target;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::Block;
pub use codec::{Encode, Encoder, EncodingError, CODEC_VERSION};
pub use crypto::{verify, CryptoError, KeyIdentity, PublicKey, Signature, DEFAULT_KEY_BITS};
pub use hash::{hash, hash_concat, Hash, H256};
pub use mining::{CancelToken, HeaderTemplate, Miner, MinerConfig, MinerError, MiningOutcome};
pub use target::{FixedTarget, Target, TargetPolicy, U256};
pub use transaction::{Transaction, TransactionInput, TransactionOutput, COINBASE_REWARD};

/// Keys shared by unit tests; RSA generation is too slow to repeat per test.
#[cfg(test)]
pub(crate) mod test_keys {
    use crate::crypto::KeyIdentity;
    use std::sync::OnceLock;

    static ALICE: OnceLock<KeyIdentity> = OnceLock::new();
    static BOB: OnceLock<KeyIdentity> = OnceLock::new();

    pub fn alice() -> &'static KeyIdentity {
        ALICE.get_or_init(|| KeyIdentity::generate_with_bits(1024).unwrap())
    }

    pub fn bob() -> &'static KeyIdentity {
        BOB.get_or_init(|| KeyIdentity::generate_with_bits(1024).unwrap())
    }
}
