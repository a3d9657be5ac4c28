//! Proof-of-work blocks.

use crate::codec::{Encode, Encoder};
use crate::crypto::PublicKey;
use crate::hash::{hash, hash_concat, Hash};
use crate::mining::{HeaderTemplate, Miner, MiningOutcome};
use crate::target::Target;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// An ordered set of transactions chained to a parent block and sealed by a
/// nonce that brings the header hash below `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Hash of the previous block ([`Hash::ZERO`] for genesis).
    pub parent_hash: Hash,
    /// Transactions in block order.
    pub transactions: Vec<Transaction>,
    /// Difficulty threshold this block must meet.
    pub target: Target,
    /// Unix timestamp in seconds, captured at construction.
    pub timestamp: u64,
    /// Proof-of-work nonce, starts at 0.
    pub nonce: u64,
}

impl Block {
    /// Create an unmined block stamped with the current time.
    pub fn new(parent_hash: Hash, transactions: Vec<Transaction>, target: Target) -> Self {
        Self::with_timestamp(parent_hash, transactions, target, Self::current_timestamp())
    }

    /// Create an unmined block with an explicit timestamp.
    pub fn with_timestamp(
        parent_hash: Hash,
        transactions: Vec<Transaction>,
        target: Target,
        timestamp: u64,
    ) -> Self {
        Self {
            parent_hash,
            transactions,
            target,
            timestamp,
            nonce: 0,
        }
    }

    /// An unmined first block holding a single reward for `recipient`.
    pub fn genesis(recipient: PublicKey, target: Target) -> Self {
        Self::new(Hash::ZERO, vec![Transaction::reward(recipient)], target)
    }

    /// Get the current Unix timestamp.
    pub fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    /// SHA-256 of the member transaction hashes concatenated in block order.
    /// A flat hash-of-hashes, not a Merkle root.
    pub fn transactions_hash(&self) -> Hash {
        let hashes: Vec<Hash> = self.transactions.iter().map(Transaction::hash).collect();
        let parts: Vec<&[u8]> = hashes.iter().map(|h| h.as_ref()).collect();
        hash_concat(&parts)
    }

    /// Header bytes without the trailing nonce. Mining hashes this once and
    /// appends each candidate nonce.
    pub(crate) fn header_prefix(&self) -> Vec<u8> {
        let mut enc = Encoder::with_capacity(32 + 32 + 8 + 32 + 8);
        enc.put_hash(&self.parent_hash)
            .put_hash(&self.transactions_hash())
            .put_u64(self.timestamp);
        self.target.encode_to(&mut enc);
        enc.finish()
    }

    /// `parent_hash ∥ transactions_hash ∥ timestamp ∥ target ∥ nonce`.
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.put_fixed(&self.header_prefix()).put_u64(self.nonce);
        enc.finish()
    }

    /// SHA-256 of the header bytes.
    pub fn hash(&self) -> Hash {
        hash(&self.header_bytes())
    }

    /// Whether the header hash is numerically below the target.
    pub fn is_valid(&self) -> bool {
        self.target.is_met_by(&self.hash())
    }

    pub fn is_genesis(&self) -> bool {
        self.parent_hash == Hash::ZERO
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Search upward from the current nonce until the block is valid and
    /// return the winning hash. Unbounded; use [`Block::mine_bounded`] or a
    /// [`Miner`] to cap the work.
    pub fn mine(&mut self) -> Hash {
        let template = HeaderTemplate::new(self);
        loop {
            if let Some(found) = template.check(self.nonce) {
                return found;
            }
            // Wraps only after 2^64 attempts.
            self.nonce = self.nonce.wrapping_add(1);
        }
    }

    /// Try at most `max_attempts` nonces. The nonce is only updated when a
    /// valid one is found.
    pub fn mine_bounded(&mut self, max_attempts: u64) -> MiningOutcome {
        Miner::sequential()
            .with_max_attempts(max_attempts)
            .mine(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_keys::alice;
    use crate::transaction::{TransactionInput, TransactionOutput};

    fn sample_block(target: Target) -> Block {
        let reward = Transaction::reward(alice().public_key().clone());
        Block::with_timestamp(Hash([3; 32]), vec![reward], target, 1_700_000_000)
    }

    #[test]
    fn test_new_block_starts_unmined() {
        let block = Block::new(Hash::ZERO, vec![], Target::default());
        assert_eq!(block.nonce, 0);
        assert_eq!(block.target, Target::DEFAULT);
        assert!(block.timestamp > 0);
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis(alice().public_key().clone(), Target::MAX);
        assert!(genesis.is_genesis());
        assert_eq!(genesis.tx_count(), 1);
        assert!(genesis.transactions[0].is_coinbase());
    }

    #[test]
    fn test_block_hash_deterministic() {
        let block = sample_block(Target::DEFAULT);
        assert_eq!(block.hash(), block.hash());
        assert_eq!(block.hash(), block.clone().hash());
    }

    #[test]
    fn test_header_layout() {
        let block = sample_block(Target::MAX);
        let bytes = block.header_bytes();

        assert_eq!(bytes.len(), 32 + 32 + 8 + 32 + 8);
        assert_eq!(&bytes[..32], &[3; 32]);
        assert_eq!(&bytes[32..64], block.transactions_hash().as_bytes());
        assert_eq!(&bytes[64..72], &1_700_000_000u64.to_be_bytes());
        assert_eq!(&bytes[72..104], &[0xFF; 32]);
        assert_eq!(&bytes[104..], &0u64.to_be_bytes());
        assert_eq!(block.hash(), hash(&bytes));
    }

    #[test]
    fn test_transactions_hash_is_flat_and_ordered() {
        let a = Transaction::coinbase(alice().public_key().clone(), 1);
        let b = Transaction::coinbase(alice().public_key().clone(), 2);
        let ab = Block::with_timestamp(Hash::ZERO, vec![a.clone(), b.clone()], Target::MAX, 0);
        let ba = Block::with_timestamp(Hash::ZERO, vec![b.clone(), a.clone()], Target::MAX, 0);

        let expected = hash_concat(&[a.hash().as_ref(), b.hash().as_ref()]);
        assert_eq!(ab.transactions_hash(), expected);
        assert_ne!(ab.transactions_hash(), ba.transactions_hash());
    }

    #[test]
    fn test_empty_transactions_hash() {
        let block = Block::with_timestamp(Hash::ZERO, vec![], Target::MAX, 0);
        assert_eq!(block.transactions_hash(), hash(&[]));
    }

    #[test]
    fn test_every_header_field_changes_hash() {
        let base = sample_block(Target::DEFAULT);
        let original = base.hash();

        let mut b = base.clone();
        b.parent_hash.0[0] ^= 1;
        assert_ne!(b.hash(), original);

        let mut b = base.clone();
        b.transactions.push(Transaction::coinbase(alice().public_key().clone(), 1));
        assert_ne!(b.hash(), original);

        let mut b = base.clone();
        b.timestamp += 1;
        assert_ne!(b.hash(), original);

        let mut b = base.clone();
        b.target = Target::MAX;
        assert_ne!(b.hash(), original);

        let mut b = base.clone();
        b.nonce += 1;
        assert_ne!(b.hash(), original);
    }

    #[test]
    fn test_mine_terminates_valid() {
        let mut block = sample_block(Target::with_leading_zeros(1));
        let found = block.mine();

        assert!(block.is_valid());
        assert_eq!(found, block.hash());
        assert!(block.target.is_met_by(&block.hash()));
    }

    #[test]
    fn test_max_target_mines_on_first_nonce() {
        let mut block = sample_block(Target::MAX);
        block.mine();
        assert_eq!(block.nonce, 0);
        assert!(block.is_valid());
    }

    #[test]
    fn test_zero_target_never_found_within_budget() {
        let mut block = sample_block(Target::ZERO);
        let outcome = block.mine_bounded(2_000);

        assert_eq!(outcome, MiningOutcome::Exhausted { attempts: 2_000 });
        assert_eq!(block.nonce, 0);
        assert!(!block.is_valid());
    }

    #[test]
    fn test_mine_bounded_commits_winner() {
        let mut block = sample_block(Target::with_leading_zeros(1));
        let outcome = block.mine_bounded(100_000);

        match outcome {
            MiningOutcome::Found { nonce, hash, .. } => {
                assert_eq!(block.nonce, nonce);
                assert_eq!(block.hash(), hash);
                assert!(block.is_valid());
            }
            other => panic!("expected a nonce, got {:?}", other),
        }
    }

    #[test]
    fn test_mining_is_deterministic_for_fixed_header() {
        let mut a = sample_block(Target::with_leading_zeros(2));
        let mut b = a.clone();
        a.mine();
        b.mine();
        assert_eq!(a.nonce, b.nonce);
    }

    #[test]
    fn test_json_roundtrip_preserves_hash() {
        let tx = Transaction::new(
            vec![TransactionInput::new(Hash([5; 32]), 1)],
            vec![TransactionOutput::new(7, alice().public_key().clone())],
        )
        .signed(alice())
        .unwrap();
        let mut block = Block::with_timestamp(Hash([1; 32]), vec![tx], Target::MAX, 42);
        block.mine();

        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
        assert_eq!(back.hash(), block.hash());
        assert!(back.is_valid());
    }
}
