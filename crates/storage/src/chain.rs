//! Block storage and chain head tracking.
//!
//! The store holds a single linear chain: every appended block must name the
//! current head as its parent. Competing branches are rejected rather than
//! kept.

use crate::db::{Key, Result, Storage, StorageError, WriteBatch};
use clarke_core::{Block, Hash};
use tracing::info;

/// Blocks indexed by hash and height, plus the current head.
pub struct ChainStore<'a> {
    storage: &'a Storage,
}

impl<'a> ChainStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Store `block` at `height` and make it the head, in one batch.
    fn commit_block(&self, block: &Block, height: u64) -> Result<Hash> {
        let hash = block.hash();
        let mut batch = WriteBatch::new();
        batch.put(Key::Block(hash), block)?;
        batch.put(Key::Height(height), &hash)?;
        batch.put(Key::Head, &hash)?;
        batch.put(Key::TipHeight, &height)?;
        self.storage.apply(batch)?;
        Ok(hash)
    }

    pub fn get_block_by_hash(&self, hash: &Hash) -> Result<Option<Block>> {
        self.storage.read(Key::Block(*hash))
    }

    /// Resolve the height index, then load the block it points at.
    pub fn get_block_by_height(&self, height: u64) -> Result<Option<Block>> {
        match self.storage.read::<Hash>(Key::Height(height))? {
            Some(hash) => self.get_block_by_hash(&hash),
            None => Ok(None),
        }
    }

    pub fn get_head(&self) -> Result<Option<Hash>> {
        self.storage.read(Key::Head)
    }

    /// Height of the head; 0 for an empty chain as well as for genesis.
    pub fn get_height(&self) -> Result<u64> {
        Ok(self.storage.read(Key::TipHeight)?.unwrap_or(0))
    }

    pub fn get_latest_block(&self) -> Result<Option<Block>> {
        match self.get_head()? {
            Some(hash) => self.get_block_by_hash(&hash),
            None => Ok(None),
        }
    }

    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.get_head()?.is_some())
    }

    /// Initialize the chain with a mined genesis block.
    ///
    /// This will fail if:
    /// - The block's parent is not the zero hash
    /// - The block does not meet its target
    /// - The chain is already initialized
    pub fn init_genesis(&self, genesis: &Block) -> Result<Hash> {
        if !genesis.is_genesis() {
            return Err(StorageError::InvalidGenesis(
                "Genesis block must have the zero hash as parent".into(),
            ));
        }
        if self.is_initialized()? {
            return Err(StorageError::InvalidGenesis(
                "Chain already initialized".into(),
            ));
        }
        check_proof_of_work(genesis)?;

        let hash = self.commit_block(genesis, 0)?;
        info!(%hash, "initialized chain with genesis block");
        Ok(hash)
    }

    /// Append a mined block on top of the current head, returning its height.
    ///
    /// Only the parent link and proof of work are checked; transaction
    /// references and signatures are left to the caller.
    pub fn append_block(&self, block: &Block) -> Result<u64> {
        let head = self.get_head()?.ok_or(StorageError::NotInitialized)?;
        if block.parent_hash != head {
            return Err(StorageError::ParentMismatch {
                expected: head,
                got: block.parent_hash,
            });
        }
        check_proof_of_work(block)?;

        let height = self.get_height()? + 1;
        let hash = self.commit_block(block, height)?;
        info!(%hash, height, txs = block.tx_count(), "appended block");
        Ok(height)
    }

    /// Get blocks in a range [from_height, to_height].
    pub fn get_blocks_range(&self, from_height: u64, to_height: u64) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        for height in from_height..=to_height {
            if let Some(block) = self.get_block_by_height(height)? {
                blocks.push(block);
            } else {
                break; // Stop at first missing block
            }
        }
        Ok(blocks)
    }

    /// Get the last N blocks (most recent first).
    pub fn get_recent_blocks(&self, count: u64) -> Result<Vec<Block>> {
        if count == 0 || !self.is_initialized()? {
            return Ok(Vec::new());
        }
        let height = self.get_height()?;
        let from = height.saturating_sub(count - 1);
        let mut blocks = self.get_blocks_range(from, height)?;
        blocks.reverse();
        Ok(blocks)
    }
}

fn check_proof_of_work(block: &Block) -> Result<()> {
    if block.is_valid() {
        Ok(())
    } else {
        Err(StorageError::InvalidProofOfWork { hash: block.hash() })
    }
}
