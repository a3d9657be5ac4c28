//! The sled database behind the chain store.
//!
//! Every record lives under a [`Key`]; values are bincode-encoded. Writes go
//! through a [`WriteBatch`] so a block and the indexes pointing at it land
//! together or not at all.

use clarke_core::Hash;
use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Corrupt record: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Invalid genesis: {0}")]
    InvalidGenesis(String),

    #[error("Block {hash} does not meet its target")]
    InvalidProofOfWork { hash: Hash },

    #[error("Block parent {got} doesn't match chain head {expected}")]
    ParentMismatch { expected: Hash, got: Hash },

    #[error("Chain not initialized")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A record in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `block:hash:` followed by the 32 raw hash bytes. Holds a `Block`.
    Block(Hash),
    /// `block:height:{n}`. Holds the `Hash` of the block at that height.
    Height(u64),
    /// `chain:head`. Holds the `Hash` of the newest block.
    Head,
    /// `chain:height`. Holds the head's height as `u64`.
    TipHeight,
}

impl Key {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Key::Block(hash) => {
                let mut key = b"block:hash:".to_vec();
                key.extend_from_slice(hash.as_bytes());
                key
            }
            Key::Height(height) => format!("block:height:{}", height).into_bytes(),
            Key::Head => b"chain:head".to_vec(),
            Key::TipHeight => b"chain:height".to_vec(),
        }
    }
}

/// Writes applied atomically by [`Storage::apply`].
#[derive(Default)]
pub struct WriteBatch {
    batch: sled::Batch,
    len: usize,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `value` under `key`, replacing whatever is there.
    pub fn put<V: Serialize>(&mut self, key: Key, value: &V) -> Result<&mut Self> {
        self.batch.insert(key.to_bytes(), bincode::serialize(value)?);
        self.len += 1;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct Storage {
    db: Db,
}

impl Storage {
    /// Open (or create) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// A database that disappears when dropped.
    pub fn open_temporary() -> Result<Self> {
        Ok(Self {
            db: sled::Config::new().temporary(true).open()?,
        })
    }

    /// Decode the record under `key`, if present.
    pub fn read<V: DeserializeOwned>(&self, key: Key) -> Result<Option<V>> {
        self.db
            .get(key.to_bytes())?
            .map(|bytes| bincode::deserialize(&bytes))
            .transpose()
            .map_err(StorageError::from)
    }

    pub fn apply(&self, batch: WriteBatch) -> Result<()> {
        self.db.apply_batch(batch.batch)?;
        Ok(())
    }

    /// Block until all applied batches are on disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
