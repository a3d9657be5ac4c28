//! Nonce search.
//!
//! Candidates are evaluated as pure values against a [`HeaderTemplate`]; the
//! block itself is only touched once, to commit a winning nonce. Exhausting the
//! budget or cancelling leaves the block exactly as it was.

use crate::block::Block;
use crate::hash::Hash;
use crate::target::Target;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// How many attempts pass between cancellation/deadline checks.
const CHECK_INTERVAL: u64 = 1024;

/// A block header with everything but the nonce already absorbed into a
/// SHA-256 state.
#[derive(Clone)]
pub struct HeaderTemplate {
    prefix: Sha256,
    target: Target,
}

impl HeaderTemplate {
    pub fn new(block: &Block) -> Self {
        let mut prefix = Sha256::new();
        prefix.update(block.header_prefix());
        Self {
            prefix,
            target: block.target,
        }
    }

    /// The block hash the header would have with `nonce`.
    pub fn hash_with_nonce(&self, nonce: u64) -> Hash {
        let mut hasher = self.prefix.clone();
        hasher.update(nonce.to_be_bytes());
        Hash(hasher.finalize().into())
    }

    /// The block hash for `nonce` if it meets the target.
    pub fn check(&self, nonce: u64) -> Option<Hash> {
        let hash = self.hash_with_nonce(nonce);
        self.target.is_met_by(&hash).then_some(hash)
    }
}

/// Result of a bounded or cancellable search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningOutcome {
    /// A valid nonce was found and committed to the block.
    Found { nonce: u64, hash: Hash, attempts: u64 },
    /// The attempt budget or deadline ran out.
    Exhausted { attempts: u64 },
    /// The search was cancelled through its [`CancelToken`].
    Cancelled { attempts: u64 },
}

impl MiningOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, MiningOutcome::Found { .. })
    }

    pub fn attempts(&self) -> u64 {
        match *self {
            MiningOutcome::Found { attempts, .. }
            | MiningOutcome::Exhausted { attempts }
            | MiningOutcome::Cancelled { attempts } => attempts,
        }
    }
}

/// Shared flag for stopping a search from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Miner configuration.
#[derive(Debug, Clone)]
pub struct MinerConfig {
    /// Number of worker threads. `1` searches on the calling thread.
    pub workers: usize,
    /// Maximum number of nonces to try; `None` for unbounded.
    pub max_attempts: Option<u64>,
    /// Wall-clock limit for one search.
    pub deadline: Option<Duration>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            max_attempts: None,
            deadline: None,
        }
    }
}

/// Errors that can occur while setting up a miner.
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("failed to build mining thread pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}

/// Searches nonces for a block, optionally across several threads.
pub struct Miner {
    config: MinerConfig,
    pool: Option<ThreadPool>,
    cancel: CancelToken,
}

enum Stop {
    Found(u64, Hash),
    Exhausted,
    Cancelled,
}

impl Miner {
    /// Create a miner. A thread pool is built when `workers > 1`.
    pub fn new(config: MinerConfig) -> Result<Self, MinerError> {
        let pool = if config.workers > 1 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(config.workers)
                    .thread_name(|i| format!("clarke-miner-{}", i))
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self {
            config,
            pool,
            cancel: CancelToken::new(),
        })
    }

    /// A single-threaded, unbounded miner.
    pub fn sequential() -> Self {
        Self {
            config: MinerConfig::default(),
            pool: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.config.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline = Some(deadline);
        self
    }

    /// Use an externally owned cancellation flag.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that stops any search in progress on this miner.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Search upward from the block's current nonce. On success the winning
    /// nonce is written to the block; otherwise the block is unchanged.
    pub fn mine(&self, block: &mut Block) -> MiningOutcome {
        let template = HeaderTemplate::new(block);
        let start = block.nonce;
        // Inclusive upper bound so the search can reach `u64::MAX`.
        let last = match self.config.max_attempts {
            Some(0) => None,
            Some(budget) => Some(start.saturating_add(budget - 1)),
            None => Some(u64::MAX),
        };
        let deadline = self.config.deadline.map(|d| Instant::now() + d);
        let attempts = AtomicU64::new(0);
        let started = Instant::now();

        let stop = last.and_then(|last| match &self.pool {
            Some(pool) => pool.install(|| {
                (start..=last)
                    .into_par_iter()
                    .find_map_any(|nonce| self.try_nonce(&template, nonce, &attempts, deadline))
            }),
            None => (start..=last).find_map(|nonce| self.try_nonce(&template, nonce, &attempts, deadline)),
        });

        let attempts = attempts.into_inner();
        let outcome = match stop {
            Some(Stop::Found(nonce, hash)) => {
                block.nonce = nonce;
                MiningOutcome::Found {
                    nonce,
                    hash,
                    attempts,
                }
            }
            Some(Stop::Cancelled) => MiningOutcome::Cancelled { attempts },
            Some(Stop::Exhausted) | None => MiningOutcome::Exhausted { attempts },
        };

        debug!(
            ?outcome,
            workers = self.config.workers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "nonce search finished"
        );
        outcome
    }

    fn try_nonce(
        &self,
        template: &HeaderTemplate,
        nonce: u64,
        attempts: &AtomicU64,
        deadline: Option<Instant>,
    ) -> Option<Stop> {
        let n = attempts.fetch_add(1, Ordering::Relaxed);
        if n % CHECK_INTERVAL == 0 {
            if self.cancel.is_cancelled() {
                attempts.fetch_sub(1, Ordering::Relaxed);
                return Some(Stop::Cancelled);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                attempts.fetch_sub(1, Ordering::Relaxed);
                return Some(Stop::Exhausted);
            }
        }
        template.check(nonce).map(|hash| Stop::Found(nonce, hash))
    }
}

impl Default for Miner {
    fn default() -> Self {
        Self::sequential()
    }
}
