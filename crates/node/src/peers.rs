//! Known peers, shared between connection handlers.

use crate::protocol::Peer;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A de-duplicating list of peers in the order they were first added.
///
/// Clones share the same underlying list.
#[derive(Debug, Clone, Default)]
pub struct PeerBook {
    peers: Arc<RwLock<Vec<Peer>>>,
}

impl PeerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peer. Returns `false` if it was already known.
    pub async fn add(&self, peer: Peer) -> bool {
        let mut peers = self.peers.write().await;
        if peers.contains(&peer) {
            return false;
        }
        peers.push(peer);
        true
    }

    pub async fn contains(&self, peer: &Peer) -> bool {
        self.peers.read().await.contains(peer)
    }

    /// Snapshot of all peers.
    pub async fn list(&self) -> Vec<Peer> {
        self.peers.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

impl From<Vec<Peer>> for PeerBook {
    fn from(initial: Vec<Peer>) -> Self {
        let mut peers: Vec<Peer> = Vec::with_capacity(initial.len());
        for peer in initial {
            if !peers.contains(&peer) {
                peers.push(peer);
            }
        }
        Self {
            peers: Arc::new(RwLock::new(peers)),
        }
    }
}
