//! Node configuration, stored as `config.json` in the data directory.

use crate::error::{NodeError, Result};
use crate::protocol::Peer;
use clarke_core::{Target, COINBASE_REWARD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name of the config inside a data directory.
pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8334;

/// Settings for the node and the miner. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Address to listen on.
    pub host: String,
    pub port: u16,
    /// Amount credited by each mined block's reward transaction.
    pub reward: u64,
    /// Target new blocks are mined against.
    pub target: Target,
    /// Worker threads used by the miner.
    pub mining_workers: usize,
    /// Peers known at startup.
    pub peers: Vec<Peer>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            reward: COINBASE_REWARD,
            target: Target::default(),
            mining_workers: 1,
            peers: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Read a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| NodeError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Read `config.json` from `data_dir`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from_dir<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir.as_ref().join(CONFIG_FILE);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the config as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `host:port` string to bind or connect to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.listen_addr(), "127.0.0.1:8334");
        assert_eq!(config.reward, 25);
        assert_eq!(config.target, Target::default());
        assert_eq!(config.mining_workers, 1);
        assert!(config.peers.is_empty());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: NodeConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.reward, COINBASE_REWARD);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config = NodeConfig {
            port: 9100,
            target: Target::with_leading_zeros(2),
            peers: vec![Peer::new("10.0.0.5", 8334)],
            ..NodeConfig::default()
        };
        config.save(dir.path().join(CONFIG_FILE)).unwrap();

        let loaded = NodeConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_in_dir_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = NodeConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config, NodeConfig::default());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempdir().unwrap();
        let result = NodeConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(NodeError::Config { .. })));
    }
}
