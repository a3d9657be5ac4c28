//! Clarke Coin node: a small TCP protocol for talking to peers.
//!
//! Requests are single JSON messages terminated by a blank line; the server
//! writes one JSON reply and closes the connection.
//!
//! ```rust,no_run
//! use clarke_node::{client, Message, NodeConfig, Server};
//!
//! # async fn run() -> clarke_node::Result<()> {
//! let server = Server::bind(&NodeConfig::default()).await?;
//! let addr = server.local_addr()?;
//! tokio::spawn(server.serve());
//!
//! let reply = client::transmit(addr, &Message::echo("pizza")).await?;
//! assert_eq!(reply, Message::echo("pizza"));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod peers;
pub mod protocol;
pub mod server;

pub use client::transmit;
pub use config::{NodeConfig, CONFIG_FILE};
pub use error::{NodeError, Result};
pub use peers::PeerBook;
pub use protocol::{Message, Peer, REQUEST_TERMINATOR};
pub use server::Server;
