//! TCP server answering one request per connection.

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};
use crate::peers::PeerBook;
use crate::protocol::{Message, REQUEST_TERMINATOR};
use serde_json::Value;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

const ECHO: &str = "echo";

/// Largest request body accepted before the connection is dropped.
pub const MAX_REQUEST_BYTES: usize = 1 << 20;

pub struct Server {
    listener: TcpListener,
    peers: PeerBook,
}

impl Server {
    /// Bind to the configured host and port. Port 0 picks a free port.
    pub async fn bind(config: &NodeConfig) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        Ok(Self {
            listener,
            peers: PeerBook::from(config.peers.clone()),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn peers(&self) -> &PeerBook {
        &self.peers
    }

    /// Accept connections until the listener fails. Each connection is
    /// handled on its own task.
    pub async fn serve(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "node listening");
        loop {
            let (stream, remote) = self.listener.accept().await?;
            let peers = self.peers.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, &peers).await {
                    warn!(%remote, error = %e, "connection failed");
                }
            });
        }
    }
}

async fn handle_connection(mut stream: TcpStream, peers: &PeerBook) -> Result<()> {
    let request = read_request(&mut stream).await?;
    let response = reply_to(&request, peers).await?;
    stream.write_all(&response).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Build the reply bytes for a raw request. Echo requests are answered with
/// the request bytes exactly as received.
async fn reply_to(request: &[u8], peers: &PeerBook) -> Result<Vec<u8>> {
    let value: Value = match serde_json::from_slice(request) {
        Ok(value) => value,
        Err(e) => return rejected(e),
    };
    if value.get("message_type").and_then(Value::as_str) == Some(ECHO) {
        debug!(message_type = ECHO, "request");
        return Ok(request.to_vec());
    }
    let message: Message = match serde_json::from_value(value) {
        Ok(message) => message,
        Err(e) => return rejected(e),
    };
    debug!(message_type = message.message_type(), "request");
    Ok(serde_json::to_vec(&respond(message, peers).await)?)
}

fn rejected(e: serde_json::Error) -> Result<Vec<u8>> {
    warn!(error = %e, "rejected malformed request");
    Ok(serde_json::to_vec(&Message::error(format!("invalid message: {e}")))?)
}

/// Read until a blank line or end of stream, returning the bytes before the
/// terminator.
async fn read_request(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(request);
        }
        // Re-scan the last byte of the previous chunk in case the
        // terminator straddles two reads.
        let scan_from = request.len().saturating_sub(1);
        request.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_terminator(&request[scan_from..]) {
            request.truncate(scan_from + pos);
            return Ok(request);
        }
        if request.len() > MAX_REQUEST_BYTES {
            return Err(NodeError::RequestTooLarge {
                limit: MAX_REQUEST_BYTES,
            });
        }
    }
}

fn find_terminator(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(REQUEST_TERMINATOR.len())
        .position(|window| window == REQUEST_TERMINATOR)
}

/// Compute the reply to a single request.
pub async fn respond(message: Message, peers: &PeerBook) -> Message {
    match message {
        Message::Echo { .. } => message,
        Message::GetPeers { .. } => Message::GetPeers {
            payload: Some(peers.list().await),
        },
        Message::AddPeer { payload } => {
            if peers.add(payload.clone()).await {
                info!(peer = %payload, "added peer");
            }
            Message::GetPeers {
                payload: Some(peers.list().await),
            }
        }
        Message::Error { .. } => Message::error("error messages are not requests"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Peer;

    #[test]
    fn test_find_terminator() {
        assert_eq!(find_terminator(b"{}\n\n"), Some(2));
        assert_eq!(find_terminator(b"{}\n"), None);
        assert_eq!(find_terminator(b"\n\n"), Some(0));
        assert_eq!(find_terminator(b""), None);
    }

    #[tokio::test]
    async fn test_echo_reply_is_the_raw_request() {
        let peers = PeerBook::new();
        let request = br#"{"message_type":"echo","id":7}"#;
        let reply = reply_to(request, &peers).await.unwrap();
        assert_eq!(reply, request.to_vec());

        let request = br#"{"message_type":"echo"}"#;
        let reply = reply_to(request, &peers).await.unwrap();
        assert_eq!(reply, request.to_vec());
    }

    #[tokio::test]
    async fn test_malformed_reply_is_error() {
        let reply = reply_to(b"{", &PeerBook::new()).await.unwrap();
        let reply: Value = serde_json::from_slice(&reply).unwrap();
        assert_eq!(reply["message_type"], "error");
    }

    #[tokio::test]
    async fn test_respond_echo() {
        let peers = PeerBook::new();
        let msg = Message::echo("pizza");
        assert_eq!(respond(msg.clone(), &peers).await, msg);
    }

    #[tokio::test]
    async fn test_respond_add_then_get() {
        let peers = PeerBook::new();
        let reply = respond(Message::add_peer(Peer::new("h", 1)), &peers).await;
        assert_eq!(
            reply,
            Message::GetPeers {
                payload: Some(vec![Peer::new("h", 1)])
            }
        );

        let reply = respond(Message::get_peers(), &peers).await;
        assert_eq!(
            reply,
            Message::GetPeers {
                payload: Some(vec![Peer::new("h", 1)])
            }
        );
    }

    #[tokio::test]
    async fn test_respond_to_error_message() {
        let reply = respond(Message::error("boom"), &PeerBook::new()).await;
        assert!(matches!(reply, Message::Error { .. }));
    }
}
