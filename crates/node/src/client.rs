//! Sending a single message to a node.

use crate::error::{NodeError, Result};
use crate::protocol::{Message, REQUEST_TERMINATOR};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

/// Send `message` to the node at `addr` and wait for its reply.
pub async fn transmit<A: ToSocketAddrs>(addr: A, message: &Message) -> Result<Message> {
    let mut stream = TcpStream::connect(addr).await?;

    let mut request = serde_json::to_vec(message)?;
    request.extend_from_slice(REQUEST_TERMINATOR);
    stream.write_all(&request).await?;
    stream.shutdown().await?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    if response.is_empty() {
        return Err(NodeError::EmptyResponse);
    }
    Ok(serde_json::from_slice(&response)?)
}
