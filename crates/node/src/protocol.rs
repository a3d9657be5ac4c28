//! Wire messages.
//!
//! Every message is a JSON object whose `message_type` field selects the
//! variant; the remaining data travels in `payload`:
//!
//! ```text
//! {"message_type":"echo","payload":"pizza"}
//! {"message_type":"get_peers"}
//! {"message_type":"add_peer","payload":{"host":"10.0.0.2","port":8334}}
//! ```
//!
//! A request is terminated by a blank line (`"\n\n"`). The response is a
//! single JSON object followed by the server closing the connection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Marks the end of a request on the wire.
pub const REQUEST_TERMINATOR: &[u8] = b"\n\n";

/// A remote node's listening address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peer {
    pub host: String,
    pub port: u16,
}

impl Peer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A protocol message, used for both requests and responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum Message {
    /// Returned to the sender unchanged.
    Echo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    /// A request carries no payload; the response lists known peers.
    GetPeers {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Vec<Peer>>,
    },
    /// Register a peer with the receiving node.
    AddPeer { payload: Peer },
    /// Sent back when a request cannot be served.
    Error { payload: String },
}

impl Message {
    pub fn echo(payload: impl Into<Value>) -> Self {
        Message::Echo {
            payload: Some(payload.into()),
        }
    }

    pub fn get_peers() -> Self {
        Message::GetPeers { payload: None }
    }

    pub fn add_peer(peer: Peer) -> Self {
        Message::AddPeer { payload: peer }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Message::Error {
            payload: reason.into(),
        }
    }

    /// Build a message from its type name and an optional JSON payload.
    pub fn from_parts(message_type: &str, payload: Option<Value>) -> serde_json::Result<Self> {
        let mut object = serde_json::Map::new();
        object.insert("message_type".into(), Value::String(message_type.into()));
        if let Some(payload) = payload {
            object.insert("payload".into(), payload);
        }
        serde_json::from_value(Value::Object(object))
    }

    /// The `message_type` tag as it appears on the wire.
    pub fn message_type(&self) -> &'static str {
        match self {
            Message::Echo { .. } => "echo",
            Message::GetPeers { .. } => "get_peers",
            Message::AddPeer { .. } => "add_peer",
            Message::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_echo_wire_format() {
        let msg = Message::echo("pizza");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"message_type": "echo", "payload": "pizza"}));
    }

    #[test]
    fn test_echo_without_payload_stays_without_payload() {
        let parsed: Message = serde_json::from_str(r#"{"message_type":"echo"}"#).unwrap();
        assert_eq!(parsed, Message::Echo { payload: None });
        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value, json!({"message_type": "echo"}));
    }

    #[test]
    fn test_get_peers_request_has_no_payload() {
        let value = serde_json::to_value(Message::get_peers()).unwrap();
        assert_eq!(value, json!({"message_type": "get_peers"}));

        let parsed: Message = serde_json::from_str(r#"{"message_type":"get_peers"}"#).unwrap();
        assert_eq!(parsed, Message::get_peers());
    }

    #[test]
    fn test_get_peers_response_lists_peers() {
        let msg = Message::GetPeers {
            payload: Some(vec![]),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"message_type": "get_peers", "payload": []}));
    }

    #[test]
    fn test_add_peer_wire_format() {
        let msg = Message::add_peer(Peer::new("10.0.0.2", 8334));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"message_type": "add_peer", "payload": {"host": "10.0.0.2", "port": 8334}})
        );
    }

    #[test]
    fn test_echo_accepts_structured_payloads() {
        let raw = r#"{"message_type":"echo","payload":{"a":[1,2,3]}}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg, Message::echo(json!({"a": [1, 2, 3]})));
    }

    #[test]
    fn test_unknown_message_type_rejected() {
        let result = serde_json::from_str::<Message>(r#"{"message_type":"mine"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_parts() {
        let msg = Message::from_parts("echo", Some(json!("hi"))).unwrap();
        assert_eq!(msg, Message::echo("hi"));
        assert_eq!(msg.message_type(), "echo");

        let msg = Message::from_parts("get_peers", None).unwrap();
        assert_eq!(msg, Message::get_peers());

        assert!(Message::from_parts("add_peer", None).is_err());
    }

    #[test]
    fn test_peer_display() {
        assert_eq!(Peer::new("localhost", 8334).to_string(), "localhost:8334");
    }
}
