//! Send command.

use anyhow::{Context, Result};
use clap::Args;
use clarke_node::{client, Message};
use serde_json::Value;

#[derive(Args)]
pub struct SendArgs {
    /// Node host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Node port
    #[arg(short, long, default_value = "8334")]
    port: u16,

    /// Message type (echo, get_peers, add_peer)
    message_type: String,

    /// Payload as JSON; anything that is not valid JSON is sent as a string
    payload: Option<String>,
}

pub fn run(args: SendArgs) -> Result<()> {
    let message = Message::from_parts(&args.message_type, args.payload.as_deref().map(parse_payload))
        .with_context(|| format!("Invalid {} message", args.message_type))?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let reply = runtime
        .block_on(client::transmit((args.host.as_str(), args.port), &message))
        .with_context(|| format!("Failed to reach {}:{}", args.host, args.port))?;

    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload("pizza"), json!("pizza"));
        assert_eq!(parse_payload("42"), json!(42));
        assert_eq!(
            parse_payload(r#"{"host":"h","port":1}"#),
            json!({"host": "h", "port": 1})
        );
    }
}
