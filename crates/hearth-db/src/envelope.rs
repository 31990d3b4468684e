//! Wire envelope encoding and tolerant decoding.
//!
//! Envelopes are JSON objects with single-letter keys. The top level
//! distinguishes connection commands (`"t":"c"`) from data commands
//! (`"t":"d"`). The remote is expected to be occasionally noisy, so
//! decoding is tolerant: anything missing or malformed yields `None` and
//! the dispatcher drops the frame without touching the tree.
//!
//! Shapes:
//!
//! - outbound publish: `{"t":"d","d":{"r":<id>,"a":"p","b":{"p":"<path>","d":<value>}}}`
//! - inbound connection: `{"t":"c","d":{"t":"h"|"r","d":{"h":"<host>"}}}`
//! - inbound data: `{"t":"d","d":{"r":<id?>,"a":"d"|"m","b":{"p":"<path>","d":<value>}}}`

use serde_json::{json, Value};

/// What kind of connection command carried the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// `"h"` — host information.
    HostInfo,
    /// `"r"` — redirect to another host.
    Redirect,
    /// Anything else; the host field is still honored.
    Other,
}

/// A data-command action the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAction {
    /// `"d"` — full replace of the subtree at the path.
    Replace,
    /// `"m"` — relative merge under the path.
    Merge,
}

/// A successfully decoded inbound envelope.
#[derive(Debug)]
pub enum Inbound {
    Connection { kind: ConnectionKind, host: String },
    Data {
        request_id: Option<u64>,
        action: DataAction,
        path: String,
        value: Value,
    },
}

/// Build the outbound publish envelope, serialized compactly.
pub fn encode_publish(request_id: u64, path: &str, value: &Value) -> String {
    let envelope = json!({
        "t": "d",
        "d": {
            "r": request_id,
            "a": "p",
            "b": {
                "p": path,
                "d": value,
            },
        },
    });
    envelope.to_string()
}

/// Decode an inbound envelope, or `None` if it is malformed, incomplete,
/// or carries an action this engine does not understand.
///
/// Takes the parsed payload by value so the data value can be detached
/// from the body rather than cloned.
pub fn decode(mut envelope: Value) -> Option<Inbound> {
    let is_data = match envelope.get("t")?.as_str()? {
        "c" => false,
        "d" => true,
        _ => return None,
    };
    if is_data {
        decode_data(envelope.get_mut("d")?)
    } else {
        decode_connection(envelope.get("d")?)
    }
}

fn decode_connection(command: &Value) -> Option<Inbound> {
    let kind = match command.get("t")?.as_str()? {
        "h" => ConnectionKind::HostInfo,
        "r" => ConnectionKind::Redirect,
        _ => ConnectionKind::Other,
    };
    // The host is honored regardless of the nested command type.
    let host = command.get("d")?.get("h")?.as_str()?;
    if host.is_empty() {
        return None;
    }
    Some(Inbound::Connection {
        kind,
        host: host.to_string(),
    })
}

fn decode_data(command: &mut Value) -> Option<Inbound> {
    // `r` may be absent, but if present it must be a number.
    let request_id = match command.get("r") {
        None => None,
        Some(value) if value.is_number() => value.as_u64(),
        Some(_) => return None,
    };
    let action = match command.get("a")?.as_str()? {
        "d" => DataAction::Replace,
        "m" => DataAction::Merge,
        _ => return None,
    };
    let body = command.get_mut("b")?.as_object_mut()?;
    let path = body.get("p")?.as_str()?.to_string();
    // Detach the value; an absent `d` means null, i.e. deletion.
    let value = body.remove("d").unwrap_or(Value::Null);
    Some(Inbound::Data {
        request_id,
        action,
        path,
        value,
    })
}
