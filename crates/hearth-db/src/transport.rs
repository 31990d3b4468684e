//! Transport collaborator boundary.
//!
//! The duplex connection is owned by the host. The engine only needs to
//! push text payloads out; inbound frames are delivered by the host via
//! `Database::handle_frame`.

/// Outbound half of the duplex connection.
pub trait Transport {
    fn send_text(&mut self, payload: &str);
}

/// Frame kinds the transport can deliver. Only [`Opcode::Text`] frames
/// carry protocol envelopes; everything else is a transport concern and
/// is ignored by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Binary,
    Text,
    Ping,
    Pong,
    Close,
    Continue,
}

/// A frame as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: Opcode,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn text(payload: impl Into<Vec<u8>>) -> Self {
        Frame {
            opcode: Opcode::Text,
            payload: payload.into(),
        }
    }
}
