//! lob-protocol
//!
//! Wire-level encoding and decoding for the matching engine.
//!
//! This crate turns logical commands and events into bytes and back:
//! - [`messages`]     : transport-agnostic command/event types
//! - [`binary_codec`] : binary wire protocol (for the TCP server)
//! - [`csv_codec`]    : CSV lines (interactive client, replay, trade logs)
//!
//! Timestamps never travel on the wire; the server stamps each command
//! when it hands it to the engine.

pub mod wire_types;
pub mod messages;
pub mod binary_codec;
pub mod csv_codec;

pub use messages::{EngineCommand, EngineEvent};

pub use binary_codec::{
    ProtocolError,
    decode_command,
    encode_command,
    decode_event,
    encode_event,
};
