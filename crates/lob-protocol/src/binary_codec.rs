//! Binary encoding/decoding for commands and events.
//!
//! Framing model (single message per buffer):
//!
//! ```text
//! [0]   : msg_type (WireCommandType / WireEventType as u8)
//! [1]   : version  (PROTOCOL_VERSION)
//! [2..4]: reserved = 0
//! [4..] : body (fixed layout per msg_type)
//! ```
//!
//! All integers are big-endian. Prices and quantities travel as IEEE-754
//! bit patterns in a u64. Bodies:
//!
//! ```text
//! Command                      Event
//! -------                      -----
//! SubmitLimit (0):             Accepted (10):
//!   [4]      side (0=B, 1=S)     [4..12]  order_id
//!   [5..13]  price bits          Rejected (11):
//!   [13..21] quantity bits         [4]      reason_len
//! SubmitMarket (1):                [5..]    reason (UTF-8)
//!   [4]      side               CancelAck (12):
//!   [5..13]  quantity bits        [4..12]  order_id
//! Cancel (2):                     [12]     cancelled (0/1)
//!   [4..12]  order_id           Trade (13):
//! QueryTopOfBook (3):             [4..12]  trade_id
//!   [no body]                     [12..20] buy_order_id
//! QuerySnapshot (4):              [20..28] sell_order_id
//!   [no body]                     [28..36] price bits
//!                                 [36..44] quantity bits
//!                                 [44..52] timestamp
//!                               TopOfBook (14):
//!                                 [4]      flags (bit0=bid, bit1=ask)
//!                                 [5..37]  bid px, bid qty, ask px, ask qty
//!                               Snapshot (15):
//!                                 [4..6]   bid level count (u16)
//!                                 [6..8]   ask level count (u16)
//!                                 [8..]    (price, qty) pairs, bids then asks
//! ```
//!
//! One message per buffer; the TCP layer provides its own length-prefix
//! framing around these payloads.

use std::fmt;

use lob_core::{BookSnapshot, Side, TopOfBookSnapshot, Trade};

use crate::messages::{EngineCommand, EngineEvent};
use crate::wire_types::{
    WireCommandType, WireEventType, MAX_REASON_LEN, PROTOCOL_VERSION,
};

/// Errors raised while encoding or decoding a frame.
#[derive(Debug)]
pub enum ProtocolError {
    /// Buffer too short for the expected fields.
    Truncated,
    /// Unknown or unsupported message type byte.
    UnknownMessageType(u8),
    /// Frame carries a different protocol version.
    VersionMismatch(u8),
    /// A field failed semantic validation.
    InvalidField(&'static str),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Truncated => write!(f, "buffer truncated"),
            ProtocolError::UnknownMessageType(t) => write!(f, "unknown message type: {}", t),
            ProtocolError::VersionMismatch(v) => {
                write!(f, "protocol version mismatch: got {}, expected {}", v, PROTOCOL_VERSION)
            }
            ProtocolError::InvalidField(field) => write!(f, "invalid field: {}", field),
        }
    }
}

impl std::error::Error for ProtocolError {}

// ============================================================================
// Commands: client → server
// ============================================================================

/// Decode a single command frame.
pub fn decode_command(buf: &[u8]) -> Result<EngineCommand, ProtocolError> {
    let wire_type = frame_type(buf)?;
    let wire_type =
        WireCommandType::from_u8(wire_type).ok_or(ProtocolError::UnknownMessageType(wire_type))?;

    match wire_type {
        WireCommandType::SubmitLimit => {
            ensure_len(buf, 21)?;
            Ok(EngineCommand::SubmitLimit {
                side: decode_side(buf[4])?,
                price: read_f64_be(&buf[5..13]),
                quantity: read_f64_be(&buf[13..21]),
            })
        }
        WireCommandType::SubmitMarket => {
            ensure_len(buf, 13)?;
            Ok(EngineCommand::SubmitMarket {
                side: decode_side(buf[4])?,
                quantity: read_f64_be(&buf[5..13]),
            })
        }
        WireCommandType::Cancel => {
            ensure_len(buf, 12)?;
            Ok(EngineCommand::Cancel {
                order_id: read_u64_be(&buf[4..12]),
            })
        }
        WireCommandType::QueryTopOfBook => Ok(EngineCommand::QueryTopOfBook),
        WireCommandType::QuerySnapshot => Ok(EngineCommand::QuerySnapshot),
    }
}

/// Encode a single command, appending the frame to `out`.
pub fn encode_command(cmd: &EngineCommand, out: &mut Vec<u8>) {
    match cmd {
        EngineCommand::SubmitLimit { side, price, quantity } => {
            header(WireCommandType::SubmitLimit as u8, out);
            out.push(encode_side(*side));
            out.extend_from_slice(&price.to_bits().to_be_bytes());
            out.extend_from_slice(&quantity.to_bits().to_be_bytes());
        }
        EngineCommand::SubmitMarket { side, quantity } => {
            header(WireCommandType::SubmitMarket as u8, out);
            out.push(encode_side(*side));
            out.extend_from_slice(&quantity.to_bits().to_be_bytes());
        }
        EngineCommand::Cancel { order_id } => {
            header(WireCommandType::Cancel as u8, out);
            out.extend_from_slice(&order_id.to_be_bytes());
        }
        EngineCommand::QueryTopOfBook => header(WireCommandType::QueryTopOfBook as u8, out),
        EngineCommand::QuerySnapshot => header(WireCommandType::QuerySnapshot as u8, out),
    }
}

// ============================================================================
// Events: server → client
// ============================================================================

/// Encode a single event, appending the frame to `out`.
pub fn encode_event(event: &EngineEvent, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    match event {
        EngineEvent::Accepted { order_id } => {
            header(WireEventType::Accepted as u8, out);
            out.extend_from_slice(&order_id.to_be_bytes());
        }
        EngineEvent::Rejected { reason } => {
            let bytes = reason.as_bytes();
            if bytes.len() > MAX_REASON_LEN {
                return Err(ProtocolError::InvalidField("reason"));
            }
            header(WireEventType::Rejected as u8, out);
            out.push(bytes.len() as u8);
            out.extend_from_slice(bytes);
        }
        EngineEvent::CancelAck { order_id, cancelled } => {
            header(WireEventType::CancelAck as u8, out);
            out.extend_from_slice(&order_id.to_be_bytes());
            out.push(u8::from(*cancelled));
        }
        EngineEvent::Trade(trade) => {
            header(WireEventType::Trade as u8, out);
            out.extend_from_slice(&trade.id.to_be_bytes());
            out.extend_from_slice(&trade.buy_order_id.to_be_bytes());
            out.extend_from_slice(&trade.sell_order_id.to_be_bytes());
            out.extend_from_slice(&trade.price.to_bits().to_be_bytes());
            out.extend_from_slice(&trade.quantity.to_bits().to_be_bytes());
            out.extend_from_slice(&trade.timestamp.to_be_bytes());
        }
        EngineEvent::TopOfBook(tob) => {
            header(WireEventType::TopOfBook as u8, out);
            let mut flags = 0u8;
            if tob.bid.is_some() {
                flags |= 0b01;
            }
            if tob.ask.is_some() {
                flags |= 0b10;
            }
            out.push(flags);
            let (bid_px, bid_qty) = tob.bid.unwrap_or((0.0, 0.0));
            let (ask_px, ask_qty) = tob.ask.unwrap_or((0.0, 0.0));
            for value in [bid_px, bid_qty, ask_px, ask_qty] {
                out.extend_from_slice(&value.to_bits().to_be_bytes());
            }
        }
        EngineEvent::Snapshot(snap) => {
            if snap.bids.len() > u16::MAX as usize || snap.asks.len() > u16::MAX as usize {
                return Err(ProtocolError::InvalidField("level count"));
            }
            header(WireEventType::Snapshot as u8, out);
            out.extend_from_slice(&(snap.bids.len() as u16).to_be_bytes());
            out.extend_from_slice(&(snap.asks.len() as u16).to_be_bytes());
            for (price, qty) in snap.bids.iter().chain(snap.asks.iter()) {
                out.extend_from_slice(&price.to_bits().to_be_bytes());
                out.extend_from_slice(&qty.to_bits().to_be_bytes());
            }
        }
    }
    Ok(())
}

/// Decode a single event frame. Used by clients reading the server.
pub fn decode_event(buf: &[u8]) -> Result<EngineEvent, ProtocolError> {
    let wire_type = frame_type(buf)?;
    let wire_type =
        WireEventType::from_u8(wire_type).ok_or(ProtocolError::UnknownMessageType(wire_type))?;

    match wire_type {
        WireEventType::Accepted => {
            ensure_len(buf, 12)?;
            Ok(EngineEvent::Accepted {
                order_id: read_u64_be(&buf[4..12]),
            })
        }
        WireEventType::Rejected => {
            ensure_len(buf, 5)?;
            let len = buf[4] as usize;
            if len > MAX_REASON_LEN {
                return Err(ProtocolError::InvalidField("reason"));
            }
            ensure_len(buf, 5 + len)?;
            let reason = std::str::from_utf8(&buf[5..5 + len])
                .map_err(|_| ProtocolError::InvalidField("reason"))?
                .to_string();
            Ok(EngineEvent::Rejected { reason })
        }
        WireEventType::CancelAck => {
            ensure_len(buf, 13)?;
            Ok(EngineEvent::CancelAck {
                order_id: read_u64_be(&buf[4..12]),
                cancelled: buf[12] != 0,
            })
        }
        WireEventType::Trade => {
            ensure_len(buf, 52)?;
            Ok(EngineEvent::Trade(Trade {
                id: read_u64_be(&buf[4..12]),
                buy_order_id: read_u64_be(&buf[12..20]),
                sell_order_id: read_u64_be(&buf[20..28]),
                price: read_f64_be(&buf[28..36]),
                quantity: read_f64_be(&buf[36..44]),
                timestamp: read_u64_be(&buf[44..52]),
            }))
        }
        WireEventType::TopOfBook => {
            ensure_len(buf, 37)?;
            let flags = buf[4];
            let bid_px = read_f64_be(&buf[5..13]);
            let bid_qty = read_f64_be(&buf[13..21]);
            let ask_px = read_f64_be(&buf[21..29]);
            let ask_qty = read_f64_be(&buf[29..37]);
            Ok(EngineEvent::TopOfBook(TopOfBookSnapshot {
                bid: (flags & 0b01 != 0).then_some((bid_px, bid_qty)),
                ask: (flags & 0b10 != 0).then_some((ask_px, ask_qty)),
            }))
        }
        WireEventType::Snapshot => {
            ensure_len(buf, 8)?;
            let bid_count = u16::from_be_bytes([buf[4], buf[5]]) as usize;
            let ask_count = u16::from_be_bytes([buf[6], buf[7]]) as usize;
            ensure_len(buf, 8 + (bid_count + ask_count) * 16)?;

            let mut offset = 8;
            let mut read_levels = |count: usize| -> Vec<(f64, f64)> {
                let mut levels = Vec::with_capacity(count);
                for _ in 0..count {
                    let price = read_f64_be(&buf[offset..offset + 8]);
                    let qty = read_f64_be(&buf[offset + 8..offset + 16]);
                    levels.push((price, qty));
                    offset += 16;
                }
                levels
            };
            let bids = read_levels(bid_count);
            let asks = read_levels(ask_count);
            Ok(EngineEvent::Snapshot(BookSnapshot { bids, asks }))
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn header(msg_type: u8, out: &mut Vec<u8>) {
    out.push(msg_type);
    out.push(PROTOCOL_VERSION);
    out.extend_from_slice(&[0, 0]);
}

fn frame_type(buf: &[u8]) -> Result<u8, ProtocolError> {
    if buf.len() < 4 {
        return Err(ProtocolError::Truncated);
    }
    if buf[1] != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch(buf[1]));
    }
    Ok(buf[0])
}

fn ensure_len(buf: &[u8], len: usize) -> Result<(), ProtocolError> {
    if buf.len() < len {
        return Err(ProtocolError::Truncated);
    }
    Ok(())
}

fn encode_side(side: Side) -> u8 {
    match side {
        Side::Buy => 0,
        Side::Sell => 1,
    }
}

fn decode_side(byte: u8) -> Result<Side, ProtocolError> {
    match byte {
        0 => Ok(Side::Buy),
        1 => Ok(Side::Sell),
        _ => Err(ProtocolError::InvalidField("side")),
    }
}

fn read_u64_be(bytes: &[u8]) -> u64 {
    let arr: [u8; 8] = bytes[0..8].try_into().expect("slice length checked");
    u64::from_be_bytes(arr)
}

fn read_f64_be(bytes: &[u8]) -> f64 {
    f64::from_bits(read_u64_be(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_frames_survive_a_round_trip() {
        let commands = [
            EngineCommand::SubmitLimit {
                side: Side::Buy,
                price: 100.25,
                quantity: 1.5,
            },
            EngineCommand::SubmitMarket {
                side: Side::Sell,
                quantity: 0.75,
            },
            EngineCommand::Cancel { order_id: 42 },
            EngineCommand::QueryTopOfBook,
            EngineCommand::QuerySnapshot,
        ];

        for cmd in &commands {
            let mut buf = Vec::new();
            encode_command(cmd, &mut buf);
            assert_eq!(&decode_command(&buf).unwrap(), cmd);
        }
    }

    #[test]
    fn truncated_and_malformed_frames_are_rejected() {
        assert!(matches!(decode_command(&[0, 1]), Err(ProtocolError::Truncated)));
        assert!(matches!(
            decode_command(&[9, 1, 0, 0]),
            Err(ProtocolError::UnknownMessageType(9))
        ));
        assert!(matches!(
            decode_command(&[0, 7, 0, 0]),
            Err(ProtocolError::VersionMismatch(7))
        ));

        // SubmitLimit with an out-of-range side byte.
        let mut buf = Vec::new();
        encode_command(
            &EngineCommand::SubmitLimit {
                side: Side::Buy,
                price: 1.0,
                quantity: 1.0,
            },
            &mut buf,
        );
        buf[4] = 3;
        assert!(matches!(
            decode_command(&buf),
            Err(ProtocolError::InvalidField("side"))
        ));

        // A frame cut off mid-body.
        let mut buf = Vec::new();
        encode_command(&EngineCommand::Cancel { order_id: 7 }, &mut buf);
        buf.truncate(8);
        assert!(matches!(decode_command(&buf), Err(ProtocolError::Truncated)));
    }

    #[test]
    fn top_of_book_event_encodes_empty_sides() {
        let event = EngineEvent::TopOfBook(TopOfBookSnapshot {
            bid: None,
            ask: Some((101.5, 3.0)),
        });
        let mut buf = Vec::new();
        encode_event(&event, &mut buf).unwrap();
        assert_eq!(decode_event(&buf).unwrap(), event);
    }

    #[test]
    fn snapshot_event_round_trips_with_depth() {
        let event = EngineEvent::Snapshot(BookSnapshot {
            bids: vec![(100.0, 2.0), (99.5, 4.0)],
            asks: vec![(100.5, 1.0)],
        });
        let mut buf = Vec::new();
        encode_event(&event, &mut buf).unwrap();
        assert_eq!(decode_event(&buf).unwrap(), event);
    }
}
