//! Wire message ids and protocol constants.
//!
//! Encode/decode logic lives in `binary_codec`; this module only pins
//! the numbers down.

/// Current protocol version, carried in byte 1 of every frame.
pub const PROTOCOL_VERSION: u8 = 1;

/// Longest rejection reason carried on the wire, in bytes.
pub const MAX_REASON_LEN: usize = 120;

/// Command message types (client → server).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireCommandType {
    SubmitLimit = 0,
    SubmitMarket = 1,
    Cancel = 2,
    QueryTopOfBook = 3,
    QuerySnapshot = 4,
}

impl WireCommandType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(WireCommandType::SubmitLimit),
            1 => Some(WireCommandType::SubmitMarket),
            2 => Some(WireCommandType::Cancel),
            3 => Some(WireCommandType::QueryTopOfBook),
            4 => Some(WireCommandType::QuerySnapshot),
            _ => None,
        }
    }
}

/// Event message types (server → client).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireEventType {
    Accepted = 10,
    Rejected = 11,
    CancelAck = 12,
    Trade = 13,
    TopOfBook = 14,
    Snapshot = 15,
}

impl WireEventType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            10 => Some(WireEventType::Accepted),
            11 => Some(WireEventType::Rejected),
            12 => Some(WireEventType::CancelAck),
            13 => Some(WireEventType::Trade),
            14 => Some(WireEventType::TopOfBook),
            15 => Some(WireEventType::Snapshot),
            _ => None,
        }
    }
}
