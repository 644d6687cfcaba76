//! CSV line codec.
//!
//! Human-oriented format used by the interactive client, replay files,
//! and trade logs.
//!
//! Command lines (one per line, `#` starts a comment):
//!
//! - Limit order:  `L, side(B/S), price, quantity`
//! - Market order: `M, side(B/S), quantity`
//! - Cancel:       `C, orderId`
//! - Top-of-book:  `Q`
//! - Snapshot:     `S`
//!
//! Event lines:
//!
//! - Accepted:   `A, orderId`
//! - Rejected:   `R, reason`
//! - CancelAck:  `C, orderId, 1|0`
//! - Trade:      `T, tradeId, buyOrderId, sellOrderId, price, quantity, timestamp`
//! - TopOfBook:  `B, bidPrice, bidQty, askPrice, askQty` (empty side: `-, -`)
//! - Snapshot:   `S, bidLevels, askLevels` followed by one
//!               `D, side(B/S), price, quantity` line per level

use lob_core::Side;

use crate::messages::{EngineCommand, EngineEvent};

/// Parse a single CSV line into a command.
///
/// Returns `None` for blank lines, comments, and anything malformed;
/// the caller decides whether that is worth reporting.
pub fn parse_command_line(line: &str) -> Option<EngineCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let tokens: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    match tokens[0] {
        "L" => {
            if tokens.len() != 4 {
                return None;
            }
            Some(EngineCommand::SubmitLimit {
                side: parse_side(tokens[1])?,
                price: tokens[2].parse().ok()?,
                quantity: tokens[3].parse().ok()?,
            })
        }
        "M" => {
            if tokens.len() != 3 {
                return None;
            }
            Some(EngineCommand::SubmitMarket {
                side: parse_side(tokens[1])?,
                quantity: tokens[2].parse().ok()?,
            })
        }
        "C" => {
            if tokens.len() != 2 {
                return None;
            }
            Some(EngineCommand::Cancel {
                order_id: tokens[1].parse().ok()?,
            })
        }
        "Q" if tokens.len() == 1 => Some(EngineCommand::QueryTopOfBook),
        "S" if tokens.len() == 1 => Some(EngineCommand::QuerySnapshot),
        _ => None,
    }
}

/// Format an event as CSV. Snapshots span multiple lines.
pub fn format_event(event: &EngineEvent) -> String {
    match event {
        EngineEvent::Accepted { order_id } => format!("A, {}", order_id),
        EngineEvent::Rejected { reason } => format!("R, {}", reason),
        EngineEvent::CancelAck { order_id, cancelled } => {
            format!("C, {}, {}", order_id, u8::from(*cancelled))
        }
        EngineEvent::Trade(t) => format_trade_line(t),
        EngineEvent::TopOfBook(tob) => {
            let mut line = String::from("B");
            for value in [tob.bid, tob.ask] {
                match value {
                    Some((price, qty)) => line.push_str(&format!(", {}, {}", price, qty)),
                    None => line.push_str(", -, -"),
                }
            }
            line
        }
        EngineEvent::Snapshot(snap) => {
            let mut out = format!("S, {}, {}", snap.bids.len(), snap.asks.len());
            for (price, qty) in &snap.bids {
                out.push_str(&format!("\nD, B, {}, {}", price, qty));
            }
            for (price, qty) in &snap.asks {
                out.push_str(&format!("\nD, S, {}, {}", price, qty));
            }
            out
        }
    }
}

/// One trade per line, the format the simulator's trade log uses.
pub fn format_trade_line(trade: &lob_core::Trade) -> String {
    format!(
        "T, {}, {}, {}, {}, {}, {}",
        trade.id,
        trade.buy_order_id,
        trade.sell_order_id,
        trade.price,
        trade.quantity,
        trade.timestamp
    )
}

/// Header matching [`format_trade_line`] for trade log files.
pub const TRADE_LOG_HEADER: &str = "# trade_id, buy_order_id, sell_order_id, price, quantity, timestamp";

fn parse_side(token: &str) -> Option<Side> {
    let mut chars = token.chars();
    let side = Side::from_char(chars.next()?)?;
    chars.next().is_none().then_some(side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lob_core::Trade;

    #[test]
    fn parses_well_formed_command_lines() {
        assert_eq!(
            parse_command_line("L, B, 100.5, 2"),
            Some(EngineCommand::SubmitLimit {
                side: Side::Buy,
                price: 100.5,
                quantity: 2.0
            })
        );
        assert_eq!(
            parse_command_line("M, S, 0.25"),
            Some(EngineCommand::SubmitMarket {
                side: Side::Sell,
                quantity: 0.25
            })
        );
        assert_eq!(
            parse_command_line("C, 17"),
            Some(EngineCommand::Cancel { order_id: 17 })
        );
        assert_eq!(parse_command_line("Q"), Some(EngineCommand::QueryTopOfBook));
        assert_eq!(parse_command_line("S"), Some(EngineCommand::QuerySnapshot));
    }

    #[test]
    fn rejects_blank_comment_and_malformed_lines() {
        assert_eq!(parse_command_line(""), None);
        assert_eq!(parse_command_line("   "), None);
        assert_eq!(parse_command_line("# L, B, 1, 1"), None);
        assert_eq!(parse_command_line("L, X, 100, 1"), None);
        assert_eq!(parse_command_line("L, B, abc, 1"), None);
        assert_eq!(parse_command_line("L, B, 100"), None);
        assert_eq!(parse_command_line("C, notanumber"), None);
        assert_eq!(parse_command_line("Z"), None);
    }

    #[test]
    fn formats_trades_one_per_line() {
        let trade = Trade {
            id: 3,
            buy_order_id: 10,
            sell_order_id: 7,
            price: 99.5,
            quantity: 0.5,
            timestamp: 1234,
        };
        assert_eq!(format_trade_line(&trade), "T, 3, 10, 7, 99.5, 0.5, 1234");
        assert_eq!(format_event(&EngineEvent::Trade(trade)), "T, 3, 10, 7, 99.5, 0.5, 1234");
    }

    #[test]
    fn formats_top_of_book_with_empty_sides() {
        let event = EngineEvent::TopOfBook(lob_core::TopOfBookSnapshot {
            bid: Some((100.0, 2.0)),
            ask: None,
        });
        assert_eq!(format_event(&event), "B, 100, 2, -, -");
    }
}
