//! Central engine loop.
//!
//! This task owns the `MatchingEngine` and is the only code that calls
//! it, which gives the single-threaded core the external serialization
//! it requires. Commands are stamped with a nanosecond timestamp at
//! dequeue; the engine itself never reads a clock.
//!
//! Routing policy:
//! - `Accepted`, `Rejected`, `CancelAck`, query replies: unicast to the
//!   originating client.
//! - `Trade`, top-of-book changes: broadcast to all connected clients.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use lob_core::{MatchingEngine, TopOfBookSnapshot};
use lob_protocol::{EngineCommand, EngineEvent};
use tracing::{debug, info};

use crate::types::{ClientId, ClientRegistry, EngineRx, OutboundTx};

/// Run the engine loop until every client channel has closed.
pub async fn run_engine_loop(mut engine_rx: EngineRx, clients: ClientRegistry) {
    let mut engine = MatchingEngine::new();
    let mut prev_tob = TopOfBookSnapshot::default();
    let mut trade_cursor = 0usize;

    while let Some(req) = engine_rx.recv().await {
        let client_id = req.client_id;
        let mutating = process_command(&mut engine, req.command, client_id, &clients).await;

        if !mutating {
            continue;
        }

        // Broadcast any trades this command generated, in log order.
        let (new_trades, next_cursor) = {
            let (trades, cursor) = engine.trades_since(trade_cursor);
            (trades.to_vec(), cursor)
        };
        trade_cursor = next_cursor;

        let current_clients = {
            let guard = clients.read().await;
            guard.clone()
        };

        for trade in new_trades {
            debug!(trade_id = trade.id, price = trade.price, "broadcasting trade");
            broadcast(&current_clients, EngineEvent::Trade(trade));
        }

        // Top-of-book updates only when the touch actually moved.
        let tob = engine.top_of_book();
        if tob != prev_tob {
            prev_tob = tob;
            broadcast(&current_clients, EngineEvent::TopOfBook(tob));
        }
    }

    info!("engine loop shutting down (request channel closed)");
}

/// Apply one command. Returns true if it may have mutated the book.
async fn process_command(
    engine: &mut MatchingEngine,
    command: EngineCommand,
    client_id: ClientId,
    clients: &ClientRegistry,
) -> bool {
    match command {
        EngineCommand::SubmitLimit { side, price, quantity } => {
            let event = match engine.submit_limit(side, price, quantity, now_nanos()) {
                Ok(order_id) => EngineEvent::Accepted { order_id },
                Err(err) => EngineEvent::Rejected {
                    reason: err.to_string(),
                },
            };
            unicast(clients, client_id, event).await;
            true
        }
        EngineCommand::SubmitMarket { side, quantity } => {
            let event = match engine.submit_market(side, quantity, now_nanos()) {
                Ok(order_id) => EngineEvent::Accepted { order_id },
                Err(err) => EngineEvent::Rejected {
                    reason: err.to_string(),
                },
            };
            unicast(clients, client_id, event).await;
            true
        }
        EngineCommand::Cancel { order_id } => {
            let cancelled = engine.cancel(order_id);
            unicast(clients, client_id, EngineEvent::CancelAck { order_id, cancelled }).await;
            cancelled
        }
        EngineCommand::QueryTopOfBook => {
            let tob = engine.top_of_book();
            unicast(clients, client_id, EngineEvent::TopOfBook(tob)).await;
            false
        }
        EngineCommand::QuerySnapshot => {
            let snap = engine.snapshot();
            unicast(clients, client_id, EngineEvent::Snapshot(snap)).await;
            false
        }
    }
}

async fn unicast(clients: &ClientRegistry, client_id: ClientId, event: EngineEvent) {
    let guard = clients.read().await;
    if let Some(tx) = guard.get(&client_id) {
        // A closed channel just means the client is mid-disconnect.
        let _ = tx.send(event);
    }
}

fn broadcast(clients: &HashMap<ClientId, OutboundTx>, event: EngineEvent) {
    for tx in clients.values() {
        let _ = tx.send(event.clone());
    }
}

/// Nanoseconds since the Unix epoch, the timestamp handed to the engine.
fn now_nanos() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs()
        .saturating_mul(1_000_000_000)
        .saturating_add(u64::from(now.subsec_nanos()))
}
