//! Shared types for the TCP server.
//!
//! - `ClientId`: lightweight handle for connected clients
//! - channel aliases between client tasks and the engine task
//! - `EngineRequest`: a decoded command tagged with its origin

use std::collections::HashMap;
use std::sync::Arc;

use lob_protocol::{EngineCommand, EngineEvent};
use tokio::sync::mpsc;
use tokio::sync::RwLock;

/// Identifier for a connected client, unique over the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

/// Outbound events from the engine task to one client.
pub type OutboundTx = mpsc::UnboundedSender<EngineEvent>;
pub type OutboundRx = mpsc::UnboundedReceiver<EngineEvent>;

/// Registry of connected clients and their outbound channels.
pub type ClientRegistry = Arc<RwLock<HashMap<ClientId, OutboundTx>>>;

/// A command flowing from a client task into the engine task.
#[derive(Debug)]
pub struct EngineRequest {
    pub client_id: ClientId,
    pub command: EngineCommand,
}

/// Channel from client tasks to the engine task.
pub type EngineTx = mpsc::UnboundedSender<EngineRequest>;
pub type EngineRx = mpsc::UnboundedReceiver<EngineRequest>;
