//! TCP listener and top-level server wiring.
//!
//! - Binds a TCP listener, bumping the port a few times on `AddrInUse`.
//! - Accepts connections and assigns each a `ClientId`.
//! - Spawns a per-client I/O task and the single central engine task.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::types::{ClientId, ClientRegistry, EngineRx, EngineTx, OutboundRx, OutboundTx};

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    ClientId(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Max number of times the port is bumped if it is in use.
const MAX_PORT_RETRIES: u16 = 3;

/// Run the TCP server with the given configuration.
pub async fn run(mut config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let (listener, final_port, attempts) = bind_with_retry(&mut config).await?;
    config.port = final_port;

    info!(
        addr = %config.socket_addr_string(),
        max_clients = config.max_clients,
        attempts,
        "matching engine server listening"
    );

    let clients: ClientRegistry = Arc::new(tokio::sync::RwLock::new(Default::default()));

    // Channel from clients to the engine task.
    let (engine_tx, engine_rx): (EngineTx, EngineRx) = mpsc::unbounded_channel();

    {
        let clients = clients.clone();
        tokio::spawn(async move {
            crate::engine_task::run_engine_loop(engine_rx, clients).await;
        });
    }

    loop {
        let (stream, peer_addr) = listener.accept().await?;

        let current_clients = {
            let guard = clients.read().await;
            guard.len()
        };
        if current_clients >= config.max_clients {
            warn!(%peer_addr, max_clients = config.max_clients, "rejecting connection: at capacity");
            // Dropping the stream closes it.
            continue;
        }

        let client_id = next_client_id();
        info!(client = client_id.0, %peer_addr, "accepted connection");

        let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();
        {
            let mut guard = clients.write().await;
            guard.insert(client_id, out_tx);
        }

        let clients = clients.clone();
        let engine_tx = engine_tx.clone();
        tokio::spawn(async move {
            match crate::client::run_client(client_id, stream, engine_tx, out_rx, clients).await {
                Ok(()) => info!(client = client_id.0, "client disconnected"),
                Err(e) => error!(client = client_id.0, error = %e, "client task failed"),
            }
        });
    }
}

/// Try to bind, bumping the port by one on `AddrInUse`, up to
/// `MAX_PORT_RETRIES` attempts.
async fn bind_with_retry(
    config: &mut Config,
) -> Result<(TcpListener, u16, u16), Box<dyn std::error::Error>> {
    let mut attempts: u16 = 0;
    let mut port = config.port;

    loop {
        attempts += 1;
        let addr = format!("{}:{}", config.bind_addr, port);
        match TcpListener::bind(&addr).await {
            Ok(listener) => return Ok((listener, port, attempts)),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse && attempts < MAX_PORT_RETRIES => {
                warn!(%addr, attempt = attempts, "port in use, trying next");
                port += 1;
            }
            Err(e) => {
                return Err(format!("failed to bind {}: {}", addr, e).into());
            }
        }
    }
}
