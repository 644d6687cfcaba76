//! Per-client TCP handler.
//!
//! Responsibilities:
//! - Read length-prefixed (u32 BE) binary frames from the socket.
//! - Decode them into commands via `lob-protocol`.
//! - Forward `EngineRequest`s to the engine task.
//! - Concurrently write this client's outbound events back as frames.

use std::io;

use lob_protocol::{binary_codec, EngineEvent};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::types::{ClientId, ClientRegistry, EngineRequest, EngineTx, OutboundRx};

/// Largest frame a client may send; anything bigger is a protocol abuse.
const MAX_FRAME_LEN: usize = 64 * 1024;

/// Run the I/O loop for one connection until EOF or a protocol error.
pub async fn run_client(
    client_id: ClientId,
    stream: TcpStream,
    engine_tx: EngineTx,
    mut out_rx: OutboundRx,
    clients: ClientRegistry,
) -> io::Result<()> {
    let peer_addr = stream.peer_addr().ok();
    let (mut reader, mut writer) = stream.into_split();

    // Writer task: drain outbound events into frames.
    let writer_handle = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            if let Err(e) = write_event(&mut writer, &event).await {
                debug!(client = client_id.0, error = %e, "write failed, closing");
                break;
            }
        }
    });

    // Reader loop: frames in, commands out.
    loop {
        let mut len_buf = [0u8; 4];
        if reader.read_exact(&mut len_buf).await.is_err() {
            // EOF or reset; either way the client is gone.
            debug!(client = client_id.0, ?peer_addr, "connection closed");
            break;
        }

        let frame_len = u32::from_be_bytes(len_buf) as usize;
        if frame_len == 0 {
            continue;
        }
        if frame_len > MAX_FRAME_LEN {
            warn!(client = client_id.0, frame_len, "oversized frame, dropping client");
            break;
        }

        let mut frame = vec![0u8; frame_len];
        if let Err(e) = reader.read_exact(&mut frame).await {
            debug!(client = client_id.0, error = %e, "read failed");
            break;
        }

        match binary_codec::decode_command(&frame) {
            Ok(command) => {
                let req = EngineRequest { client_id, command };
                if engine_tx.send(req).is_err() {
                    warn!(client = client_id.0, "engine channel closed, dropping client");
                    break;
                }
            }
            Err(err) => {
                warn!(client = client_id.0, error = %err, "protocol decode error, dropping client");
                break;
            }
        }
    }

    // Deregister, then let the writer drain and finish.
    {
        let mut guard = clients.write().await;
        guard.remove(&client_id);
    }
    let _ = writer_handle.await;

    Ok(())
}

async fn write_event(writer: &mut OwnedWriteHalf, event: &EngineEvent) -> io::Result<()> {
    let mut payload = Vec::with_capacity(128);
    binary_codec::encode_event(event, &mut payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;

    Ok(())
}
