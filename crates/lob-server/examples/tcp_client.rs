//! Interactive CSV client for the TCP server.
//!
//! Usage:
//!
//! ```bash
//! # Run the server
//! cargo run -p lob-server
//!
//! # In another terminal
//! cargo run -p lob-server --example tcp_client
//! ```
//!
//! Type CSV commands:
//!
//! ```text
//! L, B, 100.5, 2      limit buy, 2 units at 100.5
//! M, S, 0.5           market sell, 0.5 units
//! C, 1                cancel order 1
//! Q                   query top-of-book
//! S                   query full snapshot
//! ```

use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::time::Duration;

use lob_protocol::binary_codec::{decode_event, encode_command};
use lob_protocol::csv_codec::{format_event, parse_command_line};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let addr = env::var("LOB_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:9000".to_string());

    println!("Connecting to {}...", addr);
    let mut stream = TcpStream::connect(&addr).await?;
    println!("Connected. Type 'quit' or 'exit' to leave.\n");

    let stdin = io::stdin();

    loop {
        print!(">> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            println!("\nEOF on stdin, exiting client.");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        let Some(command) = parse_command_line(trimmed) else {
            eprintln!("Could not parse line as a command. Check the CSV format.");
            continue;
        };

        let mut payload = Vec::with_capacity(64);
        encode_command(&command, &mut payload);

        let len = payload.len() as u32;
        stream.write_all(&len.to_be_bytes()).await?;
        stream.write_all(&payload).await?;

        // Read back whatever arrives shortly after; a quiet period ends
        // the response for this command.
        loop {
            let mut len_buf = [0u8; 4];
            match timeout(Duration::from_millis(100), stream.read_exact(&mut len_buf)).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    eprintln!("Read error: {:?}", e);
                    return Ok(());
                }
                Err(_) => break,
            }

            let frame_len = u32::from_be_bytes(len_buf) as usize;
            if frame_len == 0 {
                continue;
            }

            let mut frame = vec![0u8; frame_len];
            match timeout(Duration::from_millis(100), stream.read_exact(&mut frame)).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    eprintln!("Read error: {:?}", e);
                    return Ok(());
                }
                Err(_) => {
                    eprintln!("Timed out reading frame body.");
                    break;
                }
            }

            match decode_event(&frame) {
                Ok(event) => println!("<< {}", format_event(&event)),
                Err(e) => eprintln!("Decode error: {:?}", e),
            }
        }
    }

    Ok(())
}
