//! Server configuration.
//!
//! Defaults can be overridden two ways, CLI flags winning over
//! environment variables:
//!
//! - `LOB_BIND_ADDR`   / `--bind-addr`   (default: "0.0.0.0")
//! - `LOB_PORT`        / `--port`        (default: 9000)
//! - `LOB_MAX_CLIENTS` / `--max-clients` (default: 1024)

use std::env;
use std::str::FromStr;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "lob-server", about = "TCP matching engine server")]
struct Cli {
    /// Interface to bind, e.g. 0.0.0.0 or 127.0.0.1.
    #[arg(long)]
    bind_addr: Option<String>,

    /// TCP port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Maximum number of simultaneously connected clients.
    #[arg(long)]
    max_clients: Option<usize>,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub max_clients: usize,
}

impl Config {
    /// Build from environment variables with CLI overrides on top.
    pub fn from_env_and_args() -> Result<Self, Box<dyn std::error::Error>> {
        let cli = Cli::parse();

        let bind_addr = cli
            .bind_addr
            .or_else(|| env::var("LOB_BIND_ADDR").ok())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match cli.port {
            Some(p) => p,
            None => read_env_or_default("LOB_PORT", 9000u16)?,
        };
        let max_clients = match cli.max_clients {
            Some(m) => m,
            None => read_env_or_default("LOB_MAX_CLIENTS", 1024usize)?,
        };

        Ok(Config {
            bind_addr,
            port,
            max_clients,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match env::var(key) {
        Ok(val) => Ok(val.parse::<T>()?),
        Err(_) => Ok(default),
    }
}
