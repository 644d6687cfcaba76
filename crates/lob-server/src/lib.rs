//! lob-server
//!
//! Multi-client async TCP server for the matching engine.
//!
//! The engine itself is single-threaded; this crate provides the
//! external serialization it requires: every client task forwards
//! decoded commands over one channel to a central engine task, which is
//! the only code that touches the [`lob_core::MatchingEngine`].

pub mod config;
pub mod types;
pub mod server;
pub mod client;
pub mod engine_task;
