//! lob-sim
//!
//! Stochastic market simulator for the matching engine. Generates order
//! flow from a configurable price process, feeds it to an in-process
//! [`lob_core::MatchingEngine`], and tracks run statistics. Runs are
//! deterministic for a given seed.

pub mod simulator;
pub mod stats;

pub use simulator::{MarketSimulator, SimulationMode, SimulatorConfig};
pub use stats::SimulationStats;
