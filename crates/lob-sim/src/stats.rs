//! Run statistics for a simulation.

use serde::Serialize;

/// Counters accumulated over one simulation run.
///
/// Serializable so the CLI can dump a machine-readable summary next to
/// the trade log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationStats {
    pub orders_submitted: u64,
    pub limit_orders: u64,
    pub market_orders: u64,
    pub orders_rejected: u64,
    pub cancels_attempted: u64,
    pub cancels_succeeded: u64,
    pub trades_executed: u64,
    pub volume_traded: f64,
    pub final_reference_price: f64,
    pub final_resting_orders: usize,
    pub final_bid_levels: usize,
    pub final_ask_levels: usize,
}

impl SimulationStats {
    /// Human-readable multi-line summary for the end of a run.
    pub fn render(&self) -> String {
        format!(
            "orders submitted:  {} ({} limit, {} market, {} rejected)\n\
             cancels:           {}/{} succeeded\n\
             trades executed:   {}\n\
             volume traded:     {:.8}\n\
             final ref price:   {:.2}\n\
             final book:        {} orders across {} bid / {} ask levels",
            self.orders_submitted,
            self.limit_orders,
            self.market_orders,
            self.orders_rejected,
            self.cancels_succeeded,
            self.cancels_attempted,
            self.trades_executed,
            self.volume_traded,
            self.final_reference_price,
            self.final_resting_orders,
            self.final_bid_levels,
            self.final_ask_levels,
        )
    }
}
