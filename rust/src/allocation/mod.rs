//! Task-to-workstation allocation.
//!
//! One greedy allocator parameterized by [`Metric`] balances the line against
//! either cycle time or metabolic cost; the reconciler merges one run of each.

mod dual;
mod greedy;
mod metric;

pub use dual::{balance_considering_both, reconcile, IncreaseEstimate};
pub use greedy::{
    balance_by_metabolic_cost, balance_by_time, AllocationError, GreedyAllocator, Placement,
};
pub use metric::Metric;
