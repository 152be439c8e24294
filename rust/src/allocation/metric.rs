//! The quantity a single-objective allocator balances against.

use crate::catalog::TaskCatalog;
use crate::config::BalancingConfig;
use crate::interner::TaskIdx;
use crate::models::Workstation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Processing time, bounded by `cycle_time`.
    CycleTime,
    /// Physical strain, bounded by `max_metabolic_cost`.
    MetabolicCost,
}

impl Metric {
    /// Value of this metric for one task.
    #[inline]
    pub fn of(self, catalog: &TaskCatalog, task: TaskIdx) -> f64 {
        match self {
            Metric::CycleTime => catalog.time(task),
            Metric::MetabolicCost => catalog.cost(task),
        }
    }

    /// Accumulated value on a workstation.
    #[inline]
    pub fn load(self, workstation: &Workstation) -> f64 {
        match self {
            Metric::CycleTime => workstation.cycle_time,
            Metric::MetabolicCost => workstation.metabolic_cost,
        }
    }

    /// Nominal per-workstation bound for this metric.
    pub fn bound(self, config: &BalancingConfig) -> f64 {
        match self {
            Metric::CycleTime => config.cycle_time,
            Metric::MetabolicCost => config.max_metabolic_cost,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::CycleTime => "cycle time",
            Metric::MetabolicCost => "metabolic cost",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
