//! Dual-objective balancing: merge a cycle-time run with a metabolic-cost run.
//!
//! Tasks both runs put on the same workstation number stay together. Every
//! other task goes to whichever workstation containing it, in either run,
//! would see the largest percentage increase in cycle time from taking it.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::catalog::TaskCatalog;
use crate::config::BalancingConfig;
use crate::models::{LineBalance, Workstation, WorkstationId, WorkstationIdCounter};
use crate::{log_changes, log_checks};

use super::greedy::{AllocationError, GreedyAllocator};
use super::metric::Metric;

/// Percentage growth a workstation would see from adding one more task.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IncreaseEstimate {
    pub time_pct: f64,
    pub metabolic_pct: f64,
}

fn percent_increase(current: f64, added: f64) -> f64 {
    if current > 0.0 {
        ((current + added) / current - 1.0) * 100.0
    } else {
        0.0
    }
}

impl IncreaseEstimate {
    pub fn for_task(workstation: &Workstation, time: f64, cost: f64) -> Self {
        Self {
            time_pct: percent_increase(workstation.cycle_time, time),
            metabolic_pct: percent_increase(workstation.metabolic_cost, cost),
        }
    }
}

/// Merged workstations keyed by the run-local workstation number they stand for.
struct MergedLine<'a> {
    catalog: &'a TaskCatalog,
    counter: &'a mut WorkstationIdCounter,
    balance: LineBalance,
    by_origin: FxHashMap<WorkstationId, WorkstationId>,
    verbosity: u8,
}

impl MergedLine<'_> {
    fn commit(&mut self, origin: WorkstationId, task: &str) -> Result<(), AllocationError> {
        let (time, cost) = self
            .catalog
            .metrics(task)
            .ok_or_else(|| AllocationError::UnknownTask(task.to_string()))?;

        let id = match self.by_origin.get(&origin) {
            Some(&id) => id,
            None => {
                let id = self.counter.next_id();
                self.by_origin.insert(origin, id);
                id
            }
        };
        self.balance
            .entry(id)
            .or_insert_with(|| Workstation::new(id))
            .add_task(task, time, cost);
        log_changes!(
            self.verbosity,
            "Committed {} to merged workstation {} (run workstation {})",
            task,
            id,
            origin
        );
        Ok(())
    }
}

/// Merge two independent runs that both numbered their workstations from 1.
///
/// Merged workstations take fresh ids from `counter` in order of first use.
/// Fails with `UnplacedTask` for a catalog task neither run contains.
pub fn reconcile(
    catalog: &TaskCatalog,
    by_time: &LineBalance,
    by_cost: &LineBalance,
    counter: &mut WorkstationIdCounter,
    verbosity: u8,
) -> Result<LineBalance, AllocationError> {
    let mut merged = MergedLine {
        catalog,
        counter,
        balance: LineBalance::new(),
        by_origin: FxHashMap::default(),
        verbosity,
    };
    let mut missing: Vec<&str> = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for (id, time_ws) in by_time {
        let cost_ws = by_cost.get(id);
        for task in &time_ws.tasks {
            seen.insert(task.as_str());
            if cost_ws.is_some_and(|ws| ws.contains(task)) {
                merged.commit(*id, task)?;
            } else {
                missing.push(task);
            }
        }
    }
    missing.extend(catalog.names().filter(|task| !seen.contains(task)));

    for task in missing {
        let (time, cost) = catalog
            .metrics(task)
            .ok_or_else(|| AllocationError::UnknownTask(task.to_string()))?;

        let mut best: Option<(WorkstationId, f64)> = None;
        for ws in by_time
            .values()
            .chain(by_cost.values())
            .filter(|ws| ws.contains(task))
        {
            let estimate = IncreaseEstimate::for_task(ws, time, cost);
            log_checks!(
                verbosity,
                "{} on workstation {}: cycle time +{:.2}%, metabolic cost +{:.2}%",
                task,
                ws.id,
                estimate.time_pct,
                estimate.metabolic_pct
            );
            if best.map_or(true, |(_, pct)| estimate.time_pct > pct) {
                best = Some((ws.id, estimate.time_pct));
            }
        }

        let (origin, _) = best.ok_or_else(|| AllocationError::UnplacedTask(task.to_string()))?;
        merged.commit(origin, task)?;
    }

    Ok(merged.balance)
}

/// Balance by cycle time and by metabolic cost, then reconcile the two runs.
pub fn balance_considering_both(
    catalog: &TaskCatalog,
    precedence: &[(String, String)],
    config: &BalancingConfig,
) -> Result<LineBalance, AllocationError> {
    let mut counter = WorkstationIdCounter::new();
    let by_time = GreedyAllocator::new(catalog, precedence, Metric::CycleTime, config)?
        .allocate(&mut counter)?;
    counter.reset();
    let by_cost = GreedyAllocator::new(catalog, precedence, Metric::MetabolicCost, config)?
        .allocate(&mut counter)?;
    counter.reset();

    reconcile(catalog, &by_time, &by_cost, &mut counter, config.verbosity)
}
