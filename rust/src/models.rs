//! Workstations and the allocation result types.

use pyo3::prelude::*;
use std::collections::BTreeMap;

/// Workstation number, contiguous from 1 within one allocation run.
pub type WorkstationId = u32;

/// Allocation result: workstations keyed by id, in line order.
pub type LineBalance = BTreeMap<WorkstationId, Workstation>;

/// A workstation on the line and the tasks its operator performs.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Workstation {
    #[pyo3(get)]
    pub id: WorkstationId,
    #[pyo3(get)]
    pub tasks: Vec<String>,
    /// Sum of processing times of `tasks`.
    #[pyo3(get)]
    pub cycle_time: f64,
    /// Sum of metabolic costs of `tasks`.
    #[pyo3(get)]
    pub metabolic_cost: f64,
}

impl Workstation {
    pub fn new(id: WorkstationId) -> Self {
        Self {
            id,
            tasks: Vec::new(),
            cycle_time: 0.0,
            metabolic_cost: 0.0,
        }
    }

    /// Append a task and accumulate its metrics. Capacity is the allocator's concern.
    pub fn add_task(&mut self, task: &str, time: f64, cost: f64) {
        self.tasks.push(task.to_string());
        self.cycle_time += time;
        self.metabolic_cost += cost;
    }

    pub fn contains(&self, task: &str) -> bool {
        self.tasks.iter().any(|t| t == task)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

#[pymethods]
impl Workstation {
    /// (cycle_time, metabolic_cost)
    pub fn performance(&self) -> (f64, f64) {
        (self.cycle_time, self.metabolic_cost)
    }

    fn __len__(&self) -> usize {
        self.tasks.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Workstation(id={}, tasks={:?}, cycle_time={}, metabolic_cost={})",
            self.id, self.tasks, self.cycle_time, self.metabolic_cost
        )
    }
}

/// Hands out sequential workstation ids.
///
/// Two runs whose workstation numbers are compared must each start from a fresh
/// or reset counter.
#[derive(Debug, Clone)]
pub struct WorkstationIdCounter {
    next: WorkstationId,
}

impl Default for WorkstationIdCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl WorkstationIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> WorkstationId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Create an empty workstation carrying the next id.
    pub fn open(&mut self) -> Workstation {
        Workstation::new(self.next_id())
    }

    pub fn reset(&mut self) {
        self.next = 1;
    }
}

/// Per-workstation (cycle_time, metabolic_cost) summary, as handed to reporting.
pub fn overall_performance(balance: &LineBalance) -> BTreeMap<WorkstationId, (f64, f64)> {
    balance
        .iter()
        .map(|(&id, ws)| (id, ws.performance()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_task_accumulates() {
        let mut ws = Workstation::new(3);
        ws.add_task("a", 2.5, 1.0);
        ws.add_task("b", 4.0, 0.5);

        assert_eq!(ws.tasks, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(ws.performance(), (6.5, 1.5));
        assert!(ws.contains("b"));
        assert!(!ws.contains("c"));
        assert_eq!(ws.len(), 2);
    }

    #[test]
    fn test_counter_sequence_and_reset() {
        let mut counter = WorkstationIdCounter::new();
        assert_eq!(counter.open().id, 1);
        assert_eq!(counter.next_id(), 2);
        assert_eq!(counter.open().id, 3);

        counter.reset();
        assert_eq!(counter.open().id, 1);
    }

    #[test]
    fn test_overall_performance() {
        let mut first = Workstation::new(1);
        first.add_task("a", 5.0, 2.0);
        let mut second = Workstation::new(2);
        second.add_task("b", 3.0, 4.0);
        second.add_task("c", 1.0, 1.0);

        let balance: LineBalance = [(1, first), (2, second)].into_iter().collect();
        let summary = overall_performance(&balance);

        assert_eq!(summary.get(&1), Some(&(5.0, 2.0)));
        assert_eq!(summary.get(&2), Some(&(4.0, 5.0)));
    }
}
