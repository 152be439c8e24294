//! Precedence graph with an insertion-ordered frontier of assignable tasks.

use crate::catalog::TaskCatalog;
use crate::interner::TaskIdx;
use crate::Metric;

/// Error types for precedence graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A precedence edge names a task the catalog does not contain.
    UnknownTask(String),
    /// A task was removed while not on the frontier.
    NotAvailable(String),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::UnknownTask(id) => {
                write!(f, "Precedence references unknown task: {}", id)
            }
            GraphError::NotAvailable(id) => {
                write!(f, "Task is not available for assignment: {}", id)
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Dependency state of one allocation run.
///
/// A task sits on the frontier once all of its predecessors have been removed.
/// The frontier keeps insertion order, which is also the tie-break order for
/// every selection made from it.
#[derive(Debug, Clone)]
pub struct PrecedenceGraph<'a> {
    catalog: &'a TaskCatalog,
    successors: Vec<Vec<TaskIdx>>,
    indegree: Vec<usize>,
    available: Vec<TaskIdx>,
    remaining: usize,
}

impl<'a> PrecedenceGraph<'a> {
    /// Build the graph over every task in `catalog`.
    ///
    /// Initial frontier: source tasks in order of first appearance as a
    /// predecessor in `precedence`, then tasks without any edge in catalog order.
    pub fn new(
        catalog: &'a TaskCatalog,
        precedence: &[(String, String)],
    ) -> Result<Self, GraphError> {
        let lookup = |id: &str| {
            catalog
                .index_of(id)
                .ok_or_else(|| GraphError::UnknownTask(id.to_string()))
        };

        let mut successors: Vec<Vec<TaskIdx>> = vec![Vec::new(); catalog.len()];
        let mut indegree: Vec<usize> = vec![0; catalog.len()];
        let mut predecessor_order: Vec<TaskIdx> = Vec::new();

        for (before, after) in precedence {
            let before = lookup(before)?;
            let after = lookup(after)?;
            if successors[before as usize].is_empty() {
                predecessor_order.push(before);
            }
            successors[before as usize].push(after);
            indegree[after as usize] += 1;
        }

        let mut queued = vec![false; catalog.len()];
        let mut available = Vec::new();
        for idx in predecessor_order.into_iter().chain(catalog.indices()) {
            if indegree[idx as usize] == 0 && !queued[idx as usize] {
                queued[idx as usize] = true;
                available.push(idx);
            }
        }

        Ok(Self {
            catalog,
            successors,
            indegree,
            available,
            remaining: catalog.len(),
        })
    }

    /// Current frontier, in insertion order.
    pub fn available(&self) -> &[TaskIdx] {
        &self.available
    }

    pub fn has_available(&self) -> bool {
        !self.available.is_empty()
    }

    /// Number of tasks not removed yet.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Identifiers of tasks never removed, in catalog order.
    ///
    /// Once the frontier is empty these are exactly the tasks stuck behind a cycle.
    pub fn unassigned(&self) -> Vec<String> {
        self.catalog
            .indices()
            .filter(|&idx| self.indegree[idx as usize] > 0 || self.available.contains(&idx))
            .map(|idx| self.catalog.name(idx).to_string())
            .collect()
    }

    /// Remove a frontier task and release its successors.
    pub fn remove_task(&mut self, task: TaskIdx) -> Result<(), GraphError> {
        let position = self
            .available
            .iter()
            .position(|&t| t == task)
            .ok_or_else(|| GraphError::NotAvailable(self.catalog.name(task).to_string()))?;
        self.available.remove(position);
        self.remaining -= 1;

        for &next in &self.successors[task as usize] {
            let degree = &mut self.indegree[next as usize];
            *degree -= 1;
            if *degree == 0 {
                self.available.push(next);
            }
        }
        Ok(())
    }

    /// Frontier task with the smallest value of `metric`; earliest entry wins ties.
    pub fn lowest_task(&self, metric: Metric) -> Option<TaskIdx> {
        let mut tasks = self.available.iter().copied();
        let first = tasks.next()?;
        Some(tasks.fold(first, |best, task| {
            if metric.of(self.catalog, task) < metric.of(self.catalog, best) {
                task
            } else {
                best
            }
        }))
    }

    pub fn lowest_time_task(&self) -> Option<TaskIdx> {
        self.lowest_task(Metric::CycleTime)
    }

    pub fn lowest_cost_task(&self) -> Option<TaskIdx> {
        self.lowest_task(Metric::MetabolicCost)
    }

    pub fn task_name(&self, task: TaskIdx) -> &'a str {
        self.catalog.name(task)
    }
}
