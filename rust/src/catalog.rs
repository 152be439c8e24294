//! The task universe of one balancing problem.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::interner::{TaskIdx, TaskInterner};

/// Errors raised while assembling a task catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate task: {0}")]
    DuplicateTask(String),
    #[error("Task {0} has a processing time but no metabolic cost")]
    MissingMetabolicCost(String),
    #[error("Metabolic cost given for unknown task: {0}")]
    UnknownTask(String),
    #[error("Task {task} has invalid {metric} {value} (must be finite and non-negative)")]
    InvalidMetric {
        task: String,
        metric: &'static str,
        value: f64,
    },
    #[error("Number of operators must be at least 1")]
    NoOperators,
}

/// Ordered, read-only set of tasks with their processing time and metabolic cost.
///
/// Task order is the order tasks were supplied in; the precedence graph uses it
/// to seed isolated tasks into the frontier.
#[derive(Debug, Clone, Default)]
pub struct TaskCatalog {
    interner: TaskInterner,
    times: Vec<f64>,
    costs: Vec<f64>,
}

fn check_metric(task: &str, metric: &'static str, value: f64) -> Result<f64, CatalogError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CatalogError::InvalidMetric {
            task: task.to_string(),
            metric,
            value,
        })
    }
}

/// Per-operator share of a total, e.g. the average cycle time of a line.
pub fn per_operator_share<I>(values: I, n_operators: u32) -> Result<f64, CatalogError>
where
    I: IntoIterator<Item = f64>,
{
    divide_among(values.into_iter().sum(), n_operators)
}

fn divide_among(total: f64, n_operators: u32) -> Result<f64, CatalogError> {
    if n_operators == 0 {
        return Err(CatalogError::NoOperators);
    }
    Ok(total / n_operators as f64)
}

impl TaskCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            interner: TaskInterner::with_capacity(capacity),
            times: Vec::with_capacity(capacity),
            costs: Vec::with_capacity(capacity),
        }
    }

    /// Add one task. Duplicates and negative or non-finite metrics are rejected.
    pub fn insert(&mut self, task: &str, time: f64, cost: f64) -> Result<TaskIdx, CatalogError> {
        let time = check_metric(task, "processing time", time)?;
        let cost = check_metric(task, "metabolic cost", cost)?;
        let idx = self
            .interner
            .insert(task)
            .ok_or_else(|| CatalogError::DuplicateTask(task.to_string()))?;
        self.times.push(time);
        self.costs.push(cost);
        Ok(idx)
    }

    /// Build a catalog from separate time and cost listings.
    ///
    /// `times` defines the task order. `costs` must name exactly the same tasks.
    pub fn from_metrics<T, C>(times: T, costs: C) -> Result<Self, CatalogError>
    where
        T: IntoIterator<Item = (String, f64)>,
        C: IntoIterator<Item = (String, f64)>,
    {
        let mut cost_map: FxHashMap<String, f64> = costs.into_iter().collect();
        let mut catalog = Self::with_capacity(cost_map.len());
        for (task, time) in times {
            if catalog.index_of(&task).is_some() {
                return Err(CatalogError::DuplicateTask(task));
            }
            let cost = cost_map
                .remove(&task)
                .ok_or_else(|| CatalogError::MissingMetabolicCost(task.clone()))?;
            catalog.insert(&task, time, cost)?;
        }
        if let Some(extra) = cost_map.into_keys().min() {
            return Err(CatalogError::UnknownTask(extra));
        }
        Ok(catalog)
    }

    #[inline]
    pub fn index_of(&self, task: &str) -> Option<TaskIdx> {
        self.interner.get(task)
    }

    #[inline]
    pub fn name(&self, idx: TaskIdx) -> &str {
        self.interner.name(idx)
    }

    #[inline]
    pub fn time(&self, idx: TaskIdx) -> f64 {
        self.times[idx as usize]
    }

    #[inline]
    pub fn cost(&self, idx: TaskIdx) -> f64 {
        self.costs[idx as usize]
    }

    /// Time and cost of a task by identifier.
    pub fn metrics(&self, task: &str) -> Option<(f64, f64)> {
        self.index_of(task).map(|idx| (self.time(idx), self.cost(idx)))
    }

    /// Task indices in catalog order.
    pub fn indices(&self) -> impl Iterator<Item = TaskIdx> {
        0..self.len() as TaskIdx
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.interner.names()
    }

    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }

    pub fn total_time(&self) -> f64 {
        self.times.iter().sum()
    }

    pub fn total_metabolic_cost(&self) -> f64 {
        self.costs.iter().sum()
    }

    pub fn average_cycle_time(&self, n_operators: u32) -> Result<f64, CatalogError> {
        divide_among(self.total_time(), n_operators)
    }

    pub fn average_metabolic_cost(&self, n_operators: u32) -> Result<f64, CatalogError> {
        divide_among(self.total_metabolic_cost(), n_operators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, f64)]) -> Vec<(String, f64)> {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_from_metrics_keeps_time_order() {
        let catalog = TaskCatalog::from_metrics(
            pairs(&[("b", 2.0), ("a", 1.0), ("c", 3.0)]),
            pairs(&[("a", 0.5), ("c", 1.5), ("b", 1.0)]),
        )
        .unwrap();

        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(catalog.metrics("a"), Some((1.0, 0.5)));
        assert_eq!(catalog.metrics("c"), Some((3.0, 1.5)));
        assert_eq!(catalog.metrics("z"), None);
    }

    #[test]
    fn test_missing_cost_rejected() {
        let result =
            TaskCatalog::from_metrics(pairs(&[("a", 1.0), ("b", 2.0)]), pairs(&[("a", 1.0)]));
        assert_eq!(
            result.unwrap_err(),
            CatalogError::MissingMetabolicCost("b".to_string())
        );
    }

    #[test]
    fn test_cost_for_unknown_task_rejected() {
        let result = TaskCatalog::from_metrics(
            pairs(&[("a", 1.0)]),
            pairs(&[("a", 1.0), ("ghost", 2.0)]),
        );
        assert_eq!(
            result.unwrap_err(),
            CatalogError::UnknownTask("ghost".to_string())
        );
    }

    #[test]
    fn test_duplicate_and_invalid_metrics_rejected() {
        let mut catalog = TaskCatalog::new();
        catalog.insert("a", 1.0, 1.0).unwrap();
        assert_eq!(
            catalog.insert("a", 2.0, 2.0),
            Err(CatalogError::DuplicateTask("a".to_string()))
        );
        assert!(matches!(
            catalog.insert("b", -1.0, 1.0),
            Err(CatalogError::InvalidMetric { metric: "processing time", .. })
        ));
        assert!(matches!(
            catalog.insert("c", 1.0, f64::NAN),
            Err(CatalogError::InvalidMetric { metric: "metabolic cost", .. })
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_averages() {
        let catalog = TaskCatalog::from_metrics(
            pairs(&[("a", 5.0), ("b", 3.0), ("c", 4.0)]),
            pairs(&[("a", 2.0), ("b", 1.0), ("c", 3.0)]),
        )
        .unwrap();

        assert_eq!(catalog.total_time(), 12.0);
        assert_eq!(catalog.total_metabolic_cost(), 6.0);
        assert_eq!(catalog.average_cycle_time(2), Ok(6.0));
        assert_eq!(catalog.average_metabolic_cost(3), Ok(2.0));
        assert_eq!(catalog.average_cycle_time(0), Err(CatalogError::NoOperators));
    }
}
