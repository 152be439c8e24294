//! Configuration for a line-balancing run.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::catalog::{CatalogError, TaskCatalog};

/// Capacity bounds and relaxation settings shared by all allocators.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct BalancingConfig {
    /// Maximum cumulative processing time per workstation
    #[pyo3(get, set)]
    pub cycle_time: f64,
    /// Maximum cumulative metabolic cost per workstation
    #[pyo3(get, set)]
    pub max_metabolic_cost: f64,
    /// Percent overshoot tolerated above a bound before a workstation counts as full
    #[pyo3(get, set)]
    pub threshold: f64,
    /// Number of operators; the workstation with this id absorbs any overflow
    #[pyo3(get, set)]
    pub n_operators: u32,
    /// Logging verbosity (0 = silent, 3 = debug)
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for BalancingConfig {
    fn default() -> Self {
        Self {
            cycle_time: 0.0,
            max_metabolic_cost: 0.0,
            threshold: 10.0,
            n_operators: 1,
            verbosity: 0,
        }
    }
}

impl BalancingConfig {
    /// Bounds set to the per-operator averages of the catalog's totals.
    pub fn from_averages(
        catalog: &TaskCatalog,
        n_operators: u32,
        threshold: f64,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            cycle_time: catalog.average_cycle_time(n_operators)?,
            max_metabolic_cost: catalog.average_metabolic_cost(n_operators)?,
            threshold,
            n_operators,
            ..Self::default()
        })
    }

    /// Ceiling for a relaxed assignment against `bound`.
    pub fn relaxed_ceiling(&self, bound: f64) -> f64 {
        bound * (1.0 + self.threshold / 100.0)
    }

    /// Check the bounds and operator count, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_operators == 0 {
            return Err("n_operators must be at least 1".to_string());
        }
        for (name, value) in [
            ("cycle_time", self.cycle_time),
            ("max_metabolic_cost", self.max_metabolic_cost),
            ("threshold", self.threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be finite and non-negative, got {}", name, value));
            }
        }
        Ok(())
    }
}

#[pymethods]
impl BalancingConfig {
    #[new]
    #[pyo3(signature = (
        cycle_time,
        max_metabolic_cost,
        n_operators=None,
        threshold=None,
        verbosity=None
    ))]
    fn new(
        cycle_time: f64,
        max_metabolic_cost: f64,
        n_operators: Option<u32>,
        threshold: Option<f64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            cycle_time,
            max_metabolic_cost,
            threshold: threshold.unwrap_or(defaults.threshold),
            n_operators: n_operators.unwrap_or(defaults.n_operators),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    /// Bounds from the per-operator averages of the given task metrics.
    #[staticmethod]
    #[pyo3(name = "from_averages")]
    #[pyo3(signature = (tasks, metabolic_costs, n_operators, threshold=10.0))]
    fn py_from_averages(
        tasks: &Bound<'_, PyDict>,
        metabolic_costs: &Bound<'_, PyDict>,
        n_operators: u32,
        threshold: f64,
    ) -> PyResult<Self> {
        let catalog = crate::catalog_from_dicts(tasks, metabolic_costs)?;
        Self::from_averages(&catalog, n_operators, threshold)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "BalancingConfig(cycle_time={}, max_metabolic_cost={}, threshold={}, n_operators={})",
            self.cycle_time, self.max_metabolic_cost, self.threshold, self.n_operators
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_averages() {
        let mut catalog = TaskCatalog::new();
        catalog.insert("a", 6.0, 3.0).unwrap();
        catalog.insert("b", 4.0, 1.0).unwrap();

        let config = BalancingConfig::from_averages(&catalog, 2, 25.0).unwrap();
        assert_eq!(config.cycle_time, 5.0);
        assert_eq!(config.max_metabolic_cost, 2.0);
        assert_eq!(config.threshold, 25.0);
        assert_eq!(config.n_operators, 2);
        assert_eq!(config.relaxed_ceiling(config.cycle_time), 6.25);
    }

    #[test]
    fn test_validate() {
        let config = BalancingConfig {
            cycle_time: 10.0,
            max_metabolic_cost: 5.0,
            ..BalancingConfig::default()
        };
        assert!(config.validate().is_ok());

        let no_operators = BalancingConfig {
            n_operators: 0,
            ..config.clone()
        };
        assert!(no_operators.validate().unwrap_err().contains("n_operators"));

        let negative = BalancingConfig {
            threshold: -5.0,
            ..config
        };
        assert!(negative.validate().unwrap_err().contains("threshold"));
    }
}
