//! Rust core of Ergoline: assembly-line balancing by cycle time and metabolic cost.
//!
//! Tasks are allocated to workstations in precedence order by a greedy
//! allocator bounded either by cycle time or by metabolic cost; the
//! dual-objective mode reconciles one run of each.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::collections::BTreeMap;
use std::path::PathBuf;

mod allocation;
mod catalog;
mod config;
mod graph;
mod interner;
pub mod loader;
pub mod logging;
mod models;

pub use allocation::{
    balance_by_metabolic_cost, balance_by_time, balance_considering_both, reconcile,
    AllocationError, GreedyAllocator, IncreaseEstimate, Metric, Placement,
};
pub use catalog::{per_operator_share, CatalogError, TaskCatalog};
pub use config::BalancingConfig;
pub use graph::{GraphError, PrecedenceGraph};
pub use interner::TaskIdx;
pub use loader::LoadError;
pub use models::{
    overall_performance, LineBalance, Workstation, WorkstationId, WorkstationIdCounter,
};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn load_error(err: LoadError) -> PyErr {
    match err {
        LoadError::Io { .. } => PyIOError::new_err(err.to_string()),
        _ => value_error(err),
    }
}

/// Read a `{task: value}` dict in insertion order.
fn ordered_metrics(values: &Bound<'_, PyDict>) -> PyResult<Vec<(String, f64)>> {
    values
        .iter()
        .map(|(task, value)| Ok((task.extract::<String>()?, value.extract::<f64>()?)))
        .collect()
}

pub(crate) fn catalog_from_dicts(
    tasks: &Bound<'_, PyDict>,
    metabolic_costs: &Bound<'_, PyDict>,
) -> PyResult<TaskCatalog> {
    TaskCatalog::from_metrics(ordered_metrics(tasks)?, ordered_metrics(metabolic_costs)?)
        .map_err(value_error)
}

/// Allocate tasks to workstations bounded by `config.cycle_time`.
///
/// # Arguments
/// * `tasks` - Dict mapping task ID to processing time (order defines tie-breaks)
/// * `metabolic_costs` - Dict mapping task ID to metabolic cost
/// * `precedence` - List of (predecessor, successor) pairs
/// * `config` - Bounds, threshold and operator count
///
/// # Returns
/// * Dict mapping workstation ID (from 1) to Workstation
///
/// # Raises
/// * ValueError on malformed input or a circular precedence graph
#[pyfunction]
#[pyo3(name = "balance_by_time")]
fn py_balance_by_time(
    tasks: &Bound<'_, PyDict>,
    metabolic_costs: &Bound<'_, PyDict>,
    precedence: Vec<(String, String)>,
    config: BalancingConfig,
) -> PyResult<LineBalance> {
    let catalog = catalog_from_dicts(tasks, metabolic_costs)?;
    balance_by_time(&catalog, &precedence, &config).map_err(value_error)
}

/// Allocate tasks to workstations bounded by `config.max_metabolic_cost`.
///
/// Same arguments, result and errors as `balance_by_time`.
#[pyfunction]
#[pyo3(name = "balance_by_metabolic_cost")]
fn py_balance_by_metabolic_cost(
    tasks: &Bound<'_, PyDict>,
    metabolic_costs: &Bound<'_, PyDict>,
    precedence: Vec<(String, String)>,
    config: BalancingConfig,
) -> PyResult<LineBalance> {
    let catalog = catalog_from_dicts(tasks, metabolic_costs)?;
    balance_by_metabolic_cost(&catalog, &precedence, &config).map_err(value_error)
}

/// Run both single-objective allocations and reconcile them into one line.
#[pyfunction]
#[pyo3(name = "balance_considering_both")]
fn py_balance_considering_both(
    tasks: &Bound<'_, PyDict>,
    metabolic_costs: &Bound<'_, PyDict>,
    precedence: Vec<(String, String)>,
    config: BalancingConfig,
) -> PyResult<LineBalance> {
    let catalog = catalog_from_dicts(tasks, metabolic_costs)?;
    balance_considering_both(&catalog, &precedence, &config).map_err(value_error)
}

/// Map each workstation ID to its (cycle_time, metabolic_cost) pair.
#[pyfunction]
#[pyo3(name = "overall_performance")]
fn py_overall_performance(
    workstations: BTreeMap<WorkstationId, Workstation>,
) -> BTreeMap<WorkstationId, (f64, f64)> {
    overall_performance(&workstations)
}

/// Total processing time divided by the number of operators.
#[pyfunction]
fn average_cycle_time(tasks: &Bound<'_, PyDict>, n_operators: u32) -> PyResult<f64> {
    let times = ordered_metrics(tasks)?;
    per_operator_share(times.into_iter().map(|(_, time)| time), n_operators).map_err(value_error)
}

/// Total metabolic cost divided by the number of operators.
#[pyfunction]
fn average_metabolic_cost(
    metabolic_costs: &Bound<'_, PyDict>,
    n_operators: u32,
) -> PyResult<f64> {
    let costs = ordered_metrics(metabolic_costs)?;
    per_operator_share(costs.into_iter().map(|(_, cost)| cost), n_operators).map_err(value_error)
}

/// Read a task data file into (times, metabolic_costs) dicts, in file order.
///
/// # Raises
/// * IOError if the file cannot be read
/// * ValueError on a malformed line or duplicate task
#[pyfunction]
fn read_data_file(
    py: Python<'_>,
    path: PathBuf,
) -> PyResult<(Bound<'_, PyDict>, Bound<'_, PyDict>)> {
    let catalog = loader::read_task_data(&path).map_err(load_error)?;
    let times = PyDict::new_bound(py);
    let costs = PyDict::new_bound(py);
    for idx in catalog.indices() {
        times.set_item(catalog.name(idx), catalog.time(idx))?;
        costs.set_item(catalog.name(idx), catalog.cost(idx))?;
    }
    Ok((times, costs))
}

/// Read a precedence diagram into a list of (predecessor, successor) pairs.
#[pyfunction]
fn read_precedence_file(path: PathBuf) -> PyResult<Vec<(String, String)>> {
    loader::read_precedence(&path).map_err(load_error)
}

/// The ergoline.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data types
    m.add_class::<Workstation>()?;
    m.add_class::<BalancingConfig>()?;

    // Allocation
    m.add_function(wrap_pyfunction!(py_balance_by_time, m)?)?;
    m.add_function(wrap_pyfunction!(py_balance_by_metabolic_cost, m)?)?;
    m.add_function(wrap_pyfunction!(py_balance_considering_both, m)?)?;

    // Inputs and reporting
    m.add_function(wrap_pyfunction!(py_overall_performance, m)?)?;
    m.add_function(wrap_pyfunction!(average_cycle_time, m)?)?;
    m.add_function(wrap_pyfunction!(average_metabolic_cost, m)?)?;
    m.add_function(wrap_pyfunction!(read_data_file, m)?)?;
    m.add_function(wrap_pyfunction!(read_precedence_file, m)?)?;

    Ok(())
}
