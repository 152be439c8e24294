//! Greedy single-objective allocation with threshold overflow.

use thiserror::Error;

use crate::catalog::{CatalogError, TaskCatalog};
use crate::config::BalancingConfig;
use crate::graph::{GraphError, PrecedenceGraph};
use crate::interner::TaskIdx;
use crate::models::{LineBalance, Workstation, WorkstationIdCounter};
use crate::{log_changes, log_checks, log_debug};

use super::metric::Metric;

/// Errors that can occur during allocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("No tasks to allocate")]
    EmptyTaskSet,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Circular dependency detected; unassigned tasks: {0:?}")]
    CircularDependency(Vec<String>),
    #[error("Task {0} is not contained in any workstation of either run")]
    UnplacedTask(String),
    #[error("Workstation lists unknown task: {0}")]
    UnknownTask(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// How a task came to be placed on its workstation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Load stays within the nominal bound.
    Fit,
    /// Load exceeds the bound but stays within the relaxed ceiling.
    Relaxed,
    /// The last allowed workstation takes the task regardless of load.
    LastResort,
    /// Nothing fits an empty workstation; the lowest-metric task goes there alone.
    Forced,
}

/// Fills workstations in line order against a single capacity bound.
#[derive(Debug, Clone)]
pub struct GreedyAllocator<'a> {
    catalog: &'a TaskCatalog,
    precedence: &'a [(String, String)],
    metric: Metric,
    bound: f64,
    ceiling: f64,
    n_operators: u32,
    verbosity: u8,
}

impl<'a> GreedyAllocator<'a> {
    pub fn new(
        catalog: &'a TaskCatalog,
        precedence: &'a [(String, String)],
        metric: Metric,
        config: &BalancingConfig,
    ) -> Result<Self, AllocationError> {
        config.validate().map_err(AllocationError::InvalidConfig)?;
        if catalog.is_empty() {
            return Err(AllocationError::EmptyTaskSet);
        }

        let bound = metric.bound(config);
        Ok(Self {
            catalog,
            precedence,
            metric,
            bound,
            ceiling: config.relaxed_ceiling(bound),
            n_operators: config.n_operators,
            verbosity: config.verbosity,
        })
    }

    /// Pick the next task for `current`, or `None` if the workstation is full.
    ///
    /// The frontier is scanned in order and the first task that fits the bound,
    /// fits the relaxed ceiling or lands on the last workstation is taken. Only an
    /// empty workstation with the permission still available falls back to a forced pick.
    fn select(
        &self,
        graph: &PrecedenceGraph<'_>,
        current: &Workstation,
        relaxed_available: bool,
    ) -> Option<(TaskIdx, Placement)> {
        let load = self.metric.load(current);

        for &task in graph.available() {
            let next = load + self.metric.of(self.catalog, task);
            if next <= self.bound {
                return Some((task, Placement::Fit));
            }
            if next <= self.ceiling {
                return Some((task, Placement::Relaxed));
            }
            if current.id == self.n_operators {
                return Some((task, Placement::LastResort));
            }
            log_checks!(
                self.verbosity,
                "{} does not fit workstation {}: {} {} > {}",
                graph.task_name(task),
                current.id,
                self.metric,
                next,
                self.ceiling
            );
        }

        if relaxed_available && current.is_empty() {
            return graph
                .lowest_task(self.metric)
                .map(|task| (task, Placement::Forced));
        }
        None
    }

    /// Run the allocation, drawing workstation ids from `counter`.
    pub fn allocate(
        &self,
        counter: &mut WorkstationIdCounter,
    ) -> Result<LineBalance, AllocationError> {
        let verbosity = self.verbosity;
        let mut graph = PrecedenceGraph::new(self.catalog, self.precedence)?;
        let mut balance = LineBalance::new();
        let mut current = counter.open();
        let mut relaxed_available = true;

        log_changes!(
            verbosity,
            "Balancing {} tasks by {}: bound {}, relaxed ceiling {}, {} operators",
            self.catalog.len(),
            self.metric,
            self.bound,
            self.ceiling,
            self.n_operators
        );

        while graph.has_available() {
            log_debug!(
                verbosity,
                "Frontier: {:?}",
                graph
                    .available()
                    .iter()
                    .map(|&t| graph.task_name(t))
                    .collect::<Vec<_>>()
            );

            match self.select(&graph, &current, relaxed_available) {
                Some((task, placement)) => {
                    if matches!(placement, Placement::LastResort | Placement::Forced) {
                        relaxed_available = false;
                    }
                    current.add_task(
                        self.catalog.name(task),
                        self.catalog.time(task),
                        self.catalog.cost(task),
                    );
                    graph.remove_task(task)?;
                    log_changes!(
                        verbosity,
                        "Assigned {} to workstation {} ({:?}), {} now {}",
                        self.catalog.name(task),
                        current.id,
                        placement,
                        self.metric,
                        self.metric.load(&current)
                    );
                }
                None => {
                    let next = counter.open();
                    log_changes!(
                        verbosity,
                        "Workstation {} full at {} {}, opening workstation {}",
                        current.id,
                        self.metric,
                        self.metric.load(&current),
                        next.id
                    );
                    let full = std::mem::replace(&mut current, next);
                    balance.insert(full.id, full);
                    relaxed_available = true;
                }
            }
        }

        if graph.remaining() > 0 {
            return Err(AllocationError::CircularDependency(graph.unassigned()));
        }
        balance.insert(current.id, current);
        Ok(balance)
    }
}

/// Balance the line against `config.cycle_time`, numbering workstations from 1.
pub fn balance_by_time(
    catalog: &TaskCatalog,
    precedence: &[(String, String)],
    config: &BalancingConfig,
) -> Result<LineBalance, AllocationError> {
    GreedyAllocator::new(catalog, precedence, Metric::CycleTime, config)?
        .allocate(&mut WorkstationIdCounter::new())
}

/// Balance the line against `config.max_metabolic_cost`, numbering workstations from 1.
pub fn balance_by_metabolic_cost(
    catalog: &TaskCatalog,
    precedence: &[(String, String)],
    config: &BalancingConfig,
) -> Result<LineBalance, AllocationError> {
    GreedyAllocator::new(catalog, precedence, Metric::MetabolicCost, config)?
        .allocate(&mut WorkstationIdCounter::new())
}
