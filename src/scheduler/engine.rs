//! Solve orchestration.
//!
//! [`plan`] is the pure pipeline: catalog snapshot + configuration in,
//! timetable out. [`TimetableEngine`] wraps it with a catalog source and a
//! schedule store and commits successful results in one replace.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::materialize::materialize;
use super::view::SectionTimetable;
use crate::config::SolveConfig;
use crate::cp::{extract_requirements, CpModel, SearchConfig, SearchOutcome, Solver, VariableSpace};
use crate::error::{ConfigError, InfeasibleReason, SchedulerError, SolveError, StoreError};
use crate::models::{Catalog, CatalogSource, PeriodTable, Timetable};
use crate::store::ScheduleStore;

/// Size and effort of one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    pub requirements: usize,
    pub variables: usize,
    pub constraints: usize,
    pub decisions: u64,
    pub backtracks: u64,
    pub elapsed_ms: u64,
}

/// A solved week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Rows ordered by (day, period, section).
    pub timetable: Timetable,
    pub stats: SolveStats,
}

/// Outcome of [`TimetableEngine::solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// The store now holds this many rows.
    Scheduled(usize),
    /// No timetable; the store is unchanged.
    Infeasible(InfeasibleReason),
    /// The catalog or configuration is malformed; the store is unchanged.
    ConfigurationError(ConfigError),
}

impl SolveResult {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, SolveResult::Scheduled(_))
    }
}

/// Runs the full pipeline on one catalog snapshot.
///
/// # Errors
/// - [`SolveError::Configuration`] for grid, period-time, or responsibility
///   problems, raised before any search
/// - [`SolveError::Infeasible`] when the search proves there is no timetable
///   or runs out of budget
pub fn plan(catalog: &Catalog, config: &SolveConfig) -> Result<Plan, SolveError> {
    config.grid.validate()?;
    let periods = PeriodTable::generate(&config.period_times, config.grid.periods_per_day)?;

    let requirements = extract_requirements(catalog)?;
    debug!(
        requirements = requirements.len(),
        sessions = requirements.total_sessions(),
        "requirements extracted"
    );

    let space = VariableSpace::build(&requirements, &config.grid, &catalog.classrooms);
    let model = CpModel::compile(&requirements, &space);
    let model_stats = model.stats();
    debug!(
        variables = model_stats.variables,
        coverage = model_stats.coverage,
        faculty_slots = model_stats.faculty_slots,
        section_slots = model_stats.section_slots,
        room_slots = model_stats.room_slots,
        workload = model_stats.workload,
        "model compiled"
    );

    let search = SearchConfig {
        time_budget: config.time_budget_ms.map(Duration::from_millis),
    };
    let report = Solver::new(&model, &requirements, &space, search).solve();
    let stats = SolveStats {
        requirements: requirements.len(),
        variables: model_stats.variables,
        constraints: model_stats.constraints(),
        decisions: report.stats.decisions,
        backtracks: report.stats.backtracks,
        elapsed_ms: report.stats.elapsed.as_millis() as u64,
    };
    trace!(?stats, max_depth = report.stats.max_depth, "search statistics");

    match report.outcome {
        SearchOutcome::Solved(assignment) => Ok(Plan {
            timetable: materialize(&assignment, &requirements, &space, &periods),
            stats,
        }),
        SearchOutcome::Infeasible(reason) => Err(SolveError::Infeasible(reason)),
    }
}

/// Timetabling engine bound to a catalog source and a schedule store.
///
/// `solve` calls are serialized; the store is only written after a full
/// solution exists.
pub struct TimetableEngine<C, S> {
    catalog: C,
    store: S,
    solve_lock: Mutex<()>,
}

impl<C: CatalogSource, S: ScheduleStore> TimetableEngine<C, S> {
    pub fn new(catalog: C, store: S) -> Self {
        Self {
            catalog,
            store,
            solve_lock: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Solves against a fresh catalog snapshot and, on success, replaces the
    /// stored timetable.
    ///
    /// Infeasibility and configuration problems are results, not errors.
    /// Catalog and store failures are returned unchanged; a failed replace
    /// leaves the previous rows in place.
    pub fn solve(&self, config: &SolveConfig) -> Result<SolveResult, StoreError> {
        let _guard = self
            .solve_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let catalog = self.catalog.snapshot()?;
        info!(
            offerings = catalog.offerings.len(),
            faculty = catalog.faculty.len(),
            classrooms = catalog.classrooms.len(),
            days = config.grid.days,
            periods = config.grid.periods_per_day,
            "solve started"
        );

        match plan(&catalog, config) {
            Ok(plan) => {
                let rows = plan.timetable.len();
                if let Err(err) = self.store.replace_all(plan.timetable) {
                    warn!(error = %err, "schedule store rejected the new timetable");
                    return Err(err);
                }
                info!(
                    rows,
                    decisions = plan.stats.decisions,
                    elapsed_ms = plan.stats.elapsed_ms,
                    "solve finished"
                );
                Ok(SolveResult::Scheduled(rows))
            }
            Err(SolveError::Configuration(err)) => {
                warn!(error = %err, "solve aborted");
                Ok(SolveResult::ConfigurationError(err))
            }
            Err(SolveError::Infeasible(reason)) => {
                warn!(%reason, "no timetable produced");
                Ok(SolveResult::Infeasible(reason))
            }
        }
    }

    /// Stored week of one section, laid out on the configured grid.
    pub fn section_view(
        &self,
        section_id: &str,
        config: &SolveConfig,
    ) -> Result<SectionTimetable, SchedulerError> {
        let catalog = self.catalog.snapshot()?;
        let periods = PeriodTable::generate(&config.period_times, config.grid.periods_per_day)?;
        let rows = self.store.for_section(section_id)?;
        Ok(SectionTimetable::build(
            &catalog,
            &rows,
            section_id,
            &periods,
            config.grid.days,
        ))
    }
}
