//! Backtracking search over a compiled [`CpModel`].
//!
//! # Algorithm
//! 1. Static workload check: coverage is exact, so each faculty member's
//!    final load is the sum of their requirements' sessions. A window that
//!    cannot admit it fails before any search.
//! 2. Propagation to fixpoint on every cardinality constraint:
//!    `ones == max` forces the remaining free variables false,
//!    `ones + free == min` forces them true, anything outside the bounds
//!    is a conflict.
//! 3. Capacity lookahead: the sessions a faculty member, section, or the
//!    whole room pool still has to receive must fit in the slots still open
//!    to it.
//! 4. Branching: the unfinished requirement with the fewest free variables
//!    (MRV), first free variable in enumeration order, `true` before `false`.
//!
//! Decisions live on an explicit stack with a value trail, so depth is
//! bounded by memory rather than the call stack. Variable and constraint
//! order are fixed by the model, so identical inputs explore identical
//! trees.
//!
//! # Reference
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems"
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming", ch. 4

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::constraints::{ConstraintId, CpModel};
use super::requirements::RequirementSet;
use super::variables::{VarId, VariableSpace};
use crate::error::{ConstraintClass, InfeasibleReason};

/// How often (in search iterations) the clock is read.
const CLOCK_INTERVAL: u64 = 64;

/// Solver configuration.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Wall-clock budget. `None` = run until the tree is exhausted.
    pub time_budget: Option<Duration>,
}

impl SearchConfig {
    pub fn with_time_budget_ms(mut self, ms: u64) -> Self {
        self.time_budget = Some(Duration::from_millis(ms));
        self
    }
}

/// Search counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub decisions: u64,
    pub backtracks: u64,
    pub max_depth: usize,
    pub elapsed: Duration,
}

/// Variables set to true in a solution, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub true_vars: Vec<VarId>,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved(Assignment),
    Infeasible(InfeasibleReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Free,
    True,
    False,
}

#[derive(Debug, Clone, Copy)]
struct Decision {
    var: VarId,
    /// Trail length before the decision was applied.
    mark: usize,
    value: bool,
}

/// A dead end, captured cheaply; formatted only if it is the one reported.
#[derive(Debug, Clone, Copy)]
enum Failure {
    Bounds {
        constraint: ConstraintId,
        ones: u32,
        free: u32,
    },
    Capacity {
        class: ConstraintClass,
        resource: Option<usize>,
        demand: u32,
        open: u32,
    },
    Workload {
        faculty: usize,
        load: u32,
    },
}

impl Failure {
    fn class(&self, model: &CpModel) -> ConstraintClass {
        match *self {
            Failure::Bounds { constraint, .. } => model.constraint(constraint).class,
            Failure::Capacity { class, .. } => class,
            Failure::Workload { .. } => ConstraintClass::Workload,
        }
    }
}

/// Complete depth-first solver.
pub struct Solver<'a> {
    model: &'a CpModel,
    requirements: &'a RequirementSet,
    space: &'a VariableSpace,
    config: SearchConfig,

    values: Vec<Value>,
    ones: Vec<u32>,
    free: Vec<u32>,
    trail: Vec<VarId>,
    queue: VecDeque<ConstraintId>,
    queued: Vec<bool>,

    stats: SearchStats,
    deepest: Option<(usize, Failure)>,
}

impl<'a> Solver<'a> {
    pub fn new(
        model: &'a CpModel,
        requirements: &'a RequirementSet,
        space: &'a VariableSpace,
        config: SearchConfig,
    ) -> Self {
        let free = model
            .constraints()
            .iter()
            .map(|c| c.vars.len() as u32)
            .collect();
        Self {
            model,
            requirements,
            space,
            config,
            values: vec![Value::Free; model.num_vars()],
            ones: vec![0; model.len()],
            free,
            trail: Vec::new(),
            queue: VecDeque::new(),
            queued: vec![false; model.len()],
            stats: SearchStats::default(),
            deepest: None,
        }
    }

    /// Runs the search to a solution, a proof of infeasibility, or the
    /// time budget.
    ///
    /// A zero budget times out before the first propagation; the static
    /// workload check still runs.
    pub fn solve(mut self) -> SearchReport {
        let started = Instant::now();
        debug!(
            variables = self.model.num_vars(),
            constraints = self.model.len(),
            requirements = self.requirements.len(),
            "search started"
        );

        let outcome = match self.check_workloads() {
            Err(failure) => {
                self.record(failure, 0);
                self.proven()
            }
            Ok(()) => self.run(started),
        };

        self.stats.elapsed = started.elapsed();
        debug!(
            decisions = self.stats.decisions,
            backtracks = self.stats.backtracks,
            max_depth = self.stats.max_depth,
            elapsed_ms = self.stats.elapsed.as_millis() as u64,
            solved = matches!(outcome, SearchOutcome::Solved(_)),
            "search finished"
        );
        SearchReport {
            outcome,
            stats: self.stats,
        }
    }

    fn run(&mut self, started: Instant) -> SearchOutcome {
        let mut stack: Vec<Decision> = Vec::new();
        for c in 0..self.model.len() {
            self.enqueue(c);
        }

        let mut iteration: u64 = 0;
        loop {
            if iteration % CLOCK_INTERVAL == 0 {
                if let Some(budget) = self.config.time_budget {
                    if started.elapsed() >= budget {
                        return SearchOutcome::Infeasible(InfeasibleReason::Timeout {
                            budget_ms: budget.as_millis() as u64,
                        });
                    }
                }
            }
            iteration += 1;

            let step = self
                .propagate()
                .and_then(|()| self.lookahead())
                .and_then(|()| match self.pick_branch() {
                    Some(var) => Ok(Some(var)),
                    None => self.verify().map(|()| None),
                });

            match step {
                Ok(Some(var)) => {
                    stack.push(Decision {
                        var,
                        mark: self.trail.len(),
                        value: true,
                    });
                    self.stats.decisions += 1;
                    self.stats.max_depth = self.stats.max_depth.max(stack.len());
                    self.assign(var, Value::True);
                }
                Ok(None) => return SearchOutcome::Solved(self.assignment()),
                Err(failure) => {
                    self.record(failure, stack.len());
                    if !self.backtrack(&mut stack) {
                        return self.proven();
                    }
                }
            }
        }
    }

    /// Unwinds to the most recent untried `false` branch. Returns `false`
    /// when the tree is exhausted.
    fn backtrack(&mut self, stack: &mut Vec<Decision>) -> bool {
        while let Some(decision) = stack.pop() {
            self.undo_to(decision.mark);
            self.stats.backtracks += 1;
            if decision.value {
                trace!(var = decision.var, depth = stack.len(), "retrying as false");
                stack.push(Decision {
                    value: false,
                    ..decision
                });
                self.assign(decision.var, Value::False);
                return true;
            }
        }
        false
    }

    fn check_workloads(&self) -> Result<(), Failure> {
        for (f, bounds) in self.requirements.workloads.iter().enumerate() {
            if bounds.is_unconstrained() {
                continue;
            }
            let load: u32 = self
                .model
                .faculty_groups()
                .get(f)
                .map(|g| g.requirements.iter().map(|&r| self.requirements[r].sessions).sum())
                .unwrap_or(0);
            if !bounds.admits(load) {
                return Err(Failure::Workload { faculty: f, load });
            }
        }
        Ok(())
    }

    fn enqueue(&mut self, c: ConstraintId) {
        if !self.queued[c] {
            self.queued[c] = true;
            self.queue.push_back(c);
        }
    }

    fn assign(&mut self, var: VarId, value: Value) {
        self.values[var] = value;
        self.trail.push(var);
        let model = self.model;
        for &c in model.constraints_of(var) {
            self.free[c] -= 1;
            if value == Value::True {
                self.ones[c] += 1;
            }
            self.enqueue(c);
        }
    }

    fn undo_to(&mut self, mark: usize) {
        let model = self.model;
        while self.trail.len() > mark {
            let Some(var) = self.trail.pop() else { break };
            let was_true = self.values[var] == Value::True;
            self.values[var] = Value::Free;
            for &c in model.constraints_of(var) {
                self.free[c] += 1;
                if was_true {
                    self.ones[c] -= 1;
                }
            }
        }
        self.clear_queue();
    }

    fn clear_queue(&mut self) {
        for c in self.queue.drain(..) {
            self.queued[c] = false;
        }
    }

    fn propagate(&mut self) -> Result<(), Failure> {
        let model = self.model;
        while let Some(c) = self.queue.pop_front() {
            self.queued[c] = false;
            let constraint = model.constraint(c);
            let (ones, free) = (self.ones[c], self.free[c]);

            if ones > constraint.max || ones + free < constraint.min {
                self.clear_queue();
                return Err(Failure::Bounds {
                    constraint: c,
                    ones,
                    free,
                });
            }
            if free == 0 {
                continue;
            }
            let forced = if ones == constraint.max {
                Value::False
            } else if ones + free == constraint.min {
                Value::True
            } else {
                continue;
            };
            for &v in &constraint.vars {
                if self.values[v] == Value::Free {
                    self.assign(v, forced);
                }
            }
        }
        Ok(())
    }

    /// Remaining demand per resource against its open slots.
    fn lookahead(&self) -> Result<(), Failure> {
        let remaining = |r: usize| {
            let c = self.model.coverage_of(r);
            self.model.constraint(c).max.saturating_sub(self.ones[c])
        };
        let open_slots = |slots: &[ConstraintId]| {
            slots
                .iter()
                .filter(|&&c| self.ones[c] == 0 && self.free[c] > 0)
                .count() as u32
        };

        for (class, groups) in [
            (ConstraintClass::FacultyDoubleBooking, self.model.faculty_groups()),
            (ConstraintClass::SectionDoubleBooking, self.model.section_groups()),
        ] {
            for (i, group) in groups.iter().enumerate() {
                let demand: u32 = group.requirements.iter().map(|&r| remaining(r)).sum();
                if demand == 0 {
                    continue;
                }
                let open = open_slots(&group.slots);
                if demand > open {
                    return Err(Failure::Capacity {
                        class,
                        resource: Some(i),
                        demand,
                        open,
                    });
                }
            }
        }

        let demand: u32 = (0..self.requirements.len()).map(remaining).sum();
        let open = open_slots(self.model.room_slots());
        if demand > open && !self.model.room_slots().is_empty() {
            return Err(Failure::Capacity {
                class: ConstraintClass::ClassroomDoubleBooking,
                resource: None,
                demand,
                open,
            });
        }
        Ok(())
    }

    /// MRV: the unfinished requirement with the fewest free variables,
    /// ties by requirement order; its first free variable.
    fn pick_branch(&self) -> Option<VarId> {
        let mut best: Option<(u32, usize)> = None;
        for r in 0..self.requirements.len() {
            let c = self.model.coverage_of(r);
            let (ones, free) = (self.ones[c], self.free[c]);
            if ones >= self.model.constraint(c).max || free == 0 {
                continue;
            }
            if best.map_or(true, |(f, _)| free < f) {
                best = Some((free, r));
            }
        }
        let (_, r) = best?;
        self.space
            .requirement_vars(r)
            .find(|&v| self.values[v] == Value::Free)
    }

    fn verify(&self) -> Result<(), Failure> {
        for (c, constraint) in self.model.constraints().iter().enumerate() {
            let ones = self.ones[c];
            if ones < constraint.min || ones > constraint.max {
                return Err(Failure::Bounds {
                    constraint: c,
                    ones,
                    free: self.free[c],
                });
            }
        }
        Ok(())
    }

    fn assignment(&self) -> Assignment {
        Assignment {
            true_vars: self
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| **v == Value::True)
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Keeps the deepest failure seen; later ones win ties.
    fn record(&mut self, failure: Failure, depth: usize) {
        trace!(depth, class = %failure.class(self.model), "conflict");
        if self.deepest.map_or(true, |(d, _)| depth >= d) {
            self.deepest = Some((depth, failure));
        }
    }

    fn proven(&self) -> SearchOutcome {
        let (class, detail) = match self.deepest {
            Some((_, failure)) => (failure.class(self.model), self.describe(failure)),
            None => (ConstraintClass::Coverage, "search space is empty".to_string()),
        };
        SearchOutcome::Infeasible(InfeasibleReason::Proven { class, detail })
    }

    fn describe(&self, failure: Failure) -> String {
        let reqs = self.requirements;
        match failure {
            Failure::Bounds {
                constraint,
                ones,
                free,
            } => {
                let c = self.model.constraint(constraint);
                let scope = c.scope.describe(reqs, self.space);
                if ones > c.max {
                    format!("{scope}: {ones} assigned, at most {} allowed", c.max)
                } else {
                    format!(
                        "{scope}: needs {}, only {} reachable",
                        c.min,
                        ones + free
                    )
                }
            }
            Failure::Capacity {
                class,
                resource,
                demand,
                open,
            } => {
                let who = match (class, resource) {
                    (ConstraintClass::FacultyDoubleBooking, Some(f)) => format!(
                        "faculty '{}'",
                        reqs.faculty_ids.get(f).map_or("?", String::as_str)
                    ),
                    (ConstraintClass::SectionDoubleBooking, Some(s)) => format!(
                        "section '{}'",
                        reqs.section_ids.get(s).map_or("?", String::as_str)
                    ),
                    _ => "classroom pool".to_string(),
                };
                format!("{who} has {demand} sessions left but only {open} open slots")
            }
            Failure::Workload { faculty, load } => {
                let bounds = reqs.workloads[faculty];
                let max = bounds
                    .max
                    .map_or_else(|| "unbounded".to_string(), |m| m.to_string());
                format!(
                    "faculty '{}' is assigned {load} sessions, outside [{}, {max}]",
                    reqs.faculty_ids[faculty], bounds.min
                )
            }
        }
    }
}
