//! Solve configuration.
//!
//! Defaults reproduce the reference deployment: 6 teaching days of 8
//! periods, starting at 10:00, 50 minutes each, no breaks, no time budget.
//! All types are serde-friendly so they can be loaded from JSON or YAML.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Everything a single solve needs besides the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveConfig {
    pub grid: GridConfig,
    pub period_times: PeriodTimeConfig,
    /// Wall-clock search budget (ms). `None` = search until exhausted.
    pub time_budget_ms: Option<u64>,
}

/// Weekly slot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Teaching days per week.
    pub days: u32,
    /// Periods per day.
    pub periods_per_day: u32,
}

/// Period-time generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodTimeConfig {
    /// Start of period 1.
    pub start: NaiveTime,
    /// Length of every period (minutes).
    pub period_minutes: u32,
    /// Breaks: period index → break length (minutes), inserted after that period.
    pub breaks: BTreeMap<u32, u32>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            days: 6,
            periods_per_day: 8,
        }
    }
}

impl GridConfig {
    pub fn new(days: u32, periods_per_day: u32) -> Self {
        Self {
            days,
            periods_per_day,
        }
    }

    /// Number of (day, period) slots.
    pub fn slot_count(&self) -> usize {
        self.days as usize * self.periods_per_day as usize
    }

    /// Rejects non-positive dimensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(ConfigError::InvalidGrid {
                field: "days",
                value: self.days,
            });
        }
        if self.periods_per_day == 0 {
            return Err(ConfigError::InvalidGrid {
                field: "periods_per_day",
                value: self.periods_per_day,
            });
        }
        Ok(())
    }
}

impl Default for PeriodTimeConfig {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            period_minutes: 50,
            breaks: BTreeMap::new(),
        }
    }
}

impl PeriodTimeConfig {
    pub fn with_start(mut self, start: NaiveTime) -> Self {
        self.start = start;
        self
    }

    pub fn with_period_minutes(mut self, minutes: u32) -> Self {
        self.period_minutes = minutes;
        self
    }

    /// Inserts a break of `minutes` after period `after`.
    pub fn with_break(mut self, after: u32, minutes: u32) -> Self {
        self.breaks.insert(after, minutes);
        self
    }
}

impl SolveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(mut self, days: u32, periods_per_day: u32) -> Self {
        self.grid = GridConfig::new(days, periods_per_day);
        self
    }

    pub fn with_period_times(mut self, period_times: PeriodTimeConfig) -> Self {
        self.period_times = period_times;
        self
    }

    pub fn with_time_budget_ms(mut self, budget_ms: u64) -> Self {
        self.time_budget_ms = Some(budget_ms);
        self
    }
}
