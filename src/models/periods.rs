//! Period-time table.
//!
//! Maps period indices to wall-clock intervals. Periods run back to back
//! from a start time with a fixed duration; a break keyed by period `i` is
//! inserted after period `i` and pushes every later period back by its
//! duration. Breaks never occupy a period index.
//!
//! # Example
//! ```
//! use chrono::NaiveTime;
//! use u_timetable::config::PeriodTimeConfig;
//! use u_timetable::models::PeriodTable;
//!
//! let config = PeriodTimeConfig::default().with_break(4, 60);
//! let table = PeriodTable::generate(&config, 8).unwrap();
//! let (_, p4_end) = table.period(4).unwrap();
//! let (p5_start, _) = table.period(5).unwrap();
//! assert_eq!(p4_end, NaiveTime::from_hms_opt(13, 20, 0).unwrap());
//! assert_eq!(p5_start, NaiveTime::from_hms_opt(14, 20, 0).unwrap());
//! ```

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::PeriodTimeConfig;
use crate::error::ConfigError;

/// Minimum break length (minutes) for the break after period 4 to be
/// labelled as lunch.
const LUNCH_MIN_MINUTES: u32 = 30;
const LUNCH_AFTER_PERIOD: u32 = 4;

/// One entry of the day layout: a teaching period or a break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlot {
    pub kind: SlotKind,
    /// Start time (inclusive).
    pub start: NaiveTime,
    /// End time (exclusive).
    pub end: NaiveTime,
}

/// What a [`DaySlot`] represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Teaching period with its 1-based index.
    Period { index: u32 },
    /// Break with a display label.
    Break { label: String },
}

impl DaySlot {
    /// Period index, or `None` for breaks.
    pub fn period_index(&self) -> Option<u32> {
        match self.kind {
            SlotKind::Period { index } => Some(index),
            SlotKind::Break { .. } => None,
        }
    }

    /// Display label ("Period 3", "Lunch Break", ...).
    pub fn label(&self) -> String {
        match &self.kind {
            SlotKind::Period { index } => format!("Period {index}"),
            SlotKind::Break { label } => label.clone(),
        }
    }

    /// Header text: "Period 1 (10:00 - 10:50)".
    pub fn header(&self) -> String {
        format!(
            "{} ({} - {})",
            self.label(),
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }

    /// Duration in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Ordered day layout of periods and breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTable {
    slots: Vec<DaySlot>,
    periods: u32,
}

impl PeriodTable {
    /// Generates the table for `periods` periods per day.
    ///
    /// # Errors
    /// - `periods == 0` or a zero period duration
    /// - a break keyed outside `1..=periods`
    /// - the layout running past midnight
    pub fn generate(config: &PeriodTimeConfig, periods: u32) -> Result<Self, ConfigError> {
        if periods == 0 {
            return Err(ConfigError::InvalidGrid {
                field: "periods_per_day",
                value: 0,
            });
        }
        if config.period_minutes == 0 {
            return Err(ConfigError::InvalidGrid {
                field: "period_minutes",
                value: 0,
            });
        }
        if let Some(&after) = config.breaks.keys().find(|&&p| p == 0 || p > periods) {
            return Err(ConfigError::BreakOutOfRange { after, periods });
        }

        let mut slots = Vec::with_capacity(periods as usize + config.breaks.len());
        let mut cursor = config.start;

        for index in 1..=periods {
            let end = advance(cursor, config.period_minutes)?;
            slots.push(DaySlot {
                kind: SlotKind::Period { index },
                start: cursor,
                end,
            });
            cursor = end;

            if let Some(&minutes) = config.breaks.get(&index) {
                let end = advance(cursor, minutes)?;
                slots.push(DaySlot {
                    kind: SlotKind::Break {
                        label: break_label(index, minutes),
                    },
                    start: cursor,
                    end,
                });
                cursor = end;
            }
        }

        Ok(Self { slots, periods })
    }

    /// `(start, end)` of a period (1-based).
    pub fn period(&self, index: u32) -> Option<(NaiveTime, NaiveTime)> {
        self.slots
            .iter()
            .find(|s| s.period_index() == Some(index))
            .map(|s| (s.start, s.end))
    }

    /// All slots, periods and breaks, in day order.
    pub fn slots(&self) -> &[DaySlot] {
        &self.slots
    }

    /// Only the teaching periods, in order.
    pub fn periods(&self) -> impl Iterator<Item = &DaySlot> {
        self.slots.iter().filter(|s| s.period_index().is_some())
    }

    /// Number of teaching periods.
    pub fn period_count(&self) -> u32 {
        self.periods
    }

    /// End of the last slot of the day.
    pub fn day_end(&self) -> Option<NaiveTime> {
        self.slots.last().map(|s| s.end)
    }
}

fn advance(from: NaiveTime, minutes: u32) -> Result<NaiveTime, ConfigError> {
    let (next, wrapped_secs) = from.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    if wrapped_secs != 0 {
        return Err(ConfigError::PastMidnight);
    }
    Ok(next)
}

fn break_label(after: u32, minutes: u32) -> String {
    if after == LUNCH_AFTER_PERIOD && minutes >= LUNCH_MIN_MINUTES {
        "Lunch Break".to_string()
    } else {
        format!("Break after {after}")
    }
}
