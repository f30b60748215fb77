//! Decision variable space.
//!
//! One boolean variable `x[r, day, period, room]` per requirement and grid
//! cell: "one session of `r` is taught in `room` at (`day`, `period`)".
//! The space is the full cross-product; legality lives in the constraints.
//!
//! Variables are dense integers laid out as
//! `((r · days + day) · periods + period) · rooms + room`, so enumeration
//! order is (requirement, day, period, room) and every lookup is arithmetic.

use std::ops::Range;

use super::requirements::{RequirementId, RequirementSet};
use crate::config::GridConfig;
use crate::models::Classroom;

/// Dense variable index.
pub type VarId = usize;

/// Decoded coordinates of a variable. Day and period are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarKey {
    pub requirement: RequirementId,
    pub day: u32,
    pub period: u32,
    /// Index into [`VariableSpace::room_ids`].
    pub room: usize,
}

/// Shape of the variable matrix.
#[derive(Debug, Clone)]
pub struct VariableSpace {
    requirements: usize,
    days: u32,
    periods: u32,
    room_ids: Vec<String>,
}

impl VariableSpace {
    /// Builds the space for the given requirements, grid, and rooms.
    ///
    /// Rooms are ordered by id.
    pub fn build(requirements: &RequirementSet, grid: &GridConfig, classrooms: &[Classroom]) -> Self {
        let mut room_ids: Vec<String> = classrooms.iter().map(|c| c.id.clone()).collect();
        room_ids.sort();
        room_ids.dedup();
        Self {
            requirements: requirements.len(),
            days: grid.days,
            periods: grid.periods_per_day,
            room_ids,
        }
    }

    /// Total number of variables.
    pub fn len(&self) -> usize {
        self.requirements * self.vars_per_requirement()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn room_count(&self) -> usize {
        self.room_ids.len()
    }

    pub fn room_ids(&self) -> &[String] {
        &self.room_ids
    }

    /// Number of (day, period) slots.
    pub fn slot_count(&self) -> usize {
        self.days as usize * self.periods as usize
    }

    /// Variables owned by one requirement.
    pub fn vars_per_requirement(&self) -> usize {
        self.slot_count() * self.room_ids.len()
    }

    /// 0-based slot index of a 1-based (day, period).
    #[inline]
    pub fn slot_index(&self, day: u32, period: u32) -> usize {
        (day as usize - 1) * self.periods as usize + (period as usize - 1)
    }

    /// Variable for 1-based (day, period).
    #[inline]
    pub fn var(&self, requirement: RequirementId, day: u32, period: u32, room: usize) -> VarId {
        (requirement * self.slot_count() + self.slot_index(day, period)) * self.room_ids.len() + room
    }

    /// Inverse of [`VariableSpace::var`].
    pub fn decode(&self, var: VarId) -> VarKey {
        let rooms = self.room_ids.len();
        let room = var % rooms;
        let cell = var / rooms;
        let slot = cell % self.slot_count();
        let requirement = cell / self.slot_count();
        VarKey {
            requirement,
            day: (slot / self.periods as usize) as u32 + 1,
            period: (slot % self.periods as usize) as u32 + 1,
            room,
        }
    }

    /// All variables of one requirement, in enumeration order.
    pub fn requirement_vars(&self, requirement: RequirementId) -> Range<VarId> {
        let per = self.vars_per_requirement();
        requirement * per..(requirement + 1) * per
    }

    /// Variables of one requirement at one slot (one per room).
    pub fn slot_vars(&self, requirement: RequirementId, day: u32, period: u32) -> Range<VarId> {
        let first = self.var(requirement, day, period, 0);
        first..first + self.room_ids.len()
    }

    /// Every 1-based (day, period), day-major.
    pub fn slots(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (1..=self.days).flat_map(move |d| (1..=self.periods).map(move |p| (d, p)))
    }
}
