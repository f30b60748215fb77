//! Timetable engine, materialization, and section views.
//!
//! # Pipeline
//!
//! `CatalogSource::snapshot` → [`plan`] (requirements → variables →
//! constraints → search → rows) → `ScheduleStore::replace_all`.
//!
//! [`TimetableEngine`] owns the collaborators and reports a
//! [`SolveResult`]; [`plan`] is the same pipeline without I/O.
//! [`SectionTimetable`] renders stored rows for one section.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

mod engine;
mod materialize;
mod view;

pub use engine::{plan, Plan, SolveResult, SolveStats, TimetableEngine};
pub use materialize::materialize;
pub use view::{day_name, Cell, DayRow, FacultyLoad, SectionTimetable};
