//! Timetabling domain models.
//!
//! Catalog entities (faculty, classrooms, sections, subjects, offerings,
//! faculty assignments) describe what must be taught. The timetable types
//! describe the produced week.
//!
//! # Mapping onto generic scheduling
//!
//! | u-timetable | Generic scheduling |
//! |-------------|--------------------|
//! | CourseOffering × SessionKind | Task |
//! | Faculty / Classroom / Section | Resource |
//! | (day, period) | Time slot |
//! | Timetable | Schedule |

mod catalog;
mod faculty;
mod periods;
mod timetable;

pub use catalog::{
    Catalog, CatalogSource, Classroom, CourseOffering, FacultyAssignment, Responsibility,
    Section, SessionKind, Subject,
};
pub use faculty::{Faculty, Role, WorkloadBounds};
pub use periods::{DaySlot, PeriodTable, SlotKind};
pub use timetable::{Conflict, ConflictKind, ScheduledClass, Timetable};
