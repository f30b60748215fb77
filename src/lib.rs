//! Weekly university timetabling as constraint satisfaction.
//!
//! Turns a catalog of course offerings, faculty assignments, sections, and
//! classrooms into a conflict-free week of class sessions, or proves that
//! none exists.
//!
//! # Modules
//!
//! - **`models`**: Catalog entities (`Faculty`, `Classroom`, `Section`,
//!   `Subject`, `CourseOffering`, `FacultyAssignment`), the period-time table,
//!   and the produced `Timetable`
//! - **`config`**: `SolveConfig` (grid, period times, time budget)
//! - **`cp`**: Requirement extraction, variable space, constraint compiler,
//!   and backtracking search
//! - **`scheduler`**: `plan`, `TimetableEngine`, and per-section views
//! - **`store`**: `ScheduleStore` and an in-memory implementation
//! - **`validation`**: Catalog integrity checks for the editing layer
//!
//! # Example
//!
//! ```
//! use u_timetable::config::SolveConfig;
//! use u_timetable::models::{Catalog, Classroom, CourseOffering, Faculty, FacultyAssignment, Section, Subject};
//! use u_timetable::scheduler::{SolveResult, TimetableEngine};
//! use u_timetable::store::{InMemoryScheduleStore, ScheduleStore};
//!
//! let catalog = Catalog::new()
//!     .with_faculty(Faculty::new("F1").with_name("Ada").with_hours(0, 20))
//!     .with_classroom(Classroom::new("R1"))
//!     .with_section(Section::new("A"))
//!     .with_subject(Subject::new("CS101").with_name("Programming"))
//!     .with_offering(CourseOffering::new("O1", "CS101", "A"))
//!     .with_assignment(FacultyAssignment::new("O1", "F1"));
//!
//! let engine = TimetableEngine::new(catalog, InMemoryScheduleStore::new());
//! let result = engine.solve(&SolveConfig::default()).unwrap();
//! assert_eq!(result, SolveResult::Scheduled(4));
//! assert!(engine.store().all().unwrap().is_conflict_free());
//! ```
//!
//! # Logging
//!
//! Emits `tracing` events and installs no subscriber.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

pub mod config;
pub mod cp;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod validation;

pub use config::SolveConfig;
pub use error::{ConfigError, InfeasibleReason, SchedulerError, SolveError, StoreError};
pub use scheduler::{plan, SolveResult, TimetableEngine};
