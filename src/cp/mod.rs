//! Constraint-programming formulation of weekly timetabling.
//!
//! The pipeline from catalog to solution:
//!
//! 1. [`extract_requirements`]: offerings × session kinds → [`RequirementSet`]
//! 2. [`VariableSpace::build`]: one boolean per (requirement, day, period, room)
//! 3. [`CpModel::compile`]: coverage, double-booking, and workload constraints
//! 4. [`Solver::solve`]: propagation + MRV backtracking → [`SearchReport`]
//!
//! Everything here is pure: no I/O, no shared state. The
//! [`scheduler`](crate::scheduler) module wires it to catalog sources and
//! schedule stores.
//!
//! # Example
//! ```
//! use u_timetable::config::GridConfig;
//! use u_timetable::cp::{extract_requirements, CpModel, SearchConfig, SearchOutcome, Solver, VariableSpace};
//! use u_timetable::models::{Catalog, Classroom, CourseOffering, Faculty, FacultyAssignment, Section, Subject};
//!
//! let catalog = Catalog::new()
//!     .with_faculty(Faculty::new("F1"))
//!     .with_classroom(Classroom::new("R1"))
//!     .with_section(Section::new("A"))
//!     .with_subject(Subject::new("CS101"))
//!     .with_offering(CourseOffering::new("O1", "CS101", "A").with_hours(3, 1))
//!     .with_assignment(FacultyAssignment::new("O1", "F1"));
//!
//! let reqs = extract_requirements(&catalog).unwrap();
//! let space = VariableSpace::build(&reqs, &GridConfig::default(), &catalog.classrooms);
//! let model = CpModel::compile(&reqs, &space);
//! let report = Solver::new(&model, &reqs, &space, SearchConfig::default()).solve();
//!
//! match report.outcome {
//!     SearchOutcome::Solved(assignment) => assert_eq!(assignment.true_vars.len(), 4),
//!     SearchOutcome::Infeasible(reason) => panic!("{reason}"),
//! }
//! ```
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

mod constraints;
mod requirements;
mod search;
mod variables;

pub use constraints::{ConstraintId, CpModel, LinearConstraint, ModelStats, ResourceGroup, Scope};
pub use requirements::{extract_requirements, Requirement, RequirementId, RequirementSet};
pub use search::{Assignment, SearchConfig, SearchOutcome, SearchReport, SearchStats, Solver};
pub use variables::{VarId, VarKey, VariableSpace};
