//! Catalog validation.
//!
//! Checks the structural integrity of a [`Catalog`] at the point where it
//! is edited. The engine assumes these invariants hold on the snapshots it
//! receives. Detects:
//! - Duplicate ids and duplicate subject codes
//! - Dangling references from offerings and assignments
//! - Duplicate (subject, section) offerings and (offering, faculty) assignments
//! - Workload windows with `min > max`
//! - Faculty assigned to more than [`MAX_SUBJECTS_PER_FACULTY`] subjects
//!
//! # Example
//! ```
//! use u_timetable::models::{Catalog, CourseOffering, Faculty, FacultyAssignment, Section, Subject};
//! use u_timetable::validation::{check_subject_limit, validate_catalog};
//!
//! let catalog = Catalog::new()
//!     .with_faculty(Faculty::new("F1"))
//!     .with_section(Section::new("A"))
//!     .with_subject(Subject::new("S1"))
//!     .with_subject(Subject::new("S2"))
//!     .with_subject(Subject::new("S3"))
//!     .with_offering(CourseOffering::new("O1", "S1", "A"))
//!     .with_offering(CourseOffering::new("O2", "S2", "A"))
//!     .with_assignment(FacultyAssignment::new("O1", "F1"))
//!     .with_assignment(FacultyAssignment::new("O2", "F1"));
//!
//! assert!(validate_catalog(&catalog).is_ok());
//! assert!(check_subject_limit(&catalog, "F1", "S1").is_ok());
//! assert!(check_subject_limit(&catalog, "F1", "S3").is_err());
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

use crate::models::Catalog;

/// Distinct subjects one faculty member may be assigned.
pub const MAX_SUBJECTS_PER_FACULTY: usize = 2;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of one kind share an id.
    DuplicateId,
    /// Two subjects share a code.
    DuplicateSubjectCode,
    /// An offering or assignment points at a missing entity.
    InvalidReference,
    /// The same subject is offered twice to one section.
    DuplicateOffering,
    /// The same faculty member is assigned twice to one offering.
    DuplicateAssignment,
    /// Minimum weekly hours exceed the maximum.
    InvalidWorkload,
    /// A faculty member exceeds [`MAX_SUBJECTS_PER_FACULTY`].
    SubjectLimitExceeded,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a whole catalog.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(catalog: &Catalog) -> ValidationResult {
    let mut errors = Vec::new();

    check_unique(&mut errors, "faculty", catalog.faculty.iter().map(|f| f.id.as_str()));
    check_unique(&mut errors, "classroom", catalog.classrooms.iter().map(|c| c.id.as_str()));
    check_unique(&mut errors, "section", catalog.sections.iter().map(|s| s.id.as_str()));
    check_unique(&mut errors, "subject", catalog.subjects.iter().map(|s| s.id.as_str()));
    check_unique(&mut errors, "offering", catalog.offerings.iter().map(|o| o.id.as_str()));

    let mut codes = FxHashSet::default();
    for s in &catalog.subjects {
        if !codes.insert(s.code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSubjectCode,
                format!("Duplicate subject code: {}", s.code),
            ));
        }
    }

    let faculty: FxHashSet<&str> = catalog.faculty.iter().map(|f| f.id.as_str()).collect();
    let sections: FxHashSet<&str> = catalog.sections.iter().map(|s| s.id.as_str()).collect();
    let subjects: FxHashSet<&str> = catalog.subjects.iter().map(|s| s.id.as_str()).collect();
    let offering_subject: FxHashMap<&str, &str> = catalog
        .offerings
        .iter()
        .map(|o| (o.id.as_str(), o.subject_id.as_str()))
        .collect();

    let mut pairs = FxHashSet::default();
    for o in &catalog.offerings {
        if !subjects.contains(o.subject_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("Offering '{}' references unknown subject '{}'", o.id, o.subject_id),
            ));
        }
        if !sections.contains(o.section_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("Offering '{}' references unknown section '{}'", o.id, o.section_id),
            ));
        }
        if !pairs.insert((o.subject_id.as_str(), o.section_id.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateOffering,
                format!(
                    "Subject '{}' is offered to section '{}' more than once",
                    o.subject_id, o.section_id
                ),
            ));
        }
    }

    let mut assigned = FxHashSet::default();
    for a in &catalog.assignments {
        if !offering_subject.contains_key(a.offering_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("Assignment references unknown offering '{}'", a.offering_id),
            ));
        }
        if !faculty.contains(a.faculty_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("Assignment references unknown faculty '{}'", a.faculty_id),
            ));
        }
        if !assigned.insert((a.offering_id.as_str(), a.faculty_id.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateAssignment,
                format!(
                    "Faculty '{}' is assigned to offering '{}' more than once",
                    a.faculty_id, a.offering_id
                ),
            ));
        }
    }

    for f in &catalog.faculty {
        if let (Some(min), Some(max)) = (f.min_hours_per_week, f.workload().max) {
            if min > max {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidWorkload,
                    format!("Faculty '{}' has min {} > max {} hours per week", f.id, min, max),
                ));
            }
        }

        let taught = subjects_of(catalog, &f.id);
        if taught.len() > MAX_SUBJECTS_PER_FACULTY {
            errors.push(ValidationError::new(
                ValidationErrorKind::SubjectLimitExceeded,
                format!(
                    "Faculty '{}' is assigned {} subjects (max {})",
                    f.id,
                    taught.len(),
                    MAX_SUBJECTS_PER_FACULTY
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts or rejects assigning `faculty_id` to an offering of `subject_id`,
/// given the assignments already in `catalog`.
///
/// A subject the faculty member already teaches is always accepted. Every
/// assignment counts toward the tally, whatever its responsibility.
pub fn check_subject_limit(
    catalog: &Catalog,
    faculty_id: &str,
    subject_id: &str,
) -> Result<(), ValidationError> {
    let taught = subjects_of(catalog, faculty_id);
    if taught.contains(subject_id) || taught.len() < MAX_SUBJECTS_PER_FACULTY {
        return Ok(());
    }
    Err(ValidationError::new(
        ValidationErrorKind::SubjectLimitExceeded,
        format!(
            "Faculty '{}' already has {} subjects",
            faculty_id,
            taught.len()
        ),
    ))
}

/// Distinct subject ids a faculty member is assigned to.
fn subjects_of<'a>(catalog: &'a Catalog, faculty_id: &str) -> BTreeSet<&'a str> {
    catalog
        .assignments
        .iter()
        .filter(|a| a.faculty_id == faculty_id)
        .filter_map(|a| catalog.offering(&a.offering_id))
        .map(|o| o.subject_id.as_str())
        .collect()
}

fn check_unique<'a>(
    errors: &mut Vec<ValidationError>,
    entity: &str,
    ids: impl Iterator<Item = &'a str>,
) {
    let mut seen = FxHashSet::default();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {entity} ID: {id}"),
            ));
        }
    }
}
