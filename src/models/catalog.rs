//! Catalog entities and the read-only catalog snapshot.
//!
//! The catalog is owned by the administrative layer (data entry, storage).
//! The engine only ever reads a [`Catalog`] snapshot taken at the start of a
//! solve, through the [`CatalogSource`] trait.
//!
//! # Trust boundary
//! Shape invariants such as "at most 2 distinct subjects per faculty" or
//! "one offering per (subject, section)" are checked by the catalog layer at
//! mutation time (see [`crate::validation`]). The engine does not re-check
//! them; given an invalid catalog it still produces a timetable that is
//! structurally valid for the requirements it derived.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use super::Faculty;
use crate::error::StoreError;

/// A physical room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique classroom identifier.
    pub id: String,
    /// Display name (e.g. "Room 101", "Lab A").
    pub name: String,
    /// Seating capacity (informational; not used for fitting).
    pub capacity: u32,
}

/// A cohort of students sharing one weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: String,
    /// Display name (e.g. "Section A").
    pub name: String,
}

/// A subject of study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Unique subject code (e.g. "CS101").
    pub code: String,
    /// Display name.
    pub name: String,
}

/// One subject taught to one section, with its weekly hour load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOffering {
    /// Unique offering identifier.
    pub id: String,
    pub subject_id: String,
    pub section_id: String,
    /// Theory sessions per week.
    pub theory_hours: u32,
    /// Tutorial sessions per week.
    pub tutorial_hours: u32,
}

/// Links a faculty member to a course offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyAssignment {
    pub offering_id: String,
    pub faculty_id: String,
    /// Which session kinds of the offering this faculty member teaches.
    pub responsibility: Responsibility,
}

/// Class format of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Theory,
    Tutorial,
}

impl SessionKind {
    /// Both kinds, theory first.
    pub const ALL: [SessionKind; 2] = [SessionKind::Theory, SessionKind::Tutorial];

    pub fn label(&self) -> &'static str {
        match self {
            SessionKind::Theory => "THEORY",
            SessionKind::Tutorial => "TUTORIAL",
        }
    }
}

/// Responsibility scope of a faculty assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Responsibility {
    /// Theory and tutorial sessions.
    #[default]
    All,
    TheoryOnly,
    TutorialOnly,
}

impl Responsibility {
    /// Whether this scope covers sessions of `kind`.
    pub fn covers(&self, kind: SessionKind) -> bool {
        matches!(
            (self, kind),
            (Responsibility::All, _)
                | (Responsibility::TheoryOnly, SessionKind::Theory)
                | (Responsibility::TutorialOnly, SessionKind::Tutorial)
        )
    }
}

impl Classroom {
    /// Creates a classroom with the default capacity of 30.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity: 30,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Name for display, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

impl Section {
    /// Creates a section; the name defaults to the id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Subject {
    /// Creates a subject; the code defaults to the id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            code: id.clone(),
            name: String::new(),
            id,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl CourseOffering {
    /// Creates an offering with the catalog defaults (3 theory + 1 tutorial).
    pub fn new(
        id: impl Into<String>,
        subject_id: impl Into<String>,
        section_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject_id: subject_id.into(),
            section_id: section_id.into(),
            theory_hours: 3,
            tutorial_hours: 1,
        }
    }

    /// Sets both weekly hour counts.
    pub fn with_hours(mut self, theory: u32, tutorial: u32) -> Self {
        self.theory_hours = theory;
        self.tutorial_hours = tutorial;
        self
    }

    /// Required sessions of `kind` per week.
    pub fn hours(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Theory => self.theory_hours,
            SessionKind::Tutorial => self.tutorial_hours,
        }
    }
}

impl FacultyAssignment {
    /// Creates an assignment covering all session kinds.
    pub fn new(offering_id: impl Into<String>, faculty_id: impl Into<String>) -> Self {
        Self {
            offering_id: offering_id.into(),
            faculty_id: faculty_id.into(),
            responsibility: Responsibility::All,
        }
    }

    pub fn with_responsibility(mut self, responsibility: Responsibility) -> Self {
        self.responsibility = responsibility;
        self
    }
}

/// Consistent, read-only view of all catalog entities.
///
/// Collections keep the order the catalog layer returned them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub faculty: Vec<Faculty>,
    pub classrooms: Vec<Classroom>,
    pub sections: Vec<Section>,
    pub subjects: Vec<Subject>,
    pub offerings: Vec<CourseOffering>,
    pub assignments: Vec<FacultyAssignment>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty.push(faculty);
        self
    }

    pub fn with_classroom(mut self, classroom: Classroom) -> Self {
        self.classrooms.push(classroom);
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    pub fn with_offering(mut self, offering: CourseOffering) -> Self {
        self.offerings.push(offering);
        self
    }

    pub fn with_assignment(mut self, assignment: FacultyAssignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn faculty_member(&self, id: &str) -> Option<&Faculty> {
        self.faculty.iter().find(|f| f.id == id)
    }

    pub fn classroom(&self, id: &str) -> Option<&Classroom> {
        self.classrooms.iter().find(|c| c.id == id)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn offering(&self, id: &str) -> Option<&CourseOffering> {
        self.offerings.iter().find(|o| o.id == id)
    }

    /// Assignments attached to an offering.
    pub fn assignments_for_offering(&self, offering_id: &str) -> Vec<&FacultyAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.offering_id == offering_id)
            .collect()
    }

    /// Total weekly sessions requested across all offerings.
    pub fn total_required_hours(&self) -> u32 {
        self.offerings
            .iter()
            .map(|o| o.theory_hours + o.tutorial_hours)
            .sum()
    }
}

/// Read interface onto the catalog.
///
/// Each call must return one internally consistent snapshot.
pub trait CatalogSource {
    fn snapshot(&self) -> Result<Catalog, StoreError>;
}

impl CatalogSource for Catalog {
    fn snapshot(&self) -> Result<Catalog, StoreError> {
        Ok(self.clone())
    }
}

impl CatalogSource for RwLock<Catalog> {
    fn snapshot(&self) -> Result<Catalog, StoreError> {
        let guard = self.read().map_err(|_| StoreError::Poisoned("catalog"))?;
        Ok(guard.clone())
    }
}

impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    fn snapshot(&self) -> Result<Catalog, StoreError> {
        (**self).snapshot()
    }
}
