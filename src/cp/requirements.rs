//! Requirement extraction.
//!
//! Turns course offerings and faculty assignments into the atomic units the
//! solver places: one [`Requirement`] per (offering, session kind) with a
//! positive hour count.
//!
//! Responsibility must be unambiguous: exactly one assignment of the
//! offering has to cover each required kind. Requirements are ordered by
//! (subject code, section name, kind) so identical catalogs always produce
//! identical requirement ids.

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::models::{Catalog, FacultyAssignment, SessionKind, WorkloadBounds};

/// Arena index of a requirement.
pub type RequirementId = usize;

/// One (offering, kind) pair to be placed `sessions` times per week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub id: RequirementId,
    pub offering_id: String,
    pub subject_id: String,
    pub section_id: String,
    pub faculty_id: String,
    pub kind: SessionKind,
    /// Sessions per week, always > 0.
    pub sessions: u32,
    /// Dense section index into [`RequirementSet::section_ids`].
    pub section: usize,
    /// Dense faculty index into [`RequirementSet::faculty_ids`].
    pub faculty: usize,
    subject_code: String,
    section_name: String,
}

/// Immutable requirement arena plus the dense resource indices it uses.
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    requirements: Vec<Requirement>,
    /// Faculty ids, in catalog order.
    pub faculty_ids: Vec<String>,
    /// Normalized workload window per faculty index.
    pub workloads: Vec<WorkloadBounds>,
    /// Section ids, in catalog order.
    pub section_ids: Vec<String>,
}

impl Requirement {
    /// Short human-readable tag, e.g. `CS101/Section A/THEORY`.
    pub fn tag(&self) -> String {
        format!(
            "{}/{}/{}",
            self.subject_code,
            self.section_name,
            self.kind.label()
        )
    }
}

impl RequirementSet {
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn get(&self, id: RequirementId) -> Option<&Requirement> {
        self.requirements.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.requirements.iter()
    }

    /// Total sessions to place.
    pub fn total_sessions(&self) -> u32 {
        self.requirements.iter().map(|r| r.sessions).sum()
    }

    /// Requirements taught by faculty index `faculty`.
    pub fn for_faculty(&self, faculty: usize) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(move |r| r.faculty == faculty)
    }

    /// Requirements attended by section index `section`.
    pub fn for_section(&self, section: usize) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(move |r| r.section == section)
    }
}

impl std::ops::Index<RequirementId> for RequirementSet {
    type Output = Requirement;

    fn index(&self, id: RequirementId) -> &Requirement {
        &self.requirements[id]
    }
}

/// Derives the requirement arena from a catalog snapshot.
///
/// # Errors
/// - [`ConfigError::MissingResponsibility`] when no assignment covers a
///   required kind
/// - [`ConfigError::AmbiguousResponsibility`] when several do
/// - [`ConfigError::UnknownReference`] when an offering or assignment points
///   at a subject, section, or faculty member absent from the snapshot
pub fn extract_requirements(catalog: &Catalog) -> Result<RequirementSet, ConfigError> {
    let subjects: FxHashMap<&str, &str> = catalog
        .subjects
        .iter()
        .map(|s| (s.id.as_str(), s.code.as_str()))
        .collect();
    let sections: FxHashMap<&str, usize> = catalog
        .sections
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();
    let faculty: FxHashMap<&str, usize> = catalog
        .faculty
        .iter()
        .enumerate()
        .map(|(i, f)| (f.id.as_str(), i))
        .collect();

    let mut by_offering: FxHashMap<&str, Vec<&FacultyAssignment>> = FxHashMap::default();
    for a in &catalog.assignments {
        by_offering.entry(a.offering_id.as_str()).or_default().push(a);
    }

    let mut requirements = Vec::new();

    for offering in &catalog.offerings {
        let unknown = |entity: &'static str, id: &str| ConfigError::UnknownReference {
            offering_id: offering.id.clone(),
            entity,
            id: id.to_string(),
        };

        let assignments = by_offering
            .get(offering.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        for kind in SessionKind::ALL {
            let sessions = offering.hours(kind);
            if sessions == 0 {
                continue;
            }

            let covering: Vec<&FacultyAssignment> = assignments
                .iter()
                .copied()
                .filter(|a| a.responsibility.covers(kind))
                .collect();
            let assignment = match covering.as_slice() {
                [only] => *only,
                [] => {
                    return Err(ConfigError::MissingResponsibility {
                        offering_id: offering.id.clone(),
                        kind: kind.label().to_string(),
                    })
                }
                many => {
                    return Err(ConfigError::AmbiguousResponsibility {
                        offering_id: offering.id.clone(),
                        kind: kind.label().to_string(),
                        count: many.len(),
                    })
                }
            };

            let subject_code = *subjects
                .get(offering.subject_id.as_str())
                .ok_or_else(|| unknown("subject", &offering.subject_id))?;
            let section = *sections
                .get(offering.section_id.as_str())
                .ok_or_else(|| unknown("section", &offering.section_id))?;
            let faculty_idx = *faculty
                .get(assignment.faculty_id.as_str())
                .ok_or_else(|| unknown("faculty", &assignment.faculty_id))?;

            requirements.push(Requirement {
                id: 0,
                offering_id: offering.id.clone(),
                subject_id: offering.subject_id.clone(),
                section_id: offering.section_id.clone(),
                faculty_id: assignment.faculty_id.clone(),
                kind,
                sessions,
                section,
                faculty: faculty_idx,
                subject_code: subject_code.to_string(),
                section_name: catalog.sections[section].name.clone(),
            });
        }
    }

    // Stable: duplicates (invalid catalogs) keep catalog order.
    requirements.sort_by(|a, b| {
        (&a.subject_code, &a.section_name, a.kind).cmp(&(&b.subject_code, &b.section_name, b.kind))
    });
    for (id, r) in requirements.iter_mut().enumerate() {
        r.id = id;
    }

    Ok(RequirementSet {
        requirements,
        faculty_ids: catalog.faculty.iter().map(|f| f.id.clone()).collect(),
        workloads: catalog.faculty.iter().map(|f| f.workload()).collect(),
        section_ids: catalog.sections.iter().map(|s| s.id.clone()).collect(),
    })
}
