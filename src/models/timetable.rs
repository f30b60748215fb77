//! Timetable (solution) model.
//!
//! A timetable is the full set of scheduled class sessions for one week.
//! Rows are produced by the engine and owned by the schedule store; every
//! successful solve replaces the whole set.

use chrono::NaiveTime;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::SessionKind;

/// One scheduled class session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledClass {
    /// Day of week (1-based).
    pub day: u32,
    /// Period of day (1-based).
    pub period: u32,
    pub faculty_id: String,
    pub subject_id: String,
    pub section_id: String,
    pub classroom_id: String,
    pub kind: SessionKind,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Resource two rows collide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    Classroom,
    Section,
    Faculty,
}

/// Two rows sharing a (day, period) and a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub day: u32,
    pub period: u32,
    /// The shared resource id.
    pub resource_id: String,
    /// Indices of the two colliding rows.
    pub rows: (usize, usize),
}

/// A week of scheduled classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub classes: Vec<ScheduledClass>,
}

impl ScheduledClass {
    /// Creates a row without clock times.
    pub fn new(
        day: u32,
        period: u32,
        faculty_id: impl Into<String>,
        subject_id: impl Into<String>,
        section_id: impl Into<String>,
        classroom_id: impl Into<String>,
        kind: SessionKind,
    ) -> Self {
        Self {
            day,
            period,
            faculty_id: faculty_id.into(),
            subject_id: subject_id.into(),
            section_id: section_id.into(),
            classroom_id: classroom_id.into(),
            kind,
            start_time: None,
            end_time: None,
        }
    }

    /// Sets clock times.
    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// (day, period) slot key.
    #[inline]
    pub fn slot(&self) -> (u32, u32) {
        (self.day, self.period)
    }
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_classes(classes: Vec<ScheduledClass>) -> Self {
        Self { classes }
    }

    pub fn add_class(&mut self, class: ScheduledClass) {
        self.classes.push(class);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Sorts rows by (day, period, section).
    pub fn sort(&mut self) {
        self.classes.sort_by(|a, b| {
            (a.day, a.period, &a.section_id).cmp(&(b.day, b.period, &b.section_id))
        });
    }

    /// Rows for one section.
    pub fn for_section(&self, section_id: &str) -> Vec<&ScheduledClass> {
        self.classes
            .iter()
            .filter(|c| c.section_id == section_id)
            .collect()
    }

    /// Rows for one faculty member.
    pub fn for_faculty(&self, faculty_id: &str) -> Vec<&ScheduledClass> {
        self.classes
            .iter()
            .filter(|c| c.faculty_id == faculty_id)
            .collect()
    }

    /// Sessions per faculty member, ordered by faculty id.
    pub fn faculty_hours(&self) -> BTreeMap<String, u32> {
        let mut hours = BTreeMap::new();
        for c in &self.classes {
            *hours.entry(c.faculty_id.clone()).or_insert(0) += 1;
        }
        hours
    }

    /// Rows matching one (subject, section, kind) requirement.
    pub fn count_matching(&self, subject_id: &str, section_id: &str, kind: SessionKind) -> usize {
        self.classes
            .iter()
            .filter(|c| c.subject_id == subject_id && c.section_id == section_id && c.kind == kind)
            .count()
    }

    /// Finds every pair of rows that double-books a classroom, section, or
    /// faculty member. Empty for a valid timetable.
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for kind in [
            ConflictKind::Classroom,
            ConflictKind::Section,
            ConflictKind::Faculty,
        ] {
            let mut seen: FxHashMap<(u32, u32, &str), usize> = FxHashMap::default();
            for (i, c) in self.classes.iter().enumerate() {
                let resource = match kind {
                    ConflictKind::Classroom => c.classroom_id.as_str(),
                    ConflictKind::Section => c.section_id.as_str(),
                    ConflictKind::Faculty => c.faculty_id.as_str(),
                };
                if let Some(&first) = seen.get(&(c.day, c.period, resource)) {
                    conflicts.push(Conflict {
                        kind,
                        day: c.day,
                        period: c.period,
                        resource_id: resource.to_string(),
                        rows: (first, i),
                    });
                } else {
                    seen.insert((c.day, c.period, resource), i);
                }
            }
        }
        conflicts
    }

    /// Whether no resource is double-booked.
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: u32, period: u32, fac: &str, sec: &str, room: &str) -> ScheduledClass {
        ScheduledClass::new(day, period, fac, "S1", sec, room, SessionKind::Theory)
    }

    #[test]
    fn test_conflict_free() {
        let t = Timetable::from_classes(vec![
            row(1, 1, "F1", "A", "R1"),
            row(1, 2, "F1", "A", "R1"),
            row(1, 1, "F2", "B", "R2"),
        ]);
        assert!(t.is_conflict_free());
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_detects_each_conflict_kind() {
        let t = Timetable::from_classes(vec![
            row(1, 1, "F1", "A", "R1"),
            row(1, 1, "F2", "B", "R1"), // room clash with row 0
            row(2, 1, "F1", "A", "R1"),
            row(2, 1, "F3", "A", "R2"), // section clash with row 2
            row(3, 1, "F1", "A", "R1"),
            row(3, 1, "F1", "C", "R3"), // faculty clash with row 4
        ]);
        let conflicts = t.conflicts();
        assert_eq!(conflicts.len(), 3);

        assert_eq!(conflicts[0].kind, ConflictKind::Classroom);
        assert_eq!(conflicts[0].rows, (0, 1));
        assert_eq!(conflicts[0].resource_id, "R1");

        assert_eq!(conflicts[1].kind, ConflictKind::Section);
        assert_eq!(conflicts[1].rows, (2, 3));

        assert_eq!(conflicts[2].kind, ConflictKind::Faculty);
        assert_eq!((conflicts[2].day, conflicts[2].period), (3, 1));
    }

    #[test]
    fn test_sort_and_queries() {
        let mut t = Timetable::from_classes(vec![
            row(2, 1, "F1", "B", "R1"),
            row(1, 3, "F2", "A", "R1"),
            row(1, 3, "F1", "B", "R2"),
        ]);
        t.sort();
        assert_eq!(t.classes[0].slot(), (1, 3));
        assert_eq!(t.classes[0].section_id, "A");
        assert_eq!(t.classes[2].slot(), (2, 1));

        assert_eq!(t.for_section("B").len(), 2);
        assert_eq!(t.for_faculty("F2").len(), 1);
        assert_eq!(t.count_matching("S1", "B", SessionKind::Theory), 2);
        assert_eq!(t.count_matching("S1", "B", SessionKind::Tutorial), 0);

        let hours = t.faculty_hours();
        assert_eq!(hours.get("F1"), Some(&2));
        assert_eq!(hours.get("F2"), Some(&1));
    }

    #[test]
    fn test_empty_timetable() {
        let t = Timetable::new();
        assert!(t.is_empty());
        assert!(t.is_conflict_free());
        assert!(t.faculty_hours().is_empty());
    }
}
