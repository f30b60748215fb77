//! Per-section timetable view.
//!
//! Lays one section's rows out as a day × slot grid, with break slots
//! inline, ready for rendering.

use chrono::NaiveTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Catalog, PeriodTable, ScheduledClass, SlotKind};

const DAY_NAMES: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Cell {
    Class {
        /// "CODE: Name".
        subject: String,
        /// "Name (Title)".
        faculty: String,
        classroom: String,
        start: NaiveTime,
        end: NaiveTime,
    },
    Empty,
    Break {
        label: String,
        start: NaiveTime,
        end: NaiveTime,
    },
}

/// One day of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRow {
    /// 1-based day.
    pub day: u32,
    pub day_name: String,
    /// One cell per entry of [`SectionTimetable::headers`].
    pub cells: Vec<Cell>,
}

/// Sessions one faculty member teaches in a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacultyLoad {
    /// Display name, or the raw id when unknown.
    pub name: String,
    pub sessions: u32,
}

/// A section's week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionTimetable {
    pub section_id: String,
    /// "Period 1 (10:00 - 10:50)", "Lunch Break (13:20 - 14:20)", ...
    pub headers: Vec<String>,
    pub rows: Vec<DayRow>,
    /// Sessions in this view per faculty id.
    pub faculty_hours: BTreeMap<String, FacultyLoad>,
}

/// Display name of a day (1-based).
pub fn day_name(day: u32) -> String {
    day.checked_sub(1)
        .and_then(|i| DAY_NAMES.get(i as usize))
        .map_or_else(|| format!("Day {day}"), |name| (*name).to_string())
}

impl SectionTimetable {
    /// Builds the grid for `section_id` from `classes`.
    ///
    /// Rows of other sections and rows outside the `days` × `periods` grid
    /// are ignored. Ids missing from `catalog` are shown raw.
    pub fn build(
        catalog: &Catalog,
        classes: &[ScheduledClass],
        section_id: &str,
        periods: &PeriodTable,
        days: u32,
    ) -> Self {
        let mut placed: BTreeMap<(u32, u32), &ScheduledClass> = BTreeMap::new();
        let mut faculty_hours = BTreeMap::new();

        for class in classes.iter().filter(|c| c.section_id == section_id) {
            if !(1..=days).contains(&class.day) || periods.period(class.period).is_none() {
                continue;
            }
            placed.insert(class.slot(), class);
            faculty_hours
                .entry(class.faculty_id.clone())
                .or_insert_with(|| FacultyLoad {
                    name: catalog
                        .faculty_member(&class.faculty_id)
                        .map_or(class.faculty_id.as_str(), |f| f.display_name())
                        .to_string(),
                    sessions: 0,
                })
                .sessions += 1;
        }

        let rows = (1..=days)
            .map(|day| DayRow {
                day,
                day_name: day_name(day),
                cells: periods
                    .slots()
                    .iter()
                    .map(|slot| match &slot.kind {
                        SlotKind::Period { index } => match placed.get(&(day, *index)) {
                            Some(class) => class_cell(catalog, class, slot.start, slot.end),
                            None => Cell::Empty,
                        },
                        SlotKind::Break { label } => Cell::Break {
                            label: label.clone(),
                            start: slot.start,
                            end: slot.end,
                        },
                    })
                    .collect(),
            })
            .collect();

        Self {
            section_id: section_id.to_string(),
            headers: periods.slots().iter().map(|s| s.header()).collect(),
            rows,
            faculty_hours,
        }
    }

    /// Cell at 1-based `day` and slot position.
    pub fn cell(&self, day: u32, slot: usize) -> Option<&Cell> {
        self.rows
            .iter()
            .find(|r| r.day == day)
            .and_then(|r| r.cells.get(slot))
    }

    /// Number of class cells.
    pub fn class_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .filter(|c| matches!(c, Cell::Class { .. }))
            .count()
    }
}

fn class_cell(catalog: &Catalog, class: &ScheduledClass, start: NaiveTime, end: NaiveTime) -> Cell {
    let subject = catalog
        .subject(&class.subject_id)
        .map_or_else(|| class.subject_id.clone(), |s| format!("{}: {}", s.code, s.name));
    let faculty = catalog.faculty_member(&class.faculty_id).map_or_else(
        || class.faculty_id.clone(),
        |f| format!("{} ({})", f.display_name(), f.role.title()),
    );
    let classroom = catalog
        .classroom(&class.classroom_id)
        .map_or_else(|| class.classroom_id.clone(), |r| r.display_name().to_string());
    Cell::Class {
        subject,
        faculty,
        classroom,
        start: class.start_time.unwrap_or(start),
        end: class.end_time.unwrap_or(end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeriodTimeConfig;
    use crate::models::{Classroom, Faculty, Role, Section, SessionKind, Subject};

    fn catalog() -> Catalog {
        Catalog::new()
            .with_faculty(Faculty::new("F1").with_name("Ada").with_role(Role::Professor))
            .with_classroom(Classroom::new("R1").with_name("Room 101"))
            .with_section(Section::new("A"))
            .with_subject(Subject::new("S1").with_code("CS101").with_name("Programming"))
    }

    fn sessions_of(view: &SectionTimetable, faculty_id: &str) -> Option<u32> {
        view.faculty_hours.get(faculty_id).map(|load| load.sessions)
    }

    fn row(day: u32, period: u32, section: &str) -> ScheduledClass {
        ScheduledClass::new(day, period, "F1", "S1", section, "R1", SessionKind::Theory)
    }

    #[test]
    fn test_grid_with_lunch_break() {
        let periods =
            PeriodTable::generate(&PeriodTimeConfig::default().with_break(4, 60), 8).unwrap();
        let classes = vec![row(1, 1, "A"), row(1, 5, "A"), row(2, 1, "B")];
        let view = SectionTimetable::build(&catalog(), &classes, "A", &periods, 6);

        assert_eq!(view.headers.len(), 9);
        assert_eq!(view.headers[0], "Period 1 (10:00 - 10:50)");
        assert_eq!(view.headers[4], "Lunch Break (13:20 - 14:20)");
        assert_eq!(view.rows.len(), 6);
        assert_eq!(view.rows[0].day_name, "Monday");
        assert_eq!(view.rows[5].day_name, "Saturday");

        match view.cell(1, 0) {
            Some(Cell::Class {
                subject,
                faculty,
                classroom,
                start,
                ..
            }) => {
                assert_eq!(subject, "CS101: Programming");
                assert_eq!(faculty, "Ada (Professor)");
                assert_eq!(classroom, "Room 101");
                assert_eq!(*start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
            }
            other => panic!("expected class cell, got {other:?}"),
        }
        assert!(matches!(view.cell(1, 4), Some(Cell::Break { .. })));
        // Period 5 sits after the break slot.
        match view.cell(1, 5) {
            Some(Cell::Class { start, .. }) => {
                assert_eq!(*start, NaiveTime::from_hms_opt(14, 20, 0).unwrap())
            }
            other => panic!("expected class cell, got {other:?}"),
        }
        assert_eq!(view.cell(2, 0), Some(&Cell::Empty));

        assert_eq!(view.class_count(), 2);
        assert_eq!(sessions_of(&view, "F1"), Some(2));
        assert_eq!(view.faculty_hours["F1"].name, "Ada");
    }

    #[test]
    fn test_out_of_grid_rows_ignored() {
        let periods = PeriodTable::generate(&PeriodTimeConfig::default(), 4).unwrap();
        let classes = vec![row(7, 1, "A"), row(1, 9, "A"), row(0, 1, "A"), row(3, 2, "A")];
        let view = SectionTimetable::build(&catalog(), &classes, "A", &periods, 6);
        assert_eq!(view.class_count(), 1);
        assert_eq!(sessions_of(&view, "F1"), Some(1));
    }

    #[test]
    fn test_namesakes_counted_apart() {
        let catalog = catalog().with_faculty(Faculty::new("F2").with_name("Ada"));
        let periods = PeriodTable::generate(&PeriodTimeConfig::default(), 4).unwrap();
        let classes = vec![
            row(1, 1, "A"),
            row(1, 2, "A"),
            ScheduledClass::new(2, 1, "F2", "S1", "A", "R1", SessionKind::Tutorial),
        ];
        let view = SectionTimetable::build(&catalog, &classes, "A", &periods, 6);
        assert_eq!(view.faculty_hours.len(), 2);
        assert_eq!(sessions_of(&view, "F1"), Some(2));
        assert_eq!(sessions_of(&view, "F2"), Some(1));
        assert!(view.faculty_hours.values().all(|load| load.name == "Ada"));
    }

    #[test]
    fn test_day_names() {
        assert_eq!(day_name(1), "Monday");
        assert_eq!(day_name(6), "Saturday");
        assert_eq!(day_name(7), "Day 7");
        assert_eq!(day_name(0), "Day 0");
    }

    #[test]
    fn test_unknown_ids_shown_raw() {
        let periods = PeriodTable::generate(&PeriodTimeConfig::default(), 2).unwrap();
        let classes = vec![ScheduledClass::new(1, 1, "FX", "SX", "A", "RX", SessionKind::Tutorial)];
        let view = SectionTimetable::build(&Catalog::new(), &classes, "A", &periods, 1);
        match view.cell(1, 0) {
            Some(Cell::Class {
                subject,
                faculty,
                classroom,
                ..
            }) => {
                assert_eq!((subject.as_str(), faculty.as_str(), classroom.as_str()), ("SX", "FX", "RX"));
            }
            other => panic!("expected class cell, got {other:?}"),
        }
        assert_eq!(view.faculty_hours["FX"].name, "FX");
        assert_eq!(sessions_of(&view, "FX"), Some(1));
    }
}
