//! Solution → timetable rows.

use crate::cp::{Assignment, RequirementSet, VariableSpace};
use crate::models::{PeriodTable, ScheduledClass, Timetable};

/// Converts every true variable into a [`ScheduledClass`] stamped with its
/// period's clock times. Rows come back ordered by (day, period, section).
pub fn materialize(
    assignment: &Assignment,
    requirements: &RequirementSet,
    space: &VariableSpace,
    periods: &PeriodTable,
) -> Timetable {
    let mut timetable = Timetable::new();
    for &var in &assignment.true_vars {
        let key = space.decode(var);
        let requirement = &requirements[key.requirement];
        let room = &space.room_ids()[key.room];

        let mut class = ScheduledClass::new(
            key.day,
            key.period,
            requirement.faculty_id.as_str(),
            requirement.subject_id.as_str(),
            requirement.section_id.as_str(),
            room.as_str(),
            requirement.kind,
        );
        if let Some((start, end)) = periods.period(key.period) {
            class = class.with_times(start, end);
        }
        timetable.add_class(class);
    }
    timetable.sort();
    timetable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, PeriodTimeConfig};
    use crate::cp::extract_requirements;
    use crate::models::{
        Catalog, Classroom, CourseOffering, Faculty, FacultyAssignment, Section, SessionKind,
        Subject,
    };
    use chrono::NaiveTime;

    #[test]
    fn test_rows_carry_requirement_and_times() {
        let catalog = Catalog::new()
            .with_faculty(Faculty::new("F1"))
            .with_faculty(Faculty::new("F2"))
            .with_classroom(Classroom::new("R1"))
            .with_classroom(Classroom::new("R2"))
            .with_section(Section::new("A"))
            .with_section(Section::new("B"))
            .with_subject(Subject::new("S1"))
            .with_offering(CourseOffering::new("O1", "S1", "B").with_hours(1, 0))
            .with_offering(CourseOffering::new("O2", "S1", "A").with_hours(0, 1))
            .with_assignment(FacultyAssignment::new("O1", "F1"))
            .with_assignment(FacultyAssignment::new("O2", "F2"));
        let reqs = extract_requirements(&catalog).unwrap();
        let space = VariableSpace::build(&reqs, &GridConfig::new(2, 3), &catalog.classrooms);
        let periods = PeriodTable::generate(&PeriodTimeConfig::default(), 3).unwrap();

        // reqs[0] = S1/A/TUTORIAL, reqs[1] = S1/B/THEORY
        let assignment = Assignment {
            true_vars: vec![space.var(1, 2, 3, 0), space.var(0, 2, 3, 1)],
        };
        let t = materialize(&assignment, &reqs, &space, &periods);

        assert_eq!(t.len(), 2);
        assert!(t.is_conflict_free());
        // Same slot, ordered by section.
        let a = &t.classes[0];
        assert_eq!(a.section_id, "A");
        assert_eq!(a.kind, SessionKind::Tutorial);
        assert_eq!(a.faculty_id, "F2");
        assert_eq!(a.classroom_id, "R2");
        assert_eq!(a.slot(), (2, 3));
        assert_eq!(a.start_time, NaiveTime::from_hms_opt(11, 40, 0));
        assert_eq!(a.end_time, NaiveTime::from_hms_opt(12, 30, 0));

        let b = &t.classes[1];
        assert_eq!(b.section_id, "B");
        assert_eq!(b.subject_id, "S1");
        assert_eq!(b.classroom_id, "R1");
    }
}
