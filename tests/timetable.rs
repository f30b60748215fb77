use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use u_timetable::config::SolveConfig;
use u_timetable::error::ConstraintClass;
use u_timetable::models::{
    Catalog, Classroom, CourseOffering, Faculty, FacultyAssignment, Responsibility, Section,
    SessionKind, Subject,
};
use u_timetable::scheduler::{plan, Cell, SolveResult, TimetableEngine};
use u_timetable::store::{InMemoryScheduleStore, ScheduleStore};
use u_timetable::validation::validate_catalog;

/// Up to 4 sections with 2 offerings each, every faculty member teaching at
/// most 2 offerings, 3 rooms. Always feasible on a 5 × 6 grid.
fn random_catalog(rng: &mut SmallRng) -> Catalog {
    let sections = rng.random_range(1..=4);
    let mut catalog = Catalog::new()
        .with_classroom(Classroom::new("R1"))
        .with_classroom(Classroom::new("R2"))
        .with_classroom(Classroom::new("R3"))
        .with_subject(Subject::new("CS101"))
        .with_subject(Subject::new("MA201"));

    let mut offering = 0;
    for s in 0..sections {
        let section = format!("SEC{s}");
        catalog = catalog.with_section(Section::new(section.as_str()));
        for subject in ["CS101", "MA201"] {
            let id = format!("O{offering}");
            let faculty = format!("F{}", offering / 2);
            if offering % 2 == 0 {
                catalog = catalog.with_faculty(Faculty::new(faculty.as_str()).with_hours(0, 20));
            }
            let theory = rng.random_range(1..=3);
            let tutorial = rng.random_range(0..=1);
            catalog = catalog
                .with_offering(
                    CourseOffering::new(id.as_str(), subject, section.as_str())
                        .with_hours(theory, tutorial),
                )
                .with_assignment(FacultyAssignment::new(id, faculty));
            offering += 1;
        }
    }
    catalog
}

#[test]
fn test_random_catalogs_cover_exactly_without_double_booking() {
    let mut rng = SmallRng::seed_from_u64(42);
    let config = SolveConfig::new().with_grid(5, 6);

    for _ in 0..20 {
        let catalog = random_catalog(&mut rng);
        assert!(validate_catalog(&catalog).is_ok());

        let plan = plan(&catalog, &config).unwrap();
        let timetable = &plan.timetable;
        assert!(timetable.is_conflict_free(), "{:?}", timetable.conflicts());
        assert_eq!(timetable.len() as u32, catalog.total_required_hours());

        for o in &catalog.offerings {
            assert_eq!(
                timetable.count_matching(&o.subject_id, &o.section_id, SessionKind::Theory),
                o.theory_hours as usize
            );
            assert_eq!(
                timetable.count_matching(&o.subject_id, &o.section_id, SessionKind::Tutorial),
                o.tutorial_hours as usize
            );
        }
        for c in &timetable.classes {
            assert!((1..=5).contains(&c.day));
            assert!((1..=6).contains(&c.period));
            assert!(c.start_time.is_some());
        }
    }
}

#[test]
fn test_workload_bounds_hold() {
    let mut rng = SmallRng::seed_from_u64(7);
    let config = SolveConfig::new().with_grid(5, 6);

    for _ in 0..10 {
        let catalog = random_catalog(&mut rng);
        let plan = plan(&catalog, &config).unwrap();
        let hours = plan.timetable.faculty_hours();
        for f in &catalog.faculty {
            let taught = hours.get(&f.id).copied().unwrap_or(0);
            assert!(f.workload().admits(taught), "{} teaches {}", f.id, taught);
        }
    }
}

#[test]
fn test_split_responsibility_end_to_end() {
    let catalog = Catalog::new()
        .with_faculty(Faculty::new("T").with_name("Theo"))
        .with_faculty(Faculty::new("U").with_name("Tutor"))
        .with_classroom(Classroom::new("R1"))
        .with_section(Section::new("A"))
        .with_subject(Subject::new("CS101").with_name("Programming"))
        .with_offering(CourseOffering::new("O1", "CS101", "A").with_hours(3, 2))
        .with_assignment(
            FacultyAssignment::new("O1", "T").with_responsibility(Responsibility::TheoryOnly),
        )
        .with_assignment(
            FacultyAssignment::new("O1", "U").with_responsibility(Responsibility::TutorialOnly),
        );

    let engine = TimetableEngine::new(catalog, InMemoryScheduleStore::new());
    let config = SolveConfig::default();
    assert_eq!(engine.solve(&config).unwrap(), SolveResult::Scheduled(5));

    let rows = engine.store().all().unwrap();
    assert!(rows
        .classes
        .iter()
        .all(|c| (c.kind == SessionKind::Theory) == (c.faculty_id == "T")));

    let view = engine.section_view("A", &config).unwrap();
    let loads: BTreeMap<&str, (&str, u32)> = view
        .faculty_hours
        .iter()
        .map(|(id, load)| (id.as_str(), (load.name.as_str(), load.sessions)))
        .collect();
    let expected: BTreeMap<&str, (&str, u32)> =
        [("T", ("Theo", 3)), ("U", ("Tutor", 2))].into_iter().collect();
    assert_eq!(loads, expected);
    assert_eq!(view.class_count(), 5);
}

#[test]
fn test_catalog_edits_between_solves() {
    let source = Arc::new(RwLock::new(
        Catalog::new()
            .with_faculty(Faculty::new("F1").with_max_hours(4))
            .with_classroom(Classroom::new("R1"))
            .with_section(Section::new("A"))
            .with_section(Section::new("B"))
            .with_subject(Subject::new("S1"))
            .with_offering(CourseOffering::new("O1", "S1", "A"))
            .with_assignment(FacultyAssignment::new("O1", "F1")),
    ));
    let engine = TimetableEngine::new(Arc::clone(&source), Arc::new(InMemoryScheduleStore::new()));
    let config = SolveConfig::default();
    assert_eq!(engine.solve(&config).unwrap(), SolveResult::Scheduled(4));

    // A second offering pushes F1 to 8 sessions against a maximum of 4.
    {
        let mut catalog = source.write().unwrap();
        catalog.offerings.push(CourseOffering::new("O2", "S1", "B"));
        catalog.assignments.push(FacultyAssignment::new("O2", "F1"));
    }
    match engine.solve(&config).unwrap() {
        SolveResult::Infeasible(reason) => {
            assert_eq!(reason.class(), Some(ConstraintClass::Workload));
        }
        other => panic!("expected infeasible, got {other:?}"),
    }
    assert_eq!(engine.store().all().unwrap().len(), 4);

    // Raising the cap makes it feasible again.
    source.write().unwrap().faculty[0] = Faculty::new("F1").with_max_hours(8);
    assert_eq!(engine.solve(&config).unwrap(), SolveResult::Scheduled(8));
    assert_eq!(engine.store().revision(), 2);
}

#[test]
fn test_config_from_json() {
    let config: SolveConfig = serde_json::from_str(
        r#"{
            "grid": { "days": 5, "periods_per_day": 6 },
            "period_times": { "start": "09:00:00", "period_minutes": 60, "breaks": { "3": 45 } },
            "time_budget_ms": 5000
        }"#,
    )
    .unwrap();

    let catalog = Catalog::new()
        .with_faculty(Faculty::new("F1"))
        .with_classroom(Classroom::new("R1"))
        .with_section(Section::new("A"))
        .with_subject(Subject::new("S1"))
        .with_offering(CourseOffering::new("O1", "S1", "A").with_hours(6, 0))
        .with_assignment(FacultyAssignment::new("O1", "F1"));

    let engine = TimetableEngine::new(catalog, InMemoryScheduleStore::new());
    assert_eq!(engine.solve(&config).unwrap(), SolveResult::Scheduled(6));

    let view = engine.section_view("A", &config).unwrap();
    assert_eq!(view.rows.len(), 5);
    assert_eq!(view.headers.len(), 7);
    assert_eq!(view.headers[3], "Break after 3 (12:00 - 12:45)");
    assert_eq!(view.headers[4], "Period 4 (12:45 - 13:45)");
    assert!(view
        .rows
        .iter()
        .all(|r| matches!(r.cells[3], Cell::Break { .. })));
}

#[test]
fn test_catalog_json_round_trip_solves_identically() {
    let mut rng = SmallRng::seed_from_u64(3);
    let catalog = random_catalog(&mut rng);
    let json = serde_json::to_string(&catalog).unwrap();
    let restored: Catalog = serde_json::from_str(&json).unwrap();

    let config = SolveConfig::new().with_grid(5, 6);
    assert_eq!(
        plan(&catalog, &config).unwrap().timetable,
        plan(&restored, &config).unwrap().timetable
    );
}
