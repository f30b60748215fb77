//! Constraint compiler.
//!
//! Every timetabling rule is a cardinality constraint over boolean decision
//! variables: `min ≤ Σ vars ≤ max`.
//!
//! | Family | Scope | Bounds |
//! |--------|-------|--------|
//! | Coverage | one requirement | `= sessions` |
//! | Faculty double-booking | faculty × (day, period) | `≤ 1` |
//! | Section double-booking | section × (day, period) | `≤ 1` |
//! | Classroom double-booking | room × (day, period) | `≤ 1` |
//! | Workload | faculty | `[min, max]` |
//!
//! Double-booking constraints are only emitted for resources that own at
//! least one requirement; empty scopes constrain nothing. Workload
//! constraints are emitted for every faculty member with a bounded window,
//! including those who teach nothing: an idle member with `min > 0` makes
//! the model infeasible.
//!
//! # Reference
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Régin (1996), "Generalized Arc Consistency for Global Cardinality Constraint"

use super::requirements::{RequirementId, RequirementSet};
use super::variables::{VarId, VariableSpace};
use crate::error::ConstraintClass;

/// Index of a constraint in a [`CpModel`].
pub type ConstraintId = usize;

/// What a constraint ranges over. Kept structured so descriptions are only
/// formatted when a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Coverage { requirement: RequirementId },
    FacultySlot { faculty: usize, day: u32, period: u32 },
    SectionSlot { section: usize, day: u32, period: u32 },
    RoomSlot { room: usize, day: u32, period: u32 },
    Workload { faculty: usize },
}

impl Scope {
    /// Human-readable scope, using catalog ids and codes.
    pub fn describe(&self, requirements: &RequirementSet, space: &VariableSpace) -> String {
        let faculty = |f: usize| requirements.faculty_ids.get(f).map_or("?", String::as_str);
        match *self {
            Scope::Coverage { requirement } => match requirements.get(requirement) {
                Some(r) => format!("coverage of {}", r.tag()),
                None => format!("coverage of requirement #{requirement}"),
            },
            Scope::FacultySlot {
                faculty: f,
                day,
                period,
            } => format!("faculty '{}' on day {day} period {period}", faculty(f)),
            Scope::SectionSlot {
                section,
                day,
                period,
            } => format!(
                "section '{}' on day {day} period {period}",
                requirements.section_ids.get(section).map_or("?", String::as_str)
            ),
            Scope::RoomSlot { room, day, period } => format!(
                "classroom '{}' on day {day} period {period}",
                space.room_ids().get(room).map_or("?", String::as_str)
            ),
            Scope::Workload { faculty: f } => format!("workload of faculty '{}'", faculty(f)),
        }
    }
}

/// `min ≤ Σ vars ≤ max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub class: ConstraintClass,
    pub scope: Scope,
    pub vars: Vec<VarId>,
    pub min: u32,
    pub max: u32,
}

impl LinearConstraint {
    fn at_most_one(class: ConstraintClass, scope: Scope, vars: Vec<VarId>) -> Self {
        Self {
            class,
            scope,
            vars,
            min: 0,
            max: 1,
        }
    }
}

/// Double-booking constraints of one faculty member or section.
#[derive(Debug, Clone, Default)]
pub struct ResourceGroup {
    /// Requirements using the resource.
    pub requirements: Vec<RequirementId>,
    /// One `≤ 1` constraint per (day, period), empty if unused.
    pub slots: Vec<ConstraintId>,
}

/// Compiled constraint model.
#[derive(Debug, Clone)]
pub struct CpModel {
    constraints: Vec<LinearConstraint>,
    /// Constraints each variable participates in.
    var_constraints: Vec<Vec<ConstraintId>>,
    coverage_of: Vec<ConstraintId>,
    workload_of: Vec<Option<ConstraintId>>,
    faculty: Vec<ResourceGroup>,
    sections: Vec<ResourceGroup>,
    room_slots: Vec<ConstraintId>,
}

/// Constraint counts per family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub variables: usize,
    pub coverage: usize,
    pub faculty_slots: usize,
    pub section_slots: usize,
    pub room_slots: usize,
    pub workload: usize,
}

impl ModelStats {
    pub fn constraints(&self) -> usize {
        self.coverage + self.faculty_slots + self.section_slots + self.room_slots + self.workload
    }
}

impl CpModel {
    /// Compiles every constraint family over `space`.
    pub fn compile(requirements: &RequirementSet, space: &VariableSpace) -> Self {
        let mut model = Self {
            constraints: Vec::new(),
            var_constraints: vec![Vec::new(); space.len()],
            coverage_of: Vec::with_capacity(requirements.len()),
            workload_of: vec![None; requirements.faculty_ids.len()],
            faculty: vec![ResourceGroup::default(); requirements.faculty_ids.len()],
            sections: vec![ResourceGroup::default(); requirements.section_ids.len()],
            room_slots: Vec::new(),
        };

        for r in requirements.iter() {
            model.faculty[r.faculty].requirements.push(r.id);
            model.sections[r.section].requirements.push(r.id);
        }

        // Coverage: exactly `sessions` placements per requirement.
        for r in requirements.iter() {
            let id = model.push(LinearConstraint {
                class: ConstraintClass::Coverage,
                scope: Scope::Coverage { requirement: r.id },
                vars: space.requirement_vars(r.id).collect(),
                min: r.sessions,
                max: r.sessions,
            });
            model.coverage_of.push(id);
        }

        if space.is_empty() {
            return model;
        }

        for (day, period) in space.slots() {
            for f in 0..model.faculty.len() {
                if model.faculty[f].requirements.is_empty() {
                    continue;
                }
                let vars = slot_vars(&model.faculty[f].requirements, space, day, period);
                let id = model.push(LinearConstraint::at_most_one(
                    ConstraintClass::FacultyDoubleBooking,
                    Scope::FacultySlot {
                        faculty: f,
                        day,
                        period,
                    },
                    vars,
                ));
                model.faculty[f].slots.push(id);
            }

            for s in 0..model.sections.len() {
                if model.sections[s].requirements.is_empty() {
                    continue;
                }
                let vars = slot_vars(&model.sections[s].requirements, space, day, period);
                let id = model.push(LinearConstraint::at_most_one(
                    ConstraintClass::SectionDoubleBooking,
                    Scope::SectionSlot {
                        section: s,
                        day,
                        period,
                    },
                    vars,
                ));
                model.sections[s].slots.push(id);
            }

            for room in 0..space.room_count() {
                let vars = requirements
                    .iter()
                    .map(|r| space.var(r.id, day, period, room))
                    .collect();
                let id = model.push(LinearConstraint::at_most_one(
                    ConstraintClass::ClassroomDoubleBooking,
                    Scope::RoomSlot { room, day, period },
                    vars,
                ));
                model.room_slots.push(id);
            }
        }

        for (f, bounds) in requirements.workloads.iter().enumerate() {
            if bounds.is_unconstrained() {
                continue;
            }
            let vars = model.faculty[f]
                .requirements
                .iter()
                .flat_map(|&r| space.requirement_vars(r))
                .collect();
            let id = model.push(LinearConstraint {
                class: ConstraintClass::Workload,
                scope: Scope::Workload { faculty: f },
                vars,
                min: bounds.min,
                max: bounds.max.unwrap_or(u32::MAX),
            });
            model.workload_of[f] = Some(id);
        }

        model
    }

    fn push(&mut self, constraint: LinearConstraint) -> ConstraintId {
        let id = self.constraints.len();
        for &v in &constraint.vars {
            self.var_constraints[v].push(id);
        }
        self.constraints.push(constraint);
        id
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn num_vars(&self) -> usize {
        self.var_constraints.len()
    }

    pub fn constraint(&self, id: ConstraintId) -> &LinearConstraint {
        &self.constraints[id]
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Constraints containing `var`.
    pub fn constraints_of(&self, var: VarId) -> &[ConstraintId] {
        &self.var_constraints[var]
    }

    /// Coverage constraint of a requirement.
    pub fn coverage_of(&self, requirement: RequirementId) -> ConstraintId {
        self.coverage_of[requirement]
    }

    /// Workload constraint of a faculty index, if one was emitted.
    pub fn workload_of(&self, faculty: usize) -> Option<ConstraintId> {
        self.workload_of.get(faculty).copied().flatten()
    }

    pub fn faculty_groups(&self) -> &[ResourceGroup] {
        &self.faculty
    }

    pub fn section_groups(&self) -> &[ResourceGroup] {
        &self.sections
    }

    pub fn room_slots(&self) -> &[ConstraintId] {
        &self.room_slots
    }

    pub fn stats(&self) -> ModelStats {
        let mut stats = ModelStats {
            variables: self.num_vars(),
            ..ModelStats::default()
        };
        for c in &self.constraints {
            match c.class {
                ConstraintClass::Coverage => stats.coverage += 1,
                ConstraintClass::FacultyDoubleBooking => stats.faculty_slots += 1,
                ConstraintClass::SectionDoubleBooking => stats.section_slots += 1,
                ConstraintClass::ClassroomDoubleBooking => stats.room_slots += 1,
                ConstraintClass::Workload => stats.workload += 1,
            }
        }
        stats
    }
}

fn slot_vars(
    requirements: &[RequirementId],
    space: &VariableSpace,
    day: u32,
    period: u32,
) -> Vec<VarId> {
    requirements
        .iter()
        .flat_map(|&r| space.slot_vars(r, day, period))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::cp::requirements::extract_requirements;
    use crate::models::{
        Catalog, Classroom, CourseOffering, Faculty, FacultyAssignment, Section, Subject,
    };

    fn catalog() -> Catalog {
        Catalog::new()
            .with_faculty(Faculty::new("F1").with_hours(0, 20))
            .with_faculty(Faculty::new("F2"))
            .with_faculty(Faculty::new("F3").with_hours(2, 10))
            .with_classroom(Classroom::new("R1"))
            .with_classroom(Classroom::new("R2"))
            .with_section(Section::new("A"))
            .with_section(Section::new("B"))
            .with_subject(Subject::new("S1"))
            .with_offering(CourseOffering::new("O1", "S1", "A").with_hours(3, 1))
            .with_offering(CourseOffering::new("O2", "S1", "B").with_hours(2, 0))
            .with_assignment(FacultyAssignment::new("O1", "F1"))
            .with_assignment(FacultyAssignment::new("O2", "F2"))
    }

    fn compile(grid: GridConfig) -> (RequirementSet, VariableSpace, CpModel) {
        let catalog = catalog();
        let reqs = extract_requirements(&catalog).unwrap();
        let space = VariableSpace::build(&reqs, &grid, &catalog.classrooms);
        let model = CpModel::compile(&reqs, &space);
        (reqs, space, model)
    }

    #[test]
    fn test_constraint_counts() {
        let (reqs, _, model) = compile(GridConfig::new(2, 3));
        let stats = model.stats();

        assert_eq!(reqs.len(), 3);
        assert_eq!(stats.variables, 3 * 6 * 2);
        assert_eq!(stats.coverage, 3);
        // F1 and F2 teach; F3 has nothing.
        assert_eq!(stats.faculty_slots, 2 * 6);
        assert_eq!(stats.section_slots, 2 * 6);
        assert_eq!(stats.room_slots, 2 * 6);
        // F1 and F3 bounded, F2 unconstrained.
        assert_eq!(stats.workload, 2);
        assert_eq!(stats.constraints(), model.len());
        assert!(model.workload_of(0).is_some());
        assert!(model.workload_of(1).is_none());

        // F3 teaches nothing but still has to reach 2 sessions.
        let idle = model.constraint(model.workload_of(2).unwrap());
        assert!(idle.vars.is_empty());
        assert_eq!((idle.min, idle.max), (2, 10));
    }

    #[test]
    fn test_coverage_bounds() {
        let (reqs, space, model) = compile(GridConfig::new(2, 3));
        for r in reqs.iter() {
            let c = model.constraint(model.coverage_of(r.id));
            assert_eq!(c.class, ConstraintClass::Coverage);
            assert_eq!((c.min, c.max), (r.sessions, r.sessions));
            assert_eq!(c.vars.len(), space.vars_per_requirement());
        }
    }

    #[test]
    fn test_every_variable_is_constrained() {
        let (_, space, model) = compile(GridConfig::new(2, 3));
        for v in 0..space.len() {
            let classes: Vec<ConstraintClass> = model
                .constraints_of(v)
                .iter()
                .map(|&c| model.constraint(c).class)
                .collect();
            assert!(classes.contains(&ConstraintClass::Coverage));
            assert!(classes.contains(&ConstraintClass::FacultyDoubleBooking));
            assert!(classes.contains(&ConstraintClass::SectionDoubleBooking));
            assert!(classes.contains(&ConstraintClass::ClassroomDoubleBooking));
        }
    }

    #[test]
    fn test_section_slot_spans_requirements_and_rooms() {
        let (reqs, space, model) = compile(GridConfig::new(2, 3));
        let section_a = reqs.section_ids.iter().position(|s| s == "A").unwrap();
        let group = &model.section_groups()[section_a];
        assert_eq!(group.requirements.len(), 2);
        assert_eq!(group.slots.len(), 6);

        let c = model.constraint(group.slots[0]);
        // 2 requirements × 2 rooms at day 1 period 1.
        assert_eq!(c.vars.len(), 4);
        assert_eq!(c.max, 1);
        assert_eq!(
            c.scope,
            Scope::SectionSlot {
                section: section_a,
                day: 1,
                period: 1
            }
        );
        assert_eq!(c.scope.describe(&reqs, &space), "section 'A' on day 1 period 1");
    }

    #[test]
    fn test_without_rooms_only_coverage_remains() {
        let catalog = Catalog {
            classrooms: Vec::new(),
            ..catalog()
        };
        let reqs = extract_requirements(&catalog).unwrap();
        let space = VariableSpace::build(&reqs, &GridConfig::default(), &catalog.classrooms);
        let model = CpModel::compile(&reqs, &space);
        assert_eq!(model.len(), reqs.len());
        assert!(model.constraints().iter().all(|c| c.vars.is_empty()));
    }

    #[test]
    fn test_scope_descriptions() {
        let (reqs, space, _) = compile(GridConfig::new(1, 1));
        assert_eq!(
            Scope::Coverage { requirement: 0 }.describe(&reqs, &space),
            "coverage of S1/A/THEORY"
        );
        assert_eq!(
            Scope::RoomSlot {
                room: 1,
                day: 1,
                period: 1
            }
            .describe(&reqs, &space),
            "classroom 'R2' on day 1 period 1"
        );
        assert_eq!(
            Scope::Workload { faculty: 0 }.describe(&reqs, &space),
            "workload of faculty 'F1'"
        );
    }
}
