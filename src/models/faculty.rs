//! Faculty model.
//!
//! Faculty members are the human resources of a timetable. Each one has a
//! seniority tier and a weekly workload window (minimum and maximum taught
//! sessions per week).

use serde::{Deserialize, Serialize};

/// A teaching faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    /// Unique faculty identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Seniority tier.
    pub role: Role,
    /// Minimum sessions per week. `None` = no lower bound.
    pub min_hours_per_week: Option<u32>,
    /// Maximum sessions per week. `None` = unbounded.
    ///
    /// `Some(0)` is the catalog's "not configured" default and is read as
    /// unbounded as well, never as "zero hours". See [`Faculty::workload`].
    pub max_hours_per_week: Option<u32>,
}

/// Seniority tier of a faculty member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Assistant Professor (catalog default).
    #[default]
    AssistantProfessor,
    /// Associate Professor.
    AssociateProfessor,
    /// Professor.
    Professor,
}

impl Role {
    /// Short code used by the catalog layer ("AP", "ASP", "P").
    pub fn code(&self) -> &'static str {
        match self {
            Role::AssistantProfessor => "AP",
            Role::AssociateProfessor => "ASP",
            Role::Professor => "P",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Role::AssistantProfessor => "Assistant Professor",
            Role::AssociateProfessor => "Associate Professor",
            Role::Professor => "Professor",
        }
    }
}

/// Normalized weekly workload window `[min, max]`.
///
/// `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadBounds {
    pub min: u32,
    pub max: Option<u32>,
}

impl WorkloadBounds {
    /// Whether `sessions` lies inside the window.
    pub fn admits(&self, sessions: u32) -> bool {
        sessions >= self.min && self.max.map_or(true, |max| sessions <= max)
    }

    /// Whether the window constrains anything at all.
    pub fn is_unconstrained(&self) -> bool {
        self.min == 0 && self.max.is_none()
    }
}

impl Faculty {
    /// Creates a faculty member with the catalog defaults
    /// (Assistant Professor, no workload bounds).
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            role: Role::default(),
            min_hours_per_week: None,
            max_hours_per_week: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the seniority tier.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Sets the minimum weekly sessions.
    pub fn with_min_hours(mut self, hours: u32) -> Self {
        self.min_hours_per_week = Some(hours);
        self
    }

    /// Sets the maximum weekly sessions.
    pub fn with_max_hours(mut self, hours: u32) -> Self {
        self.max_hours_per_week = Some(hours);
        self
    }

    /// Sets both workload bounds.
    pub fn with_hours(self, min: u32, max: u32) -> Self {
        self.with_min_hours(min).with_max_hours(max)
    }

    /// Workload window with unset/zero-sentinel values normalized.
    pub fn workload(&self) -> WorkloadBounds {
        WorkloadBounds {
            min: self.min_hours_per_week.unwrap_or(0),
            max: self.max_hours_per_week.filter(|&max| max > 0),
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faculty_builder() {
        let f = Faculty::new("F1")
            .with_name("Dr. Rao")
            .with_role(Role::Professor)
            .with_hours(4, 18);

        assert_eq!(f.id, "F1");
        assert_eq!(f.display_name(), "Dr. Rao");
        assert_eq!(f.role, Role::Professor);
        assert_eq!(f.min_hours_per_week, Some(4));
        assert_eq!(f.max_hours_per_week, Some(18));
    }

    #[test]
    fn test_default_role() {
        let f = Faculty::new("F1");
        assert_eq!(f.role, Role::AssistantProfessor);
        assert_eq!(f.role.code(), "AP");
        assert_eq!(f.display_name(), "F1");
    }

    #[test]
    fn test_workload_unset_is_unbounded() {
        let w = Faculty::new("F1").workload();
        assert_eq!(w.min, 0);
        assert_eq!(w.max, None);
        assert!(w.is_unconstrained());
        assert!(w.admits(1_000));
    }

    #[test]
    fn test_workload_zero_max_is_unbounded() {
        let w = Faculty::new("F1").with_max_hours(0).workload();
        assert_eq!(w.max, None);
        assert!(w.admits(40));
    }

    #[test]
    fn test_workload_admits() {
        let w = Faculty::new("F1").with_hours(2, 4).workload();
        assert!(!w.admits(1));
        assert!(w.admits(2));
        assert!(w.admits(4));
        assert!(!w.admits(5));
        assert!(!w.is_unconstrained());
    }
}
