//! Schedule persistence.
//!
//! A store owns the current week of [`ScheduledClass`] rows. Writers replace
//! the whole set in one step; readers see either the old set or the new one,
//! never a mix.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::{ScheduledClass, Timetable};

/// Persistence for the produced timetable.
pub trait ScheduleStore {
    /// Atomically replaces every stored row with `timetable`.
    ///
    /// On error the previously stored rows must remain visible.
    fn replace_all(&self, timetable: Timetable) -> Result<(), StoreError>;

    /// Snapshot of every stored row.
    fn all(&self) -> Result<Timetable, StoreError>;

    /// Rows of one section, in stored order.
    fn for_section(&self, section_id: &str) -> Result<Vec<ScheduledClass>, StoreError> {
        Ok(self
            .all()?
            .classes
            .into_iter()
            .filter(|c| c.section_id == section_id)
            .collect())
    }
}

impl<T: ScheduleStore + ?Sized> ScheduleStore for Arc<T> {
    fn replace_all(&self, timetable: Timetable) -> Result<(), StoreError> {
        (**self).replace_all(timetable)
    }

    fn all(&self) -> Result<Timetable, StoreError> {
        (**self).all()
    }

    fn for_section(&self, section_id: &str) -> Result<Vec<ScheduledClass>, StoreError> {
        (**self).for_section(section_id)
    }
}

/// Process-local store behind a single-writer lock.
///
/// Rows are kept behind an `Arc` so readers clone a pointer, not the week.
/// A replacement that would double-book any resource is rejected and the
/// stored set is left as it was.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    current: RwLock<Arc<Timetable>>,
    revision: AtomicU64,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `timetable` (not audited).
    pub fn with_timetable(timetable: Timetable) -> Self {
        Self {
            current: RwLock::new(Arc::new(timetable)),
            revision: AtomicU64::new(0),
        }
    }

    /// Number of successful replacements.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Shared handle to the current rows.
    pub fn snapshot(&self) -> Result<Arc<Timetable>, StoreError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| StoreError::Poisoned("schedule"))
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn replace_all(&self, timetable: Timetable) -> Result<(), StoreError> {
        if let Some(conflict) = timetable.conflicts().first() {
            warn!(
                kind = ?conflict.kind,
                resource = %conflict.resource_id,
                day = conflict.day,
                period = conflict.period,
                "rejecting schedule with double booking"
            );
            return Err(StoreError::Rejected(format!(
                "{:?} '{}' double-booked on day {} period {}",
                conflict.kind, conflict.resource_id, conflict.day, conflict.period
            )));
        }

        let rows = timetable.len();
        let next = Arc::new(timetable);
        let mut guard = self
            .current
            .write()
            .map_err(|_| StoreError::Poisoned("schedule"))?;
        *guard = next;
        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        drop(guard);

        debug!(rows, revision, "schedule replaced");
        Ok(())
    }

    fn all(&self) -> Result<Timetable, StoreError> {
        Ok(self.snapshot()?.as_ref().clone())
    }
}
