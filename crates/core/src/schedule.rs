//! Dose schedule generation.
//!
//! [`ScheduleGenerator`] expands the vaccine catalogue into one
//! [`DoseRecord`] per (vaccine, dose number) for a subject, anchored to the
//! subject's birth date:
//!
//! ```text
//! due_date = birth_date + age_offset_days + (dose_number - 1) * dose_interval_days
//! ```
//!
//! All arithmetic is day-granular; due dates are stored as midnight UTC so the
//! scanner's half-open day matching behaves identically whether or not a
//! record later carries a time component.
//!
//! Generation is idempotent: (vaccine, dose number) pairs that already exist
//! for the subject are skipped, so a retried call after a partial failure
//! completes the schedule instead of duplicating it.

use crate::error::{SureShotError, SureShotResult};
use crate::store::ScheduleStore;
use crate::uuid::RecordId;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use sureshot_types::NonEmptyText;

/// One scheduled administration of a vaccine for one subject.
///
/// The triple (`subject_id`, `vaccine_name`, `dose_number`) is unique: there
/// is at most one record per dose per subject. `administered` flips false→true
/// exactly once (via the administration handler) and is never reverted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoseRecord {
    pub id: RecordId,
    pub subject_id: RecordId,
    /// Catalogue key of the vaccine this dose belongs to.
    pub vaccine_name: NonEmptyText,
    /// 1-based position within the vaccine's series.
    pub dose_number: u32,
    pub due_date: DateTime<Utc>,
    pub administered: bool,
    pub administered_date: Option<NaiveDate>,
    /// Opaque reference to the administering clinician.
    pub administered_by: Option<RecordId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DoseRecord {
    /// A dose is overdue when its due date has passed and it has not been
    /// administered.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.administered && self.due_date.date_naive() < today
    }
}

/// Computes the due date for one dose of a vaccine series.
pub(crate) fn due_date_for_dose(
    birth_date: NaiveDate,
    age_offset_days: u32,
    dose_interval_days: u32,
    dose_number: u32,
) -> SureShotResult<DateTime<Utc>> {
    let offset = u64::from(age_offset_days)
        + u64::from(dose_number - 1) * u64::from(dose_interval_days);
    let day = birth_date
        .checked_add_days(Days::new(offset))
        .ok_or(SureShotError::DueDateOverflow)?;
    Ok(day.and_time(NaiveTime::MIN).and_utc())
}

/// Expands the catalogue into persisted dose records for one subject.
#[derive(Clone)]
pub struct ScheduleGenerator {
    store: Arc<ScheduleStore>,
}

impl ScheduleGenerator {
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    /// Generates the full dose schedule for a subject.
    ///
    /// For every catalogue definition and every dose number in its series,
    /// computes the due date from `birth_date` and persists a new
    /// [`DoseRecord`]. Pairs already present for the subject are skipped.
    /// Existing records are never mutated.
    ///
    /// # Returns
    ///
    /// The number of newly created dose records.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::EmptyCatalog` if no vaccine definitions exist:
    /// an unseeded catalogue is a configuration defect and must not silently
    /// produce an empty schedule. Storage errors propagate and abort the whole
    /// generation.
    pub fn generate(&self, subject_id: &RecordId, birth_date: NaiveDate) -> SureShotResult<usize> {
        let definitions = self.store.list_vaccines()?;
        if definitions.is_empty() {
            return Err(SureShotError::EmptyCatalog);
        }

        let existing: HashSet<(String, u32)> = self
            .store
            .dose_records(subject_id)?
            .into_iter()
            .map(|record| (record.vaccine_name.as_str().to_owned(), record.dose_number))
            .collect();

        let created_at = Utc::now();
        let mut new_records = Vec::new();

        for definition in &definitions {
            definition.validate()?;

            for dose_number in 1..=definition.total_doses {
                if existing.contains(&(definition.name.as_str().to_owned(), dose_number)) {
                    continue;
                }

                let due_date = due_date_for_dose(
                    birth_date,
                    definition.age_offset_days,
                    definition.dose_interval_days,
                    dose_number,
                )?;

                new_records.push(DoseRecord {
                    id: RecordId::new(),
                    subject_id: subject_id.clone(),
                    vaccine_name: definition.name.clone(),
                    dose_number,
                    due_date,
                    administered: false,
                    administered_date: None,
                    administered_by: None,
                    notes: None,
                    created_at,
                });
            }
        }

        let created = new_records.len();
        if created > 0 {
            self.store.append_dose_records(subject_id, &new_records)?;
        }

        tracing::info!(subject = %subject_id, created, "generated dose schedule");
        Ok(created)
    }
}
