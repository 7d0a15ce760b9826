//! Pending-reminder scanning.
//!
//! [`ReminderScanner::find_pending`] selects, for one window, the reminder
//! entries whose dose falls due exactly `window` days after the reference
//! date. The due-date comparison is a half-open calendar-day interval
//! (`[day 00:00, day+1 00:00)`), so records that carry a time component still
//! match their day exactly once.
//!
//! An entry is eligible only while *both* channel flags are unset and the
//! linked dose is not administered. Once either channel has been sent, the
//! entry is permanently out of scope for this window; a partially-failed
//! channel is not retried through the scan path.

use crate::error::SureShotResult;
use crate::reminder::{ReminderEntry, ReminderWindow};
use crate::schedule::DoseRecord;
use crate::store::ScheduleStore;
use crate::uuid::RecordId;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Finds reminder entries that are due for dispatch.
#[derive(Clone)]
pub struct ReminderScanner {
    store: Arc<ScheduleStore>,
}

impl ReminderScanner {
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    /// Returns the pending entries for `window`, oldest first.
    ///
    /// The selection predicate, applied against current persisted state:
    /// - the entry's window matches
    /// - neither channel flag is set
    /// - the linked dose record exists and is not administered
    /// - the dose's due date falls on the calendar day
    ///   `reference_date + window days` (half-open interval)
    ///
    /// Ordering is ascending by entry creation time (id as tie-break) for a
    /// deterministic, fair processing order.
    pub fn find_pending(
        &self,
        window: ReminderWindow,
        reference_date: NaiveDate,
    ) -> SureShotResult<Vec<ReminderEntry>> {
        let Some(target_day) =
            reference_date.checked_add_days(Days::new(u64::from(window.days_before())))
        else {
            // reference_date + 30 days past the calendar's end: nothing can be due.
            return Ok(Vec::new());
        };
        let day_start: DateTime<Utc> = target_day.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + chrono::Duration::days(1);

        let mut pending = Vec::new();

        for subject_id in self.store.subject_ids()? {
            let doses: HashMap<RecordId, DoseRecord> = self
                .store
                .dose_records(&subject_id)?
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect();

            for entry in self.store.reminder_entries(&subject_id)? {
                if entry.window != window || entry.email_sent || entry.sms_sent {
                    continue;
                }

                let Some(dose) = doses.get(&entry.dose_record_id) else {
                    continue;
                };
                if dose.administered {
                    continue;
                }
                if dose.due_date < day_start || dose.due_date >= day_end {
                    continue;
                }

                pending.push(entry);
            }
        }

        pending.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
        });

        tracing::debug!(
            window = %window,
            %target_day,
            found = pending.len(),
            "scanned for pending reminders"
        );
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VaccineDefinition;
    use crate::config::CoreConfig;
    use crate::reminder::ReminderPlanner;
    use crate::schedule::ScheduleGenerator;
    use crate::subject::SubjectProfile;
    use sureshot_types::NonEmptyText;
    use tempfile::TempDir;

    fn test_store(data_dir: &std::path::Path) -> Arc<ScheduleStore> {
        Arc::new(ScheduleStore::new(Arc::new(CoreConfig::new(
            data_dir.to_path_buf(),
        ))))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bcg() -> VaccineDefinition {
        VaccineDefinition {
            name: NonEmptyText::new("BCG").unwrap(),
            disease_prevented: "Tuberculosis".into(),
            age_offset_days: 0,
            total_doses: 1,
            dose_interval_days: 0,
            mandatory: true,
            description: String::new(),
        }
    }

    /// Seeds BCG, registers one subject born on `birth`, plans reminders, and
    /// returns (store, subject id, the single dose record).
    fn scheduled_subject(
        data_dir: &std::path::Path,
        birth: NaiveDate,
    ) -> (Arc<ScheduleStore>, RecordId, DoseRecord) {
        let store = test_store(data_dir);
        store.add_missing_vaccines(&[bcg()]).unwrap();

        let subject = RecordId::new();
        store
            .create_subject(&SubjectProfile {
                id: subject.clone(),
                baby_name: NonEmptyText::new("Aanya").unwrap(),
                guardian_name: NonEmptyText::new("Priya").unwrap(),
                email: None,
                mobile: None,
                birth_date: birth,
                created_at: Utc::now(),
            })
            .unwrap();

        ScheduleGenerator::new(store.clone())
            .generate(&subject, birth)
            .unwrap();
        ReminderPlanner::new(store.clone())
            .plan_for_subject(&subject)
            .unwrap();

        let dose = store.dose_records(&subject).unwrap().remove(0);
        (store, subject, dose)
    }

    #[test]
    fn finds_entry_only_in_the_matching_window() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // Born 2025-06-01, BCG due the same day.
        let (store, _, _) = scheduled_subject(temp_dir.path(), date(2025, 6, 1));
        let scanner = ReminderScanner::new(store);

        // 30 days before the due date.
        let reference = date(2025, 5, 2);
        let thirty = scanner
            .find_pending(ReminderWindow::ThirtyDays, reference)
            .unwrap();
        assert_eq!(thirty.len(), 1);

        for window in [
            ReminderWindow::FifteenDays,
            ReminderWindow::SevenDays,
            ReminderWindow::OneDay,
        ] {
            let found = scanner.find_pending(window, reference).unwrap();
            assert!(found.is_empty(), "window {} should be empty", window);
        }
    }

    #[test]
    fn half_open_day_interval_tolerates_time_components() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (store, _, mut dose) = scheduled_subject(temp_dir.path(), date(2025, 6, 1));

        // Store the due date with a midday time component.
        dose.due_date += chrono::Duration::hours(12);
        store.update_dose_record(&dose).unwrap();

        let scanner = ReminderScanner::new(store.clone());
        let found = scanner
            .find_pending(ReminderWindow::OneDay, date(2025, 5, 31))
            .unwrap();
        assert_eq!(found.len(), 1, "midday due date still matches its day");

        // Pushed to the next day's midnight, it no longer matches.
        dose.due_date += chrono::Duration::hours(12);
        store.update_dose_record(&dose).unwrap();
        let found = scanner
            .find_pending(ReminderWindow::OneDay, date(2025, 5, 31))
            .unwrap();
        assert!(found.is_empty(), "day+1 00:00 is outside the interval");
    }

    #[test]
    fn administered_dose_is_excluded_from_every_window() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (store, _, mut dose) = scheduled_subject(temp_dir.path(), date(2025, 6, 1));

        dose.administered = true;
        dose.administered_date = Some(date(2025, 5, 1));
        store.update_dose_record(&dose).unwrap();

        let scanner = ReminderScanner::new(store);
        for window in ReminderWindow::ALL {
            let reference = date(2025, 6, 1)
                .checked_sub_days(Days::new(u64::from(window.days_before())))
                .unwrap();
            let found = scanner.find_pending(window, reference).unwrap();
            assert!(
                found.is_empty(),
                "administered dose must not appear in window {}",
                window
            );
        }
    }

    #[test]
    fn partially_sent_entry_never_reappears() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (store, subject, _) = scheduled_subject(temp_dir.path(), date(2025, 6, 1));

        let scanner = ReminderScanner::new(store.clone());
        let reference = date(2025, 5, 2);
        let pending = scanner
            .find_pending(ReminderWindow::ThirtyDays, reference)
            .unwrap();
        assert_eq!(pending.len(), 1);

        // Email went out, SMS did not.
        store
            .mark_reminder_sent(&subject, &pending[0].id, Some(Utc::now()), None)
            .unwrap();

        let again = scanner
            .find_pending(ReminderWindow::ThirtyDays, reference)
            .unwrap();
        assert!(
            again.is_empty(),
            "an entry with one channel sent is permanently out of scope"
        );
    }

    #[test]
    fn pending_entries_come_back_oldest_first() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        store.add_missing_vaccines(&[bcg()]).unwrap();

        // Three subjects registered in sequence, all due the same day.
        let mut expected = Vec::new();
        for n in 0..3 {
            let subject = RecordId::new();
            store
                .create_subject(&SubjectProfile {
                    id: subject.clone(),
                    baby_name: NonEmptyText::new(format!("Baby {}", n)).unwrap(),
                    guardian_name: NonEmptyText::new("Guardian").unwrap(),
                    email: None,
                    mobile: None,
                    birth_date: date(2025, 6, 1),
                    created_at: Utc::now(),
                })
                .unwrap();
            ScheduleGenerator::new(store.clone())
                .generate(&subject, date(2025, 6, 1))
                .unwrap();
            ReminderPlanner::new(store.clone())
                .plan_for_subject(&subject)
                .unwrap();

            let entry = store
                .reminder_entries(&subject)
                .unwrap()
                .into_iter()
                .find(|e| e.window == ReminderWindow::SevenDays)
                .unwrap();
            expected.push(entry);
        }
        expected.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
        });

        let found = ReminderScanner::new(store)
            .find_pending(ReminderWindow::SevenDays, date(2025, 5, 25))
            .unwrap();
        assert_eq!(found, expected, "oldest entries are processed first");
    }
}
