//! Reminder windows, reminder entries, and reminder planning.
//!
//! Every dose gets exactly one [`ReminderEntry`] per [`ReminderWindow`], four
//! in total, created in a batch alongside the dose record. Each entry tracks
//! e-mail and SMS delivery independently; a channel's sent flag transitions
//! false→true at most once. Entries are never deleted once their dose is
//! administered; they stay behind as the delivery audit trail.

use crate::error::SureShotResult;
use crate::schedule::DoseRecord;
use crate::store::ScheduleStore;
use crate::uuid::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use sureshot_types::NonEmptyText;

/// Lead time before a dose's due date at which a reminder fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReminderWindow {
    #[serde(rename = "30_days")]
    ThirtyDays,
    #[serde(rename = "15_days")]
    FifteenDays,
    #[serde(rename = "7_days")]
    SevenDays,
    #[serde(rename = "1_day")]
    OneDay,
}

impl ReminderWindow {
    /// Every window, in dispatch order (longest lead time first).
    pub const ALL: [ReminderWindow; 4] = [
        ReminderWindow::ThirtyDays,
        ReminderWindow::FifteenDays,
        ReminderWindow::SevenDays,
        ReminderWindow::OneDay,
    ];

    /// Days between the reminder firing and the dose being due.
    pub fn days_before(self) -> u32 {
        match self {
            ReminderWindow::ThirtyDays => 30,
            ReminderWindow::FifteenDays => 15,
            ReminderWindow::SevenDays => 7,
            ReminderWindow::OneDay => 1,
        }
    }

    /// Stable label used in persisted records and job summaries.
    pub fn label(self) -> &'static str {
        match self {
            ReminderWindow::ThirtyDays => "30_days",
            ReminderWindow::FifteenDays => "15_days",
            ReminderWindow::SevenDays => "7_days",
            ReminderWindow::OneDay => "1_day",
        }
    }
}

impl fmt::Display for ReminderWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-window delivery bookkeeping for one dose.
///
/// `vaccine_name` and `due_date` are snapshots taken when the entry is
/// created; they deliberately do not track later edits to the dose record, so
/// an already-planned reminder keeps describing what was promised at planning
/// time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEntry {
    pub id: RecordId,
    pub dose_record_id: RecordId,
    pub subject_id: RecordId,
    pub vaccine_name: NonEmptyText,
    pub due_date: DateTime<Utc>,
    pub window: ReminderWindow,
    pub email_sent: bool,
    pub email_sent_at: Option<DateTime<Utc>>,
    pub sms_sent: bool,
    pub sms_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Creates the per-window reminder entries for dose records.
#[derive(Clone)]
pub struct ReminderPlanner {
    store: Arc<ScheduleStore>,
}

impl ReminderPlanner {
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    /// Plans the four reminder entries for one dose record.
    ///
    /// Windows for which an entry already exists are skipped, so planning is
    /// idempotent and safe to re-run.
    ///
    /// # Returns
    ///
    /// Only the newly created entries.
    pub fn plan(&self, dose: &DoseRecord) -> SureShotResult<Vec<ReminderEntry>> {
        let existing: HashSet<ReminderWindow> = self
            .store
            .reminder_entries(&dose.subject_id)?
            .into_iter()
            .filter(|entry| entry.dose_record_id == dose.id)
            .map(|entry| entry.window)
            .collect();

        let created_at = Utc::now();
        let new_entries: Vec<ReminderEntry> = ReminderWindow::ALL
            .into_iter()
            .filter(|window| !existing.contains(window))
            .map(|window| ReminderEntry {
                id: RecordId::new(),
                dose_record_id: dose.id.clone(),
                subject_id: dose.subject_id.clone(),
                vaccine_name: dose.vaccine_name.clone(),
                due_date: dose.due_date,
                window,
                email_sent: false,
                email_sent_at: None,
                sms_sent: false,
                sms_sent_at: None,
                created_at,
            })
            .collect();

        if !new_entries.is_empty() {
            self.store
                .append_reminder_entries(&dose.subject_id, &new_entries)?;
        }

        Ok(new_entries)
    }

    /// Plans reminder entries for every dose record of a subject.
    ///
    /// Used right after schedule generation to batch-plan all new doses.
    ///
    /// # Returns
    ///
    /// The total number of newly created entries.
    pub fn plan_for_subject(&self, subject_id: &RecordId) -> SureShotResult<usize> {
        let mut created = 0;
        for dose in self.store.dose_records(subject_id)? {
            created += self.plan(&dose)?.len();
        }
        Ok(created)
    }
}
