//! File-backed persistence for the vaccination schedule.
//!
//! Records are stored as JSON documents under the configured data directory:
//!
//! ```text
//! <data_dir>/
//!   catalog.json                 # vaccine catalogue, keyed by unique name
//!   subjects/
//!     <s1>/
//!       <s2>/
//!         <uuid>/
//!           subject.json         # subject profile + guardian contacts
//!           schedule.json        # dose records for this subject
//!           reminders.json       # reminder entries for this subject
//! ```
//!
//! where `s1`/`s2` are the first four hex characters of the subject id,
//! providing scalable directory sharding.
//!
//! The store enforces the schedule's uniqueness constraints (one dose record
//! per (subject, vaccine, dose number), one reminder entry per (dose record,
//! window)) and persists sent-flag updates one reminder entry at a time, so a
//! failure mid-batch never loses state already written for earlier entries.
//! Deleting a subject directory removes their schedule and reminders with it.

use crate::catalog::VaccineDefinition;
use crate::config::CoreConfig;
use crate::constants::{REMINDERS_FILENAME, SCHEDULE_FILENAME, SUBJECT_FILENAME};
use crate::error::{SureShotError, SureShotResult};
use crate::reminder::ReminderEntry;
use crate::schedule::DoseRecord;
use crate::subject::SubjectProfile;
use crate::uuid::RecordId;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CRUD over the persisted catalogue, subjects, dose records and reminder
/// entries.
///
/// Every read goes back to the filesystem; the store keeps no in-memory cache
/// of sent flags or administration state, because either may change between
/// scans (dose administration, manual intervention).
#[derive(Clone)]
pub struct ScheduleStore {
    cfg: Arc<CoreConfig>,
}

impl ScheduleStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn subject_dir(&self, subject_id: &RecordId) -> PathBuf {
        subject_id.sharded_dir(&self.cfg.subjects_dir())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> SureShotResult<Option<T>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SureShotError::FileRead(e)),
        };
        let value = serde_json::from_str(&contents).map_err(SureShotError::Deserialization)?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> SureShotResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SureShotError::StorageDirCreation)?;
        }
        let contents = serde_json::to_string_pretty(value).map_err(SureShotError::Serialization)?;
        fs::write(path, contents).map_err(SureShotError::FileWrite)
    }

    // ------------------------------------------------------------------
    // Catalogue
    // ------------------------------------------------------------------

    /// Lists all vaccine definitions. An unseeded catalogue reads as empty.
    pub fn list_vaccines(&self) -> SureShotResult<Vec<VaccineDefinition>> {
        Ok(self
            .read_json(&self.cfg.catalog_path())?
            .unwrap_or_default())
    }

    /// Adds the definitions whose names are not yet present.
    ///
    /// # Returns
    ///
    /// The number of definitions actually added.
    pub fn add_missing_vaccines(&self, definitions: &[VaccineDefinition]) -> SureShotResult<usize> {
        let mut catalog = self.list_vaccines()?;
        let mut existing: HashSet<String> = catalog
            .iter()
            .map(|def| def.name.as_str().to_owned())
            .collect();

        let mut added = 0;
        for definition in definitions {
            definition.validate()?;
            if !existing.insert(definition.name.as_str().to_owned()) {
                continue;
            }
            catalog.push(definition.clone());
            added += 1;
        }

        if added > 0 {
            self.write_json(&self.cfg.catalog_path(), &catalog)?;
        }
        Ok(added)
    }

    // ------------------------------------------------------------------
    // Subjects
    // ------------------------------------------------------------------

    /// Persists a new subject profile.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::SubjectAlreadyExists` if a profile with the
    /// same id is already stored.
    pub fn create_subject(&self, profile: &SubjectProfile) -> SureShotResult<()> {
        let path = self.subject_dir(&profile.id).join(SUBJECT_FILENAME);
        if path.is_file() {
            return Err(SureShotError::SubjectAlreadyExists(profile.id.to_string()));
        }
        self.write_json(&path, profile)
    }

    /// Loads one subject profile, or `None` if the subject is unknown.
    pub fn subject(&self, subject_id: &RecordId) -> SureShotResult<Option<SubjectProfile>> {
        self.read_json(&self.subject_dir(subject_id).join(SUBJECT_FILENAME))
    }

    /// Lists the ids of all stored subjects.
    ///
    /// Traverses the sharded directory structure; leaf directories whose name
    /// is not a canonical record id are logged and skipped.
    pub fn subject_ids(&self) -> SureShotResult<Vec<RecordId>> {
        let mut ids = Vec::new();

        let subjects_dir = self.cfg.subjects_dir();
        let s1_iter = match fs::read_dir(&subjects_dir) {
            Ok(it) => it,
            Err(_) => return Ok(ids),
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };

            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };

                for id_ent in id_iter.flatten() {
                    let id_path = id_ent.path();
                    if !id_path.is_dir() || !id_path.join(SUBJECT_FILENAME).is_file() {
                        continue;
                    }

                    let leaf = id_path
                        .file_name()
                        .and_then(|os| os.to_str())
                        .unwrap_or_default();
                    match RecordId::parse(leaf) {
                        Ok(id) => ids.push(id),
                        Err(_) => {
                            tracing::warn!("skipping non-canonical subject directory: {}", leaf);
                        }
                    }
                }
            }
        }

        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Dose records
    // ------------------------------------------------------------------

    /// Loads all dose records for a subject. A subject without a generated
    /// schedule reads as empty.
    pub fn dose_records(&self, subject_id: &RecordId) -> SureShotResult<Vec<DoseRecord>> {
        Ok(self
            .read_json(&self.subject_dir(subject_id).join(SCHEDULE_FILENAME))?
            .unwrap_or_default())
    }

    /// Appends new dose records to a subject's schedule.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::InvalidInput` if any record would violate the
    /// (subject, vaccine, dose number) uniqueness constraint.
    pub fn append_dose_records(
        &self,
        subject_id: &RecordId,
        new_records: &[DoseRecord],
    ) -> SureShotResult<()> {
        let mut records = self.dose_records(subject_id)?;
        let mut seen: HashSet<(String, u32)> = records
            .iter()
            .map(|r| (r.vaccine_name.as_str().to_owned(), r.dose_number))
            .collect();

        for record in new_records {
            let key = (record.vaccine_name.as_str().to_owned(), record.dose_number);
            if !seen.insert(key) {
                return Err(SureShotError::InvalidInput(format!(
                    "duplicate dose record for vaccine '{}' dose {}",
                    record.vaccine_name, record.dose_number
                )));
            }
            records.push(record.clone());
        }

        self.write_json(
            &self.subject_dir(subject_id).join(SCHEDULE_FILENAME),
            &records,
        )
    }

    /// Finds a dose record by id across all subjects.
    pub fn find_dose_record(&self, dose_record_id: &RecordId) -> SureShotResult<Option<DoseRecord>> {
        for subject_id in self.subject_ids()? {
            if let Some(record) = self
                .dose_records(&subject_id)?
                .into_iter()
                .find(|record| &record.id == dose_record_id)
            {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Replaces a stored dose record with an updated copy.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::DoseRecordNotFound` if no record with the same
    /// id exists in the subject's schedule.
    pub fn update_dose_record(&self, updated: &DoseRecord) -> SureShotResult<()> {
        let mut records = self.dose_records(&updated.subject_id)?;
        let Some(slot) = records.iter_mut().find(|record| record.id == updated.id) else {
            return Err(SureShotError::DoseRecordNotFound(updated.id.to_string()));
        };
        *slot = updated.clone();

        self.write_json(
            &self.subject_dir(&updated.subject_id).join(SCHEDULE_FILENAME),
            &records,
        )
    }

    // ------------------------------------------------------------------
    // Reminder entries
    // ------------------------------------------------------------------

    /// Loads all reminder entries for a subject.
    pub fn reminder_entries(&self, subject_id: &RecordId) -> SureShotResult<Vec<ReminderEntry>> {
        Ok(self
            .read_json(&self.subject_dir(subject_id).join(REMINDERS_FILENAME))?
            .unwrap_or_default())
    }

    /// Appends new reminder entries for a subject.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::InvalidInput` if any entry would violate the
    /// (dose record, window) uniqueness constraint.
    pub fn append_reminder_entries(
        &self,
        subject_id: &RecordId,
        new_entries: &[ReminderEntry],
    ) -> SureShotResult<()> {
        let mut entries = self.reminder_entries(subject_id)?;
        let mut seen: HashSet<(RecordId, crate::reminder::ReminderWindow)> = entries
            .iter()
            .map(|e| (e.dose_record_id.clone(), e.window))
            .collect();

        for entry in new_entries {
            let key = (entry.dose_record_id.clone(), entry.window);
            if !seen.insert(key) {
                return Err(SureShotError::InvalidInput(format!(
                    "duplicate reminder entry for dose {} window {}",
                    entry.dose_record_id, entry.window
                )));
            }
            entries.push(entry.clone());
        }

        self.write_json(
            &self.subject_dir(subject_id).join(REMINDERS_FILENAME),
            &entries,
        )
    }

    /// Records channel delivery for one reminder entry and persists it
    /// immediately.
    ///
    /// Flags move false→true only: passing `None` for a channel leaves it
    /// untouched, and a flag that is already set keeps its original timestamp.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::ReminderEntryNotFound` if the entry does not
    /// exist for this subject.
    pub fn mark_reminder_sent(
        &self,
        subject_id: &RecordId,
        entry_id: &RecordId,
        email_sent_at: Option<DateTime<Utc>>,
        sms_sent_at: Option<DateTime<Utc>>,
    ) -> SureShotResult<ReminderEntry> {
        let mut entries = self.reminder_entries(subject_id)?;
        let Some(entry) = entries.iter_mut().find(|entry| &entry.id == entry_id) else {
            return Err(SureShotError::ReminderEntryNotFound(entry_id.to_string()));
        };

        if let Some(at) = email_sent_at {
            if !entry.email_sent {
                entry.email_sent = true;
                entry.email_sent_at = Some(at);
            }
        }
        if let Some(at) = sms_sent_at {
            if !entry.sms_sent {
                entry.sms_sent = true;
                entry.sms_sent_at = Some(at);
            }
        }

        let updated = entry.clone();
        self.write_json(
            &self.subject_dir(subject_id).join(REMINDERS_FILENAME),
            &entries,
        )?;
        Ok(updated)
    }
}
