//! Subject profiles and registration.
//!
//! A *subject* is one baby whose vaccinations are tracked, together with the
//! guardian contact details reminders are delivered to. Registration is the
//! entry point of the whole pipeline: recording a birth date expands the
//! catalogue into the subject's dose schedule and plans the reminder entries
//! for every dose in the same operation.

use crate::error::{SureShotError, SureShotResult};
use crate::reminder::ReminderPlanner;
use crate::schedule::ScheduleGenerator;
use crate::store::ScheduleStore;
use crate::uuid::RecordId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sureshot_types::{EmailAddress, MobileNumber, NonEmptyText};

/// Persisted profile of one tracked subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub id: RecordId,
    /// The baby's display name.
    pub baby_name: NonEmptyText,
    /// The parent/guardian the notifications address.
    pub guardian_name: NonEmptyText,
    pub email: Option<EmailAddress>,
    pub mobile: Option<MobileNumber>,
    pub birth_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl SubjectProfile {
    /// Returns the canonical contact sheet for this subject.
    pub fn contact(&self) -> ContactProfile {
        ContactProfile {
            display_name: self.baby_name.clone(),
            guardian_name: self.guardian_name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
        }
    }
}

/// The canonical contact field set used by every notification path.
///
/// Both reminder dispatch and administration confirmations resolve contacts
/// through this one shape; there is deliberately no second spelling of these
/// fields anywhere in the codebase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactProfile {
    pub display_name: NonEmptyText,
    pub guardian_name: NonEmptyText,
    pub email: Option<EmailAddress>,
    pub mobile: Option<MobileNumber>,
}

/// Input for registering a new subject.
#[derive(Clone, Debug)]
pub struct NewSubject {
    pub baby_name: NonEmptyText,
    pub guardian_name: NonEmptyText,
    pub email: Option<EmailAddress>,
    pub mobile: Option<MobileNumber>,
    pub birth_date: NaiveDate,
}

/// Outcome of a registration: the allocated id plus how much schedule state
/// was created.
#[derive(Clone, Debug)]
pub struct Registration {
    pub subject_id: RecordId,
    pub doses_created: usize,
    pub reminders_created: usize,
}

/// Registration and contact lookup over persisted subjects.
#[derive(Clone)]
pub struct SubjectService {
    store: Arc<ScheduleStore>,
}

impl SubjectService {
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    /// Registers a subject and builds their full vaccination schedule.
    ///
    /// Persists the profile, expands the catalogue into dose records anchored
    /// to the birth date, and plans the reminder entries for every dose.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::EmptyCatalog` if the catalogue has not been
    /// seeded; storage errors propagate unchanged. If registration fails after
    /// the profile was persisted, [`regenerate`](Self::regenerate) completes
    /// the missing schedule state for that subject.
    pub fn register(&self, new_subject: NewSubject) -> SureShotResult<Registration> {
        let profile = SubjectProfile {
            id: RecordId::new(),
            baby_name: new_subject.baby_name,
            guardian_name: new_subject.guardian_name,
            email: new_subject.email,
            mobile: new_subject.mobile,
            birth_date: new_subject.birth_date,
            created_at: Utc::now(),
        };

        self.store.create_subject(&profile)?;

        let generator = ScheduleGenerator::new(self.store.clone());
        let doses_created = generator.generate(&profile.id, profile.birth_date)?;

        let planner = ReminderPlanner::new(self.store.clone());
        let reminders_created = planner.plan_for_subject(&profile.id)?;

        tracing::info!(
            subject = %profile.id,
            doses_created,
            reminders_created,
            "registered subject"
        );

        Ok(Registration {
            subject_id: profile.id,
            doses_created,
            reminders_created,
        })
    }

    /// Re-runs schedule generation and reminder planning for an existing
    /// subject.
    ///
    /// Both steps skip anything already present, so this only fills gaps:
    /// a schedule cut short by an earlier crash, or doses added to the
    /// catalogue after the subject was registered. Existing records are never
    /// touched.
    ///
    /// # Returns
    ///
    /// The counts of newly created dose records and reminder entries.
    pub fn regenerate(&self, subject_id: &RecordId) -> SureShotResult<Registration> {
        let profile = self.profile(subject_id)?;

        let generator = ScheduleGenerator::new(self.store.clone());
        let doses_created = generator.generate(&profile.id, profile.birth_date)?;

        let planner = ReminderPlanner::new(self.store.clone());
        let reminders_created = planner.plan_for_subject(&profile.id)?;

        Ok(Registration {
            subject_id: profile.id,
            doses_created,
            reminders_created,
        })
    }

    /// Loads a subject profile.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::SubjectNotFound` if no profile exists.
    pub fn profile(&self, subject_id: &RecordId) -> SureShotResult<SubjectProfile> {
        self.store
            .subject(subject_id)?
            .ok_or_else(|| SureShotError::SubjectNotFound(subject_id.to_string()))
    }

    /// Resolves the canonical contact sheet for a subject.
    pub fn contact(&self, subject_id: &RecordId) -> SureShotResult<ContactProfile> {
        Ok(self.profile(subject_id)?.contact())
    }

    /// Returns the subject's recorded birth date.
    pub fn birth_date(&self, subject_id: &RecordId) -> SureShotResult<NaiveDate> {
        Ok(self.profile(subject_id)?.birth_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogService;
    use crate::config::CoreConfig;
    use tempfile::TempDir;

    fn test_store(data_dir: &std::path::Path) -> Arc<ScheduleStore> {
        Arc::new(ScheduleStore::new(Arc::new(CoreConfig::new(
            data_dir.to_path_buf(),
        ))))
    }

    fn new_subject() -> NewSubject {
        NewSubject {
            baby_name: NonEmptyText::new("Aanya").unwrap(),
            guardian_name: NonEmptyText::new("Priya Sharma").unwrap(),
            email: Some(EmailAddress::parse("priya@example.com").unwrap()),
            mobile: Some(MobileNumber::parse("+919876543210").unwrap()),
            birth_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        }
    }

    #[test]
    fn register_creates_schedule_and_reminders() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        CatalogService::new(store.clone())
            .seed_builtin()
            .expect("seeding should succeed");

        let registration = SubjectService::new(store.clone())
            .register(new_subject())
            .expect("registration should succeed");

        assert!(registration.doses_created > 0);
        assert_eq!(
            registration.reminders_created,
            registration.doses_created * 4,
            "four reminder entries per dose"
        );

        let doses = store
            .dose_records(&registration.subject_id)
            .expect("dose records should load");
        assert_eq!(doses.len(), registration.doses_created);
    }

    #[test]
    fn register_fails_on_empty_catalog() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let err = SubjectService::new(store)
            .register(new_subject())
            .expect_err("registration without a catalogue should fail");

        assert!(matches!(err, SureShotError::EmptyCatalog));
    }

    #[test]
    fn contact_uses_canonical_fields() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        CatalogService::new(store.clone())
            .seed_builtin()
            .expect("seeding should succeed");

        let service = SubjectService::new(store);
        let registration = service
            .register(new_subject())
            .expect("registration should succeed");

        let contact = service
            .contact(&registration.subject_id)
            .expect("contact should resolve");
        assert_eq!(contact.display_name.as_str(), "Aanya");
        assert_eq!(contact.guardian_name.as_str(), "Priya Sharma");
        assert_eq!(contact.email.unwrap().as_str(), "priya@example.com");
        assert_eq!(contact.mobile.unwrap().as_str(), "+919876543210");
    }

    #[test]
    fn regenerate_is_idempotent_and_fills_catalog_gaps() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        let catalog = CatalogService::new(store.clone());
        catalog.seed_builtin().expect("seeding should succeed");

        let service = SubjectService::new(store.clone());
        let registration = service
            .register(new_subject())
            .expect("registration should succeed");

        let unchanged = service
            .regenerate(&registration.subject_id)
            .expect("regeneration should succeed");
        assert_eq!(unchanged.doses_created, 0);
        assert_eq!(unchanged.reminders_created, 0);

        // A vaccine added after registration is picked up on regeneration.
        store
            .add_missing_vaccines(&[crate::catalog::VaccineDefinition {
                name: NonEmptyText::new("Influenza").unwrap(),
                disease_prevented: "Seasonal influenza".into(),
                age_offset_days: 180,
                total_doses: 1,
                dose_interval_days: 0,
                mandatory: false,
                description: String::new(),
            }])
            .unwrap();
        let topped_up = service
            .regenerate(&registration.subject_id)
            .expect("regeneration should succeed");
        assert_eq!(topped_up.doses_created, 1);
        assert_eq!(topped_up.reminders_created, 4);
    }

    #[test]
    fn profile_lookup_for_unknown_subject_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = SubjectService::new(test_store(temp_dir.path()));

        let err = service
            .profile(&RecordId::new())
            .expect_err("unknown subject should not resolve");
        assert!(matches!(err, SureShotError::SubjectNotFound(_)));
    }
}
