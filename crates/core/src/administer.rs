//! Dose administration.
//!
//! Marking a dose administered is the terminal state of its reminder stream:
//! the scanner excludes administered doses from every window regardless of
//! which channel flags are still unset, so administration silently cancels
//! any reminders that were still pending. The transition is one-way: a dose
//! can never be un-administered through this handler.
//!
//! After the record is updated, a confirmation notification goes out to the
//! subject's contacts. The confirmation is advisory: the administration is
//! authoritative medical-record state, so a failed notification is logged and
//! never rolls the administration back.

use crate::dispatch::{EmailChannel, SmsChannel};
use crate::error::{SureShotError, SureShotResult};
use crate::messages;
use crate::schedule::DoseRecord;
use crate::store::ScheduleStore;
use crate::subject::ContactProfile;
use crate::uuid::RecordId;
use chrono::NaiveDate;
use std::sync::Arc;

/// Marks doses administered and sends confirmation notifications.
#[derive(Clone)]
pub struct AdministrationHandler {
    store: Arc<ScheduleStore>,
    email: Arc<dyn EmailChannel>,
    sms: Arc<dyn SmsChannel>,
}

impl AdministrationHandler {
    pub fn new(
        store: Arc<ScheduleStore>,
        email: Arc<dyn EmailChannel>,
        sms: Arc<dyn SmsChannel>,
    ) -> Self {
        Self { store, email, sms }
    }

    /// Marks a dose as administered.
    ///
    /// # Errors
    ///
    /// - `SureShotError::DoseRecordNotFound` if no such dose record exists.
    /// - `SureShotError::AlreadyAdministered` if the dose was administered
    ///   before; the transition is never repeated or reverted.
    ///
    /// # Returns
    ///
    /// The updated dose record.
    pub fn administer(
        &self,
        dose_record_id: &RecordId,
        clinician_id: &RecordId,
        administered_date: NaiveDate,
        notes: Option<String>,
    ) -> SureShotResult<DoseRecord> {
        let Some(mut record) = self.store.find_dose_record(dose_record_id)? else {
            return Err(SureShotError::DoseRecordNotFound(dose_record_id.to_string()));
        };

        if record.administered {
            return Err(SureShotError::AlreadyAdministered {
                id: record.id.to_string(),
                // A record can only become administered with a date recorded.
                date: record.administered_date.unwrap_or(administered_date),
            });
        }

        record.administered = true;
        record.administered_date = Some(administered_date);
        record.administered_by = Some(clinician_id.clone());
        record.notes = notes;

        self.store.update_dose_record(&record)?;
        tracing::info!(
            dose = %record.id,
            vaccine = %record.vaccine_name,
            dose_number = record.dose_number,
            clinician = %clinician_id,
            "dose administered"
        );

        self.send_confirmation(&record);
        Ok(record)
    }

    /// Best-effort confirmation to the subject's contacts.
    ///
    /// Failures here are logged only: the administration has already been
    /// persisted and must not be affected.
    fn send_confirmation(&self, record: &DoseRecord) {
        let contact = match self.store.subject(&record.subject_id) {
            Ok(Some(profile)) => profile.contact(),
            Ok(None) => {
                tracing::warn!(
                    subject = %record.subject_id,
                    "subject profile missing; skipping confirmation notification"
                );
                return;
            }
            Err(e) => {
                tracing::warn!(
                    subject = %record.subject_id,
                    "could not load subject for confirmation notification: {}",
                    e
                );
                return;
            }
        };

        self.send_confirmation_to(&contact, record);
    }

    fn send_confirmation_to(&self, contact: &ContactProfile, record: &DoseRecord) {
        if let Some(address) = &contact.email {
            let subject = messages::confirmation_email_subject(contact);
            let body = messages::confirmation_email_body(contact, record);
            if let Err(e) = self.email.send(address, &subject, &body) {
                tracing::warn!(dose = %record.id, "confirmation email failed: {}", e);
            }
        }

        if let Some(number) = &contact.mobile {
            let body = messages::confirmation_sms_body(contact, record);
            if let Err(e) = self.sms.send(number, &body) {
                tracing::warn!(dose = %record.id, "confirmation SMS failed: {}", e);
            }
        }
    }
}
