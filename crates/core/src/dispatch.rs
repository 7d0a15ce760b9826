//! Reminder dispatch: batching, pacing, and per-channel delivery bookkeeping.
//!
//! The engine works through a window's pending reminders in fixed-size
//! batches, pausing after every send and between batches to respect
//! third-party rate limits. Delivery is single-flow by design: the pacing
//! delays are the only suspension points, not a performance bottleneck to
//! parallelise away.
//!
//! For each reminder the two channels are attempted independently: a failed
//! e-mail never blocks the SMS and vice versa. Whatever succeeded is persisted
//! immediately, one reminder at a time, so an interruption mid-batch keeps
//! every flag already written.
//!
//! Channel clients are injected as trait objects rather than reached through
//! process-wide singletons, which keeps hidden state out of the engine and
//! lets tests substitute doubles.

use crate::config::CoreConfig;
use crate::error::SureShotResult;
use crate::messages;
use crate::reminder::{ReminderEntry, ReminderWindow};
use crate::scanner::ReminderScanner;
use crate::store::ScheduleStore;
use crate::subject::ContactProfile;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use sureshot_types::{EmailAddress, MobileNumber};

/// Failure of a single channel send.
///
/// These are recovered locally: the other channel is still attempted and the
/// batch continues. They never abort the job.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel's credentials or endpoint are missing, an environment
    /// defect surfaced at the collaborator boundary, not retried here.
    #[error("channel is not configured: {0}")]
    NotConfigured(String),
    #[error("send failed: {0}")]
    Send(String),
}

/// An outbound e-mail collaborator.
pub trait EmailChannel: Send + Sync {
    fn send(&self, to: &EmailAddress, subject: &str, html_body: &str) -> Result<(), ChannelError>;
}

/// An outbound SMS collaborator. Numbers always carry their country code.
pub trait SmsChannel: Send + Sync {
    fn send(&self, to: &MobileNumber, body: &str) -> Result<(), ChannelError>;
}

/// Pacing collaborator between sends and batches.
///
/// Injected so tests can observe pacing without actually sleeping.
pub trait Pacer: Send + Sync {
    fn pause(&self, delay: Duration);
}

/// Production pacer: blocks the current thread.
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Sends pending reminders in paced batches and records per-channel outcomes.
#[derive(Clone)]
pub struct DispatchEngine {
    cfg: Arc<CoreConfig>,
    store: Arc<ScheduleStore>,
    email: Arc<dyn EmailChannel>,
    sms: Arc<dyn SmsChannel>,
    pacer: Arc<dyn Pacer>,
}

impl DispatchEngine {
    pub fn new(
        cfg: Arc<CoreConfig>,
        store: Arc<ScheduleStore>,
        email: Arc<dyn EmailChannel>,
        sms: Arc<dyn SmsChannel>,
    ) -> Self {
        Self::with_pacer(cfg, store, email, sms, Arc::new(ThreadPacer))
    }

    pub fn with_pacer(
        cfg: Arc<CoreConfig>,
        store: Arc<ScheduleStore>,
        email: Arc<dyn EmailChannel>,
        sms: Arc<dyn SmsChannel>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            cfg,
            store,
            email,
            sms,
            pacer,
        }
    }

    /// Dispatches one window's pending reminders.
    ///
    /// Reminders are processed in the given order, split into batches of
    /// `CoreConfig::batch_size`, with a pacing pause after every reminder and
    /// a longer pause between batches. A failure on one reminder (channel or
    /// storage) is logged and never prevents the rest of the batch from
    /// being attempted.
    ///
    /// # Returns
    ///
    /// The number of reminders for which at least one channel was delivered
    /// and recorded.
    pub fn dispatch_batch(&self, reminders: &[ReminderEntry], window: ReminderWindow) -> usize {
        let batch_size = self.cfg.batch_size();
        let total_batches = reminders.len().div_ceil(batch_size);
        let mut sent_count = 0;

        for (batch_index, batch) in reminders.chunks(batch_size).enumerate() {
            tracing::info!(
                window = %window,
                batch = batch_index + 1,
                of = total_batches,
                size = batch.len(),
                "processing reminder batch"
            );

            for entry in batch {
                match self.send_single(entry, window) {
                    Ok(true) => sent_count += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::error!(entry = %entry.id, "failed to dispatch reminder: {}", e);
                    }
                }

                self.pacer.pause(self.cfg.send_delay());
            }

            if batch_index + 1 < total_batches {
                self.pacer.pause(self.cfg.batch_delay());
            }
        }

        tracing::info!(
            window = %window,
            sent = sent_count,
            of = reminders.len(),
            "batch processing complete"
        );
        sent_count
    }

    /// Attempts both channels for one reminder and persists whatever
    /// succeeded.
    ///
    /// Returns `Ok(true)` once at least one channel was delivered *and* the
    /// flags were recorded. Channel failures are logged and recovered here;
    /// storage failures propagate to the per-reminder isolation in
    /// [`dispatch_batch`](Self::dispatch_batch).
    fn send_single(
        &self,
        entry: &ReminderEntry,
        window: ReminderWindow,
    ) -> SureShotResult<bool> {
        let Some(profile) = self.store.subject(&entry.subject_id)? else {
            tracing::warn!(
                entry = %entry.id,
                subject = %entry.subject_id,
                "subject profile missing; skipping reminder"
            );
            return Ok(false);
        };
        let contact = profile.contact();

        let email_sent = self.try_email(entry, window, &contact);
        let sms_sent = self.try_sms(entry, window, &contact);

        if !email_sent && !sms_sent {
            tracing::warn!(entry = %entry.id, "no notifications sent for reminder");
            return Ok(false);
        }

        let now = Utc::now();
        self.store.mark_reminder_sent(
            &entry.subject_id,
            &entry.id,
            email_sent.then_some(now),
            sms_sent.then_some(now),
        )?;

        tracing::info!(
            entry = %entry.id,
            vaccine = %entry.vaccine_name,
            email_sent,
            sms_sent,
            "reminder sent"
        );
        Ok(true)
    }

    fn try_email(
        &self,
        entry: &ReminderEntry,
        window: ReminderWindow,
        contact: &ContactProfile,
    ) -> bool {
        let Some(address) = &contact.email else {
            return false;
        };

        let subject = messages::reminder_email_subject(window, contact);
        let body =
            messages::reminder_email_body(window, contact, entry.vaccine_name.as_str(), entry.due_date);

        match self.email.send(address, &subject, &body) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(entry = %entry.id, "reminder email failed: {}", e);
                false
            }
        }
    }

    fn try_sms(
        &self,
        entry: &ReminderEntry,
        window: ReminderWindow,
        contact: &ContactProfile,
    ) -> bool {
        let Some(number) = &contact.mobile else {
            return false;
        };

        let body =
            messages::reminder_sms_body(window, contact, entry.vaccine_name.as_str(), entry.due_date);

        match self.sms.send(number, &body) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(entry = %entry.id, "reminder SMS failed: {}", e);
                false
            }
        }
    }
}

/// Per-window counts of reminders sent by one job run.
///
/// A window that had nothing due reports zero, so callers monitoring the
/// summary can tell "nothing was due" apart from a job that errored, because
/// the latter never produces a summary at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub thirty_days: usize,
    pub fifteen_days: usize,
    pub seven_days: usize,
    pub one_day: usize,
}

impl JobSummary {
    pub fn sent_for(&self, window: ReminderWindow) -> usize {
        match window {
            ReminderWindow::ThirtyDays => self.thirty_days,
            ReminderWindow::FifteenDays => self.fifteen_days,
            ReminderWindow::SevenDays => self.seven_days,
            ReminderWindow::OneDay => self.one_day,
        }
    }

    pub fn total(&self) -> usize {
        self.thirty_days + self.fifteen_days + self.seven_days + self.one_day
    }

    fn record(&mut self, window: ReminderWindow, sent: usize) {
        match window {
            ReminderWindow::ThirtyDays => self.thirty_days = sent,
            ReminderWindow::FifteenDays => self.fifteen_days = sent,
            ReminderWindow::SevenDays => self.seven_days = sent,
            ReminderWindow::OneDay => self.one_day = sent,
        }
    }
}

/// The periodic reminder job: scan each window, dispatch what is pending.
///
/// Windows run sequentially, longest lead time first, with a batch-length
/// pause between them. Every run re-queries persisted state; nothing about
/// "already sent" is cached across invocations, because administration or
/// manual intervention may have changed eligibility since the last run.
#[derive(Clone)]
pub struct ReminderJob {
    cfg: Arc<CoreConfig>,
    scanner: ReminderScanner,
    engine: DispatchEngine,
    pacer: Arc<dyn Pacer>,
}

impl ReminderJob {
    pub fn new(
        cfg: Arc<CoreConfig>,
        store: Arc<ScheduleStore>,
        email: Arc<dyn EmailChannel>,
        sms: Arc<dyn SmsChannel>,
    ) -> Self {
        Self::with_pacer(cfg, store, email, sms, Arc::new(ThreadPacer))
    }

    pub fn with_pacer(
        cfg: Arc<CoreConfig>,
        store: Arc<ScheduleStore>,
        email: Arc<dyn EmailChannel>,
        sms: Arc<dyn SmsChannel>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        let scanner = ReminderScanner::new(store.clone());
        let engine =
            DispatchEngine::with_pacer(cfg.clone(), store, email, sms, pacer.clone());
        Self {
            cfg,
            scanner,
            engine,
            pacer,
        }
    }

    /// Runs the reminder job for one reference date (normally today).
    ///
    /// # Errors
    ///
    /// Scan failures (unreadable store) abort the run; dispatch failures are
    /// isolated per reminder and only reduce the reported counts.
    pub fn run(&self, reference_date: NaiveDate) -> SureShotResult<JobSummary> {
        tracing::info!(%reference_date, "starting vaccination reminder job");
        let mut summary = JobSummary::default();

        for window in ReminderWindow::ALL {
            let pending = self.scanner.find_pending(window, reference_date)?;
            tracing::info!(window = %window, found = pending.len(), "pending reminders");

            if pending.is_empty() {
                continue;
            }

            let sent = self.engine.dispatch_batch(&pending, window);
            summary.record(window, sent);

            self.pacer.pause(self.cfg.batch_delay());
        }

        tracing::info!(total = summary.total(), "vaccination reminder job completed");
        Ok(summary)
    }
}
