//! # SureShot Core
//!
//! Core business logic for the SureShot baby-vaccination tracking system:
//!
//! - Vaccine catalogue seeding and lookup
//! - Per-subject dose schedule generation anchored to a birth date
//! - Reminder planning (30/15/7/1-day windows) and pending-reminder scanning
//! - Batched, rate-paced reminder dispatch over e-mail and SMS
//! - Dose administration with best-effort confirmation notifications
//!
//! Records are persisted as JSON documents in a sharded directory layout under
//! the configured data directory (see [`store`]).
//!
//! **No transport concerns**: HTTP servers, authentication, or provider
//! integrations belong to the embedding system. Channel clients are consumed
//! through the [`dispatch::EmailChannel`] and [`dispatch::SmsChannel`] traits.

pub mod administer;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod outbox;
pub mod reminder;
pub mod scanner;
pub mod schedule;
pub mod store;
pub mod subject;
mod uuid;

pub use crate::uuid::RecordId;
pub use error::{SureShotError, SureShotResult};
pub use sureshot_types::{ContactError, EmailAddress, MobileNumber, NonEmptyText, TextError};

pub use administer::AdministrationHandler;
pub use catalog::{CatalogService, VaccineDefinition};
pub use config::CoreConfig;
pub use dispatch::{
    ChannelError, DispatchEngine, EmailChannel, JobSummary, Pacer, ReminderJob, SmsChannel,
};
pub use reminder::{ReminderEntry, ReminderPlanner, ReminderWindow};
pub use scanner::ReminderScanner;
pub use schedule::{DoseRecord, ScheduleGenerator};
pub use store::ScheduleStore;
pub use subject::{ContactProfile, NewSubject, Registration, SubjectProfile, SubjectService};
