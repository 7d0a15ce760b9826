//! Constants used throughout the SureShot core crate.
//!
//! This module contains all path/filename constants and dispatch tuning
//! defaults to ensure consistency across the codebase and make maintenance
//! easier.

/// Default directory for schedule data storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "sureshot_data";

/// Directory name for per-subject record storage.
pub const SUBJECTS_DIR_NAME: &str = "subjects";

/// Directory name for the file-backed notification outbox.
pub const OUTBOX_DIR_NAME: &str = "outbox";

/// Filename for the vaccine catalogue document.
pub const CATALOG_FILENAME: &str = "catalog.json";

/// Filename for a subject's profile document.
pub const SUBJECT_FILENAME: &str = "subject.json";

/// Filename for a subject's dose schedule document.
pub const SCHEDULE_FILENAME: &str = "schedule.json";

/// Filename for a subject's reminder entries document.
pub const REMINDERS_FILENAME: &str = "reminders.json";

/// Number of reminders processed per dispatch batch.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Pacing delay after each reminder send, in milliseconds.
pub const DEFAULT_SEND_DELAY_MS: u64 = 500;

/// Pacing delay between dispatch batches, in milliseconds.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 1000;
