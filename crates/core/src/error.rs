//! Error taxonomy for the vaccination scheduling core.
//!
//! The variants split into three groups:
//! - configuration defects (`EmptyCatalog`, `InvalidInput`): surfaced, never retried
//! - client errors (`*NotFound`, `AlreadyAdministered`, `SubjectAlreadyExists`):
//!   surfaced to the caller
//! - storage failures (file and serde variants): propagate and abort the operation
//!
//! Channel send failures are deliberately *not* represented here: they are
//! recovered locally inside the dispatch engine (the other channel is still
//! attempted, the batch continues) and use [`crate::dispatch::ChannelError`].

#[derive(Debug, thiserror::Error)]
pub enum SureShotError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("vaccine catalogue is empty; seed the catalogue before generating schedules")]
    EmptyCatalog,
    #[error("subject not found: {0}")]
    SubjectNotFound(String),
    #[error("dose record not found: {0}")]
    DoseRecordNotFound(String),
    #[error("reminder entry not found: {0}")]
    ReminderEntryNotFound(String),
    #[error("dose record {id} was already administered on {date}")]
    AlreadyAdministered {
        id: String,
        date: chrono::NaiveDate,
    },
    #[error("a subject with id {0} already exists")]
    SubjectAlreadyExists(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
    #[error("date arithmetic overflowed computing a due date")]
    DueDateOverflow,
}

pub type SureShotResult<T> = std::result::Result<T, SureShotError>;
