//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during scheduling or dispatch, which can lead to inconsistent behaviour in multi-threaded
//! runtimes and test harnesses.

use crate::constants::{
    CATALOG_FILENAME, DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE, DEFAULT_SEND_DELAY_MS,
    OUTBOX_DIR_NAME, SUBJECTS_DIR_NAME,
};
use crate::error::{SureShotError, SureShotResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    batch_size: usize,
    send_delay: Duration,
    batch_delay: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig` with dispatch pacing defaults
    /// (batch size 20, 0.5s between sends, 1s between batches).
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            batch_size: DEFAULT_BATCH_SIZE,
            send_delay: Duration::from_millis(DEFAULT_SEND_DELAY_MS),
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
        }
    }

    /// Create a `CoreConfig` with explicit dispatch tuning.
    ///
    /// # Errors
    ///
    /// Returns `SureShotError::InvalidInput` if `batch_size` is zero.
    pub fn with_dispatch_tuning(
        data_dir: PathBuf,
        batch_size: usize,
        send_delay: Duration,
        batch_delay: Duration,
    ) -> SureShotResult<Self> {
        if batch_size == 0 {
            return Err(SureShotError::InvalidInput(
                "batch_size must be at least 1".into(),
            ));
        }

        Ok(Self {
            data_dir,
            batch_size,
            send_delay,
            batch_delay,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn subjects_dir(&self) -> PathBuf {
        self.data_dir.join(SUBJECTS_DIR_NAME)
    }

    pub fn outbox_dir(&self) -> PathBuf {
        self.data_dir.join(OUTBOX_DIR_NAME)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(CATALOG_FILENAME)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn send_delay(&self) -> Duration {
        self.send_delay
    }

    pub fn batch_delay(&self) -> Duration {
        self.batch_delay
    }
}

/// Parse a batch size from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns the default batch size.
pub fn batch_size_from_env_value(value: Option<String>) -> SureShotResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(raw) = value else {
        return Ok(DEFAULT_BATCH_SIZE);
    };

    let parsed: usize = raw
        .parse()
        .map_err(|_| SureShotError::InvalidInput(format!("invalid batch size: '{}'", raw)))?;

    if parsed == 0 {
        return Err(SureShotError::InvalidInput(
            "batch size must be at least 1".into(),
        ));
    }

    Ok(parsed)
}

/// Parse a millisecond delay from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns `default_ms`.
pub fn delay_from_env_value(value: Option<String>, default_ms: u64) -> SureShotResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(raw) = value else {
        return Ok(Duration::from_millis(default_ms));
    };

    let parsed: u64 = raw
        .parse()
        .map_err(|_| SureShotError::InvalidInput(format!("invalid delay (ms): '{}'", raw)))?;

    Ok(Duration::from_millis(parsed))
}
