use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sureshot_core::constants::{DEFAULT_BATCH_DELAY_MS, DEFAULT_DATA_DIR, DEFAULT_SEND_DELAY_MS};
use sureshot_core::outbox::{OutboxEmailChannel, OutboxSmsChannel};
use sureshot_core::{
    CatalogService, CoreConfig, JobSummary, ReminderJob, ScheduleStore, SureShotResult, config,
};

/// Main entry point for the SureShot reminder job runner.
///
/// Seeds the vaccine catalogue on startup (idempotent) and then runs the
/// reminder job on a fixed interval, dispatching due reminders through the
/// file-backed outbox channels. Subjects, schedules and administrations are
/// managed through the `sureshot` CLI or the embedding system against the
/// same data directory.
///
/// # Environment Variables
/// - `SURESHOT_DATA_DIR`: data directory (default: "sureshot_data")
/// - `SURESHOT_BATCH_SIZE`: reminders per dispatch batch (default: 20)
/// - `SURESHOT_SEND_DELAY_MS`: pacing delay between sends (default: 500)
/// - `SURESHOT_BATCH_DELAY_MS`: pacing delay between batches (default: 1000)
/// - `SURESHOT_JOB_INTERVAL_SECS`: seconds between job runs (default: 86400)
/// - `SURESHOT_RUN_ONCE`: set to "1" to run the job a single time and exit
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sureshot=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = std::env::var("SURESHOT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
    let batch_size = config::batch_size_from_env_value(std::env::var("SURESHOT_BATCH_SIZE").ok())?;
    let send_delay = config::delay_from_env_value(
        std::env::var("SURESHOT_SEND_DELAY_MS").ok(),
        DEFAULT_SEND_DELAY_MS,
    )?;
    let batch_delay = config::delay_from_env_value(
        std::env::var("SURESHOT_BATCH_DELAY_MS").ok(),
        DEFAULT_BATCH_DELAY_MS,
    )?;
    let interval_secs: u64 = std::env::var("SURESHOT_JOB_INTERVAL_SECS")
        .ok()
        .map(|raw| raw.parse())
        .transpose()?
        .unwrap_or(86_400);
    let run_once = std::env::var("SURESHOT_RUN_ONCE").is_ok_and(|v| v == "1");

    let cfg = Arc::new(CoreConfig::with_dispatch_tuning(
        data_dir,
        batch_size,
        send_delay,
        batch_delay,
    )?);
    tracing::info!("++ SureShot data directory: {}", cfg.data_dir().display());

    let store = Arc::new(ScheduleStore::new(cfg.clone()));

    let seeded = CatalogService::new(store.clone()).seed_builtin()?;
    tracing::info!("++ Catalogue ready ({} new definitions)", seeded);

    let job = ReminderJob::new(
        cfg.clone(),
        store,
        Arc::new(OutboxEmailChannel::new(cfg.clone())),
        Arc::new(OutboxSmsChannel::new(cfg.clone())),
    );

    if run_once {
        let summary = run_job(job).await?;
        tracing::info!(total = summary.total(), "single job run complete");
        return Ok(());
    }

    tracing::info!("++ Running reminder job every {}s", interval_secs);
    loop {
        match run_job(job.clone()).await {
            Ok(summary) => tracing::info!(
                thirty_days = summary.thirty_days,
                fifteen_days = summary.fifteen_days,
                seven_days = summary.seven_days,
                one_day = summary.one_day,
                total = summary.total(),
                "reminder job run complete"
            ),
            Err(e) => tracing::error!("reminder job run failed: {}", e),
        }

        tokio::time::sleep(Duration::from_secs(interval_secs)).await;
    }
}

/// Runs one job iteration on the blocking pool, since dispatch pacing blocks
/// the thread it runs on.
async fn run_job(job: ReminderJob) -> SureShotResult<JobSummary> {
    let today = chrono::Local::now().date_naive();
    tokio::task::spawn_blocking(move || job.run(today))
        .await
        .expect("reminder job task must not panic")
}
