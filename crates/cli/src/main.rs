use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use sureshot_core::{
    AdministrationHandler, CatalogService, CoreConfig, NewSubject, RecordId, ReminderJob,
    ScheduleStore, SubjectService,
    constants::DEFAULT_DATA_DIR,
    outbox::{OutboxEmailChannel, OutboxSmsChannel},
};
use sureshot_types::{EmailAddress, MobileNumber, NonEmptyText};

#[derive(Parser)]
#[command(name = "sureshot")]
#[command(about = "SureShot baby vaccination tracker CLI")]
struct Cli {
    /// Data directory (defaults to $SURESHOT_DATA_DIR, then ./sureshot_data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the built-in vaccine catalogue
    SeedCatalog,
    /// List the vaccine catalogue
    Catalog,
    /// Register a subject and generate their vaccination schedule
    Register {
        /// Baby's name
        baby_name: String,
        /// Parent/guardian name
        guardian_name: String,
        /// Birth date (YYYY-MM-DD)
        birth_date: String,
        /// Guardian e-mail address
        #[arg(long)]
        email: Option<String>,
        /// Guardian mobile number with country code (e.g. +919876543210)
        #[arg(long)]
        mobile: Option<String>,
    },
    /// Show a subject's dose schedule
    Schedule {
        /// Subject id
        subject_id: String,
    },
    /// Fill schedule gaps for an existing subject (new catalogue entries,
    /// interrupted registration)
    Regenerate {
        /// Subject id
        subject_id: String,
    },
    /// Run the reminder job once
    RunReminders {
        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a dose as administered
    Administer {
        /// Dose record id
        dose_record_id: String,
        /// Administering clinician id
        clinician_id: String,
        /// Administration date (YYYY-MM-DD)
        administered_date: String,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },
}

fn parse_date(input: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    Ok(NaiveDate::parse_from_str(input, "%Y-%m-%d")?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .or_else(|| std::env::var("SURESHOT_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let cfg = Arc::new(CoreConfig::new(data_dir));
    let store = Arc::new(ScheduleStore::new(cfg.clone()));

    match cli.command {
        Some(Commands::SeedCatalog) => {
            let created = CatalogService::new(store).seed_builtin()?;
            println!("Seeded {} new vaccine definitions.", created);
        }
        Some(Commands::Catalog) => {
            let definitions = CatalogService::new(store).list()?;
            if definitions.is_empty() {
                println!("Catalogue is empty. Run `sureshot seed-catalog` first.");
            } else {
                for def in definitions {
                    println!(
                        "{}: {} ({} dose{}, first at {} days{})",
                        def.name,
                        def.disease_prevented,
                        def.total_doses,
                        if def.total_doses == 1 { "" } else { "s" },
                        def.age_offset_days,
                        if def.mandatory { ", mandatory" } else { "" },
                    );
                }
            }
        }
        Some(Commands::Register {
            baby_name,
            guardian_name,
            birth_date,
            email,
            mobile,
        }) => {
            let registration = SubjectService::new(store).register(NewSubject {
                baby_name: NonEmptyText::new(&baby_name)?,
                guardian_name: NonEmptyText::new(&guardian_name)?,
                email: email.map(EmailAddress::parse).transpose()?,
                mobile: mobile.map(MobileNumber::parse).transpose()?,
                birth_date: parse_date(&birth_date)?,
            })?;
            println!(
                "Registered subject {} with {} dose records and {} reminder entries.",
                registration.subject_id, registration.doses_created, registration.reminders_created,
            );
        }
        Some(Commands::Schedule { subject_id }) => {
            let subject_id = RecordId::parse(&subject_id)?;
            let today = Local::now().date_naive();
            let mut records = store.dose_records(&subject_id)?;
            records.sort_by_key(|r| (r.due_date, r.vaccine_name.as_str().to_owned()));

            if records.is_empty() {
                println!("No schedule found for subject {}.", subject_id);
            }
            for record in records {
                let status = if record.administered {
                    "administered"
                } else if record.is_overdue(today) {
                    "OVERDUE"
                } else {
                    "due"
                };
                println!(
                    "{}  {} dose {}  {}  [{}]",
                    record.id,
                    record.vaccine_name,
                    record.dose_number,
                    record.due_date.date_naive(),
                    status,
                );
            }
        }
        Some(Commands::Regenerate { subject_id }) => {
            let outcome =
                SubjectService::new(store).regenerate(&RecordId::parse(&subject_id)?)?;
            println!(
                "Added {} dose records and {} reminder entries for subject {}.",
                outcome.doses_created, outcome.reminders_created, outcome.subject_id,
            );
        }
        Some(Commands::RunReminders { date }) => {
            let reference_date = match date {
                Some(raw) => parse_date(&raw)?,
                None => Local::now().date_naive(),
            };
            let job = ReminderJob::new(
                cfg.clone(),
                store,
                Arc::new(OutboxEmailChannel::new(cfg.clone())),
                Arc::new(OutboxSmsChannel::new(cfg.clone())),
            );
            let summary = job.run(reference_date)?;
            println!(
                "Reminders sent: 30 days {}, 15 days {}, 7 days {}, 1 day {} (total {}).",
                summary.thirty_days,
                summary.fifteen_days,
                summary.seven_days,
                summary.one_day,
                summary.total(),
            );
        }
        Some(Commands::Administer {
            dose_record_id,
            clinician_id,
            administered_date,
            notes,
        }) => {
            let handler = AdministrationHandler::new(
                store,
                Arc::new(OutboxEmailChannel::new(cfg.clone())),
                Arc::new(OutboxSmsChannel::new(cfg.clone())),
            );
            let record = handler.administer(
                &RecordId::parse(&dose_record_id)?,
                &RecordId::parse(&clinician_id)?,
                parse_date(&administered_date)?,
                notes,
            )?;
            println!(
                "Administered {} dose {} for subject {}.",
                record.vaccine_name, record.dose_number, record.subject_id,
            );
        }
        None => {
            println!("No command given. Try `sureshot --help`.");
        }
    }

    Ok(())
}
