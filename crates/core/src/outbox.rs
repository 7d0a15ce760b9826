//! File-backed notification outbox.
//!
//! [`OutboxEmailChannel`] and [`OutboxSmsChannel`] implement the channel
//! collaborator traits by writing each accepted message as a JSON document
//! under `<data_dir>/outbox/`. They stand in where a real SMTP or SMS gateway
//! has not been wired up (local development, demos, and the operator CLI)
//! while keeping the dispatch path identical to production: a relay process
//! can drain the directory and hand the documents to the actual provider.
//!
//! One file per message, named `<kind>-<uuid>.json`, so concurrent writers
//! never collide.

use crate::config::CoreConfig;
use crate::dispatch::{ChannelError, EmailChannel, SmsChannel};
use crate::uuid::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use sureshot_types::{EmailAddress, MobileNumber};

/// A captured outbound e-mail.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutboxEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub queued_at: DateTime<Utc>,
}

/// A captured outbound SMS.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutboxSms {
    pub to: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
}

fn write_message<T: Serialize>(
    outbox_dir: PathBuf,
    kind: &str,
    message: &T,
) -> Result<(), ChannelError> {
    fs::create_dir_all(&outbox_dir)
        .map_err(|e| ChannelError::Send(format!("could not create outbox directory: {}", e)))?;

    let path = outbox_dir.join(format!("{}-{}.json", kind, RecordId::new()));
    let contents = serde_json::to_string_pretty(message)
        .map_err(|e| ChannelError::Send(format!("could not serialize message: {}", e)))?;
    fs::write(&path, contents)
        .map_err(|e| ChannelError::Send(format!("could not write message file: {}", e)))
}

/// E-mail channel that queues messages into the outbox directory.
#[derive(Clone)]
pub struct OutboxEmailChannel {
    cfg: Arc<CoreConfig>,
}

impl OutboxEmailChannel {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }
}

impl EmailChannel for OutboxEmailChannel {
    fn send(&self, to: &EmailAddress, subject: &str, html_body: &str) -> Result<(), ChannelError> {
        write_message(
            self.cfg.outbox_dir(),
            "email",
            &OutboxEmail {
                to: to.as_str().to_owned(),
                subject: subject.to_owned(),
                html_body: html_body.to_owned(),
                queued_at: Utc::now(),
            },
        )?;
        tracing::debug!(to = %to, subject, "queued email to outbox");
        Ok(())
    }
}

/// SMS channel that queues messages into the outbox directory.
#[derive(Clone)]
pub struct OutboxSmsChannel {
    cfg: Arc<CoreConfig>,
}

impl OutboxSmsChannel {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }
}

impl SmsChannel for OutboxSmsChannel {
    fn send(&self, to: &MobileNumber, body: &str) -> Result<(), ChannelError> {
        write_message(
            self.cfg.outbox_dir(),
            "sms",
            &OutboxSms {
                to: to.as_str().to_owned(),
                body: body.to_owned(),
                queued_at: Utc::now(),
            },
        )?;
        tracing::debug!(to = %to, "queued SMS to outbox");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn outbox_files(cfg: &CoreConfig, prefix: &str) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(cfg.outbox_dir())
            .map(|it| {
                it.flatten()
                    .map(|entry| entry.path())
                    .filter(|path| {
                        path.file_name()
                            .and_then(|os| os.to_str())
                            .is_some_and(|name| name.starts_with(prefix))
                    })
                    .collect()
            })
            .unwrap_or_default();
        files.sort();
        files
    }

    #[test]
    fn email_messages_land_as_json_documents() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = Arc::new(CoreConfig::new(temp_dir.path().to_path_buf()));
        let channel = OutboxEmailChannel::new(cfg.clone());

        channel
            .send(
                &EmailAddress::parse("priya@example.com").unwrap(),
                "Vaccination Reminder",
                "<html></html>",
            )
            .expect("send should succeed");

        let files = outbox_files(&cfg, "email-");
        assert_eq!(files.len(), 1);

        let message: OutboxEmail =
            serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
        assert_eq!(message.to, "priya@example.com");
        assert_eq!(message.subject, "Vaccination Reminder");
    }

    #[test]
    fn sms_messages_get_their_own_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = Arc::new(CoreConfig::new(temp_dir.path().to_path_buf()));
        let channel = OutboxSmsChannel::new(cfg.clone());

        let number = MobileNumber::parse("+919876543210").unwrap();
        channel.send(&number, "first").expect("send should succeed");
        channel.send(&number, "second").expect("send should succeed");

        let files = outbox_files(&cfg, "sms-");
        assert_eq!(files.len(), 2, "each message is its own document");
    }
}
