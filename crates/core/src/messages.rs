//! Notification content for reminders and administration confirmations.
//!
//! Each reminder window carries its own urgency tier: the e-mail subject line,
//! the accent colour used in the HTML body, and the SMS prefix all escalate as
//! the due date approaches.

use crate::reminder::ReminderWindow;
use crate::schedule::DoseRecord;
use crate::subject::ContactProfile;
use chrono::{DateTime, Utc};

/// Per-window message styling.
pub struct ReminderTemplate {
    pub email_subject: &'static str,
    pub accent_colour: &'static str,
    pub sms_prefix: &'static str,
}

static THIRTY_DAY_TEMPLATE: ReminderTemplate = ReminderTemplate {
    email_subject: "Vaccination Reminder - 30 Days Notice",
    accent_colour: "#2c5aa0",
    sms_prefix: "Reminder:",
};

static FIFTEEN_DAY_TEMPLATE: ReminderTemplate = ReminderTemplate {
    email_subject: "Important: Vaccination Due in 15 Days",
    accent_colour: "#fd7e14",
    sms_prefix: "Important:",
};

static SEVEN_DAY_TEMPLATE: ReminderTemplate = ReminderTemplate {
    email_subject: "Urgent: Vaccination Due This Week",
    accent_colour: "#dc3545",
    sms_prefix: "URGENT:",
};

static ONE_DAY_TEMPLATE: ReminderTemplate = ReminderTemplate {
    email_subject: "Tomorrow: Vaccination Appointment Due",
    accent_colour: "#dc3545",
    sms_prefix: "TOMORROW:",
};

/// Returns the styling for a reminder window.
pub fn template_for(window: ReminderWindow) -> &'static ReminderTemplate {
    match window {
        ReminderWindow::ThirtyDays => &THIRTY_DAY_TEMPLATE,
        ReminderWindow::FifteenDays => &FIFTEEN_DAY_TEMPLATE,
        ReminderWindow::SevenDays => &SEVEN_DAY_TEMPLATE,
        ReminderWindow::OneDay => &ONE_DAY_TEMPLATE,
    }
}

/// Formats a due date for human-facing messages, e.g. "June 01, 2025".
pub fn format_due_date(due_date: DateTime<Utc>) -> String {
    due_date.format("%B %d, %Y").to_string()
}

/// Subject line for a reminder e-mail.
pub fn reminder_email_subject(window: ReminderWindow, contact: &ContactProfile) -> String {
    format!(
        "{} - {}",
        template_for(window).email_subject,
        contact.display_name
    )
}

/// HTML body for a reminder e-mail.
pub fn reminder_email_body(
    window: ReminderWindow,
    contact: &ContactProfile,
    vaccine_name: &str,
    due_date: DateTime<Utc>,
) -> String {
    let template = template_for(window);
    let days_remaining = window.days_before();
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <h2 style="color: {colour};">SureShot - Vaccination Reminder</h2>
      <p>Dear {guardian},</p>
      <p>This is a reminder that <strong>{baby}</strong> has an upcoming vaccination:</p>
      <div style="background-color: #f8f9fa; padding: 20px; border-left: 4px solid {colour}; margin: 20px 0;">
        <h3 style="margin: 0 0 10px 0; color: {colour};">{vaccine}</h3>
        <p style="margin: 5px 0;"><strong>Due Date:</strong> {due}</p>
        <p style="margin: 5px 0;"><strong>Days Remaining:</strong> {days} days</p>
      </div>
      <p>Please schedule an appointment with your healthcare provider to ensure {baby} receives this vaccination on time.</p>
      <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">
      <p style="font-size: 12px; color: #666;">
        This is an automated reminder from SureShot. Please do not reply to this email.
      </p>
    </div>
  </body>
</html>"#,
        colour = template.accent_colour,
        guardian = contact.guardian_name,
        baby = contact.display_name,
        vaccine = vaccine_name,
        due = format_due_date(due_date),
        days = days_remaining,
    )
}

/// Text body for a reminder SMS.
pub fn reminder_sms_body(
    window: ReminderWindow,
    contact: &ContactProfile,
    vaccine_name: &str,
    due_date: DateTime<Utc>,
) -> String {
    let days_remaining = window.days_before();
    let plural = if days_remaining == 1 { "" } else { "s" };
    format!(
        "{prefix} {baby} needs {vaccine} vaccination in {days} day{plural} ({due}). Please schedule appointment. -SureShot",
        prefix = template_for(window).sms_prefix,
        baby = contact.display_name,
        vaccine = vaccine_name,
        days = days_remaining,
        due = format_due_date(due_date),
    )
}

fn dose_info(record: &DoseRecord) -> String {
    if record.dose_number > 1 {
        format!(" Dose {}", record.dose_number)
    } else {
        String::new()
    }
}

/// Subject line for an administration confirmation e-mail.
pub fn confirmation_email_subject(contact: &ContactProfile) -> String {
    format!("Vaccination Completed - {} - SureShot", contact.display_name)
}

/// HTML body for an administration confirmation e-mail.
pub fn confirmation_email_body(contact: &ContactProfile, record: &DoseRecord) -> String {
    let administered = record
        .administered_date
        .map(|date| date.format("%B %d, %Y").to_string())
        .unwrap_or_default();
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <h2 style="color: #28a745;">SureShot - Vaccination Completed</h2>
      <p>Dear {guardian},</p>
      <p>Great news! <strong>{baby}</strong> has successfully received their vaccination:</p>
      <div style="background-color: #f8f9fa; padding: 20px; border-left: 4px solid #28a745; margin: 20px 0;">
        <h3 style="margin: 0 0 10px 0; color: #28a745;">{vaccine}{dose}</h3>
        <p style="margin: 5px 0;"><strong>Date Administered:</strong> {administered}</p>
      </div>
      <p>Monitor {baby} for mild side effects like low-grade fever or soreness at the injection site; these usually resolve within 24-48 hours. Contact your healthcare provider if you notice any severe reactions.</p>
      <p>This vaccination has been recorded in {baby}'s vaccination history.</p>
      <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">
      <p style="font-size: 12px; color: #666;">
        This is an automated message from SureShot. Please do not reply to this email.
      </p>
    </div>
  </body>
</html>"#,
        guardian = contact.guardian_name,
        baby = contact.display_name,
        vaccine = record.vaccine_name,
        dose = dose_info(record),
        administered = administered,
    )
}

/// Text body for an administration confirmation SMS.
pub fn confirmation_sms_body(contact: &ContactProfile, record: &DoseRecord) -> String {
    let administered = record
        .administered_date
        .map(|date| date.format("%B %d, %Y").to_string())
        .unwrap_or_default();
    format!(
        "Great news {guardian}! {baby} has successfully received {vaccine}{dose} vaccination on {administered}. Monitor for mild side effects and keep them comfortable. -SureShot",
        guardian = contact.guardian_name,
        baby = contact.display_name,
        vaccine = record.vaccine_name,
        dose = dose_info(record),
        administered = administered,
    )
}
