//! Candidate notifications.
//!
//! Delivery is simulated: messages are written to the log and a receipt is
//! returned per channel. An SMTP or SMS provider would plug in here.

use serde::Serialize;
use tracing::info;

use crate::pipeline::models::subject_line;

const DEFAULT_SUBJECT: &str = "Document Submission Required";
const SMS_NOTICE: &str = "Document required. Please check your email for details.";
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMethod {
    Email,
    Sms,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationReceipt {
    pub sent: bool,
    pub method: NotificationMethod,
    pub recipient: String,
    pub status: &'static str,
}

pub struct NotificationService;

impl NotificationService {
    pub fn send_email(to_email: &str, subject: &str, body: &str) -> NotificationReceipt {
        info!(
            to = to_email,
            subject,
            body = %preview(body),
            "Email notification"
        );
        NotificationReceipt {
            sent: true,
            method: NotificationMethod::Email,
            recipient: to_email.to_string(),
            status: "simulated",
        }
    }

    pub fn send_sms(to_phone: &str, message: &str) -> NotificationReceipt {
        info!(to = to_phone, message = %preview(message), "SMS notification");
        NotificationReceipt {
            sent: true,
            method: NotificationMethod::Sms,
            recipient: to_phone.to_string(),
            status: "simulated",
        }
    }

    /// Sends the drafted request by email and, when a phone number is known,
    /// a short SMS pointing the candidate to their inbox.
    pub fn send_document_request(
        candidate_email: Option<&str>,
        candidate_phone: Option<&str>,
        message: &str,
    ) -> Vec<NotificationReceipt> {
        let mut receipts = Vec::new();

        if let Some(email) = candidate_email.filter(|e| !e.trim().is_empty()) {
            let subject = subject_line(message).unwrap_or(DEFAULT_SUBJECT);
            receipts.push(Self::send_email(email, subject, message));
        }

        if let Some(phone) = candidate_phone.filter(|p| !p.trim().is_empty()) {
            receipts.push(Self::send_sms(phone, SMS_NOTICE));
        }

        receipts
    }
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
