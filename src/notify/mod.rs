//! Delivery of open-section notifications.

pub mod join;

use async_trait::async_trait;

use crate::data::models::{Course, CourseSection, Recipient, TBA};

pub use join::{JoinNotifier, JoinOptions};

/// First line of every notification.
pub const MESSAGE_HEADER: &str = "Found New Open Course Sections!:";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification transport is not configured: {0} is missing")]
    NotConfigured(&'static str),
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("Notification request failed")]
    Request(#[source] reqwest_middleware::Error),
    #[error("Notification endpoint returned status {0}")]
    Status(u16),
    #[error("Failed to read notification response")]
    Body(#[source] reqwest::Error),
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Sends a text message to a recipient.
///
/// Success or failure is known when the call returns.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &Recipient, message: &str) -> Result<(), NotifyError>;
}

/// `"{code} {level} - {topic} ({instructors})"`.
///
/// Instructor names are de-duplicated keeping first-appearance order; an empty
/// list is shown as `TBA`.
pub fn format_section_line(course: &Course, section: &CourseSection, instructors: &[String]) -> String {
    let mut unique: Vec<&str> = Vec::with_capacity(instructors.len());
    for name in instructors {
        if !unique.contains(&name.as_str()) {
            unique.push(name);
        }
    }

    let instructors = if unique.is_empty() {
        TBA.to_string()
    } else {
        unique.join(", ")
    };
    format!(
        "{} {} - {} ({instructors})",
        course.code, course.level, section.topic
    )
}

/// Header plus one line per section, or `None` when there is nothing to report.
pub fn format_message(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    Some(format!("{MESSAGE_HEADER}\n{}", lines.join("\n")))
}
