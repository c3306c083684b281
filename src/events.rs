//! Payloads for the two downstream sinks.
//!
//! Handlers emit [`TaskEvent`]s to the task-creation channel and
//! [`ChatNotification`]s to the chat channel. Both travel inside an [`OutputEvent`]
//! envelope that the event transport of the hosting runtime understands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type and default subject of task-creation events.
pub const TASK_EVENT_TYPE: &str = "create_task_event";

/// Event type and default subject of chat notification events.
pub const CHAT_EVENT_TYPE: &str = "send_telegram_message_event";

/// Schema version written into every envelope.
pub const DATA_VERSION: &str = "1.0";

/// Request to create a reminder task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Task title.
    pub title: String,
    /// Free-form task notes.
    pub notes: String,
}

impl TaskEvent {
    /// Creates a task event.
    #[must_use]
    pub fn new(title: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: notes.into(),
        }
    }
}

/// Chat message for the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatNotification {
    /// Message text.
    pub message: String,
    /// Optional subject used as the envelope subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl ChatNotification {
    /// Creates a notification without subject.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            subject: None,
        }
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// Envelope carrying a payload to one of the sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEvent<T> {
    /// Random event id.
    pub id: Uuid,
    /// Event subject.
    pub subject: String,
    /// Event type the sink subscribes to.
    pub event_type: String,
    /// Creation time.
    pub event_time: DateTime<Utc>,
    /// Payload schema version.
    pub data_version: String,
    /// Payload.
    pub data: T,
}

impl<T> OutputEvent<T> {
    /// Wraps `data` in a new envelope stamped with `event_time`.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        event_type: impl Into<String>,
        data: T,
        event_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            event_type: event_type.into(),
            event_time,
            data_version: DATA_VERSION.to_owned(),
            data,
        }
    }
}

impl OutputEvent<TaskEvent> {
    /// Wraps a task event, stamped now.
    #[must_use]
    pub fn task(task: TaskEvent) -> Self {
        Self::new(TASK_EVENT_TYPE, TASK_EVENT_TYPE, task, Utc::now())
    }
}

impl OutputEvent<ChatNotification> {
    /// Wraps a chat notification, stamped now. The notification's subject, if any,
    /// becomes the envelope subject.
    #[must_use]
    pub fn chat(notification: ChatNotification) -> Self {
        let subject = notification
            .subject
            .clone()
            .unwrap_or_else(|| CHAT_EVENT_TYPE.to_owned());
        Self::new(subject, CHAT_EVENT_TYPE, notification, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_task_envelope() {
        let event = OutputEvent::task(TaskEvent::new("Paket abholen", "notes"));
        assert_eq!(event.subject, TASK_EVENT_TYPE);
        assert_eq!(event.event_type, TASK_EVENT_TYPE);
        assert_eq!(event.data_version, "1.0");
        assert_eq!(event.data.title, "Paket abholen");
    }

    #[test]
    fn test_chat_envelope_subject() {
        let plain = OutputEvent::chat(ChatNotification::new("hello"));
        assert_eq!(plain.subject, CHAT_EVENT_TYPE);

        let with_subject =
            OutputEvent::chat(ChatNotification::new("hello").with_subject("dhl_mail_to_task"));
        assert_eq!(with_subject.subject, "dhl_mail_to_task");
        assert_eq!(with_subject.event_type, CHAT_EVENT_TYPE);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = OutputEvent::task(TaskEvent::new("a", ""));
        let b = OutputEvent::task(TaskEvent::new("a", ""));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_json_shape() {
        let time = Utc.with_ymd_and_hms(2025, 12, 1, 8, 30, 0).unwrap();
        let event = OutputEvent::new("s", "t", TaskEvent::new("Paket abholen", "n"), time);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["eventType"], "t");
        assert_eq!(json["dataVersion"], "1.0");
        assert_eq!(json["eventTime"], "2025-12-01T08:30:00Z");
        assert_eq!(json["data"], serde_json::json!({ "title": "Paket abholen", "notes": "n" }));
        assert!(json["id"].is_string());
    }

    #[test]
    fn test_chat_without_subject_omits_field() {
        let json = serde_json::to_value(ChatNotification::new("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "hi" }));
    }
}
