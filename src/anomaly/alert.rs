//! Alert events and notification sinks.

use std::fmt;

use tracing::info;

/// Which detector produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    Loitering,
    Interaction,
    ClassCount,
}

/// An alert handed to the notification collaborator.
///
/// Receivers must only rely on `message`; the other fields are for
/// in-process consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub message: String,
    pub kind: AnomalyKind,
    pub subject_id: String,
    pub timestamp: f64,
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Severity bucket a receiver infers from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertCategory {
    Weapon,
    Interaction,
    Anomaly,
    General,
}

impl AlertCategory {
    /// Classify a message by case-insensitive substring matching.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("gun detected") {
            AlertCategory::Weapon
        } else if lower.contains("person with cell phone detected") {
            AlertCategory::Interaction
        } else if lower.contains("anomaly detected") {
            AlertCategory::Anomaly
        } else {
            AlertCategory::General
        }
    }

    /// Subject line for outbound notifications.
    pub fn subject(&self) -> &'static str {
        match self {
            AlertCategory::Weapon => "Gun Detection Alert",
            AlertCategory::Interaction => "Person with Cell Phone Alert",
            AlertCategory::Anomaly => "Anomaly Detection Alert",
            AlertCategory::General => "Security Alert",
        }
    }

    /// Whether receivers escalate this category (e.g. by email).
    pub fn is_escalated(&self) -> bool {
        !matches!(self, AlertCategory::General)
    }
}

/// Receiver of alert events (console, log file, email, UI...).
pub trait AlertSink {
    fn alert(&mut self, event: &AlertEvent);
}

/// Logs every alert through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn alert(&mut self, event: &AlertEvent) {
        let category = AlertCategory::classify(&event.message);
        info!(
            kind = ?event.kind,
            category = ?category,
            subject = %event.subject_id,
            "{}",
            event.message
        );
    }
}

/// Buffers alerts in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub events: Vec<AlertEvent>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<AlertEvent> {
        std::mem::take(&mut self.events)
    }
}

impl AlertSink for CollectingSink {
    fn alert(&mut self, event: &AlertEvent) {
        self.events.push(event.clone());
    }
}

impl<S: AlertSink + ?Sized> AlertSink for Box<S> {
    fn alert(&mut self, event: &AlertEvent) {
        (**self).alert(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(AlertCategory::classify("GUN DETECTED near door"), AlertCategory::Weapon);
        assert_eq!(
            AlertCategory::classify("ALERT: Person with cell phone detected at Lobby"),
            AlertCategory::Interaction
        );
        assert_eq!(
            AlertCategory::classify("Anomaly detected: loitering"),
            AlertCategory::Anomaly
        );
        assert_eq!(
            AlertCategory::classify("Loitering detected: 3 in flag_room for more than 10 seconds."),
            AlertCategory::General
        );
    }

    #[test]
    fn test_subject_lines() {
        assert_eq!(AlertCategory::Interaction.subject(), "Person with Cell Phone Alert");
        assert!(!AlertCategory::General.is_escalated());
        assert!(AlertCategory::Weapon.is_escalated());
    }

    #[test]
    fn test_collecting_sink() {
        let mut sink = CollectingSink::new();
        let event = AlertEvent {
            message: "hello".to_string(),
            kind: AnomalyKind::ClassCount,
            subject_id: "person".to_string(),
            timestamp: 1.0,
        };

        sink.alert(&event);
        LogSink.alert(&event);

        assert_eq!(sink.drain(), vec![event]);
        assert!(sink.events.is_empty());
    }
}
