// libs/triage-cell/src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Emergency,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Moderate => write!(f, "moderate"),
            Severity::High => write!(f, "high"),
            Severity::Emergency => write!(f, "emergency"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Routine,
    Urgent,
    Immediate,
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyLevel::Routine => write!(f, "routine"),
            UrgencyLevel::Urgent => write!(f, "urgent"),
            UrgencyLevel::Immediate => write!(f, "immediate"),
        }
    }
}

/// Structured output of one triage classification. Produced fresh per request,
/// never persisted on its own; it attaches to an appointment as
/// `triage_notes` / `ai_recommendation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageVerdict {
    pub severity: Severity,
    pub advice: String,
    pub needs_appointment: bool,
    pub urgency: UrgencyLevel,
    pub department: String,
}

impl TriageVerdict {
    /// Safe default applied whenever the classifier fails or times out.
    /// Loss of the AI classifier must never block booking.
    pub fn fallback() -> Self {
        Self {
            severity: Severity::Moderate,
            advice: "Please consult with a healthcare provider.".to_string(),
            needs_appointment: true,
            urgency: UrgencyLevel::Routine,
            department: "General Medicine".to_string(),
        }
    }

    /// One-line summary stored as the appointment's triage notes.
    pub fn summary(&self) -> String {
        format!(
            "Severity: {}. Urgency: {}. Recommended department: {}.",
            self.severity, self.urgency, self.department
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TriageRequest {
    pub symptoms: String,
    pub patient_name: String,
    pub patient_phone: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),
}
