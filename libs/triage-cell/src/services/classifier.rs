// libs/triage-cell/src/services/classifier.rs
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::models::{TriageError, TriageVerdict};

const TRIAGE_SYSTEM_PROMPT: &str = r#"You are a medical triage AI assistant for a hospital.
Your role is to:
1. Assess symptom severity (low, moderate, high, emergency)
2. Provide appropriate home care advice for minor issues
3. Recommend whether an appointment is needed
4. Be empathetic and professional

Respond in JSON format:
{
    "severity": "low|moderate|high|emergency",
    "advice": "Home care advice or immediate action needed",
    "needs_appointment": true/false,
    "urgency": "routine|urgent|immediate",
    "department": "suggested department if appointment needed"
}"#;

/// Boundary contract for symptom classification. Non-deterministic and
/// latency-bearing; callers wrap it with a timeout and never hold a store
/// lock while awaiting it.
#[async_trait]
pub trait SymptomClassifier: Send + Sync {
    async fn classify(&self, symptoms: &str) -> Result<TriageVerdict, TriageError>;
}

/// Classifier backed by the Groq OpenAI-compatible chat-completions API.
pub struct GroqClassifier {
    api_key: String,
    api_url: String,
    model: String,
    http_client: Client,
}

impl GroqClassifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_key: config.groq_api_key.clone(),
            api_url: config.groq_api_url.clone(),
            model: config.llm_model.clone(),
            http_client: Client::new(),
        }
    }

    async fn request_verdict(&self, symptoms: &str) -> Result<TriageVerdict> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": TRIAGE_SYSTEM_PROMPT },
                { "role": "user", "content": format!("Patient symptoms: {}", symptoms) }
            ],
            "temperature": 0.3,
            "max_tokens": 1024
        });

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.api_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Groq API error: {} - {}", status, error_text));
        }

        let completion: Value = response.json().await?;
        let content = completion["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid Groq response format"))?;

        let verdict: TriageVerdict = serde_json::from_str(strip_code_fences(content))
            .map_err(|e| anyhow!("Malformed triage verdict: {}", e))?;

        Ok(verdict)
    }
}

#[async_trait]
impl SymptomClassifier for GroqClassifier {
    async fn classify(&self, symptoms: &str) -> Result<TriageVerdict, TriageError> {
        if symptoms.trim().is_empty() {
            return Err(TriageError::Validation(
                "symptoms must not be empty".to_string(),
            ));
        }

        debug!("Classifying symptoms via Groq model {}", self.model);

        self.request_verdict(symptoms).await.map_err(|e| {
            error!("Symptom classification failed: {}", e);
            TriageError::ClassifierUnavailable(e.to_string())
        })
    }
}

/// Classify with a timeout, substituting the safe fallback verdict on any
/// failure. Booking never fails because the classifier did.
pub async fn classify_or_fallback(
    classifier: &dyn SymptomClassifier,
    symptoms: &str,
    timeout: Duration,
) -> TriageVerdict {
    match tokio::time::timeout(timeout, classifier.classify(symptoms)).await {
        Ok(Ok(verdict)) => verdict,
        Ok(Err(e)) => {
            warn!("Classifier failed, using fallback verdict: {}", e);
            TriageVerdict::fallback()
        }
        Err(_) => {
            warn!(
                "Classifier timed out after {}s, using fallback verdict",
                timeout.as_secs()
            );
            TriageVerdict::fallback()
        }
    }
}

/// Models sometimes wrap the JSON object in a markdown code fence.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}
