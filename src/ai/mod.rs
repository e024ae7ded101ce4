//! Typed request/response contract with the hosted text-analysis model.
//!
//! Each capability is a [`PromptTemplate`] with a serializable input and a
//! deserializable output; [`invoke_prompt_template`] does the one round trip.
//! Inference happens entirely on the other side of [`ModelClient`].

mod http;
mod templates;

pub use http::HttpModelClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::debug;

use crate::boundary::BoundaryError;
use crate::email::is_restricted_html;
use crate::models::{DraftItem, ItemCategory, Reminder};

const SERVICE: &str = "text analysis";
pub const MAX_SUGGESTED_REMINDERS: usize = 3;

/// Sends one rendered prompt and returns the model's JSON answer.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, BoundaryError>;
}

/// A named prompt whose `{{field}}` placeholders are filled from `I`.
///
/// `{{now}}`, `{{today}}` and `{{year}}` are filled from the call time.
pub struct PromptTemplate<I, O> {
    pub name: &'static str,
    pub text: &'static str,
    _types: PhantomData<fn(&I) -> O>,
}

impl<I: Serialize, O: DeserializeOwned> PromptTemplate<I, O> {
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Self {
            name,
            text,
            _types: PhantomData,
        }
    }

    pub fn render(&self, input: &I, now: DateTime<Utc>) -> Result<String, BoundaryError> {
        let value = serde_json::to_value(input)
            .map_err(|e| BoundaryError::InvalidInput(format!("{}: {}", self.name, e)))?;

        let mut rendered = self
            .text
            .replace("{{now}}", &now.to_rfc3339())
            .replace("{{today}}", &now.format("%A, %B %-d, %Y").to_string())
            .replace("{{year}}", &now.format("%Y").to_string());
        if let serde_json::Value::Object(fields) = value {
            for (name, field) in fields {
                let text = match field {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                rendered = rendered.replace(&format!("{{{{{}}}}}", name), &text);
            }
        }
        Ok(rendered)
    }
}

/// Renders `template` with `input`, calls the model once and decodes its answer.
pub async fn invoke_prompt_template<I, O, C>(
    client: &C,
    template: &PromptTemplate<I, O>,
    input: &I,
    now: DateTime<Utc>,
) -> Result<O, BoundaryError>
where
    I: Serialize + Sync,
    O: DeserializeOwned,
    C: ModelClient + ?Sized,
{
    let prompt = template.render(input, now)?;
    debug!(template = template.name, chars = prompt.len(), "invoking prompt template");
    let answer = client.generate_json(&prompt).await?;
    serde_json::from_value(answer)
        .map_err(|e| BoundaryError::malformed(SERVICE, format!("{}: {}", template.name, e)))
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectDeadlineInput {
    pub text: String,
}

/// Model verdict on whether free text mentions a deadline.
///
/// When `should_add` is false the other fields carry no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineDetection {
    pub should_add: bool,
    #[serde(default)]
    pub title: Option<String>,
    /// ISO-8601 timestamp as produced by the model.
    #[serde(default)]
    pub date: Option<String>,
    /// Free-form; not guaranteed to be an [`ItemCategory`] name.
    #[serde(default)]
    pub category: Option<String>,
}

impl DeadlineDetection {
    /// Seeds an item draft from a positive detection.
    ///
    /// Unknown categories become `Personal`; a missing or unreadable date
    /// becomes `now`.
    pub fn into_draft(self, now: DateTime<Utc>) -> Option<DraftItem> {
        if !self.should_add {
            return None;
        }
        let date = self
            .date
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or(now);
        let category = self
            .category
            .as_deref()
            .map_or(ItemCategory::Personal, ItemCategory::from_model_label);

        Some(DraftItem {
            title: self.title,
            date: Some(date),
            category: Some(category),
            ..DraftItem::default()
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestRemindersInput {
    pub title: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderSuggestion {
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateScheduleInput {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    #[serde(rename = "schedule")]
    pub schedule_markup: String,
}

/// Capabilities the rest of the crate needs from the text model.
#[async_trait]
pub trait TextAnalysisService: Send + Sync {
    async fn detect_deadline(&self, text: &str) -> Result<DeadlineDetection, BoundaryError>;

    /// One to three reminders for an item due at `date`.
    async fn suggest_reminders(
        &self,
        title: &str,
        date: DateTime<Utc>,
    ) -> Result<ReminderSuggestion, BoundaryError>;

    async fn generate_schedule(&self, query: &str) -> Result<GeneratedSchedule, BoundaryError>;
}

/// [`TextAnalysisService`] backed by prompt templates over any [`ModelClient`].
pub struct PromptedAnalysis<C> {
    client: C,
}

impl<C: ModelClient> PromptedAnalysis<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: ModelClient> TextAnalysisService for PromptedAnalysis<C> {
    async fn detect_deadline(&self, text: &str) -> Result<DeadlineDetection, BoundaryError> {
        let text = non_empty(text, "text")?;
        let input = DetectDeadlineInput {
            text: text.to_string(),
        };
        invoke_prompt_template(&self.client, &templates::DETECT_DEADLINE, &input, Utc::now()).await
    }

    async fn suggest_reminders(
        &self,
        title: &str,
        date: DateTime<Utc>,
    ) -> Result<ReminderSuggestion, BoundaryError> {
        let title = non_empty(title, "title")?;
        let input = SuggestRemindersInput {
            title: title.to_string(),
            date: date.to_rfc3339(),
        };
        let mut suggestion: ReminderSuggestion =
            invoke_prompt_template(&self.client, &templates::SUGGEST_REMINDERS, &input, Utc::now())
                .await?;

        let max_lead = chrono::Duration::days(crate::validation::MAX_REMINDER_LEAD_DAYS);
        suggestion
            .reminders
            .retain(|r| r.value > 0 && r.offset() <= max_lead);
        suggestion.reminders.truncate(MAX_SUGGESTED_REMINDERS);
        if suggestion.reminders.is_empty() {
            return Err(BoundaryError::malformed(SERVICE, "no usable reminders suggested"));
        }
        Ok(suggestion)
    }

    async fn generate_schedule(&self, query: &str) -> Result<GeneratedSchedule, BoundaryError> {
        let query = non_empty(query, "query")?;
        let input = GenerateScheduleInput {
            query: query.to_string(),
        };
        let schedule: GeneratedSchedule =
            invoke_prompt_template(&self.client, &templates::GENERATE_SCHEDULE, &input, Utc::now())
                .await?;

        if !is_restricted_html(&schedule.schedule_markup) {
            return Err(BoundaryError::malformed(
                SERVICE,
                "schedule uses markup outside p, b, br, ul and li",
            ));
        }
        Ok(schedule)
    }
}

fn non_empty<'a>(value: &'a str, name: &'static str) -> Result<&'a str, BoundaryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(BoundaryError::EmptyInput(name))
    } else {
        Ok(trimmed)
    }
}
