//! Email boundary: message shape, confirmation composition and the HTTP relay.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::boundary::{BoundaryError, http_client};
use crate::config::EmailConfig;
use crate::models::Item;

const SERVICE: &str = "email relay";
/// A bare allowed tag starting at the current `<`; attributes never match.
static ALLOWED_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)<(?:/?(?:p|b|ul|li)|br\s*/?)>").expect("valid tag regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    /// Restricted HTML, see [`is_restricted_html`].
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<SendOutcome, BoundaryError>;
}

/// True when every `<` in `body` opens a bare `p`, `b`, `ul`, `li` or `br` tag.
///
/// Attributes, comments, doctypes and processing instructions are all
/// rejected; literal `<` in text must be escaped.
pub fn is_restricted_html(body: &str) -> bool {
    body.match_indices('<')
        .all(|(start, _)| ALLOWED_TAG_RE.is_match(&body[start..]))
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// The "reminder set" confirmation for `item`, or `None` when it has no
/// email or no reminders.
pub fn confirmation_email(item: &Item) -> Option<EmailMessage> {
    let to = item.email()?;
    if item.reminders().is_empty() {
        return None;
    }

    let when = if item.has_time() {
        item.date().format("%B %-d, %Y %H:%M UTC").to_string()
    } else {
        item.date().format("%B %-d, %Y").to_string()
    };
    let reminders: String = item
        .reminders()
        .iter()
        .map(|r| format!("<li>{}</li>", r))
        .collect();

    let body = format!(
        "<p>Hi there,</p>\
         <p>This is a confirmation that you've set reminders for the following item:</p>\
         <p><b>Title:</b> {title}</p>\
         <p><b>Date:</b> {when}</p>\
         <p>You will be notified at the following times:</p>\
         <ul>{reminders}</ul>\
         <p>Regards,<br/>FlowZen</p>",
        title = escape_html(item.title()),
    );

    Some(EmailMessage {
        to: to.to_string(),
        subject: format!("Reminder Set for: {}", item.title()),
        body,
    })
}

/// Posts messages as JSON to a mail relay endpoint.
pub struct HttpEmailService {
    config: EmailConfig,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: String,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl HttpEmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

impl std::fmt::Debug for HttpEmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmailService")
            .field("relay_url", &self.config.relay_url)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send(&self, message: &EmailMessage) -> Result<SendOutcome, BoundaryError> {
        let (Some(relay_url), Some(from)) = (&self.config.relay_url, &self.config.from) else {
            return Err(BoundaryError::MissingConfig {
                service: SERVICE,
                detail: "email.relay_url and email.from must be set".to_string(),
            });
        };
        if !is_restricted_html(&message.body) {
            return Err(BoundaryError::InvalidInput(
                "email body may only use p, b, br, ul and li tags".to_string(),
            ));
        }

        let client = http_client(SERVICE, self.config.timeout())?;
        let mut request = client.post(relay_url).json(&RelayRequest {
            from: format!("FlowZen <{}>", from),
            to: &message.to,
            subject: &message.subject,
            html: &message.body,
        });
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| BoundaryError::from_reqwest(SERVICE, err))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BoundaryError::Status {
                service: SERVICE,
                status: status.as_u16(),
                message: text,
            });
        }

        info!(to = %message.to, "email sent");
        Ok(SendOutcome {
            success: true,
            message: format!("Email sent successfully to {}.", message.to),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemCategory, ItemFields, Reminder, ReminderUnit};
    use chrono::{TimeZone, Utc};

    fn item_with(email: Option<&str>, reminders: Vec<Reminder>) -> Item {
        let mut fields = ItemFields::new(
            "Pay <Electricity> Bill",
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            ItemCategory::Bill,
        );
        fields.email = email.map(str::to_string);
        fields.reminders = reminders;
        Item::new(fields).unwrap()
    }

    #[test]
    fn restricted_html_allows_only_basic_tags() {
        assert!(is_restricted_html("<p>Hi <b>there</b></p><ul><li>x</li></ul><br/>"));
        assert!(is_restricted_html("plain text"));
        assert!(!is_restricted_html("<p>ok</p><script>x</script>"));
        assert!(!is_restricted_html("<a href=\"x\">link</a>"));
        assert!(is_restricted_html("<P>a<BR />b</P>"));
    }

    #[test]
    fn restricted_html_rejects_attributes_and_markup_declarations() {
        assert!(!is_restricted_html(r#"<p onclick="alert(1)">hi</p>"#));
        assert!(!is_restricted_html(r#"<b style="x">y</b>"#));
        assert!(!is_restricted_html("<br class=x/>"));
        assert!(!is_restricted_html("<p>a<!-- note --></p>"));
        assert!(!is_restricted_html("<!DOCTYPE html><p>a</p>"));
        assert!(!is_restricted_html("<?xml version=\"1.0\"?><p>a</p>"));
        assert!(!is_restricted_html("1 < 2"));
    }

    #[test]
    fn confirmation_lists_reminders_and_escapes_title() {
        let item = item_with(
            Some("x@y.com"),
            vec![
                Reminder::new(3, ReminderUnit::Days),
                Reminder::new(2, ReminderUnit::Hours),
            ],
        );

        let email = confirmation_email(&item).unwrap();
        assert_eq!(email.to, "x@y.com");
        assert_eq!(email.subject, "Reminder Set for: Pay <Electricity> Bill");
        assert!(email.body.contains("<li>3 days before</li><li>2 hours before</li>"));
        assert!(email.body.contains("Pay &lt;Electricity&gt; Bill"));
        assert!(email.body.contains("March 1, 2025"));
        assert!(is_restricted_html(&email.body));
    }

    #[test]
    fn no_confirmation_without_reminders() {
        let item = item_with(Some("x@y.com"), Vec::new());
        assert!(confirmation_email(&item).is_none());
    }

    #[tokio::test]
    async fn relay_without_config_reports_missing_config() {
        let service = HttpEmailService::new(EmailConfig::default());
        let message = EmailMessage {
            to: "x@y.com".to_string(),
            subject: "s".to_string(),
            body: "<p>b</p>".to_string(),
        };
        let err = service.send(&message).await.unwrap_err();
        assert!(matches!(err, BoundaryError::MissingConfig { .. }));
    }
}
