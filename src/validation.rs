use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

use crate::models::{ItemFields, TransactionFields};

pub const TITLE_MIN_CHARS: usize = 2;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const MAX_REMINDERS: usize = 5;
/// Longest lead time a reminder may have.
pub const MAX_REMINDER_LEAD_DAYS: i64 = 365;
pub const TRANSACTION_DESCRIPTION_MIN_CHARS: usize = 2;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-']+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
        .expect("valid email regex")
});

/// One violated field-level rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every rule a submitted record violated, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join_violations(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// `Ok(())` when there is nothing to report.
    pub fn from_violations(violations: Vec<FieldViolation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.violations.iter().map(|v| v.field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 254 && EMAIL_RE.is_match(value)
}

/// Collects every rule `fields` violates. Expects normalized fields.
pub fn item_violations(fields: &ItemFields) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    let title_len = fields.title.chars().count();
    if title_len < TITLE_MIN_CHARS {
        violations.push(FieldViolation::new(
            "title",
            format!("title must be at least {} characters", TITLE_MIN_CHARS),
        ));
    } else if title_len > TITLE_MAX_CHARS {
        violations.push(FieldViolation::new(
            "title",
            format!("title must be at most {} characters", TITLE_MAX_CHARS),
        ));
    }

    if let Some(description) = &fields.description {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            violations.push(FieldViolation::new(
                "description",
                format!(
                    "description must be at most {} characters",
                    DESCRIPTION_MAX_CHARS
                ),
            ));
        }
    }

    match &fields.email {
        Some(email) if !is_valid_email(email) => {
            violations.push(FieldViolation::new(
                "email",
                format!("'{}' is not a valid email address", email),
            ));
        }
        None if !fields.reminders.is_empty() => {
            violations.push(FieldViolation::new(
                "email",
                "a valid email address is required to set reminders",
            ));
        }
        _ => {}
    }

    if fields.reminders.len() > MAX_REMINDERS {
        violations.push(FieldViolation::new(
            "reminders",
            format!("you can add a maximum of {} reminders", MAX_REMINDERS),
        ));
    }
    if let Some(pos) = fields.reminders.iter().position(|r| r.value == 0) {
        violations.push(FieldViolation::new(
            "reminders",
            format!("reminder {} must be at least 1", pos + 1),
        ));
    }
    let max_lead = Duration::days(MAX_REMINDER_LEAD_DAYS);
    if let Some(pos) = fields.reminders.iter().position(|r| r.offset() > max_lead) {
        violations.push(FieldViolation::new(
            "reminders",
            format!(
                "reminder {} is more than {} days before the due date",
                pos + 1,
                MAX_REMINDER_LEAD_DAYS
            ),
        ));
    }

    violations
}

pub fn transaction_violations(fields: &TransactionFields) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if fields.description.trim().chars().count() < TRANSACTION_DESCRIPTION_MIN_CHARS {
        violations.push(FieldViolation::new(
            "description",
            format!(
                "description must be at least {} characters",
                TRANSACTION_DESCRIPTION_MIN_CHARS
            ),
        ));
    }
    if !fields.amount.is_positive() {
        violations.push(FieldViolation::new("amount", "amount must be positive"));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ItemCategory, Money, Reminder, ReminderUnit, TransactionCategory, TransactionType,
    };
    use chrono::{TimeZone, Utc};

    fn fields(title: &str) -> ItemFields {
        ItemFields::new(
            title,
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            ItemCategory::Work,
        )
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("x@y.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("x@y"));
        assert!(!is_valid_email("@y.com"));
        assert!(!is_valid_email("x y@z.com"));
        assert!(!is_valid_email("x@-y.com"));
    }

    #[test]
    fn title_bounds_are_inclusive() {
        assert!(item_violations(&fields("ab")).is_empty());
        assert!(item_violations(&fields(&"a".repeat(100))).is_empty());
        assert_eq!(item_violations(&fields("a"))[0].field, "title");
        assert_eq!(item_violations(&fields(&"a".repeat(101)))[0].field, "title");
    }

    #[test]
    fn reports_every_violation_not_just_the_first() {
        let mut f = fields("a");
        f.description = Some("d".repeat(501));
        f.reminders = vec![Reminder::new(0, ReminderUnit::Days); 6];

        let fields: Vec<&str> = item_violations(&f).iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec!["title", "description", "email", "reminders", "reminders"]
        );
    }

    #[test]
    fn present_email_is_checked_even_without_reminders() {
        let mut f = fields("Lunch");
        f.email = Some("not-an-email".to_string());
        let violations = item_violations(&f);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "email");
    }

    #[test]
    fn transaction_rules() {
        let ok = TransactionFields {
            description: "Textbook".to_string(),
            amount: Money::from_cents(8550),
            kind: TransactionType::Expense,
            category: TransactionCategory::Student,
        };
        assert!(transaction_violations(&ok).is_empty());

        let bad = TransactionFields {
            description: "x".to_string(),
            amount: Money::ZERO,
            ..ok
        };
        let fields: Vec<&str> = transaction_violations(&bad).iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["description", "amount"]);
    }

    #[test]
    fn error_display_lists_all_fields() {
        let err = ValidationError::from_violations(vec![
            FieldViolation::new("title", "too short"),
            FieldViolation::new("email", "missing"),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: title: too short; email: missing"
        );
        assert!(err.has_field("email"));
    }
}
