use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::validation::{self, FieldViolation, ValidationError};

pub type ItemId = Uuid;
pub type TransactionId = Uuid;

/// Closed set of item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Assignment,
    Meeting,
    Bill,
    Personal,
    Work,
    Exam,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 6] = [
        ItemCategory::Assignment,
        ItemCategory::Meeting,
        ItemCategory::Bill,
        ItemCategory::Personal,
        ItemCategory::Work,
        ItemCategory::Exam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assignment => "Assignment",
            Self::Meeting => "Meeting",
            Self::Bill => "Bill",
            Self::Personal => "Personal",
            Self::Work => "Work",
            Self::Exam => "Exam",
        }
    }

    /// Maps a free-form label from the text model into the closed set.
    ///
    /// Matching is case-insensitive; anything unrecognized becomes `Personal`.
    pub fn from_model_label(label: &str) -> Self {
        label.parse().unwrap_or(Self::Personal)
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown category '{}'", needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl ReminderUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }
}

impl fmt::Display for ReminderUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ReminderUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hour" | "hours" => Ok(Self::Hours),
            "d" | "day" | "days" => Ok(Self::Days),
            other => Err(format!("unknown reminder unit '{}'", other)),
        }
    }
}

/// "Notify `value` `unit` before the item's date."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reminder {
    pub value: u32,
    pub unit: ReminderUnit,
}

impl Reminder {
    pub fn new(value: u32, unit: ReminderUnit) -> Self {
        Self { value, unit }
    }

    pub fn offset(&self) -> Duration {
        let value = i64::from(self.value);
        match self.unit {
            ReminderUnit::Seconds => Duration::seconds(value),
            ReminderUnit::Minutes => Duration::minutes(value),
            ReminderUnit::Hours => Duration::hours(value),
            ReminderUnit::Days => Duration::days(value),
        }
    }

    /// Instant at which this reminder should fire for an item due at `due`,
    /// or `None` when that instant is out of chrono's range.
    pub fn fire_at(&self, due: DateTime<Utc>) -> Option<DateTime<Utc>> {
        due.checked_sub_signed(self.offset())
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} before", self.value, self.unit)
    }
}

impl FromStr for Reminder {
    type Err = String;

    /// Parses `"3d"`, `"2 hours"`, `"30m"` and similar forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("reminder '{}' is missing a unit", trimmed))?;
        let (digits, unit) = trimmed.split_at(split);
        let value = digits
            .parse::<u32>()
            .map_err(|_| format!("reminder '{}' has an invalid value", trimmed))?;
        Ok(Self::new(value, unit.parse()?))
    }
}

/// Field values for an item, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub title: String,
    pub date: DateTime<Utc>,
    pub category: ItemCategory,
    pub description: Option<String>,
    pub email: Option<String>,
    pub reminders: Vec<Reminder>,
}

impl ItemFields {
    pub fn new(title: impl Into<String>, date: DateTime<Utc>, category: ItemCategory) -> Self {
        Self {
            title: title.into(),
            date,
            category,
            description: None,
            email: None,
            reminders: Vec::new(),
        }
    }

    /// Trims text fields and folds blank optionals into `None`.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = normalize_optional(self.description);
        self.email = normalize_optional(self.email);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::from_violations(validation::item_violations(self))
    }
}

/// A validated schedulable item.
///
/// Fields are only reachable through accessors so every instance has passed
/// [`ItemFields::validate`], including instances read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredItem", into = "StoredItem")]
pub struct Item {
    id: ItemId,
    completed: bool,
    fields: ItemFields,
}

impl Item {
    /// Validates `fields` and assigns a fresh id. New items start incomplete.
    pub fn new(fields: ItemFields) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), fields, false)
    }

    pub fn with_id(
        id: ItemId,
        fields: ItemFields,
        completed: bool,
    ) -> Result<Self, ValidationError> {
        let fields = fields.normalized();
        fields.validate()?;
        Ok(Self {
            id,
            completed,
            fields,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.fields.date
    }

    pub fn category(&self) -> ItemCategory {
        self.fields.category
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.description.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.fields.email.as_deref()
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.fields.reminders
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn fields(&self) -> &ItemFields {
        &self.fields
    }

    /// Whether this item carries a time-of-day rather than the date-only sentinel.
    pub fn has_time(&self) -> bool {
        crate::utils::has_time(self.fields.date)
    }

    /// True when saving this item should request a confirmation email.
    pub fn wants_confirmation(&self) -> bool {
        self.fields.email.is_some() && !self.fields.reminders.is_empty()
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}

/// Wire shape of an item, matching the stored JSON layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredItem {
    id: ItemId,
    title: String,
    #[serde(with = "iso_date")]
    date: DateTime<Utc>,
    category: ItemCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default)]
    reminders: Vec<Reminder>,
}

impl TryFrom<StoredItem> for Item {
    type Error = ValidationError;

    fn try_from(value: StoredItem) -> Result<Self, Self::Error> {
        let fields = ItemFields {
            title: value.title,
            date: value.date,
            category: value.category,
            description: value.description,
            email: value.email,
            reminders: value.reminders,
        };
        Item::with_id(value.id, fields, value.completed)
    }
}

impl From<Item> for StoredItem {
    fn from(item: Item) -> Self {
        let Item {
            id,
            completed,
            fields,
        } = item;
        Self {
            id,
            title: fields.title,
            date: fields.date,
            category: fields.category,
            description: fields.description,
            completed,
            email: fields.email,
            reminders: fields.reminders,
        }
    }
}

/// Unvalidated form state for creating or editing an item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftItem {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub category: Option<ItemCategory>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub reminders: Vec<Reminder>,
}

impl DraftItem {
    /// Converts the draft at submit time.
    ///
    /// Missing required fields are reported together with every other rule
    /// the draft violates.
    pub fn into_fields(self) -> Result<ItemFields, ValidationError> {
        let mut violations = Vec::new();
        if self.date.is_none() {
            violations.push(FieldViolation::new("date", "a date is required"));
        }
        if self.category.is_none() {
            violations.push(FieldViolation::new("category", "please select a category"));
        }

        let title_missing = self
            .title
            .as_deref()
            .is_none_or(|title| title.trim().is_empty());
        if title_missing {
            violations.push(FieldViolation::new("title", "a title is required"));
        }

        // Run the regular rules over whatever is present so one submit
        // surfaces everything at once.
        let fields = ItemFields {
            title: self.title.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            category: self.category.unwrap_or(ItemCategory::Personal),
            description: self.description,
            email: self.email,
            reminders: self.reminders,
        }
        .normalized();
        violations.extend(
            validation::item_violations(&fields)
                .into_iter()
                .filter(|v| !(title_missing && v.field == "title")),
        );

        ValidationError::from_violations(violations).map(|()| fields)
    }
}

impl From<&Item> for DraftItem {
    fn from(item: &Item) -> Self {
        let fields = item.fields().clone();
        Self {
            title: Some(fields.title),
            date: Some(fields.date),
            category: Some(fields.category),
            description: fields.description,
            email: fields.email,
            reminders: fields.reminders,
        }
    }
}

/// Explicit create-vs-update intent for a submitted draft.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    New(DraftItem),
    Editing(ItemId, DraftItem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        })
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionCategory {
    Student,
    Professional,
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Student => "Student",
            Self::Professional => "Professional",
        })
    }
}

impl FromStr for TransactionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "professional" => Ok(Self::Professional),
            other => Err(format!("unknown transaction category '{}'", other)),
        }
    }
}

/// Exact monetary amount in hundredths of the currency unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        f.pad(&format!("{}{}.{:02}", sign, abs / 100, abs % 100))
    }
}

impl FromStr for Money {
    type Err = String;

    /// Parses decimal text with at most two fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
        let digits_ok = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() && frac.is_empty() || !digits_ok(whole) || !digits_ok(frac) {
            return Err(format!("'{}' is not a valid amount", trimmed));
        }
        if frac.len() > 2 {
            return Err(format!(
                "'{}' has more than two decimal places",
                trimmed
            ));
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(100))
                .ok_or_else(|| format!("'{}' is out of range", trimmed))?
        };
        let frac_cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|e| e.to_string())? * 10,
            _ => frac.parse::<i64>().map_err(|e| e.to_string())?,
        };
        let cents = whole_cents
            .checked_add(frac_cents)
            .ok_or_else(|| format!("'{}' is out of range", trimmed))?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    /// Accepts the decimal string form and, for older snapshots, plain JSON numbers.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Repr::Integer(whole) => whole
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| serde::de::Error::custom("amount out of range")),
            // Same two-decimal rule as the text form; nothing is rounded.
            Repr::Float(value) => value.to_string().parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Field values for a ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    pub description: String,
    pub amount: Money,
    pub kind: TransactionType,
    pub category: TransactionCategory,
}

impl TransactionFields {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::from_violations(validation::transaction_violations(self))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredTransaction", into = "StoredTransaction")]
pub struct Transaction {
    id: TransactionId,
    date: DateTime<Utc>,
    fields: TransactionFields,
}

impl Transaction {
    /// Validates `fields` and stamps the entry with `now`.
    pub fn new(fields: TransactionFields, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), now, fields)
    }

    pub fn with_id(
        id: TransactionId,
        date: DateTime<Utc>,
        mut fields: TransactionFields,
    ) -> Result<Self, ValidationError> {
        fields.description = fields.description.trim().to_string();
        fields.validate()?;
        Ok(Self { id, date, fields })
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.fields.description
    }

    pub fn amount(&self) -> Money {
        self.fields.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.fields.kind
    }

    pub fn category(&self) -> TransactionCategory {
        self.fields.category
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTransaction {
    id: TransactionId,
    #[serde(with = "iso_date")]
    date: DateTime<Utc>,
    description: String,
    amount: Money,
    #[serde(rename = "type")]
    kind: TransactionType,
    category: TransactionCategory,
}

impl TryFrom<StoredTransaction> for Transaction {
    type Error = ValidationError;

    fn try_from(value: StoredTransaction) -> Result<Self, Self::Error> {
        let fields = TransactionFields {
            description: value.description,
            amount: value.amount,
            kind: value.kind,
            category: value.category,
        };
        Transaction::with_id(value.id, value.date, fields)
    }
}

impl From<Transaction> for StoredTransaction {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            date: tx.date,
            description: tx.fields.description,
            amount: tx.fields.amount,
            kind: tx.fields.kind,
            category: tx.fields.category,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// RFC 3339 in UTC with a `Z` suffix; fractional seconds only when present,
/// so every instant round-trips exactly.
pub(crate) mod iso_date {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|date| date.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn money_parses_and_formats_two_decimals() {
        assert_eq!("85.5".parse::<Money>().unwrap(), Money::from_cents(8550));
        assert_eq!("350".parse::<Money>().unwrap(), Money::from_cents(35000));
        assert_eq!(".99".parse::<Money>().unwrap(), Money::from_cents(99));
        assert_eq!(Money::from_cents(26450).to_string(), "264.50");
        assert_eq!(Money::from_cents(-1299).to_string(), "-12.99");
        assert!("1.234".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
    }

    #[test]
    fn money_accepts_legacy_json_numbers() {
        let money: Money = serde_json::from_str("85.5").unwrap();
        assert_eq!(money, Money::from_cents(8550));
        let money: Money = serde_json::from_str("350").unwrap();
        assert_eq!(money, Money::from_cents(35000));
        let money: Money = serde_json::from_str("\"12.99\"").unwrap();
        assert_eq!(money, Money::from_cents(1299));
        let money: Money = serde_json::from_str("350.0").unwrap();
        assert_eq!(money, Money::from_cents(35000));
    }

    #[test]
    fn json_numbers_with_extra_decimals_are_rejected() {
        assert!(serde_json::from_str::<Money>("12.345").is_err());
        assert!(serde_json::from_str::<Money>("\"12.345\"").is_err());
        assert!(serde_json::from_str::<Money>("0.001").is_err());
    }

    #[test]
    fn reminder_parses_compact_forms() {
        assert_eq!(
            "3d".parse::<Reminder>().unwrap(),
            Reminder::new(3, ReminderUnit::Days)
        );
        assert_eq!(
            "2 hours".parse::<Reminder>().unwrap(),
            Reminder::new(2, ReminderUnit::Hours)
        );
        assert!("days".parse::<Reminder>().is_err());
        assert!("5".parse::<Reminder>().is_err());
    }

    #[test]
    fn reminder_fires_before_due_date() {
        let due = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        let reminder = Reminder::new(3, ReminderUnit::Days);
        assert_eq!(
            reminder.fire_at(due),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(reminder.to_string(), "3 days before");
    }

    #[test]
    fn oversized_reminders_are_rejected_and_never_panic() {
        let due = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        let huge = Reminder::new(u32::MAX, ReminderUnit::Days);
        assert_eq!(huge.fire_at(DateTime::<Utc>::MIN_UTC), None);
        assert!(huge.fire_at(due).is_none());

        let mut fields = ItemFields::new("Renew passport", due, ItemCategory::Personal);
        fields.email = Some("me@example.com".to_string());
        fields.reminders = vec![huge];
        let err = Item::new(fields.clone()).unwrap_err();
        assert!(err.has_field("reminders"));

        fields.reminders = vec![Reminder::new(365, ReminderUnit::Days)];
        assert!(Item::new(fields.clone()).is_ok());
        fields.reminders = vec![Reminder::new(366 * 24, ReminderUnit::Hours)];
        assert!(Item::new(fields).is_err());
    }

    #[test]
    fn category_from_model_label_falls_back_to_personal() {
        assert_eq!(ItemCategory::from_model_label("bill"), ItemCategory::Bill);
        assert_eq!(ItemCategory::from_model_label("EXAM"), ItemCategory::Exam);
        assert_eq!(
            ItemCategory::from_model_label("payment reminder"),
            ItemCategory::Personal
        );
    }

    #[test]
    fn item_new_normalizes_blank_optionals() {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let mut fields = ItemFields::new("  Pay Bill ", date, ItemCategory::Bill);
        fields.description = Some("   ".to_string());
        fields.email = Some(String::new());

        let item = Item::new(fields).unwrap();
        assert_eq!(item.title(), "Pay Bill");
        assert_eq!(item.description(), None);
        assert_eq!(item.email(), None);
        assert!(!item.is_completed());
        assert!(!item.has_time());
    }

    #[test]
    fn deserialize_rejects_reminders_without_email() {
        let value = serde_json::json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "title": "Dentist",
            "date": "2025-03-01T10:00:00Z",
            "category": "Personal",
            "completed": false,
            "reminders": [{ "value": 1, "unit": "hours" }]
        });

        let err = serde_json::from_value::<Item>(value).unwrap_err();
        assert!(err.to_string().contains("email"), "unexpected error: {err}");
    }

    #[test]
    fn draft_reports_missing_and_invalid_fields_together() {
        let draft = DraftItem {
            title: None,
            description: Some("x".repeat(501)),
            reminders: vec![Reminder::new(1, ReminderUnit::Hours)],
            ..DraftItem::default()
        };

        let err = draft.into_fields().unwrap_err();
        let fields: Vec<&str> = err.fields().collect();
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"date"));
        assert!(fields.contains(&"category"));
        assert!(fields.contains(&"description"));
        assert!(fields.contains(&"email"));
        assert_eq!(fields.iter().filter(|f| **f == "title").count(), 1);
    }

    #[test]
    fn draft_from_item_round_trips_fields() {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 14, 30, 0).unwrap();
        let mut fields = ItemFields::new("Standup", date, ItemCategory::Meeting);
        fields.email = Some("x@y.com".to_string());
        fields.reminders = vec![Reminder::new(30, ReminderUnit::Minutes)];
        let item = Item::new(fields.clone()).unwrap();

        let draft = DraftItem::from(&item);
        assert_eq!(draft.into_fields().unwrap(), fields);
    }
}
