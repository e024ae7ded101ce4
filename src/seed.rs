//! Sample data written to a fresh store by `flowzen init`.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::models::{
    Item, ItemCategory, ItemFields, Money, Reminder, ReminderUnit, Transaction,
    TransactionCategory, TransactionFields, TransactionType,
};
use crate::utils::due_at;

fn day_offset(now: DateTime<Utc>, days: i64, time: Option<(u32, u32)>) -> DateTime<Utc> {
    let day = (now + Duration::days(days)).date_naive();
    due_at(day, time.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)))
}

fn sample(
    title: &str,
    date: DateTime<Utc>,
    category: ItemCategory,
    description: &str,
) -> ItemFields {
    let mut fields = ItemFields::new(title, date, category);
    fields.description = Some(description.to_string());
    fields
}

/// Items relative to `now`. Two of them carry a placeholder address so their
/// reminders pass validation; any entry that still fails is skipped.
pub fn sample_items(now: DateTime<Utc>) -> Vec<Item> {
    let mut project = sample(
        "Project Alpha Deadline",
        day_offset(now, 3, Some((17, 0))),
        ItemCategory::Work,
        "Final submission of the Project Alpha report.",
    );
    project.email = Some("user@example.com".to_string());
    project.reminders = vec![
        Reminder::new(1, ReminderUnit::Days),
        Reminder::new(2, ReminderUnit::Hours),
    ];

    let mut bill = sample(
        "Pay Electricity Bill",
        day_offset(now, 5, None),
        ItemCategory::Bill,
        "Monthly electricity bill payment.",
    );
    bill.email = Some("user@example.com".to_string());
    bill.reminders = vec![Reminder::new(3, ReminderUnit::Days)];

    let entries = [
        (project, false),
        (
            sample(
                "Weekly Team Meeting",
                day_offset(now, 1, Some((10, 30))),
                ItemCategory::Meeting,
                "Sync up on project progress and upcoming sprints.",
            ),
            false,
        ),
        (bill, false),
        (
            sample(
                "Mid-term Exam Prep",
                day_offset(now, 10, None),
                ItemCategory::Exam,
                "Start studying for the mid-term exams, focus on chapters 1-5.",
            ),
            false,
        ),
        (
            sample(
                "Submit History Essay",
                day_offset(now, -2, Some((23, 59))),
                ItemCategory::Assignment,
                "Submit the essay on World War II.",
            ),
            true,
        ),
        (
            sample(
                "Doctor's Appointment",
                day_offset(now, 14, Some((14, 0))),
                ItemCategory::Personal,
                "Annual check-up.",
            ),
            false,
        ),
    ];

    entries
        .into_iter()
        .filter_map(|(fields, completed)| {
            Item::with_id(uuid::Uuid::new_v4(), fields, completed).ok()
        })
        .collect()
}

/// Ledger entries relative to `now`, newest first.
pub fn sample_transactions(now: DateTime<Utc>) -> Vec<Transaction> {
    let entries = [
        (
            1,
            "Monthly Subscription",
            1299,
            TransactionType::Expense,
            TransactionCategory::Professional,
        ),
        (
            3,
            "Computer Science Textbook",
            8550,
            TransactionType::Expense,
            TransactionCategory::Student,
        ),
        (
            5,
            "Part-time job payment",
            35000,
            TransactionType::Income,
            TransactionCategory::Professional,
        ),
    ];

    entries
        .into_iter()
        .filter_map(|(days_ago, description, cents, kind, category)| {
            let fields = TransactionFields {
                description: description.to_string(),
                amount: Money::from_cents(cents),
                kind,
                category,
            };
            Transaction::new(fields, now - Duration::days(days_ago)).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::financial_summary;

    #[test]
    fn samples_are_all_valid() {
        let now = Utc::now();
        assert_eq!(sample_items(now).len(), 6);
        assert_eq!(sample_transactions(now).len(), 3);
    }

    #[test]
    fn sample_ledger_balances() {
        let summary = financial_summary(&sample_transactions(Utc::now())).unwrap();
        assert_eq!(summary.total_income.to_string(), "350.00");
        assert_eq!(summary.total_expenses.to_string(), "98.49");
        assert_eq!(summary.balance.to_string(), "251.51");
    }
}
