//! Read-only projections over item and transaction snapshots.
//!
//! Everything here is pure: no mutation, recomputed on every read.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Item, Money, Transaction, TransactionType};

/// Incomplete items due at or after `now`, soonest first, at most `limit`.
///
/// Items sharing a due date keep their collection order.
pub fn upcoming<'a>(items: &'a [Item], now: DateTime<Utc>, limit: usize) -> Vec<&'a Item> {
    let mut due: Vec<&Item> = items
        .iter()
        .filter(|item| !item.is_completed() && item.date() >= now)
        .collect();
    due.sort_by_key(|item| item.date());
    due.truncate(limit);
    due
}

/// Every incomplete item, soonest first.
pub fn incomplete(items: &[Item]) -> Vec<&Item> {
    let mut open: Vec<&Item> = items.iter().filter(|item| !item.is_completed()).collect();
    open.sort_by_key(|item| item.date());
    open
}

/// Items keyed by their UTC calendar day, collection order within a day.
pub fn group_by_day(items: &[Item]) -> BTreeMap<NaiveDate, Vec<&Item>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Item>> = BTreeMap::new();
    for item in items {
        days.entry(item.date().date_naive()).or_default().push(item);
    }
    days
}

pub fn items_on_day(items: &[Item], day: NaiveDate) -> Vec<&Item> {
    items
        .iter()
        .filter(|item| item.date().date_naive() == day)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_income: Money,
    pub total_expenses: Money,
    pub balance: Money,
}

/// Income and expense totals in exact cents, or `None` when a total does
/// not fit in [`Money`].
pub fn financial_summary(transactions: &[Transaction]) -> Option<FinancialSummary> {
    let total = |kind: TransactionType| {
        transactions
            .iter()
            .filter(|tx| tx.kind() == kind)
            .try_fold(Money::ZERO, |acc, tx| acc.checked_add(tx.amount()))
    };
    let total_income = total(TransactionType::Income)?;
    let total_expenses = total(TransactionType::Expense)?;

    Some(FinancialSummary {
        total_income,
        total_expenses,
        balance: total_income.checked_sub(total_expenses)?,
    })
}

/// Ledger listing order: newest entry first, ties in collection order.
pub fn transactions_newest_first(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemCategory, ItemFields, TransactionCategory, TransactionFields};
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn item(title: &str, date: DateTime<Utc>, completed: bool) -> Item {
        let mut item = Item::new(ItemFields::new(title, date, ItemCategory::Work)).unwrap();
        item.set_completed(completed);
        item
    }

    fn tx(kind: TransactionType, cents: i64, date: DateTime<Utc>) -> Transaction {
        Transaction::new(
            TransactionFields {
                description: "entry".to_string(),
                amount: Money::from_cents(cents),
                kind,
                category: TransactionCategory::Student,
            },
            date,
        )
        .unwrap()
    }

    #[test]
    fn upcoming_skips_past_and_completed() {
        let now = at(10, 12);
        let items = vec![
            item("past", now - Duration::hours(1), false),
            item("done", now + Duration::hours(1), true),
            item("later", now + Duration::days(2), false),
            item("now", now, false),
        ];

        let titles: Vec<&str> = upcoming(&items, now, 5).iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["now", "later"]);
    }

    #[test]
    fn upcoming_ties_keep_collection_order_and_truncate() {
        let now = at(1, 0);
        let items = vec![
            item("b1", at(5, 9), false),
            item("a", at(3, 9), false),
            item("b2", at(5, 9), false),
            item("c", at(7, 9), false),
        ];

        let titles: Vec<&str> = upcoming(&items, now, 3).iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["a", "b1", "b2"]);
    }

    #[test]
    fn incomplete_includes_overdue_items() {
        let items = vec![
            item("later", at(9, 0), false),
            item("overdue", at(1, 0), false),
            item("done", at(2, 0), true),
        ];
        let titles: Vec<&str> = incomplete(&items).iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["overdue", "later"]);
    }

    #[test]
    fn group_by_day_preserves_insertion_order_within_a_day() {
        let items = vec![
            item("evening", at(1, 20), false),
            item("next day", at(2, 8), false),
            item("morning", at(1, 8), false),
        ];

        let days = group_by_day(&items);
        let first = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let titles: Vec<&str> = days[&first].iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["evening", "morning"]);
        assert_eq!(days.len(), 2);
        assert_eq!(items_on_day(&items, first).len(), 2);
    }

    #[test]
    fn empty_ledger_summarizes_to_zero() {
        assert_eq!(financial_summary(&[]), Some(FinancialSummary::default()));
    }

    #[test]
    fn overflowing_totals_are_reported() {
        let ledger = vec![
            tx(TransactionType::Income, i64::MAX, at(1, 0)),
            tx(TransactionType::Income, 1, at(2, 0)),
        ];
        assert_eq!(financial_summary(&ledger), None);

        let fits = vec![
            tx(TransactionType::Income, i64::MAX, at(1, 0)),
            tx(TransactionType::Expense, 1, at(2, 0)),
        ];
        let summary = financial_summary(&fits).unwrap();
        assert_eq!(summary.balance.cents(), i64::MAX - 1);
    }

    #[test]
    fn ledger_lists_newest_first() {
        let ledger = vec![
            tx(TransactionType::Income, 100, at(1, 0)),
            tx(TransactionType::Expense, 200, at(3, 0)),
            tx(TransactionType::Expense, 300, at(2, 0)),
        ];
        let cents: Vec<i64> = transactions_newest_first(&ledger)
            .iter()
            .map(|t| t.amount().cents())
            .collect();
        assert_eq!(cents, vec![200, 300, 100]);
    }
}
