use chrono::{DateTime, Duration, TimeZone, Utc};
use flowzen::models::{TransactionCategory, TransactionFields, TransactionType};
use flowzen::views::{financial_summary, group_by_day, upcoming};
use flowzen::{Item, ItemCategory, ItemFields, Money, Transaction};
use proptest::prelude::*;
use uuid::Uuid;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn arb_item() -> impl Strategy<Value = Item> {
    (-30i64 * 24..30 * 24, any::<bool>(), 0usize..ItemCategory::ALL.len()).prop_map(
        |(hours, completed, category)| {
            let fields = ItemFields::new(
                "Generated item",
                base() + Duration::hours(hours),
                ItemCategory::ALL[category],
            );
            Item::with_id(Uuid::new_v4(), fields, completed).unwrap()
        },
    )
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (1i64..10_000_000, any::<bool>()).prop_map(|(cents, income)| {
        let fields = TransactionFields {
            description: "Generated".to_string(),
            amount: Money::from_cents(cents),
            kind: if income {
                TransactionType::Income
            } else {
                TransactionType::Expense
            },
            category: TransactionCategory::Professional,
        };
        Transaction::new(fields, base()).unwrap()
    })
}

proptest! {
    #[test]
    fn upcoming_is_bounded_sorted_and_open(
        items in prop::collection::vec(arb_item(), 0..40),
        limit in 0usize..8,
    ) {
        let now = base();
        let shown = upcoming(&items, now, limit);

        prop_assert!(shown.len() <= limit);
        for item in &shown {
            prop_assert!(!item.is_completed());
            prop_assert!(item.date() >= now);
        }
        for pair in shown.windows(2) {
            prop_assert!(pair[0].date() <= pair[1].date());
        }

        let eligible = items
            .iter()
            .filter(|item| !item.is_completed() && item.date() >= now)
            .count();
        prop_assert_eq!(shown.len(), eligible.min(limit));
    }

    #[test]
    fn grouping_keeps_every_item_once(items in prop::collection::vec(arb_item(), 0..40)) {
        let days = group_by_day(&items);
        let total: usize = days.values().map(Vec::len).sum();
        prop_assert_eq!(total, items.len());
        for (day, members) in &days {
            for item in members {
                prop_assert_eq!(item.date().date_naive(), *day);
            }
        }
    }

    #[test]
    fn balance_is_income_minus_expenses(
        txs in prop::collection::vec(arb_transaction(), 0..30),
    ) {
        let summary = financial_summary(&txs).unwrap();
        prop_assert_eq!(
            summary.balance.cents(),
            summary.total_income.cents() - summary.total_expenses.cents()
        );
        prop_assert!(summary.total_income.cents() >= 0);
        prop_assert!(summary.total_expenses.cents() >= 0);
    }
}
