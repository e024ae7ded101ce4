use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use uuid::Uuid;

use crate::ai::TextAnalysisService;
use crate::boundary::BoundaryError;
use crate::lifecycle::{Planner, PlannerError};
use crate::models::{
    Draft, DraftItem, Item, ItemCategory, ItemFields, Money, Reminder, Transaction,
    TransactionCategory, TransactionFields, TransactionType,
};
use crate::store::KeyValueStore;
use crate::utils::{due_at, format_due, parse_date, parse_time};
use crate::views;

#[derive(Parser)]
#[command(name = "flowzen")]
#[command(about = "Deadlines, reminders and a small ledger for the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare the store, seeding sample data when it has never been written
    Init,
    /// Add an item
    Add(AddArgs),
    /// Change fields of an existing item
    Edit(EditArgs),
    /// List items (upcoming by default)
    List {
        #[arg(long, value_enum, default_value_t = ListView::Upcoming)]
        view: ListView,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show items grouped by day, or the items of a single day
    Calendar {
        /// Day to show (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        day: Option<NaiveDate>,
    },
    /// Mark an item complete, or incomplete with --undo
    Toggle {
        id: Uuid,
        #[arg(long)]
        undo: bool,
    },
    /// Delete an item permanently
    Delete { id: Uuid },
    /// Income and expense ledger
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },
    /// Ask the model whether some text mentions a deadline
    Detect {
        text: String,
        /// Save the detected deadline as a new item
        #[arg(long)]
        add: bool,
    },
    /// Ask the model for reminder suggestions
    Suggest {
        title: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// Due time (HH:MM)
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
    },
    /// Ask the model for a study plan
    Schedule { query: String },
}

#[derive(Args)]
pub struct AddArgs {
    /// Item title
    pub title: String,
    /// Due date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,
    /// Due time (HH:MM); omit for an all-day item
    #[arg(long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,
    /// Assignment, Meeting, Bill, Personal, Work or Exam
    #[arg(short = 'k', long)]
    pub category: ItemCategory,
    #[arg(long)]
    pub description: Option<String>,
    /// Address for the reminder confirmation
    #[arg(long)]
    pub email: Option<String>,
    /// Reminder such as `3d`, `2h` or `30 minutes`; repeatable
    #[arg(long = "remind", value_name = "REMINDER")]
    pub reminders: Vec<Reminder>,
    /// Ask the model for reminders when none are given
    #[arg(long)]
    pub suggest: bool,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: Uuid,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,
    /// Make the item all-day
    #[arg(long, conflicts_with = "time")]
    pub no_time: bool,
    #[arg(short = 'k', long)]
    pub category: Option<ItemCategory>,
    /// New description; an empty value clears it
    #[arg(long)]
    pub description: Option<String>,
    /// New email; an empty value clears it
    #[arg(long)]
    pub email: Option<String>,
    /// Replaces all reminders; repeatable
    #[arg(long = "remind", value_name = "REMINDER")]
    pub reminders: Vec<Reminder>,
    #[arg(long, conflicts_with = "reminders")]
    pub clear_reminders: bool,
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record income or an expense dated now
    Add {
        description: String,
        /// Positive amount with at most two decimals
        amount: Money,
        #[arg(long = "type", value_name = "TYPE")]
        kind: TransactionType,
        /// Student or Professional
        #[arg(long)]
        category: TransactionCategory,
    },
    /// List transactions, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Delete a transaction
    Delete { id: Uuid },
    /// Totals and balance
    Summary {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListView {
    Upcoming,
    Incomplete,
    All,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    Service(#[from] BoundaryError),
    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Ledger totals are too large to represent")]
    LedgerOverflow,
}

fn print_item(item: &Item) {
    let mark = if item.is_completed() { "x" } else { " " };
    println!(
        "[{}] {}  {:<16}  {:<10}  {}",
        mark,
        item.id(),
        format_due(item.date()),
        item.category(),
        item.title()
    );
    if let Some(description) = item.description() {
        println!("      {}", description);
    }
    if !item.reminders().is_empty() {
        let reminders: Vec<String> = item.reminders().iter().map(|r| r.to_string()).collect();
        println!(
            "      reminders: {} -> {}",
            reminders.join(", "),
            item.email().unwrap_or("-")
        );
    }
}

fn print_transaction(tx: &Transaction) {
    let sign = match tx.kind() {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };
    println!(
        "{}  {}  {}{:>10}  {:<12}  {}",
        tx.id(),
        tx.date().format("%Y-%m-%d"),
        sign,
        tx.amount(),
        tx.category(),
        tx.description()
    );
}

/// Handle the init command
pub fn handle_init<S: KeyValueStore>(planner: &Planner<S>) {
    println!(
        "Store ready: {} items, {} transactions",
        planner.items().len(),
        planner.transactions().len()
    );
}

/// Handle the add command
pub async fn handle_add<S: KeyValueStore>(
    args: AddArgs,
    planner: &mut Planner<S>,
    analysis: &dyn TextAnalysisService,
) -> Result<(), CliError> {
    let date = due_at(args.date, args.time);
    let mut fields = ItemFields::new(args.title, date, args.category);
    fields.description = args.description;
    fields.email = args.email;
    fields.reminders = args.reminders;

    if args.suggest && fields.reminders.is_empty() {
        let suggestion = analysis.suggest_reminders(&fields.title, date).await?;
        fields.reminders = suggestion.reminders;
    }

    let item = planner.create(fields)?;
    println!("Item created successfully (ID: {})", item.id());
    Ok(())
}

/// Handle the edit command
pub fn handle_edit<S: KeyValueStore>(
    args: EditArgs,
    planner: &mut Planner<S>,
) -> Result<(), CliError> {
    let existing = planner
        .state()
        .item(args.id)
        .ok_or(PlannerError::NotFound(args.id))?;
    let mut draft = DraftItem::from(existing);

    let current = existing.date();
    let day = args.date.unwrap_or_else(|| current.date_naive());
    let time = if args.no_time {
        None
    } else {
        args.time
            .or_else(|| existing.has_time().then(|| current.time()))
    };
    draft.date = Some(due_at(day, time));

    if let Some(title) = args.title {
        draft.title = Some(title);
    }
    if let Some(category) = args.category {
        draft.category = Some(category);
    }
    if let Some(description) = args.description {
        draft.description = Some(description);
    }
    if let Some(email) = args.email {
        draft.email = Some(email);
    }
    if args.clear_reminders {
        draft.reminders.clear();
    } else if !args.reminders.is_empty() {
        draft.reminders = args.reminders;
    }

    let item = planner.save_draft(Draft::Editing(args.id, draft))?;
    println!("Item updated (ID: {})", item.id());
    Ok(())
}

/// Handle the list command
pub fn handle_list<S: KeyValueStore>(
    view: ListView,
    json: bool,
    limit: usize,
    planner: &Planner<S>,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let items: Vec<&Item> = match view {
        ListView::Upcoming => views::upcoming(planner.items(), now, limit),
        ListView::Incomplete => views::incomplete(planner.items()),
        ListView::All => planner.items().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("Nothing to show.");
    }
    for item in items {
        print_item(item);
    }
    Ok(())
}

/// Handle the calendar command
pub fn handle_calendar<S: KeyValueStore>(day: Option<NaiveDate>, planner: &Planner<S>) {
    if let Some(day) = day {
        let items = views::items_on_day(planner.items(), day);
        println!("{} ({} items)", day.format("%A, %B %-d, %Y"), items.len());
        for item in items {
            print_item(item);
        }
        return;
    }

    for (day, items) in views::group_by_day(planner.items()) {
        println!("{}", day.format("%a %Y-%m-%d"));
        for item in items {
            print_item(item);
        }
    }
}

/// Handle the toggle command
pub fn handle_toggle<S: KeyValueStore>(
    id: Uuid,
    undo: bool,
    planner: &mut Planner<S>,
) -> Result<(), CliError> {
    let item = planner.toggle_complete(id, !undo)?;
    let state = if item.is_completed() { "complete" } else { "incomplete" };
    println!("'{}' marked {}", item.title(), state);
    Ok(())
}

/// Handle the delete command
pub fn handle_delete<S: KeyValueStore>(id: Uuid, planner: &mut Planner<S>) -> Result<(), CliError> {
    let item = planner.delete(id)?;
    println!("Deleted '{}'", item.title());
    Ok(())
}

/// Handle the tx subcommands
pub fn handle_tx<S: KeyValueStore>(
    command: TxCommands,
    planner: &mut Planner<S>,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    match command {
        TxCommands::Add {
            description,
            amount,
            kind,
            category,
        } => {
            let fields = TransactionFields {
                description,
                amount,
                kind,
                category,
            };
            let tx = planner.add_transaction(fields, now)?;
            println!("Transaction recorded (ID: {})", tx.id());
        }
        TxCommands::List { json } => {
            let txs = views::transactions_newest_first(planner.transactions());
            if json {
                println!("{}", serde_json::to_string_pretty(&txs)?);
            } else {
                for tx in txs {
                    print_transaction(tx);
                }
            }
        }
        TxCommands::Delete { id } => {
            let tx = planner.delete_transaction(id)?;
            println!("Deleted transaction '{}'", tx.description());
        }
        TxCommands::Summary { json } => {
            let summary = views::financial_summary(planner.transactions())
                .ok_or(CliError::LedgerOverflow)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Income:   {:>12}", summary.total_income);
                println!("Expenses: {:>12}", summary.total_expenses);
                println!("Balance:  {:>12}", summary.balance);
            }
        }
    }
    Ok(())
}

/// Handle the detect command
pub async fn handle_detect<S: KeyValueStore>(
    text: String,
    add: bool,
    planner: &mut Planner<S>,
    analysis: &dyn TextAnalysisService,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let detection = analysis.detect_deadline(&text).await?;
    let Some(draft) = detection.into_draft(now) else {
        println!("No deadline found.");
        return Ok(());
    };

    println!(
        "Found: {} on {} ({})",
        draft.title.as_deref().unwrap_or("(untitled)"),
        draft.date.map(format_due).unwrap_or_default(),
        draft.category.unwrap_or(ItemCategory::Personal)
    );
    if add {
        let item = planner.save_draft(Draft::New(draft))?;
        println!("Item created successfully (ID: {})", item.id());
    }
    Ok(())
}

/// Handle the suggest command
pub async fn handle_suggest(
    title: String,
    date: NaiveDate,
    time: Option<NaiveTime>,
    analysis: &dyn TextAnalysisService,
) -> Result<(), CliError> {
    let suggestion = analysis.suggest_reminders(&title, due_at(date, time)).await?;
    for reminder in suggestion.reminders {
        println!("{}", reminder);
    }
    Ok(())
}

/// Handle the schedule command
pub async fn handle_schedule(
    query: String,
    analysis: &dyn TextAnalysisService,
) -> Result<(), CliError> {
    let schedule = analysis.generate_schedule(&query).await?;
    println!("{}", schedule.schedule_markup);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoopNotifier;
    use crate::store::MemoryStore;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_parses_repeated_reminders() {
        let cli = Cli::try_parse_from([
            "flowzen", "add", "Pay Bill", "--date", "2025-03-01", "-k", "bill", "--email",
            "a@b.co", "--remind", "3d", "--remind", "2 hours",
        ])
        .unwrap();
        let Some(Commands::Add(args)) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.category, ItemCategory::Bill);
        assert_eq!(args.reminders.len(), 2);
        assert!(args.time.is_none());
    }

    #[test]
    fn tx_add_rejects_three_decimals() {
        let parsed = Cli::try_parse_from([
            "flowzen", "tx", "add", "Lunch", "12.345", "--type", "expense", "--category",
            "student",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn edit_keeps_time_unless_cleared() {
        let mut planner = Planner::load(MemoryStore::new(), Box::new(NoopNotifier)).unwrap();
        let day = parse_date("2025-03-01").unwrap();
        let mut fields = ItemFields::new(
            "Standup",
            due_at(day, Some(parse_time("09:15").unwrap())),
            ItemCategory::Meeting,
        );
        fields.description = Some("daily".to_string());
        let id = planner.create(fields).unwrap().id().to_string();

        let cli = Cli::try_parse_from([
            "flowzen",
            "edit",
            id.as_str(),
            "--date",
            "2025-03-02",
            "--description",
            "",
        ])
        .unwrap();
        let Some(Commands::Edit(args)) = cli.command else {
            panic!("expected edit");
        };
        handle_edit(args, &mut planner).unwrap();

        let item = &planner.items()[0];
        assert_eq!(format_due(item.date()), "2025-03-02 09:15");
        assert_eq!(item.description(), None);

        let cli =
            Cli::try_parse_from(["flowzen", "edit", id.as_str(), "--no-time"]).unwrap();
        let Some(Commands::Edit(args)) = cli.command else {
            panic!("expected edit");
        };
        handle_edit(args, &mut planner).unwrap();
        assert!(!planner.items()[0].has_time());
    }
}
