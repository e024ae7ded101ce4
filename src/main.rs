use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use color_eyre::Result;
use flowzen::ai::{HttpModelClient, PromptedAnalysis};
use flowzen::cli::{self, Cli, Commands, ListView};
use flowzen::email::HttpEmailService;
use flowzen::notify::spawn_dispatcher;
use flowzen::{Config, Planner, Profile, SqliteStore, logging, utils};

#[tokio::main]
async fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;
    logging::init_tracing();

    let cli = Cli::parse();

    // --dev keeps a separate config and database
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let config = match cli.config.as_deref() {
        Some(path) => {
            let mut config = Config::load_from(&utils::expand_path(path), profile)?;
            config.apply_env_overrides();
            config
        }
        None => Config::load_with_profile(profile)?,
    };

    let db_path = config.get_database_path();
    let store = SqliteStore::open(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;

    let email = Arc::new(HttpEmailService::new(config.email.clone()));
    let (notifier, dispatcher) = spawn_dispatcher(email);
    let now = Utc::now();

    let mut planner = if matches!(cli.command, Some(Commands::Init)) {
        Planner::load_or_seed(store, Box::new(notifier), now)?
    } else {
        Planner::load(store, Box::new(notifier))?
    };
    let analysis = PromptedAnalysis::new(HttpModelClient::new(config.ai.clone()));

    let command = cli.command.unwrap_or(Commands::List {
        view: ListView::Upcoming,
        json: false,
    });

    let outcome = match command {
        Commands::Init => {
            cli::handle_init(&planner);
            Ok(())
        }
        Commands::Add(args) => cli::handle_add(args, &mut planner, &analysis).await,
        Commands::Edit(args) => cli::handle_edit(args, &mut planner),
        Commands::List { view, json } => {
            cli::handle_list(view, json, config.upcoming_limit, &planner, now)
        }
        Commands::Calendar { day } => {
            cli::handle_calendar(day, &planner);
            Ok(())
        }
        Commands::Toggle { id, undo } => cli::handle_toggle(id, undo, &mut planner),
        Commands::Delete { id } => cli::handle_delete(id, &mut planner),
        Commands::Tx { command } => cli::handle_tx(command, &mut planner, now),
        Commands::Detect { text, add } => {
            cli::handle_detect(text, add, &mut planner, &analysis, now).await
        }
        Commands::Suggest { title, date, time } => {
            cli::handle_suggest(title, date, time, &analysis).await
        }
        Commands::Schedule { query } => cli::handle_schedule(query, &analysis).await,
    };

    // Dropping the planner closes the confirmation queue; wait for it to drain.
    drop(planner);
    let sent = dispatcher.await?;
    if sent > 0 {
        tracing::debug!(sent, "confirmation emails delivered");
    }

    outcome?;
    Ok(())
}
