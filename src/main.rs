mod categorize;
mod clock;
mod config;
mod db;
mod export;
mod format;
mod import;
mod ledger;
mod models;
mod run;
mod session;

use anyhow::Result;
use std::sync::Once;

use clock::{Clock, FixedClock, SystemClock};

static TRACING_INIT: Once = Once::new();

/// Log to stderr, filtered by `BUDGETBUDDY_LOG` (default `budgetbuddy=warn`).
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_env("BUDGETBUDDY_LOG")
            .unwrap_or_else(|_| EnvFilter::new("budgetbuddy=warn"));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (as_of, args) = run::split_as_of(&args)?;

    let config_manager = config::ConfigManager::new()?;
    let config = config_manager.load()?;
    let db_path = config::resolve_db_path(&config, config::db_path_from_env())?;
    tracing::debug!(path = %db_path.display(), "opening database");
    let db = db::Database::open(&db_path)?;

    let clock: Box<dyn Clock> = match as_of {
        Some(date) => Box::new(FixedClock::on(date)),
        None => Box::new(SystemClock),
    };
    let session = session::Session::open(db, clock)?;

    let mut ctx = run::Context {
        session,
        config,
        config_manager,
    };
    run::as_cli(&args, &mut ctx)
}
