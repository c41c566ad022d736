pub mod types;
pub mod error;
pub mod config;
pub mod entrants;
pub mod bracket;
pub mod advance;
pub mod resolver;
pub mod scheduler;
pub mod simulation;
pub mod standings;
pub mod view;

pub use advance::{advance, Advancement};
pub use bracket::{generate, generate_with, GenerateOptions};
pub use entrants::EntrantPool;
pub use error::{BracketError, BracketResult, ConfigError, Error, PoolError};
pub use resolver::{LabelBiasedRandom, LowerSeedWins, MatchResolver, SlotAWins};
pub use scheduler::{ready_matches, step, Step};
pub use standings::{standings, Standing};
pub use types::*;
pub use view::BracketView;

use config::*;
use serde::Serialize;
use simulation::run_paced;
use std::fs;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt::writer::MakeWriterExt, EnvFilter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    generated_at: String,
    cancelled: bool,
    resolved: usize,
    bracket: BracketView,
    standings: Vec<Standing>,
}

// ── Entry point ────────────────────────────────────────────────────────

pub fn run() -> Result<(), Error> {
    load_env_file();

    // Initialize tracing with file + stderr output
    let logs_dir = repo_root().join("logs");
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "duel-bracket.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking.and(std::io::stderr))
        .with_ansi(false)
        .try_init()
        .ok();
    info!("Duel bracket starting");

    let config = load_config().inspect_err(|e| error!("{e}"))?;
    let mut pool = EntrantPool::new(config.entrants.len())?;
    for entrant in &config.entrants {
        pool.register(entrant.id, &entrant.label)?;
    }
    let tournament = generate_with(pool.finalize()?, &config.generate_options())?;
    let mut resolver = config.resolver();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (cancel_tx, cancel_rx) = watch::channel(false);
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, stopping after the current match");
            let _ = cancel_tx.send(true);
        }
    });
    let outcome = runtime
        .block_on(run_paced(tournament, &mut resolver, config.step_delay(), cancel_rx))
        .inspect_err(|e| error!("simulation failed: {e}"))?;

    let table = standings(&outcome.tournament);
    for standing in &table {
        info!("{}. {}", standing.placement, standing.label);
    }
    let report = RunReport {
        generated_at: chrono::Local::now().to_rfc3339(),
        cancelled: outcome.cancelled,
        resolved: outcome.resolved,
        bracket: BracketView::from_tournament(&outcome.tournament),
        standings: table,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
