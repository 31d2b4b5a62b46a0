//! Coffer service binary.
//!
//! Opens the ledger and rates documents, builds the [`Economy`] that
//! command front-ends call into, and runs the daily interest and tax sweeps
//! until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `coffer-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Open the ledger and rates documents
//! 4. Build the economy and check the rates document is readable
//! 5. Spawn the maintenance sweeps and mark the service ready
//! 6. Wait for Ctrl-C, then stop the sweeps and drain them
//!
//! [`Economy`]: coffer_economy::Economy

mod error;

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use coffer_core::config::DEFAULT_CONFIG_PATH;
use coffer_core::{CofferConfig, LogNotifier, Notifier, Scheduler};
use coffer_db::{JsonAccountStore, JsonRatesStore};
use coffer_economy::Economy;
use coffer_ledger::{AccountStore, Ledger, RatesStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point for the Coffer service.
///
/// # Errors
///
/// Returns an error if any initialization step fails or a maintenance task
/// dies.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run().await?;
    Ok(())
}

async fn run() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = resolve_config_path(std::env::args_os().nth(1));
    let config = CofferConfig::load(&config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!(
        config = %config_path.display(),
        ledger = %config.storage.ledger_path.display(),
        rates = %config.storage.rates_path.display(),
        period_secs = config.maintenance.period().as_secs(),
        "coffer-engine starting"
    );

    // 3. Open storage.
    let accounts: Arc<dyn AccountStore> =
        Arc::new(JsonAccountStore::new(config.storage.ledger_path.clone()));
    let rates: Arc<dyn RatesStore> =
        Arc::new(JsonRatesStore::new(config.storage.rates_path.clone()));
    let ledger = Arc::new(Ledger::open(accounts)?);
    info!(accounts = ledger.len(), "Ledger opened");

    // 4. Build the economy.
    let economy = Economy::new(Arc::clone(&ledger), Arc::clone(&rates));
    let current = economy.rates()?;
    info!(
        interest_rate = %current.interest_rate,
        tax_rate = %current.tax_rate,
        "Economy ready"
    );

    // 5. Start the sweeps.
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let scheduler = Arc::new(Scheduler::new(
        ledger,
        rates,
        notifier,
        config.maintenance.period(),
    ));
    let control = scheduler.control();
    let tasks = scheduler.spawn();
    control.mark_ready();
    info!("Maintenance sweeps scheduled");

    // 6. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    control.request_stop();
    for task in tasks {
        task.await?;
    }

    info!("coffer-engine shutdown complete");
    Ok(())
}

/// The configuration file named on the command line, or the default one.
fn resolve_config_path(arg: Option<OsString>) -> PathBuf {
    arg.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_config_path_defaults_without_an_argument() {
        assert_eq!(resolve_config_path(None), PathBuf::from("coffer-config.yaml"));
    }

    #[test]
    fn resolve_config_path_uses_the_first_argument() {
        let arg = OsString::from("/etc/coffer/coffer-config.yaml");
        assert_eq!(
            resolve_config_path(Some(arg)),
            PathBuf::from("/etc/coffer/coffer-config.yaml")
        );
    }
}
