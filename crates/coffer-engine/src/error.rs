//! Error types for the Coffer service binary.
//!
//! [`EngineError`] wraps every failure that can stop the service during
//! startup or shutdown.

/// Top-level error for the Coffer service binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: coffer_core::ConfigError,
    },

    /// The ledger document could not be opened.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: coffer_ledger::LedgerError,
    },

    /// The economy could not read its settings.
    #[error("economy error: {source}")]
    Economy {
        /// The underlying economy error.
        #[from]
        source: coffer_economy::EconomyError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A maintenance task panicked or was aborted.
    #[error("maintenance task failed: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}
