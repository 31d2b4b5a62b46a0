//! Service configuration and periodic maintenance for the Coffer economy.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `coffer-config.yaml` into
//!   strongly-typed structs.
//! - [`scheduler`] -- The daily interest and tax sweeps, their readiness
//!   gate, and tax notices.

pub mod config;
pub mod scheduler;

pub use config::{CofferConfig, ConfigError};
pub use scheduler::{
    LogNotifier, MaintenanceJob, Notifier, NotifyError, Scheduler, SchedulerControl,
    SchedulerError, SweepReport, TaxNotice,
};
