//! The daily maintenance sweeps: interest on bank balances and tax on
//! wallets.
//!
//! Each [`MaintenanceJob`] runs on its own timer. A run re-reads the rates
//! document, locks every account, applies the job, and commits the whole
//! ledger in one write. Tax notices go out only after that write succeeds,
//! and a notice that cannot be delivered never undoes the tax.
//!
//! Neither job starts until [`SchedulerControl::mark_ready`] is called.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use coffer_ledger::{Ledger, LedgerError, RatesStore, StoreError};
use coffer_types::UserId;

/// Errors that can occur during one sweep.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The rates document could not be read.
    #[error("rates unavailable: {source}")]
    Rates {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// The ledger could not be committed. No account changed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}

/// One of the two periodic sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaintenanceJob {
    /// Credit interest on positive bank balances.
    Interest,
    /// Withdraw tax from positive wallets.
    Tax,
}

impl MaintenanceJob {
    /// Both jobs.
    pub const ALL: [Self; 2] = [Self::Interest, Self::Tax];

    /// Lowercase job name, used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Interest => "interest",
            Self::Tax => "tax",
        }
    }
}

impl fmt::Display for MaintenanceJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Summary of one completed sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Which job ran.
    pub job: MaintenanceJob,
    /// The rate applied.
    pub rate: Decimal,
    /// Accounts whose balance changed.
    pub accounts_touched: usize,
    /// Coins credited (interest) or withdrawn (tax) across all accounts.
    pub total_moved: i64,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Tells one user how much tax was withdrawn from their wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxNotice {
    /// The taxed account.
    pub user: UserId,
    /// Coins withdrawn.
    pub taxed: i64,
    /// The tax rate applied.
    pub rate: Decimal,
    /// Wallet balance after the withdrawal.
    pub wallet: i64,
}

/// A notice could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not notify {user}: {reason}")]
pub struct NotifyError {
    /// The intended recipient.
    pub user: UserId,
    /// Why delivery failed.
    pub reason: String,
}

/// Out-of-band delivery of tax notices, such as a direct message.
///
/// Delivery is best-effort. An `Err` is logged and the sweep carries on.
pub trait Notifier: Send + Sync {
    /// Deliver `notice` to its user.
    fn notify(&self, notice: &TaxNotice) -> Result<(), NotifyError>;
}

/// A [`Notifier`] that only writes each notice to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &TaxNotice) -> Result<(), NotifyError> {
        info!(
            user = %notice.user,
            taxed = notice.taxed,
            rate = %notice.rate,
            wallet = notice.wallet,
            "tax notice"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SchedulerControl
// ---------------------------------------------------------------------------

/// Readiness gate and stop signal shared by the sweep tasks.
#[derive(Debug, Default)]
pub struct SchedulerControl {
    ready: AtomicBool,
    stop: AtomicBool,
    changed: Notify,
}

impl SchedulerControl {
    /// Create a control that is neither ready nor stopped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the sweeps start.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        self.changed.notify_waiters();
    }

    /// Ask the sweeps to stop. A sweep already running finishes first.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.changed.notify_waiters();
    }

    /// Whether [`mark_ready`](Self::mark_ready) has been called.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Whether [`request_stop`](Self::request_stop) has been called.
    pub fn is_stopping(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Wait until the service is ready. Returns `false` if a stop was
    /// requested first.
    pub async fn wait_ready(&self) -> bool {
        loop {
            let changed = self.changed.notified();
            if self.is_stopping() {
                return false;
            }
            if self.is_ready() {
                return true;
            }
            changed.await;
        }
    }

    /// Wait until a stop is requested.
    pub async fn stopped(&self) {
        loop {
            let changed = self.changed.notified();
            if self.is_stopping() {
                return;
            }
            changed.await;
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Runs the maintenance sweeps against one ledger.
pub struct Scheduler {
    ledger: Arc<Ledger>,
    rates: Arc<dyn RatesStore>,
    notifier: Arc<dyn Notifier>,
    control: Arc<SchedulerControl>,
    period: Duration,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("control", &self.control)
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create a scheduler running each job once per `period`.
    pub fn new(
        ledger: Arc<Ledger>,
        rates: Arc<dyn RatesStore>,
        notifier: Arc<dyn Notifier>,
        period: Duration,
    ) -> Self {
        Self {
            ledger,
            rates,
            notifier,
            control: Arc::new(SchedulerControl::new()),
            period: period.max(Duration::from_secs(1)),
        }
    }

    /// The readiness gate and stop signal for this scheduler's tasks.
    pub fn control(&self) -> Arc<SchedulerControl> {
        Arc::clone(&self.control)
    }

    /// Run `job` once over every account.
    pub async fn run_job(&self, job: MaintenanceJob) -> Result<SweepReport, SchedulerError> {
        let rates = self.rates.load_rates()?;
        let rate = match job {
            MaintenanceJob::Interest => rates.interest_rate,
            MaintenanceJob::Tax => rates.tax_rate,
        };

        let mut locked = self.ledger.lock_all().await;
        let mut notices = Vec::new();
        let mut report = SweepReport {
            job,
            rate,
            accounts_touched: 0,
            total_moved: 0,
        };

        for (user, account) in locked.iter_mut() {
            let moved = match job {
                MaintenanceJob::Interest => {
                    let interest = rates.interest_on(account.bank);
                    account.bank = account.bank.saturating_add(interest);
                    interest
                }
                MaintenanceJob::Tax => {
                    let taxed = rates.tax_on(account.wallet);
                    account.wallet = account.wallet.saturating_sub(taxed);
                    if taxed > 0 {
                        notices.push(TaxNotice {
                            user,
                            taxed,
                            rate,
                            wallet: account.wallet,
                        });
                    }
                    taxed
                }
            };
            if moved > 0 {
                report.accounts_touched = report.accounts_touched.saturating_add(1);
                report.total_moved = report.total_moved.saturating_add(moved);
            }
        }

        if report.accounts_touched > 0 {
            locked.commit()?;
        } else {
            drop(locked);
        }

        for notice in &notices {
            if let Err(err) = self.notifier.notify(notice) {
                warn!(user = %notice.user, error = %err, "tax notice not delivered");
            }
        }

        info!(
            job = %job,
            rate = %rate,
            accounts = report.accounts_touched,
            total = report.total_moved,
            "maintenance sweep complete"
        );
        Ok(report)
    }

    /// Run `job` every period until a stop is requested.
    ///
    /// The first run happens as soon as the control is marked ready. A
    /// failed run is logged and the next period proceeds as usual.
    pub async fn run_periodic(&self, job: MaintenanceJob) {
        if !self.control.wait_ready().await {
            return;
        }
        info!(job = %job, period_secs = self.period.as_secs(), "maintenance job started");

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = self.control.stopped() => break,
                _ = ticker.tick() => {}
            }
            if let Err(err) = self.run_job(job).await {
                warn!(job = %job, error = %err, "maintenance sweep failed");
            }
        }
        info!(job = %job, "maintenance job stopped");
    }

    /// Spawn one task per job. Each waits for readiness on its own.
    pub fn spawn(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        MaintenanceJob::ALL
            .into_iter()
            .map(|job| {
                let scheduler = Arc::clone(self);
                tokio::spawn(async move { scheduler.run_periodic(job).await })
            })
            .collect()
    }
}
