//! Two-party transfers confirmed by the initiator.
//!
//! # Protocol
//!
//! 1. [`Economy::request_transfer`](crate::Economy::request_transfer)
//!    validates the request and checks the initiator's wallet once.
//! 2. The caller gets a [`TransferResponder`] to wire to its confirm and
//!    cancel controls, and a [`PendingTransfer`] to await.
//! 3. [`PendingTransfer::settle`] resolves to exactly one
//!    [`TransferOutcome`]. A confirmation re-checks the wallet and moves
//!    the coins in one critical section over both accounts.
//!
//! The deadline is fixed at issuance and does not depend on any response
//! arriving. A decision is stamped with the instant it was given: the
//! responder refuses decisions at or past the deadline, and `settle` treats
//! any decision stamped that late as a timeout even if it is still buffered
//! when `settle` first polls.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, timeout_at};

use coffer_ledger::Ledger;
use coffer_types::{TransferId, UserId};

use crate::error::EconomyError;

/// Time the initiator has to confirm.
pub const CONFIRM_WINDOW: Duration = Duration::from_secs(60);

/// The initiator's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Move the coins.
    Confirm,
    /// Abandon the transfer.
    Cancel,
}

/// Terminal state of a transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The coins moved.
    Confirmed,
    /// The initiator declined. Nothing moved.
    Cancelled,
    /// No decision before the deadline. Nothing moved.
    TimedOut,
}

// ---------------------------------------------------------------------------
// TransferResponder
// ---------------------------------------------------------------------------

/// Accepts the single decision for one transfer request.
#[derive(Debug)]
pub struct TransferResponder {
    id: TransferId,
    initiator: UserId,
    deadline: Instant,
    decision: Mutex<Option<oneshot::Sender<(Decision, Instant)>>>,
}

impl TransferResponder {
    /// The request this responder answers.
    pub const fn id(&self) -> TransferId {
        self.id
    }

    /// When the request stops accepting decisions.
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Confirm on behalf of `actor`.
    pub fn confirm(&self, actor: UserId) -> Result<(), EconomyError> {
        self.respond(actor, Decision::Confirm)
    }

    /// Cancel on behalf of `actor`.
    pub fn cancel(&self, actor: UserId) -> Result<(), EconomyError> {
        self.respond(actor, Decision::Cancel)
    }

    /// Deliver `decision`. Only the initiator may decide, only once, and
    /// only before the deadline. A refused actor does not use up the request.
    pub fn respond(&self, actor: UserId, decision: Decision) -> Result<(), EconomyError> {
        if actor != self.initiator {
            return Err(EconomyError::invalid("only the sender can answer this transfer"));
        }
        let given_at = Instant::now();
        if given_at >= self.deadline {
            return Err(EconomyError::invalid("transfer confirmation window has closed"));
        }
        let sender = self
            .decision
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| EconomyError::invalid("transfer already answered"))?;
        sender
            .send((decision, given_at))
            .map_err(|unsent| EconomyError::invalid(format!("transfer already settled, {unsent:?} not applied")))
    }
}

// ---------------------------------------------------------------------------
// PendingTransfer
// ---------------------------------------------------------------------------

/// A validated transfer waiting for its decision.
pub struct PendingTransfer {
    id: TransferId,
    from: UserId,
    to: UserId,
    amount: i64,
    deadline: Instant,
    decision: oneshot::Receiver<(Decision, Instant)>,
    ledger: Arc<Ledger>,
}

impl core::fmt::Debug for PendingTransfer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingTransfer")
            .field("id", &self.id)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("amount", &self.amount)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl PendingTransfer {
    /// Request id.
    pub const fn id(&self) -> TransferId {
        self.id
    }

    /// Paying account.
    pub const fn from(&self) -> UserId {
        self.from
    }

    /// Receiving account.
    pub const fn to(&self) -> UserId {
        self.to
    }

    /// Coins to move.
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// When the request times out.
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Wait for the decision and apply it.
    ///
    /// A confirmation whose initiator can no longer cover the amount fails
    /// with [`EconomyError::InsufficientFunds`] and moves nothing. A
    /// responder dropped without answering, or a decision given at or past
    /// the deadline, counts as a timeout.
    pub async fn settle(self) -> Result<TransferOutcome, EconomyError> {
        let Self {
            id,
            from,
            to,
            amount,
            deadline,
            decision,
            ledger,
        } = self;

        let decided = match timeout_at(deadline, decision).await {
            Ok(Ok((decision, given_at))) if given_at < deadline => Some(decision),
            Ok(_) | Err(_) => None,
        };

        match decided {
            Some(Decision::Confirm) => {
                ledger
                    .with_accounts(from, to, |sender, recipient| {
                        EconomyError::require_funds(amount, sender.wallet)?;
                        sender.wallet = sender.wallet.saturating_sub(amount);
                        recipient.wallet = recipient.wallet.saturating_add(amount);
                        Ok::<_, EconomyError>(())
                    })
                    .await?;
                tracing::info!(transfer = %id, from = %from, to = %to, amount, "transfer confirmed");
                Ok(TransferOutcome::Confirmed)
            }
            Some(Decision::Cancel) => {
                tracing::debug!(transfer = %id, "transfer cancelled");
                Ok(TransferOutcome::Cancelled)
            }
            None => {
                tracing::debug!(transfer = %id, "transfer timed out");
                Ok(TransferOutcome::TimedOut)
            }
        }
    }
}

/// Validate a transfer and open its decision channel.
pub(crate) async fn open(
    ledger: Arc<Ledger>,
    from: UserId,
    to: UserId,
    amount: i64,
) -> Result<(TransferResponder, PendingTransfer), EconomyError> {
    if amount <= 0 {
        return Err(EconomyError::invalid("transfer amount must be positive"));
    }
    if from == to {
        return Err(EconomyError::invalid("cannot transfer to yourself"));
    }

    let sender = ledger.ensure(from).await?;
    ledger.ensure(to).await?;
    EconomyError::require_funds(amount, sender.wallet)?;

    let id = TransferId::new();
    let issued = Instant::now();
    let deadline = issued.checked_add(CONFIRM_WINDOW).unwrap_or(issued);
    let (tx, rx) = oneshot::channel();
    let responder = TransferResponder {
        id,
        initiator: from,
        deadline,
        decision: Mutex::new(Some(tx)),
    };
    let pending = PendingTransfer {
        id,
        from,
        to,
        amount,
        deadline,
        decision: rx,
        ledger,
    };
    tracing::debug!(transfer = %id, from = %from, to = %to, amount, "transfer requested");
    Ok((responder, pending))
}
