//! Concurrency tests for the ledger's per-account critical sections.
//!
//! Many tasks mutate overlapping accounts at once; every mutation must land
//! exactly once and cross-account sections must never deadlock.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::sync::Arc;

use futures::future::join_all;

use coffer_ledger::{AccountStore, Ledger, LedgerError, MemoryStore};
use coffer_types::{Account, UserId};

fn open(store: &Arc<MemoryStore>) -> Arc<Ledger> {
    Arc::new(Ledger::open(Arc::clone(store) as Arc<dyn AccountStore>).expect("open ledger"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_credits_to_one_account_all_land() {
    let store = Arc::new(MemoryStore::new());
    let ledger = open(&store);
    let id = UserId(42);

    let tasks = (0..64).map(|_| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move {
            ledger
                .with_account(id, |account| {
                    account.wallet += 10;
                    Ok::<_, LedgerError>(())
                })
                .await
        })
    });

    for joined in join_all(tasks).await {
        joined.expect("task panicked").expect("credit failed");
    }

    assert_eq!(ledger.snapshot(id).unwrap().wallet, 100 + 64 * 10);
    assert_eq!(store.contents().get(&id).unwrap().wallet, 740);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn opposing_transfers_do_not_deadlock_and_conserve_coins() {
    let a = UserId(1);
    let b = UserId(2);
    let store = Arc::new(MemoryStore::with_accounts([
        (a, Account { wallet: 1000, ..Account::default() }),
        (b, Account { wallet: 1000, ..Account::default() }),
    ]));
    let ledger = open(&store);

    let tasks = (0..40).map(|n| {
        let ledger = Arc::clone(&ledger);
        let (from, to) = if n % 2 == 0 { (a, b) } else { (b, a) };
        tokio::spawn(async move {
            ledger
                .with_accounts(from, to, |payer, payee| {
                    payer.wallet -= 5;
                    payee.wallet += 5;
                    Ok::<_, LedgerError>(())
                })
                .await
        })
    });

    for joined in join_all(tasks).await {
        joined.expect("task panicked").expect("transfer failed");
    }

    let total = ledger.snapshot(a).unwrap().wallet + ledger.snapshot(b).unwrap().wallet;
    assert_eq!(total, 2000);
    assert_eq!(ledger.snapshot(a).unwrap().wallet, 1000);
}

#[tokio::test]
async fn sweep_waits_for_in_flight_mutation() {
    let id = UserId(7);
    let store = Arc::new(MemoryStore::with_accounts([(id, Account::default())]));
    let ledger = open(&store);

    let mut held = ledger.lock(&[id]).await;
    held.account_mut(id).unwrap().wallet = 500;

    let sweeper = {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move {
            let mut all = ledger.lock_all().await;
            let wallet = all.account(id).unwrap().wallet;
            all.account_mut(id).unwrap().wallet = wallet - 10;
            all.commit().unwrap();
            wallet
        })
    };

    tokio::task::yield_now().await;
    held.commit().unwrap();

    let seen = sweeper.await.expect("sweeper panicked");
    assert_eq!(seen, 500);
    assert_eq!(ledger.snapshot(id).unwrap().wallet, 490);
}
