//! Transfer consistency against a live PostgreSQL instance
//!
//! Run with: `DATABASE_URL=postgres://... cargo test --test postgres_transfers -- --ignored`
//! The test truncates the `account` and `transfer` tables.

use std::sync::Arc;

use stn_accounts::account::AccountCreation;
use stn_accounts::db::{Database, tx::DEFAULT_TX_TIMEOUT};
use stn_accounts::error::ErrorKind;
use stn_accounts::gateway::state::AppState;
use stn_accounts::transfer::TransferCreation;
use stn_accounts::user_auth::{Argon2Hasher, TokenService};

async fn setup() -> (Database, AppState) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&url, 10).await.unwrap();
    db.init_schema().await.unwrap();
    sqlx::query("TRUNCATE transfer, account RESTART IDENTITY CASCADE")
        .execute(db.pool())
        .await
        .unwrap();

    let tokens = Arc::new(TokenService::new("test-secret", chrono::Duration::minutes(5)));
    let hasher = Arc::new(Argon2Hasher::fast().unwrap());
    let state = AppState::postgres(db.clone(), tokens, hasher, DEFAULT_TX_TIMEOUT);
    (db, state)
}

fn account(name: &str, cpf: &str, balance: f64) -> AccountCreation {
    AccountCreation {
        name: name.to_string(),
        cpf: cpf.to_string(),
        secret: "s3cr3t".to_string(),
        balance,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires PostgreSQL database"]
async fn test_postgres_transfer_flow() {
    let (db, state) = setup().await;

    let alice = state
        .accounts
        .create(account("Alice", "52998224725", 100.0))
        .await
        .unwrap();
    let bob = state
        .accounts
        .create(account("Bob", "11144477735", 100.0))
        .await
        .unwrap();

    let err = state
        .accounts
        .create(account("Again", "52998224725", 0.0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Overdraft leaves both balances untouched
    let err = state
        .transfers
        .create(
            alice.id,
            TransferCreation {
                account_destination_id: bob.id,
                amount: 100.01,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Opposite transfers in parallel must not deadlock and must conserve the total
    let mut handles = Vec::new();
    for i in 0..20 {
        let transfers = state.transfers.clone();
        let (from, to) = if i % 2 == 0 {
            (alice.id, bob.id)
        } else {
            (bob.id, alice.id)
        };
        handles.push(tokio::spawn(async move {
            transfers
                .create(
                    from,
                    TransferCreation {
                        account_destination_id: to,
                        amount: 1.5,
                    },
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let a = state.accounts.get_balance(alice.id).await.unwrap();
    let b = state.accounts.get_balance(bob.id).await.unwrap();
    assert_eq!(a.minor_units() + b.minor_units(), 20_000);
    assert_eq!(a.minor_units(), 10_000);

    let sent = state.transfers.fetch(alice.id).await.unwrap();
    assert_eq!(sent.len(), 10);

    let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(balance), 0)::BIGINT FROM account")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(total, 20_000);
}
