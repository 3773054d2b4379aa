use std::sync::Arc;

use transfer_ledger::service::{LedgerApi, LedgerService};
use transfer_ledger::store::MemoryBackend;
use transfer_ledger::{LedgerError, Money};

fn service() -> LedgerService<MemoryBackend> {
    LedgerService::new(Arc::new(MemoryBackend::new()))
}

async fn balance(svc: &LedgerService<MemoryBackend>, account: i64) -> String {
    svc.get_account(account).await.unwrap().balance
}

async fn total(svc: &LedgerService<MemoryBackend>, accounts: &[i64]) -> Money {
    let mut sum = Money::ZERO;
    for account in accounts {
        sum = sum + Money::parse(&balance(svc, *account).await).unwrap();
    }
    sum
}

#[tokio::test]
async fn scenario_transfer_then_overdraw() {
    let svc = service();
    svc.create_account(1, "100.00000").await.unwrap();
    svc.create_account(2, "0").await.unwrap();

    svc.create_transfer(1, 2, "30.5").await.unwrap();
    assert_eq!(balance(&svc, 1).await, "69.5");
    assert_eq!(balance(&svc, 2).await, "30.5");

    assert_eq!(
        svc.create_transfer(1, 2, "100").await.unwrap_err(),
        LedgerError::InsufficientBalance
    );
    assert_eq!(balance(&svc, 1).await, "69.5");
    assert_eq!(balance(&svc, 2).await, "30.5");
}

#[tokio::test]
async fn rejected_transfers_leave_no_trace() {
    let svc = service();
    svc.create_account(1, "10").await.unwrap();
    svc.create_account(2, "10").await.unwrap();

    let cases = [
        (1, 2, "0", "INVALID_AMOUNT"),
        (1, 2, "-5", "INVALID_AMOUNT"),
        (1, 2, "abc", "MALFORMED_AMOUNT"),
        (1, 2, "", "MALFORMED_AMOUNT"),
        (1, 2, ".5", "MALFORMED_AMOUNT"),
        (1, 2, "1.000001", "MALFORMED_AMOUNT"),
        (1, 1, "1", "SELF_TRANSFER"),
        (0, 2, "1", "INVALID_IDENTITY"),
        (1, 3, "1", "NOT_FOUND"),
        (3, 1, "1", "NOT_FOUND"),
        (1, 2, "10.00001", "INSUFFICIENT_BALANCE"),
    ];
    for (source, destination, amount, code) in cases {
        let err = svc
            .create_transfer(source, destination, amount)
            .await
            .unwrap_err();
        assert_eq!(err.code(), code, "{} -> {} amount {:?}", source, destination, amount);
    }

    assert_eq!(balance(&svc, 1).await, "10");
    assert_eq!(balance(&svc, 2).await, "10");
    assert!(svc.list_transfers(1, 100).await.unwrap().is_empty());
}

#[tokio::test]
async fn self_transfer_rejected_even_with_funds() {
    let svc = service();
    svc.create_account(5, "1000").await.unwrap();
    assert_eq!(
        svc.create_transfer(5, 5, "1").await.unwrap_err(),
        LedgerError::SelfTransfer(5)
    );
}

#[tokio::test]
async fn create_account_validation() {
    let svc = service();

    let cases = [
        (0, "1", "INVALID_IDENTITY"),
        (-1, "1", "INVALID_IDENTITY"),
        (1, "-1", "INVALID_AMOUNT"),
        (1, "1.123456", "MALFORMED_AMOUNT"),
        (1, "1e5", "MALFORMED_AMOUNT"),
        (1, "1000000000000000", "MALFORMED_AMOUNT"),
    ];
    for (account, initial, code) in cases {
        let err = svc.create_account(account, initial).await.unwrap_err();
        assert_eq!(err.code(), code, "account {} initial {:?}", account, initial);
    }

    svc.create_account(1, "999999999999999.99999").await.unwrap();
    assert_eq!(balance(&svc, 1).await, "999999999999999.99999");
}

#[tokio::test]
async fn chain_of_transfers_conserves_total() {
    let svc = service();
    let accounts = [1, 2, 3, 4];
    for account in accounts {
        svc.create_account(account, "25.25").await.unwrap();
    }
    let before = total(&svc, &accounts).await;

    svc.create_transfer(1, 2, "25.25").await.unwrap();
    svc.create_transfer(2, 3, "50.5").await.unwrap();
    svc.create_transfer(3, 4, "0.00001").await.unwrap();
    svc.create_transfer(4, 1, "10").await.unwrap();

    assert_eq!(total(&svc, &accounts).await, before);
    assert_eq!(balance(&svc, 1).await, "10");
    assert_eq!(balance(&svc, 2).await, "0");
    assert_eq!(balance(&svc, 3).await, "75.74999");
    assert_eq!(balance(&svc, 4).await, "15.25001");

    let history = svc.list_transfers(3, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].amount, "0.00001");
    assert_eq!(history[1].amount, "50.5");
}
