//! File-backed ledger: failed invocations leave the snapshot byte-identical
//! and a reopened ledger sees exactly what was committed.

use std::sync::Arc;

use budget_adapters::RejectingPaymentGateway;
use budget_conformance::{check, Harness, EXECUTOR, LEDGER_ACCOUNT};
use budget_core::{
    BudgetLedger, ErrorKind, Invocation, LedgerHost, LedgerSettings, MultiSigVerifier,
};
use budget_storage::{FileLedgerStore, LedgerStorageConfig, LedgerStore};
use budget_types::{AccountId, Capability, DepartmentId, ExpenditureId};

fn file_harness(path: &std::path::Path) -> Harness {
    let store: Arc<dyn LedgerStore> = Arc::new(FileLedgerStore::open(path).unwrap());
    Harness::with_store(store)
}

#[test]
fn failures_leave_snapshot_bytes_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let h = file_harness(&path);
    h.initialize().unwrap();
    let d1 = h.create_department("D1", "cap1").unwrap();
    h.set_allowance(d1, "cap1", 500).unwrap();
    let x1 = h.add_expenditure(d1, "cap1", "X1", "alice", 300).unwrap();
    h.spend(d1, "cap1", x1, 100).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let failures = [
        h.spend(d1, "cap1", x1, 250).unwrap_err().kind(),
        h.spend(d1, "wrong", x1, 1).unwrap_err().kind(),
        h.spend(d1, "cap1", ExpenditureId(9), 1).unwrap_err().kind(),
        h.add_expenditure(d1, "cap1", "X2", "bob", 250).unwrap_err().kind(),
        h.add_expenditure(d1, "cap1", "X2", "nobody", 1).unwrap_err().kind(),
        h.ledger
            .propose_allowance(&h.exec("cap1"), d1, 500)
            .unwrap_err()
            .kind(),
        h.ledger
            .set_enabled(&h.exec("toggle-department"), d1, true)
            .unwrap_err()
            .kind(),
        h.initialize().unwrap_err().kind(),
    ];
    assert_eq!(
        failures,
        [
            ErrorKind::QuotaExceeded,
            ErrorKind::Unauthorized,
            ErrorKind::NotFound,
            ErrorKind::QuotaExceeded,
            ErrorKind::InvalidIdentity,
            ErrorKind::NoOp,
            ErrorKind::NoOp,
            ErrorKind::AlreadyInitialized,
        ]
    );
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
}

#[test]
fn reopened_ledger_sees_committed_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let (d1, x1) = {
        let h = file_harness(&path);
        h.initialize().unwrap();
        let d1 = h.create_department("D1", "cap1").unwrap();
        h.set_allowance(d1, "cap1", 500).unwrap();
        let x1 = h.add_expenditure(d1, "cap1", "X1", "alice", 300).unwrap();
        h.spend(d1, "cap1", x1, 120).unwrap();
        (d1, x1)
    };

    let h = file_harness(&path);
    assert_eq!(h.ledger.get_config().unwrap().executor, AccountId::new(EXECUTOR));
    assert_eq!(h.ledger.expenditure(d1, x1).unwrap().allowance_used, 120);
    assert_eq!(h.ledger.department(d1).unwrap().allowance_allocated, 300);
    assert!(check(&h.ledger.store().snapshot().unwrap()).is_empty());

    // Ids continue from the persisted maximum.
    assert_eq!(h.create_department("D2", "cap2").unwrap(), DepartmentId(2));
}

#[test]
fn refused_payment_aborts_the_spend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let h = file_harness(&path);
    h.initialize().unwrap();
    let d1 = h.create_department("D1", "cap1").unwrap();
    h.set_allowance(d1, "cap1", 500).unwrap();
    let x1 = h.add_expenditure(d1, "cap1", "X1", "alice", 300).unwrap();

    let host = h
        .ledger
        .host()
        .clone();
    let host = LedgerHost {
        payments: Arc::new(RejectingPaymentGateway::new("custody frozen")),
        ..host
    };
    let ledger = BudgetLedger::new(h.ledger.store().clone(), host);
    let bytes = std::fs::read(&path).unwrap();

    let err = ledger
        .spend(&h.exec("cap1"), d1, x1, 10, "rent")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Payment);
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
    assert!(ledger.expense_history(&Default::default()).unwrap().is_empty());
}

#[test]
fn settings_drive_backend_and_capability_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = LedgerSettings {
        storage: LedgerStorageConfig::file(dir.path().join("ledger.json")),
        ..LedgerSettings::default()
    };
    settings.capabilities.process_application = Capability::new("board");
    settings.limits.max_memo_bytes = 8;

    let base = Harness::new();
    let ledger = BudgetLedger::open(&settings, base.ledger.host().clone()).unwrap();
    let h = Harness {
        ledger,
        clock: base.clock.clone(),
        payments: base.payments.clone(),
    };
    h.initialize().unwrap();
    let d1 = h.create_department("D1", "cap1").unwrap();
    let app = h.ledger.propose_allowance(&h.exec("cap1"), d1, 100).unwrap();

    let err = h
        .ledger
        .process_application(&h.exec("process-application"), app.id, true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    h.ledger
        .process_application(&h.exec("board"), app.id, true)
        .unwrap();

    let x1 = h.add_expenditure(d1, "cap1", "X1", "alice", 50).unwrap();
    let err = h
        .ledger
        .spend(&h.exec("cap1"), d1, x1, 1, "nine byte")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    h.ledger.spend(&h.exec("cap1"), d1, x1, 1, "8 bytes!").unwrap();
}

#[test]
fn multisig_gate_protects_approvals() {
    let verifier = MultiSigVerifier::new().require(
        Capability::new("process-application"),
        2,
        ["cfo-key", "ceo-key", "board-key"],
    );
    let h = Harness::initialized()
        .unwrap()
        .with_verifier(Arc::new(verifier));
    let d1 = h.create_department("D1", "cap1").unwrap();
    let app = h.ledger.propose_allowance(&h.exec("cap1"), d1, 100).unwrap();

    let executor = AccountId::new(EXECUTOR);
    let cap = Capability::new("process-application");
    let one_key = Invocation::new(executor.clone()).with_authorization(
        budget_core::Authorization::new(executor.clone(), cap.clone()).with_key("cfo-key"),
    );
    let err = h
        .ledger
        .process_application(&one_key, app.id, true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let two_keys = one_key.with_authorization(
        budget_core::Authorization::new(executor, cap).with_key("board-key"),
    );
    h.ledger.process_application(&two_keys, app.id, true).unwrap();
    assert_eq!(h.ledger.department(d1).unwrap().monthly_allowance, 100);
}

#[test]
fn platform_authority_is_not_the_executor() {
    let h = Harness::new();
    let err = h
        .ledger
        .initialize(
            &Invocation::signed(AccountId::new(EXECUTOR), Capability::new("active")),
            AccountId::new(EXECUTOR),
            budget_conformance::token(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    h.ledger
        .initialize(
            &Invocation::signed(AccountId::new(LEDGER_ACCOUNT), Capability::new("active")),
            AccountId::new(EXECUTOR),
            budget_conformance::token(),
        )
        .unwrap();
}
