//! Shared unit-test fixtures.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use budget_storage::InMemoryLedgerStore;
use budget_types::{AccountId, Amount, AssetReference, Capability, DepartmentId, ExpenditureId};
use chrono::{TimeZone, Utc};

pub use crate::clock::{Clock, ManualClock};
use crate::host::{IdentityDirectory, Invocation, LedgerHost};
use crate::ledger::BudgetLedger;
use crate::payment::{PaymentError, PaymentGateway, TransferReceipt, TransferRequest};

pub fn ledger_account() -> AccountId {
    AccountId::new("budget.ledger")
}

pub fn executor() -> AccountId {
    AccountId::new("cfo")
}

pub fn token() -> AssetReference {
    AssetReference::new(AccountId::new("token.host"), "SYS", 4)
}

pub struct Directory {
    accounts: BTreeSet<AccountId>,
}

impl IdentityDirectory for Directory {
    fn account_exists(&self, account: &AccountId) -> bool {
        self.accounts.contains(account)
    }

    fn asset_exists(&self, asset: &AssetReference) -> bool {
        asset.contract.as_str() == "token.host" && asset.symbol == "SYS"
    }
}

#[derive(Default)]
pub struct Payments {
    sent: RwLock<Vec<TransferRequest>>,
    refuse: RwLock<bool>,
}

impl Payments {
    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.sent.read().unwrap().clone()
    }

    pub fn refuse_next(&self) {
        *self.refuse.write().unwrap() = true;
    }
}

impl PaymentGateway for Payments {
    fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, PaymentError> {
        let mut refuse = self.refuse.write().unwrap();
        if *refuse {
            *refuse = false;
            return Err(PaymentError::Rejected {
                contract: request.asset.contract.clone(),
                reason: "overdrawn balance".to_string(),
            });
        }
        let mut sent = self.sent.write().unwrap();
        sent.push(request.clone());
        Ok(TransferReceipt {
            transfer_id: format!("tx-{}", sent.len()),
            settled_at: Utc::now(),
        })
    }
}

pub struct Fixture {
    pub ledger: BudgetLedger,
    pub clock: Arc<ManualClock>,
    pub payments: Arc<Payments>,
}

impl Fixture {
    pub fn new() -> Self {
        let accounts = ["budget.ledger", "cfo", "token.host", "landlord", "cloud"]
            .into_iter()
            .map(AccountId::new)
            .collect();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap(),
        ));
        let payments = Arc::new(Payments::default());
        let host = LedgerHost::new(
            ledger_account(),
            Arc::new(Directory { accounts }),
            payments.clone(),
        )
        .with_clock(clock.clone());

        Self {
            ledger: BudgetLedger::new(Arc::new(InMemoryLedgerStore::new()), host),
            clock,
            payments,
        }
    }

    pub fn initialized() -> Self {
        let fx = Self::new();
        fx.ledger
            .initialize(&fx.platform(), executor(), token())
            .unwrap();
        fx
    }

    pub fn platform(&self) -> Invocation {
        Invocation::signed(ledger_account(), Capability::new("active"))
    }

    pub fn exec(&self, capability: &str) -> Invocation {
        Invocation::signed(executor(), Capability::new(capability))
    }

    pub fn department(&self, name: &str, capability: &str) -> DepartmentId {
        self.ledger
            .create_department(&self.exec("add-department"), name, Capability::new(capability))
            .unwrap()
            .id
    }

    pub fn set_allowance(&self, department: DepartmentId, capability: &str, allowance: Amount) {
        let app = self
            .ledger
            .propose_allowance(&self.exec(capability), department, allowance)
            .unwrap();
        self.ledger
            .process_application(&self.exec("process-application"), app.id, true)
            .unwrap();
    }

    pub fn funded_department(&self, name: &str, capability: &str, allowance: Amount) -> DepartmentId {
        let id = self.department(name, capability);
        self.set_allowance(id, capability, allowance);
        id
    }

    pub fn expenditure(
        &self,
        department: DepartmentId,
        capability: &str,
        name: &str,
        recipient: &str,
        allowance: Amount,
    ) -> ExpenditureId {
        self.ledger
            .add_expenditure(
                &self.exec(capability),
                department,
                name,
                AccountId::new(recipient),
                allowance,
            )
            .unwrap()
            .id
    }
}
