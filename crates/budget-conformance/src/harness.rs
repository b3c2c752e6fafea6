//! A ledger wired to reference collaborators and a manual clock.

use std::sync::Arc;

use budget_adapters::{RecordingPaymentGateway, StaticDirectory};
use budget_core::{
    BudgetLedger, CapabilityVerifier, Invocation, LedgerHost, LedgerResult, LedgerSettings,
    ManualClock,
};
use budget_storage::{InMemoryLedgerStore, LedgerStore};
use budget_types::{AccountId, Amount, AssetReference, Capability, DepartmentId, ExpenditureId};
use chrono::{DateTime, TimeZone, Utc};

/// Account the ledger runs under.
pub const LEDGER_ACCOUNT: &str = "budget.ledger";
/// Executor written by [`Harness::initialized`].
pub const EXECUTOR: &str = "executor";
/// Payees known to the directory.
pub const RECIPIENTS: [&str; 3] = ["alice", "bob", "carol"];

pub fn token() -> AssetReference {
    AssetReference::new(AccountId::new("token.host"), "SYS", 4)
}

/// 2026-03-15 12:00 UTC; every harness clock starts here.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

pub struct Harness {
    pub ledger: BudgetLedger,
    pub clock: Arc<ManualClock>,
    pub payments: Arc<RecordingPaymentGateway>,
}

impl Harness {
    /// Uninitialized ledger over an in-memory store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryLedgerStore::new()))
    }

    pub fn with_store(store: Arc<dyn LedgerStore>) -> Self {
        let directory = StaticDirectory::new()
            .with_accounts([LEDGER_ACCOUNT, EXECUTOR])
            .with_accounts(RECIPIENTS)
            .with_asset(&token());
        let clock = Arc::new(ManualClock::new(start_time()));
        let payments = Arc::new(RecordingPaymentGateway::new());
        let host = LedgerHost::new(
            AccountId::new(LEDGER_ACCOUNT),
            Arc::new(directory),
            payments.clone(),
        )
        .with_clock(clock.clone());

        Self {
            ledger: BudgetLedger::new(store, host),
            clock,
            payments,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn CapabilityVerifier>) -> Self {
        let host = self.ledger.host().clone().with_verifier(verifier);
        self.ledger = BudgetLedger::new(self.ledger.store().clone(), host);
        self
    }

    pub fn with_settings(mut self, settings: &LedgerSettings) -> Self {
        self.ledger = BudgetLedger::new(self.ledger.store().clone(), self.ledger.host().clone())
            .with_settings(settings);
        self
    }

    /// Ledger initialized with [`EXECUTOR`] and [`token`].
    pub fn initialized() -> LedgerResult<Self> {
        let harness = Self::new();
        harness.initialize()?;
        Ok(harness)
    }

    pub fn initialize(&self) -> LedgerResult<()> {
        self.ledger
            .initialize(&self.platform(), AccountId::new(EXECUTOR), token())?;
        Ok(())
    }

    /// The ledger's own account signing with the platform capability.
    pub fn platform(&self) -> Invocation {
        Invocation::signed(
            AccountId::new(LEDGER_ACCOUNT),
            self.ledger.capabilities().platform.clone(),
        )
    }

    /// The executor signing with `capability`.
    pub fn exec(&self, capability: &str) -> Invocation {
        Invocation::signed(AccountId::new(EXECUTOR), Capability::new(capability))
    }

    pub fn create_department(&self, name: &str, capability: &str) -> LedgerResult<DepartmentId> {
        let add = self.ledger.capabilities().add_department.clone();
        let invocation = Invocation::signed(AccountId::new(EXECUTOR), add);
        Ok(self
            .ledger
            .create_department(&invocation, name, Capability::new(capability))?
            .id)
    }

    /// Propose and approve a new ceiling.
    pub fn set_allowance(
        &self,
        department: DepartmentId,
        capability: &str,
        allowance: Amount,
    ) -> LedgerResult<()> {
        let application =
            self.ledger
                .propose_allowance(&self.exec(capability), department, allowance)?;
        let process = self.ledger.capabilities().process_application.clone();
        self.ledger.process_application(
            &Invocation::signed(AccountId::new(EXECUTOR), process),
            application.id,
            true,
        )?;
        Ok(())
    }

    pub fn add_expenditure(
        &self,
        department: DepartmentId,
        capability: &str,
        name: &str,
        recipient: &str,
        allowance: Amount,
    ) -> LedgerResult<ExpenditureId> {
        Ok(self
            .ledger
            .add_expenditure(
                &self.exec(capability),
                department,
                name,
                AccountId::new(recipient),
                allowance,
            )?
            .id)
    }

    pub fn spend(
        &self,
        department: DepartmentId,
        capability: &str,
        expenditure: ExpenditureId,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.ledger
            .spend(&self.exec(capability), department, expenditure, amount, "")?;
        Ok(())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
