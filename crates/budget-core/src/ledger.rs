//! The budget ledger and its configuration store.
//!
//! [`BudgetLedger`] owns the store handle, the host collaborators and the
//! operator settings. Mutating operations are spread over the registry,
//! workflow and spend modules as further `impl BudgetLedger` blocks; each of
//! them reads, stages a [`ChangeSet`], and commits it once at the very end so
//! a failure anywhere leaves the store as it was.

use std::sync::{Arc, Mutex, MutexGuard};

use budget_storage::{open_store, ChangeSet, LedgerStore, Write};
use budget_types::{
    AccountId, AssetReference, Capability, Department, DepartmentId, Expenditure, ExpenditureId,
    LedgerConfig,
};
use tracing::{debug, info, info_span, span::EnteredSpan};
use uuid::Uuid;

use crate::auth::AuthorizationGate;
use crate::error::{LedgerError, LedgerResult};
use crate::host::{Invocation, LedgerHost};
use crate::settings::{CapabilitySettings, LedgerSettings, LimitSettings};

/// Permissioned departmental budget ledger.
pub struct BudgetLedger {
    store: Arc<dyn LedgerStore>,
    host: LedgerHost,
    gate: AuthorizationGate,
    capabilities: CapabilitySettings,
    limits: LimitSettings,
    /// Serializes mutating invocations
    invocation_lock: Mutex<()>,
}

impl BudgetLedger {
    /// Ledger over `store` with default settings.
    pub fn new(store: Arc<dyn LedgerStore>, host: LedgerHost) -> Self {
        let gate = AuthorizationGate::new(host.verifier.clone());
        Self {
            store,
            host,
            gate,
            capabilities: CapabilitySettings::default(),
            limits: LimitSettings::default(),
            invocation_lock: Mutex::new(()),
        }
    }

    /// Open the store named in `settings` and build a ledger over it.
    pub fn open(settings: &LedgerSettings, host: LedgerHost) -> LedgerResult<Self> {
        let store = open_store(&settings.storage)?;
        info!(
            backend = store.backend(),
            account = %host.account,
            "budget ledger opened"
        );
        Ok(Self::new(store, host).with_settings(settings))
    }

    pub fn with_settings(mut self, settings: &LedgerSettings) -> Self {
        self.capabilities = settings.capabilities.clone();
        self.limits = settings.limits.clone();
        self
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn host(&self) -> &LedgerHost {
        &self.host
    }

    pub fn capabilities(&self) -> &CapabilitySettings {
        &self.capabilities
    }

    pub fn limits(&self) -> &LimitSettings {
        &self.limits
    }

    /// Write the configuration record. Callable once, by the ledger's own
    /// account signing with the platform capability.
    pub fn initialize(
        &self,
        invocation: &Invocation,
        executor: AccountId,
        asset: AssetReference,
    ) -> LedgerResult<LedgerConfig> {
        let _span = self.begin("initialize");
        let _serial = self.serialize();

        self.gate
            .authorize_account(&self.host.account, invocation, &self.capabilities.platform)?;

        if !self.host.directory.account_exists(&executor) {
            return Err(LedgerError::InvalidIdentity(format!(
                "executor account {executor} does not exist"
            )));
        }
        if !self.host.directory.account_exists(&asset.contract) {
            return Err(LedgerError::InvalidIdentity(format!(
                "asset contract {} does not exist",
                asset.contract
            )));
        }
        if !self.host.directory.asset_exists(&asset) {
            return Err(LedgerError::InvalidIdentity(format!(
                "asset {asset} has not been issued"
            )));
        }

        if self.store.config()?.is_some() {
            return Err(LedgerError::AlreadyInitialized);
        }

        let config = LedgerConfig { executor, asset };
        let mut changes = ChangeSet::new();
        changes.put_config(config.clone());
        self.commit(changes)?;

        info!(executor = %config.executor, asset = %config.asset, "ledger initialized");
        Ok(config)
    }

    /// The configuration record.
    pub fn get_config(&self) -> LedgerResult<LedgerConfig> {
        self.store.config()?.ok_or(LedgerError::NotInitialized)
    }

    pub(crate) fn begin(&self, operation: &'static str) -> EnteredSpan {
        info_span!("ledger", op = operation, trace_id = %Uuid::new_v4()).entered()
    }

    /// Held for the whole of a mutating invocation. Nothing is guarded by the
    /// lock itself, so a poisoned lock is still usable.
    pub(crate) fn serialize(&self) -> MutexGuard<'_, ()> {
        match self.invocation_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn authorize(
        &self,
        config: &LedgerConfig,
        invocation: &Invocation,
        capability: &Capability,
    ) -> LedgerResult<()> {
        self.gate.authorize(config, invocation, capability)
    }

    pub(crate) fn require_department(&self, id: DepartmentId) -> LedgerResult<Department> {
        self.store
            .department(id)?
            .ok_or(LedgerError::DepartmentNotFound(id))
    }

    pub(crate) fn require_expenditure(
        &self,
        department: DepartmentId,
        expenditure: ExpenditureId,
    ) -> LedgerResult<Expenditure> {
        self.store
            .expenditure(department, expenditure)?
            .ok_or(LedgerError::ExpenditureNotFound {
                department,
                expenditure,
            })
    }

    pub(crate) fn commit(&self, changes: ChangeSet) -> LedgerResult<()> {
        debug!(
            writes = changes.len(),
            kinds = ?changes.writes().iter().map(Write::label).collect::<Vec<_>>(),
            "committing change set"
        );
        self.store.commit(changes)?;
        Ok(())
    }
}

impl std::fmt::Debug for BudgetLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetLedger")
            .field("backend", &self.store.backend())
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}
