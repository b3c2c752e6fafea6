//! In-memory ledger store.

use std::sync::RwLock;

use budget_types::{
    AllowanceApplication, ApplicationId, Department, DepartmentId, Expenditure, ExpenditureId,
    ExpenseId, ExpenseRecord, LedgerConfig,
};

use crate::changes::ChangeSet;
use crate::error::{StorageError, StorageResult};
use crate::state::LedgerState;
use crate::traits::LedgerStore;

/// Ledger state held behind a single lock.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously captured state.
    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&LedgerState) -> T) -> StorageResult<T> {
        let state = self.state.read().map_err(|_| StorageError::LockError)?;
        Ok(f(&state))
    }

    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&mut LedgerState) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut state = self.state.write().map_err(|_| StorageError::LockError)?;
        f(&mut state)
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn config(&self) -> StorageResult<Option<LedgerConfig>> {
        self.read(|state| state.config.clone())
    }

    fn department(&self, id: DepartmentId) -> StorageResult<Option<Department>> {
        self.read(|state| state.department(id).cloned())
    }

    fn last_department_id(&self) -> StorageResult<Option<DepartmentId>> {
        self.read(LedgerState::last_department_id)
    }

    fn departments(&self) -> StorageResult<Vec<Department>> {
        self.read(|state| state.departments.values().cloned().collect())
    }

    fn application(&self, id: ApplicationId) -> StorageResult<Option<AllowanceApplication>> {
        self.read(|state| state.application(id).cloned())
    }

    fn last_application_id(&self) -> StorageResult<Option<ApplicationId>> {
        self.read(LedgerState::last_application_id)
    }

    fn applications(&self) -> StorageResult<Vec<AllowanceApplication>> {
        self.read(|state| state.applications.values().cloned().collect())
    }

    fn expenditure(
        &self,
        department: DepartmentId,
        id: ExpenditureId,
    ) -> StorageResult<Option<Expenditure>> {
        self.read(|state| state.expenditure(department, id).cloned())
    }

    fn last_expenditure_id(
        &self,
        department: DepartmentId,
    ) -> StorageResult<Option<ExpenditureId>> {
        self.read(|state| state.last_expenditure_id(department))
    }

    fn expenditures(&self, department: DepartmentId) -> StorageResult<Vec<Expenditure>> {
        self.read(|state| state.department_expenditures(department).cloned().collect())
    }

    fn last_expense_id(&self) -> StorageResult<Option<ExpenseId>> {
        self.read(LedgerState::last_expense_id)
    }

    fn expenses(&self) -> StorageResult<Vec<ExpenseRecord>> {
        self.read(|state| state.expenses.values().cloned().collect())
    }

    fn snapshot(&self) -> StorageResult<LedgerState> {
        self.read(LedgerState::clone)
    }

    fn commit(&self, changes: ChangeSet) -> StorageResult<()> {
        self.write(|state| state.apply(changes))
    }
}
