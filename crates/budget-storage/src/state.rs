use std::collections::{BTreeMap, BTreeSet};

use budget_types::{
    AllowanceApplication, ApplicationId, Department, DepartmentId, Expenditure, ExpenditureId,
    ExpenseId, ExpenseRecord, LedgerConfig,
};
use serde::{Deserialize, Serialize};

use crate::changes::{ChangeSet, Write};
use crate::error::{StorageError, StorageResult};

/// Complete ledger contents. Every collection is ordered by id so the last
/// key is the current maximum.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub config: Option<LedgerConfig>,
    pub departments: BTreeMap<DepartmentId, Department>,
    pub applications: BTreeMap<ApplicationId, AllowanceApplication>,
    /// Expenditures scoped by owning department
    pub expenditures: BTreeMap<DepartmentId, BTreeMap<ExpenditureId, Expenditure>>,
    pub expenses: BTreeMap<ExpenseId, ExpenseRecord>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(&self, id: DepartmentId) -> Option<&Department> {
        self.departments.get(&id)
    }

    pub fn last_department_id(&self) -> Option<DepartmentId> {
        self.departments.keys().next_back().copied()
    }

    pub fn application(&self, id: ApplicationId) -> Option<&AllowanceApplication> {
        self.applications.get(&id)
    }

    pub fn last_application_id(&self) -> Option<ApplicationId> {
        self.applications.keys().next_back().copied()
    }

    pub fn expenditure(
        &self,
        department: DepartmentId,
        id: ExpenditureId,
    ) -> Option<&Expenditure> {
        self.expenditures
            .get(&department)
            .and_then(|scope| scope.get(&id))
    }

    pub fn last_expenditure_id(&self, department: DepartmentId) -> Option<ExpenditureId> {
        self.expenditures
            .get(&department)
            .and_then(|scope| scope.keys().next_back().copied())
    }

    pub fn department_expenditures(
        &self,
        department: DepartmentId,
    ) -> impl Iterator<Item = &Expenditure> {
        self.expenditures
            .get(&department)
            .into_iter()
            .flat_map(|scope| scope.values())
    }

    pub fn last_expense_id(&self) -> Option<ExpenseId> {
        self.expenses.keys().next_back().copied()
    }

    /// Validate the whole change set, then apply it. On error nothing changes.
    pub fn apply(&mut self, changes: ChangeSet) -> StorageResult<()> {
        self.validate(&changes)?;
        for write in changes.into_writes() {
            match write {
                Write::PutConfig(config) => self.config = Some(config),
                Write::PutDepartment(department) => {
                    self.departments.insert(department.id, department);
                }
                Write::PutApplication(application) => {
                    self.applications.insert(application.id, application);
                }
                Write::PutExpenditure(expenditure) => {
                    self.expenditures
                        .entry(expenditure.department_id)
                        .or_default()
                        .insert(expenditure.id, expenditure);
                }
                Write::AppendExpense(expense) => {
                    self.expenses.insert(expense.id, expense);
                }
            }
        }
        Ok(())
    }

    fn validate(&self, changes: &ChangeSet) -> StorageResult<()> {
        let mut config_staged = self.config.is_some();
        let mut staged_departments = BTreeSet::new();
        let mut staged_expenses = BTreeSet::new();

        let department_known = |id: DepartmentId, staged: &BTreeSet<DepartmentId>| {
            self.departments.contains_key(&id) || staged.contains(&id)
        };

        for write in changes.writes() {
            match write {
                Write::PutConfig(_) => {
                    if config_staged {
                        return Err(StorageError::Conflict(
                            "ledger configuration is write-once".to_string(),
                        ));
                    }
                    config_staged = true;
                }
                Write::PutDepartment(department) => {
                    staged_departments.insert(department.id);
                }
                Write::PutApplication(application) => {
                    if !department_known(application.department_id, &staged_departments) {
                        return Err(StorageError::InvariantViolation(format!(
                            "application {} references unknown department {}",
                            application.id, application.department_id
                        )));
                    }
                }
                Write::PutExpenditure(expenditure) => {
                    if !department_known(expenditure.department_id, &staged_departments) {
                        return Err(StorageError::InvariantViolation(format!(
                            "expenditure {} references unknown department {}",
                            expenditure.id, expenditure.department_id
                        )));
                    }
                }
                Write::AppendExpense(expense) => {
                    if self.expenses.contains_key(&expense.id)
                        || !staged_expenses.insert(expense.id)
                    {
                        return Err(StorageError::Conflict(format!(
                            "expense {} already recorded",
                            expense.id
                        )));
                    }
                    if !department_known(expense.department_id, &staged_departments) {
                        return Err(StorageError::InvariantViolation(format!(
                            "expense {} references unknown department {}",
                            expense.id, expense.department_id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_types::{AccountId, AssetReference, Capability};
    use chrono::Utc;

    fn config() -> LedgerConfig {
        LedgerConfig {
            executor: AccountId::new("cfo"),
            asset: AssetReference::new(AccountId::new("token.host"), "SYS", 4),
        }
    }

    fn department(id: u64) -> Department {
        Department::new(DepartmentId(id), format!("dept-{id}"), Capability::new("ops"))
    }

    fn expense(id: u64, department: u64) -> ExpenseRecord {
        ExpenseRecord {
            id: ExpenseId(id),
            department_id: DepartmentId(department),
            expenditure_id: ExpenditureId(1),
            timestamp: Utc::now(),
            amount: 10,
            memo: String::new(),
        }
    }

    #[test]
    fn last_ids_follow_key_order() {
        let mut state = LedgerState::new();
        let mut changes = ChangeSet::new();
        changes.put_department(department(3)).put_department(department(1));
        state.apply(changes).unwrap();

        assert_eq!(state.last_department_id(), Some(DepartmentId(3)));
        assert_eq!(state.last_expenditure_id(DepartmentId(3)), None);
        assert_eq!(state.last_expense_id(), None);
    }

    #[test]
    fn config_is_write_once() {
        let mut state = LedgerState::new();
        let mut changes = ChangeSet::new();
        changes.put_config(config());
        state.apply(changes.clone()).unwrap();

        let err = state.apply(changes).unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[test]
    fn rejected_change_set_leaves_state_untouched() {
        let mut state = LedgerState::new();
        let mut seed = ChangeSet::new();
        seed.put_department(department(1))
            .append_expense(expense(1, 1));
        state.apply(seed).unwrap();
        let before = state.clone();

        let mut changes = ChangeSet::new();
        let mut renamed = department(1);
        renamed.name = "renamed".into();
        changes
            .put_department(renamed)
            .append_expense(expense(1, 1));
        assert!(state.apply(changes).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn expenditure_requires_known_department() {
        let mut state = LedgerState::new();
        let mut changes = ChangeSet::new();
        changes.put_expenditure(Expenditure::new(
            ExpenditureId(1),
            DepartmentId(9),
            "rent",
            AccountId::new("landlord"),
            100,
        ));
        let err = state.apply(changes).unwrap_err();
        assert!(matches!(err, StorageError::InvariantViolation(_)));
    }

    #[test]
    fn department_staged_in_same_set_satisfies_references() {
        let mut state = LedgerState::new();
        let mut changes = ChangeSet::new();
        changes
            .put_department(department(1))
            .put_expenditure(Expenditure::new(
                ExpenditureId(1),
                DepartmentId(1),
                "rent",
                AccountId::new("landlord"),
                100,
            ));
        state.apply(changes).unwrap();
        assert_eq!(state.department_expenditures(DepartmentId(1)).count(), 1);
    }
}
