use budget_types::{
    AllowanceApplication, ApplicationId, Department, DepartmentId, Expenditure, ExpenditureId,
    ExpenseId, ExpenseRecord, LedgerConfig,
};

use crate::changes::ChangeSet;
use crate::state::LedgerState;
use crate::StorageResult;

/// Keyed, ordered collections backing the ledger.
///
/// Reads never observe a partially committed change set. Listings are in
/// ascending id order.
pub trait LedgerStore: Send + Sync {
    /// Short backend label for logs.
    fn backend(&self) -> &'static str;

    fn config(&self) -> StorageResult<Option<LedgerConfig>>;

    fn department(&self, id: DepartmentId) -> StorageResult<Option<Department>>;

    fn last_department_id(&self) -> StorageResult<Option<DepartmentId>>;

    fn departments(&self) -> StorageResult<Vec<Department>>;

    fn application(&self, id: ApplicationId) -> StorageResult<Option<AllowanceApplication>>;

    fn last_application_id(&self) -> StorageResult<Option<ApplicationId>>;

    fn applications(&self) -> StorageResult<Vec<AllowanceApplication>>;

    fn expenditure(
        &self,
        department: DepartmentId,
        id: ExpenditureId,
    ) -> StorageResult<Option<Expenditure>>;

    fn last_expenditure_id(&self, department: DepartmentId)
        -> StorageResult<Option<ExpenditureId>>;

    fn expenditures(&self, department: DepartmentId) -> StorageResult<Vec<Expenditure>>;

    fn last_expense_id(&self) -> StorageResult<Option<ExpenseId>>;

    fn expenses(&self) -> StorageResult<Vec<ExpenseRecord>>;

    /// Copy of the full state, for audits and equality checks.
    fn snapshot(&self) -> StorageResult<LedgerState>;

    /// Apply every write in `changes`, or none of them.
    fn commit(&self, changes: ChangeSet) -> StorageResult<()>;
}
